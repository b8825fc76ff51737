use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::Deserialize;
use tracing::{error, info};

use scanroute_navigation::mapping::{MapBuilderConfig, SyntheticRoom};
use scanroute_navigation::WorldPoint;

const DEFAULT_CONFIG_PATH: &str = "config/default.toml";
const ENV_PREFIX: &str = "SCANROUTE";

/// One route to plan once the map is built. Positions are world meters.
#[derive(Debug, Clone, Deserialize)]
pub struct RouteQuery {
    pub name: String,
    pub start: [f32; 3],
    pub goal: [f32; 3],
}

impl RouteQuery {
    pub fn start(&self) -> WorldPoint {
        WorldPoint::from(self.start)
    }

    pub fn goal(&self) -> WorldPoint {
        WorldPoint::from(self.goal)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Seed for the synthetic scan.
    pub seed: u64,
    pub map: MapBuilderConfig,
    pub room: SyntheticRoom,
    pub routes: Vec<RouteQuery>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            seed: 7,
            map: MapBuilderConfig::default(),
            room: SyntheticRoom::default(),
            routes: vec![RouteQuery {
                name: "diagonal".into(),
                start: [0.3, 0.0, 0.3],
                goal: [4.7, 0.0, 4.7],
            }],
        }
    }
}

/// Loads `config/default.toml`, then applies `SCANROUTE__...` environment
/// overrides (for example `SCANROUTE__MAP__GRID_WIDTH=80`).
pub fn load_settings() -> Result<Settings, ConfigError> {
    info!("Attempting to load configuration from {}", DEFAULT_CONFIG_PATH);

    let settings: Result<Settings, ConfigError> = Config::builder()
        .add_source(File::new(DEFAULT_CONFIG_PATH, FileFormat::Toml).required(true))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        )
        .build()
        .and_then(|config| config.try_deserialize());

    match settings {
        Ok(settings) => {
            info!(?settings, "Successfully loaded configuration");
            Ok(settings)
        }
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            Err(e)
        }
    }
}
