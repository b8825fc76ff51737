mod blackboard;
mod settings;

use std::sync::Arc;

use anyhow::{Context, anyhow};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{info, warn};
use tracing_subscriber::{self, EnvFilter};

use blackboard::{
    Blackboard, Route, current_map, publish_map, raise_fault, record_route, snapshot,
};
use scanroute_navigation::{MapBuilder, PathFinder};
use settings::{RouteQuery, Settings, load_settings};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    info!("Scanroute started.");
    let settings = load_settings().context("failed to load configuration")?;
    let bb: Blackboard = Arc::default();

    build_map(&bb, &settings)?;
    plan_routes(&bb, &settings.routes)?;

    let state = snapshot(&bb);
    let map = state
        .map
        .as_ref()
        .ok_or_else(|| anyhow!("no map was published"))?;
    info!(
        builds = state.builds,
        map_age = ?state.map_built_at.map(|t| t.elapsed()),
        routes = state.routes.len(),
        "Blackboard state"
    );
    println!("{}", map.grid());
    for route in &state.routes {
        println!("{}: {}", route.name, route.result);
        for (cell, p) in route.cells.iter().zip(&route.waypoints) {
            println!("  {} -> ({:.2}, {:.2}, {:.2})", cell, p.x, p.y, p.z);
        }
    }
    for fault in &state.faults {
        warn!(fault = %fault, "Outstanding fault");
    }
    Ok(())
}

/// Generates a scan, builds the map and publishes it on the blackboard.
fn build_map(bb: &Blackboard, settings: &Settings) -> anyhow::Result<()> {
    let mut rng = StdRng::seed_from_u64(settings.seed);
    let scan = settings
        .room
        .generate(&mut rng)
        .context("failed to generate room scan")?;

    let builder = MapBuilder::new(settings.map.clone()).context("invalid map configuration")?;
    let map = builder.build(&scan).context("map build failed")?;
    info!(stats = ?map.stats(), "Map ready");
    publish_map(bb, map);
    Ok(())
}

/// Plans every route on its own thread against the published map.
fn plan_routes(bb: &Blackboard, routes: &[RouteQuery]) -> anyhow::Result<()> {
    let map = current_map(bb).ok_or_else(|| anyhow!("no map to plan on"))?;

    std::thread::scope(|s| {
        let handles: Vec<_> = routes
            .iter()
            .map(|query| {
                let map = Arc::clone(&map);
                std::thread::Builder::new()
                    .name(format!("planner-{}", query.name))
                    .spawn_scoped(s, move || -> anyhow::Result<()> {
                        let start = map
                            .world_to_cell(&query.start())
                            .with_context(|| format!("route {}: bad start", query.name))?;
                        let goal = map
                            .world_to_cell(&query.goal())
                            .with_context(|| format!("route {}: bad goal", query.name))?;

                        let result = PathFinder::new(map.grid()).find_path(start, goal)?;
                        let cells = match &result.path {
                            Some(cells) => cells.clone(),
                            None => {
                                warn!(route = %query.name, %start, %goal, "No path found");
                                raise_fault(bb, &format!("no path for route {}", query.name));
                                Vec::new()
                            }
                        };
                        let waypoints = map.path_to_world(&cells)?;
                        info!(route = %query.name, %result, "Route planned");
                        record_route(
                            bb,
                            Route {
                                name: query.name.clone(),
                                cells,
                                waypoints,
                                result,
                            },
                        );
                        Ok(())
                    })
            })
            .collect::<Result<_, _>>()?;

        for handle in handles {
            handle
                .join()
                .map_err(|_| anyhow!("planner thread panicked"))??;
        }
        Ok(())
    })
}
