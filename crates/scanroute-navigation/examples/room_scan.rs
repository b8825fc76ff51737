use rand::SeedableRng;
use rand::rngs::StdRng;
use scanroute_navigation::mapping::SyntheticRoom;
use scanroute_navigation::{GridPoint, MapBuilder, MapBuilderConfig, PathFinder};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::DEBUG.into()))
        .init();

    // A 5m x 5m room with walls and eight random boxes.
    let room = SyntheticRoom {
        obstacles: 8,
        ..Default::default()
    };
    let scan = room.generate(&mut StdRng::seed_from_u64(11)).unwrap();
    println!("Generated {} mesh fragments", scan.len());

    let map = MapBuilder::new(MapBuilderConfig::default())
        .unwrap()
        .build(&scan)
        .unwrap();
    println!("Build stats: {:?}", map.stats());
    println!("{}", map.grid());

    let start = GridPoint::new(3, 3);
    let goal = GridPoint::new(46, 46);
    let result = PathFinder::new(map.grid()).find_path(start, goal).unwrap();
    println!("{}", result);

    match result.into_path() {
        Some(path) => {
            for (cell, p) in path.iter().zip(map.path_to_world(&path).unwrap()) {
                println!("  {} -> ({:.2}, {:.2}, {:.2})", cell, p.x, p.y, p.z);
            }
        }
        None => println!("No path between {} and {}", start, goal),
    }
}
