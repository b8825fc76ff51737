use parking_lot::RwLock;
use std::{sync::Arc, time::Instant};

use scanroute_navigation::{GridPoint, PathResult, RoomMap, WorldPoint};

/// A planned route, in grid cells and in world positions.
#[derive(Clone, Debug)]
pub struct Route {
    pub name: String,
    pub cells: Vec<GridPoint>,
    pub waypoints: Vec<WorldPoint>,
    pub result: PathResult,
}

#[derive(Clone)]
pub struct State {
    pub map: Option<Arc<RoomMap>>,
    pub map_built_at: Option<Instant>,
    pub builds: u64,
    pub routes: Vec<Route>,
    pub faults: Vec<String>,
}

impl Default for State {
    fn default() -> Self {
        State {
            map: None,
            map_built_at: None,
            builds: 0,
            routes: Vec::new(),
            faults: Vec::new(),
        }
    }
}

pub type Blackboard = Arc<RwLock<State>>;

pub fn snapshot(bb: &Blackboard) -> State {
    (*bb.read()).clone()
}

/// Replaces the current map. Routes planned on the old map are dropped.
pub fn publish_map(bb: &Blackboard, map: RoomMap) {
    let mut g = bb.write();
    g.map = Some(Arc::new(map));
    g.map_built_at = Some(Instant::now());
    g.builds += 1;
    g.routes.clear();
}

/// The current map, if one has been built.
pub fn current_map(bb: &Blackboard) -> Option<Arc<RoomMap>> {
    bb.read().map.clone()
}

pub fn record_route(bb: &Blackboard, route: Route) {
    bb.write().routes.push(route);
}

pub fn raise_fault(bb: &Blackboard, msg: &str) {
    let mut g = bb.write();
    if !g.faults.iter().any(|s| s == msg) {
        g.faults.push(msg.to_string());
    }
}
