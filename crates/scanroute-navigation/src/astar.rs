//! A* route planning over an [`OccupancyGrid`].
//!
//! Moves go to any of the eight neighbors reported by
//! [`OccupancyGrid::neighbors_of`]. Straight steps cost [`MOVE_STRAIGHT_COST`]
//! and diagonal steps [`MOVE_DIAGONAL_COST`]; the heuristic is the octile
//! distance under the same costs, so returned paths are cost-optimal.
//!
//! All search state lives in a [`SearchContext`] owned by the query. The grid
//! is only read, so any number of queries may run against it at once.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::fmt;

use tracing::{debug, trace};

use crate::error::NavigationError;
use crate::map::{GridPoint, OccupancyGrid};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Cost of an axis-aligned step.
pub const MOVE_STRAIGHT_COST: u32 = 10;
/// Cost of a diagonal step.
pub const MOVE_DIAGONAL_COST: u32 = 14;

/// Represents the result of an A* query with metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PathResult {
    /// The computed path from start to goal inclusive, if one was found.
    pub path: Option<Vec<GridPoint>>,
    /// The total step cost of the path.
    pub total_cost: Option<u32>,
    /// The number of cells expanded during the search.
    pub nodes_explored: usize,
    /// The length of the path (number of waypoints).
    pub path_length: usize,
}

impl PathResult {
    /// Creates a new PathResult for a successful search.
    pub fn success(path: Vec<GridPoint>, total_cost: u32, nodes_explored: usize) -> Self {
        let path_length = path.len();
        Self {
            path: Some(path),
            total_cost: Some(total_cost),
            nodes_explored,
            path_length,
        }
    }

    /// Creates a new PathResult for a search that found no route.
    pub fn failure(nodes_explored: usize) -> Self {
        Self {
            path: None,
            total_cost: None,
            nodes_explored,
            path_length: 0,
        }
    }

    /// Returns true if a path was found.
    pub fn is_success(&self) -> bool {
        self.path.is_some()
    }

    /// Returns the path if one was found.
    pub fn into_path(self) -> Option<Vec<GridPoint>> {
        self.path
    }
}

impl fmt::Display for PathResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.path {
            Some(_) => write!(
                f,
                "PathResult {{ success: true, path_length: {}, total_cost: {}, nodes_explored: {} }}",
                self.path_length,
                self.total_cost.unwrap_or(0),
                self.nodes_explored
            ),
            None => write!(
                f,
                "PathResult {{ success: false, nodes_explored: {} }}",
                self.nodes_explored
            ),
        }
    }
}

/// Octile distance between two cells under the step costs above.
pub fn octile_distance(a: GridPoint, b: GridPoint) -> u32 {
    let dx = a.x.abs_diff(b.x);
    let dy = a.y.abs_diff(b.y);
    let diagonal = to_cost(dx.min(dy));
    let straight = to_cost(dx.max(dy) - dx.min(dy));
    MOVE_DIAGONAL_COST
        .saturating_mul(diagonal)
        .saturating_add(MOVE_STRAIGHT_COST.saturating_mul(straight))
}

/// Cost of a single move between neighboring cells.
pub fn step_cost(from: GridPoint, to: GridPoint) -> u32 {
    if from.is_diagonal_to(&to) {
        MOVE_DIAGONAL_COST
    } else {
        MOVE_STRAIGHT_COST
    }
}

fn to_cost(steps: usize) -> u32 {
    u32::try_from(steps).unwrap_or(u32::MAX)
}

/// Per-cell search state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchNode {
    g: u32,
    h: u32,
    f: u32,
    predecessor: Option<GridPoint>,
    /// Order in which the cell first entered the open set.
    seq: Option<u64>,
    closed: bool,
}

impl Default for SearchNode {
    fn default() -> Self {
        Self {
            g: u32::MAX,
            h: 0,
            f: u32::MAX,
            predecessor: None,
            seq: None,
            closed: false,
        }
    }
}

impl SearchNode {
    /// Best known cost from the start, `u32::MAX` if not reached.
    pub fn g_cost(&self) -> u32 {
        self.g
    }

    /// Heuristic estimate to the goal.
    pub fn h_cost(&self) -> u32 {
        self.h
    }

    /// `g + h`, saturating.
    pub fn f_cost(&self) -> u32 {
        self.f
    }

    /// Cell this one was reached from on the best known route.
    pub fn predecessor(&self) -> Option<GridPoint> {
        self.predecessor
    }

    /// True once the cell has been expanded.
    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

/// Dense search state for one query, indexed like the grid it was sized for.
///
/// Predecessors are stored as coordinates, so reconstructing a path never
/// touches the grid.
#[derive(Debug, Clone)]
pub struct SearchContext {
    width: usize,
    height: usize,
    nodes: Vec<SearchNode>,
    next_seq: u64,
}

impl SearchContext {
    /// Creates a context with every node unreached.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            nodes: vec![SearchNode::default(); width * height],
            next_seq: 0,
        }
    }

    /// Creates a context sized for `grid`.
    pub fn for_grid(grid: &OccupancyGrid) -> Self {
        Self::new(grid.width(), grid.height())
    }

    /// Returns every node to the unreached state.
    pub fn reset(&mut self) {
        self.nodes.fill(SearchNode::default());
        self.next_seq = 0;
    }

    fn index(&self, p: GridPoint) -> Result<usize, NavigationError> {
        if p.x < self.width && p.y < self.height {
            Ok(p.y * self.width + p.x)
        } else {
            Err(NavigationError::OutOfBounds {
                x: p.x,
                y: p.y,
                width: self.width,
                height: self.height,
            })
        }
    }

    /// Search state of `p`.
    pub fn node(&self, p: GridPoint) -> Result<&SearchNode, NavigationError> {
        Ok(&self.nodes[self.index(p)?])
    }

    fn node_mut(&mut self, p: GridPoint) -> Result<&mut SearchNode, NavigationError> {
        let i = self.index(p)?;
        Ok(&mut self.nodes[i])
    }

    /// Sets the cost from the start.
    pub fn set_g(&mut self, p: GridPoint, g: u32) -> Result<(), NavigationError> {
        self.node_mut(p)?.g = g;
        Ok(())
    }

    /// Sets the heuristic estimate.
    pub fn set_h(&mut self, p: GridPoint, h: u32) -> Result<(), NavigationError> {
        self.node_mut(p)?.h = h;
        Ok(())
    }

    /// Recomputes `f = g + h`.
    pub fn recompute_f(&mut self, p: GridPoint) -> Result<u32, NavigationError> {
        let node = self.node_mut(p)?;
        node.f = node.g.saturating_add(node.h);
        Ok(node.f)
    }

    /// Sets the cell `p` was reached from.
    pub fn set_predecessor(
        &mut self,
        p: GridPoint,
        predecessor: Option<GridPoint>,
    ) -> Result<(), NavigationError> {
        self.node_mut(p)?.predecessor = predecessor;
        Ok(())
    }

    /// Insertion order of `p` in the open set, assigned on first insertion.
    fn open_seq(&mut self, p: GridPoint) -> Result<u64, NavigationError> {
        let next = self.next_seq;
        let node = self.node_mut(p)?;
        if let Some(seq) = node.seq {
            return Ok(seq);
        }
        node.seq = Some(next);
        self.next_seq += 1;
        Ok(next)
    }

    fn close(&mut self, p: GridPoint) -> Result<(), NavigationError> {
        self.node_mut(p)?.closed = true;
        Ok(())
    }

    /// Walks predecessor links back from `goal` and returns the route in
    /// start-to-goal order.
    pub fn reconstruct_path(&self, goal: GridPoint) -> Result<Vec<GridPoint>, NavigationError> {
        let mut path = vec![goal];
        let mut current = goal;
        while let Some(previous) = self.node(current)?.predecessor {
            path.push(previous);
            current = previous;
        }
        path.reverse();
        Ok(path)
    }
}

/// Open-set entry. The heap pops the lowest `f`, and among equal `f` the
/// cell that entered the open set first.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
struct State {
    f: u32,
    seq: u64,
    position: GridPoint,
}

impl Ord for State {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .f
            .cmp(&self.f)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for State {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "State {{ f: {}, seq: {}, position: {} }}",
            self.f, self.seq, self.position
        )
    }
}

/// Plans routes over a borrowed grid.
#[derive(Debug, Clone, Copy)]
pub struct PathFinder<'a> {
    grid: &'a OccupancyGrid,
}

impl<'a> PathFinder<'a> {
    /// Creates a planner for `grid`.
    pub fn new(grid: &'a OccupancyGrid) -> Self {
        Self { grid }
    }

    /// The grid being planned over.
    pub fn grid(&self) -> &'a OccupancyGrid {
        self.grid
    }

    /// Finds a cheapest route from `start` to `goal`.
    ///
    /// # Arguments
    /// * `start` - Starting cell.
    /// * `goal` - Goal cell.
    ///
    /// # Returns
    /// * `Result<PathResult, NavigationError>` - The search outcome, or
    ///   `OutOfBounds` if either cell lies outside the grid. An occupied
    ///   start or goal, or a goal cut off by obstacles, is a failed
    ///   `PathResult` rather than an error.
    pub fn find_path(
        &self,
        start: GridPoint,
        goal: GridPoint,
    ) -> Result<PathResult, NavigationError> {
        let mut context = SearchContext::for_grid(self.grid);
        self.find_path_in(&mut context, start, goal)
    }

    /// Like [`PathFinder::find_path`], reusing the allocation of `context`.
    /// The context is reset first.
    pub fn find_path_in(
        &self,
        context: &mut SearchContext,
        start: GridPoint,
        goal: GridPoint,
    ) -> Result<PathResult, NavigationError> {
        let start_blocked = self.grid.is_occupied(start)?;
        let goal_blocked = self.grid.is_occupied(goal)?;
        if start_blocked || goal_blocked {
            debug!(%start, %goal, start_blocked, goal_blocked, "Endpoint is occupied, no path");
            return Ok(PathResult::failure(0));
        }

        if context.width != self.grid.width() || context.height != self.grid.height() {
            *context = SearchContext::for_grid(self.grid);
        } else {
            context.reset();
        }

        let mut open_set = BinaryHeap::new();
        context.set_g(start, 0)?;
        context.set_h(start, octile_distance(start, goal))?;
        let f = context.recompute_f(start)?;
        open_set.push(State {
            f,
            seq: context.open_seq(start)?,
            position: start,
        });

        let mut nodes_explored = 0;
        while let Some(state) = open_set.pop() {
            let current = state.position;
            let node = *context.node(current)?;
            // Entries left behind by a cost decrease, or already expanded.
            if node.closed || node.f != state.f {
                continue;
            }
            trace!(%state, "Expanding");

            nodes_explored += 1;
            if current == goal {
                let path = context.reconstruct_path(goal)?;
                debug!(
                    %start,
                    %goal,
                    cost = node.g,
                    path_length = path.len(),
                    nodes_explored,
                    "Path found"
                );
                return Ok(PathResult::success(path, node.g, nodes_explored));
            }
            context.close(current)?;

            for neighbor in self.grid.neighbors_of(current)? {
                let next = neighbor.position();
                let next_node = context.node(next)?;
                if next_node.closed {
                    continue;
                }
                let tentative_g = node.g.saturating_add(step_cost(current, next));
                if tentative_g < next_node.g {
                    context.set_predecessor(next, Some(current))?;
                    context.set_g(next, tentative_g)?;
                    context.set_h(next, octile_distance(next, goal))?;
                    let f = context.recompute_f(next)?;
                    open_set.push(State {
                        f,
                        seq: context.open_seq(next)?,
                        position: next,
                    });
                }
            }
        }

        debug!(%start, %goal, nodes_explored, "Open set exhausted, no path");
        Ok(PathResult::failure(nodes_explored))
    }
}

/// Finds a path from `start` to `goal` on `grid` using A*.
///
/// Shorthand for [`PathFinder::find_path`] that keeps only the waypoints.
pub fn astar_search(
    grid: &OccupancyGrid,
    start: GridPoint,
    goal: GridPoint,
) -> Result<Option<Vec<GridPoint>>, NavigationError> {
    Ok(PathFinder::new(grid).find_path(start, goal)?.into_path())
}
