use crate::error::SearchError;
use crate::grid::{Coord, Grid};
use std::collections::{HashMap, VecDeque};
use std::f64::consts::SQRT_2;

/// Neighbour enumeration order. Fixed: it decides which of several equal
/// routes gets reported.
pub const NEIGHBOR_OFFSETS: [(i32, i32, f64); 8] = [
    (0, 1, 1.0),      // down
    (1, 0, 1.0),      // right
    (0, -1, 1.0),     // up
    (-1, 0, 1.0),     // left
    (1, 1, SQRT_2),   // down-right
    (1, -1, SQRT_2),  // up-right
    (-1, -1, SQRT_2), // up-left
    (-1, 1, SQRT_2),  // down-left
];

/// A route from start to goal, both inclusive
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    pub cells: Vec<Coord>,
    pub cost: f64,
}

impl Route {
    pub fn start(&self) -> Option<Coord> {
        self.cells.first().copied()
    }

    pub fn goal(&self) -> Option<Coord> {
        self.cells.last().copied()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Terminal result of a run. These are ordinary values, not errors.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    Found(Route),
    Unreachable,
    Cancelled,
}

/// Progress of a run
#[derive(Debug, Clone, PartialEq)]
pub enum SearchResult {
    Pending,
    Done(SearchOutcome),
}

/// Mutable record of one run. Only the running search writes to it.
#[derive(Debug, Clone)]
pub struct SearchState {
    visited: Vec<bool>,
    frontier_order: Vec<Coord>,
    distance: HashMap<Coord, f64>,
    predecessor: HashMap<Coord, Coord>,
    result: SearchResult,
}

impl SearchState {
    fn new(cell_count: usize) -> Self {
        SearchState {
            visited: vec![false; cell_count],
            frontier_order: Vec::new(),
            distance: HashMap::new(),
            predecessor: HashMap::new(),
            result: SearchResult::Pending,
        }
    }

    /// Cells handed to `on_visit`, in order
    pub fn frontier_order(&self) -> &[Coord] {
        &self.frontier_order
    }

    /// Cumulative cost at which `coord` was discovered
    pub fn distance(&self, coord: Coord) -> Option<f64> {
        self.distance.get(&coord).copied()
    }

    pub fn result(&self) -> &SearchResult {
        &self.result
    }

    /// Walk predecessor links back from `coord` to the start
    pub fn path_to(&self, coord: Coord) -> Option<Vec<Coord>> {
        if !self.distance.contains_key(&coord) {
            return None;
        }
        let mut path = vec![coord];
        let mut current = coord;
        while let Some(&prev) = self.predecessor.get(&current) {
            path.push(prev);
            current = prev;
        }
        path.reverse();
        Some(path)
    }
}

/// Uniform-cost expansion over the 8-connected neighbourhood of a grid
/// snapshot. Cells are expanded first-in first-out by discovery order.
pub struct SearchEngine {
    grid: Grid,
    start: Coord,
    goal: Coord,
    state: SearchState,
}

impl SearchEngine {
    /// Prepare a run. Fails if either endpoint is off-grid or blocked.
    pub fn new(grid: Grid, start: Coord, goal: Coord) -> Result<Self, SearchError> {
        for coord in [start, goal] {
            if !grid.in_bounds(coord) {
                return Err(SearchError::InvalidEndpoint { coord, reason: "outside the grid" });
            }
            if grid.is_blocked(coord) {
                return Err(SearchError::InvalidEndpoint { coord, reason: "cell is blocked" });
            }
        }
        let state = SearchState::new(grid.cell_count());
        Ok(SearchEngine { grid, start, goal, state })
    }

    pub fn state(&self) -> &SearchState {
        &self.state
    }

    fn discover(&mut self, coord: Coord, from: Option<Coord>, cost: f64) {
        let id = self.grid.index(coord);
        self.state.visited[id] = true;
        self.state.distance.insert(coord, cost);
        if let Some(prev) = from {
            self.state.predecessor.insert(coord, prev);
        }
    }

    /// Run to completion.
    ///
    /// `on_visit` fires once for every dequeued cell except the goal.
    /// `cancelled` is polled once per dequeued cell; once it returns true no
    /// further visits are reported.
    pub fn run<V, C>(&mut self, mut on_visit: V, cancelled: C) -> SearchOutcome
    where
        V: FnMut(Coord),
        C: Fn() -> bool,
    {
        // A finished engine is not rerun
        if let SearchResult::Done(outcome) = &self.state.result {
            return outcome.clone();
        }

        let mut queue = VecDeque::new();
        self.discover(self.start, None, 0.0);
        queue.push_back(self.start);

        let outcome = loop {
            if cancelled() {
                tracing::debug!(visited = self.state.frontier_order.len(), "search cancelled");
                break SearchOutcome::Cancelled;
            }
            let Some(current) = queue.pop_front() else {
                break SearchOutcome::Unreachable;
            };
            let cost = self.state.distance.get(&current).copied().unwrap_or(0.0);

            if current == self.goal {
                let cells = self.state.path_to(current).unwrap_or_else(|| vec![current]);
                break SearchOutcome::Found(Route { cells, cost });
            }

            self.state.frontier_order.push(current);
            on_visit(current);

            for &(dcol, drow, step) in &NEIGHBOR_OFFSETS {
                let next = current.offset(dcol, drow);
                if self.grid.is_blocked(next) || self.state.visited[self.grid.index(next)] {
                    continue;
                }
                self.discover(next, Some(current), cost + step);
                queue.push_back(next);
            }
        };

        tracing::trace!(
            start = %self.start,
            goal = %self.goal,
            visited = self.state.frontier_order.len(),
            ?outcome,
            "search finished"
        );
        self.state.result = SearchResult::Done(outcome.clone());
        outcome
    }
}

/// One-shot convenience over [`SearchEngine`]
pub fn run<V, C>(
    grid: &Grid,
    start: Coord,
    goal: Coord,
    on_visit: V,
    cancelled: C,
) -> Result<SearchOutcome, SearchError>
where
    V: FnMut(Coord),
    C: Fn() -> bool,
{
    let mut engine = SearchEngine::new(grid.snapshot(), start, goal)?;
    Ok(engine.run(on_visit, cancelled))
}

/// Format a route for display
pub fn format_route(cells: &[Coord]) -> String {
    if cells.is_empty() {
        return "No route".to_string();
    }
    cells
        .iter()
        .map(Coord::to_string)
        .collect::<Vec<_>>()
        .join(" -> ")
}
