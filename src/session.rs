use crate::error::{GridError, SessionError};
use crate::grid::{CellStatus, Coord, Grid, BLOCKED_SYMBOL, OPEN_SYMBOL, TRACKED_SYMBOL};
use crate::search::{format_route, SearchOutcome};
use crate::worker::{Drained, SearchRun};
use std::collections::{HashSet, VecDeque};
use std::time::Duration;

const FRONTIER_SYMBOL: char = 'o';
const ROUTE_SYMBOL: char = '*';

/// Lifecycle of the (at most one) search owned by a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Idle,
    Running,
    Completed,
    Cancelled,
    Unreachable,
}

impl SessionPhase {
    /// A finished run whose result is still on screen
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            SessionPhase::Completed | SessionPhase::Cancelled | SessionPhase::Unreachable
        )
    }
}

/// One cell as the presentation layer should draw it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderCell {
    pub coord: Coord,
    pub status: CellStatus,
    pub is_frontier: bool,
    pub is_route: bool,
}

/// Owns the live grid, the endpoint selection and the render state, and
/// drives the search lifecycle: `Idle -> Running -> terminal -> Idle`.
pub struct SessionController {
    grid: Grid,
    /// Cells the user painted, kept apart from the grid so an endpoint
    /// sitting on paint remembers it
    painted: HashSet<Coord>,
    /// Oldest first; never more than two
    endpoints: VecDeque<Coord>,
    phase: SessionPhase,
    frontier: Vec<Coord>,
    frontier_set: HashSet<Coord>,
    route: Vec<Coord>,
    route_set: HashSet<Coord>,
    route_cost: Option<f64>,
    run: Option<SearchRun>,
    /// Start and goal the current run was spawned with
    run_endpoints: Option<(Coord, Coord)>,
    visit_delay: Duration,
}

impl SessionController {
    pub fn new(cols: i32, rows: i32) -> Self {
        SessionController {
            grid: Grid::new(cols, rows),
            painted: HashSet::new(),
            endpoints: VecDeque::with_capacity(2),
            phase: SessionPhase::Idle,
            frontier: Vec::new(),
            frontier_set: HashSet::new(),
            route: Vec::new(),
            route_set: HashSet::new(),
            route_cost: None,
            run: None,
            run_endpoints: None,
            visit_delay: Duration::ZERO,
        }
    }

    /// Pause the worker after every visit so progress is visible
    pub fn with_visit_delay(mut self, visit_delay: Duration) -> Self {
        self.visit_delay = visit_delay;
        self
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn endpoints(&self) -> Vec<Coord> {
        self.endpoints.iter().copied().collect()
    }

    pub fn is_painted(&self, coord: Coord) -> bool {
        self.painted.contains(&coord)
    }

    pub fn frontier(&self) -> &[Coord] {
        &self.frontier
    }

    pub fn route(&self) -> &[Coord] {
        &self.route
    }

    pub fn route_cost(&self) -> Option<f64> {
        self.route_cost
    }

    /// Oldest endpoint as start, newest as goal
    fn endpoint_pair(&self) -> Option<(Coord, Coord)> {
        match (self.endpoints.front(), self.endpoints.get(1)) {
            (Some(&start), Some(&goal)) => Some((start, goal)),
            _ => None,
        }
    }

    fn clear_display(&mut self) {
        self.frontier.clear();
        self.frontier_set.clear();
        self.route.clear();
        self.route_set.clear();
        self.route_cost = None;
    }

    /// Drop a finished result from the screen before a mutation
    fn leave_terminal(&mut self) {
        if self.phase.is_terminal() {
            self.clear_display();
            self.phase = SessionPhase::Idle;
        }
    }

    /// Paint (`on`) or erase a cell.
    ///
    /// Ignored while a search runs and on tracked endpoints. Returns whether
    /// the grid changed.
    pub fn paint_cell(&mut self, coord: Coord, on: bool) -> Result<bool, GridError> {
        let current = self.grid.status(coord)?;
        if self.phase == SessionPhase::Running {
            tracing::trace!(%coord, "paint ignored while searching");
            return Ok(false);
        }
        if current == CellStatus::Tracked {
            return Ok(false);
        }
        let target = if on { CellStatus::Blocked } else { CellStatus::Open };
        if current == target {
            return Ok(false);
        }

        self.leave_terminal();
        self.grid.set_status(coord, target)?;
        if on {
            self.painted.insert(coord);
        } else {
            self.painted.remove(&coord);
        }
        Ok(true)
    }

    /// Track `coord` as an endpoint, evicting the oldest when two are held.
    ///
    /// Allowed while a search runs; the running search keeps the endpoints
    /// it started with, and its result is dropped once it ends. Selecting a
    /// painted cell is allowed, and a search from it reports `Unreachable`.
    pub fn select_endpoint(&mut self, coord: Coord) -> Result<bool, GridError> {
        self.grid.status(coord)?;
        if self.endpoints.contains(&coord) {
            return Ok(false);
        }

        self.leave_terminal();
        if self.endpoints.len() == 2 {
            if let Some(evicted) = self.endpoints.pop_front() {
                let restored = if self.painted.contains(&evicted) {
                    CellStatus::Blocked
                } else {
                    CellStatus::Open
                };
                self.grid.set_status(evicted, restored)?;
            }
        }
        self.grid.set_status(coord, CellStatus::Tracked)?;
        self.endpoints.push_back(coord);
        tracing::debug!(%coord, selected = self.endpoints.len(), "endpoint selected");
        Ok(true)
    }

    /// Start a search between the two endpoints on a snapshot of the grid.
    ///
    /// A run already in flight is cancelled and joined first.
    pub fn start_search(&mut self) -> Result<(), SessionError> {
        let Some((start, goal)) = self.endpoint_pair() else {
            return Err(SessionError::EndpointsMissing { selected: self.endpoints.len() });
        };

        if self.phase == SessionPhase::Running {
            self.stop_run();
        }
        self.clear_display();
        self.phase = SessionPhase::Idle;

        if self.painted.contains(&start) || self.painted.contains(&goal) {
            tracing::info!(%start, %goal, "endpoint sits on a painted cell, no route possible");
            self.phase = SessionPhase::Unreachable;
            return Ok(());
        }

        let snapshot = self.grid.snapshot();
        self.run = Some(SearchRun::spawn(snapshot, start, goal, self.visit_delay)?);
        self.run_endpoints = Some((start, goal));
        self.phase = SessionPhase::Running;
        tracing::info!(%start, %goal, "search started");
        Ok(())
    }

    /// Abandon the running search. Returns false when nothing was running.
    pub fn cancel(&mut self) -> bool {
        if self.phase != SessionPhase::Running {
            return false;
        }
        self.stop_run();
        self.clear_display();
        self.phase = SessionPhase::Cancelled;
        tracing::info!("search cancelled");
        true
    }

    fn stop_run(&mut self) {
        if let Some(mut run) = self.run.take() {
            run.shutdown();
        }
        self.run_endpoints = None;
    }

    /// Pull published progress from the worker. Call once per update.
    pub fn poll(&mut self) {
        let Some(run) = self.run.as_mut() else { return };
        let seen = self.frontier.len();
        let drained = run.drain(&mut self.frontier);
        self.frontier_set.extend(self.frontier[seen..].iter().copied());
        if drained != Drained::Pending {
            self.finish(drained);
        }
    }

    /// Block until the running search ends
    pub fn wait(&mut self) {
        let Some(run) = self.run.as_mut() else { return };
        let seen = self.frontier.len();
        let drained = run.wait(&mut self.frontier);
        self.frontier_set.extend(self.frontier[seen..].iter().copied());
        self.finish(drained);
    }

    fn finish(&mut self, drained: Drained) {
        self.run = None;
        let searched = self.run_endpoints.take();
        let visited = self.frontier.len();
        self.frontier.clear();
        self.frontier_set.clear();

        if searched != self.endpoint_pair() {
            tracing::debug!(visited, "endpoints changed during the search, result dropped");
            self.phase = SessionPhase::Idle;
            return;
        }

        self.phase = match drained {
            Drained::Finished(Ok(SearchOutcome::Found(route))) => {
                tracing::info!(
                    visited,
                    steps = route.len(),
                    cost = route.cost,
                    "route found: {}",
                    format_route(&route.cells)
                );
                self.route_set = route.cells.iter().copied().collect();
                self.route = route.cells;
                self.route_cost = Some(route.cost);
                SessionPhase::Completed
            }
            Drained::Finished(Ok(SearchOutcome::Unreachable)) => {
                tracing::info!(visited, "no route between endpoints");
                SessionPhase::Unreachable
            }
            Drained::Finished(Ok(SearchOutcome::Cancelled)) => SessionPhase::Cancelled,
            Drained::Finished(Err(err)) => {
                tracing::error!(%err, "search rejected its endpoints");
                SessionPhase::Unreachable
            }
            Drained::Lost | Drained::Pending => {
                tracing::error!("search worker exited without a result");
                SessionPhase::Unreachable
            }
        };
    }

    /// Every cell with its draw flags, row-major. Safe in any phase.
    pub fn renderable_cells(&self) -> Vec<RenderCell> {
        self.grid
            .coords()
            .map(|coord| RenderCell {
                coord,
                status: self.grid.status(coord).unwrap_or(CellStatus::Open),
                is_frontier: self.frontier_set.contains(&coord),
                is_route: self.route_set.contains(&coord),
            })
            .collect()
    }

    /// The board as text, for the clipboard
    pub fn render_text(&self) -> String {
        let mut result = String::new();
        for cell in self.renderable_cells() {
            let symbol = match cell.status {
                CellStatus::Tracked => TRACKED_SYMBOL,
                CellStatus::Blocked => BLOCKED_SYMBOL,
                CellStatus::Open if cell.is_route => ROUTE_SYMBOL,
                CellStatus::Open if cell.is_frontier => FRONTIER_SYMBOL,
                CellStatus::Open => OPEN_SYMBOL,
            };
            result.push(symbol);
            if cell.coord.col == self.grid.cols - 1 {
                result.push('\n');
            }
        }
        result
    }
}

impl Drop for SessionController {
    fn drop(&mut self) {
        self.stop_run();
    }
}
