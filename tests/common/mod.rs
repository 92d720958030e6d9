#![allow(dead_code)]

use pathsim::search::NEIGHBOR_OFFSETS;
use pathsim::{Coord, Grid};
use serde::Deserialize;
use std::collections::{HashSet, VecDeque};
use std::fs;
use std::path::Path;

/// Route fixture stored under `test_data/routes`
#[derive(Debug, Clone, Deserialize)]
pub struct RouteTestData {
    #[serde(rename = "testName")]
    pub test_name: String,
    /// Rows of `S` (start), `G` (goal), `■` (blocked), `□` (open)
    pub layout: Vec<String>,
    #[serde(rename = "expectedRoute")]
    pub expected_route: Option<Vec<Coord>>,
    #[serde(rename = "expectedCost")]
    pub expected_cost: Option<f64>,
    #[serde(rename = "expectedVisits")]
    pub expected_visits: usize,
}

/// Load a fixture from a JSON file
pub fn load_test(path: &Path) -> Result<RouteTestData, Box<dyn std::error::Error>> {
    let contents = fs::read_to_string(path)?;
    let test_data: RouteTestData = serde_json::from_str(&contents)?;
    Ok(test_data)
}

/// All route fixtures, sorted by file name
pub fn load_all(dir: &str) -> Vec<RouteTestData> {
    let mut entries: Vec<_> = fs::read_dir(dir)
        .map(|entries| entries.filter_map(Result::ok).collect())
        .unwrap_or_default();
    entries.sort_by_key(|e| e.file_name());
    entries
        .iter()
        .map(|e| e.path())
        .filter(|p| p.extension().and_then(|s| s.to_str()) == Some("json"))
        .map(|p| load_test(&p).unwrap_or_else(|e| panic!("bad fixture {}: {}", p.display(), e)))
        .collect()
}

/// Parse a scenario layout into a grid plus start and goal.
/// `S` and `G` are left open in the grid.
pub fn parse_scenario(rows: &[&str]) -> (Grid, Coord, Coord) {
    let mut start = None;
    let mut goal = None;
    let mut plain = String::new();
    for (row, line) in rows.iter().enumerate() {
        for (col, ch) in line.chars().enumerate() {
            let coord = Coord::new(col as i32, row as i32);
            match ch {
                'S' => start = Some(coord),
                'G' => goal = Some(coord),
                _ => {}
            }
            plain.push(if ch == 'S' || ch == 'G' { '□' } else { ch });
        }
        plain.push('\n');
    }
    let grid = Grid::from_layout(&plain).expect("valid layout");
    (grid, start.expect("layout has S"), goal.expect("layout has G"))
}

/// Mirror a scenario left-right
pub fn flip_horizontal(rows: &[String]) -> Vec<String> {
    rows.iter().map(|r| r.chars().rev().collect()).collect()
}

/// Mirror a scenario top-bottom
pub fn flip_vertical(rows: &[String]) -> Vec<String> {
    rows.iter().rev().cloned().collect()
}

/// Flood fill over the 8-neighbourhood, independent of the engine
pub fn reachable_component(grid: &Grid, start: Coord) -> HashSet<Coord> {
    let mut seen = HashSet::from([start]);
    let mut queue = VecDeque::from([start]);
    while let Some(current) = queue.pop_front() {
        for &(dc, dr, _) in &NEIGHBOR_OFFSETS {
            let next = current.offset(dc, dr);
            if !grid.is_blocked(next) && seen.insert(next) {
                queue.push_back(next);
            }
        }
    }
    seen
}

/// Sum of step costs along a route
pub fn route_cost(cells: &[Coord]) -> f64 {
    cells
        .windows(2)
        .map(|w| {
            let diagonal = w[0].col != w[1].col && w[0].row != w[1].row;
            if diagonal { std::f64::consts::SQRT_2 } else { 1.0 }
        })
        .sum()
}

/// Check the shape of a route: endpoints and single king-moves
pub fn assert_well_formed(cells: &[Coord], start: Coord, goal: Coord, grid: &Grid) {
    assert_eq!(cells.first(), Some(&start), "route must begin at start");
    assert_eq!(cells.last(), Some(&goal), "route must end at goal");
    for pair in cells.windows(2) {
        assert!(pair[0].is_adjacent(&pair[1]), "{} -> {} is not a single step", pair[0], pair[1]);
    }
    for cell in cells {
        assert!(!grid.is_blocked(*cell), "route crosses blocked cell {}", cell);
    }
}
