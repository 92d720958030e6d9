use crate::error::GridError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A cell coordinate, origin top-left
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coord {
    pub col: i32,
    pub row: i32,
}

impl Coord {
    pub const fn new(col: i32, row: i32) -> Self {
        Coord { col, row }
    }

    pub fn offset(self, dcol: i32, drow: i32) -> Self {
        Coord::new(self.col + dcol, self.row + drow)
    }

    /// True if `other` is one of the 8 cells around `self`
    pub fn is_adjacent(&self, other: &Coord) -> bool {
        let dc = (self.col - other.col).abs();
        let dr = (self.row - other.row).abs();
        dc <= 1 && dr <= 1 && (dc, dr) != (0, 0)
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.col, self.row)
    }
}

/// Status of a single cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CellStatus {
    #[default]
    Open,
    Blocked,
    /// One of the two user-selected endpoints. Traversable.
    Tracked,
}

impl CellStatus {
    pub fn is_blocked(self) -> bool {
        self == CellStatus::Blocked
    }
}

/// Layout symbols shared by `from_layout` / `to_layout`
pub const BLOCKED_SYMBOL: char = '■';
pub const OPEN_SYMBOL: char = '□';
pub const TRACKED_SYMBOL: char = 'x';

/// Largest board a session accepts
pub const MAX_CELLS: usize = 1 << 22;

/// Grid structure for storing cell states, row-major
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    pub rows: i32,
    pub cols: i32,
    cells: Vec<CellStatus>,
    /// Revision number - incremented whenever a cell actually changes
    revision: u64,
}

impl Grid {
    /// Create a new grid with all cells open
    pub fn new(cols: i32, rows: i32) -> Self {
        let len = Self::cell_count_for(cols, rows).unwrap_or(0);
        Grid {
            rows,
            cols,
            cells: vec![CellStatus::Open; len],
            revision: 0,
        }
    }

    /// Number of cells in a `cols` x `rows` board, or `None` if it does not
    /// fit in memory addressing
    pub fn cell_count_for(cols: i32, rows: i32) -> Option<usize> {
        let cols = usize::try_from(cols.max(0)).ok()?;
        let rows = usize::try_from(rows.max(0)).ok()?;
        cols.checked_mul(rows)
    }

    /// Create a grid with specific blocked cells; out-of-bounds entries are an error
    pub fn with_blocked(cols: i32, rows: i32, blocked: &[Coord]) -> Result<Self, GridError> {
        let mut grid = Self::new(cols, rows);
        for &coord in blocked {
            grid.set_status(coord, CellStatus::Blocked)?;
        }
        Ok(grid)
    }

    /// Parse a layout made of `■` (blocked), `□` (open) and `x` (tracked) rows.
    /// Blank lines are skipped; every row must have the same width.
    pub fn from_layout(layout: &str) -> Result<Self, GridError> {
        let lines: Vec<(usize, &str)> = layout
            .lines()
            .enumerate()
            .map(|(i, line)| (i + 1, line.trim()))
            .filter(|(_, line)| !line.is_empty())
            .collect();

        let Some(&(_, first)) = lines.first() else {
            return Err(GridError::Layout { line: 0, reason: "layout is empty".to_string() });
        };
        let cols = first.chars().count() as i32;
        let mut grid = Grid::new(cols, lines.len() as i32);

        for (row, (line_no, line)) in lines.iter().enumerate() {
            let width = line.chars().count() as i32;
            if width != cols {
                return Err(GridError::Layout {
                    line: *line_no,
                    reason: format!("expected {} cells, found {}", cols, width),
                });
            }
            for (col, ch) in line.chars().enumerate() {
                let status = match ch {
                    BLOCKED_SYMBOL => CellStatus::Blocked,
                    OPEN_SYMBOL => CellStatus::Open,
                    TRACKED_SYMBOL => CellStatus::Tracked,
                    other => {
                        return Err(GridError::Layout {
                            line: *line_no,
                            reason: format!("unknown cell symbol '{}'", other),
                        })
                    }
                };
                let id = grid.index(Coord::new(col as i32, row as i32));
                grid.cells[id] = status;
            }
        }

        Ok(grid)
    }

    /// Render the grid back into layout notation
    pub fn to_layout(&self) -> String {
        let mut result = String::with_capacity(self.cells.len() * 4);
        for row in self.cells.chunks(self.cols.max(1) as usize) {
            for status in row {
                result.push(match status {
                    CellStatus::Open => OPEN_SYMBOL,
                    CellStatus::Blocked => BLOCKED_SYMBOL,
                    CellStatus::Tracked => TRACKED_SYMBOL,
                });
            }
            result.push('\n');
        }
        result
    }

    pub fn in_bounds(&self, coord: Coord) -> bool {
        coord.col >= 0 && coord.col < self.cols && coord.row >= 0 && coord.row < self.rows
    }

    fn check(&self, coord: Coord) -> Result<usize, GridError> {
        if self.in_bounds(coord) {
            Ok(self.index(coord))
        } else {
            Err(GridError::OutOfBounds { coord, cols: self.cols, rows: self.rows })
        }
    }

    /// Row-major cell index of an in-bounds coordinate
    pub(crate) fn index(&self, coord: Coord) -> usize {
        coord.row as usize * self.cols as usize + coord.col as usize
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Get cell status at `coord`
    pub fn status(&self, coord: Coord) -> Result<CellStatus, GridError> {
        self.check(coord).map(|id| self.cells[id])
    }

    /// Blocked check for search expansion; out of bounds counts as blocked
    pub fn is_blocked(&self, coord: Coord) -> bool {
        self.status(coord).map_or(true, CellStatus::is_blocked)
    }

    /// Set cell status at `coord`. The only mutator.
    pub fn set_status(&mut self, coord: Coord, status: CellStatus) -> Result<(), GridError> {
        let id = self.check(coord)?;
        if self.cells[id] != status {
            self.cells[id] = status;
            self.revision += 1;
        }
        Ok(())
    }

    /// Independent deep copy for a background search; shares nothing with `self`
    pub fn snapshot(&self) -> Grid {
        Grid {
            rows: self.rows,
            cols: self.cols,
            cells: self.cells.clone(),
            revision: self.revision,
        }
    }

    /// Get current grid revision number
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// All coordinates in row-major order
    pub fn coords(&self) -> impl Iterator<Item = Coord> + '_ {
        (0..self.rows).flat_map(move |row| (0..self.cols).map(move |col| Coord::new(col, row)))
    }

    pub fn count(&self, status: CellStatus) -> usize {
        self.cells.iter().filter(|&&s| s == status).count()
    }
}
