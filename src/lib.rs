pub mod config;
pub mod error;
pub mod grid;
pub mod input;
pub mod search;
pub mod session;
pub mod worker;

pub use config::Config;
pub use error::{ConfigError, GridError, SearchError, SessionError};
pub use grid::{CellStatus, Coord, Grid};
pub use search::{Route, SearchEngine, SearchOutcome};
pub use session::{RenderCell, SessionController, SessionPhase};
