use crate::error::ConfigError;
use crate::grid::{Grid, MAX_CELLS};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

pub const CONFIG_PATH: &str = "config.toml";

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub grid: GridConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub timing: TimingConfig,
    #[serde(default)]
    pub visual: VisualConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct GridConfig {
    #[serde(default = "default_width")]
    pub width: i32,
    #[serde(default = "default_height")]
    pub height: i32,
    /// Cell edge in pixels
    #[serde(default = "default_cell_size")]
    pub cell_size: i32,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct SearchConfig {
    /// Pause after each visited cell, in milliseconds
    #[serde(default)]
    pub visit_delay_ms: u64,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct InputConfig {
    #[serde(default = "default_double_click_updates")]
    pub double_click_updates: u32,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct TimingConfig {
    #[serde(default = "default_update_hz")]
    pub update_hz: f64,
    #[serde(default = "default_max_updates_per_frame")]
    pub max_updates_per_frame: u32,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct VisualConfig {
    #[serde(default = "default_window_title")]
    pub window_title: String,
    #[serde(default = "default_background")]
    pub background: [u8; 3],
    #[serde(default = "default_open")]
    pub open: [u8; 3],
    #[serde(default = "default_blocked")]
    pub blocked: [u8; 3],
    #[serde(default = "default_tracked")]
    pub tracked: [u8; 3],
    #[serde(default = "default_frontier")]
    pub frontier: [u8; 3],
    #[serde(default = "default_route")]
    pub route: [u8; 3],
    #[serde(default = "default_hover")]
    pub hover: [u8; 3],
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

// Default values
fn default_width() -> i32 { 40 }
fn default_height() -> i32 { 30 }
fn default_cell_size() -> i32 { 20 }
fn default_double_click_updates() -> u32 { 20 }
fn default_update_hz() -> f64 { 64.0 }
fn default_max_updates_per_frame() -> u32 { 3 }
fn default_window_title() -> String { "Path Simulation".to_string() }
fn default_background() -> [u8; 3] { [0, 0, 0] }
fn default_open() -> [u8; 3] { [200, 200, 200] }
fn default_blocked() -> [u8; 3] { [200, 200, 200] }
fn default_tracked() -> [u8; 3] { [255, 0, 0] }
fn default_frontier() -> [u8; 3] { [0, 150, 150] }
fn default_route() -> [u8; 3] { [0, 150, 150] }
fn default_hover() -> [u8; 3] { [120, 120, 120] }
fn default_log_level() -> String { "info".to_string() }

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            cell_size: default_cell_size(),
        }
    }
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            double_click_updates: default_double_click_updates(),
        }
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            update_hz: default_update_hz(),
            max_updates_per_frame: default_max_updates_per_frame(),
        }
    }
}

impl Default for VisualConfig {
    fn default() -> Self {
        Self {
            window_title: default_window_title(),
            background: default_background(),
            open: default_open(),
            blocked: default_blocked(),
            tracked: default_tracked(),
            frontier: default_frontier(),
            route: default_route(),
            hover: default_hover(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl SearchConfig {
    pub fn visit_delay(&self) -> Duration {
        Duration::from_millis(self.visit_delay_ms)
    }
}

impl TimingConfig {
    /// Length of one fixed update step
    pub fn update_step(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.update_hz)
    }
}

impl Config {
    /// Parse and validate a TOML document
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Option<Self>, ConfigError> {
        match fs::read_to_string(path) {
            Ok(contents) => Self::from_toml_str(&contents).map(Some),
            Err(_) => Ok(None),
        }
    }

    /// Load `config.toml`, or use defaults if it is missing or broken
    pub fn load() -> Self {
        match Self::from_file(Path::new(CONFIG_PATH)) {
            Ok(Some(config)) => {
                tracing::info!("loaded configuration from {}", CONFIG_PATH);
                config
            }
            Ok(None) => {
                tracing::info!("no {} found, using default configuration", CONFIG_PATH);
                Config::default()
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to load {}, using defaults", CONFIG_PATH);
                Config::default()
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("grid.width", self.grid.width),
            ("grid.height", self.grid.height),
            ("grid.cell_size", self.grid.cell_size),
        ];
        for (field, value) in positive {
            if value <= 0 {
                let reason = format!("must be positive, got {}", value);
                return Err(ConfigError::Invalid { field, reason });
            }
        }
        let (width, height) = (self.grid.width, self.grid.height);
        match Grid::cell_count_for(width, height) {
            Some(cells) if cells <= MAX_CELLS => {}
            _ => {
                return Err(ConfigError::Invalid {
                    field: "grid",
                    reason: format!("{}x{} exceeds the {} cell limit", width, height, MAX_CELLS),
                });
            }
        }
        let pixels = [("grid.width", width), ("grid.height", height)];
        let cell_size = self.grid.cell_size;
        for (field, cells) in pixels {
            if cells.checked_mul(cell_size).is_none() {
                return Err(ConfigError::Invalid {
                    field,
                    reason: format!("{} cells of {} px overflow the window size", cells, cell_size),
                });
            }
        }
        if !(self.timing.update_hz.is_finite() && self.timing.update_hz > 0.0) {
            return Err(ConfigError::Invalid {
                field: "timing.update_hz",
                reason: format!("must be a positive rate, got {}", self.timing.update_hz),
            });
        }
        if self.timing.max_updates_per_frame == 0 {
            return Err(ConfigError::Invalid {
                field: "timing.max_updates_per_frame",
                reason: "must allow at least one update".to_string(),
            });
        }
        Ok(())
    }

    /// Window size in pixels
    pub fn window_size(&self) -> (i32, i32) {
        let cell = self.grid.cell_size;
        (self.grid.width.saturating_mul(cell), self.grid.height.saturating_mul(cell))
    }
}
