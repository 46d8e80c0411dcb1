//! Game configuration.
//!
//! [`GameConfig`] is plain serde data. Every field has a default, so a JSON
//! file only needs to name what it overrides. Call [`GameConfig::validate`]
//! before building a world; nothing downstream re-checks these bounds.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::grid::MAX_CELLS;
use crate::systems::collision::OverlapMode;

/// Smallest playable board, in cells, along either axis.
pub const MIN_BOARD_CELLS: i32 = 5;

/// Errors raised while loading or validating a [`GameConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("{field} must be positive, got {value}")]
    NotPositive { field: &'static str, value: i64 },

    #[error("{field} ({value}) is not a multiple of cell_size ({cell_size})")]
    NotCellAligned {
        field: &'static str,
        value: i32,
        cell_size: i32,
    },

    #[error("board is {columns}x{rows} cells, needs at least {min}x{min}")]
    BoardTooSmall { columns: i32, rows: i32, min: i32 },

    #[error("board is {columns}x{rows} cells, at most {max} cells in total")]
    BoardTooLarge { columns: i32, rows: i32, max: usize },

    #[error("initial_length {length} does not fit, at most {max} segments fit left of the start cell")]
    SnakeTooLong { length: u32, max: u32 },
}

/// Tunables for one game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Board width in pixels.
    pub width: i32,
    /// Board height in pixels.
    pub height: i32,
    /// Simulation ticks per second.
    pub tickrate: u32,
    /// Edge length of one grid cell in pixels.
    pub cell_size: i32,
    /// Segments in a fresh snake, head included.
    pub initial_length: u32,
    /// RNG seed. `None` seeds from entropy.
    pub seed: Option<u64>,
    /// Interval test used by the narrow phase.
    pub overlap: OverlapMode,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            width: 900,
            height: 600,
            tickrate: 10,
            cell_size: 20,
            initial_length: 3,
            seed: None,
            overlap: OverlapMode::ExactEdges,
        }
    }
}

impl GameConfig {
    /// Read a JSON config file. Missing fields take their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let display = path.display().to_string();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: display.clone(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: display,
            source,
        })
    }

    pub fn columns(&self) -> i32 {
        self.width / self.cell_size
    }

    pub fn rows(&self) -> i32 {
        self.height / self.cell_size
    }

    /// Wall-clock length of one tick.
    pub fn tick_period(&self) -> std::time::Duration {
        std::time::Duration::from_secs_f64(1.0 / f64::from(self.tickrate.max(1)))
    }

    /// The cell the head starts in: the board centre.
    pub fn start_cell(&self) -> (i32, i32) {
        (self.columns() / 2, self.rows() / 2)
    }

    /// Check every bound the world relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("cell_size", i64::from(self.cell_size))?;
        positive("width", i64::from(self.width))?;
        positive("height", i64::from(self.height))?;
        positive("tickrate", i64::from(self.tickrate))?;
        positive("initial_length", i64::from(self.initial_length))?;

        for (field, value) in [("width", self.width), ("height", self.height)] {
            if value % self.cell_size != 0 {
                return Err(ConfigError::NotCellAligned {
                    field,
                    value,
                    cell_size: self.cell_size,
                });
            }
        }

        let (columns, rows) = (self.columns(), self.rows());
        if columns < MIN_BOARD_CELLS || rows < MIN_BOARD_CELLS {
            return Err(ConfigError::BoardTooSmall {
                columns,
                rows,
                min: MIN_BOARD_CELLS,
            });
        }
        let cells = (columns as usize).checked_mul(rows as usize);
        if cells.map_or(true, |n| n > MAX_CELLS) {
            return Err(ConfigError::BoardTooLarge {
                columns,
                rows,
                max: MAX_CELLS,
            });
        }

        // Column 0 is wall, so the tail may reach column 1 at the leftmost.
        let max = self.start_cell().0 as u32;
        if self.initial_length > max {
            return Err(ConfigError::SnakeTooLong {
                length: self.initial_length,
                max,
            });
        }
        Ok(())
    }
}

fn positive(field: &'static str, value: i64) -> Result<(), ConfigError> {
    if value <= 0 {
        return Err(ConfigError::NotPositive { field, value });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        let config = GameConfig::default();
        config.validate().unwrap();
        assert_eq!((config.columns(), config.rows()), (45, 30));
        assert_eq!(config.start_cell(), (22, 15));
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config: GameConfig = serde_json::from_str(r#"{"tickrate": 20, "seed": 9}"#).unwrap();
        assert_eq!(config.tickrate, 20);
        assert_eq!(config.seed, Some(9));
        assert_eq!(config.width, 900);
        assert_eq!(config.overlap, OverlapMode::ExactEdges);
    }

    #[test]
    fn overlap_mode_uses_snake_case() {
        let config: GameConfig = serde_json::from_str(r#"{"overlap": "aabb"}"#).unwrap();
        assert_eq!(config.overlap, OverlapMode::Aabb);
    }

    #[test]
    fn rejects_zero_tickrate() {
        let config = GameConfig {
            tickrate: 0,
            ..GameConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NotPositive { field: "tickrate", .. })
        ));
    }

    #[test]
    fn rejects_unaligned_width() {
        let config = GameConfig {
            width: 910,
            ..GameConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NotCellAligned { field: "width", .. })
        ));
    }

    #[test]
    fn rejects_tiny_board() {
        let config = GameConfig {
            width: 80,
            height: 200,
            ..GameConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::BoardTooSmall { columns: 4, .. })
        ));
    }

    #[test]
    fn rejects_huge_board() {
        let config = GameConfig {
            width: 2_000_000,
            height: 2_000_000,
            cell_size: 1,
            ..GameConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::BoardTooLarge {
                columns: 2_000_000,
                rows: 2_000_000,
                ..
            })
        ));
    }

    #[test]
    fn rejects_snake_longer_than_half_board() {
        let config = GameConfig {
            initial_length: 23,
            ..GameConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::SnakeTooLong { length: 23, max: 22 })
        ));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = GameConfig::from_json_file("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn tick_period_matches_rate() {
        let config = GameConfig {
            tickrate: 4,
            ..GameConfig::default()
        };
        assert_eq!(config.tick_period(), std::time::Duration::from_millis(250));
    }
}
