//! Score and win/lose status.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    #[default]
    InGame,
    /// Terminal until the world is reset.
    GameOver,
}

impl GameStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            GameStatus::InGame => "in_game",
            GameStatus::GameOver => "game_over",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    pub score: u32,
    pub status: GameStatus,
}

impl GameState {
    pub fn is_over(&self) -> bool {
        self.status == GameStatus::GameOver
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
