//! Score line and game-over banner.

use crate::archetype::TEXT_COLOR;
use crate::canvas::{Anchor, Canvas};
use crate::config::GameConfig;
use crate::state::GameState;

pub const GAME_OVER_TEXT: &str = "GAME OVER | PRESS [R] TO RETRY";
const SCORE_SCALE: i32 = 3;
const BANNER_SCALE: i32 = 4;
/// Gap between the score line and the inner edge of the wall.
const MARGIN: i32 = 8;

pub fn score_text(state: &GameState) -> String {
    format!("SCORE: {}", state.score)
}

/// Draw the HUD on top of the scene. The score sits inside the perimeter
/// wall, in the top-left corner of the playfield.
pub fn draw(state: &GameState, config: &GameConfig, canvas: &mut dyn Canvas) {
    let inset = config.cell_size + MARGIN;
    canvas.text(
        &score_text(state),
        inset,
        inset,
        SCORE_SCALE,
        TEXT_COLOR,
        Anchor::TopLeft,
    );
    if state.is_over() {
        canvas.text(
            GAME_OVER_TEXT,
            config.width / 2,
            config.height / 2,
            BANNER_SCALE,
            TEXT_COLOR,
            Anchor::Center,
        );
    }
}
