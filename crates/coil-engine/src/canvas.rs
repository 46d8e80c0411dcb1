//! The drawing contract and a recording implementation of it.
//!
//! Game code draws through [`Canvas`] only. [`DrawList`] records every call
//! as a [`DrawCommand`]; headless runs and tests inspect it, and the wgpu
//! renderer turns it into vertices.

use coil_ecs::component::Color;
use serde::{Deserialize, Serialize};

use crate::render::text;

/// Where a text position sits relative to the rendered string.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Anchor {
    #[default]
    TopLeft,
    /// `(x, y)` is the centre of the text's bounding box.
    Center,
}

/// A 2D drawing surface in pixel space, origin top-left, y down.
pub trait Canvas {
    fn clear(&mut self, color: Color);

    /// Axis-aligned rectangle; `outline` draws only a one-pixel border.
    fn fill_rect(&mut self, x: i32, y: i32, width: i32, height: i32, color: Color, outline: bool);

    fn fill_circle(&mut self, cx: i32, cy: i32, radius: i32, color: Color);

    /// Bitmap text, one filled square per lit glyph pixel of side `scale`.
    fn text(&mut self, s: &str, x: i32, y: i32, scale: i32, color: Color, anchor: Anchor) {
        let (x, y) = match anchor {
            Anchor::TopLeft => (x, y),
            Anchor::Center => (
                x - text::text_width(s, scale) / 2,
                y - text::text_height(scale) / 2,
            ),
        };
        for (px, py, side) in text::pixel_squares(s, x, y, scale) {
            self.fill_rect(px, py, side, side, color, false);
        }
    }

    /// Finish the frame.
    fn present(&mut self);
}

/// One recorded canvas call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DrawCommand {
    Clear(Color),
    Rect {
        x: i32,
        y: i32,
        width: i32,
        height: i32,
        color: Color,
        outline: bool,
    },
    Circle {
        cx: i32,
        cy: i32,
        radius: i32,
        color: Color,
    },
}

/// Recording canvas. Holds the commands of the frame being built and the
/// last presented frame.
#[derive(Debug, Clone, Default)]
pub struct DrawList {
    pending: Vec<DrawCommand>,
    presented: Vec<DrawCommand>,
    frames: u64,
}

impl DrawList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Commands recorded since the last `present`.
    pub fn pending(&self) -> &[DrawCommand] {
        &self.pending
    }

    /// The most recently presented frame.
    pub fn frame(&self) -> &[DrawCommand] {
        &self.presented
    }

    pub fn frames_presented(&self) -> u64 {
        self.frames
    }
}

impl Canvas for DrawList {
    fn clear(&mut self, color: Color) {
        self.pending.clear();
        self.pending.push(DrawCommand::Clear(color));
    }

    fn fill_rect(&mut self, x: i32, y: i32, width: i32, height: i32, color: Color, outline: bool) {
        self.pending.push(DrawCommand::Rect {
            x,
            y,
            width,
            height,
            color,
            outline,
        });
    }

    fn fill_circle(&mut self, cx: i32, cy: i32, radius: i32, color: Color) {
        self.pending.push(DrawCommand::Circle {
            cx,
            cy,
            radius,
            color,
        });
    }

    fn present(&mut self) {
        self.presented = std::mem::take(&mut self.pending);
        self.frames += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn present_swaps_frames() {
        let mut list = DrawList::new();
        list.clear(Color::BLACK);
        list.fill_rect(1, 2, 3, 4, Color::WHITE, true);
        assert_eq!(list.pending().len(), 2);
        assert!(list.frame().is_empty());

        list.present();
        assert!(list.pending().is_empty());
        assert_eq!(list.frame().len(), 2);
        assert_eq!(list.frames_presented(), 1);
    }

    #[test]
    fn clear_drops_earlier_commands() {
        let mut list = DrawList::new();
        list.fill_circle(5, 5, 2, Color::WHITE);
        list.clear(Color::BLACK);
        assert_eq!(list.pending(), &[DrawCommand::Clear(Color::BLACK)]);
    }

    #[test]
    fn centred_text_straddles_the_anchor() {
        let mut list = DrawList::new();
        list.text("-", 100, 50, 2, Color::WHITE, Anchor::Center);
        let xs: Vec<i32> = list
            .pending()
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Rect { x, .. } => Some(*x),
                _ => None,
            })
            .collect();
        // "-" is 10 px wide at scale 2: spans 95..105.
        assert_eq!(xs.first(), Some(&95));
        assert_eq!(xs.last(), Some(&103));
    }
}
