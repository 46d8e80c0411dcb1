//! Host-independent key codes and the held-key set.

use serde::{Deserialize, Serialize};

/// Keys the game reacts to. Hosts map their own key codes onto these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    Up,
    Down,
    Left,
    Right,
    W,
    A,
    S,
    D,
    /// Retry after a defeat.
    R,
    Escape,
}

impl Key {
    /// The grid step a movement key requests, `None` for other keys.
    pub fn direction(self) -> Option<(i32, i32)> {
        match self {
            Key::W | Key::Up => Some((0, -1)),
            Key::A | Key::Left => Some((-1, 0)),
            Key::S | Key::Down => Some((0, 1)),
            Key::D | Key::Right => Some((1, 0)),
            Key::R | Key::Escape => None,
        }
    }
}

/// Keys currently held, oldest press first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyboardInput {
    held: Vec<Key>,
}

impl KeyboardInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a press. Auto-repeat presses of a held key keep its position.
    pub fn key_down(&mut self, key: Key) {
        if !self.held.contains(&key) {
            self.held.push(key);
        }
    }

    pub fn key_up(&mut self, key: Key) {
        self.held.retain(|&k| k != key);
    }

    pub fn held(&self) -> &[Key] {
        &self.held
    }

    pub fn is_held(&self, key: Key) -> bool {
        self.held.contains(&key)
    }

    pub fn release_all(&mut self) {
        self.held.clear();
    }
}
