//! Turns held movement keys into a new heading for player-controlled bodies.
//!
//! This pass runs every frame, outside the tick, and its commands are applied
//! immediately. Held keys are visited in press order and each one is checked
//! against the heading produced by the keys before it, not against the
//! heading at the start of the poll. Holding two perpendicular keys can
//! therefore chain into a reversal (right, then up, then left) within a
//! single poll.

use coil_ecs::command::CommandBuffer;
use coil_ecs::component::{PhysicsBody, PlayerController};
use coil_ecs::store::EntityStore;

use crate::input::Key;

pub const SYSTEM_NAME: &str = "keyboard";

/// Queue a heading change for every player body the held keys redirect.
pub fn steer(store: &EntityStore, held: &[Key], cmds: &mut CommandBuffer) {
    if held.is_empty() {
        return;
    }
    for (entity, (_, body)) in store.query::<(&PlayerController, &PhysicsBody)>() {
        let start = body.direction();
        let heading = held
            .iter()
            .filter_map(|key| key.direction())
            .fold(start, |current, wanted| {
                if is_reversal(current, wanted) {
                    current
                } else {
                    wanted
                }
            });
        if heading != start {
            let mut body = body.clone();
            body.set_direction(heading.0, heading.1);
            cmds.insert(entity, body, SYSTEM_NAME);
        }
    }
}

/// `wanted` points exactly back along `current`.
fn is_reversal(current: (i32, i32), wanted: (i32, i32)) -> bool {
    (current.0 + wanted.0, current.1 + wanted.1) == (0, 0)
}
