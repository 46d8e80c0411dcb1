//! Steers followers one cell toward their target.

use coil_ecs::command::CommandBuffer;
use coil_ecs::component::{AiFollow, PhysicsBody, Transform};

use super::SystemContext;
use crate::GameError;

pub const SYSTEM_NAME: &str = "ai_follow";

/// Point every follower at its target: each axis is the sign of the offset.
/// Followers whose target is gone (or has no transform) keep their heading.
pub fn run(ctx: &mut SystemContext<'_>, cmds: &mut CommandBuffer) -> Result<(), GameError> {
    for (entity, (follow, body, t)) in ctx.store.query::<(&AiFollow, &PhysicsBody, &Transform)>() {
        let Some(target) = ctx.store.get_component::<Transform>(follow.target) else {
            continue;
        };
        let heading = chase_direction(t, target);
        if heading != body.direction() {
            let mut body = body.clone();
            body.set_direction(heading.0, heading.1);
            cmds.insert(entity, body, SYSTEM_NAME);
        }
    }
    Ok(())
}

/// Per-axis sign of `target - follower`.
pub fn chase_direction(follower: &Transform, target: &Transform) -> (i32, i32) {
    (
        (target.x - follower.x).clamp(-1, 1),
        (target.y - follower.y).clamp(-1, 1),
    )
}
