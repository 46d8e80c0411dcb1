//! Component bundles for the three entity archetypes, plus their colors.
//!
//! | Archetype    | Components                                                   |
//! |--------------|--------------------------------------------------------------|
//! | Snake head   | Transform, PhysicsBody (with reactions), Sprite::Box, PlayerController |
//! | Snake body   | Transform, PhysicsBody, Sprite::Box, AiFollow                |
//! | Food         | Transform, PhysicsBody, Sprite::Circle                       |
//! | Wall         | Transform, PhysicsBody, Sprite::Box (solid)                  |
//!
//! Only the head reacts to contacts. Everything else carries an empty
//! reaction table, so its side of a contact is a no-op.

use coil_ecs::prelude::*;

// ---------------------------------------------------------------------------
// Palette
// ---------------------------------------------------------------------------

pub const BACKGROUND_COLOR: Color = Color::rgb(12, 12, 16);
pub const SNAKE_HEAD_COLOR: Color = Color::rgb(120, 235, 120);
pub const SNAKE_BODY_COLOR: Color = Color::rgb(60, 170, 70);
pub const FOOD_COLOR: Color = Color::rgb(235, 70, 60);
pub const WALL_COLOR: Color = Color::rgb(110, 110, 120);
pub const TEXT_COLOR: Color = Color::WHITE;

// ---------------------------------------------------------------------------
// Bundles
// ---------------------------------------------------------------------------

/// The player-controlled head at `(x, y)`, moving along `direction`.
pub fn snake_head(x: i32, y: i32, size: i32, direction: (i32, i32)) -> Result<ComponentBundle, EcsError> {
    let body = PhysicsBody::new()
        .with_direction(direction.0, direction.1)
        .on(EntityKind::Food, Reaction::EatFood)
        .on(EntityKind::Wall, Reaction::HitWall)
        .on(EntityKind::Snake, Reaction::HitSelf);
    Ok(ComponentBundle::new()
        .with(Transform::square(x, y, size)?)
        .with(body)
        .with(segment_sprite(size, SNAKE_HEAD_COLOR))
        .with(PlayerController))
}

/// A body segment chasing `target`.
pub fn snake_segment(
    x: i32,
    y: i32,
    size: i32,
    direction: (i32, i32),
    target: EntityId,
) -> Result<ComponentBundle, EcsError> {
    Ok(ComponentBundle::new()
        .with(Transform::square(x, y, size)?)
        .with(PhysicsBody::new().with_direction(direction.0, direction.1))
        .with(segment_sprite(size, SNAKE_BODY_COLOR))
        .with(AiFollow { target }))
}

/// Food filling one cell, drawn as the circle inscribed in it.
pub fn food(x: i32, y: i32, size: i32) -> Result<ComponentBundle, EcsError> {
    Ok(ComponentBundle::new()
        .with(Transform::square(x, y, size)?)
        .with(PhysicsBody::new())
        .with(Sprite::Circle {
            radius: size / 2,
            color: FOOD_COLOR,
        }))
}

/// One solid wall cell.
pub fn wall(x: i32, y: i32, size: i32) -> Result<ComponentBundle, EcsError> {
    Ok(ComponentBundle::new()
        .with(Transform::square(x, y, size)?)
        .with(PhysicsBody::new())
        .with(Sprite::Box {
            width: size,
            height: size,
            color: WALL_COLOR,
            outline: false,
        }))
}

fn segment_sprite(size: i32, color: Color) -> Sprite {
    Sprite::Box {
        width: size,
        height: size,
        color,
        outline: false,
    }
}
