//! Draws every sprite through a [`Canvas`].

use coil_ecs::component::{Sprite, Transform};
use coil_ecs::store::EntityStore;

use crate::canvas::Canvas;

/// Draw each entity with a transform and a sprite, in spawn order. Boxes
/// anchor at the transform's top-left corner; circles are centred in a
/// `2r x 2r` box there.
pub fn draw(store: &EntityStore, canvas: &mut dyn Canvas) {
    for (_, (t, sprite)) in store.query::<(&Transform, &Sprite)>() {
        match *sprite {
            Sprite::Box {
                width,
                height,
                color,
                outline,
            } => canvas.fill_rect(t.x, t.y, width, height, color, outline),
            Sprite::Circle { radius, color } => {
                canvas.fill_circle(t.x + radius, t.y + radius, radius, color)
            }
        }
    }
}
