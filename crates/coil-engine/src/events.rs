//! Applies collision contacts to the world.
//!
//! | Reaction  | Effect                                                      |
//! |-----------|-------------------------------------------------------------|
//! | `EatFood` | despawn the food, append a segment, score += 1              |
//! | `HitWall` | defeat                                                      |
//! | `HitSelf` | defeat                                                      |
//!
//! Contacts are handled in the order the collision pass produced them.
//! Once a contact ends the game, the rest of the batch is dropped.

use coil_ecs::component::{EntityKind, Reaction};

use crate::systems::collision::Contact;
use crate::world::World;
use crate::GameError;

/// Stateless dispatcher from [`Contact`]s to world transitions.
#[derive(Debug, Clone, Copy, Default)]
pub struct EventSystem;

impl EventSystem {
    pub fn dispatch(
        world: &mut World,
        contacts: impl IntoIterator<Item = Contact>,
    ) -> Result<(), GameError> {
        let mut contacts = contacts.into_iter();
        for contact in contacts.by_ref() {
            match contact.reaction {
                Reaction::EatFood => Self::eat(world, contact)?,
                Reaction::HitWall | Reaction::HitSelf => {
                    tracing::debug!(
                        entity = %contact.entity,
                        other = %contact.other,
                        reaction = ?contact.reaction,
                        "fatal contact"
                    );
                    world.defeat();
                }
            }
            if world.is_over() {
                break;
            }
        }
        let dropped = contacts.count();
        if dropped > 0 {
            tracing::debug!(dropped, "contacts discarded after game over");
        }
        Ok(())
    }

    fn eat(world: &mut World, contact: Contact) -> Result<(), GameError> {
        // A second contact with food already eaten this tick finds it gone.
        if world.store().kind_of(contact.other) != Some(EntityKind::Food) {
            return Ok(());
        }
        world.remove_game_object(contact.other);
        world.grow()?;
        tracing::info!(score = world.state().score, "food eaten");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::state::GameStatus;
    use coil_ecs::prelude::*;

    fn world() -> World {
        World::new(GameConfig {
            seed: Some(11),
            ..GameConfig::default()
        })
        .unwrap()
    }

    fn contact(world: &World, other: EntityId, reaction: Reaction) -> Contact {
        Contact {
            entity: world.snake().head().unwrap(),
            other,
            other_kind: world.store().kind_of(other).unwrap(),
            reaction,
        }
    }

    fn some_food(world: &World) -> EntityId {
        world.store().entities_of_kind(EntityKind::Food).next().unwrap()
    }

    fn some_wall(world: &World) -> EntityId {
        world.store().entities_of_kind(EntityKind::Wall).next().unwrap()
    }

    #[test]
    fn eating_grows_and_scores() {
        let mut world = world();
        let food = some_food(&world);
        let eat = contact(&world, food, Reaction::EatFood);

        EventSystem::dispatch(&mut world, [eat]).unwrap();

        assert!(!world.store().is_alive(food));
        assert_eq!(world.snake().len(), 4);
        assert_eq!(world.state().score, 1);
        assert_eq!(world.store().count_kind(EntityKind::Food), 0);
    }

    #[test]
    fn duplicate_eat_counts_once() {
        let mut world = world();
        let eat = contact(&world, some_food(&world), Reaction::EatFood);
        EventSystem::dispatch(&mut world, [eat, eat]).unwrap();
        assert_eq!(world.state().score, 1);
        assert_eq!(world.snake().len(), 4);
    }

    #[test]
    fn wall_hit_defeats_and_drops_the_rest() {
        let mut world = world();
        let hit = contact(&world, some_wall(&world), Reaction::HitWall);
        let eat = contact(&world, some_food(&world), Reaction::EatFood);

        EventSystem::dispatch(&mut world, [hit, eat]).unwrap();

        assert_eq!(world.state().status, GameStatus::GameOver);
        assert_eq!(world.state().score, 0);
        assert!(world.get_game_objects().is_empty());
    }

    #[test]
    fn self_hit_defeats() {
        let mut world = world();
        let tail = world.snake().tail().unwrap();
        let hit = contact(&world, tail, Reaction::HitSelf);
        EventSystem::dispatch(&mut world, [hit]).unwrap();
        assert!(world.is_over());
    }
}
