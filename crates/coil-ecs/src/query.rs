//! Typed queries over the entity store.
//!
//! A query is a tuple of component references, e.g.
//! `(&Transform, &PhysicsBody)`. Matching is a presence check on each
//! entity's [`ComponentTable`]: entities missing any requested kind are
//! skipped, never reported as an error. Iteration follows spawn order.
//!
//! Queries are read-only. Systems that write do so through a
//! [`CommandBuffer`](crate::command::CommandBuffer) or by collecting ids first
//! and then calling [`EntityStore::get_component_mut`].

use std::marker::PhantomData;

use crate::component::{ComponentKind, ComponentTable, ComponentType};
use crate::entity::EntityId;
use crate::store::EntityStore;

// ---------------------------------------------------------------------------
// QueryItem
// ---------------------------------------------------------------------------

/// One element of a query tuple.
pub trait QueryItem {
    type Item<'w>;
    const KIND: ComponentKind;

    fn fetch(table: &ComponentTable) -> Option<Self::Item<'_>>;
}

impl<T: ComponentType> QueryItem for &T {
    type Item<'w> = &'w T;
    const KIND: ComponentKind = T::KIND;

    fn fetch(table: &ComponentTable) -> Option<Self::Item<'_>> {
        table.get::<T>()
    }
}

// ---------------------------------------------------------------------------
// Query
// ---------------------------------------------------------------------------

/// A statically declared set of required components.
pub trait Query {
    type Item<'w>;

    /// Kinds an entity must carry to match.
    fn kinds() -> Vec<ComponentKind>;

    /// `Some` when every required kind is present.
    fn fetch(table: &ComponentTable) -> Option<Self::Item<'_>>;

    fn matches(table: &ComponentTable) -> bool {
        Self::kinds().into_iter().all(|k| table.has(k))
    }
}

macro_rules! impl_query {
    ($($name:ident),+) => {
        impl<$($name: QueryItem),+> Query for ($($name,)+) {
            type Item<'w> = ($($name::Item<'w>,)+);

            fn kinds() -> Vec<ComponentKind> {
                vec![$($name::KIND),+]
            }

            fn fetch(table: &ComponentTable) -> Option<Self::Item<'_>> {
                Some(($($name::fetch(table)?,)+))
            }
        }
    };
}

impl_query!(A);
impl_query!(A, B);
impl_query!(A, B, C);
impl_query!(A, B, C, D);

// ---------------------------------------------------------------------------
// QueryIter
// ---------------------------------------------------------------------------

/// Iterator returned by [`EntityStore::query`].
pub struct QueryIter<'w, Q: Query> {
    store: &'w EntityStore,
    cursor: usize,
    _marker: PhantomData<Q>,
}

impl<'w, Q: Query> QueryIter<'w, Q> {
    pub(crate) fn new(store: &'w EntityStore) -> Self {
        Self {
            store,
            cursor: 0,
            _marker: PhantomData,
        }
    }
}

impl<'w, Q: Query> Iterator for QueryIter<'w, Q> {
    type Item = (EntityId, Q::Item<'w>);

    fn next(&mut self) -> Option<Self::Item> {
        let store = self.store;
        let order = store.order();
        while self.cursor < order.len() {
            let id = order[self.cursor];
            self.cursor += 1;
            if let Some(item) = store.table(id).and_then(Q::fetch) {
                return Some((id, item));
            }
        }
        None
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use crate::prelude::*;

    fn body() -> PhysicsBody {
        PhysicsBody::new()
    }

    #[test]
    fn query_skips_entities_missing_a_kind() {
        let mut store = EntityStore::new();
        let moving = store.spawn(
            EntityKind::Snake,
            ComponentBundle::new()
                .with(Transform::square(0, 0, 20).unwrap())
                .with(body()),
        );
        let _static_box = store.spawn(
            EntityKind::Wall,
            ComponentBundle::new().with(Transform::square(20, 0, 20).unwrap()),
        );

        let hits: Vec<EntityId> = store
            .query::<(&Transform, &PhysicsBody)>()
            .map(|(id, _)| id)
            .collect();
        assert_eq!(hits, vec![moving]);
    }

    #[test]
    fn query_follows_spawn_order() {
        let mut store = EntityStore::new();
        let ids: Vec<EntityId> = (0..5)
            .map(|i| {
                store.spawn(
                    EntityKind::Wall,
                    ComponentBundle::new().with(Transform::square(100 - i * 20, 0, 20).unwrap()),
                )
            })
            .collect();
        let seen: Vec<EntityId> = store.query::<(&Transform,)>().map(|(id, _)| id).collect();
        assert_eq!(seen, ids);
    }

    #[test]
    fn query_yields_component_values() {
        let mut store = EntityStore::new();
        store.spawn(
            EntityKind::Snake,
            ComponentBundle::new()
                .with(Transform::square(40, 60, 20).unwrap())
                .with(body().with_direction(0, -1))
                .with(PlayerController),
        );
        let (_, (t, b, _)) = store
            .query::<(&Transform, &PhysicsBody, &PlayerController)>()
            .next()
            .unwrap();
        assert_eq!((t.x, t.y), (40, 60));
        assert_eq!(b.direction(), (0, -1));
    }

    #[test]
    fn matches_reports_presence() {
        let mut table = ComponentTable::new();
        table.insert(Transform::square(0, 0, 1).unwrap());
        assert!(<(&Transform,)>::matches(&table));
        assert!(!<(&Transform, &AiFollow)>::matches(&table));
    }
}
