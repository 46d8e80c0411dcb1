//! The [`EntityStore`] owns every entity, its [`EntityKind`] tag and its
//! [`ComponentTable`].
//!
//! Records live in a slot vector indexed by [`EntityId::index`]; a separate
//! spawn-order list drives iteration so that passes over the store are
//! deterministic and match the order entities were added.

use crate::component::{
    Component, ComponentKind, ComponentTable, ComponentType, EntityKind,
};
use crate::entity::{EntityAllocator, EntityId};
use crate::query::{Query, QueryIter};
use crate::EcsError;

// ---------------------------------------------------------------------------
// ComponentBundle
// ---------------------------------------------------------------------------

/// A set of components to attach at spawn time.
///
/// Later components of the same kind overwrite earlier ones, matching
/// [`EntityStore::insert_component`].
#[derive(Debug, Clone, Default)]
pub struct ComponentBundle {
    components: Vec<Component>,
}

impl ComponentBundle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`add`](Self::add).
    pub fn with(mut self, component: impl Into<Component>) -> Self {
        self.add(component);
        self
    }

    pub fn add(&mut self, component: impl Into<Component>) {
        self.components.push(component.into());
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    fn into_table(self) -> ComponentTable {
        let mut table = ComponentTable::new();
        for component in self.components {
            table.insert(component);
        }
        table
    }
}

// ---------------------------------------------------------------------------
// EntityStore
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
struct EntityRecord {
    kind: EntityKind,
    components: ComponentTable,
}

/// Entity/component storage with generational handles.
#[derive(Debug, Default)]
pub struct EntityStore {
    allocator: EntityAllocator,
    /// Indexed by `EntityId::index()`; `None` for free slots.
    records: Vec<Option<EntityRecord>>,
    /// Live entities in spawn order.
    order: Vec<EntityId>,
}

impl EntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn an entity of `kind` carrying `bundle`.
    pub fn spawn(&mut self, kind: EntityKind, bundle: ComponentBundle) -> EntityId {
        let id = self.allocator.allocate();
        let idx = id.index() as usize;
        if idx >= self.records.len() {
            self.records.resize_with(idx + 1, || None);
        }
        self.records[idx] = Some(EntityRecord {
            kind,
            components: bundle.into_table(),
        });
        self.order.push(id);
        tracing::trace!(entity = %id, ?kind, "spawned");
        id
    }

    /// Despawn an entity and recycle its slot.
    ///
    /// # Errors
    ///
    /// [`EcsError::StaleEntity`] if `entity` is not alive.
    pub fn despawn(&mut self, entity: EntityId) -> Result<(), EcsError> {
        if !self.allocator.release(entity) {
            return Err(EcsError::StaleEntity { entity });
        }
        self.records[entity.index() as usize] = None;
        self.order.retain(|id| *id != entity);
        tracing::trace!(entity = %entity, "despawned");
        Ok(())
    }

    /// Despawn everything. Outstanding handles all become stale.
    pub fn clear(&mut self) {
        for id in std::mem::take(&mut self.order) {
            self.allocator.release(id);
            self.records[id.index() as usize] = None;
        }
    }

    #[inline]
    pub fn is_alive(&self, entity: EntityId) -> bool {
        self.allocator.is_alive(entity)
    }

    /// The entity's kind tag, or `None` for a stale handle.
    pub fn kind_of(&self, entity: EntityId) -> Option<EntityKind> {
        self.record(entity).map(|r| r.kind)
    }

    pub fn entity_count(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Live entities in spawn order.
    pub fn order(&self) -> &[EntityId] {
        &self.order
    }

    /// Live entities of `kind`, in spawn order.
    pub fn entities_of_kind(&self, kind: EntityKind) -> impl Iterator<Item = EntityId> + '_ {
        self.order
            .iter()
            .copied()
            .filter(move |id| self.kind_of(*id) == Some(kind))
    }

    pub fn count_kind(&self, kind: EntityKind) -> usize {
        self.entities_of_kind(kind).count()
    }

    /// The whole component table of a live entity.
    pub fn table(&self, entity: EntityId) -> Option<&ComponentTable> {
        self.record(entity).map(|r| &r.components)
    }

    // -- component access ---------------------------------------------------

    pub fn get_component<T: ComponentType>(&self, entity: EntityId) -> Option<&T> {
        self.table(entity)?.get::<T>()
    }

    pub fn get_component_mut<T: ComponentType>(&mut self, entity: EntityId) -> Option<&mut T> {
        self.record_mut(entity)?.components.get_mut::<T>()
    }

    pub fn has_component<T: ComponentType>(&self, entity: EntityId) -> bool {
        self.has_kind(entity, T::KIND)
    }

    pub fn has_kind(&self, entity: EntityId, kind: ComponentKind) -> bool {
        self.table(entity).is_some_and(|t| t.has(kind))
    }

    /// Attach or overwrite a component.
    ///
    /// # Errors
    ///
    /// [`EcsError::StaleEntity`] if `entity` is not alive.
    pub fn insert_component(
        &mut self,
        entity: EntityId,
        component: impl Into<Component>,
    ) -> Result<(), EcsError> {
        let record = self
            .record_mut(entity)
            .ok_or(EcsError::StaleEntity { entity })?;
        record.components.insert(component);
        Ok(())
    }

    /// Detach a component. Absent components (and stale entities) are a no-op.
    pub fn remove_component<T: ComponentType>(&mut self, entity: EntityId) -> Option<T> {
        self.record_mut(entity)?.components.remove::<T>()
    }

    // -- queries ------------------------------------------------------------

    /// Iterate `(EntityId, Q::Item)` for every entity matching `Q`.
    pub fn query<Q: Query>(&self) -> QueryIter<'_, Q> {
        QueryIter::new(self)
    }

    // -- internal helpers ---------------------------------------------------

    fn record(&self, entity: EntityId) -> Option<&EntityRecord> {
        if !self.allocator.is_alive(entity) {
            return None;
        }
        self.records.get(entity.index() as usize)?.as_ref()
    }

    fn record_mut(&mut self, entity: EntityId) -> Option<&mut EntityRecord> {
        if !self.allocator.is_alive(entity) {
            return None;
        }
        self.records.get_mut(entity.index() as usize)?.as_mut()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use crate::prelude::*;

    fn segment(x: i32, y: i32) -> ComponentBundle {
        ComponentBundle::new()
            .with(Transform::square(x, y, 20).unwrap())
            .with(PhysicsBody::new())
    }

    #[test]
    fn spawn_and_read_back() {
        let mut store = EntityStore::new();
        let e = store.spawn(EntityKind::Snake, segment(40, 20));
        assert_eq!(store.kind_of(e), Some(EntityKind::Snake));
        assert_eq!(
            store.get_component::<Transform>(e).map(|t| (t.x, t.y)),
            Some((40, 20))
        );
        assert!(store.has_component::<PhysicsBody>(e));
        assert!(!store.has_component::<Sprite>(e));
    }

    #[test]
    fn despawn_makes_handle_absent() {
        let mut store = EntityStore::new();
        let food = store.spawn(EntityKind::Food, segment(0, 0));
        store.despawn(food).unwrap();
        assert!(!store.is_alive(food));
        assert!(store.get_component::<Transform>(food).is_none());
        assert_eq!(store.kind_of(food), None);
        assert!(store.is_empty());
    }

    #[test]
    fn despawn_twice_is_stale_error() {
        let mut store = EntityStore::new();
        let e = store.spawn(EntityKind::Wall, segment(0, 0));
        store.despawn(e).unwrap();
        assert!(matches!(
            store.despawn(e),
            Err(EcsError::StaleEntity { entity }) if entity == e
        ));
    }

    #[test]
    fn recycled_slot_does_not_resurrect_old_handle() {
        let mut store = EntityStore::new();
        let old = store.spawn(EntityKind::Food, segment(0, 0));
        store.despawn(old).unwrap();
        let new = store.spawn(EntityKind::Food, segment(60, 60));
        assert_eq!(new.index(), old.index());
        assert!(store.get_component::<Transform>(old).is_none());
        assert!(store.get_component::<Transform>(new).is_some());
    }

    #[test]
    fn insert_overwrites_and_rejects_stale() {
        let mut store = EntityStore::new();
        let e = store.spawn(EntityKind::Snake, segment(0, 0));
        store
            .insert_component(e, Transform::square(20, 0, 20).unwrap())
            .unwrap();
        assert_eq!(store.get_component::<Transform>(e).unwrap().x, 20);

        store.despawn(e).unwrap();
        assert!(store.insert_component(e, PlayerController).is_err());
    }

    #[test]
    fn remove_absent_component_is_noop() {
        let mut store = EntityStore::new();
        let e = store.spawn(EntityKind::Snake, segment(0, 0));
        assert!(store.remove_component::<AiFollow>(e).is_none());
        assert!(store.remove_component::<PhysicsBody>(e).is_some());
        assert!(!store.has_component::<PhysicsBody>(e));
    }

    #[test]
    fn get_component_mut_writes_through() {
        let mut store = EntityStore::new();
        let e = store.spawn(EntityKind::Snake, segment(0, 0));
        if let Some(body) = store.get_component_mut::<PhysicsBody>(e) {
            body.set_direction(0, 1);
        }
        assert_eq!(store.get_component::<PhysicsBody>(e).unwrap().direction(), (0, 1));
    }

    #[test]
    fn order_survives_despawn_in_the_middle() {
        let mut store = EntityStore::new();
        let a = store.spawn(EntityKind::Snake, segment(0, 0));
        let b = store.spawn(EntityKind::Food, segment(20, 0));
        let c = store.spawn(EntityKind::Wall, segment(40, 0));
        store.despawn(b).unwrap();
        assert_eq!(store.order(), &[a, c]);
    }

    #[test]
    fn entities_of_kind_filters() {
        let mut store = EntityStore::new();
        store.spawn(EntityKind::Wall, segment(0, 0));
        let food = store.spawn(EntityKind::Food, segment(20, 0));
        store.spawn(EntityKind::Wall, segment(40, 0));
        assert_eq!(store.entities_of_kind(EntityKind::Food).collect::<Vec<_>>(), vec![food]);
        assert_eq!(store.count_kind(EntityKind::Wall), 2);
        assert_eq!(store.count_kind(EntityKind::Snake), 0);
    }

    #[test]
    fn clear_stales_every_handle() {
        let mut store = EntityStore::new();
        let ids: Vec<_> = (0..4)
            .map(|i| store.spawn(EntityKind::Wall, segment(i * 20, 0)))
            .collect();
        store.clear();
        assert_eq!(store.entity_count(), 0);
        assert!(ids.iter().all(|id| !store.is_alive(*id)));
    }
}
