//! Property tests for the entity store.
//!
//! Random sequences of store operations are checked against a shadow list of
//! live ids after every step.

use coil_ecs::prelude::*;
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum StoreOp {
    Spawn(i32, i32),
    SpawnMoving(i32, i32, i32, i32),
    Despawn(usize),
    InsertBody(usize, i32, i32),
    RemoveBody(usize),
    QueryTransform,
    QueryMoving,
}

fn coord() -> impl Strategy<Value = i32> {
    -500i32..500
}

fn store_op_strategy() -> impl Strategy<Value = StoreOp> {
    prop_oneof![
        (coord(), coord()).prop_map(|(x, y)| StoreOp::Spawn(x, y)),
        (coord(), coord(), -1i32..=1, -1i32..=1)
            .prop_map(|(x, y, dx, dy)| StoreOp::SpawnMoving(x, y, dx, dy)),
        (0..100usize).prop_map(StoreOp::Despawn),
        (0..100usize, -3i32..=3, -3i32..=3).prop_map(|(i, dx, dy)| StoreOp::InsertBody(i, dx, dy)),
        (0..100usize).prop_map(StoreOp::RemoveBody),
        Just(StoreOp::QueryTransform),
        Just(StoreOp::QueryMoving),
    ]
}

fn cell(x: i32, y: i32) -> Transform {
    Transform::square(x, y, 20).unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(2_000))]

    #[test]
    fn random_ops_preserve_invariants(ops in prop::collection::vec(store_op_strategy(), 1..60)) {
        let mut store = EntityStore::new();
        let mut alive: Vec<EntityId> = Vec::new();
        let mut dead: Vec<EntityId> = Vec::new();

        for op in ops {
            match op {
                StoreOp::Spawn(x, y) => {
                    alive.push(store.spawn(EntityKind::Wall, ComponentBundle::new().with(cell(x, y))));
                }
                StoreOp::SpawnMoving(x, y, dx, dy) => {
                    let bundle = ComponentBundle::new()
                        .with(cell(x, y))
                        .with(PhysicsBody::new().with_direction(dx, dy));
                    alive.push(store.spawn(EntityKind::Snake, bundle));
                }
                StoreOp::Despawn(idx) => {
                    if !alive.is_empty() {
                        let e = alive.remove(idx % alive.len());
                        prop_assert!(store.despawn(e).is_ok());
                        dead.push(e);
                    }
                }
                StoreOp::InsertBody(idx, dx, dy) => {
                    if !alive.is_empty() {
                        let e = alive[idx % alive.len()];
                        prop_assert!(store
                            .insert_component(e, PhysicsBody::new().with_direction(dx, dy))
                            .is_ok());
                        let (x, y) = store.get_component::<PhysicsBody>(e).unwrap().direction();
                        prop_assert!((-1..=1).contains(&x) && (-1..=1).contains(&y));
                    }
                }
                StoreOp::RemoveBody(idx) => {
                    if !alive.is_empty() {
                        let e = alive[idx % alive.len()];
                        let _ = store.remove_component::<PhysicsBody>(e);
                        prop_assert!(!store.has_component::<PhysicsBody>(e));
                    }
                }
                StoreOp::QueryTransform => {
                    // Every live entity here carries a Transform.
                    prop_assert_eq!(store.query::<(&Transform,)>().count(), alive.len());
                }
                StoreOp::QueryMoving => {
                    let count = store.query::<(&Transform, &PhysicsBody)>().count();
                    prop_assert!(count <= alive.len());
                }
            }

            prop_assert_eq!(store.entity_count(), alive.len());
            for &e in &alive {
                prop_assert!(store.is_alive(e));
            }
            for &e in &dead {
                prop_assert!(!store.is_alive(e));
                prop_assert!(store.get_component::<Transform>(e).is_none());
            }
        }
    }

    /// Iteration order is spawn order minus whatever was despawned.
    #[test]
    fn query_order_is_spawn_order(
        n in 1usize..40,
        kill in prop::collection::vec(any::<bool>(), 40),
    ) {
        let mut store = EntityStore::new();
        let ids: Vec<EntityId> = (0..n)
            .map(|i| store.spawn(EntityKind::Wall, ComponentBundle::new().with(cell(i as i32 * 20, 0))))
            .collect();
        let mut expected = Vec::new();
        for (i, id) in ids.iter().enumerate() {
            if kill[i] {
                store.despawn(*id).unwrap();
            } else {
                expected.push(*id);
            }
        }
        let seen: Vec<EntityId> = store.query::<(&Transform,)>().map(|(id, _)| id).collect();
        prop_assert_eq!(seen, expected);
    }

    /// FIFO application: the last queued write to a slot wins.
    #[test]
    fn last_queued_write_wins(xs in prop::collection::vec(coord(), 1..20)) {
        let mut store = EntityStore::new();
        let e = store.spawn(EntityKind::Snake, ComponentBundle::new().with(cell(0, 0)));
        let mut cmds = CommandBuffer::new();
        for &x in &xs {
            cmds.insert(e, cell(x, 0), "prop");
        }
        let applied = cmds.apply(&mut store);
        prop_assert!(applied.iter().all(|c| c.applied_successfully));
        prop_assert_eq!(store.get_component::<Transform>(e).unwrap().x, *xs.last().unwrap());
        let report = cmds.last_apply_report();
        prop_assert_eq!(report.success_count, xs.len());
        prop_assert_eq!(report.failed_count, 0);
    }
}
