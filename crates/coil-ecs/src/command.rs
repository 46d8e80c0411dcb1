//! Deferred store mutations.
//!
//! Systems that iterate the [`EntityStore`] cannot mutate it in place, so they
//! queue [`Command`]s in a [`CommandBuffer`]. The buffer is applied in strict
//! insertion order (FIFO) once the issuing pass ends. Commands whose target has
//! gone stale in the meantime are skipped and counted as failures, never
//! treated as errors.
//!
//! ```
//! use coil_ecs::prelude::*;
//!
//! let mut store = EntityStore::new();
//! let food = store.spawn(EntityKind::Food, ComponentBundle::new());
//! store.despawn(food).unwrap();
//!
//! let mut cmds = CommandBuffer::new();
//! cmds.insert(food, PlayerController, "keyboard");
//! cmds.spawn(EntityKind::Food, ComponentBundle::new(), "food_spawn");
//!
//! let applied = cmds.apply(&mut store);
//! assert!(!applied[0].applied_successfully);
//! assert!(applied[1].applied_successfully);
//! assert_eq!(cmds.last_apply_report().failed_count, 1);
//! ```

use tracing::warn;

use crate::component::{Component, EntityKind};
use crate::entity::EntityId;
use crate::store::{ComponentBundle, EntityStore};
use crate::EcsError;

// ---------------------------------------------------------------------------
// CommandKind
// ---------------------------------------------------------------------------

/// What mutation to perform.
#[derive(Debug, Clone)]
pub enum CommandKind {
    /// Insert or overwrite a component.
    Insert(Component),
    /// Spawn a new entity. The id is known only after application.
    Spawn {
        kind: EntityKind,
        bundle: ComponentBundle,
    },
}

// ---------------------------------------------------------------------------
// Command
// ---------------------------------------------------------------------------

/// A single deferred mutation.
#[derive(Debug, Clone)]
pub struct Command {
    /// Target entity. `None` for spawns.
    pub target: Option<EntityId>,
    pub kind: CommandKind,
    /// Name of the system that queued the command.
    pub issued_by: &'static str,
    /// Position within the buffer, assigned on insertion.
    pub command_index: u32,
    /// For spawns: the id created on application.
    pub spawned_entity: Option<EntityId>,
    /// `false` until applied; stays `false` when the target was stale.
    pub applied_successfully: bool,
}

// ---------------------------------------------------------------------------
// ApplyReport
// ---------------------------------------------------------------------------

/// Summary of the last [`CommandBuffer::apply`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplyReport {
    pub failed_count: usize,
    pub success_count: usize,
}

// ---------------------------------------------------------------------------
// CommandBuffer
// ---------------------------------------------------------------------------

/// Queue of deferred mutations applied in FIFO order.
#[derive(Debug, Default)]
pub struct CommandBuffer {
    commands: Vec<Command>,
    next_index: u32,
    last_apply_report: ApplyReport,
}

impl CommandBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an insert-or-overwrite.
    pub fn insert(
        &mut self,
        target: EntityId,
        component: impl Into<Component>,
        issued_by: &'static str,
    ) {
        self.push(Some(target), CommandKind::Insert(component.into()), issued_by);
    }

    pub fn spawn(&mut self, kind: EntityKind, bundle: ComponentBundle, issued_by: &'static str) {
        self.push(None, CommandKind::Spawn { kind, bundle }, issued_by);
    }

    /// Pending commands in application order.
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn last_apply_report(&self) -> ApplyReport {
        self.last_apply_report
    }

    /// Drop pending commands without applying them.
    pub fn clear(&mut self) {
        self.commands.clear();
        self.next_index = 0;
    }

    /// Apply every pending command in FIFO order and return them with their
    /// outcome filled in. The buffer is empty afterwards.
    pub fn apply(&mut self, store: &mut EntityStore) -> Vec<Command> {
        let mut commands = std::mem::take(&mut self.commands);
        self.next_index = 0;

        let mut success_count = 0;
        let mut failed_count = 0;
        for cmd in &mut commands {
            match apply_one(store, cmd) {
                Ok(()) => {
                    cmd.applied_successfully = true;
                    success_count += 1;
                }
                Err(err) => {
                    warn!(
                        command_index = cmd.command_index,
                        issued_by = cmd.issued_by,
                        error = %err,
                        "command skipped"
                    );
                    failed_count += 1;
                }
            }
        }

        self.last_apply_report = ApplyReport {
            failed_count,
            success_count,
        };
        commands
    }

    fn push(&mut self, target: Option<EntityId>, kind: CommandKind, issued_by: &'static str) {
        let command_index = self.next_index;
        self.next_index += 1;
        self.commands.push(Command {
            target,
            kind,
            issued_by,
            command_index,
            spawned_entity: None,
            applied_successfully: false,
        });
    }
}

fn apply_one(store: &mut EntityStore, cmd: &mut Command) -> Result<(), EcsError> {
    match (&cmd.kind, cmd.target) {
        (CommandKind::Spawn { kind, bundle }, _) => {
            cmd.spawned_entity = Some(store.spawn(*kind, bundle.clone()));
            Ok(())
        }
        (CommandKind::Insert(component), Some(target)) => {
            store.insert_component(target, component.clone())
        }
        // Inserts are always queued with a target.
        (CommandKind::Insert(_), None) => Ok(()),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
