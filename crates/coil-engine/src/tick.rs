//! Fixed-rate tick loop.
//!
//! The [`TickLoop`] drives the [`World`] forward. Each tick:
//!
//! 1. Every registered system runs in registration order. A system reads the
//!    store through a [`SystemContext`] and queues entity changes in the
//!    shared [`CommandBuffer`], which is applied (FIFO) as soon as that
//!    system returns, so the next system sees its writes.
//! 2. The contacts gathered by the collision pass go to the
//!    [`EventSystem`].
//! 3. The tick counter advances.
//!
//! A world in `GameOver` is frozen: ticks are no-ops until it is reset.
//!
//! [`TickSchedule`] decides *when* to tick. Its deadline advances by exactly
//! one period per fired tick, so a late frame catches up instead of drifting.
//!
//! # Example
//!
//! ```
//! use coil_engine::prelude::*;
//!
//! let world = World::new(GameConfig { seed: Some(1), ..Default::default() }).unwrap();
//! let mut tick_loop = TickLoop::new(world);
//! tick_loop.add_system("noop", |_ctx, _cmds| Ok(()));
//!
//! tick_loop.run_ticks(3).unwrap();
//! assert_eq!(tick_loop.tick_count(), 3);
//! assert_eq!(tick_loop.system_names(), vec!["noop"]);
//! ```

use std::time::{Duration, Instant};

use coil_ecs::command::{Command, CommandBuffer};

use crate::events::EventSystem;
use crate::systems::collision::Contact;
use crate::systems::{self, SystemContext};
use crate::world::World;
use crate::GameError;

// ---------------------------------------------------------------------------
// TickDiagnostics
// ---------------------------------------------------------------------------

/// Timing diagnostics for the last tick.
#[derive(Debug, Clone, Default)]
pub struct TickDiagnostics {
    /// Wall-clock time per system, in execution order.
    pub system_times: Vec<(String, Duration)>,
    /// Systems, command application and event dispatch together.
    pub total_time: Duration,
    /// Time spent applying command buffers, summed over all systems.
    pub command_apply_time: Duration,
    /// Contacts handed to the event pass.
    pub contact_count: usize,
    /// Queued commands skipped because their target was already gone.
    pub failed_commands: usize,
}

// ---------------------------------------------------------------------------
// SystemFn
// ---------------------------------------------------------------------------

/// A tick system.
///
/// Entity changes go through the command buffer. Grid, RNG and contacts are
/// reached through the context. An error aborts the tick.
pub type SystemFn = fn(&mut SystemContext<'_>, &mut CommandBuffer) -> Result<(), GameError>;

#[derive(Debug)]
struct RegisteredSystem {
    name: String,
    func: SystemFn,
}

// ---------------------------------------------------------------------------
// TickLoop
// ---------------------------------------------------------------------------

pub struct TickLoop {
    world: World,
    command_buffer: CommandBuffer,
    systems: Vec<RegisteredSystem>,
    contacts: Vec<Contact>,
    tick_counter: u64,
    last_diagnostics: TickDiagnostics,
}

impl TickLoop {
    /// A loop with no systems registered.
    pub fn new(world: World) -> Self {
        Self {
            world,
            command_buffer: CommandBuffer::new(),
            systems: Vec::new(),
            contacts: Vec::new(),
            tick_counter: 0,
            last_diagnostics: TickDiagnostics::default(),
        }
    }

    /// A loop running the gameplay systems in their standard order.
    pub fn with_game_systems(world: World) -> Self {
        let mut tick_loop = Self::new(world);
        systems::register_tick_systems(&mut tick_loop);
        tick_loop
    }

    /// Register a system after the ones already present.
    ///
    /// # Panics
    ///
    /// Panics if a system with the same name is already registered.
    pub fn add_system(&mut self, name: &str, func: SystemFn) {
        assert!(
            !self.systems.iter().any(|s| s.name == name),
            "duplicate system name: {name:?}"
        );
        self.systems.push(RegisteredSystem {
            name: name.to_owned(),
            func,
        });
    }

    /// Run one tick and return every command applied during it.
    ///
    /// Does nothing while the game is over.
    ///
    /// # Errors
    ///
    /// A system error (out-of-range grid access, invalid bundle) aborts the
    /// tick; commands queued by the failing system are dropped.
    pub fn tick(&mut self) -> Result<Vec<Command>, GameError> {
        if self.world.is_over() {
            return Ok(Vec::new());
        }

        let tick_start = Instant::now();
        let mut system_times = Vec::with_capacity(self.systems.len());
        let mut command_apply_time = Duration::ZERO;
        let mut failed_commands = 0;
        let mut applied = Vec::new();

        for system in &self.systems {
            let sys_start = Instant::now();
            let result = {
                let mut ctx = self.world.system_context(&mut self.contacts);
                (system.func)(&mut ctx, &mut self.command_buffer)
            };
            system_times.push((system.name.clone(), sys_start.elapsed()));
            if let Err(err) = result {
                self.command_buffer.clear();
                self.contacts.clear();
                tracing::error!(system = %system.name, error = %err, "system failed");
                return Err(err);
            }

            let apply_start = Instant::now();
            applied.extend(self.command_buffer.apply(self.world.store_mut()));
            command_apply_time += apply_start.elapsed();
            failed_commands += self.command_buffer.last_apply_report().failed_count;
        }

        let contacts = std::mem::take(&mut self.contacts);
        let contact_count = contacts.len();
        EventSystem::dispatch(&mut self.world, contacts)?;

        self.tick_counter += 1;
        let total_time = tick_start.elapsed();
        if total_time > self.world.config().tick_period() {
            tracing::debug!(
                tick = self.tick_counter,
                elapsed_us = total_time.as_micros() as u64,
                "tick overran its period"
            );
        }
        self.last_diagnostics = TickDiagnostics {
            system_times,
            total_time,
            command_apply_time,
            contact_count,
            failed_commands,
        };

        Ok(applied)
    }

    /// Run `count` ticks, returning the number of commands applied.
    pub fn run_ticks(&mut self, count: u64) -> Result<u64, GameError> {
        let mut total_commands = 0u64;
        for _ in 0..count {
            total_commands += self.tick()?.len() as u64;
        }
        Ok(total_commands)
    }

    // -- accessors ----------------------------------------------------------

    /// Ticks actually executed. Frozen game-over ticks are not counted.
    pub fn tick_count(&self) -> u64 {
        self.tick_counter
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    /// Direct world access for input, reset and setup. Do not call while a
    /// tick is in progress.
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn system_count(&self) -> usize {
        self.systems.len()
    }

    /// Names of the registered systems, in execution order.
    pub fn system_names(&self) -> Vec<&str> {
        self.systems.iter().map(|s| s.name.as_str()).collect()
    }

    pub fn last_diagnostics(&self) -> &TickDiagnostics {
        &self.last_diagnostics
    }
}

// ---------------------------------------------------------------------------
// TickSchedule
// ---------------------------------------------------------------------------

/// Fixed-rate gate for [`TickLoop::tick`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickSchedule {
    period: Duration,
    next_deadline: Instant,
}

impl TickSchedule {
    /// First tick becomes due one period after `now`.
    pub fn new(period: Duration, now: Instant) -> Self {
        Self {
            period,
            next_deadline: now + period,
        }
    }

    /// `true` when a tick is due at `now`. Each `true` advances the deadline
    /// by one period, so calling in a loop yields every missed tick.
    pub fn due(&mut self, now: Instant) -> bool {
        if now >= self.next_deadline {
            self.next_deadline += self.period;
            true
        } else {
            false
        }
    }

    /// Restart the schedule from `now`, forgetting any backlog.
    pub fn reset(&mut self, now: Instant) {
        self.next_deadline = now + self.period;
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn next_deadline(&self) -> Instant {
        self.next_deadline
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
