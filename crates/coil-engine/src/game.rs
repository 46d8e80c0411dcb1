//! Frame-level driver tying input, the fixed-rate tick and drawing together.
//!
//! Hosts call [`Game::key_down`]/[`Game::key_up`] as events arrive,
//! [`Game::update`] once per frame and [`Game::render`] whenever they want a
//! picture. `update` polls the keyboard every frame and then runs as many
//! ticks as the schedule says are due.

use std::time::Instant;

use coil_ecs::command::CommandBuffer;

use crate::archetype::BACKGROUND_COLOR;
use crate::canvas::Canvas;
use crate::config::GameConfig;
use crate::hud;
use crate::input::{Key, KeyboardInput};
use crate::systems::{keyboard, render};
use crate::tick::{TickLoop, TickSchedule};
use crate::world::World;
use crate::GameError;

pub struct Game {
    tick_loop: TickLoop,
    input: KeyboardInput,
    input_commands: CommandBuffer,
    schedule: TickSchedule,
    quit: bool,
}

impl Game {
    pub fn new(config: GameConfig) -> Result<Self, GameError> {
        let period = config.tick_period();
        let world = World::new(config)?;
        Ok(Self {
            tick_loop: TickLoop::with_game_systems(world),
            input: KeyboardInput::new(),
            input_commands: CommandBuffer::new(),
            schedule: TickSchedule::new(period, Instant::now()),
            quit: false,
        })
    }

    // -- input --------------------------------------------------------------

    /// Handle a key press. `Escape` asks to quit; `R` restarts a lost game.
    pub fn key_down(&mut self, key: Key) -> Result<(), GameError> {
        match key {
            Key::Escape => self.request_quit(),
            Key::R if self.world().is_over() => self.reset()?,
            _ => {}
        }
        self.input.key_down(key);
        Ok(())
    }

    pub fn key_up(&mut self, key: Key) {
        self.input.key_up(key);
    }

    pub fn request_quit(&mut self) {
        if !self.quit {
            tracing::info!(ticks = self.tick_count(), "quit requested");
        }
        self.quit = true;
    }

    pub fn should_quit(&self) -> bool {
        self.quit
    }

    /// Steer the player from the held keys. Applied immediately.
    pub fn poll(&mut self) {
        let world = self.tick_loop.world();
        if world.is_over() {
            return;
        }
        keyboard::steer(world.store(), self.input.held(), &mut self.input_commands);
        self.input_commands
            .apply(self.tick_loop.world_mut().store_mut());
    }

    // -- simulation ---------------------------------------------------------

    /// Run one tick immediately, ignoring the schedule.
    pub fn tick(&mut self) -> Result<(), GameError> {
        self.tick_loop.tick()?;
        Ok(())
    }

    /// One frame: poll input, then run every tick due at `now`. Returns the
    /// number of ticks run.
    pub fn update(&mut self, now: Instant) -> Result<u32, GameError> {
        self.poll();
        let mut ran = 0;
        while !self.quit && self.schedule.due(now) {
            self.tick()?;
            ran += 1;
        }
        Ok(ran)
    }

    /// Start a new game and restart the tick schedule.
    pub fn reset(&mut self) -> Result<(), GameError> {
        self.tick_loop.world_mut().reset()?;
        self.schedule.reset(Instant::now());
        Ok(())
    }

    // -- drawing ------------------------------------------------------------

    /// Draw the board and HUD, then present.
    pub fn render(&self, canvas: &mut dyn Canvas) {
        let world = self.world();
        canvas.clear(BACKGROUND_COLOR);
        render::draw(world.store(), canvas);
        hud::draw(world.state(), world.config(), canvas);
        canvas.present();
    }

    // -- accessors ----------------------------------------------------------

    pub fn world(&self) -> &World {
        self.tick_loop.world()
    }

    pub fn tick_loop(&self) -> &TickLoop {
        &self.tick_loop
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_loop.tick_count()
    }

    pub fn input(&self) -> &KeyboardInput {
        &self.input
    }

    pub fn schedule(&self) -> &TickSchedule {
        &self.schedule
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::{DrawCommand, DrawList};
    use crate::state::GameStatus;
    use coil_ecs::prelude::*;
    use std::time::Duration;

    fn game() -> Game {
        Game::new(GameConfig {
            seed: Some(21),
            ..GameConfig::default()
        })
        .unwrap()
    }

    fn head_direction(game: &Game) -> (i32, i32) {
        let head = game.world().snake().head().unwrap();
        game.world()
            .store()
            .get_component::<PhysicsBody>(head)
            .unwrap()
            .direction()
    }

    #[test]
    fn held_key_steers_on_poll() {
        let mut game = game();
        game.key_down(Key::Up).unwrap();
        game.poll();
        assert_eq!(head_direction(&game), (0, -1));
        assert_eq!(game.tick_count(), 0, "polling never ticks");
    }

    #[test]
    fn update_ticks_per_elapsed_period() {
        let mut game = game();
        let first = game.schedule().next_deadline();
        let period = game.schedule().period();
        // Anything before the first deadline does not tick.
        let ran_early = game.update(first - Duration::from_millis(1)).unwrap();
        let ran = game.update(first + period * 2).unwrap();
        assert_eq!(ran_early, 0);
        assert_eq!(ran, 3);
        assert_eq!(game.tick_count(), 3);
    }

    #[test]
    fn escape_quits_and_stops_ticking() {
        let mut game = game();
        game.key_down(Key::Escape).unwrap();
        assert!(game.should_quit());
        let ran = game
            .update(Instant::now() + Duration::from_secs(10))
            .unwrap();
        assert_eq!(ran, 0);
    }

    #[test]
    fn retry_only_after_defeat() {
        let mut game = game();
        game.tick().unwrap();
        game.key_down(Key::R).unwrap();
        assert_eq!(game.world().state().status, GameStatus::InGame);
        assert_eq!(game.tick_count(), 1);

        game.tick_loop.world_mut().defeat();
        game.key_down(Key::R).unwrap();
        assert_eq!(game.world().state().status, GameStatus::InGame);
        assert!(!game.world().get_game_objects().is_empty());
    }

    #[test]
    fn render_presents_background_then_sprites() {
        let game = game();
        let mut list = DrawList::new();
        game.render(&mut list);
        assert_eq!(list.frames_presented(), 1);
        assert_eq!(list.frame()[0], DrawCommand::Clear(BACKGROUND_COLOR));
        let circles = list
            .frame()
            .iter()
            .filter(|c| matches!(c, DrawCommand::Circle { .. }))
            .count();
        assert_eq!(circles, 1);
    }
}
