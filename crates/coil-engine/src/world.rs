//! The game world: entity store, grid, snake, score and the seeded RNG.
//!
//! [`World::reset`] builds a fresh board (perimeter walls, the snake in the
//! centre, one food). [`World::defeat`] tears it down and flips the status
//! to `GameOver`. Both run between system passes, never inside one.

use coil_ecs::prelude::*;
use rand::SeedableRng;
use rand_pcg::Pcg64;
use serde::Serialize;

use crate::archetype;
use crate::config::GameConfig;
use crate::grid::Grid;
use crate::snake::Snake;
use crate::state::{GameState, GameStatus};
use crate::systems::collision::Contact;
use crate::systems::{food_spawn, grid_object, SystemContext};
use crate::GameError;

pub struct World {
    config: GameConfig,
    store: EntityStore,
    grid: Grid,
    snake: Snake,
    state: GameState,
    rng: Pcg64,
}

impl World {
    /// Validate `config` and build the first board.
    pub fn new(config: GameConfig) -> Result<Self, GameError> {
        config.validate()?;
        let rng = match config.seed {
            Some(seed) => Pcg64::seed_from_u64(seed),
            None => Pcg64::from_entropy(),
        };
        let grid = Grid::new(0, 0, config.width, config.height, config.cell_size)?;
        let mut world = Self {
            config,
            store: EntityStore::new(),
            grid,
            snake: Snake::default(),
            state: GameState::default(),
            rng,
        };
        world.reset()?;
        Ok(world)
    }

    // -- lifecycle ----------------------------------------------------------

    /// Start a new game: score 0, walls, snake and one food.
    pub fn reset(&mut self) -> Result<(), GameError> {
        self.store.clear();
        self.snake.clear();
        self.state.reset();

        self.spawn_walls()?;
        self.snake = Snake::spawn(
            &mut self.store,
            &self.grid,
            self.config.start_cell(),
            self.config.initial_length,
        )?;
        grid_object::rebuild(&self.store, &mut self.grid)?;

        if let Some((cx, cy)) = food_spawn::pick_food_cell(&self.grid, &mut self.rng) {
            let (x, y) = self.grid.cell_position(cx, cy);
            let food = self
                .store
                .spawn(EntityKind::Food, archetype::food(x, y, self.grid.cell_size())?);
            self.grid.add(cx, cy, food)?;
        }

        tracing::info!(
            entities = self.store.entity_count(),
            snake_len = self.snake.len(),
            "world reset"
        );
        Ok(())
    }

    /// End the game: every entity goes, status becomes `GameOver`.
    pub fn defeat(&mut self) {
        self.store.clear();
        self.snake.clear();
        self.grid.clear_all();
        self.state.status = GameStatus::GameOver;
        tracing::info!(score = self.state.score, "game over");
    }

    fn spawn_walls(&mut self) -> Result<(), GameError> {
        let (cols, rows) = (self.grid.columns(), self.grid.rows());
        let size = self.grid.cell_size();
        let top_bottom = (0..cols).flat_map(|cx| [(cx, 0), (cx, rows - 1)]);
        let sides = (1..rows - 1).flat_map(|cy| [(0, cy), (cols - 1, cy)]);
        for (cx, cy) in top_bottom.chain(sides) {
            let (x, y) = self.grid.cell_position(cx, cy);
            self.store.spawn(EntityKind::Wall, archetype::wall(x, y, size)?);
        }
        Ok(())
    }

    // -- game objects -------------------------------------------------------

    pub fn add_game_object(&mut self, kind: EntityKind, bundle: ComponentBundle) -> EntityId {
        self.store.spawn(kind, bundle)
    }

    /// Despawn `entity`. `false` if it was already gone.
    pub fn remove_game_object(&mut self, entity: EntityId) -> bool {
        self.store.despawn(entity).is_ok()
    }

    /// Live entities in spawn order.
    pub fn get_game_objects(&self) -> &[EntityId] {
        self.store.order()
    }

    /// Grow the snake by one segment and bump the score.
    pub(crate) fn grow(&mut self) -> Result<(), GameError> {
        if self.snake.append(&mut self.store)?.is_some() {
            self.state.score += 1;
        }
        Ok(())
    }

    // -- accessors ----------------------------------------------------------

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn store(&self) -> &EntityStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut EntityStore {
        &mut self.store
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn snake(&self) -> &Snake {
        &self.snake
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn is_over(&self) -> bool {
        self.state.is_over()
    }

    /// Borrow the pieces a tick system works on.
    pub fn system_context<'a>(&'a mut self, contacts: &'a mut Vec<Contact>) -> SystemContext<'a> {
        SystemContext {
            store: &self.store,
            grid: &mut self.grid,
            rng: &mut self.rng,
            overlap: self.config.overlap,
            contacts,
        }
    }

    /// blake3 digest of the score, status, snake and every entity's
    /// components in spawn order. Equal seeds and inputs give equal hashes.
    pub fn state_hash(&self) -> Result<String, GameError> {
        let view = HashedWorld {
            state: &self.state,
            snake: self.snake.segments().iter().map(|e| e.to_raw()).collect(),
            entities: self
                .store
                .order()
                .iter()
                .filter_map(|&id| {
                    Some(HashedEntity {
                        id: id.to_raw(),
                        kind: self.store.kind_of(id)?,
                        components: self.store.table(id)?,
                    })
                })
                .collect(),
        };
        let mut hasher = blake3::Hasher::new();
        serde_json::to_writer(&mut hasher, &view)?;
        Ok(hasher.finalize().to_hex().to_string())
    }
}

#[derive(Serialize)]
struct HashedWorld<'a> {
    state: &'a GameState,
    snake: Vec<u64>,
    entities: Vec<HashedEntity<'a>>,
}

#[derive(Serialize)]
struct HashedEntity<'a> {
    id: u64,
    kind: EntityKind,
    components: &'a ComponentTable,
}
