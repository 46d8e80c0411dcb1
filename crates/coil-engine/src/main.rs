use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use coil_engine::prelude::*;
use serde::Serialize;

#[derive(Parser, Debug)]
#[command(name = "coil", version, about = "Grid snake on a tiny ECS")]
struct Cli {
    /// Board width in pixels.
    #[arg(long)]
    width: Option<i32>,
    /// Board height in pixels.
    #[arg(long)]
    height: Option<i32>,
    /// Simulation ticks per second.
    #[arg(long)]
    tickrate: Option<u32>,
    /// Edge length of a grid cell in pixels.
    #[arg(long)]
    cell_size: Option<i32>,
    /// Seed for food placement. Random when omitted.
    #[arg(long)]
    seed: Option<u64>,
    /// JSON config file; flags override its fields.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Run without a window and print a JSON summary.
    #[arg(long)]
    headless: bool,
    /// Ticks to simulate in headless mode.
    #[arg(long, default_value_t = 200)]
    ticks: u64,
}

impl Cli {
    fn game_config(&self) -> Result<GameConfig> {
        let mut config = match &self.config {
            Some(path) => GameConfig::from_json_file(path)?,
            None => GameConfig::default(),
        };
        if let Some(width) = self.width {
            config.width = width;
        }
        if let Some(height) = self.height {
            config.height = height;
        }
        if let Some(tickrate) = self.tickrate {
            config.tickrate = tickrate;
        }
        if let Some(cell_size) = self.cell_size {
            config.cell_size = cell_size;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        Ok(config)
    }
}

#[derive(Serialize)]
struct Summary {
    score: u32,
    status: GameStatus,
    ticks: u64,
    state_hash: String,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let config = cli.game_config()?;
    tracing::debug!(?config, "starting");
    let game = Game::new(config.clone()).context("invalid game configuration")?;

    if cli.headless {
        run_headless(game, cli.ticks)
    } else {
        run_window(game, &config)
    }
}

fn run_headless(mut game: Game, ticks: u64) -> Result<()> {
    for _ in 0..ticks {
        if game.world().is_over() {
            break;
        }
        game.tick()?;
    }
    let world = game.world();
    let summary = Summary {
        score: world.state().score,
        status: world.state().status,
        ticks: game.tick_count(),
        state_hash: world.state_hash()?,
    };
    println!("{}", serde_json::to_string(&summary)?);
    Ok(())
}

#[cfg(feature = "renderer")]
fn run_window(game: Game, config: &GameConfig) -> Result<()> {
    let width = u32::try_from(config.width).context("width out of range")?;
    let height = u32::try_from(config.height).context("height out of range")?;
    coil_engine::render::run_windowed(game, "coil", width, height)
}

#[cfg(not(feature = "renderer"))]
fn run_window(_game: Game, _config: &GameConfig) -> Result<()> {
    anyhow::bail!("built without the `renderer` feature; rerun with --headless")
}
