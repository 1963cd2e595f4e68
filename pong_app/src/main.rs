//! Pong demo application
//!
//! Runs a headless game of Pong for a fixed number of frames: two bats driven
//! by scripted key presses, a ball, and two walls. Statistics are logged
//! through the engine's observers.

mod entities;
mod game;

use engine2d::foundation::logging;
use engine2d::prelude::*;

use crate::game::PongGame;

const CONFIG_PATH: &str = "pong.toml";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut config = EngineConfig::load_or_default(CONFIG_PATH)?;
    if config.game_loop.max_frames.is_none() {
        config.game_loop.max_frames = Some(900);
    }

    // Initialize logging
    logging::init_with_level(&config.log_level);
    log::info!("Starting {}", config.title);

    let mut game = PongGame::new();
    let frames = Engine::run(config, &mut game)?;

    let score = game.score();
    println!("{frames} frames played, final score {} - {}", score.left, score.right);
    Ok(())
}
