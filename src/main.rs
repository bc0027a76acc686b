/// Entry point and frame loop.

mod config;
mod domain;
mod sim;
mod ui;

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::{Duration, Instant};

use clap::Parser;

use config::GameConfig;
use sim::event::GameEvent;
use sim::level::load_level;
use sim::step;
use sim::world::World;
use ui::input::InputState;
use ui::renderer::Renderer;

/// Longest frame fed to the simulation. A stalled terminal must not turn
/// into one huge displacement.
const MAX_FRAME_MS: f32 = 100.0;

#[derive(Parser, Debug)]
#[command(name = "tilefield")]
#[command(about = "Walk a tile world in the terminal")]
struct Cli {
    /// Level file to open instead of the configured one
    #[arg(long)]
    level: Option<PathBuf>,
    /// Start with the collision-box overlay on
    #[arg(long)]
    boxes: bool,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let mut config = GameConfig::load();
    if let Some(level) = cli.level {
        config.level = level;
    }
    if cli.boxes {
        config.debug.collision_boxes = true;
    }

    // Load before touching the terminal so errors print normally
    let data = match load_level(&config.level) {
        Ok(data) => data,
        Err(e) => {
            eprintln!("tilefield: {e}");
            return ExitCode::FAILURE;
        }
    };
    let mut world = World::new(data, &config);

    let mut renderer = Renderer::new();
    if let Err(e) = renderer.init() {
        eprintln!("Terminal init failed: {e}");
        return ExitCode::FAILURE;
    }
    let mut input = InputState::new();
    input.enable_release_events();

    let result = game_loop(&mut world, &mut renderer, &mut input, &config);

    if let Err(e) = input.restore_terminal() {
        eprintln!("Keyboard mode restore failed: {e}");
    }
    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    match result {
        Ok(()) => {
            log::info!("quit after {} ticks", world.tick);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("tilefield: {e}");
            ExitCode::FAILURE
        }
    }
}

fn game_loop(
    world: &mut World,
    renderer: &mut Renderer,
    input: &mut InputState,
    config: &GameConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let frame = Duration::from_millis(config.frame_ms);
    let mut last = Instant::now();

    loop {
        input.drain_events();
        if input.quit_requested() {
            break;
        }

        let now = Instant::now();
        let elapsed_ms = (now.duration_since(last).as_secs_f32() * 1000.0).min(MAX_FRAME_MS);
        last = now;

        let events = step::step(world, &input.frame_input(), elapsed_ms)?;
        report_events(world, &events);

        renderer.render(world)?;

        let spent = now.elapsed();
        if spent < frame {
            std::thread::sleep(frame - spent);
        }
    }

    Ok(())
}

/// Turn step events into status-line messages.
fn report_events(world: &mut World, events: &[GameEvent]) {
    for event in events {
        match event {
            GameEvent::CollisionBoxesToggled(on) => {
                let msg = if *on { "collision boxes on" } else { "collision boxes off" };
                world.set_message(msg, 1500.0);
            }
            GameEvent::ExitReached { next } => {
                log::info!("exit reached; loading {}", next.display());
            }
            GameEvent::LevelLoaded { .. } | GameEvent::Paused | GameEvent::Resumed => {}
        }
    }
}
