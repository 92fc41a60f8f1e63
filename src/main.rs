use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, info, warn};
use std::path::PathBuf;
use std::sync::mpsc::TryRecvError;
use std::time::{Duration, Instant};

use softbody_sandbox::engine::game_loop::GameLoop;
use softbody_sandbox::engine::input::{spawn_stdin_reader, EventBuffer, InputEvent};
use softbody_sandbox::engine::physics::DebugGeometry;
use softbody_sandbox::game::{Sandbox, SimulationConfig};

/// How often frame statistics are logged
const STATS_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// TOML config file; defaults are used for anything it leaves out
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    // Initialize logger
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let args = Cli::parse();

    info!("Starting soft body sandbox...");

    let config = match &args.config {
        Some(path) => SimulationConfig::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => {
            info!("No config file given, using defaults");
            SimulationConfig::default()
        }
    };

    let mut sandbox = Sandbox::new(&config).context("Failed to build sandbox")?;
    let mut game_loop = GameLoop::new(config.fps);
    let mut events = EventBuffer::new();
    let mut debug_geometry = DebugGeometry::new();
    let (input, _reader) = spawn_stdin_reader().context("Failed to start input reader")?;

    info!("Commands: `spawn <x> <y>` drops a ball, `quit` exits");

    let mut last_stats = Instant::now();

    while sandbox.is_running() {
        // Collect everything the reader sent since the last frame
        loop {
            match input.try_recv() {
                Ok(event) => events.push(event),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    events.push(InputEvent::Quit);
                    break;
                }
            }
        }

        for event in events.drain() {
            if let Err(e) = sandbox.handle_event(event) {
                warn!("Ignoring {:?}: {}", event, e);
            }
        }
        if !sandbox.is_running() {
            break;
        }

        let updates = game_loop.begin_frame();
        for _ in 0..updates {
            sandbox.step().context("Physics step failed")?;
        }

        if updates > 0 {
            // Hand-off point for a renderer: instance data plus debug outlines
            let snapshot = sandbox.world().render_snapshot();
            debug_geometry.rebuild(sandbox.world());

            if last_stats.elapsed() >= STATS_INTERVAL {
                last_stats = Instant::now();
                debug!(
                    "fps {:.1}, {} updates, {} shapes ({} bytes), {} debug vertices ({} + {} bytes), {} contact events",
                    game_loop.fps(),
                    game_loop.update_count(),
                    snapshot.len(),
                    std::mem::size_of_val(snapshot.as_slice()),
                    debug_geometry.vertices().len(),
                    debug_geometry.vertex_bytes().len(),
                    debug_geometry.index_bytes().len(),
                    sandbox.world().collision_events().len()
                );
                if sandbox.world().degenerate_spring_count() > 0 {
                    debug!(
                        "{} zero-length springs skipped",
                        sandbox.world().degenerate_spring_count()
                    );
                }
                if let Some(centroid) = sandbox.soft_body().centroid(sandbox.world()) {
                    debug!("Soft body centroid at ({:.1}, {:.1})", centroid.x, centroid.y);
                }
            }
        }

        std::thread::sleep(game_loop.time_until_next_update());
    }

    info!(
        "Stopped after {} updates ({:.1}s, {} dropped frames, {} dropped input events)",
        game_loop.update_count(),
        game_loop.elapsed().as_secs_f32(),
        game_loop.dropped_frames(),
        events.dropped()
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_config_path() {
        let cli = Cli::try_parse_from(["softbody-sandbox", "--config", "sandbox.toml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("sandbox.toml")));

        let cli = Cli::try_parse_from(["softbody-sandbox", "-c", "other.toml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("other.toml")));

        assert!(Cli::try_parse_from(["softbody-sandbox"]).unwrap().config.is_none());
        assert!(Cli::try_parse_from(["softbody-sandbox", "--bogus"]).is_err());
    }
}
