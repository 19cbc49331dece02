use std::{ops::ControlFlow, path::PathBuf, time::Duration};

use anyhow::Context;
use cgmath::Point2;
use clap::Parser;
use orrery::{BodyRef, Preset, ScenarioConfig, Session, SessionConfig, run_headless};

#[derive(Parser, Debug)]
#[command(about = "Run a gravity scenario headless and log where everything goes")]
struct Args {
    /// Scenario file (YAML). Overrides --preset.
    #[arg(short, long)]
    scenario: Option<PathBuf>,

    #[arg(short, long, value_enum, default_value_t = Preset::Classic)]
    preset: Preset,

    /// Wall-clock seconds to run for
    #[arg(long, default_value_t = 5.0)]
    seconds: f64,

    /// Speed changes to apply up front; negative values slow down
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    speed: i32,

    /// Index of a body for the camera to follow
    #[arg(long)]
    track: Option<usize>,

    /// Log positions every this many frames
    #[arg(long, default_value_t = 60)]
    log_every: u64,
}

fn build_session(args: &Args) -> anyhow::Result<Session> {
    let session = match &args.scenario {
        Some(path) => {
            let scenario = ScenarioConfig::load(path)?;
            Session::from_scenario(&scenario)
                .with_context(|| format!("invalid scenario {}", path.display()))?
        }
        None => {
            let config = SessionConfig::default();
            let bodies = args.preset.bodies(config.gravitational_constant)?;
            Session::with_config(config, bodies)?
        }
    };
    Ok(session)
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mut session = build_session(&args)?;
    for _ in 0..args.speed.unsigned_abs() {
        if args.speed > 0 {
            session.speed_up();
        } else {
            session.slow_down();
        }
    }
    if let Some(idx) = args.track {
        session.track(BodyRef::new(idx));
    }

    let initial = session.diagnostics();
    let viewport_center = Point2::new(600.0, 400.0);
    let limit = Duration::try_from_secs_f64(args.seconds.max(0.0))
        .context("--seconds out of range")?;
    let log_every = args.log_every.max(1);

    session.resume();
    let mut frame_no = 0u64;
    let stats = run_headless(&mut session, viewport_center, limit, |session, frame| {
        frame_no += 1;
        if frame_no % log_every == 0 {
            log::info!("t = {}", session.elapsed());
            for rendered in frame {
                if let Some(body) = session.body(rendered.body) {
                    log::info!(
                        "  {:>12} at ({:.4}, {:.4}) AU, screen ({:.1}, {:.1})",
                        body.name,
                        body.pos.x,
                        body.pos.y,
                        rendered.display_pos.x,
                        rendered.display_pos.y
                    );
                }
            }
        }
        ControlFlow::Continue(())
    })?;

    let last = session.diagnostics();
    log::info!(
        "{} ticks, {} steps, {} frames, simulated {}",
        stats.ticks,
        stats.steps,
        stats.frames,
        session.elapsed()
    );
    log::info!(
        "energy drift {:.3e}, angular momentum {:.6} -> {:.6}",
        last.energy_drift(&initial),
        initial.angular_momentum,
        last.angular_momentum
    );
    Ok(())
}
