use std::{
    ops::ControlFlow,
    thread,
    time::{Duration, Instant},
};

use cgmath::Point2;

use crate::session::{RenderedBody, Session};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LoopStats {
    pub ticks: u64,
    pub steps: u64,
    pub frames: u64,
}

/// Drives a session from the calling thread until `limit` has passed or
/// `on_frame` breaks.
///
/// Physics ticks follow the delay each `advance_tick` asks for; render syncs
/// follow the session's display interval. Whichever deadline comes first runs
/// first, so the two never interleave within a call.
pub fn run_headless<F>(
    session: &mut Session,
    viewport_center: Point2<f64>,
    limit: Duration,
    mut on_frame: F,
) -> anyhow::Result<LoopStats>
where
    F: FnMut(&mut Session, &[RenderedBody]) -> ControlFlow<()>,
{
    let frame_interval =
        Duration::from_secs_f64(session.time_controller().display_interval() / 1000.0);
    let start = Instant::now();
    let deadline = start + limit;
    let mut next_tick = start;
    let mut next_frame = start;
    let mut stats = LoopStats::default();

    loop {
        let now = Instant::now();
        if now >= deadline {
            break;
        }

        if now >= next_tick {
            let report = session.advance_tick()?;
            stats.ticks += 1;
            stats.steps += report.steps as u64;
            next_tick = now + report.next_tick;
        }

        if now >= next_frame {
            let frame = session.render_sync(viewport_center);
            stats.frames += 1;
            if on_frame(&mut *session, frame.as_slice()).is_break() {
                break;
            }
            next_frame += frame_interval;
            if next_frame < now {
                // Fell behind; drop the missed frames instead of bursting.
                next_frame = now + frame_interval;
            }
        }

        let wake = next_tick.min(next_frame).min(deadline);
        let now = Instant::now();
        if wake > now {
            thread::sleep(wake - now);
        }
    }

    log::debug!(
        "headless loop stopped after {:?}: {} ticks, {} steps, {} frames",
        start.elapsed(),
        stats.ticks,
        stats.steps,
        stats.frames
    );
    Ok(stats)
}
