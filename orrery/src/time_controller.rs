//! Decouples wall-clock tick rate from simulated time.
//!
//! `run_time` is the real time between two integrator calls and `dt` the simulated
//! time each call advances. When `run_time` would grow past the display interval the
//! controller shrinks `dt` instead, so the picture keeps moving every frame. When it
//! drops below the display interval several integrator calls are packed into one tick.

use std::time::Duration;

use crate::{
    constants::MAX_DISPLAY_INTERVAL_MS,
    error::{Result, SimError, ensure_positive},
};

/// Slack for `display_interval / run_time` landing just under an integer.
const STEP_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayState {
    Playing,
    Paused,
}

/// What one scheduled tick should do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickPlan {
    /// Number of integrator calls to run now
    pub steps: u32,
    /// Real time until the next tick is due
    pub next_tick: Duration,
}

#[derive(Debug, Clone)]
pub struct TimeController {
    dt: f64,
    dt_init: f64,
    run_time: f64,
    display_interval: f64,
    min_run_time: f64,
    max_steps_per_tick: u32,
    state: PlayState,
    steps_taken: u64,
    sim_years: f64,
}

impl TimeController {
    /// Starts paused. `run_time_ms` above the display interval is folded into a smaller `dt`.
    pub fn new(
        dt: f64,
        run_time_ms: f64,
        display_interval_ms: f64,
        max_steps_per_tick: u32,
    ) -> Result<Self> {
        ensure_positive(dt, SimError::InvalidTimestep)?;
        ensure_positive(run_time_ms, SimError::InvalidInterval)?;
        ensure_positive(display_interval_ms, SimError::InvalidInterval)?;
        if display_interval_ms > MAX_DISPLAY_INTERVAL_MS {
            return Err(SimError::InvalidInterval(display_interval_ms));
        }
        if max_steps_per_tick == 0 {
            return Err(SimError::InvalidStepCap);
        }

        let mut controller = Self {
            dt,
            dt_init: dt,
            run_time: run_time_ms,
            display_interval: display_interval_ms,
            min_run_time: display_interval_ms / max_steps_per_tick as f64,
            max_steps_per_tick,
            state: PlayState::Paused,
            steps_taken: 0,
            sim_years: 0.0,
        };
        controller.rebalance();
        Ok(controller)
    }

    pub fn dt(&self) -> f64 {
        self.dt
    }

    pub fn dt_init(&self) -> f64 {
        self.dt_init
    }

    /// Real milliseconds between two integrator calls.
    pub fn run_time(&self) -> f64 {
        self.run_time
    }

    pub fn display_interval(&self) -> f64 {
        self.display_interval
    }

    pub fn min_run_time(&self) -> f64 {
        self.min_run_time
    }

    /// Simulated years per real millisecond.
    pub fn speed(&self) -> f64 {
        self.dt / self.run_time
    }

    pub fn state(&self) -> PlayState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state == PlayState::Playing
    }

    pub fn play(&mut self) {
        self.state = PlayState::Playing;
    }

    pub fn pause(&mut self) {
        self.state = PlayState::Paused;
    }

    pub fn steps_taken(&self) -> u64 {
        self.steps_taken
    }

    pub fn sim_years(&self) -> f64 {
        self.sim_years
    }

    pub fn speed_up(&mut self, factor: f64) -> Result<()> {
        ensure_positive(factor, SimError::InvalidFactor)?;
        self.apply_speed_up(factor);
        Ok(())
    }

    pub fn slow_down(&mut self, factor: f64) -> Result<()> {
        ensure_positive(factor, SimError::InvalidFactor)?;
        self.apply_slow_down(factor);
        Ok(())
    }

    /// `factor` must already be positive and finite.
    pub(crate) fn apply_speed_up(&mut self, factor: f64) {
        debug_assert!(factor.is_finite() && factor > 0.0);
        self.run_time /= factor;
        self.rebalance();
    }

    /// `factor` must already be positive and finite.
    pub(crate) fn apply_slow_down(&mut self, factor: f64) {
        debug_assert!(factor.is_finite() && factor > 0.0);
        self.run_time *= factor;
        self.rebalance();
    }

    fn rebalance(&mut self) {
        // Fast enough for a full `dt` per frame again: undo earlier subdivision.
        if self.run_time < self.display_interval && self.dt != self.dt_init {
            self.run_time *= self.dt_init / self.dt;
            self.dt = self.dt_init;
        }
        // Slower than one call per frame: call every frame with a smaller `dt`.
        if self.run_time > self.display_interval {
            self.dt *= self.display_interval / self.run_time;
            self.run_time = self.display_interval;
        }
        if self.run_time < self.min_run_time {
            log::debug!(
                "run time {} ms below floor, clamping to {} ms",
                self.run_time,
                self.min_run_time
            );
            self.run_time = self.min_run_time;
        }
    }

    /// Work for the next scheduled tick. Paused ticks run nothing.
    pub fn plan_tick(&self) -> TickPlan {
        let interval = ms_to_duration(self.display_interval);
        if !self.is_playing() {
            return TickPlan {
                steps: 0,
                next_tick: interval,
            };
        }

        if self.run_time <= self.display_interval {
            let per_tick = (self.display_interval / self.run_time + STEP_EPSILON).floor();
            TickPlan {
                steps: (per_tick as u32).clamp(1, self.max_steps_per_tick),
                next_tick: interval,
            }
        } else {
            TickPlan {
                steps: 1,
                next_tick: ms_to_duration(self.run_time),
            }
        }
    }

    /// Books integrator calls that actually ran at the current `dt`.
    pub fn record_steps(&mut self, steps: u32) {
        self.steps_taken += steps as u64;
        self.sim_years += steps as f64 * self.dt;
    }
}

/// Saturates instead of panicking on intervals `Duration` cannot hold.
fn ms_to_duration(ms: f64) -> Duration {
    Duration::try_from_secs_f64(ms / 1000.0).unwrap_or(Duration::MAX)
}
