use std::time::Duration;

use cgmath::{InnerSpace, Point2};

use crate::{
    Body, BodyRef,
    camera::{Camera, PanDirection, ZoomDirection},
    config::{ScenarioConfig, SessionConfig},
    error::Result,
    sim::{ElapsedTime, Integrator, StepReport, compute_elapsed_time, diagnostics::Diagnostics},
    time_controller::TimeController,
};

/// A body as the UI layer should draw it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderedBody {
    pub body: BodyRef,
    pub display_pos: Point2<f64>,
    pub display_radius: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    /// Integrator calls that ran during this tick
    pub steps: u32,
    /// Real time until the scheduler should call `advance_tick` again
    pub next_tick: Duration,
    /// Coincident pairs left out of at least one step
    pub skipped: Vec<(BodyRef, BodyRef)>,
}

/// Owns the bodies, the integrator, the time controller and the camera.
///
/// The session never schedules itself. An external driver calls
/// [`Session::advance_tick`] on the physics cadence and [`Session::render_sync`]
/// on the display cadence, both from the same thread.
pub struct Session {
    bodies: Vec<Body>,
    integrator: Integrator,
    timing: TimeController,
    camera: Camera,
    config: SessionConfig,
}

impl Session {
    /// Default session around `bodies`, starting paused.
    pub fn new(gravitational_constant: f64, initial_dt: f64, bodies: Vec<Body>) -> Result<Self> {
        Self::with_config(
            SessionConfig {
                gravitational_constant,
                dt: initial_dt,
                ..Default::default()
            },
            bodies,
        )
    }

    pub fn with_config(config: SessionConfig, bodies: Vec<Body>) -> Result<Self> {
        config.validate()?;
        for body in &bodies {
            body.validate()?;
        }

        let integrator = Integrator::new(config.gravitational_constant, config.degenerate_policy)?;
        let timing = TimeController::new(
            config.dt,
            config.run_time_ms,
            config.display_interval_ms,
            config.max_steps_per_tick,
        )?;
        let camera = Camera::new(config.camera.into(), config.scale, config.zoom_factor)?;

        log::info!(
            "session with {} bodies, dt = {} yr, run time = {} ms",
            bodies.len(),
            timing.dt(),
            timing.run_time()
        );

        Ok(Self {
            bodies,
            integrator,
            timing,
            camera,
            config,
        })
    }

    pub fn from_scenario(scenario: &ScenarioConfig) -> Result<Self> {
        Self::with_config(scenario.session.clone(), scenario.build_bodies()?)
    }

    /// One physics tick. Runs nothing while paused.
    pub fn advance_tick(&mut self) -> Result<TickReport> {
        let plan = self.timing.plan_tick();
        let mut skipped: Vec<(BodyRef, BodyRef)> = Vec::new();

        for done in 0..plan.steps {
            let report = match self.integrator.exec_iter(&mut self.bodies, self.timing.dt()) {
                Ok(report) => report,
                Err(e) => {
                    self.timing.record_steps(done);
                    log::error!("step {done} of tick failed: {e}");
                    return Err(e);
                }
            };
            for pair in report.skipped {
                if !skipped.contains(&pair) {
                    skipped.push(pair);
                }
            }
        }
        self.timing.record_steps(plan.steps);

        for (first, second) in &skipped {
            log::warn!(
                "bodies {} and {} coincide, skipped their interaction",
                first.index(),
                second.index()
            );
        }

        Ok(TickReport {
            steps: plan.steps,
            next_tick: plan.next_tick,
            skipped,
        })
    }

    /// Runs exactly one integrator call, playing or not.
    pub fn step(&mut self) -> Result<StepReport> {
        let report = self.integrator.exec_iter(&mut self.bodies, self.timing.dt())?;
        self.timing.record_steps(1);
        Ok(report)
    }

    /// Moves the camera onto the tracked body, then maps every body to display space.
    pub fn render_sync(&mut self, viewport_center: Point2<f64>) -> Vec<RenderedBody> {
        self.camera.follow_focus(&self.bodies);
        self.bodies
            .iter()
            .enumerate()
            .map(|(idx, body)| RenderedBody {
                body: BodyRef::new(idx),
                display_pos: self.camera.physical_to_display(body.pos, viewport_center),
                display_radius: body.radius * self.camera.scale(),
            })
            .collect()
    }

    /// Nearest body whose drawn circle, or the minimum pick radius, covers the point.
    pub fn body_at(&self, display: Point2<f64>, viewport_center: Point2<f64>) -> Option<BodyRef> {
        let mut best: Option<(BodyRef, f64)> = None;
        for (idx, body) in self.bodies.iter().enumerate() {
            let on_screen = self.camera.physical_to_display(body.pos, viewport_center);
            let dist = (on_screen - display).magnitude();
            let reach = (body.radius * self.camera.scale()).max(self.config.pick_radius);
            if dist <= reach && best.is_none_or(|(_, d)| dist < d) {
                best = Some((BodyRef::new(idx), dist));
            }
        }
        best.map(|(body, _)| body)
    }

    pub fn pause(&mut self) {
        if self.timing.is_playing() {
            log::debug!("pausing at {}", self.elapsed());
        }
        self.timing.pause();
    }

    pub fn resume(&mut self) {
        if !self.timing.is_playing() {
            log::debug!("resuming at {}", self.elapsed());
        }
        self.timing.play();
    }

    pub fn toggle_pause(&mut self) {
        if self.timing.is_playing() {
            self.pause();
        } else {
            self.resume();
        }
    }

    pub fn is_playing(&self) -> bool {
        self.timing.is_playing()
    }

    /// Pans by `amount` display units. Stops tracking.
    pub fn pan(&mut self, direction: PanDirection, amount: f64) {
        self.camera.pan(direction, amount);
    }

    /// Pans by the configured amount.
    pub fn pan_step(&mut self, direction: PanDirection) {
        self.pan(direction, self.config.pan_amount);
    }

    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.camera.move_relative(dx, dy);
    }

    pub fn zoom(&mut self, direction: ZoomDirection) {
        self.camera.zoom(direction);
    }

    pub fn set_scale(&mut self, scale: f64) -> Result<()> {
        self.camera.set_scale(scale)
    }

    /// Speeds up by the configured factor, which `with_config` has validated.
    pub fn speed_up(&mut self) {
        self.timing.apply_speed_up(self.config.speed_factor);
        self.log_speed();
    }

    pub fn slow_down(&mut self) {
        self.timing.apply_slow_down(self.config.speed_factor);
        self.log_speed();
    }

    pub fn speed_up_by(&mut self, factor: f64) -> Result<()> {
        self.timing.speed_up(factor)?;
        self.log_speed();
        Ok(())
    }

    pub fn slow_down_by(&mut self, factor: f64) -> Result<()> {
        self.timing.slow_down(factor)?;
        self.log_speed();
        Ok(())
    }

    fn log_speed(&self) {
        log::debug!(
            "dt = {} yr, run time = {} ms, {} yr/s",
            self.timing.dt(),
            self.timing.run_time(),
            self.timing.speed() * 1000.0
        );
    }

    /// Follows `body` from the next render sync on. Unknown bodies are ignored.
    pub fn track(&mut self, body: BodyRef) {
        if body.index() < self.bodies.len() {
            self.camera.set_focus(Some(body));
        } else {
            log::debug!("ignoring track request for missing body {}", body.index());
        }
    }

    pub fn clear_tracking(&mut self) {
        self.camera.set_focus(None);
    }

    pub fn tracked(&self) -> Option<BodyRef> {
        self.camera.focus()
    }

    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    pub fn body(&self, body: BodyRef) -> Option<&Body> {
        self.bodies.get(body.index())
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn time_controller(&self) -> &TimeController {
        &self.timing
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn gravitational_constant(&self) -> f64 {
        self.integrator.gravitational_constant()
    }

    pub fn elapsed(&self) -> ElapsedTime {
        compute_elapsed_time(self.timing.sim_years(), self.timing.steps_taken())
    }

    pub fn diagnostics(&self) -> Diagnostics {
        Diagnostics::measure(&self.bodies, self.gravitational_constant())
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use cgmath::{Point2, Vector2};

    use super::*;
    use crate::{
        constants::{DISPLAY_INTERVAL_MS, G},
        error::SimError,
        presets,
        sim::DegeneratePolicy,
    };

    fn center() -> Point2<f64> {
        Point2::new(600.0, 400.0)
    }

    fn body(mass: f64, x: f64, y: f64, vx: f64, vy: f64) -> Body {
        Body::new(mass, Point2::new(x, y), Vector2::new(vx, vy), 0.01).unwrap()
    }

    fn classic_session() -> Session {
        Session::new(G, 0.001, presets::classic().unwrap()).unwrap()
    }

    #[test]
    fn rejects_invalid_construction() {
        assert_eq!(
            Session::new(G, 0.0, vec![]).err(),
            Some(SimError::InvalidTimestep(0.0))
        );
        assert_eq!(
            Session::new(-1.0, 0.001, vec![]).err(),
            Some(SimError::InvalidGravitationalConstant(-1.0))
        );
        let mut bad = body(1.0, 0.0, 0.0, 0.0, 0.0);
        bad.mass = 0.0;
        assert_eq!(
            Session::new(G, 0.001, vec![bad]).err(),
            Some(SimError::InvalidMass(0.0))
        );
        let config = SessionConfig {
            scale: 0.0,
            ..Default::default()
        };
        assert_eq!(
            Session::with_config(config, vec![]).err(),
            Some(SimError::InvalidScale(0.0))
        );
    }

    #[test]
    fn starts_paused() {
        let mut session = classic_session();
        let before = session.bodies().to_vec();
        assert!(!session.is_playing());

        let report = session.advance_tick().unwrap();
        assert_eq!(report.steps, 0);
        assert_eq!(session.bodies(), before.as_slice());
    }

    #[test]
    fn playing_tick_moves_bodies() {
        let mut session = classic_session();
        session.resume();
        let report = session.advance_tick().unwrap();
        assert_eq!(report.steps, 1);
        assert!(report.skipped.is_empty());
        assert_ne!(session.bodies()[1].pos, Point2::new(1.0, 0.0));
        assert_eq!(session.time_controller().steps_taken(), 1);
    }

    #[test]
    fn single_body_keeps_velocity() {
        let mut session = Session::new(G, 0.01, vec![body(5.0, 1.0, 2.0, 0.5, -0.25)]).unwrap();
        session.resume();
        for step in 1..=10 {
            session.advance_tick().unwrap();
            let b = &session.bodies()[0];
            assert_eq!(b.vel, Vector2::new(0.5, -0.25));
            assert_relative_eq!(b.pos.x, 1.0 + 0.5 * 0.01 * step as f64, max_relative = 1e-12);
            assert_relative_eq!(b.pos.y, 2.0 - 0.25 * 0.01 * step as f64, max_relative = 1e-12);
        }
    }

    #[test]
    fn empty_session_ticks() {
        let mut session = Session::new(G, 0.01, Vec::new()).unwrap();
        session.resume();
        assert_eq!(session.advance_tick().unwrap().steps, 1);
        assert!(session.render_sync(center()).is_empty());
        assert_eq!(session.body_at(center(), center()), None);
    }

    #[test]
    fn sub_steps_after_speed_up() {
        let mut session = classic_session();
        session.resume();
        session.speed_up();
        session.speed_up();
        let report = session.advance_tick().unwrap();
        assert_eq!(report.steps, 4);
        assert_eq!(
            report.next_tick,
            Duration::from_secs_f64(DISPLAY_INTERVAL_MS / 1000.0)
        );
        assert_relative_eq!(session.time_controller().sim_years(), 0.004, max_relative = 1e-12);
    }

    #[test]
    fn speed_factor_is_validated() {
        let mut session = classic_session();
        assert_eq!(session.speed_up_by(0.0), Err(SimError::InvalidFactor(0.0)));
        assert_eq!(session.slow_down_by(-1.0), Err(SimError::InvalidFactor(-1.0)));
        assert_eq!(session.set_scale(-5.0), Err(SimError::InvalidScale(-5.0)));
    }

    #[test]
    fn pause_freezes_physics_not_camera() {
        let mut session = classic_session();
        session.resume();
        session.advance_tick().unwrap();
        session.pause();
        let frozen = session.bodies().to_vec();

        session.pan(PanDirection::Right, 200.0);
        session.zoom(ZoomDirection::In);
        for _ in 0..5 {
            session.advance_tick().unwrap();
            session.render_sync(center());
        }

        assert_eq!(session.bodies(), frozen.as_slice());
        assert_relative_eq!(session.camera().pos().x, 1.0);
        assert_relative_eq!(session.camera().scale(), 220.0);
    }

    #[test]
    fn render_sync_maps_bodies() {
        let mut session = classic_session();
        let rendered = session.render_sync(center());
        assert_eq!(rendered.len(), 3);
        assert_eq!(rendered[0].body, BodyRef::new(0));
        assert_eq!(rendered[0].display_pos, center());
        assert_relative_eq!(rendered[1].display_pos.x, 800.0);
        assert_relative_eq!(rendered[0].display_radius, 0.075 * 200.0);
    }

    #[test]
    fn tracking_overrides_stale_camera() {
        let mut session = classic_session();
        session.resume();
        session.pan(PanDirection::Left, 500.0);
        session.track(BodyRef::new(1));
        for _ in 0..3 {
            session.advance_tick().unwrap();
        }
        session.render_sync(center());
        assert_eq!(session.camera().pos(), session.bodies()[1].pos);

        let rendered = session.render_sync(center());
        assert_relative_eq!(rendered[1].display_pos.x, center().x);
        assert_relative_eq!(rendered[1].display_pos.y, center().y);

        session.pan_step(PanDirection::Down);
        assert_eq!(session.tracked(), None);
        let camera = session.camera().pos();
        session.advance_tick().unwrap();
        session.render_sync(center());
        assert_eq!(session.camera().pos(), camera);
    }

    #[test]
    fn tracking_missing_body_is_ignored() {
        let mut session = classic_session();
        session.track(BodyRef::new(42));
        assert_eq!(session.tracked(), None);
        session.render_sync(center());
        assert_eq!(session.camera().pos(), Point2::new(0.0, 0.0));
    }

    #[test]
    fn body_at_picks_nearest_hit() {
        let session = classic_session();
        // Sun is drawn with radius 15 around the center.
        assert_eq!(
            session.body_at(Point2::new(610.0, 400.0), center()),
            Some(BodyRef::new(0))
        );
        // Earth (radius 2) and moonlet (radius 1) are 0.4 apart on screen.
        assert_eq!(
            session.body_at(Point2::new(800.5, 400.0), center()),
            Some(BodyRef::new(2))
        );
        assert_eq!(
            session.body_at(Point2::new(799.9, 401.0), center()),
            Some(BodyRef::new(1))
        );
        assert_eq!(session.body_at(Point2::new(700.0, 300.0), center()), None);
    }

    #[test]
    fn coincident_bodies_are_skipped_by_default() {
        let mut session = Session::new(
            G,
            0.001,
            vec![body(1.0, 0.0, 0.0, 0.0, 0.0), body(1.0, 0.0, 0.0, 0.0, 0.0)],
        )
        .unwrap();
        session.resume();
        let report = session.advance_tick().unwrap();
        assert_eq!(report.skipped, vec![(BodyRef::new(0), BodyRef::new(1))]);
        assert_eq!(session.bodies()[0].vel, Vector2::new(0.0, 0.0));
    }

    #[test]
    fn coincident_bodies_fail_under_fail_policy() {
        let config = SessionConfig {
            degenerate_policy: DegeneratePolicy::Fail,
            ..Default::default()
        };
        let mut session = Session::with_config(
            config,
            vec![body(1.0, 0.0, 0.0, 0.0, 0.0), body(1.0, 0.0, 0.0, 0.0, 0.0)],
        )
        .unwrap();
        session.resume();
        assert!(matches!(
            session.advance_tick(),
            Err(SimError::DegenerateGeometry { .. })
        ));
        assert_eq!(session.time_controller().steps_taken(), 0);
    }

    #[test]
    fn manual_step_runs_while_paused() {
        let mut session = classic_session();
        session.step().unwrap();
        assert!(!session.is_playing());
        assert_eq!(session.elapsed().steps, 1);
    }

    #[test]
    fn speed_controls_use_configured_factor() {
        let config = SessionConfig {
            speed_factor: 4.0,
            ..Default::default()
        };
        let mut session = Session::with_config(config, presets::classic().unwrap()).unwrap();
        let run_time = session.time_controller().run_time();
        session.speed_up();
        assert_relative_eq!(session.time_controller().run_time(), run_time / 4.0);
        session.slow_down();
        assert_relative_eq!(session.time_controller().run_time(), run_time);
    }

    #[test]
    fn oversized_display_interval_is_rejected() {
        let config = SessionConfig {
            display_interval_ms: 1e30,
            run_time_ms: 1e30,
            ..Default::default()
        };
        assert_eq!(
            Session::with_config(config, presets::classic().unwrap()).err(),
            Some(SimError::InvalidInterval(1e30))
        );
    }
}
