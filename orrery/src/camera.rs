use cgmath::{Point2, Vector2};

use crate::{
    BodyRef,
    constants::{MAX_SCALE, MIN_SCALE},
    error::{Result, SimError, ensure_positive},
    sim::Body,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanDirection {
    Left,
    Right,
    Up,
    Down,
}

impl PanDirection {
    /// Display y grows downwards, same as physical y as drawn.
    fn unit(self) -> Vector2<f64> {
        match self {
            PanDirection::Left => Vector2::new(-1.0, 0.0),
            PanDirection::Right => Vector2::new(1.0, 0.0),
            PanDirection::Up => Vector2::new(0.0, -1.0),
            PanDirection::Down => Vector2::new(0.0, 1.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoomDirection {
    In,
    Out,
}

/// Maps physical coordinates (AU) to display coordinates and back.
///
/// `display = scale * (physical - pos) + viewport_center`
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pos: Point2<f64>,
    /// Display units per AU
    scale: f64,
    zoom_factor: f64,
    focus: Option<BodyRef>,
}

impl Camera {
    pub fn new(pos: Point2<f64>, scale: f64, zoom_factor: f64) -> Result<Self> {
        if !(pos.x.is_finite() && pos.y.is_finite()) {
            return Err(SimError::NonFinite("camera position"));
        }
        check_scale(scale)?;
        ensure_positive(zoom_factor, SimError::InvalidFactor)?;
        Ok(Self {
            pos,
            scale,
            zoom_factor,
            focus: None,
        })
    }

    pub fn pos(&self) -> Point2<f64> {
        self.pos
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn zoom_factor(&self) -> f64 {
        self.zoom_factor
    }

    pub fn focus(&self) -> Option<BodyRef> {
        self.focus
    }

    pub fn physical_to_display(
        &self,
        physical: Point2<f64>,
        viewport_center: Point2<f64>,
    ) -> Point2<f64> {
        viewport_center + (physical - self.pos) * self.scale
    }

    pub fn display_to_physical(
        &self,
        display: Point2<f64>,
        viewport_center: Point2<f64>,
    ) -> Point2<f64> {
        self.pos + (display - viewport_center) / self.scale
    }

    /// Shifts the camera by a display-space offset. Always drops the focus.
    pub fn move_relative(&mut self, dx: f64, dy: f64) {
        self.focus = None;
        self.pos += Vector2::new(dx, dy) / self.scale;
    }

    pub fn pan(&mut self, direction: PanDirection, amount: f64) {
        let rel = direction.unit() * amount;
        self.move_relative(rel.x, rel.y);
    }

    /// Zooms about the camera position, which stays put. Saturates at
    /// `MIN_SCALE` and `MAX_SCALE`.
    pub fn zoom(&mut self, direction: ZoomDirection) {
        let scale = match direction {
            ZoomDirection::In => self.scale * self.zoom_factor,
            ZoomDirection::Out => self.scale / self.zoom_factor,
        };
        self.scale = scale.clamp(MIN_SCALE, MAX_SCALE);
    }

    pub fn set_scale(&mut self, scale: f64) -> Result<()> {
        self.scale = check_scale(scale)?;
        Ok(())
    }

    pub fn set_focus(&mut self, focus: Option<BodyRef>) {
        self.focus = focus;
    }

    /// Snaps the camera onto the focused body, if any.
    pub fn follow_focus(&mut self, bodies: &[Body]) {
        if let Some(focus) = self.focus
            && let Some(body) = bodies.get(focus.index())
        {
            self.pos = body.pos;
        }
    }
}

fn check_scale(scale: f64) -> Result<f64> {
    ensure_positive(scale, SimError::InvalidScale)?;
    if !(MIN_SCALE..=MAX_SCALE).contains(&scale) {
        return Err(SimError::InvalidScale(scale));
    }
    Ok(scale)
}
