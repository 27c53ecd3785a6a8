use fieldconfig::RenderConfig;
use serde::Serialize;

use crate::canvas::Canvas2d;
use crate::lines::{LineField, LineSpec};
use crate::types::{
    ColorStop, CompositeMode, LinearGradient, Point, RadialGradient, Rgba, Shadow,
};
use crate::viewport::Viewport;

/// Vignette colour at the viewport centre.
pub const VIGNETTE_INNER: Rgba = Rgba::new(12, 16, 28, 0.0);
/// Vignette colour at `max(width, height) * VIGNETTE_RADIUS`.
pub const VIGNETTE_OUTER: Rgba = Rgba::new(0, 0, 0, 0.55);
pub const VIGNETTE_RADIUS: f64 = 0.65;

/// Segment half-length as a multiple of `max(width, height)`.
pub const SEGMENT_REACH: f64 = 1.6;

/// Drift is tuned in per-frame units at this nominal rate.
const NOMINAL_FPS: f64 = 60.0;

/// Stroke gradient stops: offset, hue, and the share of global opacity.
pub const STROKE_PALETTE: [(f64, Rgba, f64); 3] = [
    (0.0, Rgba::new(123, 92, 255, 1.0), 0.25),
    (0.5, Rgba::new(34, 211, 238, 1.0), 0.55),
    (1.0, Rgba::new(255, 59, 212, 1.0), 0.20),
];

pub const GLOW_COLOR: Rgba = Rgba::new(123, 92, 255, 0.35);

/// Unit vectors along the lines and across them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineGeometry {
    pub direction: Point,
    pub normal: Point,
}

impl LineGeometry {
    pub fn from_tilt(tilt: f64) -> Self {
        let direction = Point::new(tilt.cos(), tilt.sin());
        let normal = Point::new(-direction.y, direction.x);
        Self { direction, normal }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FrameStats {
    pub segments: usize,
}

/// Distance every line has scrolled after `time_ms`.
pub fn drift(time_ms: f64, config: &RenderConfig) -> f64 {
    time_ms * 0.001 * config.speed * NOMINAL_FPS * config.spacing
}

/// Per-line periodic wobble at `time_ms`.
pub fn jitter(line: &LineSpec, time_ms: f64, config: &RenderConfig) -> f64 {
    (line.phase + time_ms * config.jitter_rate).sin() * config.jitter
}

/// Wraps `offset + drift + jitter` into `[0, period)`.
///
/// `drift` is reduced first so the sum stays small however long the
/// session runs. A non-positive or non-finite period maps everything to 0.
pub fn wrap_position(offset: f64, drift: f64, jitter: f64, period: f64) -> f64 {
    if !(period.is_finite() && period > 0.0) {
        return 0.0;
    }
    let value = (offset + drift.rem_euclid(period) + jitter).rem_euclid(period);
    // rem_euclid can round up to `period` for tiny negative inputs.
    if value >= period || !value.is_finite() {
        0.0
    } else {
        value
    }
}

/// Draws the vignette and the drifting line field.
#[derive(Debug, Clone)]
pub struct FrameRenderer {
    config: RenderConfig,
    geometry: LineGeometry,
}

impl FrameRenderer {
    pub fn new(config: RenderConfig) -> Self {
        let geometry = LineGeometry::from_tilt(config.tilt);
        Self { config, geometry }
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn geometry(&self) -> LineGeometry {
        self.geometry
    }

    /// Position of `line` along the normal axis, in `[0, diagonal + spacing)`.
    pub fn position(&self, viewport: &Viewport, line: &LineSpec, time_ms: f64) -> f64 {
        wrap_position(
            line.offset,
            drift(time_ms, &self.config),
            jitter(line, time_ms, &self.config),
            viewport.diagonal() + self.config.spacing,
        )
    }

    /// Endpoints of the segment drawn for `line`; long enough to cross the
    /// viewport at any tilt.
    pub fn segment(&self, viewport: &Viewport, line: &LineSpec, time_ms: f64) -> (Point, Point) {
        let position = self.position(viewport, line, time_ms);
        let center = viewport
            .center()
            .offset(self.geometry.normal, position - viewport.diagonal() * 0.5);
        let reach = viewport.width().max(viewport.height()) * SEGMENT_REACH;
        (
            center.offset(self.geometry.direction, -reach),
            center.offset(self.geometry.direction, reach),
        )
    }

    pub fn draw<C: Canvas2d + ?Sized>(
        &self,
        canvas: &mut C,
        viewport: &Viewport,
        field: &LineField,
        time_ms: f64,
    ) -> FrameStats {
        canvas.clear_rect(viewport.bounds());
        if viewport.is_empty() {
            return FrameStats::default();
        }

        canvas.fill_rect_radial(viewport.bounds(), &self.vignette(viewport));

        let mut stats = FrameStats::default();
        canvas.set_composite(CompositeMode::Lighter);
        let glow = Shadow::new(self.config.glow, GLOW_COLOR);
        for line in field.iter() {
            let (from, to) = self.segment(viewport, line, time_ms);
            let gradient = LinearGradient {
                start: from,
                end: to,
                stops: self.stroke_stops(line.brightness),
            };
            canvas.set_shadow(&glow);
            canvas.stroke_line(from, to, line.width, &gradient);
            stats.segments += 1;
        }

        canvas.set_shadow(&Shadow::NONE);
        canvas.set_composite(CompositeMode::SourceOver);
        stats
    }

    fn vignette(&self, viewport: &Viewport) -> RadialGradient {
        RadialGradient {
            center: viewport.center(),
            inner_radius: 0.0,
            outer_radius: viewport.width().max(viewport.height()) * VIGNETTE_RADIUS,
            stops: vec![
                ColorStop::new(0.0, VIGNETTE_INNER),
                ColorStop::new(1.0, VIGNETTE_OUTER),
            ],
        }
    }

    fn stroke_stops(&self, brightness: f64) -> Vec<ColorStop> {
        STROKE_PALETTE
            .iter()
            .map(|&(offset, hue, share)| {
                ColorStop::new(offset, hue.with_alpha(self.config.opacity * share * brightness))
            })
            .collect()
    }
}
