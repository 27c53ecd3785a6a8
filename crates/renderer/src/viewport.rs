use fieldconfig::ViewportConfig;
use tracing::debug;

use crate::canvas::Surface;
use crate::types::{Point, Rect, Transform};

/// Logical viewport size plus the clamped pixel ratio of the backing buffer.
///
/// A viewport is always rebuilt from the host's window size; it is never
/// adjusted in place.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    width: f64,
    height: f64,
    pixel_ratio: f64,
}

impl Viewport {
    /// Builds a viewport from the window's inner size and reported pixel
    /// ratio. Sizes are floored to whole logical pixels; negative or
    /// non-finite sizes collapse to zero.
    pub fn new(width: f64, height: f64, raw_pixel_ratio: f64, bounds: &ViewportConfig) -> Self {
        Self {
            width: whole_pixels(width),
            height: whole_pixels(height),
            pixel_ratio: bounds.clamp_pixel_ratio(raw_pixel_ratio),
        }
    }

    /// Zero-sized viewport at ratio 1, used before the first resize.
    pub const fn empty() -> Self {
        Self {
            width: 0.0,
            height: 0.0,
            pixel_ratio: 1.0,
        }
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn pixel_ratio(&self) -> f64 {
        self.pixel_ratio
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Backing buffer size in device pixels.
    pub fn backing_size(&self) -> (u32, u32) {
        (
            (self.width * self.pixel_ratio).floor() as u32,
            (self.height * self.pixel_ratio).floor() as u32,
        )
    }

    pub fn transform(&self) -> Transform {
        Transform::scale(self.pixel_ratio)
    }

    pub fn diagonal(&self) -> f64 {
        self.width.hypot(self.height)
    }

    pub fn center(&self) -> Point {
        Point::new(self.width * 0.5, self.height * 0.5)
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.height)
    }

    /// Reconfigures `surface` for this viewport: backing buffer at
    /// `logical × ratio`, displayed size in logical units, and a transform
    /// that maps logical coordinates onto the buffer.
    pub fn apply<S: Surface + ?Sized>(&self, surface: &mut S) {
        let (backing_width, backing_height) = self.backing_size();
        surface.resize_backing(backing_width, backing_height);
        surface.set_display_size(self.width, self.height);
        surface.set_transform(self.transform());
        debug!(
            width = self.width,
            height = self.height,
            pixel_ratio = self.pixel_ratio,
            backing_width,
            backing_height,
            "viewport applied"
        );
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::empty()
    }
}

fn whole_pixels(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value.floor()
    } else {
        0.0
    }
}
