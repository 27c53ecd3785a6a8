use std::fmt;

use serde::{Serialize, Serializer};

/// Point or vector in logical (CSS pixel) coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Returns `self + direction * distance`.
    pub fn offset(self, direction: Point, distance: f64) -> Self {
        Self::new(self.x + direction.x * distance, self.y + direction.y * distance)
    }
}

/// Axis-aligned rectangle in logical coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// 8-bit RGB colour with a floating point alpha, matching CSS `rgba()`.
///
/// Serializes as its CSS string so recorded frames stay readable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f64,
}

impl Rgba {
    /// Fully transparent black.
    pub const TRANSPARENT: Rgba = Rgba::new(0, 0, 0, 0.0);

    pub const fn new(r: u8, g: u8, b: u8, a: f64) -> Self {
        Self { r, g, b, a }
    }

    /// Same colour with a replaced alpha channel, clamped to `[0, 1]`.
    pub fn with_alpha(self, a: f64) -> Self {
        Self {
            a: a.clamp(0.0, 1.0),
            ..self
        }
    }

    /// CSS colour string accepted by canvas style setters.
    pub fn css(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
    }
}

impl Serialize for Rgba {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A colour stop at `offset` in `[0, 1]` along a gradient.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ColorStop {
    pub offset: f64,
    pub color: Rgba,
}

impl ColorStop {
    pub const fn new(offset: f64, color: Rgba) -> Self {
        Self { offset, color }
    }
}

/// Gradient interpolated along the line from `start` to `end`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinearGradient {
    pub start: Point,
    pub end: Point,
    pub stops: Vec<ColorStop>,
}

/// Gradient between two concentric circles around `center`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RadialGradient {
    pub center: Point,
    pub inner_radius: f64,
    pub outer_radius: f64,
    pub stops: Vec<ColorStop>,
}

/// Compositing mode for subsequent drawing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CompositeMode {
    /// Normal painter's-order blending.
    #[default]
    SourceOver,
    /// Additive blending; overlapping strokes brighten.
    Lighter,
}

impl CompositeMode {
    /// Name used by the canvas `globalCompositeOperation` property.
    pub fn as_css(self) -> &'static str {
        match self {
            CompositeMode::SourceOver => "source-over",
            CompositeMode::Lighter => "lighter",
        }
    }
}

/// Blurred shadow applied to strokes; a zero blur disables it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Shadow {
    pub blur: f64,
    pub color: Rgba,
}

impl Shadow {
    pub const NONE: Shadow = Shadow {
        blur: 0.0,
        color: Rgba::TRANSPARENT,
    };

    pub const fn new(blur: f64, color: Rgba) -> Self {
        Self { blur, color }
    }
}

impl Default for Shadow {
    fn default() -> Self {
        Self::NONE
    }
}

/// Uniform scale from logical coordinates to backing-buffer pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Transform {
    pub scale: f64,
}

impl Transform {
    pub const IDENTITY: Transform = Transform { scale: 1.0 };

    pub const fn scale(scale: f64) -> Self {
        Self { scale }
    }

    /// Canvas `setTransform(a, b, c, d, e, f)` arguments.
    pub fn matrix(&self) -> [f64; 6] {
        [self.scale, 0.0, 0.0, self.scale, 0.0, 0.0]
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}
