//! Line-field renderer.
//!
//! Everything here is host-agnostic: drawing goes through the [`Canvas2d`]
//! and [`Surface`] traits, implemented by the browser backend and by
//! [`RecordingCanvas`]. The per-frame flow is:
//!
//! ```text
//!   resize ──▶ Viewport::new ──▶ Viewport::apply(surface)
//!                   │
//!                   └─▶ LineField::regenerate(diagonal, rng)
//!
//!   frame(t) ──▶ FrameRenderer::draw
//!                   ├─▶ clear + radial vignette
//!                   ├─▶ per line: wrap_position ─▶ segment ─▶ gradient stroke
//!                   └─▶ restore blending / shadow
//! ```

pub mod canvas;
pub mod frame;
pub mod lines;
pub mod recording;
pub mod types;
pub mod viewport;

pub use canvas::{Canvas2d, Surface};
pub use frame::{drift, jitter, wrap_position, FrameRenderer, FrameStats, LineGeometry};
pub use lines::{LineField, LineSpec};
pub use recording::{DrawCommand, RecordingCanvas};
pub use types::{
    ColorStop, CompositeMode, LinearGradient, Point, RadialGradient, Rect, Rgba, Shadow,
    Transform,
};
pub use viewport::Viewport;
