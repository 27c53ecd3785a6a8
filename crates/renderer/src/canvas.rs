use crate::types::{CompositeMode, LinearGradient, Point, RadialGradient, Rect, Shadow, Transform};

/// The drawing element itself: backing buffer, displayed size and transform.
pub trait Surface {
    /// Resizes the backing pixel buffer. Resizing also resets drawing state.
    fn resize_backing(&mut self, width: u32, height: u32);

    /// Sets the displayed size in logical units.
    fn set_display_size(&mut self, width: f64, height: f64);

    /// Replaces the current transform (not composed with the previous one).
    fn set_transform(&mut self, transform: Transform);
}

/// 2D drawing operations used by the frame renderer, in logical coordinates.
///
/// Compositing and shadow are sticky state shared across frames, the same
/// way they are on a browser 2D context.
pub trait Canvas2d {
    fn clear_rect(&mut self, rect: Rect);

    fn fill_rect_radial(&mut self, rect: Rect, gradient: &RadialGradient);

    fn set_composite(&mut self, mode: CompositeMode);

    fn set_shadow(&mut self, shadow: &Shadow);

    fn stroke_line(&mut self, from: Point, to: Point, width: f64, gradient: &LinearGradient);
}
