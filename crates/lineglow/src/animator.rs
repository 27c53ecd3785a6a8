use std::cell::RefCell;
use std::rc::Rc;

use fieldconfig::{FieldConfig, ViewportConfig};
use rand::Rng;
use renderer::{Canvas2d, FrameRenderer, FrameStats, LineField, Surface, Viewport};
use scheduler::{CancellationToken, FrameHost, FrameLoop};
use tracing::{debug, info};

/// Everything a frame needs: drawing target, tunables, viewport, lines and
/// the random source used to regenerate them.
pub struct LineScene<C, R> {
    canvas: C,
    bounds: ViewportConfig,
    renderer: FrameRenderer,
    viewport: Viewport,
    field: LineField,
    rng: R,
    last_stats: FrameStats,
}

impl<C, R> LineScene<C, R>
where
    C: Canvas2d + Surface,
    R: Rng,
{
    fn resize(&mut self, width: f64, height: f64, raw_pixel_ratio: f64) {
        self.viewport = Viewport::new(width, height, raw_pixel_ratio, &self.bounds);
        self.viewport.apply(&mut self.canvas);
        self.field
            .regenerate(self.renderer.config(), self.viewport.diagonal(), &mut self.rng);
    }

    fn render(&mut self, timestamp: f64) -> FrameStats {
        self.last_stats = self
            .renderer
            .draw(&mut self.canvas, &self.viewport, &self.field, timestamp);
        self.last_stats
    }

    pub fn canvas(&self) -> &C {
        &self.canvas
    }

    pub fn canvas_mut(&mut self) -> &mut C {
        &mut self.canvas
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn field(&self) -> &LineField {
        &self.field
    }

    pub fn renderer(&self) -> &FrameRenderer {
        &self.renderer
    }

    pub fn last_stats(&self) -> FrameStats {
        self.last_stats
    }
}

/// Owns the animated background: scene state plus the running frame loop.
///
/// Constructed once per page. The viewport starts empty; call
/// [`BackgroundAnimator::resize`] with the window metrics before starting.
pub struct BackgroundAnimator<C, R, F: FrameHost> {
    scene: Rc<RefCell<LineScene<C, R>>>,
    frame_loop: Option<FrameLoop<F>>,
}

impl<C, R, F> BackgroundAnimator<C, R, F>
where
    C: Canvas2d + Surface + 'static,
    R: Rng + 'static,
    F: FrameHost + 'static,
{
    pub fn new(canvas: C, config: &FieldConfig, rng: R) -> Self {
        let scene = LineScene {
            canvas,
            bounds: config.viewport.clone(),
            renderer: FrameRenderer::new(config.render.clone()),
            viewport: Viewport::empty(),
            field: LineField::default(),
            rng,
            last_stats: FrameStats::default(),
        };
        Self {
            scene: Rc::new(RefCell::new(scene)),
            frame_loop: None,
        }
    }

    /// Rebuilds the viewport from window metrics, reconfigures the surface,
    /// and regenerates every line for the new diagonal.
    pub fn resize(&self, width: f64, height: f64, raw_pixel_ratio: f64) {
        let mut scene = self.scene.borrow_mut();
        scene.resize(width, height, raw_pixel_ratio);
        debug!(
            width = scene.viewport.width(),
            height = scene.viewport.height(),
            pixel_ratio = scene.viewport.pixel_ratio(),
            lines = scene.field.len(),
            "line field regenerated"
        );
    }

    /// Draws a single frame at `timestamp` (milliseconds).
    pub fn render(&self, timestamp: f64) -> FrameStats {
        self.scene.borrow_mut().render(timestamp)
    }

    /// Starts drawing on every frame delivered by `host`. A loop that is
    /// already running is cancelled first.
    pub fn start(&mut self, host: F) -> CancellationToken {
        self.stop();
        let scene = Rc::clone(&self.scene);
        let frame_loop = FrameLoop::start(host, move |timestamp| {
            scene.borrow_mut().render(timestamp);
        });
        let token = frame_loop.token();
        self.frame_loop = Some(frame_loop);
        info!(lines = self.line_count(), "background animation started");
        token
    }

    pub fn stop(&mut self) {
        if let Some(frame_loop) = self.frame_loop.take() {
            frame_loop.cancel();
        }
    }

    pub fn is_running(&self) -> bool {
        self.frame_loop
            .as_ref()
            .map(|frame_loop| frame_loop.is_running())
            .unwrap_or(false)
    }

    /// Frames rendered by the current loop.
    pub fn frames(&self) -> u64 {
        self.frame_loop
            .as_ref()
            .map(|frame_loop| frame_loop.frames())
            .unwrap_or(0)
    }

    pub fn viewport(&self) -> Viewport {
        self.scene.borrow().viewport
    }

    pub fn line_count(&self) -> usize {
        self.scene.borrow().field.len()
    }

    pub fn last_stats(&self) -> FrameStats {
        self.scene.borrow().last_stats
    }

    /// Runs `f` with read access to the scene.
    pub fn with_scene<T>(&self, f: impl FnOnce(&LineScene<C, R>) -> T) -> T {
        f(&self.scene.borrow())
    }

    /// Runs `f` with write access to the scene, e.g. to drain a recording.
    pub fn with_scene_mut<T>(&self, f: impl FnOnce(&mut LineScene<C, R>) -> T) -> T {
        f(&mut self.scene.borrow_mut())
    }
}
