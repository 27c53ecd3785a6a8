use serde::Serialize;

use crate::canvas::{Canvas2d, Surface};
use crate::types::{
    CompositeMode, LinearGradient, Point, RadialGradient, Rect, Shadow, Transform,
};

/// One call made against a [`RecordingCanvas`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawCommand {
    ResizeBacking {
        width: u32,
        height: u32,
    },
    DisplaySize {
        width: f64,
        height: f64,
    },
    SetTransform {
        transform: Transform,
    },
    ClearRect {
        rect: Rect,
    },
    FillRadial {
        rect: Rect,
        gradient: RadialGradient,
    },
    Composite {
        mode: CompositeMode,
    },
    Shadow {
        shadow: Shadow,
    },
    StrokeLine {
        from: Point,
        to: Point,
        width: f64,
        gradient: LinearGradient,
    },
}

/// Canvas that records every call and tracks the sticky drawing state.
///
/// Backs the headless renderer and the tests; nothing is rasterised.
#[derive(Debug, Clone, Default)]
pub struct RecordingCanvas {
    commands: Vec<DrawCommand>,
    backing: (u32, u32),
    display: (f64, f64),
    transform: Transform,
    composite: CompositeMode,
    shadow: Shadow,
}

impl RecordingCanvas {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Returns the recorded commands and starts a fresh recording.
    /// Surface and drawing state are kept.
    pub fn take_commands(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }

    pub fn backing_size(&self) -> (u32, u32) {
        self.backing
    }

    pub fn display_size(&self) -> (f64, f64) {
        self.display
    }

    pub fn transform(&self) -> Transform {
        self.transform
    }

    pub fn composite(&self) -> CompositeMode {
        self.composite
    }

    pub fn shadow(&self) -> Shadow {
        self.shadow
    }

    pub fn stroke_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|command| matches!(command, DrawCommand::StrokeLine { .. }))
            .count()
    }

    pub fn radial_fill_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|command| matches!(command, DrawCommand::FillRadial { .. }))
            .count()
    }
}

impl Surface for RecordingCanvas {
    fn resize_backing(&mut self, width: u32, height: u32) {
        self.backing = (width, height);
        // Resizing a canvas element resets its context state.
        self.transform = Transform::IDENTITY;
        self.composite = CompositeMode::SourceOver;
        self.shadow = Shadow::NONE;
        self.commands
            .push(DrawCommand::ResizeBacking { width, height });
    }

    fn set_display_size(&mut self, width: f64, height: f64) {
        self.display = (width, height);
        self.commands.push(DrawCommand::DisplaySize { width, height });
    }

    fn set_transform(&mut self, transform: Transform) {
        self.transform = transform;
        self.commands.push(DrawCommand::SetTransform { transform });
    }
}

impl Canvas2d for RecordingCanvas {
    fn clear_rect(&mut self, rect: Rect) {
        self.commands.push(DrawCommand::ClearRect { rect });
    }

    fn fill_rect_radial(&mut self, rect: Rect, gradient: &RadialGradient) {
        self.commands.push(DrawCommand::FillRadial {
            rect,
            gradient: gradient.clone(),
        });
    }

    fn set_composite(&mut self, mode: CompositeMode) {
        self.composite = mode;
        self.commands.push(DrawCommand::Composite { mode });
    }

    fn set_shadow(&mut self, shadow: &Shadow) {
        self.shadow = *shadow;
        self.commands.push(DrawCommand::Shadow { shadow: *shadow });
    }

    fn stroke_line(&mut self, from: Point, to: Point, width: f64, gradient: &LinearGradient) {
        self.commands.push(DrawCommand::StrokeLine {
            from,
            to,
            width,
            gradient: gradient.clone(),
        });
    }
}
