//! Freehand drawing input samples.
//!
//! # Responsibility
//! - Record pointer-drag input as an ordered list of immutable samples.
//! - Carry per-sample stroke style for rasterization.
//!
//! # Invariants
//! - Samples are never mutated after recording.
//! - Rendering joins consecutive samples; the segment takes the style of its
//!   first sample.
//! - `pen_up` records a synthetic sample at the canvas origin. Rendering it
//!   draws a segment from the last drag point to the origin, matching the
//!   behavior of drawings saved so far.

use serde::{Deserialize, Serialize};

const DEFAULT_STROKE_WIDTH: f32 = 3.0;

/// Canvas coordinate in pixels, origin at top-left.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// 8-bit RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const BLACK: Rgba = Rgba::opaque(0, 0, 0);
    pub const WHITE: Rgba = Rgba::opaque(255, 255, 255);

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }
}

/// Stroke color and width for one segment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrokeStyle {
    pub color: Rgba,
    /// Line width in pixels.
    pub width: f32,
}

impl Default for StrokeStyle {
    fn default() -> Self {
        Self {
            color: Rgba::BLACK,
            width: DEFAULT_STROKE_WIDTH,
        }
    }
}

/// One recorded drawing input.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrokeSample {
    pub position: Point,
    pub style: StrokeStyle,
}

impl StrokeSample {
    pub fn new(position: Point, style: StrokeStyle) -> Self {
        Self { position, style }
    }
}

/// Records drawing gestures into stroke samples.
#[derive(Debug, Clone, Default)]
pub struct DrawingRecorder {
    style: StrokeStyle,
    samples: Vec<StrokeSample>,
}

impl DrawingRecorder {
    pub fn new(style: StrokeStyle) -> Self {
        Self {
            style,
            samples: Vec::new(),
        }
    }

    /// Style applied to samples recorded from now on.
    pub fn set_style(&mut self, style: StrokeStyle) {
        self.style = style;
    }

    pub fn style(&self) -> StrokeStyle {
        self.style
    }

    pub fn pen_down(&mut self, position: Point) {
        self.record(position);
    }

    pub fn drag_to(&mut self, position: Point) {
        self.record(position);
    }

    pub fn pen_up(&mut self) {
        self.record(Point::ORIGIN);
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn samples(&self) -> &[StrokeSample] {
        &self.samples
    }

    pub fn into_samples(self) -> Vec<StrokeSample> {
        self.samples
    }

    fn record(&mut self, position: Point) {
        self.samples.push(StrokeSample::new(position, self.style));
    }
}
