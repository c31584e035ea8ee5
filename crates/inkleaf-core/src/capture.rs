//! Pointer capture: turns raw pointer events into pending strokes and
//! commits them into the scene on release.
//!
//! Touch input never draws (palm rejection); pen and mouse do. Pressure
//! comes from the hardware when it reports any, otherwise it is synthesized
//! from pointer speed so mouse strokes still taper naturally.

use kurbo::Point;

use crate::geometry::{self, ShapeKind};
use crate::scene::SceneStore;
use crate::stroke::{DEFAULT_PRESSURE, InkPoint, StrokeId, StrokeStyle};
use crate::tools::{EraserMode, ToolKind};

/// Polyline simplification tolerance applied to freehand ink on commit.
pub const SIMPLIFY_TOLERANCE: f64 = 0.5;

/// Whole-stroke erase reach, as a multiple of the eraser width.
pub const PIXEL_ERASE_REACH: f64 = 2.0;

/// Distance over which synthesized pressure falls off, in scene units.
const PRESSURE_FALLOFF_DIST: f64 = 80.0;

/// Smoothing factor for the synthesized pressure estimate.
const PRESSURE_SMOOTHING: f64 = 0.3;

/// The kind of device behind a pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PointerType {
    #[default]
    Mouse,
    Pen,
    Touch,
}

impl PointerType {
    /// Map a DOM-style pointer type name. Unknown names fall back to mouse.
    pub fn from_name(name: &str) -> Self {
        match name {
            "pen" => PointerType::Pen,
            "touch" => PointerType::Touch,
            _ => PointerType::Mouse,
        }
    }
}

/// One pointer event in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerSample {
    pub x: f64,
    pub y: f64,
    /// Hardware pressure in `[0, 1]`. `None` (or a zero report, which
    /// browsers send for devices without pressure) means synthesize.
    pub pressure: Option<f64>,
    pub pointer_type: PointerType,
    /// Pen barrel button held, which erases regardless of the active tool.
    pub barrel: bool,
    /// Shift held, which constrains shape drags.
    pub shift: bool,
}

impl PointerSample {
    pub fn mouse(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            pressure: None,
            pointer_type: PointerType::Mouse,
            barrel: false,
            shift: false,
        }
    }

    pub fn pen(x: f64, y: f64, pressure: f64) -> Self {
        Self {
            x,
            y,
            pressure: Some(pressure),
            pointer_type: PointerType::Pen,
            barrel: false,
            shift: false,
        }
    }

    pub fn touch(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            pressure: None,
            pointer_type: PointerType::Touch,
            barrel: false,
            shift: false,
        }
    }

    pub fn with_barrel(mut self) -> Self {
        self.barrel = true;
        self
    }

    pub fn with_shift(mut self) -> Self {
        self.shift = true;
        self
    }

    fn screen_point(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// The stroke being drawn right now. Renderers paint this on the active
/// layer every move.
#[derive(Debug, Clone)]
pub struct PendingStroke {
    pub points: Vec<InkPoint>,
    pub style: StrokeStyle,
}

#[derive(Debug, Clone, Copy)]
enum DrawMode {
    /// Freehand ink accumulating samples.
    Ink,
    /// Shape drag; the preview is rebuilt from the anchor on every move.
    Shape { kind: ShapeKind, anchor: Point },
    /// Whole-stroke eraser; removes committed strokes near the pointer.
    PixelErase,
}

#[derive(Debug)]
enum CaptureState {
    Idle,
    Drawing { pending: PendingStroke, mode: DrawMode },
}

/// Synthesizes pressure from pointer speed when the device reports none.
/// Slow, deliberate movement presses harder; fast flicks lighten.
#[derive(Debug)]
struct PressureEstimator {
    last: Option<Point>,
    smoothed: f64,
}

impl PressureEstimator {
    fn new() -> Self {
        Self {
            last: None,
            smoothed: DEFAULT_PRESSURE,
        }
    }

    fn resolve(&mut self, pos: Point, reported: Option<f64>) -> f64 {
        if let Some(p) = reported {
            if p > 0.0 {
                self.last = Some(pos);
                return p.clamp(0.0, 1.0);
            }
        }
        let pressure = match self.last {
            None => DEFAULT_PRESSURE,
            Some(last) => {
                let dist = last.distance(pos);
                let target = (-(dist / PRESSURE_FALLOFF_DIST).min(3.0)).exp().clamp(0.2, 1.0);
                self.smoothed + PRESSURE_SMOOTHING * (target - self.smoothed)
            }
        };
        self.smoothed = pressure;
        self.last = Some(pos);
        pressure
    }

    fn reset(&mut self) {
        self.last = None;
        self.smoothed = DEFAULT_PRESSURE;
    }
}

/// Drives the pointer-down / move / up lifecycle against a scene store.
#[derive(Debug)]
pub struct CapturePipeline {
    state: CaptureState,
    pressure: PressureEstimator,
}

impl Default for CapturePipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl CapturePipeline {
    pub fn new() -> Self {
        Self {
            state: CaptureState::Idle,
            pressure: PressureEstimator::new(),
        }
    }

    /// Whether a stroke is in flight.
    pub fn is_drawing(&self) -> bool {
        matches!(self.state, CaptureState::Drawing { .. })
    }

    /// The in-progress stroke, if there is one to paint. Whole-stroke
    /// erasing has no visible pending ink.
    pub fn active_stroke(&self) -> Option<&PendingStroke> {
        match &self.state {
            CaptureState::Drawing {
                pending,
                mode: DrawMode::Ink | DrawMode::Shape { .. },
            } => Some(pending),
            _ => None,
        }
    }

    /// Begin a stroke. Returns `false` when the event was rejected: touch
    /// input, a non-drawing tool, or a pointer already down.
    pub fn pointer_down(&mut self, store: &mut SceneStore, sample: &PointerSample) -> bool {
        if sample.pointer_type == PointerType::Touch {
            log::debug!("Rejecting touch pointer at ({}, {})", sample.x, sample.y);
            return false;
        }
        if self.is_drawing() {
            return false;
        }
        let tool = store.tool();
        if !tool.is_drawing() {
            return false;
        }

        let scene_pt = store.screen_to_scene(sample.screen_point());

        // Barrel button turns any drawing tool into a paint eraser.
        if sample.barrel && sample.pointer_type == PointerType::Pen {
            self.pressure.reset();
            let pressure = self.pressure.resolve(scene_pt, sample.pressure);
            self.state = CaptureState::Drawing {
                pending: PendingStroke {
                    points: vec![InkPoint::with_pressure(scene_pt.x, scene_pt.y, pressure)],
                    style: store.brush().eraser_style(),
                },
                mode: DrawMode::Ink,
            };
            return true;
        }

        if tool == ToolKind::Eraser && store.eraser_mode() == EraserMode::Pixel {
            self.state = CaptureState::Drawing {
                pending: PendingStroke {
                    points: Vec::new(),
                    style: store.brush().eraser_style(),
                },
                mode: DrawMode::PixelErase,
            };
            return true;
        }

        let Some(style) = store.brush().style_for(tool) else {
            return false;
        };

        if let Some(kind) = tool.shape_kind() {
            self.state = CaptureState::Drawing {
                pending: PendingStroke {
                    points: vec![InkPoint::with_pressure(scene_pt.x, scene_pt.y, 1.0)],
                    style,
                },
                mode: DrawMode::Shape {
                    kind,
                    anchor: scene_pt,
                },
            };
            return true;
        }

        self.pressure.reset();
        let pressure = self.pressure.resolve(scene_pt, sample.pressure);
        self.state = CaptureState::Drawing {
            pending: PendingStroke {
                points: vec![InkPoint::with_pressure(scene_pt.x, scene_pt.y, pressure)],
                style,
            },
            mode: DrawMode::Ink,
        };
        true
    }

    /// Extend the stroke in flight. Ignored while idle and for touch input.
    pub fn pointer_move(&mut self, store: &mut SceneStore, sample: &PointerSample) {
        if sample.pointer_type == PointerType::Touch {
            return;
        }
        let scene_pt = store.screen_to_scene(sample.screen_point());
        let CaptureState::Drawing { pending, mode } = &mut self.state else {
            return;
        };
        match *mode {
            DrawMode::Ink => {
                let pressure = self.pressure.resolve(scene_pt, sample.pressure);
                pending
                    .points
                    .push(InkPoint::with_pressure(scene_pt.x, scene_pt.y, pressure));
            }
            DrawMode::Shape { kind, anchor } => {
                pending.points = geometry::shape_from_drag(kind, anchor, scene_pt, sample.shift);
            }
            DrawMode::PixelErase => {
                let reach = PIXEL_ERASE_REACH * store.brush().eraser_width();
                let doomed: Vec<StrokeId> = store
                    .strokes()
                    .iter()
                    .filter(|s| !s.is_eraser && s.min_sample_distance(scene_pt) <= reach)
                    .map(|s| s.id)
                    .collect();
                for id in doomed {
                    store.remove_stroke(&id);
                }
            }
        }
    }

    /// Finish the stroke and commit it. Freehand ink is simplified first;
    /// shape previews commit as dragged. Returns the committed stroke id,
    /// or `None` when nothing was committed (too short, or erase mode).
    pub fn pointer_up(&mut self, store: &mut SceneStore) -> Option<StrokeId> {
        let state = std::mem::replace(&mut self.state, CaptureState::Idle);
        self.pressure.reset();
        let CaptureState::Drawing { pending, mode } = state else {
            return None;
        };
        match mode {
            DrawMode::PixelErase => None,
            DrawMode::Ink => {
                let points = geometry::simplify_polyline(&pending.points, SIMPLIFY_TOLERANCE);
                store.commit_stroke_styled(points, pending.style)
            }
            DrawMode::Shape { .. } => store.commit_stroke_styled(pending.points, pending.style),
        }
    }

    /// Pointer left the canvas: same semantics as lifting it.
    pub fn pointer_leave(&mut self, store: &mut SceneStore) -> Option<StrokeId> {
        self.pointer_up(store)
    }

    /// Abandon the stroke in flight without committing anything.
    pub fn cancel(&mut self) {
        self.state = CaptureState::Idle;
        self.pressure.reset();
    }
}
