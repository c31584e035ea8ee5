//! Tool selection and brush settings.

use crate::color::SerializableColor;
use crate::geometry::ShapeKind;
use crate::stroke::StrokeStyle;
use serde::{Deserialize, Serialize};

pub const MIN_PEN_WIDTH: f64 = 1.0;
pub const MAX_PEN_WIDTH: f64 = 50.0;
pub const MIN_ERASER_WIDTH: f64 = 5.0;
pub const MAX_ERASER_WIDTH: f64 = 100.0;

/// Alpha applied to highlighter ink (roughly 40% coverage).
pub const HIGHLIGHTER_ALPHA: u8 = 102;

/// The active tool. Shape tools share the pen's brush settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolKind {
    #[default]
    Select,
    Pen,
    Highlighter,
    Eraser,
    Text,
    Rectangle,
    Circle,
    Triangle,
    Line,
    Arrow,
}

impl ToolKind {
    /// Whether pointer input with this tool produces ink.
    pub fn is_drawing(&self) -> bool {
        !matches!(self, ToolKind::Select | ToolKind::Text)
    }

    /// The primitive a shape tool drags out, if any.
    pub fn shape_kind(&self) -> Option<ShapeKind> {
        match self {
            ToolKind::Rectangle => Some(ShapeKind::Rectangle),
            ToolKind::Circle => Some(ShapeKind::Circle),
            ToolKind::Triangle => Some(ShapeKind::Triangle),
            ToolKind::Line => Some(ShapeKind::Line),
            ToolKind::Arrow => Some(ShapeKind::Arrow),
            _ => None,
        }
    }
}

/// How the eraser removes content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EraserMode {
    /// Paint subtractive eraser strokes over committed ink.
    #[default]
    Paint,
    /// Delete whole strokes whose samples pass near the pointer.
    Pixel,
}

/// Background fill behind the pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackgroundPattern {
    #[default]
    Blank,
    Grid,
    Lines,
    Dots,
}

/// Pen and eraser settings, clamped to their legal ranges on every write.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BrushSettings {
    pen_color: SerializableColor,
    pen_width: f64,
    eraser_width: f64,
}

impl Default for BrushSettings {
    fn default() -> Self {
        Self {
            pen_color: SerializableColor::BLACK,
            pen_width: 3.0,
            eraser_width: 20.0,
        }
    }
}

impl BrushSettings {
    pub fn pen_color(&self) -> SerializableColor {
        self.pen_color
    }

    pub fn set_pen_color(&mut self, color: SerializableColor) {
        self.pen_color = color;
    }

    pub fn pen_width(&self) -> f64 {
        self.pen_width
    }

    pub fn set_pen_width(&mut self, width: f64) {
        self.pen_width = width.clamp(MIN_PEN_WIDTH, MAX_PEN_WIDTH);
    }

    pub fn eraser_width(&self) -> f64 {
        self.eraser_width
    }

    pub fn set_eraser_width(&mut self, width: f64) {
        self.eraser_width = width.clamp(MIN_ERASER_WIDTH, MAX_ERASER_WIDTH);
    }

    /// Stroke style a tool draws with. `None` for tools that do not draw.
    pub fn style_for(&self, tool: ToolKind) -> Option<StrokeStyle> {
        match tool {
            ToolKind::Pen => Some(StrokeStyle {
                color: self.pen_color,
                size: self.pen_width,
                ..StrokeStyle::default()
            }),
            ToolKind::Highlighter => Some(StrokeStyle {
                color: self.pen_color.with_alpha(HIGHLIGHTER_ALPHA),
                size: self.pen_width,
                is_highlighter: true,
                ..StrokeStyle::default()
            }),
            ToolKind::Eraser => Some(StrokeStyle {
                color: SerializableColor::WHITE,
                size: self.eraser_width,
                is_eraser: true,
                ..StrokeStyle::default()
            }),
            tool if tool.shape_kind().is_some() => Some(StrokeStyle {
                color: self.pen_color,
                size: self.pen_width,
                is_shape: true,
                ..StrokeStyle::default()
            }),
            _ => None,
        }
    }

    /// Style for erasing regardless of the active tool, used for pen barrel
    /// button erasing.
    pub fn eraser_style(&self) -> StrokeStyle {
        StrokeStyle {
            color: SerializableColor::WHITE,
            size: self.eraser_width,
            is_eraser: true,
            ..StrokeStyle::default()
        }
    }
}
