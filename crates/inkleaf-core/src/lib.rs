//! Inkleaf Core Library
//!
//! Platform-agnostic scene, capture, and history engine for the Inkleaf
//! handwriting studio.

pub mod capture;
pub mod color;
pub mod geometry;
pub mod lasso;
pub mod object;
pub mod page;
pub mod pdf;
pub mod scene;
pub mod storage;
pub mod stroke;
pub mod tools;
pub mod viewport;

pub use capture::{CapturePipeline, PendingStroke, PointerSample, PointerType};
pub use color::SerializableColor;
pub use geometry::ShapeKind;
pub use lasso::{Corner, CornerResize, DragMove, NUDGE_STEP, NudgeDirection};
pub use object::{ImageFormat, ImageNode, ObjectId, SceneObject, TextNode};
pub use page::{A4_HEIGHT_PX, A4_WIDTH_PX, PageLayout};
pub use pdf::{PdfPageImage, PdfPageSource, PdfUnlockError};
pub use scene::{HistoryEntry, SceneStore, Selection, Snapshot};
pub use storage::{AutoSaveManager, MemoryStorage, Storage, StorageError, StorageResult};
pub use stroke::{InkPoint, Stroke, StrokeId, StrokeStyle};
pub use tools::{BackgroundPattern, BrushSettings, EraserMode, ToolKind};
pub use viewport::{MAX_ZOOM, MIN_ZOOM, Viewport, ZOOM_STEP};
