//! Inkleaf Render Library
//!
//! CPU compositor and export pipeline for Inkleaf. Rasterization runs on
//! tiny-skia; exports produce PNG and multi-page PDF documents.

mod compositor;
mod context;
mod error;
mod export;
mod painter;
mod pdf;
mod surface;
mod text;

pub use compositor::Compositor;
pub use context::RenderContext;
pub use error::{RenderError, RenderResult};
pub use export::{
    encode_png, export_file_name, export_page_png, export_png, render_canvas,
    render_page_surface,
};
pub use painter::{
    DOT_SPACING, GRID_SPACING, LINE_SPACING, paint_ink, paint_object, paint_objects,
    paint_page_guides, paint_pattern, paint_stroke, paint_text,
};
pub use pdf::{DEFAULT_INK_SCALE, PDF_PAGE_HEIGHT_PT, PDF_PAGE_WIDTH_PT, export_pdf};
pub use surface::Surface;
