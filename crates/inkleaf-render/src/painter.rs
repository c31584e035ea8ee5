//! Raster painting primitives over tiny-skia pixmaps.
//!
//! Strokes render three ways: pressure-tapered fills for pen ink, solid
//! round-capped polylines for highlighter and shape strokes, and
//! destination-out fills for eraser strokes so they cut through whatever
//! ink sits below them in the same layer.

use inkleaf_core::color::SerializableColor;
use inkleaf_core::geometry;
use inkleaf_core::object::{ImageNode, SceneObject, TextNode};
use inkleaf_core::page::PageLayout;
use inkleaf_core::stroke::{InkPoint, Stroke, StrokeStyle};
use inkleaf_core::tools::BackgroundPattern;
use kurbo::{Affine, BezPath, PathEl, Rect};
use tiny_skia::{
    BlendMode, FillRule, FilterQuality, IntSize, LineCap, LineJoin, Paint, PathBuilder, Pixmap,
    PixmapPaint, Transform,
};

use crate::error::{RenderError, RenderResult};
use crate::text;

/// Grid cell size in scene units.
pub const GRID_SPACING: f64 = 40.0;

/// Ruled-line spacing in scene units.
pub const LINE_SPACING: f64 = 32.0;

/// Dot grid spacing in scene units.
pub const DOT_SPACING: f64 = 40.0;

pub(crate) const DOT_RADIUS: f64 = 1.5;
pub(crate) const PATTERN_COLOR: SerializableColor = SerializableColor::opaque(203, 208, 216);
pub(crate) const RULED_COLOR: SerializableColor = SerializableColor::opaque(180, 202, 223);
const GUIDE_COLOR: SerializableColor = SerializableColor::opaque(189, 193, 198);

pub(crate) fn skia_color(color: SerializableColor) -> tiny_skia::Color {
    tiny_skia::Color::from_rgba8(color.r, color.g, color.b, color.a)
}

/// kurbo affine to tiny-skia transform. Both use row-major
/// `[sx ky kx sy tx ty]` coefficient order.
pub(crate) fn skia_transform(affine: Affine) -> Transform {
    let c = affine.as_coeffs();
    Transform::from_row(
        c[0] as f32,
        c[1] as f32,
        c[2] as f32,
        c[3] as f32,
        c[4] as f32,
        c[5] as f32,
    )
}

pub(crate) fn bez_to_path(path: &BezPath) -> Option<tiny_skia::Path> {
    let mut pb = PathBuilder::new();
    for el in path.iter() {
        match el {
            PathEl::MoveTo(p) => pb.move_to(p.x as f32, p.y as f32),
            PathEl::LineTo(p) => pb.line_to(p.x as f32, p.y as f32),
            PathEl::QuadTo(c, p) => pb.quad_to(c.x as f32, c.y as f32, p.x as f32, p.y as f32),
            PathEl::CurveTo(c1, c2, p) => pb.cubic_to(
                c1.x as f32,
                c1.y as f32,
                c2.x as f32,
                c2.y as f32,
                p.x as f32,
                p.y as f32,
            ),
            PathEl::ClosePath => pb.close(),
        }
    }
    pb.finish()
}

fn fill_paint(color: SerializableColor, blend_mode: BlendMode) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color(skia_color(color));
    paint.anti_alias = true;
    paint.blend_mode = blend_mode;
    paint
}

fn solid_stroke(width: f64) -> tiny_skia::Stroke {
    tiny_skia::Stroke {
        width: width as f32,
        line_cap: LineCap::Round,
        line_join: LineJoin::Round,
        ..tiny_skia::Stroke::default()
    }
}

/// Paint raw ink samples with a style. Used for both committed strokes and
/// the in-progress stroke.
pub fn paint_ink(
    pixmap: &mut Pixmap,
    points: &[InkPoint],
    style: &StrokeStyle,
    transform: Transform,
) {
    if points.len() < 2 {
        return;
    }
    if style.is_eraser {
        if let Some(path) = bez_to_path(&geometry::stroke_path(points, style.size)) {
            let paint = fill_paint(style.color, BlendMode::DestinationOut);
            pixmap.fill_path(&path, &paint, FillRule::Winding, transform, None);
        }
        return;
    }
    if style.is_highlighter || style.is_shape {
        if let Some(path) = bez_to_path(&geometry::centerline_path(points)) {
            let paint = fill_paint(style.color, BlendMode::SourceOver);
            pixmap.stroke_path(&path, &paint, &solid_stroke(style.size), transform, None);
        }
        return;
    }
    if let Some(path) = bez_to_path(&geometry::stroke_path(points, style.size)) {
        let paint = fill_paint(style.color, BlendMode::SourceOver);
        pixmap.fill_path(&path, &paint, FillRule::Winding, transform, None);
    }
}

pub fn paint_stroke(pixmap: &mut Pixmap, stroke: &Stroke, transform: Transform) {
    paint_ink(pixmap, &stroke.points, &stroke.style(), transform);
}

/// Draw a background pattern across a rect, anchored at the rect's origin.
pub fn paint_pattern(
    pixmap: &mut Pixmap,
    pattern: BackgroundPattern,
    rect: Rect,
    transform: Transform,
) {
    match pattern {
        BackgroundPattern::Blank => {}
        BackgroundPattern::Grid => {
            let mut pb = PathBuilder::new();
            let mut x = rect.x0 + GRID_SPACING;
            while x < rect.x1 {
                pb.move_to(x as f32, rect.y0 as f32);
                pb.line_to(x as f32, rect.y1 as f32);
                x += GRID_SPACING;
            }
            let mut y = rect.y0 + GRID_SPACING;
            while y < rect.y1 {
                pb.move_to(rect.x0 as f32, y as f32);
                pb.line_to(rect.x1 as f32, y as f32);
                y += GRID_SPACING;
            }
            if let Some(path) = pb.finish() {
                let paint = fill_paint(PATTERN_COLOR, BlendMode::SourceOver);
                pixmap.stroke_path(&path, &paint, &solid_stroke(1.0), transform, None);
            }
        }
        BackgroundPattern::Lines => {
            let mut pb = PathBuilder::new();
            let mut y = rect.y0 + LINE_SPACING;
            while y < rect.y1 {
                pb.move_to(rect.x0 as f32, y as f32);
                pb.line_to(rect.x1 as f32, y as f32);
                y += LINE_SPACING;
            }
            if let Some(path) = pb.finish() {
                let paint = fill_paint(RULED_COLOR, BlendMode::SourceOver);
                pixmap.stroke_path(&path, &paint, &solid_stroke(1.0), transform, None);
            }
        }
        BackgroundPattern::Dots => {
            let mut pb = PathBuilder::new();
            let mut y = rect.y0 + DOT_SPACING;
            while y < rect.y1 {
                let mut x = rect.x0 + DOT_SPACING;
                while x < rect.x1 {
                    pb.push_circle(x as f32, y as f32, DOT_RADIUS as f32);
                    x += DOT_SPACING;
                }
                y += DOT_SPACING;
            }
            if let Some(path) = pb.finish() {
                let paint = fill_paint(PATTERN_COLOR, BlendMode::SourceOver);
                pixmap.fill_path(&path, &paint, FillRule::Winding, transform, None);
            }
        }
    }
}

/// Outline every page so the user can see where the printable areas are.
pub fn paint_page_guides(
    pixmap: &mut Pixmap,
    layout: &PageLayout,
    page_count: usize,
    transform: Transform,
) {
    let mut pb = PathBuilder::new();
    for index in 0..page_count {
        let rect = layout.page_rect(index);
        if let Some(r) = tiny_skia::Rect::from_ltrb(
            rect.x0 as f32,
            rect.y0 as f32,
            rect.x1 as f32,
            rect.y1 as f32,
        ) {
            pb.push_rect(r);
        }
    }
    if let Some(path) = pb.finish() {
        let paint = fill_paint(GUIDE_COLOR, BlendMode::SourceOver);
        pixmap.stroke_path(&path, &paint, &solid_stroke(1.0), transform, None);
    }
}

/// Decode and draw one image at its display size.
pub fn paint_image(
    pixmap: &mut Pixmap,
    image: &ImageNode,
    transform: Transform,
) -> RenderResult<()> {
    let data = image.data().map_err(|e| RenderError::Image(e.to_string()))?;
    let decoded = image::load_from_memory(&data).map_err(|e| RenderError::Image(e.to_string()))?;
    let rgba = decoded.to_rgba8();
    let (w, h) = rgba.dimensions();
    let mut pixels = rgba.into_raw();
    for px in pixels.chunks_exact_mut(4) {
        let a = px[3] as u16;
        px[0] = ((px[0] as u16 * a) / 255) as u8;
        px[1] = ((px[1] as u16 * a) / 255) as u8;
        px[2] = ((px[2] as u16 * a) / 255) as u8;
    }
    let size = IntSize::from_wh(w, h).ok_or_else(|| RenderError::Image("empty image".to_string()))?;
    let src = Pixmap::from_vec(pixels, size)
        .ok_or_else(|| RenderError::Image("pixel buffer size mismatch".to_string()))?;

    let sx = (image.width / w as f64) as f32;
    let sy = (image.height / h as f64) as f32;
    let placed = transform
        .pre_concat(Transform::from_translate(image.x as f32, image.y as f32))
        .pre_concat(Transform::from_scale(sx, sy));
    let paint = PixmapPaint {
        quality: FilterQuality::Bilinear,
        ..PixmapPaint::default()
    };
    pixmap.draw_pixmap(0, 0, src.as_ref(), &paint, placed, None);
    Ok(())
}

/// Draw one image or text node. A failed image decode is logged and
/// skipped.
pub fn paint_object(pixmap: &mut Pixmap, object: &SceneObject, transform: Transform) {
    match object {
        SceneObject::Image(image) => {
            if let Err(e) = paint_image(pixmap, image, transform) {
                log::warn!("Skipping image {}: {e}", image.id);
            }
        }
        SceneObject::Text(node) => {
            paint_text(pixmap, node, transform);
        }
    }
}

pub fn paint_objects(pixmap: &mut Pixmap, objects: &[SceneObject], transform: Transform) {
    for object in objects {
        paint_object(pixmap, object, transform);
    }
}

/// Rasterize a text node. Best effort: without a usable system font the
/// node is skipped.
pub fn paint_text(pixmap: &mut Pixmap, node: &TextNode, transform: Transform) {
    if !text::draw_text(pixmap, node, transform) {
        log::debug!("Text node {} skipped (no font)", node.id);
    }
}
