//! Text rasterization with ab_glyph.
//!
//! The engine ships no fonts; it borrows whatever sans-serif the system
//! has. When none of the known locations yields a font, text nodes simply
//! do not rasterize (PDF export still renders them as real text).

use ab_glyph::{Font, FontArc, PxScale, ScaleFont, point};
use inkleaf_core::color::SerializableColor;
use inkleaf_core::object::TextNode;
use std::sync::OnceLock;
use tiny_skia::{Pixmap, PremultipliedColorU8, Transform};

static SYSTEM_FONT: OnceLock<Option<FontArc>> = OnceLock::new();

const FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/noto/NotoSans-Regular.ttf",
    "/Library/Fonts/Arial.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

fn system_font() -> Option<&'static FontArc> {
    SYSTEM_FONT
        .get_or_init(|| {
            for path in FONT_CANDIDATES {
                if let Ok(bytes) = std::fs::read(path) {
                    if let Ok(font) = FontArc::try_from_vec(bytes) {
                        log::debug!("Loaded text font from {path}");
                        return Some(font);
                    }
                }
            }
            log::warn!("No usable system font found; text will not rasterize");
            None
        })
        .as_ref()
}

fn map_point(t: Transform, x: f32, y: f32) -> (f32, f32) {
    (t.sx * x + t.kx * y + t.tx, t.ky * x + t.sy * y + t.ty)
}

/// Rasterize a text node onto a pixmap. The transform must be a uniform
/// scale plus translation (which viewport and export transforms are).
/// Returns `false` when no font is available.
pub fn draw_text(pixmap: &mut Pixmap, node: &TextNode, transform: Transform) -> bool {
    let Some(font) = system_font() else {
        return false;
    };
    let px = (node.font_size * transform.sx as f64) as f32;
    if px <= 0.0 {
        return true;
    }
    let scale = PxScale::from(px);
    let scaled = font.as_scaled(scale);
    let (origin_x, origin_y) = map_point(transform, node.x as f32, node.y as f32);
    let line_height = px * 1.2;

    let mut baseline = origin_y + scaled.ascent();
    for line in node.content.lines() {
        let mut caret = origin_x;
        let mut previous = None;
        for ch in line.chars() {
            let id = font.glyph_id(ch);
            if let Some(prev) = previous {
                caret += scaled.kern(prev, id);
            }
            let glyph = id.with_scale_and_position(scale, point(caret, baseline));
            if let Some(outline) = font.outline_glyph(glyph) {
                let bounds = outline.px_bounds();
                outline.draw(|gx, gy, coverage| {
                    blend_pixel(
                        pixmap,
                        bounds.min.x as i32 + gx as i32,
                        bounds.min.y as i32 + gy as i32,
                        node.color,
                        coverage,
                    );
                });
            }
            caret += scaled.h_advance(id);
            previous = Some(id);
        }
        baseline += line_height;
    }
    true
}

/// Source-over blend of one coverage sample into premultiplied pixels.
fn blend_pixel(pixmap: &mut Pixmap, x: i32, y: i32, color: SerializableColor, coverage: f32) {
    if x < 0 || y < 0 || x >= pixmap.width() as i32 || y >= pixmap.height() as i32 {
        return;
    }
    let alpha = (coverage * color.a as f32 / 255.0).clamp(0.0, 1.0);
    if alpha <= 0.0 {
        return;
    }
    let width = pixmap.width() as usize;
    let idx = y as usize * width + x as usize;
    let pixels = pixmap.pixels_mut();
    let dst = pixels[idx];
    let inv = 1.0 - alpha;

    let a_out = (alpha * 255.0 + dst.alpha() as f32 * inv).round().min(255.0);
    let r_out = (color.r as f32 * alpha + dst.red() as f32 * inv)
        .round()
        .min(a_out);
    let g_out = (color.g as f32 * alpha + dst.green() as f32 * inv)
        .round()
        .min(a_out);
    let b_out = (color.b as f32 * alpha + dst.blue() as f32 * inv)
        .round()
        .min(a_out);
    if let Some(px) =
        PremultipliedColorU8::from_rgba(r_out as u8, g_out as u8, b_out as u8, a_out as u8)
    {
        pixels[idx] = px;
    }
}
