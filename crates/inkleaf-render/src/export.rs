//! Flattened raster export.
//!
//! Exports compose like the on-screen frame but at document resolution:
//! background, then the page pattern, then images and text, then ink. Ink
//! is rasterized on its own transparent surface first so eraser strokes
//! only cut through ink and never through the page underneath.

use inkleaf_core::page::PageLayout;
use inkleaf_core::scene::SceneStore;
use kurbo::Affine;
use tiny_skia::{PixmapPaint, Transform};

use crate::error::{RenderError, RenderResult};
use crate::painter;
use crate::surface::Surface;

fn scaled_dimension(value: f64, scale: f64) -> u32 {
    (value * scale).round().max(1.0) as u32
}

fn page_transform(layout: &PageLayout, page_index: usize, scale: f64) -> Transform {
    let (page_top, _) = layout.page_span(page_index);
    painter::skia_transform(Affine::scale(scale) * Affine::translate((0.0, -page_top)))
}

/// Rasterize the ink that touches one page onto a transparent surface.
pub(crate) fn render_page_ink(
    store: &SceneStore,
    page_index: usize,
    scale: f64,
) -> RenderResult<Surface> {
    let layout = store.layout();
    let mut ink = Surface::new(
        scaled_dimension(layout.width, scale),
        scaled_dimension(layout.height, scale),
    )?;
    let transform = page_transform(layout, page_index, scale);
    for stroke in store.strokes() {
        let (min_y, max_y) = stroke.vertical_span();
        if layout.intersects_page(page_index, min_y, max_y) {
            painter::paint_stroke(ink.pixmap_mut(), stroke, transform);
        }
    }
    Ok(ink)
}

/// Flatten one page into an opaque surface at `scale` pixels per scene
/// unit.
pub fn render_page_surface(
    store: &SceneStore,
    page_index: usize,
    scale: f64,
) -> RenderResult<Surface> {
    if page_index >= store.page_count() {
        return Err(RenderError::PageOutOfRange(page_index));
    }
    let layout = store.layout();
    let mut surface = Surface::new(
        scaled_dimension(layout.width, scale),
        scaled_dimension(layout.height, scale),
    )?;
    surface.clear(store.background());
    let transform = page_transform(layout, page_index, scale);
    painter::paint_pattern(
        surface.pixmap_mut(),
        store.pattern(),
        layout.page_rect(page_index),
        transform,
    );
    for object in store.objects() {
        let (min_y, max_y) = object.vertical_span();
        if layout.intersects_page(page_index, min_y, max_y) {
            painter::paint_object(surface.pixmap_mut(), object, transform);
        }
    }

    let ink = render_page_ink(store, page_index, scale)?;
    surface.pixmap_mut().draw_pixmap(
        0,
        0,
        ink.pixmap().as_ref(),
        &PixmapPaint::default(),
        Transform::identity(),
        None,
    );
    Ok(surface)
}

/// Flatten the whole canvas, pages stacked with their gaps, at `scale`
/// pixels per scene unit.
pub fn render_canvas(store: &SceneStore, scale: f64) -> RenderResult<Surface> {
    let layout = store.layout();
    let width = scaled_dimension(layout.width, scale);
    let height = scaled_dimension(layout.total_height(store.page_count()), scale);
    let mut surface = Surface::new(width, height)?;
    surface.clear(store.background());
    let transform = painter::skia_transform(Affine::scale(scale));
    for index in 0..store.page_count() {
        painter::paint_pattern(
            surface.pixmap_mut(),
            store.pattern(),
            layout.page_rect(index),
            transform,
        );
    }
    painter::paint_objects(surface.pixmap_mut(), store.objects(), transform);

    let mut ink = Surface::new(width, height)?;
    for stroke in store.strokes() {
        painter::paint_stroke(ink.pixmap_mut(), stroke, transform);
    }
    surface.pixmap_mut().draw_pixmap(
        0,
        0,
        ink.pixmap().as_ref(),
        &PixmapPaint::default(),
        Transform::identity(),
        None,
    );
    Ok(surface)
}

/// Encode a surface as a PNG.
pub fn encode_png(surface: &Surface) -> RenderResult<Vec<u8>> {
    let mut bytes = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut bytes, surface.width(), surface.height());
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder
            .write_header()
            .map_err(|e| RenderError::Encode(e.to_string()))?;
        writer
            .write_image_data(&surface.rgba_bytes())
            .map_err(|e| RenderError::Encode(e.to_string()))?;
        writer
            .finish()
            .map_err(|e| RenderError::Encode(e.to_string()))?;
    }
    Ok(bytes)
}

/// Export one page as a PNG.
pub fn export_page_png(store: &SceneStore, page_index: usize, scale: f64) -> RenderResult<Vec<u8>> {
    encode_png(&render_page_surface(store, page_index, scale)?)
}

/// Export the whole canvas as a PNG.
pub fn export_png(store: &SceneStore, scale: f64) -> RenderResult<Vec<u8>> {
    encode_png(&render_canvas(store, scale)?)
}

/// Derive a download file name from the project name.
///
/// Everything outside alphanumerics, `-` and `_` maps to `_`, matching
/// the rule document ids go through before hitting the file system.
pub fn export_file_name(project_name: &str, extension: &str) -> String {
    let name: String = project_name
        .trim()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if name.is_empty() {
        format!("untitled.{extension}")
    } else {
        format!("{name}.{extension}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use inkleaf_core::color::SerializableColor;
    use inkleaf_core::page::{A4_HEIGHT_PX, A4_WIDTH_PX, DEFAULT_PAGE_GAP};
    use inkleaf_core::stroke::InkPoint;
    use inkleaf_core::tools::{BackgroundPattern, ToolKind};

    fn store_with_stroke_at(y: f64) -> SceneStore {
        let mut store = SceneStore::new();
        store.set_tool(ToolKind::Pen);
        store.set_pen_width(12.0);
        store
            .commit_stroke(vec![
                InkPoint::with_pressure(100.0, y, 1.0),
                InkPoint::with_pressure(200.0, y, 1.0),
            ])
            .unwrap();
        store
    }

    #[test]
    fn test_page_surface_dimensions() {
        let store = SceneStore::new();
        let surface = render_page_surface(&store, 0, 1.0).unwrap();
        assert_eq!(surface.width(), A4_WIDTH_PX as u32);
        assert_eq!(surface.height(), A4_HEIGHT_PX as u32);
    }

    #[test]
    fn test_page_out_of_range() {
        let store = SceneStore::new();
        assert!(matches!(
            render_page_surface(&store, 3, 1.0),
            Err(RenderError::PageOutOfRange(3))
        ));
    }

    #[test]
    fn test_page_surface_places_ink_in_page_coordinates() {
        let mut store = store_with_stroke_at(300.0);
        store.add_page();
        let stride = A4_HEIGHT_PX + DEFAULT_PAGE_GAP;
        store.set_tool(ToolKind::Pen);
        store
            .commit_stroke(vec![
                InkPoint::with_pressure(100.0, stride + 600.0, 1.0),
                InkPoint::with_pressure(200.0, stride + 600.0, 1.0),
            ])
            .unwrap();

        let first = render_page_surface(&store, 0, 1.0).unwrap();
        assert!(first.pixmap().pixel(150, 300).unwrap().alpha() > 0);
        assert!(first.pixmap().pixel(150, 300).unwrap().red() < 100);

        // The second page's stroke lands at its page-local position.
        let second = render_page_surface(&store, 1, 1.0).unwrap();
        assert!(second.pixmap().pixel(150, 600).unwrap().red() < 100);
        assert_eq!(second.pixmap().pixel(150, 300).unwrap().red(), 255);
    }

    #[test]
    fn test_eraser_reveals_page_not_transparency() {
        let mut store = store_with_stroke_at(55.0);
        store.set_tool(ToolKind::Eraser);
        store.set_eraser_width(30.0);
        store
            .commit_stroke(vec![
                InkPoint::with_pressure(140.0, 55.0, 1.0),
                InkPoint::with_pressure(160.0, 55.0, 1.0),
            ])
            .unwrap();

        let surface = render_page_surface(&store, 0, 1.0).unwrap();
        let px = surface.pixmap().pixel(150, 55).unwrap();
        assert_eq!(px.alpha(), 255);
        assert_eq!(px.red(), 255);
    }

    #[test]
    fn test_pattern_painted_under_ink() {
        let mut store = SceneStore::new();
        store.set_pattern(BackgroundPattern::Grid);
        let surface = render_page_surface(&store, 0, 1.0).unwrap();
        // A vertical grid line runs at x = 40.
        let px = surface.pixmap().pixel(40, 10).unwrap();
        assert_eq!(px.alpha(), 255);
        assert!(px.red() < 255);
    }

    #[test]
    fn test_canvas_export_covers_all_pages() {
        let mut store = store_with_stroke_at(300.0);
        store.add_page();
        let bytes = export_png(&store, 0.5).unwrap();
        let decoder = png::Decoder::new(&bytes[..]);
        let reader = decoder.read_info().unwrap();
        let info = reader.info();
        assert_eq!(info.width, (A4_WIDTH_PX * 0.5).round() as u32);
        let total = A4_HEIGHT_PX * 2.0 + DEFAULT_PAGE_GAP;
        assert_eq!(info.height, (total * 0.5).round() as u32);
    }

    #[test]
    fn test_gap_between_pages_shows_background() {
        let mut store = SceneStore::new();
        store.add_page();
        store.set_pattern(BackgroundPattern::Grid);
        store.set_background(SerializableColor::opaque(250, 250, 250));
        let surface = render_canvas(&store, 1.0).unwrap();
        let gap_y = (A4_HEIGHT_PX + DEFAULT_PAGE_GAP / 2.0) as u32;
        let px = surface.pixmap().pixel(100, gap_y).unwrap();
        assert_eq!(px.red(), 250);
    }

    #[test]
    fn test_export_file_name() {
        assert_eq!(export_file_name("My First Board", "pdf"), "My_First_Board.pdf");
        assert_eq!(export_file_name("notes", "png"), "notes.png");
        assert_eq!(export_file_name("   ", "png"), "untitled.png");
        // Separators and punctuation cannot leak into the file name.
        assert_eq!(export_file_name("My:Board/v2", "png"), "My_Board_v2.png");
    }
}
