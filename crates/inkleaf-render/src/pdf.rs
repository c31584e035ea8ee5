//! Multi-page PDF export built directly on lopdf.
//!
//! Backgrounds, patterns, and text go out as native PDF operators. Images
//! embed as XObjects, with JPEG data passed through untouched. Ink is
//! rasterized per page onto a transparent surface and embedded as one
//! full-page soft-masked image, which preserves eraser cuts and pressure
//! tapering exactly as rendered on screen.

use inkleaf_core::color::SerializableColor;
use inkleaf_core::geometry;
use inkleaf_core::object::{ImageFormat, ImageNode, SceneObject, TextNode};
use inkleaf_core::page::PageLayout;
use inkleaf_core::scene::SceneStore;
use inkleaf_core::tools::BackgroundPattern;
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, dictionary};

use crate::error::{RenderError, RenderResult};
use crate::export;
use crate::painter;
use crate::surface::Surface;

/// A4 portrait width in PDF points.
pub const PDF_PAGE_WIDTH_PT: f64 = 595.28;

/// A4 portrait height in PDF points.
pub const PDF_PAGE_HEIGHT_PT: f64 = 841.89;

/// Default raster density for the ink overlay, in pixels per scene unit.
pub const DEFAULT_INK_SCALE: f64 = 2.0;

fn real(value: f64) -> Object {
    Object::Real(value as f32)
}

fn rgb_operands(color: SerializableColor) -> Vec<Object> {
    vec![
        real(color.r as f64 / 255.0),
        real(color.g as f64 / 255.0),
        real(color.b as f64 / 255.0),
    ]
}

fn background_operations(color: SerializableColor) -> Vec<Operation> {
    vec![
        Operation::new("rg", rgb_operands(color)),
        Operation::new(
            "re",
            vec![
                real(0.0),
                real(0.0),
                real(PDF_PAGE_WIDTH_PT),
                real(PDF_PAGE_HEIGHT_PT),
            ],
        ),
        Operation::new("f", vec![]),
    ]
}

/// Emit the page pattern as stroked or filled vector paths, mirroring the
/// raster pattern: lines start one spacing in from the page origin.
fn pattern_operations(pattern: BackgroundPattern, layout: &PageLayout, k: f64) -> Vec<Operation> {
    let h = PDF_PAGE_HEIGHT_PT;
    let w = PDF_PAGE_WIDTH_PT;
    let mut ops = Vec::new();
    match pattern {
        BackgroundPattern::Blank => {}
        BackgroundPattern::Grid => {
            ops.push(Operation::new("RG", rgb_operands(painter::PATTERN_COLOR)));
            ops.push(Operation::new("w", vec![real(0.5)]));
            let mut x = painter::GRID_SPACING;
            while x < layout.width {
                ops.push(Operation::new("m", vec![real(x * k), real(0.0)]));
                ops.push(Operation::new("l", vec![real(x * k), real(h)]));
                x += painter::GRID_SPACING;
            }
            let mut y = painter::GRID_SPACING;
            while y < layout.height {
                ops.push(Operation::new("m", vec![real(0.0), real(h - y * k)]));
                ops.push(Operation::new("l", vec![real(w), real(h - y * k)]));
                y += painter::GRID_SPACING;
            }
            ops.push(Operation::new("S", vec![]));
        }
        BackgroundPattern::Lines => {
            ops.push(Operation::new("RG", rgb_operands(painter::RULED_COLOR)));
            ops.push(Operation::new("w", vec![real(0.5)]));
            let mut y = painter::LINE_SPACING;
            while y < layout.height {
                ops.push(Operation::new("m", vec![real(0.0), real(h - y * k)]));
                ops.push(Operation::new("l", vec![real(w), real(h - y * k)]));
                y += painter::LINE_SPACING;
            }
            ops.push(Operation::new("S", vec![]));
        }
        BackgroundPattern::Dots => {
            ops.push(Operation::new("rg", rgb_operands(painter::PATTERN_COLOR)));
            let r = painter::DOT_RADIUS * k;
            let mut y = painter::DOT_SPACING;
            while y < layout.height {
                let mut x = painter::DOT_SPACING;
                while x < layout.width {
                    ops.push(Operation::new(
                        "re",
                        vec![
                            real(x * k - r),
                            real(h - y * k - r),
                            real(2.0 * r),
                            real(2.0 * r),
                        ],
                    ));
                    x += painter::DOT_SPACING;
                }
                y += painter::DOT_SPACING;
            }
            ops.push(Operation::new("f", vec![]));
        }
    }
    ops
}

/// Embed one image as an XObject. JPEG payloads keep their original bytes
/// behind a DCTDecode filter; other formats are decoded and re-embedded as
/// raw RGB plus an alpha soft mask where one is needed.
fn image_xobject(doc: &mut Document, image: &ImageNode) -> RenderResult<ObjectId> {
    let data = image.data().map_err(|e| RenderError::Image(e.to_string()))?;
    match image.format {
        ImageFormat::Jpeg => {
            let stream = Stream::new(
                dictionary! {
                    "Type" => "XObject",
                    "Subtype" => "Image",
                    "Width" => image.source_width as i64,
                    "Height" => image.source_height as i64,
                    "ColorSpace" => "DeviceRGB",
                    "BitsPerComponent" => 8,
                    "Filter" => "DCTDecode",
                },
                data,
            );
            Ok(doc.add_object(stream))
        }
        ImageFormat::Png | ImageFormat::WebP => {
            let decoded = image::load_from_memory(&data)
                .map_err(|e| RenderError::Image(e.to_string()))?;
            let rgba = decoded.to_rgba8();
            let (w, h) = rgba.dimensions();
            let mut rgb = Vec::with_capacity((w * h * 3) as usize);
            let mut alpha = Vec::with_capacity((w * h) as usize);
            let mut opaque = true;
            for px in rgba.as_raw().chunks_exact(4) {
                rgb.extend_from_slice(&px[..3]);
                if px[3] != 255 {
                    opaque = false;
                }
                alpha.push(px[3]);
            }
            let mut dict = dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => w as i64,
                "Height" => h as i64,
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => 8,
            };
            if !opaque {
                let smask_id = doc.add_object(gray_stream(w, h, alpha));
                dict.set("SMask", smask_id);
            }
            Ok(doc.add_object(Stream::new(dict, rgb)))
        }
    }
}

fn gray_stream(width: u32, height: u32, data: Vec<u8>) -> Stream {
    Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => width as i64,
            "Height" => height as i64,
            "ColorSpace" => "DeviceGray",
            "BitsPerComponent" => 8,
        },
        data,
    )
}

/// Embed a rasterized ink surface as a soft-masked RGB XObject.
fn ink_xobject(doc: &mut Document, surface: &Surface) -> ObjectId {
    let rgba = surface.rgba_bytes();
    let mut rgb = Vec::with_capacity(rgba.len() / 4 * 3);
    let mut alpha = Vec::with_capacity(rgba.len() / 4);
    for px in rgba.chunks_exact(4) {
        rgb.extend_from_slice(&px[..3]);
        alpha.push(px[3]);
    }
    let smask_id = doc.add_object(gray_stream(surface.width(), surface.height(), alpha));
    let mut dict = dictionary! {
        "Type" => "XObject",
        "Subtype" => "Image",
        "Width" => surface.width() as i64,
        "Height" => surface.height() as i64,
        "ColorSpace" => "DeviceRGB",
        "BitsPerComponent" => 8,
    };
    dict.set("SMask", smask_id);
    doc.add_object(Stream::new(dict, rgb))
}

fn place_image_operations(name: &str, image: &ImageNode, page_top: f64, k: f64) -> Vec<Operation> {
    let w = image.width * k;
    let h = image.height * k;
    let x = image.x * k;
    let y = PDF_PAGE_HEIGHT_PT - (image.y - page_top + image.height) * k;
    vec![
        Operation::new("q", vec![]),
        Operation::new(
            "cm",
            vec![real(w), real(0.0), real(0.0), real(h), real(x), real(y)],
        ),
        Operation::new("Do", vec![name.into()]),
        Operation::new("Q", vec![]),
    ]
}

fn text_operations(node: &TextNode, page_top: f64, k: f64) -> Vec<Operation> {
    let size = node.font_size * k;
    let leading = node.font_size * geometry::LINE_HEIGHT_FACTOR * k;
    let mut ops = vec![
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec!["F1".into(), real(size)]),
        Operation::new("rg", rgb_operands(node.color)),
    ];
    for (index, line) in node.content.lines().enumerate() {
        if index == 0 {
            let baseline = PDF_PAGE_HEIGHT_PT - ((node.y - page_top) + node.font_size) * k;
            ops.push(Operation::new("Td", vec![real(node.x * k), real(baseline)]));
        } else {
            ops.push(Operation::new("Td", vec![real(0.0), real(-leading)]));
        }
        ops.push(Operation::new("Tj", vec![Object::string_literal(line)]));
    }
    ops.push(Operation::new("ET", vec![]));
    ops
}

/// Export every page as an A4 PDF. `ink_scale` sets the raster density of
/// the ink overlay in pixels per scene unit.
pub fn export_pdf(store: &SceneStore, ink_scale: f64) -> RenderResult<Vec<u8>> {
    let layout = store.layout();
    let k = PDF_PAGE_WIDTH_PT / layout.width;
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });

    let mut kids: Vec<Object> = Vec::new();
    for page_index in 0..store.page_count() {
        let (page_top, _) = layout.page_span(page_index);
        let mut ops = background_operations(store.background());
        ops.extend(pattern_operations(store.pattern(), layout, k));

        let mut xobjects: Vec<(String, ObjectId)> = Vec::new();
        for object in store.objects() {
            let (min_y, max_y) = object.vertical_span();
            if !layout.intersects_page(page_index, min_y, max_y) {
                continue;
            }
            match object {
                SceneObject::Image(image) => match image_xobject(&mut doc, image) {
                    Ok(id) => {
                        let name = format!("Im{}", xobjects.len());
                        ops.extend(place_image_operations(&name, image, page_top, k));
                        xobjects.push((name, id));
                    }
                    Err(e) => log::warn!("Skipping image {} in PDF export: {e}", image.id),
                },
                SceneObject::Text(node) => ops.extend(text_operations(node, page_top, k)),
            }
        }

        let ink = export::render_page_ink(store, page_index, ink_scale)?;
        if ink.has_content() {
            let ink_id = ink_xobject(&mut doc, &ink);
            let name = format!("Ink{page_index}");
            ops.push(Operation::new("q", vec![]));
            ops.push(Operation::new(
                "cm",
                vec![
                    real(PDF_PAGE_WIDTH_PT),
                    real(0.0),
                    real(0.0),
                    real(PDF_PAGE_HEIGHT_PT),
                    real(0.0),
                    real(0.0),
                ],
            ));
            ops.push(Operation::new("Do", vec![name.as_str().into()]));
            ops.push(Operation::new("Q", vec![]));
            xobjects.push((name, ink_id));
        }

        let data = Content { operations: ops }
            .encode()
            .map_err(|e| RenderError::Pdf(e.to_string()))?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, data));

        let mut resources = dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        };
        if !xobjects.is_empty() {
            let mut xdict = Dictionary::new();
            for (name, id) in xobjects {
                xdict.set(name, id);
            }
            resources.set("XObject", xdict);
        }

        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources,
            "MediaBox" => vec![
                real(0.0),
                real(0.0),
                real(PDF_PAGE_WIDTH_PT),
                real(PDF_PAGE_HEIGHT_PT),
            ],
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)
        .map_err(|e| RenderError::Pdf(e.to_string()))?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use inkleaf_core::stroke::InkPoint;
    use inkleaf_core::tools::ToolKind;

    fn tiny_png() -> Vec<u8> {
        let mut bytes = Vec::new();
        let mut encoder = png::Encoder::new(&mut bytes, 2, 2);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header().unwrap();
        writer
            .write_image_data(&[255, 0, 0, 255].repeat(4))
            .unwrap();
        writer.finish().unwrap();
        bytes
    }

    fn decoded_page_ops(bytes: &[u8], page_number: u32) -> Vec<String> {
        let doc = Document::load_mem(bytes).unwrap();
        let pages = doc.get_pages();
        let page_id = pages[&page_number];
        let data = doc.get_page_content(page_id).unwrap();
        let content = Content::decode(&data).unwrap();
        content.operations.into_iter().map(|op| op.operator).collect()
    }

    #[test]
    fn test_empty_document_is_valid_single_page() {
        let store = SceneStore::new();
        let bytes = export_pdf(&store, DEFAULT_INK_SCALE).unwrap();
        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
    }

    #[test]
    fn test_page_count_matches_document() {
        let mut store = SceneStore::new();
        store.add_page();
        store.add_page();
        let bytes = export_pdf(&store, 1.0).unwrap();
        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 3);
    }

    #[test]
    fn test_ink_and_image_become_xobjects() {
        let mut store = SceneStore::new();
        store.set_tool(ToolKind::Pen);
        store
            .commit_stroke(vec![
                InkPoint::with_pressure(100.0, 100.0, 0.8),
                InkPoint::with_pressure(300.0, 200.0, 0.8),
            ])
            .unwrap();
        let image = ImageNode::new(50.0, 400.0, ImageFormat::Png, &tiny_png(), 2, 2);
        store.commit_image(image);

        let bytes = export_pdf(&store, 1.0).unwrap();
        let ops = decoded_page_ops(&bytes, 1);
        let draws = ops.iter().filter(|op| *op == "Do").count();
        assert_eq!(draws, 2);
    }

    #[test]
    fn test_text_exports_as_pdf_text() {
        let mut store = SceneStore::new();
        store.commit_text(TextNode::new(100.0, 150.0, "hello\nworld", "Helvetica", 20.0));
        let bytes = export_pdf(&store, 1.0).unwrap();
        let ops = decoded_page_ops(&bytes, 1);
        assert!(ops.iter().any(|op| op == "BT"));
        assert_eq!(ops.iter().filter(|op| *op == "Tj").count(), 2);
    }

    #[test]
    fn test_objects_export_on_their_own_page() {
        let mut store = SceneStore::new();
        store.add_page();
        let stride = store.layout().stride();
        store.commit_text(TextNode::new(100.0, stride + 50.0, "second page", "Helvetica", 20.0));

        let bytes = export_pdf(&store, 1.0).unwrap();
        let first = decoded_page_ops(&bytes, 1);
        assert!(!first.iter().any(|op| op == "Tj"));
        let second = decoded_page_ops(&bytes, 2);
        assert!(second.iter().any(|op| op == "Tj"));
    }

    #[test]
    fn test_pattern_emits_vector_strokes() {
        let mut store = SceneStore::new();
        store.set_pattern(BackgroundPattern::Lines);
        let bytes = export_pdf(&store, 1.0).unwrap();
        let ops = decoded_page_ops(&bytes, 1);
        assert!(ops.iter().any(|op| op == "S"));
        assert!(ops.iter().filter(|op| *op == "m").count() > 10);
    }
}
