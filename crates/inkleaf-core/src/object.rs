//! Placed scene objects: text and images.
//!
//! Objects live in one ordered collection on the scene store. The variants
//! are an explicit tagged union dispatched by `match`, never by probing for
//! type-specific fields.

use crate::color::SerializableColor;
use crate::geometry;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a placed object.
pub type ObjectId = Uuid;

/// Supported embedded image encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageFormat {
    Png,
    Jpeg,
    WebP,
}

impl ImageFormat {
    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::WebP => "image/webp",
        }
    }

    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "png" => Some(ImageFormat::Png),
            "jpg" | "jpeg" => Some(ImageFormat::Jpeg),
            "webp" => Some(ImageFormat::WebP),
            _ => None,
        }
    }

    /// Detect the format from file magic bytes.
    pub fn from_magic_bytes(data: &[u8]) -> Option<Self> {
        if data.len() >= 8 && data[0..8] == [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A] {
            Some(ImageFormat::Png)
        } else if data.len() >= 2 && data[0..2] == [0xFF, 0xD8] {
            Some(ImageFormat::Jpeg)
        } else if data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP" {
            Some(ImageFormat::WebP)
        } else {
            None
        }
    }
}

/// A placed text block.
///
/// `width`/`height` are estimated from character metrics at creation and
/// scale with the selection engine's resize; there is no layout oracle at
/// this level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextNode {
    pub id: ObjectId,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub content: String,
    pub font: String,
    pub font_size: f64,
    pub color: SerializableColor,
}

impl TextNode {
    pub fn new(
        x: f64,
        y: f64,
        content: impl Into<String>,
        font: impl Into<String>,
        font_size: f64,
    ) -> Self {
        let content = content.into();
        let (width, height) = geometry::estimated_text_size(&content, font_size);
        Self {
            id: Uuid::new_v4(),
            x,
            y,
            width,
            height,
            content,
            font: font.into(),
            font_size,
            color: SerializableColor::BLACK,
        }
    }

    pub fn with_color(mut self, color: SerializableColor) -> Self {
        self.color = color;
        self
    }

    /// Replace the content and re-estimate the box size.
    pub fn set_content(&mut self, content: impl Into<String>) {
        self.content = content.into();
        let (w, h) = geometry::estimated_text_size(&self.content, self.font_size);
        self.width = w;
        self.height = h;
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.x + self.width, self.y + self.height)
    }
}

/// A placed raster image, payload embedded as base64.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageNode {
    pub id: ObjectId,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Native pixel dimensions of the encoded payload.
    pub source_width: u32,
    pub source_height: u32,
    pub format: ImageFormat,
    pub data_base64: String,
}

impl ImageNode {
    /// Create an image placed at `(x, y)` at its native size.
    pub fn new(
        x: f64,
        y: f64,
        format: ImageFormat,
        data: &[u8],
        source_width: u32,
        source_height: u32,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            x,
            y,
            width: source_width as f64,
            height: source_height as f64,
            source_width,
            source_height,
            format,
            data_base64: STANDARD.encode(data),
        }
    }

    /// Decode the embedded payload.
    pub fn data(&self) -> Result<Vec<u8>, base64::DecodeError> {
        STANDARD.decode(&self.data_base64)
    }

    /// Shrink the display size to fit inside `max_width` × `max_height`,
    /// preserving aspect ratio. Never grows the image.
    pub fn fit_within(&mut self, max_width: f64, max_height: f64) {
        if self.width <= max_width && self.height <= max_height {
            return;
        }
        let scale = (max_width / self.width).min(max_height / self.height);
        self.width *= scale;
        self.height *= scale;
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.x + self.width, self.y + self.height)
    }
}

/// One placed object, discriminated by an explicit tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SceneObject {
    Text(TextNode),
    Image(ImageNode),
}

impl SceneObject {
    pub fn id(&self) -> ObjectId {
        match self {
            SceneObject::Text(t) => t.id,
            SceneObject::Image(i) => i.id,
        }
    }

    pub fn bounds(&self) -> Rect {
        match self {
            SceneObject::Text(t) => t.bounds(),
            SceneObject::Image(i) => i.bounds(),
        }
    }

    pub fn position(&self) -> Point {
        match self {
            SceneObject::Text(t) => Point::new(t.x, t.y),
            SceneObject::Image(i) => Point::new(i.x, i.y),
        }
    }

    /// Vertical extent `(min_y, max_y)` for page attribution.
    pub fn vertical_span(&self) -> (f64, f64) {
        let b = self.bounds();
        (b.y0, b.y1)
    }

    pub fn translate(&mut self, dx: f64, dy: f64) {
        match self {
            SceneObject::Text(t) => {
                t.x += dx;
                t.y += dy;
            }
            SceneObject::Image(i) => {
                i.x += dx;
                i.y += dy;
            }
        }
    }

    /// Uniform scale about `anchor`: position and box size scale by `scale`;
    /// text additionally scales its font size so the metrics stay coherent.
    pub fn scale_about(&mut self, anchor: Point, scale: f64) {
        match self {
            SceneObject::Text(t) => {
                t.x = anchor.x + (t.x - anchor.x) * scale;
                t.y = anchor.y + (t.y - anchor.y) * scale;
                t.width *= scale;
                t.height *= scale;
                t.font_size *= scale;
            }
            SceneObject::Image(i) => {
                i.x = anchor.x + (i.x - anchor.x) * scale;
                i.y = anchor.y + (i.y - anchor.y) * scale;
                i.width *= scale;
                i.height *= scale;
            }
        }
    }

    pub fn as_text(&self) -> Option<&TextNode> {
        match self {
            SceneObject::Text(t) => Some(t),
            SceneObject::Image(_) => None,
        }
    }

    pub fn as_image(&self) -> Option<&ImageNode> {
        match self {
            SceneObject::Image(i) => Some(i),
            SceneObject::Text(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_magic_bytes() {
        let png = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];
        assert_eq!(ImageFormat::from_magic_bytes(&png), Some(ImageFormat::Png));

        let jpeg = [0xFF, 0xD8, 0xFF, 0xE0];
        assert_eq!(ImageFormat::from_magic_bytes(&jpeg), Some(ImageFormat::Jpeg));

        let webp = *b"RIFF\x00\x00\x00\x00WEBP";
        assert_eq!(ImageFormat::from_magic_bytes(&webp), Some(ImageFormat::WebP));

        assert_eq!(ImageFormat::from_magic_bytes(b"not an image"), None);
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(ImageFormat::from_extension("PNG"), Some(ImageFormat::Png));
        assert_eq!(ImageFormat::from_extension("jpeg"), Some(ImageFormat::Jpeg));
        assert_eq!(ImageFormat::from_extension("gif"), None);
    }

    #[test]
    fn test_image_data_round_trip() {
        let payload = vec![1u8, 2, 3, 4, 5];
        let img = ImageNode::new(0.0, 0.0, ImageFormat::Png, &payload, 2, 2);
        assert_eq!(img.data().unwrap(), payload);
    }

    #[test]
    fn test_fit_within_shrinks_preserving_aspect() {
        let mut img = ImageNode::new(0.0, 0.0, ImageFormat::Png, &[], 400, 200);
        img.fit_within(100.0, 100.0);
        assert!((img.width - 100.0).abs() < f64::EPSILON);
        assert!((img.height - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_fit_within_never_grows() {
        let mut img = ImageNode::new(0.0, 0.0, ImageFormat::Png, &[], 40, 20);
        img.fit_within(100.0, 100.0);
        assert!((img.width - 40.0).abs() < f64::EPSILON);
        assert!((img.height - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_text_measures_on_creation() {
        let t = TextNode::new(0.0, 0.0, "hello", "Helvetica", 20.0);
        assert!((t.width - 5.0 * 20.0 * 0.6).abs() < f64::EPSILON);
        assert!((t.height - 20.0 * 1.2).abs() < f64::EPSILON);
    }

    #[test]
    fn test_scale_about_scales_font() {
        let mut obj = SceneObject::Text(TextNode::new(10.0, 10.0, "hi", "Helvetica", 20.0));
        obj.scale_about(Point::new(0.0, 0.0), 2.0);
        let t = obj.as_text().unwrap();
        assert!((t.x - 20.0).abs() < f64::EPSILON);
        assert!((t.font_size - 40.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_tagged_serialization() {
        let obj = SceneObject::Image(ImageNode::new(1.0, 2.0, ImageFormat::Png, &[9], 1, 1));
        let json = serde_json::to_string(&obj).unwrap();
        assert!(json.contains("\"kind\":\"image\""));
        let back: SceneObject = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id(), obj.id());
    }
}
