//! Importing rasterized PDF pages onto the canvas.
//!
//! Decoding PDFs is someone else's job: callers hand the store a
//! [`PdfPageSource`] and this module places the rendered page as a regular
//! image object, sized to fit the target page.

use thiserror::Error;

use crate::object::{ImageFormat, ImageNode, ObjectId};
use crate::scene::SceneStore;

/// Margin kept around an unlocked page image, in scene units.
pub const UNLOCK_MARGIN: f64 = 40.0;

#[derive(Debug, Error)]
pub enum PdfUnlockError {
    #[error("page {0} out of range")]
    PageOutOfRange(usize),
    #[error("failed to render page: {0}")]
    Render(String),
}

/// A rendered PDF page, ready to embed as an image.
#[derive(Debug, Clone)]
pub struct PdfPageImage {
    pub width: u32,
    pub height: u32,
    pub format: ImageFormat,
    pub data: Vec<u8>,
}

/// Something that can rasterize pages of an opened PDF.
pub trait PdfPageSource {
    fn page_count(&self) -> usize;
    fn render_page(&self, index: usize) -> Result<PdfPageImage, PdfUnlockError>;
}

/// Render one source page and commit it as an image on a canvas page.
/// The canvas grows if the target page does not exist yet. The image is
/// shrunk (never enlarged) to fit inside the page margins, and ends up
/// selected with the select tool active, like any image commit.
pub fn unlock_page(
    store: &mut SceneStore,
    source: &dyn PdfPageSource,
    source_page: usize,
    target_page: usize,
) -> Result<ObjectId, PdfUnlockError> {
    if source_page >= source.page_count() {
        return Err(PdfUnlockError::PageOutOfRange(source_page));
    }
    let rendered = source.render_page(source_page)?;

    while store.page_count() <= target_page {
        store.add_page();
    }

    let layout = *store.layout();
    let (page_top, _) = layout.page_span(target_page);
    let mut node = ImageNode::new(
        UNLOCK_MARGIN,
        page_top + UNLOCK_MARGIN,
        rendered.format,
        &rendered.data,
        rendered.width,
        rendered.height,
    );
    node.fit_within(
        layout.width - 2.0 * UNLOCK_MARGIN,
        layout.height - 2.0 * UNLOCK_MARGIN,
    );
    Ok(store.commit_image(node))
}
