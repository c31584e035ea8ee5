//! Context for a single render frame.

use inkleaf_core::scene::SceneStore;

/// Everything the compositor needs to produce one frame.
pub struct RenderContext<'a> {
    /// The scene to render.
    pub store: &'a SceneStore,
    /// Frame width in physical pixels.
    pub width: u32,
    /// Frame height in physical pixels.
    pub height: u32,
    /// Device pixel ratio (for HiDPI).
    pub scale_factor: f64,
    /// Whether to draw page outlines on the committed layer.
    pub show_page_guides: bool,
}

impl<'a> RenderContext<'a> {
    pub fn new(store: &'a SceneStore, width: u32, height: u32) -> Self {
        Self {
            store,
            width,
            height,
            scale_factor: 1.0,
            show_page_guides: true,
        }
    }

    pub fn with_scale_factor(mut self, scale_factor: f64) -> Self {
        self.scale_factor = scale_factor;
        self
    }

    pub fn without_page_guides(mut self) -> Self {
        self.show_page_guides = false;
        self
    }
}
