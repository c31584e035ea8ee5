//! Two-layer compositing: a committed layer repainted only when the scene
//! or the view changes, and an active layer repainted on every pointer
//! move.
//!
//! The committed layer holds every committed stroke in insertion order, so
//! eraser strokes cut through the ink below them, with page guides drawn on
//! top. The active layer holds only the stroke in flight. Objects (images,
//! text) are painted during frame composition, underneath the ink.

use inkleaf_core::capture::CapturePipeline;
use kurbo::Affine;
use tiny_skia::{PixmapPaint, Transform};

use crate::context::RenderContext;
use crate::error::RenderResult;
use crate::painter;
use crate::surface::Surface;

pub struct Compositor {
    committed: Surface,
    active: Surface,
    last_revision: Option<u64>,
    last_transform: Option<Transform>,
}

impl Compositor {
    pub fn new(width: u32, height: u32) -> RenderResult<Self> {
        Ok(Self {
            committed: Surface::new(width, height)?,
            active: Surface::new(width, height)?,
            last_revision: None,
            last_transform: None,
        })
    }

    pub fn width(&self) -> u32 {
        self.committed.width()
    }

    pub fn height(&self) -> u32 {
        self.committed.height()
    }

    /// Reallocate both layers. A size change invalidates the committed
    /// layer.
    pub fn resize(&mut self, width: u32, height: u32) -> RenderResult<()> {
        if width == self.width() && height == self.height() {
            return Ok(());
        }
        self.committed = Surface::new(width, height)?;
        self.active = Surface::new(width, height)?;
        self.last_revision = None;
        self.last_transform = None;
        Ok(())
    }

    pub fn committed_layer(&self) -> &Surface {
        &self.committed
    }

    pub fn active_layer(&self) -> &Surface {
        &self.active
    }

    fn view_transform(ctx: &RenderContext) -> Transform {
        painter::skia_transform(Affine::scale(ctx.scale_factor) * ctx.store.viewport().transform())
    }

    /// Repaint the committed layer if the scene or the view changed since
    /// the last sync. Returns whether a repaint happened.
    ///
    /// The layer is rasterized in screen space, so zooming or scrolling
    /// invalidates it even though the scene revision is unchanged.
    pub fn sync_committed(&mut self, ctx: &RenderContext) -> bool {
        let revision = ctx.store.revision();
        let transform = Self::view_transform(ctx);
        if self.last_revision == Some(revision) && self.last_transform == Some(transform) {
            return false;
        }
        self.committed.clear_transparent();
        for stroke in ctx.store.strokes() {
            painter::paint_stroke(self.committed.pixmap_mut(), stroke, transform);
        }
        if ctx.show_page_guides {
            painter::paint_page_guides(
                self.committed.pixmap_mut(),
                ctx.store.layout(),
                ctx.store.page_count(),
                transform,
            );
        }
        self.last_revision = Some(revision);
        self.last_transform = Some(transform);
        true
    }

    /// Repaint the active layer with the stroke in flight, or clear it
    /// when nothing is being drawn.
    pub fn update_active(&mut self, ctx: &RenderContext, capture: &CapturePipeline) {
        self.active.clear_transparent();
        if let Some(pending) = capture.active_stroke() {
            let transform = Self::view_transform(ctx);
            painter::paint_ink(
                self.active.pixmap_mut(),
                &pending.points,
                &pending.style,
                transform,
            );
        }
    }

    pub fn clear_active(&mut self) {
        self.active.clear_transparent();
    }

    /// Produce a full frame: background, per-page pattern, objects, the
    /// committed layer, then the active layer.
    pub fn render_frame(
        &mut self,
        ctx: &RenderContext,
        capture: Option<&CapturePipeline>,
    ) -> RenderResult<Surface> {
        self.resize(ctx.width, ctx.height)?;
        self.sync_committed(ctx);
        match capture {
            Some(capture) => self.update_active(ctx, capture),
            None => self.clear_active(),
        }

        let mut frame = Surface::new(ctx.width, ctx.height)?;
        frame.clear(ctx.store.background());
        let transform = Self::view_transform(ctx);
        for index in 0..ctx.store.page_count() {
            painter::paint_pattern(
                frame.pixmap_mut(),
                ctx.store.pattern(),
                ctx.store.layout().page_rect(index),
                transform,
            );
        }
        painter::paint_objects(frame.pixmap_mut(), ctx.store.objects(), transform);
        frame.pixmap_mut().draw_pixmap(
            0,
            0,
            self.committed.pixmap().as_ref(),
            &PixmapPaint::default(),
            Transform::identity(),
            None,
        );
        frame.pixmap_mut().draw_pixmap(
            0,
            0,
            self.active.pixmap().as_ref(),
            &PixmapPaint::default(),
            Transform::identity(),
            None,
        );
        Ok(frame)
    }
}
