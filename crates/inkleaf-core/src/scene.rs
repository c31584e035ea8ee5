//! The scene store: one owned tree of strokes, objects, pages, and view
//! state, plus the undo/redo timeline over content commits.
//!
//! All mutation goes through the store so the revision counter stays honest;
//! renderers compare revisions to decide when the committed layer needs a
//! repaint.

use std::collections::HashSet;

use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

use crate::color::SerializableColor;
use crate::geometry;
use crate::object::{ImageNode, ObjectId, SceneObject, TextNode};
use crate::page::PageLayout;
use crate::stroke::{InkPoint, Stroke, StrokeId, StrokeStyle};
use crate::tools::{BackgroundPattern, BrushSettings, EraserMode, ToolKind};
use crate::viewport::Viewport;

pub const DEFAULT_PROJECT_NAME: &str = "Untitled";
pub const DEFAULT_FONT: &str = "Helvetica";
pub const DEFAULT_FONT_SIZE: f64 = 20.0;

/// One committed content addition. Entries carry ids only; the content
/// itself lives in the store until an eraser or a delete removes it, at
/// which point the entry goes stale and undo skips over it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryEntry {
    Stroke(StrokeId),
    Image(ObjectId),
    Text(ObjectId),
}

/// Undone content, held with its full payload so redo restores it exactly
/// as it was at the moment of undo.
#[derive(Debug, Clone)]
enum RedoEntry {
    Stroke(Stroke),
    Image(ImageNode),
    Text(TextNode),
}

/// Currently selected content ids.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    stroke_ids: HashSet<StrokeId>,
    object_ids: HashSet<ObjectId>,
}

impl Selection {
    pub fn is_empty(&self) -> bool {
        self.stroke_ids.is_empty() && self.object_ids.is_empty()
    }

    pub fn len(&self) -> usize {
        self.stroke_ids.len() + self.object_ids.len()
    }

    pub fn clear(&mut self) {
        self.stroke_ids.clear();
        self.object_ids.clear();
    }

    pub fn select_stroke(&mut self, id: StrokeId) {
        self.stroke_ids.insert(id);
    }

    pub fn select_object(&mut self, id: ObjectId) {
        self.object_ids.insert(id);
    }

    pub fn deselect_stroke(&mut self, id: &StrokeId) {
        self.stroke_ids.remove(id);
    }

    pub fn deselect_object(&mut self, id: &ObjectId) {
        self.object_ids.remove(id);
    }

    pub fn contains_stroke(&self, id: &StrokeId) -> bool {
        self.stroke_ids.contains(id)
    }

    pub fn contains_object(&self, id: &ObjectId) -> bool {
        self.object_ids.contains(id)
    }

    pub fn stroke_ids(&self) -> impl Iterator<Item = &StrokeId> {
        self.stroke_ids.iter()
    }

    pub fn object_ids(&self) -> impl Iterator<Item = &ObjectId> {
        self.object_ids.iter()
    }
}

/// Serializable scene state. History, selection, and the viewport are
/// session state and stay out of the snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub strokes: Vec<Stroke>,
    pub images: Vec<ImageNode>,
    pub text_nodes: Vec<TextNode>,
    pub page_count: usize,
    pub project_name: String,
    pub background: SerializableColor,
    pub pattern: BackgroundPattern,
    pub pen_color: SerializableColor,
    pub pen_width: f64,
    pub active_font: String,
    pub active_font_size: f64,
}

impl Snapshot {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// The studio's single source of truth.
#[derive(Debug)]
pub struct SceneStore {
    project_name: String,
    strokes: Vec<Stroke>,
    objects: Vec<SceneObject>,
    page_count: usize,
    layout: PageLayout,
    viewport: Viewport,
    tool: ToolKind,
    eraser_mode: EraserMode,
    brush: BrushSettings,
    background: SerializableColor,
    pattern: BackgroundPattern,
    active_font: String,
    active_font_size: f64,
    selection: Selection,
    history: Vec<HistoryEntry>,
    redo_stack: Vec<RedoEntry>,
    revision: u64,
}

impl Default for SceneStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneStore {
    pub fn new() -> Self {
        Self {
            project_name: DEFAULT_PROJECT_NAME.to_string(),
            strokes: Vec::new(),
            objects: Vec::new(),
            page_count: 1,
            layout: PageLayout::default(),
            viewport: Viewport::default(),
            tool: ToolKind::default(),
            eraser_mode: EraserMode::default(),
            brush: BrushSettings::default(),
            background: SerializableColor::WHITE,
            pattern: BackgroundPattern::default(),
            active_font: DEFAULT_FONT.to_string(),
            active_font_size: DEFAULT_FONT_SIZE,
            selection: Selection::default(),
            history: Vec::new(),
            redo_stack: Vec::new(),
            revision: 0,
        }
    }

    // --- accessors ------------------------------------------------------

    pub fn strokes(&self) -> &[Stroke] {
        &self.strokes
    }

    pub fn objects(&self) -> &[SceneObject] {
        &self.objects
    }

    pub fn stroke(&self, id: &StrokeId) -> Option<&Stroke> {
        self.strokes.iter().find(|s| s.id == *id)
    }

    pub fn object(&self, id: &ObjectId) -> Option<&SceneObject> {
        self.objects.iter().find(|o| o.id() == *id)
    }

    pub fn page_count(&self) -> usize {
        self.page_count
    }

    pub fn layout(&self) -> &PageLayout {
        &self.layout
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn tool(&self) -> ToolKind {
        self.tool
    }

    pub fn eraser_mode(&self) -> EraserMode {
        self.eraser_mode
    }

    pub fn brush(&self) -> &BrushSettings {
        &self.brush
    }

    pub fn background(&self) -> SerializableColor {
        self.background
    }

    pub fn pattern(&self) -> BackgroundPattern {
        self.pattern
    }

    pub fn project_name(&self) -> &str {
        &self.project_name
    }

    pub fn active_font(&self) -> &str {
        &self.active_font
    }

    pub fn active_font_size(&self) -> f64 {
        self.active_font_size
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo_stack.len()
    }

    /// Monotonic change counter. Bumped by every mutation that affects what
    /// the committed layer would paint.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Union bounds of all committed content.
    pub fn content_bounds(&self) -> Option<Rect> {
        let strokes = geometry::bounding_box_of_strokes(self.strokes.iter());
        let objects = geometry::bounding_box_of_objects(self.objects.iter());
        match (strokes, objects) {
            (Some(a), Some(b)) => Some(a.union(b)),
            (a, b) => a.or(b),
        }
    }

    // --- commits --------------------------------------------------------

    /// Commit a stroke using the active tool's brush style. Returns `None`
    /// when the active tool does not draw or the stroke is too short.
    pub fn commit_stroke(&mut self, points: Vec<InkPoint>) -> Option<StrokeId> {
        let style = self.brush.style_for(self.tool)?;
        self.commit_stroke_styled(points, style)
    }

    /// Commit a stroke with an explicit style. Strokes with fewer than two
    /// samples are dropped without touching history.
    pub fn commit_stroke_styled(
        &mut self,
        points: Vec<InkPoint>,
        style: StrokeStyle,
    ) -> Option<StrokeId> {
        if points.len() < 2 {
            log::debug!("Dropping stroke with {} sample(s)", points.len());
            return None;
        }
        let stroke = Stroke::new(points, style);
        let id = stroke.id;
        self.strokes.push(stroke);
        self.history.push(HistoryEntry::Stroke(id));
        self.redo_stack.clear();
        self.touch();
        Some(id)
    }

    /// Commit an image. The image becomes the sole selection and the active
    /// tool switches to select so it can be moved right away.
    pub fn commit_image(&mut self, image: ImageNode) -> ObjectId {
        let id = image.id;
        self.objects.push(SceneObject::Image(image));
        self.history.push(HistoryEntry::Image(id));
        self.redo_stack.clear();
        self.selection.clear();
        self.selection.select_object(id);
        self.tool = ToolKind::Select;
        self.touch();
        id
    }

    pub fn commit_text(&mut self, text: TextNode) -> ObjectId {
        let id = text.id;
        self.objects.push(SceneObject::Text(text));
        self.history.push(HistoryEntry::Text(id));
        self.redo_stack.clear();
        self.touch();
        id
    }

    // --- history --------------------------------------------------------

    /// Undo the most recent commit whose content is still alive. Stale
    /// entries (content already erased or deleted) are discarded along the
    /// way. Returns `false` when nothing was undone.
    pub fn undo(&mut self) -> bool {
        while let Some(entry) = self.history.pop() {
            match entry {
                HistoryEntry::Stroke(id) => {
                    if let Some(i) = self.strokes.iter().position(|s| s.id == id) {
                        let stroke = self.strokes.remove(i);
                        self.selection.deselect_stroke(&id);
                        self.redo_stack.push(RedoEntry::Stroke(stroke));
                        self.touch();
                        return true;
                    }
                }
                HistoryEntry::Image(id) | HistoryEntry::Text(id) => {
                    if let Some(i) = self.objects.iter().position(|o| o.id() == id) {
                        self.selection.deselect_object(&id);
                        match self.objects.remove(i) {
                            SceneObject::Image(image) => {
                                self.redo_stack.push(RedoEntry::Image(image));
                            }
                            SceneObject::Text(text) => {
                                self.redo_stack.push(RedoEntry::Text(text));
                            }
                        }
                        self.touch();
                        return true;
                    }
                }
            }
        }
        false
    }

    /// Reinstate the most recently undone commit, exactly as it was when
    /// undone. Returns `false` when the redo stack is empty.
    pub fn redo(&mut self) -> bool {
        match self.redo_stack.pop() {
            Some(RedoEntry::Stroke(stroke)) => {
                let id = stroke.id;
                self.strokes.push(stroke);
                self.history.push(HistoryEntry::Stroke(id));
                self.touch();
                true
            }
            Some(RedoEntry::Image(image)) => {
                let id = image.id;
                self.objects.push(SceneObject::Image(image));
                self.history.push(HistoryEntry::Image(id));
                self.touch();
                true
            }
            Some(RedoEntry::Text(text)) => {
                let id = text.id;
                self.objects.push(SceneObject::Text(text));
                self.history.push(HistoryEntry::Text(id));
                self.touch();
                true
            }
            None => false,
        }
    }

    // --- removal outside the timeline -----------------------------------

    /// Remove a stroke without recording a history entry. Used by the
    /// whole-stroke eraser and by selection delete; the stroke's original
    /// commit entry goes stale and undo will skip it.
    pub fn remove_stroke(&mut self, id: &StrokeId) -> Option<Stroke> {
        let i = self.strokes.iter().position(|s| s.id == *id)?;
        self.selection.deselect_stroke(id);
        self.touch();
        Some(self.strokes.remove(i))
    }

    /// Remove an object without recording a history entry.
    pub fn delete_object(&mut self, id: &ObjectId) -> Option<SceneObject> {
        let i = self.objects.iter().position(|o| o.id() == *id)?;
        self.selection.deselect_object(id);
        self.touch();
        Some(self.objects.remove(i))
    }

    /// Mutate an object in place. Returns `false` when the id is unknown.
    pub fn update_object(&mut self, id: &ObjectId, f: impl FnOnce(&mut SceneObject)) -> bool {
        match self.objects.iter_mut().find(|o| o.id() == *id) {
            Some(object) => {
                f(object);
                self.touch();
                true
            }
            None => false,
        }
    }

    // --- pages ----------------------------------------------------------

    /// Append a page at the end. Returns the new page count.
    pub fn add_page(&mut self) -> usize {
        self.page_count += 1;
        self.touch();
        self.page_count
    }

    /// Insert a page after an existing one. Content keeps its y coordinates,
    /// so nothing visually shifts; the canvas just grows by one page.
    pub fn insert_page_after(&mut self, index: usize) -> bool {
        if index >= self.page_count {
            log::warn!("insert_page_after: index {index} out of range");
            return false;
        }
        self.page_count += 1;
        self.touch();
        true
    }

    /// Remove a page from the count. The last remaining page cannot be
    /// deleted. Content is left where it is; callers that want to clear or
    /// shift it can query `page_contents` first.
    pub fn delete_page(&mut self, index: usize) -> bool {
        if self.page_count <= 1 || index >= self.page_count {
            return false;
        }
        self.page_count -= 1;
        self.touch();
        true
    }

    /// Ids of strokes and objects whose vertical extent overlaps a page.
    pub fn page_contents(&self, index: usize) -> (Vec<StrokeId>, Vec<ObjectId>) {
        let strokes = self
            .strokes
            .iter()
            .filter(|s| {
                let (min_y, max_y) = s.vertical_span();
                !s.points.is_empty() && self.layout.intersects_page(index, min_y, max_y)
            })
            .map(|s| s.id)
            .collect();
        let objects = self
            .objects
            .iter()
            .filter(|o| {
                let (min_y, max_y) = o.vertical_span();
                self.layout.intersects_page(index, min_y, max_y)
            })
            .map(|o| o.id())
            .collect();
        (strokes, objects)
    }

    pub fn page_index_at(&self, y: f64) -> usize {
        self.layout.page_index_at(y)
    }

    // --- view -----------------------------------------------------------

    pub fn set_zoom(&mut self, zoom: f64) {
        self.viewport.set_zoom(zoom);
    }

    pub fn zoom_in(&mut self) {
        self.viewport.zoom_in();
    }

    pub fn zoom_out(&mut self) {
        self.viewport.zoom_out();
    }

    pub fn zoom(&self) -> f64 {
        self.viewport.zoom()
    }

    pub fn zoom_at(&mut self, screen: Point, zoom: f64) {
        self.viewport.zoom_at(screen, zoom);
    }

    pub fn scroll_by(&mut self, dx: f64, dy: f64) {
        self.viewport.scroll_by(kurbo::Vec2::new(dx, dy));
    }

    pub fn screen_to_scene(&self, p: Point) -> Point {
        self.viewport.screen_to_scene(p)
    }

    // --- settings -------------------------------------------------------

    /// Switch tools. Changing tools drops the current selection.
    pub fn set_tool(&mut self, tool: ToolKind) {
        if self.tool != tool {
            self.selection.clear();
        }
        self.tool = tool;
    }

    pub fn set_eraser_mode(&mut self, mode: EraserMode) {
        self.eraser_mode = mode;
    }

    pub fn set_pen_color(&mut self, color: SerializableColor) {
        self.brush.set_pen_color(color);
    }

    pub fn set_pen_width(&mut self, width: f64) {
        self.brush.set_pen_width(width);
    }

    pub fn set_eraser_width(&mut self, width: f64) {
        self.brush.set_eraser_width(width);
    }

    pub fn set_background(&mut self, color: SerializableColor) {
        self.background = color;
        self.touch();
    }

    pub fn set_pattern(&mut self, pattern: BackgroundPattern) {
        self.pattern = pattern;
        self.touch();
    }

    pub fn set_active_font(&mut self, font: impl Into<String>) {
        self.active_font = font.into();
    }

    pub fn set_active_font_size(&mut self, size: f64) {
        self.active_font_size = size.max(1.0);
    }

    pub fn set_project_name(&mut self, name: impl Into<String>) {
        self.project_name = name.into();
    }

    // --- selection ------------------------------------------------------

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    pub(crate) fn selection_mut(&mut self) -> &mut Selection {
        &mut self.selection
    }

    pub(crate) fn stroke_mut(&mut self, id: &StrokeId) -> Option<&mut Stroke> {
        self.strokes.iter_mut().find(|s| s.id == *id)
    }

    pub(crate) fn object_mut(&mut self, id: &ObjectId) -> Option<&mut SceneObject> {
        self.objects.iter_mut().find(|o| o.id() == *id)
    }

    pub(crate) fn touch(&mut self) {
        self.revision += 1;
    }

    // --- snapshots ------------------------------------------------------

    /// Capture the persistable scene state. History and view state are not
    /// part of it.
    pub fn snapshot(&self) -> Snapshot {
        let mut images = Vec::new();
        let mut text_nodes = Vec::new();
        for object in &self.objects {
            match object {
                SceneObject::Image(image) => images.push(image.clone()),
                SceneObject::Text(text) => text_nodes.push(text.clone()),
            }
        }
        Snapshot {
            strokes: self.strokes.clone(),
            images,
            text_nodes,
            page_count: self.page_count,
            project_name: self.project_name.clone(),
            background: self.background,
            pattern: self.pattern,
            pen_color: self.brush.pen_color(),
            pen_width: self.brush.pen_width(),
            active_font: self.active_font.clone(),
            active_font_size: self.active_font_size,
        }
    }

    /// Replace the scene content from a snapshot. History, redo, and the
    /// selection reset; the viewport is untouched.
    pub fn restore(&mut self, snapshot: Snapshot) {
        self.strokes = snapshot.strokes;
        self.objects = snapshot
            .images
            .into_iter()
            .map(SceneObject::Image)
            .chain(snapshot.text_nodes.into_iter().map(SceneObject::Text))
            .collect();
        self.page_count = snapshot.page_count.max(1);
        self.project_name = snapshot.project_name;
        self.background = snapshot.background;
        self.pattern = snapshot.pattern;
        self.brush.set_pen_color(snapshot.pen_color);
        self.brush.set_pen_width(snapshot.pen_width);
        self.active_font = snapshot.active_font;
        self.active_font_size = snapshot.active_font_size;
        self.selection.clear();
        self.history.clear();
        self.redo_stack.clear();
        self.touch();
    }

    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        let mut store = Self::new();
        store.restore(snapshot);
        store
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pen_store(width: f64) -> SceneStore {
        let mut store = SceneStore::new();
        store.set_tool(ToolKind::Pen);
        store.set_pen_width(width);
        store
    }

    fn line_points() -> Vec<InkPoint> {
        vec![
            InkPoint::with_pressure(0.0, 0.0, 0.5),
            InkPoint::with_pressure(10.0, 0.0, 0.5),
            InkPoint::with_pressure(20.0, 0.0, 0.5),
        ]
    }

    #[test]
    fn test_commit_undo_redo_round_trip() {
        let mut store = pen_store(8.0);
        store.set_pen_color(SerializableColor::from_hex("#000000").unwrap());

        let id = store.commit_stroke(line_points()).unwrap();
        assert_eq!(store.strokes().len(), 1);
        assert_eq!(store.history_len(), 1);
        let committed = store.stroke(&id).unwrap().clone();
        assert!((committed.size - 8.0).abs() < f64::EPSILON);
        assert_eq!(committed.color, SerializableColor::BLACK);

        assert!(store.undo());
        assert_eq!(store.strokes().len(), 0);
        assert_eq!(store.redo_len(), 1);

        assert!(store.redo());
        assert_eq!(store.strokes().len(), 1);
        let restored = store.stroke(&id).unwrap();
        assert_eq!(restored.id, committed.id);
        assert_eq!(restored.points, committed.points);
        assert!((restored.size - committed.size).abs() < f64::EPSILON);
        assert_eq!(restored.color, committed.color);
    }

    #[test]
    fn test_short_stroke_dropped() {
        let mut store = pen_store(3.0);
        assert!(store.commit_stroke(vec![InkPoint::new(5.0, 5.0)]).is_none());
        assert!(store.commit_stroke(Vec::new()).is_none());
        assert_eq!(store.strokes().len(), 0);
        assert_eq!(store.history_len(), 0);
    }

    #[test]
    fn test_new_commit_clears_redo() {
        let mut store = pen_store(3.0);
        store.commit_stroke(line_points()).unwrap();
        store.commit_stroke(line_points()).unwrap();
        assert!(store.undo());
        assert_eq!(store.redo_len(), 1);

        store.commit_stroke(line_points()).unwrap();
        assert_eq!(store.redo_len(), 0);
        assert!(!store.redo());
    }

    #[test]
    fn test_undo_exhausted_returns_false() {
        let mut store = pen_store(3.0);
        assert!(!store.undo());
        store.commit_stroke(line_points()).unwrap();
        assert!(store.undo());
        assert!(!store.undo());
    }

    #[test]
    fn test_undo_skips_erased_strokes() {
        let mut store = pen_store(3.0);
        let first = store.commit_stroke(line_points()).unwrap();
        let second = store.commit_stroke(line_points()).unwrap();
        // Whole-stroke erase of the newest commit leaves its entry stale.
        store.remove_stroke(&second).unwrap();
        assert_eq!(store.history_len(), 2);

        assert!(store.undo());
        assert_eq!(store.strokes().len(), 0);
        assert!(store.stroke(&first).is_none());
        assert!(!store.undo());
    }

    #[test]
    fn test_interleaved_timeline_is_lifo() {
        let mut store = pen_store(3.0);
        let stroke_id = store.commit_stroke(line_points()).unwrap();
        let text_id = store.commit_text(TextNode::new(10.0, 10.0, "note", "Helvetica", 20.0));
        let image_id = store.commit_image(ImageNode::new(
            0.0,
            0.0,
            crate::object::ImageFormat::Png,
            &[1, 2, 3],
            4,
            4,
        ));

        assert!(store.undo());
        assert!(store.object(&image_id).is_none());
        assert!(store.object(&text_id).is_some());

        assert!(store.undo());
        assert!(store.object(&text_id).is_none());
        assert!(store.stroke(&stroke_id).is_some());

        assert!(store.redo());
        assert!(store.object(&text_id).is_some());
    }

    #[test]
    fn test_commit_image_selects_and_switches_tool() {
        let mut store = pen_store(3.0);
        assert_eq!(store.tool(), ToolKind::Pen);
        let id = store.commit_image(ImageNode::new(
            5.0,
            5.0,
            crate::object::ImageFormat::Png,
            &[0u8; 8],
            16,
            16,
        ));
        assert_eq!(store.tool(), ToolKind::Select);
        assert!(store.selection().contains_object(&id));
        assert_eq!(store.selection().len(), 1);
    }

    #[test]
    fn test_insert_page_after() {
        let mut store = SceneStore::new();
        assert_eq!(store.page_count(), 1);
        assert!(store.insert_page_after(0));
        assert_eq!(store.page_count(), 2);
        assert!(!store.insert_page_after(5));
        assert_eq!(store.page_count(), 2);

        let y = store.layout().height + 10.0;
        assert_eq!(store.page_index_at(y), 1);
    }

    #[test]
    fn test_delete_page_keeps_last() {
        let mut store = SceneStore::new();
        assert!(!store.delete_page(0));
        store.add_page();
        assert!(store.delete_page(1));
        assert_eq!(store.page_count(), 1);
    }

    #[test]
    fn test_page_contents() {
        let mut store = pen_store(3.0);
        store.add_page();
        let stride = store.layout().stride();
        let on_first = store.commit_stroke(line_points()).unwrap();
        let on_second = store
            .commit_stroke(vec![
                InkPoint::new(0.0, stride + 50.0),
                InkPoint::new(10.0, stride + 60.0),
            ])
            .unwrap();

        let (first_strokes, _) = store.page_contents(0);
        assert_eq!(first_strokes, vec![on_first]);
        let (second_strokes, _) = store.page_contents(1);
        assert_eq!(second_strokes, vec![on_second]);
    }

    #[test]
    fn test_tool_change_clears_selection() {
        let mut store = pen_store(3.0);
        let id = store.commit_stroke(line_points()).unwrap();
        store.set_tool(ToolKind::Select);
        store.selection_mut().select_stroke(id);
        assert!(!store.selection().is_empty());
        store.set_tool(ToolKind::Pen);
        assert!(store.selection().is_empty());
    }

    #[test]
    fn test_snapshot_round_trip() {
        let mut store = pen_store(4.0);
        store.set_project_name("Field Notes");
        store.set_pattern(BackgroundPattern::Grid);
        store.commit_stroke(line_points()).unwrap();
        store.commit_text(TextNode::new(5.0, 5.0, "hi", "Helvetica", 18.0));
        store.add_page();

        let json = store.snapshot().to_json().unwrap();
        let mut restored = SceneStore::from_snapshot(Snapshot::from_json(&json).unwrap());

        assert_eq!(restored.project_name(), "Field Notes");
        assert_eq!(restored.pattern(), BackgroundPattern::Grid);
        assert_eq!(restored.strokes().len(), 1);
        assert_eq!(restored.objects().len(), 1);
        assert_eq!(restored.page_count(), 2);
        assert!((restored.brush().pen_width() - 4.0).abs() < f64::EPSILON);
        // History does not survive persistence.
        assert_eq!(restored.history_len(), 0);
        assert!(!restored.undo());
    }

    #[test]
    fn test_content_bounds_spans_strokes_and_objects() {
        let mut store = pen_store(3.0);
        assert!(store.content_bounds().is_none());
        store.commit_stroke(line_points()).unwrap();
        store.commit_text(TextNode::new(100.0, 200.0, "x", "Helvetica", 20.0));
        let bounds = store.content_bounds().unwrap();
        assert!(bounds.x0.abs() < f64::EPSILON);
        assert!(bounds.x1 >= 100.0);
        assert!(bounds.y1 >= 200.0);
    }

    #[test]
    fn test_revision_bumps_on_content_change() {
        let mut store = pen_store(3.0);
        let before = store.revision();
        store.commit_stroke(line_points()).unwrap();
        assert!(store.revision() > before);

        let after_commit = store.revision();
        store.undo();
        assert!(store.revision() > after_commit);
    }
}
