//! Selection manipulation: hit-testing, marquee selection, drag moves,
//! corner resizes, and keyboard nudges.
//!
//! Resizes rewrite content from clones taken when the gesture began, so a
//! long drag never accumulates rounding from incremental scaling.

use kurbo::{Point, Rect};

use crate::geometry;
use crate::object::{ObjectId, SceneObject};
use crate::scene::SceneStore;
use crate::stroke::{Stroke, StrokeId};

/// Arrow-key nudge distance in scene units.
pub const NUDGE_STEP: f64 = 10.0;

/// Default stroke hit-test slack in scene units.
pub const DEFAULT_HIT_TOLERANCE: f64 = 6.0;

/// A corner handle of the selection box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Corner {
    pub fn point_in(&self, rect: Rect) -> Point {
        match self {
            Corner::TopLeft => Point::new(rect.x0, rect.y0),
            Corner::TopRight => Point::new(rect.x1, rect.y0),
            Corner::BottomLeft => Point::new(rect.x0, rect.y1),
            Corner::BottomRight => Point::new(rect.x1, rect.y1),
        }
    }

    pub fn opposite(&self) -> Corner {
        match self {
            Corner::TopLeft => Corner::BottomRight,
            Corner::TopRight => Corner::BottomLeft,
            Corner::BottomLeft => Corner::TopRight,
            Corner::BottomRight => Corner::TopLeft,
        }
    }

    /// The fixed point of a resize dragged from this corner.
    pub fn anchor_in(&self, rect: Rect) -> Point {
        self.opposite().point_in(rect)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NudgeDirection {
    Left,
    Right,
    Up,
    Down,
}

/// Union bounds of the current selection.
pub fn selection_bounds(store: &SceneStore) -> Option<Rect> {
    let strokes = geometry::bounding_box_of_strokes(
        store
            .strokes()
            .iter()
            .filter(|s| store.selection().contains_stroke(&s.id)),
    );
    let objects = geometry::bounding_box_of_objects(
        store
            .objects()
            .iter()
            .filter(|o| store.selection().contains_object(&o.id())),
    );
    match (strokes, objects) {
        (Some(a), Some(b)) => Some(a.union(b)),
        (a, b) => a.or(b),
    }
}

/// Replace the selection with the topmost content under a point. Ink sits
/// above objects, so strokes are checked first, each group newest-first.
/// Returns whether anything was hit.
pub fn select_at(store: &mut SceneStore, point: Point, tolerance: f64) -> bool {
    let hit_stroke = store
        .strokes()
        .iter()
        .rev()
        .find(|s| !s.is_eraser && s.hit_test(point, tolerance))
        .map(|s| s.id);
    if let Some(id) = hit_stroke {
        store.clear_selection();
        store.selection_mut().select_stroke(id);
        return true;
    }

    let hit_object = store
        .objects()
        .iter()
        .rev()
        .find(|o| o.bounds().contains(point))
        .map(|o| o.id());
    if let Some(id) = hit_object {
        store.clear_selection();
        store.selection_mut().select_object(id);
        return true;
    }

    store.clear_selection();
    false
}

/// Replace the selection with everything whose bounds overlap a marquee
/// rect. Returns the number of selected items.
pub fn select_in_rect(store: &mut SceneStore, rect: Rect) -> usize {
    let stroke_ids: Vec<StrokeId> = store
        .strokes()
        .iter()
        .filter(|s| {
            !s.points.is_empty() && !s.is_eraser && geometry::rects_overlap(rect, s.bounds())
        })
        .map(|s| s.id)
        .collect();
    let object_ids: Vec<ObjectId> = store
        .objects()
        .iter()
        .filter(|o| geometry::rects_overlap(rect, o.bounds()))
        .map(|o| o.id())
        .collect();

    store.clear_selection();
    for id in &stroke_ids {
        store.selection_mut().select_stroke(*id);
    }
    for id in &object_ids {
        store.selection_mut().select_object(*id);
    }
    stroke_ids.len() + object_ids.len()
}

/// Move every selected item by a delta.
pub fn translate_selection(store: &mut SceneStore, dx: f64, dy: f64) {
    if store.selection().is_empty() {
        return;
    }
    let stroke_ids: Vec<StrokeId> = store.selection().stroke_ids().copied().collect();
    let object_ids: Vec<ObjectId> = store.selection().object_ids().copied().collect();
    for id in &stroke_ids {
        if let Some(stroke) = store.stroke_mut(id) {
            stroke.translate(dx, dy);
        }
    }
    for id in &object_ids {
        if let Some(object) = store.object_mut(id) {
            object.translate(dx, dy);
        }
    }
    store.touch();
}

/// Nudge the selection one step in a direction.
pub fn nudge_selection(store: &mut SceneStore, direction: NudgeDirection) {
    let (dx, dy) = match direction {
        NudgeDirection::Left => (-NUDGE_STEP, 0.0),
        NudgeDirection::Right => (NUDGE_STEP, 0.0),
        NudgeDirection::Up => (0.0, -NUDGE_STEP),
        NudgeDirection::Down => (0.0, NUDGE_STEP),
    };
    translate_selection(store, dx, dy);
}

/// Delete everything selected. Removal bypasses the undo timeline; the
/// items' commit entries go stale. Returns how many items were removed.
pub fn delete_selection(store: &mut SceneStore) -> usize {
    let stroke_ids: Vec<StrokeId> = store.selection().stroke_ids().copied().collect();
    let object_ids: Vec<ObjectId> = store.selection().object_ids().copied().collect();
    let mut removed = 0;
    for id in &stroke_ids {
        if store.remove_stroke(id).is_some() {
            removed += 1;
        }
    }
    for id in &object_ids {
        if store.delete_object(id).is_some() {
            removed += 1;
        }
    }
    store.clear_selection();
    removed
}

/// An in-flight selection drag.
#[derive(Debug, Clone, Copy)]
pub struct DragMove {
    last: Point,
}

impl DragMove {
    pub fn begin(at: Point) -> Self {
        Self { last: at }
    }

    /// Apply the movement since the previous update.
    pub fn update(&mut self, store: &mut SceneStore, pointer: Point) {
        let delta = pointer - self.last;
        if delta.hypot() > 0.0 {
            translate_selection(store, delta.x, delta.y);
        }
        self.last = pointer;
    }
}

/// An in-flight corner resize. Scaling is uniform: the factor is the ratio
/// of the pointer's distance from the anchor (the opposite corner) to the
/// grab point's original distance from it.
#[derive(Debug, Clone)]
pub struct CornerResize {
    anchor: Point,
    base_distance: f64,
    original_strokes: Vec<Stroke>,
    original_objects: Vec<SceneObject>,
}

impl CornerResize {
    /// Start resizing from a corner handle. `None` when nothing is selected.
    pub fn begin(store: &SceneStore, corner: Corner, grab: Point) -> Option<Self> {
        let bounds = selection_bounds(store)?;
        let anchor = corner.anchor_in(bounds);
        let original_strokes = store
            .strokes()
            .iter()
            .filter(|s| store.selection().contains_stroke(&s.id))
            .cloned()
            .collect();
        let original_objects = store
            .objects()
            .iter()
            .filter(|o| store.selection().contains_object(&o.id()))
            .cloned()
            .collect();
        Some(Self {
            anchor,
            base_distance: grab.distance(anchor),
            original_strokes,
            original_objects,
        })
    }

    /// Rescale the selection for the current pointer position. Degenerate
    /// gestures (zero base distance, pointer on the anchor) are ignored.
    pub fn update(&self, store: &mut SceneStore, pointer: Point) {
        if self.base_distance < f64::EPSILON {
            return;
        }
        let scale = pointer.distance(self.anchor) / self.base_distance;
        if !scale.is_finite() || scale <= 0.0 {
            return;
        }
        for original in &self.original_strokes {
            if let Some(live) = store.stroke_mut(&original.id) {
                let mut scaled = original.clone();
                scaled.scale_about(self.anchor, scale);
                *live = scaled;
            }
        }
        for original in &self.original_objects {
            if let Some(live) = store.object_mut(&original.id()) {
                let mut scaled = original.clone();
                scaled.scale_about(self.anchor, scale);
                *live = scaled;
            }
        }
        store.touch();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::{ImageFormat, ImageNode};
    use crate::stroke::InkPoint;
    use crate::tools::ToolKind;

    fn store_with_square_stroke() -> (SceneStore, StrokeId) {
        let mut store = SceneStore::new();
        store.set_tool(ToolKind::Pen);
        let id = store
            .commit_stroke(vec![
                InkPoint::new(0.0, 0.0),
                InkPoint::new(100.0, 0.0),
                InkPoint::new(100.0, 100.0),
                InkPoint::new(0.0, 100.0),
            ])
            .unwrap();
        (store, id)
    }

    #[test]
    fn test_select_at_hits_topmost_stroke() {
        let mut store = SceneStore::new();
        store.set_tool(ToolKind::Pen);
        let bottom = store
            .commit_stroke(vec![InkPoint::new(0.0, 50.0), InkPoint::new(100.0, 50.0)])
            .unwrap();
        let top = store
            .commit_stroke(vec![InkPoint::new(50.0, 0.0), InkPoint::new(50.0, 100.0)])
            .unwrap();

        // Both pass through (50, 50); the newer stroke wins.
        assert!(select_at(&mut store, Point::new(50.0, 50.0), DEFAULT_HIT_TOLERANCE));
        assert!(store.selection().contains_stroke(&top));
        assert!(!store.selection().contains_stroke(&bottom));
    }

    #[test]
    fn test_select_at_falls_through_to_objects() {
        let mut store = SceneStore::new();
        let id =
            store.commit_image(ImageNode::new(10.0, 10.0, ImageFormat::Png, &[0u8; 4], 50, 50));
        store.clear_selection();

        assert!(select_at(&mut store, Point::new(30.0, 30.0), DEFAULT_HIT_TOLERANCE));
        assert!(store.selection().contains_object(&id));

        assert!(!select_at(&mut store, Point::new(500.0, 500.0), DEFAULT_HIT_TOLERANCE));
        assert!(store.selection().is_empty());
    }

    #[test]
    fn test_marquee_selects_overlapping() {
        let (mut store, stroke_id) = store_with_square_stroke();
        let image_id = store.commit_image(ImageNode::new(
            300.0,
            300.0,
            ImageFormat::Png,
            &[0u8; 4],
            20,
            20,
        ));
        store.set_tool(ToolKind::Select);

        let count = select_in_rect(&mut store, Rect::new(-10.0, -10.0, 50.0, 50.0));
        assert_eq!(count, 1);
        assert!(store.selection().contains_stroke(&stroke_id));
        assert!(!store.selection().contains_object(&image_id));
    }

    #[test]
    fn test_nudge_moves_ten_units() {
        let (mut store, id) = store_with_square_stroke();
        store.set_tool(ToolKind::Select);
        store.selection_mut().select_stroke(id);

        nudge_selection(&mut store, NudgeDirection::Right);
        nudge_selection(&mut store, NudgeDirection::Down);
        let bounds = store.stroke(&id).unwrap().bounds();
        assert!((bounds.x0 - 10.0).abs() < f64::EPSILON);
        assert!((bounds.y0 - 10.0).abs() < f64::EPSILON);

        nudge_selection(&mut store, NudgeDirection::Left);
        nudge_selection(&mut store, NudgeDirection::Up);
        let back = store.stroke(&id).unwrap().bounds();
        assert!((back.x0).abs() < f64::EPSILON);
        assert!((back.y0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_drag_move_accumulates_deltas() {
        let (mut store, id) = store_with_square_stroke();
        store.set_tool(ToolKind::Select);
        store.selection_mut().select_stroke(id);

        let mut drag = DragMove::begin(Point::new(50.0, 50.0));
        drag.update(&mut store, Point::new(70.0, 50.0));
        drag.update(&mut store, Point::new(70.0, 80.0));

        let bounds = store.stroke(&id).unwrap().bounds();
        assert!((bounds.x0 - 20.0).abs() < f64::EPSILON);
        assert!((bounds.y0 - 30.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_corner_resize_scales_uniformly() {
        let (mut store, id) = store_with_square_stroke();
        store.set_tool(ToolKind::Select);
        store.selection_mut().select_stroke(id);

        let grab = Point::new(100.0, 100.0);
        let resize = CornerResize::begin(&store, Corner::BottomRight, grab).unwrap();
        // Pointer twice as far from the top-left anchor: scale factor 2.
        resize.update(&mut store, Point::new(200.0, 200.0));

        let bounds = store.stroke(&id).unwrap().bounds();
        assert!((bounds.width() - 200.0).abs() < 1e-9);
        assert!((bounds.height() - 200.0).abs() < 1e-9);
        assert!((bounds.x0).abs() < 1e-9);
        assert!((bounds.y0).abs() < 1e-9);
    }

    #[test]
    fn test_corner_resize_rescales_from_originals() {
        let (mut store, id) = store_with_square_stroke();
        store.set_tool(ToolKind::Select);
        store.selection_mut().select_stroke(id);

        let resize =
            CornerResize::begin(&store, Corner::BottomRight, Point::new(100.0, 100.0)).unwrap();
        resize.update(&mut store, Point::new(150.0, 150.0));
        resize.update(&mut store, Point::new(200.0, 200.0));

        // The second update is not compounded on the first.
        let bounds = store.stroke(&id).unwrap().bounds();
        assert!((bounds.width() - 200.0).abs() < 1e-9);
    }

    #[test]
    fn test_corner_resize_ignores_degenerate_pointer() {
        let (mut store, id) = store_with_square_stroke();
        store.set_tool(ToolKind::Select);
        store.selection_mut().select_stroke(id);

        let resize =
            CornerResize::begin(&store, Corner::BottomRight, Point::new(100.0, 100.0)).unwrap();
        resize.update(&mut store, Point::new(0.0, 0.0));
        let bounds = store.stroke(&id).unwrap().bounds();
        assert!((bounds.width() - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_resize_requires_selection() {
        let store = SceneStore::new();
        assert!(CornerResize::begin(&store, Corner::TopLeft, Point::new(0.0, 0.0)).is_none());
    }

    #[test]
    fn test_delete_selection_bypasses_history() {
        let (mut store, id) = store_with_square_stroke();
        store.set_tool(ToolKind::Select);
        store.selection_mut().select_stroke(id);

        assert_eq!(delete_selection(&mut store), 1);
        assert_eq!(store.strokes().len(), 0);
        assert!(store.selection().is_empty());
        // The stroke's commit entry is stale, not undoable.
        assert!(!store.undo());
    }

    #[test]
    fn test_selection_bounds_spans_mixed_content() {
        let (mut store, id) = store_with_square_stroke();
        let image_id = store.commit_image(ImageNode::new(
            200.0,
            200.0,
            ImageFormat::Png,
            &[0u8; 4],
            40,
            40,
        ));
        store.selection_mut().select_stroke(id);
        store.selection_mut().select_object(image_id);

        let bounds = selection_bounds(&store).unwrap();
        assert!((bounds.x0).abs() < f64::EPSILON);
        assert!((bounds.x1 - 240.0).abs() < f64::EPSILON);
    }
}
