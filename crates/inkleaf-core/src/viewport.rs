//! Viewport: scroll offset and zoom, plus the screen/scene mappings.

use kurbo::{Affine, Point, Vec2};
use serde::{Deserialize, Serialize};

pub const MIN_ZOOM: f64 = 0.1;
pub const MAX_ZOOM: f64 = 5.0;
pub const ZOOM_STEP: f64 = 0.1;

/// Current view over the scene. Zoom is kept on a tenth-step lattice so
/// repeated stepping never drifts away from round values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub scroll: Vec2,
    zoom: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            scroll: Vec2::ZERO,
            zoom: 1.0,
        }
    }
}

impl Viewport {
    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn set_zoom(&mut self, zoom: f64) {
        self.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
    }

    pub fn zoom_in(&mut self) {
        self.set_zoom(round_to_step(self.zoom + ZOOM_STEP));
    }

    pub fn zoom_out(&mut self) {
        self.set_zoom(round_to_step(self.zoom - ZOOM_STEP));
    }

    /// Scene-to-screen transform.
    pub fn transform(&self) -> Affine {
        Affine::scale(self.zoom) * Affine::translate(-self.scroll)
    }

    pub fn screen_to_scene(&self, p: Point) -> Point {
        Point::new(p.x / self.zoom, p.y / self.zoom) + self.scroll
    }

    pub fn scene_to_screen(&self, p: Point) -> Point {
        Point::new((p.x - self.scroll.x) * self.zoom, (p.y - self.scroll.y) * self.zoom)
    }

    /// Change zoom while keeping the scene point under `screen` fixed.
    pub fn zoom_at(&mut self, screen: Point, zoom: f64) {
        let anchor = self.screen_to_scene(screen);
        self.set_zoom(zoom);
        self.scroll = anchor - Point::new(screen.x / self.zoom, screen.y / self.zoom);
    }

    pub fn scroll_by(&mut self, delta: Vec2) {
        self.scroll += delta;
    }
}

/// Snap to the nearest tenth. Raw accumulation of 0.1 steps drifts
/// (`0.1 + 0.2 != 0.3` in f64); rounding after each step keeps the level exact.
fn round_to_step(zoom: f64) -> f64 {
    (zoom * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zoom_clamped() {
        let mut vp = Viewport::default();
        vp.set_zoom(12.0);
        assert!((vp.zoom() - MAX_ZOOM).abs() < f64::EPSILON);
        vp.set_zoom(0.0);
        assert!((vp.zoom() - MIN_ZOOM).abs() < f64::EPSILON);
    }

    #[test]
    fn test_zoom_steps_stay_on_lattice() {
        let mut vp = Viewport::default();
        for _ in 0..7 {
            vp.zoom_in();
        }
        assert!((vp.zoom() - 1.7).abs() < f64::EPSILON);
        for _ in 0..20 {
            vp.zoom_out();
        }
        assert!((vp.zoom() - MIN_ZOOM).abs() < f64::EPSILON);
        vp.zoom_in();
        assert!((vp.zoom() - 0.2).abs() < f64::EPSILON);
    }

    #[test]
    fn test_zoom_in_saturates_at_max() {
        let mut vp = Viewport::default();
        for _ in 0..60 {
            vp.zoom_in();
        }
        assert!((vp.zoom() - MAX_ZOOM).abs() < f64::EPSILON);
    }

    #[test]
    fn test_screen_scene_round_trip() {
        let mut vp = Viewport::default();
        vp.scroll = Vec2::new(120.0, -40.0);
        vp.set_zoom(2.0);
        let scene = vp.screen_to_scene(Point::new(64.0, 32.0));
        let back = vp.scene_to_screen(scene);
        assert!((back.x - 64.0).abs() < 1e-9);
        assert!((back.y - 32.0).abs() < 1e-9);
    }

    #[test]
    fn test_zoom_at_keeps_anchor_fixed() {
        let mut vp = Viewport::default();
        vp.scroll = Vec2::new(10.0, 20.0);
        let screen = Point::new(200.0, 150.0);
        let before = vp.screen_to_scene(screen);
        vp.zoom_at(screen, 2.5);
        let after = vp.screen_to_scene(screen);
        assert!((before.x - after.x).abs() < 1e-9);
        assert!((before.y - after.y).abs() < 1e-9);
    }
}
