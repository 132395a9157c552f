use std::cell::Cell;
use std::rc::Rc;

use crate::coords::NormPoint;

/// Where the tracker reads the pointer from.
///
/// Positions are window-relative logical pixels, origin top-left, +y down.
pub trait PointerSource {
    fn pointer_px(&self) -> (f64, f64);
}

/// Fixed position; handy for tests and headless use.
impl PointerSource for (f64, f64) {
    fn pointer_px(&self) -> (f64, f64) {
        *self
    }
}

/// Last-known pointer position, shared between the window backend (writer)
/// and the input tracker (reader).
///
/// Starts at `(0, 0)` and keeps its value after the pointer leaves the window.
#[derive(Debug, Clone, Default)]
pub struct SharedPointer(Rc<Cell<(f64, f64)>>);

impl SharedPointer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, x: f64, y: f64) {
        self.0.set((x, y));
    }

    pub fn get(&self) -> (f64, f64) {
        self.0.get()
    }
}

impl PointerSource for SharedPointer {
    fn pointer_px(&self) -> (f64, f64) {
        self.get()
    }
}

/// Maps a window-pixel position into normalized coordinates.
///
/// `(w/2, h/2)` maps to `(0, 0)`, `(0, 0)` to `(-1, 1)` and `(w, h)` to
/// `(1, -1)`. Positions outside the window map outside `[-1, 1]`; nothing is
/// clamped.
pub fn normalize(px: f64, py: f64, width: u32, height: u32) -> NormPoint {
    let half_w = f64::from(width.max(1)) / 2.0;
    let half_h = f64::from(height.max(1)) / 2.0;
    NormPoint::new((px / half_w - 1.0) as f32, (1.0 - py / half_h) as f32)
}

/// Reports the pointer in normalized coordinates relative to a fixed window size.
///
/// The size is captured once at construction; later window resizes are not tracked.
#[derive(Debug)]
pub struct InputTracker<S> {
    source: S,
    width: u32,
    height: u32,
}

impl<S: PointerSource> InputTracker<S> {
    pub fn new(source: S, width: u32, height: u32) -> Self {
        if width == 0 || height == 0 {
            log::warn!("input tracker created with a degenerate {width}x{height} window");
        }
        Self { source, width, height }
    }

    /// Current pointer position. Reading has no side effects.
    pub fn position(&self) -> NormPoint {
        let (px, py) = self.source.pointer_px();
        normalize(px, py, self.width, self.height)
    }

    #[inline]
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn source(&self) -> &S {
        &self.source
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(px: f64, py: f64) -> NormPoint {
        InputTracker::new((px, py), 800, 600).position()
    }

    #[test]
    fn center_maps_to_origin() {
        assert_eq!(at(400.0, 300.0), NormPoint::new(0.0, 0.0));
    }

    #[test]
    fn corners_map_to_unit_square() {
        assert_eq!(at(0.0, 0.0), NormPoint::new(-1.0, 1.0));
        assert_eq!(at(800.0, 600.0), NormPoint::new(1.0, -1.0));
        assert_eq!(at(800.0, 0.0), NormPoint::new(1.0, 1.0));
    }

    #[test]
    fn outside_positions_are_not_clamped() {
        let p = at(1200.0, -300.0);
        assert_eq!(p, NormPoint::new(2.0, 2.0));
    }

    #[test]
    fn position_is_idempotent() {
        let tracker = InputTracker::new((123.0, 456.0), 800, 600);
        assert_eq!(tracker.position(), tracker.position());
    }

    #[test]
    fn shared_pointer_defaults_to_top_left_and_follows_updates() {
        let pointer = SharedPointer::new();
        let tracker = InputTracker::new(pointer.clone(), 800, 600);
        assert_eq!(tracker.position(), NormPoint::new(-1.0, 1.0));

        pointer.set(400.0, 300.0);
        assert_eq!(tracker.position(), NormPoint::ORIGIN);
    }
}
