// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Picking and dragging markers.

use super::store::PoseStore;
use crate::models::object::ObjectKey;
use crate::models::pose::Pose;
use crate::util::geometry::{square_contains, CanvasSize, Point};

/// Source of a pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerKind {
    Mouse,
    Touch,
}

/// Moves one marker at a time in response to pointer input.
#[derive(Debug, Clone)]
pub struct DragController {
    marker_size: f64,
    bounds: CanvasSize,
    clamp_mouse: bool,
    active: Option<ObjectKey>,
}

impl DragController {
    pub fn new(marker_size: f64, bounds: CanvasSize, clamp_mouse: bool) -> Self {
        Self {
            marker_size,
            bounds,
            clamp_mouse,
            active: None,
        }
    }

    /// First marker (in key order) whose square hit-box contains `point`.
    ///
    /// Markers stacked on the same spot are not depth sorted: the one that
    /// comes later in key order cannot be picked until the other moves.
    pub fn hit_test(&self, pose: &Pose, point: Point) -> Option<ObjectKey> {
        pose.iter()
            .find(|(_, pos)| square_contains(pos.point(), self.marker_size, point))
            .map(|(key, _)| *key)
    }

    pub fn begin_drag(&mut self, key: ObjectKey) {
        log::debug!("Started dragging {}", key);
        self.active = Some(key);
    }

    pub fn active(&self) -> Option<ObjectKey> {
        self.active
    }

    /// Move the dragged marker to `point`, writing a new live pose.
    ///
    /// Touch input is clamped to the canvas. Mouse input is only clamped when
    /// the controller was built with `clamp_mouse`. Returns `false` when no
    /// drag is active.
    pub fn update_position(&mut self, store: &mut PoseStore, point: Point, kind: PointerKind) -> bool {
        let Some(key) = self.active else {
            return false;
        };
        let Some(current) = store.live().get(key) else {
            log::warn!("Dragged object {} is not part of the live pose", key);
            self.active = None;
            return false;
        };

        let point = match kind {
            PointerKind::Touch => self.bounds.clamp(point),
            PointerKind::Mouse if self.clamp_mouse => self.bounds.clamp(point),
            PointerKind::Mouse => point,
        };
        let next = store.live().with_position(key, current.moved_to(point));
        store.set_live(next);
        true
    }

    pub fn end_drag(&mut self) {
        if let Some(key) = self.active.take() {
            log::debug!("Stopped dragging {}", key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::pose::Position;

    fn pose() -> Pose {
        [
            (ObjectKey::Ball, Position::new(0.0, 0.0)),
            (ObjectKey::red(1), Position::new(10.0, 10.0)),
            (ObjectKey::blue(1), Position::new(200.0, 200.0)),
        ]
        .into_iter()
        .collect()
    }

    fn controller() -> DragController {
        DragController::new(40.0, CanvasSize::new(480, 700), false)
    }

    #[test]
    fn test_hit_test_center_and_miss() {
        let drag = controller();
        let pose = pose();

        assert_eq!(drag.hit_test(&pose, Point::new(200.0, 200.0)), Some(ObjectKey::blue(1)));
        assert_eq!(drag.hit_test(&pose, Point::new(300.0, 300.0)), None);
        assert_eq!(drag.hit_test(&pose, Point::new(200.0, 221.0)), None);
    }

    #[test]
    fn test_hit_test_overlap_returns_first_in_key_order() {
        let drag = controller();

        // ball and red1 hit-boxes overlap at (5, 5)
        assert_eq!(drag.hit_test(&pose(), Point::new(5.0, 5.0)), Some(ObjectKey::Ball));
        assert_eq!(drag.hit_test(&pose(), Point::new(25.0, 25.0)), Some(ObjectKey::red(1)));
    }

    #[test]
    fn test_drag_updates_live_pose_only() {
        let mut store = PoseStore::new(pose());
        let mut drag = controller();

        assert_eq!(drag.active(), None);
        drag.begin_drag(ObjectKey::red(1));
        assert_eq!(drag.active(), Some(ObjectKey::red(1)));
        assert!(drag.update_position(&mut store, Point::new(50.0, 60.0), PointerKind::Mouse));
        drag.end_drag();
        assert_eq!(drag.active(), None);

        assert_eq!(store.live().get(ObjectKey::red(1)), Some(&Position::new(50.0, 60.0)));
        assert_eq!(store.frames()[0], pose());
    }

    #[test]
    fn test_update_without_drag_is_noop() {
        let mut store = PoseStore::new(pose());
        let mut drag = controller();
        let revision = store.revision();

        assert!(!drag.update_position(&mut store, Point::new(1.0, 1.0), PointerKind::Touch));
        drag.end_drag();

        drag.begin_drag(ObjectKey::Ball);
        drag.end_drag();
        assert!(!drag.update_position(&mut store, Point::new(1.0, 1.0), PointerKind::Mouse));

        assert_eq!(store.revision(), revision);
        assert_eq!(store.live(), &pose());
    }

    #[test]
    fn test_touch_is_clamped_mouse_is_not() {
        let mut store = PoseStore::new(pose());
        let mut drag = controller();
        drag.begin_drag(ObjectKey::Ball);

        drag.update_position(&mut store, Point::new(-30.0, 900.0), PointerKind::Touch);
        assert_eq!(store.live().get(ObjectKey::Ball), Some(&Position::new(0.0, 700.0)));

        drag.update_position(&mut store, Point::new(-30.0, 900.0), PointerKind::Mouse);
        assert_eq!(store.live().get(ObjectKey::Ball), Some(&Position::new(-30.0, 900.0)));
    }

    #[test]
    fn test_clamp_mouse_option() {
        let mut store = PoseStore::new(pose());
        let mut drag = DragController::new(40.0, CanvasSize::new(480, 700), true);
        drag.begin_drag(ObjectKey::Ball);

        drag.update_position(&mut store, Point::new(600.0, -1.0), PointerKind::Mouse);
        assert_eq!(store.live().get(ObjectKey::Ball), Some(&Position::new(480.0, 0.0)));
    }
}
