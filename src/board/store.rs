// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Captured frames and the live pose.
//!
//! The store owns the frame sequence (index 0 is always the starting layout)
//! and the pose currently being edited. Every mutation bumps a revision
//! counter so the view layer can tell when it needs to re-read state.

use crate::error::{BoardError, Result};
use crate::models::pose::Pose;

/// Ordered list of captured poses plus the live pose under edit.
#[derive(Debug, Clone)]
pub struct PoseStore {
    initial: Pose,
    frames: Vec<Pose>,
    live: Pose,
    revision: u64,
}

impl PoseStore {
    /// Start a session from `initial`.
    pub fn new(initial: Pose) -> Self {
        Self {
            frames: vec![initial.clone()],
            live: initial.clone(),
            initial,
            revision: 0,
        }
    }

    pub fn live(&self) -> &Pose {
        &self.live
    }

    /// Replace the live pose (used by dragging).
    pub fn set_live(&mut self, pose: Pose) {
        self.live = pose;
        self.bump();
    }

    pub fn frames(&self) -> &[Pose] {
        &self.frames
    }

    /// Number of captured frames, not counting the starting layout.
    pub fn frame_count(&self) -> usize {
        self.frames.len() - 1
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Append the live pose as a new frame.
    ///
    /// Returns the new captured-frame count, or `None` if the live pose is
    /// identical to the last frame and nothing was appended.
    pub fn capture(&mut self) -> Option<usize> {
        if self.frames.last() == Some(&self.live) {
            log::debug!("Capture skipped, pose unchanged since frame {}", self.frame_count());
            return None;
        }
        self.frames.push(self.live.clone());
        self.bump();
        log::info!("Captured frame {}", self.frame_count());
        Some(self.frame_count())
    }

    /// Drop the most recent frame and resume editing from the one before it.
    ///
    /// Returns the index of the removed frame, or `None` when only the
    /// starting layout is left.
    pub fn discard_last(&mut self) -> Option<usize> {
        if self.frames.len() == 1 {
            return None;
        }
        let removed = self.frame_count();
        self.frames.pop();
        self.live = self.frames[self.frames.len() - 1].clone();
        self.bump();
        log::info!("Removed frame {}, {} left", removed, self.frame_count());
        Some(removed)
    }

    /// Back to a single starting frame.
    pub fn reset(&mut self) {
        self.frames = vec![self.initial.clone()];
        self.live = self.initial.clone();
        self.bump();
        log::info!("Frames cleared");
    }

    /// Replace every frame with an imported sequence.
    ///
    /// Nothing changes unless the whole sequence validates.
    pub fn replace_all(&mut self, frames: Vec<Pose>) -> Result<()> {
        validate_sequence(&frames, &self.initial)?;
        self.live = frames[frames.len() - 1].clone();
        self.frames = frames;
        self.bump();
        log::info!("Loaded {} frames", self.frame_count());
        Ok(())
    }

    /// Snapshot of the whole sequence for export.
    pub fn export_all(&self) -> Vec<Pose> {
        self.frames.clone()
    }

    fn bump(&mut self) {
        self.revision += 1;
    }
}

/// Check that `frames` is non-empty, tracks the same objects as `reference` in
/// every pose, and holds only finite coordinates.
pub fn validate_sequence(frames: &[Pose], reference: &Pose) -> Result<()> {
    if frames.is_empty() {
        return Err(BoardError::malformed("frame list is empty"));
    }
    for (index, pose) in frames.iter().enumerate() {
        if !pose.same_keys(reference) {
            let keys: Vec<String> = pose.keys().map(|k| k.to_string()).collect();
            return Err(BoardError::malformed(format!(
                "frame {index} tracks [{}], expected {} objects",
                keys.join(", "),
                reference.len()
            )));
        }
        if let Some((key, _)) = pose
            .iter()
            .find(|(_, p)| !p.x.is_finite() || !p.y.is_finite())
        {
            return Err(BoardError::malformed(format!(
                "frame {index} has a non-finite position for {key}"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::object::ObjectKey;
    use crate::models::pose::Position;

    fn initial() -> Pose {
        [
            (ObjectKey::Ball, Position::new(0.0, 0.0)),
            (ObjectKey::red(1), Position::new(10.0, 10.0)),
        ]
        .into_iter()
        .collect()
    }

    fn moved(x: f64) -> Pose {
        initial().with_position(ObjectKey::Ball, Position::new(x, 0.0))
    }

    #[test]
    fn test_capture_is_idempotent() {
        let mut store = PoseStore::new(initial());

        assert_eq!(store.capture(), None);
        assert_eq!(store.frames().len(), 1);

        store.set_live(moved(100.0));
        assert_eq!(store.capture(), Some(1));
        assert_eq!(store.capture(), None);
        assert_eq!(store.frames().len(), 2);
    }

    #[test]
    fn test_captured_frames_are_independent_of_later_edits() {
        let mut store = PoseStore::new(initial());
        store.set_live(moved(50.0));
        store.capture();
        store.set_live(moved(75.0));

        assert_eq!(store.frames()[1], moved(50.0));
        assert_eq!(store.live(), &moved(75.0));
    }

    #[test]
    fn test_discard_last_on_initial_only_is_noop() {
        let mut store = PoseStore::new(initial());
        let before = store.revision();

        assert_eq!(store.discard_last(), None);
        assert_eq!(store.frames().len(), 1);
        assert_eq!(store.revision(), before);
    }

    #[test]
    fn test_discard_last_restores_previous_frame() {
        let mut store = PoseStore::new(initial());
        store.set_live(moved(10.0));
        store.capture();
        store.set_live(moved(20.0));
        store.capture();
        store.set_live(moved(30.0));

        assert_eq!(store.discard_last(), Some(2));
        assert_eq!(store.frames().len(), 2);
        assert_eq!(store.live(), &moved(10.0));
        assert_eq!(store.live(), store.frames().last().unwrap());
    }

    #[test]
    fn test_reset() {
        let mut store = PoseStore::new(initial());
        store.set_live(moved(10.0));
        store.capture();

        store.reset();
        assert_eq!(store.frames(), &[initial()]);
        assert_eq!(store.live(), &initial());
        assert_eq!(store.frame_count(), 0);
    }

    #[test]
    fn test_replace_all_sets_live_to_last() {
        let mut store = PoseStore::new(initial());
        store
            .replace_all(vec![initial(), moved(5.0), moved(9.0)])
            .unwrap();

        assert_eq!(store.frame_count(), 2);
        assert_eq!(store.live(), &moved(9.0));
    }

    #[test]
    fn test_replace_all_rejects_malformed_without_partial_apply() {
        let mut store = PoseStore::new(initial());
        store.set_live(moved(10.0));
        store.capture();
        let before = store.export_all();

        let mut extra = initial();
        extra.insert(ObjectKey::blue(1), Position::new(1.0, 1.0));

        assert!(matches!(store.replace_all(vec![]), Err(BoardError::MalformedData(_))));
        assert!(matches!(
            store.replace_all(vec![initial(), extra]),
            Err(BoardError::MalformedData(_))
        ));
        assert!(matches!(
            store.replace_all(vec![moved(f64::NAN)]),
            Err(BoardError::MalformedData(_))
        ));
        assert_eq!(store.export_all(), before);
        assert_eq!(store.live(), &moved(10.0));
    }

    #[test]
    fn test_revision_tracks_mutations() {
        let mut store = PoseStore::new(initial());
        let r0 = store.revision();
        store.set_live(moved(1.0));
        let r1 = store.revision();
        store.capture();
        let r2 = store.revision();

        assert!(r1 > r0);
        assert!(r2 > r1);
    }
}
