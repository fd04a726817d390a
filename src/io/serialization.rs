// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Frame sequence serialization and deserialization.
//!
//! A tactics file is a JSON array of poses: element 0 is the starting layout
//! and every later element is a captured frame. Output is compact and key
//! order is fixed, so exporting the same frames twice yields identical bytes.

use crate::board::store::PoseStore;
use crate::error::{BoardError, Result};
use crate::models::pose::Pose;
use anyhow::Context;
use chrono::{DateTime, Local};
use std::path::Path;

const FILE_PREFIX: &str = "tactics-board";

/// `tactics-board_<YYYYMMDDHHMMSS>.<extension>`
pub fn timestamped_file_name(now: DateTime<Local>, extension: &str) -> String {
    format!("{}_{}.{}", FILE_PREFIX, now.format("%Y%m%d%H%M%S"), extension)
}

/// Serialize frames to the on-disk JSON form.
pub fn to_json(frames: &[Pose]) -> Result<String> {
    serde_json::to_string(frames).map_err(|e| BoardError::malformed(e.to_string()))
}

/// Parse the on-disk JSON form. Only the array-of-poses shape is checked
/// here; key-set consistency is checked when the frames are applied.
pub fn from_json(json: &str) -> Result<Vec<Pose>> {
    let value: serde_json::Value = serde_json::from_str(json)?;
    if !value.is_array() {
        return Err(BoardError::malformed("expected a JSON array of frames"));
    }
    Ok(serde_json::from_value(value)?)
}

/// Export frames to a JSON file.
pub fn export_json(frames: &[Pose], path: &Path) -> anyhow::Result<()> {
    let json = to_json(frames)?;
    std::fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

/// Import frames from a JSON file.
pub fn import_json(path: &Path) -> anyhow::Result<Vec<Pose>> {
    let json = std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let frames = from_json(&json)?;
    Ok(frames)
}

/// Result of an import as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportReport {
    pub success: bool,
    pub message: String,
}

/// Load `path` into `store`, converting every failure into a report. The
/// store is left untouched unless the whole file is valid.
pub fn import_into(store: &mut PoseStore, path: &Path) -> ImportReport {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let result = import_json(path).and_then(|frames| store.replace_all(frames).map_err(Into::into));
    match result {
        Ok(()) => ImportReport {
            success: true,
            message: format!("{name} loaded ({} frames)", store.frame_count()),
        },
        Err(e) => {
            log::error!("Failed to import {}: {:#}", path.display(), e);
            ImportReport {
                success: false,
                message: format!("Could not read {name}: {e:#}"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::court::{CourtKind, MARKER_SIZE};
    use crate::models::object::ObjectKey;
    use crate::models::pose::Position;
    use chrono::TimeZone;

    fn frames() -> Vec<Pose> {
        let initial = CourtKind::Half.initial_pose(MARKER_SIZE);
        let moved = initial.with_position(ObjectKey::red(2), Position::new(123.456, 78.9));
        let colored = moved.with_position(
            ObjectKey::Ball,
            Position {
                x: 1.0 / 3.0,
                y: 640.0,
                color: Some("#ffaa00".to_string()),
            },
        );
        vec![initial, moved, colored]
    }

    #[test]
    fn test_file_name() {
        let now = Local.with_ymd_and_hms(2024, 3, 9, 17, 5, 42).unwrap();
        assert_eq!(timestamped_file_name(now, "json"), "tactics-board_20240309170542.json");
        assert_eq!(timestamped_file_name(now, "mp4"), "tactics-board_20240309170542.mp4");
    }

    #[test]
    fn test_single_pose_roundtrip() {
        for court in [CourtKind::Full, CourtKind::Half] {
            let seq = vec![court.initial_pose(MARKER_SIZE)];
            let back = from_json(&to_json(&seq).unwrap()).unwrap();
            assert_eq!(back, seq);
        }
    }

    #[test]
    fn test_reexport_is_byte_identical() {
        let first = to_json(&frames()).unwrap();
        let second = to_json(&from_json(&first).unwrap()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_reads_unsorted_keys_and_integers() {
        let json = r#"[{"red1":{"x":10,"y":20},"ball":{"x":5,"y":6}}]"#;
        let frames = from_json(json).unwrap();

        assert_eq!(frames[0].get(ObjectKey::Ball), Some(&Position::new(5.0, 6.0)));
        assert_eq!(frames[0].get(ObjectKey::red(1)), Some(&Position::new(10.0, 20.0)));
    }

    #[test]
    fn test_rejects_bad_shapes() {
        for bad in [
            "",
            "not json",
            r#"{"ball":{"x":1,"y":2}}"#,
            r#"[{"ball":{"x":1}}]"#,
            r#"[{"ball":{"x":"1","y":2}}]"#,
            r#"[{"goalie":{"x":1,"y":2}}]"#,
            r#"[1, 2, 3]"#,
        ] {
            assert!(
                matches!(from_json(bad), Err(BoardError::MalformedData(_))),
                "{bad:?} should be malformed"
            );
        }
    }

    #[test]
    fn test_import_into_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("play.json");
        export_json(&frames(), &path).unwrap();

        let mut store = PoseStore::new(CourtKind::Half.initial_pose(MARKER_SIZE));
        let report = import_into(&mut store, &path);

        assert!(report.success, "{}", report.message);
        assert_eq!(store.export_all(), frames());
        assert_eq!(store.live(), &frames()[2]);
    }

    #[test]
    fn test_failed_import_leaves_store_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, r#"[{"ball":{"x":1,"y":2}}]"#).unwrap();

        let mut store = PoseStore::new(CourtKind::Full.initial_pose(MARKER_SIZE));
        let before = store.revision();
        let report = import_into(&mut store, &path);

        assert!(!report.success);
        assert!(report.message.contains("broken.json"));
        assert_eq!(store.revision(), before);
        assert_eq!(store.frames().len(), 1);

        let missing = import_into(&mut store, &dir.path().join("missing.json"));
        assert!(!missing.success);
    }
}
