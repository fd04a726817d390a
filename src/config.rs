// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Application settings.
//!
//! Settings are read from `tactics-board.json` in the working directory when
//! it exists. Missing fields take their defaults.

use crate::board::playback::DEFAULT_TRANSITION_STEPS;
use crate::models::court::{CourtKind, MARKER_SIZE};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "tactics-board.json";

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    /// Board shown at startup.
    pub court: CourtKind,
    /// Marker (and hit-box) side length in canvas pixels.
    pub marker_size: f64,
    /// Animation ticks per transition.
    pub transition_steps: u32,
    /// Frame rate of recorded videos.
    pub video_fps: u32,
    /// Clamp mouse drags to the canvas like touch drags.
    pub clamp_mouse: bool,
    /// Where recorded videos are written.
    pub output_dir: PathBuf,
    pub full_court_image: Option<PathBuf>,
    pub half_court_image: Option<PathBuf>,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            court: CourtKind::Full,
            marker_size: MARKER_SIZE,
            transition_steps: DEFAULT_TRANSITION_STEPS,
            video_fps: 60,
            clamp_mouse: false,
            output_dir: PathBuf::from("."),
            full_court_image: None,
            half_court_image: None,
        }
    }
}

impl BoardConfig {
    /// Parse a config file.
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
        let config: BoardConfig =
            serde_json::from_str(&json).with_context(|| format!("Invalid config in {}", path.display()))?;
        Ok(config.sanitized())
    }

    /// Load `path` if present; fall back to defaults (with a warning) if it
    /// is missing or unreadable.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            log::debug!("No config at {}, using defaults", path.display());
            return Self::default();
        }
        match Self::load(path) {
            Ok(config) => {
                log::info!("Loaded config from {}", path.display());
                config
            }
            Err(e) => {
                log::warn!("{:#}; using defaults", e);
                Self::default()
            }
        }
    }

    pub fn court_image(&self, court: CourtKind) -> Option<&Path> {
        match court {
            CourtKind::Full => self.full_court_image.as_deref(),
            CourtKind::Half => self.half_court_image.as_deref(),
        }
    }

    fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        if !(self.marker_size.is_finite() && self.marker_size > 0.0) {
            log::warn!("Ignoring marker_size {}", self.marker_size);
            self.marker_size = defaults.marker_size;
        }
        if self.transition_steps == 0 {
            log::warn!("Ignoring transition_steps 0");
            self.transition_steps = defaults.transition_steps;
        }
        if self.video_fps == 0 {
            log::warn!("Ignoring video_fps 0");
            self.video_fps = defaults.video_fps;
        }
        self
    }
}
