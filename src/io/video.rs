// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! MP4 export through the system `ffmpeg`.
//!
//! Frames are streamed to `ffmpeg` as raw RGBA on stdin and encoded to H.264
//! (yuv420p) for broad player compatibility.

use crate::board::recording::{VideoConfig, VideoSink};
use crate::error::{BoardError, Result};
use image::RgbaImage;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};
use std::thread::JoinHandle;

/// Video sink backed by an `ffmpeg` child process.
pub struct FfmpegVideoSink {
    out_path: PathBuf,
    child: Option<Child>,
    stdin: Option<ChildStdin>,
    stderr_drain: Option<JoinHandle<std::io::Result<Vec<u8>>>>,
    config: Option<VideoConfig>,
}

impl FfmpegVideoSink {
    pub fn new(out_path: impl Into<PathBuf>) -> Self {
        Self {
            out_path: out_path.into(),
            child: None,
            stdin: None,
            stderr_drain: None,
            config: None,
        }
    }
}

impl VideoSink for FfmpegVideoSink {
    fn begin(&mut self, config: VideoConfig) -> Result<()> {
        validate_config(&config)?;
        ensure_parent_dir(&self.out_path)?;
        if !is_ffmpeg_on_path() {
            return Err(BoardError::encoder(
                "ffmpeg is required for video export, but was not found on PATH",
            ));
        }

        let mut cmd = Command::new("ffmpeg");
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .args(["-y", "-loglevel", "error", "-f", "rawvideo", "-pix_fmt", "rgba"])
            .args(["-s", &format!("{}x{}", config.width, config.height)])
            .args(["-r", &config.fps.to_string()])
            .args(["-i", "pipe:0"])
            .args(["-an", "-c:v", "libx264", "-pix_fmt", "yuv420p", "-movflags", "+faststart"])
            .arg(&self.out_path);

        let mut child = cmd
            .spawn()
            .map_err(|e| BoardError::encoder(format!("failed to spawn ffmpeg: {e}")))?;
        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| BoardError::encoder("failed to open ffmpeg stdin"))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| BoardError::encoder("failed to open ffmpeg stderr"))?;
        let stderr_drain = std::thread::spawn(move || {
            let mut bytes = Vec::new();
            stderr.read_to_end(&mut bytes)?;
            Ok(bytes)
        });

        log::debug!("Spawned ffmpeg writing {}", self.out_path.display());
        self.child = Some(child);
        self.stdin = Some(stdin);
        self.stderr_drain = Some(stderr_drain);
        self.config = Some(config);
        Ok(())
    }

    fn push_frame(&mut self, frame: &RgbaImage) -> Result<()> {
        let config = self
            .config
            .ok_or_else(|| BoardError::encoder("ffmpeg sink not started"))?;
        if frame.dimensions() != (config.width, config.height) {
            return Err(BoardError::encoder(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width(),
                frame.height(),
                config.width,
                config.height
            )));
        }
        let stdin = self
            .stdin
            .as_mut()
            .ok_or_else(|| BoardError::encoder("ffmpeg sink is already finalized"))?;
        stdin
            .write_all(frame.as_raw())
            .map_err(|e| BoardError::encoder(format!("failed to write frame to ffmpeg: {e}")))
    }

    fn finish(&mut self) -> Result<PathBuf> {
        drop(self.stdin.take());
        let mut child = self
            .child
            .take()
            .ok_or_else(|| BoardError::encoder("ffmpeg sink not started"))?;
        let status = child
            .wait()
            .map_err(|e| BoardError::encoder(format!("failed to wait for ffmpeg: {e}")))?;
        let stderr = match self.stderr_drain.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| BoardError::encoder("ffmpeg stderr drain thread panicked"))??,
            None => Vec::new(),
        };
        self.config = None;

        if !status.success() {
            return Err(BoardError::encoder(format!(
                "ffmpeg exited with status {}: {}",
                status,
                String::from_utf8_lossy(&stderr).trim()
            )));
        }
        Ok(self.out_path.clone())
    }
}

/// yuv420p needs a non-empty, even-sized picture.
fn validate_config(config: &VideoConfig) -> Result<()> {
    if config.fps == 0 {
        return Err(BoardError::encoder("fps must be non-zero"));
    }
    if config.width == 0 || config.height == 0 {
        return Err(BoardError::render_target("video size must be non-zero"));
    }
    if config.width % 2 != 0 || config.height % 2 != 0 {
        return Err(BoardError::encoder(format!(
            "video size must be even, got {}x{}",
            config.width, config.height
        )));
    }
    Ok(())
}

/// Ensure the parent directory of `path` exists.
fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}

/// Return `true` when `ffmpeg` can be invoked from `PATH`.
pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}
