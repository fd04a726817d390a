// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Error types shared by the board engine.

/// Result alias carrying a [`BoardError`].
pub type Result<T> = std::result::Result<T, BoardError>;

/// Errors raised by the pose store, the playback engine and recording.
///
/// Ending a drag that never started is not an error; those calls are no-ops.
#[derive(Debug, thiserror::Error)]
pub enum BoardError {
    /// Imported frame data failed shape validation.
    #[error("malformed frame data: {0}")]
    MalformedData(String),

    /// The drawing surface is missing. Fatal for the current render pass only.
    #[error("render target unavailable: {0}")]
    RenderTargetUnavailable(String),

    /// The video encoder could not be started, fed or finalized.
    #[error("video encoder error: {0}")]
    Encoder(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl BoardError {
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedData(msg.into())
    }

    pub fn render_target(msg: impl Into<String>) -> Self {
        Self::RenderTargetUnavailable(msg.into())
    }

    pub fn encoder(msg: impl Into<String>) -> Self {
        Self::Encoder(msg.into())
    }
}

impl From<serde_json::Error> for BoardError {
    fn from(value: serde_json::Error) -> Self {
        Self::MalformedData(value.to_string())
    }
}
