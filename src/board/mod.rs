// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! The animation engine: frame storage, dragging, playback and recording.

pub mod drag;
pub mod notify;
pub mod playback;
pub mod recording;
pub mod store;
