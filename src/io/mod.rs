// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! I/O operations for tactics files, court images and video.

pub mod media;
pub mod serialization;
pub mod video;
