// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Off-screen rendering used for video recording.

pub mod raster;
pub mod text;
