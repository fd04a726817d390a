// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Board data model: objects, poses and courts.

pub mod court;
pub mod object;
pub mod pose;
