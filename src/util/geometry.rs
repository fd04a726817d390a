// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Geometric utility functions.
//!
//! This module provides points, canvas bounds, marker hit-boxes and the
//! conversion between on-screen pixels and canvas coordinates.

use serde::{Deserialize, Serialize};

/// A 2D point in canvas pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Size of the drawing canvas in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanvasSize {
    pub width: u32,
    pub height: u32,
}

impl CanvasSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Clamp a point into `[0, width] x [0, height]`.
    pub fn clamp(&self, point: Point) -> Point {
        Point {
            x: point.x.clamp(0.0, self.width as f64),
            y: point.y.clamp(0.0, self.height as f64),
        }
    }

    /// Uniform scale that fits the canvas inside `available` while keeping its
    /// aspect ratio.
    pub fn fit_scale(&self, available_width: f64, available_height: f64) -> f64 {
        if self.width == 0 || self.height == 0 {
            return 1.0;
        }
        let sx = available_width / self.width as f64;
        let sy = available_height / self.height as f64;
        sx.min(sy).max(0.0)
    }
}

/// Whether `point` lies inside the square of side `size` centered on `center`.
/// Edges count as inside.
pub fn square_contains(center: Point, size: f64, point: Point) -> bool {
    let half = size / 2.0;
    center.x <= point.x + half
        && point.x <= center.x + half
        && center.y <= point.y + half
        && point.y <= center.y + half
}

/// Convert on-screen coordinates to canvas coordinates for a canvas drawn at
/// `origin` with the given scale.
pub fn screen_to_canvas(screen_x: f64, screen_y: f64, origin: Point, scale: f64) -> Point {
    Point {
        x: (screen_x - origin.x) / scale,
        y: (screen_y - origin.y) / scale,
    }
}

/// Convert canvas coordinates to on-screen coordinates.
pub fn canvas_to_screen(point: Point, origin: Point, scale: f64) -> (f64, f64) {
    (origin.x + point.x * scale, origin.y + point.y * scale)
}
