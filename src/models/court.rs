// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Court variants and their starting layouts.

use super::object::{ObjectKey, Team, PLAYERS_PER_TEAM};
use super::pose::{Pose, Position};
use crate::util::geometry::{CanvasSize, Point};
use serde::{Deserialize, Serialize};
use std::f64::consts::{PI, TAU};

/// Side length of a marker (and its hit-box) in canvas pixels.
pub const MARKER_SIZE: f64 = 40.0;

/// Court floor colour, `#f3b75f`.
pub const PARQUET_RGB: [u8; 3] = [0xf3, 0xb7, 0x5f];

/// One painted line of the court, in canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CourtMark {
    Segment { from: Point, to: Point },
    /// Angles in radians, measured clockwise from +x (y points down).
    Arc { center: Point, radius: f64, start: f64, end: f64 },
}

/// Which board is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CourtKind {
    #[default]
    Full,
    Half,
}

impl CourtKind {
    pub fn label(self) -> &'static str {
        match self {
            CourtKind::Full => "Full court",
            CourtKind::Half => "Half court",
        }
    }

    pub fn canvas_size(self) -> CanvasSize {
        match self {
            CourtKind::Full => CanvasSize::new(480, 800),
            CourtKind::Half => CanvasSize::new(480, 700),
        }
    }

    /// Lines drawn when no court image is configured.
    pub fn marks(self) -> Vec<CourtMark> {
        let canvas = self.canvas_size();
        let (w, h) = (canvas.width as f64, canvas.height as f64);
        let m = 10.0;
        let cx = w / 2.0;

        let mut marks = rectangle(Point::new(m, m), Point::new(w - m, h - m));
        marks.extend(basket_end(cx, m, 1.0));
        match self {
            CourtKind::Full => {
                marks.extend(basket_end(cx, h - m, -1.0));
                marks.push(segment(m, h / 2.0, w - m, h / 2.0));
                marks.push(circle(Point::new(cx, h / 2.0), 50.0));
            }
            CourtKind::Half => {
                marks.push(CourtMark::Arc {
                    center: Point::new(cx, h - m),
                    radius: 50.0,
                    start: PI,
                    end: TAU,
                });
            }
        }
        marks
    }

    /// Layout every session starts from.
    pub fn initial_pose(self, marker_size: f64) -> Pose {
        match self {
            CourtKind::Full => full_court_layout(marker_size),
            CourtKind::Half => half_court_layout(marker_size),
        }
    }
}

fn segment(x0: f64, y0: f64, x1: f64, y1: f64) -> CourtMark {
    CourtMark::Segment {
        from: Point::new(x0, y0),
        to: Point::new(x1, y1),
    }
}

fn circle(center: Point, radius: f64) -> CourtMark {
    CourtMark::Arc {
        center,
        radius,
        start: 0.0,
        end: TAU,
    }
}

fn rectangle(min: Point, max: Point) -> Vec<CourtMark> {
    vec![
        segment(min.x, min.y, max.x, min.y),
        segment(max.x, min.y, max.x, max.y),
        segment(max.x, max.y, min.x, max.y),
        segment(min.x, max.y, min.x, min.y),
    ]
}

/// Key, free-throw circle, hoop and three-point arc for the basket on the
/// baseline at `baseline_y`. `dir` is +1 when the court extends downwards.
fn basket_end(cx: f64, baseline_y: f64, dir: f64) -> Vec<CourtMark> {
    let key_half_width = 80.0;
    let key_depth = 150.0;
    let hoop = Point::new(cx, baseline_y + dir * 40.0);
    let free_throw = Point::new(cx, baseline_y + dir * key_depth);
    let (arc_start, arc_end) = if dir > 0.0 { (0.0, PI) } else { (PI, TAU) };

    let mut marks = rectangle(
        Point::new(cx - key_half_width, baseline_y.min(free_throw.y)),
        Point::new(cx + key_half_width, baseline_y.max(free_throw.y)),
    );
    marks.push(circle(free_throw, 60.0));
    marks.push(circle(hoop, 8.0));
    marks.push(CourtMark::Arc {
        center: hoop,
        radius: 190.0,
        start: arc_start,
        end: arc_end,
    });
    marks
}

/// Single column along the left edge: red 1-5, the ball, then blue 1-5.
fn full_court_layout(size: f64) -> Pose {
    let x = size / 2.0 + 5.0;
    let first_y = size / 2.0 + 10.0;
    let order = (1..=PLAYERS_PER_TEAM)
        .map(ObjectKey::red)
        .chain(std::iter::once(ObjectKey::Ball))
        .chain((1..=PLAYERS_PER_TEAM).map(ObjectKey::blue));

    order
        .enumerate()
        .map(|(i, key)| (key, Position::new(x, first_y + (size + 5.0) * i as f64)))
        .collect()
}

/// Two rows near the bottom, reds above blues, ball at the end of the red row.
fn half_court_layout(size: f64) -> Pose {
    let first_x = size / 2.0 + 40.0;
    let first_y = 600.0;
    let spacing = size + 10.0;

    let mut pose = Pose::new();
    pose.insert(
        ObjectKey::Ball,
        Position::new(first_x + spacing * PLAYERS_PER_TEAM as f64, first_y),
    );
    for n in 1..=PLAYERS_PER_TEAM {
        let x = first_x + spacing * (n - 1) as f64;
        pose.insert(ObjectKey::Player(Team::Red, n), Position::new(x, first_y));
        pose.insert(ObjectKey::Player(Team::Blue, n), Position::new(x, first_y + spacing));
    }
    pose
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layouts_track_every_object() {
        for court in [CourtKind::Full, CourtKind::Half] {
            let pose = court.initial_pose(MARKER_SIZE);
            let keys: Vec<_> = pose.keys().collect();
            assert_eq!(keys, ObjectKey::all(), "{court:?}");
        }
    }

    #[test]
    fn test_full_court_column() {
        let pose = CourtKind::Full.initial_pose(MARKER_SIZE);

        assert_eq!(pose.get(ObjectKey::red(1)), Some(&Position::new(25.0, 30.0)));
        assert_eq!(pose.get(ObjectKey::Ball), Some(&Position::new(25.0, 255.0)));
        assert_eq!(pose.get(ObjectKey::blue(5)), Some(&Position::new(25.0, 480.0)));
    }

    #[test]
    fn test_half_court_rows() {
        let pose = CourtKind::Half.initial_pose(MARKER_SIZE);

        assert_eq!(pose.get(ObjectKey::red(1)), Some(&Position::new(60.0, 600.0)));
        assert_eq!(pose.get(ObjectKey::blue(3)), Some(&Position::new(160.0, 650.0)));
        assert_eq!(pose.get(ObjectKey::Ball), Some(&Position::new(310.0, 600.0)));
    }

    #[test]
    fn test_court_marks_stay_on_canvas() {
        for court in [CourtKind::Full, CourtKind::Half] {
            let canvas = court.canvas_size();
            let inside = |p: Point| {
                (0.0..=canvas.width as f64).contains(&p.x) && (0.0..=canvas.height as f64).contains(&p.y)
            };
            for mark in court.marks() {
                match mark {
                    CourtMark::Segment { from, to } => assert!(inside(from) && inside(to)),
                    CourtMark::Arc { center, radius, .. } => {
                        assert!(inside(center));
                        assert!(center.x - radius >= 0.0 && center.x + radius <= canvas.width as f64);
                    }
                }
            }
        }
    }

    #[test]
    fn test_layouts_fit_on_canvas() {
        for court in [CourtKind::Full, CourtKind::Half] {
            let canvas = court.canvas_size();
            for (_, pos) in court.initial_pose(MARKER_SIZE).iter() {
                assert!(pos.x + MARKER_SIZE / 2.0 <= canvas.width as f64);
                assert!(pos.y + MARKER_SIZE / 2.0 <= canvas.height as f64);
            }
        }
    }
}
