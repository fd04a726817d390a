// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Positions and poses.
//!
//! A [`Pose`] is a complete snapshot of where every marker sits at one
//! instant. Poses are plain values: editing produces a new pose, so frames
//! captured earlier never change underneath the sequence.

use super::object::ObjectKey;
use crate::util::geometry::Point;
use serde::{Deserialize, Serialize};
use std::collections::{btree_map, BTreeMap};

/// Location of one marker in canvas pixel coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    /// Optional display colour (`#rrggbb`) overriding the team colour.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y, color: None }
    }

    pub fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Same colour, new coordinates.
    pub fn moved_to(&self, point: Point) -> Self {
        Self {
            x: point.x,
            y: point.y,
            color: self.color.clone(),
        }
    }
}

/// Mapping from every object on the board to its position.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Pose(BTreeMap<ObjectKey, Position>);

impl Pose {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: ObjectKey) -> Option<&Position> {
        self.0.get(&key)
    }

    pub fn insert(&mut self, key: ObjectKey, position: Position) {
        self.0.insert(key, position);
    }

    /// Copy of this pose with `key` moved to `position`.
    pub fn with_position(&self, key: ObjectKey, position: Position) -> Pose {
        let mut next = self.clone();
        next.0.insert(key, position);
        next
    }

    pub fn iter(&self) -> btree_map::Iter<'_, ObjectKey, Position> {
        self.0.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = ObjectKey> + '_ {
        self.0.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether both poses track exactly the same objects.
    pub fn same_keys(&self, other: &Pose) -> bool {
        self.0.len() == other.0.len() && self.0.keys().eq(other.0.keys())
    }
}

impl FromIterator<(ObjectKey, Position)> for Pose {
    fn from_iter<I: IntoIterator<Item = (ObjectKey, Position)>>(iter: I) -> Self {
        Pose(iter.into_iter().collect())
    }
}
