// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Draggable board objects.
//!
//! Every marker on the board is identified by an [`ObjectKey`]: the ball or
//! one of five players on each of the two teams. On disk the keys keep their
//! short string form (`"ball"`, `"red3"`, `"blue5"`).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of players per team.
pub const PLAYERS_PER_TEAM: u8 = 5;

/// Team a player marker belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Team {
    Red,
    Blue,
}

impl Team {
    pub fn name(self) -> &'static str {
        match self {
            Team::Red => "red",
            Team::Blue => "blue",
        }
    }

    /// Default marker fill colour.
    pub fn rgb(self) -> [u8; 3] {
        match self {
            Team::Red => [0xd3, 0x2f, 0x2f],
            Team::Blue => [0x19, 0x76, 0xd2],
        }
    }
}

/// Identity of a marker on the board.
///
/// The derived ordering (ball first, then red 1-5, then blue 1-5) is also the
/// order in which markers are hit-tested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ObjectKey {
    Ball,
    Player(Team, u8),
}

impl ObjectKey {
    /// All keys in hit-test order.
    pub fn all() -> Vec<ObjectKey> {
        let mut keys = vec![ObjectKey::Ball];
        for team in [Team::Red, Team::Blue] {
            keys.extend((1..=PLAYERS_PER_TEAM).map(|n| ObjectKey::Player(team, n)));
        }
        keys
    }

    pub fn red(number: u8) -> Self {
        ObjectKey::Player(Team::Red, number)
    }

    pub fn blue(number: u8) -> Self {
        ObjectKey::Player(Team::Blue, number)
    }

    /// Short text drawn on the marker.
    pub fn badge(&self) -> String {
        match self {
            ObjectKey::Ball => String::new(),
            ObjectKey::Player(_, n) => n.to_string(),
        }
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObjectKey::Ball => write!(f, "ball"),
            ObjectKey::Player(team, n) => write!(f, "{}{}", team.name(), n),
        }
    }
}

impl FromStr for ObjectKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "ball" {
            return Ok(ObjectKey::Ball);
        }
        let (team, rest) = if let Some(rest) = s.strip_prefix("red") {
            (Team::Red, rest)
        } else if let Some(rest) = s.strip_prefix("blue") {
            (Team::Blue, rest)
        } else {
            return Err(format!("unknown object key '{s}'"));
        };
        match rest.parse::<u8>() {
            Ok(n) if (1..=PLAYERS_PER_TEAM).contains(&n) && rest.len() == 1 => {
                Ok(ObjectKey::Player(team, n))
            }
            _ => Err(format!("unknown object key '{s}'")),
        }
    }
}

impl TryFrom<String> for ObjectKey {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ObjectKey> for String {
    fn from(value: ObjectKey) -> Self {
        value.to_string()
    }
}
