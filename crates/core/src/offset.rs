//! Signed offsets presented as a magnitude plus a before/after direction.

use std::fmt;
use std::str::FromStr;

use anyhow::anyhow;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Before,
    #[default]
    After,
}

impl Direction {
    /// Direction of a signed value. Zero counts as `After`.
    pub fn of(value: i32) -> Self {
        if value < 0 {
            Direction::Before
        } else {
            Direction::After
        }
    }

    pub fn sign(self) -> i32 {
        match self {
            Direction::Before => -1,
            Direction::After => 1,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Before => "before",
            Direction::After => "after",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Direction {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "before" | "-1" => Ok(Direction::Before),
            "after" | "1" | "+1" => Ok(Direction::After),
            other => Err(anyhow!(
                "Unknown direction '{}': expected before|after",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Offset {
    pub magnitude: u32,
    pub direction: Direction,
}

impl Offset {
    pub fn new(magnitude: u32, direction: Direction) -> Self {
        Self {
            magnitude,
            direction,
        }
    }

    pub fn decompose(value: i32) -> Self {
        Self {
            magnitude: value.unsigned_abs(),
            direction: Direction::of(value),
        }
    }

    /// Signed value, or `None` when it does not fit an `i32`.
    pub fn recombine(self) -> Option<i32> {
        let signed = i64::from(self.magnitude) * i64::from(self.direction.sign());
        i32::try_from(signed).ok()
    }

    pub fn is_zero(&self) -> bool {
        self.magnitude == 0
    }

    /// Two offsets are equivalent when they recombine to the same value;
    /// the direction of a zero offset carries no meaning.
    pub fn equivalent(&self, other: &Offset) -> bool {
        if self.is_zero() && other.is_zero() {
            return true;
        }
        self == other
    }
}
