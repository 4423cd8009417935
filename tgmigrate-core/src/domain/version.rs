//! Migration version arithmetic
//!
//! Versions are integers rendered as three-digit zero-padded strings
//! ("000", "007", "042"). All functions here are pure.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::result::{Error, Result};

/// Direction a migration step is applied in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Up,
    Down,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "up" => Ok(Direction::Up),
            "down" => Ok(Direction::Down),
            other => Err(Error::InvalidDirection(other.to_string())),
        }
    }
}

/// A migration version
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version(i32);

impl Version {
    /// One below the first migration. Stands in for "nothing applied yet".
    pub const BEFORE_FIRST: Version = Version(-1);

    pub fn new(value: i32) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i32 {
        self.0
    }

    /// Parse a version string. Empty or non-numeric input is rejected.
    pub fn parse(s: &str) -> Result<Self> {
        s.parse::<i32>()
            .map(Version)
            .map_err(|_| Error::invalid_version(s))
    }

    /// The version immediately below this one.
    ///
    /// There is no floor: the version below "000" is "-01".
    pub fn decrement(&self) -> Result<Self> {
        self.0
            .checked_sub(1)
            .map(Version)
            .ok_or_else(|| Error::invalid_version(self.to_string()))
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:03}", self.0)
    }
}

impl FromStr for Version {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Version::parse(s)
    }
}

impl PartialEq<&str> for Version {
    fn eq(&self, other: &&str) -> bool {
        self.to_string() == *other
    }
}

/// Decrement a version string, re-rendering it zero-padded.
pub fn decrement(version: &str) -> Result<String> {
    Ok(Version::parse(version)?.decrement()?.to_string())
}

/// Compute the ordered migration steps needed to move from `from` to `to`.
///
/// An absent or empty `from` means no migration has been applied, so every
/// version from "000" up to `to` is returned. Steps are ascending when moving
/// up and descending when moving down. Equal versions produce no steps and
/// the `Up` direction.
pub fn steps_between(from: Option<&str>, to: &str) -> Result<(Vec<Version>, Direction)> {
    if to.is_empty() {
        return Err(Error::invalid_version(to));
    }

    let from = match from.filter(|s| !s.is_empty()) {
        Some(s) => Version::parse(s)?,
        None => Version::BEFORE_FIRST,
    };
    let to = Version::parse(to)?;

    if from == to {
        return Ok((Vec::new(), Direction::Up));
    }

    // min < max here, so min + 1 cannot overflow
    let lower = from.min(to).value() + 1;
    let upper = from.max(to).value();

    if from > to {
        let steps = (lower..=upper).rev().map(Version).collect();
        Ok((steps, Direction::Down))
    } else {
        let steps = (lower..=upper).map(Version).collect();
        Ok((steps, Direction::Up))
    }
}
