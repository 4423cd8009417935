//! Migration record domain model

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use super::result::Result;
use super::version::{decrement, Direction};

/// An immutable audit entry: `version` was applied in `direction` for `target`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationRecord {
    /// Graph the migration history belongs to
    pub target: String,
    pub version: String,
    pub direction: Direction,
    pub created_at: DateTime<Utc>,
}

impl MigrationRecord {
    pub fn new(target: impl Into<String>, version: impl Into<String>, direction: Direction) -> Self {
        Self {
            target: target.into(),
            version: version.into(),
            direction,
            created_at: Utc::now(),
        }
    }

    /// Synthetic primary key, e.g. `003_up_2024-05-01T10:00:00Z`
    pub fn key(&self) -> String {
        format!(
            "{}_{}_{}",
            self.version,
            self.direction,
            self.created_at.to_rfc3339_opts(SecondsFormat::Secs, true)
        )
    }
}

/// Derive the effective current version from the most recent record.
///
/// A `down` record names the migration that was undone, so the resulting
/// state is one version below it. `direction` is the raw stored value and
/// must be `up` or `down`.
pub fn current_version(version: &str, direction: &str) -> Result<String> {
    match direction.parse::<Direction>()? {
        Direction::Up => Ok(version.to_string()),
        Direction::Down => decrement(version),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::result::Error;
    use chrono::TimeZone;

    #[test]
    fn test_up_record_is_current() {
        assert_eq!(current_version("010", "up").unwrap(), "010");
    }

    #[test]
    fn test_down_record_is_one_below() {
        assert_eq!(current_version("001", "down").unwrap(), "000");
        assert_eq!(current_version("012", "down").unwrap(), "011");
    }

    #[test]
    fn test_down_record_of_first_migration() {
        assert_eq!(current_version("000", "down").unwrap(), "-01");
    }

    #[test]
    fn test_invalid_direction() {
        assert!(matches!(
            current_version("001", "don"),
            Err(Error::InvalidDirection(_))
        ));
    }

    #[test]
    fn test_down_record_with_bad_version() {
        assert!(matches!(
            current_version("x01", "down"),
            Err(Error::InvalidVersion(_))
        ));
    }

    #[test]
    fn test_record_key() {
        let record = MigrationRecord {
            target: "MyGraph".to_string(),
            version: "003".to_string(),
            direction: Direction::Up,
            created_at: Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap(),
        };
        assert_eq!(record.key(), "003_up_2024-05-01T10:00:00Z");
    }
}
