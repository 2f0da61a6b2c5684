use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::SrsError;

/// Self-assessed recall outcome.
///
/// Only three ratings are admissible; any other integer is rejected with
/// [`SrsError::InvalidQuality`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub enum Quality {
    Forgot = 0,
    Remembered = 3,
    Easy = 5,
}

impl Quality {
    /// Numeric rating as stored in review records
    pub const fn value(self) -> i32 {
        self as i32
    }

    /// Whether the rating counts as a correct review
    pub const fn is_correct(self) -> bool {
        self.value() >= Self::Remembered.value()
    }

    /// Human-readable label
    pub const fn label(self) -> &'static str {
        match self {
            Self::Forgot => "Forgot",
            Self::Remembered => "Remembered",
            Self::Easy => "Easy",
        }
    }
}

impl TryFrom<i32> for Quality {
    type Error = SrsError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Forgot),
            3 => Ok(Self::Remembered),
            5 => Ok(Self::Easy),
            other => Err(SrsError::InvalidQuality(other)),
        }
    }
}

impl From<Quality> for i32 {
    fn from(quality: Quality) -> Self {
        quality.value()
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_try_from_admissible_values() {
        assert_eq!(Quality::try_from(0), Ok(Quality::Forgot));
        assert_eq!(Quality::try_from(3), Ok(Quality::Remembered));
        assert_eq!(Quality::try_from(5), Ok(Quality::Easy));
    }

    #[test]
    fn test_try_from_rejects_other_values() {
        for value in [-1, 1, 2, 4, 6, 99] {
            assert_eq!(
                Quality::try_from(value),
                Err(SrsError::InvalidQuality(value))
            );
        }
    }

    #[test]
    fn test_labels() {
        assert_eq!(Quality::Forgot.label(), "Forgot");
        assert_eq!(Quality::Remembered.label(), "Remembered");
        assert_eq!(Quality::Easy.to_string(), "Easy");
    }

    #[test]
    fn test_is_correct() {
        assert!(!Quality::Forgot.is_correct());
        assert!(Quality::Remembered.is_correct());
        assert!(Quality::Easy.is_correct());
    }
}
