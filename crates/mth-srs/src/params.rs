//! Tunable constants of the scheduler.
//!
//! The algorithm never reads literals directly: every number it uses comes from
//! [`SrsParams`] or [`SessionLimits`], whose defaults are the constants below.

use serde::Deserialize;

/// Starting ease factor for new cards
pub const DEFAULT_EASE_FACTOR: f64 = 2.5;
/// Lower bound of the ease factor
pub const MIN_EASE_FACTOR: f64 = 1.3;
/// Sanity ceiling checked when validating a computed result
pub const MAX_EASE_FACTOR: f64 = 3.0;
/// Ease change applied on Forgot (subtracted) and Easy (added)
pub const EASE_FACTOR_MODIFIER: f64 = 0.15;
/// Extra interval multiplier for Easy answers
pub const EASE_BONUS: f64 = 1.3;
/// Longest interval a card can be pushed out, in days
pub const MAX_INTERVAL_DAYS: i32 = 365;

/// Interval after a Forgot answer, in days
pub const INITIAL_INTERVAL_FORGOT: i32 = 0;
/// Interval after the first Remembered answer, in days
pub const INITIAL_INTERVAL_REMEMBERED: i32 = 1;
/// Interval after the first Easy answer, in days
pub const INITIAL_INTERVAL_EASY: i32 = 4;
/// Interval after the second consecutive Remembered answer, in days
pub const SECOND_INTERVAL_REMEMBERED: i32 = 6;

/// Default maximum number of cards in one session
pub const DEFAULT_CARDS_PER_SESSION: usize = 20;
/// Default maximum number of new cards in one session
pub const MAX_NEW_CARDS_PER_SESSION: usize = 20;
/// Review cards taken before each new card when mixing a session
pub const REVIEWS_PER_NEW_CARD: usize = 3;
/// Repetitions from which a card counts as mastered in progress reports
pub const MASTERED_REPETITIONS: i32 = 5;

/// Parameters of the review outcome calculation.
///
/// Deserializable so it can be loaded from the environment
/// (`SRS_MAX_INTERVAL_DAYS=180`); missing fields fall back to the defaults.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct SrsParams {
    pub default_ease_factor: f64,
    pub min_ease_factor: f64,
    pub max_ease_factor: f64,
    pub ease_factor_modifier: f64,
    pub ease_bonus: f64,
    pub max_interval_days: i32,
    pub initial_interval_forgot: i32,
    pub initial_interval_remembered: i32,
    pub initial_interval_easy: i32,
    pub second_interval_remembered: i32,
}

impl Default for SrsParams {
    fn default() -> Self {
        Self {
            default_ease_factor: DEFAULT_EASE_FACTOR,
            min_ease_factor: MIN_EASE_FACTOR,
            max_ease_factor: MAX_EASE_FACTOR,
            ease_factor_modifier: EASE_FACTOR_MODIFIER,
            ease_bonus: EASE_BONUS,
            max_interval_days: MAX_INTERVAL_DAYS,
            initial_interval_forgot: INITIAL_INTERVAL_FORGOT,
            initial_interval_remembered: INITIAL_INTERVAL_REMEMBERED,
            initial_interval_easy: INITIAL_INTERVAL_EASY,
            second_interval_remembered: SECOND_INTERVAL_REMEMBERED,
        }
    }
}

/// Caps applied when building a study session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SessionLimits {
    /// Maximum number of cards in the session
    pub total_limit: usize,
    /// Maximum number of new cards in the session
    pub new_limit: usize,
    /// Review cards interleaved before each new card
    pub reviews_per_new: usize,
}

impl Default for SessionLimits {
    fn default() -> Self {
        Self {
            total_limit: DEFAULT_CARDS_PER_SESSION,
            new_limit: MAX_NEW_CARDS_PER_SESSION,
            reviews_per_new: REVIEWS_PER_NEW_CARD,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_constants() {
        let params = SrsParams::default();
        assert_eq!(params.default_ease_factor, 2.5);
        assert_eq!(params.min_ease_factor, 1.3);
        assert_eq!(params.max_interval_days, 365);
        assert_eq!(params.initial_interval_easy, 4);

        let limits = SessionLimits::default();
        assert_eq!(limits.total_limit, 20);
        assert_eq!(limits.new_limit, 20);
        assert_eq!(limits.reviews_per_new, 3);
    }
}
