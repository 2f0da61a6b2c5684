//! Review outcome calculation (SM-2 variant).
//!
//! Maps a quality rating and a card's current SRS state to the state after the
//! review. The computation is pure: the current time is a parameter and no
//! state is kept between calls.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::{error::SrsError, params::SrsParams, quality::Quality};

/// Scheduling state of a single card
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SrsState {
    /// Difficulty multiplier
    pub ease_factor: f64,
    /// Days until the next review
    pub interval: i32,
    /// Consecutive correct answers since the last reset
    pub repetitions: i32,
}

impl SrsState {
    /// State of a freshly created card
    pub const fn initial(params: &SrsParams) -> Self {
        Self {
            ease_factor: params.default_ease_factor,
            interval: 0,
            repetitions: 0,
        }
    }

    /// A card stays in the learning phase until its second consecutive correct answer
    pub const fn is_in_learning(&self) -> bool {
        self.repetitions < 2
    }
}

impl Default for SrsState {
    fn default() -> Self {
        Self::initial(&SrsParams::default())
    }
}

/// Outcome of a review
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SrsResult {
    /// Ease factor to store
    pub ease_factor: f64,
    /// New interval in days
    pub interval: i32,
    /// New count of consecutive correct answers
    pub repetitions: i32,
    /// Review time plus `interval` days
    pub next_review: DateTime<Utc>,
}

impl SrsResult {
    /// The state to persist, without the schedule
    pub const fn state(&self) -> SrsState {
        SrsState {
            ease_factor: self.ease_factor,
            interval: self.interval,
            repetitions: self.repetitions,
        }
    }
}

/// Compute the next review with the default parameters.
///
/// # Errors
///
/// Returns [`SrsError::InvalidQuality`] if `quality` is not 0, 3 or 5.
///
/// # Example
///
/// ```
/// use chrono::{Duration, TimeZone, Utc};
/// use mth_srs::compute_next_review;
///
/// let now = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
/// let result = compute_next_review(5, 2.5, 0, 0, now).unwrap();
///
/// assert_eq!(result.interval, 4);
/// assert_eq!(result.repetitions, 1);
/// assert_eq!(result.next_review, now + Duration::days(4));
/// ```
pub fn compute_next_review(
    quality: i32,
    ease_factor: f64,
    interval: i32,
    repetitions: i32,
    now: DateTime<Utc>,
) -> Result<SrsResult, SrsError> {
    let quality = Quality::try_from(quality)?;
    let state = SrsState {
        ease_factor,
        interval,
        repetitions,
    };

    Ok(compute_next_review_with(
        &SrsParams::default(),
        quality,
        &state,
        now,
    ))
}

/// Compute the next review for `state` answered with `quality` at `now`.
///
/// # Algorithm
///
/// * Forgot: interval and repetitions reset, ease factor lowered by the modifier
/// * Remembered: 1 day, then 6 days, then `interval * ease_factor`
/// * Easy: 4 days, then `interval * ease_factor * ease_bonus`, ease factor raised by the modifier
///
/// For correct answers the SM-2 ease update runs first; on Easy its value is
/// only used for the interval, the stored ease factor is the flat increase.
/// The interval is capped at `max_interval_days`.
pub fn compute_next_review_with(
    params: &SrsParams,
    quality: Quality,
    state: &SrsState,
    now: DateTime<Utc>,
) -> SrsResult {
    let ease_factor = state.ease_factor;

    let mut new_ease_factor = ease_factor;
    if quality.is_correct() {
        // EF' = EF + (0.1 - (5 - q) * (0.08 + (5 - q) * 0.02))
        let q = f64::from(5 - quality.value());
        new_ease_factor = ease_factor + (0.1 - q * (0.08 + q * 0.02));
        new_ease_factor = new_ease_factor.max(params.min_ease_factor);
    }

    let (new_interval, new_repetitions, new_ease_factor) = match quality {
        Quality::Forgot => (
            params.initial_interval_forgot,
            0,
            (ease_factor - params.ease_factor_modifier).max(params.min_ease_factor),
        ),
        Quality::Remembered => match state.repetitions {
            0 => (params.initial_interval_remembered, 1, new_ease_factor),
            1 => (params.second_interval_remembered, 2, new_ease_factor),
            reps => (
                whole_days(f64::from(state.interval) * new_ease_factor),
                reps + 1,
                new_ease_factor,
            ),
        },
        Quality::Easy => {
            let (interval, reps) = match state.repetitions {
                0 => (params.initial_interval_easy, 1),
                reps => (
                    whole_days(f64::from(state.interval) * new_ease_factor * params.ease_bonus),
                    reps + 1,
                ),
            };
            (interval, reps, ease_factor + params.ease_factor_modifier)
        }
    };

    let new_interval = new_interval.min(params.max_interval_days);

    SrsResult {
        ease_factor: new_ease_factor,
        interval: new_interval,
        repetitions: new_repetitions,
        next_review: now + Duration::days(i64::from(new_interval)),
    }
}

/// Check a computed result against the SRS invariants.
///
/// # Errors
///
/// Returns [`SrsError::InvalidResult`] naming the first field out of range.
pub fn validate_result(params: &SrsParams, result: &SrsResult) -> Result<(), SrsError> {
    if !(params.min_ease_factor..=params.max_ease_factor).contains(&result.ease_factor) {
        return Err(SrsError::InvalidResult(format!(
            "ease_factor {} outside [{}, {}]",
            result.ease_factor, params.min_ease_factor, params.max_ease_factor
        )));
    }
    if !(0..=params.max_interval_days).contains(&result.interval) {
        return Err(SrsError::InvalidResult(format!(
            "interval {} outside [0, {}]",
            result.interval, params.max_interval_days
        )));
    }
    if result.repetitions < 0 {
        return Err(SrsError::InvalidResult(format!(
            "repetitions {} is negative",
            result.repetitions
        )));
    }
    Ok(())
}

fn whole_days(days: f64) -> i32 {
    days.floor() as i32
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()
    }

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_forgot_resets_card() {
        let result = compute_next_review(0, 2.5, 10, 5, now()).unwrap();

        assert_eq!(result.interval, 0);
        assert_eq!(result.repetitions, 0);
        assert!(approx_eq(result.ease_factor, 2.35));
        assert_eq!(result.next_review, now());
    }

    #[test]
    fn test_forgot_always_resets_regardless_of_history() {
        for (interval, reps) in [(0, 0), (1, 1), (6, 2), (200, 9), (365, 30)] {
            let result = compute_next_review(0, 2.0, interval, reps, now()).unwrap();
            assert_eq!(result.interval, 0);
            assert_eq!(result.repetitions, 0);
        }
    }

    #[test]
    fn test_forgot_ease_factor_floor() {
        let result = compute_next_review(0, 1.3, 1, 1, now()).unwrap();
        assert!(approx_eq(result.ease_factor, 1.3));

        let result = compute_next_review(0, 1.4, 1, 1, now()).unwrap();
        assert!(approx_eq(result.ease_factor, 1.3));
    }

    #[test]
    fn test_remembered_first_then_second_review() {
        let first = compute_next_review(3, 2.5, 0, 0, now()).unwrap();
        assert_eq!(first.interval, 1);
        assert_eq!(first.repetitions, 1);
        // 2.5 + (0.1 - 2 * (0.08 + 2 * 0.02))
        assert!(approx_eq(first.ease_factor, 2.36));
        assert_eq!(first.next_review, now() + Duration::days(1));

        let second = compute_next_review(3, first.ease_factor, 1, 1, now()).unwrap();
        assert_eq!(second.interval, 6);
        assert_eq!(second.repetitions, 2);
    }

    #[test]
    fn test_remembered_subsequent_review_uses_new_ease_factor() {
        let result = compute_next_review(3, 2.5, 6, 2, now()).unwrap();

        // floor(6 * 2.36) = 14
        assert_eq!(result.interval, 14);
        assert_eq!(result.repetitions, 3);
    }

    #[test]
    fn test_remembered_ease_factor_floor() {
        let result = compute_next_review(3, 1.3, 10, 4, now()).unwrap();

        assert!(approx_eq(result.ease_factor, 1.3));
        assert_eq!(result.interval, 13);
    }

    #[test]
    fn test_easy_first_review() {
        let result = compute_next_review(5, 2.5, 0, 0, now()).unwrap();

        assert_eq!(result.interval, 4);
        assert_eq!(result.repetitions, 1);
        assert!(approx_eq(result.ease_factor, 2.65));
        assert_eq!(result.next_review, now() + Duration::days(4));
    }

    #[test]
    fn test_easy_interval_uses_formula_but_stores_flat_increase() {
        let result = compute_next_review(5, 2.5, 6, 2, now()).unwrap();

        // Interval uses the SM-2 value 2.6: floor(6 * 2.6 * 1.3) = 20
        assert_eq!(result.interval, 20);
        assert_eq!(result.repetitions, 3);
        // Stored ease factor is the flat +0.15, not 2.6
        assert!(approx_eq(result.ease_factor, 2.65));
    }

    #[test]
    fn test_easy_beats_remembered() {
        let easy = compute_next_review(5, 2.5, 6, 2, now()).unwrap();
        let remembered = compute_next_review(3, 2.5, 6, 2, now()).unwrap();

        assert!(easy.interval > remembered.interval);
    }

    #[test]
    fn test_interval_capped() {
        let result = compute_next_review(5, 2.5, 300, 8, now()).unwrap();
        assert_eq!(result.interval, 365);
        assert_eq!(result.next_review, now() + Duration::days(365));

        let result = compute_next_review(3, 2.5, 365, 8, now()).unwrap();
        assert_eq!(result.interval, 365);
    }

    #[test]
    fn test_invalid_quality() {
        for quality in [1, 2, 4, 6, -3] {
            assert_eq!(
                compute_next_review(quality, 2.5, 0, 0, now()),
                Err(SrsError::InvalidQuality(quality))
            );
        }
    }

    #[test]
    fn test_outputs_respect_bounds() {
        let params = SrsParams::default();
        for quality in [0, 3, 5] {
            for ease_factor in [1.3, 1.5, 2.0, 2.5, 2.85] {
                for (interval, reps) in [(0, 0), (1, 1), (6, 2), (40, 5), (365, 12)] {
                    let result =
                        compute_next_review(quality, ease_factor, interval, reps, now()).unwrap();
                    assert!((0..=365).contains(&result.interval));
                    assert!(result.ease_factor >= params.min_ease_factor);
                    assert!(result.repetitions >= 0);
                }
            }
        }
    }

    #[test]
    fn test_same_inputs_same_outputs() {
        let a = compute_next_review(3, 2.2, 17, 4, now()).unwrap();
        let b = compute_next_review(3, 2.2, 17, 4, now()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_custom_params() {
        let params = SrsParams {
            max_interval_days: 30,
            initial_interval_easy: 2,
            ..SrsParams::default()
        };
        let state = SrsState::initial(&params);

        let result = compute_next_review_with(&params, Quality::Easy, &state, now());
        assert_eq!(result.interval, 2);

        let state = SrsState {
            ease_factor: 2.5,
            interval: 25,
            repetitions: 4,
        };
        let result = compute_next_review_with(&params, Quality::Remembered, &state, now());
        assert_eq!(result.interval, 30);
    }

    #[test]
    fn test_validate_result() {
        let params = SrsParams::default();
        let valid = compute_next_review(3, 2.5, 6, 2, now()).unwrap();
        assert!(validate_result(&params, &valid).is_ok());

        let too_easy = SrsResult {
            ease_factor: 3.05,
            ..valid
        };
        assert!(matches!(
            validate_result(&params, &too_easy),
            Err(SrsError::InvalidResult(_))
        ));

        let too_long = SrsResult {
            interval: 366,
            ..valid
        };
        assert!(validate_result(&params, &too_long).is_err());

        let negative_reps = SrsResult {
            repetitions: -1,
            ..valid
        };
        assert!(validate_result(&params, &negative_reps).is_err());
    }

    #[test]
    fn test_initial_state() {
        let state = SrsState::default();
        assert_eq!(state.ease_factor, 2.5);
        assert_eq!(state.interval, 0);
        assert_eq!(state.repetitions, 0);
        assert!(state.is_in_learning());

        let reviewed = SrsState {
            repetitions: 2,
            ..state
        };
        assert!(!reviewed.is_in_learning());
    }
}
