//! Reporting helpers over review counters and review history.

use std::collections::BTreeSet;

use chrono::{Duration, NaiveDate};
use serde::Serialize;

use crate::{params::MASTERED_REPETITIONS, quality::Quality};

/// Percentage of correct reviews, `0.0` for a card never reviewed
pub fn success_rate(total_reviews: i32, correct_reviews: i32) -> f64 {
    if total_reviews <= 0 {
        return 0.0;
    }
    f64::from(correct_reviews) / f64::from(total_reviews) * 100.0
}

/// Round to one decimal place, the precision reports use
pub fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Where a card stands in a progress report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mastery {
    /// Never answered correctly
    New,
    /// Answered correctly fewer than [`MASTERED_REPETITIONS`] times in a row
    Learning,
    /// Answered correctly at least [`MASTERED_REPETITIONS`] times in a row
    Mastered,
}

impl Mastery {
    /// Level of a card with the given consecutive correct answers
    pub const fn of(repetitions: i32) -> Self {
        if repetitions <= 0 {
            Self::New
        } else if repetitions < MASTERED_REPETITIONS {
            Self::Learning
        } else {
            Self::Mastered
        }
    }
}

/// Running totals over a set of reviews
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReviewTotals {
    /// Reviews counted
    pub total_reviews: i64,
    /// Reviews rated Remembered or Easy
    pub correct_reviews: i64,
    /// Sum of the reported answer times
    pub total_time_seconds: i64,
    #[serde(skip)]
    days: BTreeSet<NaiveDate>,
}

impl ReviewTotals {
    /// Count one review. A missing `time_spent` adds nothing to the time total.
    pub fn record(&mut self, quality: i32, time_spent: Option<i32>, day: NaiveDate) {
        self.total_reviews += 1;
        if Quality::try_from(quality).is_ok_and(Quality::is_correct) {
            self.correct_reviews += 1;
        }
        self.total_time_seconds += i64::from(time_spent.unwrap_or(0));
        self.days.insert(day);
    }

    /// Percentage of correct reviews to one decimal, `0.0` without reviews
    pub fn accuracy(&self) -> f64 {
        if self.total_reviews == 0 {
            return 0.0;
        }
        let rate = self.correct_reviews as f64 / self.total_reviews as f64 * 100.0;
        round_tenth(rate)
    }

    /// Reviews per day over a window of `days`, to one decimal
    pub fn average_per_day(&self, days: u32) -> f64 {
        if days == 0 {
            return 0.0;
        }
        let average = self.total_reviews as f64 / f64::from(days);
        round_tenth(average)
    }

    /// Distinct days with at least one review
    pub fn days_active(&self) -> usize {
        self.days.len()
    }
}

/// Current streak of consecutive review days.
///
/// `review_days` are the distinct days with at least one review, newest
/// first. The streak is alive only if the most recent day is `today` or
/// yesterday; it then extends back while consecutive days are at most one
/// day apart.
pub fn review_streak(review_days: &[NaiveDate], today: NaiveDate) -> u32 {
    let Some(&latest) = review_days.first() else {
        return 0;
    };

    if latest != today && latest != today - Duration::days(1) {
        return 0;
    }

    let mut streak = 0;
    let mut current = latest;
    for &day in review_days {
        if (current - day).num_days() > 1 {
            break;
        }
        streak += 1;
        current = day;
    }

    streak
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    #[test]
    fn test_success_rate() {
        assert_eq!(success_rate(0, 0), 0.0);
        assert_eq!(success_rate(4, 3), 75.0);
        assert_eq!(success_rate(2, 2), 100.0);
    }

    #[test]
    fn test_mastery_levels() {
        assert_eq!(Mastery::of(0), Mastery::New);
        assert_eq!(Mastery::of(1), Mastery::Learning);
        assert_eq!(Mastery::of(4), Mastery::Learning);
        assert_eq!(Mastery::of(5), Mastery::Mastered);
        assert_eq!(Mastery::of(12), Mastery::Mastered);
    }

    #[test]
    fn test_review_totals() {
        let mut totals = ReviewTotals::default();
        assert_eq!(totals.accuracy(), 0.0);
        assert_eq!(totals.average_per_day(7), 0.0);

        totals.record(5, Some(12), day(1));
        totals.record(0, None, day(1));
        totals.record(3, Some(8), day(3));

        assert_eq!(totals.total_reviews, 3);
        assert_eq!(totals.correct_reviews, 2);
        assert_eq!(totals.total_time_seconds, 20);
        assert_eq!(totals.accuracy(), 66.7);
        assert_eq!(totals.average_per_day(7), 0.4);
        assert_eq!(totals.days_active(), 2);
    }

    #[test]
    fn test_streak_empty() {
        assert_eq!(review_streak(&[], day(10)), 0);
    }

    #[test]
    fn test_streak_counts_consecutive_days() {
        let days = [day(10), day(9), day(8), day(6), day(5)];
        assert_eq!(review_streak(&days, day(10)), 3);
    }

    #[test]
    fn test_streak_alive_from_yesterday() {
        let days = [day(9), day(8)];
        assert_eq!(review_streak(&days, day(10)), 2);
    }

    #[test]
    fn test_streak_broken() {
        let days = [day(7), day(6), day(5)];
        assert_eq!(review_streak(&days, day(10)), 0);
    }
}
