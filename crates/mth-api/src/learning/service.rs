//! Study sessions and review submission.
//!
//! [`LearningService`] is the only writer of card scheduling state. A review
//! runs as one store transaction: the card is locked, its new state computed
//! and validated, then the card update and the audit record are committed
//! together.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use mth_db::{
    SrsStore, SrsTransaction,
    models::{Card, NewReview, Review},
};
use mth_srs::{
    Mastery, Quality, ReviewTotals, SessionLimits, SrsParams, compute_next_review_with,
    mix_cards, next_card_for_learning, prioritize_cards,
    stats::{review_streak, round_tenth},
    validate_result,
};

use crate::{
    error::ApiError,
    learning::model::{
        DailyStats, DeckProgress, DeckStats, OverallStats, ReviewStats, WeeklyStats,
    },
    metrics,
};

/// Length of the window covered by [`LearningService::weekly_stats`]
const WEEK_DAYS: u32 = 7;

#[derive(Debug, Clone)]
pub struct LearningService<S> {
    store: S,
    params: SrsParams,
    limits: SessionLimits,
}

impl<S: SrsStore> LearningService<S> {
    pub const fn new(store: S, params: SrsParams, limits: SessionLimits) -> Self {
        Self {
            store,
            params,
            limits,
        }
    }

    pub const fn store(&self) -> &S {
        &self.store
    }

    pub const fn limits(&self) -> &SessionLimits {
        &self.limits
    }

    /// Apply a review to a card and record it.
    ///
    /// # Errors
    ///
    /// * [`ApiError::CardNotFound`] if the card does not exist
    /// * [`ApiError::Srs`] if `quality` is not 0, 3 or 5, or the computed
    ///   state is out of bounds
    ///
    /// Nothing is written when an error is returned.
    pub async fn submit_review(
        &self,
        card_id: i64,
        user_id: i64,
        quality: i32,
        time_spent: Option<i32>,
        now: DateTime<Utc>,
    ) -> Result<Card, ApiError> {
        let mut tx = self.store.begin().await?;

        let Some(mut card) = tx.lock_card(card_id).await? else {
            return Err(ApiError::CardNotFound(card_id));
        };
        let quality = Quality::try_from(quality)?;

        let before = card.srs_state();
        let result = compute_next_review_with(&self.params, quality, &before, now);
        if let Err(err) = validate_result(&self.params, &result) {
            tracing::error!(card_id, %quality, error = %err, "Rejected SRS result");
            return Err(err.into());
        }

        card.apply_review(&result, quality, now);
        tx.save_card_mutation(&card).await?;
        tx.append_review_record(NewReview {
            card_id,
            user_id,
            quality,
            reviewed_at: now,
            time_spent,
            ease_factor_before: before.ease_factor,
            interval_before: before.interval,
        })
        .await?;
        tx.commit().await?;

        metrics::record_review(quality);
        tracing::debug!(
            card_id,
            user_id,
            %quality,
            ease_factor = card.ease_factor,
            interval = card.interval,
            repetitions = card.repetitions,
            next_review = %card.next_review,
            "Review applied"
        );

        Ok(card)
    }

    /// Ordered study session of one deck
    pub async fn build_session(
        &self,
        deck_id: i64,
        max_cards: usize,
        max_new_cards: usize,
        now: DateTime<Utc>,
    ) -> Result<Vec<Card>, ApiError> {
        self.build_session_for_decks(&[deck_id], max_cards, max_new_cards, now)
            .await
    }

    /// Ordered study session drawing from several decks.
    ///
    /// Due cards are ranked by priority, new cards keep their creation order,
    /// and the two are interleaved under the session caps.
    pub async fn build_session_for_decks(
        &self,
        deck_ids: &[i64],
        max_cards: usize,
        max_new_cards: usize,
        now: DateTime<Utc>,
    ) -> Result<Vec<Card>, ApiError> {
        if deck_ids.is_empty() {
            return Ok(Vec::new());
        }

        let (due_cards, new_cards) = tokio::try_join!(
            self.store
                .get_due_cards(deck_ids, Some(as_limit(max_cards)), now),
            self.store.get_new_cards(deck_ids, Some(as_limit(max_new_cards))),
        )?;

        let due_count = due_cards.len();
        let new_count = new_cards.len();
        let limits = SessionLimits {
            total_limit: max_cards,
            new_limit: max_new_cards,
            reviews_per_new: self.limits.reviews_per_new,
        };
        let session = mix_cards(new_cards, prioritize_cards(due_cards, now), &limits);

        metrics::record_session(session.len());
        tracing::debug!(
            ?deck_ids,
            due_count,
            new_count,
            session_size = session.len(),
            "Session built"
        );

        Ok(session)
    }

    /// The single most urgent card of a deck, if any is new or due
    pub async fn next_card(
        &self,
        deck_id: i64,
        now: DateTime<Utc>,
    ) -> Result<Option<Card>, ApiError> {
        let cards = self.store.get_deck_cards(deck_id).await?;
        Ok(next_card_for_learning(cards, now))
    }

    pub async fn deck_stats(&self, deck_id: i64, now: DateTime<Utc>) -> Result<DeckStats, ApiError> {
        let counts = self.store.count_cards(deck_id, now).await?;
        Ok(counts.into())
    }

    /// Review records of a card, newest first
    pub async fn card_reviews(
        &self,
        card_id: i64,
        limit: Option<i64>,
    ) -> Result<Vec<Review>, ApiError> {
        if self.store.get_card(card_id).await?.is_none() {
            return Err(ApiError::CardNotFound(card_id));
        }
        Ok(self.store.get_card_reviews(card_id, limit).await?)
    }

    /// Number of reviews a user submitted during `day` (UTC)
    pub async fn daily_review_count(&self, user_id: i64, day: NaiveDate) -> Result<i64, ApiError> {
        let start = start_of_day(day);
        let end = start + Duration::days(1);
        Ok(self.store.count_user_reviews(user_id, start, end).await?)
    }

    async fn review_totals(
        &self,
        user_id: i64,
        since: Option<DateTime<Utc>>,
        until: Option<DateTime<Utc>>,
    ) -> Result<ReviewTotals, ApiError> {
        let reviews = self.store.get_user_reviews(user_id, since, until).await?;
        let mut totals = ReviewTotals::default();
        for review in &reviews {
            totals.record(review.quality, review.time_spent, review.reviewed_at.date_naive());
        }
        Ok(totals)
    }

    /// Totals of a user's reviews during `day` (UTC)
    pub async fn daily_stats(&self, user_id: i64, day: NaiveDate) -> Result<DailyStats, ApiError> {
        let start = start_of_day(day);
        let totals = self
            .review_totals(user_id, Some(start), Some(start + Duration::days(1)))
            .await?;

        Ok(DailyStats {
            user_id,
            date: day,
            accuracy: totals.accuracy(),
            total_reviews: totals.total_reviews,
            correct_reviews: totals.correct_reviews,
            total_time_seconds: totals.total_time_seconds,
        })
    }

    /// Totals of a user's reviews since seven days before `now`
    pub async fn weekly_stats(
        &self,
        user_id: i64,
        now: DateTime<Utc>,
    ) -> Result<WeeklyStats, ApiError> {
        let since = now - Duration::days(i64::from(WEEK_DAYS));
        let totals = self.review_totals(user_id, Some(since), None).await?;

        Ok(WeeklyStats {
            user_id,
            period_days: WEEK_DAYS,
            average_daily_reviews: totals.average_per_day(WEEK_DAYS),
            days_active: totals.days_active(),
            total_reviews: totals.total_reviews,
            correct_reviews: totals.correct_reviews,
            total_time_seconds: totals.total_time_seconds,
        })
    }

    pub async fn overall_stats(
        &self,
        user_id: i64,
        now: DateTime<Utc>,
    ) -> Result<OverallStats, ApiError> {
        let (totals, review_days) = tokio::try_join!(
            self.review_totals(user_id, None, None),
            async {
                self.store
                    .get_review_days(user_id)
                    .await
                    .map_err(ApiError::from)
            },
        )?;

        Ok(OverallStats {
            user_id,
            accuracy: totals.accuracy(),
            current_streak: review_streak(&review_days, now.date_naive()),
            total_days_active: totals.days_active(),
            total_reviews: totals.total_reviews,
            correct_reviews: totals.correct_reviews,
            total_time_seconds: totals.total_time_seconds,
        })
    }

    /// New, learning and mastered cards of a deck
    pub async fn deck_progress(&self, deck_id: i64) -> Result<DeckProgress, ApiError> {
        let cards = self.store.get_deck_cards(deck_id).await?;

        let mut progress = DeckProgress {
            deck_id,
            total_cards: cards.len(),
            new_cards: 0,
            learning_cards: 0,
            mastered_cards: 0,
            average_success_rate: 0.0,
        };
        for card in &cards {
            match Mastery::of(card.repetitions) {
                Mastery::New => progress.new_cards += 1,
                Mastery::Learning => progress.learning_cards += 1,
                Mastery::Mastered => progress.mastered_cards += 1,
            }
        }

        let rates: Vec<f64> = cards
            .iter()
            .filter(|card| card.total_reviews > 0)
            .map(Card::success_rate)
            .collect();
        if !rates.is_empty() {
            let sum: f64 = rates.iter().sum();
            progress.average_success_rate = round_tenth(sum / rates.len() as f64);
        }

        Ok(progress)
    }

    pub async fn review_stats(
        &self,
        user_id: i64,
        now: DateTime<Utc>,
    ) -> Result<ReviewStats, ApiError> {
        let today = now.date_naive();
        let (reviews_today, review_days) = tokio::try_join!(
            self.daily_review_count(user_id, today),
            async {
                self.store
                    .get_review_days(user_id)
                    .await
                    .map_err(ApiError::from)
            },
        )?;

        Ok(ReviewStats {
            user_id,
            day: today,
            reviews_today,
            streak_days: review_streak(&review_days, today),
        })
    }
}

fn start_of_day(day: NaiveDate) -> DateTime<Utc> {
    day.and_time(NaiveTime::MIN).and_utc()
}

fn as_limit(cap: usize) -> i64 {
    i64::try_from(cap).unwrap_or(i64::MAX)
}
