//! Storage seam of the scheduler.
//!
//! [`SrsStore`] covers the reads needed to build sessions and report on
//! progress; [`SrsTransaction`] is the unit of work in which a review is
//! applied. Everything written through a transaction becomes visible on
//! [`SrsTransaction::commit`]; dropping it without committing discards it.

use std::future::Future;

use chrono::{DateTime, NaiveDate, Utc};
use thiserror::Error;

use crate::models::{Card, Deck, DeckCounts, NewCard, NewDeck, NewReview, Review};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Card {0} vanished during the transaction")]
    CardMissing(i64),
}

pub trait SrsStore: Clone + Send + Sync + 'static {
    type Transaction: SrsTransaction;

    /// Start a unit of work
    fn begin(&self) -> impl Future<Output = Result<Self::Transaction, StoreError>> + Send;

    fn get_card(
        &self,
        card_id: i64,
    ) -> impl Future<Output = Result<Option<Card>, StoreError>> + Send;

    /// Every card of a deck
    fn get_deck_cards(
        &self,
        deck_id: i64,
    ) -> impl Future<Output = Result<Vec<Card>, StoreError>> + Send;

    /// Cards with `repetitions > 0` and `next_review <= now`, ordered by `next_review` ascending
    fn get_due_cards(
        &self,
        deck_ids: &[i64],
        limit: Option<i64>,
        now: DateTime<Utc>,
    ) -> impl Future<Output = Result<Vec<Card>, StoreError>> + Send;

    /// Cards with `repetitions == 0`, in creation order
    fn get_new_cards(
        &self,
        deck_ids: &[i64],
        limit: Option<i64>,
    ) -> impl Future<Output = Result<Vec<Card>, StoreError>> + Send;

    fn count_cards(
        &self,
        deck_id: i64,
        now: DateTime<Utc>,
    ) -> impl Future<Output = Result<DeckCounts, StoreError>> + Send;

    /// Review records of a card, newest first
    fn get_card_reviews(
        &self,
        card_id: i64,
        limit: Option<i64>,
    ) -> impl Future<Output = Result<Vec<Review>, StoreError>> + Send;

    /// Number of reviews a user submitted in `[start, end)`
    fn count_user_reviews(
        &self,
        user_id: i64,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> impl Future<Output = Result<i64, StoreError>> + Send;

    /// Reviews of a user, newest first, optionally bounded to `[since, until)`
    fn get_user_reviews(
        &self,
        user_id: i64,
        since: Option<DateTime<Utc>>,
        until: Option<DateTime<Utc>>,
    ) -> impl Future<Output = Result<Vec<Review>, StoreError>> + Send;

    /// Distinct UTC days with at least one review, newest first
    fn get_review_days(
        &self,
        user_id: i64,
    ) -> impl Future<Output = Result<Vec<NaiveDate>, StoreError>> + Send;

    fn create_deck(
        &self,
        deck: NewDeck,
        now: DateTime<Utc>,
    ) -> impl Future<Output = Result<Deck, StoreError>> + Send;

    fn create_card(
        &self,
        card: NewCard,
        now: DateTime<Utc>,
    ) -> impl Future<Output = Result<Card, StoreError>> + Send;
}

pub trait SrsTransaction: Send {
    /// Load a card for modification; no other transaction can modify it
    /// until this one ends
    fn lock_card(
        &mut self,
        card_id: i64,
    ) -> impl Future<Output = Result<Option<Card>, StoreError>> + Send;

    /// Write back the SRS fields and counters of a card
    fn save_card_mutation(
        &mut self,
        card: &Card,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Append a review record
    fn append_review_record(
        &mut self,
        review: NewReview,
    ) -> impl Future<Output = Result<Review, StoreError>> + Send;

    fn commit(self) -> impl Future<Output = Result<(), StoreError>> + Send;
}
