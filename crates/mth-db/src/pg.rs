use chrono::{DateTime, NaiveDate, Utc};
use mth_srs::SrsParams;
use sqlx::{PgPool, Postgres, Transaction};

use crate::{
    models::{Card, Deck, DeckCounts, NewCard, NewDeck, NewReview, Review},
    repositories::{card, deck, review},
    store::{SrsStore, SrsTransaction, StoreError},
};

/// PostgreSQL-backed store
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
    params: SrsParams,
}

impl PgStore {
    pub const fn new(pool: PgPool, params: SrsParams) -> Self {
        Self { pool, params }
    }

    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Transaction on a pooled connection; rolled back when dropped uncommitted
pub struct PgTransaction {
    tx: Transaction<'static, Postgres>,
}

impl SrsStore for PgStore {
    type Transaction = PgTransaction;

    async fn begin(&self) -> Result<PgTransaction, StoreError> {
        let tx = self.pool.begin().await?;
        Ok(PgTransaction { tx })
    }

    async fn get_card(&self, card_id: i64) -> Result<Option<Card>, StoreError> {
        Ok(card::get_card_by_id(&self.pool, card_id).await?)
    }

    async fn get_deck_cards(&self, deck_id: i64) -> Result<Vec<Card>, StoreError> {
        Ok(card::get_deck_cards(&self.pool, deck_id).await?)
    }

    async fn get_due_cards(
        &self,
        deck_ids: &[i64],
        limit: Option<i64>,
        now: DateTime<Utc>,
    ) -> Result<Vec<Card>, StoreError> {
        Ok(card::get_due_cards(&self.pool, deck_ids, limit, now).await?)
    }

    async fn get_new_cards(
        &self,
        deck_ids: &[i64],
        limit: Option<i64>,
    ) -> Result<Vec<Card>, StoreError> {
        Ok(card::get_new_cards(&self.pool, deck_ids, limit).await?)
    }

    async fn count_cards(&self, deck_id: i64, now: DateTime<Utc>) -> Result<DeckCounts, StoreError> {
        let (total_cards, new_cards, due_cards) = tokio::try_join!(
            card::count_deck_cards(&self.pool, deck_id),
            card::count_new_cards(&self.pool, deck_id),
            card::count_due_cards(&self.pool, deck_id, now),
        )?;

        Ok(DeckCounts {
            total_cards,
            new_cards,
            due_cards,
        })
    }

    async fn get_card_reviews(
        &self,
        card_id: i64,
        limit: Option<i64>,
    ) -> Result<Vec<Review>, StoreError> {
        Ok(review::get_card_reviews(&self.pool, card_id, limit).await?)
    }

    async fn count_user_reviews(
        &self,
        user_id: i64,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<i64, StoreError> {
        Ok(review::count_user_reviews_between(&self.pool, user_id, start, end).await?)
    }

    async fn get_user_reviews(
        &self,
        user_id: i64,
        since: Option<DateTime<Utc>>,
        until: Option<DateTime<Utc>>,
    ) -> Result<Vec<Review>, StoreError> {
        Ok(review::get_user_reviews(&self.pool, user_id, since, until).await?)
    }

    async fn get_review_days(&self, user_id: i64) -> Result<Vec<NaiveDate>, StoreError> {
        Ok(review::get_review_days(&self.pool, user_id).await?)
    }

    async fn create_deck(&self, new_deck: NewDeck, now: DateTime<Utc>) -> Result<Deck, StoreError> {
        Ok(deck::insert_deck(&self.pool, &new_deck, now).await?)
    }

    async fn create_card(&self, new_card: NewCard, now: DateTime<Utc>) -> Result<Card, StoreError> {
        Ok(card::insert_card(&self.pool, &new_card, self.params.default_ease_factor, now).await?)
    }
}

impl SrsTransaction for PgTransaction {
    async fn lock_card(&mut self, card_id: i64) -> Result<Option<Card>, StoreError> {
        Ok(card::get_card_for_update(&mut *self.tx, card_id).await?)
    }

    async fn save_card_mutation(&mut self, updated: &Card) -> Result<(), StoreError> {
        if !card::update_card_srs(&mut *self.tx, updated).await? {
            return Err(StoreError::CardMissing(updated.id));
        }
        Ok(())
    }

    async fn append_review_record(&mut self, record: NewReview) -> Result<Review, StoreError> {
        Ok(review::insert_review(&mut *self.tx, &record).await?)
    }

    async fn commit(self) -> Result<(), StoreError> {
        self.tx.commit().await?;
        Ok(())
    }
}
