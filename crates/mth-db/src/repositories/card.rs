use chrono::{DateTime, Utc};
use sqlx::{Executor, Postgres};

use crate::models::{Card, NewCard};

pub async fn get_card_by_id<'e, E>(executor: E, card_id: i64) -> Result<Option<Card>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT id, deck_id, front, back, example, notes,
                   ease_factor, interval_days, repetitions, next_review,
                   total_reviews, correct_reviews, created_at, updated_at
            FROM cards
            WHERE id = $1
        "#,
    )
    .bind(card_id)
    .fetch_optional(executor)
    .await
}

/// Fetch a card and lock its row until the surrounding transaction ends.
pub async fn get_card_for_update<'e, E>(
    executor: E,
    card_id: i64,
) -> Result<Option<Card>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT id, deck_id, front, back, example, notes,
                   ease_factor, interval_days, repetitions, next_review,
                   total_reviews, correct_reviews, created_at, updated_at
            FROM cards
            WHERE id = $1
            FOR UPDATE
        "#,
    )
    .bind(card_id)
    .fetch_optional(executor)
    .await
}

pub async fn get_deck_cards<'e, E>(executor: E, deck_id: i64) -> Result<Vec<Card>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT id, deck_id, front, back, example, notes,
                   ease_factor, interval_days, repetitions, next_review,
                   total_reviews, correct_reviews, created_at, updated_at
            FROM cards
            WHERE deck_id = $1
            ORDER BY id
        "#,
    )
    .bind(deck_id)
    .fetch_all(executor)
    .await
}

/// Reviewed cards whose `next_review` has passed, oldest first.
///
/// A `None` limit returns every due card.
pub async fn get_due_cards<'e, E>(
    executor: E,
    deck_ids: &[i64],
    limit: Option<i64>,
    now: DateTime<Utc>,
) -> Result<Vec<Card>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT id, deck_id, front, back, example, notes,
                   ease_factor, interval_days, repetitions, next_review,
                   total_reviews, correct_reviews, created_at, updated_at
            FROM cards
            WHERE deck_id = ANY($1)
                AND next_review <= $2
                AND repetitions > 0
            ORDER BY next_review ASC, id ASC
            LIMIT $3
        "#,
    )
    .bind(deck_ids)
    .bind(now)
    .bind(limit)
    .fetch_all(executor)
    .await
}

/// Cards never answered correctly, in creation order.
pub async fn get_new_cards<'e, E>(
    executor: E,
    deck_ids: &[i64],
    limit: Option<i64>,
) -> Result<Vec<Card>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT id, deck_id, front, back, example, notes,
                   ease_factor, interval_days, repetitions, next_review,
                   total_reviews, correct_reviews, created_at, updated_at
            FROM cards
            WHERE deck_id = ANY($1)
                AND repetitions = 0
            ORDER BY created_at ASC, id ASC
            LIMIT $2
        "#,
    )
    .bind(deck_ids)
    .bind(limit)
    .fetch_all(executor)
    .await
}

pub async fn count_deck_cards<'e, E>(executor: E, deck_id: i64) -> Result<i64, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_scalar(
        // language=PostgreSQL
        r#"
            SELECT COUNT(*) FROM cards WHERE deck_id = $1
        "#,
    )
    .bind(deck_id)
    .fetch_one(executor)
    .await
}

pub async fn count_new_cards<'e, E>(executor: E, deck_id: i64) -> Result<i64, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_scalar(
        // language=PostgreSQL
        r#"
            SELECT COUNT(*) FROM cards WHERE deck_id = $1 AND repetitions = 0
        "#,
    )
    .bind(deck_id)
    .fetch_one(executor)
    .await
}

pub async fn count_due_cards<'e, E>(
    executor: E,
    deck_id: i64,
    now: DateTime<Utc>,
) -> Result<i64, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_scalar(
        // language=PostgreSQL
        r#"
            SELECT COUNT(*)
            FROM cards
            WHERE deck_id = $1
                AND next_review <= $2
                AND repetitions > 0
        "#,
    )
    .bind(deck_id)
    .bind(now)
    .fetch_one(executor)
    .await
}

/// Insert a card with its initial SRS state
pub async fn insert_card<'e, E>(
    executor: E,
    card: &NewCard,
    ease_factor: f64,
    now: DateTime<Utc>,
) -> Result<Card, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            INSERT INTO cards (deck_id, front, back, example, notes, ease_factor, interval_days,
                               repetitions, next_review, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, 0, 0, $7, $7, $7)
            RETURNING id, deck_id, front, back, example, notes,
                      ease_factor, interval_days, repetitions, next_review,
                      total_reviews, correct_reviews, created_at, updated_at
        "#,
    )
    .bind(card.deck_id)
    .bind(&card.front)
    .bind(&card.back)
    .bind(&card.example)
    .bind(&card.notes)
    .bind(ease_factor)
    .bind(now)
    .fetch_one(executor)
    .await
}

/// Persist the SRS fields and review counters of a card
pub async fn update_card_srs<'e, E>(executor: E, card: &Card) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let result = sqlx::query(
        // language=PostgreSQL
        r#"
            UPDATE cards
            SET ease_factor = $2,
                interval_days = $3,
                repetitions = $4,
                next_review = $5,
                total_reviews = $6,
                correct_reviews = $7,
                updated_at = $8
            WHERE id = $1
        "#,
    )
    .bind(card.id)
    .bind(card.ease_factor)
    .bind(card.interval)
    .bind(card.repetitions)
    .bind(card.next_review)
    .bind(card.total_reviews)
    .bind(card.correct_reviews)
    .bind(card.updated_at)
    .execute(executor)
    .await?;
    Ok(result.rows_affected() > 0)
}
