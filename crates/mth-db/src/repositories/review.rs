use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{Executor, Postgres};

use crate::models::{NewReview, Review};

pub async fn insert_review<'e, E>(executor: E, review: &NewReview) -> Result<Review, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            INSERT INTO reviews (card_id, user_id, quality, reviewed_at, time_spent,
                                 ease_factor_before, interval_before)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, card_id, user_id, quality, reviewed_at, time_spent,
                      ease_factor_before, interval_before
        "#,
    )
    .bind(review.card_id)
    .bind(review.user_id)
    .bind(review.quality.value())
    .bind(review.reviewed_at)
    .bind(review.time_spent)
    .bind(review.ease_factor_before)
    .bind(review.interval_before)
    .fetch_one(executor)
    .await
}

/// Reviews of a card, newest first
pub async fn get_card_reviews<'e, E>(
    executor: E,
    card_id: i64,
    limit: Option<i64>,
) -> Result<Vec<Review>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT id, card_id, user_id, quality, reviewed_at, time_spent,
                   ease_factor_before, interval_before
            FROM reviews
            WHERE card_id = $1
            ORDER BY reviewed_at DESC, id DESC
            LIMIT $2
        "#,
    )
    .bind(card_id)
    .bind(limit)
    .fetch_all(executor)
    .await
}

/// Number of reviews a user submitted in `[start, end)`
pub async fn count_user_reviews_between<'e, E>(
    executor: E,
    user_id: i64,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<i64, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_scalar(
        // language=PostgreSQL
        r#"
            SELECT COUNT(*)
            FROM reviews
            WHERE user_id = $1
                AND reviewed_at >= $2
                AND reviewed_at < $3
        "#,
    )
    .bind(user_id)
    .bind(start)
    .bind(end)
    .fetch_one(executor)
    .await
}

/// Reviews of a user, newest first. Absent bounds leave that side open.
pub async fn get_user_reviews<'e, E>(
    executor: E,
    user_id: i64,
    since: Option<DateTime<Utc>>,
    until: Option<DateTime<Utc>>,
) -> Result<Vec<Review>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT id, card_id, user_id, quality, reviewed_at, time_spent,
                   ease_factor_before, interval_before
            FROM reviews
            WHERE user_id = $1
                AND ($2::timestamptz IS NULL OR reviewed_at >= $2)
                AND ($3::timestamptz IS NULL OR reviewed_at < $3)
            ORDER BY reviewed_at DESC, id DESC
        "#,
    )
    .bind(user_id)
    .bind(since)
    .bind(until)
    .fetch_all(executor)
    .await
}

/// Distinct (UTC) days on which a user reviewed, newest first
pub async fn get_review_days<'e, E>(executor: E, user_id: i64) -> Result<Vec<NaiveDate>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_scalar(
        // language=PostgreSQL
        r#"
            SELECT DISTINCT (reviewed_at AT TIME ZONE 'UTC')::date AS review_day
            FROM reviews
            WHERE user_id = $1
            ORDER BY review_day DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(executor)
    .await
}
