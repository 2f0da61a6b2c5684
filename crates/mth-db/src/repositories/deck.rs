use chrono::{DateTime, Utc};
use sqlx::{Executor, Postgres};

use crate::models::{Deck, NewDeck};

pub async fn insert_deck<'e, E>(
    executor: E,
    deck: &NewDeck,
    now: DateTime<Utc>,
) -> Result<Deck, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            INSERT INTO decks (user_id, name, description, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $4)
            RETURNING id, user_id, name, description, is_active, created_at, updated_at
        "#,
    )
    .bind(deck.user_id)
    .bind(&deck.name)
    .bind(&deck.description)
    .bind(now)
    .fetch_one(executor)
    .await
}
