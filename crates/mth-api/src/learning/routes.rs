use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    routing::{get, post},
};
use mth_db::SrsStore;

use crate::{
    ApiState,
    error::ApiError,
    learning::model::{
        CardResponse, DailyStats, DailyStatsQuery, DeckProgress, DeckStats, HistoryQuery,
        OverallStats, ReviewResponse, ReviewStats, ReviewSubmission, SessionQuery,
        SessionResponse, WeeklyStats,
    },
    middleware::{ReviewThrottle, apply_review_throttle},
};

/// Create the learning routes
pub fn routes<S: SrsStore>(throttle: ReviewThrottle) -> Router<ApiState<S>> {
    let review = apply_review_throttle(
        Router::new().route("/cards/{card_id}/review", post(submit_review::<S>)),
        throttle,
    );

    Router::new()
        .route("/decks/{deck_id}/session", get(get_session::<S>))
        .route("/decks/{deck_id}/next", get(get_next_card::<S>))
        .route("/decks/{deck_id}/stats", get(get_deck_stats::<S>))
        .route("/cards/{card_id}/reviews", get(get_card_reviews::<S>))
        .route("/decks/{deck_id}/progress", get(get_deck_progress::<S>))
        .route("/users/{user_id}/review-stats", get(get_review_stats::<S>))
        .route("/users/{user_id}/stats/daily", get(get_daily_stats::<S>))
        .route("/users/{user_id}/stats/weekly", get(get_weekly_stats::<S>))
        .route("/users/{user_id}/stats/overall", get(get_overall_stats::<S>))
        .merge(review)
}

async fn submit_review<S: SrsStore>(
    State(state): State<ApiState<S>>,
    Path(card_id): Path<i64>,
    payload: Result<Json<ReviewSubmission>, JsonRejection>,
) -> Result<Json<CardResponse>, ApiError> {
    let Json(payload) = payload?;
    if payload.time_spent.is_some_and(|seconds| seconds < 0) {
        return Err(ApiError::Validation(
            "time_spent must not be negative".to_string(),
        ));
    }

    let card = state
        .learning
        .submit_review(
            card_id,
            payload.user_id,
            payload.quality,
            payload.time_spent,
            state.clock.now(),
        )
        .await?;

    Ok(Json(card.into()))
}

async fn get_session<S: SrsStore>(
    State(state): State<ApiState<S>>,
    Path(deck_id): Path<i64>,
    query: Result<Query<SessionQuery>, QueryRejection>,
) -> Result<Json<SessionResponse>, ApiError> {
    let Query(query) = query?;
    let limits = state.learning.limits();
    let max_cards = query.max_cards.unwrap_or(limits.total_limit);
    let max_new_cards = query.max_new_cards.unwrap_or(limits.new_limit);
    if max_cards == 0 {
        return Err(ApiError::Validation("max_cards must be positive".to_string()));
    }

    let now = state.clock.now();
    let cards = state
        .learning
        .build_session(deck_id, max_cards, max_new_cards, now)
        .await?;

    Ok(Json(SessionResponse {
        deck_id,
        built_at: now,
        cards: cards.into_iter().map(CardResponse::from).collect(),
    }))
}

/// `null` when the deck has nothing to study
async fn get_next_card<S: SrsStore>(
    State(state): State<ApiState<S>>,
    Path(deck_id): Path<i64>,
) -> Result<Json<Option<CardResponse>>, ApiError> {
    let card = state.learning.next_card(deck_id, state.clock.now()).await?;
    Ok(Json(card.map(CardResponse::from)))
}

async fn get_deck_stats<S: SrsStore>(
    State(state): State<ApiState<S>>,
    Path(deck_id): Path<i64>,
) -> Result<Json<DeckStats>, ApiError> {
    let stats = state.learning.deck_stats(deck_id, state.clock.now()).await?;
    Ok(Json(stats))
}

async fn get_card_reviews<S: SrsStore>(
    State(state): State<ApiState<S>>,
    Path(card_id): Path<i64>,
    query: Result<Query<HistoryQuery>, QueryRejection>,
) -> Result<Json<Vec<ReviewResponse>>, ApiError> {
    let Query(query) = query?;
    if query.limit.is_some_and(|limit| limit <= 0) {
        return Err(ApiError::Validation("limit must be positive".to_string()));
    }

    let reviews = state.learning.card_reviews(card_id, query.limit).await?;
    Ok(Json(reviews.into_iter().map(ReviewResponse::from).collect()))
}

async fn get_review_stats<S: SrsStore>(
    State(state): State<ApiState<S>>,
    Path(user_id): Path<i64>,
) -> Result<Json<ReviewStats>, ApiError> {
    let stats = state.learning.review_stats(user_id, state.clock.now()).await?;
    Ok(Json(stats))
}

async fn get_deck_progress<S: SrsStore>(
    State(state): State<ApiState<S>>,
    Path(deck_id): Path<i64>,
) -> Result<Json<DeckProgress>, ApiError> {
    Ok(Json(state.learning.deck_progress(deck_id).await?))
}

async fn get_daily_stats<S: SrsStore>(
    State(state): State<ApiState<S>>,
    Path(user_id): Path<i64>,
    query: Result<Query<DailyStatsQuery>, QueryRejection>,
) -> Result<Json<DailyStats>, ApiError> {
    let Query(query) = query?;
    let day = query.date.unwrap_or_else(|| state.clock.now().date_naive());
    Ok(Json(state.learning.daily_stats(user_id, day).await?))
}

async fn get_weekly_stats<S: SrsStore>(
    State(state): State<ApiState<S>>,
    Path(user_id): Path<i64>,
) -> Result<Json<WeeklyStats>, ApiError> {
    let stats = state.learning.weekly_stats(user_id, state.clock.now()).await?;
    Ok(Json(stats))
}

async fn get_overall_stats<S: SrsStore>(
    State(state): State<ApiState<S>>,
    Path(user_id): Path<i64>,
) -> Result<Json<OverallStats>, ApiError> {
    let stats = state.learning.overall_stats(user_id, state.clock.now()).await?;
    Ok(Json(stats))
}
