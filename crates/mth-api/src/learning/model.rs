use chrono::{DateTime, NaiveDate, Utc};
use mth_db::models::{Card, DeckCounts, Review};
use mth_srs::Quality;
use serde::{Deserialize, Serialize};

/// Body of `POST /cards/{card_id}/review`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewSubmission {
    pub user_id: i64,
    /// 0 (Forgot), 3 (Remembered) or 5 (Easy)
    pub quality: i32,
    /// Seconds spent on the card
    #[serde(default)]
    pub time_spent: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SessionQuery {
    pub max_cards: Option<usize>,
    pub max_new_cards: Option<usize>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DailyStatsQuery {
    /// UTC day to report, today when absent
    pub date: Option<NaiveDate>,
}

/// A card as returned to clients, with its derived progress fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardResponse {
    #[serde(flatten)]
    pub card: Card,
    pub success_rate: f64,
    pub in_learning: bool,
}

impl From<Card> for CardResponse {
    fn from(card: Card) -> Self {
        Self {
            success_rate: card.success_rate(),
            in_learning: card.is_in_learning(),
            card,
        }
    }
}

/// A review record with the label of its rating
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewResponse {
    #[serde(flatten)]
    pub review: Review,
    pub quality_label: Option<String>,
}

impl From<Review> for ReviewResponse {
    fn from(review: Review) -> Self {
        Self {
            quality_label: Quality::try_from(review.quality)
                .ok()
                .map(|quality| quality.label().to_string()),
            review,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeckStats {
    pub total_cards: i64,
    pub new_cards: i64,
    pub due_cards: i64,
    /// Cards that left the new state
    pub learning_cards: i64,
}

impl From<DeckCounts> for DeckStats {
    fn from(counts: DeckCounts) -> Self {
        Self {
            total_cards: counts.total_cards,
            new_cards: counts.new_cards,
            due_cards: counts.due_cards,
            learning_cards: counts.learning_cards(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewStats {
    pub user_id: i64,
    pub day: NaiveDate,
    /// Reviews submitted during `day` (UTC)
    pub reviews_today: i64,
    /// Consecutive days with at least one review, ending today or yesterday
    pub streak_days: u32,
}

/// Reviews of one user during one UTC day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyStats {
    pub user_id: i64,
    pub date: NaiveDate,
    pub total_reviews: i64,
    pub correct_reviews: i64,
    /// Percentage of correct reviews, one decimal
    pub accuracy: f64,
    pub total_time_seconds: i64,
}

/// Reviews of one user over the last seven days
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyStats {
    pub user_id: i64,
    pub period_days: u32,
    pub total_reviews: i64,
    pub correct_reviews: i64,
    pub average_daily_reviews: f64,
    pub total_time_seconds: i64,
    pub days_active: usize,
}

/// Lifetime review totals of one user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverallStats {
    pub user_id: i64,
    pub total_reviews: i64,
    pub correct_reviews: i64,
    pub accuracy: f64,
    pub total_time_seconds: i64,
    pub current_streak: u32,
    pub total_days_active: usize,
}

/// Mastery breakdown of a deck
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeckProgress {
    pub deck_id: i64,
    pub total_cards: usize,
    pub new_cards: usize,
    /// Answered correctly at least once but not yet mastered
    pub learning_cards: usize,
    pub mastered_cards: usize,
    /// Mean success rate of the cards reviewed at least once, one decimal
    pub average_success_rate: f64,
}

/// Study session of a deck
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionResponse {
    pub deck_id: i64,
    pub built_at: DateTime<Utc>,
    pub cards: Vec<CardResponse>,
}
