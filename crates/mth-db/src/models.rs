use chrono::{DateTime, Utc};
use mth_srs::{Quality, Schedulable, SrsParams, SrsResult, SrsState};
use serde::{Deserialize, Serialize};

/// Deck model - groups a user's cards
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Deck {
    /// Unique deck identifier
    pub id: i64,
    /// Owner of the deck
    pub user_id: i64,
    /// Deck name (unique per user)
    pub name: String,
    /// Optional description
    pub description: Option<String>,
    /// Inactive decks are kept but hidden from study
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insert struct for a deck
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewDeck {
    pub user_id: i64,
    pub name: String,
    pub description: Option<String>,
}

/// Card model - a flashcard together with its scheduling state
///
/// The SRS fields (`ease_factor`, `interval`, `repetitions`, `next_review`) and the
/// review counters are only changed through [`Card::apply_review`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Card {
    /// Unique card identifier
    pub id: i64,
    /// Deck this card belongs to (indexed)
    pub deck_id: i64,
    /// Prompt side
    pub front: String,
    /// Answer side
    pub back: String,
    /// Optional example sentence
    pub example: Option<String>,
    /// Optional free-form notes
    pub notes: Option<String>,
    /// Difficulty multiplier, never below the minimum ease factor
    pub ease_factor: f64,
    /// Days until the next review
    #[sqlx(rename = "interval_days")]
    pub interval: i32,
    /// Consecutive correct answers since the last reset
    pub repetitions: i32,
    /// When the card becomes due (indexed)
    pub next_review: DateTime<Utc>,
    /// Number of reviews ever submitted
    pub total_reviews: i32,
    /// Number of reviews rated Remembered or Easy
    pub correct_reviews: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Card {
    /// Current scheduling state
    pub const fn srs_state(&self) -> SrsState {
        SrsState {
            ease_factor: self.ease_factor,
            interval: self.interval,
            repetitions: self.repetitions,
        }
    }

    /// Write a computed review outcome into the card and bump the counters
    pub fn apply_review(&mut self, result: &SrsResult, quality: Quality, now: DateTime<Utc>) {
        self.ease_factor = result.ease_factor;
        self.interval = result.interval;
        self.repetitions = result.repetitions;
        self.next_review = result.next_review;

        self.total_reviews += 1;
        if quality.is_correct() {
            self.correct_reviews += 1;
        }
        self.updated_at = now;
    }

    /// Success rate as a percentage (0.0 to 100.0)
    pub fn success_rate(&self) -> f64 {
        mth_srs::stats::success_rate(self.total_reviews, self.correct_reviews)
    }

    /// Whether the card is still in its learning phase
    pub const fn is_in_learning(&self) -> bool {
        self.srs_state().is_in_learning()
    }
}

impl Schedulable for Card {
    fn repetitions(&self) -> i32 {
        self.repetitions
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn next_review(&self) -> DateTime<Utc> {
        self.next_review
    }
}

/// Insert struct for a card; the SRS fields start from [`SrsState::initial`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCard {
    pub deck_id: i64,
    pub front: String,
    pub back: String,
    pub example: Option<String>,
    pub notes: Option<String>,
}

impl NewCard {
    /// Build the card row as it exists right after creation
    pub fn into_card(self, id: i64, params: &SrsParams, now: DateTime<Utc>) -> Card {
        let state = SrsState::initial(params);
        Card {
            id,
            deck_id: self.deck_id,
            front: self.front,
            back: self.back,
            example: self.example,
            notes: self.notes,
            ease_factor: state.ease_factor,
            interval: state.interval,
            repetitions: state.repetitions,
            next_review: now,
            total_reviews: 0,
            correct_reviews: 0,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Review audit record - one row per submitted review, never updated
///
/// `ease_factor_before` and `interval_before` snapshot the card state prior to
/// the review so history can be analysed independently of the current card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Review {
    pub id: i64,
    pub card_id: i64,
    pub user_id: i64,
    /// Quality rating (0, 3 or 5)
    pub quality: i32,
    pub reviewed_at: DateTime<Utc>,
    /// Seconds spent on the card, when reported
    pub time_spent: Option<i32>,
    pub ease_factor_before: Option<f64>,
    pub interval_before: Option<i32>,
}

/// Insert struct for a review record
#[derive(Debug, Clone, PartialEq)]
pub struct NewReview {
    pub card_id: i64,
    pub user_id: i64,
    pub quality: Quality,
    pub reviewed_at: DateTime<Utc>,
    pub time_spent: Option<i32>,
    pub ease_factor_before: f64,
    pub interval_before: i32,
}

impl NewReview {
    pub fn into_review(self, id: i64) -> Review {
        Review {
            id,
            card_id: self.card_id,
            user_id: self.user_id,
            quality: self.quality.value(),
            reviewed_at: self.reviewed_at,
            time_spent: self.time_spent,
            ease_factor_before: Some(self.ease_factor_before),
            interval_before: Some(self.interval_before),
        }
    }
}

/// Card counts of one deck
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeckCounts {
    pub total_cards: i64,
    pub new_cards: i64,
    pub due_cards: i64,
}

impl DeckCounts {
    /// Cards that have been started (anything not new)
    pub const fn learning_cards(&self) -> i64 {
        self.total_cards - self.new_cards
    }
}
