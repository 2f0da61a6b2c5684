//! SRS (Spaced Repetition System) core for Mathisi
//!
//! This crate holds the pure scheduling logic: the SM-2 style review outcome
//! calculation, the priority score used to order cards, and the mixing of new
//! and review cards into a bounded study session. Nothing here performs I/O
//! or reads the clock; the current time is always passed in.

pub mod calculator;
pub mod error;
pub mod params;
pub mod quality;
pub mod scheduler;
pub mod stats;

pub use calculator::{
    SrsResult, SrsState, compute_next_review, compute_next_review_with, validate_result,
};
pub use error::SrsError;
pub use params::{SessionLimits, SrsParams};
pub use quality::Quality;
pub use stats::{Mastery, ReviewTotals};
pub use scheduler::{
    Schedulable, mix_cards, mix_new_and_review_cards, next_card_for_learning, prioritize_cards,
    priority_score,
};
