//! Card prioritization and session mixing.

use chrono::{DateTime, Utc};

use crate::params::{REVIEWS_PER_NEW_CARD, SessionLimits};

/// Read access to the fields the scheduler ranks cards by
pub trait Schedulable {
    /// Consecutive correct answers
    fn repetitions(&self) -> i32;
    /// When the card was added to its deck
    fn created_at(&self) -> DateTime<Utc>;
    /// When the card is next scheduled
    fn next_review(&self) -> DateTime<Utc>;

    /// A card that has never been answered correctly
    fn is_new(&self) -> bool {
        self.repetitions() == 0
    }

    /// A reviewed card whose scheduled time has passed
    fn is_due(&self, now: DateTime<Utc>) -> bool {
        now >= self.next_review()
    }
}

/// Priority score of a card, lower sorts first.
///
/// * New cards: the negated creation timestamp (epoch seconds), so a more
///   recently created new card sorts before an older one.
/// * Reviewed cards: the negated number of whole seconds since `next_review`.
///   Overdue cards get a negative score (more overdue sorts earlier), cards
///   not yet due get a positive one (further away sorts later).
///
/// Scores are only comparable within one group: new-card scores are on the
/// scale of absolute timestamps, reviewed-card scores on the scale of elapsed
/// time, so in a mixed sort new cards almost always come first.
pub fn priority_score<C: Schedulable>(card: &C, now: DateTime<Utc>) -> i64 {
    if card.is_new() {
        return -card.created_at().timestamp();
    }

    -(now - card.next_review()).num_seconds()
}

/// Sort cards by ascending [`priority_score`].
///
/// The sort is stable: cards with equal scores keep their input order.
pub fn prioritize_cards<C: Schedulable>(mut cards: Vec<C>, now: DateTime<Utc>) -> Vec<C> {
    cards.sort_by_cached_key(|card| priority_score(card, now));
    cards
}

/// Interleave new cards into review cards with the default 3:1 ratio.
///
/// `new_cards` are taken in the given order up to `new_limit`; review cards
/// fill the remaining `total_limit` slots. See [`mix_cards`].
pub fn mix_new_and_review_cards<C>(
    new_cards: Vec<C>,
    review_cards: Vec<C>,
    new_limit: usize,
    total_limit: usize,
) -> Vec<C> {
    mix_cards(
        new_cards,
        review_cards,
        &SessionLimits {
            total_limit,
            new_limit,
            reviews_per_new: REVIEWS_PER_NEW_CARD,
        },
    )
}

/// Build one session out of new and (already prioritized) review cards.
///
/// 1. keep the first `new_limit` new cards
/// 2. keep the first `total_limit - kept_new` review cards; when the kept new
///    cards alone exceed `total_limit`, drop the last `kept_new - total_limit`
///    review cards instead
/// 3. repeatedly take up to `reviews_per_new` review cards, then one new card
/// 4. truncate to `total_limit`
pub fn mix_cards<C>(new_cards: Vec<C>, review_cards: Vec<C>, limits: &SessionLimits) -> Vec<C> {
    let mut new_cards = new_cards.into_iter().take(limits.new_limit).peekable();
    let kept_new = new_cards.len();
    let kept_reviews = match limits.total_limit.checked_sub(kept_new) {
        Some(remaining_slots) => remaining_slots,
        None => review_cards.len().saturating_sub(kept_new - limits.total_limit),
    };
    let mut review_cards = review_cards.into_iter().take(kept_reviews).peekable();

    // A zero ratio would never drain the review cards
    let reviews_per_new = limits.reviews_per_new.max(1);
    let mut session = Vec::with_capacity(new_cards.len() + review_cards.len());

    while new_cards.peek().is_some() || review_cards.peek().is_some() {
        session.extend(review_cards.by_ref().take(reviews_per_new));
        session.extend(new_cards.next());
    }

    session.truncate(limits.total_limit);
    session
}

/// Pick the single next card of a deck.
///
/// New cards and due reviewed cards are ranked together in one
/// [`prioritize_cards`] pass; cards that are neither are ignored.
pub fn next_card_for_learning<C: Schedulable>(deck_cards: Vec<C>, now: DateTime<Utc>) -> Option<C> {
    let (new_cards, reviewed): (Vec<C>, Vec<C>) =
        deck_cards.into_iter().partition(|card| card.is_new());

    let mut candidates: Vec<C> = reviewed
        .into_iter()
        .filter(|card| card.is_due(now))
        .collect();
    candidates.extend(new_cards);

    prioritize_cards(candidates, now).into_iter().next()
}
