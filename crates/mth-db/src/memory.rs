//! In-process store.
//!
//! Backs the server when no database is configured and the test suites. A
//! transaction holds the store lock for its whole lifetime and stages its
//! writes, so concurrent reviews are serialized and an uncommitted
//! transaction leaves no trace.

use std::{collections::BTreeMap, sync::Arc};

use chrono::{DateTime, NaiveDate, Utc};
use mth_srs::{Schedulable, SrsParams};
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::{
    models::{Card, Deck, DeckCounts, NewCard, NewDeck, NewReview, Review},
    store::{SrsStore, SrsTransaction, StoreError},
};

#[derive(Debug, Default)]
struct MemoryState {
    decks: BTreeMap<i64, Deck>,
    cards: BTreeMap<i64, Card>,
    reviews: Vec<Review>,
}

impl MemoryState {
    fn cards_in<'a>(&'a self, deck_ids: &'a [i64]) -> impl Iterator<Item = &'a Card> + 'a {
        self.cards
            .values()
            .filter(move |card| deck_ids.contains(&card.deck_id))
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
    params: SrsParams,
}

impl MemoryStore {
    pub fn new(params: SrsParams) -> Self {
        Self {
            state: Arc::default(),
            params,
        }
    }
}

/// Staged writes on top of the locked store state
#[derive(Debug)]
pub struct MemoryTransaction {
    state: OwnedMutexGuard<MemoryState>,
    cards: BTreeMap<i64, Card>,
    reviews: Vec<Review>,
}

fn take_limit(limit: Option<i64>) -> usize {
    limit.map_or(usize::MAX, |l| usize::try_from(l).unwrap_or(0))
}

impl SrsStore for MemoryStore {
    type Transaction = MemoryTransaction;

    async fn begin(&self) -> Result<MemoryTransaction, StoreError> {
        let state = Arc::clone(&self.state).lock_owned().await;
        Ok(MemoryTransaction {
            state,
            cards: BTreeMap::new(),
            reviews: Vec::new(),
        })
    }

    async fn get_card(&self, card_id: i64) -> Result<Option<Card>, StoreError> {
        Ok(self.state.lock().await.cards.get(&card_id).cloned())
    }

    async fn get_deck_cards(&self, deck_id: i64) -> Result<Vec<Card>, StoreError> {
        let state = self.state.lock().await;
        Ok(state.cards_in(&[deck_id]).cloned().collect())
    }

    async fn get_due_cards(
        &self,
        deck_ids: &[i64],
        limit: Option<i64>,
        now: DateTime<Utc>,
    ) -> Result<Vec<Card>, StoreError> {
        let state = self.state.lock().await;
        let mut due: Vec<Card> = state
            .cards_in(deck_ids)
            .filter(|card| !card.is_new() && card.is_due(now))
            .cloned()
            .collect();
        due.sort_by_key(|card| (card.next_review, card.id));
        due.truncate(take_limit(limit));
        Ok(due)
    }

    async fn get_new_cards(
        &self,
        deck_ids: &[i64],
        limit: Option<i64>,
    ) -> Result<Vec<Card>, StoreError> {
        let state = self.state.lock().await;
        let mut new: Vec<Card> = state
            .cards_in(deck_ids)
            .filter(|card| card.is_new())
            .cloned()
            .collect();
        new.sort_by_key(|card| (card.created_at, card.id));
        new.truncate(take_limit(limit));
        Ok(new)
    }

    async fn count_cards(&self, deck_id: i64, now: DateTime<Utc>) -> Result<DeckCounts, StoreError> {
        let state = self.state.lock().await;
        let mut counts = DeckCounts {
            total_cards: 0,
            new_cards: 0,
            due_cards: 0,
        };
        for card in state.cards_in(&[deck_id]) {
            counts.total_cards += 1;
            if card.is_new() {
                counts.new_cards += 1;
            } else if card.is_due(now) {
                counts.due_cards += 1;
            }
        }
        Ok(counts)
    }

    async fn get_card_reviews(
        &self,
        card_id: i64,
        limit: Option<i64>,
    ) -> Result<Vec<Review>, StoreError> {
        let state = self.state.lock().await;
        let mut reviews: Vec<Review> = state
            .reviews
            .iter()
            .filter(|review| review.card_id == card_id)
            .cloned()
            .collect();
        reviews.sort_by(|a, b| (b.reviewed_at, b.id).cmp(&(a.reviewed_at, a.id)));
        reviews.truncate(take_limit(limit));
        Ok(reviews)
    }

    async fn count_user_reviews(
        &self,
        user_id: i64,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<i64, StoreError> {
        let state = self.state.lock().await;
        let count = state
            .reviews
            .iter()
            .filter(|r| r.user_id == user_id && r.reviewed_at >= start && r.reviewed_at < end)
            .count();
        Ok(i64::try_from(count).unwrap_or(i64::MAX))
    }

    async fn get_user_reviews(
        &self,
        user_id: i64,
        since: Option<DateTime<Utc>>,
        until: Option<DateTime<Utc>>,
    ) -> Result<Vec<Review>, StoreError> {
        let state = self.state.lock().await;
        let mut reviews: Vec<Review> = state
            .reviews
            .iter()
            .filter(|r| r.user_id == user_id)
            .filter(|r| since.is_none_or(|since| r.reviewed_at >= since))
            .filter(|r| until.is_none_or(|until| r.reviewed_at < until))
            .cloned()
            .collect();
        reviews.sort_by(|a, b| b.reviewed_at.cmp(&a.reviewed_at).then(b.id.cmp(&a.id)));
        Ok(reviews)
    }

    async fn get_review_days(&self, user_id: i64) -> Result<Vec<NaiveDate>, StoreError> {
        let state = self.state.lock().await;
        let mut days: Vec<NaiveDate> = state
            .reviews
            .iter()
            .filter(|r| r.user_id == user_id)
            .map(|r| r.reviewed_at.date_naive())
            .collect();
        days.sort_unstable_by(|a, b| b.cmp(a));
        days.dedup();
        Ok(days)
    }

    async fn create_deck(&self, new_deck: NewDeck, now: DateTime<Utc>) -> Result<Deck, StoreError> {
        let mut state = self.state.lock().await;
        let id = state.decks.keys().next_back().map_or(1, |last| last + 1);
        let deck = Deck {
            id,
            user_id: new_deck.user_id,
            name: new_deck.name,
            description: new_deck.description,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        state.decks.insert(id, deck.clone());
        Ok(deck)
    }

    async fn create_card(&self, new_card: NewCard, now: DateTime<Utc>) -> Result<Card, StoreError> {
        let mut state = self.state.lock().await;
        let id = state.cards.keys().next_back().map_or(1, |last| last + 1);
        let card = new_card.into_card(id, &self.params, now);
        state.cards.insert(id, card.clone());
        Ok(card)
    }
}

impl SrsTransaction for MemoryTransaction {
    async fn lock_card(&mut self, card_id: i64) -> Result<Option<Card>, StoreError> {
        Ok(self
            .cards
            .get(&card_id)
            .or_else(|| self.state.cards.get(&card_id))
            .cloned())
    }

    async fn save_card_mutation(&mut self, card: &Card) -> Result<(), StoreError> {
        if !self.state.cards.contains_key(&card.id) {
            return Err(StoreError::CardMissing(card.id));
        }
        self.cards.insert(card.id, card.clone());
        Ok(())
    }

    async fn append_review_record(&mut self, record: NewReview) -> Result<Review, StoreError> {
        let id = i64::try_from(self.state.reviews.len() + self.reviews.len() + 1)
            .unwrap_or(i64::MAX);
        let review = record.into_review(id);
        self.reviews.push(review.clone());
        Ok(review)
    }

    async fn commit(mut self) -> Result<(), StoreError> {
        let cards = std::mem::take(&mut self.cards);
        let reviews = std::mem::take(&mut self.reviews);
        self.state.cards.extend(cards);
        self.state.reviews.extend(reviews);
        Ok(())
    }
}
