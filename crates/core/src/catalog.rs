use crate::{linked_crash_id, Card, CardDef, CardKind, RngState};
use std::collections::HashSet;

/// The card table. Loaded once, never mutated; the engine only copies rows out of it.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    cards: Vec<CardDef>,
}

impl Catalog {
    pub fn new(cards: Vec<CardDef>) -> Self {
        Self { cards }
    }

    pub fn cards(&self) -> &[CardDef] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn lookup_by_id(&self, id: &str) -> Option<&CardDef> {
        self.cards.iter().find(|card| card.id == id)
    }

    pub fn all_of_category(&self, kind: CardKind) -> impl Iterator<Item = &CardDef> + '_ {
        self.cards.iter().filter(move |card| card.kind == kind)
    }

    pub fn count_of(&self, kind: CardKind) -> usize {
        self.all_of_category(kind).count()
    }

    /// Id of the crash a feature turns into, if the catalog actually has it.
    pub fn linked_crash_id(&self, feature_id: &str) -> Option<String> {
        let crash_id = linked_crash_id(feature_id)?;
        self.lookup_by_id(&crash_id).map(|card| card.id.clone())
    }

    pub fn crash_for_feature(&self, feature_id: &str) -> Option<Card> {
        let crash_id = linked_crash_id(feature_id)?;
        self.instantiate(&crash_id)
    }

    /// Fresh copy of a row with clean play state.
    pub fn instantiate(&self, id: &str) -> Option<Card> {
        self.lookup_by_id(id).map(Card::from_def)
    }

    /// Up to `count` distinct cards of `kind` whose ids are not in `exclude`, in random order.
    pub fn draw(
        &self,
        kind: CardKind,
        count: usize,
        exclude: &HashSet<String>,
        rng: &mut RngState,
    ) -> Vec<Card> {
        let mut pool: Vec<&CardDef> = self
            .all_of_category(kind)
            .filter(|card| !exclude.contains(&card.id))
            .collect();
        rng.shuffle(&mut pool);
        pool.into_iter().take(count).map(Card::from_def).collect()
    }
}
