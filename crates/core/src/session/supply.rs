use super::*;
use crate::*;
use std::collections::HashSet;

const LOG_TARGET: &str = "zvezdolet::supply";

impl Session {
    pub(super) fn deal_starting_board(&mut self, events: &mut EventBus) {
        self.draw_defects(self.config.starting_defects, events);
        self.draw_features(self.config.starting_features, events);
    }

    /// Runs once per turn, when the last player hands over to the first.
    pub(super) fn new_turn_supply(&mut self, events: &mut EventBus) {
        self.state.available_jokers.clear();
        if self.state.turn == self.config.joker_turn && !self.state.jokers_given {
            self.offer_jokers(events);
            return;
        }
        self.draw_defects(self.config.defects_per_turn, events);
        self.draw_features(self.config.features_per_turn, events);
    }

    fn offer_jokers(&mut self, events: &mut EventBus) {
        self.state.available_features.clear();
        let exclude: HashSet<String> = self
            .state
            .used_joker_ids
            .iter()
            .cloned()
            .chain(self.state.hand_jokers.iter().map(|card| card.def.id.clone()))
            .collect();
        let offered = self.catalog.draw(
            CardKind::Joker,
            self.config.jokers_offered,
            &exclude,
            &mut self.rng,
        );
        self.state.jokers_given = true;
        tracing::info!(
            target: LOG_TARGET,
            turn = self.state.turn,
            offered = offered.len(),
            "jokers.offered"
        );
        for card in &offered {
            events.push(Event::CardDrawn {
                id: card.def.id.clone(),
                kind: CardKind::Joker,
            });
        }
        self.state.available_jokers = offered;
    }

    /// Defects never come back: every drawn id is marked used for the rest of the game.
    fn draw_defects(&mut self, count: usize, events: &mut EventBus) -> usize {
        if count == 0 {
            return 0;
        }
        let exclude: HashSet<String> = self
            .state
            .used_defect_ids
            .iter()
            .cloned()
            .chain(self.state.active_defects.iter().map(|card| card.def.id.clone()))
            .collect();
        let drawn = self
            .catalog
            .draw(CardKind::Defect, count, &exclude, &mut self.rng);
        if drawn.len() < count {
            tracing::debug!(
                target: LOG_TARGET,
                wanted = count,
                drawn = drawn.len(),
                "defect deck exhausted"
            );
        }
        let drawn_count = drawn.len();
        for card in drawn {
            self.state.used_defect_ids.push(card.def.id.clone());
            events.push(Event::CardDrawn {
                id: card.def.id.clone(),
                kind: CardKind::Defect,
            });
            self.state.active_defects.push(card);
        }
        drawn_count
    }

    /// Replaces the feature offer. Ids shown earlier are skipped until the deck runs short,
    /// then the shown memory is cleared and only installed cards stay excluded.
    fn draw_features(&mut self, count: usize, events: &mut EventBus) {
        let installed: HashSet<String> = self
            .state
            .installed_features
            .iter()
            .map(|card| card.def.id.clone())
            .collect();
        let mut exclude = installed.clone();
        exclude.extend(self.state.shown_feature_ids.iter().cloned());

        let mut offered = self
            .catalog
            .draw(CardKind::Feature, count, &exclude, &mut self.rng);
        if offered.len() < count {
            self.state.shown_feature_ids.clear();
            tracing::info!(
                target: LOG_TARGET,
                kind = CardKind::Feature.label(),
                short = count - offered.len(),
                "deck.reshuffled"
            );
            events.push(Event::DeckReshuffled {
                kind: CardKind::Feature,
            });
            let mut pinned = installed;
            pinned.extend(offered.iter().map(|card| card.def.id.clone()));
            let refill = self.catalog.draw(
                CardKind::Feature,
                count - offered.len(),
                &pinned,
                &mut self.rng,
            );
            offered.extend(refill);
        }

        for card in &offered {
            self.state.shown_feature_ids.push(card.def.id.clone());
            events.push(Event::CardDrawn {
                id: card.def.id.clone(),
                kind: CardKind::Feature,
            });
        }
        self.state.available_features = offered;
    }

    pub(super) fn add_random_defect(&mut self, events: &mut EventBus) {
        if self.draw_defects(1, events) == 0 {
            tracing::warn!(target: LOG_TARGET, "no unused defect left to add");
        }
    }

    /// Destroys one installed feature at random, together with its crash when broken.
    pub(super) fn remove_random_feature(&mut self, events: &mut EventBus) {
        if self.state.installed_features.is_empty() {
            return;
        }
        let index = self.rng.pick_index(self.state.installed_features.len());
        let feature = self.state.installed_features.remove(index);
        if feature.is_broken {
            if let Some(crash_id) = linked_crash_id(feature.id()) {
                self.remove_crash(&crash_id, RemovalReason::Destroyed, events);
            }
        }
        tracing::debug!(target: LOG_TARGET, feature = %feature.id(), "feature.destroyed");
        events.push(Event::CardRemoved {
            id: feature.def.id,
            reason: RemovalReason::Destroyed,
        });
    }

    pub(super) fn remove_crash(
        &mut self,
        crash_id: &str,
        reason: RemovalReason,
        events: &mut EventBus,
    ) {
        let before = self.state.active_crashes.len();
        self.state.active_crashes.retain(|card| card.id() != crash_id);
        if self.state.active_crashes.len() < before {
            events.push(Event::CardRemoved {
                id: crash_id.to_string(),
                reason,
            });
        }
    }
}
