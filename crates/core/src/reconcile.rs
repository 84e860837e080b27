//! Card Reconciliation
//!
//! Pure functions over card lists: merging stream batches into session
//! state, replacing an edited card, impact ordering, and the impact filter
//! with its never-silently-empty fallback. All functions are deterministic
//! and side-effect free so re-delivered batches reconcile identically.

use std::collections::HashSet;

use crate::card::{Impact, InsightCard};

/// Merge an incoming batch into the existing list.
///
/// Cards are identified by their normalized title ([`InsightCard::dedup_key`]);
/// the first occurrence wins and later duplicates are dropped, so re-running
/// a topic never downgrades a card the user already saw. Relative order of
/// survivors is preserved. Cards with an empty key (no title) pass through
/// untouched; they are kept in the raw list but never displayed.
///
/// Idempotent: merging the same batch twice yields the same list.
pub fn merge(existing: &[InsightCard], incoming: &[InsightCard]) -> Vec<InsightCard> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut merged = Vec::with_capacity(existing.len() + incoming.len());
    for card in existing.iter().chain(incoming.iter()) {
        let key = card.dedup_key();
        if key.is_empty() || seen.insert(key) {
            merged.push(card.clone());
        }
    }
    merged
}

/// Replace the card at `index` with `updated`, returning the new list.
///
/// Panics if `index` is out of range: callers hold indices the service
/// echoed back for the same list, so a mismatch is a programming error and
/// must not be papered over.
pub fn replace_at(cards: &[InsightCard], index: usize, updated: InsightCard) -> Vec<InsightCard> {
    assert!(
        index < cards.len(),
        "card index {index} out of range for list of {}",
        cards.len()
    );
    let mut next = cards.to_vec();
    next[index] = updated;
    next
}

/// Stable sort by impact: positive, then neutral, then negative. Cards with
/// equal impact keep their arrival order.
pub fn sort_for_display(cards: &mut [InsightCard]) {
    cards.sort_by_key(|card| card.impact.rank());
}

/// Which impact bucket the user asked to see.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImpactFilter {
    #[default]
    All,
    Only(Impact),
}

impl ImpactFilter {
    pub fn allows(&self, card: &InsightCard) -> bool {
        match self {
            ImpactFilter::All => true,
            ImpactFilter::Only(impact) => card.impact == *impact,
        }
    }
}

/// Resolve the filter actually applied for display.
///
/// A selected impact that matches zero displayable cards while other
/// displayable cards exist falls back to `All`, so the view never goes
/// silently empty because of a stale filter selection.
pub fn effective_filter(cards: &[InsightCard], filter: ImpactFilter) -> ImpactFilter {
    if let ImpactFilter::Only(_) = filter {
        let mut any_displayable = false;
        let mut any_match = false;
        for card in cards.iter().filter(|c| c.is_displayable()) {
            any_displayable = true;
            if filter.allows(card) {
                any_match = true;
                break;
            }
        }
        if any_displayable && !any_match {
            return ImpactFilter::All;
        }
    }
    filter
}

/// The list a frontend renders: displayable cards only, filtered with
/// fallback, impact-sorted. Malformed cards are filtered out here, never
/// rejected upstream.
pub fn display_cards(cards: &[InsightCard], filter: ImpactFilter) -> Vec<InsightCard> {
    let effective = effective_filter(cards, filter);
    let mut visible: Vec<InsightCard> = cards
        .iter()
        .filter(|c| c.is_displayable() && effective.allows(c))
        .cloned()
        .collect();
    sort_for_display(&mut visible);
    visible
}
