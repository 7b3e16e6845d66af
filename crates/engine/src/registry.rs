//! Tracked token registry.
//!
//! Shared between the polling loop and the chat handlers.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use lurker_core::{Hashtag, TrackedToken};
use std::sync::Arc;
use tracing::{debug, info};

/// Outcome of registering a resolved contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Registration {
    /// New entry created for the hashtag
    Added,
    /// Existing bare hashtag got its first contract address
    Linked,
    /// Hashtag already has a contract; the stored one is kept
    AlreadyTracked { address: String },
}

/// Thread-safe map from hashtag to tracking entry.
#[derive(Debug, Clone, Default)]
pub struct TokenRegistry {
    tokens: Arc<DashMap<Hashtag, TrackedToken>>,
}

impl TokenRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track a bare hashtag. Returns false if it was already tracked.
    pub fn track_hashtag(&self, hashtag: Hashtag) -> bool {
        match self.tokens.entry(hashtag) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                info!(hashtag = %slot.key(), "Tracking hashtag");
                slot.insert(TrackedToken::unresolved());
                true
            }
        }
    }

    /// Register a resolved contract under its hashtag.
    ///
    /// The first address linked to a hashtag wins; later contracts that
    /// map to the same hashtag do not replace it.
    pub fn register_resolved(
        &self,
        hashtag: Hashtag,
        address: &str,
        name: &str,
        baseline_volume: f64,
    ) -> Registration {
        match self.tokens.entry(hashtag) {
            Entry::Vacant(slot) => {
                info!(hashtag = %slot.key(), address = address, name = name, "Tracking contract");
                slot.insert(TrackedToken::resolved(address, name, baseline_volume));
                Registration::Added
            }
            Entry::Occupied(mut slot) => {
                let hashtag = slot.key().clone();
                let token = slot.get_mut();
                if let Some(existing) = &token.address {
                    debug!(hashtag = %hashtag, existing = %existing, address = address, "Hashtag already linked");
                    return Registration::AlreadyTracked {
                        address: existing.clone(),
                    };
                }
                token.address = Some(address.to_string());
                token.name = Some(name.to_string());
                token.last_m5_volume = baseline_volume;
                info!(hashtag = %hashtag, address = address, name = name, "Linked contract to hashtag");
                Registration::Linked
            }
        }
    }

    /// Stop tracking a hashtag. Returns the removed entry.
    pub fn untrack(&self, hashtag: &Hashtag) -> Option<TrackedToken> {
        let removed = self.tokens.remove(hashtag).map(|(_, token)| token);
        if removed.is_some() {
            info!(hashtag = %hashtag, "Untracked hashtag");
        }
        removed
    }

    pub fn get(&self, hashtag: &Hashtag) -> Option<TrackedToken> {
        self.tokens.get(hashtag).map(|r| r.value().clone())
    }

    pub fn contains(&self, hashtag: &Hashtag) -> bool {
        self.tokens.contains_key(hashtag)
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Copy of all entries, ordered by hashtag.
    ///
    /// The polling loop iterates over this copy so no shard lock is held
    /// across network calls.
    pub fn snapshot(&self) -> Vec<(Hashtag, TrackedToken)> {
        let mut entries: Vec<_> = self
            .tokens
            .iter()
            .map(|r| (r.key().clone(), r.value().clone()))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }

    /// Store this cycle's figures as the next baseline.
    ///
    /// `volume_m5` is None when no market data was fetched; the previous
    /// volume baseline is kept then. Returns false if the hashtag was
    /// untracked in the meantime.
    pub fn record_observation(&self, hashtag: &Hashtag, count_2m: u64, count_10m: u64, volume_m5: Option<f64>) -> bool {
        match self.tokens.get_mut(hashtag) {
            Some(mut token) => {
                token.last_count = count_2m;
                token.last_search_count = count_10m;
                if let Some(volume) = volume_m5 {
                    token.last_m5_volume = volume;
                }
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn tag(s: &str) -> Hashtag {
        Hashtag::parse(s).unwrap()
    }

    #[test]
    fn test_track_hashtag_once() {
        let registry = TokenRegistry::new();
        assert!(registry.track_hashtag(tag("$PEPE")));
        assert!(!registry.track_hashtag(tag("$PEPE")));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get(&tag("$PEPE")), Some(TrackedToken::unresolved()));
    }

    #[test]
    fn test_register_new_contract() {
        let registry = TokenRegistry::new();
        let outcome = registry.register_resolved(tag("$PEPE"), "0xabc", "Pepe", 1_500.0);
        assert_eq!(outcome, Registration::Added);

        let token = registry.get(&tag("$PEPE")).unwrap();
        assert_eq!(token.address.as_deref(), Some("0xabc"));
        assert_eq!(token.name.as_deref(), Some("Pepe"));
        assert_eq!(token.last_m5_volume, 1_500.0);
        assert_eq!(token.last_count, 0);
    }

    #[test]
    fn test_register_links_bare_hashtag() {
        let registry = TokenRegistry::new();
        registry.track_hashtag(tag("$PEPE"));
        registry.record_observation(&tag("$PEPE"), 12, 40, None);

        let outcome = registry.register_resolved(tag("$PEPE"), "0xabc", "Pepe", 900.0);
        assert_eq!(outcome, Registration::Linked);

        // Mention baselines survive the link
        let token = registry.get(&tag("$PEPE")).unwrap();
        assert_eq!(token.address.as_deref(), Some("0xabc"));
        assert_eq!(token.last_count, 12);
        assert_eq!(token.last_search_count, 40);
        assert_eq!(token.last_m5_volume, 900.0);
    }

    #[test]
    fn test_first_address_wins() {
        let registry = TokenRegistry::new();
        registry.register_resolved(tag("$PEPE"), "0xabc", "Pepe", 0.0);

        let outcome = registry.register_resolved(tag("$PEPE"), "0xdef", "Pepe Two", 0.0);
        assert_eq!(
            outcome,
            Registration::AlreadyTracked {
                address: "0xabc".to_string()
            }
        );
        assert_eq!(registry.get(&tag("$PEPE")).unwrap().name.as_deref(), Some("Pepe"));
    }

    #[test]
    fn test_untrack() {
        let registry = TokenRegistry::new();
        registry.track_hashtag(tag("$WIF"));
        assert!(registry.untrack(&tag("$WIF")).is_some());
        assert!(registry.untrack(&tag("$WIF")).is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_snapshot_is_sorted() {
        let registry = TokenRegistry::new();
        registry.track_hashtag(tag("$WIF"));
        registry.track_hashtag(tag("$BONK"));
        registry.track_hashtag(tag("$PEPE"));

        let tags: Vec<String> = registry
            .snapshot()
            .into_iter()
            .map(|(tag, _)| tag.to_string())
            .collect();
        assert_eq!(tags, vec!["$BONK", "$PEPE", "$WIF"]);
    }

    #[test]
    fn test_record_observation_keeps_volume_without_market() {
        let registry = TokenRegistry::new();
        registry.register_resolved(tag("$PEPE"), "0xabc", "Pepe", 2_000.0);

        assert!(registry.record_observation(&tag("$PEPE"), 5, 30, None));
        assert_eq!(registry.get(&tag("$PEPE")).unwrap().last_m5_volume, 2_000.0);

        assert!(registry.record_observation(&tag("$PEPE"), 6, 31, Some(3_000.0)));
        let token = registry.get(&tag("$PEPE")).unwrap();
        assert_eq!((token.last_count, token.last_search_count), (6, 31));
        assert_eq!(token.last_m5_volume, 3_000.0);
    }

    #[test]
    fn test_record_observation_after_untrack() {
        let registry = TokenRegistry::new();
        assert!(!registry.record_observation(&tag("$GONE"), 1, 1, None));
        assert!(registry.is_empty());
    }
}
