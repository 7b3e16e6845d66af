//! Address and cash-tag extraction from free-form chat text.

use crate::Hashtag;
use once_cell::sync::Lazy;
use regex::Regex;

static EVM_ADDRESS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b0x[a-fA-F0-9]{40}\b").expect("valid EVM address pattern"));

static BASE58_ADDRESS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b[1-9A-HJ-NP-Za-km-z]{32,44}\b").expect("valid base58 address pattern")
});

static CASH_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$[A-Z]{3,6}\b").expect("valid cash-tag pattern"));

/// Everything worth acting on in a single chat message.
/// Each list is de-duplicated and keeps first-appearance order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageMentions {
    pub evm_addresses: Vec<String>,
    pub solana_addresses: Vec<String>,
    pub hashtags: Vec<Hashtag>,
}

impl MessageMentions {
    /// Scan message text for addresses and cash-tags.
    pub fn scan(text: &str) -> Self {
        let evm_addresses = unique(EVM_ADDRESS.find_iter(text).map(|m| m.as_str().to_string()));
        let solana_addresses = unique(BASE58_ADDRESS.find_iter(text).map(|m| m.as_str().to_string()));
        let hashtags = unique(
            CASH_TAG
                .find_iter(text)
                .filter_map(|m| Hashtag::parse(m.as_str()).ok()),
        );

        Self {
            evm_addresses,
            solana_addresses,
            hashtags,
        }
    }

    /// All addresses, EVM first.
    pub fn addresses(&self) -> impl Iterator<Item = &str> {
        self.evm_addresses
            .iter()
            .chain(self.solana_addresses.iter())
            .map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.evm_addresses.is_empty() && self.solana_addresses.is_empty() && self.hashtags.is_empty()
    }
}

fn unique<T: PartialEq>(items: impl Iterator<Item = T>) -> Vec<T> {
    let mut out = Vec::new();
    for item in items {
        if !out.contains(&item) {
            out.push(item);
        }
    }
    out
}
