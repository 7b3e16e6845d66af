//! Tracked token definitions.

use crate::Chain;
use compact_str::{format_compact, CompactString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of name characters kept when deriving a hashtag.
pub const HASHTAG_NAME_CHARS: usize = 6;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HashtagError {
    #[error("Invalid hashtag '{0}': expected $ followed by 3-6 letters")]
    Invalid(String),
}

/// Cash-tag style tracking key, always `$`-prefixed (e.g. `$PEPE`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Hashtag(CompactString);

impl Hashtag {
    /// Derive the tracking key for a resolved token name:
    /// `$` followed by the first six characters, upper-cased.
    pub fn from_token_name(name: &str) -> Self {
        let head: String = name.chars().take(HASHTAG_NAME_CHARS).collect();
        Self(format_compact!("${}", head.to_uppercase()))
    }

    /// Parse user input such as `pepe`, `$pepe` or `$PEPE`.
    pub fn parse(input: &str) -> Result<Self, HashtagError> {
        let trimmed = input.trim();
        let symbol = trimmed.strip_prefix('$').unwrap_or(trimmed);
        let valid_len = (3..=HASHTAG_NAME_CHARS).contains(&symbol.len());
        if !valid_len || !symbol.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(HashtagError::Invalid(trimmed.to_string()));
        }
        Ok(Self(format_compact!("${}", symbol.to_ascii_uppercase())))
    }

    /// Lookup key for user input naming an existing hashtag. Unlike
    /// [`Hashtag::parse`] this accepts any key [`Hashtag::from_token_name`]
    /// can produce, spaces and digits included.
    pub fn normalize(input: &str) -> Option<Self> {
        let trimmed = input.trim();
        let symbol = trimmed.strip_prefix('$').unwrap_or(trimmed);
        if symbol.is_empty() {
            return None;
        }
        Some(Self(format_compact!("${}", symbol.to_uppercase())))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl std::fmt::Display for Hashtag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A contract address that resolved to a named token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedToken {
    /// Display name reported by the metadata service
    pub name: String,
    /// Chain whose validator recognised the address
    pub chain: Chain,
}

impl ResolvedToken {
    pub fn new(name: impl Into<String>, chain: Chain) -> Self {
        Self {
            name: name.into(),
            chain,
        }
    }

    /// Tracking key derived from the token name.
    pub fn hashtag(&self) -> Hashtag {
        Hashtag::from_token_name(&self.name)
    }
}

/// Per-hashtag tracking entry with the snapshots used as comparison baselines.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackedToken {
    /// Contract address, if one has been linked
    pub address: Option<String>,
    /// Resolved token name, if known
    pub name: Option<String>,
    /// Mentions in the last 2-minute window at the previous poll
    pub last_count: u64,
    /// 5-minute trading volume (USD) at the previous poll
    pub last_m5_volume: f64,
    /// Mentions in the last 10-minute window at the previous poll
    pub last_search_count: u64,
}

impl TrackedToken {
    /// Entry for a bare hashtag with no contract yet.
    pub fn unresolved() -> Self {
        Self::default()
    }

    /// Entry for a resolved contract, seeded with a volume baseline.
    pub fn resolved(address: impl Into<String>, name: impl Into<String>, baseline_volume: f64) -> Self {
        Self {
            address: Some(address.into()),
            name: Some(name.into()),
            last_m5_volume: baseline_volume,
            ..Default::default()
        }
    }

    /// `Name ($TAG)` when the name is known, else just the hashtag.
    pub fn display_name(&self, hashtag: &Hashtag) -> String {
        match &self.name {
            Some(name) => format!("{} ({})", name, hashtag),
            None => hashtag.to_string(),
        }
    }
}

/// Market figures for a token's most liquid pair.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketSnapshot {
    /// Price as reported (string to keep the feed's precision); None = unavailable
    pub price_usd: Option<String>,
    /// Trading volume over the last 5 minutes in USD
    pub volume_m5: f64,
    /// Fully-diluted valuation in USD
    pub market_cap: f64,
    /// Pool liquidity in USD
    pub liquidity_usd: f64,
}

impl MarketSnapshot {
    pub fn price_display(&self) -> &str {
        self.price_usd.as_deref().unwrap_or("N/A")
    }
}
