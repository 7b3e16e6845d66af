//! Traits implemented by the remote data adapters.
//!
//! The monitor and the chat handlers only see these traits, so every
//! service can be swapped for an in-memory fake in tests.

use crate::FeedError;
use async_trait::async_trait;
use lurker_core::{Chain, MarketSnapshot, Post, SocialUser};
use std::time::Duration;

/// Read access to the social platform.
#[async_trait]
pub trait SocialApi: Send + Sync {
    /// Look up several accounts at once, including their verification flag.
    async fn users_by_usernames(&self, usernames: &[String]) -> Result<Vec<SocialUser>, FeedError>;

    /// Look up a single account. `Ok(None)` if it does not exist.
    async fn user_by_username(&self, username: &str) -> Result<Option<SocialUser>, FeedError>;

    /// Most recent posts of an account, newest first.
    async fn recent_posts(&self, user_id: &str, max_results: u32) -> Result<Vec<Post>, FeedError>;

    /// Number of posts matching `query` over the trailing `window`.
    async fn mention_count(&self, query: &str, window: Duration) -> Result<u64, FeedError>;

    /// Posts matching `query` published within the trailing `window`,
    /// with authors expanded when possible.
    async fn search_recent(
        &self,
        query: &str,
        window: Duration,
        max_results: u32,
    ) -> Result<Vec<Post>, FeedError>;
}

/// Market data for a token contract.
#[async_trait]
pub trait MarketData: Send + Sync {
    /// Snapshot of the token's first listed pair. `Ok(None)` if no pair is listed.
    async fn snapshot(&self, address: &str) -> Result<Option<MarketSnapshot>, FeedError>;
}

/// Chain-specific check that an address is a token contract.
#[async_trait]
pub trait ContractValidator: Send + Sync {
    /// Chain this validator answers for.
    fn chain(&self) -> Chain;

    /// Token name for the address. `Ok(None)` if the address is not a known token.
    async fn token_name(&self, address: &str) -> Result<Option<String>, FeedError>;
}
