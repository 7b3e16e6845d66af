//! Monitored account state.

use dashmap::DashMap;
use lurker_core::LastPost;
use std::collections::BTreeSet;
use std::sync::Arc;

/// Latest post seen per monitored account.
#[derive(Debug, Clone, Default)]
pub struct PostTracker {
    posts: Arc<DashMap<String, LastPost>>,
}

impl PostTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, username: &str) -> Option<LastPost> {
        self.posts.get(username).map(|r| r.value().clone())
    }

    /// Store the latest post, returning the one it replaces.
    pub fn record(&self, username: &str, post: LastPost) -> Option<LastPost> {
        self.posts.insert(username.to_string(), post)
    }
}

/// Influencer usernames confirmed as verified.
#[derive(Debug, Clone, Default)]
pub struct VerifiedSet {
    usernames: Arc<std::sync::RwLock<BTreeSet<String>>>,
}

impl VerifiedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole set.
    pub fn replace(&self, usernames: impl IntoIterator<Item = String>) {
        if let Ok(mut lock) = self.usernames.write() {
            *lock = usernames.into_iter().collect();
        }
    }

    /// Usernames in alphabetical order.
    pub fn list(&self) -> Vec<String> {
        self.usernames
            .read()
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.usernames.read().map(|set| set.is_empty()).unwrap_or(true)
    }
}
