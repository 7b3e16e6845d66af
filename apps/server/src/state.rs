//! Application state management.

use crate::config::AppConfig;
use dashmap::DashMap;
use lurker_engine::{Backoff, PostTracker, TokenRegistry, VerifiedSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;

/// State shared by the monitor and the chat handlers.
pub struct AppState {
    pub config: AppConfig,
    pub registry: TokenRegistry,
    pub posts: PostTracker,
    pub verified: VerifiedSet,
    /// Monitored username -> user id, filled on first lookup
    account_ids: DashMap<String, String>,
    backoff: Mutex<Backoff>,
    running: AtomicBool,
    shutdown: watch::Sender<bool>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let backoff = Backoff::from(&config.backoff);
        Self {
            config,
            registry: TokenRegistry::new(),
            posts: PostTracker::new(),
            verified: VerifiedSet::new(),
            account_ids: DashMap::new(),
            backoff: Mutex::new(backoff),
            running: AtomicBool::new(false),
            shutdown: watch::Sender::new(false),
        }
    }

    pub fn start(&self) {
        self.running.store(true, Ordering::SeqCst);
        self.shutdown.send_replace(false);
    }

    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
        self.shutdown.send_replace(true);
    }

    /// Resolves once `stop` has been called.
    pub async fn stopped(&self) {
        let mut rx = self.shutdown.subscribe();
        let _ = rx.wait_for(|stopped| *stopped).await;
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn account_id(&self, username: &str) -> Option<String> {
        self.account_ids.get(username).map(|r| r.value().clone())
    }

    pub fn cache_account_id(&self, username: &str, user_id: &str) {
        self.account_ids.insert(username.to_string(), user_id.to_string());
    }

    /// Register a rate limit and return how long to wait.
    pub fn rate_limited(&self) -> Duration {
        match self.backoff.lock() {
            Ok(mut backoff) => backoff.on_rate_limit(),
            Err(poisoned) => poisoned.into_inner().on_rate_limit(),
        }
    }

    /// A call succeeded; drop back to the base delay.
    pub fn reset_backoff(&self) {
        match self.backoff.lock() {
            Ok(mut backoff) => backoff.reset(),
            Err(poisoned) => poisoned.into_inner().reset(),
        }
    }

    #[cfg(test)]
    pub fn current_backoff(&self) -> Duration {
        match self.backoff.lock() {
            Ok(backoff) => backoff.current(),
            Err(poisoned) => poisoned.into_inner().current(),
        }
    }
}

/// Shared state handle.
pub type SharedState = Arc<AppState>;

pub fn create_state(config: AppConfig) -> SharedState {
    Arc::new(AppState::new(config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_state_lifecycle() {
        let state = create_state(AppConfig::default());
        assert!(!state.is_running());

        state.start();
        assert!(state.is_running());

        state.stop();
        assert!(!state.is_running());
    }

    #[test]
    fn test_backoff_shared_across_calls() {
        let state = create_state(AppConfig::default());
        assert_eq!(state.rate_limited(), Duration::from_secs(240));
        assert_eq!(state.rate_limited(), Duration::from_secs(480));
        assert_eq!(state.rate_limited(), Duration::from_secs(600));
        assert_eq!(state.rate_limited(), Duration::from_secs(600));

        state.reset_backoff();
        assert_eq!(state.current_backoff(), Duration::from_secs(120));
    }

    #[test]
    fn test_account_id_cache() {
        let state = create_state(AppConfig::default());
        assert_eq!(state.account_id("elonmusk"), None);
        state.cache_account_id("elonmusk", "44196397");
        assert_eq!(state.account_id("elonmusk").as_deref(), Some("44196397"));
    }
}
