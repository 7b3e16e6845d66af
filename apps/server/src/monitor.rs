//! Polling loop.
//!
//! Each cycle checks the monitored accounts for view surges, then every
//! tracked token for mention, volume and search spikes.

use crate::state::SharedState;
use lurker_alerts::Notifier;
use lurker_core::{Hashtag, LastPost, MarketSnapshot, TrackedToken};
use lurker_engine::{evaluate_post, evaluate_token, influencer_query, TokenObservation};
use lurker_feeds::{FeedError, MarketData, SocialApi};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

const MENTION_WINDOW: Duration = Duration::from_secs(2 * 60);
const SEARCH_WINDOW: Duration = Duration::from_secs(10 * 60);

pub struct Monitor {
    state: SharedState,
    social: Arc<dyn SocialApi>,
    market: Arc<dyn MarketData>,
    notifier: Notifier,
}

impl Monitor {
    pub fn new(
        state: SharedState,
        social: Arc<dyn SocialApi>,
        market: Arc<dyn MarketData>,
        notifier: Notifier,
    ) -> Self {
        Self {
            state,
            social,
            market,
            notifier,
        }
    }

    /// Await a social API call, applying the shared backoff.
    ///
    /// Rate limits sleep for the backoff delay; any failure yields None.
    async fn guarded<T>(
        &self,
        operation: &'static str,
        request: impl Future<Output = Result<T, FeedError>>,
    ) -> Option<T> {
        match request.await {
            Ok(value) => {
                self.state.reset_backoff();
                Some(value)
            }
            Err(e) if e.is_rate_limited() => {
                let delay = self.state.rate_limited();
                warn!(operation = operation, delay_secs = delay.as_secs(), "Rate limit hit, backing off");
                tokio::time::sleep(delay).await;
                None
            }
            Err(e) => {
                warn!(operation = operation, error = %e, "Social API request failed");
                None
            }
        }
    }

    /// Fill the verified set from the configured influencer candidates.
    pub async fn verify_influencers(&self) {
        let candidates = &self.state.config.monitor.influencers;
        if candidates.is_empty() {
            return;
        }

        let Some(users) = self
            .guarded("verify influencers", self.social.users_by_usernames(candidates))
            .await
        else {
            warn!("Influencer verification failed, verified set left empty");
            return;
        };

        let verified: Vec<String> = users
            .into_iter()
            .filter(|user| user.verified)
            .map(|user| user.username)
            .collect();
        info!(verified = verified.len(), candidates = candidates.len(), "Influencers verified");
        self.state.verified.replace(verified);
    }

    /// Verify influencers, then run cycles on the configured interval until
    /// the state is stopped. A cycle always finishes before the next tick is
    /// awaited.
    pub async fn run(self) {
        tokio::select! {
            _ = self.verify_influencers() => {}
            _ = self.state.stopped() => {
                info!("Monitor stopped before first cycle");
                return;
            }
        }

        let interval = self.state.config.monitor.interval();
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        info!(interval_secs = interval.as_secs(), "Monitor started");

        while self.state.is_running() {
            tokio::select! {
                _ = ticker.tick() => {}
                _ = self.state.stopped() => break,
            }
            self.run_cycle().await;
        }

        info!("Monitor stopped");
    }

    pub async fn run_cycle(&self) {
        let accounts = self.state.config.monitor.accounts.len();
        let tokens = self.state.registry.len();
        debug!(accounts = accounts, tokens = tokens, "Cycle started");

        for username in &self.state.config.monitor.accounts {
            self.check_account(username).await;
        }

        for (hashtag, token) in self.state.registry.snapshot() {
            self.check_token(&hashtag, &token).await;
        }

        debug!("Cycle finished");
    }

    async fn account_id(&self, username: &str) -> Option<String> {
        if let Some(id) = self.state.account_id(username) {
            return Some(id);
        }

        match self
            .guarded("user lookup", self.social.user_by_username(username))
            .await?
        {
            Some(user) => {
                self.state.cache_account_id(username, &user.id);
                Some(user.id)
            }
            None => {
                warn!(username = username, "User not found");
                None
            }
        }
    }

    async fn check_account(&self, username: &str) {
        let Some(user_id) = self.account_id(username).await else {
            return;
        };

        let limit = self.state.config.monitor.posts_per_account;
        let Some(posts) = self
            .guarded("recent posts", self.social.recent_posts(&user_id, limit))
            .await
        else {
            return;
        };
        let Some(latest) = posts.into_iter().next() else {
            debug!(username = username, "No recent posts");
            return;
        };

        let previous = self.state.posts.get(username);
        if let Some(alert) = evaluate_post(previous.as_ref(), &latest, &self.state.config.thresholds) {
            if let Err(e) = self.notifier.view_alert(username, &latest, alert).await {
                error!(username = username, error = %e, "Failed to send view alert");
            }
        }
        self.state
            .posts
            .record(username, LastPost::new(latest.id.clone(), latest.views));
    }

    /// Market snapshot for an address, plus the volume to store as the next
    /// baseline. A failed fetch yields the neutral snapshot and no baseline.
    async fn market_snapshot(&self, address: &str) -> (MarketSnapshot, Option<f64>) {
        match self.market.snapshot(address).await {
            Ok(Some(snapshot)) => {
                let volume = snapshot.volume_m5;
                (snapshot, Some(volume))
            }
            Ok(None) => (MarketSnapshot::default(), Some(0.0)),
            Err(e) => {
                warn!(address = address, error = %e, "Market data unavailable");
                (MarketSnapshot::default(), None)
            }
        }
    }

    async fn check_token(&self, hashtag: &Hashtag, token: &TrackedToken) {
        let query = hashtag.as_str();
        let Some(count_2m) = self
            .guarded("mention count", self.social.mention_count(query, MENTION_WINDOW))
            .await
        else {
            return;
        };
        let Some(count_10m) = self
            .guarded("search count", self.social.mention_count(query, SEARCH_WINDOW))
            .await
        else {
            return;
        };

        let (market, volume_baseline) = match &token.address {
            Some(address) => {
                let (snapshot, volume) = self.market_snapshot(address).await;
                (Some(snapshot), volume)
            }
            None => (None, None),
        };

        let observation = TokenObservation {
            count_2m,
            count_10m,
            market,
        };
        let activity = evaluate_token(token, &observation, &self.state.config.thresholds);
        debug!(
            hashtag = %hashtag,
            count_2m = count_2m,
            count_10m = count_10m,
            triggers = ?activity.triggers,
            "Token observed"
        );

        if activity.should_alert() {
            if let Err(e) = self.notifier.token_alert(hashtag, token, &activity).await {
                error!(hashtag = %hashtag, error = %e, "Failed to send token alert");
            }
        }

        if !self
            .state
            .registry
            .record_observation(hashtag, count_2m, count_10m, volume_baseline)
        {
            debug!(hashtag = %hashtag, "Token untracked during cycle");
        }

        let verified = self.state.verified.list();
        let Some(query) = influencer_query(hashtag, verified.iter().map(String::as_str)) else {
            return;
        };
        let limit = self.state.config.monitor.influencer_posts;
        let Some(posts) = self
            .guarded(
                "influencer search",
                self.social.search_recent(&query, MENTION_WINDOW, limit),
            )
            .await
        else {
            return;
        };
        if let Err(e) = self
            .notifier
            .influencer_alert(hashtag, token, &activity, &posts)
            .await
        {
            error!(hashtag = %hashtag, error = %e, "Failed to send influencer alert");
        }
    }
}
