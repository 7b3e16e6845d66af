//! Alert delivery.

use crate::format::{format_influencer_alert, format_token_alert, format_view_alert};
use async_trait::async_trait;
use lurker_core::{Hashtag, Post, TrackedToken};
use lurker_engine::{TokenActivity, ViewAlert};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum AlertError {
    #[error("Telegram error: {0}")]
    Telegram(#[from] teloxide::RequestError),
}

/// Destination for alert texts.
#[async_trait]
pub trait AlertSink: Send + Sync {
    async fn send_alert(&self, text: &str) -> Result<(), AlertError>;
}

/// Formats detector outcomes and sends them to the alert sink.
#[derive(Clone)]
pub struct Notifier {
    sink: Arc<dyn AlertSink>,
}

impl Notifier {
    pub fn new(sink: Arc<dyn AlertSink>) -> Self {
        Self { sink }
    }

    pub async fn view_alert(&self, username: &str, post: &Post, alert: ViewAlert) -> Result<(), AlertError> {
        info!(username = username, post_id = %post.id, views = post.views, "View alert");
        self.sink.send_alert(&format_view_alert(username, post, alert)).await
    }

    pub async fn token_alert(
        &self,
        hashtag: &Hashtag,
        token: &TrackedToken,
        activity: &TokenActivity,
    ) -> Result<(), AlertError> {
        info!(
            hashtag = %hashtag,
            count_2m = activity.count_2m,
            previous = activity.previous_count,
            search_spike = activity.search_spike,
            triggers = ?activity.triggers,
            "Token surge alert"
        );
        self.sink
            .send_alert(&format_token_alert(hashtag, token, activity))
            .await
    }

    /// Sends nothing when `posts` is empty.
    pub async fn influencer_alert(
        &self,
        hashtag: &Hashtag,
        token: &TrackedToken,
        activity: &TokenActivity,
        posts: &[Post],
    ) -> Result<(), AlertError> {
        if posts.is_empty() {
            debug!(hashtag = %hashtag, "No influencer posts");
            return Ok(());
        }
        info!(hashtag = %hashtag, posts = posts.len(), "Influencer alert");
        self.sink
            .send_alert(&format_influencer_alert(hashtag, token, activity, posts))
            .await
    }
}
