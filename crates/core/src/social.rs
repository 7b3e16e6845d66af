//! Social platform account and post types.

use serde::{Deserialize, Serialize};

/// Account on the social platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialUser {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub verified: bool,
}

/// A post with the engagement figures the monitor needs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    pub text: String,
    /// Impression count; 0 when the platform does not report it
    pub views: u64,
    pub author_id: Option<String>,
    /// Filled in when the author was expanded in the response
    pub author_username: Option<String>,
}

impl Post {
    /// Author for display: username when known, else the raw id.
    pub fn author(&self) -> &str {
        self.author_username
            .as_deref()
            .or(self.author_id.as_deref())
            .unwrap_or("unknown")
    }
}

/// Latest post seen for a monitored account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastPost {
    pub post_id: String,
    pub views: u64,
}

impl LastPost {
    pub fn new(post_id: impl Into<String>, views: u64) -> Self {
        Self {
            post_id: post_id.into(),
            views,
        }
    }
}

/// Truncate to at most `max_chars` characters, appending `...` when cut.
pub fn truncate_text(text: &str, max_chars: usize) -> String {
    let mut chars = text.char_indices();
    match chars.nth(max_chars) {
        Some((byte_idx, _)) => format!("{}...", &text[..byte_idx]),
        None => text.to_string(),
    }
}
