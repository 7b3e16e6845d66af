//! Surge detection.
//!
//! Pure comparisons between a fresh observation and the stored snapshot.
//! Nothing here performs I/O or mutates state; the monitor decides what
//! to fetch and what to store.

use crate::Thresholds;
use lurker_core::{Hashtag, LastPost, MarketSnapshot, Post, TrackedToken};

/// Scales a 5-minute volume delta to a 2-minute estimate.
const VOLUME_WINDOW_NUMERATOR: f64 = 2.0;
const VOLUME_WINDOW_DENOMINATOR: f64 = 5.0;

/// View alert for a monitored account's latest post.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewAlert {
    /// A post we had not seen before already has many views.
    NewPost { views: u64 },
    /// The same post grew by at least the spike multiplier.
    Spike { previous: u64, current: u64 },
}

/// Compare an account's latest post against the stored one.
///
/// A zero view count never spikes, so a post whose impressions are not
/// reported yet does not alert on every poll.
pub fn evaluate_post(previous: Option<&LastPost>, latest: &Post, thresholds: &Thresholds) -> Option<ViewAlert> {
    match previous {
        Some(prev) if prev.post_id == latest.id => {
            let target = prev.views.saturating_mul(thresholds.view_spike_multiplier);
            if latest.views > 0 && latest.views >= target {
                Some(ViewAlert::Spike {
                    previous: prev.views,
                    current: latest.views,
                })
            } else {
                None
            }
        }
        _ => {
            if latest.views >= thresholds.view_surge {
                Some(ViewAlert::NewPost { views: latest.views })
            } else {
                None
            }
        }
    }
}

/// Direction of a volume change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    Bullish,
    Bearish,
}

impl Trend {
    pub fn as_str(self) -> &'static str {
        match self {
            Trend::Bullish => "Bullish",
            Trend::Bearish => "Bearish",
        }
    }
}

/// Estimated 2-minute volume change in USD.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VolumeChange {
    pub delta: f64,
    pub trend: Trend,
}

/// Estimate the 2-minute volume change from two 5-minute volumes.
/// Returns None when either side is zero (no baseline or no trading data).
pub fn volume_change(previous_m5: f64, current_m5: f64) -> Option<VolumeChange> {
    if previous_m5 == 0.0 || current_m5 == 0.0 {
        return None;
    }

    let delta = (current_m5 - previous_m5) * VOLUME_WINDOW_NUMERATOR / VOLUME_WINDOW_DENOMINATOR;
    let trend = if delta > 0.0 { Trend::Bullish } else { Trend::Bearish };
    Some(VolumeChange { delta, trend })
}

/// Condition that fired for a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// 2-minute mentions reached the absolute threshold
    MentionSurge,
    /// 2-minute mentions reached a multiple of the previous count
    MentionMultiple,
    /// 2-minute volume estimate moved by at least the USD threshold
    VolumeSpike,
    /// 10-minute mentions grew by at least the threshold
    SearchSpike,
}

/// Fresh figures fetched for one token in one cycle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TokenObservation {
    pub count_2m: u64,
    pub count_10m: u64,
    /// Present only for tokens with a contract address
    pub market: Option<MarketSnapshot>,
}

/// Outcome of comparing a token's observation with its snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenActivity {
    pub count_2m: u64,
    pub previous_count: u64,
    pub count_10m: u64,
    /// Change of the 10-minute count since the previous poll; may be negative
    pub search_spike: i64,
    pub volume_change: Option<VolumeChange>,
    pub market: MarketSnapshot,
    pub triggers: Vec<Trigger>,
}

impl TokenActivity {
    pub fn should_alert(&self) -> bool {
        !self.triggers.is_empty()
    }

    /// Volume delta for display, 0 when it could not be computed.
    pub fn volume_delta(&self) -> f64 {
        self.volume_change.map(|change| change.delta).unwrap_or(0.0)
    }

    /// Trend label for display.
    pub fn trend_label(&self) -> &'static str {
        self.volume_change
            .map(|change| change.trend.as_str())
            .unwrap_or("N/A")
    }
}

/// Compare a token's fresh observation with its stored snapshot.
pub fn evaluate_token(token: &TrackedToken, observation: &TokenObservation, thresholds: &Thresholds) -> TokenActivity {
    let count = observation.count_2m;
    let previous_count = token.last_count;
    let search_spike = observation.count_10m as i64 - token.last_search_count as i64;
    let volume_change = observation
        .market
        .as_ref()
        .and_then(|market| volume_change(token.last_m5_volume, market.volume_m5));

    let mut triggers = Vec::new();
    if count >= thresholds.mention_surge {
        triggers.push(Trigger::MentionSurge);
    }
    if count > 0 && count >= previous_count.saturating_mul(thresholds.mention_multiplier) {
        triggers.push(Trigger::MentionMultiple);
    }
    if let Some(change) = volume_change {
        if change.delta.abs() >= thresholds.volume_spike_usd {
            triggers.push(Trigger::VolumeSpike);
        }
    }
    if search_spike >= thresholds.search_spike as i64 {
        triggers.push(Trigger::SearchSpike);
    }

    TokenActivity {
        count_2m: count,
        previous_count,
        count_10m: observation.count_10m,
        search_spike,
        volume_change,
        market: observation.market.clone().unwrap_or_default(),
        triggers,
    }
}

/// Search query for verified influencers posting about a hashtag.
/// None when there is nobody to ask about.
pub fn influencer_query<'a>(hashtag: &Hashtag, usernames: impl IntoIterator<Item = &'a str>) -> Option<String> {
    let authors: Vec<String> = usernames
        .into_iter()
        .map(|name| format!("from:{}", name))
        .collect();
    if authors.is_empty() {
        return None;
    }
    Some(format!("{} ({})", hashtag, authors.join(" OR ")))
}
