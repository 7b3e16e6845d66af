//! Alert and reply texts.

use lurker_core::{truncate_text, Chain, Hashtag, MarketSnapshot, Post, ResolvedToken, TrackedToken};
use lurker_engine::{TokenActivity, ViewAlert};
use num_format::{Locale, ToFormattedString};

/// Post excerpts in alerts are cut to this many characters.
pub const EXCERPT_CHARS: usize = 50;

/// Format a USD amount with thousands separators and two decimals.
pub fn format_usd(value: f64) -> String {
    let cents = (value * 100.0).round() as i128;
    let sign = if cents < 0 { "-" } else { "" };
    let cents = cents.unsigned_abs();
    format!(
        "{}{}.{:02}",
        sign,
        (cents / 100).to_formatted_string(&Locale::en),
        cents % 100
    )
}

/// View surge or spike on a monitored account's latest post.
pub fn format_view_alert(username: &str, post: &Post, alert: ViewAlert) -> String {
    match alert {
        ViewAlert::NewPost { views } => format!(
            "🚨 @{} View Surge: {} views on '{}'",
            username,
            views,
            truncate_text(&post.text, EXCERPT_CHARS)
        ),
        ViewAlert::Spike { previous, current } => {
            format!("🚨 @{} Views Spiked: {} -> {}", username, previous, current)
        }
    }
}

fn market_lines(activity: &TokenActivity) -> String {
    let delta = activity.volume_delta();
    format!(
        "Price: ${}\n\
         Volume Spike (2m): {}{:.2} USD ({})\n\
         Market Cap: ${}\n\
         Liquidity: ${}\n\
         Search Spike (10m): {:+} mentions",
        activity.market.price_display(),
        if delta > 0.0 { "+" } else { "" },
        delta,
        activity.trend_label(),
        format_usd(activity.market.market_cap),
        format_usd(activity.market.liquidity_usd),
        activity.search_spike
    )
}

/// Composite surge alert for a tracked token.
pub fn format_token_alert(hashtag: &Hashtag, token: &TrackedToken, activity: &TokenActivity) -> String {
    format!(
        "🚀 {} Surge: {} mentions in last 2 mins (prev: {})\n{}\nContract: {}",
        token.display_name(hashtag),
        activity.count_2m,
        activity.previous_count,
        market_lines(activity),
        token.address.as_deref().unwrap_or("Not provided")
    )
}

/// Recent posts about a token from verified influencers.
pub fn format_influencer_alert(
    hashtag: &Hashtag,
    token: &TrackedToken,
    activity: &TokenActivity,
    posts: &[Post],
) -> String {
    let mut msg = format!(
        "🌟 {} Verified Influencer Posts: {} in last 2 mins\n{}",
        token.display_name(hashtag),
        posts.len(),
        market_lines(activity)
    );
    for post in posts {
        msg.push_str(&format!(
            "\n- @{}: '{}'",
            post.author(),
            truncate_text(&post.text, EXCERPT_CHARS)
        ));
    }
    msg
}

/// Reply to a successful contract lookup.
pub fn format_analysis(address: &str, token: &ResolvedToken, market: &MarketSnapshot) -> String {
    format!(
        "🔍 Analysis for {}\n\
         Chain: {}\n\
         Contract: {}\n\
         Price: ${}\n\
         5min Volume: ${}\n\
         Market Cap: ${}\n\
         Liquidity: ${}",
        token.name,
        token.chain.label(),
        address,
        market.price_display(),
        format_usd(market.volume_m5),
        format_usd(market.market_cap),
        format_usd(market.liquidity_usd)
    )
}

/// Announcement for an address found in a chat message.
pub fn format_found(chain: Chain, name: &str, hashtag: &Hashtag, address: &str) -> String {
    format!("✅ Found {} token: {} ({}) at {}", chain.label(), name, hashtag, address)
}

/// Reply for `/list_tracked`.
pub fn format_tracked_list(tokens: &[(Hashtag, TrackedToken)]) -> String {
    if tokens.is_empty() {
        return "No tokens being tracked!".to_string();
    }

    let lines: Vec<String> = tokens
        .iter()
        .map(|(hashtag, token)| {
            format!(
                "{} ({}): {}",
                token.name.as_deref().unwrap_or(hashtag.as_str()),
                hashtag,
                token.address.as_deref().unwrap_or("No address")
            )
        })
        .collect();
    format!("Tracked Tokens:\n{}", lines.join("\n"))
}

/// Reply for `/list_verified`.
pub fn format_verified_list(usernames: &[String]) -> String {
    if usernames.is_empty() {
        return "No verified influencers found!".to_string();
    }

    let lines: Vec<String> = usernames.iter().map(|u| format!("@{}", u)).collect();
    format!("Verified Influencers:\n{}", lines.join("\n"))
}
