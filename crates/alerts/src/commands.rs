//! Chat command handling.
//!
//! Handlers return the reply text; the Telegram layer only parses
//! commands and delivers replies.

use crate::format::{format_analysis, format_found, format_tracked_list, format_verified_list};
use lurker_core::{Hashtag, MarketSnapshot, MessageMentions};
use lurker_engine::{Registration, TokenRegistry, VerifiedSet};
use lurker_feeds::{MarketData, TokenResolver};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Command and message handlers over the shared tracking state.
#[derive(Clone)]
pub struct CommandHandler {
    registry: TokenRegistry,
    verified: VerifiedSet,
    resolver: TokenResolver,
    market: Arc<dyn MarketData>,
}

impl CommandHandler {
    pub fn new(
        registry: TokenRegistry,
        verified: VerifiedSet,
        resolver: TokenResolver,
        market: Arc<dyn MarketData>,
    ) -> Self {
        Self {
            registry,
            verified,
            resolver,
            market,
        }
    }

    /// Market snapshot, or the neutral one when it cannot be fetched.
    async fn market_or_neutral(&self, address: &str) -> MarketSnapshot {
        match self.market.snapshot(address).await {
            Ok(Some(snapshot)) => snapshot,
            Ok(None) => MarketSnapshot::default(),
            Err(e) => {
                warn!(address = address, error = %e, "Market data unavailable");
                MarketSnapshot::default()
            }
        }
    }

    /// `/run <contract>`: resolve, analyse and start tracking a contract.
    pub async fn run(&self, contract: &str) -> String {
        let contract = contract.trim();
        if contract.is_empty() {
            return "Usage: /run <contract address>".to_string();
        }

        let token = match self.resolver.resolve(contract).await {
            Ok(Some(token)) => token,
            Ok(None) => return format!("❌ Invalid contract address: {}", contract),
            Err(e) => return format!("❌ Error analyzing contract: {}", e),
        };

        let market = self.market_or_neutral(contract).await;
        let mut reply = format_analysis(contract, &token, &market);

        let hashtag = token.hashtag();
        match self
            .registry
            .register_resolved(hashtag.clone(), contract, &token.name, market.volume_m5)
        {
            Registration::Added => reply.push_str(&format!("\n\n👀 Now tracking {}", hashtag)),
            Registration::Linked => reply.push_str(&format!("\n\n🔗 Linked to {}", hashtag)),
            Registration::AlreadyTracked { address } if address != contract => {
                reply.push_str(&format!("\n\n{} is already tracked at {}", hashtag, address))
            }
            Registration::AlreadyTracked { .. } => {}
        }
        reply
    }

    /// `/list_tracked`
    pub fn list_tracked(&self) -> String {
        format_tracked_list(&self.registry.snapshot())
    }

    /// `/list_verified`
    pub fn list_verified(&self) -> String {
        format_verified_list(&self.verified.list())
    }

    /// `/track <hashtag>`
    pub fn track(&self, input: &str) -> String {
        match Hashtag::parse(input) {
            Ok(hashtag) => {
                if self.registry.track_hashtag(hashtag.clone()) {
                    format!("👀 Tracking {} (no contract yet)", hashtag)
                } else {
                    format!("Already tracking {}", hashtag)
                }
            }
            Err(_) => invalid_hashtag(input),
        }
    }

    /// `/untrack <hashtag>`. Keys derived from token names may hold
    /// spaces or digits, so the input is not validated like `/track`.
    pub fn untrack(&self, input: &str) -> String {
        let Some(hashtag) = Hashtag::normalize(input) else {
            return "Usage: /untrack <hashtag>".to_string();
        };
        match self.registry.untrack(&hashtag) {
            Some(_) => format!("Stopped tracking {}", hashtag),
            None => format!("{} is not being tracked", hashtag),
        }
    }

    /// Scan a plain chat message and return the announcements to post.
    pub async fn scan_message(&self, text: &str) -> Vec<String> {
        let mentions = MessageMentions::scan(text);
        if mentions.is_empty() {
            return Vec::new();
        }

        let mut replies = Vec::new();
        for address in mentions.addresses() {
            match self.resolver.resolve(address).await {
                Ok(Some(token)) => {
                    let hashtag = token.hashtag();
                    let reply = match self
                        .registry
                        .register_resolved(hashtag.clone(), address, &token.name, 0.0)
                    {
                        Registration::Added => format_found(token.chain, &token.name, &hashtag, address),
                        Registration::Linked => {
                            format!("🔗 Linked {} ({}) to {}", token.name, hashtag, address)
                        }
                        Registration::AlreadyTracked { address: existing } => {
                            format!("Already tracking {} at {}", hashtag, existing)
                        }
                    };
                    replies.push(reply);
                }
                Ok(None) => debug!(address = address, "Ignoring unresolved address"),
                Err(e) => {
                    warn!(address = address, error = %e, "Failed to resolve scanned address");
                    replies.push(format!("❌ Error processing address {}: {}", address, e));
                }
            }
        }

        for hashtag in mentions.hashtags {
            if self.registry.track_hashtag(hashtag.clone()) {
                info!(hashtag = %hashtag, "Hashtag picked up from chat");
                replies.push(format!("👀 Tracking {} (no contract yet)", hashtag));
            }
        }
        replies
    }
}

fn invalid_hashtag(input: &str) -> String {
    format!(
        "❌ Invalid hashtag: {}. Use 3-6 letters, e.g. $PEPE",
        input.trim()
    )
}
