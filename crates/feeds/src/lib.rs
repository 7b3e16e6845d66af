//! Remote data feeds for the lurker bot.
//!
//! This crate provides thin REST clients for the services the bot polls.
//!
//! ## Architecture
//!
//! - `source` - Traits the rest of the workspace depends on (`SocialApi`, `MarketData`, `ContractValidator`)
//! - `adapter/` - Service-specific clients implementing those traits
//! - `resolver` - Two-step contract resolution (Ethereum first, then Solana)

pub mod adapter;
pub mod error;
mod http;
pub mod resolver;
pub mod source;

use std::time::Duration;

pub use adapter::{DexScreenerClient, EtherscanClient, SolscanClient, XClient, UNKNOWN_TOKEN_NAME};
pub use error::*;
pub use resolver::*;
pub use source::*;

/// Per-request timeout applied when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
