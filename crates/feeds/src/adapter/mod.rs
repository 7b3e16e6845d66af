//! REST adapters for the remote data services.
//!
//! Each service has its own request and response format.
//! Adapters normalize these into the core types behind the `source` traits.

mod dexscreener;
mod etherscan;
mod solscan;
mod x;

pub use dexscreener::DexScreenerClient;
pub use etherscan::{EtherscanClient, UNKNOWN_TOKEN_NAME};
pub use solscan::SolscanClient;
pub use x::XClient;
