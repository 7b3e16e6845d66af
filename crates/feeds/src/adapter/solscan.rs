//! Solscan token metadata lookup.

use crate::http::{build_client, get_json, parse_base_url};
use crate::{ContractValidator, FeedError};
use async_trait::async_trait;
use lurker_core::Chain;
use serde::Deserialize;
use std::time::Duration;
use url::Url;

const SERVICE: &str = "Solscan";

#[derive(Debug, Deserialize)]
struct TokenMeta {
    name: Option<String>,
}

/// Solscan public API client.
pub struct SolscanClient {
    client: reqwest::Client,
    base_url: Url,
}

impl SolscanClient {
    pub const BASE_URL: &'static str = "https://public-api.solscan.io";

    pub fn new(timeout: Duration) -> Result<Self, FeedError> {
        Ok(Self {
            client: build_client(timeout)?,
            base_url: parse_base_url(Self::BASE_URL)?,
        })
    }

    pub fn with_base_url(mut self, base_url: &str) -> Result<Self, FeedError> {
        self.base_url = parse_base_url(base_url)?;
        Ok(self)
    }
}

#[async_trait]
impl ContractValidator for SolscanClient {
    fn chain(&self) -> Chain {
        Chain::Solana
    }

    async fn token_name(&self, address: &str) -> Result<Option<String>, FeedError> {
        let url = self.base_url.join(&format!("token/meta/{}", address))?;

        match get_json::<TokenMeta>(SERVICE, self.client.get(url)).await {
            Ok(meta) => Ok(meta.name.filter(|name| !name.is_empty())),
            // Unknown or malformed mints are answered with 400/404
            Err(FeedError::Status { status: 400 | 404, .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }
}
