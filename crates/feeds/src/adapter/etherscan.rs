//! Etherscan contract validation.

use crate::http::{build_client, get_json};
use crate::{ContractValidator, FeedError};
use async_trait::async_trait;
use lurker_core::Chain;
use std::time::Duration;
use tracing::debug;
use url::Url;

const SERVICE: &str = "Etherscan";

/// Name used when a verified token reports no name.
pub const UNKNOWN_TOKEN_NAME: &str = "Unknown Token";

/// Etherscan REST client.
///
/// An address counts as a token when its source is verified
/// (`getsourcecode` reports a contract name) and `tokeninfo` knows it.
pub struct EtherscanClient {
    client: reqwest::Client,
    base_url: Url,
    api_key: String,
}

impl EtherscanClient {
    pub const BASE_URL: &'static str = "https://api.etherscan.io/api";

    pub fn new(api_key: impl Into<String>, timeout: Duration) -> Result<Self, FeedError> {
        Ok(Self {
            client: build_client(timeout)?,
            base_url: Url::parse(Self::BASE_URL)?,
            api_key: api_key.into(),
        })
    }

    /// The URL is used as-is: every call goes to this single endpoint.
    pub fn with_base_url(mut self, base_url: &str) -> Result<Self, FeedError> {
        self.base_url = Url::parse(base_url)?;
        Ok(self)
    }

    async fn call(
        &self,
        module: &str,
        action: &str,
        address_param: &str,
        address: &str,
    ) -> Result<serde_json::Value, FeedError> {
        let request = self.client.get(self.base_url.clone()).query(&[
            ("module", module),
            ("action", action),
            (address_param, address),
            ("apikey", self.api_key.as_str()),
        ]);
        get_json(SERVICE, request).await
    }

    /// Contract name from verified source, if any.
    async fn contract_name(&self, address: &str) -> Result<Option<String>, FeedError> {
        let json = self.call("contract", "getsourcecode", "address", address).await?;

        // Failures come back as {"status":"0","result":"<message>"}
        if json["status"].as_str() != Some("1") {
            debug!(address = address, message = ?json["result"], "getsourcecode rejected address");
            return Ok(None);
        }

        let name = json["result"][0]["ContractName"]
            .as_str()
            .filter(|name| !name.is_empty())
            .map(str::to_string);
        Ok(name)
    }

    /// Token name from the token info endpoint.
    async fn token_info_name(&self, address: &str) -> Result<Option<String>, FeedError> {
        let json = self.call("token", "tokeninfo", "contractaddress", address).await?;

        if json["status"].as_str() != Some("1") {
            return Ok(None);
        }

        let first = match json["result"].as_array().and_then(|r| r.first()) {
            Some(entry) => entry,
            None => return Ok(None),
        };

        let name = first["tokenName"]
            .as_str()
            .filter(|name| !name.is_empty())
            .unwrap_or(UNKNOWN_TOKEN_NAME);
        Ok(Some(name.to_string()))
    }
}

#[async_trait]
impl ContractValidator for EtherscanClient {
    fn chain(&self) -> Chain {
        Chain::Ethereum
    }

    async fn token_name(&self, address: &str) -> Result<Option<String>, FeedError> {
        if self.contract_name(address).await?.is_none() {
            return Ok(None);
        }
        self.token_info_name(address).await
    }
}
