//! DexScreener market data.

use crate::http::{build_client, get_json, parse_base_url};
use crate::{FeedError, MarketData};
use async_trait::async_trait;
use lurker_core::MarketSnapshot;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;
use url::Url;

const SERVICE: &str = "DexScreener";

#[derive(Debug, Deserialize)]
struct TokenPairsResponse {
    #[serde(default)]
    pairs: Option<Vec<Pair>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Pair {
    price_usd: Option<String>,
    #[serde(default)]
    volume: Option<Volume>,
    fdv: Option<f64>,
    #[serde(default)]
    liquidity: Option<Liquidity>,
}

#[derive(Debug, Deserialize)]
struct Volume {
    m5: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct Liquidity {
    usd: Option<f64>,
}

impl From<Pair> for MarketSnapshot {
    fn from(pair: Pair) -> Self {
        MarketSnapshot {
            price_usd: pair.price_usd,
            volume_m5: pair.volume.and_then(|v| v.m5).unwrap_or(0.0),
            market_cap: pair.fdv.unwrap_or(0.0),
            liquidity_usd: pair.liquidity.and_then(|l| l.usd).unwrap_or(0.0),
        }
    }
}

/// DexScreener REST client.
pub struct DexScreenerClient {
    client: reqwest::Client,
    base_url: Url,
}

impl DexScreenerClient {
    pub const BASE_URL: &'static str = "https://api.dexscreener.com";

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
impl MarketData for DexScreenerClient {
    async fn snapshot(&self, address: &str) -> Result<Option<MarketSnapshot>, FeedError> {
        let url = self.base_url.join(&format!("latest/dex/tokens/{}", address))?;
        let response: TokenPairsResponse = get_json(SERVICE, self.client.get(url)).await?;

        let pair = response.pairs.and_then(|pairs| pairs.into_iter().next());
        if pair.is_none() {
            debug!(address = address, "No pairs listed");
        }
        Ok(pair.map(MarketSnapshot::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const ADDRESS: &str = "0x6982508145454Ce325dDbE47a25d4ec3d2311933";

    async fn client_for(server: &MockServer) -> DexScreenerClient {
        DexScreenerClient::new(Duration::from_secs(5))
            .unwrap()
            .with_base_url(&server.uri())
            .unwrap()
    }

    #[tokio::test]
    async fn test_snapshot_uses_first_pair() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("/latest/dex/tokens/{}", ADDRESS)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "schemaVersion": "1.0.0",
                "pairs": [
                    {
                        "chainId": "ethereum",
                        "priceUsd": "0.00001234",
                        "volume": {"m5": 15000.5, "h1": 90000},
                        "fdv": 5200000000.0,
                        "liquidity": {"usd": 31000000.25, "base": 1, "quote": 2}
                    },
                    {"priceUsd": "1.0", "volume": {"m5": 1.0}}
                ]
            })))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let snapshot = client.snapshot(ADDRESS).await.unwrap().unwrap();

        assert_eq!(
            snapshot,
            MarketSnapshot {
                price_usd: Some("0.00001234".to_string()),
                volume_m5: 15000.5,
                market_cap: 5200000000.0,
                liquidity_usd: 31000000.25,
            }
        );
    }

    #[tokio::test]
    async fn test_missing_fields_default_to_zero() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "pairs": [{"priceUsd": "2.5"}]
            })))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let snapshot = client.snapshot(ADDRESS).await.unwrap().unwrap();
        assert_eq!(snapshot.price_display(), "2.5");
        assert_eq!(snapshot.volume_m5, 0.0);
        assert_eq!(snapshot.market_cap, 0.0);
        assert_eq!(snapshot.liquidity_usd, 0.0);
    }

    #[tokio::test]
    async fn test_unlisted_token_has_no_snapshot() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "schemaVersion": "1.0.0", "pairs": null
            })))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        assert_eq!(client.snapshot(ADDRESS).await.unwrap(), None);
    }
}
