//! Shared HTTP plumbing for the REST adapters.

use crate::FeedError;
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Build a client with a per-request timeout.
pub(crate) fn build_client(timeout: Duration) -> Result<reqwest::Client, FeedError> {
    Ok(reqwest::Client::builder().timeout(timeout).build()?)
}

/// Parse a base URL, making sure relative joins keep its path.
pub(crate) fn parse_base_url(base: &str) -> Result<Url, FeedError> {
    if base.ends_with('/') {
        Ok(Url::parse(base)?)
    } else {
        Ok(Url::parse(&format!("{}/", base))?)
    }
}

/// Send a request, mapping 429 to `RateLimited` and other failures to `Status`.
pub(crate) async fn send(service: &'static str, request: RequestBuilder) -> Result<Response, FeedError> {
    let response = request.send().await?;
    let status = response.status();

    if status == StatusCode::TOO_MANY_REQUESTS {
        debug!(service = service, "Rate limited");
        return Err(FeedError::RateLimited);
    }

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(FeedError::Status {
            service,
            status: status.as_u16(),
            body,
        });
    }

    Ok(response)
}

/// Send a request and decode the JSON body.
pub(crate) async fn get_json<T: DeserializeOwned>(
    service: &'static str,
    request: RequestBuilder,
) -> Result<T, FeedError> {
    let response = send(service, request).await?;
    Ok(response.json::<T>().await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_base_url_appends_slash() {
        let url = parse_base_url("http://127.0.0.1:8080/api").unwrap();
        assert_eq!(url.join("token/meta/x").unwrap().as_str(), "http://127.0.0.1:8080/api/token/meta/x");

        let url = parse_base_url("https://api.twitter.com/").unwrap();
        assert_eq!(url.join("2/users/by").unwrap().as_str(), "https://api.twitter.com/2/users/by");
    }

    #[test]
    fn test_parse_base_url_rejects_garbage() {
        assert!(matches!(parse_base_url("not a url"), Err(FeedError::InvalidUrl(_))));
    }
}
