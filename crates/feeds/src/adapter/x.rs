//! X (Twitter) API v2 adapter.
//!
//! Read-only endpoints authenticated with the app bearer token.

use crate::http::{build_client, get_json, parse_base_url};
use crate::{FeedError, SocialApi};
use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use lurker_core::{Post, SocialUser};
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;
use url::Url;

const SERVICE: &str = "X";

/// The counts endpoint rejects end times closer than 10s to the request.
const COUNTS_END_LAG_SECS: i64 = 15;

#[derive(Debug, Deserialize)]
struct Single<T> {
    data: Option<T>,
}

#[derive(Debug, Deserialize)]
struct List<T> {
    #[serde(default = "Vec::new")]
    data: Vec<T>,
    #[serde(default)]
    includes: Option<Includes>,
}

#[derive(Debug, Default, Deserialize)]
struct Includes {
    #[serde(default)]
    users: Vec<ApiUser>,
}

#[derive(Debug, Deserialize)]
struct ApiUser {
    id: String,
    username: String,
    #[serde(default)]
    verified: bool,
}

impl From<ApiUser> for SocialUser {
    fn from(user: ApiUser) -> Self {
        SocialUser {
            id: user.id,
            username: user.username,
            verified: user.verified,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ApiTweet {
    id: String,
    #[serde(default)]
    text: String,
    author_id: Option<String>,
    public_metrics: Option<PublicMetrics>,
}

#[derive(Debug, Deserialize)]
struct PublicMetrics {
    #[serde(default)]
    impression_count: u64,
}

#[derive(Debug, Deserialize)]
struct CountBucket {
    #[serde(default)]
    tweet_count: u64,
}

impl ApiTweet {
    fn into_post(self, usernames: &HashMap<String, String>) -> Post {
        let author_username = self
            .author_id
            .as_ref()
            .and_then(|id| usernames.get(id))
            .cloned();
        Post {
            views: self.public_metrics.map(|m| m.impression_count).unwrap_or(0),
            id: self.id,
            text: self.text,
            author_id: self.author_id,
            author_username,
        }
    }
}

/// X API v2 client.
pub struct XClient {
    client: reqwest::Client,
    base_url: Url,
    bearer_token: String,
}

impl XClient {
    pub const BASE_URL: &'static str = "https://api.twitter.com/";

    pub fn new(bearer_token: impl Into<String>, timeout: Duration) -> Result<Self, FeedError> {
        Ok(Self {
            client: build_client(timeout)?,
            base_url: parse_base_url(Self::BASE_URL)?,
            bearer_token: bearer_token.into(),
        })
    }

    /// Point the client at another host (proxy or mock server).
    pub fn with_base_url(mut self, base_url: &str) -> Result<Self, FeedError> {
        self.base_url = parse_base_url(base_url)?;
        Ok(self)
    }

    fn get(&self, path: &str) -> Result<reqwest::RequestBuilder, FeedError> {
        let url = self.base_url.join(path)?;
        Ok(self.client.get(url).bearer_auth(&self.bearer_token))
    }
}

#[async_trait]
impl SocialApi for XClient {
    async fn users_by_usernames(&self, usernames: &[String]) -> Result<Vec<SocialUser>, FeedError> {
        if usernames.is_empty() {
            return Ok(Vec::new());
        }

        let request = self
            .get("2/users/by")?
            .query(&[("usernames", usernames.join(",").as_str()), ("user.fields", "verified")]);
        let response: List<ApiUser> = get_json(SERVICE, request).await?;

        debug!(requested = usernames.len(), found = response.data.len(), "Fetched users");
        Ok(response.data.into_iter().map(SocialUser::from).collect())
    }

    async fn user_by_username(&self, username: &str) -> Result<Option<SocialUser>, FeedError> {
        let request = self.get(&format!("2/users/by/username/{}", username))?;
        let response: Single<ApiUser> = get_json(SERVICE, request).await?;
        Ok(response.data.map(SocialUser::from))
    }

    async fn recent_posts(&self, user_id: &str, max_results: u32) -> Result<Vec<Post>, FeedError> {
        let request = self.get(&format!("2/users/{}/tweets", user_id))?.query(&[
            ("max_results", max_results.to_string().as_str()),
            ("tweet.fields", "public_metrics,created_at"),
        ]);
        let response: List<ApiTweet> = get_json(SERVICE, request).await?;

        let usernames = HashMap::new();
        Ok(response
            .data
            .into_iter()
            .map(|tweet| tweet.into_post(&usernames))
            .collect())
    }

    async fn mention_count(&self, query: &str, window: Duration) -> Result<u64, FeedError> {
        let end = Utc::now() - chrono::Duration::seconds(COUNTS_END_LAG_SECS);
        let start = end - chrono::Duration::seconds(window.as_secs() as i64);
        let start_time = start.to_rfc3339_opts(SecondsFormat::Secs, true);
        let end_time = end.to_rfc3339_opts(SecondsFormat::Secs, true);

        let request = self.get("2/tweets/counts/recent")?.query(&[
            ("query", query),
            ("granularity", "minute"),
            ("start_time", start_time.as_str()),
            ("end_time", end_time.as_str()),
        ]);
        let response: List<CountBucket> = get_json(SERVICE, request).await?;

        Ok(response.data.iter().map(|bucket| bucket.tweet_count).sum())
    }

    async fn search_recent(
        &self,
        query: &str,
        window: Duration,
        max_results: u32,
    ) -> Result<Vec<Post>, FeedError> {
        let start = Utc::now() - chrono::Duration::seconds(window.as_secs() as i64);
        let start_time = start.to_rfc3339_opts(SecondsFormat::Secs, true);

        let request = self.get("2/tweets/search/recent")?.query(&[
            ("query", query),
            ("start_time", start_time.as_str()),
            ("max_results", max_results.to_string().as_str()),
            ("tweet.fields", "created_at,author_id"),
            ("expansions", "author_id"),
            ("user.fields", "username"),
        ]);
        let response: List<ApiTweet> = get_json(SERVICE, request).await?;

        let usernames: HashMap<String, String> = response
            .includes
            .unwrap_or_default()
            .users
            .into_iter()
            .map(|user| (user.id, user.username))
            .collect();

        Ok(response
            .data
            .into_iter()
            .map(|tweet| tweet.into_post(&usernames))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, Request, ResponseTemplate};

    async fn client_for(server: &MockServer) -> XClient {
        XClient::new("test-bearer", Duration::from_secs(5))
            .unwrap()
            .with_base_url(&server.uri())
            .unwrap()
    }

    #[tokio::test]
    async fn test_users_by_usernames_reads_verified_flag() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/2/users/by"))
            .and(query_param("usernames", "Ga__ke,shakira"))
            .and(query_param("user.fields", "verified"))
            .and(header("authorization", "Bearer test-bearer"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [
                    {"id": "1", "name": "Gake", "username": "Ga__ke", "verified": false},
                    {"id": "2", "name": "Shakira", "username": "shakira", "verified": true}
                ]
            })))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let users = client
            .users_by_usernames(&["Ga__ke".to_string(), "shakira".to_string()])
            .await
            .unwrap();

        assert_eq!(users.len(), 2);
        assert!(!users[0].verified);
        assert_eq!(users[1].username, "shakira");
        assert!(users[1].verified);
    }

    #[tokio::test]
    async fn test_user_by_username_missing_user() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/2/users/by/username/nobody_here"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "errors": [{"detail": "Could not find user with username: [nobody_here]."}]
            })))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let user = client.user_by_username("nobody_here").await.unwrap();
        assert!(user.is_none());
    }

    #[tokio::test]
    async fn test_recent_posts_maps_impressions() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/2/users/44196397/tweets"))
            .and(query_param("max_results", "5"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [
                    {"id": "900", "text": "hello", "public_metrics": {"impression_count": 12345, "like_count": 3}},
                    {"id": "899", "text": "older"}
                ]
            })))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let posts = client.recent_posts("44196397", 5).await.unwrap();

        assert_eq!(posts.len(), 2);
        assert_eq!(posts[0].id, "900");
        assert_eq!(posts[0].views, 12345);
        assert_eq!(posts[1].views, 0);
    }

    #[tokio::test]
    async fn test_mention_count_sums_buckets() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/2/tweets/counts/recent"))
            .and(query_param("query", "$PEPE"))
            .and(query_param("granularity", "minute"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [
                    {"start": "2026-01-01T00:00:00.000Z", "end": "2026-01-01T00:01:00.000Z", "tweet_count": 7},
                    {"start": "2026-01-01T00:01:00.000Z", "end": "2026-01-01T00:02:00.000Z", "tweet_count": 5}
                ],
                "meta": {"total_tweet_count": 12}
            })))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let count = client.mention_count("$PEPE", Duration::from_secs(120)).await.unwrap();
        assert_eq!(count, 12);
    }

    #[tokio::test]
    async fn test_mention_count_empty_window() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/2/tweets/counts/recent"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "meta": {"total_tweet_count": 0}
            })))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let count = client.mention_count("$NONE", Duration::from_secs(600)).await.unwrap();
        assert_eq!(count, 0);
    }

    /// Matches requests whose `start_time` lies about `secs` seconds back.
    fn starts_within(secs: i64) -> impl Fn(&Request) -> bool + Send + Sync {
        move |request: &Request| {
            request.url.query_pairs().any(|(key, value)| {
                key == "start_time"
                    && chrono::DateTime::parse_from_rfc3339(&value)
                        .map(|start| {
                            let age = (Utc::now() - start.with_timezone(&Utc)).num_seconds();
                            (secs - 5..=secs + 5).contains(&age)
                        })
                        .unwrap_or(false)
            })
        }
    }

    #[tokio::test]
    async fn test_search_recent_expands_authors() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/2/tweets/search/recent"))
            .and(query_param("expansions", "author_id"))
            .and(starts_within(120))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [
                    {"id": "1", "text": "$PEPE looking strong", "author_id": "77"},
                    {"id": "2", "text": "$PEPE again", "author_id": "78"}
                ],
                "includes": {"users": [{"id": "77", "name": "Shadow", "username": "_Shadow36"}]}
            })))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let posts = client
            .search_recent("$PEPE (from:_Shadow36)", Duration::from_secs(120), 10)
            .await
            .unwrap();

        assert_eq!(posts.len(), 2);
        assert_eq!(posts[0].author(), "_Shadow36");
        assert_eq!(posts[1].author(), "78");
    }

    #[tokio::test]
    async fn test_rate_limit_maps_to_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/2/users/by/username/elonmusk"))
            .respond_with(ResponseTemplate::new(429).set_body_string("Too Many Requests"))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let err = client.user_by_username("elonmusk").await.unwrap_err();
        assert!(err.is_rate_limited());
    }

    #[tokio::test]
    async fn test_server_error_maps_to_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/2/tweets/search/recent"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let err = client
            .search_recent("$PEPE", Duration::from_secs(120), 10)
            .await.unwrap_err();
        assert!(matches!(err, FeedError::Status { status: 503, .. }));
    }
}
