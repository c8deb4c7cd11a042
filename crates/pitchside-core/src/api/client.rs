//! Feed client for the football-data.org resources.
//!
//! The client either talks to the authenticating forwarding layer (the
//! default) or straight to the provider with an `X-Auth-Token` header. It
//! never decides caching policy and never retries on its own.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client, Url};
use tracing::{debug, warn};

use crate::feed::{Feed, Snapshot};

use super::FeedError;

// ============================================================================
// Constants
// ============================================================================

/// Header the provider reads the API token from (`X-Auth-Token`).
const AUTH_TOKEN_HEADER: header::HeaderName = header::HeaderName::from_static("x-auth-token");

/// Default HTTP request timeout in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Where requests go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Upstream {
    /// Forwarding layer exposing `/api/standings`, `/api/matches`, `/api/teams`.
    Proxy { base_url: String },
    /// The provider itself, `/competitions/{code}/...`, token required.
    Direct {
        base_url: String,
        competition: String,
        token: Option<String>,
    },
}

/// Anything that can produce a fresh snapshot for a feed.
#[async_trait]
pub trait FeedSource: Send + Sync {
    async fn fetch(&self, feed: &Feed) -> Result<Snapshot, FeedError>;
}

/// HTTP feed client.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct FeedClient {
    client: Client,
    base: Url,
    prefix: String,
    token: Option<String>,
}

impl FeedClient {
    /// Create a client for the given upstream.
    ///
    /// Fails with `FeedError::Config` when direct mode has no token or the
    /// base URL does not parse; both are fatal and not worth retrying.
    pub fn new(upstream: Upstream, timeout: Duration) -> Result<Self, FeedError> {
        let (base_url, prefix, token) = match upstream {
            Upstream::Proxy { base_url } => (base_url, "api".to_string(), None),
            Upstream::Direct {
                base_url,
                competition,
                token,
            } => {
                let token = token.filter(|t| !t.trim().is_empty()).ok_or_else(|| {
                    FeedError::Config(
                        "API token is missing. Set FOOTBALL_DATA_TOKEN or run `pitchside --set-token`."
                            .to_string(),
                    )
                })?;
                (base_url, format!("competitions/{}", competition), Some(token))
            }
        };

        let base = Url::parse(base_url.trim_end_matches('/'))
            .map_err(|e| FeedError::Config(format!("Invalid API base URL {}: {}", base_url, e)))?;

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FeedError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base,
            prefix,
            token,
        })
    }

    /// Absolute URL for a feed, without the query string.
    fn feed_url(&self, feed: &Feed) -> Result<Url, FeedError> {
        let mut url = self.base.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| FeedError::Config(format!("API base URL cannot be a base: {}", self.base)))?;
            segments.pop_if_empty();
            for part in self.prefix.split('/') {
                segments.push(part);
            }
            segments.push(feed.path());
        }
        Ok(url)
    }

    fn auth_headers(&self) -> Result<header::HeaderMap, FeedError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(header::ACCEPT, header::HeaderValue::from_static("application/json"));
        if let Some(ref token) = self.token {
            let value = header::HeaderValue::from_str(token)
                .map_err(|_| FeedError::Config("API token contains invalid characters".to_string()))?;
            headers.insert(AUTH_TOKEN_HEADER, value);
        }
        Ok(headers)
    }
}

#[async_trait]
impl FeedSource for FeedClient {
    async fn fetch(&self, feed: &Feed) -> Result<Snapshot, FeedError> {
        let url = self.feed_url(feed)?;
        let params = feed.params();
        debug!(feed = %feed.key(), url = %url, "Fetching feed");

        let response = self
            .client
            .get(url.clone())
            .headers(self.auth_headers()?)
            .query(&params)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let err = FeedError::from_status(status, &body);
            warn!(feed = %feed.key(), status = status.as_u16(), error = %err, "Upstream rejected request");
            return Err(err);
        }

        let payload = serde_json::from_str(&body)
            .map_err(|e| FeedError::Decode(format!("{} from {}", e, url)))?;
        Ok(Snapshot::new(payload))
    }
}
