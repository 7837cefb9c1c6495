use super::types::{NewsDetail, NewsItem};
use futures::StreamExt;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Base URL used when no configuration overrides it.
pub const DEFAULT_BASE_URL: &str = "http://your-api.ru/api/guest";

/// Collection path under the base URL.
const FEED_PATH: &str = "news-feeds";

const MAX_RESPONSE_SIZE: usize = 10 * 1024 * 1024; // 10MB

/// Default bound on a single request, including the body read.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

// ============================================================================
// Errors
// ============================================================================

/// Errors that can occur while talking to the news-feeds API.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network-level error (DNS, connection, TLS, etc.)
    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),
    /// HTTP response with non-2xx status code
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    /// Request exceeded the configured timeout
    #[error("Request timed out")]
    Timeout,
    /// Response was incomplete (received fewer bytes than Content-Length)
    #[error("Incomplete response: expected {expected} bytes, received {received}")]
    Incomplete { expected: u64, received: usize },
    /// Response body exceeded the 10MB size limit
    #[error("Response too large")]
    ResponseTooLarge,
    /// Body was not the expected JSON shape
    #[error("Parse error: {0}")]
    Parse(String),
    /// Slug did not resolve to a news record
    #[error("News item not found: {0}")]
    NotFound(String),
    /// Base URL cannot be used to build request URLs
    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(String),
}

/// Coarse classification used by the view layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Transport failure or non-2xx response.
    Network,
    /// Body is not the expected JSON shape.
    Parse,
    /// Detail lookup for a slug that does not exist.
    NotFound,
}

impl FetchError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            FetchError::Parse(_) => ErrorKind::Parse,
            FetchError::NotFound(_) => ErrorKind::NotFound,
            FetchError::Network(_)
            | FetchError::HttpStatus(_)
            | FetchError::Timeout
            | FetchError::Incomplete { .. }
            | FetchError::ResponseTooLarge
            | FetchError::InvalidBaseUrl(_) => ErrorKind::Network,
        }
    }

    /// Message shown to the user next to the retry control.
    pub fn user_message(&self) -> String {
        match self.kind() {
            ErrorKind::Parse => "Invalid data format".to_string(),
            ErrorKind::NotFound => "News not found".to_string(),
            ErrorKind::Network => format!("Failed to load news: {}", self),
        }
    }
}

// ============================================================================
// Source abstraction
// ============================================================================

/// Read-only access to the news feed.
///
/// Screen actors are generic over this so tests can drive them without a
/// network. [`FeedClient`] is the production implementation.
///
/// The returned futures own everything they need, so a caller can issue a
/// request, then hand the future to a spawned task.
pub trait FeedSource: Send + Sync + 'static {
    /// Fetch the full, unfiltered feed.
    fn list_feed(
        &self,
    ) -> impl Future<Output = Result<Vec<NewsItem>, FetchError>> + Send + 'static;

    /// Fetch a single record by slug.
    fn get_feed_item(
        &self,
        slug: &str,
    ) -> impl Future<Output = Result<NewsDetail, FetchError>> + Send + 'static;
}

// ============================================================================
// HTTP client
// ============================================================================

/// HTTP client for the news-feeds API.
///
/// Each call is a single attempt: there is no retry, backoff or caching here.
/// Retrying is a user action handled by the screen that owns the data.
#[derive(Debug, Clone)]
pub struct FeedClient {
    http: reqwest::Client,
    base_url: Url,
    timeout: Duration,
}

impl FeedClient {
    /// Build a client with its own connection pool.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder()
            .pool_max_idle_per_host(2)
            .pool_idle_timeout(Duration::from_secs(30))
            .build()?;
        Self::with_client(http, base_url, timeout)
    }

    /// Build a client on top of an existing `reqwest::Client`.
    pub fn with_client(
        http: reqwest::Client,
        base_url: &str,
        timeout: Duration,
    ) -> Result<Self, FetchError> {
        let base_url = validate_base_url(base_url)?;
        Ok(Self {
            http,
            base_url,
            timeout,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `{base}/news-feeds`
    pub fn feed_url(&self) -> Url {
        self.url_with_segments(&[FEED_PATH])
    }

    /// `{base}/news-feeds/{slug}`, with the slug percent-encoded as one segment.
    pub fn item_url(&self, slug: &str) -> Url {
        self.url_with_segments(&[FEED_PATH, slug])
    }

    fn url_with_segments(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // validate_base_url guarantees the URL can be a base
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// Fetch the full feed.
    ///
    /// # Errors
    ///
    /// - [`FetchError::Parse`] if the body is not a JSON array. An object,
    ///   `null`, or malformed JSON is never treated as an empty list.
    ///   Elements that are not valid news records are skipped and logged.
    /// - Transport errors, timeouts and non-2xx statuses as their own variants.
    pub async fn list_feed(&self) -> Result<Vec<NewsItem>, FetchError> {
        let url = self.feed_url();
        let body = self.get_bytes(url.clone()).await.map_err(|e| match e {
            // A missing collection is a server problem, not a missing item
            FetchError::NotFound(_) => FetchError::HttpStatus(404),
            other => other,
        })?;

        let value: serde_json::Value =
            serde_json::from_slice(&body).map_err(|e| FetchError::Parse(e.to_string()))?;
        let records = match value {
            serde_json::Value::Array(records) => records,
            other => {
                tracing::warn!(url = %url, kind = json_kind(&other), "Feed response is not an array");
                return Err(FetchError::Parse(format!(
                    "expected a JSON array, got {}",
                    json_kind(&other)
                )));
            }
        };

        // One bad record must not hide the rest of the feed
        let total = records.len();
        let items: Vec<NewsItem> = records
            .into_iter()
            .enumerate()
            .filter_map(|(index, record)| match serde_json::from_value(record) {
                Ok(item) => Some(item),
                Err(e) => {
                    tracing::warn!(url = %url, index, error = %e, "Skipping malformed news record");
                    None
                }
            })
            .collect();
        tracing::debug!(
            url = %url,
            count = items.len(),
            skipped = total - items.len(),
            "Fetched news feed"
        );
        Ok(items)
    }

    /// Fetch one record by slug.
    ///
    /// # Errors
    ///
    /// - [`FetchError::NotFound`] on HTTP 404 or a `null` body.
    /// - [`FetchError::Parse`] if the body is not a news record object.
    pub async fn get_feed_item(&self, slug: &str) -> Result<NewsDetail, FetchError> {
        let url = self.item_url(slug);
        let body = self.get_bytes(url.clone()).await.map_err(|e| match e {
            FetchError::NotFound(_) => FetchError::NotFound(slug.to_string()),
            other => other,
        })?;

        let value: serde_json::Value =
            serde_json::from_slice(&body).map_err(|e| FetchError::Parse(e.to_string()))?;
        match value {
            serde_json::Value::Null => Err(FetchError::NotFound(slug.to_string())),
            serde_json::Value::Object(_) => {
                serde_json::from_value(value).map_err(|e| FetchError::Parse(e.to_string()))
            }
            other => Err(FetchError::Parse(format!(
                "expected a JSON object, got {}",
                json_kind(&other)
            ))),
        }
    }

    /// Single GET with the configured timeout wrapped around send and body read.
    async fn get_bytes(&self, url: Url) -> Result<Vec<u8>, FetchError> {
        let request = async {
            let response = self.http.get(url.clone()).send().await?;
            let status = response.status();

            if status == reqwest::StatusCode::NOT_FOUND {
                return Err(FetchError::NotFound(url.to_string()));
            }
            if !status.is_success() {
                return Err(FetchError::HttpStatus(status.as_u16()));
            }

            read_limited_bytes(response, MAX_RESPONSE_SIZE).await
        };

        match tokio::time::timeout(self.timeout, request).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(url = %url, timeout_secs = self.timeout.as_secs(), "Request timed out");
                Err(FetchError::Timeout)
            }
        }
    }
}

impl FeedSource for FeedClient {
    fn list_feed(
        &self,
    ) -> impl Future<Output = Result<Vec<NewsItem>, FetchError>> + Send + 'static {
        // reqwest::Client is reference-counted, so the clone is cheap
        let client = self.clone();
        async move { FeedClient::list_feed(&client).await }
    }

    fn get_feed_item(
        &self,
        slug: &str,
    ) -> impl Future<Output = Result<NewsDetail, FetchError>> + Send + 'static {
        let client = self.clone();
        let slug = slug.to_string();
        async move { FeedClient::get_feed_item(&client, &slug).await }
    }
}

fn validate_base_url(raw: &str) -> Result<Url, FetchError> {
    let url = Url::parse(raw.trim()).map_err(|e| FetchError::InvalidBaseUrl(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(FetchError::InvalidBaseUrl(format!(
            "unsupported scheme '{}'",
            url.scheme()
        )));
    }
    if url.cannot_be_a_base() {
        return Err(FetchError::InvalidBaseUrl(raw.to_string()));
    }
    Ok(url)
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

async fn read_limited_bytes(
    response: reqwest::Response,
    limit: usize,
) -> Result<Vec<u8>, FetchError> {
    let expected_length = response.content_length();

    if let Some(len) = expected_length {
        if len > limit as u64 {
            return Err(FetchError::ResponseTooLarge);
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Err(FetchError::ResponseTooLarge);
        }
        bytes.extend_from_slice(&chunk);
    }

    if let Some(expected) = expected_length {
        if (bytes.len() as u64) < expected {
            return Err(FetchError::Incomplete {
                expected,
                received: bytes.len(),
            });
        }
    }

    Ok(bytes)
}
