//! Client for the read-only news-feeds JSON API.
//!
//! Two operations are exposed, both single best-effort GETs:
//!
//! - **List**: `GET {base}/news-feeds` returns every record, published or not
//! - **Detail**: `GET {base}/news-feeds/{slug}` returns one full record
//!
//! Filtering and ordering happen client-side in [`crate::feed`].
//!
//! # Example
//!
//! ```ignore
//! use newsfeed::api::{FeedClient, DEFAULT_TIMEOUT};
//!
//! let client = FeedClient::new("https://news.example.com/api/guest", DEFAULT_TIMEOUT)?;
//! let items = client.list_feed().await?;
//! let detail = client.get_feed_item(&items[0].slug).await?;
//! ```

mod client;
mod types;

pub use client::{
    ErrorKind, FeedClient, FeedSource, FetchError, DEFAULT_BASE_URL, DEFAULT_TIMEOUT,
};
pub use types::{parse_timestamp, NamedRef, NewsDetail, NewsItem, NewsStatus};
