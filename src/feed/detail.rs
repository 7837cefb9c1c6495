//! Detail screen state for a single news record.

use crate::api::{ErrorKind, FeedSource, NewsDetail};
use chrono::{DateTime, Utc};

/// Shown in place of a publication date the record does not carry.
pub const DATE_NOT_SPECIFIED: &str = "Date not specified";

#[derive(Debug, Clone, PartialEq)]
pub enum DetailView {
    Loading,
    Ready(Box<NewsDetail>),
    /// The slug does not resolve. The UI offers "back to list", not retry.
    NotFound { slug: String },
    /// Any other failure. The UI offers retry.
    Failed { message: String },
}

impl DetailView {
    pub fn title(&self) -> Option<&str> {
        match self {
            Self::Ready(detail) => Some(&detail.title),
            _ => None,
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// Fetch one record and fold the outcome into a view state.
pub async fn load_detail<S: FeedSource + ?Sized>(source: &S, slug: &str) -> DetailView {
    match source.get_feed_item(slug).await {
        Ok(detail) => {
            tracing::debug!(slug = %slug, id = detail.id, "Loaded news detail");
            DetailView::Ready(Box::new(detail))
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::info!(slug = %slug, "News item not found");
            DetailView::NotFound {
                slug: slug.to_string(),
            }
        }
        Err(e) => {
            tracing::warn!(slug = %slug, error = %e, "Failed to load news detail");
            DetailView::Failed {
                message: e.user_message(),
            }
        }
    }
}

/// Text handed to the share action.
pub fn share_text(detail: &NewsDetail) -> String {
    format!("{} - {}", detail.title, detail.description)
}

/// `dd.mm.yyyy`, as shown on list cards.
pub fn format_published_short(published_at: Option<&DateTime<Utc>>) -> String {
    match published_at {
        Some(dt) => dt.format("%d.%m.%Y").to_string(),
        None => DATE_NOT_SPECIFIED.to_string(),
    }
}

/// `dd Month yyyy, HH:MM`, as shown in the detail header.
pub fn format_published_long(published_at: Option<&DateTime<Utc>>) -> String {
    match published_at {
        Some(dt) => dt.format("%d %B %Y, %H:%M").to_string(),
        None => DATE_NOT_SPECIFIED.to_string(),
    }
}
