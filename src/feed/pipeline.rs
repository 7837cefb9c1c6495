//! Pure transformations from raw fetch output to a renderable feed.
//!
//! Every trigger site (mount, retry, pull-to-refresh, poll) goes through
//! [`build_feed`], so the two screen orderings are defined exactly once.

use crate::api::NewsItem;
use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use std::collections::HashSet;

/// Category selection sentinel meaning "no filter".
pub const ALL_CATEGORIES: &str = "All";

/// Which ordering a feed screen uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScreenKind {
    /// Popularity first: views, then featured, then recency.
    Popular,
    /// Recency only, with a category filter.
    Latest,
}

impl ScreenKind {
    pub fn title(self) -> &'static str {
        match self {
            Self::Popular => "Popular",
            Self::Latest => "Latest",
        }
    }
}

/// Keep only items whose status is `published`, preserving relative order.
pub fn select_published(mut items: Vec<NewsItem>) -> Vec<NewsItem> {
    items.retain(|item| item.status.is_published());
    items
}

/// Newest first; an item without a date sorts after every item that has one.
pub fn compare_published_desc(a: Option<&DateTime<Utc>>, b: Option<&DateTime<Utc>>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.cmp(a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Comparator of the Popular screen.
///
/// Evaluated top to bottom, first non-equal result wins:
/// 1. `views_count` descending
/// 2. `is_featured` descending (featured first)
/// 3. `published_at` descending, missing dates last
pub fn primary_order(a: &NewsItem, b: &NewsItem) -> Ordering {
    b.views_count
        .cmp(&a.views_count)
        .then_with(|| b.is_featured.cmp(&a.is_featured))
        .then_with(|| recency_order(a, b))
}

/// Comparator of the Latest screen: `published_at` descending, missing dates last.
pub fn recency_order(a: &NewsItem, b: &NewsItem) -> Ordering {
    compare_published_desc(a.published_at.as_ref(), b.published_at.as_ref())
}

/// Sort by [`primary_order`]. Stable: full ties keep input order.
pub fn sort_primary(mut items: Vec<NewsItem>) -> Vec<NewsItem> {
    items.sort_by(primary_order);
    items
}

/// Sort by [`recency_order`] alone. Stable: full ties keep input order.
pub fn sort_secondary(mut items: Vec<NewsItem>) -> Vec<NewsItem> {
    items.sort_by(recency_order);
    items
}

/// Select published items and apply the screen's ordering.
pub fn build_feed(kind: ScreenKind, raw: Vec<NewsItem>) -> Vec<NewsItem> {
    let published = select_published(raw);
    match kind {
        ScreenKind::Popular => sort_primary(published),
        ScreenKind::Latest => sort_secondary(published),
    }
}

/// Map a user selection to a filter value. The sentinel and empty string mean "no filter".
pub fn normalize_category(selection: Option<&str>) -> Option<&str> {
    selection.filter(|s| !s.is_empty() && *s != ALL_CATEGORIES)
}

/// Whether `item` passes the category selection (exact, case-sensitive match).
pub fn matches_category(item: &NewsItem, selection: Option<&str>) -> bool {
    match normalize_category(selection) {
        None => true,
        Some(category) => item.category_name == category,
    }
}

/// Keep items in `category`; `None` or [`ALL_CATEGORIES`] keeps everything.
pub fn filter_by_category(mut items: Vec<NewsItem>, category: Option<&str>) -> Vec<NewsItem> {
    if normalize_category(category).is_some() {
        items.retain(|item| matches_category(item, category));
    }
    items
}

/// Category names in first-seen order, led by the [`ALL_CATEGORIES`] sentinel.
///
/// Empty names and a literal "All" category are skipped so the sentinel
/// appears exactly once.
pub fn distinct_categories(items: &[NewsItem]) -> Vec<String> {
    let mut seen: HashSet<&str> = HashSet::with_capacity(items.len());
    let mut categories = vec![ALL_CATEGORIES.to_string()];
    for item in items {
        let name = item.category_name.as_str();
        if name.is_empty() || name == ALL_CATEGORIES {
            continue;
        }
        if seen.insert(name) {
            categories.push(name.to_string());
        }
    }
    categories
}
