//! Feed pipeline, mounted screens and detail state.
//!
//! - [`pipeline`] - pure select/sort/filter functions shared by every load
//! - [`screen`] - one actor per mounted list screen, with polling and
//!   stale-result suppression
//! - [`detail`] - single record view state and its display helpers
//!
//! # Example
//!
//! ```ignore
//! use newsfeed::feed::{ScreenHandle, ScreenKind, ScreenSettings};
//!
//! let latest = ScreenHandle::mount(
//!     ScreenKind::Latest,
//!     Arc::new(client),
//!     ScreenSettings::for_kind(ScreenKind::Latest),
//! );
//! latest.select_category(Some("Sports"));
//! let view = latest.view();
//! ```

pub mod detail;
pub mod pipeline;
pub mod screen;

pub use detail::{
    format_published_long, format_published_short, load_detail, share_text, DetailView,
    DATE_NOT_SPECIFIED,
};
pub use pipeline::{
    build_feed, distinct_categories, filter_by_category, matches_category, normalize_category,
    select_published, sort_primary, sort_secondary, ScreenKind, ALL_CATEGORIES,
};
pub use screen::{FeedView, Phase, ScreenHandle, ScreenSettings, Trigger, DEFAULT_POLL_INTERVAL};
