use crate::api::{FeedSource, NewsItem};
use crate::config::Config;
use crate::feed::{
    load_detail, normalize_category, share_text, DetailView, FeedView, Phase, ScreenHandle,
    ScreenKind, ALL_CATEGORIES,
};
use crate::theme::{ColorPalette, ThemeVariant};
use futures::future::BoxFuture;
use futures::FutureExt;
use ratatui::text::Line;
use std::borrow::Cow;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Maximum scroll offset for the reader view (ratatui u16 limit).
pub const MAX_SCROLL: usize = u16::MAX as usize;

/// How long a status message stays visible.
const STATUS_TTL: Duration = Duration::from_secs(3);

// ============================================================================
// View and Event Types
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// Tab bar plus the current screen's list.
    Browse,
    /// Full-screen reader for one record.
    Detail,
}

/// Fetches one record by slug and folds the outcome into a [`DetailView`].
///
/// Type-erased so `App` does not carry the source's type parameter.
pub type DetailLoader = Arc<dyn Fn(String) -> BoxFuture<'static, DetailView> + Send + Sync>;

pub fn detail_loader<S: FeedSource>(source: Arc<S>) -> DetailLoader {
    Arc::new(move |slug: String| {
        let source = Arc::clone(&source);
        async move { load_detail(&*source, &slug).await }.boxed()
    })
}

/// Events from background tasks
pub enum AppEvent {
    /// A detail load finished. Applied only if `generation` is still current.
    DetailLoaded {
        slug: String,
        generation: u64,
        view: DetailView,
    },
}

// ============================================================================
// Application State
// ============================================================================

/// Central application state
pub struct App {
    // Screens
    pub popular: ScreenHandle,
    pub latest: ScreenHandle,
    /// Last snapshot received from each screen.
    pub popular_view: FeedView,
    pub latest_view: FeedView,

    // UI State
    pub tab: ScreenKind,
    pub view: View,
    pub selected_popular: usize,
    pub selected_latest: usize,
    pub scroll_offset: usize,
    /// Reader viewport height, updated on render.
    pub reader_visible_lines: usize,

    // Detail
    pub detail_loader: DetailLoader,
    pub detail: DetailView,
    pub detail_slug: Option<String>,
    /// Rendered body of a ready detail, rebuilt when the theme changes.
    pub detail_lines: Vec<Line<'static>>,
    pub detail_generation: u64,
    pub detail_handle: Option<JoinHandle<()>>,

    // Theme
    pub theme_variant: ThemeVariant,
    pub palette: ColorPalette,

    // Status message with expiry; Cow avoids allocation for static literals
    pub status_message: Option<(Cow<'static, str>, Instant)>,

    /// Only render when state has changed
    pub needs_redraw: bool,
    pub spinner_frame: usize,
}

impl App {
    /// Mount both screens against `source`. Must be called inside a Tokio runtime.
    pub fn new<S: FeedSource>(source: Arc<S>, config: &Config) -> Self {
        let popular = ScreenHandle::mount(
            ScreenKind::Popular,
            Arc::clone(&source),
            config.screen_settings(ScreenKind::Popular),
        );
        let latest = ScreenHandle::mount(
            ScreenKind::Latest,
            Arc::clone(&source),
            config.screen_settings(ScreenKind::Latest),
        );

        let theme_variant = ThemeVariant::from_str_name(&config.theme).unwrap_or_else(|| {
            tracing::warn!(theme = %config.theme, "Unknown theme, using dark");
            ThemeVariant::Dark
        });

        Self {
            popular_view: popular.view(),
            latest_view: latest.view(),
            popular,
            latest,
            tab: ScreenKind::Popular,
            view: View::Browse,
            selected_popular: 0,
            selected_latest: 0,
            scroll_offset: 0,
            reader_visible_lines: 0,
            detail_loader: detail_loader(source),
            detail: DetailView::Loading,
            detail_slug: None,
            detail_lines: Vec::new(),
            detail_generation: 0,
            detail_handle: None,
            theme_variant,
            palette: theme_variant.palette(),
            status_message: None,
            needs_redraw: true,
            spinner_frame: 0,
        }
    }

    pub fn screen(&self, kind: ScreenKind) -> &ScreenHandle {
        match kind {
            ScreenKind::Popular => &self.popular,
            ScreenKind::Latest => &self.latest,
        }
    }

    pub fn feed_view(&self, kind: ScreenKind) -> &FeedView {
        match kind {
            ScreenKind::Popular => &self.popular_view,
            ScreenKind::Latest => &self.latest_view,
        }
    }

    /// Snapshot of the active tab.
    pub fn current_view(&self) -> &FeedView {
        self.feed_view(self.tab)
    }

    pub fn selected_index(&self) -> usize {
        match self.tab {
            ScreenKind::Popular => self.selected_popular,
            ScreenKind::Latest => self.selected_latest,
        }
    }

    fn selected_index_mut(&mut self) -> &mut usize {
        match self.tab {
            ScreenKind::Popular => &mut self.selected_popular,
            ScreenKind::Latest => &mut self.selected_latest,
        }
    }

    pub fn visible_len(&self) -> usize {
        self.current_view().visible().len()
    }

    pub fn selected_item(&self) -> Option<&NewsItem> {
        self.current_view()
            .visible()
            .get(self.selected_index())
            .copied()
    }

    /// Store a snapshot published by a screen.
    ///
    /// The selection follows the story it was on; if that story is gone it
    /// stays at the same index, clamped to the new list.
    pub fn apply_view(&mut self, view: FeedView) {
        let kind = view.kind;
        let previous = match kind {
            ScreenKind::Popular => self.selected_popular,
            ScreenKind::Latest => self.selected_latest,
        };
        let anchor = self
            .feed_view(kind)
            .visible()
            .get(previous)
            .map(|item| item.slug.clone());
        let index = {
            let visible = view.visible();
            anchor
                .and_then(|slug| visible.iter().position(|item| item.slug == slug))
                .unwrap_or_else(|| previous.min(visible.len().saturating_sub(1)))
        };

        match kind {
            ScreenKind::Popular => {
                self.popular_view = view;
                self.selected_popular = index;
            }
            ScreenKind::Latest => {
                self.latest_view = view;
                self.selected_latest = index;
            }
        }
        self.needs_redraw = true;
    }

    pub fn switch_tab(&mut self, kind: ScreenKind) {
        if self.tab != kind {
            self.tab = kind;
            tracing::debug!(tab = kind.title(), "Switched tab");
        }
    }

    pub fn next_tab(&mut self) {
        let next = match self.tab {
            ScreenKind::Popular => ScreenKind::Latest,
            ScreenKind::Latest => ScreenKind::Popular,
        };
        self.switch_tab(next);
    }

    pub fn nav_up(&mut self) {
        let selected = self.selected_index_mut();
        *selected = selected.saturating_sub(1);
    }

    pub fn nav_down(&mut self) {
        let len = self.visible_len();
        if len == 0 {
            return;
        }
        let selected = self.selected_index_mut();
        *selected = selected.saturating_add(1).min(len - 1);
    }

    /// Reload the active screen; a screen showing an error gets a retry.
    pub fn refresh_current(&mut self) {
        let screen = self.screen(self.tab);
        if self.current_view().phase == Phase::Error {
            screen.retry();
        } else {
            screen.refresh();
        }
    }

    /// Move the Latest screen's category selection. Other tabs have no filter.
    ///
    /// Returns the newly selected category name.
    pub fn cycle_category(&mut self, forward: bool) -> Option<String> {
        if self.tab != ScreenKind::Latest {
            return None;
        }
        let categories = Arc::clone(&self.latest_view.categories);
        if categories.is_empty() {
            return None;
        }

        let current = self
            .latest_view
            .selected_category
            .as_deref()
            .unwrap_or(ALL_CATEGORIES);
        let position = categories.iter().position(|c| c == current).unwrap_or(0);
        let len = categories.len();
        let next = if forward {
            (position + 1) % len
        } else {
            (position + len - 1) % len
        };
        let name = categories[next].clone();

        self.latest.select_category(Some(name.as_str()));
        // Show the choice now; the screen publishes the same value shortly
        self.latest_view.selected_category = normalize_category(Some(name.as_str())).map(str::to_string);
        self.selected_latest = 0;
        Some(name)
    }

    /// Switch to the detail view for `slug` and return the load generation.
    ///
    /// Any previous detail load is aborted; its result would be stale anyway.
    pub fn begin_detail(&mut self, slug: String) -> u64 {
        if let Some(handle) = self.detail_handle.take() {
            handle.abort();
            tracing::debug!("Aborted previous detail load");
        }
        self.detail_generation = self.detail_generation.wrapping_add(1);
        self.detail = DetailView::Loading;
        self.detail_slug = Some(slug);
        self.detail_lines.clear();
        self.view = View::Detail;
        self.scroll_offset = 0;
        self.detail_generation
    }

    /// Apply a finished detail load. Returns false for a stale result.
    pub fn apply_detail(&mut self, slug: &str, generation: u64, view: DetailView) -> bool {
        if generation != self.detail_generation || self.detail_slug.as_deref() != Some(slug) {
            tracing::debug!(
                expected = self.detail_generation,
                got = generation,
                slug = %slug,
                "Ignoring stale detail load"
            );
            return false;
        }
        self.detail_handle = None;
        self.detail = view;
        true
    }

    pub fn exit_detail(&mut self) {
        if let Some(handle) = self.detail_handle.take() {
            handle.abort();
            tracing::debug!("Aborted detail load on exit");
        }
        self.view = View::Browse;
        self.detail = DetailView::Loading;
        self.detail_slug = None;
        self.detail_lines.clear();
        self.scroll_offset = 0;
    }

    /// Share text of the open record, if it has loaded.
    pub fn share_current(&self) -> Option<String> {
        match &self.detail {
            DetailView::Ready(detail) if self.view == View::Detail => Some(share_text(detail)),
            _ => None,
        }
    }

    /// Cycle to the next theme variant and return its name.
    pub fn cycle_theme(&mut self) -> &'static str {
        self.theme_variant = self.theme_variant.next();
        self.palette = self.theme_variant.palette();
        self.needs_redraw = true;
        self.theme_variant.name()
    }

    pub fn scroll_up(&mut self, lines: usize) {
        self.scroll_offset = self.scroll_offset.saturating_sub(lines);
    }

    pub fn scroll_down(&mut self, lines: usize) {
        self.scroll_offset = self.scroll_offset.saturating_add(lines);
    }

    /// Keep the scroll offset inside the content.
    pub fn clamp_scroll(&mut self, content_lines: usize, visible_lines: usize) {
        let max_scroll = content_lines.saturating_sub(visible_lines);
        self.scroll_offset = self.scroll_offset.min(max_scroll).min(MAX_SCROLL);
    }

    /// Set status message (will auto-expire after 3 seconds)
    pub fn set_status(&mut self, msg: impl Into<Cow<'static, str>>) {
        self.status_message = Some((msg.into(), Instant::now()));
    }

    /// Clear status message if expired. Returns true if a message was cleared.
    pub fn clear_expired_status(&mut self) -> bool {
        if let Some((_, time)) = &self.status_message {
            if time.elapsed() >= STATUS_TTL {
                self.status_message = None;
                return true;
            }
        }
        false
    }
}

// ============================================================================
// Resource Cleanup
// ============================================================================

/// Abort the detail load on drop. The screen handles abort their own actors.
impl Drop for App {
    fn drop(&mut self) {
        if let Some(handle) = self.detail_handle.take() {
            handle.abort();
            tracing::debug!("Aborted detail load on App drop");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{FetchError, NewsDetail, NewsStatus};
    use std::future::Future;
    use tokio::time::{self, Duration};

    /// Returns the same list on every call; details resolve for any slug.
    struct StaticSource(Vec<NewsItem>);

    impl FeedSource for StaticSource {
        fn list_feed(
            &self,
        ) -> impl Future<Output = Result<Vec<NewsItem>, FetchError>> + Send + 'static {
            let items = self.0.clone();
            async move { Ok(items) }
        }

        fn get_feed_item(
            &self,
            slug: &str,
        ) -> impl Future<Output = Result<NewsDetail, FetchError>> + Send + 'static {
            let slug = slug.to_string();
            async move { Err(FetchError::NotFound(slug)) }
        }
    }

    fn news(id: i64, category: &str) -> NewsItem {
        NewsItem {
            id,
            title: format!("Story {}", id),
            slug: format!("story-{}", id),
            description: format!("About {}", id),
            status: NewsStatus::Published,
            published_at: None,
            is_featured: false,
            views_count: 0,
            category_name: category.to_string(),
            author_name: String::new(),
            image: None,
        }
    }

    fn view_of(kind: ScreenKind, items: Vec<NewsItem>) -> FeedView {
        let categories = crate::feed::distinct_categories(&items);
        FeedView {
            kind,
            phase: Phase::Idle,
            items: Arc::new(items),
            categories: Arc::new(categories),
            selected_category: None,
            error: None,
            revision: 1,
        }
    }

    fn ready(slug: &str) -> DetailView {
        DetailView::Ready(Box::new(NewsDetail {
            id: 1,
            title: "Title".to_string(),
            slug: slug.to_string(),
            description: "Desc".to_string(),
            content: String::new(),
            status: NewsStatus::Published,
            published_at: None,
            image: None,
            is_featured: false,
            views_count: 0,
            meta_title: None,
            meta_description: None,
            author: None,
            category: None,
        }))
    }

    fn test_app() -> App {
        App::new(Arc::new(StaticSource(Vec::new())), &Config::default())
    }

    #[tokio::test]
    async fn test_new_app_defaults() {
        let app = test_app();
        assert_eq!(app.tab, ScreenKind::Popular);
        assert_eq!(app.view, View::Browse);
        assert_eq!(app.theme_variant, ThemeVariant::Dark);
        assert!(app.selected_item().is_none());
    }

    #[tokio::test]
    async fn test_theme_from_config() {
        let config = Config {
            theme: "light".to_string(),
            ..Config::default()
        };
        let app = App::new(Arc::new(StaticSource(Vec::new())), &config);
        assert_eq!(app.theme_variant, ThemeVariant::Light);

        let config = Config {
            theme: "neon".to_string(),
            ..Config::default()
        };
        let app = App::new(Arc::new(StaticSource(Vec::new())), &config);
        assert_eq!(app.theme_variant, ThemeVariant::Dark);
    }

    #[tokio::test]
    async fn test_nav_saturates_at_both_ends() {
        let mut app = test_app();
        app.apply_view(view_of(ScreenKind::Popular, vec![news(1, ""), news(2, "")]));

        app.nav_up();
        assert_eq!(app.selected_popular, 0);
        app.nav_down();
        app.nav_down();
        app.nav_down();
        assert_eq!(app.selected_popular, 1);
        assert_eq!(app.selected_item().map(|i| i.id), Some(2));
    }

    #[tokio::test]
    async fn test_nav_on_empty_list() {
        let mut app = test_app();
        app.nav_down();
        assert_eq!(app.selected_index(), 0);
    }

    #[tokio::test]
    async fn test_apply_view_clamps_selection() {
        let mut app = test_app();
        app.apply_view(view_of(
            ScreenKind::Latest,
            vec![news(1, ""), news(2, ""), news(3, "")],
        ));
        app.switch_tab(ScreenKind::Latest);
        app.nav_down();
        app.nav_down();
        assert_eq!(app.selected_latest, 2);

        app.apply_view(view_of(ScreenKind::Latest, vec![news(1, "")]));
        assert_eq!(app.selected_latest, 0);
    }

    #[tokio::test]
    async fn test_reload_keeps_selected_story() {
        let mut app = test_app();
        app.apply_view(view_of(
            ScreenKind::Popular,
            vec![news(1, ""), news(2, ""), news(3, "")],
        ));
        app.nav_down();
        assert_eq!(app.selected_item().map(|i| i.id), Some(2));

        // A new story lands on top and pushes the rest down
        app.apply_view(view_of(
            ScreenKind::Popular,
            vec![news(9, ""), news(1, ""), news(2, ""), news(3, "")],
        ));
        assert_eq!(app.selected_popular, 2);
        assert_eq!(app.selected_item().map(|i| i.id), Some(2));

        // Once the story is gone the index is kept
        app.apply_view(view_of(
            ScreenKind::Popular,
            vec![news(9, ""), news(1, ""), news(3, "")],
        ));
        assert_eq!(app.selected_popular, 2);
        assert_eq!(app.selected_item().map(|i| i.id), Some(3));
    }

    #[tokio::test]
    async fn test_tabs_keep_their_own_selection() {
        let mut app = test_app();
        app.apply_view(view_of(ScreenKind::Popular, vec![news(1, ""), news(2, "")]));
        app.apply_view(view_of(ScreenKind::Latest, vec![news(3, ""), news(4, "")]));

        app.nav_down();
        app.next_tab();
        assert_eq!(app.tab, ScreenKind::Latest);
        assert_eq!(app.selected_item().map(|i| i.id), Some(3));
        app.next_tab();
        assert_eq!(app.selected_item().map(|i| i.id), Some(2));
    }

    #[tokio::test]
    async fn test_cycle_category_wraps() {
        let mut app = test_app();
        app.apply_view(view_of(
            ScreenKind::Latest,
            vec![news(1, "Tech"), news(2, "Sports")],
        ));

        // Popular has no category filter
        assert_eq!(app.cycle_category(true), None);

        app.switch_tab(ScreenKind::Latest);
        assert_eq!(app.cycle_category(true).as_deref(), Some("Tech"));
        assert_eq!(app.latest_view.selected_category.as_deref(), Some("Tech"));
        assert_eq!(app.visible_len(), 1);
        assert_eq!(app.cycle_category(true).as_deref(), Some("Sports"));
        assert_eq!(app.cycle_category(true).as_deref(), Some("All"));
        assert_eq!(app.latest_view.selected_category, None);
        assert_eq!(app.cycle_category(false).as_deref(), Some("Sports"));
    }

    #[tokio::test]
    async fn test_stale_detail_is_ignored() {
        let mut app = test_app();
        let first = app.begin_detail("a".to_string());
        let second = app.begin_detail("b".to_string());
        assert_ne!(first, second);
        assert_eq!(app.view, View::Detail);

        assert!(!app.apply_detail("a", first, ready("a")));
        assert_eq!(app.detail, DetailView::Loading);
        assert!(app.apply_detail("b", second, ready("b")));
        assert_eq!(app.detail.title(), Some("Title"));
    }

    #[tokio::test]
    async fn test_detail_after_exit_is_ignored() {
        let mut app = test_app();
        let generation = app.begin_detail("a".to_string());
        app.exit_detail();
        assert_eq!(app.view, View::Browse);
        assert!(!app.apply_detail("a", generation, ready("a")));
    }

    #[tokio::test]
    async fn test_share_current() {
        let mut app = test_app();
        assert_eq!(app.share_current(), None);
        let generation = app.begin_detail("a".to_string());
        assert_eq!(app.share_current(), None);
        app.apply_detail("a", generation, ready("a"));
        assert_eq!(app.share_current().as_deref(), Some("Title - Desc"));
    }

    #[tokio::test]
    async fn test_cycle_theme_round_trip() {
        let mut app = test_app();
        assert_eq!(app.cycle_theme(), "Light");
        assert_eq!(app.cycle_theme(), "Dark");
        assert_eq!(app.theme_variant, ThemeVariant::Dark);
    }

    #[tokio::test]
    async fn test_clamp_scroll() {
        let mut app = test_app();
        app.scroll_down(50);
        app.clamp_scroll(30, 10);
        assert_eq!(app.scroll_offset, 20);
        app.clamp_scroll(5, 10);
        assert_eq!(app.scroll_offset, 0);
        app.scroll_up(3);
        assert_eq!(app.scroll_offset, 0);
    }

    #[tokio::test]
    async fn test_status_expires_after_3_seconds() {
        let mut app = test_app();
        time::pause();
        app.set_status("Test message");

        time::advance(Duration::from_secs(2)).await;
        assert!(!app.clear_expired_status());
        assert!(app.status_message.is_some());

        time::advance(Duration::from_secs(2)).await;
        assert!(app.clear_expired_status());
        assert!(app.status_message.is_none());
    }
}
