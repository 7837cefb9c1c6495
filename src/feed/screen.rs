//! Mounted feed screens.
//!
//! A [`ScreenHandle`] owns one actor task per mounted screen. The actor holds
//! the only mutable copy of the screen state and publishes snapshots through a
//! `watch` channel; the UI only ever reads [`FeedView`] values.
//!
//! ```text
//! ScreenHandle ──Command──▶ actor ──spawn──▶ JoinSet<Completion>
//!      ▲                      │                    │
//!      └──── watch<FeedView> ◀┴──── join_next ◀────┘
//! ```
//!
//! Every load is tagged with a generation number. Only the completion of the
//! most recently issued load is applied; anything older is discarded, so a slow
//! response can never overwrite a newer one.

use super::pipeline::{
    build_feed, distinct_categories, matches_category, normalize_category, ScreenKind,
};
use crate::api::{FeedSource, FetchError, NewsItem};
use crate::util::catch_task_panic;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::{JoinError, JoinHandle, JoinSet};
use tokio::time::{Instant, Interval, MissedTickBehavior};

/// Poll period of the Latest screen unless configured otherwise.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(60);

const COMMAND_BUFFER: usize = 32;

// ============================================================================
// View
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Loading,
    Error,
}

/// What started a load. Only used for logging; every trigger runs the same pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Mount,
    Manual,
    Retry,
    Poll,
}

/// Snapshot of a screen, published after every state change.
#[derive(Debug, Clone)]
pub struct FeedView {
    pub kind: ScreenKind,
    pub phase: Phase,
    /// Published items in screen order, before any category filter.
    pub items: Arc<Vec<NewsItem>>,
    /// Category choices, led by the "All" sentinel.
    pub categories: Arc<Vec<String>>,
    /// `None` means no filter.
    pub selected_category: Option<String>,
    /// User-facing message of the last failed load. Cleared by the next success.
    pub error: Option<String>,
    /// Number of successful loads applied.
    pub revision: u64,
}

impl FeedView {
    fn new(kind: ScreenKind) -> Self {
        Self {
            kind,
            phase: Phase::Loading,
            items: Arc::new(Vec::new()),
            categories: Arc::new(distinct_categories(&[])),
            selected_category: None,
            error: None,
            revision: 0,
        }
    }

    /// Items that pass the selected category, in screen order.
    pub fn visible(&self) -> Vec<&NewsItem> {
        let selection = self.selected_category.as_deref();
        self.items
            .iter()
            .filter(|item| matches_category(item, selection))
            .collect()
    }

    /// First item is the headline, the rest render below it.
    pub fn headline(&self) -> Option<(&NewsItem, &[NewsItem])> {
        self.items.split_first()
    }

    pub fn is_loading(&self) -> bool {
        self.phase == Phase::Loading
    }

    /// Whether any load has succeeded yet.
    pub fn has_loaded(&self) -> bool {
        self.revision > 0
    }
}

// ============================================================================
// Settings
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreenSettings {
    /// `None` disables periodic reloads.
    pub poll_interval: Option<Duration>,
    /// Skip a poll tick while an earlier load is still in flight.
    pub skip_overlapping_polls: bool,
}

impl ScreenSettings {
    /// Defaults per screen: Latest polls every minute, Popular never polls.
    pub fn for_kind(kind: ScreenKind) -> Self {
        let poll_interval = match kind {
            ScreenKind::Popular => None,
            ScreenKind::Latest => Some(DEFAULT_POLL_INTERVAL),
        };
        Self {
            poll_interval,
            skip_overlapping_polls: false,
        }
    }
}

// ============================================================================
// Handle
// ============================================================================

#[derive(Debug)]
enum Command {
    Refresh(Trigger),
    SelectCategory(Option<String>),
    Unmount,
}

/// A mounted screen. Dropping the handle unmounts it.
pub struct ScreenHandle {
    kind: ScreenKind,
    commands: mpsc::Sender<Command>,
    view: watch::Receiver<FeedView>,
    task: Option<JoinHandle<()>>,
}

impl ScreenHandle {
    /// Mount a screen: start the actor, issue the initial load and, if
    /// configured, start the poll timer. Must be called inside a Tokio runtime.
    pub fn mount<S: FeedSource>(kind: ScreenKind, source: Arc<S>, settings: ScreenSettings) -> Self {
        let (commands, command_rx) = mpsc::channel(COMMAND_BUFFER);
        let (view_tx, view) = watch::channel(FeedView::new(kind));

        tracing::debug!(
            screen = kind.title(),
            poll_secs = ?settings.poll_interval.map(|d| d.as_secs()),
            skip_overlapping_polls = settings.skip_overlapping_polls,
            "Mounting feed screen"
        );

        let actor = ScreenActor {
            kind,
            source,
            settings,
            view_tx,
            in_flight: JoinSet::new(),
            latest_issued: 0,
        };
        let task = tokio::spawn(actor.run(command_rx));

        Self {
            kind,
            commands,
            view,
            task: Some(task),
        }
    }

    pub fn kind(&self) -> ScreenKind {
        self.kind
    }

    /// User-initiated reload (pull-to-refresh).
    pub fn refresh(&self) {
        self.send(Command::Refresh(Trigger::Manual));
    }

    /// Reload after an error.
    pub fn retry(&self) {
        self.send(Command::Refresh(Trigger::Retry));
    }

    /// Change the category filter. `None`, `""` and "All" clear it.
    pub fn select_category(&self, category: Option<&str>) {
        let category = normalize_category(category).map(str::to_string);
        self.send(Command::SelectCategory(category));
    }

    /// Current snapshot.
    pub fn view(&self) -> FeedView {
        self.view.borrow().clone()
    }

    /// A receiver that is notified on every published snapshot.
    pub fn subscribe(&self) -> watch::Receiver<FeedView> {
        self.view.clone()
    }

    /// Stop the poll timer and abandon in-flight loads, then wait for the
    /// actor to exit. No view update is published after this returns and
    /// later commands are dropped. Calling it twice is a no-op.
    pub async fn unmount(&mut self) {
        if let Some(task) = self.task.take() {
            if self.commands.try_send(Command::Unmount).is_err() {
                task.abort();
            }
            // Cancellation is the expected outcome when the actor was aborted
            let _ = task.await;
        }
        tracing::debug!(screen = self.kind.title(), "Feed screen unmounted");
    }

    fn send(&self, command: Command) {
        if let Err(e) = self.commands.try_send(command) {
            tracing::warn!(screen = self.kind.title(), error = %e, "Dropped screen command");
        }
    }
}

impl Drop for ScreenHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

// ============================================================================
// Actor
// ============================================================================

enum LoadFailure {
    Fetch(FetchError),
    Panicked(String),
}

impl LoadFailure {
    fn user_message(&self) -> String {
        match self {
            Self::Fetch(e) => e.user_message(),
            Self::Panicked(_) => "Failed to load news: internal error".to_string(),
        }
    }
}

impl fmt::Display for LoadFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fetch(e) => write!(f, "{}", e),
            Self::Panicked(msg) => write!(f, "load task panicked: {}", msg),
        }
    }
}

struct Completion {
    generation: u64,
    trigger: Trigger,
    result: Result<Vec<NewsItem>, LoadFailure>,
}

struct ScreenActor<S> {
    kind: ScreenKind,
    source: Arc<S>,
    settings: ScreenSettings,
    view_tx: watch::Sender<FeedView>,
    in_flight: JoinSet<Completion>,
    latest_issued: u64,
}

impl<S: FeedSource> ScreenActor<S> {
    async fn run(mut self, mut commands: mpsc::Receiver<Command>) {
        self.start_load(Trigger::Mount);

        // First tick fires one full period after mount, not immediately
        let mut ticker = self.settings.poll_interval.and_then(|period| {
            let Some(start) = Instant::now().checked_add(period) else {
                tracing::warn!(
                    screen = self.kind.title(),
                    poll_secs = period.as_secs(),
                    "Poll interval out of range, polling disabled"
                );
                return None;
            };
            let mut ticker = tokio::time::interval_at(start, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            Some(ticker)
        });

        loop {
            tokio::select! {
                biased;

                command = commands.recv() => match command {
                    Some(Command::Refresh(trigger)) => self.start_load(trigger),
                    Some(Command::SelectCategory(category)) => self.select_category(category),
                    Some(Command::Unmount) | None => break,
                },

                Some(joined) = self.in_flight.join_next(), if !self.in_flight.is_empty() => {
                    self.on_joined(joined);
                }

                _ = next_tick(&mut ticker) => self.on_poll(),
            }
        }

        // Abandoned loads must not publish anything
        self.in_flight.abort_all();
    }

    fn on_poll(&mut self) {
        if self.settings.skip_overlapping_polls && !self.in_flight.is_empty() {
            tracing::debug!(
                screen = self.kind.title(),
                in_flight = self.in_flight.len(),
                "Skipping poll, previous load still running"
            );
            return;
        }
        self.start_load(Trigger::Poll);
    }

    fn start_load(&mut self, trigger: Trigger) {
        self.latest_issued += 1;
        let generation = self.latest_issued;

        // Issue the request here so requests start in command order
        let request = self.source.list_feed();
        self.in_flight.spawn(async move {
            let result = match catch_task_panic(request).await {
                Ok(Ok(items)) => Ok(items),
                Ok(Err(e)) => Err(LoadFailure::Fetch(e)),
                Err(panic) => Err(LoadFailure::Panicked(panic)),
            };
            Completion {
                generation,
                trigger,
                result,
            }
        });

        tracing::debug!(
            screen = self.kind.title(),
            generation,
            trigger = ?trigger,
            "Feed load started"
        );
        self.view_tx.send_modify(|view| view.phase = Phase::Loading);
    }

    fn on_joined(&mut self, joined: Result<Completion, JoinError>) {
        match joined {
            Ok(done) => self.apply(done),
            // Panics are caught inside the task, so this is an abort
            Err(e) => tracing::debug!(screen = self.kind.title(), error = %e, "Load task ended early"),
        }
    }

    fn apply(&mut self, done: Completion) {
        if done.generation < self.latest_issued {
            tracing::debug!(
                screen = self.kind.title(),
                generation = done.generation,
                latest = self.latest_issued,
                trigger = ?done.trigger,
                "Discarding superseded feed result"
            );
            return;
        }

        match done.result {
            Ok(raw) => {
                let fetched = raw.len();
                let items = build_feed(self.kind, raw);
                let categories = distinct_categories(&items);
                tracing::info!(
                    screen = self.kind.title(),
                    fetched,
                    published = items.len(),
                    trigger = ?done.trigger,
                    "Feed updated"
                );
                self.view_tx.send_modify(|view| {
                    view.items = Arc::new(items);
                    view.categories = Arc::new(categories);
                    view.phase = Phase::Idle;
                    view.error = None;
                    view.revision += 1;
                });
            }
            Err(failure) => {
                tracing::warn!(
                    screen = self.kind.title(),
                    error = %failure,
                    trigger = ?done.trigger,
                    "Feed load failed"
                );
                // Keep the last good list on screen
                self.view_tx.send_modify(|view| {
                    view.phase = Phase::Error;
                    view.error = Some(failure.user_message());
                });
            }
        }
    }

    fn select_category(&mut self, category: Option<String>) {
        tracing::debug!(screen = self.kind.title(), category = ?category, "Category selected");
        self.view_tx.send_if_modified(|view| {
            if view.selected_category == category {
                return false;
            }
            view.selected_category = category;
            true
        });
    }
}

async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(ticker) => {
            ticker.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}
