//! Integration tests for mounted screens against a mock HTTP server.
//!
//! Each test starts its own wiremock server and drives a real `FeedClient`
//! through `ScreenHandle`, so the fetch, pipeline and actor are exercised
//! together. Time is real; waits are bounded by `WAIT`.

use newsfeed::api::{FeedClient, DEFAULT_TIMEOUT};
use newsfeed::feed::{
    load_detail, DetailView, FeedView, Phase, ScreenHandle, ScreenKind, ScreenSettings,
};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const WAIT: Duration = Duration::from_secs(5);

const FEED_JSON: &str = r#"[
    {"id": 1, "title": "Old", "slug": "old", "status": "published",
     "published_at": "2024-01-01T08:00:00Z", "views_count": 3, "category_name": "Tech"},
    {"id": 2, "title": "Hidden", "slug": "hidden", "status": "draft",
     "published_at": "2024-06-01T08:00:00Z", "views_count": 900, "category_name": "Tech"},
    {"id": 3, "title": "New", "slug": "new", "status": "published",
     "published_at": "2024-03-01T08:00:00Z", "views_count": 1, "category_name": "Sports"},
    {"id": 4, "title": "Undated", "slug": "undated", "status": "published",
     "published_at": null, "views_count": 10, "is_featured": true, "category_name": "Tech"}
]"#;

const DETAIL_JSON: &str = r#"{
    "id": 3, "title": "New", "slug": "new", "description": "Fresh", "content": "Body",
    "status": "published", "published_at": "2024-03-01T08:00:00Z",
    "author": {"id": 7, "name": "Ann"}, "category": {"id": 2, "name": "Sports"}
}"#;

fn client_for(server: &MockServer) -> Arc<FeedClient> {
    Arc::new(FeedClient::new(&format!("{}/api/guest", server.uri()), DEFAULT_TIMEOUT).unwrap())
}

fn manual_only() -> ScreenSettings {
    ScreenSettings {
        poll_interval: None,
        skip_overlapping_polls: false,
    }
}

async fn feed_server() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/guest/news-feeds"))
        .respond_with(ResponseTemplate::new(200).set_body_string(FEED_JSON))
        .mount(&server)
        .await;
    server
}

async fn wait_until(
    rx: &mut watch::Receiver<FeedView>,
    pred: impl Fn(&FeedView) -> bool,
) -> FeedView {
    tokio::time::timeout(WAIT, async {
        loop {
            {
                let view = rx.borrow_and_update();
                if pred(&view) {
                    return view.clone();
                }
            }
            rx.changed().await.unwrap();
        }
    })
    .await
    .expect("screen did not reach the expected state in time")
}

fn slugs(view: &FeedView) -> Vec<&str> {
    view.visible().iter().map(|i| i.slug.as_str()).collect()
}

// ============================================================================
// Mount
// ============================================================================

#[tokio::test]
async fn test_latest_screen_shows_published_newest_first() {
    let server = feed_server().await;
    let screen = ScreenHandle::mount(ScreenKind::Latest, client_for(&server), manual_only());
    let mut rx = screen.subscribe();

    let view = wait_until(&mut rx, |v| v.has_loaded()).await;
    assert_eq!(view.phase, Phase::Idle);
    assert_eq!(slugs(&view), vec!["new", "old", "undated"]);
    assert_eq!(*view.categories, vec!["All", "Sports", "Tech"]);
}

#[tokio::test]
async fn test_popular_screen_headline() {
    let server = feed_server().await;
    let screen = ScreenHandle::mount(ScreenKind::Popular, client_for(&server), manual_only());
    let mut rx = screen.subscribe();

    let view = wait_until(&mut rx, |v| v.has_loaded()).await;
    let (headline, rest) = view.headline().unwrap();
    assert_eq!(headline.slug, "undated");
    let rest: Vec<&str> = rest.iter().map(|i| i.slug.as_str()).collect();
    assert_eq!(rest, vec!["old", "new"]);
}

#[tokio::test]
async fn test_imperfect_records_do_not_hide_the_feed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/guest/news-feeds"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"[
                {"id": 1, "slug": "kept", "status": "published",
                 "published_at": "2024-02-01T08:00:00Z", "views_count": null, "is_featured": null},
                {"id": 2, "slug": null, "status": "draft", "views_count": 50},
                {"id": 3, "slug": "also-kept", "status": "published",
                 "published_at": "2024-01-01T08:00:00Z"}
            ]"#,
        ))
        .mount(&server)
        .await;

    let screen = ScreenHandle::mount(ScreenKind::Latest, client_for(&server), manual_only());
    let mut rx = screen.subscribe();

    let view = wait_until(&mut rx, |v| v.phase != Phase::Loading).await;
    assert_eq!(view.phase, Phase::Idle);
    assert_eq!(view.error, None);
    assert_eq!(slugs(&view), vec!["kept", "also-kept"]);
}

// ============================================================================
// Failure and Retry
// ============================================================================

#[tokio::test]
async fn test_server_error_then_retry() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/guest/news-feeds"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/guest/news-feeds"))
        .respond_with(ResponseTemplate::new(200).set_body_string(FEED_JSON))
        .mount(&server)
        .await;

    let screen = ScreenHandle::mount(ScreenKind::Latest, client_for(&server), manual_only());
    let mut rx = screen.subscribe();

    let view = wait_until(&mut rx, |v| v.phase == Phase::Error).await;
    assert_eq!(
        view.error.as_deref(),
        Some("Failed to load news: HTTP error: status 500")
    );
    assert!(view.items.is_empty());

    screen.retry();
    let view = wait_until(&mut rx, |v| v.has_loaded()).await;
    assert_eq!(view.error, None);
    assert_eq!(view.items.len(), 3);
}

#[tokio::test]
async fn test_malformed_body_keeps_previous_list() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/guest/news-feeds"))
        .respond_with(ResponseTemplate::new(200).set_body_string(FEED_JSON))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/guest/news-feeds"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"items": []}"#))
        .mount(&server)
        .await;

    let screen = ScreenHandle::mount(ScreenKind::Latest, client_for(&server), manual_only());
    let mut rx = screen.subscribe();
    wait_until(&mut rx, |v| v.has_loaded()).await;

    screen.refresh();
    let view = wait_until(&mut rx, |v| v.phase == Phase::Error).await;
    assert_eq!(view.error.as_deref(), Some("Invalid data format"));
    assert_eq!(view.items.len(), 3);
    assert_eq!(view.revision, 1);
}

// ============================================================================
// Polling
// ============================================================================

#[tokio::test]
async fn test_polling_refetches_and_keeps_category() {
    let server = feed_server().await;
    let settings = ScreenSettings {
        poll_interval: Some(Duration::from_millis(100)),
        skip_overlapping_polls: false,
    };
    let screen = ScreenHandle::mount(ScreenKind::Latest, client_for(&server), settings);
    let mut rx = screen.subscribe();
    wait_until(&mut rx, |v| v.has_loaded()).await;

    screen.select_category(Some("Tech"));
    let view = wait_until(&mut rx, |v| v.revision >= 3).await;
    assert_eq!(view.selected_category.as_deref(), Some("Tech"));
    assert_eq!(slugs(&view), vec!["old", "undated"]);

    let requests = server.received_requests().await.unwrap();
    assert!(requests.len() >= 3);
}

#[tokio::test]
async fn test_unmount_stops_polling() {
    let server = feed_server().await;
    let settings = ScreenSettings {
        poll_interval: Some(Duration::from_millis(50)),
        skip_overlapping_polls: false,
    };
    let mut screen = ScreenHandle::mount(ScreenKind::Latest, client_for(&server), settings);
    let mut rx = screen.subscribe();
    wait_until(&mut rx, |v| v.revision >= 2).await;

    screen.unmount().await;
    let before = server.received_requests().await.unwrap().len();
    tokio::time::sleep(Duration::from_millis(300)).await;
    let after = server.received_requests().await.unwrap().len();
    assert_eq!(before, after);
}

// ============================================================================
// Detail
// ============================================================================

#[tokio::test]
async fn test_detail_ready_and_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/guest/news-feeds/new"))
        .respond_with(ResponseTemplate::new(200).set_body_string(DETAIL_JSON))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/guest/news-feeds/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let client = client_for(&server);

    match load_detail(&*client, "new").await {
        DetailView::Ready(detail) => {
            assert_eq!(detail.title, "New");
            assert_eq!(detail.author_name(), "Ann");
            assert_eq!(detail.category_name(), "Sports");
        }
        other => panic!("expected a ready detail, got {:?}", other),
    }

    assert_eq!(
        load_detail(&*client, "missing").await,
        DetailView::NotFound {
            slug: "missing".to_string()
        }
    );
}

#[tokio::test]
async fn test_detail_server_error_is_retryable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/guest/news-feeds/new"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let view = load_detail(&*client_for(&server), "new").await;
    assert!(view.is_retryable());
    assert_eq!(
        view,
        DetailView::Failed {
            message: "Failed to load news: HTTP error: status 502".to_string()
        }
    );
}
