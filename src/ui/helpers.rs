//! Background task spawning shared by the input handlers.

use crate::app::{App, AppEvent};
use crate::feed::DetailView;
use crate::util::catch_task_panic;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Open the detail view for `slug` and load it in the background.
///
/// The result comes back as [`AppEvent::DetailLoaded`] tagged with the load
/// generation, so a result for a record the user already left is dropped.
pub(super) fn spawn_detail_load(app: &mut App, slug: String, event_tx: &mpsc::Sender<AppEvent>) {
    let generation = app.begin_detail(slug.clone());
    let loader = Arc::clone(&app.detail_loader);
    let tx = event_tx.clone();

    tracing::debug!(slug = %slug, generation, "Spawning detail load");

    app.detail_handle = Some(tokio::spawn(async move {
        let view = match catch_task_panic(loader(slug.clone())).await {
            Ok(view) => view,
            Err(error) => {
                tracing::error!(slug = %slug, error = %error, "Detail load panicked");
                DetailView::Failed {
                    message: "Failed to load news: internal error".to_string(),
                }
            }
        };
        let event = AppEvent::DetailLoaded {
            slug,
            generation,
            view,
        };
        if let Err(e) = tx.send(event).await {
            tracing::warn!(error = %e, "Failed to send detail result (receiver dropped)");
        }
    }));
}
