//! Background task event processing.

use crate::app::{App, AppEvent};

use super::reader::refresh_detail_lines;

pub(super) fn handle_app_event(app: &mut App, event: AppEvent) {
    match event {
        AppEvent::DetailLoaded {
            slug,
            generation,
            view,
        } => {
            if app.apply_detail(&slug, generation, view) {
                // Parse markdown once and cache the rendered lines
                refresh_detail_lines(app);
            }
        }
    }
}
