//! Input handling for the TUI.
//!
//! Keys are dispatched by view: the browse view drives the tabs, list and
//! category chips; the detail view drives the reader.

use crate::app::{App, AppEvent, View};
use crate::feed::{DetailView, ScreenKind};
use crossterm::event::{KeyCode, KeyModifiers};
use tokio::sync::mpsc;

use super::helpers::spawn_detail_load;
use super::reader::refresh_detail_lines;
use super::Action;

/// Main input dispatch function.
pub(super) fn handle_input(
    app: &mut App,
    code: KeyCode,
    modifiers: KeyModifiers,
    event_tx: &mpsc::Sender<AppEvent>,
) -> Action {
    if modifiers.contains(KeyModifiers::CONTROL) && code == KeyCode::Char('c') {
        return Action::Quit;
    }

    match code {
        KeyCode::Char('q') => return Action::Quit,
        KeyCode::Char('t') => {
            let name = app.cycle_theme();
            // Cached reader lines carry the old palette's styles
            refresh_detail_lines(app);
            app.set_status(format!("Theme: {}", name));
            return Action::Continue;
        }
        _ => {}
    }

    match app.view {
        View::Browse => handle_browse_input(app, code, event_tx),
        View::Detail => handle_detail_input(app, code, modifiers, event_tx),
    }
    Action::Continue
}

fn handle_browse_input(app: &mut App, code: KeyCode, event_tx: &mpsc::Sender<AppEvent>) {
    match code {
        KeyCode::Tab | KeyCode::BackTab => app.next_tab(),
        KeyCode::Char('1') => app.switch_tab(ScreenKind::Popular),
        KeyCode::Char('2') => app.switch_tab(ScreenKind::Latest),
        KeyCode::Char('j') | KeyCode::Down => app.nav_down(),
        KeyCode::Char('k') | KeyCode::Up => app.nav_up(),
        KeyCode::Enter => match app.selected_item() {
            Some(item) => {
                let slug = item.slug.clone();
                spawn_detail_load(app, slug, event_tx);
            }
            None => app.set_status("Nothing to open"),
        },
        KeyCode::Char('r') => {
            app.refresh_current();
            app.set_status("Refreshing...");
        }
        KeyCode::Char(']') | KeyCode::Char('[') => {
            let forward = code == KeyCode::Char(']');
            match app.cycle_category(forward) {
                Some(name) => app.set_status(format!("Category: {}", name)),
                None if app.tab == ScreenKind::Popular => {
                    app.set_status("Categories are available on the Latest tab")
                }
                None => {}
            }
        }
        _ => {}
    }
}

fn handle_detail_input(
    app: &mut App,
    code: KeyCode,
    modifiers: KeyModifiers,
    event_tx: &mpsc::Sender<AppEvent>,
) {
    let page = app.reader_visible_lines.max(1);
    match code {
        KeyCode::Char('b') | KeyCode::Esc | KeyCode::Backspace => app.exit_detail(),
        KeyCode::Char('j') | KeyCode::Down => app.scroll_down(1),
        KeyCode::Char('k') | KeyCode::Up => app.scroll_up(1),
        KeyCode::Char('d') if modifiers.contains(KeyModifiers::CONTROL) => app.scroll_down(page / 2),
        KeyCode::Char('u') if modifiers.contains(KeyModifiers::CONTROL) => app.scroll_up(page / 2),
        KeyCode::PageDown | KeyCode::Char(' ') => app.scroll_down(page),
        KeyCode::PageUp => app.scroll_up(page),
        KeyCode::Char('g') | KeyCode::Home => app.scroll_offset = 0,
        // Clamped to the content on the next render
        KeyCode::Char('G') | KeyCode::End => app.scroll_offset = crate::app::MAX_SCROLL,
        KeyCode::Char('r') => {
            if app.detail.is_retryable() {
                if let Some(slug) = app.detail_slug.clone() {
                    spawn_detail_load(app, slug, event_tx);
                }
            }
        }
        KeyCode::Char('s') => match app.share_current() {
            Some(text) => app.set_status(format!("Share: {}", text)),
            None if matches!(app.detail, DetailView::Loading) => {
                app.set_status("Still loading, nothing to share yet")
            }
            None => app.set_status("Nothing to share"),
        },
        _ => {}
    }
}
