//! Render dispatch for the TUI.

use crate::app::{App, View};
use crate::feed::ScreenKind;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use super::{categories, news_list, reader, status};

/// Minimum terminal dimensions required for normal operation.
pub(super) const MIN_WIDTH: u16 = 40;
pub(super) const MIN_HEIGHT: u16 = 8;

pub(super) fn render(f: &mut Frame, app: &mut App) {
    let area = f.area();
    if area.width < 1 || area.height < 1 {
        return;
    }

    if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
        let msg = if area.height < 3 || area.width < 20 {
            Paragraph::new("Too small")
        } else {
            Paragraph::new(format!(
                "Terminal too small\n\nMinimum: {}x{}\nCurrent: {}x{}",
                MIN_WIDTH, MIN_HEIGHT, area.width, area.height
            ))
            .alignment(Alignment::Center)
        };
        f.render_widget(msg, area);
        return;
    }

    match app.view {
        View::Browse => render_browse(f, app, area),
        View::Detail => render_detail(f, app, area),
    }
}

/// Tabs, the Latest screen's category chips, the list, status bar.
fn render_browse(f: &mut Frame, app: &App, area: Rect) {
    let chip_height = if app.tab == ScreenKind::Latest { 1 } else { 0 };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(chip_height),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(area);

    render_tabs(f, app, chunks[0]);
    if chip_height > 0 {
        categories::render(f, app, chunks[1]);
    }
    news_list::render(f, app, chunks[2]);
    status::render(f, app, chunks[3]);
}

fn render_detail(f: &mut Frame, app: &mut App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(area);

    reader::render(f, app, chunks[0]);
    status::render(f, app, chunks[1]);
}

fn render_tabs(f: &mut Frame, app: &App, area: Rect) {
    let mut spans = Vec::with_capacity(4);
    for (key, kind) in [('1', ScreenKind::Popular), ('2', ScreenKind::Latest)] {
        let style = if app.tab == kind {
            app.palette.tab_active
        } else {
            app.palette.tab_inactive
        };
        spans.push(Span::styled(format!(" {} {} ", key, kind.title()), style));
        spans.push(Span::raw(" "));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}
