use crate::api::NewsItem;
use crate::app::App;
use crate::feed::{format_published_short, FeedView, Phase, ScreenKind};
use crate::theme::ColorPalette;
use crate::util::{single_line, truncate_to_width};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use super::spinner;

/// Render the active screen's list, or its loading/error/empty state.
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    if area.width < 3 || area.height < 3 {
        return;
    }

    let view = app.current_view();
    let palette = &app.palette;
    let title = match view.phase {
        Phase::Loading if view.has_loaded() => format!(" {} (refreshing) ", view.kind.title()),
        _ => format!(" {} ", view.kind.title()),
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(palette.panel_border)
        .title(title);

    let visible = view.visible();

    if visible.is_empty() {
        let lines = empty_state(view, palette, app.spinner_frame);
        let paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: true });
        f.render_widget(paragraph, area);
        return;
    }

    // A failed reload keeps the previous list and shows the error above it
    let list_area = match (&view.error, view.phase) {
        (Some(error), Phase::Error) => {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Length(1), Constraint::Min(0)])
                .split(area);
            let banner = format!("{} [r] retry", single_line(error));
            let banner = truncate_to_width(&banner, chunks[0].width as usize).into_owned();
            f.render_widget(Paragraph::new(Span::styled(banner, palette.error)), chunks[0]);
            chunks[1]
        }
        _ => area,
    };

    // Room for the badge and borders
    let width = list_area.width.saturating_sub(4) as usize;
    let selected = app.selected_index();
    let items: Vec<ListItem> = visible
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let is_headline = view.kind == ScreenKind::Popular && i == 0;
            news_item(item, is_headline, i == selected, width, palette)
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default());
    let mut state = ListState::default().with_selected(Some(selected));
    f.render_stateful_widget(list, list_area, &mut state);
}

fn empty_state(view: &FeedView, palette: &ColorPalette, frame: usize) -> Vec<Line<'static>> {
    match (view.phase, &view.error) {
        (Phase::Error, Some(error)) => vec![
            Line::from(Span::styled(single_line(error), palette.error)),
            Line::from(""),
            Line::from("[r] Retry"),
        ],
        (Phase::Loading, _) if !view.has_loaded() => vec![Line::from(Span::styled(
            format!("{} Loading news...", spinner(frame)),
            palette.loading,
        ))],
        _ => match &view.selected_category {
            Some(category) => vec![Line::from(format!(
                "No news in \"{}\"",
                single_line(category)
            ))],
            None => vec![Line::from("No news yet")],
        },
    }
}

/// One card: title line, optional description for the headline, meta line.
fn news_item(
    item: &NewsItem,
    is_headline: bool,
    is_selected: bool,
    width: usize,
    palette: &ColorPalette,
) -> ListItem<'static> {
    let title_style = if is_selected {
        palette.item_selected
    } else if is_headline {
        palette.headline_title
    } else {
        palette.item_title
    };

    let mut title_spans = Vec::with_capacity(2);
    if item.is_highlighted() {
        title_spans.push(Span::styled("★ ", palette.badge));
    }
    let title = single_line(&item.title);
    title_spans.push(Span::styled(
        truncate_to_width(&title, width).into_owned(),
        title_style,
    ));

    let mut lines = vec![Line::from(title_spans)];
    if is_headline && !item.description.is_empty() {
        let description = single_line(&item.description);
        lines.push(Line::from(Span::styled(
            truncate_to_width(&description, width).into_owned(),
            palette.reader_emphasis,
        )));
    }
    lines.push(Line::from(Span::styled(
        truncate_to_width(&meta_line(item), width).into_owned(),
        palette.item_meta,
    )));
    if is_headline {
        lines.push(Line::from(""));
    }
    ListItem::new(lines)
}

/// `dd.mm.yyyy · Category · Author · N views`, skipping empty parts.
pub fn meta_line(item: &NewsItem) -> String {
    let mut parts = vec![format_published_short(item.published_at.as_ref())];
    for part in [&item.category_name, &item.author_name] {
        if !part.is_empty() {
            parts.push(single_line(part));
        }
    }
    if item.views_count > 0 {
        parts.push(format!("{} views", item.views_count));
    }
    parts.join(" · ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::NewsStatus;
    use chrono::{TimeZone, Utc};

    fn item() -> NewsItem {
        NewsItem {
            id: 1,
            title: "Title".to_string(),
            slug: "title".to_string(),
            description: String::new(),
            status: NewsStatus::Published,
            published_at: Some(Utc.with_ymd_and_hms(2024, 11, 2, 9, 0, 0).unwrap()),
            is_featured: false,
            views_count: 0,
            category_name: String::new(),
            author_name: String::new(),
            image: None,
        }
    }

    #[test]
    fn test_meta_line_skips_empty_parts() {
        assert_eq!(meta_line(&item()), "02.11.2024");

        let mut full = item();
        full.category_name = "Sports".to_string();
        full.author_name = "Ivan".to_string();
        full.views_count = 12;
        assert_eq!(meta_line(&full), "02.11.2024 · Sports · Ivan · 12 views");
    }

    #[test]
    fn test_meta_line_without_date() {
        let mut undated = item();
        undated.published_at = None;
        assert_eq!(meta_line(&undated), "Date not specified");
    }
}
