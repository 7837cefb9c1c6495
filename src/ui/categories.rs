use crate::app::App;
use crate::feed::ALL_CATEGORIES;
use crate::util::{display_width, single_line};
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

/// Render the Latest screen's category chips on a single line.
///
/// Chips that do not fit are dropped from the right, but the selected chip is
/// always shown.
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    if area.width < 3 || area.height < 1 {
        return;
    }

    let view = &app.latest_view;
    let selected = view.selected_category.as_deref().unwrap_or(ALL_CATEGORIES);
    let palette = &app.palette;

    let mut spans = Vec::with_capacity(view.categories.len() * 2);
    let mut used = 0usize;
    let budget = area.width as usize;
    for name in view.categories.iter() {
        let is_selected = name == selected;
        let label = format!(" {} ", single_line(name));
        let width = display_width(&label) + 1;
        if used + width > budget && !is_selected {
            continue;
        }
        used += width;
        let style = if is_selected {
            palette.chip_selected
        } else {
            palette.chip_normal
        };
        spans.push(Span::styled(label, style));
        spans.push(Span::raw(" "));
    }

    f.render_widget(Paragraph::new(Line::from(spans)), area);
}
