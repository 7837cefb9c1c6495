use crate::app::{App, View};
use crate::feed::{DetailView, Phase, ScreenKind};
use ratatui::{layout::Rect, widgets::Paragraph, Frame};
use std::borrow::Cow;

/// Render the status bar
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    if area.width < 1 || area.height < 1 {
        return;
    }

    // Status messages win over the key hints
    let text: Cow<'_, str> = if let Some((msg, _)) = &app.status_message {
        Cow::Borrowed(msg.as_ref())
    } else {
        match app.view {
            View::Browse => match app.current_view().phase {
                Phase::Error => Cow::Borrowed("[r]etry [Tab]switch [j/k]move [Enter]open [t]heme [q]uit"),
                _ if app.tab == ScreenKind::Latest => Cow::Borrowed(
                    "[r]efresh [ / ]category [Tab]switch [j/k]move [Enter]open [t]heme [q]uit",
                ),
                _ => Cow::Borrowed("[r]efresh [Tab]switch [j/k]move [Enter]open [t]heme [q]uit"),
            },
            View::Detail => match app.detail {
                DetailView::Failed { .. } => Cow::Borrowed("[r]etry [b]ack [q]uit"),
                DetailView::NotFound { .. } => Cow::Borrowed("[b]ack to list [q]uit"),
                _ => Cow::Borrowed("[b]ack [j/k]scroll [s]hare [t]heme [q]uit"),
            },
        }
    };

    let paragraph = Paragraph::new(text).style(app.palette.status_bar);
    f.render_widget(paragraph, area);
}
