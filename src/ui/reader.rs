use crate::app::App;
use crate::feed::{format_published_long, DetailView};
use crate::theme::ColorPalette;
use crate::util::{single_line, strip_control_chars};
use pulldown_cmark::{Event, Parser, Tag, TagEnd};
use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use super::spinner;

/// Lines above the body: title, meta, description, blank.
const HEADER_LINES: usize = 4;

/// Render the detail reader
pub fn render(f: &mut Frame, app: &mut App, area: Rect) {
    // Layout may produce tiny rects during extreme resizes
    if area.width < 3 || area.height < 3 {
        return;
    }
    app.reader_visible_lines = area.height.saturating_sub(2) as usize;
    let palette = &app.palette;

    let (title, lines): (&str, Vec<Line<'static>>) = match &app.detail {
        DetailView::Loading => (
            "Loading",
            vec![Line::from(Span::styled(
                format!("{} Loading news...", spinner(app.spinner_frame)),
                palette.loading,
            ))],
        ),
        DetailView::NotFound { slug } => (
            "Not found",
            vec![
                Line::from(Span::styled("News not found", palette.error)),
                Line::from(Span::styled(
                    format!("No item with slug \"{}\"", single_line(slug)),
                    palette.reader_metadata,
                )),
                Line::from(""),
                Line::from("[b] Back to the news list"),
            ],
        ),
        DetailView::Failed { message } => (
            "Error",
            vec![
                Line::from(Span::styled(single_line(message), palette.error)),
                Line::from(""),
                Line::from("[r] Retry   [b] Back"),
            ],
        ),
        DetailView::Ready(detail) => {
            let mut meta = vec![Span::styled(
                format_published_long(detail.published_at.as_ref()),
                palette.reader_metadata,
            )];
            for part in [detail.category_name(), detail.author_name()] {
                if !part.is_empty() {
                    meta.push(Span::styled(
                        format!(" · {}", single_line(part)),
                        palette.reader_metadata,
                    ));
                }
            }
            if detail.is_highlighted() {
                meta.push(Span::styled(
                    format!("  ★ {} views", detail.views_count),
                    palette.badge,
                ));
            }

            let mut lines = Vec::with_capacity(HEADER_LINES + app.detail_lines.len());
            lines.push(Line::from(Span::styled(
                single_line(&detail.title),
                palette.reader_title,
            )));
            lines.push(Line::from(meta));
            lines.push(Line::from(Span::styled(
                single_line(&detail.description),
                palette.reader_emphasis,
            )));
            lines.push(Line::from(""));
            lines.extend(app.detail_lines.iter().cloned());
            ("News", lines)
        }
    };

    let content_lines = lines.len();
    let visible = app.reader_visible_lines;
    app.clamp_scroll(content_lines, visible);

    let paragraph = Paragraph::new(Text::from(lines))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(app.palette.panel_border)
                .title(format!(" {} ", title)),
        )
        .wrap(Wrap { trim: false })
        .scroll((app.scroll_offset.min(crate::app::MAX_SCROLL) as u16, 0));

    f.render_widget(paragraph, area);
}

/// Rebuild the cached body lines for a ready detail, e.g. after a theme change.
pub fn refresh_detail_lines(app: &mut App) {
    app.detail_lines = match &app.detail {
        DetailView::Ready(detail) => render_markdown(&detail.content, &app.palette),
        _ => Vec::new(),
    };
}

/// Convert markdown to styled ratatui lines.
///
/// Control characters are stripped first; article bodies come from the API
/// verbatim.
pub fn render_markdown(md: &str, palette: &ColorPalette) -> Vec<Line<'static>> {
    let md = strip_control_chars(md);
    let mut lines: Vec<Line<'static>> = Vec::with_capacity(md.lines().count());
    let mut spans: Vec<Span<'static>> = Vec::with_capacity(4);
    let mut in_code_block = false;
    let mut in_heading = false;
    let mut emphasis = 0usize;
    let mut strong = 0usize;
    let mut link_dest: Option<String> = None;
    let mut list_depth = 0usize;

    let flush = |spans: &mut Vec<Span<'static>>, lines: &mut Vec<Line<'static>>| {
        if !spans.is_empty() {
            lines.push(Line::from(std::mem::take(spans)));
        }
    };

    for event in Parser::new(&md) {
        match event {
            Event::Start(Tag::Heading { .. }) => in_heading = true,
            Event::End(TagEnd::Heading(_)) => {
                flush(&mut spans, &mut lines);
                lines.push(Line::from(""));
                in_heading = false;
            }
            Event::End(TagEnd::Paragraph) => {
                flush(&mut spans, &mut lines);
                if list_depth == 0 {
                    lines.push(Line::from(""));
                }
            }
            Event::Start(Tag::CodeBlock(_)) => in_code_block = true,
            Event::End(TagEnd::CodeBlock) => {
                flush(&mut spans, &mut lines);
                lines.push(Line::from(""));
                in_code_block = false;
            }
            Event::Start(Tag::List(_)) => list_depth += 1,
            Event::End(TagEnd::List(_)) => {
                list_depth = list_depth.saturating_sub(1);
                if list_depth == 0 {
                    lines.push(Line::from(""));
                }
            }
            Event::Start(Tag::Item) => {
                flush(&mut spans, &mut lines);
                spans.push(Span::raw(format!("{}• ", "  ".repeat(list_depth.saturating_sub(1)))));
            }
            Event::End(TagEnd::Item) => flush(&mut spans, &mut lines),
            Event::Start(Tag::Emphasis) => emphasis += 1,
            Event::End(TagEnd::Emphasis) => emphasis = emphasis.saturating_sub(1),
            Event::Start(Tag::Strong) => strong += 1,
            Event::End(TagEnd::Strong) => strong = strong.saturating_sub(1),
            Event::Start(Tag::Link { dest_url, .. }) => link_dest = Some(dest_url.into_string()),
            Event::End(TagEnd::Link) => {
                if let Some(dest) = link_dest.take() {
                    spans.push(Span::styled(format!(" <{}>", dest), palette.reader_metadata));
                }
            }
            Event::Start(Tag::Image { dest_url, .. }) => {
                spans.push(Span::styled(
                    format!("[Image: {}]", dest_url),
                    palette.reader_link,
                ));
            }
            Event::Text(text) if in_code_block => {
                // Code blocks arrive as one text event with embedded newlines
                for line in text.lines() {
                    lines.push(Line::from(Span::styled(line.to_string(), palette.reader_code)));
                }
            }
            Event::Text(text) => {
                let style = if in_heading {
                    palette.reader_heading
                } else if link_dest.is_some() {
                    palette.reader_link
                } else if strong > 0 {
                    palette.reader_strong
                } else if emphasis > 0 {
                    palette.reader_emphasis
                } else {
                    palette.reader_body
                };
                spans.push(Span::styled(text.into_string(), style));
            }
            Event::Code(code) => {
                spans.push(Span::styled(format!("`{}`", code), palette.reader_code));
            }
            Event::SoftBreak => spans.push(Span::styled(" ", Style::default())),
            Event::HardBreak => flush(&mut spans, &mut lines),
            Event::Rule => {
                flush(&mut spans, &mut lines);
                lines.push(Line::from(Span::styled("────────", palette.reader_metadata)));
            }
            _ => {}
        }
    }

    flush(&mut spans, &mut lines);
    while lines.last().is_some_and(|l| l.width() == 0) {
        lines.pop();
    }
    lines
}
