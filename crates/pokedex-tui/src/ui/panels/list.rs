use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

use pokedex_core::session::PAGE_WINDOW;
use pokedex_core::utils::truncate_string;

use crate::app::{App, Focus};
use crate::ui::styles;

/// Rows of placeholder shown while a page loads.
const SKELETON_ROWS: usize = 8;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(area);

    render_items(frame, app, chunks[0]);
    render_pagination(frame, app, chunks[1]);
}

fn render_items(frame: &mut Frame, app: &App, area: Rect) {
    let theme = app.theme;
    let focused = app.focus == Focus::List;

    let mut title = format!(
        " Pokemon - page {}/{} ",
        app.session.page,
        app.session.total_pages()
    );
    if !app.session.filter.is_empty() {
        title = format!("{}[filter: {}] ", title, app.session.filter);
    }
    if app.list_from_cache && !app.list_loading {
        title.push_str("(cached) ");
    }

    let block = Block::default()
        .title(title)
        .title_style(styles::title_style(theme))
        .borders(Borders::ALL)
        .border_style(styles::border_style(theme, focused));

    if app.list_loading {
        let lines: Vec<Line> = (0..SKELETON_ROWS)
            .map(|i| {
                let width = 14 + (i * 5) % 9;
                Line::styled(format!(" {}", "█".repeat(width)), styles::skeleton_style(theme))
            })
            .collect();
        frame.render_widget(Paragraph::new(lines).block(block), area);
        return;
    }

    if let Some(ref error) = app.list_error {
        let lines = vec![
            Line::styled(format!(" {}", error), styles::error_style(theme)),
            Line::from(""),
            Line::styled(" Press [r] to retry", styles::muted_style(theme)),
        ];
        frame.render_widget(Paragraph::new(lines).block(block), area);
        return;
    }

    let visible = app.visible_items();
    if visible.is_empty() {
        let message = if app.session.filter.is_empty() {
            " No Pokemon on this page."
        } else {
            " No matches on this page."
        };
        frame.render_widget(
            Paragraph::new(Line::styled(message, styles::muted_style(theme))).block(block),
            area,
        );
        return;
    }

    let name_width = (area.width as usize).saturating_sub(12).max(8);
    let items: Vec<ListItem> = visible
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let star = if app.is_favorite(&item.name) { "*" } else { " " };
            let line = Line::from(vec![
                Span::styled(format!("#{:<5}", item.id()), styles::muted_style(theme)),
                Span::raw(truncate_string(&item.name, name_width)),
                Span::styled(format!(" {}", star), styles::highlight_style(theme)),
            ]);

            let style = if i == app.list_selection && focused {
                styles::selected_style(theme)
            } else {
                styles::list_item_style(theme)
            };
            ListItem::new(line).style(style)
        })
        .collect();

    let list = List::new(items).block(block);
    let mut state = ListState::default();
    state.select(Some(app.list_selection));
    frame.render_stateful_widget(list, area, &mut state);
}

fn render_pagination(frame: &mut Frame, app: &App, area: Rect) {
    let theme = app.theme;
    let session = &app.session;

    let mut spans = vec![Span::styled(" « ", styles::muted_style(theme))];
    for page in session.page_window(PAGE_WINDOW) {
        if page == session.page {
            spans.push(Span::styled(format!("[{}]", page), styles::current_page_style(theme)));
        } else {
            spans.push(Span::styled(format!(" {} ", page), styles::list_item_style(theme)));
        }
    }
    spans.push(Span::styled(" » ", styles::muted_style(theme)));
    spans.push(Span::styled(
        format!(" {} per page", session.per_page),
        styles::muted_style(theme),
    ));

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
