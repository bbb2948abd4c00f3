use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::Line,
    widgets::{Block, Borders, List, ListItem, ListState},
    Frame,
};

use crate::app::{App, Focus};
use crate::ui::styles;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(area);

    render_names(
        frame,
        app,
        chunks[0],
        " Recent ",
        app.recent_names(),
        app.recent_selection,
        app.focus == Focus::Recent,
    );
    render_names(
        frame,
        app,
        chunks[1],
        " Favorites ",
        app.favorite_names(),
        app.favorites_selection,
        app.focus == Focus::Favorites,
    );
}

fn render_names(
    frame: &mut Frame,
    app: &App,
    area: Rect,
    title: &str,
    names: &[String],
    selection: usize,
    focused: bool,
) {
    let theme = app.theme;
    let block = Block::default()
        .title(format!("{}({}) ", title, names.len()))
        .title_style(styles::title_style(theme))
        .borders(Borders::ALL)
        .border_style(styles::border_style(theme, focused));

    let items: Vec<ListItem> = if names.is_empty() {
        vec![ListItem::new(Line::styled(" (empty)", styles::muted_style(theme)))]
    } else {
        names
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let style = if focused && i == selection {
                    styles::selected_style(theme)
                } else {
                    styles::list_item_style(theme)
                };
                ListItem::new(format!(" {}", name)).style(style)
            })
            .collect()
    };

    let mut state = ListState::default();
    if focused && !names.is_empty() {
        state.select(Some(selection));
    }
    frame.render_stateful_widget(List::new(items).block(block), area, &mut state);
}
