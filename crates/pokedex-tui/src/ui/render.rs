use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use pokedex_core::Theme;

use crate::app::{App, AppState};

use super::panels::{detail, list, sidebar};
use super::styles;

pub fn render(frame: &mut Frame, app: &App) {
    frame.render_widget(Block::default().style(styles::base_style(app.theme)), frame.area());

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // Title bar
            Constraint::Length(3), // Search bar
            Constraint::Min(10),   // Main content
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());

    render_title_bar(frame, app, chunks[0]);
    render_search_bar(frame, app, chunks[1]);
    render_main_content(frame, app, chunks[2]);
    render_status_bar(frame, app, chunks[3]);

    // Render overlays
    if matches!(app.state, AppState::ShowingHelp) {
        render_help_overlay(frame, app.theme);
    }

    if matches!(app.state, AppState::ConfirmingQuit) {
        render_quit_overlay(frame, app.theme);
    }
}

fn render_title_bar(frame: &mut Frame, app: &App, area: Rect) {
    let theme = app.theme;
    let title = "  Pokedex";
    let right = format!("[t] {} theme  [?] Help", app.theme.as_str());

    let title_line = Line::from(vec![
        Span::styled(title, styles::title_style(theme)),
        Span::raw(" ".repeat(
            (area.width as usize).saturating_sub(title.len() + right.len() + 2),
        )),
        Span::styled(right, styles::muted_style(theme)),
    ]);

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style(theme));

    frame.render_widget(Paragraph::new(title_line).block(block), area);
}

fn render_search_bar(frame: &mut Frame, app: &App, area: Rect) {
    let theme = app.theme;
    let (label, text, active) = match app.state {
        AppState::Searching => (" Search ", app.search_query.as_str(), true),
        AppState::Filtering => (" Filter this page ", app.filter_input.as_str(), true),
        _ => (" Search ", "", false),
    };

    let line = if active {
        Line::from(vec![
            Span::styled(format!(" {}", text), styles::search_style(theme)),
            Span::styled("▌", styles::search_style(theme)),
        ])
    } else {
        Line::styled(
            " [/] name or id   [f] filter this page",
            styles::muted_style(theme),
        )
    };

    let block = Block::default()
        .title(label)
        .title_style(styles::title_style(theme))
        .borders(Borders::ALL)
        .border_style(styles::border_style(theme, active));

    frame.render_widget(Paragraph::new(line).block(block), area);
}

fn render_main_content(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(34),
            Constraint::Percentage(44),
            Constraint::Percentage(22),
        ])
        .split(area);

    list::render(frame, app, chunks[0]);
    detail::render(frame, app, chunks[1]);
    sidebar::render(frame, app, chunks[2]);
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let theme = app.theme;
    let shortcuts = "[s]tar | [w]arm cache | [q]uit";

    let (left_text, left_style) = if app.persistence_failed() {
        (
            " Storage full: changes are not being saved ".to_string(),
            styles::error_style(theme),
        )
    } else if let Some(ref msg) = app.status_message {
        (format!(" {} ", msg), styles::muted_style(theme))
    } else if app.warming_up {
        (" Caching favorites... ".to_string(), styles::muted_style(theme))
    } else {
        (
            format!(" {} ", app.config.api_base_url),
            styles::muted_style(theme),
        )
    };

    let right_text = format!(" {} ", shortcuts);
    let padding_len = (area.width as usize)
        .saturating_sub(left_text.chars().count())
        .saturating_sub(right_text.len());

    let status_line = Line::from(vec![
        Span::styled(left_text, left_style),
        Span::raw(" ".repeat(padding_len)),
        Span::styled(right_text, styles::muted_style(theme)),
    ]);
    let paragraph = Paragraph::new(status_line).style(styles::status_bar_style(theme));
    frame.render_widget(paragraph, area);
}

fn help_line(theme: Theme, key: &'static str, description: &'static str) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("  {:<10}", key), styles::help_key_style(theme)),
        Span::styled(description, styles::help_desc_style(theme)),
    ])
}

fn render_help_overlay(frame: &mut Frame, theme: Theme) {
    let area = centered_rect_fixed(50, 24, frame.area());

    // Clear the area
    frame.render_widget(Clear, area);

    let version = env!("CARGO_PKG_VERSION");

    let help_text = vec![
        Line::from(Span::styled(
            format!("  Pokedex  v{}", version),
            styles::title_style(theme),
        )),
        Line::from(""),
        Line::from(Span::styled(" Navigation", styles::highlight_style(theme))),
        help_line(theme, "Tab", "Cycle list / recent / favorites"),
        help_line(theme, "↑/↓", "Move selection"),
        help_line(theme, "Enter", "Open selected Pokemon"),
        help_line(theme, "←/→", "Previous / next page"),
        help_line(theme, "g/G", "First / last page"),
        Line::from(""),
        Line::from(Span::styled(" Actions", styles::highlight_style(theme))),
        help_line(theme, "/", "Search by name or id"),
        help_line(theme, "f", "Filter the current page"),
        help_line(theme, "s", "Toggle favorite"),
        help_line(theme, "w", "Cache all favorites"),
        help_line(theme, "+/-", "Page size"),
        help_line(theme, "r", "Reload page"),
        help_line(theme, "t", "Light / dark theme"),
        help_line(theme, "q", "Quit"),
        Line::from(""),
        Line::from(vec![
            Span::styled("       Press ", styles::muted_style(theme)),
            Span::styled("?", styles::help_key_style(theme)),
            Span::styled(" or ", styles::muted_style(theme)),
            Span::styled("Esc", styles::help_key_style(theme)),
            Span::styled(" to close", styles::muted_style(theme)),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(theme, true))
        .style(styles::base_style(theme));

    frame.render_widget(Paragraph::new(help_text).block(block), area);
}

/// Create a centered rectangle with fixed dimensions
fn centered_rect_fixed(width: u16, height: u16, r: Rect) -> Rect {
    let x = r.x + (r.width.saturating_sub(width)) / 2;
    let y = r.y + (r.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(r.width), height.min(r.height))
}

fn render_quit_overlay(frame: &mut Frame, theme: Theme) {
    let area = centered_rect_fixed(40, 7, frame.area());

    // Clear the area
    frame.render_widget(Clear, area);

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "   Are you sure you want to quit?",
            styles::highlight_style(theme),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("   Press ", styles::muted_style(theme)),
            Span::styled("[Y]", styles::help_key_style(theme)),
            Span::styled(" to quit, ", styles::muted_style(theme)),
            Span::styled("[N]", styles::help_key_style(theme)),
            Span::styled(" to cancel", styles::muted_style(theme)),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(theme, true))
        .style(styles::base_style(theme));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}
