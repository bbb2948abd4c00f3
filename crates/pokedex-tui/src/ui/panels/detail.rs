use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use pokedex_core::utils::title_case;

use crate::app::{App, DetailView, LoadedDetail, FALLBACK_NOTICE};
use crate::ui::styles;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let theme = app.theme;

    let (title, lines) = match &app.detail {
        DetailView::Empty => (
            " Details ".to_string(),
            vec![
                Line::from(""),
                Line::styled(" Press [/] to search by name or id,", styles::muted_style(theme)),
                Line::styled(" or [Enter] on a list entry.", styles::muted_style(theme)),
            ],
        ),
        DetailView::Loading(identifier) => (
            format!(" Looking up {}... ", identifier),
            skeleton_lines(app),
        ),
        DetailView::Error(message) => (
            " Details ".to_string(),
            vec![
                Line::from(""),
                Line::styled(format!(" {}", message), styles::error_style(theme)),
            ],
        ),
        DetailView::Loaded(detail) => (
            format!(" {} ", detail.pokemon.display_name()),
            detail_lines(app, detail),
        ),
    };

    let block = Block::default()
        .title(title)
        .title_style(styles::title_style(theme))
        .borders(Borders::ALL)
        .border_style(styles::border_style(theme, false));

    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

fn skeleton_lines(app: &App) -> Vec<Line<'static>> {
    let style = styles::skeleton_style(app.theme);
    [18, 0, 10, 24, 24, 0, 30, 20]
        .iter()
        .map(|&width| {
            if width == 0 {
                Line::from("")
            } else {
                Line::styled(format!(" {}", "█".repeat(width)), style)
            }
        })
        .collect()
}

fn label(app: &App, text: &str) -> Span<'static> {
    Span::styled(format!(" {:<11}", text), styles::highlight_style(app.theme))
}

fn detail_lines(app: &App, detail: &LoadedDetail) -> Vec<Line<'static>> {
    let theme = app.theme;
    let pokemon = &detail.pokemon;
    let mut lines = Vec::new();

    let favorite = if app.is_favorite(&pokemon.name) {
        Span::styled("  * favorite", styles::highlight_style(theme))
    } else {
        Span::styled("  [s] add to favorites", styles::muted_style(theme))
    };
    lines.push(Line::from(vec![
        Span::styled(format!(" {}", pokemon.display_name()), styles::title_style(theme)),
        Span::styled(format!("  #{}", pokemon.id), styles::muted_style(theme)),
        favorite,
    ]));
    lines.push(Line::from(""));

    let mut types = vec![label(app, "Type")];
    for name in pokemon.type_names() {
        types.push(Span::styled(format!(" {} ", name), styles::type_chip_style(name)));
        types.push(Span::raw(" "));
    }
    lines.push(Line::from(types));

    lines.push(Line::from(vec![
        label(app, "Height"),
        Span::raw(format!("{} m", pokemon.height_m())),
    ]));
    lines.push(Line::from(vec![
        label(app, "Weight"),
        Span::raw(format!("{} kg", pokemon.weight_kg())),
    ]));
    if let Some(exp) = pokemon.base_experience {
        lines.push(Line::from(vec![
            label(app, "Base exp"),
            Span::raw(exp.to_string()),
        ]));
    }

    let abilities: Vec<String> = pokemon
        .abilities
        .iter()
        .map(|slot| {
            let name = title_case(&slot.ability.name);
            if slot.is_hidden {
                format!("{} (hidden)", name)
            } else {
                name
            }
        })
        .collect();
    lines.push(Line::from(vec![
        label(app, "Abilities"),
        Span::raw(abilities.join(", ")),
    ]));

    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        label(app, "Artwork"),
        Span::styled(pokemon.artwork_url(), styles::muted_style(theme)),
    ]));

    if detail.from_cache {
        lines.push(Line::from(""));
        let age = detail.cache_age.as_deref().unwrap_or("earlier");
        lines.push(Line::styled(
            format!(" From cache (saved {})", age),
            styles::success_style(theme),
        ));
    }
    if detail.fallback {
        lines.push(Line::styled(format!(" {}", FALLBACK_NOTICE), styles::error_style(theme)));
    }

    lines
}
