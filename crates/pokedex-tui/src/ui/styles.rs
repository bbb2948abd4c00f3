use ratatui::style::{Color, Modifier, Style};

use pokedex_core::Theme;

/// Colors for one theme.
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub text: Color,
    pub background: Color,
    pub primary: Color,
    pub secondary: Color,
    pub accent: Color,
    pub error: Color,
    pub muted: Color,
    pub highlight: Color,
    pub status_bar: Color,
}

const DARK: Palette = Palette {
    text: Color::White,
    background: Color::Reset,
    primary: Color::Rgb(220, 64, 64),
    secondary: Color::Rgb(96, 160, 96),
    accent: Color::Rgb(232, 192, 64),
    error: Color::Rgb(224, 96, 96),
    muted: Color::Rgb(128, 128, 128),
    highlight: Color::Rgb(48, 48, 64),
    status_bar: Color::Rgb(32, 32, 40),
};

const LIGHT: Palette = Palette {
    text: Color::Black,
    background: Color::Rgb(246, 246, 240),
    primary: Color::Rgb(176, 32, 32),
    secondary: Color::Rgb(40, 120, 40),
    accent: Color::Rgb(150, 100, 0),
    error: Color::Rgb(176, 32, 32),
    muted: Color::Rgb(110, 110, 110),
    highlight: Color::Rgb(220, 220, 232),
    status_bar: Color::Rgb(224, 224, 216),
};

pub fn palette(theme: Theme) -> Palette {
    match theme {
        Theme::Dark => DARK,
        Theme::Light => LIGHT,
    }
}

// Styles
pub fn base_style(theme: Theme) -> Style {
    let p = palette(theme);
    Style::default().fg(p.text).bg(p.background)
}

pub fn title_style(theme: Theme) -> Style {
    Style::default()
        .fg(palette(theme).primary)
        .add_modifier(Modifier::BOLD)
}

pub fn selected_style(theme: Theme) -> Style {
    Style::default()
        .bg(palette(theme).highlight)
        .add_modifier(Modifier::BOLD)
}

pub fn list_item_style(theme: Theme) -> Style {
    Style::default().fg(palette(theme).text)
}

pub fn muted_style(theme: Theme) -> Style {
    Style::default().fg(palette(theme).muted)
}

pub fn highlight_style(theme: Theme) -> Style {
    Style::default().fg(palette(theme).accent)
}

pub fn success_style(theme: Theme) -> Style {
    Style::default().fg(palette(theme).secondary)
}

pub fn error_style(theme: Theme) -> Style {
    Style::default().fg(palette(theme).error)
}

pub fn border_style(theme: Theme, focused: bool) -> Style {
    let p = palette(theme);
    if focused {
        Style::default().fg(p.primary)
    } else {
        Style::default().fg(p.muted)
    }
}

pub fn search_style(theme: Theme) -> Style {
    Style::default().fg(palette(theme).accent)
}

pub fn status_bar_style(theme: Theme) -> Style {
    let p = palette(theme);
    Style::default().bg(p.status_bar).fg(p.text)
}

pub fn help_key_style(theme: Theme) -> Style {
    Style::default()
        .fg(palette(theme).accent)
        .add_modifier(Modifier::BOLD)
}

pub fn help_desc_style(theme: Theme) -> Style {
    Style::default().fg(palette(theme).text)
}

pub fn current_page_style(theme: Theme) -> Style {
    Style::default()
        .fg(palette(theme).primary)
        .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
}

/// Loading placeholder blocks
pub fn skeleton_style(theme: Theme) -> Style {
    Style::default()
        .fg(palette(theme).highlight)
        .add_modifier(Modifier::DIM)
}

/// Background color for a type chip, keyed by type name.
pub fn type_color(type_name: &str) -> Color {
    match type_name {
        "fire" => Color::Rgb(238, 129, 48),
        "water" => Color::Rgb(99, 144, 240),
        "grass" => Color::Rgb(122, 199, 76),
        "electric" => Color::Rgb(247, 208, 44),
        "ice" => Color::Rgb(150, 217, 214),
        "fighting" => Color::Rgb(194, 46, 40),
        "poison" => Color::Rgb(163, 62, 161),
        "ground" => Color::Rgb(226, 191, 101),
        "flying" => Color::Rgb(169, 143, 243),
        "psychic" => Color::Rgb(249, 85, 135),
        "bug" => Color::Rgb(166, 185, 26),
        "rock" => Color::Rgb(182, 161, 54),
        "ghost" => Color::Rgb(115, 87, 151),
        "dragon" => Color::Rgb(111, 53, 252),
        "dark" => Color::Rgb(112, 87, 70),
        "steel" => Color::Rgb(183, 183, 206),
        "fairy" => Color::Rgb(214, 133, 173),
        _ => Color::Rgb(168, 167, 122),
    }
}

pub fn type_chip_style(type_name: &str) -> Style {
    Style::default()
        .bg(type_color(type_name))
        .fg(Color::Black)
        .add_modifier(Modifier::BOLD)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_themes_differ() {
        assert_ne!(palette(Theme::Dark).text, palette(Theme::Light).text);
        assert_ne!(base_style(Theme::Dark), base_style(Theme::Light));
    }

    #[test]
    fn test_unknown_type_uses_normal_color() {
        assert_eq!(type_color("shadow"), type_color("normal"));
        assert_ne!(type_color("fire"), type_color("water"));
    }
}
