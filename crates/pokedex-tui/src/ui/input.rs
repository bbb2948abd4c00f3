//! Keyboard input handling for the TUI.
//!
//! This module handles all keyboard events and translates them into
//! application state changes.

use crossterm::event::{KeyCode, KeyEvent};

use crate::app::{is_valid_input_char, App, AppState, MAX_SEARCH_LENGTH};

/// Handle keyboard input. Returns true if the app should quit.
pub fn handle_input(app: &mut App, key: KeyEvent) -> bool {
    // Handle help overlay
    if matches!(app.state, AppState::ShowingHelp) {
        if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
            app.state = AppState::Normal;
        }
        return false;
    }

    // Handle quit confirmation
    if matches!(app.state, AppState::ConfirmingQuit) {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                app.state = AppState::Quitting;
                return true;
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                app.state = AppState::Normal;
            }
            _ => {}
        }
        return false;
    }

    if matches!(app.state, AppState::Searching) {
        handle_search_input(app, key);
        return false;
    }

    if matches!(app.state, AppState::Filtering) {
        handle_filter_input(app, key);
        return false;
    }

    // Any key clears a stale status message
    app.status_message = None;

    match key.code {
        KeyCode::Char('q') => app.state = AppState::ConfirmingQuit,
        KeyCode::Char('?') => app.state = AppState::ShowingHelp,
        KeyCode::Char('/') => {
            app.state = AppState::Searching;
            app.search_query.clear();
        }
        KeyCode::Char('f') => {
            app.state = AppState::Filtering;
            app.filter_input = app.session.filter.clone();
        }
        KeyCode::Tab => app.focus = app.focus.next(),
        KeyCode::Up | KeyCode::Char('k') => app.select_previous(),
        KeyCode::Down | KeyCode::Char('j') => app.select_next(),
        KeyCode::Enter => app.open_selected(),
        KeyCode::Left => app.previous_page(),
        KeyCode::Right => app.next_page(),
        KeyCode::Char('g') | KeyCode::Home => app.first_page(),
        KeyCode::Char('G') | KeyCode::End => app.last_page(),
        KeyCode::Char('s') => app.toggle_favorite_shown(),
        KeyCode::Char('t') => app.toggle_theme(),
        KeyCode::Char('+') | KeyCode::Char('=') => app.cycle_per_page(true),
        KeyCode::Char('-') => app.cycle_per_page(false),
        KeyCode::Char('w') => app.warm_favorites(),
        KeyCode::Char('r') => app.reload_page(),
        KeyCode::Esc => {
            if !app.session.filter.is_empty() {
                app.set_filter("");
            }
        }
        _ => {}
    }

    false
}

fn handle_search_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.state = AppState::Normal;
            app.search_query.clear();
        }
        KeyCode::Enter => app.submit_search(),
        KeyCode::Backspace => {
            app.search_query.pop();
        }
        KeyCode::Char(c) => {
            if is_valid_input_char(c) && app.search_query.len() < MAX_SEARCH_LENGTH {
                app.search_query.push(c);
            }
        }
        _ => {}
    }
}

/// The filter applies on every keystroke.
fn handle_filter_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.state = AppState::Normal;
            app.filter_input.clear();
            app.set_filter("");
        }
        KeyCode::Enter => app.state = AppState::Normal,
        KeyCode::Backspace => {
            app.filter_input.pop();
            let text = app.filter_input.clone();
            app.set_filter(&text);
        }
        KeyCode::Char(c) => {
            if is_valid_input_char(c) && app.filter_input.len() < MAX_SEARCH_LENGTH {
                app.filter_input.push(c);
                let text = app.filter_input.clone();
                app.set_filter(&text);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::{DetailView, Focus, EMPTY_SEARCH_MESSAGE};
    use crossterm::event::KeyModifiers;
    use pokedex_core::{Config, NamedResource, Storage, Theme};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            handle_input(app, key(KeyCode::Char(c)));
        }
    }

    fn test_app() -> App {
        let mut app = App::with_storage(Config::default(), Storage::in_memory()).unwrap();
        app.session.items = ["pikachu", "raichu", "eevee"]
            .iter()
            .map(|name| NamedResource {
                name: name.to_string(),
                url: String::new(),
            })
            .collect();
        app
    }

    #[test]
    fn test_quit_requires_confirmation() {
        let mut app = test_app();
        assert!(!handle_input(&mut app, key(KeyCode::Char('q'))));
        assert_eq!(app.state, AppState::ConfirmingQuit);

        assert!(!handle_input(&mut app, key(KeyCode::Char('n'))));
        assert_eq!(app.state, AppState::Normal);

        handle_input(&mut app, key(KeyCode::Char('q')));
        assert!(handle_input(&mut app, key(KeyCode::Char('y'))));
        assert_eq!(app.state, AppState::Quitting);
    }

    #[test]
    fn test_help_overlay_swallows_keys() {
        let mut app = test_app();
        handle_input(&mut app, key(KeyCode::Char('?')));
        assert_eq!(app.state, AppState::ShowingHelp);

        handle_input(&mut app, key(KeyCode::Char('t')));
        assert_eq!(app.theme, Theme::Dark);

        handle_input(&mut app, key(KeyCode::Esc));
        assert_eq!(app.state, AppState::Normal);
    }

    #[test]
    fn test_filter_applies_while_typing() {
        let mut app = test_app();
        handle_input(&mut app, key(KeyCode::Char('f')));
        type_text(&mut app, "CHU");

        assert_eq!(app.state, AppState::Filtering);
        assert_eq!(app.visible_items().len(), 2);

        handle_input(&mut app, key(KeyCode::Backspace));
        handle_input(&mut app, key(KeyCode::Backspace));
        handle_input(&mut app, key(KeyCode::Backspace));
        assert_eq!(app.visible_items().len(), 3);

        type_text(&mut app, "ee");
        handle_input(&mut app, key(KeyCode::Enter));
        assert_eq!(app.state, AppState::Normal);
        assert_eq!(app.visible_items().len(), 1);

        handle_input(&mut app, key(KeyCode::Esc));
        assert_eq!(app.visible_items().len(), 3);
    }

    #[test]
    fn test_search_input_rejects_invalid_chars_and_empty_terms() {
        let mut app = test_app();
        handle_input(&mut app, key(KeyCode::Char('/')));
        type_text(&mut app, " /");
        assert_eq!(app.search_query, " ");

        handle_input(&mut app, key(KeyCode::Enter));
        assert_eq!(app.state, AppState::Normal);
        assert!(matches!(app.detail, DetailView::Error(ref m) if m == EMPTY_SEARCH_MESSAGE));
    }

    #[test]
    fn test_search_input_is_capped() {
        let mut app = test_app();
        handle_input(&mut app, key(KeyCode::Char('/')));
        type_text(&mut app, &"a".repeat(MAX_SEARCH_LENGTH + 5));
        assert_eq!(app.search_query.len(), MAX_SEARCH_LENGTH);
    }

    #[test]
    fn test_tab_and_arrows_move_focus_and_selection() {
        let mut app = test_app();
        handle_input(&mut app, key(KeyCode::Down));
        handle_input(&mut app, key(KeyCode::Down));
        handle_input(&mut app, key(KeyCode::Down));
        assert_eq!(app.list_selection, 2);
        assert_eq!(app.selected_name().as_deref(), Some("eevee"));

        handle_input(&mut app, key(KeyCode::Tab));
        assert_eq!(app.focus, Focus::Recent);
        assert!(app.selected_name().is_none());
    }

    #[test]
    fn test_theme_toggle_key() {
        let mut app = test_app();
        handle_input(&mut app, key(KeyCode::Char('t')));
        assert_eq!(app.theme, Theme::Light);
        assert_eq!(app.preferences.theme(), Theme::Light);
    }

    #[test]
    fn test_favorite_key_without_entity_shows_hint() {
        let mut app = test_app();
        handle_input(&mut app, key(KeyCode::Char('s')));
        assert_eq!(app.status_message.as_deref(), Some("Open a Pokemon first"));
    }
}
