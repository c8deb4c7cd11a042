//! Keyboard input handling for the TUI.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::{App, AppState, Tab, PAGE_SCROLL_SIZE};

/// Handle a key press. Returns true if the app should quit.
pub fn handle_input(app: &mut App, key: KeyEvent) -> bool {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.state = AppState::Quitting;
        return true;
    }

    if matches!(app.state, AppState::ShowingHelp) {
        if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
            app.state = AppState::Normal;
        }
        return false;
    }

    match key.code {
        KeyCode::Char('q') => {
            app.state = AppState::Quitting;
            return true;
        }
        KeyCode::Char('?') => app.state = AppState::ShowingHelp,

        KeyCode::Char('1') => app.switch_tab(Tab::Dashboard),
        KeyCode::Char('2') => app.switch_tab(Tab::Matches),

        KeyCode::Tab | KeyCode::Right | KeyCode::Char('l') => app.next_sub_tab(),
        KeyCode::BackTab | KeyCode::Left | KeyCode::Char('h') => app.prev_sub_tab(),

        KeyCode::Down | KeyCode::Char('j') => app.scroll_down(1),
        KeyCode::Up | KeyCode::Char('k') => app.scroll_up(1),
        KeyCode::PageDown => app.scroll_down(PAGE_SCROLL_SIZE),
        KeyCode::PageUp => app.scroll_up(PAGE_SCROLL_SIZE),
        KeyCode::Home => app.scroll = 0,

        KeyCode::Char('u') => app.refresh_current_tab(),
        _ => {}
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use pitchside_core::cache::MemoryStore;
    use pitchside_core::{Config, FeedCache, FeedClient, Upstream};
    use std::sync::Arc;
    use std::time::Duration;

    fn app() -> App {
        // Nothing listens here; loads fail fast and are never awaited
        let client = FeedClient::new(
            Upstream::Proxy {
                base_url: "http://127.0.0.1:9".into(),
            },
            Duration::from_secs(1),
        )
        .unwrap();
        let cache = FeedCache::new(Arc::new(MemoryStore::new()), Arc::new(client));
        App::new(Config::default(), cache)
    }

    fn press(app: &mut App, code: KeyCode) -> bool {
        handle_input(app, KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[tokio::test]
    async fn test_screen_keys() {
        let mut app = app();
        app.start();

        assert!(!press(&mut app, KeyCode::Char('2')));
        assert_eq!(app.current_tab, Tab::Matches);
        assert!(app.view(Tab::Matches).is_mounted());

        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.view(Tab::Matches).selected(), 2);
        press(&mut app, KeyCode::Left);
        assert_eq!(app.view(Tab::Matches).selected(), 1);

        press(&mut app, KeyCode::Char('1'));
        assert_eq!(app.current_tab, Tab::Dashboard);
        assert!(!app.view(Tab::Matches).is_mounted());
    }

    #[tokio::test]
    async fn test_help_swallows_keys() {
        let mut app = app();
        press(&mut app, KeyCode::Char('?'));
        assert_eq!(app.state, AppState::ShowingHelp);

        assert!(!press(&mut app, KeyCode::Char('2')));
        assert_eq!(app.current_tab, Tab::Dashboard);

        assert!(!press(&mut app, KeyCode::Char('q')));
        assert_eq!(app.state, AppState::Normal);
        assert!(press(&mut app, KeyCode::Char('q')));
    }

    #[tokio::test]
    async fn test_ctrl_c_quits_from_help() {
        let mut app = app();
        app.state = AppState::ShowingHelp;
        assert!(handle_input(
            &mut app,
            KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)
        ));
        assert_eq!(app.state, AppState::Quitting);
    }
}
