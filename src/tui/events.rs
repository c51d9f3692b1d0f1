//! Event Handling - Keyboard input processing

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// Actions that can be triggered by user input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    GoIdle,
    Reconnect,
    None,
}

/// Handle keyboard events
pub fn handle_key_event(key: KeyEvent) -> Action {
    // Windows reports releases too
    if key.kind != KeyEventKind::Press {
        return Action::None;
    }

    match (key.modifiers, key.code) {
        // Quit: q, Esc or Ctrl+C
        (KeyModifiers::NONE, KeyCode::Char('q')) | (_, KeyCode::Esc) => Action::Quit,
        (KeyModifiers::CONTROL, KeyCode::Char('c')) => Action::Quit,

        (KeyModifiers::NONE, KeyCode::Char('i')) => Action::GoIdle,
        (KeyModifiers::NONE, KeyCode::Char('r')) => Action::Reconnect,

        _ => Action::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quit_action() {
        let key = KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE);
        assert_eq!(handle_key_event(key), Action::Quit);
    }

    #[test]
    fn test_ctrl_c_quit() {
        let key = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(handle_key_event(key), Action::Quit);
    }

    #[test]
    fn test_idle_and_reconnect() {
        let idle = KeyEvent::new(KeyCode::Char('i'), KeyModifiers::NONE);
        let reconnect = KeyEvent::new(KeyCode::Char('r'), KeyModifiers::NONE);
        assert_eq!(handle_key_event(idle), Action::GoIdle);
        assert_eq!(handle_key_event(reconnect), Action::Reconnect);
    }

    #[test]
    fn test_release_ignored() {
        let mut key = KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE);
        key.kind = KeyEventKind::Release;
        assert_eq!(handle_key_event(key), Action::None);
    }

    #[test]
    fn test_plain_c_does_nothing() {
        let key = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::NONE);
        assert_eq!(handle_key_event(key), Action::None);
    }
}
