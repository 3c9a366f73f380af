//! Global key bindings and the one-line help shown under focused widgets.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    style::{Color, Style},
    text::{Line, Span},
};

/// A key and what it does, for help text only.
#[derive(Debug, Clone, Copy)]
pub struct Binding {
    pub keys: &'static str,
    pub action: &'static str,
}

pub const NEXT_WIDGET: Binding = Binding {
    keys: "tab",
    action: "next widget",
};

pub const EXIT: Binding = Binding {
    keys: "q",
    action: "exit",
};

pub fn is_quit(key: &KeyEvent) -> bool {
    match key.code {
        KeyCode::Char('c') => key.modifiers.contains(KeyModifiers::CONTROL),
        KeyCode::Char('q') => !key.modifiers.contains(KeyModifiers::CONTROL),
        _ => false,
    }
}

pub fn is_next_widget(key: &KeyEvent) -> bool {
    key.code == KeyCode::Tab
}

/// Widget-specific bindings followed by the global ones.
pub fn help_line(local: &[Binding]) -> Line<'static> {
    let key_style = Style::default().fg(Color::Gray);
    let action_style = Style::default().fg(Color::DarkGray);

    let mut spans = Vec::new();
    for (i, binding) in local.iter().chain([NEXT_WIDGET, EXIT].iter()).enumerate() {
        if i > 0 {
            spans.push(Span::styled(" • ", action_style));
        }
        spans.push(Span::styled(binding.keys, key_style));
        spans.push(Span::styled(format!(" {}", binding.action), action_style));
    }
    Line::from(spans)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn test_quit_bindings() {
        assert!(is_quit(&key(KeyCode::Char('q'), KeyModifiers::empty())));
        assert!(is_quit(&key(KeyCode::Char('c'), KeyModifiers::CONTROL)));
        assert!(!is_quit(&key(KeyCode::Char('c'), KeyModifiers::empty())));
        assert!(!is_quit(&key(KeyCode::Enter, KeyModifiers::empty())));
    }

    #[test]
    fn test_next_widget_binding() {
        assert!(is_next_widget(&key(KeyCode::Tab, KeyModifiers::empty())));
        assert!(!is_next_widget(&key(KeyCode::BackTab, KeyModifiers::SHIFT)));
    }

    #[test]
    fn test_help_line_ends_with_globals() {
        let line = help_line(&[Binding {
            keys: "↑/↓",
            action: "move",
        }]);
        let text: String = line.spans.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(text, "↑/↓ move • tab next widget • q exit");
    }
}
