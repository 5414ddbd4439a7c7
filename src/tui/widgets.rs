//! Small stateful form controls shared by the screens.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::style::Style;
use ratatui::text::{Line, Span};

use crate::tui::Theme;

/// Single-line editable text
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextField {
    value: String,
}

impl TextField {
    pub fn new(value: impl Into<String>) -> Self {
        Self { value: value.into() }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn set(&mut self, value: impl Into<String>) {
        self.value = value.into();
    }

    pub fn clear(&mut self) {
        self.value.clear();
    }

    /// Apply an editing key. Returns whether the key was consumed.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.value.push(c);
                true
            }
            KeyCode::Backspace => {
                self.value.pop();
                true
            }
            _ => false,
        }
    }

    /// Parse as a number, treating blanks and garbage as zero
    pub fn as_f64(&self) -> f64 {
        self.value.trim().parse().unwrap_or(0.0)
    }

    pub fn to_line(&self, label: &str, focused: bool, theme: &Theme) -> Line<'static> {
        let value_style = if focused { theme.focus_style() } else { Style::default().fg(theme.text) };
        let cursor = if focused { "▏" } else { "" };
        Line::from(vec![
            Span::styled(format!("{:<16}", label), theme.muted_style()),
            Span::styled(format!("{}{}", self.value, cursor), value_style),
        ])
    }
}

/// Cyclic focus over a fixed number of controls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FocusRing {
    index: usize,
    len: usize,
}

impl FocusRing {
    pub fn new(len: usize) -> Self {
        Self { index: 0, len: len.max(1) }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn is(&self, index: usize) -> bool {
        self.index == index
    }

    pub fn focus(&mut self, index: usize) {
        self.index = index.min(self.len - 1);
    }

    pub fn next(&mut self) {
        self.index = (self.index + 1) % self.len;
    }

    pub fn previous(&mut self) {
        self.index = (self.index + self.len - 1) % self.len;
    }

    /// Tab/BackTab/Up/Down movement. Returns whether the key was consumed.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Tab | KeyCode::Down => {
                self.next();
                true
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.previous();
                true
            }
            _ => false,
        }
    }
}

/// One-of-many selector cycled with Left/Right
#[derive(Debug, Clone, PartialEq)]
pub struct Choice {
    options: Vec<String>,
    selected: usize,
}

impl Choice {
    pub fn new(options: Vec<String>, initial: &str) -> Self {
        let selected = options.iter().position(|o| o == initial).unwrap_or(0);
        Self { options, selected }
    }

    pub fn selected(&self) -> &str {
        self.options.get(self.selected).map(String::as_str).unwrap_or("")
    }

    pub fn options(&self) -> &[String] {
        &self.options
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        if self.options.is_empty() {
            return false;
        }
        match key.code {
            KeyCode::Right | KeyCode::Char(' ') => {
                self.selected = (self.selected + 1) % self.options.len();
                true
            }
            KeyCode::Left => {
                self.selected = (self.selected + self.options.len() - 1) % self.options.len();
                true
            }
            _ => false,
        }
    }

    pub fn to_line(&self, label: &str, focused: bool, theme: &Theme) -> Line<'static> {
        let mut spans = vec![Span::styled(format!("{:<16}", label), theme.muted_style())];
        for (i, option) in self.options.iter().enumerate() {
            let style = match (i == self.selected, focused) {
                (true, true) => theme.focus_style(),
                (true, false) => Style::default().fg(theme.brand),
                _ => Style::default().fg(theme.subtext0),
            };
            let marker = if i == self.selected { "●" } else { "○" };
            spans.push(Span::styled(format!("{} {}  ", marker, option), style));
        }
        Line::from(spans)
    }
}

/// A pressable action rendered as `[ label ]`
pub fn button_line(label: &str, focused: bool, enabled: bool, theme: &Theme) -> Line<'static> {
    let style = if !enabled {
        theme.disabled_style()
    } else if focused {
        theme.focus_style()
    } else {
        Style::default().fg(theme.brand)
    };
    Line::from(Span::styled(format!("[ {} ]", label), style))
}

pub fn is_activate(key: &KeyEvent) -> bool {
    key.code == KeyCode::Enter
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_text_field_editing() {
        let mut field = TextField::new("12");
        assert!(field.handle_key(key(KeyCode::Char('3'))));
        assert!(field.handle_key(key(KeyCode::Backspace)));
        assert!(field.handle_key(key(KeyCode::Char('5'))));
        assert!(!field.handle_key(key(KeyCode::Enter)));
        assert_eq!(field.value(), "125");
        assert_eq!(field.as_f64(), 125.0);

        assert!(!field.handle_key(KeyEvent::new(KeyCode::Char('q'), KeyModifiers::CONTROL)));
        field.set("abc");
        assert_eq!(field.as_f64(), 0.0);
    }

    #[test]
    fn test_focus_ring_wraps() {
        let mut ring = FocusRing::new(3);
        ring.previous();
        assert_eq!(ring.index(), 2);
        ring.next();
        assert_eq!(ring.index(), 0);
        ring.focus(10);
        assert_eq!(ring.index(), 2);
    }

    #[test]
    fn test_choice_cycles() {
        let mut choice = Choice::new(vec!["a".into(), "b".into(), "c".into()], "b");
        assert_eq!(choice.selected(), "b");
        choice.handle_key(key(KeyCode::Right));
        choice.handle_key(key(KeyCode::Right));
        assert_eq!(choice.selected(), "a");
        choice.handle_key(key(KeyCode::Left));
        assert_eq!(choice.selected(), "c");

        let unknown = Choice::new(vec!["x".into()], "missing");
        assert_eq!(unknown.selected(), "x");
    }
}
