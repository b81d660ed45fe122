//! Input simulation for testing.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// A sequence of keyboard events for testing.
#[derive(Debug, Clone, Default)]
pub struct InputSequence {
    events: Vec<KeyEvent>,
}

impl InputSequence {
    /// Create a new empty input sequence.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a key event.
    pub fn key(&mut self, key: KeyCode) -> &mut Self {
        self.key_mod(key, KeyModifiers::NONE)
    }

    /// Add a key event with modifiers.
    pub fn key_mod(&mut self, key: KeyCode, modifiers: KeyModifiers) -> &mut Self {
        self.events.push(KeyEvent::new(key, modifiers));
        self
    }

    /// Add a character key event.
    pub fn char(&mut self, c: char) -> &mut Self {
        self.key(KeyCode::Char(c))
    }

    /// Add a text string as character events.
    pub fn text(&mut self, s: &str) -> &mut Self {
        for c in s.chars() {
            self.char(c);
        }
        self
    }

    /// Add a Ctrl+key event.
    pub fn ctrl(&mut self, c: char) -> &mut Self {
        self.key_mod(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    pub fn enter(&mut self) -> &mut Self {
        self.key(KeyCode::Enter)
    }

    pub fn esc(&mut self) -> &mut Self {
        self.key(KeyCode::Esc)
    }

    pub fn tab(&mut self) -> &mut Self {
        self.key(KeyCode::Tab)
    }

    pub fn shift_tab(&mut self) -> &mut Self {
        self.key_mod(KeyCode::BackTab, KeyModifiers::SHIFT)
    }

    pub fn backspace(&mut self) -> &mut Self {
        self.key(KeyCode::Backspace)
    }

    pub fn space(&mut self) -> &mut Self {
        self.key(KeyCode::Char(' '))
    }

    pub fn up(&mut self) -> &mut Self {
        self.key(KeyCode::Up)
    }

    pub fn down(&mut self) -> &mut Self {
        self.key(KeyCode::Down)
    }

    pub fn left(&mut self) -> &mut Self {
        self.key(KeyCode::Left)
    }

    pub fn right(&mut self) -> &mut Self {
        self.key(KeyCode::Right)
    }

    /// Add a key `n` times.
    pub fn repeat(&mut self, key: KeyCode, n: usize) -> &mut Self {
        for _ in 0..n {
            self.key(key);
        }
        self
    }

    /// Type `s` and commit it with Enter.
    pub fn typed(&mut self, s: &str) -> &mut Self {
        self.text(s).enter()
    }

    /// Get all key events.
    pub fn key_events(&self) -> Vec<KeyEvent> {
        self.events.clone()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}
