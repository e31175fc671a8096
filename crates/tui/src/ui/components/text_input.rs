//! Single-line text input state with a UTF-8 safe cursor.

use crossterm::event::{KeyCode, KeyEvent};

/// Edit buffer plus a cursor kept on UTF-8 boundaries. Used by the flow
/// field in the scope bar.
#[derive(Clone, Debug, Default)]
pub struct TextInputState {
    text: String,
    /// Byte index into `text`, always on a char boundary.
    cursor: usize,
}

impl TextInputState {
    pub fn with_text(text: impl Into<String>) -> Self {
        let text = text.into();
        let cursor = text.len();
        Self { text, cursor }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Cursor position in display columns, for terminal cursor placement.
    pub fn cursor_column(&self) -> u16 {
        self.text[..self.cursor].chars().count() as u16
    }

    /// Apply one key event. Returns true when the event edited or moved
    /// anything, false when it is not a text-editing key.
    pub fn handle_key(&mut self, key: &KeyEvent) -> bool {
        match key.code {
            KeyCode::Char(c) => {
                self.text.insert(self.cursor, c);
                self.cursor += c.len_utf8();
                true
            }
            KeyCode::Backspace => {
                if let Some(prev) = self.text[..self.cursor].chars().last() {
                    let start = self.cursor - prev.len_utf8();
                    self.text.drain(start..self.cursor);
                    self.cursor = start;
                }
                true
            }
            KeyCode::Left => {
                if let Some(prev) = self.text[..self.cursor].chars().last() {
                    self.cursor -= prev.len_utf8();
                }
                true
            }
            KeyCode::Right => {
                if let Some(next) = self.text[self.cursor..].chars().next() {
                    self.cursor += next.len_utf8();
                }
                true
            }
            KeyCode::Home => {
                self.cursor = 0;
                true
            }
            KeyCode::End => {
                self.cursor = self.text.len();
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn editing_stays_on_utf8_boundaries() {
        let mut input = TextInputState::with_text("Flöw");
        input.handle_key(&key(KeyCode::Backspace));
        assert_eq!(input.text(), "Flö");
        input.handle_key(&key(KeyCode::Left));
        input.handle_key(&key(KeyCode::Backspace));
        assert_eq!(input.text(), "Fö");
        input.handle_key(&key(KeyCode::End));
        input.handle_key(&key(KeyCode::Char('w')));
        assert_eq!(input.text(), "Föw");
    }

    #[test]
    fn cursor_column_counts_chars_not_bytes() {
        let mut input = TextInputState::with_text("öö");
        assert_eq!(input.cursor_column(), 2);
        input.handle_key(&key(KeyCode::Left));
        assert_eq!(input.cursor_column(), 1);
    }

    #[test]
    fn non_editing_keys_are_reported_unhandled() {
        let mut input = TextInputState::with_text("x");
        assert!(!input.handle_key(&key(KeyCode::Tab)));
        assert!(!input.handle_key(&key(KeyCode::Enter)));
        assert_eq!(input.text(), "x");
    }
}
