//! Modal input owned by a view: yes/no confirmations and single-line text entry.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Single-line editor; the cursor is a char index
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextField {
    value: String,
    cursor: usize,
}

impl TextField {
    pub fn with_value(value: &str) -> Self {
        Self {
            value: value.to_string(),
            cursor: value.chars().count(),
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    pub fn clear(&mut self) {
        self.value.clear();
        self.cursor = 0;
    }

    fn byte_offset(&self, char_index: usize) -> usize {
        self.value
            .char_indices()
            .nth(char_index)
            .map(|(i, _)| i)
            .unwrap_or(self.value.len())
    }

    /// Apply an editing key. Returns false for keys the field does not use.
    pub fn handle_key(&mut self, key: &KeyEvent) -> bool {
        let len = self.value.chars().count();
        match key.code {
            KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => self.clear(),
            KeyCode::Char(_) if key.modifiers.contains(KeyModifiers::CONTROL) => return false,
            KeyCode::Char(c) => {
                let at = self.byte_offset(self.cursor);
                self.value.insert(at, c);
                self.cursor += 1;
            }
            KeyCode::Backspace => {
                if self.cursor > 0 {
                    self.cursor -= 1;
                    let at = self.byte_offset(self.cursor);
                    self.value.remove(at);
                }
            }
            KeyCode::Delete => {
                if self.cursor < len {
                    let at = self.byte_offset(self.cursor);
                    self.value.remove(at);
                }
            }
            KeyCode::Left => self.cursor = self.cursor.saturating_sub(1),
            KeyCode::Right => self.cursor = (self.cursor + 1).min(len),
            KeyCode::Home => self.cursor = 0,
            KeyCode::End => self.cursor = len,
            _ => return false,
        }
        true
    }
}

#[derive(Debug)]
pub enum Overlay<A> {
    Confirm {
        title: String,
        message: String,
        action: A,
    },
    Input {
        title: String,
        field: TextField,
        action: A,
    },
}

#[derive(Debug, PartialEq, Eq)]
pub enum OverlayOutcome<A> {
    /// Nothing open
    Inactive,
    /// Key consumed, overlay still open
    Pending,
    Cancelled(A),
    Answered { yes: bool, action: A },
    Submitted { value: String, action: A },
}

/// At most one overlay per view; `A` is the action waiting on it
#[derive(Debug)]
pub struct OverlaySlot<A> {
    current: Option<Overlay<A>>,
}

impl<A> Default for OverlaySlot<A> {
    fn default() -> Self {
        Self { current: None }
    }
}

impl<A> OverlaySlot<A> {
    pub fn confirm(&mut self, title: impl Into<String>, message: impl Into<String>, action: A) {
        self.current = Some(Overlay::Confirm {
            title: title.into(),
            message: message.into(),
            action,
        });
    }

    pub fn input(&mut self, title: impl Into<String>, initial: &str, action: A) {
        self.current = Some(Overlay::Input {
            title: title.into(),
            field: TextField::with_value(initial),
            action,
        });
    }

    pub fn is_active(&self) -> bool {
        self.current.is_some()
    }

    pub fn get(&self) -> Option<&Overlay<A>> {
        self.current.as_ref()
    }

    pub fn is_confirming(&self) -> bool {
        matches!(self.current, Some(Overlay::Confirm { .. }))
    }

    /// Confirmations answer to `y`, `n` and `Esc` only; text entry commits a
    /// non-empty value on `Enter` and hands every other key to the field.
    pub fn handle_key(&mut self, key: &KeyEvent) -> OverlayOutcome<A> {
        let Some(overlay) = self.current.take() else {
            return OverlayOutcome::Inactive;
        };

        match overlay {
            Overlay::Confirm {
                title,
                message,
                action,
            } => match key.code {
                KeyCode::Char('y') => OverlayOutcome::Answered { yes: true, action },
                KeyCode::Char('n') => OverlayOutcome::Answered { yes: false, action },
                KeyCode::Esc => OverlayOutcome::Cancelled(action),
                _ => {
                    self.current = Some(Overlay::Confirm {
                        title,
                        message,
                        action,
                    });
                    OverlayOutcome::Pending
                }
            },
            Overlay::Input {
                title,
                mut field,
                action,
            } => match key.code {
                KeyCode::Esc => OverlayOutcome::Cancelled(action),
                KeyCode::Enter if !field.value().trim().is_empty() => OverlayOutcome::Submitted {
                    value: field.value().trim().to_string(),
                    action,
                },
                _ => {
                    field.handle_key(key);
                    self.current = Some(Overlay::Input {
                        title,
                        field,
                        action,
                    });
                    OverlayOutcome::Pending
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn text_field_editing() {
        let mut field = TextField::with_value("ab");
        field.handle_key(&key(KeyCode::Left));
        field.handle_key(&key(KeyCode::Char('x')));
        assert_eq!(field.value(), "axb");
        field.handle_key(&key(KeyCode::Home));
        field.handle_key(&key(KeyCode::Delete));
        assert_eq!(field.value(), "xb");
        field.handle_key(&key(KeyCode::End));
        field.handle_key(&key(KeyCode::Backspace));
        assert_eq!(field.value(), "x");
        field.handle_key(&KeyEvent::new(KeyCode::Char('u'), KeyModifiers::CONTROL));
        assert!(field.is_empty());
    }

    #[test]
    fn text_field_handles_multibyte() {
        let mut field = TextField::with_value("é");
        field.handle_key(&key(KeyCode::Char('ü')));
        assert_eq!(field.value(), "éü");
        field.handle_key(&key(KeyCode::Left));
        field.handle_key(&key(KeyCode::Backspace));
        assert_eq!(field.value(), "ü");
        assert_eq!(field.cursor(), 0);
    }

    #[test]
    fn confirm_ignores_keys_outside_closed_set() {
        let mut slot = OverlaySlot::default();
        slot.confirm("Rename", "rename remote?", 7);
        assert_eq!(slot.handle_key(&key(KeyCode::Enter)), OverlayOutcome::Pending);
        assert_eq!(slot.handle_key(&key(KeyCode::Char('x'))), OverlayOutcome::Pending);
        assert_eq!(slot.handle_key(&key(KeyCode::Char('Y'))), OverlayOutcome::Pending);
        assert_eq!(slot.handle_key(&key(KeyCode::Char('N'))), OverlayOutcome::Pending);
        assert!(slot.is_active());
        assert_eq!(
            slot.handle_key(&key(KeyCode::Char('n'))),
            OverlayOutcome::Answered {
                yes: false,
                action: 7
            }
        );
        assert!(!slot.is_active());
    }

    #[test]
    fn confirm_escape_cancels() {
        let mut slot = OverlaySlot::default();
        slot.confirm("Rename", "rename remote?", ());
        assert_eq!(slot.handle_key(&key(KeyCode::Esc)), OverlayOutcome::Cancelled(()));
        assert_eq!(slot.handle_key(&key(KeyCode::Esc)), OverlayOutcome::Inactive);
    }

    #[test]
    fn input_submits_trimmed_value() {
        let mut slot = OverlaySlot::default();
        slot.input("New branch", "", "create");
        assert_eq!(slot.handle_key(&key(KeyCode::Enter)), OverlayOutcome::Pending);
        for c in " topic ".chars() {
            slot.handle_key(&key(KeyCode::Char(c)));
        }
        assert_eq!(
            slot.handle_key(&key(KeyCode::Enter)),
            OverlayOutcome::Submitted {
                value: "topic".to_string(),
                action: "create"
            }
        );
        assert!(!slot.is_active());
    }

    #[test]
    fn input_escape_cancels() {
        let mut slot = OverlaySlot::default();
        slot.input("Path", "/tmp/x", 1u8);
        slot.handle_key(&key(KeyCode::Char('y')));
        assert_eq!(slot.handle_key(&key(KeyCode::Esc)), OverlayOutcome::Cancelled(1));
    }
}
