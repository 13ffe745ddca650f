//! Input widgets for composer forms

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use tui_textarea::TextArea;

use crate::actions::{FieldKind, FieldSpec};
use crate::locale::Direction;

/// A form input that owns its own edit buffer
pub enum FormField {
    /// Single-line text input; `cursor_pos` counts chars, not bytes
    TextInput {
        value: String,
        cursor_pos: usize,
        placeholder: String,
    },
    /// Multi-line text input using tui-textarea
    TextArea {
        textarea: Box<TextArea<'static>>,
        placeholder: String,
    },
}

impl FormField {
    pub fn single_line(placeholder: impl Into<String>) -> Self {
        FormField::TextInput {
            value: String::new(),
            cursor_pos: 0,
            placeholder: placeholder.into(),
        }
    }

    pub fn multi_line(placeholder: impl Into<String>) -> Self {
        FormField::TextArea {
            textarea: Box::new(TextArea::default()),
            placeholder: placeholder.into(),
        }
    }

    /// Widget for a step field; json fields get a multi-line box
    pub fn for_field(spec: &FieldSpec) -> Self {
        let placeholder = spec.placeholder.clone().unwrap_or_default();
        match spec.kind {
            FieldKind::Text => Self::single_line(placeholder),
            FieldKind::Multiline | FieldKind::Json => Self::multi_line(placeholder),
        }
    }

    /// Get the current value as a string
    pub fn value(&self) -> String {
        match self {
            FormField::TextInput { value, .. } => value.clone(),
            FormField::TextArea { textarea, .. } => textarea.lines().join("\n"),
        }
    }

    /// Set the value from a string
    pub fn set_value(&mut self, new_value: &str) {
        match self {
            FormField::TextInput {
                value, cursor_pos, ..
            } => {
                *value = new_value.to_string();
                *cursor_pos = value.chars().count();
            }
            FormField::TextArea { textarea, .. } => {
                textarea.select_all();
                textarea.cut();
                textarea.insert_str(new_value);
            }
        }
    }

    pub fn set_placeholder(&mut self, text: &str) {
        match self {
            FormField::TextInput { placeholder, .. } | FormField::TextArea { placeholder, .. } => {
                *placeholder = text.to_string();
            }
        }
    }

    pub fn is_multiline(&self) -> bool {
        matches!(self, FormField::TextArea { .. })
    }

    /// Handle a key event, returns true if the value may have changed
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        match self {
            FormField::TextInput {
                value, cursor_pos, ..
            } => {
                if key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) {
                    return false;
                }
                let len = value.chars().count();
                match key.code {
                    KeyCode::Char(c) => {
                        value.insert(byte_index(value, *cursor_pos), c);
                        *cursor_pos += 1;
                        true
                    }
                    KeyCode::Backspace => {
                        if *cursor_pos > 0 {
                            *cursor_pos -= 1;
                            value.remove(byte_index(value, *cursor_pos));
                        }
                        true
                    }
                    KeyCode::Delete => {
                        if *cursor_pos < len {
                            value.remove(byte_index(value, *cursor_pos));
                        }
                        true
                    }
                    KeyCode::Left => {
                        *cursor_pos = cursor_pos.saturating_sub(1);
                        false
                    }
                    KeyCode::Right => {
                        *cursor_pos = (*cursor_pos + 1).min(len);
                        false
                    }
                    KeyCode::Home => {
                        *cursor_pos = 0;
                        false
                    }
                    KeyCode::End => {
                        *cursor_pos = len;
                        false
                    }
                    _ => false,
                }
            }
            FormField::TextArea { textarea, .. } => {
                // TextArea handles its own key events
                textarea.input(key)
            }
        }
    }

    /// Get the height needed to render this field, borders included
    pub fn render_height(&self) -> u16 {
        match self {
            FormField::TextInput { .. } => 3,
            FormField::TextArea { textarea, .. } => {
                (textarea.lines().len() as u16).clamp(3, 8) + 2
            }
        }
    }

    /// Render the field inside a titled box
    pub fn render(
        &mut self,
        frame: &mut Frame,
        area: Rect,
        title: &str,
        focused: bool,
        direction: Direction,
    ) {
        let border_color = if focused { Color::Cyan } else { Color::Gray };
        let alignment = match direction {
            Direction::Ltr => Alignment::Left,
            Direction::Rtl => Alignment::Right,
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .title(Line::from(title.to_string()).alignment(alignment))
            .border_style(Style::default().fg(border_color));

        match self {
            FormField::TextInput {
                value,
                cursor_pos,
                placeholder,
            } => {
                let content = if value.is_empty() && !focused {
                    Line::from(Span::styled(
                        placeholder.as_str(),
                        Style::default().fg(Color::DarkGray),
                    ))
                } else {
                    let mut text = value.clone();
                    if focused {
                        text.insert(byte_index(&text, *cursor_pos), '|');
                    }
                    Line::from(text)
                };

                let para = Paragraph::new(content)
                    .block(block)
                    .alignment(alignment)
                    .style(Style::default().fg(if focused {
                        Color::White
                    } else {
                        Color::Gray
                    }));
                frame.render_widget(para, area);
            }
            FormField::TextArea {
                textarea,
                placeholder,
            } => {
                textarea.set_cursor_line_style(Style::default());
                textarea.set_cursor_style(if focused {
                    Style::default().add_modifier(Modifier::REVERSED)
                } else {
                    Style::default()
                });
                textarea.set_alignment(alignment);
                textarea.set_block(block);
                textarea.set_placeholder_text(placeholder.clone());
                textarea.set_placeholder_style(Style::default().fg(Color::DarkGray));

                frame.render_widget(&**textarea, area);
            }
        }
    }
}

/// Byte offset of the `chars`-th character, or the end of the string
fn byte_index(value: &str, chars: usize) -> usize {
    value
        .char_indices()
        .nth(chars)
        .map(|(i, _)| i)
        .unwrap_or(value.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_text_input_handles_chars() {
        let mut field = FormField::single_line("test");

        assert!(field.handle_key(key(KeyCode::Char('h'))));
        assert!(field.handle_key(key(KeyCode::Char('i'))));
        assert_eq!(field.value(), "hi");
    }

    #[test]
    fn test_text_input_multibyte_editing() {
        let mut field = FormField::single_line("");
        for c in "مرحبا".chars() {
            field.handle_key(key(KeyCode::Char(c)));
        }
        field.handle_key(key(KeyCode::Left));
        field.handle_key(key(KeyCode::Backspace));
        assert_eq!(field.value(), "مرحا");

        field.handle_key(key(KeyCode::Home));
        field.handle_key(key(KeyCode::Delete));
        assert_eq!(field.value(), "رحا");
    }

    #[test]
    fn test_text_input_ignores_control_chords() {
        let mut field = FormField::single_line("");
        let ctrl_s = KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL);
        assert!(!field.handle_key(ctrl_s));
        assert_eq!(field.value(), "");
    }

    #[test]
    fn test_set_value_replaces_content() {
        let mut field = FormField::multi_line("");
        field.set_value("line one\nline two");
        assert_eq!(field.value(), "line one\nline two");
        field.set_value("x");
        assert_eq!(field.value(), "x");
    }

    #[test]
    fn test_for_field_picks_widget_by_kind() {
        let spec = |kind| FieldSpec {
            name: "f".to_string(),
            label_key: "f_label".to_string(),
            kind,
            placeholder: None,
        };
        assert!(!FormField::for_field(&spec(FieldKind::Text)).is_multiline());
        assert!(FormField::for_field(&spec(FieldKind::Multiline)).is_multiline());
        assert!(FormField::for_field(&spec(FieldKind::Json)).is_multiline());
    }

    #[test]
    fn test_render_height() {
        let mut area = FormField::multi_line("");
        assert_eq!(FormField::single_line("").render_height(), 3);
        assert_eq!(area.render_height(), 5);
        area.set_value("1\n2\n3\n4\n5\n6\n7\n8\n9\n10");
        assert_eq!(area.render_height(), 10);
    }
}
