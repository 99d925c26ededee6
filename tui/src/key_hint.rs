use crossterm::event::KeyCode;
use crossterm::event::KeyModifiers;
use ratatui::style::Style;
use ratatui::style::Stylize;
use ratatui::text::Span;

/// A key plus modifiers, rendered as a compact hint such as `ctrl+c` or `shift+⏎`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyBinding {
    key: KeyCode,
    modifiers: KeyModifiers,
}

impl KeyBinding {
    pub const fn new(key: KeyCode, modifiers: KeyModifiers) -> Self {
        Self { key, modifiers }
    }
}

pub const fn plain(key: KeyCode) -> KeyBinding {
    KeyBinding::new(key, KeyModifiers::NONE)
}

pub const fn ctrl(key: KeyCode) -> KeyBinding {
    KeyBinding::new(key, KeyModifiers::CONTROL)
}

pub const fn shift(key: KeyCode) -> KeyBinding {
    KeyBinding::new(key, KeyModifiers::SHIFT)
}

pub fn has_ctrl_or_alt(mods: KeyModifiers) -> bool {
    mods.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
}

fn modifiers_label(modifiers: KeyModifiers) -> String {
    let mut label = String::new();
    if modifiers.contains(KeyModifiers::CONTROL) {
        label.push_str("ctrl+");
    }
    if modifiers.contains(KeyModifiers::ALT) {
        label.push_str("alt+");
    }
    if modifiers.contains(KeyModifiers::SHIFT) {
        label.push_str("shift+");
    }
    label
}

fn key_label(key: KeyCode) -> String {
    match key {
        KeyCode::Enter => "⏎".to_string(),
        KeyCode::Esc => "esc".to_string(),
        KeyCode::Tab => "tab".to_string(),
        KeyCode::Backspace => "⌫".to_string(),
        KeyCode::Char(c) => c.to_ascii_lowercase().to_string(),
        other => format!("{other}").to_ascii_lowercase(),
    }
}

impl From<KeyBinding> for Span<'static> {
    fn from(binding: KeyBinding) -> Self {
        Span::styled(
            format!("{}{}", modifiers_label(binding.modifiers), key_label(binding.key)),
            Style::default(),
        )
        .bold()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn bindings_render_modifiers_then_key() {
        let span: Span<'static> = ctrl(KeyCode::Char('V')).into();
        assert_eq!(span.content, "ctrl+v");
        let span: Span<'static> = shift(KeyCode::Enter).into();
        assert_eq!(span.content, "shift+⏎");
        let span: Span<'static> = plain(KeyCode::Tab).into();
        assert_eq!(span.content, "tab");
    }
}
