//! The footer renders the hint line under the composer.
//!
//! The footer is pure rendering: it formats `FooterProps` into a `Line` without mutating any
//! state. Which content is shown is decided by the `ChatComposer`, which derives the props from
//! its focus, picker and draft state on every render.
use crossterm::event::KeyCode;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Stylize;
use ratatui::text::Line;
use ratatui::text::Span;

use super::chat_composer::ComposerFocus;
use crate::key_hint;
use crate::key_hint::KeyBinding;
use crate::locale::MessageLocale;
use crate::render::Insets;
use crate::render::RectExt;
use crate::ui_consts::FOOTER_INDENT_COLS;

#[derive(Clone, Copy, Debug)]
pub struct FooterProps {
    pub mode: FooterMode,
    pub locale: MessageLocale,
    pub submit_disabled: bool,
    pub has_attachment: bool,
    /// Shown as the newline hint; Shift+Enter is only distinguishable with keyboard enhancement.
    pub newline_key: KeyBinding,
    /// Which key the user must press again to quit.
    ///
    /// This is rendered when `mode` is `FooterMode::QuitShortcutReminder`.
    pub quit_shortcut_key: KeyBinding,
}

/// Selects which footer content is rendered.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FooterMode {
    /// Key hints for the text field.
    ShortcutSummary,
    /// Tooltip for a focused control.
    Tooltip(ComposerFocus),
    /// The image path prompt is open.
    PickerPrompt,
    /// Transient "press again to quit" reminder (Ctrl+C on an empty draft).
    QuitShortcutReminder,
}

pub fn footer_height(_props: FooterProps) -> u16 {
    1
}

pub fn render_footer(area: Rect, buf: &mut Buffer, props: FooterProps) {
    if area.is_empty() {
        return;
    }
    let area = area.inset(Insets::tlbr(0, FOOTER_INDENT_COLS, 0, 0));
    buf.set_line(area.x, area.y, &footer_line(props), area.width);
}

pub(crate) fn footer_line(props: FooterProps) -> Line<'static> {
    match props.mode {
        FooterMode::ShortcutSummary => shortcut_summary_line(props),
        FooterMode::Tooltip(ComposerFocus::SendButton) => {
            let tooltip = Span::from(props.locale.send_tooltip());
            if props.submit_disabled {
                Line::from(vec![tooltip.dim()])
            } else {
                Line::from(vec![tooltip.bold()])
            }
        }
        FooterMode::Tooltip(ComposerFocus::AttachButton) => {
            let mut spans = vec![Span::from(props.locale.upload_tooltip()).bold()];
            if props.has_attachment {
                spans.push("   ".into());
                spans.push(key_hint::plain(KeyCode::Backspace).into());
                spans.push(" remove".dim());
            }
            Line::from(spans)
        }
        FooterMode::Tooltip(ComposerFocus::TextInput) => shortcut_summary_line(props),
        FooterMode::PickerPrompt => Line::from(vec![
            key_hint::plain(KeyCode::Enter).into(),
            " attach".dim(),
            "   ".into(),
            key_hint::plain(KeyCode::Esc).into(),
            " cancel".dim(),
        ]),
        FooterMode::QuitShortcutReminder => {
            Line::from(vec![props.quit_shortcut_key.into(), " again to quit".into()]).dim()
        }
    }
}

fn shortcut_summary_line(props: FooterProps) -> Line<'static> {
    let send: Span<'static> = key_hint::plain(KeyCode::Enter).into();
    let send_label = if props.submit_disabled {
        " send".dim()
    } else {
        " send".into()
    };
    Line::from(vec![
        send,
        send_label,
        "   ".into(),
        props.newline_key.into(),
        " newline".dim(),
        "   ".into(),
        key_hint::ctrl(KeyCode::Char('o')).into(),
        " image".dim(),
        "   ".into(),
        key_hint::plain(KeyCode::Tab).into(),
        " controls".dim(),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use insta::assert_snapshot;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;
    use ratatui::style::Modifier;

    fn props(mode: FooterMode) -> FooterProps {
        FooterProps {
            mode,
            locale: MessageLocale::En,
            submit_disabled: false,
            has_attachment: false,
            newline_key: key_hint::shift(KeyCode::Enter),
            quit_shortcut_key: key_hint::ctrl(KeyCode::Char('c')),
        }
    }

    fn snapshot_footer(name: &str, props: FooterProps) {
        let height = footer_height(props).max(1);
        let mut terminal = Terminal::new(TestBackend::new(80, height)).expect("terminal");
        terminal
            .draw(|f| {
                let area = Rect::new(0, 0, f.area().width, height);
                render_footer(area, f.buffer_mut(), props);
            })
            .expect("draw");
        assert_snapshot!(name, terminal.backend());
    }

    #[test]
    fn footer_snapshots() {
        snapshot_footer(
            "footer_shortcut_summary",
            props(FooterMode::ShortcutSummary),
        );

        snapshot_footer(
            "footer_shortcut_summary_ctrl_j_newline",
            FooterProps {
                newline_key: key_hint::ctrl(KeyCode::Char('j')),
                ..props(FooterMode::ShortcutSummary)
            },
        );

        snapshot_footer(
            "footer_send_tooltip",
            props(FooterMode::Tooltip(ComposerFocus::SendButton)),
        );

        snapshot_footer(
            "footer_send_tooltip_ja",
            FooterProps {
                locale: MessageLocale::Ja,
                ..props(FooterMode::Tooltip(ComposerFocus::SendButton))
            },
        );

        snapshot_footer(
            "footer_attach_tooltip",
            props(FooterMode::Tooltip(ComposerFocus::AttachButton)),
        );

        snapshot_footer(
            "footer_attach_tooltip_with_image",
            FooterProps {
                has_attachment: true,
                ..props(FooterMode::Tooltip(ComposerFocus::AttachButton))
            },
        );

        snapshot_footer(
            "footer_attach_tooltip_ja",
            FooterProps {
                locale: MessageLocale::Ja,
                ..props(FooterMode::Tooltip(ComposerFocus::AttachButton))
            },
        );

        snapshot_footer("footer_picker_prompt", props(FooterMode::PickerPrompt));

        snapshot_footer(
            "footer_ctrl_c_quit",
            props(FooterMode::QuitShortcutReminder),
        );
    }

    #[test]
    fn send_tooltip_dims_when_disabled() {
        let enabled = footer_line(props(FooterMode::Tooltip(ComposerFocus::SendButton)));
        assert!(!enabled.spans[0].style.add_modifier.contains(Modifier::DIM));

        let disabled = footer_line(FooterProps {
            submit_disabled: true,
            ..props(FooterMode::Tooltip(ComposerFocus::SendButton))
        });
        assert!(disabled.spans[0].style.add_modifier.contains(Modifier::DIM));
    }
}
