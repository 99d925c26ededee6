//! User-visible strings in the languages the composer ships with.

use std::str::FromStr;

/// Language used for toasts and control tooltips.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MessageLocale {
    #[default]
    En,
    Ja,
}

impl MessageLocale {
    /// Pick a locale from the OS settings, falling back to English.
    pub fn detect() -> Self {
        sys_locale::get_locale()
            .map(|tag| Self::from_language_tag(&tag))
            .unwrap_or_default()
    }

    /// Map a BCP-47 tag such as `ja-JP` or `en_US.UTF-8` onto a supported locale.
    pub fn from_language_tag(tag: &str) -> Self {
        let language = tag
            .split(['-', '_', '.'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();
        match language.as_str() {
            "ja" => MessageLocale::Ja,
            _ => MessageLocale::En,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MessageLocale::En => "en",
            MessageLocale::Ja => "ja",
        }
    }

    pub fn oversized_attachment(self) -> &'static str {
        match self {
            MessageLocale::En => "file size may not exceed 5MB",
            MessageLocale::Ja => "ファイルサイズは5MBを超えることはできません",
        }
    }

    pub fn unsupported_image_type(self, extension: &str, accepted: &str) -> String {
        match self {
            MessageLocale::En => {
                format!("unsupported image type: {extension} (accepted: {accepted})")
            }
            MessageLocale::Ja => {
                format!("対応していない画像形式です: {extension}（対応形式: {accepted}）")
            }
        }
    }

    pub fn image_not_found(self, path: &str) -> String {
        match self {
            MessageLocale::En => format!("image not found: {path}"),
            MessageLocale::Ja => format!("画像が見つかりません: {path}"),
        }
    }

    pub fn not_an_image(self, path: &str) -> String {
        match self {
            MessageLocale::En => format!("not a readable image: {path}"),
            MessageLocale::Ja => format!("画像として読み込めません: {path}"),
        }
    }

    pub fn clipboard_paste_failed(self, err: &str) -> String {
        match self {
            MessageLocale::En => format!("failed to paste image: {err}"),
            MessageLocale::Ja => format!("画像を貼り付けできませんでした: {err}"),
        }
    }

    pub fn send_tooltip(self) -> &'static str {
        match self {
            MessageLocale::En => "Send message",
            MessageLocale::Ja => "メッセージを送信",
        }
    }

    pub fn upload_tooltip(self) -> &'static str {
        match self {
            MessageLocale::En => "Upload Image",
            MessageLocale::Ja => "画像をアップロード",
        }
    }

    pub fn image_path_prompt(self) -> &'static str {
        match self {
            MessageLocale::En => "Image path: ",
            MessageLocale::Ja => "画像のパス: ",
        }
    }
}

impl FromStr for MessageLocale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" => Ok(MessageLocale::En),
            "ja" => Ok(MessageLocale::Ja),
            other => Err(format!("unsupported locale `{other}` (expected `en` or `ja`)")),
        }
    }
}
