use std::io::ErrorKind;
use std::path::Path;
use std::path::PathBuf;

use composer_tui::MessageLocale;
use toml_edit::DocumentMut;
use toml_edit::Item as TomlItem;

/// Values read from `config.toml`. Every field is optional; missing or malformed entries fall
/// back to the built-in defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComposerConfig {
    pub locale: Option<MessageLocale>,
    pub placeholder: Option<String>,
    pub send_delay_ms: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn new_default() -> anyhow::Result<Self> {
        let Some(home) = dirs::home_dir() else {
            anyhow::bail!("cannot determine home directory for config path");
        };
        Ok(Self::new(default_config_path(&home)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> anyhow::Result<ComposerConfig> {
        let Some(content) = read_document_string(&self.path)? else {
            return Ok(ComposerConfig::default());
        };

        match content.parse::<DocumentMut>() {
            Ok(doc) => Ok(read_config(&doc)),
            Err(err) => {
                tracing::warn!(
                    "{} is not valid TOML, reading keys line by line: {err}",
                    self.path.display()
                );
                Ok(parse_config_fallback(&content))
            }
        }
    }
}

pub fn app_home(home: &Path) -> PathBuf {
    home.join(".prompt-composer")
}

fn default_config_path(home: &Path) -> PathBuf {
    app_home(home).join("config.toml")
}

fn read_config(doc: &DocumentMut) -> ComposerConfig {
    let locale = doc
        .get("locale")
        .and_then(TomlItem::as_str)
        .and_then(parse_locale);
    let placeholder = doc
        .get("placeholder")
        .and_then(TomlItem::as_str)
        .map(str::to_string);
    let send_delay_ms = doc
        .get("send")
        .and_then(TomlItem::as_table)
        .and_then(|send| send.get("delay_ms"))
        .and_then(TomlItem::as_integer)
        .and_then(|ms| u64::try_from(ms).ok());

    ComposerConfig {
        locale,
        placeholder,
        send_delay_ms,
    }
}

fn parse_config_fallback(contents: &str) -> ComposerConfig {
    let mut config = ComposerConfig::default();
    let mut table: Option<&str> = None;

    for line in contents.lines() {
        let trimmed = line.trim_start();
        if trimmed.starts_with('[') {
            table = parse_table_header_name(trimmed);
            continue;
        }

        let Some(line) = strip_toml_comment(trimmed) else {
            continue;
        };
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let value = value.trim();

        match (table, key.trim()) {
            (None, "locale") => {
                if let Some(locale) = unquote(value).and_then(parse_locale) {
                    config.locale = Some(locale);
                }
            }
            (None, "placeholder") => {
                if let Some(placeholder) = unquote(value) {
                    config.placeholder = Some(placeholder.to_string());
                }
            }
            (Some("send"), "delay_ms") => {
                let token = value.split_whitespace().next().unwrap_or_default();
                if let Ok(ms) = token.parse::<u64>() {
                    config.send_delay_ms = Some(ms);
                }
            }
            _ => {}
        }
    }

    config
}

fn parse_locale(raw: &str) -> Option<MessageLocale> {
    match raw.parse() {
        Ok(locale) => Some(locale),
        Err(err) => {
            tracing::warn!("ignoring config locale: {err}");
            None
        }
    }
}

fn unquote(value: &str) -> Option<&str> {
    value
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .or_else(|| {
            value
                .strip_prefix('\'')
                .and_then(|rest| rest.strip_suffix('\''))
        })
}

fn parse_table_header_name(line: &str) -> Option<&str> {
    let line = line.trim_start();
    if !line.starts_with('[') {
        return None;
    }
    let end = line.find(']')?;
    if end <= 1 {
        return None;
    }
    let name = line[1..end].trim();
    if name.is_empty() {
        return None;
    }
    Some(name)
}

fn strip_toml_comment(line: &str) -> Option<&str> {
    let line = line.split_once('#').map_or(line, |(head, _)| head).trim();
    if line.is_empty() { None } else { Some(line) }
}

fn read_document_string(path: &Path) -> anyhow::Result<Option<String>> {
    match std::fs::read_to_string(path) {
        Ok(contents) => Ok(Some(contents)),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
        Err(err) => Err(anyhow::Error::new(err).context("read config.toml")),
    }
}
