mod config;
mod logging;
mod transcript;

use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use composer_tui::AppExitInfo;
use composer_tui::ComposerTui;
use composer_tui::DEFAULT_PLACEHOLDER;
use composer_tui::ExitReason;
use composer_tui::MessageLocale;
use composer_tui::PromptFormOptions;

use crate::config::ComposerConfig;
use crate::config::ConfigStore;
use crate::transcript::Transcript;

const DEFAULT_SEND_DELAY_MS: u64 = 500;

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Compose messages with image attachments and record what is sent"
)]
struct Cli {
    /// Path to the config file (defaults to `~/.prompt-composer/config.toml`).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Language for tooltips and error toasts (`en` or `ja`). Detected from the system locale
    /// when neither this flag nor the config file sets it.
    #[arg(long, env = "COMPOSER_LOCALE")]
    locale: Option<MessageLocale>,

    /// JSONL file every delivered message is appended to.
    #[arg(long, value_name = "PATH")]
    transcript: Option<PathBuf>,

    /// Simulated send latency in milliseconds.
    #[arg(long, value_name = "MS")]
    send_delay_ms: Option<u64>,
}

/// Effective settings after layering CLI flags over the config file.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Settings {
    locale: MessageLocale,
    placeholder: String,
    send_delay: Duration,
    transcript_path: PathBuf,
}

fn resolve_settings(cli: &Cli, config: ComposerConfig, app_home: &Path) -> Settings {
    let locale = cli
        .locale
        .or(config.locale)
        .unwrap_or_else(MessageLocale::detect);
    let placeholder = config
        .placeholder
        .unwrap_or_else(|| DEFAULT_PLACEHOLDER.to_string());
    let send_delay_ms = cli
        .send_delay_ms
        .or(config.send_delay_ms)
        .unwrap_or(DEFAULT_SEND_DELAY_MS);
    let transcript_path = cli
        .transcript
        .clone()
        .unwrap_or_else(|| app_home.join("transcript.jsonl"));

    Settings {
        locale,
        placeholder,
        send_delay: Duration::from_millis(send_delay_ms),
        transcript_path,
    }
}

fn exit_summary_lines(exit: &AppExitInfo, transcript_path: &Path) -> Vec<String> {
    let mut lines = Vec::new();
    if exit.exit_reason == ExitReason::InputClosed {
        lines.push("terminal input closed".to_string());
    }
    lines.push(format!(
        "sent {} message(s), transcript: {}",
        exit.submitted,
        transcript_path.display()
    ));
    if !exit.unsent.is_empty() {
        lines.push(format!("{} queued message(s) were not sent:", exit.unsent.len()));
        lines.extend(exit.unsent.iter().map(|text| format!("  ↳ {text}")));
    }
    lines
}

#[tokio::main(flavor = "multi_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let home = dirs::home_dir().context("cannot determine home directory")?;
    let app_home = config::app_home(&home);

    let _log_guard = match logging::init(&app_home.join("log")) {
        Ok(guard) => Some(guard),
        Err(err) => {
            eprintln!("warning: failed to set up logging: {err:#}");
            None
        }
    };

    let store = match &cli.config {
        Some(path) => ConfigStore::new(path.clone()),
        None => ConfigStore::new_default()?,
    };
    let file_config = store.load().unwrap_or_else(|err| {
        eprintln!(
            "warning: failed to read config {}: {err:#}",
            store.path().display()
        );
        ComposerConfig::default()
    });

    let settings = resolve_settings(&cli, file_config, &app_home);
    tracing::info!(
        locale = settings.locale.as_str(),
        send_delay_ms = settings.send_delay.as_millis(),
        transcript = %settings.transcript_path.display(),
        "starting composer"
    );

    let transcript = Arc::new(Transcript::new(settings.transcript_path.clone()));
    let send_delay = settings.send_delay;
    let options = PromptFormOptions {
        placeholder: settings.placeholder,
        locale: settings.locale,
    };

    let mut ui = ComposerTui::new()?;
    let exit = ui
        .run(options, move |text| {
            let transcript = Arc::clone(&transcript);
            async move {
                tokio::time::sleep(send_delay).await;
                match transcript.append(&text).await {
                    Ok(()) => tracing::info!("delivered message ({} bytes)", text.len()),
                    Err(err) => tracing::error!("failed to record message: {err:#}"),
                }
            }
        })
        .await;
    // Leave the alternate screen before writing the summary.
    drop(ui);
    let exit = exit?;

    tracing::info!(
        submitted = exit.submitted,
        unsent = exit.unsent.len(),
        "composer exited: {:?}",
        exit.exit_reason
    );
    for line in exit_summary_lines(&exit, &settings.transcript_path) {
        eprintln!("{line}");
    }

    Ok(())
}
