use std::path::Path;
use std::path::PathBuf;

use anyhow::Context;
use chrono::SecondsFormat;
use chrono::Utc;
use composer_protocol::user_input::UserInput;
use serde::Serialize;
use tokio::io::AsyncWriteExt;

/// One line of the transcript file.
#[derive(Debug, Serialize)]
struct TranscriptRecord<'a> {
    timestamp: String,
    input: &'a UserInput,
}

/// Append-only JSONL log of delivered submissions.
#[derive(Debug, Clone)]
pub struct Transcript {
    path: PathBuf,
}

impl Transcript {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn append(&self, text: &str) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("create transcript dir {}", parent.display()))?;
        }

        let input = UserInput::text(text);
        let record = TranscriptRecord {
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            input: &input,
        };
        let mut line = serde_json::to_string(&record).context("serialize transcript record")?;
        line.push('\n');

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .with_context(|| format!("open transcript {}", self.path.display()))?;
        file.write_all(line.as_bytes())
            .await
            .with_context(|| format!("write transcript {}", self.path.display()))?;
        file.flush().await.context("flush transcript")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn read_records(path: &Path) -> Vec<serde_json::Value> {
        std::fs::read_to_string(path)
            .expect("read transcript")
            .lines()
            .map(|line| serde_json::from_str(line).expect("parse record"))
            .collect()
    }

    #[tokio::test]
    async fn appends_one_record_per_submission() {
        let dir = tempfile::tempdir().expect("tempdir");
        let transcript = Transcript::new(dir.path().join("nested").join("transcript.jsonl"));

        transcript.append("first").await.expect("append");
        transcript.append("  second\nline ").await.expect("append");

        let records = read_records(transcript.path());
        assert_eq!(records.len(), 2);
        assert_eq!(
            records[0]["input"],
            serde_json::json!({ "type": "text", "text": "first" })
        );
        assert_eq!(
            records[1]["input"],
            serde_json::json!({ "type": "text", "text": "  second\nline " })
        );
    }

    #[tokio::test]
    async fn timestamps_are_rfc3339_utc() {
        let dir = tempfile::tempdir().expect("tempdir");
        let transcript = Transcript::new(dir.path().join("transcript.jsonl"));
        transcript.append("hello").await.expect("append");

        let records = read_records(transcript.path());
        let timestamp = records[0]["timestamp"].as_str().expect("timestamp string");
        assert!(timestamp.ends_with('Z'), "{timestamp}");
        assert!(chrono::DateTime::parse_from_rfc3339(timestamp).is_ok());
    }
}
