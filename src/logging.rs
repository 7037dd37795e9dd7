//! Request journal: structured per-request entries appended to a JSONL file.
//!
//! Entries are handed to a background writer task over a channel, so request
//! handlers never touch the disk.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::path::Path;
use tokio::io::{AsyncWriteExt, BufWriter};
use tokio::sync::{mpsc, oneshot};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalEntry {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub component: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<Uuid>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<serde_json::Value>,
}

impl JournalEntry {
    pub fn new(level: LogLevel, component: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            level,
            component: component.into(),
            request_id: None,
            message: message.into(),
            context: None,
        }
    }

    #[must_use]
    pub fn for_request(mut self, id: Uuid) -> Self {
        self.request_id = Some(id);
        self
    }

    #[must_use]
    pub fn with_context(mut self, ctx: serde_json::Value) -> Self {
        self.context = Some(ctx);
        self
    }
}

enum Command {
    Record(JournalEntry),
    Flush(oneshot::Sender<()>),
}

/// Cloneable handle to the journal writer. A disabled journal drops entries.
#[derive(Clone)]
pub struct SharedJournal {
    tx: Option<mpsc::UnboundedSender<Command>>,
}

impl SharedJournal {
    /// Open (or create) the journal file for appending and start its writer
    /// task. Must be called inside a tokio runtime.
    pub fn open(file_path: impl AsRef<Path>) -> std::io::Result<Self> {
        let file_path = file_path.as_ref();

        if let Some(parent) = file_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(file_path)?;

        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(write_entries(tokio::fs::File::from_std(file), rx));

        Ok(Self { tx: Some(tx) })
    }

    pub fn disabled() -> Self {
        Self { tx: None }
    }

    pub fn record(&self, entry: JournalEntry) {
        if let Some(ref tx) = self.tx {
            let _ = tx.send(Command::Record(entry));
        }
    }

    pub fn info(&self, component: impl Into<String>, message: impl Into<String>) {
        self.record(JournalEntry::new(LogLevel::Info, component, message));
    }

    /// Record an entry tied to one inbound request.
    pub fn request(
        &self,
        level: LogLevel,
        id: Uuid,
        component: impl Into<String>,
        message: impl Into<String>,
    ) {
        self.record(JournalEntry::new(level, component, message).for_request(id));
    }

    pub fn request_with_context(
        &self,
        level: LogLevel,
        id: Uuid,
        component: impl Into<String>,
        message: impl Into<String>,
        context: serde_json::Value,
    ) {
        self.record(
            JournalEntry::new(level, component, message)
                .for_request(id)
                .with_context(context),
        );
    }

    /// Wait until every entry recorded before this call is on disk.
    pub async fn flush(&self) {
        if let Some(ref tx) = self.tx {
            let (done_tx, done_rx) = oneshot::channel();
            if tx.send(Command::Flush(done_tx)).is_ok() {
                let _ = done_rx.await;
            }
        }
    }
}

async fn write_entries(file: tokio::fs::File, mut rx: mpsc::UnboundedReceiver<Command>) {
    let mut writer = BufWriter::new(file);

    while let Some(command) = rx.recv().await {
        match command {
            Command::Record(entry) => {
                let Ok(mut line) = serde_json::to_string(&entry) else {
                    continue;
                };
                line.push('\n');
                if let Err(e) = writer.write_all(line.as_bytes()).await {
                    tracing::warn!(error = %e, "journal write failed");
                }
                // Flush once the queue drains so bursts share one write.
                if rx.is_empty() {
                    let _ = writer.flush().await;
                }
            }
            Command::Flush(done) => {
                let _ = writer.flush().await;
                let _ = done.send(());
            }
        }
    }

    let _ = writer.flush().await;
}
