//! Session event log.
//!
//! Each line of `events.jsonl` is one [`StudioEvent`] stamped with the
//! session id and a UTC timestamp. Events carry only typed fields, so there is
//! no slot for a credential.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use chrono::{SecondsFormat, Utc};
use serde::Serialize;

use crate::requests::{Feature, OutputKind};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StudioEvent {
    GenerationStarted {
        feature: Feature,
        model: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        model_note: Option<String>,
        /// Fingerprints of the input images.
        inputs: Vec<String>,
    },
    RetryScheduled {
        attempt: u32,
        retries_left: u32,
        delay_ms: u64,
        reason: String,
    },
    OperationSubmitted {
        operation: String,
        done: bool,
    },
    OperationPolled {
        tick: u32,
        done: bool,
    },
    PollBackoff {
        tick: u32,
        delay_ms: u64,
        reason: String,
    },
    ResultMaterialized {
        feature: Feature,
        kind: OutputKind,
    },
    GenerationFailed {
        feature: Feature,
        error: String,
        credential_rejected: bool,
    },
}

impl StudioEvent {
    pub fn name(&self) -> &'static str {
        match self {
            StudioEvent::GenerationStarted { .. } => "generation_started",
            StudioEvent::RetryScheduled { .. } => "retry_scheduled",
            StudioEvent::OperationSubmitted { .. } => "operation_submitted",
            StudioEvent::OperationPolled { .. } => "operation_polled",
            StudioEvent::PollBackoff { .. } => "poll_backoff",
            StudioEvent::ResultMaterialized { .. } => "result_materialized",
            StudioEvent::GenerationFailed { .. } => "generation_failed",
        }
    }
}

#[derive(Serialize)]
struct EventLine<'a> {
    session_id: &'a str,
    ts: String,
    #[serde(flatten)]
    event: &'a StudioEvent,
}

/// Appends [`StudioEvent`]s to a JSONL file. Clones share the file lock.
#[derive(Debug, Clone)]
pub struct EventLog {
    path: Arc<PathBuf>,
    session_id: Arc<str>,
    lock: Arc<Mutex<()>>,
}

impl EventLog {
    pub fn new(path: impl Into<PathBuf>, session_id: impl Into<String>) -> Self {
        Self {
            path: Arc::new(path.into()),
            session_id: Arc::from(session_id.into()),
            lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn record(&self, event: &StudioEvent) -> anyhow::Result<()> {
        let line = serde_json::to_string(&EventLine {
            session_id: &self.session_id,
            ts: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            event,
        })?;

        let _guard = self
            .lock
            .lock()
            .map_err(|_| anyhow::anyhow!("event log lock poisoned"))?;
        if let Some(parent) = self.path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.path.as_ref())?;
        writeln!(file, "{line}")?;
        Ok(())
    }
}
