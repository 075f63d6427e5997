use std::fs::OpenOptions;
use std::io::Write;
use std::sync::{Mutex, PoisonError};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use toolgate_policy::PolicyGateDecision;

use crate::config::EventsConfig;

/// Fire-and-forget event sink.
///
/// `emit` never panics or propagates failures; the return value only says
/// whether the event was recorded.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: &str, payload: Value) -> bool;
}

/// One line of the JSONL stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Seconds since the Unix epoch.
    pub ts: f64,
    pub event: String,
    pub payload: Value,
}

impl EventRecord {
    pub fn now(event: &str, payload: Value) -> Self {
        let ts = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs_f64())
            .unwrap_or_default();
        let payload = match payload {
            Value::Null => Value::Object(Map::new()),
            other => other,
        };
        Self {
            ts,
            event: event.to_string(),
            payload,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum EmitError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Appends events to a JSONL file. Disabled emitters write nothing.
#[derive(Debug)]
pub struct JsonlEventEmitter {
    config: EventsConfig,
    write_lock: Mutex<()>,
}

impl JsonlEventEmitter {
    pub fn new(config: EventsConfig) -> Self {
        Self {
            config,
            write_lock: Mutex::new(()),
        }
    }

    pub fn from_env() -> Self {
        Self::new(EventsConfig::from_env())
    }

    pub fn config(&self) -> &EventsConfig {
        &self.config
    }

    fn append(&self, record: &EventRecord) -> Result<(), EmitError> {
        let line = serde_json::to_string(record)?;
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(parent) = self.config.output_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.config.output_path)?;
        writeln!(file, "{line}")?;
        Ok(())
    }
}

impl EventSink for JsonlEventEmitter {
    fn emit(&self, event: &str, payload: Value) -> bool {
        if !self.config.enabled {
            return false;
        }
        let record = EventRecord::now(event, payload);
        match self.append(&record) {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(
                    event,
                    path = %self.config.output_path.display(),
                    "failed to write event: {err}"
                );
                false
            }
        }
    }
}

/// Sink that drops everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopEventSink;

impl EventSink for NoopEventSink {
    fn emit(&self, _event: &str, _payload: Value) -> bool {
        false
    }
}

/// Record a gate decision under its own event type.
pub fn emit_gate_decision(sink: &dyn EventSink, decision: &PolicyGateDecision) -> bool {
    sink.emit(&decision.event_type, decision.to_payload())
}
