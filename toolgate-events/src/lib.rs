pub mod config;
pub mod emitter;
pub mod handle;

// Re-export key types for convenience.
pub use config::{DEFAULT_EVENTS_FILE, EVENTS_ENABLED_ENV, EVENTS_FILE_ENV, EventsConfig};
pub use emitter::{EventRecord, EventSink, JsonlEventEmitter, NoopEventSink, emit_gate_decision};
pub use handle::EventSinkHandle;
