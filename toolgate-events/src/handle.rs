use std::sync::{Arc, PoisonError, RwLock};

use serde_json::Value;

use crate::emitter::{EventSink, NoopEventSink};

/// Explicitly constructed owner of the active event sink.
///
/// Created by process bootstrap and passed to whoever emits. `reset` puts
/// the no-op sink back, which is what tests use between cases.
pub struct EventSinkHandle {
    sink: RwLock<Arc<dyn EventSink>>,
}

impl EventSinkHandle {
    pub fn new(sink: Arc<dyn EventSink>) -> Self {
        Self {
            sink: RwLock::new(sink),
        }
    }

    pub fn noop() -> Self {
        Self::new(Arc::new(NoopEventSink))
    }

    pub fn get(&self) -> Arc<dyn EventSink> {
        Arc::clone(&self.sink.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Swap in a new sink; returns the previous one.
    pub fn install(&self, sink: Arc<dyn EventSink>) -> Arc<dyn EventSink> {
        let mut guard = self.sink.write().unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *guard, sink)
    }

    pub fn reset(&self) {
        self.install(Arc::new(NoopEventSink));
    }

    pub fn emit(&self, event: &str, payload: Value) -> bool {
        self.get().emit(event, payload)
    }
}

impl Default for EventSinkHandle {
    fn default() -> Self {
        Self::noop()
    }
}

impl std::fmt::Debug for EventSinkHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventSinkHandle").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingSink {
        events: Mutex<Vec<String>>,
    }

    impl EventSink for RecordingSink {
        fn emit(&self, event: &str, _payload: Value) -> bool {
            self.events.lock().unwrap().push(event.to_string());
            true
        }
    }

    #[test]
    fn test_default_handle_is_noop() {
        let handle = EventSinkHandle::default();
        assert!(!handle.emit("run.started", json!({})));
    }

    #[test]
    fn test_install_routes_events_to_new_sink() {
        let handle = EventSinkHandle::default();
        let recorder = Arc::new(RecordingSink::default());
        handle.install(recorder.clone());

        assert!(handle.emit("run.started", json!({})));
        assert!(handle.emit("run.completed", json!({})));
        assert_eq!(
            *recorder.events.lock().unwrap(),
            vec!["run.started".to_string(), "run.completed".to_string()]
        );
    }

    #[test]
    fn test_reset_restores_noop() {
        let handle = EventSinkHandle::new(Arc::new(RecordingSink::default()));
        assert!(handle.emit("before", json!({})));
        handle.reset();
        assert!(!handle.emit("after", json!({})));
    }
}
