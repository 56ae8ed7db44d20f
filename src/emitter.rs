use std::io::Write;
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::Value;

use crate::events::Event;

/// Destination for outbound events. Implementations must deliver events in
/// the order `emit` is called.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: &Event, correlation: Option<&str>);
}

/// Writes each event as one JSON line and flushes immediately.
pub struct JsonLinesSink<W: Write + Send> {
    out: Mutex<W>,
}

impl<W: Write + Send> JsonLinesSink<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }
}

impl JsonLinesSink<std::io::Stdout> {
    /// Blocking writes to stdout. Callers on tokio worker threads rely on
    /// each event being a single short line.
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write + Send> EventSink for JsonLinesSink<W> {
    fn emit(&self, event: &Event, correlation: Option<&str>) {
        let line = event.to_wire(correlation).to_string();
        let mut out = self.out.lock();
        if let Err(e) = writeln!(out, "{line}").and_then(|()| out.flush()) {
            tracing::warn!(error = %e, kind = event.kind(), "failed to write event");
        }
    }
}

/// Collects events in memory. Used by tests and by callers that want to
/// inspect the stream after the fact.
#[derive(Default)]
pub struct MemorySink {
    events: Mutex<Vec<(Event, Option<String>)>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().iter().map(|(e, _)| e.clone()).collect()
    }

    pub fn wire(&self) -> Vec<Value> {
        self.events
            .lock()
            .iter()
            .map(|(e, id)| e.to_wire(id.as_deref()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }
}

impl EventSink for MemorySink {
    fn emit(&self, event: &Event, correlation: Option<&str>) {
        self.events
            .lock()
            .push((event.clone(), correlation.map(ToString::to_string)));
    }
}

/// A sink bound to one dispatch, tagging every event with the request's
/// correlation id (if the host sent one).
#[derive(Clone)]
pub struct EventScope {
    sink: Arc<dyn EventSink>,
    correlation: Option<String>,
}

impl EventScope {
    pub fn new(sink: Arc<dyn EventSink>, correlation: Option<String>) -> Self {
        Self { sink, correlation }
    }

    pub(crate) fn emit(&self, event: &Event) {
        self.sink.emit(event, self.correlation.as_deref());
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::events::ProgressPayload;

    #[test]
    fn json_lines_are_newline_delimited() {
        let sink = JsonLinesSink::new(Vec::new());
        sink.emit(&Event::Progress(ProgressPayload::new(1, 2)), None);
        sink.emit(
            &Event::Error {
                message: "bad".into(),
                code: "ProviderFailure",
            },
            Some("a"),
        );
        let bytes = sink.out.into_inner();
        let text = String::from_utf8(bytes).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        let second: Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(second["type"], "error");
        assert_eq!(second["id"], "a");
    }

    #[test]
    fn scope_tags_correlation_id() {
        let sink = Arc::new(MemorySink::new());
        let scope = EventScope::new(sink.clone(), Some("req-1".into()));
        scope.emit(&Event::Progress(ProgressPayload::new(0, 4)));
        assert_eq!(sink.len(), 1);
        assert_eq!(sink.wire()[0]["id"], "req-1");
    }
}
