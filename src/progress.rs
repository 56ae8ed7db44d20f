use crate::emitter::EventScope;
use crate::events::{Event, ProgressPayload};

/// Handler-facing half of an [`EventScope`]: can only emit progress.
/// Terminal events belong to the dispatcher.
#[derive(Clone)]
pub struct ProgressEmitter {
    scope: Option<EventScope>,
}

impl ProgressEmitter {
    pub(crate) fn new(scope: EventScope) -> Self {
        Self { scope: Some(scope) }
    }

    /// An emitter that drops everything.
    pub fn silent() -> Self {
        Self { scope: None }
    }

    pub fn emit(&self, payload: ProgressPayload) {
        if let Some(scope) = &self.scope {
            scope.emit(&Event::Progress(payload));
        }
    }
}

/// Tracks the last reported percentage so progress is only emitted when it
/// moves. Never reports `typed == total` before [`ProgressTracker::finish`].
pub struct ProgressTracker {
    total: usize,
    last_percent: Option<u8>,
}

impl ProgressTracker {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            last_percent: None,
        }
    }

    pub fn advance(&mut self, emitter: &ProgressEmitter, typed: usize) {
        if typed >= self.total {
            return;
        }
        let payload = ProgressPayload::new(typed, self.total);
        if self.last_percent == Some(payload.percent_complete) {
            return;
        }
        self.last_percent = Some(payload.percent_complete);
        emitter.emit(payload);
    }

    pub fn finish(self, emitter: &ProgressEmitter) {
        emitter.emit(ProgressPayload::new(self.total, self.total));
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::emitter::MemorySink;

    fn progress_of(sink: &MemorySink) -> Vec<ProgressPayload> {
        sink.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Progress(p) => Some(p),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn emits_only_on_percent_change() {
        let sink = Arc::new(MemorySink::new());
        let emitter = ProgressEmitter::new(EventScope::new(sink.clone(), None));
        let mut tracker = ProgressTracker::new(1000);
        for typed in 1..=1000 {
            tracker.advance(&emitter, typed);
        }
        tracker.finish(&emitter);

        let events = progress_of(&sink);
        // 0..=99 percent once each, then the final 100.
        assert_eq!(events.len(), 101);
        assert!(events.windows(2).all(|w| w[0].characters_typed <= w[1].characters_typed));
        let last = events.last().unwrap();
        assert!(last.is_complete());
        assert_eq!(events.iter().filter(|p| p.characters_typed == 1000).count(), 1);
    }

    #[test]
    fn short_text_never_reports_total_early() {
        let sink = Arc::new(MemorySink::new());
        let emitter = ProgressEmitter::new(EventScope::new(sink.clone(), None));
        let mut tracker = ProgressTracker::new(2);
        tracker.advance(&emitter, 1);
        tracker.advance(&emitter, 2);
        tracker.finish(&emitter);
        let events = progress_of(&sink);
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].percent_complete, 50);
        assert_eq!(events[1].percent_complete, 100);
    }

    #[test]
    fn silent_emitter_drops_events() {
        let emitter = ProgressEmitter::silent();
        emitter.emit(ProgressPayload::new(1, 1));
    }
}
