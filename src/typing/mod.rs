//! Character-by-character typing simulation.
//!
//! The loop checks the session's control channel before every character
//! and after every timed pause. Sleeps race against control changes, so a
//! stop or pause is seen at the next suspension point.

pub mod timing;

use std::time::Duration;

use serde::Serialize;
use tokio::sync::watch;

pub use timing::TypingConfig;

use crate::error::AppError;
use crate::progress::{ProgressEmitter, ProgressTracker};
use crate::providers::keyboard::{self, Key, Keyboard};
use crate::session::SessionControl;
use crate::util::Jitter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "bindings", derive(ts_rs::TS))]
#[cfg_attr(feature = "bindings", ts(export))]
pub struct TypingOutcome {
    pub completed: bool,
    pub stopped: bool,
    pub characters_typed: usize,
    pub total_characters: usize,
}

impl TypingOutcome {
    fn finished(total: usize) -> Self {
        Self {
            completed: true,
            stopped: false,
            characters_typed: total,
            total_characters: total,
        }
    }

    fn stopped(typed: usize, total: usize) -> Self {
        Self {
            completed: false,
            stopped: true,
            characters_typed: typed,
            total_characters: total,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Stop,
}

enum Wake {
    Elapsed,
    Signalled,
    Closed,
}

/// Type `text` into the focused window.
///
/// Progress goes through `progress`; the returned outcome is the caller's
/// terminal payload. A keyboard failure aborts the run.
pub async fn type_text(
    text: &str,
    config: &TypingConfig,
    keys: &dyn Keyboard,
    control: &mut watch::Receiver<SessionControl>,
    rng: &mut Jitter,
    progress: &ProgressEmitter,
) -> Result<TypingOutcome, AppError> {
    let chars: Vec<char> = text.chars().collect();
    let total = chars.len();
    let mut tracker = ProgressTracker::new(total);
    tracker.advance(progress, 0);

    for (i, &c) in chars.iter().enumerate() {
        if hold(control).await == Flow::Stop {
            return Ok(TypingOutcome::stopped(i, total));
        }

        if rng.chance(config.typo_rate) {
            if let Some(wrong) = keyboard::typo_for(c, rng) {
                keys.press(Key::Char(wrong))?;
                // The wrong key is always taken back, even when stopping.
                let flow = pace(control, config.typo_notice()).await;
                keys.press(Key::Backspace)?;
                if flow == Flow::Stop || pace(control, config.typo_recover()).await == Flow::Stop {
                    return Ok(TypingOutcome::stopped(i, total));
                }
            }
        }

        keys.press(Key::Char(c))?;
        let typed = i + 1;
        tracker.advance(progress, typed);

        if typed < total && pace(control, config.delay_after(c, rng)).await == Flow::Stop {
            return Ok(TypingOutcome::stopped(typed, total));
        }
    }

    tracker.finish(progress);
    Ok(TypingOutcome::finished(total))
}

/// Wait out `delay`, honouring pause and stop while waiting.
async fn pace(control: &mut watch::Receiver<SessionControl>, delay: Duration) -> Flow {
    let sleep = tokio::time::sleep(delay);
    tokio::pin!(sleep);
    loop {
        if hold(control).await == Flow::Stop {
            return Flow::Stop;
        }
        let wake = tokio::select! {
            () = &mut sleep => Wake::Elapsed,
            changed = control.changed() => match changed {
                Ok(()) => Wake::Signalled,
                Err(_) => Wake::Closed,
            },
        };
        match wake {
            Wake::Elapsed => return hold(control).await,
            Wake::Signalled => {}
            Wake::Closed => {
                // Sender gone: no more directives can arrive.
                sleep.as_mut().await;
                return Flow::Continue;
            }
        }
    }
}

/// Block while paused. Returns once running again, or on stop.
async fn hold(control: &mut watch::Receiver<SessionControl>) -> Flow {
    loop {
        let state = *control.borrow_and_update();
        match state {
            SessionControl::Running => return Flow::Continue,
            SessionControl::Stopped => return Flow::Stop,
            SessionControl::Paused => {
                if control.changed().await.is_err() {
                    return Flow::Stop;
                }
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::emitter::{EventScope, MemorySink};
    use crate::events::{Event, ProgressPayload};
    use crate::providers::SimulatedKeyboard;

    fn progress_events(sink: &MemorySink) -> Vec<ProgressPayload> {
        sink.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Progress(p) => Some(p),
                _ => None,
            })
            .collect()
    }

    #[tokio::test(start_paused = true)]
    async fn types_whole_text_with_monotonic_progress() {
        let text = "Hello, world. This is a typing test.";
        let kb = SimulatedKeyboard::recording();
        let sink = Arc::new(MemorySink::new());
        let progress = ProgressEmitter::new(EventScope::new(sink.clone(), None));
        let (_tx, mut rx) = watch::channel(SessionControl::Running);

        let outcome = type_text(
            text,
            &TypingConfig::default(),
            &kb,
            &mut rx,
            &mut Jitter::seeded(1),
            &progress,
        )
        .await
        .unwrap();

        let n = text.chars().count();
        assert_eq!(outcome, TypingOutcome::finished(n));
        assert_eq!(kb.rendered(), text);

        let events = progress_events(&sink);
        assert!(events
            .windows(2)
            .all(|w| w[0].characters_typed <= w[1].characters_typed
                && w[0].percent_complete <= w[1].percent_complete));
        let (last, rest) = events.split_last().unwrap();
        assert_eq!(last.characters_typed, n);
        assert_eq!(last.total_characters, n);
        assert_eq!(last.percent_complete, 100);
        assert!(rest.iter().all(|p| p.characters_typed < n));
    }

    #[tokio::test(start_paused = true)]
    async fn typos_are_corrected() {
        let kb = SimulatedKeyboard::recording();
        let config = TypingConfig {
            typo_rate: 1.0,
            ..TypingConfig::default()
        };
        let (_tx, mut rx) = watch::channel(SessionControl::Running);
        type_text(
            "hello",
            &config,
            &kb,
            &mut rx,
            &mut Jitter::seeded(2),
            &ProgressEmitter::silent(),
        )
        .await
        .unwrap();
        assert_eq!(kb.rendered(), "hello");
        // wrong key, backspace, right key per character
        assert_eq!(kb.presses(), 15);
        assert_eq!(kb.transcript()[1], Key::Backspace);
    }

    #[tokio::test(start_paused = true)]
    async fn empty_text_completes_at_hundred() {
        let kb = SimulatedKeyboard::new();
        let sink = Arc::new(MemorySink::new());
        let progress = ProgressEmitter::new(EventScope::new(sink.clone(), None));
        let (_tx, mut rx) = watch::channel(SessionControl::Running);
        let outcome = type_text(
            "",
            &TypingConfig::default(),
            &kb,
            &mut rx,
            &mut Jitter::seeded(3),
            &progress,
        )
        .await
        .unwrap();
        assert!(outcome.completed);
        assert_eq!(progress_events(&sink), vec![ProgressPayload::new(0, 0)]);
        assert_eq!(kb.presses(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_ends_the_run_early() {
        let text = "a".repeat(200);
        let kb = Arc::new(SimulatedKeyboard::new());
        let (tx, mut rx) = watch::channel(SessionControl::Running);
        let worker = {
            let kb = Arc::clone(&kb);
            tokio::spawn(async move {
                type_text(
                    &text,
                    &TypingConfig::default(),
                    kb.as_ref(),
                    &mut rx,
                    &mut Jitter::seeded(4),
                    &ProgressEmitter::silent(),
                )
                .await
            })
        };

        tokio::time::sleep(Duration::from_secs(1)).await;
        tx.send(SessionControl::Stopped).unwrap();
        let outcome = worker.await.unwrap().unwrap();

        assert!(outcome.stopped);
        assert!(!outcome.completed);
        assert!(outcome.characters_typed > 0);
        assert!(outcome.characters_typed < 200);
        assert_eq!(outcome.characters_typed, kb.presses());
    }

    #[tokio::test(start_paused = true)]
    async fn pause_freezes_without_resetting() {
        let text = "b".repeat(100);
        let kb = Arc::new(SimulatedKeyboard::new());
        let (tx, mut rx) = watch::channel(SessionControl::Running);
        let worker = {
            let kb = Arc::clone(&kb);
            tokio::spawn(async move {
                type_text(
                    &text,
                    &TypingConfig::default(),
                    kb.as_ref(),
                    &mut rx,
                    &mut Jitter::seeded(5),
                    &ProgressEmitter::silent(),
                )
                .await
            })
        };

        tokio::time::sleep(Duration::from_millis(800)).await;
        tx.send(SessionControl::Paused).unwrap();
        let frozen = kb.presses();
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(kb.presses(), frozen);

        tx.send(SessionControl::Running).unwrap();
        let outcome = worker.await.unwrap().unwrap();
        assert!(outcome.completed);
        assert_eq!(kb.presses(), 100);
    }
}
