//! The single typing session slot.
//!
//! A running `auto_typer` owns a [`SessionGuard`]; `stop_typing`,
//! `pause_typing` and `resume_typing` reach the running loop through the
//! manager's watch channel. Dropping the guard frees the slot.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;
use tokio::sync::watch;

use crate::error::AppError;

/// Lifecycle directive observed by the typing loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "bindings", derive(ts_rs::TS))]
#[cfg_attr(feature = "bindings", ts(export))]
pub enum SessionControl {
    Running,
    Paused,
    Stopped,
}

/// Result data of the stop/pause/resume commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "bindings", derive(ts_rs::TS))]
#[cfg_attr(feature = "bindings", ts(export))]
pub struct ControlAck {
    pub active: bool,
    pub state: Option<SessionControl>,
}

impl ControlAck {
    fn idle() -> Self {
        Self {
            active: false,
            state: None,
        }
    }
}

struct ActiveSession {
    id: u64,
    control: watch::Sender<SessionControl>,
}

#[derive(Default)]
pub struct SessionManager {
    active: Mutex<Option<ActiveSession>>,
    started: AtomicU64,
}

impl SessionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the slot. Fails with `SessionAlreadyActive` while another guard lives.
    pub fn begin(
        self: &Arc<Self>,
        window_id: &str,
        total: usize,
    ) -> Result<SessionGuard, AppError> {
        let mut slot = self.active.lock();
        if slot.is_some() {
            return Err(AppError::SessionAlreadyActive);
        }
        let id = self.started.fetch_add(1, Ordering::Relaxed) + 1;
        let (control, receiver) = watch::channel(SessionControl::Running);
        *slot = Some(ActiveSession { id, control });
        tracing::debug!(session = id, window = window_id, total, "typing session started");
        Ok(SessionGuard {
            manager: Arc::clone(self),
            id,
            receiver,
        })
    }

    pub fn stop(&self) -> ControlAck {
        self.signal(SessionControl::Stopped)
    }

    pub fn pause(&self) -> ControlAck {
        self.signal(SessionControl::Paused)
    }

    pub fn resume(&self) -> ControlAck {
        self.signal(SessionControl::Running)
    }

    /// A stopped session stays stopped; everything else is a plain state change.
    fn signal(&self, next: SessionControl) -> ControlAck {
        let slot = self.active.lock();
        let Some(session) = slot.as_ref() else {
            tracing::debug!(?next, "no active typing session");
            return ControlAck::idle();
        };
        session.control.send_if_modified(|current| {
            if *current == SessionControl::Stopped || *current == next {
                return false;
            }
            *current = next;
            true
        });
        let state = *session.control.borrow();
        tracing::debug!(session = session.id, ?state, "typing session signalled");
        ControlAck {
            active: true,
            state: Some(state),
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.lock().is_some()
    }

    /// Number of sessions ever started by this manager.
    pub fn sessions_started(&self) -> u64 {
        self.started.load(Ordering::Relaxed)
    }

    fn release(&self, id: u64) {
        let mut slot = self.active.lock();
        if slot.as_ref().is_some_and(|s| s.id == id) {
            *slot = None;
            tracing::debug!(session = id, "typing session released");
        }
    }
}

/// Ownership of the active slot plus the receiving end of its control channel.
pub struct SessionGuard {
    manager: Arc<SessionManager>,
    id: u64,
    receiver: watch::Receiver<SessionControl>,
}

impl SessionGuard {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn control(&mut self) -> &mut watch::Receiver<SessionControl> {
        &mut self.receiver
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        self.manager.release(self.id);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn second_begin_is_rejected() {
        let sessions = Arc::new(SessionManager::new());
        let _guard = sessions.begin("1", 10).unwrap();
        assert!(matches!(
            sessions.begin("2", 5),
            Err(AppError::SessionAlreadyActive)
        ));
        assert_eq!(sessions.sessions_started(), 1);
    }

    #[test]
    fn dropping_guard_frees_slot() {
        let sessions = Arc::new(SessionManager::new());
        let guard = sessions.begin("1", 10).unwrap();
        assert!(sessions.is_active());
        drop(guard);
        assert!(!sessions.is_active());
        assert!(sessions.begin("1", 10).is_ok());
        assert_eq!(sessions.sessions_started(), 2);
    }

    #[test]
    fn controls_without_session_are_noops() {
        let sessions = SessionManager::new();
        for ack in [sessions.stop(), sessions.pause(), sessions.resume()] {
            assert_eq!(ack, ControlAck::idle());
        }
    }

    #[test]
    fn pause_resume_reach_the_receiver() {
        let sessions = Arc::new(SessionManager::new());
        let mut guard = sessions.begin("1", 10).unwrap();
        assert_eq!(sessions.pause().state, Some(SessionControl::Paused));
        assert_eq!(*guard.control().borrow_and_update(), SessionControl::Paused);
        assert_eq!(sessions.resume().state, Some(SessionControl::Running));
        assert_eq!(*guard.control().borrow_and_update(), SessionControl::Running);
    }

    #[test]
    fn stop_is_final() {
        let sessions = Arc::new(SessionManager::new());
        let _guard = sessions.begin("1", 10).unwrap();
        sessions.stop();
        assert_eq!(sessions.resume().state, Some(SessionControl::Stopped));
        assert_eq!(sessions.pause().state, Some(SessionControl::Stopped));
        assert_eq!(sessions.stop().state, Some(SessionControl::Stopped));
    }

    #[test]
    fn ack_serializes_state_lowercase() {
        let sessions = Arc::new(SessionManager::new());
        let _guard = sessions.begin("3", 1).unwrap();
        let json = serde_json::to_value(sessions.pause()).unwrap();
        assert_eq!(json, serde_json::json!({"active": true, "state": "paused"}));
    }
}
