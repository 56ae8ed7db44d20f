#![allow(clippy::needless_pass_by_value)]

use std::sync::Arc;

use crate::error::AppError;
use crate::progress::ProgressEmitter;
use crate::registry::params::AutoTyperParams;
use crate::registry::{CommandOutput, CommandResult};
use crate::session::{ControlAck, SessionControl};
use crate::state::AppState;
use crate::typing;

/// Claims the session slot, focuses the window, then types. The slot is
/// freed when the guard drops, on every exit path.
pub async fn auto_typer(
    state: Arc<AppState>,
    progress: ProgressEmitter,
    p: AutoTyperParams,
) -> Result<CommandOutput, AppError> {
    let config = p.typing_config(state.max_typing_speed());
    let total = p.text.chars().count();

    let mut session = state.sessions.begin(&p.window_id, total)?;
    let window = state.providers.windows.focus(&p.window_id)?;
    tracing::info!(
        session = session.id(),
        window = %window.title,
        wpm = config.words_per_minute,
        typo_rate = config.typo_rate,
        total,
        "typing started"
    );

    let mut rng = state.jitter.draw();
    let outcome = typing::type_text(
        &p.text,
        &config,
        state.providers.keyboard.as_ref(),
        session.control(),
        &mut rng,
        &progress,
    )
    .await?;

    let message = if outcome.stopped {
        format!(
            "Typing stopped after {} of {} characters",
            outcome.characters_typed, outcome.total_characters
        )
    } else {
        format!("Typed {} characters into '{}'", outcome.total_characters, window.title)
    };
    Ok(CommandOutput::new(message, CommandResult::AutoTyper(outcome)))
}

pub fn stop_typing(state: &Arc<AppState>) -> Result<CommandOutput, AppError> {
    let ack = state.sessions.stop();
    Ok(CommandOutput::new(ack_message(&ack, "stop"), CommandResult::StopTyping(ack)))
}

pub fn pause_typing(state: &Arc<AppState>) -> Result<CommandOutput, AppError> {
    let ack = state.sessions.pause();
    Ok(CommandOutput::new(ack_message(&ack, "pause"), CommandResult::PauseTyping(ack)))
}

pub fn resume_typing(state: &Arc<AppState>) -> Result<CommandOutput, AppError> {
    let ack = state.sessions.resume();
    Ok(CommandOutput::new(ack_message(&ack, "resume"), CommandResult::ResumeTyping(ack)))
}

fn ack_message(ack: &ControlAck, verb: &str) -> String {
    match ack.state {
        None => format!("No typing session to {verb}"),
        Some(SessionControl::Running) => "Typing session running".to_string(),
        Some(SessionControl::Paused) => "Typing session paused".to_string(),
        Some(SessionControl::Stopped) => "Typing session stopped".to_string(),
    }
}
