#![allow(clippy::needless_pass_by_value)]

use std::sync::Arc;

use crate::error::AppError;
use crate::registry::params::SelectWindowParams;
use crate::registry::{CommandOutput, CommandResult};
use crate::state::AppState;

pub fn get_windows(state: &Arc<AppState>) -> Result<CommandOutput, AppError> {
    let windows = state.providers.windows.list();
    Ok(CommandOutput::new(
        format!("{} windows", windows.len()),
        CommandResult::GetWindows(windows),
    ))
}

/// An unknown id is a normal result with `selected: false`, not an error.
pub fn select_window(
    state: &Arc<AppState>,
    p: SelectWindowParams,
) -> Result<CommandOutput, AppError> {
    let selection = state.providers.windows.select(&p.window_id);
    let message = if selection.selected {
        format!("Selected window {}", p.window_id)
    } else {
        format!("Window {} not found", p.window_id)
    };
    Ok(CommandOutput::new(message, CommandResult::SelectWindow(selection)))
}
