#![allow(clippy::needless_pass_by_value)]

use std::sync::Arc;

use crate::error::AppError;
use crate::registry::catalog;
use crate::registry::params::HelpParams;
use crate::registry::{CommandOutput, CommandResult};
use crate::state::AppState;

pub fn help(_state: &Arc<AppState>, p: HelpParams) -> Result<CommandOutput, AppError> {
    let text = catalog::help_text(p.topic.as_deref());
    Ok(CommandOutput::new(text.clone(), CommandResult::Help(text)))
}
