#![allow(clippy::needless_pass_by_value)]

use std::sync::Arc;

use crate::error::AppError;
use crate::registry::params::{HumanizeTextParams, TextParams};
use crate::registry::{CommandOutput, CommandResult};
use crate::state::AppState;

pub fn humanize_text(
    state: &Arc<AppState>,
    p: HumanizeTextParams,
) -> Result<CommandOutput, AppError> {
    let options = p.options();
    let mut rng = state.jitter.draw();
    let humanized = state.providers.humanizer.humanize(&p.text, &options, &mut rng)?;
    Ok(CommandOutput::new(
        format!(
            "Humanized {} characters (complexity {}, vocabulary {})",
            p.text.chars().count(),
            options.sentence_complexity,
            options.vocabulary_level
        ),
        CommandResult::HumanizeText(humanized),
    ))
}

pub fn check_plagiarism(state: &Arc<AppState>, p: TextParams) -> Result<CommandOutput, AppError> {
    let mut rng = state.jitter.draw();
    let report = state.providers.plagiarism.check(&p.text, &mut rng)?;
    Ok(CommandOutput::new(
        format!(
            "Similarity {:.0}% across {} sources",
            report.similarity_score * 100.0,
            report.sources.len()
        ),
        CommandResult::CheckPlagiarism(report),
    ))
}
