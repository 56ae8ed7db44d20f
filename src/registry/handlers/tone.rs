#![allow(clippy::needless_pass_by_value)]

use std::sync::Arc;

use crate::error::AppError;
use crate::providers::{AdjustedText, PresetId};
use crate::registry::params::{AdjustToneParams, ApplyTonePresetParams, TextParams};
use crate::registry::{CommandOutput, CommandResult};
use crate::state::AppState;

/// A known preset wins over the explicit levels; `custom` or an unknown id uses the levels.
pub fn adjust_tone(state: &Arc<AppState>, p: AdjustToneParams) -> Result<CommandOutput, AppError> {
    let tone = &state.providers.tone;
    let adjusted = match p.preset_id() {
        Some(id) => tone.apply_preset(&p.text, id)?,
        None => {
            let (formality, technical) = p.custom_levels();
            AdjustedText {
                adjusted_text: tone.adjust(&p.text, f64::from(formality), f64::from(technical))?,
                preset: None,
            }
        }
    };
    let message = match adjusted.preset {
        Some(id) => format!("Adjusted tone with the {id:?} preset"),
        None => "Adjusted tone with custom levels".to_string(),
    };
    Ok(CommandOutput::new(message, CommandResult::AdjustTone(adjusted)))
}

pub fn analyze_tone(state: &Arc<AppState>, p: TextParams) -> Result<CommandOutput, AppError> {
    let analysis = state.providers.tone.analyze(&p.text);
    Ok(CommandOutput::new(
        format!(
            "Formality {:.1}, technical {:.1}, closest preset {:?}",
            analysis.formality, analysis.technical_level, analysis.closest_preset
        ),
        CommandResult::AnalyzeTone(analysis),
    ))
}

pub fn apply_tone_preset(
    state: &Arc<AppState>,
    p: ApplyTonePresetParams,
) -> Result<CommandOutput, AppError> {
    let id = PresetId::parse(p.preset.trim())?;
    let adjusted = state.providers.tone.apply_preset(&p.text, id)?;
    Ok(CommandOutput::new(
        format!("Applied the {id:?} preset"),
        CommandResult::ApplyTonePreset(adjusted),
    ))
}

pub fn get_tone_presets(state: &Arc<AppState>) -> Result<CommandOutput, AppError> {
    let presets = state.providers.tone.presets();
    Ok(CommandOutput::new(
        format!("{} tone presets", presets.len()),
        CommandResult::GetTonePresets(presets),
    ))
}
