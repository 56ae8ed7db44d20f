use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::validation::{
    clamp_fraction, clamp_level, clamp_millis, clamp_speed, ArgType, ArgumentSchema, ArgumentSpec,
};
use crate::providers::{HumanizeOptions, PresetId};
use crate::typing::TypingConfig;

const DEFAULT_TYPING_SPEED: i64 = 120;
const DEFAULT_COMMA_PAUSE_MS: i64 = 500;
const DEFAULT_PERIOD_PAUSE_MS: i64 = 1000;
const DEFAULT_HESITATION_MS: i64 = 500;
const DEFAULT_LEVEL: i64 = 3;

fn default_typing_speed() -> i64 {
    DEFAULT_TYPING_SPEED
}

fn default_comma_pause() -> i64 {
    DEFAULT_COMMA_PAUSE_MS
}

fn default_period_pause() -> i64 {
    DEFAULT_PERIOD_PAUSE_MS
}

fn default_hesitation() -> i64 {
    DEFAULT_HESITATION_MS
}

fn default_level() -> i64 {
    DEFAULT_LEVEL
}

// ── Shared params ───────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[cfg_attr(feature = "bindings", derive(ts_rs::TS))]
#[cfg_attr(feature = "bindings", ts(export))]
pub struct TextParams {
    pub text: String,
}

impl ArgumentSchema for TextParams {
    fn specs() -> Vec<ArgumentSpec> {
        vec![ArgumentSpec::required("text", ArgType::String, "Text to process.")]
    }
}

// ── Typing params ───────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[cfg_attr(feature = "bindings", derive(ts_rs::TS))]
#[cfg_attr(feature = "bindings", ts(export))]
pub struct AutoTyperParams {
    /// Text to type into the target window.
    pub text: String,
    /// Window id as reported by `get_windows`.
    pub window_id: String,
    /// Words per minute.
    #[serde(default = "default_typing_speed")]
    pub typing_speed: i64,
    /// Per-character typo probability as a fraction. Hosts send it in percent.
    #[serde(default)]
    pub typo_rate: f64,
    /// Milliseconds.
    #[serde(default = "default_comma_pause")]
    pub pause_after_comma: i64,
    /// Milliseconds.
    #[serde(default = "default_period_pause")]
    pub pause_after_period: i64,
    /// Upper bound in milliseconds of the occasional pause after a space.
    #[serde(default = "default_hesitation")]
    pub random_hesitation: i64,
}

impl AutoTyperParams {
    pub fn typing_config(&self, max_wpm: u32) -> TypingConfig {
        TypingConfig {
            words_per_minute: clamp_speed(self.typing_speed, max_wpm),
            typo_rate: clamp_fraction(self.typo_rate),
            pause_after_comma: clamp_millis(self.pause_after_comma),
            pause_after_period: clamp_millis(self.pause_after_period),
            random_hesitation: clamp_millis(self.random_hesitation),
        }
    }
}

impl ArgumentSchema for AutoTyperParams {
    fn specs() -> Vec<ArgumentSpec> {
        vec![
            ArgumentSpec::required("text", ArgType::String, "Text to type."),
            ArgumentSpec::required("window_id", ArgType::String, "Target window id."),
            ArgumentSpec::optional(
                "typing_speed",
                ArgType::Integer,
                DEFAULT_TYPING_SPEED,
                "Words per minute.",
            ),
            ArgumentSpec::optional(
                "typo_rate",
                ArgType::Percentage,
                0,
                "Chance of a corrected typo per character, in percent.",
            ),
            ArgumentSpec::optional(
                "pause_after_comma",
                ArgType::Integer,
                DEFAULT_COMMA_PAUSE_MS,
                "Extra pause after a comma, in ms.",
            ),
            ArgumentSpec::optional(
                "pause_after_period",
                ArgType::Integer,
                DEFAULT_PERIOD_PAUSE_MS,
                "Extra pause after a period, in ms.",
            ),
            ArgumentSpec::optional(
                "random_hesitation",
                ArgType::Integer,
                DEFAULT_HESITATION_MS,
                "Maximum random hesitation after a space, in ms.",
            ),
        ]
    }
}

// ── Window params ───────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[cfg_attr(feature = "bindings", derive(ts_rs::TS))]
#[cfg_attr(feature = "bindings", ts(export))]
pub struct SelectWindowParams {
    pub window_id: String,
}

impl ArgumentSchema for SelectWindowParams {
    fn specs() -> Vec<ArgumentSpec> {
        vec![ArgumentSpec::required(
            "window_id",
            ArgType::String,
            "Window id to select.",
        )]
    }
}

// ── Text params ─────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[cfg_attr(feature = "bindings", derive(ts_rs::TS))]
#[cfg_attr(feature = "bindings", ts(export))]
pub struct HumanizeTextParams {
    pub text: String,
    /// 1 (plain) to 5 (elaborate).
    #[serde(default = "default_level")]
    pub sentence_complexity: i64,
    /// 1 (simple words) to 5 (formal words).
    #[serde(default = "default_level")]
    pub vocabulary_level: i64,
    #[serde(default)]
    pub add_filler_words: bool,
    #[serde(default)]
    pub vary_sentence_beginnings: bool,
}

impl HumanizeTextParams {
    pub fn options(&self) -> HumanizeOptions {
        HumanizeOptions {
            sentence_complexity: clamp_level(self.sentence_complexity),
            vocabulary_level: clamp_level(self.vocabulary_level),
            add_filler_words: self.add_filler_words,
            vary_sentence_beginnings: self.vary_sentence_beginnings,
        }
    }
}

impl ArgumentSchema for HumanizeTextParams {
    fn specs() -> Vec<ArgumentSpec> {
        vec![
            ArgumentSpec::required("text", ArgType::String, "Text to humanize."),
            ArgumentSpec::optional(
                "sentence_complexity",
                ArgType::Integer,
                DEFAULT_LEVEL,
                "Sentence complexity, 1-5.",
            ),
            ArgumentSpec::optional(
                "vocabulary_level",
                ArgType::Integer,
                DEFAULT_LEVEL,
                "Vocabulary level, 1-5.",
            ),
            ArgumentSpec::optional(
                "add_filler_words",
                ArgType::Boolean,
                false,
                "Sprinkle conversational filler words.",
            ),
            ArgumentSpec::optional(
                "vary_sentence_beginnings",
                ArgType::Boolean,
                false,
                "Open some sentences with transition words.",
            ),
        ]
    }
}

// ── Tone params ─────────────────────────────────────────────────

/// `preset` value that selects the explicit levels.
pub const CUSTOM_PRESET: &str = "custom";

fn default_preset() -> String {
    CUSTOM_PRESET.to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[cfg_attr(feature = "bindings", derive(ts_rs::TS))]
#[cfg_attr(feature = "bindings", ts(export))]
pub struct AdjustToneParams {
    pub text: String,
    /// 1 (casual) to 5 (formal). Used with the `custom` preset.
    #[serde(default = "default_level")]
    pub formality_level: i64,
    /// 1 (plain) to 5 (technical). Used with the `custom` preset.
    #[serde(default = "default_level")]
    pub technical_level: i64,
    /// Preset id, or `custom`. Unknown ids fall back to the levels.
    #[serde(default = "default_preset")]
    pub preset: String,
}

impl AdjustToneParams {
    /// Clamped `(formality, technical)` for the `custom` preset.
    pub fn custom_levels(&self) -> (u8, u8) {
        (
            clamp_level(self.formality_level),
            clamp_level(self.technical_level),
        )
    }

    /// The named preset to apply, or `None` for the explicit levels.
    pub fn preset_id(&self) -> Option<PresetId> {
        let id = self.preset.trim().to_ascii_lowercase();
        if id.is_empty() || id == CUSTOM_PRESET {
            return None;
        }
        match PresetId::parse(&id) {
            Ok(preset) => Some(preset),
            Err(_) => {
                tracing::warn!(preset = %self.preset, "unknown tone preset, using custom levels");
                None
            }
        }
    }
}

impl ArgumentSchema for AdjustToneParams {
    fn specs() -> Vec<ArgumentSpec> {
        vec![
            ArgumentSpec::required("text", ArgType::String, "Text to adjust."),
            ArgumentSpec::optional(
                "formality_level",
                ArgType::Integer,
                DEFAULT_LEVEL,
                "Target formality, 1-5.",
            ),
            ArgumentSpec::optional(
                "technical_level",
                ArgType::Integer,
                DEFAULT_LEVEL,
                "Target technical level, 1-5.",
            ),
            ArgumentSpec::optional(
                "preset",
                ArgType::String,
                CUSTOM_PRESET,
                "Tone preset id, or custom to use the levels.",
            ),
        ]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[cfg_attr(feature = "bindings", derive(ts_rs::TS))]
#[cfg_attr(feature = "bindings", ts(export))]
pub struct ApplyTonePresetParams {
    pub text: String,
    /// Preset id from `get_tone_presets`.
    pub preset: String,
}

impl ArgumentSchema for ApplyTonePresetParams {
    fn specs() -> Vec<ArgumentSpec> {
        vec![
            ArgumentSpec::required("text", ArgType::String, "Text to adjust."),
            ArgumentSpec::required("preset", ArgType::String, "Preset id."),
        ]
    }
}

// ── Query params ────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[cfg_attr(feature = "bindings", derive(ts_rs::TS))]
#[cfg_attr(feature = "bindings", ts(export))]
pub struct HelpParams {
    /// Category name or command name to get details for (e.g. "tone", "auto_typer").
    /// Omit to see all categories.
    #[serde(default)]
    pub topic: Option<String>,
}

impl ArgumentSchema for HelpParams {
    fn specs() -> Vec<ArgumentSpec> {
        vec![ArgumentSpec::maybe(
            "topic",
            ArgType::String,
            "Category or command name.",
        )]
    }
}
