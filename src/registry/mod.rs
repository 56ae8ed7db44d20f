pub mod catalog;
pub mod handlers;
pub mod params;
pub mod validation;

use std::sync::Arc;

use futures_util::future::BoxFuture;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::events::ResultPayload;
use crate::progress::ProgressEmitter;
use crate::state::AppState;

use validation::{ArgumentSchema, ArgumentSet, ArgumentSpec};

// ── Param types (used in Command enum) ──────────────────────────
use params::{
    AdjustToneParams, ApplyTonePresetParams, AutoTyperParams, HelpParams, HumanizeTextParams,
    SelectWindowParams, TextParams,
};

// ── Return types (used in CommandResult enum) ───────────────────
use crate::providers::{
    AdjustedText, HumanizedText, PlagiarismReport, ToneAnalysis, TonePreset, WindowInfo,
    WindowSelection,
};
use crate::session::ControlAck;
use crate::typing::TypingOutcome;

// ── Handler modules (dispatch targets) ──────────────────────────
use handlers::{query, text, tone, typing, window};

// ── Command metadata ────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "bindings", derive(ts_rs::TS))]
#[cfg_attr(feature = "bindings", ts(export))]
pub enum CommandCategory {
    Typing,
    Windows,
    Text,
    Tone,
    Meta,
}

impl CommandCategory {
    pub fn slug(&self) -> &'static str {
        match self {
            Self::Typing => "typing",
            Self::Windows => "windows",
            Self::Text => "text",
            Self::Tone => "tone",
            Self::Meta => "meta",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Typing => "Start, stop, pause and resume simulated typing",
            Self::Windows => "List and select target windows",
            Self::Text => "Humanize text and check it for plagiarism",
            Self::Tone => "Analyze and adjust tone, list presets",
            Self::Meta => "Command discovery",
        }
    }

    pub fn all() -> &'static [CommandCategory] {
        &[
            Self::Typing,
            Self::Windows,
            Self::Text,
            Self::Tone,
            Self::Meta,
        ]
    }
}

/// Static metadata of one command. `domain` prefixes handler failures on
/// the wire, e.g. `"Humanize text error: ..."`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CommandInfo {
    pub name: &'static str,
    pub description: &'static str,
    pub category: CommandCategory,
    pub domain: &'static str,
}

// ── Command output ──────────────────────────────────────────────

/// Internal result of executing a Command.
/// `message` goes to the log and the CLI, `result` carries typed data for the host.
#[derive(Debug, Clone, Serialize)]
pub struct CommandOutput {
    pub message: String,
    pub result: CommandResult,
}

impl CommandOutput {
    pub fn new(message: impl Into<String>, result: CommandResult) -> Self {
        Self {
            message: message.into(),
            result,
        }
    }

    /// The wire payload: `success` plus the result's `data` field.
    pub fn payload(&self) -> Result<ResultPayload, AppError> {
        let tagged = serde_json::to_value(&self.result)
            .map_err(|e| AppError::provider(format!("result serialization failed: {e}")))?;
        Ok(ResultPayload {
            success: true,
            data: tagged.get("data").cloned(),
        })
    }
}

// ── Registry ────────────────────────────────────────────────────

pub type HandlerFuture = BoxFuture<'static, Result<CommandOutput, AppError>>;

/// A bound capability: coerced arguments in, one terminal outcome out.
/// Progress, if any, goes through the emitter.
pub type Handler =
    Arc<dyn Fn(ArgumentSet, Arc<AppState>, ProgressEmitter) -> HandlerFuture + Send + Sync>;

#[derive(Clone)]
pub struct RegistryEntry {
    pub info: CommandInfo,
    pub specs: Vec<ArgumentSpec>,
    pub handler: Handler,
}

impl RegistryEntry {
    pub fn invoke(
        &self,
        args: ArgumentSet,
        state: Arc<AppState>,
        progress: ProgressEmitter,
    ) -> HandlerFuture {
        (self.handler)(args, state, progress)
    }
}

/// Name → entry table. Built once at startup, then shared read-only.
#[derive(Clone, Default)]
pub struct CommandRegistry {
    entries: IndexMap<&'static str, RegistryEntry>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every built-in command, bound to its handler.
    pub fn builtin() -> Result<Self, AppError> {
        let mut registry = Self::new();
        for entry in Command::registry_entries() {
            let name = entry.info.name;
            registry.register(entry.info, entry.arguments, builtin_handler(name))?;
        }
        Ok(registry)
    }

    pub fn register(
        &mut self,
        info: CommandInfo,
        specs: Vec<ArgumentSpec>,
        handler: Handler,
    ) -> Result<(), AppError> {
        if self.entries.contains_key(info.name) {
            return Err(AppError::DuplicateCommand {
                name: info.name.to_string(),
            });
        }
        self.entries.insert(
            info.name,
            RegistryEntry {
                info,
                specs,
                handler,
            },
        );
        Ok(())
    }

    pub fn resolve(&self, name: &str) -> Result<&RegistryEntry, AppError> {
        self.entries.get(name).ok_or_else(|| AppError::UnknownCommand {
            name: name.to_string(),
        })
    }

    pub fn entries(&self) -> impl Iterator<Item = &RegistryEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Binds the coerced arguments into the typed `Command` and runs it.
fn builtin_handler(name: &'static str) -> Handler {
    Arc::new(
        move |args: ArgumentSet, state: Arc<AppState>, progress: ProgressEmitter| -> HandlerFuture {
            Box::pin(async move {
                let command = Command::from_arguments(name, &args)?;
                tracing::debug!(command = name, is_async = command.is_async(), "running handler");
                command.dispatch(state, progress).await
            })
        },
    )
}

// ── define_commands! macro ──────────────────────────────────────

/// Single source of truth for all built-in commands. Generates:
/// 1. `Command` enum (serde-tagged, ts-rs exported)
/// 2. `CommandResult` enum (serde-tagged, ts-rs exported)
/// 3. `Command::info()`: metadata (name, description, category, domain)
/// 4. `Command::dispatch()`: execute any variant; async handlers are awaited
/// 5. `Command::registry_entries()`: catalog entries with argument specs and JSON schemas
/// 6. `Command::from_arguments()`: bind a coerced argument set by command name
/// 7. `Command::is_async()`: returns true for long-running variants
macro_rules! define_commands {
    (
        params {
            $(
                [ $pc:expr, $pdom:literal ]
                $pv:ident ( $pp:ty ) -> $pr:ty
                => $ph:path, $pn:literal : $pd:literal ;
            )*
        }
        no_params {
            $(
                [ $nc:expr, $ndom:literal ]
                $nv:ident -> $nr:ty
                => $nh:path, $nn:literal : $nd:literal ;
            )*
        }
        async_params {
            $(
                [ $apc:expr, $apdom:literal ]
                $apv:ident ( $app:ty ) -> $apr:ty
                => $aph:path, $apn:literal : $apd:literal ;
            )*
        }
    ) => {
        // ── 1. Command enum ──
        /// Typed command. Every host surface (argv, JSON line, serve mode)
        /// reaches the same handlers through this enum.
        #[derive(Debug, Clone, Serialize, Deserialize)]
        #[cfg_attr(feature = "bindings", derive(ts_rs::TS))]
        #[cfg_attr(feature = "bindings", ts(export))]
        #[serde(tag = "command", content = "params")]
        pub enum Command {
            $( $pv($pp), )*
            $( $nv, )*
            $( $apv($app), )*
        }

        // ── 2. CommandResult enum ──
        /// Typed result for every command. The `data` half is what the host
        /// receives inside the result event.
        #[derive(Debug, Clone, Serialize)]
        #[cfg_attr(feature = "bindings", derive(ts_rs::TS))]
        #[cfg_attr(feature = "bindings", ts(export))]
        #[serde(tag = "command", content = "data")]
        pub enum CommandResult {
            $( $pv($pr), )*
            $( $nv($nr), )*
            $( $apv($apr), )*
        }

        // ── 3. Command::info() ──
        impl Command {
            pub fn info(&self) -> CommandInfo {
                match self {
                    $( Command::$pv(_) => CommandInfo {
                        name: $pn,
                        description: $pd,
                        category: $pc,
                        domain: $pdom,
                    }, )*
                    $( Command::$nv => CommandInfo {
                        name: $nn,
                        description: $nd,
                        category: $nc,
                        domain: $ndom,
                    }, )*
                    $( Command::$apv(_) => CommandInfo {
                        name: $apn,
                        description: $apd,
                        category: $apc,
                        domain: $apdom,
                    }, )*
                }
            }
        }

        // ── 4. Command::dispatch() ──
        impl Command {
            pub(crate) async fn dispatch(
                self,
                state: Arc<AppState>,
                progress: ProgressEmitter,
            ) -> Result<CommandOutput, AppError> {
                match self {
                    // Sync params: run inline
                    $( Command::$pv(p) => $ph(&state, p), )*
                    // Sync no_params: run inline
                    $( Command::$nv => $nh(&state), )*
                    // Async params: .await
                    $( Command::$apv(p) => $aph(state, progress, p).await, )*
                }
            }
        }

        // ── 5. Command::registry_entries() ──
        impl Command {
            pub(crate) fn registry_entries() -> Vec<catalog::CommandRegistryEntry> {
                vec![
                    $( catalog::entry(
                        CommandInfo { name: $pn, description: $pd, category: $pc, domain: $pdom },
                        <$pp as ArgumentSchema>::specs(),
                        catalog::schema_value::<$pp>(),
                    ), )*
                    $( catalog::entry(
                        CommandInfo { name: $nn, description: $nd, category: $nc, domain: $ndom },
                        Vec::new(),
                        catalog::empty_object_schema(),
                    ), )*
                    $( catalog::entry(
                        CommandInfo { name: $apn, description: $apd, category: $apc, domain: $apdom },
                        <$app as ArgumentSchema>::specs(),
                        catalog::schema_value::<$app>(),
                    ), )*
                ]
            }
        }

        // ── 6. Command::from_arguments() ──
        impl Command {
            pub(crate) fn from_arguments(
                name: &str,
                args: &ArgumentSet,
            ) -> Result<Command, AppError> {
                match name {
                    $( $pn => Ok(Command::$pv(args.bind()?)), )*
                    $( $nn => Ok(Command::$nv), )*
                    $( $apn => Ok(Command::$apv(args.bind()?)), )*
                    _ => Err(AppError::UnknownCommand { name: name.to_string() }),
                }
            }
        }

        // ── 7. Command::is_async() ──
        impl Command {
            pub fn is_async(&self) -> bool {
                match self {
                    $( Command::$pv(_) => false, )*
                    $( Command::$nv => false, )*
                    $( Command::$apv(_) => true, )*
                }
            }
        }
    };
}

// ── Command definitions ─────────────────────────────────────────

define_commands! {
    params {
        // ── Windows (1) ─────────────────────────────────────────
        [CommandCategory::Windows, "Select window"]
        SelectWindow(SelectWindowParams) -> WindowSelection
        => window::select_window, "select_window": "Select the window to type into. Unknown ids are reported, not rejected.";

        // ── Text (2) ────────────────────────────────────────────
        [CommandCategory::Text, "Humanize text"]
        HumanizeText(HumanizeTextParams) -> HumanizedText
        => text::humanize_text, "humanize_text": "Rewrite text so it reads less mechanically.";

        [CommandCategory::Text, "Check plagiarism"]
        CheckPlagiarism(TextParams) -> PlagiarismReport
        => text::check_plagiarism, "check_plagiarism": "Flag sentences that resemble known sources and score overall similarity.";

        // ── Tone (3) ────────────────────────────────────────────
        [CommandCategory::Tone, "Adjust tone"]
        AdjustTone(AdjustToneParams) -> AdjustedText
        => tone::adjust_tone, "adjust_tone": "Shift text toward a preset, or toward explicit formality and technical levels.";

        [CommandCategory::Tone, "Analyze tone"]
        AnalyzeTone(TextParams) -> ToneAnalysis
        => tone::analyze_tone, "analyze_tone": "Score formality and technical level, and name the closest preset.";

        [CommandCategory::Tone, "Apply tone preset"]
        ApplyTonePreset(ApplyTonePresetParams) -> AdjustedText
        => tone::apply_tone_preset, "apply_tone_preset": "Apply a named tone preset to text.";

        // ── Meta (1) ────────────────────────────────────────────
        [CommandCategory::Meta, "Help"]
        Help(HelpParams) -> String
        => query::help, "help": "Discover available commands and categories. Call with no args for all categories, or with a topic for details.";
    }
    no_params {
        // ── Typing (3) ──────────────────────────────────────────
        [CommandCategory::Typing, "Stop typing"]
        StopTyping -> ControlAck
        => typing::stop_typing, "stop_typing": "Stop the active typing session.";

        [CommandCategory::Typing, "Pause typing"]
        PauseTyping -> ControlAck
        => typing::pause_typing, "pause_typing": "Pause the active typing session.";

        [CommandCategory::Typing, "Resume typing"]
        ResumeTyping -> ControlAck
        => typing::resume_typing, "resume_typing": "Resume a paused typing session.";

        // ── Windows (1) ─────────────────────────────────────────
        [CommandCategory::Windows, "Get windows"]
        GetWindows -> Vec<WindowInfo>
        => window::get_windows, "get_windows": "List the windows that can receive typed text.";

        // ── Tone (1) ────────────────────────────────────────────
        [CommandCategory::Tone, "Get tone presets"]
        GetTonePresets -> Vec<TonePreset>
        => tone::get_tone_presets, "get_tone_presets": "List the five built-in tone presets.";
    }
    async_params {
        // ── Typing (1) ──────────────────────────────────────────
        [CommandCategory::Typing, "Auto-typing"]
        AutoTyper(AutoTyperParams) -> TypingOutcome
        => typing::auto_typer, "auto_typer": "Type text into a window with human-like timing and corrected typos. Emits progress.";
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    const WIRE_COMMANDS: [&str; 10] = [
        "auto_typer",
        "stop_typing",
        "pause_typing",
        "resume_typing",
        "get_windows",
        "select_window",
        "humanize_text",
        "adjust_tone",
        "get_tone_presets",
        "check_plagiarism",
    ];

    #[test]
    fn builtin_registers_every_wire_command() {
        let registry = CommandRegistry::builtin().unwrap();
        for name in WIRE_COMMANDS {
            assert!(registry.resolve(name).is_ok(), "{name} missing");
        }
        for name in ["analyze_tone", "apply_tone_preset", "help"] {
            assert!(registry.resolve(name).is_ok(), "{name} missing");
        }
        assert_eq!(registry.len(), 13);
    }

    #[test]
    fn resolve_unknown_fails() {
        let registry = CommandRegistry::builtin().unwrap();
        let err = registry.resolve("launch_rockets").err().unwrap();
        assert_eq!(
            err,
            AppError::UnknownCommand {
                name: "launch_rockets".into()
            }
        );
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let mut registry = CommandRegistry::builtin().unwrap();
        let info = registry.resolve("help").unwrap().info;
        let err = registry
            .register(info, Vec::new(), builtin_handler("help"))
            .unwrap_err();
        assert_eq!(err, AppError::DuplicateCommand { name: "help".into() });
        assert_eq!(registry.len(), 13);
    }

    #[test]
    fn required_arguments_match_the_wire_table() {
        let registry = CommandRegistry::builtin().unwrap();
        let required = |name: &str| -> Vec<&'static str> {
            registry
                .resolve(name)
                .unwrap()
                .specs
                .iter()
                .filter(|s| s.required)
                .map(|s| s.name)
                .collect()
        };
        assert_eq!(required("auto_typer"), ["text", "window_id"]);
        assert_eq!(required("select_window"), ["window_id"]);
        assert_eq!(required("humanize_text"), ["text"]);
        assert_eq!(required("adjust_tone"), ["text"]);
        assert_eq!(required("check_plagiarism"), ["text"]);
        for name in ["stop_typing", "pause_typing", "resume_typing", "get_windows", "get_tone_presets"] {
            assert!(registry.resolve(name).unwrap().specs.is_empty());
        }
    }

    #[test]
    fn only_auto_typer_is_async() {
        let typing = Command::from_arguments(
            "auto_typer",
            &validation::coerce(
                &AutoTyperParams::specs(),
                serde_json::json!({"text": "a", "window_id": "1"})
                    .as_object()
                    .unwrap(),
            )
            .unwrap(),
        )
        .unwrap();
        assert!(typing.is_async());
        assert_eq!(typing.info().domain, "Auto-typing");
        assert!(!Command::GetWindows.is_async());
    }

    #[test]
    fn payload_unwraps_the_data_half() {
        let output = CommandOutput::new("ok", CommandResult::Help("text".into()));
        let payload = output.payload().unwrap();
        assert!(payload.success);
        assert_eq!(payload.data, Some(serde_json::Value::String("text".into())));
    }
}
