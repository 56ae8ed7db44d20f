//! Effect providers: the capabilities behind each command. Every provider
//! is a trait object so real OS or NLP backends can replace the built-ins.

pub mod humanize;
pub mod keyboard;
pub mod plagiarism;
pub mod text;
pub mod tone;
pub mod windows;

use std::sync::Arc;

pub use humanize::{HumanizeOptions, HumanizedText, PhraseHumanizer, TextHumanizer};
pub use keyboard::{Key, Keyboard, SimulatedKeyboard};
pub use plagiarism::{PhraseMatcher, PlagiarismChecker, PlagiarismReport};
pub use tone::{AdjustedText, IndicatorTone, PresetId, ToneAdjuster, ToneAnalysis, TonePreset};
pub use windows::{StaticWindows, WindowInfo, WindowManager, WindowSelection};

/// The provider set a dispatcher runs against.
#[derive(Clone)]
pub struct Providers {
    pub humanizer: Arc<dyn TextHumanizer>,
    pub tone: Arc<dyn ToneAdjuster>,
    pub plagiarism: Arc<dyn PlagiarismChecker>,
    pub windows: Arc<dyn WindowManager>,
    pub keyboard: Arc<dyn Keyboard>,
}

impl Providers {
    /// Built-in stand-ins serving the given window list.
    pub fn builtin(windows: Vec<WindowInfo>) -> Self {
        Self {
            humanizer: Arc::new(PhraseHumanizer),
            tone: Arc::new(IndicatorTone),
            plagiarism: Arc::new(PhraseMatcher),
            windows: Arc::new(StaticWindows::new(windows)),
            keyboard: Arc::new(SimulatedKeyboard::new()),
        }
    }

    pub fn with_humanizer(mut self, humanizer: Arc<dyn TextHumanizer>) -> Self {
        self.humanizer = humanizer;
        self
    }

    pub fn with_keyboard(mut self, keyboard: Arc<dyn Keyboard>) -> Self {
        self.keyboard = keyboard;
        self
    }
}
