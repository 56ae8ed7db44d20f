use std::sync::LazyLock;

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use super::text::{self, WordSwap};
use crate::error::AppError;
use crate::util;

/// The built-in tone presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "bindings", derive(ts_rs::TS))]
#[cfg_attr(feature = "bindings", ts(export))]
pub enum PresetId {
    Academic,
    Casual,
    Professional,
    Technical,
    Creative,
}

impl PresetId {
    pub const ALL: [PresetId; 5] = [
        PresetId::Academic,
        PresetId::Casual,
        PresetId::Professional,
        PresetId::Technical,
        PresetId::Creative,
    ];

    /// `(formality, technical)` target levels.
    pub fn levels(self) -> (u8, u8) {
        match self {
            PresetId::Academic => (5, 4),
            PresetId::Casual => (1, 2),
            PresetId::Professional => (4, 3),
            PresetId::Technical => (3, 5),
            PresetId::Creative => (2, 1),
        }
    }

    pub fn parse(id: &str) -> Result<Self, AppError> {
        util::from_serde_str(id).ok_or_else(|| AppError::PresetNotFound { id: id.to_string() })
    }

    fn describe(self) -> (&'static str, &'static str, &'static str) {
        match self {
            PresetId::Academic => (
                "Academic/Formal",
                "Scholarly and rigorous tone suitable for academic papers",
                "The research methodology employed a mixed-methods approach, incorporating both \
                 qualitative and quantitative data analysis. The findings suggest a statistically \
                 significant correlation between the variables under examination, though further \
                 research is warranted to establish causality.",
            ),
            PresetId::Casual => (
                "Casual/Conversational",
                "Relaxed and friendly tone for informal communication",
                "Hey, I just wanted to let you know that I tried that new app you mentioned, and \
                 it's actually pretty cool! The interface is super easy to use, and I was able to \
                 figure everything out without any trouble. Thanks for the recommendation!",
            ),
            PresetId::Professional => (
                "Professional/Business",
                "Polished and respectful tone for business communication",
                "Thank you for your inquiry regarding our services. We would be pleased to \
                 schedule a meeting to discuss your requirements in detail. Please let me know \
                 your availability for next week, and I will arrange a suitable time for our \
                 discussion.",
            ),
            PresetId::Technical => (
                "Technical/Scientific",
                "Precise and detailed tone for technical documentation",
                "The system implements a multi-threaded architecture with an asynchronous event \
                 processing pipeline. API requests are handled by worker threads from a \
                 connection pool, while database operations utilize prepared statements to \
                 mitigate SQL injection vulnerabilities.",
            ),
            PresetId::Creative => (
                "Creative/Narrative",
                "Expressive and vivid tone for storytelling",
                "The rain danced upon the windowpane, each droplet a tiny drummer in nature's \
                 symphony. Outside, the world transformed into a canvas of blues and grays, while \
                 inside, the gentle rhythm beckoned me to dreams of distant shores and adventures \
                 yet to unfold.",
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "bindings", derive(ts_rs::TS))]
#[cfg_attr(feature = "bindings", ts(export))]
pub struct TonePreset {
    pub id: PresetId,
    pub name: String,
    pub description: String,
    pub formality_level: u8,
    pub technical_level: u8,
    pub example: String,
}

impl From<PresetId> for TonePreset {
    fn from(id: PresetId) -> Self {
        let (name, description, example) = id.describe();
        let (formality_level, technical_level) = id.levels();
        Self {
            id,
            name: name.to_string(),
            description: description.to_string(),
            formality_level,
            technical_level,
            example: example.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "bindings", derive(ts_rs::TS))]
#[cfg_attr(feature = "bindings", ts(export))]
pub struct ToneAnalysis {
    pub formality: f64,
    pub technical_level: f64,
    pub closest_preset: PresetId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "bindings", derive(ts_rs::TS))]
#[cfg_attr(feature = "bindings", ts(export))]
pub struct AdjustedText {
    pub adjusted_text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preset: Option<PresetId>,
}

pub trait ToneAdjuster: Send + Sync {
    fn analyze(&self, text: &str) -> ToneAnalysis;

    /// Move `text` towards the target levels (both 1–5).
    fn adjust(&self, text: &str, formality: f64, technical: f64) -> Result<String, AppError>;

    fn presets(&self) -> Vec<TonePreset> {
        PresetId::ALL.into_iter().map(TonePreset::from).collect()
    }

    fn apply_preset(&self, text: &str, id: PresetId) -> Result<AdjustedText, AppError> {
        let (formality, technical) = id.levels();
        let adjusted_text = self.adjust(text, f64::from(formality), f64::from(technical))?;
        Ok(AdjustedText {
            adjusted_text,
            preset: Some(id),
        })
    }
}

/// Indicator-word scoring and substitution-table rewriting.
pub struct IndicatorTone;

impl ToneAdjuster for IndicatorTone {
    fn analyze(&self, text: &str) -> ToneAnalysis {
        let formality = score(&FORMALITY_INDICATORS, text);
        let technical_level = score(&TECHNICAL_INDICATORS, text);
        ToneAnalysis {
            formality,
            technical_level,
            closest_preset: closest_preset(formality, technical_level),
        }
    }

    fn adjust(&self, text: &str, formality: f64, technical: f64) -> Result<String, AppError> {
        let current = self.analyze(text);
        let formality_change = formality - current.formality;
        let technical_change = technical - current.technical_level;

        let mut adjusted = text.to_string();
        if formality_change.abs() > 0.5 {
            let table = if formality_change > 0.0 { &*MORE_FORMAL } else { &*LESS_FORMAL };
            adjusted = text::apply_all(table, &adjusted);
        }
        if technical_change.abs() > 0.5 {
            let table = if technical_change > 0.0 { &*MORE_TECHNICAL } else { &*LESS_TECHNICAL };
            adjusted = text::apply_all(table, &adjusted);
        }
        Ok(adjusted)
    }
}

/// Preset at minimum Euclidean distance; ties go to the earlier preset.
pub fn closest_preset(formality: f64, technical: f64) -> PresetId {
    let distance = |id: PresetId| {
        let (f, t) = id.levels();
        (formality - f64::from(f)).hypot(technical - f64::from(t))
    };
    PresetId::ALL
        .into_iter()
        .fold((PresetId::Academic, f64::INFINITY), |best, id| {
            let d = distance(id);
            if d < best.1 {
                (id, d)
            } else {
                best
            }
        })
        .0
}

// ── Scoring ──────────────────────────────────────────────────────

#[allow(clippy::cast_precision_loss)]
fn score(indicators: &[(Regex, f64)], text: &str) -> f64 {
    let raw = indicators
        .iter()
        .map(|(re, weight)| re.find_iter(text).count() as f64 * weight)
        .sum::<f64>();
    (3.0 + raw).clamp(1.0, 5.0)
}

fn indicator_table(pairs: &[(&str, f64)]) -> Vec<(Regex, f64)> {
    pairs
        .iter()
        .filter_map(|(pattern, weight)| {
            RegexBuilder::new(pattern)
                .case_insensitive(true)
                .build()
                .ok()
                .map(|re| (re, *weight))
        })
        .collect()
}

static FORMALITY_INDICATORS: LazyLock<Vec<(Regex, f64)>> = LazyLock::new(|| {
    indicator_table(&[
        (r"\bI\b", -0.5),
        (r"\byou\b", -0.5),
        (r"\bwe\b", -0.3),
        (r"\bgonna\b", -1.0),
        (r"\bwanna\b", -1.0),
        (r"\bcool\b", -0.5),
        (r"\bawesome\b", -0.5),
        (r"\bstuff\b", -0.5),
        (r"\bthing\b", -0.3),
        (r"\bretains\b", 0.5),
        (r"\bfacilitate\b", 0.5),
        (r"\bpursuant\b", 1.0),
        (r"\bhereby\b", 1.0),
        (r"\bthus\b", 0.5),
        (r"\bconsequently\b", 0.5),
        (r"\bnevertheless\b", 0.5),
        (r"\btherefore\b", 0.3),
    ])
});

static TECHNICAL_INDICATORS: LazyLock<Vec<(Regex, f64)>> = LazyLock::new(|| {
    indicator_table(&[
        (r"\balgorithm\b", 0.5),
        (r"\bimplementation\b", 0.3),
        (r"\bfunction\b", 0.3),
        (r"\bmethod\b", 0.3),
        (r"\bvariable\b", 0.3),
        (r"\bparameter\b", 0.3),
        (r"\binterface\b", 0.5),
        (r"\bprotocol\b", 0.5),
        (r"\bmodule\b", 0.3),
        (r"\blibrary\b", 0.3),
        (r"\babstraction\b", 0.5),
        (r"\bencapsulation\b", 0.5),
        (r"\binheritance\b", 0.5),
        (r"\bpolymorphism\b", 0.5),
        (r"\basynchronous\b", 0.5),
        (r"\bsynchronous\b", 0.5),
        (r"\bconcurrency\b", 0.5),
        (r"\bparallelism\b", 0.5),
        (r"\bmultithreading\b", 0.5),
        (r"\barchitecture\b", 0.3),
    ])
});

// ── Rewriting tables ─────────────────────────────────────────────

static MORE_FORMAL: LazyLock<Vec<WordSwap>> = LazyLock::new(|| {
    text::pattern_table(&[
        (r"\bdon't\b", "do not"),
        (r"\bcan't\b", "cannot"),
        (r"\bwon't\b", "will not"),
        (r"\bI\b", "one"),
        (r"\bwe\b", "one"),
        (r"\byou\b", "one"),
        (r"\bthing\b", "matter"),
        (r"\bstuff\b", "materials"),
        (r"\blot\b", "significant amount"),
        (r"\bgot\b", "obtained"),
        (r"\bget\b", "obtain"),
        (r"\bwant\b", "desire"),
        (r"\bneed\b", "require"),
        (r"\buse\b", "utilize"),
        (r"\bmake\b", "create"),
        (r"\bshow\b", "demonstrate"),
    ])
});

static LESS_FORMAL: LazyLock<Vec<WordSwap>> = LazyLock::new(|| {
    text::pattern_table(&[
        (r"\butilize\b", "use"),
        (r"\bobtain\b", "get"),
        (r"\brequire\b", "need"),
        (r"\bdesire\b", "want"),
        (r"\bdemonstrate\b", "show"),
        (r"\bpurchase\b", "buy"),
        (r"\binform\b", "tell"),
        (r"\bprovide\b", "give"),
        (r"\bassist\b", "help"),
        (r"\bconsider\b", "think about"),
        (r"\bdiscuss\b", "talk about"),
        (r"\bcommunicate\b", "talk"),
        (r"\bcommence\b", "start"),
        (r"\bterminate\b", "end"),
        (r"\bfacilitate\b", "help"),
    ])
});

static MORE_TECHNICAL: LazyLock<Vec<WordSwap>> = LazyLock::new(|| {
    text::pattern_table(&[
        (r"\buse\b", "implement"),
        (r"\bfix\b", "resolve"),
        (r"\bfast\b", "high-performance"),
        (r"\bloop\b", "iteration"),
        (r"\berror\b", "exception"),
        (r"\bspeed\b", "throughput"),
        (r"\bsize\b", "payload dimension"),
        (r"\bcheck\b", "validate"),
        (r"\bsend\b", "transmit"),
        (r"\bget\b", "retrieve"),
        (r"\bkeep\b", "persist"),
        (r"\bwait\b", "block"),
        (r"\bstop\b", "terminate"),
        (r"\blook at\b", "analyze"),
    ])
});

static LESS_TECHNICAL: LazyLock<Vec<WordSwap>> = LazyLock::new(|| {
    text::pattern_table(&[
        (r"\bimplementation\b", "way it works"),
        (r"\bfunctionality\b", "features"),
        (r"\butilization\b", "use"),
        (r"\binterface\b", "screen"),
        (r"\balgorithm\b", "process"),
        (r"\bconfiguration\b", "settings"),
        (r"\basynchronous\b", "background"),
        (r"\bperformance optimization\b", "speed improvements"),
        (r"\bencapsulation\b", "grouping"),
        (r"\bexception handling\b", "error checking"),
        (r"\brefactoring\b", "rewriting"),
        (r"\bdependency\b", "requirement"),
        (r"\barchitecture\b", "design"),
        (r"\bparameterize\b", "set options for"),
    ])
});
