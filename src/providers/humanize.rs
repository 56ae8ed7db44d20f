use std::sync::LazyLock;

use indexmap::IndexMap;
use serde::Serialize;

use super::text::{self, WordSwap};
use crate::error::AppError;
use crate::util::Jitter;

/// Humanization knobs. Levels are already clamped to 1–5.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HumanizeOptions {
    pub sentence_complexity: u8,
    pub vocabulary_level: u8,
    pub add_filler_words: bool,
    pub vary_sentence_beginnings: bool,
}

impl Default for HumanizeOptions {
    fn default() -> Self {
        Self {
            sentence_complexity: 3,
            vocabulary_level: 3,
            add_filler_words: false,
            vary_sentence_beginnings: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "bindings", derive(ts_rs::TS))]
#[cfg_attr(feature = "bindings", ts(export))]
pub struct HumanizedText {
    pub humanized_text: String,
}

pub trait TextHumanizer: Send + Sync {
    fn humanize(
        &self,
        text: &str,
        options: &HumanizeOptions,
        rng: &mut Jitter,
    ) -> Result<HumanizedText, AppError>;
}

/// Phrase-table humanizer: restructures sentence openings, then swaps
/// vocabulary and sprinkles filler words.
pub struct PhraseHumanizer;

impl TextHumanizer for PhraseHumanizer {
    fn humanize(
        &self,
        text: &str,
        options: &HumanizeOptions,
        rng: &mut Jitter,
    ) -> Result<HumanizedText, AppError> {
        let restructured = restructure_sentences(
            text,
            options.sentence_complexity,
            options.vary_sentence_beginnings,
            rng,
        );
        let humanized_text = adjust_vocabulary(
            &restructured,
            options.vocabulary_level,
            options.add_filler_words,
            rng,
        );
        Ok(HumanizedText { humanized_text })
    }
}

// ── Sentence structure ───────────────────────────────────────────

const MODERATE_OPENERS: &[&str] = &["In other words,", "To clarify,"];
const HEAVY_OPENERS: &[&str] = &[
    "Notwithstanding previous arguments to the contrary,",
    "Given the aforementioned considerations,",
];

const TRANSITIONS: &[&str] = &[
    "However,",
    "Moreover,",
    "Furthermore,",
    "Additionally,",
    "Consequently,",
    "In contrast,",
    "Similarly,",
    "Nevertheless,",
    "Therefore,",
    "Indeed,",
    "On the other hand,",
    "For instance,",
    "In fact,",
    "In summary,",
    "As a result,",
];

pub fn restructure_sentences(
    text: &str,
    complexity: u8,
    vary_beginnings: bool,
    rng: &mut Jitter,
) -> String {
    let mut sentences: Vec<String> = text::split_sentences(text)
        .into_iter()
        .map(|s| {
            if s.trim().is_empty() {
                s.to_string()
            } else {
                add_complexity(s, complexity, rng)
            }
        })
        .collect();

    if vary_beginnings {
        for sentence in sentences.iter_mut().skip(1) {
            if sentence.trim().is_empty() || !rng.chance(0.3) {
                continue;
            }
            if let Some(transition) = rng.pick(TRANSITIONS) {
                *sentence = format!("{transition} {}", text::lower_first(sentence));
            }
        }
    }

    sentences.join(" ")
}

fn add_complexity(sentence: &str, complexity: u8, rng: &mut Jitter) -> String {
    let openers = match complexity {
        4 => MODERATE_OPENERS,
        c if c >= 5 => HEAVY_OPENERS,
        _ => return sentence.to_string(),
    };
    // Each opener gets an independent 30% roll, in order.
    for opener in openers {
        if rng.chance(0.3) {
            return format!("{opener} {}", text::lower_first(sentence));
        }
    }
    sentence.to_string()
}

// ── Vocabulary ───────────────────────────────────────────────────

const SIMPLIFY_BASE: &[(&str, &str)] = &[
    ("utilize", "use"),
    ("implement", "use"),
    ("obtain", "get"),
    ("acquire", "get"),
    ("sufficient", "enough"),
    ("commence", "start"),
    ("terminate", "end"),
    ("additional", "more"),
    ("subsequently", "later"),
    ("nevertheless", "still"),
    ("facilitate", "help"),
    ("demonstrate", "show"),
    ("ascertain", "find out"),
    ("constitutes", "is"),
    ("endeavor", "try"),
];

const SIMPLIFY_EXTRA: &[(&str, &str)] = &[
    ("approximately", "about"),
    ("excessive", "too much"),
    ("inquire", "ask"),
    ("perceive", "see"),
    ("comprehend", "understand"),
    ("encountered", "met"),
    ("prioritize", "focus on"),
    ("conclusion", "end"),
    ("initiate", "start"),
    ("illustrate", "show"),
];

const ENHANCE_BASE: &[(&str, &str)] = &[
    ("use", "utilize"),
    ("get", "acquire"),
    ("enough", "sufficient"),
    ("start", "commence"),
    ("end", "terminate"),
    ("more", "additional"),
    ("later", "subsequently"),
    ("still", "nevertheless"),
    ("help", "facilitate"),
    ("show", "demonstrate"),
    ("find out", "ascertain"),
    ("is", "constitutes"),
    ("try", "endeavor"),
];

const ENHANCE_EXTRA: &[(&str, &str)] = &[
    ("about", "approximately"),
    ("too much", "excessive"),
    ("ask", "inquire"),
    ("see", "perceive"),
    ("understand", "comprehend"),
    ("met", "encountered"),
    ("focus on", "prioritize"),
    ("end", "conclusion"),
    ("start", "initiate"),
    ("show", "illustrate"),
];

const FILLERS: &[&str] = &[
    "basically",
    "literally",
    "actually",
    "honestly",
    "I mean",
    "you know",
    "like",
    "kind of",
    "sort of",
    "I guess",
    "well",
    "um",
    "to be honest",
    "in a way",
    "pretty much",
];

/// Base table, with the extra entries overriding or extending it.
fn merged(base: &[(&'static str, &'static str)], extra: &[(&'static str, &'static str)]) -> Vec<WordSwap> {
    let mut table: IndexMap<&str, &str> = base.iter().copied().collect();
    table.extend(extra.iter().copied());
    let pairs: Vec<(&str, &str)> = table.into_iter().collect();
    text::literal_table(&pairs)
}

static SIMPLIFY_LIGHT: LazyLock<Vec<WordSwap>> = LazyLock::new(|| text::literal_table(SIMPLIFY_BASE));
static SIMPLIFY_STRONG: LazyLock<Vec<WordSwap>> =
    LazyLock::new(|| merged(SIMPLIFY_BASE, SIMPLIFY_EXTRA));
static ENHANCE_LIGHT: LazyLock<Vec<WordSwap>> = LazyLock::new(|| text::literal_table(ENHANCE_BASE));
static ENHANCE_STRONG: LazyLock<Vec<WordSwap>> =
    LazyLock::new(|| merged(ENHANCE_BASE, ENHANCE_EXTRA));

pub fn adjust_vocabulary(text: &str, level: u8, add_fillers: bool, rng: &mut Jitter) -> String {
    let table: Option<&[WordSwap]> = match level {
        1 => Some(&SIMPLIFY_STRONG),
        2 => Some(&SIMPLIFY_LIGHT),
        4 => Some(&ENHANCE_LIGHT),
        l if l >= 5 => Some(&ENHANCE_STRONG),
        _ => None,
    };
    let adjusted = match table {
        Some(swaps) => text::apply_all(swaps, text),
        None => text.to_string(),
    };
    if add_fillers {
        add_filler_words(&adjusted, rng)
    } else {
        adjusted
    }
}

fn add_filler_words(text: &str, rng: &mut Jitter) -> String {
    text.split(". ")
        .map(|sentence| {
            if !rng.chance(0.3) {
                return sentence.to_string();
            }
            let Some(filler) = rng.pick(FILLERS) else {
                return sentence.to_string();
            };
            let mut words: Vec<&str> = sentence.split_whitespace().collect();
            if words.len() > 3 && rng.chance(0.5) {
                let at = 1 + rng.below(words.len() - 1);
                words.insert(at, filler);
                words.join(" ")
            } else {
                format!("{filler} {sentence}")
            }
        })
        .collect::<Vec<_>>()
        .join(". ")
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    const SAMPLE: &str = "We use tools to get work done. It is enough for now. Then we start again.";

    #[test]
    fn neutral_settings_leave_text_alone() {
        let mut rng = Jitter::seeded(1);
        let out = PhraseHumanizer
            .humanize(SAMPLE, &HumanizeOptions::default(), &mut rng)
            .unwrap();
        assert_eq!(out.humanized_text, SAMPLE);
    }

    #[test]
    fn high_vocabulary_enhances_words() {
        let mut rng = Jitter::seeded(1);
        let out = adjust_vocabulary("We use it to get more.", 4, false, &mut rng);
        assert_eq!(out, "We utilize it to acquire additional.");
    }

    #[test]
    fn strong_enhancement_overrides_base_entries() {
        let mut rng = Jitter::seeded(1);
        let out = adjust_vocabulary("the end", 5, false, &mut rng);
        assert_eq!(out, "the conclusion");
    }

    #[test]
    fn low_vocabulary_simplifies_words() {
        let mut rng = Jitter::seeded(1);
        let out = adjust_vocabulary("Utilize sufficient resources.", 2, false, &mut rng);
        assert_eq!(out, "use enough resources.");
    }

    #[test]
    fn first_sentence_never_gets_a_transition() {
        for seed in 0..20 {
            let mut rng = Jitter::seeded(seed);
            let out = restructure_sentences(SAMPLE, 3, true, &mut rng);
            assert!(out.starts_with("We use tools"));
        }
    }

    #[test]
    fn fillers_only_add_words() {
        let mut rng = Jitter::seeded(3);
        let out = adjust_vocabulary(SAMPLE, 3, true, &mut rng);
        assert!(out.split_whitespace().count() >= SAMPLE.split_whitespace().count());
    }

    #[test]
    fn same_seed_same_output() {
        let opts = HumanizeOptions {
            sentence_complexity: 5,
            vocabulary_level: 5,
            add_filler_words: true,
            vary_sentence_beginnings: true,
        };
        let a = PhraseHumanizer.humanize(SAMPLE, &opts, &mut Jitter::seeded(99)).unwrap();
        let b = PhraseHumanizer.humanize(SAMPLE, &opts, &mut Jitter::seeded(99)).unwrap();
        assert_eq!(a, b);
    }
}
