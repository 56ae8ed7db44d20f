use serde::Serialize;

use super::text;
use crate::error::AppError;
use crate::util::Jitter;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "bindings", derive(ts_rs::TS))]
#[cfg_attr(feature = "bindings", ts(export))]
pub struct SourceMatch {
    pub id: u32,
    pub url: String,
    pub title: String,
    pub similarity: f64,
    pub matched_text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "bindings", derive(ts_rs::TS))]
#[cfg_attr(feature = "bindings", ts(export))]
pub struct PlagiarismReport {
    pub similarity_score: f64,
    pub sources: Vec<SourceMatch>,
    pub highlighted_text: String,
}

pub trait PlagiarismChecker: Send + Sync {
    fn check(&self, text: &str, rng: &mut Jitter) -> Result<PlagiarismReport, AppError>;
}

/// Flags sentences containing stock academic phrases against made-up sources.
pub struct PhraseMatcher;

const STOCK_PHRASES: &[&str] = &[
    "in conclusion",
    "as a result",
    "according to",
    "research has shown",
    "studies indicate",
    "it is clear that",
    "due to the fact that",
    "in light of",
    "based on the findings",
    "it should be noted",
];

const DOMAINS: &[&str] = &[
    "example.com",
    "academia.edu",
    "scholar.org",
    "papers.edu",
    "research.net",
];

const PATH_WORDS: &[&str] = &["article", "paper", "research", "publication", "journal"];

const FLAG_PROBABILITY: f64 = 0.7;
const MAX_SCORE: f64 = 0.95;

impl PlagiarismChecker for PhraseMatcher {
    #[allow(clippy::cast_precision_loss)]
    fn check(&self, text: &str, rng: &mut Jitter) -> Result<PlagiarismReport, AppError> {
        let sentences = text::split_sentences(text);
        let text_len = text.chars().count().max(1) as f64;

        let mut sources = Vec::new();
        let mut flagged = vec![false; sentences.len()];
        let mut score = 0.0;

        for (i, sentence) in sentences.iter().enumerate() {
            let lower = sentence.to_lowercase();
            if !STOCK_PHRASES.iter().any(|p| lower.contains(p)) {
                continue;
            }
            let similarity = rng.between(0.6, 0.9);
            if !rng.chance(FLAG_PROBABILITY) {
                continue;
            }
            let id = u32::try_from(sources.len() + 1).unwrap_or(u32::MAX);
            sources.push(fabricate_source(id, similarity, sentence, rng));
            if let Some(slot) = flagged.get_mut(i) {
                *slot = true;
            }
            score += similarity * sentence.chars().count() as f64 / text_len;
        }

        Ok(PlagiarismReport {
            similarity_score: score.min(MAX_SCORE),
            sources,
            highlighted_text: highlight(&sentences, &flagged),
        })
    }
}

fn fabricate_source(id: u32, similarity: f64, sentence: &str, rng: &mut Jitter) -> SourceMatch {
    let domain = rng.pick(DOMAINS).copied().unwrap_or("example.com");
    let word = rng.pick(PATH_WORDS).copied().unwrap_or("article");
    let number = 1 + rng.below(1000);
    let path = format!("{word}{number}");
    SourceMatch {
        id,
        url: format!("https://www.{domain}/{path}"),
        title: format!("Publication on {}", capitalize(&path)),
        similarity,
        matched_text: sentence.to_string(),
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// `<p>` paragraph with flagged sentences wrapped in highlight spans.
fn highlight(sentences: &[&str], flagged: &[bool]) -> String {
    let mut html = String::from("<p>");
    for (sentence, hit) in sentences.iter().zip(flagged) {
        let escaped = text::escape_html(sentence);
        if *hit {
            html.push_str(&format!("<span class=\"plagiarism-highlight\">{escaped}</span> "));
        } else {
            html.push_str(&escaped);
            html.push(' ');
        }
    }
    html.push_str("</p>");
    html
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn clean_text_has_no_sources() {
        let report = PhraseMatcher
            .check("The cat sat. The dog ran.", &mut Jitter::seeded(1))
            .unwrap();
        assert!(report.sources.is_empty());
        assert!(report.similarity_score.abs() < f64::EPSILON);
        assert_eq!(report.highlighted_text, "<p>The cat sat. The dog ran. </p>");
    }

    #[test]
    fn flagged_sentences_are_highlighted() {
        let text = "In conclusion, we won. Nothing else.";
        let mut hits = 0;
        for seed in 0..40 {
            let report = PhraseMatcher.check(text, &mut Jitter::seeded(seed)).unwrap();
            for source in &report.sources {
                hits += 1;
                assert!((0.6..0.9).contains(&source.similarity));
                assert_eq!(source.matched_text, "In conclusion, we won.");
                assert!(source.url.starts_with("https://www."));
                assert!(source.title.starts_with("Publication on "));
                assert!(report
                    .highlighted_text
                    .contains("<span class=\"plagiarism-highlight\">In conclusion, we won.</span>"));
            }
            assert!(report.similarity_score <= MAX_SCORE);
        }
        // p = 0.7 over 40 seeds
        assert!(hits > 10);
    }

    #[test]
    fn score_is_capped() {
        let text = "According to them. In light of that. As a result, yes.";
        for seed in 0..20 {
            let report = PhraseMatcher.check(text, &mut Jitter::seeded(seed)).unwrap();
            assert!(report.similarity_score <= MAX_SCORE);
        }
    }

    #[test]
    fn markup_in_text_is_escaped() {
        let report = PhraseMatcher.check("a <b> c", &mut Jitter::seeded(1)).unwrap();
        assert_eq!(report.highlighted_text, "<p>a &lt;b&gt; c </p>");
    }

    #[test]
    fn report_uses_camel_case_keys() {
        let report = PhraseMatcher.check("x", &mut Jitter::seeded(1)).unwrap();
        let json = serde_json::to_value(report).unwrap();
        assert!(json.get("similarityScore").is_some());
        assert!(json.get("highlightedText").is_some());
    }
}
