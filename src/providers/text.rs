//! Text helpers shared by the built-in transforms.

use std::sync::LazyLock;

use regex::{NoExpand, Regex, RegexBuilder};

static SENTENCE_BREAK: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"[.!?]\s+").ok());

/// Split text into sentences at `.`, `!` or `?` followed by whitespace.
/// The terminator stays with its sentence; the whitespace is dropped.
pub fn split_sentences(text: &str) -> Vec<&str> {
    let Some(re) = SENTENCE_BREAK.as_ref() else {
        return vec![text];
    };
    let mut out = Vec::new();
    let mut start = 0;
    for m in re.find_iter(text) {
        let end = m.start() + 1;
        if let Some(sentence) = text.get(start..end) {
            out.push(sentence);
        }
        start = m.end();
    }
    if let Some(rest) = text.get(start..) {
        out.push(rest);
    }
    out
}

/// A whole-word, case-insensitive substitution.
pub struct WordSwap {
    pattern: Regex,
    replacement: String,
}

impl WordSwap {
    /// `word` is matched literally; `None` if it cannot compile.
    pub fn literal(word: &str, replacement: &str) -> Option<Self> {
        Self::pattern(&format!(r"\b{}\b", regex::escape(word)), replacement)
    }

    /// `pattern` is a regex (used by tables that already carry `\b` anchors).
    pub fn pattern(pattern: &str, replacement: &str) -> Option<Self> {
        let pattern = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map_err(|e| tracing::warn!(error = %e, "skipping bad substitution pattern"))
            .ok()?;
        Some(Self {
            pattern,
            replacement: replacement.to_string(),
        })
    }

    pub fn apply(&self, text: &str) -> String {
        self.pattern
            .replace_all(text, NoExpand(&self.replacement))
            .into_owned()
    }
}

/// Compile a literal word table.
pub fn literal_table(pairs: &[(&str, &str)]) -> Vec<WordSwap> {
    pairs
        .iter()
        .filter_map(|(from, to)| WordSwap::literal(from, to))
        .collect()
}

/// Compile a regex table.
pub fn pattern_table(pairs: &[(&str, &str)]) -> Vec<WordSwap> {
    pairs
        .iter()
        .filter_map(|(from, to)| WordSwap::pattern(from, to))
        .collect()
}

pub fn apply_all(swaps: &[WordSwap], text: &str) -> String {
    swaps
        .iter()
        .fold(text.to_string(), |acc, swap| swap.apply(&acc))
}

/// Lowercase the first character, leaving the rest alone.
pub fn lower_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Minimal HTML escaping for text embedded in highlight markup.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_terminators() {
        assert_eq!(
            split_sentences("One. Two!  Three? Four"),
            vec!["One.", "Two!", "Three?", "Four"]
        );
    }

    #[test]
    fn abbreviation_without_space_is_kept() {
        assert_eq!(split_sentences("v1.2 is out."), vec!["v1.2 is out."]);
    }

    #[test]
    fn swap_is_whole_word_and_case_insensitive() {
        let swap = WordSwap::literal("use", "utilize").unwrap();
        assert_eq!(swap.apply("Use it, reuse it, USE it"), "utilize it, reuse it, utilize it");
    }

    #[test]
    fn swap_does_not_expand_dollar() {
        let swap = WordSwap::literal("cost", "$5").unwrap();
        assert_eq!(swap.apply("the cost"), "the $5");
    }

    #[test]
    fn lower_first_only_touches_first() {
        assert_eq!(lower_first("The NASA team"), "the NASA team");
        assert_eq!(lower_first(""), "");
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(escape_html("a<b>&\"c\""), "a&lt;b&gt;&amp;&quot;c&quot;");
    }
}
