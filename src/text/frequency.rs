use std::collections::HashMap;

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;

use super::language::Language;
use crate::error::TextError;

/// Maximum number of ranked terms returned by [`FrequencyAnalyzer::rank`].
pub const MAX_TERMS: usize = 100;

/// Runs of characters that are neither digits nor whitespace.
static NON_NUMERAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\d\s]+").expect("valid regex"));
/// Countable tokens: two or more word characters.
static COUNTABLE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\w\w+\b").expect("valid regex"));

/// A unigram or bigram with its number of occurrences.
pub type TermCount = (String, u64);

// ---------------------------------------------------------------------------
// FrequencyAnalyzer
// ---------------------------------------------------------------------------

/// Normalises free text and ranks its 1- and 2-grams by frequency.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrequencyAnalyzer {
    pub language: Language,
    /// Apply the language's Snowball stemmer as the last normalisation step.
    pub stem: bool,
}

impl FrequencyAnalyzer {
    pub fn new(language: Language) -> Self {
        FrequencyAnalyzer {
            language,
            stem: false,
        }
    }

    pub fn with_stemming(mut self, stem: bool) -> Self {
        self.stem = stem;
        self
    }

    /// Lowercase, strip punctuation, drop stopwords, strip numerals and
    /// optionally stem. Returns the surviving tokens in text order.
    pub fn normalize(&self, text: &str) -> Vec<String> {
        let lowered = self.language.lowercase(text);
        let stripped = strip_punctuation(&lowered);

        let tokens = stripped
            .split_whitespace()
            .filter(|token| !self.language.is_stopword(token))
            .flat_map(|token| NON_NUMERAL.find_iter(token).map(|m| m.as_str().to_string()))
            .collect::<Vec<_>>();

        if !self.stem {
            return tokens;
        }
        let stemmer = self.language.stemmer();
        tokens
            .into_iter()
            .map(|token| stemmer.stem(&token).into_owned())
            .collect()
    }

    /// Ranked unigram and bigram counts of `text`: descending by count, ties
    /// in order of first occurrence, at most [`MAX_TERMS`] entries.
    pub fn rank(&self, text: &str) -> Vec<TermCount> {
        let normalized = self.normalize(text).join(" ");
        let tokens: Vec<&str> = COUNTABLE.find_iter(&normalized).map(|m| m.as_str()).collect();

        let mut index: HashMap<String, usize> = HashMap::new();
        let mut counts: Vec<TermCount> = Vec::new();
        let mut bump = |term: String| {
            let next = counts.len();
            let i = *index.entry(term.clone()).or_insert(next);
            if i == next {
                counts.push((term, 0));
            }
            counts[i].1 += 1;
        };

        for (i, token) in tokens.iter().enumerate() {
            bump((*token).to_string());
            if let Some(next) = tokens.get(i + 1) {
                bump(format!("{token} {next}"));
            }
        }

        // Stable sort keeps first-occurrence order among equal counts.
        counts.sort_by(|a, b| b.1.cmp(&a.1));
        counts.truncate(MAX_TERMS);
        debug!(
            "ranked {} terms from {} tokens ({})",
            counts.len(),
            tokens.len(),
            self.language
        );
        counts
    }
}

/// Rank `text` for a language given by name.
pub fn rank(text: &str, language: &str, stem: bool) -> Result<Vec<TermCount>, TextError> {
    let language: Language = language.parse()?;
    Ok(FrequencyAnalyzer::new(language).with_stemming(stem).rank(text))
}

/// Delete ASCII punctuation characters.
pub fn strip_punctuation(text: &str) -> String {
    text.chars().filter(|c| !c.is_ascii_punctuation()).collect()
}

/// Character length of each value.
pub fn row_lengths(values: &[String]) -> Vec<usize> {
    values.iter().map(|v| v.chars().count()).collect()
}
