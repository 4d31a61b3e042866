use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use rust_stemmers::{Algorithm, Stemmer};
use serde::{Deserialize, Serialize};

use crate::error::TextError;

static STOPWORDS_EN: Lazy<HashSet<String>> =
    Lazy::new(|| read_stopwords(include_str!("stopwords/en.txt"), Language::English));
static STOPWORDS_TR: Lazy<HashSet<String>> =
    Lazy::new(|| read_stopwords(include_str!("stopwords/tr.txt"), Language::Turkish));

// ---------------------------------------------------------------------------
// Language – stopword list and stemmer per supported language
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Language {
    #[default]
    Turkish,
    English,
}

impl FromStr for Language {
    type Err = TextError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "turkish" | "tr" => Ok(Language::Turkish),
            "english" | "en" => Ok(Language::English),
            _ => Err(TextError::UnsupportedLanguage(s.to_string())),
        }
    }
}

impl TryFrom<String> for Language {
    type Error = TextError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Language> for String {
    fn from(lang: Language) -> Self {
        lang.to_string()
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Language::Turkish => f.write_str("turkish"),
            Language::English => f.write_str("english"),
        }
    }
}

impl Language {
    pub fn stopwords(self) -> &'static HashSet<String> {
        match self {
            Language::Turkish => &STOPWORDS_TR,
            Language::English => &STOPWORDS_EN,
        }
    }

    pub fn is_stopword(self, token: &str) -> bool {
        self.stopwords().contains(token)
    }

    /// Snowball stemmer for this language.
    pub fn stemmer(self) -> Stemmer {
        match self {
            Language::Turkish => Stemmer::create(Algorithm::Turkish),
            Language::English => Stemmer::create(Algorithm::English),
        }
    }

    /// Lowercase `text`, using the dotted/dotless i rules for Turkish.
    pub fn lowercase(self, text: &str) -> String {
        match self {
            Language::English => text.to_lowercase(),
            Language::Turkish => text
                .chars()
                .map(|c| match c {
                    'I' => "ı".to_string(),
                    'İ' => "i".to_string(),
                    other => other.to_lowercase().collect(),
                })
                .collect(),
        }
    }
}

/// Parse one stopword per line, normalised the same way as analysed text.
fn read_stopwords(list: &str, language: Language) -> HashSet<String> {
    list.lines()
        .map(|line| super::frequency::strip_punctuation(&language.lowercase(line.trim())))
        .filter(|word| !word.is_empty())
        .collect()
}
