/// Text layer: language resources and n-gram frequency ranking.
///
/// ```text
///  raw text ─► lowercase ─► strip punctuation ─► drop stopwords
///           ─► strip numerals ─► (stem) ─► 1/2-gram counts (top 100)
/// ```

pub mod frequency;
pub mod language;

pub use frequency::{rank, row_lengths, FrequencyAnalyzer, TermCount, MAX_TERMS};
pub use language::Language;
