use std::path::Path;

use serde::Deserialize;
use serde_json::Value as JsonValue;

use crate::chart::{parse_batch, BuildOptions, ChartRequest};
use crate::data::model::TypeSpec;
use crate::error::{ChartError, JobError};
use crate::text::Language;

// ---------------------------------------------------------------------------
// Job – everything one run needs besides the dataset
// ---------------------------------------------------------------------------

/// A job description, usually read from a JSON file:
///
/// ```json
/// {
///   "types":  { "Region": "categoric", "Sales": "numeric" },
///   "charts": [ { "type": "barplot", "x": "Region", "y": "Sales" } ],
///   "language": "english",
///   "stem": false
/// }
/// ```
///
/// `charts` stays raw JSON until [`Job::requests`] so that one malformed
/// request does not invalidate the others.
#[derive(Debug, Clone, Deserialize)]
pub struct Job {
    pub types: TypeSpec,
    #[serde(default = "empty_batch")]
    pub charts: JsonValue,
    /// Language for word-frequency requests without their own.
    #[serde(default)]
    pub language: Language,
    /// Stem tokens in word-frequency requests without their own setting.
    #[serde(default)]
    pub stem: bool,
}

fn empty_batch() -> JsonValue {
    JsonValue::Array(Vec::new())
}

impl Job {
    pub fn from_json(text: &str) -> Result<Self, JobError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn from_path(path: &Path) -> Result<Self, JobError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Replace the default language by name.
    pub fn set_language(&mut self, name: &str) -> Result<(), JobError> {
        self.language = name.parse()?;
        Ok(())
    }

    /// The chart batch, one parse result per entry.
    pub fn requests(&self) -> Result<Vec<Result<ChartRequest, ChartError>>, JobError> {
        parse_batch(&self.charts)
    }

    pub fn options(&self) -> BuildOptions {
        BuildOptions {
            language: self.language,
            stem: self.stem,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::SemanticType;

    #[test]
    fn parses_full_job() {
        let job = Job::from_json(
            r#"{
                "types": {"Region": "categoric", "Sales": "numeric", "Day": "datetime"},
                "charts": [{"type": "pieplot", "x": "Region"}, {"type": "bogus"}],
                "language": "english",
                "stem": true
            }"#,
        )
        .unwrap();
        assert_eq!(job.types["Region"], SemanticType::Categorical);
        assert_eq!(job.language, Language::English);
        assert!(job.options().stem);
        let requests = job.requests().unwrap();
        assert_eq!(requests.len(), 2);
        assert!(requests[0].is_ok());
        assert!(requests[1].is_err());
    }

    #[test]
    fn defaults() {
        let job = Job::from_json(r#"{"types": {}}"#).unwrap();
        assert_eq!(job.language, Language::Turkish);
        assert!(!job.stem);
        assert!(job.requests().unwrap().is_empty());
    }

    #[test]
    fn malformed_batch_is_fatal() {
        let job = Job::from_json(r#"{"types": {}, "charts": "pieplot"}"#).unwrap();
        assert!(matches!(job.requests(), Err(JobError::BatchNotArray)));
        assert!(Job::from_json(r#"{"types": {"a": "colour"}}"#).is_err());
        assert!(Job::from_json("not json").is_err());
    }

    #[test]
    fn language_override() {
        let mut job = Job::from_json(r#"{"types": {}}"#).unwrap();
        job.set_language("en").unwrap();
        assert_eq!(job.language, Language::English);
        assert!(matches!(job.set_language("xx"), Err(JobError::Text(_))));
    }
}
