use serde::Deserialize;
use serde_json::Value as JsonValue;

use crate::error::{ChartError, JobError};

/// Most numeric series a time plot can carry.
pub const MAX_TIME_SERIES: usize = 3;

// ---------------------------------------------------------------------------
// ChartRequest – one chart instruction, validated at the boundary
// ---------------------------------------------------------------------------

/// A chart request tagged by `"type"`.
///
/// `x` names the primary column and `y` the secondary one(s). Older clients
/// send `categoric_col_name` / `numeric_col_name` or `num_col_name_1` /
/// `num_col_name_2`; those keys are accepted as aliases of `x` / `y`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ChartRequest {
    Pieplot {
        #[serde(alias = "categoric_col_name")]
        x: String,
    },
    Barplot {
        #[serde(alias = "categoric_col_name")]
        x: String,
        #[serde(default, alias = "numeric_col_name")]
        y: Option<String>,
    },
    Scatterplot {
        #[serde(alias = "num_col_name_1")]
        x: String,
        #[serde(alias = "num_col_name_2")]
        y: String,
    },
    Timeplot {
        x: String,
        #[serde(alias = "numeric_col_name")]
        y: SeriesColumns,
    },
    Boxplot {
        #[serde(alias = "numeric_col_name")]
        x: String,
    },
    Histogram {
        #[serde(alias = "numeric_col_name")]
        x: String,
        #[serde(default)]
        bins: Option<u32>,
        #[serde(default)]
        density: Option<bool>,
    },
    Correlation {},
    Wordcloud {
        x: String,
        /// Overrides the batch language for this request.
        #[serde(default)]
        language: Option<String>,
        #[serde(default)]
        stem: Option<bool>,
    },
    Rowlength {
        x: String,
    },
}

/// One column name or a list of them.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum SeriesColumns {
    One(String),
    Many(Vec<String>),
}

impl SeriesColumns {
    pub fn names(&self) -> Vec<&str> {
        match self {
            SeriesColumns::One(name) => vec![name.as_str()],
            SeriesColumns::Many(names) => names.iter().map(String::as_str).collect(),
        }
    }
}

impl ChartRequest {
    /// The wire name of the request kind.
    pub fn kind(&self) -> &'static str {
        match self {
            ChartRequest::Pieplot { .. } => "pieplot",
            ChartRequest::Barplot { .. } => "barplot",
            ChartRequest::Scatterplot { .. } => "scatterplot",
            ChartRequest::Timeplot { .. } => "timeplot",
            ChartRequest::Boxplot { .. } => "boxplot",
            ChartRequest::Histogram { .. } => "histogram",
            ChartRequest::Correlation {} => "correlation",
            ChartRequest::Wordcloud { .. } => "wordcloud",
            ChartRequest::Rowlength { .. } => "rowlength",
        }
    }

    /// Stable key under which the request's payload is published.
    pub fn artifact_name(&self) -> String {
        match self {
            ChartRequest::Pieplot { x } => format!("data_pieplot_{x}"),
            ChartRequest::Barplot { x, y: None } => format!("data_barplot_{x}"),
            ChartRequest::Barplot { x, y: Some(y) } => format!("data_barplot_{x}_{y}"),
            ChartRequest::Scatterplot { x, y } => format!("data_scatter_{x}_{y}"),
            ChartRequest::Timeplot { x, y } => {
                format!("data_timeplot_{x}_{}", y.names().join("_"))
            }
            ChartRequest::Boxplot { x } => format!("data_boxplot_{x}"),
            ChartRequest::Histogram { x, .. } => format!("data_histogram_{x}"),
            ChartRequest::Correlation {} => "data_correlation".to_string(),
            ChartRequest::Wordcloud { x, .. } => format!("data_wordcloud_{x}"),
            ChartRequest::Rowlength { x } => format!("data_rowlength_{x}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Batch parsing
// ---------------------------------------------------------------------------

/// Parse a batch of requests. A batch that is not a JSON array is rejected
/// outright; a single bad entry only yields an error in its own slot.
pub fn parse_batch(batch: &JsonValue) -> Result<Vec<Result<ChartRequest, ChartError>>, JobError> {
    let entries = batch.as_array().ok_or(JobError::BatchNotArray)?;
    Ok(entries.iter().map(parse_request).collect())
}

pub fn parse_request(entry: &JsonValue) -> Result<ChartRequest, ChartError> {
    ChartRequest::deserialize(entry).map_err(|e| ChartError::InvalidRequest(e.to_string()))
}
