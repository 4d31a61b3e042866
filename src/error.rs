//! Error types for the coercion, text and chart stages.

use thiserror::Error;

use crate::data::model::SemanticType;

/// Failure of a whole `coerce` call.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoerceError {
    /// A cell could not be converted to its declared type.
    #[error("cannot cast column '{column}' to {target}: {detail}")]
    TypeCast {
        column: String,
        target: SemanticType,
        detail: String,
    },
    /// The type map names a column the dataset does not have.
    #[error("column '{column}' declared as {target} is not in the dataset")]
    ColumnNotFound {
        column: String,
        target: SemanticType,
    },
    /// A column's length differs from the dataset's row count.
    #[error("column '{column}' has {len} values, expected {rows}")]
    RaggedColumn {
        column: String,
        len: usize,
        rows: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TextError {
    #[error("unsupported language '{0}'")]
    UnsupportedLanguage(String),
}

/// Why a single chart request produced no payload.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ChartError {
    #[error("invalid chart request: {0}")]
    InvalidRequest(String),
    #[error("column '{column}' is not in the {view} view")]
    ColumnNotInView { column: String, view: SemanticType },
    #[error("column '{0}' has no rows")]
    EmptyColumn(String),
    #[error("no numeric columns to correlate")]
    NoNumericColumns,
    #[error(transparent)]
    Text(#[from] TextError),
}

/// Failure to read a job description or its chart batch.
#[derive(Debug, Error)]
pub enum JobError {
    #[error("malformed job: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("chart batch must be a JSON array")]
    BatchNotArray,
    #[error(transparent)]
    Text(#[from] TextError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure of a whole pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Coerce(#[from] CoerceError),
    #[error(transparent)]
    Job(#[from] JobError),
}
