//! # tabular-charts
//!
//! Turns a raw table plus a declared type per column into chart-ready JSON
//! aggregates.
//!
//! ## Modules
//!
//! - [`data`]: raw and typed datasets, file loading, coercion, classification
//! - [`text`]: stopwords, stemming and 1/2-gram frequency ranking
//! - [`chart`]: chart requests, per-kind aggregation and payload shapes
//! - [`job`]: the per-run job description (type map, chart batch, text options)
//! - [`pipeline`]: coerce → classify → build in one call
//! - [`artifacts`]: persisting payloads as JSON files
//! - [`error`]: error types
//!
//! ## Quick Start
//!
//! ```
//! use tabular_charts::data::model::{Dataset, RawColumn, RawValue};
//! use tabular_charts::job::Job;
//! use tabular_charts::pipeline::run;
//!
//! let s = |v: &str| RawValue::String(v.to_string());
//! let dataset = Dataset::from_columns(vec![
//!     RawColumn::new("Region", vec![s("North"), s("South"), s("North")]),
//!     RawColumn::new("Sales", vec![RawValue::Integer(10), RawValue::Integer(20), RawValue::Integer(30)]),
//! ]);
//! let job = Job::from_json(r#"{
//!     "types": {"Region": "categoric", "Sales": "numeric"},
//!     "charts": [{"type": "barplot", "x": "Region", "y": "Sales"}]
//! }"#).unwrap();
//!
//! let batch = run(&dataset, &job).unwrap();
//! let json = serde_json::to_value(batch.get("data_barplot_Region_Sales").unwrap()).unwrap();
//! assert_eq!(json["data"][0]["y"], 20.0);
//! ```

pub mod artifacts;
pub mod chart;
pub mod data;
pub mod error;
pub mod job;
pub mod pipeline;
pub mod text;
