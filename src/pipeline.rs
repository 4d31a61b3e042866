use log::info;

use crate::chart::{build, ChartBatch};
use crate::data::classify::classify;
use crate::data::coerce::coerce;
use crate::data::model::Dataset;
use crate::error::PipelineError;
use crate::job::Job;

/// Coerce `dataset` with the job's type map, classify the result and build
/// every chart in the job's batch.
///
/// Coercion failures and a malformed batch abort the run; individual chart
/// requests that cannot be satisfied only show up in
/// [`ChartBatch::skipped`].
pub fn run(dataset: &Dataset, job: &Job) -> Result<ChartBatch, PipelineError> {
    let requests = job.requests()?;
    let typed = coerce(dataset, &job.types)?;
    let views = classify(&typed);
    info!(
        "{} rows: {} categorical, {} numeric, {} datetime, {} text columns",
        typed.rows,
        views.categorical.len(),
        views.numeric.len(),
        views.datetime.len(),
        views.text.len()
    );
    Ok(build(&views, requests, &job.options()))
}
