use serde::ser::SerializeSeq;
use serde::{Serialize, Serializer};

use crate::text::TermCount;

// ---------------------------------------------------------------------------
// Payload building blocks
// ---------------------------------------------------------------------------

/// The `y` of a labelled point: a count (pie, bar counts) or a group mean.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Measure {
    Count(u64),
    Mean(f64),
}

/// `{ "name": label, "y": value }`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabeledValue {
    pub name: String,
    pub y: Measure,
}

/// `{ "name": ..., "data": [...] }` – the common series shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series<T> {
    pub name: String,
    pub data: Vec<T>,
}

impl<T> Series<T> {
    pub fn new(name: impl Into<String>, data: Vec<T>) -> Self {
        Series {
            name: name.into(),
            data,
        }
    }
}

// ---------------------------------------------------------------------------
// Per-kind payloads
// ---------------------------------------------------------------------------

/// Time series: serialised as `[{"x_axis": [...]}, {"name", "data"}, ...]`.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeriesPayload {
    pub x_axis: Vec<String>,
    pub series: Vec<Series<i64>>,
}

#[derive(Serialize)]
struct XAxis<'a> {
    x_axis: &'a [String],
}

impl Serialize for TimeSeriesPayload {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(1 + self.series.len()))?;
        seq.serialize_element(&XAxis {
            x_axis: &self.x_axis,
        })?;
        for series in &self.series {
            seq.serialize_element(series)?;
        }
        seq.end()
    }
}

/// `{"x_axis": [column], "series": [summary, outliers]}`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxPlotPayload {
    pub x_axis: Vec<String>,
    pub series: (Series<f64>, Series<[i64; 2]>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramPayload {
    pub name: String,
    pub data: Vec<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bins: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub density: Option<bool>,
}

/// Correlation cells as `[row, col, r]`; `r` is `null` where undefined.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationPayload {
    pub name: String,
    pub x_axis: Vec<String>,
    pub data: Vec<(usize, usize, Option<f64>)>,
}

impl CorrelationPayload {
    pub fn value(&self, row: usize, col: usize) -> Option<f64> {
        let n = self.x_axis.len();
        self.data.get(row * n + col).and_then(|cell| cell.2)
    }
}

// ---------------------------------------------------------------------------
// ChartPayload
// ---------------------------------------------------------------------------

/// The aggregate produced for one chart request. Serialises to the bare
/// shape of its variant.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ChartPayload {
    Pie(Series<LabeledValue>),
    Bar(Series<LabeledValue>),
    Scatter(Series<[i64; 2]>),
    TimeSeries(TimeSeriesPayload),
    BoxPlot(BoxPlotPayload),
    Histogram(HistogramPayload),
    Correlation(CorrelationPayload),
    WordFrequency(Series<TermCount>),
    RowLength(Series<usize>),
}

/// A payload together with its artifact name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NamedPayload {
    pub artifact: String,
    pub payload: ChartPayload,
}
