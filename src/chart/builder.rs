use chrono::NaiveDateTime;
use log::{debug, info, warn};

use super::payload::{
    BoxPlotPayload, ChartPayload, CorrelationPayload, HistogramPayload, LabeledValue, Measure,
    NamedPayload, Series, TimeSeriesPayload,
};
use super::request::{ChartRequest, MAX_TIME_SERIES};
use super::stats;
use crate::data::classify::ColumnViews;
use crate::data::model::{Categories, SemanticType};
use crate::error::ChartError;
use crate::text::{row_lengths, FrequencyAnalyzer, Language};

const OUTLIER_LOW: f64 = 0.01;
const OUTLIER_HIGH: f64 = 0.99;

// ---------------------------------------------------------------------------
// Batch
// ---------------------------------------------------------------------------

/// Defaults for requests that do not carry their own text options.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuildOptions {
    pub language: Language,
    pub stem: bool,
}

/// A request that produced no payload, by position in the batch.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedRequest {
    pub index: usize,
    pub reason: ChartError,
}

/// Outcome of a batch: the payloads that could be built and the requests
/// that were skipped.
#[derive(Debug, Clone, Default)]
pub struct ChartBatch {
    pub payloads: Vec<NamedPayload>,
    pub skipped: Vec<SkippedRequest>,
}

impl ChartBatch {
    pub fn get(&self, artifact: &str) -> Option<&ChartPayload> {
        self.payloads
            .iter()
            .find(|p| p.artifact == artifact)
            .map(|p| &p.payload)
    }
}

/// Build one payload per request. Requests are independent: one that
/// cannot be satisfied is recorded in [`ChartBatch::skipped`] and the rest
/// of the batch carries on. Artifact names are unique within a batch; a
/// request whose name an earlier payload already holds is skipped.
pub fn build<I>(views: &ColumnViews<'_>, requests: I, options: &BuildOptions) -> ChartBatch
where
    I: IntoIterator<Item = Result<ChartRequest, ChartError>>,
{
    let mut batch = ChartBatch::default();
    for (index, request) in requests.into_iter().enumerate() {
        let built = request.and_then(|r| build_request(views, &r, options));
        let built = built.and_then(|named| {
            if batch.get(&named.artifact).is_some() {
                Err(ChartError::InvalidRequest(format!(
                    "artifact '{}' is already produced by an earlier request",
                    named.artifact
                )))
            } else {
                Ok(named)
            }
        });
        match built {
            Ok(named) => {
                debug!("built {}", named.artifact);
                batch.payloads.push(named);
            }
            Err(reason) => {
                warn!("skipping chart request #{index}: {reason}");
                batch.skipped.push(SkippedRequest { index, reason });
            }
        }
    }
    info!(
        "built {} chart payloads, skipped {}",
        batch.payloads.len(),
        batch.skipped.len()
    );
    batch
}

/// Build the payload for a single request.
pub fn build_request(
    views: &ColumnViews<'_>,
    request: &ChartRequest,
    options: &BuildOptions,
) -> Result<NamedPayload, ChartError> {
    let payload = match request {
        ChartRequest::Pieplot { x } => ChartPayload::Pie(category_counts(views, x)?),
        ChartRequest::Barplot { x, y: None } => ChartPayload::Bar(category_counts(views, x)?),
        ChartRequest::Barplot { x, y: Some(y) } => ChartPayload::Bar(category_means(views, x, y)?),
        ChartRequest::Scatterplot { x, y } => ChartPayload::Scatter(scatter(views, x, y)?),
        ChartRequest::Timeplot { x, y } => {
            ChartPayload::TimeSeries(time_series(views, x, &y.names())?)
        }
        ChartRequest::Boxplot { x } => ChartPayload::BoxPlot(box_plot(views, x)?),
        ChartRequest::Histogram { x, bins, density } => ChartPayload::Histogram(HistogramPayload {
            name: x.clone(),
            data: numeric(views, x)?.to_vec(),
            bins: *bins,
            density: *density,
        }),
        ChartRequest::Correlation {} => ChartPayload::Correlation(correlation(views)?),
        ChartRequest::Wordcloud { x, language, stem } => {
            let language = match language {
                Some(name) => name.parse::<Language>()?,
                None => options.language,
            };
            let analyzer =
                FrequencyAnalyzer::new(language).with_stemming(stem.unwrap_or(options.stem));
            let joined = text(views, x)?.join(" ");
            ChartPayload::WordFrequency(Series::new(x.clone(), analyzer.rank(&joined)))
        }
        ChartRequest::Rowlength { x } => {
            ChartPayload::RowLength(Series::new(x.clone(), row_lengths(text(views, x)?)))
        }
    };
    Ok(NamedPayload {
        artifact: request.artifact_name(),
        payload,
    })
}

// ---------------------------------------------------------------------------
// Column lookup
// ---------------------------------------------------------------------------

fn not_in_view(column: &str, view: SemanticType) -> ChartError {
    ChartError::ColumnNotInView {
        column: column.to_string(),
        view,
    }
}

fn categorical<'d>(views: &ColumnViews<'d>, name: &str) -> Result<&'d Categories, ChartError> {
    views
        .categorical
        .categorical(name)
        .ok_or_else(|| not_in_view(name, SemanticType::Categorical))
}

fn numeric<'d>(views: &ColumnViews<'d>, name: &str) -> Result<&'d [i64], ChartError> {
    views
        .numeric
        .numeric(name)
        .ok_or_else(|| not_in_view(name, SemanticType::Numeric))
}

fn datetime<'d>(views: &ColumnViews<'d>, name: &str) -> Result<&'d [NaiveDateTime], ChartError> {
    views
        .datetime
        .datetime(name)
        .ok_or_else(|| not_in_view(name, SemanticType::Datetime))
}

fn text<'d>(views: &ColumnViews<'d>, name: &str) -> Result<&'d [String], ChartError> {
    views
        .text
        .text(name)
        .ok_or_else(|| not_in_view(name, SemanticType::Text))
}

fn as_f64(values: &[i64]) -> Vec<f64> {
    values.iter().map(|&v| v as f64).collect()
}

// ---------------------------------------------------------------------------
// Per-kind aggregations
// ---------------------------------------------------------------------------

/// Label frequencies, most frequent first.
fn category_counts(views: &ColumnViews<'_>, x: &str) -> Result<Series<LabeledValue>, ChartError> {
    let cats = categorical(views, x)?;
    let data = stats::value_counts(cats.iter())
        .into_iter()
        .map(|(name, n)| LabeledValue {
            name,
            y: Measure::Count(n),
        })
        .collect();
    Ok(Series::new(x, data))
}

/// Mean of `y` per `x` group, rounded to one decimal, in label order.
fn category_means(
    views: &ColumnViews<'_>,
    x: &str,
    y: &str,
) -> Result<Series<LabeledValue>, ChartError> {
    let cats = categorical(views, x)?;
    let values = numeric(views, y)?;
    let data = stats::grouped_means(cats, values)
        .into_iter()
        .map(|(name, mean)| LabeledValue {
            name,
            y: Measure::Mean(stats::round_to(mean, 1)),
        })
        .collect();
    Ok(Series::new(format!("{x} vs {y}"), data))
}

fn scatter(views: &ColumnViews<'_>, x: &str, y: &str) -> Result<Series<[i64; 2]>, ChartError> {
    let xs = numeric(views, x)?;
    let ys = numeric(views, y)?;
    let data = xs.iter().zip(ys).map(|(&a, &b)| [a, b]).collect();
    Ok(Series::new(format!("{x} vs {y}"), data))
}

/// Rows ordered by date, dates rendered `dd/mm/yyyy`.
fn time_series(
    views: &ColumnViews<'_>,
    x: &str,
    ys: &[&str],
) -> Result<TimeSeriesPayload, ChartError> {
    if ys.is_empty() || ys.len() > MAX_TIME_SERIES {
        return Err(ChartError::InvalidRequest(format!(
            "time plot needs 1 to {MAX_TIME_SERIES} numeric series, got {}",
            ys.len()
        )));
    }
    let dates = datetime(views, x)?;
    let columns = ys
        .iter()
        .map(|&name| numeric(views, name).map(|values| (name, values)))
        .collect::<Result<Vec<_>, _>>()?;

    let mut order: Vec<usize> = (0..dates.len()).collect();
    order.sort_by_key(|&row| dates[row]);

    let x_axis = order
        .iter()
        .map(|&row| dates[row].format("%d/%m/%Y").to_string())
        .collect();
    let series = columns
        .into_iter()
        .map(|(name, values)| Series::new(name, order.iter().map(|&row| values[row]).collect()))
        .collect();

    Ok(TimeSeriesPayload { x_axis, series })
}

/// Five-number summary plus the values outside the 1st–99th percentile band.
fn box_plot(views: &ColumnViews<'_>, x: &str) -> Result<BoxPlotPayload, ChartError> {
    let values = numeric(views, x)?;
    let floats = as_f64(values);
    let summary =
        stats::five_number_summary(&floats).ok_or_else(|| ChartError::EmptyColumn(x.to_string()))?;

    let mut sorted = floats;
    sorted.sort_by(f64::total_cmp);
    let low = stats::percentile(&sorted, OUTLIER_LOW).unwrap_or(summary[0]);
    let high = stats::percentile(&sorted, OUTLIER_HIGH).unwrap_or(summary[4]);
    let outliers = values
        .iter()
        .filter(|&&v| (v as f64) < low || (v as f64) > high)
        .map(|&v| [0, v])
        .collect();

    Ok(BoxPlotPayload {
        x_axis: vec![x.to_string()],
        series: (
            Series::new(x, summary.to_vec()),
            Series::new("Outliers", outliers),
        ),
    })
}

/// Pearson matrix over every numeric column, row-major.
fn correlation(views: &ColumnViews<'_>) -> Result<CorrelationPayload, ChartError> {
    if views.numeric.is_empty() {
        return Err(ChartError::NoNumericColumns);
    }
    let names = views.numeric.names();
    let columns = names
        .iter()
        .map(|name| numeric(views, name).map(as_f64))
        .collect::<Result<Vec<_>, _>>()?;

    let n = columns.len();
    let mut matrix = vec![None; n * n];
    for i in 0..n {
        for j in i..n {
            let r = stats::pearson(&columns[i], &columns[j]).map(|r| stats::round_to(r, 4));
            matrix[i * n + j] = r;
            matrix[j * n + i] = r;
        }
    }

    let data = matrix
        .into_iter()
        .enumerate()
        .map(|(cell, r)| (cell / n, cell % n, r))
        .collect();
    Ok(CorrelationPayload {
        name: "Correlation Matrix".to_string(),
        x_axis: names.into_iter().map(String::from).collect(),
        data,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::classify::classify;
    use crate::data::coerce::coerce;
    use crate::data::model::{Dataset, RawColumn, RawValue, TypeSpec, TypedDataset};
    use serde_json::json;

    fn s(v: &str) -> RawValue {
        RawValue::String(v.to_string())
    }

    fn typed(columns: Vec<RawColumn>, spec: &[(&str, SemanticType)]) -> TypedDataset {
        let spec: TypeSpec = spec.iter().map(|(k, t)| (k.to_string(), *t)).collect();
        coerce(&Dataset::from_columns(columns), &spec).unwrap()
    }

    fn region_sales() -> TypedDataset {
        typed(
            vec![
                RawColumn::new("Region", vec![s("North"), s("South"), s("North")]),
                RawColumn::new(
                    "Sales",
                    vec![RawValue::Integer(10), RawValue::Integer(20), RawValue::Integer(30)],
                ),
            ],
            &[
                ("Region", SemanticType::Categorical),
                ("Sales", SemanticType::Numeric),
            ],
        )
    }

    fn one(views: &ColumnViews<'_>, request: serde_json::Value) -> Result<serde_json::Value, ChartError> {
        let request = crate::chart::request::parse_request(&request)?;
        let named = build_request(views, &request, &BuildOptions::default())?;
        Ok(serde_json::to_value(&named.payload).unwrap())
    }

    #[test]
    fn bar_means_by_region() {
        let ds = region_sales();
        let views = classify(&ds);
        let payload = one(&views, json!({"type": "barplot", "x": "Region", "y": "Sales"})).unwrap();
        assert_eq!(
            payload,
            json!({
                "name": "Region vs Sales",
                "data": [{"name": "North", "y": 20.0}, {"name": "South", "y": 20.0}]
            })
        );
    }

    #[test]
    fn pie_counts_by_region() {
        let ds = region_sales();
        let views = classify(&ds);
        let payload = one(&views, json!({"type": "pieplot", "x": "Region"})).unwrap();
        assert_eq!(
            payload,
            json!({"name": "Region", "data": [{"name": "North", "y": 2}, {"name": "South", "y": 1}]})
        );
        let bar = one(&views, json!({"type": "barplot", "x": "Region"})).unwrap();
        assert_eq!(bar, payload);
    }

    #[test]
    fn bar_mean_rounds_to_one_decimal() {
        let ds = typed(
            vec![
                RawColumn::new("g", vec![s("a"), s("a"), s("a")]),
                RawColumn::new(
                    "v",
                    vec![RawValue::Integer(1), RawValue::Integer(1), RawValue::Integer(2)],
                ),
            ],
            &[("g", SemanticType::Categorical), ("v", SemanticType::Numeric)],
        );
        let views = classify(&ds);
        let payload = one(&views, json!({"type": "barplot", "x": "g", "y": "v"})).unwrap();
        assert_eq!(payload["data"][0]["y"], json!(1.3));
    }

    #[test]
    fn scatter_truncates_to_integers() {
        let ds = typed(
            vec![
                RawColumn::new("a", vec![RawValue::Float(1.9), RawValue::Float(2.0)]),
                RawColumn::new("b", vec![RawValue::Float(3.1), RawValue::Float(4.9)]),
            ],
            &[("a", SemanticType::Numeric), ("b", SemanticType::Numeric)],
        );
        let views = classify(&ds);
        let payload = one(&views, json!({"type": "scatterplot", "x": "a", "y": "b"})).unwrap();
        assert_eq!(payload, json!({"name": "a vs b", "data": [[1, 3], [2, 4]]}));
    }

    #[test]
    fn time_series_sorted_by_date() {
        let ds = typed(
            vec![
                RawColumn::new("Day", vec![s("2021-03-01"), s("2021-01-15"), s("2021-02-01")]),
                RawColumn::new(
                    "Sales",
                    vec![RawValue::Integer(3), RawValue::Integer(1), RawValue::Integer(2)],
                ),
                RawColumn::new(
                    "Cost",
                    vec![RawValue::Integer(30), RawValue::Integer(10), RawValue::Integer(20)],
                ),
            ],
            &[
                ("Day", SemanticType::Datetime),
                ("Sales", SemanticType::Numeric),
                ("Cost", SemanticType::Numeric),
            ],
        );
        let views = classify(&ds);
        let payload = one(
            &views,
            json!({"type": "timeplot", "x": "Day", "y": ["Sales", "Cost"]}),
        )
        .unwrap();
        assert_eq!(
            payload,
            json!([
                {"x_axis": ["15/01/2021", "01/02/2021", "01/03/2021"]},
                {"name": "Sales", "data": [1, 2, 3]},
                {"name": "Cost", "data": [10, 20, 30]}
            ])
        );

        let too_many = one(
            &views,
            json!({"type": "timeplot", "x": "Day", "y": ["Sales", "Cost", "Sales", "Cost"]}),
        );
        assert!(matches!(too_many, Err(ChartError::InvalidRequest(_))));
    }

    #[test]
    fn box_plot_summary_and_outliers() {
        let values: Vec<RawValue> = (1..=100).chain([1000]).map(RawValue::Integer).collect();
        let ds = typed(
            vec![RawColumn::new("v", values)],
            &[("v", SemanticType::Numeric)],
        );
        let views = classify(&ds);
        let payload = one(&views, json!({"type": "boxplot", "x": "v"})).unwrap();

        assert_eq!(payload["x_axis"], json!(["v"]));
        let summary: Vec<f64> = serde_json::from_value(payload["series"][0]["data"].clone()).unwrap();
        assert_eq!(summary.len(), 5);
        assert!(summary.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(summary[0], 1.0);
        assert_eq!(summary[2], 51.0);
        assert_eq!(summary[4], 1000.0);
        assert_eq!(payload["series"][1]["name"], json!("Outliers"));
        assert_eq!(payload["series"][1]["data"], json!([[0, 1], [0, 1000]]));
    }

    #[test]
    fn box_plot_on_non_numeric_column_is_skipped() {
        let ds = region_sales();
        let views = classify(&ds);
        let batch = build(
            &views,
            [
                crate::chart::request::parse_request(&json!({"type": "boxplot", "x": "Region"})),
                crate::chart::request::parse_request(&json!({"type": "boxplot", "x": "Nope"})),
                crate::chart::request::parse_request(&json!({"type": "histogram", "x": "Sales"})),
            ],
            &BuildOptions::default(),
        );
        assert_eq!(batch.payloads.len(), 1);
        assert_eq!(batch.payloads[0].artifact, "data_histogram_Sales");
        assert_eq!(batch.skipped.len(), 2);
        assert_eq!(
            batch.skipped[0].reason,
            ChartError::ColumnNotInView {
                column: "Region".into(),
                view: SemanticType::Numeric
            }
        );
    }

    #[test]
    fn correlation_is_symmetric_with_unit_diagonal() {
        let ints = |v: &[i64]| v.iter().copied().map(RawValue::Integer).collect::<Vec<_>>();
        let ds = typed(
            vec![
                RawColumn::new("a", ints(&[1, 2, 3, 4, 5])),
                RawColumn::new("b", ints(&[2, 4, 5, 4, 5])),
                RawColumn::new("c", ints(&[5, 4, 3, 2, 1])),
                RawColumn::new("flat", ints(&[7, 7, 7, 7, 7])),
            ],
            &[
                ("a", SemanticType::Numeric),
                ("b", SemanticType::Numeric),
                ("c", SemanticType::Numeric),
                ("flat", SemanticType::Numeric),
            ],
        );
        let views = classify(&ds);
        let payload = correlation(&views).unwrap();
        let n = payload.x_axis.len();
        assert_eq!(n, 4);
        assert_eq!(payload.data.len(), 16);
        for i in 0..n {
            for j in 0..n {
                assert_eq!(payload.value(i, j), payload.value(j, i));
                assert_eq!(payload.data[i * n + j].0, i);
                assert_eq!(payload.data[i * n + j].1, j);
            }
        }
        for i in 0..3 {
            assert_eq!(payload.value(i, i), Some(1.0));
        }
        assert_eq!(payload.value(0, 2), Some(-1.0));
        assert_eq!(payload.value(3, 3), None);
        assert_eq!(payload.value(0, 1), Some(0.7746));
    }

    #[test]
    fn correlation_without_numeric_columns_is_skipped() {
        let ds = typed(
            vec![RawColumn::new("r", vec![s("x")])],
            &[("r", SemanticType::Categorical)],
        );
        let views = classify(&ds);
        assert_eq!(correlation(&views), Err(ChartError::NoNumericColumns));
    }

    #[test]
    fn word_frequency_uses_text_view() {
        let ds = typed(
            vec![RawColumn::new(
                "Comment",
                vec![s("Great product, great price"), s("great service")],
            )],
            &[("Comment", SemanticType::Text)],
        );
        let views = classify(&ds);
        let payload = one(
            &views,
            json!({"type": "wordcloud", "x": "Comment", "language": "english"}),
        )
        .unwrap();
        assert_eq!(payload["name"], json!("Comment"));
        assert_eq!(payload["data"][0], json!(["great", 3]));
        assert!(payload["data"].as_array().unwrap().len() <= crate::text::MAX_TERMS);

        let bad = one(
            &views,
            json!({"type": "wordcloud", "x": "Comment", "language": "latin"}),
        );
        assert!(matches!(bad, Err(ChartError::Text(_))));

        let lengths = one(&views, json!({"type": "rowlength", "x": "Comment"})).unwrap();
        assert_eq!(lengths, json!({"name": "Comment", "data": [26, 13]}));
    }

    #[test]
    fn time_series_keeps_wall_clock_date_of_offset_timestamps() {
        let ds = typed(
            vec![
                RawColumn::new("Day", vec![s("2021-01-01T01:00:00+03:00")]),
                RawColumn::new("Sales", vec![RawValue::Integer(5)]),
            ],
            &[("Day", SemanticType::Datetime), ("Sales", SemanticType::Numeric)],
        );
        let views = classify(&ds);
        let payload = one(&views, json!({"type": "timeplot", "x": "Day", "y": "Sales"})).unwrap();
        assert_eq!(
            payload,
            json!([{"x_axis": ["01/01/2021"]}, {"name": "Sales", "data": [5]}])
        );
    }

    #[test]
    fn duplicate_artifact_names_skip_the_later_request() {
        let ds = typed(
            vec![
                RawColumn::new("A", vec![s("p"), s("q")]),
                RawColumn::new("A_B", vec![s("u"), s("v")]),
                RawColumn::new("B", vec![RawValue::Integer(1), RawValue::Integer(2)]),
            ],
            &[
                ("A", SemanticType::Categorical),
                ("A_B", SemanticType::Categorical),
                ("B", SemanticType::Numeric),
            ],
        );
        let views = classify(&ds);
        let requests = [
            json!({"type": "barplot", "x": "A", "y": "B"}),
            json!({"type": "barplot", "x": "A_B"}),
        ];
        let batch = build(
            &views,
            requests.iter().map(crate::chart::request::parse_request),
            &BuildOptions::default(),
        );

        assert_eq!(batch.payloads.len(), 1);
        assert_eq!(batch.payloads[0].artifact, "data_barplot_A_B");
        let kept = serde_json::to_value(batch.get("data_barplot_A_B").unwrap()).unwrap();
        assert_eq!(kept["name"], json!("A vs B"));
        assert_eq!(batch.skipped.len(), 1);
        assert_eq!(batch.skipped[0].index, 1);
        assert!(matches!(batch.skipped[0].reason, ChartError::InvalidRequest(_)));
    }

    #[test]
    fn request_stem_flag_overrides_batch_options() {
        let ds = typed(
            vec![RawColumn::new("Comment", vec![s("running runs"), s("running late")])],
            &[("Comment", SemanticType::Text)],
        );
        let views = classify(&ds);
        let options = BuildOptions {
            language: Language::English,
            stem: false,
        };
        let run = |request: serde_json::Value| {
            let request = crate::chart::request::parse_request(&request).unwrap();
            let named = build_request(&views, &request, &options).unwrap();
            serde_json::to_value(&named.payload).unwrap()
        };

        let plain = run(json!({"type": "wordcloud", "x": "Comment"}));
        assert_eq!(plain["data"][0], json!(["running", 2]));

        let stemmed = run(json!({"type": "wordcloud", "x": "Comment", "stem": true}));
        assert_eq!(stemmed["data"][0], json!(["run", 3]));
    }
}
