use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use arrow::array::{Array, AsArray, BooleanArray, Float32Array, Float64Array, Int32Array, Int64Array};
use arrow::datatypes::DataType;
use arrow::util::display::array_value_to_string;
use calamine::{open_workbook_auto, Data, DataType as _, Reader};
use log::info;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{Dataset, RawColumn, RawValue};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a tabular dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row, one column per field
/// * `.json`    – `[{ "col": value, ... }, ...]`
/// * `.parquet` – flat columns of strings, numbers, bools or dates
/// * `.xlsx` / `.xls` / `.xlsm` / `.ods` – first worksheet, header in row 1
pub fn load_file(path: &Path) -> Result<Dataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let dataset = match ext.as_str() {
        "csv" => load_csv(path),
        "json" => load_json(path),
        "parquet" | "pq" => load_parquet(path),
        "xlsx" | "xls" | "xlsm" | "xlsb" | "ods" => load_workbook(path),
        other => bail!("Unsupported file extension: .{other}"),
    }
    .with_context(|| format!("loading {}", path.display()))?;

    info!(
        "loaded {} rows × {} columns from {}",
        dataset.len(),
        dataset.columns.len(),
        path.display()
    );
    Ok(dataset)
}

// ---------------------------------------------------------------------------
// Column accumulator shared by the row-oriented readers
// ---------------------------------------------------------------------------

#[derive(Default)]
struct ColumnsBuilder {
    columns: Vec<RawColumn>,
    rows: usize,
}

impl ColumnsBuilder {
    fn with_headers(headers: &[String]) -> Self {
        ColumnsBuilder {
            columns: headers
                .iter()
                .map(|h| RawColumn::new(h.clone(), Vec::new()))
                .collect(),
            rows: 0,
        }
    }

    /// Index of `name`, adding a null-filled column for a header first seen
    /// mid-file.
    fn index_of(&mut self, name: &str) -> usize {
        if let Some(i) = self.columns.iter().position(|c| c.name == name) {
            return i;
        }
        self.columns
            .push(RawColumn::new(name, vec![RawValue::Null; self.rows]));
        self.columns.len() - 1
    }

    fn set(&mut self, col: usize, value: RawValue) {
        let values = &mut self.columns[col].values;
        values.resize(self.rows, RawValue::Null);
        values.push(value);
    }

    fn end_row(&mut self) {
        self.rows += 1;
        for col in &mut self.columns {
            col.values.resize(self.rows, RawValue::Null);
        }
    }

    fn finish(self) -> Dataset {
        Dataset::from_columns(self.columns)
    }
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "Region": "North", "Sales": 10, "Date": "2021-01-04" },
///   ...
/// ]
/// ```
///
/// Columns appear in the order their keys are first seen in the file.
/// Keys missing from a record become nulls.
fn load_json(path: &Path) -> Result<Dataset> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let records = root.as_array().context("Expected top-level JSON array")?;

    let mut builder = ColumnsBuilder::default();
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;
        for (key, val) in obj {
            let col = builder.index_of(key);
            builder.set(col, json_to_raw(val));
        }
        builder.end_row();
    }

    Ok(builder.finish())
}

fn json_to_raw(val: &JsonValue) -> RawValue {
    match val {
        JsonValue::String(s) => RawValue::String(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                RawValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                RawValue::Float(f)
            } else {
                RawValue::String(n.to_string())
            }
        }
        JsonValue::Bool(b) => RawValue::Bool(*b),
        JsonValue::Null => RawValue::Null,
        other => RawValue::String(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, one field per column.
/// Each cell's type is guessed independently.
fn load_csv(path: &Path) -> Result<Dataset> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut builder = ColumnsBuilder::with_headers(&headers);
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        for (col_idx, value) in record.iter().enumerate().take(headers.len()) {
            builder.set(col_idx, guess_cell_type(value));
        }
        builder.end_row();
    }

    Ok(builder.finish())
}

/// Guess a cell's type from its text.
pub fn guess_cell_type(s: &str) -> RawValue {
    if s.trim().is_empty() {
        return RawValue::Null;
    }
    if let Ok(i) = s.parse::<i64>() {
        return RawValue::Integer(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        return RawValue::Float(f);
    }
    if s == "true" || s == "false" {
        return RawValue::Bool(s == "true");
    }
    RawValue::String(s.to_string())
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with flat columns.
///
/// Strings, integers, floats and bools map to the matching raw value; dates,
/// timestamps and anything else are kept as their display text.
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`).
fn load_parquet(path: &Path) -> Result<Dataset> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut columns: Vec<RawColumn> = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let schema = batch.schema();

        if columns.is_empty() {
            columns = schema
                .fields()
                .iter()
                .map(|f| RawColumn::new(f.name().clone(), Vec::new()))
                .collect();
        }

        for (col_idx, column) in columns.iter_mut().enumerate() {
            let array = batch.column(col_idx);
            for row in 0..batch.num_rows() {
                let value = extract_raw_value(array, row)
                    .with_context(|| format!("Row {row}: failed to read '{}'", column.name))?;
                column.values.push(value);
            }
        }
    }

    Ok(Dataset::from_columns(columns))
}

/// Extract a single cell from an Arrow column at a given row.
fn extract_raw_value(col: &Arc<dyn Array>, row: usize) -> Result<RawValue> {
    if col.is_null(row) {
        return Ok(RawValue::Null);
    }
    let value = match col.data_type() {
        DataType::Utf8 => RawValue::String(col.as_string::<i32>().value(row).to_string()),
        DataType::LargeUtf8 => RawValue::String(col.as_string::<i64>().value(row).to_string()),
        DataType::Int32 => {
            let arr = col
                .as_any()
                .downcast_ref::<Int32Array>()
                .context("expected Int32Array")?;
            RawValue::Integer(arr.value(row) as i64)
        }
        DataType::Int64 => {
            let arr = col
                .as_any()
                .downcast_ref::<Int64Array>()
                .context("expected Int64Array")?;
            RawValue::Integer(arr.value(row))
        }
        DataType::Float32 => {
            let arr = col
                .as_any()
                .downcast_ref::<Float32Array>()
                .context("expected Float32Array")?;
            RawValue::Float(arr.value(row) as f64)
        }
        DataType::Float64 => {
            let arr = col
                .as_any()
                .downcast_ref::<Float64Array>()
                .context("expected Float64Array")?;
            RawValue::Float(arr.value(row))
        }
        DataType::Boolean => {
            let arr = col
                .as_any()
                .downcast_ref::<BooleanArray>()
                .context("expected BooleanArray")?;
            RawValue::Bool(arr.value(row))
        }
        DataType::Date32 | DataType::Date64 | DataType::Timestamp(_, _) => {
            RawValue::Date(array_value_to_string(col.as_ref(), row)?)
        }
        _ => RawValue::String(array_value_to_string(col.as_ref(), row)?),
    };
    Ok(value)
}

// ---------------------------------------------------------------------------
// Workbook loader
// ---------------------------------------------------------------------------

/// Read the first worksheet of a workbook; the first row holds the headers.
fn load_workbook(path: &Path) -> Result<Dataset> {
    let mut workbook = open_workbook_auto(path).context("opening workbook")?;
    let range = workbook
        .worksheet_range_at(0)
        .context("workbook has no worksheet")?
        .context("reading worksheet")?;

    let mut rows = range.rows();
    let headers: Vec<String> = match rows.next() {
        Some(header) => header
            .iter()
            .enumerate()
            .map(|(i, cell)| match cell {
                Data::Empty => format!("column_{i}"),
                other => other.to_string(),
            })
            .collect(),
        None => return Ok(Dataset::default()),
    };

    let mut builder = ColumnsBuilder::with_headers(&headers);
    for row in rows {
        for (col_idx, cell) in row.iter().enumerate().take(headers.len()) {
            builder.set(col_idx, cell_to_raw(cell));
        }
        builder.end_row();
    }

    Ok(builder.finish())
}

fn cell_to_raw(cell: &Data) -> RawValue {
    match cell {
        Data::Empty | Data::Error(_) => RawValue::Null,
        Data::String(s) => RawValue::String(s.clone()),
        Data::Int(i) => RawValue::Integer(*i),
        Data::Float(f) => RawValue::Float(*f),
        Data::Bool(b) => RawValue::Bool(*b),
        Data::DateTimeIso(s) => RawValue::Date(s.clone()),
        other => match other.as_datetime() {
            Some(dt) => RawValue::Date(dt.format("%Y-%m-%d %H:%M:%S").to_string()),
            None => RawValue::String(other.to_string()),
        },
    }
}
