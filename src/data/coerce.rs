use chrono::{DateTime, NaiveDate, NaiveDateTime};
use log::{debug, info};

use super::model::{
    Categories, ColumnData, Dataset, RawValue, SemanticType, TypeSpec, TypedColumn, TypedDataset,
};
use crate::error::CoerceError;

/// Datetime layouts tried in order after RFC 3339.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d.%m.%Y %H:%M:%S",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%d.%m.%Y", "%Y/%m/%d"];

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Apply `spec` to `dataset`, producing a new typed dataset.
///
/// Columns not named in `spec` are left out. Every row holding a missing
/// value in any named column is removed before conversion, then each named
/// column is converted as a whole. The first cell that cannot be converted
/// fails the entire call, as does a dataset whose columns differ in length.
pub fn coerce(dataset: &Dataset, spec: &TypeSpec) -> Result<TypedDataset, CoerceError> {
    for (name, &target) in spec {
        if dataset.column(name).is_none() {
            return Err(CoerceError::ColumnNotFound {
                column: name.clone(),
                target,
            });
        }
    }

    let rows = dataset.len();
    if let Some(col) = dataset.columns.iter().find(|c| c.values.len() != rows) {
        return Err(CoerceError::RaggedColumn {
            column: col.name.clone(),
            len: col.values.len(),
            rows,
        });
    }

    // Retained columns in dataset order.
    let retained: Vec<(&super::model::RawColumn, SemanticType)> = dataset
        .columns
        .iter()
        .filter_map(|col| spec.get(&col.name).map(|&t| (col, t)))
        .collect();

    let keep: Vec<usize> = (0..dataset.len())
        .filter(|&row| retained.iter().all(|(col, _)| !col.values[row].is_missing()))
        .collect();
    let dropped_rows = dataset.len() - keep.len();
    if dropped_rows > 0 {
        info!("dropped {dropped_rows} of {} rows with missing values", dataset.len());
    }

    let mut columns = Vec::with_capacity(retained.len());
    for (col, target) in retained {
        let cells = keep.iter().map(|&row| &col.values[row]);
        let data = convert_column(&col.name, target, cells)?;
        debug!("coerced column '{}' to {target}", col.name);
        columns.push(TypedColumn {
            name: col.name.clone(),
            data,
        });
    }

    Ok(TypedDataset {
        columns,
        rows: keep.len(),
        dropped_rows,
    })
}

fn convert_column<'a>(
    column: &str,
    target: SemanticType,
    cells: impl Iterator<Item = &'a RawValue>,
) -> Result<ColumnData, CoerceError> {
    let fail = |detail: String| CoerceError::TypeCast {
        column: column.to_string(),
        target,
        detail,
    };

    let data = match target {
        SemanticType::Text => ColumnData::Text(cells.map(to_text).collect()),
        SemanticType::Categorical => {
            ColumnData::Categorical(Categories::from_labels(cells.map(to_text).collect()))
        }
        SemanticType::Numeric => ColumnData::Numeric(
            cells
                .map(|v| to_integer(v).map_err(&fail))
                .collect::<Result<_, _>>()?,
        ),
        SemanticType::Datetime => ColumnData::Datetime(
            cells
                .map(|v| to_datetime(v).map_err(&fail))
                .collect::<Result<_, _>>()?,
        ),
    };
    Ok(data)
}

// ---------------------------------------------------------------------------
// Cell conversions
// ---------------------------------------------------------------------------

fn to_text(value: &RawValue) -> String {
    match value {
        RawValue::String(s) | RawValue::Date(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Integers pass through, finite floats truncate toward zero.
fn to_integer(value: &RawValue) -> Result<i64, String> {
    match value {
        RawValue::Integer(i) => Ok(*i),
        RawValue::Float(f) => truncate(*f),
        RawValue::Bool(b) => Ok(i64::from(*b)),
        RawValue::String(s) => {
            let s = s.trim();
            if let Ok(i) = s.parse::<i64>() {
                return Ok(i);
            }
            match s.parse::<f64>() {
                Ok(f) => truncate(f),
                Err(_) => Err(format!("'{s}' is not a number")),
            }
        }
        RawValue::Date(d) => Err(format!("date '{d}' is not a number")),
        RawValue::Null => Err("missing value".to_string()),
    }
}

fn truncate(f: f64) -> Result<i64, String> {
    if !f.is_finite() || f >= i64::MAX as f64 || f < i64::MIN as f64 {
        return Err(format!("{f} does not fit a 64-bit integer"));
    }
    Ok(f.trunc() as i64)
}

fn to_datetime(value: &RawValue) -> Result<NaiveDateTime, String> {
    match value {
        RawValue::String(s) | RawValue::Date(s) => {
            parse_datetime(s.trim()).ok_or_else(|| format!("'{s}' is not a recognised date"))
        }
        other => Err(format!("{other} is not a date")),
    }
}

/// Parse a date or timestamp in any of the accepted layouts.
pub fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local());
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}
