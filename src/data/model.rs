use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// RawValue – a single untyped cell as delivered by a file reader
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value mirroring common spreadsheet dtypes.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    /// Date or timestamp kept as text until coercion.
    Date(String),
    Null,
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawValue::String(s) => write!(f, "{s}"),
            RawValue::Integer(i) => write!(f, "{i}"),
            RawValue::Float(v) => write!(f, "{v}"),
            RawValue::Bool(b) => write!(f, "{b}"),
            RawValue::Date(d) => write!(f, "{d}"),
            RawValue::Null => write!(f, "<null>"),
        }
    }
}

impl RawValue {
    /// Whether the cell counts as missing: null, NaN, or blank text.
    pub fn is_missing(&self) -> bool {
        match self {
            RawValue::Null => true,
            RawValue::Float(v) => v.is_nan(),
            RawValue::String(s) | RawValue::Date(s) => s.trim().is_empty(),
            _ => false,
        }
    }
}

// ---------------------------------------------------------------------------
// Dataset – raw named columns
// ---------------------------------------------------------------------------

/// One named column of raw cells.
#[derive(Debug, Clone, PartialEq)]
pub struct RawColumn {
    pub name: String,
    pub values: Vec<RawValue>,
}

impl RawColumn {
    pub fn new(name: impl Into<String>, values: Vec<RawValue>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }
}

/// The raw dataset as produced by a file reader. Columns are kept in
/// source order and all have the same length.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    pub columns: Vec<RawColumn>,
}

impl Dataset {
    /// Build a dataset, padding short columns with nulls so every column has
    /// the same row count.
    pub fn from_columns(mut columns: Vec<RawColumn>) -> Self {
        let rows = columns.iter().map(|c| c.values.len()).max().unwrap_or(0);
        for col in &mut columns {
            col.values.resize(rows, RawValue::Null);
        }
        Dataset { columns }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.columns.first().map_or(0, |c| c.values.len())
    }

    /// Whether the dataset has no rows.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn column(&self, name: &str) -> Option<&RawColumn> {
        self.columns.iter().find(|c| c.name == name)
    }
}

// ---------------------------------------------------------------------------
// Semantic types
// ---------------------------------------------------------------------------

/// The caller-declared logical kind of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SemanticType {
    Text,
    #[serde(rename = "categoric", alias = "categorical")]
    Categorical,
    Numeric,
    Datetime,
}

impl fmt::Display for SemanticType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SemanticType::Text => "text",
            SemanticType::Categorical => "categoric",
            SemanticType::Numeric => "numeric",
            SemanticType::Datetime => "datetime",
        };
        f.write_str(name)
    }
}

/// Column name → declared semantic type.
pub type TypeSpec = BTreeMap<String, SemanticType>;

// ---------------------------------------------------------------------------
// Typed columns
// ---------------------------------------------------------------------------

/// A categorical column: the sorted label domain plus one code per row.
#[derive(Debug, Clone, PartialEq)]
pub struct Categories {
    pub labels: Vec<String>,
    pub codes: Vec<u32>,
}

impl Categories {
    /// Build the label domain from row labels.
    pub fn from_labels(rows: Vec<String>) -> Self {
        let mut labels = rows.clone();
        labels.sort();
        labels.dedup();
        let codes = rows
            .iter()
            .map(|row| labels.binary_search(row).unwrap_or_default() as u32)
            .collect();
        Categories { labels, codes }
    }

    pub fn label(&self, row: usize) -> &str {
        &self.labels[self.codes[row] as usize]
    }

    /// Row labels in row order.
    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        self.codes.iter().map(|&c| self.labels[c as usize].as_str())
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

/// The converted values of one retained column.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    Text(Vec<String>),
    Categorical(Categories),
    Numeric(Vec<i64>),
    Datetime(Vec<NaiveDateTime>),
}

impl ColumnData {
    pub fn semantic_type(&self) -> SemanticType {
        match self {
            ColumnData::Text(_) => SemanticType::Text,
            ColumnData::Categorical(_) => SemanticType::Categorical,
            ColumnData::Numeric(_) => SemanticType::Numeric,
            ColumnData::Datetime(_) => SemanticType::Datetime,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ColumnData::Text(v) => v.len(),
            ColumnData::Categorical(c) => c.len(),
            ColumnData::Numeric(v) => v.len(),
            ColumnData::Datetime(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypedColumn {
    pub name: String,
    pub data: ColumnData,
}

impl TypedColumn {
    pub fn semantic_type(&self) -> SemanticType {
        self.data.semantic_type()
    }
}

// ---------------------------------------------------------------------------
// TypedDataset – coercion output
// ---------------------------------------------------------------------------

/// A dataset whose retained columns each carry one semantic type.
/// Rows with missing values in any retained column have been removed, so
/// every column has exactly `rows` entries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TypedDataset {
    pub columns: Vec<TypedColumn>,
    pub rows: usize,
    /// Rows removed because a retained column had a missing value.
    pub dropped_rows: usize,
}

impl TypedDataset {
    pub fn len(&self) -> usize {
        self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    pub fn column(&self, name: &str) -> Option<&TypedColumn> {
        self.columns.iter().find(|c| c.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_values() {
        assert!(RawValue::Null.is_missing());
        assert!(RawValue::Float(f64::NAN).is_missing());
        assert!(RawValue::String("   ".into()).is_missing());
        assert!(!RawValue::String("x".into()).is_missing());
        assert!(!RawValue::Integer(0).is_missing());
    }

    #[test]
    fn from_columns_pads_short_columns() {
        let ds = Dataset::from_columns(vec![
            RawColumn::new("a", vec![RawValue::Integer(1), RawValue::Integer(2)]),
            RawColumn::new("b", vec![RawValue::Integer(3)]),
        ]);
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.column("b").unwrap().values[1], RawValue::Null);
    }

    #[test]
    fn categories_are_sorted_with_row_codes() {
        let cats = Categories::from_labels(vec!["South".into(), "North".into(), "South".into()]);
        assert_eq!(cats.labels, vec!["North", "South"]);
        assert_eq!(cats.codes, vec![1, 0, 1]);
        assert_eq!(cats.iter().collect::<Vec<_>>(), vec!["South", "North", "South"]);
    }

    #[test]
    fn semantic_type_wire_names() {
        let t: SemanticType = serde_json::from_str("\"categoric\"").unwrap();
        assert_eq!(t, SemanticType::Categorical);
        let t: SemanticType = serde_json::from_str("\"categorical\"").unwrap();
        assert_eq!(t, SemanticType::Categorical);
        assert_eq!(serde_json::to_string(&SemanticType::Datetime).unwrap(), "\"datetime\"");
    }
}
