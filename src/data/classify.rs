use chrono::NaiveDateTime;

use super::model::{Categories, ColumnData, SemanticType, TypedColumn, TypedDataset};

// ---------------------------------------------------------------------------
// ColumnView – columns of one semantic type
// ---------------------------------------------------------------------------

/// Read-only projection of a typed dataset onto one semantic type.
#[derive(Debug, Clone)]
pub struct ColumnView<'a> {
    pub kind: SemanticType,
    columns: Vec<&'a TypedColumn>,
}

impl<'a> ColumnView<'a> {
    fn of(dataset: &'a TypedDataset, kind: SemanticType) -> Self {
        ColumnView {
            kind,
            columns: dataset
                .columns
                .iter()
                .filter(|c| c.semantic_type() == kind)
                .collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&'a TypedColumn> {
        self.columns.iter().copied().find(|c| c.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Column names in dataset order.
    pub fn names(&self) -> Vec<&'a str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn columns(&self) -> &[&'a TypedColumn] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn text(&self, name: &str) -> Option<&'a [String]> {
        match &self.get(name)?.data {
            ColumnData::Text(v) => Some(v),
            _ => None,
        }
    }

    pub fn categorical(&self, name: &str) -> Option<&'a Categories> {
        match &self.get(name)?.data {
            ColumnData::Categorical(c) => Some(c),
            _ => None,
        }
    }

    pub fn numeric(&self, name: &str) -> Option<&'a [i64]> {
        match &self.get(name)?.data {
            ColumnData::Numeric(v) => Some(v),
            _ => None,
        }
    }

    pub fn datetime(&self, name: &str) -> Option<&'a [NaiveDateTime]> {
        match &self.get(name)?.data {
            ColumnData::Datetime(v) => Some(v),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// The four disjoint views of a typed dataset.
#[derive(Debug, Clone)]
pub struct ColumnViews<'a> {
    pub categorical: ColumnView<'a>,
    pub numeric: ColumnView<'a>,
    pub datetime: ColumnView<'a>,
    pub text: ColumnView<'a>,
    pub rows: usize,
}

impl<'a> ColumnViews<'a> {
    pub fn view(&self, kind: SemanticType) -> &ColumnView<'a> {
        match kind {
            SemanticType::Categorical => &self.categorical,
            SemanticType::Numeric => &self.numeric,
            SemanticType::Datetime => &self.datetime,
            SemanticType::Text => &self.text,
        }
    }
}

/// Partition `dataset` by each column's semantic type tag.
pub fn classify(dataset: &TypedDataset) -> ColumnViews<'_> {
    ColumnViews {
        categorical: ColumnView::of(dataset, SemanticType::Categorical),
        numeric: ColumnView::of(dataset, SemanticType::Numeric),
        datetime: ColumnView::of(dataset, SemanticType::Datetime),
        text: ColumnView::of(dataset, SemanticType::Text),
        rows: dataset.rows,
    }
}
