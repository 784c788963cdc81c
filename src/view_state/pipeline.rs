//! Filter and sort stages applied before windowing.
//!
//! Both stages work on row positions rather than rows, so the caller's
//! dataset is never cloned or reordered. The output of [`process`] is the
//! processed dataset expressed as indices into the original rows.

use super::column::{CellValue, Columns};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Sort order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Smallest first.
    #[default]
    Ascending,
    /// Largest first.
    Descending,
}

impl SortDirection {
    /// The opposite direction.
    pub fn reversed(self) -> Self {
        match self {
            Self::Ascending => Self::Descending,
            Self::Descending => Self::Ascending,
        }
    }
}

/// Active sort: a column id and a direction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SortSpec {
    /// Column to order by.
    pub column: String,
    /// Order direction.
    pub direction: SortDirection,
}

impl SortSpec {
    /// Ascending sort on `column`.
    pub fn ascending(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            direction: SortDirection::Ascending,
        }
    }

    /// Descending sort on `column`.
    pub fn descending(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            direction: SortDirection::Descending,
        }
    }
}

/// Per-column substring filters, combined with AND.
///
/// An empty substring places no constraint and is not stored.
#[derive(Debug, Clone, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
pub struct FilterSet {
    filters: BTreeMap<String, String>,
}

impl FilterSet {
    /// No filters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the filter for `column`. Returns whether the set changed.
    pub fn set(&mut self, column: impl Into<String>, substring: impl Into<String>) -> bool {
        let column = column.into();
        let substring = substring.into();
        if substring.is_empty() {
            return self.filters.remove(&column).is_some();
        }
        self.filters.insert(column, substring.clone()) != Some(substring)
    }

    /// Builder-style [`set`](Self::set).
    pub fn with(mut self, column: impl Into<String>, substring: impl Into<String>) -> Self {
        self.set(column, substring);
        self
    }

    /// Remove the filter for `column`. Returns whether one was present.
    pub fn remove(&mut self, column: &str) -> bool {
        self.filters.remove(column).is_some()
    }

    /// Remove all filters. Returns whether any were present.
    pub fn clear(&mut self) -> bool {
        let had_any = !self.filters.is_empty();
        self.filters.clear();
        had_any
    }

    /// Active substring for `column`.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.filters.get(column).map(String::as_str)
    }

    /// Whether no filters are active.
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Number of active filters.
    pub fn len(&self) -> usize {
        self.filters.len()
    }

    /// Iterate `(column, substring)` in column order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.filters.iter().map(|(c, s)| (c.as_str(), s.as_str()))
    }
}

/// Positions of rows passing every filter, in input order.
///
/// Matching is a case-insensitive substring test on the stringified cell.
/// Filters naming unknown columns are ignored.
pub fn filter_indices<R>(rows: &[R], columns: &Columns<R>, filters: &FilterSet) -> Vec<usize> {
    let active: Vec<_> = filters
        .iter()
        .filter_map(|(id, needle)| columns.get(id).map(|c| (c, needle.to_lowercase())))
        .collect();

    if active.is_empty() {
        return (0..rows.len()).collect();
    }

    rows.iter()
        .enumerate()
        .filter(|(_, row)| {
            active.iter().all(|(column, needle)| {
                column
                    .value(row)
                    .to_string()
                    .to_lowercase()
                    .contains(needle.as_str())
            })
        })
        .map(|(i, _)| i)
        .collect()
}

/// How non-null keys of one sort pass are compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyKind {
    Numeric,
    Text,
    Bool,
    Mixed,
}

fn key_kind(keys: &[CellValue]) -> KeyKind {
    let mut kind = None;
    for key in keys {
        let this = match key {
            CellValue::Null => continue,
            CellValue::Int(_) | CellValue::Float(_) => KeyKind::Numeric,
            CellValue::Text(_) => KeyKind::Text,
            CellValue::Bool(_) => KeyKind::Bool,
        };
        match kind {
            None => kind = Some(this),
            Some(k) if k != this => return KeyKind::Mixed,
            Some(_) => {}
        }
    }
    kind.unwrap_or(KeyKind::Mixed)
}

fn compare_present(a: &CellValue, b: &CellValue, kind: KeyKind) -> Ordering {
    match (kind, a, b) {
        (KeyKind::Numeric, CellValue::Int(x), CellValue::Int(y)) => x.cmp(y),
        (KeyKind::Numeric, _, _) => {
            let x = a.as_f64().unwrap_or(f64::NAN);
            let y = b.as_f64().unwrap_or(f64::NAN);
            x.total_cmp(&y)
        }
        (KeyKind::Text, CellValue::Text(x), CellValue::Text(y)) => x.cmp(y),
        (KeyKind::Bool, CellValue::Bool(x), CellValue::Bool(y)) => x.cmp(y),
        _ => a.to_string().cmp(&b.to_string()),
    }
}

/// Order two keys: nulls last in either direction, otherwise `kind`
/// ordering flipped for descending.
fn compare_keys(a: &CellValue, b: &CellValue, kind: KeyKind, direction: SortDirection) -> Ordering {
    match (a.is_null(), b.is_null()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => {
            let ord = compare_present(a, b, kind);
            match direction {
                SortDirection::Ascending => ord,
                SortDirection::Descending => ord.reverse(),
            }
        }
    }
}

/// Stable in-place sort of `positions` by the column named in `sort`.
///
/// A column whose non-null values are not all of one type is compared by
/// stringified value. Unknown or non-sortable columns leave the order as is.
pub fn sort_indices<R>(rows: &[R], columns: &Columns<R>, positions: &mut Vec<usize>, sort: &SortSpec) {
    let Some(column) = columns.get(&sort.column).filter(|c| c.is_sortable()) else {
        return;
    };

    let mut keyed: Vec<(CellValue, usize)> = positions
        .iter()
        .map(|&i| (column.value(&rows[i]), i))
        .collect();
    let keys: Vec<CellValue> = keyed.iter().map(|(k, _)| k.clone()).collect();
    let kind = key_kind(&keys);

    keyed.sort_by(|(a, _), (b, _)| compare_keys(a, b, kind, sort.direction));
    *positions = keyed.into_iter().map(|(_, i)| i).collect();
}

/// Filter then sort, returning the processed order as row positions.
pub fn process<R>(
    rows: &[R],
    columns: &Columns<R>,
    filters: &FilterSet,
    sort: Option<&SortSpec>,
) -> Vec<usize> {
    let mut positions = filter_indices(rows, columns, filters);
    if let Some(sort) = sort {
        sort_indices(rows, columns, &mut positions, sort);
    }
    positions
}
