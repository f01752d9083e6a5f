use std::collections::BTreeSet;

use super::error::{AnalysisError, EmptyReason};
use super::model::{CellValue, Column, ColumnRole, ColumnValues, RawTable, ScoreTable};

/// Substrings that mark a column as a row identifier. Matched anywhere in the
/// normalized name, so "grid" counts as an identifier through "id".
pub const IDENTIFIER_MARKERS: [&str; 6] = ["roll", "sr", "admission", "id", "name", "s.no"];

/// Trim and lower-case a header. Idempotent.
pub fn normalize_column_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Whether a normalized column name contains any identifier marker.
pub fn is_identifier_name(normalized: &str) -> bool {
    IDENTIFIER_MARKERS
        .iter()
        .any(|marker| normalized.contains(marker))
}

/// Normalize headers and partition the columns of `table`.
///
/// * identifier columns are flagged by name only and never coerced
/// * every other column is coerced cell by cell; it is a subject column when at
///   least one cell survives coercion
/// * the rest are categorical and keep their original cells
///
/// Fails when normalization produces duplicate names, when there are no
/// columns, or when no column qualifies as a subject.
pub fn classify(table: RawTable) -> Result<ScoreTable, AnalysisError> {
    if table.columns.is_empty() {
        return Err(AnalysisError::EmptyInput(EmptyReason::NoColumns));
    }

    let names: Vec<String> = table
        .columns
        .iter()
        .map(|c| normalize_column_name(c))
        .collect();
    check_unique(&names)?;

    let n_rows = table.len();
    let columns: Vec<Column> = names
        .into_iter()
        .enumerate()
        .map(|(idx, name)| {
            let cells = table.column_cells(idx);
            classify_column(name, cells)
        })
        .collect();

    let scores = ScoreTable { columns, n_rows };
    let classification = scores.classification();
    log::debug!(
        "classified {} rows: identifier={:?} subject={:?} categorical={:?}",
        n_rows,
        classification.identifier,
        classification.subject,
        classification.categorical
    );

    if classification.subject.is_empty() {
        return Err(AnalysisError::EmptyInput(EmptyReason::NoSubjects));
    }
    Ok(scores)
}

fn classify_column(name: String, cells: Vec<CellValue>) -> Column {
    if is_identifier_name(&name) {
        return Column {
            name,
            role: ColumnRole::Identifier,
            values: ColumnValues::Raw(cells),
        };
    }

    let coerced: Vec<Option<f64>> = cells.iter().map(CellValue::coerce_f64).collect();
    if coerced.iter().any(Option::is_some) {
        Column {
            name,
            role: ColumnRole::Subject,
            values: ColumnValues::Numeric(coerced),
        }
    } else {
        Column {
            name,
            role: ColumnRole::Categorical,
            values: ColumnValues::Raw(cells),
        }
    }
}

/// Error with every name that occurs more than once, in first-seen order.
pub(crate) fn check_unique(names: &[String]) -> Result<(), AnalysisError> {
    let mut seen = BTreeSet::new();
    let mut duplicates: Vec<String> = Vec::new();
    for name in names {
        if !seen.insert(name.as_str()) && !duplicates.contains(name) {
            duplicates.push(name.clone());
        }
    }
    if duplicates.is_empty() {
        Ok(())
    } else {
        Err(AnalysisError::DuplicateColumns(duplicates))
    }
}
