use super::classify::check_unique;
use super::error::{AnalysisError, EmptyReason};
use super::model::{Column, ColumnRole, ColumnValues, ScoreTable};

pub const TOTAL_SCORE: &str = "total score";
pub const AVERAGE_SCORE: &str = "average score";

/// Append `total score` and `average score` computed across `subjects`.
///
/// * total: sum of the present values, a row with nothing present totals 0
/// * average: mean of the present values only, missing when nothing is present
pub fn compute_aggregates(
    mut table: ScoreTable,
    subjects: &[String],
) -> Result<ScoreTable, AnalysisError> {
    if subjects.is_empty() {
        return Err(AnalysisError::EmptyInput(EmptyReason::NoSubjects));
    }

    let mut names: Vec<String> = table.columns.iter().map(|c| c.name.clone()).collect();
    names.push(TOTAL_SCORE.to_string());
    names.push(AVERAGE_SCORE.to_string());
    check_unique(&names)?;

    let columns: Vec<&[Option<f64>]> = subjects
        .iter()
        .map(|name| {
            table
                .column(name)
                .filter(|c| c.role == ColumnRole::Subject)
                .and_then(Column::numeric)
                .ok_or_else(|| AnalysisError::UnknownColumn(name.clone()))
        })
        .collect::<Result<_, _>>()?;

    let mut totals = Vec::with_capacity(table.n_rows);
    let mut averages = Vec::with_capacity(table.n_rows);
    for row in 0..table.n_rows {
        let present: Vec<f64> = columns.iter().filter_map(|col| col[row]).collect();
        let total: f64 = present.iter().sum();
        totals.push(Some(total));
        averages.push((!present.is_empty()).then(|| total / present.len() as f64));
    }

    table.columns.push(Column {
        name: TOTAL_SCORE.to_string(),
        role: ColumnRole::Aggregate,
        values: ColumnValues::Numeric(totals),
    });
    table.columns.push(Column {
        name: AVERAGE_SCORE.to_string(),
        role: ColumnRole::Aggregate,
        values: ColumnValues::Numeric(averages),
    });
    Ok(table)
}

/// Row indices of the `n` best totals, highest first. Equal totals keep their
/// original row order. Returns an empty list before aggregates exist.
pub fn top_performers(table: &ScoreTable, n: usize) -> Vec<usize> {
    let Some(totals) = table.numeric(TOTAL_SCORE) else {
        return Vec::new();
    };
    let mut order: Vec<usize> = (0..totals.len()).collect();
    // `sort_by` is stable, so ties stay in row order.
    order.sort_by(|&a, &b| {
        let ta = totals[a].unwrap_or(f64::NEG_INFINITY);
        let tb = totals[b].unwrap_or(f64::NEG_INFINITY);
        tb.total_cmp(&ta)
    });
    order.truncate(n);
    order
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::classify::classify;
    use crate::data::model::{CellValue, RawTable};

    fn scores(rows: Vec<Vec<Option<f64>>>) -> ScoreTable {
        let cell = |v: Option<f64>| v.map(CellValue::Float).unwrap_or(CellValue::Null);
        let raw = RawTable::new(
            vec!["roll".into(), "math".into(), "science".into()],
            rows.into_iter()
                .enumerate()
                .map(|(i, r)| {
                    let mut row = vec![CellValue::Integer(i as i64 + 1)];
                    row.extend(r.into_iter().map(cell));
                    row
                })
                .collect(),
        );
        classify(raw).unwrap()
    }

    fn subjects() -> Vec<String> {
        vec!["math".into(), "science".into()]
    }

    #[test]
    fn totals_and_averages_per_row() {
        let t = scores(vec![
            vec![Some(10.0), Some(30.0)],
            vec![Some(20.0), Some(40.0)],
        ]);
        let t = compute_aggregates(t, &subjects()).unwrap();
        assert_eq!(t.numeric(TOTAL_SCORE).unwrap(), &[Some(40.0), Some(60.0)]);
        assert_eq!(t.numeric(AVERAGE_SCORE).unwrap(), &[Some(20.0), Some(30.0)]);
        assert_eq!(t.column(TOTAL_SCORE).unwrap().role, ColumnRole::Aggregate);
    }

    #[test]
    fn missing_cells_count_as_zero_in_total_and_are_skipped_in_average() {
        let t = scores(vec![
            vec![Some(10.0), None],
            vec![None, None],
            vec![Some(5.0), Some(5.0)],
        ]);
        let t = compute_aggregates(t, &subjects()).unwrap();
        assert_eq!(
            t.numeric(TOTAL_SCORE).unwrap(),
            &[Some(10.0), Some(0.0), Some(10.0)]
        );
        let avg = t.numeric(AVERAGE_SCORE).unwrap();
        assert_eq!(avg[0], Some(10.0));
        assert_eq!(avg[1], None, "all-missing row must not average to zero");
        assert_eq!(avg[2], Some(5.0));
    }

    #[test]
    fn rejects_empty_or_unknown_subjects() {
        let t = scores(vec![vec![Some(1.0), Some(2.0)]]);
        assert_eq!(
            compute_aggregates(t.clone(), &[]),
            Err(AnalysisError::EmptyInput(EmptyReason::NoSubjects))
        );
        assert_eq!(
            compute_aggregates(t.clone(), &["roll".to_string()]),
            Err(AnalysisError::UnknownColumn("roll".into()))
        );
        let once = compute_aggregates(t, &subjects()).unwrap();
        assert!(matches!(
            compute_aggregates(once, &subjects()),
            Err(AnalysisError::DuplicateColumns(_))
        ));
    }

    #[test]
    fn top_performer_is_the_highest_total() {
        let t = scores(vec![
            vec![Some(10.0), Some(30.0)],
            vec![Some(20.0), Some(40.0)],
        ]);
        let t = compute_aggregates(t, &subjects()).unwrap();
        assert_eq!(top_performers(&t, 1), vec![1]);
    }

    #[test]
    fn ranking_is_stable_and_bounded_by_row_count() {
        let t = scores(vec![
            vec![Some(10.0), Some(10.0)],
            vec![Some(50.0), Some(0.0)],
            vec![Some(5.0), Some(15.0)],
            vec![Some(1.0), Some(1.0)],
        ]);
        let t = compute_aggregates(t, &subjects()).unwrap();
        assert_eq!(top_performers(&t, 10), vec![1, 0, 2, 3]);
        assert_eq!(top_performers(&t, 2), vec![1, 0]);
    }
}
