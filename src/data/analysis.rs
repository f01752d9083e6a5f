use std::collections::BTreeMap;

use super::aggregate::{compute_aggregates, top_performers, AVERAGE_SCORE, TOTAL_SCORE};
use super::classify::classify;
use super::error::AnalysisError;
use super::model::{Classification, RawTable, ScoreTable};
use crate::stats::correlation::{correlation_matrix, CorrelationMatrix};
use crate::stats::{describe, Summary};

/// Everything derived from one loaded file. Built once per load and replaced
/// wholesale by the next one.
#[derive(Debug, Clone)]
pub struct Analysis {
    /// Classified table including the two aggregate columns.
    pub table: ScoreTable,
    pub classification: Classification,
    /// Pearson matrix over the subject columns.
    pub correlation: CorrelationMatrix,
    /// `describe` of the aggregates followed by every subject.
    pub summaries: BTreeMap<String, Summary>,
}

impl Analysis {
    pub fn subjects(&self) -> &[String] {
        &self.classification.subject
    }

    /// Columns shown in the overall score summary, in display order.
    pub fn summary_columns(&self) -> Vec<String> {
        let mut cols = vec![TOTAL_SCORE.to_string(), AVERAGE_SCORE.to_string()];
        cols.extend(self.subjects().iter().cloned());
        cols
    }

    pub fn top_performers(&self, n: usize) -> Vec<usize> {
        top_performers(&self.table, n)
    }
}

/// Classify `raw`, append aggregates and precompute the summaries.
pub fn analyze(raw: RawTable) -> Result<Analysis, AnalysisError> {
    let table = classify(raw)?;
    let classification = table.classification();
    let table = compute_aggregates(table, &classification.subject)?;

    let subject_columns: Vec<(&str, &[Option<f64>])> = classification
        .subject
        .iter()
        .filter_map(|name| table.numeric(name).map(|v| (name.as_str(), v)))
        .collect();
    let correlation = correlation_matrix(&subject_columns);

    let summaries = [TOTAL_SCORE, AVERAGE_SCORE]
        .into_iter()
        .chain(classification.subject.iter().map(String::as_str))
        .filter_map(|name| table.numeric(name).map(|v| (name.to_string(), describe(v))))
        .collect();

    log::info!(
        "analysed {} rows: {} identifier, {} subject, {} categorical columns",
        table.len(),
        classification.identifier.len(),
        classification.subject.len(),
        classification.categorical.len()
    );

    Ok(Analysis {
        table,
        classification,
        correlation,
        summaries,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::CellValue;

    fn raw() -> RawTable {
        let s = |v: &str| CellValue::String(v.to_string());
        RawTable::new(
            vec!["Roll No".into(), "Math".into(), "Science".into(), "Gender".into()],
            vec![
                vec![CellValue::Integer(1), CellValue::Integer(10), CellValue::Integer(30), s("F")],
                vec![CellValue::Integer(2), CellValue::Integer(20), CellValue::Integer(40), s("M")],
            ],
        )
    }

    #[test]
    fn analyze_runs_the_whole_pipeline() {
        let a = analyze(raw()).unwrap();
        assert_eq!(a.subjects(), &["math".to_string(), "science".to_string()]);
        assert_eq!(a.classification.identifier, vec!["roll no"]);
        assert_eq!(a.classification.categorical, vec!["gender"]);
        assert_eq!(a.table.numeric(TOTAL_SCORE).unwrap(), &[Some(40.0), Some(60.0)]);
        assert_eq!(a.top_performers(1), vec![1]);
        assert!((a.correlation.get("math", "science").unwrap() - 1.0).abs() < 1e-12);
        assert_eq!(a.summaries[AVERAGE_SCORE].mean, Some(25.0));
        assert_eq!(
            a.summary_columns(),
            vec!["total score", "average score", "math", "science"]
        );
    }

    #[test]
    fn analyze_is_reproducible() {
        let first = analyze(raw()).unwrap();
        let second = analyze(raw()).unwrap();
        assert_eq!(first.table, second.table);
        assert_eq!(first.classification, second.classification);
    }
}
