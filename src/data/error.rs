use std::fmt;

use thiserror::Error;

/// Why a table could not be analysed at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyReason {
    NoColumns,
    NoSubjects,
}

impl fmt::Display for EmptyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmptyReason::NoColumns => f.write_str("the file has no columns"),
            EmptyReason::NoSubjects => {
                f.write_str("no valid subject columns detected, please check your CSV file")
            }
        }
    }
}

/// Failures of the analysis pipeline and the score predictor.
///
/// Loading and I/O go through `anyhow`; these are the domain conditions the
/// dashboard reports back to the user.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalysisError {
    #[error("duplicate column names after normalisation: {}", .0.join(", "))]
    DuplicateColumns(Vec<String>),

    #[error("{0}")]
    EmptyInput(EmptyReason),

    #[error("unknown subject column '{0}'")]
    UnknownColumn(String),

    #[error("not enough features to train a model for '{target}'")]
    NotEnoughFeatures { target: String },

    #[error("no rows have every subject filled in, cannot train a model for '{target}'")]
    NoCompleteRows { target: String },

    #[error("expected {expected} feature values, got {actual}")]
    FeatureCount { expected: usize, actual: usize },

    #[error("{feature} = {value} is outside the observed range [{min}, {max}]")]
    FeatureOutOfRange {
        feature: String,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("least squares produced no finite coefficients")]
    SingularMatrix,
}

impl AnalysisError {
    /// Conditions shown as a warning rather than an error: the data is
    /// readable, it just does not support the requested step.
    pub fn is_warning(&self) -> bool {
        matches!(
            self,
            AnalysisError::EmptyInput(_)
                | AnalysisError::NotEnoughFeatures { .. }
                | AnalysisError::NoCompleteRows { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_problem() {
        let err = AnalysisError::DuplicateColumns(vec!["math".into()]);
        assert_eq!(
            err.to_string(),
            "duplicate column names after normalisation: math"
        );
        assert!(!err.is_warning());

        let warn = AnalysisError::EmptyInput(EmptyReason::NoSubjects);
        assert!(warn.to_string().contains("no valid subject columns"));
        assert!(warn.is_warning());
    }
}
