use ndarray::{Array1, Array2};

use crate::data::error::AnalysisError;
use crate::data::model::ScoreTable;

use super::regression::LinearRegression;

/// Observed spread of one feature column; bounds the values a prediction
/// may be asked for.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRange {
    pub name: String,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

impl FeatureRange {
    fn from_column(name: &str, values: &[Option<f64>]) -> Option<Self> {
        let present: Vec<f64> = values.iter().flatten().copied().collect();
        let min = present.iter().copied().reduce(f64::min)?;
        let max = present.iter().copied().reduce(f64::max)?;
        let mean = super::mean(&present)?;
        Some(FeatureRange {
            name: name.to_string(),
            min,
            max,
            mean,
        })
    }

    pub fn contains(&self, value: f64) -> bool {
        (self.min..=self.max).contains(&value)
    }
}

/// Predicts one subject from all the others.
#[derive(Debug, Clone, PartialEq)]
pub struct ScorePredictor {
    pub target: String,
    /// One entry per feature, in subject column order.
    pub features: Vec<FeatureRange>,
    pub model: LinearRegression,
    /// Rows with every feature and the target present.
    pub n_samples: usize,
    /// R² on the training rows.
    pub r_squared: f64,
}

impl ScorePredictor {
    /// Train on the rows where the target and every other subject are present.
    pub fn train(
        table: &ScoreTable,
        subjects: &[String],
        target: &str,
    ) -> Result<Self, AnalysisError> {
        if !subjects.iter().any(|s| s == target) {
            return Err(AnalysisError::UnknownColumn(target.to_string()));
        }
        let target_values = numeric_column(table, target)?;

        let feature_names: Vec<&String> = subjects.iter().filter(|s| *s != target).collect();
        if feature_names.is_empty() {
            return Err(AnalysisError::NotEnoughFeatures {
                target: target.to_string(),
            });
        }
        let feature_values: Vec<&[Option<f64>]> = feature_names
            .iter()
            .map(|name| numeric_column(table, name))
            .collect::<Result<_, _>>()?;

        // Listwise deletion.
        let complete: Vec<usize> = (0..table.n_rows)
            .filter(|&r| target_values[r].is_some() && feature_values.iter().all(|f| f[r].is_some()))
            .collect();
        if complete.is_empty() {
            return Err(AnalysisError::NoCompleteRows {
                target: target.to_string(),
            });
        }

        let x = Array2::from_shape_fn((complete.len(), feature_values.len()), |(i, j)| {
            feature_values[j][complete[i]].unwrap_or_default()
        });
        let y: Array1<f64> = complete
            .iter()
            .map(|&r| target_values[r].unwrap_or_default())
            .collect();

        let model = LinearRegression::fit(&x, &y)?;
        let r_squared = model.score(&x, &y);

        let features = feature_names
            .iter()
            .zip(&feature_values)
            .filter_map(|(name, values)| FeatureRange::from_column(name, values))
            .collect();

        log::info!(
            "trained predictor for '{target}' on {} rows ({} features), R² = {r_squared:.3}",
            complete.len(),
            feature_values.len()
        );

        Ok(ScorePredictor {
            target: target.to_string(),
            features,
            model,
            n_samples: complete.len(),
            r_squared,
        })
    }

    /// Slider start values: the mean of each feature.
    pub fn default_inputs(&self) -> Vec<f64> {
        self.features.iter().map(|f| f.mean).collect()
    }

    /// Predict the target from one value per feature, each within the
    /// observed range of its column.
    pub fn predict(&self, inputs: &[f64]) -> Result<f64, AnalysisError> {
        if inputs.len() != self.features.len() {
            return Err(AnalysisError::FeatureCount {
                expected: self.features.len(),
                actual: inputs.len(),
            });
        }
        for (range, &value) in self.features.iter().zip(inputs) {
            if !range.contains(value) {
                return Err(AnalysisError::FeatureOutOfRange {
                    feature: range.name.clone(),
                    value,
                    min: range.min,
                    max: range.max,
                });
            }
        }
        Ok(self.model.predict_one(inputs))
    }
}

fn numeric_column<'t>(
    table: &'t ScoreTable,
    name: &str,
) -> Result<&'t [Option<f64>], AnalysisError> {
    table
        .numeric(name)
        .ok_or_else(|| AnalysisError::UnknownColumn(name.to_string()))
}
