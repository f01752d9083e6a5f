use std::path::Path;

use anyhow::{Context, Result};

use crate::config::Settings;
use crate::data::analysis::{analyze, Analysis};
use crate::data::error::AnalysisError;
use crate::data::loader::load_file;
use crate::data::model::RawTable;
use crate::stats::predictor::ScorePredictor;

// ---------------------------------------------------------------------------
// Status line
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum Status {
    Info(String),
    Warning(String),
    Error(String),
}

// ---------------------------------------------------------------------------
// Predictor panel state
// ---------------------------------------------------------------------------

/// Trained model for the chosen target plus the slider values.
#[derive(Debug, Clone)]
pub struct PredictionState {
    pub target: String,
    pub predictor: Result<ScorePredictor, AnalysisError>,
    pub inputs: Vec<f64>,
    pub result: Option<Result<f64, AnalysisError>>,
}

impl PredictionState {
    fn train(analysis: &Analysis, target: &str) -> Self {
        let predictor = ScorePredictor::train(&analysis.table, analysis.subjects(), target);
        if let Err(e) = &predictor {
            log::warn!("Predictor for '{target}' unavailable: {e}");
        }
        let inputs = predictor
            .as_ref()
            .map(ScorePredictor::default_inputs)
            .unwrap_or_default();
        PredictionState {
            target: target.to_string(),
            predictor,
            inputs,
            result: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state for one session, independent of rendering.
pub struct AppState {
    pub settings: Settings,

    /// Current analysis (None until a file loads successfully).
    pub analysis: Option<Analysis>,

    /// Subject analysed by the distribution, box and regression views.
    pub subject: Option<String>,

    /// Column grouping the box plot; None disables it.
    pub compare: Option<String>,

    /// x axis of the regression trendline.
    pub regression_feature: Option<String>,

    /// Rows in the top performers table.
    pub top_n: usize,

    pub prediction: Option<PredictionState>,

    /// Status / warning / error message shown in the UI.
    pub status: Option<Status>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}

impl AppState {
    pub fn new(settings: Settings) -> Self {
        Self {
            top_n: settings.top_n_default,
            settings,
            analysis: None,
            subject: None,
            compare: None,
            regression_feature: None,
            prediction: None,
            status: Some(Status::Info(
                "Please open a CSV file to begin (File → Open…)".to_string(),
            )),
        }
    }

    /// Load and analyse a file, replacing whatever was loaded before.
    pub fn open_path(&mut self, path: &Path) {
        match load_file(path) {
            Ok(raw) => self.ingest(raw),
            Err(e) => {
                log::error!("Failed to load file: {e:#}");
                self.clear();
                self.status = Some(Status::Error(format!("Error: {e:#}")));
            }
        }
    }

    /// Analyse a freshly loaded table and reset every selection.
    pub fn ingest(&mut self, raw: RawTable) {
        self.clear();
        match analyze(raw) {
            Ok(analysis) => {
                self.set_analysis(analysis);
                self.status = None;
            }
            Err(e) if e.is_warning() => {
                log::warn!("{e}");
                self.status = Some(Status::Warning(e.to_string()));
            }
            Err(e) => {
                log::error!("{e}");
                self.status = Some(Status::Error(format!("Error: {e}")));
            }
        }
    }

    fn clear(&mut self) {
        self.analysis = None;
        self.subject = None;
        self.compare = None;
        self.regression_feature = None;
        self.prediction = None;
        self.top_n = self.settings.top_n_default;
    }

    fn set_analysis(&mut self, analysis: Analysis) {
        let first = analysis.subjects().first().cloned();
        self.subject = first.clone();
        self.regression_feature = self.default_regression_feature(&analysis);
        self.prediction = first.map(|target| PredictionState::train(&analysis, &target));
        self.analysis = Some(analysis);
    }

    fn default_regression_feature(&self, analysis: &Analysis) -> Option<String> {
        analysis
            .subjects()
            .iter()
            .find(|s| Some(*s) != self.subject.as_ref())
            .cloned()
    }

    /// Change the analysed subject; the regression feature must differ from it.
    pub fn set_subject(&mut self, subject: String) {
        self.subject = Some(subject);
        if self.regression_feature == self.subject {
            if let Some(analysis) = &self.analysis {
                self.regression_feature = self.default_regression_feature(analysis);
            }
        }
    }

    /// Retrain the predictor for a new target subject.
    pub fn set_prediction_target(&mut self, target: &str) {
        if let Some(analysis) = &self.analysis {
            self.prediction = Some(PredictionState::train(analysis, target));
        }
    }

    /// Drop a prediction made for slider values that are no longer selected.
    pub fn inputs_changed(&mut self) {
        if let Some(p) = &mut self.prediction {
            p.result = None;
        }
    }

    /// Run the predictor on the current slider values.
    pub fn predict(&mut self) {
        if let Some(p) = &mut self.prediction {
            if let Ok(predictor) = &p.predictor {
                let result = predictor.predict(&p.inputs);
                match &result {
                    Ok(v) => log::info!("Predicted {} = {v:.2}", p.target),
                    Err(e) => log::warn!("Prediction failed: {e}"),
                }
                p.result = Some(result);
            }
        }
    }

    /// Write the augmented table to `path` as CSV.
    pub fn export_csv(&self, path: &Path) -> Result<()> {
        let analysis = self.analysis.as_ref().context("no dataset loaded")?;
        let table = analysis.table.to_raw();
        let mut writer = csv::Writer::from_path(path).context("creating CSV file")?;
        writer
            .write_record(&table.columns)
            .context("writing CSV header")?;
        for (row_no, row) in table.rows.iter().enumerate() {
            writer
                .write_record(row.iter().map(|cell| cell.to_string()))
                .with_context(|| format!("writing CSV row {row_no}"))?;
        }
        writer.flush().context("flushing CSV file")?;
        log::info!("Exported {} rows to {}", table.len(), path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::CellValue;

    fn raw(columns: &[&str], rows: &[&[i64]]) -> RawTable {
        RawTable::new(
            columns.iter().map(|c| c.to_string()).collect(),
            rows.iter()
                .map(|r| r.iter().map(|v| CellValue::Integer(*v)).collect())
                .collect(),
        )
    }

    #[test]
    fn ingest_selects_defaults() {
        let mut state = AppState::default();
        state.ingest(raw(
            &["id", "math", "science", "english"],
            &[&[1, 10, 30, 20], &[2, 20, 40, 35], &[3, 30, 35, 50], &[4, 45, 60, 40]],
        ));
        assert!(state.status.is_none());
        assert_eq!(state.subject.as_deref(), Some("math"));
        assert_eq!(state.regression_feature.as_deref(), Some("science"));
        let prediction = state.prediction.as_ref().unwrap();
        assert_eq!(prediction.target, "math");
        assert!(prediction.predictor.is_ok());
        assert_eq!(prediction.inputs.len(), 2);

        state.set_subject("science".into());
        assert_eq!(state.regression_feature.as_deref(), Some("math"));

        state.predict();
        assert!(matches!(
            state.prediction.as_ref().unwrap().result,
            Some(Ok(_))
        ));
    }

    #[test]
    fn changing_inputs_discards_the_stale_prediction() {
        let mut state = AppState::default();
        state.ingest(raw(
            &["math", "science"],
            &[&[10, 30], &[20, 40], &[30, 35]],
        ));
        state.predict();
        assert!(state.prediction.as_ref().unwrap().result.is_some());

        state.prediction.as_mut().unwrap().inputs[0] = 31.0;
        state.inputs_changed();
        assert!(state.prediction.as_ref().unwrap().result.is_none());
    }

    #[test]
    fn no_subjects_is_a_warning_and_clears_previous_data() {
        let mut state = AppState::default();
        state.ingest(raw(&["math"], &[&[1]]));
        assert!(state.analysis.is_some());

        state.ingest(raw(&["roll", "student name"], &[&[1, 2]]));
        assert!(state.analysis.is_none());
        assert!(matches!(state.status, Some(Status::Warning(_))));
    }

    #[test]
    fn single_subject_skips_prediction_only() {
        let mut state = AppState::default();
        state.ingest(raw(&["math"], &[&[1], &[2]]));
        assert!(state.analysis.is_some());
        assert!(state.regression_feature.is_none());
        let prediction = state.prediction.as_ref().unwrap();
        assert!(matches!(
            prediction.predictor,
            Err(AnalysisError::NotEnoughFeatures { .. })
        ));
    }

    #[test]
    fn duplicate_headers_are_an_error() {
        let mut state = AppState::default();
        state.ingest(raw(&["Math", "math "], &[&[1, 2]]));
        assert!(matches!(state.status, Some(Status::Error(_))));
    }

    #[test]
    fn export_writes_aggregates() {
        let mut state = AppState::default();
        state.ingest(raw(&["roll", "math", "science"], &[&[1, 10, 30], &[2, 20, 40]]));
        let file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        state.export_csv(file.path()).unwrap();
        let text = std::fs::read_to_string(file.path()).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("roll,math,science,total score,average score"));
        assert_eq!(lines.next(), Some("1,10,30,40,20"));
        assert_eq!(lines.next(), Some("2,20,40,60,30"));
    }
}
