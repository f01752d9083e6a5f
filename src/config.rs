use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Environment variable naming an optional JSON settings file.
pub const CONFIG_ENV: &str = "RUSTY_SCORES_CONFIG";

// ---------------------------------------------------------------------------
// Dashboard settings
// ---------------------------------------------------------------------------

/// Tunables for the dashboard. Every field has a default, so a settings file
/// only needs the keys it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Bins in the distribution histogram.
    pub histogram_bins: usize,
    /// Initial value of the top performers slider.
    pub top_n_default: usize,
    pub top_n_min: usize,
    pub top_n_max: usize,
    /// Rows shown in the uploaded data preview.
    pub preview_rows: usize,
    /// Box plot whisker length in IQRs.
    pub whisker_iqr: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            histogram_bins: 20,
            top_n_default: 10,
            top_n_min: 5,
            top_n_max: 20,
            preview_rows: 200,
            whisker_iqr: 1.5,
        }
    }
}

impl Settings {
    /// Read settings from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading settings file {}", path.display()))?;
        let settings: Settings = serde_json::from_str(&text).context("parsing settings JSON")?;
        Ok(settings.validated())
    }

    /// Settings from the file named by `RUSTY_SCORES_CONFIG`, or defaults.
    /// A broken file is logged and ignored.
    pub fn from_env() -> Self {
        let Some(path) = std::env::var_os(CONFIG_ENV) else {
            return Self::default();
        };
        match Self::load(Path::new(&path)) {
            Ok(settings) => {
                log::info!("Using settings from {}", Path::new(&path).display());
                settings
            }
            Err(e) => {
                log::warn!("Ignoring settings file: {e:#}");
                Self::default()
            }
        }
    }

    /// Clamp inconsistent values into something the UI can render.
    pub fn validated(mut self) -> Self {
        self.histogram_bins = self.histogram_bins.max(1);
        self.top_n_min = self.top_n_min.max(1);
        self.top_n_max = self.top_n_max.max(self.top_n_min);
        self.top_n_default = self.top_n_default.clamp(self.top_n_min, self.top_n_max);
        if !self.whisker_iqr.is_finite() || self.whisker_iqr < 0.0 {
            self.whisker_iqr = Settings::default().whisker_iqr;
        }
        self
    }
}
