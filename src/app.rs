use eframe::egui::{self, RichText, Ui};

use crate::state::AppState;
use crate::ui::{panels, plot, tables};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct RustyScoresApp {
    pub state: AppState,
}

impl RustyScoresApp {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

impl eframe::App for RustyScoresApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: selectors ----
        egui::SidePanel::left("selector_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: dashboard ----
        egui::CentralPanel::default().show(ctx, |ui| {
            dashboard(ui, &self.state);
        });
    }
}

fn section(ui: &mut Ui, title: &str, open: bool, add_contents: impl FnOnce(&mut Ui)) {
    egui::CollapsingHeader::new(RichText::new(title).heading())
        .default_open(open)
        .show(ui, add_contents);
    ui.add_space(8.0);
}

fn dashboard(ui: &mut Ui, state: &AppState) {
    let Some(analysis) = &state.analysis else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a student scores file to begin  (File → Open…)");
        });
        return;
    };
    let settings = &state.settings;

    egui::ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            section(ui, "🔍 Uploaded data", false, |ui| {
                tables::data_preview(ui, analysis, settings.preview_rows);
            });

            if analysis.subjects().len() > 1 {
                section(ui, "📈 Correlation heatmap", true, |ui| {
                    tables::correlation_heatmap(ui, analysis);
                });
            }

            if let Some(subject) = state.subject.as_deref() {
                let title = format!("📊 Distribution of {}", panels::title_case(subject));
                section(ui, &title, true, |ui| {
                    plot::distribution_plot(ui, analysis, subject, settings.histogram_bins);
                });

                if let Some(compare) = state.compare.as_deref() {
                    section(ui, "📦 Comparison (box plot)", true, |ui| {
                        plot::compare_box_plot(ui, analysis, subject, compare, settings.whisker_iqr);
                    });
                }

                if let Some(feature) = state.regression_feature.as_deref() {
                    section(ui, "📉 Regression trendline", true, |ui| {
                        plot::regression_plot(ui, analysis, subject, feature);
                    });
                }
            }

            section(ui, "🌟 Overall score analysis", true, |ui| {
                tables::summary_table(ui, analysis);
            });

            let title = format!("🏅 Top {} performers", state.top_n);
            section(ui, &title, true, |ui| {
                tables::top_performers(ui, analysis, state.top_n);
            });

            if let Some(prediction) = &state.prediction {
                section(ui, "🤖 Score prediction", true, |ui| {
                    tables::prediction_result(ui, prediction);
                });
            }
        });
}
