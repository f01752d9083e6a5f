use eframe::egui::{self, Align2, FontId, RichText, Sense, Ui};
use egui_extras::{Column, TableBuilder};

use crate::color::{coolwarm, text_on};
use crate::data::analysis::Analysis;
use crate::data::model::{self, format_number, ScoreTable};
use crate::stats::Summary;
use crate::state::PredictionState;

use super::panels::title_case;

const ROW_HEIGHT: f32 = 18.0;
const HEATMAP_CELL: egui::Vec2 = egui::vec2(64.0, 26.0);

// ---------------------------------------------------------------------------
// Row tables
// ---------------------------------------------------------------------------

/// Render `rows` of `columns`. Tables live in a scrolling panel, so they do
/// not scroll themselves.
fn row_table(ui: &mut Ui, salt: &str, table: &ScoreTable, columns: &[String], rows: &[usize]) {
    let cols: Vec<&model::Column> = columns.iter().filter_map(|name| table.column(name)).collect();

    ui.push_id(salt, |ui: &mut Ui| {
        egui::ScrollArea::horizontal().show(ui, |ui: &mut Ui| {
            TableBuilder::new(ui)
                .striped(true)
                .vscroll(false)
                .columns(Column::auto().at_least(60.0), cols.len())
                .header(ROW_HEIGHT + 4.0, |mut header| {
                    for col in &cols {
                        header.col(|ui| {
                            ui.strong(title_case(&col.name));
                        });
                    }
                })
                .body(|body| {
                    body.rows(ROW_HEIGHT, rows.len(), |mut row| {
                        let r = rows[row.index()];
                        for col in &cols {
                            row.col(|ui| {
                                ui.label(col.values.display(r));
                            });
                        }
                    });
                });
        });
    });
}

/// The first `limit` rows of the augmented table, all columns.
pub fn data_preview(ui: &mut Ui, analysis: &Analysis, limit: usize) {
    let table = &analysis.table;
    if table.is_empty() {
        ui.label("The file has no rows.");
        return;
    }
    let shown = table.len().min(limit);
    if shown < table.len() {
        ui.label(format!("Showing the first {shown} of {} rows.", table.len()));
    }
    let columns: Vec<String> = table.columns.iter().map(|c| c.name.clone()).collect();
    let rows: Vec<usize> = (0..shown).collect();
    row_table(ui, "data_preview", table, &columns, &rows);
}

/// Best `n` students by total score.
pub fn top_performers(ui: &mut Ui, analysis: &Analysis, n: usize) {
    let rows = analysis.top_performers(n);
    let c = &analysis.classification;
    let columns: Vec<String> = analysis
        .summary_columns()
        .into_iter()
        .take(2)
        .chain(c.identifier.iter().cloned())
        .chain(c.subject.iter().cloned())
        .chain(c.categorical.iter().cloned())
        .collect();
    row_table(ui, "top_performers", &analysis.table, &columns, &rows);
}

// ---------------------------------------------------------------------------
// Summary statistics
// ---------------------------------------------------------------------------

/// `describe()`-style grid: one column per aggregate / subject.
pub fn summary_table(ui: &mut Ui, analysis: &Analysis) {
    let columns = analysis.summary_columns();
    egui::ScrollArea::horizontal()
        .id_salt("summary_scroll")
        .show(ui, |ui: &mut Ui| {
            egui::Grid::new("summary_grid")
                .striped(true)
                .min_col_width(60.0)
                .show(ui, |ui: &mut Ui| {
                    ui.label("");
                    for col in &columns {
                        ui.strong(title_case(col));
                    }
                    ui.end_row();

                    for (stat, name) in Summary::LABELS.iter().enumerate() {
                        ui.strong(*name);
                        for col in &columns {
                            let value = analysis.summaries.get(col).and_then(|s| s.rows()[stat].1);
                            ui.label(value.map(format_number).unwrap_or_else(|| "NaN".into()));
                        }
                        ui.end_row();
                    }
                });
        });
}

// ---------------------------------------------------------------------------
// Correlation heatmap
// ---------------------------------------------------------------------------

pub fn correlation_heatmap(ui: &mut Ui, analysis: &Analysis) {
    let matrix = &analysis.correlation;
    egui::ScrollArea::horizontal()
        .id_salt("heatmap_scroll")
        .show(ui, |ui: &mut Ui| {
            egui::Grid::new("correlation_grid")
                .spacing(egui::vec2(2.0, 2.0))
                .show(ui, |ui: &mut Ui| {
                    ui.label("");
                    for label in &matrix.labels {
                        ui.strong(title_case(label));
                    }
                    ui.end_row();

                    for (label, row) in matrix.labels.iter().zip(&matrix.values) {
                        ui.strong(title_case(label));
                        for &value in row {
                            let (rect, response) = ui.allocate_exact_size(HEATMAP_CELL, Sense::hover());
                            let fill = coolwarm(value);
                            ui.painter().rect_filled(rect, 2.0, fill);
                            let text = if value.is_nan() {
                                "NaN".to_string()
                            } else {
                                format!("{value:.2}")
                            };
                            ui.painter().text(
                                rect.center(),
                                Align2::CENTER_CENTER,
                                &text,
                                FontId::monospace(12.0),
                                text_on(fill),
                            );
                            response.on_hover_text(text);
                        }
                        ui.end_row();
                    }
                });
        });
}

// ---------------------------------------------------------------------------
// Prediction result
// ---------------------------------------------------------------------------

pub fn prediction_result(ui: &mut Ui, prediction: &PredictionState) {
    match &prediction.predictor {
        Ok(p) => {
            ui.label(format!(
                "Linear model for {} trained on {} students (R² = {:.3}).",
                title_case(&p.target),
                p.n_samples,
                p.r_squared
            ));
        }
        Err(e) => {
            ui.label(RichText::new(format!("⚠ {e}")).color(egui::Color32::from_rgb(230, 160, 0)));
            return;
        }
    }

    match &prediction.result {
        Some(Ok(value)) => {
            ui.label(
                RichText::new(format!(
                    "✅ Predicted {} score: {value:.2}",
                    title_case(&prediction.target)
                ))
                .strong()
                .color(egui::Color32::from_rgb(40, 160, 70)),
            );
        }
        Some(Err(e)) => {
            ui.label(RichText::new(format!("Error: {e}")).color(egui::Color32::RED));
        }
        None => {
            ui.label("Adjust the sliders in the left panel and press \"Predict score\".");
        }
    }
}
