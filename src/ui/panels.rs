use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::state::{AppState, Status};

const NONE_LABEL: &str = "None";

// ---------------------------------------------------------------------------
// Left side panel – selectors
// ---------------------------------------------------------------------------

/// Render the left panel: column partitions and every selector.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Student Performance");
    ui.separator();

    let Some(analysis) = &state.analysis else {
        ui.label("No dataset loaded.");
        return;
    };

    // Clone what we need so we can mutate state inside the closures.
    let classification = analysis.classification.clone();
    let distinct = analysis.table.distinct_counts();
    let subjects = classification.subject.clone();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Column partitions ----
            egui::CollapsingHeader::new(RichText::new("Columns").strong())
                .default_open(false)
                .show(ui, |ui: &mut Ui| {
                    column_list(ui, "Identifiers", &classification.identifier);
                    column_list(ui, "Subjects", &classification.subject);
                    column_list(ui, "Categorical", &classification.categorical);
                });
            ui.separator();

            // ---- Subject to analyse ----
            ui.strong("Subject to analyse");
            let current = state.subject.clone().unwrap_or_default();
            egui::ComboBox::from_id_salt("subject")
                .selected_text(title_case(&current))
                .show_ui(ui, |ui: &mut Ui| {
                    for col in &subjects {
                        if ui.selectable_label(current == *col, title_case(col)).clicked() {
                            state.set_subject(col.clone());
                        }
                    }
                });
            ui.add_space(6.0);

            // ---- Box plot grouping ----
            ui.strong("Compare with (box plot)");
            let compare = state.compare.clone();
            let compare_text = compare.as_deref().map(title_case).unwrap_or(NONE_LABEL.into());
            egui::ComboBox::from_id_salt("compare")
                .selected_text(compare_text)
                .show_ui(ui, |ui: &mut Ui| {
                    if ui.selectable_label(compare.is_none(), NONE_LABEL).clicked() {
                        state.compare = None;
                    }
                    for col in subjects.iter().chain(&classification.categorical) {
                        let groups = distinct.get(col).copied().unwrap_or_default();
                        let label = format!("{}  ({groups} groups)", title_case(col));
                        if ui
                            .selectable_label(compare.as_deref() == Some(col.as_str()), label)
                            .clicked()
                        {
                            state.compare = Some(col.clone());
                        }
                    }
                });
            ui.add_space(6.0);

            // ---- Regression feature ----
            ui.strong("Regression feature");
            let features: Vec<&String> = subjects
                .iter()
                .filter(|s| Some(*s) != state.subject.as_ref())
                .collect();
            if features.is_empty() {
                ui.label("Needs at least two subjects.");
            } else {
                let current = state.regression_feature.clone().unwrap_or_default();
                egui::ComboBox::from_id_salt("regression_feature")
                    .selected_text(title_case(&current))
                    .show_ui(ui, |ui: &mut Ui| {
                        for col in &features {
                            if ui.selectable_label(current == **col, title_case(col)).clicked() {
                                state.regression_feature = Some((*col).clone());
                            }
                        }
                    });
            }
            ui.add_space(6.0);

            // ---- Top performers ----
            ui.strong("Top performers");
            let (lo, hi) = (state.settings.top_n_min, state.settings.top_n_max);
            ui.add(egui::Slider::new(&mut state.top_n, lo..=hi).text("students"));
            ui.separator();

            prediction_controls(ui, state, &subjects);
        });
}

fn column_list(ui: &mut Ui, label: &str, columns: &[String]) {
    ui.label(RichText::new(format!("{label} ({})", columns.len())).strong());
    if columns.is_empty() {
        ui.label(RichText::new("none").weak());
    }
    for col in columns {
        ui.label(format!("  {col}"));
    }
}

fn prediction_controls(ui: &mut Ui, state: &mut AppState, subjects: &[String]) {
    ui.strong("Predict a score");
    let Some(current) = state.prediction.as_ref().map(|p| p.target.clone()) else {
        return;
    };

    egui::ComboBox::from_id_salt("predict_target")
        .selected_text(title_case(&current))
        .show_ui(ui, |ui: &mut Ui| {
            for col in subjects {
                if ui.selectable_label(current == *col, title_case(col)).clicked() && current != *col {
                    state.set_prediction_target(col);
                }
            }
        });

    let Some(prediction) = &mut state.prediction else {
        return;
    };
    let predictor = match &prediction.predictor {
        Ok(p) => p,
        Err(e) => {
            ui.label(RichText::new(format!("⚠ {e}")).color(Color32::from_rgb(230, 160, 0)));
            return;
        }
    };

    ui.label("Enter feature values:");
    let mut changed = false;
    for (range, value) in predictor.features.iter().zip(prediction.inputs.iter_mut()) {
        changed |= ui
            .add(egui::Slider::new(value, range.min..=range.max).text(title_case(&range.name)))
            .changed();
    }
    if changed {
        state.inputs_changed();
    }
    if ui.button("Predict score").clicked() {
        state.predict();
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            let can_export = state.analysis.is_some();
            if ui
                .add_enabled(can_export, egui::Button::new("Export augmented CSV…"))
                .clicked()
            {
                export_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(analysis) = &state.analysis {
            ui.label(format!(
                "{} students, {} subjects",
                analysis.table.len(),
                analysis.subjects().len()
            ));
            ui.separator();
        }

        match &state.status {
            Some(Status::Info(msg)) => {
                ui.label(msg);
            }
            Some(Status::Warning(msg)) => {
                ui.label(RichText::new(format!("⚠ {msg}")).color(Color32::from_rgb(230, 160, 0)));
            }
            Some(Status::Error(msg)) => {
                ui.label(RichText::new(msg).color(Color32::RED));
            }
            None => {}
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open student scores")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.open_path(&path);
    }
}

pub fn export_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Export augmented table")
        .add_filter("CSV", &["csv"])
        .set_file_name("scores_with_totals.csv")
        .save_file();

    if let Some(path) = file {
        if let Err(e) = state.export_csv(&path) {
            log::error!("Failed to export: {e:#}");
            state.status = Some(Status::Error(format!("Error: {e:#}")));
        }
    }
}

/// "english literature" → "English Literature".
pub fn title_case(s: &str) -> String {
    s.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_case_words() {
        assert_eq!(title_case("english literature"), "English Literature");
        assert_eq!(title_case("total score"), "Total Score");
        assert_eq!(title_case(""), "");
    }
}
