/// egui rendering of an [`AppState`](crate::state::AppState): selectors in
/// the side panel, plots and tables in the central panel.
pub mod panels;
pub mod plot;
pub mod tables;
