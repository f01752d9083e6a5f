mod app;
mod color;
mod config;
mod data;
mod state;
mod stats;
mod ui;

use std::path::PathBuf;

use app::RustyScoresApp;
use config::Settings;
use eframe::egui;
use state::AppState;

fn main() -> eframe::Result {
    env_logger::init();

    let mut state = AppState::new(Settings::from_env());
    // Optional file to open on startup: `rusty-scores scores.csv`
    if let Some(path) = std::env::args_os().nth(1).map(PathBuf::from) {
        state.open_path(&path);
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 860.0])
            .with_min_inner_size([640.0, 420.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Rusty Scores – Student Performance Dashboard",
        options,
        Box::new(|_cc| Ok(Box::new(RustyScoresApp::new(state)))),
    )
}
