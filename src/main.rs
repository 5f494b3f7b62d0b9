//! Nutri-Dash - Nutritional Data Dashboard
//!
//! Loads a CSV of food products and shows statistics, a histogram, a
//! correlation heatmap and an interactive scatter plot.

mod analysis;
mod charts;
mod config;
mod data;
mod gui;
mod stats;

use config::{DashboardConfig, CONFIG_FILE};
use eframe::egui;
use gui::NutriDashApp;
use log::LevelFilter;
use std::path::Path;
use std::sync::OnceLock;

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if std::env::var("RUST_LOG").is_err() {
            builder.filter_module("nutri_dash", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

fn main() -> eframe::Result<()> {
    init_logging();

    let config = DashboardConfig::load_or_default(Path::new(CONFIG_FILE));
    log::info!("Using data file {}", config.data_path.display());

    // Configure native options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([1000.0, 700.0])
            .with_title("Nutri-Dash | Nutrition Dashboard"),
        ..Default::default()
    };

    // Run the application
    eframe::run_native(
        "Nutri-Dash",
        options,
        Box::new(|cc| Ok(Box::new(NutriDashApp::new(cc, config)))),
    )
}
