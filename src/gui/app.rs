//! Nutri-Dash Main Application
//! Main window with control panel and dashboard view.

use crate::analysis::Dashboard;
use crate::config::DashboardConfig;
use crate::gui::{ChartViewer, ControlPanel, ControlPanelAction};
use egui::{Color32, RichText, SidePanel};

/// A loaded dataset with its widgets.
struct Session {
    dashboard: Dashboard,
    control_panel: ControlPanel,
    chart_viewer: ChartViewer,
}

impl Session {
    fn new(dashboard: Dashboard) -> Self {
        let control_panel = ControlPanel::new(
            dashboard.brand_options.clone(),
            dashboard.numeric_columns.clone(),
        );
        let mut session = Self {
            dashboard,
            control_panel,
            chart_viewer: ChartViewer::default(),
        };
        session.recompute();
        session
    }

    /// Rebuild every view from the current selection.
    fn recompute(&mut self) {
        match self.dashboard.analyze(&self.control_panel.selection) {
            Ok(analysis) => {
                self.control_panel.set_status(&format!(
                    "Showing {} of {} rows",
                    analysis.filtered_rows,
                    self.dashboard.dataset.height()
                ));
                self.chart_viewer.set_analysis(analysis);
            }
            Err(e) => {
                log::warn!("Analysis failed: {}", e);
                self.control_panel.set_status(&format!("Error: {}", e));
            }
        }
    }
}

/// Main application window.
pub struct NutriDashApp {
    session: Result<Session, String>,
}

impl NutriDashApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, config: DashboardConfig) -> Self {
        let session = Dashboard::open(config).map(Session::new).map_err(|e| {
            log::error!("{}", e);
            e.to_string()
        });
        Self { session }
    }

    fn show_load_error(ctx: &egui::Context, message: &str) {
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.centered_and_justified(|ui| {
                ui.label(
                    RichText::new(format!("Unable to load data\n\n{}", message))
                        .size(18.0)
                        .color(Color32::from_rgb(220, 53, 69)),
                );
            });
        });
    }
}

impl eframe::App for NutriDashApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let session = match &mut self.session {
            Ok(session) => session,
            Err(message) => {
                Self::show_load_error(ctx, message);
                return;
            }
        };

        // Left panel - Control Panel
        SidePanel::left("control_panel")
            .min_width(300.0)
            .max_width(350.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    match session.control_panel.show(ui) {
                        ControlPanelAction::SelectionChanged => session.recompute(),
                        ControlPanelAction::None => {}
                    }
                });
            });

        // Central panel - Dashboard
        egui::CentralPanel::default().show(ctx, |ui| {
            session.chart_viewer.show(ui, &session.dashboard);
        });
    }
}
