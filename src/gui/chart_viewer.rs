//! Chart Viewer Widget
//! Central scrollable dashboard: data preview, descriptive statistics and charts.

use crate::analysis::{Analysis, Dashboard};
use crate::charts::{encoding_caption, format_stat, ChartPlotter};
use crate::data::PreviewTable;
use crate::stats::ColumnSummary;
use egui::{Color32, RichText, ScrollArea};

const SECTION_SPACING: f32 = 20.0;

const INTRO: &str = "Nutri-Dash visualizes nutritional values of food products for people \
living with diabetes. Use it to spot potentially risky products (high sugar, high saturated \
fat) and as a decision aid for health professionals and preventive nutrition projects. \
The data is a filtered sample of commercially available products.";

/// Scrollable dashboard body.
#[derive(Default)]
pub struct ChartViewer {
    pub analysis: Analysis,
}

impl ChartViewer {
    pub fn set_analysis(&mut self, analysis: Analysis) {
        self.analysis = analysis;
    }

    /// Draw the whole dashboard.
    pub fn show(&self, ui: &mut egui::Ui, dashboard: &Dashboard) {
        ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                ui.heading(RichText::new("🍎 Nutri-Dash - Nutrition Dashboard").size(26.0));
                ui.add_space(6.0);
                ui.label(INTRO);
                ui.add_space(SECTION_SPACING);
                ui.separator();

                Self::section(ui, "🔍 Data Preview");
                Self::draw_preview(ui, &dashboard.preview);

                Self::section(ui, "📊 Descriptive Statistics");
                Self::draw_describe(ui, &dashboard.describe);

                self.draw_distribution(ui);

                Self::section(ui, "🔗 Correlation Between Nutritional Variables");
                match &self.analysis.correlation {
                    Some(matrix) => ChartPlotter::draw_correlation_heatmap(ui, matrix),
                    None => Self::placeholder(ui, "At least two numeric columns are needed"),
                }

                match &self.analysis.scatter {
                    Some(params) => {
                        Self::section(
                            ui,
                            &format!("📍 {} vs {}", params.y_column, params.x_column),
                        );
                        if params.points.is_empty() {
                            Self::placeholder(ui, "No rows with both values");
                        }
                        if let Some(caption) = encoding_caption(params) {
                            ui.label(RichText::new(caption).small().color(Color32::GRAY));
                        }
                        ChartPlotter::draw_scatter(ui, params);
                    }
                    None => {
                        Self::section(ui, "📍 Interactive Scatter");
                        Self::placeholder(ui, "Select two numeric columns");
                    }
                }
            });
    }

    fn section(ui: &mut egui::Ui, title: &str) {
        ui.add_space(SECTION_SPACING);
        ui.label(RichText::new(title).size(18.0).strong());
        ui.add_space(8.0);
    }

    fn placeholder(ui: &mut egui::Ui, text: &str) {
        ui.label(RichText::new(text).italics().color(Color32::GRAY));
    }

    fn draw_distribution(&self, ui: &mut egui::Ui) {
        let Some(column) = &self.analysis.histogram_column else {
            Self::section(ui, "📈 Distribution");
            Self::placeholder(ui, "No numeric column selected");
            return;
        };

        Self::section(ui, &format!("📈 Distribution of {}", column));
        ui.label(
            RichText::new(format!("{} rows after filtering", self.analysis.filtered_rows))
                .size(11.0)
                .color(Color32::GRAY),
        );

        ui.columns(2, |cols| {
            if self.analysis.histogram.is_empty() {
                Self::placeholder(&mut cols[0], "No values to plot");
            } else {
                ChartPlotter::draw_histogram(&mut cols[0], column, &self.analysis.histogram);
            }
            ChartPlotter::draw_stats_summary(&mut cols[1], self.analysis.summary.as_ref());
        });
    }

    fn draw_preview(ui: &mut egui::Ui, preview: &PreviewTable) {
        ScrollArea::horizontal().id_salt("preview_scroll").show(ui, |ui| {
            egui::Grid::new("preview_table")
                .striped(true)
                .spacing([12.0, 4.0])
                .show(ui, |ui| {
                    for column in &preview.columns {
                        ui.label(RichText::new(column).strong().size(11.0));
                    }
                    ui.end_row();

                    for row in &preview.rows {
                        for cell in row {
                            ui.label(RichText::new(cell).size(11.0));
                        }
                        ui.end_row();
                    }
                });
        });
    }

    fn draw_describe(ui: &mut egui::Ui, describe: &[ColumnSummary]) {
        if describe.is_empty() {
            Self::placeholder(ui, "No numeric columns");
            return;
        }

        ScrollArea::horizontal().id_salt("describe_scroll").show(ui, |ui| {
            egui::Grid::new("describe_table")
                .striped(true)
                .min_col_width(55.0)
                .spacing([12.0, 4.0])
                .show(ui, |ui| {
                    for header in ["", "count", "mean", "std", "min", "25%", "50%", "75%", "max"] {
                        ui.label(RichText::new(header).strong().size(11.0));
                    }
                    ui.end_row();

                    for summary in describe {
                        ui.label(RichText::new(&summary.column).strong().size(11.0));
                        match &summary.stats {
                            Some(s) => {
                                ui.label(RichText::new(s.count.to_string()).size(11.0));
                                for v in [s.mean, s.std, s.min, s.p25, s.median, s.p75, s.max] {
                                    ui.label(RichText::new(format_stat(v)).size(11.0));
                                }
                            }
                            None => {
                                ui.label(RichText::new("0").size(11.0));
                                for _ in 0..7 {
                                    ui.label(RichText::new("n/a").size(11.0));
                                }
                            }
                        }
                        ui.end_row();
                    }
                });
        });
    }
}
