//! Chart Plotter Module
//! Creates interactive visualizations using egui_plot.

use crate::data::ScatterParams;
use crate::stats::{CorrelationMatrix, Histogram, SummaryStats};
use egui::{Align2, Color32, FontId, RichText, Sense};
use egui_plot::{Bar, BarChart, Legend, Line, Plot, PlotPoint, PlotPoints, Points};
use std::collections::BTreeMap;

pub const HISTOGRAM_COLOR: Color32 = Color32::from_rgb(0, 128, 128); // Teal
pub const MISSING_COLOR: Color32 = Color32::from_rgb(160, 160, 160);

pub const PALETTE: [Color32; 10] = [
    Color32::from_rgb(231, 76, 60),  // Red
    Color32::from_rgb(46, 204, 113), // Green
    Color32::from_rgb(155, 89, 182), // Purple
    Color32::from_rgb(243, 156, 18), // Orange
    Color32::from_rgb(26, 188, 156), // Teal
    Color32::from_rgb(233, 30, 99),  // Pink
    Color32::from_rgb(0, 188, 212),  // Cyan
    Color32::from_rgb(255, 87, 34),  // Deep Orange
    Color32::from_rgb(121, 85, 72),  // Brown
    Color32::from_rgb(96, 125, 139), // Blue Grey
];

/// Nutri-Score letter colors.
const GRADE_COLORS: [(&str, Color32); 5] = [
    ("a", Color32::from_rgb(3, 129, 65)),
    ("b", Color32::from_rgb(133, 187, 47)),
    ("c", Color32::from_rgb(254, 203, 2)),
    ("d", Color32::from_rgb(238, 129, 0)),
    ("e", Color32::from_rgb(230, 62, 17)),
];

const MIN_RADIUS: f32 = 2.0;
const MAX_RADIUS: f32 = 12.0;
const DEFAULT_RADIUS: f32 = 4.0;

const CELL_WIDTH: f32 = 70.0;
const CELL_HEIGHT: f32 = 26.0;

/// Points sharing one color and radius.
#[derive(Debug, Clone, PartialEq)]
pub struct ScatterSeries {
    pub name: String,
    pub color: Color32,
    pub radius: f32,
    pub points: Vec<[f64; 2]>,
    pub labels: Vec<Option<String>>,
}

/// Format a statistic with two decimals, or "n/a" when undefined.
pub fn format_stat(value: f64) -> String {
    if value.is_finite() {
        format!("{:.2}", value)
    } else {
        "n/a".to_string()
    }
}

/// Diverging blue-white-red scale for a coefficient in [-1, 1].
pub fn coolwarm(value: f64) -> Color32 {
    if value.is_nan() {
        return MISSING_COLOR;
    }
    const COOL: [f32; 3] = [59.0, 76.0, 192.0];
    const MID: [f32; 3] = [221.0, 221.0, 221.0];
    const WARM: [f32; 3] = [180.0, 4.0, 38.0];

    let t = value.clamp(-1.0, 1.0) as f32;
    let (from, to, f) = if t < 0.0 {
        (MID, COOL, -t)
    } else {
        (MID, WARM, t)
    };
    let mix = |i: usize| (from[i] + (to[i] - from[i]) * f).round() as u8;
    Color32::from_rgb(mix(0), mix(1), mix(2))
}

/// Color for a category value; Nutri-Score letters get their usual colors.
pub fn category_color(value: &str, index: usize) -> Color32 {
    let lower = value.trim().to_ascii_lowercase();
    GRADE_COLORS
        .iter()
        .find(|(grade, _)| *grade == lower)
        .map(|(_, color)| *color)
        .unwrap_or(PALETTE[index % PALETTE.len()])
}

/// Marker radius, area-proportional to `value / max`.
pub fn point_radius(value: Option<f64>, max: f64) -> f32 {
    match value {
        Some(v) if max > 0.0 && v.is_finite() => {
            let ratio = (v.max(0.0) / max).min(1.0).sqrt() as f32;
            MIN_RADIUS + (MAX_RADIUS - MIN_RADIUS) * ratio
        }
        _ => DEFAULT_RADIUS,
    }
}

/// Group scatter points by color category and rounded radius.
pub fn scatter_series(params: &ScatterParams) -> Vec<ScatterSeries> {
    let categories: Vec<String> = params
        .color
        .as_ref()
        .map(|c| {
            c.values
                .iter()
                .filter_map(|v| v.clone())
                .collect::<std::collections::BTreeSet<_>>()
                .into_iter()
                .collect()
        })
        .unwrap_or_default();

    let max_size = params
        .size
        .as_ref()
        .map(|s| s.values.iter().flatten().copied().fold(0.0, f64::max))
        .unwrap_or(0.0);

    let mut groups: BTreeMap<(String, u32), ScatterSeries> = BTreeMap::new();
    for (i, point) in params.points.iter().enumerate() {
        let category = params
            .color
            .as_ref()
            .and_then(|c| c.values.get(i).cloned().flatten());
        let (name, color) = match (&params.color, &category) {
            (Some(_), Some(value)) => {
                let index = categories.iter().position(|c| c == value).unwrap_or(0);
                (value.clone(), category_color(value, index))
            }
            (Some(_), None) => ("(missing)".to_string(), MISSING_COLOR),
            (None, _) => (params.y_column.clone(), PALETTE[0]),
        };

        let size = params
            .size
            .as_ref()
            .and_then(|s| s.values.get(i).copied().flatten());
        let radius = point_radius(size, max_size).round();
        let label = params
            .label
            .as_ref()
            .and_then(|l| l.values.get(i).cloned().flatten());

        let series = groups
            .entry((name.clone(), radius as u32))
            .or_insert_with(|| ScatterSeries {
                name,
                color,
                radius,
                points: Vec::new(),
                labels: Vec::new(),
            });
        series.points.push(*point);
        series.labels.push(label);
    }

    groups.into_values().collect()
}

/// Names the columns behind the scatter's color, size and hover encodings.
pub fn encoding_caption(params: &ScatterParams) -> Option<String> {
    let parts: Vec<String> = [
        ("Color", params.color.as_ref().map(|a| &a.column)),
        ("Size", params.size.as_ref().map(|a| &a.column)),
        ("Hover", params.label.as_ref().map(|a| &a.column)),
    ]
    .into_iter()
    .filter_map(|(role, column)| column.map(|c| format!("{}: {}", role, c)))
    .collect();

    if parts.is_empty() {
        None
    } else {
        Some(parts.join(" · "))
    }
}

/// Creates dashboard charts using egui_plot.
pub struct ChartPlotter;

impl ChartPlotter {
    /// Draw histogram bars with the density curve on top.
    pub fn draw_histogram(ui: &mut egui::Ui, column: &str, histogram: &Histogram) {
        let width = histogram.bin_width();
        let bars: Vec<Bar> = histogram
            .bin_centers()
            .into_iter()
            .zip(&histogram.counts)
            .map(|(x, &count)| {
                Bar::new(x, count as f64)
                    .width(width)
                    .fill(HISTOGRAM_COLOR.gamma_multiply(0.5))
                    .stroke(egui::Stroke::new(1.0, HISTOGRAM_COLOR))
            })
            .collect();

        Plot::new(format!("histogram_{}", column))
            .height(300.0)
            .x_axis_label(column)
            .y_axis_label("Count")
            .allow_scroll(false)
            .show(ui, |plot_ui| {
                plot_ui.bar_chart(BarChart::new(bars).name("Count"));

                if !histogram.density.is_empty() {
                    plot_ui.line(
                        Line::new(PlotPoints::from_iter(histogram.density.iter().copied()))
                            .color(HISTOGRAM_COLOR)
                            .width(2.0)
                            .name("Density"),
                    );
                }
            });
    }

    /// Mean / median / standard deviation block next to the histogram.
    pub fn draw_stats_summary(ui: &mut egui::Ui, stats: Option<&SummaryStats>) {
        ui.label(RichText::new("Summary").size(14.0).strong());
        ui.add_space(5.0);

        let (mean, median, std, count) = match stats {
            Some(s) => (s.mean, s.median, s.std, s.count),
            None => (f64::NAN, f64::NAN, f64::NAN, 0),
        };

        egui::Grid::new("histogram_summary")
            .num_columns(2)
            .spacing([12.0, 4.0])
            .show(ui, |ui| {
                for (name, value) in [("Mean", mean), ("Median", median), ("Std dev", std)] {
                    ui.label(name);
                    ui.label(RichText::new(format_stat(value)).monospace());
                    ui.end_row();
                }
                ui.label("Values");
                ui.label(RichText::new(count.to_string()).monospace());
                ui.end_row();
            });
    }

    /// Annotated correlation heatmap.
    pub fn draw_correlation_heatmap(ui: &mut egui::Ui, matrix: &CorrelationMatrix) {
        egui::ScrollArea::horizontal()
            .id_salt("correlation_scroll")
            .show(ui, |ui| {
                egui::Grid::new("correlation_heatmap")
                    .spacing([2.0, 2.0])
                    .show(ui, |ui| {
                        ui.label("");
                        for column in &matrix.columns {
                            ui.add_sized(
                                [CELL_WIDTH, CELL_HEIGHT],
                                egui::Label::new(RichText::new(column).size(10.0)).truncate(),
                            )
                            .on_hover_text(column);
                        }
                        ui.end_row();

                        for (i, row_name) in matrix.columns.iter().enumerate() {
                            ui.label(RichText::new(row_name).size(11.0));
                            for (j, col_name) in matrix.columns.iter().enumerate() {
                                Self::draw_heatmap_cell(ui, matrix.get(i, j), row_name, col_name);
                            }
                            ui.end_row();
                        }
                    });
            });
    }

    fn draw_heatmap_cell(ui: &mut egui::Ui, value: f64, row: &str, col: &str) {
        let (rect, response) =
            ui.allocate_exact_size(egui::vec2(CELL_WIDTH, CELL_HEIGHT), Sense::hover());
        let fill = coolwarm(value);
        let text_color = if value.abs() > 0.6 {
            Color32::WHITE
        } else {
            Color32::BLACK
        };

        let painter = ui.painter();
        painter.rect_filled(rect, 2.0, fill);
        painter.text(
            rect.center(),
            Align2::CENTER_CENTER,
            format_stat(value),
            FontId::proportional(11.0),
            text_color,
        );
        response.on_hover_text(format!("{} / {}: {}", row, col, format_stat(value)));
    }

    /// Interactive scatter plot with grade colors, sugar sizes and name tooltips.
    pub fn draw_scatter(ui: &mut egui::Ui, params: &ScatterParams) {
        let series = scatter_series(params);

        let lookup: Vec<(String, [f64; 2], Option<String>)> = series
            .iter()
            .flat_map(|s| {
                s.points
                    .iter()
                    .zip(&s.labels)
                    .map(|(p, l)| (s.name.clone(), *p, l.clone()))
            })
            .collect();
        let x_name = params.x_column.clone();
        let y_name = params.y_column.clone();

        Plot::new(format!("scatter_{}_{}", params.x_column, params.y_column))
            .height(420.0)
            .x_axis_label(params.x_column.as_str())
            .y_axis_label(params.y_column.as_str())
            .legend(Legend::default())
            .allow_scroll(false)
            .label_formatter(move |name, value| {
                let label = nearest_label(&lookup, name, value);
                let header = label.map(|l| format!("{}\n", l)).unwrap_or_default();
                format!(
                    "{}{}: {:.2}\n{}: {:.2}",
                    header, x_name, value.x, y_name, value.y
                )
            })
            .show(ui, |plot_ui| {
                for s in &series {
                    plot_ui.points(
                        Points::new(PlotPoints::from_iter(s.points.iter().copied()))
                            .radius(s.radius)
                            .color(s.color.gamma_multiply(0.7))
                            .filled(true)
                            .name(&s.name),
                    );
                }
            });
    }
}

/// Label of the point closest to `value` within the hovered series.
fn nearest_label(
    lookup: &[(String, [f64; 2], Option<String>)],
    series_name: &str,
    value: &PlotPoint,
) -> Option<String> {
    if series_name.is_empty() {
        return None;
    }
    lookup
        .iter()
        .filter(|(name, _, _)| name == series_name)
        .min_by(|a, b| {
            let da = (a.1[0] - value.x).powi(2) + (a.1[1] - value.y).powi(2);
            let db = (b.1[0] - value.x).powi(2) + (b.1[1] - value.y).powi(2);
            da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
        })
        .and_then(|(_, _, label)| label.clone())
}
