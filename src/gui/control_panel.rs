//! Control Panel Widget
//! Left side panel with the brand filter and column selectors.

use crate::analysis::Selection;
use egui::{Color32, ComboBox, RichText};

/// Left side control panel.
pub struct ControlPanel {
    pub selection: Selection,
    pub brand_options: Vec<String>,
    pub numeric_columns: Vec<String>,
    pub status: String,
}

impl Default for ControlPanel {
    fn default() -> Self {
        Self {
            selection: Selection::default(),
            brand_options: Vec::new(),
            numeric_columns: Vec::new(),
            status: "Ready".to_string(),
        }
    }
}

impl ControlPanel {
    pub fn new(brand_options: Vec<String>, numeric_columns: Vec<String>) -> Self {
        let mut selection = Selection::with_defaults(&numeric_columns);
        selection.brand = brand_options.first().cloned();
        Self {
            selection,
            brand_options,
            numeric_columns,
            ..Self::default()
        }
    }

    /// Draw the control panel
    pub fn show(&mut self, ui: &mut egui::Ui) -> ControlPanelAction {
        let mut action = ControlPanelAction::None;

        ui.vertical_centered(|ui| {
            ui.add_space(5.0);
            ui.label(
                RichText::new("⚙ Analysis Options")
                    .size(18.0)
                    .color(Color32::from_rgb(100, 149, 237)),
            );
        });
        ui.add_space(10.0);
        ui.separator();
        ui.add_space(5.0);

        let label_width = 110.0;
        let combo_width = 160.0;

        // ===== Brand Filter =====
        if !self.brand_options.is_empty() {
            ui.label(RichText::new("🏷 Brand").size(14.0).strong());
            ui.add_space(5.0);

            ui.horizontal(|ui| {
                ui.add_sized([label_width, 20.0], egui::Label::new("Filter by brand:"));
                let selected = self.selection.brand.clone().unwrap_or_default();
                ComboBox::from_id_salt("brand_filter")
                    .width(combo_width)
                    .selected_text(&selected)
                    .show_ui(ui, |ui| {
                        for brand in &self.brand_options {
                            if ui.selectable_label(selected == *brand, brand).clicked() {
                                self.selection.brand = Some(brand.clone());
                                action = ControlPanelAction::SelectionChanged;
                            }
                        }
                    });
            });

            ui.add_space(15.0);
            ui.separator();
            ui.add_space(10.0);
        }

        // ===== Column Selection =====
        ui.label(RichText::new("🔧 Variables").size(14.0).strong());
        ui.add_space(8.0);

        if self.numeric_columns.is_empty() {
            ui.label(RichText::new("No numeric columns").color(Color32::GRAY));
        } else {
            let columns = &self.numeric_columns;
            let choices = [
                ("Histogram:", "histogram_col", &mut self.selection.histogram_column),
                ("X (scatter):", "x_col", &mut self.selection.x_column),
                ("Y (scatter):", "y_col", &mut self.selection.y_column),
            ];

            for (label, id, choice) in choices {
                ui.horizontal(|ui| {
                    ui.add_sized([label_width, 20.0], egui::Label::new(label));
                    if column_combo(ui, id, combo_width, columns, choice) {
                        action = ControlPanelAction::SelectionChanged;
                    }
                });
                ui.add_space(5.0);
            }

            if columns.len() < 2 {
                ui.label(
                    RichText::new("Scatter and correlation need two numeric columns")
                        .size(11.0)
                        .color(Color32::GRAY),
                );
            }
        }

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Status Section =====
        let status_color = if self.status.contains("Error") {
            Color32::from_rgb(220, 53, 69)
        } else {
            Color32::GRAY
        };
        ui.label(RichText::new(&self.status).size(11.0).color(status_color));

        action
    }

    pub fn set_status(&mut self, status: &str) {
        self.status = status.to_string();
    }
}

/// Column dropdown. Returns true when the choice changed.
fn column_combo(
    ui: &mut egui::Ui,
    id: &str,
    width: f32,
    columns: &[String],
    choice: &mut Option<String>,
) -> bool {
    let mut changed = false;
    let selected = choice.clone().unwrap_or_default();
    ComboBox::from_id_salt(id)
        .width(width)
        .selected_text(&selected)
        .show_ui(ui, |ui| {
            for col in columns {
                if ui.selectable_label(selected == *col, col).clicked() && selected != *col {
                    *choice = Some(col.clone());
                    changed = true;
                }
            }
        });
    changed
}

/// Actions triggered by control panel
#[derive(Debug, Clone, PartialEq)]
pub enum ControlPanelAction {
    None,
    SelectionChanged,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_panel_starts_on_all_and_default_columns() {
        let panel = ControlPanel::new(
            vec!["All".to_string(), "Danone".to_string()],
            vec!["sugars_100g".to_string(), "fat_100g".to_string()],
        );

        assert_eq!(panel.selection.brand.as_deref(), Some("All"));
        assert_eq!(panel.selection.histogram_column.as_deref(), Some("sugars_100g"));
        assert_eq!(panel.selection.y_column.as_deref(), Some("fat_100g"));
    }

    #[test]
    fn panel_without_brands_has_no_brand_selection() {
        let panel = ControlPanel::new(Vec::new(), vec!["sugars_100g".to_string()]);
        assert!(panel.selection.brand.is_none());
        assert!(panel.selection.y_column.is_none());
    }
}
