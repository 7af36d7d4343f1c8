use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use anime_dashboard::data::export::export_csv;

use crate::color::ACCENT;
use crate::state::{AppState, Dimension, Tab};
use crate::ui::{plot, table};

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.vertical_centered(|ui: &mut Ui| {
        ui.heading(RichText::new("Anime Viz").color(ACCENT).strong());
    });
    ui.add_space(4.0);

    ui.heading("Filters");
    ui.separator();

    if state.table.is_none() {
        ui.label("No dataset loaded.");
        return;
    }

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            let mut min_rating = state.criteria.min_rating;
            ui.strong("Minimum rating");
            if ui
                .add(egui::Slider::new(&mut min_rating, 0.0..=10.0).step_by(0.1))
                .changed()
            {
                state.set_min_rating(min_rating);
            }
            ui.separator();

            dimension_filter(ui, state, Dimension::Studio, "Studio");
            dimension_filter(ui, state, Dimension::Genre, "Genre");
            dimension_filter(ui, state, Dimension::Status, "Status");
        });
}

/// Collapsible checklist for one dimension.
fn dimension_filter(ui: &mut Ui, state: &mut AppState, dim: Dimension, label: &str) {
    let values = state.universe(dim);
    let n_total = values.len();
    let n_selected = state.selection(dim).selected_count(n_total);
    let header_text = format!("{label}  ({n_selected}/{n_total})");

    egui::CollapsingHeader::new(RichText::new(header_text).strong())
        .id_salt(label)
        .default_open(dim == Dimension::Studio)
        .show(ui, |ui: &mut Ui| {
            ui.horizontal(|ui: &mut Ui| {
                if ui.small_button("All").clicked() {
                    state.select_all(dim);
                }
                if ui.small_button("None").clicked() {
                    state.select_none(dim);
                }
            });

            for value in &values {
                let mut checked = state.selection(dim).is_selected(value);
                let text = if value.is_empty() { "(none)" } else { value.as_str() };
                if ui.checkbox(&mut checked, text).changed() {
                    state.toggle_filter_value(dim, value);
                }
            }
        });
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
            if ui.button("Reload").clicked() {
                state.reload();
                ui.close_menu();
            }
            let can_export = !state.view.is_empty();
            if ui
                .add_enabled(can_export, egui::Button::new("Export filtered CSV…"))
                .clicked()
            {
                save_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(table) = &state.table {
            ui.label(format!(
                "{} titles loaded, {} match",
                table.len(),
                state.view.len()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// Dashboard: KPI row + tabs
// ---------------------------------------------------------------------------

/// Render KPIs and the tabbed charts for the current view.
pub fn dashboard(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Interactive anime analysis");
    ui.label(
        RichText::new(format!("{} titles match your criteria.", state.view.len())).strong(),
    );
    ui.add_space(6.0);

    let view = &state.view;
    let mean = view
        .mean_rating()
        .map(|m| format!("{m:.2}/10"))
        .unwrap_or_else(|| "N/A".to_string());
    let top = view.top_title().unwrap_or("N/A").to_string();
    let episodes = format_thousands(view.total_episodes());
    let studio = view.dominant_studio().unwrap_or("N/A").to_string();

    ui.columns(4, |cols: &mut [Ui]| {
        kpi(&mut cols[0], "Mean rating", &mean, Color32::WHITE);
        kpi(&mut cols[1], "Top anime", &top, Color32::WHITE);
        kpi(&mut cols[2], "Total episodes", &episodes, Color32::WHITE);
        kpi(&mut cols[3], "Dominant studio", &studio, Color32::WHITE);
    });
    ui.separator();

    ui.horizontal(|ui: &mut Ui| {
        ui.selectable_value(&mut state.tab, Tab::Ratings, "Distribution & ratings");
        ui.selectable_value(&mut state.tab, Tab::StudiosAndStatus, "Studios & status");
        ui.selectable_value(&mut state.tab, Tab::Data, "Raw data");
    });
    ui.add_space(4.0);

    match state.tab {
        Tab::Ratings => {
            ui.columns(2, |cols: &mut [Ui]| {
                plot::rating_histogram(&mut cols[0], state);
                plot::episodes_vs_rating(&mut cols[1], state);
            });
        }
        Tab::StudiosAndStatus => {
            ui.columns(2, |cols: &mut [Ui]| {
                plot::status_chart(&mut cols[0], state);
                plot::studio_chart(&mut cols[1], state);
            });
        }
        Tab::Data => {
            ui.strong("Data explorer");
            table::data_table(ui, &state.view);
            ui.add_space(4.0);
            if ui.button("Download filtered data (CSV)").clicked() {
                save_file_dialog(state);
            }
        }
    }
}

/// A labelled metric, centered in its column.
pub fn kpi(ui: &mut Ui, label: &str, value: &str, value_color: Color32) {
    ui.vertical_centered(|ui: &mut Ui| {
        ui.label(RichText::new(label.to_uppercase()).color(ACCENT).strong().size(14.0));
        ui.label(RichText::new(value).color(value_color).size(22.0));
    });
}

fn format_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open anime dataset")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.open(&path);
    }
}

pub fn save_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Export filtered data")
        .set_file_name("animes_filtered.csv")
        .add_filter("CSV", &["csv"])
        .save_file();

    if let Some(path) = file {
        match export_csv(&state.view, &path) {
            Ok(()) => state.status_message = None,
            Err(e) => {
                log::error!("Failed to export: {e}");
                state.status_message = Some(format!("Error: {e}"));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::format_thousands;

    #[test]
    fn test_format_thousands() {
        assert_eq!(format_thousands(0), "0");
        assert_eq!(format_thousands(220), "220");
        assert_eq!(format_thousands(1234), "1,234");
        assert_eq!(format_thousands(1234567), "1,234,567");
    }
}
