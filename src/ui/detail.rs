use eframe::egui::{self, Color32, RichText, Ui};

use anime_dashboard::data::model::AnimeRecord;

use crate::color::{ACCENT, HIGHLIGHT};
use crate::state::AppState;
use crate::ui::panels::kpi;

// ---------------------------------------------------------------------------
// Encyclopedia – per-title detail view
// ---------------------------------------------------------------------------

/// Title picker over the full table, then the selected title's sheet.
pub fn encyclopedia(ui: &mut Ui, state: &mut AppState) {
    let Some(table) = state.table.clone() else {
        return;
    };

    ui.heading("Anime encyclopedia");

    let titles = table.sorted_titles();
    let current = state.selected_title.clone().unwrap_or_default();
    egui::ComboBox::from_id_salt("title_picker")
        .selected_text(&current)
        .width(320.0)
        .show_ui(ui, |ui: &mut Ui| {
            for title in &titles {
                ui.selectable_value(&mut state.selected_title, Some(title.to_string()), *title);
            }
        });
    ui.add_space(8.0);

    let record = state
        .selected_title
        .as_deref()
        .and_then(|title| table.find_by_title(title));
    let Some(record) = record else {
        ui.label("Select a title to see its sheet.");
        return;
    };

    let highlight = state.config.highlight_rating;
    ui.columns(2, |cols: &mut [Ui]| {
        poster(&mut cols[0], record);
        sheet(&mut cols[1], record, highlight);
    });
}

fn poster(ui: &mut Ui, record: &AnimeRecord) {
    match &record.image_url {
        Some(url) => {
            ui.add(
                egui::Image::new(url.as_str())
                    .max_width(ui.available_width())
                    .max_height(420.0),
            );
            ui.label(RichText::new(format!("Poster of {}", record.title)).weak());
        }
        None => {
            egui::Frame::group(ui.style()).show(ui, |ui: &mut Ui| {
                ui.set_min_height(300.0);
                ui.centered_and_justified(|ui: &mut Ui| {
                    ui.label(RichText::new("No image").color(Color32::GRAY));
                });
            });
        }
    }
}

fn sheet(ui: &mut Ui, record: &AnimeRecord, highlight: f64) {
    ui.vertical_centered(|ui: &mut Ui| {
        ui.label(RichText::new(&record.title).size(26.0).strong().color(Color32::WHITE));
        ui.horizontal_wrapped(|ui: &mut Ui| {
            for tag in &record.genre_tags {
                ui.label(RichText::new(tag).color(ACCENT).strong().size(12.0));
            }
        });
    });
    ui.add_space(8.0);

    let studio = if record.studio.is_empty() { "N/A" } else { record.studio.as_str() };
    let (rating, rating_color) = match record.overall_rating {
        Some(r) if r >= highlight => (format!("{r}/10"), HIGHLIGHT),
        Some(r) => (format!("{r}/10"), Color32::WHITE),
        None => ("N/A".to_string(), Color32::WHITE),
    };
    let episodes = format!("{} eps", record.episode_count);

    ui.columns(3, |cols: &mut [Ui]| {
        kpi(&mut cols[0], "Studio", studio, Color32::WHITE);
        kpi(&mut cols[1], "Rating", &rating, rating_color);
        kpi(&mut cols[2], "Episodes", &episodes, Color32::WHITE);
    });
    ui.separator();

    ui.heading("Review");
    egui::Frame::group(ui.style()).show(ui, |ui: &mut Ui| {
        ui.label(record.description.as_deref().unwrap_or("No description."));
    });

    if let Some(best) = &record.best_episode_title {
        ui.add_space(6.0);
        let score = record
            .best_episode_rating
            .map(|r| format!("{r}/10"))
            .unwrap_or_else(|| "?".to_string());
        ui.label(
            RichText::new(format!("Best episode: {best} ({score})"))
                .color(HIGHLIGHT)
                .strong(),
        );
    }
}
