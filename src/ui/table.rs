use eframe::egui::{self, Ui};
use egui_extras::{Column, TableBuilder};

use anime_dashboard::data::aggregate::FilteredView;

const HEADERS: [&str; 8] = [
    "Anime", "Genres", "Studio", "Status", "Source", "Published", "Rating", "Episodes",
];

fn rating_cell(rating: Option<f64>) -> String {
    rating.map(|r| format!("{r:.1}")).unwrap_or_default()
}

/// The current view, best rated first.
pub fn data_table(ui: &mut Ui, view: &FilteredView) {
    let rows = view.sorted_by_rating();

    ui.push_id("data_table", |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .resizable(true)
            .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
            .column(Column::auto().at_least(180.0).clip(true))
            .columns(Column::auto().at_least(60.0).clip(true), HEADERS.len() - 1)
            .max_scroll_height(420.0)
            .header(22.0, |mut header| {
                for name in HEADERS {
                    header.col(|ui| {
                        ui.strong(name);
                    });
                }
            })
            .body(|body| {
                body.rows(20.0, rows.len(), |mut row| {
                    let rec = rows[row.index()];
                    row.col(|ui| {
                        ui.label(&rec.title);
                    });
                    row.col(|ui| {
                        ui.label(rec.genre_tags.join(", "));
                    });
                    row.col(|ui| {
                        ui.label(&rec.studio);
                    });
                    row.col(|ui| {
                        ui.label(&rec.status);
                    });
                    row.col(|ui| {
                        ui.label(&rec.source);
                    });
                    row.col(|ui| {
                        ui.label(
                            rec.publish_date
                                .map(|d| d.format("%Y-%m-%d").to_string())
                                .unwrap_or_default(),
                        );
                    });
                    row.col(|ui| {
                        ui.label(rating_cell(rec.overall_rating));
                    });
                    row.col(|ui| {
                        ui.label(rec.episode_count.to_string());
                    });
                });
            });
    });
}
