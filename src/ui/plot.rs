use std::collections::BTreeMap;

use eframe::egui::Ui;
use egui_plot::{Bar, BarChart, Legend, Plot, Points};

use anime_dashboard::data::aggregate::GroupCount;

use crate::color::{ACCENT, ramp};
use crate::state::AppState;

const CHART_HEIGHT: f32 = 320.0;

// ---------------------------------------------------------------------------
// Distribution & ratings tab
// ---------------------------------------------------------------------------

/// Histogram of overall ratings.
pub fn rating_histogram(ui: &mut Ui, state: &AppState) {
    ui.strong("Rating distribution");

    let bins = state.view.rating_histogram(state.config.histogram_bins);
    let bars: Vec<Bar> = bins
        .iter()
        .map(|b| {
            Bar::new((b.lower + b.upper) / 2.0, b.count as f64)
                .width(b.upper - b.lower)
                .name(format!("{:.1} – {:.1}", b.lower, b.upper))
        })
        .collect();

    Plot::new("rating_histogram")
        .height(CHART_HEIGHT)
        .x_axis_label("Rating")
        .y_axis_label("Titles")
        .allow_drag(false)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).color(ACCENT).name("Titles"));
        });
}

/// Episodes (log scale) against rating, one series per primary genre.
pub fn episodes_vs_rating(ui: &mut Ui, state: &AppState) {
    ui.strong("Rating vs episode count");

    let mut series: BTreeMap<&str, Vec<[f64; 2]>> = BTreeMap::new();
    for p in state.view.episode_rating_points() {
        let x = f64::from(p.episodes.max(1)).log10();
        series.entry(p.genre).or_default().push([x, p.rating]);
    }

    Plot::new("episodes_vs_rating")
        .height(CHART_HEIGHT)
        .legend(Legend::default())
        .x_axis_label("Episodes (log)")
        .y_axis_label("Rating")
        .x_axis_formatter(|mark, _range| format!("{:.0}", 10f64.powf(mark.value)))
        .allow_boxed_zoom(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            for (genre, points) in series {
                let color = state.genre_colors.color_for(genre);
                plot_ui.points(Points::new(points).radius(3.5).color(color).name(genre));
            }
        });
}

// ---------------------------------------------------------------------------
// Studios & status tab
// ---------------------------------------------------------------------------

/// Titles per status.
pub fn status_chart(ui: &mut Ui, state: &AppState) {
    ui.strong("Breakdown by status");
    category_bars(ui, "status_chart", &state.view.status_counts());
}

/// Most prolific studios in the view.
pub fn studio_chart(ui: &mut Ui, state: &AppState) {
    ui.strong("Top studios (volume)");
    category_bars(ui, "studio_chart", &state.view.studio_counts(state.config.top_studios));
}

/// Horizontal bars, largest at the top, shaded by count.
fn category_bars(ui: &mut Ui, id: &str, counts: &[GroupCount]) {
    let max = counts.iter().map(|g| g.count).max().unwrap_or(1).max(1) as f64;
    let n = counts.len();

    let bars: Vec<Bar> = counts
        .iter()
        .enumerate()
        .map(|(i, g)| {
            Bar::new((n - 1 - i) as f64, g.count as f64)
                .width(0.7)
                .name(display_key(&g.key))
                .fill(ramp(g.count as f64 / max))
        })
        .collect();

    let labels: Vec<String> = counts.iter().map(|g| display_key(&g.key)).collect();

    Plot::new(id)
        .height(CHART_HEIGHT)
        .x_axis_label("Titles")
        .y_axis_formatter(move |mark, _range| {
            let pos = mark.value.round();
            if (mark.value - pos).abs() > 1e-6 || pos < 0.0 {
                return String::new();
            }
            let idx = pos as usize;
            if idx < n {
                labels[n - 1 - idx].clone()
            } else {
                String::new()
            }
        })
        .allow_drag(false)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).horizontal());
        });
}

fn display_key(key: &str) -> String {
    if key.is_empty() {
        "(none)".to_string()
    } else {
        key.to_string()
    }
}
