mod app;
mod color;
mod state;
mod ui;

use anime_dashboard::config::DashboardConfig;
use app::AnimeDashboardApp;
use eframe::egui;

fn main() -> eframe::Result {
    env_logger::init();

    let config = DashboardConfig::load();
    log::info!("Starting with data source {}", config.data_path.display());

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 860.0])
            .with_min_inner_size([720.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Anime Viz – Dataset Explorer",
        options,
        Box::new(|cc| {
            // Install image loaders so posters can be fetched from their URLs.
            egui_extras::install_image_loaders(&cc.egui_ctx);
            cc.egui_ctx.set_visuals(egui::Visuals::dark());
            Ok(Box::new(AnimeDashboardApp::new(config)))
        }),
    )
}
