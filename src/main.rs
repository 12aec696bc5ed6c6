mod app;
mod color;
mod state;
mod ui;

use app::ThreatLensApp;
use eframe::egui;
use threat_lens::config::DashboardConfig;

fn main() -> eframe::Result {
    env_logger::init();

    let config = DashboardConfig::load();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 860.0])
            .with_min_inner_size([720.0, 480.0])
            .with_drag_and_drop(true),
        ..Default::default()
    };

    eframe::run_native(
        "Threat Lens – Network Threat Detection Dashboard",
        options,
        Box::new(|_cc| Ok(Box::new(ThreatLensApp::new(config)))),
    )
}
