use eframe::egui;
use threat_lens::config::DashboardConfig;

use crate::state::AppState;
use crate::ui::{panels, plot, table};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct ThreatLensApp {
    pub state: AppState,
}

impl ThreatLensApp {
    pub fn new(config: DashboardConfig) -> Self {
        let mut state = AppState::new(config);
        state.refresh();
        Self { state }
    }
}

impl eframe::App for ThreatLensApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Drag and drop acts as an upload ----
        let dropped = ctx.input(|i| i.raw.dropped_files.clone());
        if let Some(file) = dropped.into_iter().next() {
            panels::accept_dropped_file(&mut self.state, file);
        }

        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: source + threat filter ----
        egui::SidePanel::left("filter_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: dashboard ----
        egui::CentralPanel::default().show(ctx, |ui| {
            // A failed load halts the page: only the error is shown.
            if let Some(err) = &self.state.load_error {
                ui.heading("Network Threat Detection Dashboard");
                ui.separator();
                ui.colored_label(egui::Color32::RED, err);
                return;
            }

            egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    ui.heading("Network Threat Detection Dashboard");
                    table::overview(ui, &self.state);
                    ui.separator();
                    plot::threat_chart(ui, &self.state);
                    ui.separator();
                    table::detailed_logs(ui, &self.state);
                    ui.separator();
                    panels::download_section(ui, &mut self.state);
                });
        });
    }
}
