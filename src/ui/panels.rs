use eframe::egui::{self, Color32, RichText, Ui};

use threat_lens::data::export::DEFAULT_EXPORT_NAME;
use threat_lens::data::loader::DataSource;
use threat_lens::data::timeframe::Timeframe;

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – source and filter widgets
// ---------------------------------------------------------------------------

/// Render the left panel: cache reset, upload, threat and timeframe pickers.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    if ui.button("Reset Cache").clicked() {
        state.reset_cache();
    }
    ui.separator();

    ui.heading("Upload CSV (optional)");
    if ui.button("Open…").clicked() {
        open_file_dialog(state);
    }
    ui.small("…or drop a file onto the window.");
    ui.separator();

    ui.heading("Threat Filter");

    let indicators = match &state.loaded {
        Some(loaded) => loaded.indicators.clone(),
        None => {
            ui.label("No dataset loaded.");
            return;
        }
    };

    ui.strong("Select Threat Type");
    let current = state
        .threat
        .map_or_else(String::new, |t| t.column_name().to_string());
    egui::ComboBox::from_id_salt("threat_type_select")
        .selected_text(current)
        .show_ui(ui, |ui: &mut Ui| {
            for ind in indicators {
                ui.selectable_value(&mut state.threat, Some(ind), ind.column_name());
            }
        });

    ui.strong("Group by Timeframe");
    egui::ComboBox::from_id_salt("timeframe_select")
        .selected_text(state.timeframe.column_name())
        .show_ui(ui, |ui: &mut Ui| {
            for tf in Timeframe::ALL {
                ui.selectable_value(&mut state.timeframe, tf, tf.column_name());
            }
        });

    ui.separator();
    if let Ok(cwd) = std::env::current_dir() {
        ui.small(format!("Working directory: {}", cwd.display()));
    }
    if let Some(label) = &state.source_label {
        ui.small(format!("CSV loaded from: {label}"));
    }
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
            if ui
                .add_enabled(state.loaded.is_some(), egui::Button::new("Export CSV…"))
                .clicked()
            {
                save_file_dialog(state);
                ui.close_menu();
            }
            if ui.button("Reset Cache").clicked() {
                state.reset_cache();
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(loaded) = &state.loaded {
            ui.label(format!(
                "{} events, {} threat column(s)",
                loaded.dataset.len(),
                loaded.indicators.len()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::LIGHT_GREEN));
        }
    });
}

// ---------------------------------------------------------------------------
// Download
// ---------------------------------------------------------------------------

pub fn download_section(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Download Dataset");
    if ui
        .button(format!("Download {DEFAULT_EXPORT_NAME}"))
        .clicked()
    {
        save_file_dialog(state);
    }
}

// ---------------------------------------------------------------------------
// File dialogs and drag and drop
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open threat dataset")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.open_path(&path);
    }
}

pub fn save_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Save threat dataset")
        .set_file_name(DEFAULT_EXPORT_NAME)
        .add_filter("CSV", &["csv"])
        .save_file();

    if let Some(path) = file {
        state.export_to(&path);
    }
}

/// Treat a file dropped on the window like an upload.
pub fn accept_dropped_file(state: &mut AppState, file: egui::DroppedFile) {
    match (file.bytes, file.path) {
        (Some(bytes), _) => state.set_upload(DataSource::Upload {
            name: file.name,
            bytes,
        }),
        (None, Some(path)) => state.open_path(&path),
        (None, None) => log::warn!("Ignoring dropped file without path or contents"),
    }
}
