use eframe::egui::{self, RichText, Ui};
use egui_extras::{Column, TableBuilder};

use threat_lens::data::summary::indicator_total;

use crate::color::indicator_color;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Threat overview metrics
// ---------------------------------------------------------------------------

/// One counter per indicator present in the dataset.
pub fn overview(ui: &mut Ui, state: &AppState) {
    let Some(loaded) = &state.loaded else {
        return;
    };

    ui.heading("Threat Overview");
    ui.horizontal_wrapped(|ui: &mut Ui| {
        for &ind in &loaded.indicators {
            let total = indicator_total(&loaded.dataset, ind) as i64;
            ui.group(|ui: &mut Ui| {
                ui.vertical(|ui: &mut Ui| {
                    ui.label(ind.metric_label());
                    ui.label(
                        RichText::new(total.to_string())
                            .size(26.0)
                            .strong()
                            .color(indicator_color(ind)),
                    );
                });
            });
        }
    });
}

// ---------------------------------------------------------------------------
// Detailed log table
// ---------------------------------------------------------------------------

/// Rows flagged by the selected threat, newest first.
pub fn detailed_logs(ui: &mut Ui, state: &AppState) {
    let Some(loaded) = &state.loaded else {
        return;
    };

    ui.heading("Detailed Logs");

    let dataset = &loaded.dataset;
    let header = dataset.header();
    let rows: Vec<Vec<String>> = state
        .log_rows()
        .into_iter()
        .map(|rec| dataset.row_fields(rec))
        .collect();

    if rows.is_empty() {
        ui.label("No flagged events.");
        return;
    }

    let header_height = ui.text_style_height(&egui::TextStyle::Body) + 4.0;

    egui::ScrollArea::horizontal()
        .id_salt("log_table_scroll")
        .show(ui, |ui: &mut Ui| {
            TableBuilder::new(ui)
                .striped(true)
                .vscroll(false)
                .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
                .columns(
                    Column::auto().at_least(60.0).resizable(true).clip(true),
                    header.len(),
                )
                .header(header_height, |mut head| {
                    for name in &header {
                        head.col(|ui| {
                            ui.strong(*name);
                        });
                    }
                })
                .body(|body| {
                    body.rows(18.0, rows.len(), |mut row| {
                        let cells = &rows[row.index()];
                        for cell in cells {
                            row.col(|ui| {
                                ui.label(cell);
                            });
                        }
                    });
                });
        });
}
