use eframe::egui::Ui;
use egui_plot::{Bar, BarChart, Plot};

use threat_lens::data::summary::tick_positions;
use threat_lens::data::timeframe::format_timestamp;

use crate::color::indicator_color;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Threat bar chart (central panel)
// ---------------------------------------------------------------------------

/// Render the per-bucket sum of the selected threat as a bar chart.
pub fn threat_chart(ui: &mut Ui, state: &AppState) {
    let Some(threat) = state.threat else {
        return;
    };
    let timeframe = state.timeframe;
    let title = threat.title();

    ui.heading(format!("{title} Over Time ({timeframe})"));

    let summary = state.summary();
    if summary.is_empty() {
        ui.label("No events to chart.");
        return;
    }

    // Only every n-th bucket gets a label once there are too many bars.
    let mut labels = vec![String::new(); summary.len()];
    for i in tick_positions(summary.len(), state.config.max_x_ticks) {
        labels[i] = format_timestamp(&summary[i].start);
    }

    let bars: Vec<Bar> = summary
        .iter()
        .enumerate()
        .map(|(i, bucket)| {
            Bar::new(i as f64, bucket.total)
                .width(0.8)
                .name(format_timestamp(&bucket.start))
        })
        .collect();

    let chart = BarChart::new(bars)
        .color(indicator_color(threat))
        .name(format!("{title} per {timeframe}"));

    Plot::new("threat_chart")
        .height(320.0)
        .legend(egui_plot::Legend::default())
        .x_axis_label("Time")
        .y_axis_label("Count")
        .x_axis_formatter(move |mark, _range| {
            let idx = mark.value.round();
            if (mark.value - idx).abs() > 1e-6 || idx < 0.0 {
                return String::new();
            }
            labels.get(idx as usize).cloned().unwrap_or_default()
        })
        .allow_scroll(false)
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(chart);
        });
}
