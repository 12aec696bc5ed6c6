use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

use threat_lens::data::indicator::ThreatIndicator;

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues,
/// starting from a steel blue.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = 210.0 + (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.45, 0.5);
            let rgb: Srgb = hsl.into_color();
            Color32::from_rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Indicator colours
// ---------------------------------------------------------------------------

/// Stable bar / metric colour for an indicator, independent of which
/// indicators a dataset happens to carry.
pub fn indicator_color(indicator: ThreatIndicator) -> Color32 {
    generate_palette(ThreatIndicator::ALL.len())
        .get(indicator.ordinal())
        .copied()
        .unwrap_or(Color32::LIGHT_BLUE)
}
