use egui::Color32;
use egui_plot::{Line, Plot, PlotPoints};

use crate::telemetry::waveform::{WINDOW_LEN, X_STEP};

pub const TRACE_GREEN: Color32 = Color32::from_rgb(0, 255, 65);

/// EKG trace over the sample window. Samples are screen-style (0 at top), so
/// the plot flips them.
pub fn ekg_plot(ui: &mut egui::Ui, samples: &[f32]) {
    let points: PlotPoints = samples
        .iter()
        .enumerate()
        .map(|(i, s)| [(i as f32 * X_STEP) as f64, (100.0 - *s) as f64])
        .collect();
    let line = Line::new("pulse", points).color(TRACE_GREEN);

    Plot::new("ekg")
        .height(90.0)
        .show_axes(false)
        .show_grid(false)
        .allow_scroll(false)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_boxed_zoom(false)
        .include_x(0.0)
        .include_x(((WINDOW_LEN - 1) as f32 * X_STEP) as f64)
        .include_y(0.0)
        .include_y(100.0)
        .show(ui, |plot_ui| {
            plot_ui.line(line);
        });
}

/// Oscillation frequency as a fraction of 50 Hz.
pub fn frequency_bar(ui: &mut egui::Ui, osc_freq: f32) {
    let fraction = (osc_freq / 50.0).clamp(0.0, 1.0);
    ui.add(
        egui::ProgressBar::new(fraction)
            .fill(TRACE_GREEN.gamma_multiply(0.6))
            .text(format!("{osc_freq:.1} Hz")),
    );
}
