use egui::{
    Button, CentralPanel, Color32, Key, RichText, ScrollArea, Sense, SidePanel, TextEdit, Ui,
};

use crate::session::Speaker;
use crate::telemetry::TelemetryFrame;
use crate::ui::painter::PainterSurface;
use crate::ui::plots::{TRACE_GREEN, ekg_plot, frequency_bar};
use crate::ui::viewdata::{ChatInput, UiAction, UiView};

const OPERATOR_GRAY: Color32 = Color32::from_rgb(160, 160, 160);

fn vitals_grid(ui: &mut Ui, telemetry: Option<&TelemetryFrame>) {
    ui.heading(RichText::new("VITALS").monospace().color(TRACE_GREEN));
    let Some(frame) = telemetry else {
        ui.label("Awaiting telemetry...");
        return;
    };
    let v = frame.vitals;

    ui.monospace(format!("PULSE  {} BPM", v.pulse_rate));
    ekg_plot(ui, &frame.samples);

    ui.monospace("NEURAL OSCILLATION");
    frequency_bar(ui, v.osc_freq);

    ui.monospace(format!("CORE TEMP  {:.1} °C", v.core_temp));
}

fn chat_panel(ui: &mut Ui, view: &UiView<'_>, chat: &mut ChatInput, actions: &mut Vec<UiAction>) {
    ui.horizontal(|ui| {
        ui.heading(RichText::new("NEURAL LINK").monospace().color(TRACE_GREEN));
        let label = if view.muted { "UNMUTE" } else { "MUTE" };
        if ui.button(label).clicked() {
            actions.push(UiAction::SetMuted(!view.muted));
        }
        if view.speaking {
            ui.label(RichText::new("VOICE").monospace().color(TRACE_GREEN));
        }
    });

    let log_height = (ui.available_height() - 40.0).max(80.0);
    ScrollArea::vertical()
        .max_height(log_height)
        .auto_shrink([false, false])
        .stick_to_bottom(true)
        .show(ui, |ui| {
            for entry in view.transcript.entries() {
                let color = match entry.speaker {
                    Speaker::Operator => OPERATOR_GRAY,
                    Speaker::Entity => TRACE_GREEN,
                };
                ui.label(RichText::new(entry.to_string()).monospace().color(color));
            }
            if view.busy {
                ui.label(RichText::new("PROCESSING...").monospace().italics());
            }
        });

    ui.separator();
    ui.horizontal(|ui| {
        let edit = ui.add_enabled(
            !view.busy,
            TextEdit::singleline(&mut chat.text)
                .hint_text("Enter command...")
                .font(egui::TextStyle::Monospace)
                .desired_width(ui.available_width() - 60.0),
        );
        if edit.gained_focus() {
            actions.push(UiAction::PrimeAudio);
        }
        let entered = edit.lost_focus() && ui.input(|i| i.key_pressed(Key::Enter));
        let clicked = ui.add_enabled(!view.busy, Button::new("SEND")).clicked();
        if entered || clicked {
            actions.push(UiAction::Submit(std::mem::take(&mut chat.text)));
            edit.request_focus();
        }
    });
}

/// Lay out the window: avatar on the left, vitals and chat on the right.
pub fn main_window(
    ctx: &egui::Context,
    view: &UiView<'_>,
    chat: &mut ChatInput,
    draw_avatar: &mut dyn FnMut(&mut PainterSurface),
) -> Vec<UiAction> {
    let mut actions = Vec::new();

    SidePanel::right("console")
        .resizable(true)
        .default_width(420.0)
        .show(ctx, |ui| {
            vitals_grid(ui, view.telemetry);
            ui.separator();
            chat_panel(ui, view, chat, &mut actions);
        });

    CentralPanel::default()
        .frame(egui::Frame::NONE.fill(Color32::BLACK))
        .show(ctx, |ui| {
            let (rect, _) = ui.allocate_exact_size(ui.available_size(), Sense::hover());
            let mut surface = PainterSurface::new(ui.painter_at(rect), rect, view.glyph_size);
            draw_avatar(&mut surface);
        });

    actions
}
