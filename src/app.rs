use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use std::time::Instant;

use egui::ViewportCommand;
use tracing::*;

use digital_soul::audio::SpeakingFlag;
use digital_soul::avatar::Animator;
use digital_soul::link::Link;
use digital_soul::session::SubmitOutcome;
use digital_soul::telemetry::{TelemetryFrame, TelemetryWorker};
use digital_soul::ui::painter::PainterSurface;
use digital_soul::ui::viewdata::{ChatInput, UiAction, UiView};
use digital_soul::ui::windows::main_window;

pub struct App {
    animator: Animator,
    link: Link,
    telemetry: TelemetryWorker,
    speaking: SpeakingFlag,
    last_frame: Option<TelemetryFrame>,
    chat: ChatInput,
    glyph_size: f32,
    started: Instant,
    exiting: Arc<AtomicBool>,
}

impl App {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        animator: Animator,
        link: Link,
        telemetry: TelemetryWorker,
        glyph_size: f32,
        stop_flag: Arc<AtomicBool>,
    ) -> Self {
        cc.egui_ctx.set_visuals(egui::Visuals::dark());
        let speaking = link.speaking_flag();
        Self {
            animator,
            link,
            telemetry,
            speaking,
            last_frame: None,
            chat: ChatInput::default(),
            glyph_size,
            started: Instant::now(),
            exiting: stop_flag,
        }
    }

    fn apply(&mut self, action: UiAction) {
        match action {
            UiAction::Submit(text) => match self.link.submit(&text) {
                SubmitOutcome::Busy => debug!("submission ignored while busy"),
                SubmitOutcome::Closed => warn!("submission after shutdown"),
                _ => {}
            },
            UiAction::SetMuted(muted) => self.link.set_muted(muted),
            UiAction::PrimeAudio => self.link.prime_audio(),
        }
    }
}

impl eframe::App for App {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if self.exiting.load(Ordering::SeqCst) {
            info!("SIGINT received: closing window.");
            ctx.send_viewport_cmd(ViewportCommand::Close);
            return;
        }

        // Pull newest telemetry (drain to latest)
        if let Some(frame) = self.telemetry.latest() {
            self.last_frame = Some(frame);
        }
        self.link.update();

        let speaking = self.speaking.is_speaking();
        let elapsed = self.started.elapsed().as_secs_f32();
        let view = UiView {
            telemetry: self.last_frame.as_ref(),
            transcript: self.link.transcript(),
            busy: self.link.is_busy(),
            muted: self.link.is_muted(),
            speaking,
            glyph_size: self.glyph_size,
        };
        let animator = &mut self.animator;
        let actions = main_window(ctx, &view, &mut self.chat, &mut |surface: &mut PainterSurface| {
            animator.frame(surface, elapsed, speaking);
        });

        for action in actions {
            self.apply(action);
        }
        ctx.request_repaint();
    }
}

impl Drop for App {
    fn drop(&mut self) {
        info!("App drop. Finalizing..");
        self.telemetry.stop();
        self.link.shutdown();
    }
}
