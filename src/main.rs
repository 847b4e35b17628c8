// Entry point: opens the avatar window (or the headless console) and spawns
// the telemetry worker.
mod app;

use std::error::Error;
use std::io::{self, BufRead};
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use std::thread;
use std::time::Duration;

use clap::Parser;
use crossbeam_channel::{RecvTimeoutError, unbounded};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::*;
use tracing_subscriber::EnvFilter;

use digital_soul::audio::output::AudioOutput;
use digital_soul::audio::speech::speech_channel;
use digital_soul::audio::writer::WavOutput;
use digital_soul::audio::{
    AudioError, Narrator, PacedSpeech, SinkFactory, SpeakingTransition, ToneFeedback, ToneSink,
};
use digital_soul::avatar::Animator;
use digital_soul::cli::Args;
use digital_soul::config::AppConfig;
use digital_soul::core::timebase::Timebase;
use digital_soul::link::Link;
use digital_soul::session::{CompletionClient, OfflineOracle, Session, SubmitOutcome};
use digital_soul::telemetry::{Telemetry, TelemetryFrame, TelemetryWorker};

const REPLY_SLICE: Duration = Duration::from_millis(100);

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn sink_factory(args: &Args, cfg: &AppConfig) -> SinkFactory {
    match args.wav.clone() {
        Some(path) => {
            let sample_rate = cfg.audio.sample_rate;
            info!("Capturing tones to {path}");
            Box::new(move || -> Result<Box<dyn ToneSink>, AudioError> {
                let sink: Box<dyn ToneSink> = Box::new(WavOutput::create(path.clone(), sample_rate)?);
                Ok(sink)
            })
        }
        None => {
            let buffer_ms = cfg.audio.buffer_ms;
            Box::new(move || -> Result<Box<dyn ToneSink>, AudioError> {
                let sink: Box<dyn ToneSink> = Box::new(AudioOutput::new(buffer_ms)?);
                Ok(sink)
            })
        }
    }
}

fn build_link(args: &Args, cfg: &AppConfig) -> Link {
    let (speech_tx, speech_rx) = speech_channel();
    let engine = PacedSpeech::new(speech_tx).with_words_per_sec(cfg.speech.words_per_sec);
    let narrator = Narrator::new(Box::new(engine), speech_rx, cfg.speech.voice_params());

    let client: Option<Arc<dyn CompletionClient>> = if cfg.chat.offline_oracle {
        Some(Arc::new(OfflineOracle::new(Duration::from_millis(
            cfg.chat.offline_latency_ms,
        ))))
    } else {
        warn!("No completion client configured; replies will report the missing credential");
        None
    };
    let session = Session::new(cfg.chat.session_config(), client);

    let mut link = Link::new(session, ToneFeedback::new(sink_factory(args, cfg)), narrator);
    if args.mute || cfg.audio.muted {
        link.set_muted(true);
    }
    link
}

fn vitals_line(frame: &TelemetryFrame, time: Timebase) -> String {
    let v = frame.vitals;
    format!(
        "[vitals t={:.1}s] pulse {} BPM | osc {:.1} Hz | core {:.1} °C",
        time.tick_to_sec(frame.tick),
        v.pulse_rate,
        v.osc_freq,
        v.core_temp
    )
}

fn run_headless(
    mut link: Link,
    mut telemetry: TelemetryWorker,
    time: Timebase,
    stop: Arc<AtomicBool>,
) -> io::Result<()> {
    let voice = link.narrator_mut().subscribe();
    for entry in link.transcript().entries() {
        println!("{entry}");
    }

    let (line_tx, line_rx) = unbounded::<String>();
    thread::Builder::new().name("stdin".into()).spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if line_tx.send(line).is_err() {
                break;
            }
        }
    })?;

    let mut last_frame: Option<TelemetryFrame> = None;
    loop {
        if stop.load(Ordering::SeqCst) {
            info!("SIGINT received: stopping.");
            break;
        }
        if let Some(frame) = telemetry.latest() {
            last_frame = Some(frame);
        }
        for transition in voice.try_iter() {
            match transition {
                SpeakingTransition::Started(id) => debug!(id, "voice active"),
                SpeakingTransition::Ended(id) => debug!(id, "voice idle"),
            }
        }

        match line_rx.recv_timeout(REPLY_SLICE) {
            Ok(line) => {
                let shown = link.transcript().len();
                if let SubmitOutcome::Empty = link.submit(&line) {
                    continue;
                }
                while link.is_busy() && !stop.load(Ordering::SeqCst) {
                    link.wait_reply(REPLY_SLICE);
                }
                for entry in &link.transcript().entries()[shown..] {
                    println!("{entry}");
                }
                if let Some(frame) = &last_frame {
                    println!("{}", vitals_line(frame, time));
                }
            }
            Err(RecvTimeoutError::Timeout) => {
                link.update();
            }
            Err(RecvTimeoutError::Disconnected) => {
                info!("stdin closed");
                break;
            }
        }
    }

    telemetry.stop();
    link.shutdown();
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    init_tracing();
    let args = Args::parse();
    let cfg = AppConfig::load_or_default(&args.config);

    let mut seeder = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let animator_rng = StdRng::seed_from_u64(seeder.random());
    let telemetry_rng = StdRng::seed_from_u64(seeder.random());

    let stop_flag = Arc::new(AtomicBool::new(false));
    let stop_flag_for_ctrlc = stop_flag.clone();
    ctrlc::set_handler(move || {
        stop_flag_for_ctrlc.store(true, Ordering::SeqCst);
    })?;

    let timebase = cfg.telemetry.timebase();
    let telemetry = TelemetryWorker::spawn(Telemetry::new(telemetry_rng), timebase)?;
    let link = build_link(&args, &cfg);

    if args.nogui {
        run_headless(link, telemetry, timebase, stop_flag)?;
        return Ok(());
    }

    let animator = Animator::new(cfg.avatar.animator_params(), animator_rng);
    let glyph_size = cfg.avatar.glyph_size;
    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([1200.0, 800.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Digital Soul",
        native_options,
        Box::new(move |cc| {
            Ok(Box::new(app::App::new(
                cc, animator, link, telemetry, glyph_size, stop_flag,
            )))
        }),
    )?;
    Ok(())
}
