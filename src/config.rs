use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::{info, warn};

use crate::audio::VoiceParams;
use crate::avatar::AnimatorParams;
use crate::core::timebase::Timebase;
use crate::session::{DEFAULT_PERSONA, GREETING, SessionConfig};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
}

fn finite_or(key: &str, value: f64, default: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        warn!("{key} = {value} is not a finite number. Using {default}.");
        default
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioConfig {
    /// Size of the output ring in milliseconds.
    #[serde(default = "AudioConfig::default_buffer_ms")]
    pub buffer_ms: f32,
    /// Sample rate used when capturing tones to WAV.
    #[serde(default = "AudioConfig::default_sample_rate")]
    pub sample_rate: u32,
    #[serde(default)]
    pub muted: bool,
}

impl AudioConfig {
    fn default_buffer_ms() -> f32 {
        1000.0
    }
    fn default_sample_rate() -> u32 {
        48_000
    }
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            buffer_ms: Self::default_buffer_ms(),
            sample_rate: Self::default_sample_rate(),
            muted: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// Vitals / waveform tick, clamped to 1..=200 ms.
    #[serde(default = "TelemetryConfig::default_tick_ms")]
    pub tick_ms: u64,
}

impl TelemetryConfig {
    fn default_tick_ms() -> u64 {
        50
    }

    pub fn timebase(&self) -> Timebase {
        Timebase::from_millis(self.tick_ms)
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            tick_ms: Self::default_tick_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvatarConfig {
    #[serde(default = "AvatarConfig::default_particle_count")]
    pub particle_count: usize,
    #[serde(default = "AvatarConfig::default_ambient_flip_chance")]
    pub ambient_flip_chance: f64,
    #[serde(default = "AvatarConfig::default_speaking_flip_chance")]
    pub speaking_flip_chance: f64,
    #[serde(default = "AvatarConfig::default_speaking_rate")]
    pub speaking_rate: f32,
    #[serde(default = "AvatarConfig::default_glyph_size")]
    pub glyph_size: f32,
}

impl AvatarConfig {
    fn default_particle_count() -> usize {
        900
    }
    fn default_ambient_flip_chance() -> f64 {
        0.02
    }
    fn default_speaking_flip_chance() -> f64 {
        0.1
    }
    fn default_speaking_rate() -> f32 {
        20.0
    }
    fn default_glyph_size() -> f32 {
        10.0
    }

    /// Runtime parameters. TOML accepts `nan`/`inf`, which would panic the
    /// flip sampler, so non-finite values fall back to their defaults.
    pub fn animator_params(&self) -> AnimatorParams {
        AnimatorParams {
            particle_count: self.particle_count,
            ambient_flip_chance: finite_or(
                "avatar.ambient_flip_chance",
                self.ambient_flip_chance,
                Self::default_ambient_flip_chance(),
            ),
            speaking_flip_chance: finite_or(
                "avatar.speaking_flip_chance",
                self.speaking_flip_chance,
                Self::default_speaking_flip_chance(),
            ),
            speaking_rate: finite_or(
                "avatar.speaking_rate",
                self.speaking_rate as f64,
                Self::default_speaking_rate() as f64,
            ) as f32,
        }
    }
}

impl Default for AvatarConfig {
    fn default() -> Self {
        Self {
            particle_count: Self::default_particle_count(),
            ambient_flip_chance: Self::default_ambient_flip_chance(),
            speaking_flip_chance: Self::default_speaking_flip_chance(),
            speaking_rate: Self::default_speaking_rate(),
            glyph_size: Self::default_glyph_size(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeechConfig {
    #[serde(default = "SpeechConfig::default_pitch")]
    pub pitch: f32,
    #[serde(default = "SpeechConfig::default_rate")]
    pub rate: f32,
    #[serde(default = "SpeechConfig::default_volume")]
    pub volume: f32,
    #[serde(default = "SpeechConfig::default_preferred_voices")]
    pub preferred_voices: Vec<String>,
    /// Pace of the built-in engine.
    #[serde(default = "SpeechConfig::default_words_per_sec")]
    pub words_per_sec: f32,
}

impl SpeechConfig {
    fn default_pitch() -> f32 {
        0.6
    }
    fn default_rate() -> f32 {
        1.0
    }
    fn default_volume() -> f32 {
        0.8
    }
    fn default_preferred_voices() -> Vec<String> {
        VoiceParams::default().preferred_voices
    }
    fn default_words_per_sec() -> f32 {
        2.5
    }

    pub fn voice_params(&self) -> VoiceParams {
        VoiceParams {
            pitch: self.pitch,
            rate: self.rate,
            volume: self.volume,
            preferred_voices: self.preferred_voices.clone(),
        }
    }
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            pitch: Self::default_pitch(),
            rate: Self::default_rate(),
            volume: Self::default_volume(),
            preferred_voices: Self::default_preferred_voices(),
            words_per_sec: Self::default_words_per_sec(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    #[serde(default = "ChatConfig::default_context_window")]
    pub context_window: usize,
    #[serde(default = "ChatConfig::default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "ChatConfig::default_temperature")]
    pub temperature: f32,
    /// Answer with the built-in offline oracle. When false no collaborator is
    /// configured and every submission gets the missing-credential message.
    #[serde(default = "ChatConfig::default_offline_oracle")]
    pub offline_oracle: bool,
    #[serde(default = "ChatConfig::default_offline_latency_ms")]
    pub offline_latency_ms: u64,
    #[serde(default = "ChatConfig::default_persona")]
    pub persona: String,
}

impl ChatConfig {
    fn default_context_window() -> usize {
        6
    }
    fn default_max_tokens() -> u32 {
        150
    }
    fn default_temperature() -> f32 {
        0.7
    }
    fn default_offline_oracle() -> bool {
        true
    }
    fn default_offline_latency_ms() -> u64 {
        600
    }
    fn default_persona() -> String {
        DEFAULT_PERSONA.to_string()
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            persona: self.persona.clone(),
            context_window: self.context_window,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            greeting: Some(GREETING.to_string()),
        }
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            context_window: Self::default_context_window(),
            max_tokens: Self::default_max_tokens(),
            temperature: Self::default_temperature(),
            offline_oracle: Self::default_offline_oracle(),
            offline_latency_ms: Self::default_offline_latency_ms(),
            persona: Self::default_persona(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub audio: AudioConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
    #[serde(default)]
    pub avatar: AvatarConfig,
    #[serde(default)]
    pub speech: SpeechConfig,
    #[serde(default)]
    pub chat: ChatConfig,
}

impl AppConfig {
    fn round_f32(x: f32) -> f32 {
        (x * 1_000_000.0).round() / 1_000_000.0
    }

    fn format_f32_compact(x: f32) -> String {
        let mut s = format!("{:.6}", x);
        while s.contains('.') && s.ends_with('0') {
            s.pop();
        }
        if s.ends_with('.') {
            s.pop();
        }
        if s.is_empty() { "0".to_string() } else { s }
    }

    fn rounded(mut self) -> Self {
        self.audio.buffer_ms = Self::round_f32(self.audio.buffer_ms);
        self.avatar.speaking_rate = Self::round_f32(self.avatar.speaking_rate);
        self.avatar.glyph_size = Self::round_f32(self.avatar.glyph_size);
        self.speech.pitch = Self::round_f32(self.speech.pitch);
        self.speech.rate = Self::round_f32(self.speech.rate);
        self.speech.volume = Self::round_f32(self.speech.volume);
        self.speech.words_per_sec = Self::round_f32(self.speech.words_per_sec);
        self.chat.temperature = Self::round_f32(self.chat.temperature);
        self
    }

    pub fn load(path: &str) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_string(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_string(),
            source,
        })
    }

    /// Defaults with every value line commented out, so the file documents
    /// the knobs without pinning them.
    pub fn commented_defaults() -> Option<String> {
        let text = toml::to_string_pretty(&Self::default().rounded()).ok()?;
        let mut commented = String::new();
        for line in text.lines() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                commented.push('\n');
            } else if trimmed.starts_with('[') && trimmed.ends_with(']') && !line.contains('=') {
                commented.push_str(line);
                commented.push('\n');
            } else {
                let mut out_line = line.to_string();
                if let Some((lhs, rhs)) = line.split_once('=') {
                    // only bare float values carry f32 widening noise
                    let value = rhs.trim();
                    if value.contains('.') {
                        if let Ok(val) = value.parse::<f32>() {
                            let mut formatted = Self::format_f32_compact(val);
                            if !formatted.contains('.') {
                                formatted.push_str(".0");
                            }
                            out_line = format!("{} = {}", lhs.trim(), formatted);
                        }
                    }
                }
                commented.push_str("# ");
                commented.push_str(&out_line);
                commented.push('\n');
            }
        }
        Some(commented)
    }

    pub fn load_or_default(path: &str) -> Self {
        let path_obj = Path::new(path);
        if path_obj.exists() {
            return match Self::load(path) {
                Ok(cfg) => cfg,
                Err(err) => {
                    warn!("{err}. Using defaults.");
                    Self::default()
                }
            };
        }

        // File does not exist: write defaults and return them.
        let default_cfg = Self::default().rounded();
        match Self::commented_defaults() {
            Some(commented) => {
                if let Err(err) = fs::write(path_obj, commented) {
                    warn!("Failed to write default config to {path}: {err}");
                } else {
                    info!("Wrote default config to {path}");
                }
            }
            None => warn!("Failed to serialize default config; continuing with defaults"),
        }
        default_cfg
    }
}
