use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about)]
pub struct Args {
    /// Path to config TOML
    #[arg(long, default_value = "config.toml")]
    pub config: String,

    /// Start with tones and narration silenced (overrides config)
    #[arg(long, default_value_t = false)]
    pub mute: bool,

    /// Run without GUI (headless, operator lines read from stdin)
    #[arg(long, default_value_t = false)]
    pub nogui: bool,

    /// Capture feedback tones to a wav file instead of the output device
    #[arg(long)]
    pub wav: Option<String>,

    /// Seed for the avatar and telemetry generators
    #[arg(long)]
    pub seed: Option<u64>,
}
