use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;

use crate::config::{
    resolve_directory, Config, EffectChoice, LedgerPolicy, PlaybackMode, DEFAULT_LEDGER_FILE,
    DEFAULT_MEMO_FILE,
};
use crate::error::ConfigError;

pub const HELP_KEYS: &str = "\
Key Bindings:
  Esc / q       : Quit
  Click / Tap   : Quit (with --click-to-exit)

Environment:
  RUST_LOG      : Log filter (default: info)
";

/// What to do with the displayed-images ledger at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LedgerArg {
    /// Skip everything the ledger already lists
    Resume,
    /// Do not read or write the ledger
    Ignore,
    /// Treat every image present now as already shown
    MarkAll,
    /// Like mark-all, but leave the 10 newest to be shown
    #[value(name = "mark-all-but-10")]
    MarkAllBut10,
    /// Like mark-all, but leave the 75 newest to be shown
    #[value(name = "mark-all-but-75")]
    MarkAllBut75,
}

impl From<LedgerArg> for LedgerPolicy {
    fn from(arg: LedgerArg) -> Self {
        match arg {
            LedgerArg::Resume => LedgerPolicy::Resume,
            LedgerArg::Ignore => LedgerPolicy::Ignore,
            LedgerArg::MarkAll => LedgerPolicy::MarkAll,
            LedgerArg::MarkAllBut10 => LedgerPolicy::MarkAllExceptNewest(10),
            LedgerArg::MarkAllBut75 => LedgerPolicy::MarkAllExceptNewest(75),
        }
    }
}

#[derive(Parser)]
#[command(
    name = "tv",
    version,
    about = "Full-screen viewer that shows new images from a watched directory",
    after_help = HELP_KEYS
)]
pub struct Cli {
    /// Directory to watch. Defaults to the last one used, then the current directory.
    pub directory: Option<PathBuf>,

    /// Seconds between directory scans
    #[arg(short, long, default_value = "3", value_parser = parse_seconds)]
    pub interval: Duration,

    /// Transition length in seconds (0 cuts straight to the next image)
    #[arg(short, long, default_value = "3", value_parser = parse_seconds)]
    pub duration: Duration,

    /// Transition effect
    #[arg(short, long, value_enum, default_value_t = EffectChoice::Fade)]
    pub effect: EffectChoice,

    /// Ledger handling at startup
    #[arg(short, long, value_enum, default_value_t = LedgerArg::Resume)]
    pub ledger: LedgerArg,

    /// Playback order. loop and yoyo require --ledger ignore.
    #[arg(short, long, value_enum, default_value_t = PlaybackMode::Sequential)]
    pub mode: PlaybackMode,

    /// Quit on a mouse click or tap
    #[arg(long)]
    pub click_to_exit: bool,

    /// Plain black screen while waiting for the first image
    #[arg(long)]
    pub no_idle_background: bool,

    /// Cut between images in loop and yoyo modes
    #[arg(long)]
    pub ignore_transition: bool,

    /// Seed for effect and direction choices
    #[arg(long)]
    pub seed: Option<u64>,

    /// Run in a window instead of full-screen
    #[arg(short, long)]
    pub windowed: bool,

    /// Ledger file of displayed images
    #[arg(long, value_name = "FILE", default_value = DEFAULT_LEDGER_FILE)]
    pub ledger_file: PathBuf,

    /// File remembering the last watched directory
    #[arg(long, value_name = "FILE", default_value = DEFAULT_MEMO_FILE)]
    pub memo_file: PathBuf,

    /// Empty the ledger before applying --ledger
    #[arg(long)]
    pub reset_ledger: bool,
}

impl Cli {
    /// Resolve the watched directory and build a validated `Config`.
    pub fn into_config(self) -> Result<Config, ConfigError> {
        let fallback = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        let directory = resolve_directory(self.directory, &self.memo_file, fallback);

        let config = Config {
            directory,
            poll_interval: self.interval,
            transition_duration: self.duration,
            effect: self.effect,
            ledger_policy: self.ledger.into(),
            ledger_path: self.ledger_file,
            reset_ledger: self.reset_ledger,
            mode: self.mode,
            click_to_exit: self.click_to_exit,
            idle_background: !self.no_idle_background,
            ignore_transition: self.ignore_transition,
            fullscreen: !self.windowed,
            seed: self.seed,
        };
        config.validate()?;
        Ok(config)
    }
}

/// Parse a non-negative number of seconds, fractions allowed.
pub fn parse_seconds(s: &str) -> Result<Duration, String> {
    let secs: f64 = s
        .trim()
        .parse()
        .map_err(|_| format!("`{}` is not a number of seconds", s))?;
    if !secs.is_finite() || secs < 0.0 {
        return Err(format!("`{}` must be a non-negative number of seconds", s));
    }
    Ok(Duration::from_secs_f64(secs))
}
