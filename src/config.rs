use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::ValueEnum;

use crate::error::ConfigError;

pub const DEFAULT_POLL_SECS: f64 = 3.0;
pub const DEFAULT_TRANSITION_SECS: f64 = 3.0;
pub const DEFAULT_LEDGER_FILE: &str = "displayed_images.csv";
pub const DEFAULT_MEMO_FILE: &str = "last_directory.txt";

/// Which transition to use. `Random` picks one of the others per transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum EffectChoice {
    #[default]
    Fade,
    Dissolve,
    Paint,
    Roll,
    Random,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerPolicy {
    /// Continue from whatever the ledger already holds.
    Resume,
    /// Neither read nor write the ledger.
    Ignore,
    /// Record the whole current catalog as shown.
    MarkAll,
    /// Record the whole catalog except the `n` newest entries.
    MarkAllExceptNewest(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum PlaybackMode {
    /// Show each new image once.
    #[default]
    Sequential,
    /// Cycle through the catalog, wrapping at the end.
    Loop,
    /// Walk the catalog forward and back, reversing at either end.
    Yoyo,
}

impl PlaybackMode {
    pub fn as_str(self) -> &'static str {
        match self {
            PlaybackMode::Sequential => "sequential",
            PlaybackMode::Loop => "loop",
            PlaybackMode::Yoyo => "yoyo",
        }
    }

    pub fn is_continuous(self) -> bool {
        self != PlaybackMode::Sequential
    }
}

/// Everything playback needs, fixed before the first frame.
#[derive(Debug, Clone)]
pub struct Config {
    pub directory: PathBuf,
    pub poll_interval: Duration,
    pub transition_duration: Duration,
    pub effect: EffectChoice,
    pub ledger_policy: LedgerPolicy,
    pub ledger_path: PathBuf,
    pub reset_ledger: bool,
    pub mode: PlaybackMode,
    pub click_to_exit: bool,
    pub idle_background: bool,
    pub ignore_transition: bool,
    pub fullscreen: bool,
    pub seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("."),
            poll_interval: Duration::from_secs_f64(DEFAULT_POLL_SECS),
            transition_duration: Duration::from_secs_f64(DEFAULT_TRANSITION_SECS),
            effect: EffectChoice::default(),
            ledger_policy: LedgerPolicy::Resume,
            ledger_path: PathBuf::from(DEFAULT_LEDGER_FILE),
            reset_ledger: false,
            mode: PlaybackMode::default(),
            click_to_exit: false,
            idle_background: true,
            ignore_transition: false,
            fullscreen: true,
            seed: None,
        }
    }
}

impl Config {
    /// Reject combinations that cannot be played back.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.mode.is_continuous() && self.ledger_policy != LedgerPolicy::Ignore {
            return Err(ConfigError::ModeNeedsIgnoredLedger {
                mode: self.mode.as_str(),
            });
        }
        if !self.directory.is_dir() {
            return Err(ConfigError::NotADirectory(self.directory.clone()));
        }
        Ok(())
    }

    /// Transition length actually used. Ignoring transitions only applies
    /// to the continuous modes.
    pub fn effective_transition(&self) -> Duration {
        if self.ignore_transition && self.mode.is_continuous() {
            Duration::ZERO
        } else {
            self.transition_duration
        }
    }
}

// ---------------------------------------------------------------------------
// Watched-directory memo
// ---------------------------------------------------------------------------

/// The directory remembered from the last session, if it still exists.
pub fn read_memo(memo: &Path) -> Option<PathBuf> {
    let text = match fs::read_to_string(memo) {
        Ok(text) => text,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return None,
        Err(e) => {
            log::warn!("Ignoring memo file {}: {}", memo.display(), e);
            return None;
        }
    };
    let line = text.lines().next()?.trim();
    if line.is_empty() {
        return None;
    }
    let dir = PathBuf::from(line);
    if dir.is_dir() {
        Some(dir)
    } else {
        log::warn!("Remembered directory {} no longer exists", dir.display());
        None
    }
}

pub fn write_memo(memo: &Path, dir: &Path) -> io::Result<()> {
    fs::write(memo, format!("{}\n", dir.display()))
}

/// Pick the watched directory: explicit argument, then memo, then `fallback`.
/// The memo is rewritten when the choice is an existing directory that
/// differs from what it held.
pub fn resolve_directory(explicit: Option<PathBuf>, memo: &Path, fallback: PathBuf) -> PathBuf {
    let remembered = read_memo(memo);
    let dir = explicit
        .or_else(|| remembered.clone())
        .unwrap_or(fallback);
    let dir = std::path::absolute(&dir).unwrap_or(dir);

    if dir.is_dir() && remembered.as_deref() != Some(dir.as_path()) {
        if let Err(e) = write_memo(memo, &dir) {
            log::warn!("Could not update memo file {}: {}", memo.display(), e);
        }
    }
    dir
}
