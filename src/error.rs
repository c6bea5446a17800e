use std::path::PathBuf;
use thiserror::Error;

/// Failure to turn an image file into a displayable bitmap.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("could not decode {}: {source}", .path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("{} scales to an empty image", .path.display())]
    Empty { path: PathBuf },
}

/// I/O failure on the displayed-images ledger.
#[derive(Debug, Error)]
#[error("ledger {}: {source}", .path.display())]
pub struct LedgerError {
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    /// Loop and yo-yo replay images, which the ledger exists to prevent.
    #[error("--mode {mode} requires --ledger ignore")]
    ModeNeedsIgnoredLedger { mode: &'static str },

    #[error("watched path {} is not a directory", .0.display())]
    NotADirectory(PathBuf),
}
