use std::collections::HashSet;
use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::config::LedgerPolicy;
use crate::error::LedgerError;
use crate::files::ImageRef;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

// ---------------------------------------------------------------------------
// Ledger of displayed images
// ---------------------------------------------------------------------------

/// Paths already shown, mirrored to an append-only CSV file.
///
/// Each line is `path,recorded_at`. Only the first field is read back.
pub struct Ledger {
    path: PathBuf,
    shown: HashSet<PathBuf>,
}

impl Ledger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            shown: HashSet::new(),
        }
    }

    pub fn contains(&self, image: &Path) -> bool {
        self.shown.contains(image)
    }

    pub fn len(&self) -> usize {
        self.shown.len()
    }

    /// Merge the file's entries into memory. A missing or unreadable file
    /// contributes nothing.
    pub fn load(&mut self) {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log::info!("No ledger at {}, starting empty", self.path.display());
                return;
            }
            Err(e) => {
                log::warn!("Cannot read ledger {}: {}", self.path.display(), e);
                return;
            }
        };

        let before = self.shown.len();
        for line in BufReader::new(file).lines() {
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    log::warn!("Stopped reading ledger {}: {}", self.path.display(), e);
                    break;
                }
            };
            if let Some(field) = first_field(&line) {
                self.shown.insert(PathBuf::from(field));
            }
        }
        log::info!(
            "Loaded {} entries from ledger {}",
            self.shown.len() - before,
            self.path.display()
        );
    }

    /// Mark `image` as shown and append it to the file, synced to disk.
    ///
    /// The in-memory set is updated even when the write fails, so the image
    /// is not repeated in this session.
    pub fn record(&mut self, image: &Path) -> Result<(), LedgerError> {
        self.shown.insert(image.to_path_buf());

        let write = || -> io::Result<()> {
            let mut file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&self.path)?;
            file.write_all(format_record(image).as_bytes())?;
            file.sync_data()
        };
        write().map_err(|source| LedgerError {
            path: self.path.clone(),
            source,
        })
    }

    /// Apply a startup policy against the current catalog.
    pub fn initialize(&mut self, policy: LedgerPolicy, catalog: &[ImageRef]) {
        match policy {
            LedgerPolicy::Resume => self.load(),
            LedgerPolicy::Ignore => {}
            LedgerPolicy::MarkAll => self.mark(catalog),
            LedgerPolicy::MarkAllExceptNewest(keep) => {
                let cut = catalog.len().saturating_sub(keep);
                self.mark(&catalog[..cut]);
            }
        }
    }

    /// Truncate the file and forget everything.
    pub fn reset(&mut self) -> Result<(), LedgerError> {
        self.shown.clear();
        File::create(&self.path).map(drop).map_err(|source| LedgerError {
            path: self.path.clone(),
            source,
        })
    }

    fn mark(&mut self, entries: &[ImageRef]) {
        self.shown = entries.iter().map(|r| r.path.clone()).collect();
        match self.rewrite(entries) {
            Ok(()) => log::info!(
                "Marked {} existing images as shown in {}",
                entries.len(),
                self.path.display()
            ),
            Err(e) => log::error!("{}", e),
        }
    }

    fn rewrite(&self, entries: &[ImageRef]) -> Result<(), LedgerError> {
        let write = || -> io::Result<()> {
            let mut out = BufWriter::new(File::create(&self.path)?);
            for entry in entries {
                out.write_all(format_record(&entry.path).as_bytes())?;
            }
            out.into_inner().map_err(|e| e.into_error())?.sync_data()
        };
        write().map_err(|source| LedgerError {
            path: self.path.clone(),
            source,
        })
    }
}

fn format_record(image: &Path) -> String {
    let stamp = chrono::Local::now().format(TIMESTAMP_FORMAT);
    format!("{},{}\n", quote_field(&image.to_string_lossy()), stamp)
}

fn quote_field(field: &str) -> String {
    if field.contains([',', '"']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// First CSV field of a record, unquoted. Blank lines have none.
fn first_field(line: &str) -> Option<String> {
    let line = line.trim_end_matches('\r');
    if line.is_empty() {
        return None;
    }
    let Some(rest) = line.strip_prefix('"') else {
        let end = line.find(',').unwrap_or(line.len());
        return Some(line[..end].to_string());
    };

    let mut out = String::new();
    let mut chars = rest.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '"' {
            if chars.peek() == Some(&'"') {
                chars.next();
                out.push('"');
            } else {
                break;
            }
        } else {
            out.push(c);
        }
    }
    Some(out)
}

// ---------------------------------------------------------------------------
// Shown-image history used during playback
// ---------------------------------------------------------------------------

/// Where playback remembers what it has shown: the durable ledger, or a
/// set that lives only as long as this session.
pub enum History {
    Ledger(Ledger),
    Session(HashSet<PathBuf>),
}

impl History {
    /// Build the history for `policy`, applying it to `catalog`.
    pub fn open(
        policy: LedgerPolicy,
        ledger_path: &Path,
        reset: bool,
        catalog: &[ImageRef],
    ) -> Self {
        let mut ledger = Ledger::new(ledger_path);
        if reset {
            match ledger.reset() {
                Ok(()) => log::info!("Cleared ledger {}", ledger_path.display()),
                Err(e) => log::error!("{}", e),
            }
        }
        if policy == LedgerPolicy::Ignore {
            return History::Session(HashSet::new());
        }
        ledger.initialize(policy, catalog);
        log::info!("{} images count as already shown", ledger.len());
        History::Ledger(ledger)
    }

    pub fn contains(&self, image: &Path) -> bool {
        match self {
            History::Ledger(ledger) => ledger.contains(image),
            History::Session(seen) => seen.contains(image),
        }
    }

    pub fn mark(&mut self, image: &Path) {
        match self {
            History::Ledger(ledger) => {
                if let Err(e) = ledger.record(image) {
                    log::error!("{}", e);
                }
            }
            History::Session(seen) => {
                seen.insert(image.to_path_buf());
            }
        }
    }
}
