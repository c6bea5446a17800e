use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime};

use crate::config::{Config, PlaybackMode};
use crate::files::ImageRef;
use crate::ledger::History;
use crate::loader::{DecodedImage, ImageSource};
use crate::ui::idle::ParticleField;
use crate::ui::render::{text_advance, Canvas, BG_COLOR};
use crate::ui::transition::TransitionState;

const WAITING_TEXT: &str = "Waiting for images";
const WAITING_SCALE: u32 = 3;

// ---------------------------------------------------------------------------
// Playback state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    /// Nothing shown yet and nothing loading.
    Idle,
    Showing,
    Transitioning,
}

enum Phase {
    Idle,
    Showing {
        since: Instant,
    },
    Transitioning {
        next: DecodedImage,
        started: Instant,
        transition: TransitionState,
    },
}

/// Next index of a yo-yo walk over `len` entries, and the direction after it.
///
/// The walk starts at 0 and reverses whenever it lands on either end. An
/// index left over from a longer catalog is clamped back into range.
pub fn yoyo_step(index: Option<usize>, forward: bool, len: usize) -> (usize, bool) {
    if len <= 1 {
        return (0, true);
    }
    let last = len - 1;
    let next = match index {
        None => 0,
        Some(i) if forward => (i + 1).min(last),
        Some(i) => i.saturating_sub(1).min(last),
    };
    let forward = if next == last {
        false
    } else if next == 0 {
        true
    } else {
        forward
    };
    (next, forward)
}

/// Cursor through a catalog snapshot for loop and yo-yo playback.
struct Sequence {
    mode: PlaybackMode,
    catalog: Vec<ImageRef>,
    index: Option<usize>,
    forward: bool,
}

impl Sequence {
    fn new(mode: PlaybackMode) -> Self {
        Self {
            mode,
            catalog: Vec::new(),
            index: None,
            forward: true,
        }
    }

    fn advance(&mut self, source: &impl ImageSource) -> Option<ImageRef> {
        match self.mode {
            PlaybackMode::Loop => {
                let next = self.index.map_or(0, |i| i + 1);
                if next < self.catalog.len() {
                    self.index = Some(next);
                } else {
                    self.catalog = source.scan();
                    self.index = (!self.catalog.is_empty()).then_some(0);
                }
            }
            PlaybackMode::Yoyo => {
                if self.catalog.is_empty() {
                    self.catalog = source.scan();
                    self.index = None;
                    self.forward = true;
                }
                if self.catalog.is_empty() {
                    return None;
                }
                let (i, forward) = yoyo_step(self.index, self.forward, self.catalog.len());
                // A single entry is both ends of the walk.
                let turned =
                    self.catalog.len() <= 1 || forward != self.forward || self.index.is_none();
                self.index = Some(i);
                self.forward = forward;
                let picked = self.catalog[i].clone();
                // Pick up new files each time the walk turns around.
                if turned {
                    self.catalog = source.scan();
                }
                return Some(picked);
            }
            PlaybackMode::Sequential => return None,
        }
        self.index.map(|i| self.catalog[i].clone())
    }
}

// ---------------------------------------------------------------------------
// Player
// ---------------------------------------------------------------------------

/// Drives scanning, selection and transitions one frame at a time.
pub struct Player<S: ImageSource> {
    config: Arc<Config>,
    source: S,
    history: History,
    sequence: Option<Sequence>,
    rng: StdRng,

    phase: Phase,
    current: Option<DecodedImage>,

    last_poll: Option<Instant>,
    last_frame: Option<Instant>,
    /// Set after a failed load; continuous playback then waits for a poll.
    waiting_for_poll: bool,
    /// Files that failed to load, with the timestamp they had at the time.
    failed: HashMap<PathBuf, SystemTime>,

    idle: ParticleField,
    idle_time: Duration,
}

impl<S: ImageSource> Player<S> {
    pub fn new(config: Arc<Config>, source: S, history: History) -> Self {
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let idle = ParticleField::new(rng.random());
        let sequence = config
            .mode
            .is_continuous()
            .then(|| Sequence::new(config.mode));

        Self {
            config,
            source,
            history,
            sequence,
            rng,
            phase: Phase::Idle,
            current: None,
            last_poll: None,
            last_frame: None,
            waiting_for_poll: false,
            failed: HashMap::new(),
            idle,
            idle_time: Duration::ZERO,
        }
    }

    pub fn state(&self) -> PlaybackState {
        match self.phase {
            Phase::Idle => PlaybackState::Idle,
            Phase::Showing { .. } => PlaybackState::Showing,
            Phase::Transitioning { .. } => PlaybackState::Transitioning,
        }
    }

    /// Run one frame: maybe pick up a new image, then draw.
    pub fn frame(&mut self, canvas: &mut Canvas, now: Instant) {
        let dt = self
            .last_frame
            .map_or(Duration::ZERO, |t| now.saturating_duration_since(t));
        self.last_frame = Some(now);

        self.update(now, canvas.width(), canvas.height());
        self.draw(canvas, now, dt);
    }

    /// Drop both image slots.
    pub fn release(&mut self) {
        let had_next = matches!(self.phase, Phase::Transitioning { .. });
        self.phase = Phase::Idle;
        let had_current = self.current.take().is_some();
        log::debug!(
            "Released image slots (current: {}, next: {})",
            had_current,
            had_next
        );
    }

    fn update(&mut self, now: Instant, width: u32, height: u32) {
        // Polls that come due mid-transition wait for it to finish.
        if matches!(self.phase, Phase::Transitioning { .. }) {
            return;
        }

        let poll_due = self
            .last_poll
            .is_none_or(|t| now.saturating_duration_since(t) >= self.config.poll_interval);
        let continuous_due = self.sequence.is_some()
            && !self.waiting_for_poll
            && match self.phase {
                Phase::Showing { since } => self.dwell_over(since, now),
                _ => false,
            };
        if !poll_due && !continuous_due {
            return;
        }

        if poll_due {
            self.waiting_for_poll = false;
        }
        self.last_poll = Some(now);
        self.advance(now, width, height);
    }

    /// Continuous modes move on as soon as a transition ends. With cuts
    /// there is no transition to watch, so each image stays a poll interval.
    fn dwell_over(&self, since: Instant, now: Instant) -> bool {
        !self.config.effective_transition().is_zero()
            || now.saturating_duration_since(since) >= self.config.poll_interval
    }

    fn advance(&mut self, now: Instant, width: u32, height: u32) {
        let Some(candidate) = self.pick_next() else { return };

        match self.source.load(&candidate.path, width, height) {
            Ok(image) => {
                self.failed.remove(&candidate.path);
                // Recorded before anything is drawn, so a crash cannot
                // show it twice.
                self.history.mark(&candidate.path);
                log::info!("Showing {}", candidate.path.display());

                let transition =
                    TransitionState::begin(self.config.effect, &mut self.rng, width, height);
                self.phase = Phase::Transitioning {
                    next: image,
                    started: now,
                    transition,
                };
            }
            Err(e) => {
                log::warn!("Skipping image: {}", e);
                self.failed.insert(candidate.path, candidate.modified);
                self.waiting_for_poll = true;
            }
        }
    }

    fn pick_next(&mut self) -> Option<ImageRef> {
        if let Some(sequence) = self.sequence.as_mut() {
            return sequence.advance(&self.source);
        }
        let history = &self.history;
        let failed = &self.failed;
        self.source.scan().into_iter().find(|r| {
            !history.contains(&r.path) && failed.get(&r.path) != Some(&r.modified)
        })
    }

    fn draw(&mut self, canvas: &mut Canvas, now: Instant, dt: Duration) {
        let mut finished = false;

        match &self.phase {
            Phase::Transitioning {
                next,
                started,
                transition,
            } => {
                let duration = self.config.effective_transition();
                let elapsed = now.saturating_duration_since(*started);
                let progress = transition_progress(elapsed, duration);
                transition.render(canvas, self.current.as_ref(), next, progress);
                finished = elapsed >= duration;
            }
            Phase::Showing { .. } => {
                canvas.clear(BG_COLOR);
                if let Some(cur) = &self.current {
                    canvas.blit_centered(cur, 255);
                }
            }
            Phase::Idle => {
                self.idle_time += dt;
                canvas.clear(BG_COLOR);
                if self.config.idle_background {
                    self.idle
                        .step(dt.as_secs_f32(), canvas.width(), canvas.height());
                    self.idle.draw(canvas);
                }
                self.draw_waiting(canvas);
            }
        }

        if finished {
            self.finish_transition(now);
        }
    }

    fn finish_transition(&mut self, now: Instant) {
        let previous = std::mem::replace(&mut self.phase, Phase::Showing { since: now });
        let Phase::Transitioning { next, .. } = previous else { return };

        if let Some(old) = self.current.replace(next) {
            log::debug!(
                "Released {}x{} image ({:.1} MB)",
                old.width,
                old.height,
                old.mem_size() as f64 / (1024.0 * 1024.0)
            );
            drop(old);
        }
    }

    fn draw_waiting(&self, canvas: &mut Canvas) {
        let dots = (self.idle_time.as_secs() % 4) as usize;
        let text = format!("{}{}", WAITING_TEXT, ".".repeat(dots));
        // Center on the text without dots so it does not jitter.
        let width = text_advance(WAITING_SCALE) * WAITING_TEXT.len() as i32;
        let x = (canvas.width() as i32 - width) / 2;
        let y = canvas.height() as i32 / 2 - (7 * WAITING_SCALE as i32) / 2;
        canvas.draw_text(&text, x, y, WAITING_SCALE, (200, 200, 200), 255);
    }
}

/// Fraction of a transition done after `elapsed`, in [0, 1].
pub fn transition_progress(elapsed: Duration, duration: Duration) -> f32 {
    if duration.is_zero() {
        return 1.0;
    }
    (elapsed.as_secs_f64() / duration.as_secs_f64()).clamp(0.0, 1.0) as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{EffectChoice, LedgerPolicy};
    use crate::error::LoadError;
    use crate::ledger::Ledger;
    use crate::ui::render::rgb;
    use std::cell::RefCell;
    use std::collections::HashSet;
    use std::path::Path;
    use std::rc::Rc;

    const W: u32 = 32;
    const H: u32 = 24;

    #[derive(Default)]
    struct FakeSource {
        catalog: RefCell<Vec<ImageRef>>,
        broken: RefCell<HashSet<PathBuf>>,
        colors: RefCell<HashMap<PathBuf, [u8; 4]>>,
        loads: RefCell<Vec<PathBuf>>,
    }

    impl FakeSource {
        fn with(names: &[&str]) -> Rc<Self> {
            let source = Rc::new(FakeSource::default());
            for name in names {
                source.add(name);
            }
            source
        }

        fn add(&self, name: &str) {
            let mut catalog = self.catalog.borrow_mut();
            let secs = catalog.len() as u64 + 1;
            catalog.push(ImageRef {
                path: PathBuf::from(name),
                modified: SystemTime::UNIX_EPOCH + Duration::from_secs(secs),
            });
        }

        fn loaded(&self) -> Vec<String> {
            self.loads
                .borrow()
                .iter()
                .map(|p| p.to_string_lossy().into_owned())
                .collect()
        }
    }

    impl ImageSource for Rc<FakeSource> {
        fn scan(&self) -> Vec<ImageRef> {
            self.catalog.borrow().clone()
        }

        fn load(&self, path: &Path, max_w: u32, max_h: u32) -> Result<DecodedImage, LoadError> {
            self.loads.borrow_mut().push(path.to_path_buf());
            if self.broken.borrow().contains(path) {
                return Err(LoadError::Empty {
                    path: path.to_path_buf(),
                });
            }
            let color = self
                .colors
                .borrow()
                .get(path)
                .copied()
                .unwrap_or([255, 255, 255, 255]);
            Ok(DecodedImage::solid(max_w, max_h, color))
        }
    }

    fn config(f: impl FnOnce(&mut Config)) -> Arc<Config> {
        let mut config = Config {
            poll_interval: Duration::from_secs(3),
            transition_duration: Duration::from_secs(2),
            effect: EffectChoice::Fade,
            ledger_policy: LedgerPolicy::Ignore,
            seed: Some(7),
            ..Config::default()
        };
        f(&mut config);
        Arc::new(config)
    }

    fn session() -> History {
        History::Session(HashSet::new())
    }

    struct Harness {
        player: Player<Rc<FakeSource>>,
        buf: Vec<u32>,
        t0: Instant,
    }

    impl Harness {
        fn new(config: Arc<Config>, source: &Rc<FakeSource>, history: History) -> Self {
            Self {
                player: Player::new(config, Rc::clone(source), history),
                buf: vec![0; (W * H) as usize],
                t0: Instant::now(),
            }
        }

        fn at(&mut self, millis: u64) -> PlaybackState {
            let mut canvas = Canvas::new(&mut self.buf, W, H);
            self.player
                .frame(&mut canvas, self.t0 + Duration::from_millis(millis));
            self.player.state()
        }
    }

    #[test]
    fn waits_idle_with_empty_catalog() {
        let source = FakeSource::with(&[]);
        let mut h = Harness::new(config(|_| {}), &source, session());
        assert_eq!(h.at(0), PlaybackState::Idle);
        assert_eq!(h.at(5_000), PlaybackState::Idle);
        // The waiting text is visible.
        assert!(h.buf.iter().any(|&p| p != BG_COLOR));
        assert!(h.player.current.is_none());
    }

    #[test]
    fn waiting_text_without_idle_background() {
        let source = FakeSource::with(&[]);
        let mut h = Harness::new(config(|c| c.idle_background = false), &source, session());
        h.at(0);
        let lit = h.buf.iter().filter(|&&p| p != BG_COLOR).count();
        assert!(lit > 0);
        assert!(h.buf.iter().all(|&p| p == BG_COLOR || p == rgb(200, 200, 200)));
    }

    #[test]
    fn first_poll_transitions_then_shows() {
        let source = FakeSource::with(&["a.png"]);
        let mut h = Harness::new(config(|_| {}), &source, session());

        assert_eq!(h.at(0), PlaybackState::Transitioning);
        assert_eq!(h.at(1_000), PlaybackState::Transitioning);
        assert_eq!(h.at(2_000), PlaybackState::Showing);
        assert!(h.player.current.is_some());
        // Nothing new: stays on a.
        assert_eq!(h.at(9_000), PlaybackState::Showing);
        assert_eq!(source.loaded(), vec!["a.png"]);
    }

    #[test]
    fn fade_midpoint_alphas() {
        let source = FakeSource::with(&["a.png"]);
        source
            .colors
            .borrow_mut()
            .insert(PathBuf::from("a.png"), [255, 0, 0, 255]);
        source
            .colors
            .borrow_mut()
            .insert(PathBuf::from("b.png"), [0, 0, 255, 255]);
        let mut h = Harness::new(config(|_| {}), &source, session());

        h.at(0);
        assert_eq!(h.at(2_000), PlaybackState::Showing);
        assert_eq!(h.buf[0], rgb(255, 0, 0));

        source.add("b.png");
        assert_eq!(h.at(3_000), PlaybackState::Transitioning);
        h.at(4_000);
        // current at 127/255 over black, next at 128/255 over that
        assert_eq!(h.buf[0], rgb(63, 0, 128));
        assert_eq!(h.at(5_000), PlaybackState::Showing);
        assert_eq!(h.buf[0], rgb(0, 0, 255));
    }

    #[test]
    fn zero_duration_is_a_cut() {
        let source = FakeSource::with(&["a.png"]);
        let mut h = Harness::new(
            config(|c| c.transition_duration = Duration::ZERO),
            &source,
            session(),
        );
        assert_eq!(h.at(0), PlaybackState::Showing);
        assert_eq!(h.buf[0], rgb(255, 255, 255));
    }

    #[test]
    fn polls_wait_for_running_transition() {
        let source = FakeSource::with(&["a.png"]);
        let mut h = Harness::new(
            config(|c| c.transition_duration = Duration::from_secs(10)),
            &source,
            session(),
        );

        h.at(0);
        source.add("b.png");
        assert_eq!(h.at(3_000), PlaybackState::Transitioning);
        assert_eq!(h.at(6_000), PlaybackState::Transitioning);
        assert_eq!(source.loaded(), vec!["a.png"]);

        assert_eq!(h.at(10_000), PlaybackState::Showing);
        // The overdue poll fires on the next frame.
        assert_eq!(h.at(10_016), PlaybackState::Transitioning);
        assert_eq!(source.loaded(), vec!["a.png", "b.png"]);
    }

    #[test]
    fn resume_never_repeats_ledger_entries() {
        let dir = tempfile::tempdir().unwrap();
        let ledger_path = dir.path().join("ledger.csv");
        let mut seed = Ledger::new(&ledger_path);
        seed.record(Path::new("b.png")).unwrap();
        seed.record(Path::new("d.png")).unwrap();

        let source = FakeSource::with(&["a.png", "b.png", "c.png", "d.png", "e.png"]);
        let history = History::open(LedgerPolicy::Resume, &ledger_path, false, &source.scan());
        let mut h = Harness::new(
            config(|c| {
                c.ledger_policy = LedgerPolicy::Resume;
                c.transition_duration = Duration::ZERO;
            }),
            &source,
            history,
        );

        for poll in 0..8 {
            h.at(poll * 3_000);
        }
        assert_eq!(source.loaded(), vec!["a.png", "c.png", "e.png"]);

        // Everything shown went to the ledger before it was displayed.
        let mut reloaded = Ledger::new(&ledger_path);
        reloaded.load();
        assert_eq!(reloaded.len(), 5);
    }

    #[test]
    fn keep_newest_one_offers_it_on_first_poll() {
        let dir = tempfile::tempdir().unwrap();
        let source = FakeSource::with(&["a.png", "b.png", "c.png"]);
        let history = History::open(
            LedgerPolicy::MarkAllExceptNewest(1),
            &dir.path().join("ledger.csv"),
            false,
            &source.scan(),
        );
        let mut h = Harness::new(
            config(|c| c.ledger_policy = LedgerPolicy::MarkAllExceptNewest(1)),
            &source,
            history,
        );

        assert_eq!(h.at(0), PlaybackState::Transitioning);
        assert_eq!(h.at(2_000), PlaybackState::Showing);
        assert_eq!(h.at(3_000), PlaybackState::Showing);
        assert_eq!(source.loaded(), vec!["c.png"]);
    }

    #[test]
    fn decode_failure_skips_until_file_changes() {
        let source = FakeSource::with(&["bad.png", "good.png"]);
        source.broken.borrow_mut().insert(PathBuf::from("bad.png"));
        let mut h = Harness::new(
            config(|c| c.transition_duration = Duration::ZERO),
            &source,
            session(),
        );

        // The failure costs this poll; the next one moves on.
        assert_eq!(h.at(0), PlaybackState::Idle);
        assert_eq!(h.at(3_000), PlaybackState::Showing);
        assert_eq!(source.loaded(), vec!["bad.png", "good.png"]);

        // Unchanged, it stays skipped.
        h.at(6_000);
        assert_eq!(source.loaded().len(), 2);

        // Rewritten, it is tried again.
        source.broken.borrow_mut().clear();
        source.catalog.borrow_mut()[0].modified += Duration::from_secs(100);
        h.at(9_000);
        assert_eq!(source.loaded(), vec!["bad.png", "good.png", "bad.png"]);
    }

    #[test]
    fn loop_mode_wraps_and_plays_continuously() {
        let source = FakeSource::with(&["a.png", "b.png"]);
        let mut h = Harness::new(
            config(|c| {
                c.mode = PlaybackMode::Loop;
                c.transition_duration = Duration::from_secs(1);
            }),
            &source,
            session(),
        );

        h.at(0);
        assert_eq!(h.at(1_000), PlaybackState::Showing);
        // No poll due yet, but continuous playback moves on.
        assert_eq!(h.at(1_100), PlaybackState::Transitioning);
        h.at(2_100);
        source.add("c.png");
        h.at(2_200);
        h.at(3_200);
        h.at(3_300);
        assert_eq!(source.loaded(), vec!["a.png", "b.png", "a.png", "b.png"]);
        h.at(4_300);
        h.at(4_400);
        assert_eq!(source.loaded().last().unwrap(), "c.png");
    }

    #[test]
    fn yoyo_mode_reverses() {
        let source = FakeSource::with(&["a.png", "b.png", "c.png"]);
        let mut h = Harness::new(
            config(|c| {
                c.mode = PlaybackMode::Yoyo;
                c.transition_duration = Duration::from_millis(500);
            }),
            &source,
            session(),
        );

        let mut t = 0;
        for _ in 0..6 {
            h.at(t);
            h.at(t + 500);
            t += 600;
        }
        assert_eq!(
            source.loaded(),
            vec!["a.png", "b.png", "c.png", "b.png", "a.png", "b.png"]
        );
    }

    #[test]
    fn yoyo_with_one_image_picks_up_new_files() {
        let source = FakeSource::with(&["a.png"]);
        let mut h = Harness::new(
            config(|c| {
                c.mode = PlaybackMode::Yoyo;
                c.transition_duration = Duration::from_millis(500);
            }),
            &source,
            session(),
        );

        let mut t = 0;
        for _ in 0..3 {
            h.at(t);
            h.at(t + 500);
            t += 600;
        }
        assert_eq!(source.loaded(), vec!["a.png"; 3]);

        source.add("b.png");
        for _ in 0..3 {
            h.at(t);
            h.at(t + 500);
            t += 600;
        }
        // a is replayed once from the stale snapshot, then the walk
        // covers both files.
        assert_eq!(
            source.loaded()[3..],
            ["a.png", "b.png", "a.png"].map(String::from)
        );
    }

    #[test]
    fn ignored_transitions_dwell_for_poll_interval() {
        let source = FakeSource::with(&["a.png", "b.png"]);
        let mut h = Harness::new(
            config(|c| {
                c.mode = PlaybackMode::Loop;
                c.ignore_transition = true;
            }),
            &source,
            session(),
        );

        assert_eq!(h.at(0), PlaybackState::Showing);
        h.at(1_000);
        h.at(2_000);
        assert_eq!(source.loaded(), vec!["a.png"]);
        h.at(3_000);
        assert_eq!(source.loaded(), vec!["a.png", "b.png"]);
    }

    #[test]
    fn failed_load_pauses_continuous_playback_until_poll() {
        let source = FakeSource::with(&["a.png", "b.png", "c.png"]);
        source.broken.borrow_mut().insert(PathBuf::from("b.png"));
        let mut h = Harness::new(
            config(|c| {
                c.mode = PlaybackMode::Loop;
                c.transition_duration = Duration::from_secs(1);
            }),
            &source,
            session(),
        );

        h.at(0);
        h.at(1_000);
        h.at(1_100); // b fails
        h.at(1_200);
        h.at(2_000);
        assert_eq!(source.loaded(), vec!["a.png", "b.png"]);
        h.at(3_100);
        assert_eq!(source.loaded(), vec!["a.png", "b.png"]);
        h.at(4_100); // poll
        assert_eq!(source.loaded(), vec!["a.png", "b.png", "c.png"]);
    }

    #[test]
    fn yoyo_stays_in_bounds_and_turns_at_ends() {
        for len in 1..7 {
            let mut index = None;
            let mut forward = true;
            for _ in 0..40 {
                let (next, dir) = yoyo_step(index, forward, len);
                assert!(next < len);
                if len > 1 {
                    if next == len - 1 {
                        assert!(!dir);
                    } else if next == 0 {
                        assert!(dir);
                    } else {
                        assert_eq!(dir, forward, "turned away from an end");
                        let step = next as isize - index.unwrap() as isize;
                        assert_eq!(step, if forward { 1 } else { -1 });
                    }
                }
                index = Some(next);
                forward = dir;
            }
        }
    }

    #[test]
    fn yoyo_clamps_after_catalog_shrinks() {
        assert_eq!(yoyo_step(Some(9), true, 4), (3, false));
        assert_eq!(yoyo_step(Some(9), false, 4), (3, false));
    }

    #[test]
    fn progress_is_clamped() {
        let two = Duration::from_secs(2);
        assert_eq!(transition_progress(Duration::ZERO, two), 0.0);
        assert_eq!(transition_progress(Duration::from_secs(1), two), 0.5);
        assert_eq!(transition_progress(Duration::from_secs(5), two), 1.0);
        assert_eq!(transition_progress(Duration::ZERO, Duration::ZERO), 1.0);
    }

    #[test]
    fn release_empties_both_slots() {
        let source = FakeSource::with(&["a.png"]);
        let mut h = Harness::new(config(|_| {}), &source, session());
        h.at(0);
        h.at(2_000);
        source.add("b.png");
        h.at(3_000);
        assert_eq!(h.player.state(), PlaybackState::Transitioning);
        h.player.release();
        assert_eq!(h.player.state(), PlaybackState::Idle);
        assert!(h.player.current.is_none());
    }
}
