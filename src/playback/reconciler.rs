use crate::models::{PlayerStateSnapshot, PlayerStatus};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::debug;

/// Raised by a media element that refuses to start playback,
/// e.g. an autoplay policy waiting for a user gesture.
#[derive(Debug, Error)]
#[error("playback blocked: {0}")]
pub struct PlaybackBlocked(pub String);

/// Minimal surface of a local audio element as seen by the reconciler.
///
/// The reconciler never talks to a concrete audio backend; the session
/// wires in whatever element drives actual output (or a fake in tests).
pub trait MediaElement {
    /// Current playback position.
    fn position_ms(&self) -> u64;
    /// Media duration, once known. `None` before metadata is loaded.
    fn duration_ms(&self) -> Option<u64>;
    fn is_paused(&self) -> bool;
    /// Point the element at a new source URL.
    fn set_source(&mut self, url: &str);
    /// Begin loading the current source.
    fn load(&mut self);
    /// Seek to an absolute position. Only defined once metadata is loaded.
    fn seek_ms(&mut self, position_ms: u64);
    /// Start playback. May be refused by the element; the refusal is
    /// swallowed and playback stays paused until a user gesture.
    fn play(&mut self) -> Result<(), PlaybackBlocked>;
    fn pause(&mut self);
}

/// Per-track lifecycle. `Loading -> Ready` happens on can-play; the
/// pending seek is consumed on metadata-loaded, which can fire on either
/// side of can-play.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackPhase {
    NoTrack,
    Loading,
    Ready,
}

/// Tunables for the reconciler.
#[derive(Debug, Clone)]
pub struct ReconcilerConfig {
    /// Drift beyond this forces a seek; anything under it is left alone
    /// to avoid constant micro-seeking.
    pub seek_tolerance_ms: u64,
    /// How long backend-reported play/pause is suppressed after a local
    /// user action, so the next poll can't undo what the user just did.
    pub action_grace: Duration,
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            seek_tolerance_ms: 500,
            action_grace: Duration::from_millis(400),
        }
    }
}

/// Keeps a local [`MediaElement`] consistent with polled backend
/// snapshots: applies track changes, corrects drift past a tolerance,
/// and matches play/pause state outside the user-action grace window.
///
/// One instance per room view session. All methods take `now` explicitly
/// so tests control the clock.
pub struct Reconciler {
    config: ReconcilerConfig,
    phase: TrackPhase,
    last_applied_url: Option<String>,
    last_snapshot: Option<PlayerStateSnapshot>,
    /// Anchor instant for extrapolation. Refreshed when a snapshot with
    /// new content arrives; kept when the backend re-sends stale values.
    snapshot_received_at: Option<Instant>,
    ignore_backend_until: Option<Instant>,
    pending_seek_ms: Option<u64>,
    pending_autoplay: bool,
    /// True once a timeupdate arrived for the current track, i.e. the
    /// element is producing steady readings.
    has_live_reading: bool,
    display_position_ms: u64,
    display_duration_ms: u64,
}

impl Reconciler {
    pub fn new(config: ReconcilerConfig) -> Self {
        Self {
            config,
            phase: TrackPhase::NoTrack,
            last_applied_url: None,
            last_snapshot: None,
            snapshot_received_at: None,
            ignore_backend_until: None,
            pending_seek_ms: None,
            pending_autoplay: false,
            has_live_reading: false,
            display_position_ms: 0,
            display_duration_ms: 0,
        }
    }

    pub fn phase(&self) -> TrackPhase {
        self.phase
    }

    /// Title of the backend's current track, once a snapshot carried one.
    pub fn current_title(&self) -> Option<&str> {
        self.last_snapshot
            .as_ref()
            .and_then(|s| s.current_title.as_deref())
    }

    pub fn current_url(&self) -> Option<&str> {
        self.last_snapshot
            .as_ref()
            .and_then(|s| s.current_url.as_deref())
    }

    pub fn display_duration_ms(&self) -> u64 {
        self.display_duration_ms
    }

    /// Position to display at `now`.
    ///
    /// Live element readings win while playback is steady; before the
    /// first timeupdate of a PLAYING track the position is extrapolated
    /// from the snapshot anchor instead.
    pub fn display_position_ms(&self, now: Instant) -> u64 {
        if !self.has_live_reading {
            if let Some(snapshot) = &self.last_snapshot {
                if snapshot.status.is_playing() {
                    return self.target_position_ms(snapshot, now);
                }
            }
        }
        self.display_position_ms
    }

    /// Open the grace window: backend play/pause state is ignored until
    /// it closes. Called when the user hits play or pause locally.
    pub fn note_user_action(&mut self, now: Instant) {
        self.ignore_backend_until = Some(now + self.config.action_grace);
    }

    /// Forget displayed progress, e.g. when the user skips ahead and the
    /// old track's numbers would linger until the next poll.
    pub fn reset_display(&mut self) {
        self.display_position_ms = 0;
        self.display_duration_ms = 0;
    }

    /// Extrapolated authoritative position at `now`: the snapshot value
    /// plus wall-clock time since its anchor while PLAYING, the raw value
    /// otherwise. Never negative.
    fn target_position_ms(&self, snapshot: &PlayerStateSnapshot, now: Instant) -> u64 {
        if !snapshot.status.is_playing() {
            return snapshot.position_ms;
        }
        let elapsed = self
            .snapshot_received_at
            .map(|at| now.saturating_duration_since(at))
            .unwrap_or(Duration::ZERO);
        snapshot.position_ms.saturating_add(elapsed.as_millis() as u64)
    }

    /// Apply one polled snapshot to the element.
    ///
    /// Ordering matters: track change / drift correction first, then the
    /// play-pause match, which is skipped inside the grace window or
    /// while an autoplay is pending.
    pub fn apply_snapshot<E: MediaElement>(
        &mut self,
        element: &mut E,
        snapshot: &PlayerStateSnapshot,
        now: Instant,
    ) {
        // A byte-identical re-poll means the backend hasn't produced a new
        // reading; keep the old anchor so extrapolation keeps advancing
        // instead of yanking the position back to a stale value.
        let unchanged = self.last_snapshot.as_ref() == Some(snapshot);
        if !unchanged || self.snapshot_received_at.is_none() {
            self.snapshot_received_at = Some(now);
        }
        self.last_snapshot = Some(snapshot.clone());

        if snapshot.duration_ms > 0 && self.display_duration_ms == 0 {
            self.display_duration_ms = snapshot.duration_ms;
        }

        let target_ms = self.target_position_ms(snapshot, now);

        match snapshot.current_url.as_deref() {
            Some(url) if self.last_applied_url.as_deref() != Some(url) => {
                debug!("track change -> {}", url);
                self.last_applied_url = Some(url.to_string());

                // Seeking before metadata is loaded is undefined on most
                // media elements; park the target until metadata arrives.
                element.pause();
                element.set_source(url);
                self.pending_seek_ms = Some(target_ms);
                self.pending_autoplay = snapshot.status.is_playing();
                self.phase = TrackPhase::Loading;
                self.has_live_reading = false;
                element.load();

                self.display_position_ms = target_ms;
                self.display_duration_ms = 0;
            }
            Some(_) if self.pending_seek_ms.is_some() => {
                // Metadata for this track hasn't arrived yet; refresh the
                // parked target rather than seeking an unloaded element.
                self.pending_seek_ms = Some(target_ms);
                self.display_position_ms = target_ms;
            }
            Some(_) => {
                let current_ms = element.position_ms();
                if current_ms.abs_diff(target_ms) > self.config.seek_tolerance_ms {
                    debug!(
                        "drift {}ms exceeds tolerance, seeking to {}ms",
                        current_ms.abs_diff(target_ms),
                        target_ms
                    );
                    element.seek_ms(target_ms);
                    self.display_position_ms = target_ms;
                }
            }
            None => {}
        }

        if let Some(deadline) = self.ignore_backend_until {
            if now < deadline {
                return;
            }
        }

        // Autoplay is about to start this track; applying PAUSED from a
        // stale snapshot here would cancel it.
        if self.pending_autoplay {
            return;
        }

        match snapshot.status {
            PlayerStatus::Playing => {
                if element.is_paused() {
                    if let Err(err) = element.play() {
                        debug!("play refused: {}", err);
                    }
                }
            }
            PlayerStatus::Paused | PlayerStatus::Stopped => {
                if !element.is_paused() {
                    element.pause();
                }
            }
        }
    }

    /// The element produced a steady position reading.
    pub fn on_time_update<E: MediaElement>(&mut self, element: &E) {
        self.has_live_reading = true;
        self.display_position_ms = element.position_ms();
        if let Some(duration) = element.duration_ms() {
            if duration > 0 {
                self.display_duration_ms = duration;
            }
        }
    }

    /// Metadata for the current source is available: the pending seek can
    /// now be applied. Consumed at most once per track load.
    pub fn on_metadata_loaded<E: MediaElement>(&mut self, element: &mut E) {
        if let Some(duration) = element.duration_ms() {
            if duration > 0 {
                self.display_duration_ms = duration;
            }
        }

        if let Some(seek_ms) = self.pending_seek_ms.take() {
            element.seek_ms(seek_ms);
            self.display_position_ms = seek_ms;
        }
    }

    /// The element can start producing audio: consume the pending
    /// autoplay (at most once per track load) and leave `Loading`.
    pub fn on_can_play<E: MediaElement>(&mut self, element: &mut E) {
        if self.phase == TrackPhase::Loading {
            self.phase = TrackPhase::Ready;
        }

        if self.pending_autoplay {
            self.pending_autoplay = false;
            if let Err(err) = element.play() {
                debug!("autoplay refused: {}", err);
            }
        }
    }
}
