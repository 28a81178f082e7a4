// Test support utilities for both unit and integration tests

use crate::playback::{MediaElement, PlaybackBlocked};
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct FakeElementInner {
    position_ms: u64,
    duration_ms: Option<u64>,
    paused: bool,
    source: Option<String>,
    seeks: Vec<u64>,
    loads: usize,
    plays: usize,
    pauses: usize,
    block_play: bool,
}

/// Fake media element for testing
///
/// Records every mutation the reconciler performs so tests can assert on
/// them through the paired [`FakeElementProbe`]. No audio is involved.
pub struct FakeMediaElement {
    inner: Arc<Mutex<FakeElementInner>>,
}

/// Observer/controller side of a [`FakeMediaElement`].
///
/// Lets a test script the element (position, duration, autoplay refusal)
/// while the session owns the element itself.
#[derive(Clone)]
pub struct FakeElementProbe {
    inner: Arc<Mutex<FakeElementInner>>,
}

impl FakeMediaElement {
    pub fn new() -> (Self, FakeElementProbe) {
        let inner = Arc::new(Mutex::new(FakeElementInner {
            paused: true,
            ..Default::default()
        }));
        (
            Self {
                inner: inner.clone(),
            },
            FakeElementProbe { inner },
        )
    }
}

impl MediaElement for FakeMediaElement {
    fn position_ms(&self) -> u64 {
        self.inner.lock().unwrap().position_ms
    }

    fn duration_ms(&self) -> Option<u64> {
        self.inner.lock().unwrap().duration_ms
    }

    fn is_paused(&self) -> bool {
        self.inner.lock().unwrap().paused
    }

    fn set_source(&mut self, url: &str) {
        self.inner.lock().unwrap().source = Some(url.to_string());
    }

    fn load(&mut self) {
        self.inner.lock().unwrap().loads += 1;
    }

    fn seek_ms(&mut self, position_ms: u64) {
        let mut inner = self.inner.lock().unwrap();
        inner.seeks.push(position_ms);
        inner.position_ms = position_ms;
    }

    fn play(&mut self) -> Result<(), PlaybackBlocked> {
        let mut inner = self.inner.lock().unwrap();
        if inner.block_play {
            return Err(PlaybackBlocked("user gesture required".into()));
        }
        inner.plays += 1;
        inner.paused = false;
        Ok(())
    }

    fn pause(&mut self) {
        let mut inner = self.inner.lock().unwrap();
        inner.pauses += 1;
        inner.paused = true;
    }
}

impl FakeElementProbe {
    pub fn is_paused(&self) -> bool {
        self.inner.lock().unwrap().paused
    }

    pub fn source(&self) -> Option<String> {
        self.inner.lock().unwrap().source.clone()
    }

    pub fn seeks(&self) -> Vec<u64> {
        self.inner.lock().unwrap().seeks.clone()
    }

    pub fn loads(&self) -> usize {
        self.inner.lock().unwrap().loads
    }

    pub fn plays(&self) -> usize {
        self.inner.lock().unwrap().plays
    }

    pub fn pauses(&self) -> usize {
        self.inner.lock().unwrap().pauses
    }

    /// Simulate the element advancing or the user scrubbing.
    pub fn set_position_ms(&self, position_ms: u64) {
        self.inner.lock().unwrap().position_ms = position_ms;
    }

    /// Simulate metadata becoming available.
    pub fn set_duration_ms(&self, duration_ms: u64) {
        self.inner.lock().unwrap().duration_ms = Some(duration_ms);
    }

    /// Make subsequent `play()` calls fail like a blocked autoplay.
    pub fn block_play(&self, blocked: bool) {
        self.inner.lock().unwrap().block_play = blocked;
    }
}
