//! The boundary between caption engines and the playback clock that drives them.
//!
//! A clocked [`crate::Captions`] engine asks its [`Clock`] for a clip's length and to start or
//! stop playback. The clock reports back through the [`ClockEvents`] handle it receives with
//! each `play`; the engine drains those reports in [`crate::Captions::poll`]. Reports from a
//! superseded `play` are discarded.

use std::sync::mpsc;

/// An external playback clock, typically an audio player.
pub trait Clock {
    /// Length of the clip for `alias`, in seconds.
    fn length(&self, alias: &str) -> f64;

    /// Start playing the clip for `alias`, reporting progress and completion through `events`.
    fn play(&mut self, alias: &str, events: ClockEvents);

    /// Stop playback. No completion is expected afterwards.
    fn stop(&mut self);
}

/// A report from a [`Clock`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClockEvent {
    /// Playback reached `fraction` (0..=1) of the clip.
    Progress(f64),
    /// Playback ran to the end of the clip.
    Complete,
}

/// The handle a [`Clock`] uses to report to the engine that started it.
///
/// It is `Send`, so clocks running on an audio thread can report from there.
#[derive(Debug, Clone)]
pub struct ClockEvents {
    tx: mpsc::Sender<ClockEvent>,
}

impl ClockEvents {
    pub(crate) fn channel() -> (Self, mpsc::Receiver<ClockEvent>) {
        let (tx, rx) = mpsc::channel();
        (Self { tx }, rx)
    }

    /// Report progress. Returns `false` once the engine no longer listens.
    pub fn progress(&self, fraction: f64) -> bool {
        self.tx.send(ClockEvent::Progress(fraction)).is_ok()
    }

    /// Report completion. Returns `false` once the engine no longer listens.
    pub fn complete(&self) -> bool {
        self.tx.send(ClockEvent::Complete).is_ok()
    }
}
