//! High-level caption engine.
//!
//! [`Captions`] is the single entry point most hosts need. It owns:
//! - the normalized [`CaptionSet`] it plays from
//! - a [`Timeline`] for the track currently loaded
//! - an optional [`TextSink`] that receives rendered text
//! - a [`MuteGate`] handle, shared with other engines
//! - in clocked mode, the [`Clock`] that drives playback
//!
//! Rendered text is the active line's content, or empty when no line is active or the gate is
//! muted. The sink is only called when that text changes.
//!
//! Everything runs synchronously on the caller's thread. After [`Captions::destroy`] every
//! operation is a silent no-op.

use std::sync::mpsc;

use tracing::{debug, trace};

use crate::caption_set::CaptionSet;
use crate::clock::{Clock, ClockEvent, ClockEvents};
use crate::line::Line;
use crate::mute::MuteGate;
use crate::opts::Opts;
use crate::text_sink::TextSink;
use crate::timeline::Timeline;
use crate::{Error, Result};

type CompleteCallback = Box<dyn FnOnce()>;

pub struct Captions {
    opts: Opts,
    captions: Option<CaptionSet>,
    timeline: Timeline,
    duration_ms: u64,

    sink: Option<Box<dyn TextSink>>,
    // What the sink currently shows.
    rendered: String,
    mute: MuteGate,

    clock: Option<Box<dyn Clock>>,
    events: Option<mpsc::Receiver<ClockEvent>>,
    on_complete: Option<CompleteCallback>,
    playing: bool,
    destroyed: bool,
}

impl Captions {
    /// Create an engine over `captions`.
    ///
    /// Clocked engines (the default) need a clock and fail with [`Error::ClockUnavailable`]
    /// without one. Slave engines never touch a clock, so any clock given is dropped.
    ///
    /// The engine uses [`MuteGate::global`] until another gate is injected with
    /// [`Captions::with_mute_gate`].
    pub fn new(captions: CaptionSet, opts: Opts, clock: Option<Box<dyn Clock>>) -> Result<Self> {
        let clock = match (opts.slave, clock) {
            (true, Some(_)) => {
                debug!("slave captions ignore the supplied clock");
                None
            }
            (true, None) => None,
            (false, Some(clock)) => Some(clock),
            (false, None) => return Err(Error::ClockUnavailable),
        };

        Ok(Self::build(captions, opts, clock))
    }

    /// A slave engine, driven entirely by the host.
    pub fn slave(captions: CaptionSet) -> Self {
        Self::build(captions, Opts::slave(), None)
    }

    /// A clocked engine driven by `clock`.
    pub fn with_clock(captions: CaptionSet, clock: impl Clock + 'static) -> Self {
        Self::build(captions, Opts::default(), Some(Box::new(clock)))
    }

    fn build(captions: CaptionSet, opts: Opts, clock: Option<Box<dyn Clock>>) -> Self {
        Self {
            opts,
            captions: Some(captions),
            timeline: Timeline::new(),
            duration_ms: 0,
            sink: None,
            rendered: String::new(),
            mute: MuteGate::global(),
            clock,
            events: None,
            on_complete: None,
            playing: false,
            destroyed: false,
        }
    }

    /// Use `gate` instead of the process-wide mute gate.
    pub fn with_mute_gate(mut self, gate: MuteGate) -> Self {
        self.mute = gate;
        self
    }

    /// Render into `sink`.
    pub fn with_sink(mut self, sink: impl TextSink + 'static) -> Self {
        self.set_sink(Some(Box::new(sink)));
        self
    }

    /// Replace the sink.
    ///
    /// The previous sink is cleared; the new one immediately receives the current text.
    pub fn set_sink(&mut self, sink: Option<Box<dyn TextSink>>) {
        if self.destroyed {
            return;
        }
        if let Some(old) = self.sink.as_mut() {
            old.set_text("");
        }
        self.sink = sink;
        if let Some(new) = self.sink.as_mut() {
            new.set_text(&self.rendered);
        }
    }

    /// Whether the set has a track for `alias`.
    pub fn has_caption(&self, alias: &str) -> bool {
        self.captions
            .as_ref()
            .is_some_and(|captions| captions.contains(alias))
    }

    /// Load `alias` and start playing it from the beginning.
    ///
    /// Clocked engines resolve the duration from the clock and start it; progress then arrives
    /// through [`Captions::poll`]. Slave engines take the track's extent as the duration and
    /// wait for [`Captions::advance`] or [`Captions::update_progress`]. An alias without captions
    /// plays with blank text.
    pub fn play(&mut self, alias: &str) {
        self.start(alias, None);
    }

    /// Like [`Captions::play`], then call `on_complete` once the clock reports the end of the
    /// clip. A [`Captions::stop`] beforehand cancels the call.
    pub fn play_then(&mut self, alias: &str, on_complete: impl FnOnce() + 'static) {
        self.start(alias, Some(Box::new(on_complete)));
    }

    /// Load `alias` positioned at 0 without starting the clock.
    ///
    /// The host drives the engine afterwards, usually with [`Captions::update_progress`].
    pub fn run(&mut self, alias: &str) {
        if self.destroyed {
            return;
        }
        self.on_complete = None;
        self.load(alias);
        self.duration_ms = self.resolve_duration(alias);
        self.seek(0);
    }

    fn start(&mut self, alias: &str, on_complete: Option<CompleteCallback>) {
        if self.destroyed {
            return;
        }
        self.on_complete = on_complete;
        self.load(alias);
        self.duration_ms = self.resolve_duration(alias);

        if let Some(clock) = self.clock.as_mut() {
            let (events, rx) = ClockEvents::channel();
            self.events = Some(rx);
            self.playing = true;
            clock.play(alias, events);
        }

        debug!(alias, duration_ms = self.duration_ms, "playing captions");
        self.seek(0);
    }

    fn load(&mut self, alias: &str) {
        let lines = self
            .captions
            .as_ref()
            .and_then(|captions| captions.get(alias))
            .map(<[Line]>::to_vec);
        if lines.is_none() {
            debug!(alias, "no captions for alias");
        }
        self.timeline.load(lines);
    }

    fn resolve_duration(&self, alias: &str) -> u64 {
        match self.clock.as_ref() {
            Some(clock) => seconds_to_millis(clock.length(alias)),
            None => self.timeline.end_ms().unwrap_or(0),
        }
    }

    /// Stop playback and blank the text.
    ///
    /// Stops the clock if this engine started it, unloads the track, and drops any pending
    /// completion callback without calling it.
    pub fn stop(&mut self) {
        if self.destroyed {
            return;
        }
        if self.playing {
            if let Some(clock) = self.clock.as_mut() {
                clock.stop();
            }
            self.playing = false;
        }
        self.events = None;
        self.on_complete = None;
        self.timeline.clear();
        self.refresh();
        debug!("captions stopped");
    }

    /// Jump to `time_ms`, forwards or backwards.
    pub fn seek(&mut self, time_ms: u64) {
        if self.destroyed {
            return;
        }
        self.timeline.seek(time_ms);
        self.refresh();
    }

    /// Move forward by `elapsed_ms` of externally measured time. Slave mode only.
    pub fn advance(&mut self, elapsed_ms: u64) -> Result<()> {
        if self.destroyed {
            return Ok(());
        }
        if !self.opts.slave {
            return Err(Error::RequiresSlaveMode("advance"));
        }
        if self.timeline.advance(elapsed_ms) {
            self.refresh();
        }
        Ok(())
    }

    /// Move forward to `fraction` (clamped to 0..=1) of the current duration.
    pub fn update_progress(&mut self, fraction: f64) {
        if self.destroyed {
            return;
        }
        let time_ms = (fraction.clamp(0.0, 1.0) * self.duration_ms as f64).round() as u64;
        if self.timeline.set_time(time_ms) {
            self.refresh();
        }
    }

    /// Apply every report the clock has made since the last poll. Clocked mode only.
    ///
    /// Progress moves the timeline; completion stops the engine and then calls the callback
    /// given to [`Captions::play_then`].
    pub fn poll(&mut self) -> Result<()> {
        if self.destroyed {
            return Ok(());
        }
        if self.opts.slave {
            return Err(Error::RequiresClockMode("poll"));
        }

        loop {
            let Some(rx) = self.events.as_ref() else {
                return Ok(());
            };
            match rx.try_recv() {
                Ok(ClockEvent::Progress(fraction)) => self.update_progress(fraction),
                Ok(ClockEvent::Complete) => self.complete(),
                Err(_) => return Ok(()),
            }
        }
    }

    fn complete(&mut self) {
        let callback = self.on_complete.take();
        debug!("captions complete");
        self.stop();
        if let Some(callback) = callback {
            callback();
        }
    }

    /// Mute or unmute the shared gate and re-render this engine right away.
    ///
    /// Other engines sharing the gate pick the change up on their next render. A destroyed
    /// engine leaves the gate alone.
    pub fn set_muted(&mut self, muted: bool) {
        if self.destroyed {
            return;
        }
        self.mute.set(muted);
        self.refresh();
    }

    pub fn is_muted(&self) -> bool {
        self.mute.is_muted()
    }

    /// Release everything. Idempotent and irreversible.
    ///
    /// A clock this engine started is stopped; no completion callback runs. The sink is
    /// released as-is.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.destroyed = true;
        if self.playing {
            if let Some(clock) = self.clock.as_mut() {
                clock.stop();
            }
            self.playing = false;
        }
        self.events = None;
        self.on_complete = None;
        self.clock = None;
        self.captions = None;
        self.timeline.clear();
        self.sink = None;
        debug!("captions destroyed");
    }

    fn refresh(&mut self) {
        let text = match self.timeline.active_line() {
            Some(line) if !self.mute.is_muted() => line.content.as_str(),
            _ => "",
        };
        if text == self.rendered {
            return;
        }

        trace!(
            line = ?self.timeline.current_line(),
            time_ms = self.timeline.current_time(),
            "caption text changed"
        );
        self.rendered = text.to_owned();
        if let Some(sink) = self.sink.as_mut() {
            sink.set_text(&self.rendered);
        }
    }

    /// Whether this engine owns active clock-driven playback.
    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Duration of the current track in milliseconds.
    pub fn current_duration(&self) -> u64 {
        self.duration_ms
    }

    pub fn current_time(&self) -> u64 {
        self.timeline.current_time()
    }

    /// Index of the active line, if any.
    pub fn current_line(&self) -> Option<usize> {
        self.timeline.current_line()
    }

    pub fn last_active_line(&self) -> Option<usize> {
        self.timeline.last_active_line()
    }

    /// The text currently rendered.
    pub fn text(&self) -> &str {
        &self.rendered
    }
}

fn seconds_to_millis(seconds: f64) -> u64 {
    if seconds.is_finite() && seconds > 0.0 {
        (seconds * 1000.0).round() as u64
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text_sink::RecordingSink;

    fn hi_bye() -> CaptionSet {
        let mut set = CaptionSet::new();
        set.insert(
            "vo",
            vec![Line::new(0, 1000, "Hi"), Line::new(1500, 2500, "Bye")],
        );
        set
    }

    fn slave() -> (Captions, RecordingSink) {
        let sink = RecordingSink::new();
        let captions = Captions::slave(hi_bye())
            .with_mute_gate(MuteGate::new())
            .with_sink(sink.clone());
        (captions, sink)
    }

    #[test]
    fn clocked_engine_without_clock_is_rejected() {
        let res = Captions::new(hi_bye(), Opts::default(), None);
        assert!(matches!(res, Err(Error::ClockUnavailable)));
    }

    #[test]
    fn slave_duration_is_the_track_extent() {
        let (mut captions, _) = slave();
        captions.play("vo");
        assert_eq!(captions.current_duration(), 2500);
        assert!(!captions.is_playing());
        assert_eq!(captions.text(), "Hi");
    }

    #[test]
    fn sink_only_hears_about_changes() -> anyhow::Result<()> {
        let (mut captions, sink) = slave();
        captions.play("vo");
        captions.advance(100)?;
        captions.seek(200);
        captions.seek(200);
        captions.advance(1000)?;
        captions.advance(500)?;

        // Initial blank on attach, then the changes.
        assert_eq!(sink.history(), vec!["", "Hi", "", "Bye"]);
        Ok(())
    }

    #[test]
    fn advance_is_slave_only() {
        struct Silent;
        impl Clock for Silent {
            fn length(&self, _: &str) -> f64 {
                1.0
            }
            fn play(&mut self, _: &str, _: ClockEvents) {}
            fn stop(&mut self) {}
        }

        let mut captions = Captions::with_clock(hi_bye(), Silent);
        assert!(matches!(
            captions.advance(10),
            Err(Error::RequiresSlaveMode("advance"))
        ));
    }

    #[test]
    fn poll_is_clock_only() {
        let (mut captions, _) = slave();
        assert!(matches!(
            captions.poll(),
            Err(Error::RequiresClockMode("poll"))
        ));
    }

    #[test]
    fn swapping_sinks_blanks_the_old_one() {
        let (mut captions, old) = slave();
        captions.play("vo");

        let new = RecordingSink::new();
        captions.set_sink(Some(Box::new(new.clone())));

        assert_eq!(old.text(), "");
        assert_eq!(new.history(), vec!["Hi"]);
    }

    #[test]
    fn seconds_convert_to_whole_milliseconds() {
        assert_eq!(seconds_to_millis(2.5), 2500);
        assert_eq!(seconds_to_millis(0.0004), 0);
        assert_eq!(seconds_to_millis(-1.0), 0);
        assert_eq!(seconds_to_millis(f64::NAN), 0);
    }
}
