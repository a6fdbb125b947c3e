//! `captions`: timed text locked to a playback clock.
//!
//! This crate provides:
//! - Timecode parsing and normalization of caption sources into a `CaptionSet`
//! - A timeline state machine that tracks the active line across playback and seeks
//! - `Captions`, an engine that drives a text sink from a clock (or from the host, in slave mode)
//! - A shared mute gate that blanks captions without disturbing timing
//!
//! Loading caption files, decoding audio and drawing text are left to the host; the engine meets
//! them at the `Clock` and `TextSink` traits.

mod error;

// High-level API (most consumers should start here).
pub mod captions;
pub mod opts;

// Caption data and normalization.
pub mod caption_set;
pub mod line;
pub mod timecode;

// The core state machine.
pub mod timeline;

// Collaborator boundaries and shared state.
pub mod clock;
pub mod mute;
pub mod text_sink;

// Logging configuration.
#[cfg(feature = "logging")]
pub mod logging;

pub use caption_set::{
    CaptionSet, RawCaptionSet, RawEntry, RawItem, RawLine, TimeValue, normalize, normalize_json,
};
pub use captions::Captions;
pub use clock::{Clock, ClockEvent, ClockEvents};
pub use error::{Error, Result};
pub use line::Line;
pub use mute::MuteGate;
pub use opts::Opts;
pub use text_sink::{RecordingSink, TextSink, WriterSink};
pub use timecode::parse_timecode;
pub use timeline::Timeline;
