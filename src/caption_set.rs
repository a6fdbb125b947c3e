//! Caption source model and normalization into a [`CaptionSet`].
//!
//! A caption source maps each alias to its lines, either as a bare list or as a record carrying a
//! `lines` field. Line bounds may be integer milliseconds, numeric strings, or `H+:MM:SS.mmm`
//! timecodes.
//!
//! Normalization never fails on bad data. Instead it logs a warning and leaves the offending
//! piece out:
//! - an alias whose lines can't be resolved is absent from the set
//! - a line whose bounds can't be parsed is dropped from its track
//! - a track whose lines are out of order or overlap is dropped whole
//!
//! The caller's source is left untouched; the result is a new, owned set.

use std::collections::BTreeMap;

use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::Result;
use crate::line::Line;
use crate::timecode::parse_timecode;

/// A caption source as authored, before normalization.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct RawCaptionSet {
    pub entries: BTreeMap<String, RawEntry>,
}

/// The value stored under one alias in a caption source.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawEntry {
    /// A bare list of lines.
    Lines(Vec<RawItem>),

    /// A record carrying its lines in a `lines` field. Other fields are ignored.
    Record {
        #[serde(default)]
        lines: Option<Vec<RawItem>>,
    },

    /// Anything else; the alias has no resolvable lines.
    Unresolvable(IgnoredAny),
}

/// One element of a track's line list.
///
/// Elements that aren't well-formed lines are kept as raw JSON so normalization can drop them
/// one by one instead of losing the whole track.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawItem {
    Line(RawLine),
    Malformed(serde_json::Value),
}

/// A line as authored.
#[derive(Debug, Clone, Deserialize)]
pub struct RawLine {
    pub start: TimeValue,
    pub end: TimeValue,
    pub content: String,
}

/// A line bound as authored.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum TimeValue {
    Millis(u64),
    Number(f64),
    Text(String),
}

impl TimeValue {
    /// Resolve to milliseconds, or `None` if the value isn't a usable time.
    pub fn to_millis(&self) -> Option<u64> {
        match self {
            TimeValue::Millis(ms) => Some(*ms),
            TimeValue::Number(n) if n.is_finite() && *n >= 0.0 => Some(n.round() as u64),
            TimeValue::Number(_) => None,
            TimeValue::Text(s) => parse_timecode(s),
        }
    }
}

impl From<u64> for TimeValue {
    fn from(ms: u64) -> Self {
        TimeValue::Millis(ms)
    }
}

impl From<&str> for TimeValue {
    fn from(s: &str) -> Self {
        TimeValue::Text(s.to_owned())
    }
}

impl From<RawLine> for RawItem {
    fn from(line: RawLine) -> Self {
        RawItem::Line(line)
    }
}

impl RawEntry {
    fn lines(&self) -> Option<&[RawItem]> {
        match self {
            RawEntry::Lines(lines) => Some(lines.as_slice()),
            RawEntry::Record { lines } => lines.as_deref(),
            RawEntry::Unresolvable(_) => None,
        }
    }
}

impl RawLine {
    pub fn new(
        start: impl Into<TimeValue>,
        end: impl Into<TimeValue>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
            content: content.into(),
        }
    }
}

/// Normalized captions: each alias mapped to its ordered, non-overlapping lines.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CaptionSet {
    tracks: BTreeMap<String, Vec<Line>>,
}

impl CaptionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) the track for `alias`.
    ///
    /// Returns `false`, logs a warning and leaves the set unchanged if the lines are not ordered:
    /// each line must satisfy `start <= end` and start after the previous line's end. Bounds are
    /// inclusive, so a line starting exactly where the previous one ends overlaps it.
    pub fn insert(&mut self, alias: impl Into<String>, lines: Vec<Line>) -> bool {
        let alias = alias.into();
        if let Some(index) = first_disordered(&lines) {
            warn!(
                alias = %alias,
                line = index,
                "alias has out-of-order or overlapping lines; dropping it"
            );
            return false;
        }
        self.tracks.insert(alias, lines);
        true
    }

    pub fn get(&self, alias: &str) -> Option<&[Line]> {
        self.tracks.get(alias).map(Vec::as_slice)
    }

    pub fn contains(&self, alias: &str) -> bool {
        self.tracks.contains_key(alias)
    }

    pub fn aliases(&self) -> impl Iterator<Item = &str> {
        self.tracks.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}

/// Normalize a caption source into a [`CaptionSet`].
pub fn normalize(raw: &RawCaptionSet) -> CaptionSet {
    let mut set = CaptionSet::new();

    for (alias, entry) in &raw.entries {
        let Some(raw_lines) = entry.lines() else {
            warn!(alias = %alias, "alias has no lines");
            continue;
        };

        let lines = raw_lines
            .iter()
            .enumerate()
            .filter_map(|(index, item)| match item {
                RawItem::Line(raw_line) => resolve_line(alias, index, raw_line),
                RawItem::Malformed(value) => {
                    warn!(alias = %alias, line = index, %value, "line is malformed; dropping it");
                    None
                }
            })
            .collect();

        set.insert(alias.as_str(), lines);
    }

    set
}

/// Deserialize a caption source document held in memory, then normalize it.
pub fn normalize_json(text: &str) -> Result<CaptionSet> {
    let raw: RawCaptionSet = serde_json::from_str(text)?;
    Ok(normalize(&raw))
}

fn resolve_line(alias: &str, index: usize, raw: &RawLine) -> Option<Line> {
    let (Some(start), Some(end)) = (raw.start.to_millis(), raw.end.to_millis()) else {
        warn!(
            alias = %alias,
            line = index,
            start = ?raw.start,
            end = ?raw.end,
            "line has an unparseable time; dropping it"
        );
        return None;
    };

    Some(Line::new(start, end, raw.content.as_str()))
}

fn first_disordered(lines: &[Line]) -> Option<usize> {
    let mut prev_end: Option<u64> = None;
    for (index, line) in lines.iter().enumerate() {
        if line.end < line.start {
            return Some(index);
        }
        if prev_end.is_some_and(|end| line.start <= end) {
            return Some(index);
        }
        prev_end = Some(line.end);
    }
    None
}
