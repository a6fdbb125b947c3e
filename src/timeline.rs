//! The caption timeline state machine.
//!
//! A [`Timeline`] holds one track's lines and a playback position, and answers "which line is
//! active right now?" as the position moves. It knows nothing about sinks, clocks or muting;
//! [`crate::Captions`] layers those on top.
//!
//! Two ways to move the position:
//! - [`Timeline::seek`] positions absolutely with a linear scan from the first line. It is
//!   correct for any jump, forwards or backwards.
//! - [`Timeline::advance`] and [`Timeline::set_time`] move forward incrementally using the last
//!   active line as a cursor, so steady playback costs O(1) amortized per tick. They assume the
//!   position never decreases between calls; use `seek` for backward jumps.
//!
//! Lines are expected ordered and non-overlapping (see [`crate::CaptionSet::insert`]); `seek`
//! resolves any overlap to the earlier line.

use crate::line::Line;

#[derive(Debug, Clone, Default)]
pub struct Timeline {
    // Empty means "no captions available".
    lines: Vec<Line>,
    current_time: u64,
    current_line: Option<usize>,
    // Cursor for incremental updates: the most recently active (or passed) line.
    last_active_line: Option<usize>,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the lines wholesale and forget any active line.
    ///
    /// `None` (or an empty list) leaves the timeline without captions; positioning still works
    /// but no line ever becomes active.
    pub fn load(&mut self, lines: Option<Vec<Line>>) {
        self.reset();
        self.lines = lines.unwrap_or_default();
    }

    /// Drop the lines and forget any active line.
    pub fn clear(&mut self) {
        self.load(None);
    }

    /// Forget the active line and the cursor, keeping the lines and position.
    pub fn reset(&mut self) {
        self.current_line = None;
        self.last_active_line = None;
    }

    /// Jump to `time_ms`, resolving the active line from scratch.
    pub fn seek(&mut self, time_ms: u64) {
        self.current_time = time_ms;

        let Some(first) = self.lines.first() else {
            return;
        };
        if time_ms < first.start {
            self.reset();
            return;
        }

        for (index, line) in self.lines.iter().enumerate() {
            if line.contains(time_ms) {
                self.current_line = Some(index);
                self.last_active_line = Some(index);
                break;
            }
            if time_ms > line.end {
                self.last_active_line = Some(index);
                self.current_line = None;
            }
        }
    }

    /// Move forward by `elapsed_ms`.
    ///
    /// Returns whether the active line changed (or the end of the track was reached), i.e.
    /// whether rendered text may need refreshing.
    pub fn advance(&mut self, elapsed_ms: u64) -> bool {
        self.current_time = self.current_time.saturating_add(elapsed_ms);
        self.update()
    }

    /// Move forward to the absolute position `time_ms`.
    ///
    /// Same contract as [`Timeline::advance`]; `time_ms` must not be behind the current position.
    pub fn set_time(&mut self, time_ms: u64) -> bool {
        self.current_time = time_ms;
        self.update()
    }

    fn update(&mut self) -> bool {
        let Some(last) = self.lines.last() else {
            return false;
        };
        let time = self.current_time;

        // Past the final line: nothing can become active until the next load or seek.
        if time >= last.end {
            self.current_line = None;
            return true;
        }

        // Lines that started and ended entirely between two updates are passed over.
        let mut next = self.last_active_line.map_or(0, |index| index + 1);
        while next < self.lines.len() && self.lines[next].end < time {
            self.last_active_line = Some(next);
            next += 1;
        }

        if self.lines.get(next).is_some_and(|line| line.contains(time)) {
            self.current_line = Some(next);
            self.last_active_line = Some(next);
            return true;
        }

        match self.current_line {
            Some(index) if time > self.lines[index].end => {
                self.last_active_line = self.last_active_line.max(Some(index));
                self.current_line = None;
                true
            }
            _ => false,
        }
    }

    pub fn current_time(&self) -> u64 {
        self.current_time
    }

    /// Index of the line containing the current position, if any.
    pub fn current_line(&self) -> Option<usize> {
        self.current_line
    }

    pub fn last_active_line(&self) -> Option<usize> {
        self.last_active_line
    }

    pub fn active_line(&self) -> Option<&Line> {
        self.current_line.and_then(|index| self.lines.get(index))
    }

    /// The `end` of the final line: the track's own extent.
    pub fn end_ms(&self) -> Option<u64> {
        self.lines.last().map(|line| line.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timeline(lines: &[(u64, u64, &str)]) -> Timeline {
        let mut t = Timeline::new();
        t.load(Some(
            lines
                .iter()
                .map(|&(start, end, content)| Line::new(start, end, content))
                .collect(),
        ));
        t
    }

    fn hi_bye() -> Timeline {
        timeline(&[(0, 1000, "Hi"), (1500, 2500, "Bye")])
    }

    #[test]
    fn seek_into_gap_tracks_the_passed_line() {
        let mut t = hi_bye();
        t.seek(1200);
        assert_eq!(t.current_line(), None);
        assert_eq!(t.last_active_line(), Some(0));

        assert!(t.advance(400));
        assert_eq!(t.current_time(), 1600);
        assert_eq!(t.current_line(), Some(1));
        assert_eq!(t.active_line().map(|l| l.content.as_str()), Some("Bye"));
    }

    #[test]
    fn seek_before_first_line_clears_both_indices() {
        let mut t = timeline(&[(500, 1000, "a")]);
        t.seek(700);
        assert_eq!(t.current_line(), Some(0));

        t.seek(100);
        assert_eq!(t.current_line(), None);
        assert_eq!(t.last_active_line(), None);
    }

    #[test]
    fn seek_can_jump_backwards() {
        let mut t = hi_bye();
        t.seek(2000);
        assert_eq!(t.current_line(), Some(1));

        t.seek(10);
        assert_eq!(t.current_line(), Some(0));
        assert_eq!(t.last_active_line(), Some(0));
    }

    #[test]
    fn seek_past_every_line_leaves_nothing_active() {
        let mut t = hi_bye();
        t.seek(9000);
        assert_eq!(t.current_line(), None);
        assert_eq!(t.last_active_line(), Some(1));
    }

    #[test]
    fn end_bound_is_inclusive_for_seek_and_advance() {
        let mut seeked = timeline(&[(0, 1000, "a"), (2000, 3000, "b")]);
        seeked.seek(1000);
        assert_eq!(seeked.current_line(), Some(0));
        seeked.seek(1001);
        assert_eq!(seeked.current_line(), None);

        let mut advanced = timeline(&[(0, 1000, "a"), (2000, 3000, "b")]);
        advanced.seek(0);
        assert!(!advanced.advance(1000));
        assert_eq!(advanced.current_line(), Some(0));
        assert!(advanced.advance(1));
        assert_eq!(advanced.current_line(), None);
        assert_eq!(advanced.last_active_line(), Some(0));
    }

    #[test]
    fn small_advances_agree_with_a_direct_seek() {
        let lines = [(0, 2000, "a"), (2001, 4000, "b"), (4500, 6000, "c")];

        let mut stepped = timeline(&lines);
        stepped.seek(2500);
        let mut direct = timeline(&lines);

        // Steps of 9ms never land on the final line's end, where `advance` already reports the
        // end of the track while `seek` still finds the line.
        for time in (2500..7000).step_by(9).skip(1) {
            stepped.advance(9);
            direct.seek(time);
            assert_eq!(stepped.current_time(), time);
            assert_eq!(stepped.current_line(), direct.current_line(), "at {time}ms");
        }
    }

    #[test]
    fn advance_without_transition_reports_no_change() {
        let mut t = hi_bye();
        t.seek(100);
        assert!(!t.advance(100));
        assert!(!t.advance(100));
        assert_eq!(t.current_line(), Some(0));
    }

    #[test]
    fn large_advance_passes_over_skipped_lines() {
        let mut t = timeline(&[(0, 100, "a"), (200, 300, "b"), (400, 500, "c"), (600, 900, "d")]);
        t.seek(50);
        assert!(t.advance(400));
        assert_eq!(t.current_line(), Some(2));
        assert_eq!(t.last_active_line(), Some(2));

        assert!(t.advance(200));
        assert_eq!(t.current_line(), Some(3));
    }

    #[test]
    fn running_past_the_final_line_stays_blank() {
        let mut t = hi_bye();
        t.seek(2400);
        assert_eq!(t.current_line(), Some(1));

        assert!(t.advance(100));
        assert_eq!(t.current_line(), None);
        assert!(t.advance(1000));
        assert_eq!(t.current_line(), None);
    }

    #[test]
    fn set_time_is_an_absolute_forward_update() {
        let mut t = hi_bye();
        t.seek(0);
        assert!(t.set_time(1600));
        assert_eq!(t.current_line(), Some(1));
        assert_eq!(t.current_time(), 1600);
    }

    #[test]
    fn without_lines_positioning_is_inert() {
        let mut t = Timeline::new();
        t.load(None);
        t.seek(500);
        assert!(!t.advance(500));
        assert_eq!(t.current_time(), 1000);
        assert_eq!(t.current_line(), None);
        assert_eq!(t.end_ms(), None);

        t.load(Some(Vec::new()));
        assert_eq!(t.end_ms(), None);
        assert!(!t.set_time(10));
    }

    #[test]
    fn load_resets_indices() {
        let mut t = hi_bye();
        t.seek(2000);
        t.load(Some(vec![Line::new(0, 10, "x")]));
        assert_eq!(t.current_line(), None);
        assert_eq!(t.last_active_line(), None);
        assert_eq!(t.end_ms(), Some(10));
    }
}
