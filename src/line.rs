use serde::Serialize;

/// One timed caption entry.
///
/// Bounds are integer milliseconds on the clip's timeline and are inclusive at both ends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Line {
    pub start: u64,
    pub end: u64,
    pub content: String,
}

impl Line {
    pub fn new(start: u64, end: u64, content: impl Into<String>) -> Self {
        Self {
            start,
            end,
            content: content.into(),
        }
    }

    /// Whether `time_ms` falls within `[start, end]`.
    pub fn contains(&self, time_ms: u64) -> bool {
        self.start <= time_ms && time_ms <= self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_are_inclusive() {
        let line = Line::new(1_000, 2_000, "hi");
        assert!(!line.contains(999));
        assert!(line.contains(1_000));
        assert!(line.contains(2_000));
        assert!(!line.contains(2_001));
    }
}
