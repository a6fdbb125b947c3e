use thiserror::Error;

/// The crate-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// The crate-wide error type.
///
/// Only misconfiguration and misuse surface here. Bad caption data never does: it is logged as a
/// warning and dropped so playback can carry on without it.
#[derive(Debug, Error)]
pub enum Error {
    /// A clocked engine was constructed without a clock to drive it.
    #[error("captions need a clock unless they run in slave mode")]
    ClockUnavailable,

    /// A slave-only operation was invoked on a clocked engine.
    #[error("`{0}` is only available in slave mode")]
    RequiresSlaveMode(&'static str),

    /// A clock-only operation was invoked on a slave engine.
    #[error("`{0}` needs a clock and is unavailable in slave mode")]
    RequiresClockMode(&'static str),

    /// A caption source document could not be deserialized.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn misuse_errors_name_the_operation() {
        let err = Error::RequiresSlaveMode("advance");
        assert_eq!(err.to_string(), "`advance` is only available in slave mode");

        let err = Error::RequiresClockMode("poll");
        assert!(err.to_string().starts_with("`poll`"));
    }
}
