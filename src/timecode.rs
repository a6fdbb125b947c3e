//! Conversion of caption timestamps into integer milliseconds.

const MS_PER_HOUR: u64 = 3_600_000;
const MS_PER_MINUTE: u64 = 60_000;
const MS_PER_SECOND: u64 = 1_000;

/// Parse a caption timestamp into milliseconds.
///
/// Two spellings are accepted, after trimming surrounding whitespace:
/// - `H+:MM:SS.mmm` timecodes: any number of hour digits, then exactly two minute digits, two
///   second digits and three millisecond digits. Fields are not range checked, so `0:75:00.000`
///   is 75 minutes.
/// - Plain non-negative integers, which are already milliseconds and are returned as-is.
///
/// Anything else (including values that overflow `u64`) yields `None`, the "not a number"
/// sentinel.
pub fn parse_timecode(input: &str) -> Option<u64> {
    let input = input.trim();
    timecode_millis(input).or_else(|| input.parse::<u64>().ok())
}

fn timecode_millis(input: &str) -> Option<u64> {
    let (clock, millis) = input.split_once('.')?;

    let mut fields = clock.split(':');
    let hours = fields.next()?;
    let minutes = fields.next()?;
    let seconds = fields.next()?;
    if fields.next().is_some() {
        return None;
    }

    if hours.is_empty() || !is_digits(hours) {
        return None;
    }
    if !has_digits(minutes, 2) || !has_digits(seconds, 2) || !has_digits(millis, 3) {
        return None;
    }

    let hours: u64 = hours.parse().ok()?;
    let minutes: u64 = minutes.parse().ok()?;
    let seconds: u64 = seconds.parse().ok()?;
    let millis: u64 = millis.parse().ok()?;

    hours
        .checked_mul(MS_PER_HOUR)?
        .checked_add(minutes * MS_PER_MINUTE)?
        .checked_add(seconds * MS_PER_SECOND)?
        .checked_add(millis)
}

fn is_digits(s: &str) -> bool {
    s.bytes().all(|b| b.is_ascii_digit())
}

fn has_digits(s: &str, len: usize) -> bool {
    s.len() == len && is_digits(s)
}
