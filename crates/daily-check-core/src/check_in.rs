//! Check-in time normalization for form input.

use time::Time;
use time::macros::format_description;

/// Error returned when a check-in time is not a valid time of day.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid check-in time '{0}' (expected HH:mm)")]
pub struct CheckInTimeError(pub String);

/// Validate a wall-clock time and return its zero-padded `HH:mm` form.
///
/// Accepts `9:05` as well as `09:05`. Seconds and dates are rejected.
///
/// # Errors
/// Returns [`CheckInTimeError`] when the input is not a valid time of day.
pub fn normalize_check_in_time(raw: &str) -> Result<String, CheckInTimeError> {
    let trimmed = raw.trim();
    let canonical = format_description!("[hour]:[minute]");
    let parsed = Time::parse(trimmed, canonical)
        .or_else(|_| Time::parse(trimmed, format_description!("[hour padding:none]:[minute]")))
        .map_err(|_| CheckInTimeError(raw.to_owned()))?;
    parsed
        .format(canonical)
        .map_err(|_| CheckInTimeError(raw.to_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pads_single_digit_hours() {
        assert_eq!(normalize_check_in_time("9:05").as_deref(), Ok("09:05"));
        assert_eq!(normalize_check_in_time(" 21:30 ").as_deref(), Ok("21:30"));
    }

    #[test]
    fn rejects_out_of_range_and_garbage() {
        assert!(normalize_check_in_time("24:00").is_err());
        assert!(normalize_check_in_time("12:60").is_err());
        assert!(normalize_check_in_time("noon").is_err());
        assert!(normalize_check_in_time("").is_err());
        assert!(normalize_check_in_time("09:00:00").is_err());
    }
}
