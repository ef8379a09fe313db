// Numeric helpers shared by the scoring functions

use chrono::{DateTime, Utc};

/// -1, 0 or 1 depending on the sign of `value`
pub fn sign(value: i64) -> f64 {
    match value.signum() {
        1 => 1.0,
        -1 => -1.0,
        _ => 0.0,
    }
}

/// log10 of `value`, with anything below 1 treated as 1
pub fn log10_at_least_one(value: i64) -> f64 {
    (value.max(1) as f64).log10()
}

/// Seconds elapsed from `origin` (unix seconds) to `instant`, sub-second precision kept.
/// Negative when `instant` precedes the origin.
pub fn seconds_since(instant: DateTime<Utc>, origin_unix_seconds: i64) -> f64 {
    let whole = instant.timestamp() as f64 - origin_unix_seconds as f64;
    whole + f64::from(instant.timestamp_subsec_nanos()) / 1_000_000_000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign() {
        assert_eq!(sign(42), 1.0);
        assert_eq!(sign(-7), -1.0);
        assert_eq!(sign(0), 0.0);
    }

    #[test]
    fn test_log10_at_least_one() {
        assert_eq!(log10_at_least_one(-5), 0.0);
        assert_eq!(log10_at_least_one(0), 0.0);
        assert_eq!(log10_at_least_one(1), 0.0);
        assert!((log10_at_least_one(100) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_seconds_since() {
        let instant = DateTime::from_timestamp(1_000, 500_000_000).unwrap();
        assert!((seconds_since(instant, 400) - 600.5).abs() < 1e-9);

        // Before the origin
        assert!((seconds_since(instant, 2_000) + 999.5).abs() < 1e-9);
    }
}
