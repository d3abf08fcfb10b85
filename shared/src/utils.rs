// Formatting helpers shared by the engine's logging, storage and notification paths.
use chrono::{DateTime, Utc};

/// Fixed-point rendering with `decimals` places, e.g. `format_fixed(101.0, 2) == "101.00"`.
/// Exact binary ties round half to even (`0.125` gives `"0.12"`), not half up.
pub fn format_fixed(value: f64, decimals: usize) -> String {
    format!("{:.decimals$}", value, decimals = decimals)
}

/// `YYYY-MM-DD HH:MM:SS`, the format stored alongside each signal.
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d %H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_fixed() {
        assert_eq!(format_fixed(101.0, 2), "101.00");
        assert_eq!(format_fixed(0.123456, 2), "0.12");
        assert_eq!(format_fixed(99.999, 2), "100.00");
    }

    #[test]
    fn test_format_fixed_exact_ties() {
        assert_eq!(format_fixed(0.125, 2), "0.12");
        assert_eq!(format_fixed(0.375, 2), "0.38");
        assert_eq!(format_fixed(2.5, 0), "2");
    }

    #[test]
    fn test_format_timestamp() {
        let ts = Utc.with_ymd_and_hms(2024, 12, 30, 18, 20, 0).unwrap();
        assert_eq!(format_timestamp(&ts), "2024-12-30 18:20:00");
    }
}
