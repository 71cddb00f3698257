//! Rate calculation and formatting helpers
//!
//! Convenience functions drivers can use in `process_results` to derive
//! throughput figures from their operation counts and store them in a run
//! record.

use std::time::Duration;

/// Operations per second for a single measured run
pub fn operations_per_second(operations: u64, duration: Duration) -> f64 {
    let secs = duration.as_secs_f64();
    if secs > 0.0 {
        operations as f64 / secs
    } else {
        0.0
    }
}

/// Combined operations per second when `threads` workers each performed
/// `operations_per_thread` operations over the same wall-clock duration
pub fn operations_per_second_per_thread(
    operations_per_thread: u64,
    total_duration: Duration,
    threads: usize,
) -> f64 {
    let secs = total_duration.as_secs_f64();
    if secs > 0.0 {
        operations_per_thread as f64 * threads as f64 / secs
    } else {
        0.0
    }
}

/// Aggregate operations per second across `threads` workers
pub fn total_operations_per_second(
    operations_per_thread: u64,
    total_duration: Duration,
    threads: usize,
) -> f64 {
    threads as f64 * operations_per_second_per_thread(operations_per_thread, total_duration, threads)
}

/// Format a rate with thousands grouping and at most three fraction digits
///
/// # Examples
/// ```
/// use benchrig::util::format_rate;
///
/// assert_eq!(format_rate(100.0), "100");
/// assert_eq!(format_rate(12500.25), "12,500.25");
/// ```
pub fn format_rate(value: f64) -> String {
    let rounded = (value * 1000.0).round() / 1000.0;
    let negative = rounded < 0.0;
    let magnitude = rounded.abs();

    let integer_part = magnitude.trunc() as u64;
    let fraction = magnitude.fract();

    let digits = integer_part.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (position, ch) in digits.chars().enumerate() {
        if position > 0 && (digits.len() - position) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let mut out = if negative { format!("-{}", grouped) } else { grouped };

    if fraction > 0.0 {
        let fraction_str = format!("{:.3}", fraction);
        let trimmed = fraction_str.trim_start_matches("0.").trim_end_matches('0');
        if !trimmed.is_empty() {
            out.push('.');
            out.push_str(trimmed);
        }
    }

    out
}

/// Format operations/second as a grouped string
pub fn operations_per_second_as_string(operations: u64, duration: Duration) -> String {
    format_rate(operations_per_second(operations, duration))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operations_per_second() {
        assert_eq!(operations_per_second(100, Duration::from_secs(1)), 100.0);
        assert_eq!(operations_per_second(100, Duration::from_millis(500)), 200.0);
        assert_eq!(operations_per_second(100, Duration::ZERO), 0.0);
    }

    #[test]
    fn test_per_thread_rates() {
        assert_eq!(
            operations_per_second_per_thread(10, Duration::from_secs(1), 2),
            20.0
        );
        assert_eq!(
            total_operations_per_second(100, Duration::from_secs(1), 2),
            400.0
        );
    }

    #[test]
    fn test_per_thread_rates_do_not_overflow() {
        let rate = operations_per_second_per_thread(u64::MAX, Duration::from_secs(1), 8);
        assert!(rate.is_finite());
        assert!(rate > 0.0);
    }

    #[test]
    fn test_format_rate() {
        assert_eq!(format_rate(100.0), "100");
        assert_eq!(format_rate(1000.0), "1,000");
        assert_eq!(format_rate(1234567.0), "1,234,567");
        assert_eq!(format_rate(12500.25), "12,500.25");
        assert_eq!(format_rate(0.5), "0.5");
        assert_eq!(format_rate(-2500.0), "-2,500");
    }

    #[test]
    fn test_operations_per_second_as_string() {
        assert_eq!(
            operations_per_second_as_string(100, Duration::from_secs(1)),
            "100"
        );
        assert_eq!(
            operations_per_second_as_string(2_000_000, Duration::from_secs(1)),
            "2,000,000"
        );
    }
}
