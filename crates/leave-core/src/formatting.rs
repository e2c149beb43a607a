/// Format a floating-point number with thousands separators and a fixed number
/// of decimal places.
///
/// # Examples
///
/// ```
/// use leave_core::formatting::format_number;
///
/// assert_eq!(format_number(1234.5,  1), "1,234.5");
/// assert_eq!(format_number(3.456, 2), "3.46");
/// assert_eq!(format_number(0.0, 2), "0.00");
/// ```
pub fn format_number(value: f64, decimals: u32) -> String {
    let negative = value < 0.0;
    let abs_value = value.abs();

    // Nudge by a relative epsilon so exact midpoints such as 1.005 round up.
    let factor = 10_f64.powi(decimals as i32);
    let epsilon = f64::EPSILON * abs_value * factor;
    let rounded = ((abs_value * factor) + epsilon).round() / factor;

    let grouped = group_thousands(&(rounded.trunc() as u64).to_string());

    let result = if decimals == 0 {
        grouped
    } else {
        let frac_str = format!(
            "{:.prec$}",
            rounded - rounded.trunc(),
            prec = decimals as usize
        );
        // `frac_str` looks like "0.50"; keep ".50".
        format!("{}{}", grouped, &frac_str[1..])
    };

    if negative {
        format!("-{}", result)
    } else {
        result
    }
}

/// Format an integer count with thousands separators.
///
/// ```
/// use leave_core::formatting::format_count;
///
/// assert_eq!(format_count(0), "0");
/// assert_eq!(format_count(1_234_567), "1,234,567");
/// ```
pub fn format_count(count: u64) -> String {
    group_thousands(&count.to_string())
}

/// Format a number of days with the right plural.
///
/// ```
/// use leave_core::formatting::format_days;
///
/// assert_eq!(format_days(1), "1 day");
/// assert_eq!(format_days(12), "12 days");
/// ```
pub fn format_days(days: u64) -> String {
    if days == 1 {
        "1 day".to_string()
    } else {
        format!("{} days", format_count(days))
    }
}

/// Calculate `(part / whole) * 100`, rounded to `decimal_places`.
///
/// Returns `0.0` if `whole` is zero.
///
/// ```
/// use leave_core::formatting::percentage;
///
/// assert!((percentage(1.0, 3.0, 1) - 33.3).abs() < 1e-9);
/// assert_eq!(percentage(5.0, 0.0, 2), 0.0);
/// ```
pub fn percentage(part: f64, whole: f64, decimal_places: u32) -> f64 {
    if whole == 0.0 {
        return 0.0;
    }
    round_to((part / whole) * 100.0, decimal_places)
}

/// Round `value` to `decimal_places`.
pub fn round_to(value: f64, decimal_places: u32) -> f64 {
    let factor = 10_f64.powi(decimal_places as i32);
    (value * factor).round() / factor
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// Insert commas every three digits from the right of an integer string.
fn group_thousands(s: &str) -> String {
    if s.len() <= 3 {
        return s.to_string();
    }
    let remainder = s.len() % 3;
    let mut result = String::with_capacity(s.len() + s.len() / 3);
    for (i, c) in s.chars().enumerate() {
        if i != 0 && (i % 3 == remainder) {
            result.push(',');
        }
        result.push(c);
    }
    result
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    // ── format_number ────────────────────────────────────────────────────────

    #[test]
    fn test_format_number_zero() {
        assert_eq!(format_number(0.0, 0), "0");
        assert_eq!(format_number(0.0, 2), "0.00");
    }

    #[test]
    fn test_format_number_average_days() {
        assert_eq!(format_number(3.0, 2), "3.00");
        assert_eq!(format_number(2.666_666, 2), "2.67");
    }

    #[test]
    fn test_format_number_with_thousands() {
        assert_eq!(format_number(1_234.5, 1), "1,234.5");
    }

    #[test]
    fn test_format_number_negative() {
        assert_eq!(format_number(-9_876.5, 1), "-9,876.5");
    }

    #[test]
    fn test_format_number_rounds_midpoint_up() {
        assert_eq!(format_number(1.005, 2), "1.01");
    }

    // ── format_count ─────────────────────────────────────────────────────────

    #[test]
    fn test_format_count_boundaries() {
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(1_000), "1,000");
        assert_eq!(format_count(12_345), "12,345");
    }

    // ── format_days ──────────────────────────────────────────────────────────

    #[test]
    fn test_format_days_plural() {
        assert_eq!(format_days(0), "0 days");
        assert_eq!(format_days(1), "1 day");
        assert_eq!(format_days(2), "2 days");
        assert_eq!(format_days(1_500), "1,500 days");
    }

    // ── percentage / round_to ────────────────────────────────────────────────

    #[test]
    fn test_percentage_basic() {
        assert_eq!(percentage(1.0, 4.0, 1), 25.0);
        assert_eq!(percentage(2.0, 3.0, 2), 66.67);
    }

    #[test]
    fn test_percentage_zero_whole() {
        assert_eq!(percentage(0.0, 0.0, 1), 0.0);
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(2.345_67, 2), 2.35);
        assert_eq!(round_to(7.0, 0), 7.0);
    }
}
