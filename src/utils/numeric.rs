// src/utils/numeric.rs

/// Parses a number written with either `.` or `,` as the decimal separator.
///
/// Returns `None` for anything that is not a finite number; callers treat
/// that as "not numeric" and move on.
pub fn parse_number(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    let value: f64 = trimmed.replace(',', ".").parse().ok()?;
    value.is_finite().then_some(value)
}

/// Renders a number the way spreadsheet users expect to read it back:
/// whole values without a fractional part.
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_accepts_both_separators() {
        assert_eq!(parse_number("12,5"), Some(12.5));
        assert_eq!(parse_number("12.5"), Some(12.5));
        assert_eq!(parse_number(" 45 "), Some(45.0));
        assert_eq!(parse_number("-3"), Some(-3.0));
    }

    #[test]
    fn test_parse_degrades_to_none() {
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("Matematika"), None);
        assert_eq!(parse_number("1,234.5"), None, "mixed separators are not a number");
        assert_eq!(parse_number("NaN"), None);
        assert_eq!(parse_number("inf"), None);
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(2024.0), "2024");
        assert_eq!(format_number(12.5), "12.5");
        assert_eq!(format_number(-7.0), "-7");
    }
}
