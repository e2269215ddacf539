//! Stay date parsing for the "DD/MM/YY Www" cell format.

use chrono::NaiveDate;

/// Parse a stay date cell such as "01/11/25 Sat".
///
/// Everything after the first whitespace (the weekday label) is ignored.
/// Two-digit years map into the 2000s. Dates are validated against the real
/// calendar, so "30/02/25" is rejected rather than clamped.
pub fn parse_stay_date(cell: &str) -> Option<NaiveDate> {
    let token = cell.split_whitespace().next()?;
    let mut parts = token.split('/');
    let day = parts.next()?.trim().parse::<u32>().ok()?;
    let month = parts.next()?.trim().parse::<u32>().ok()?;
    let year = parts.next()?.trim().parse::<i32>().ok()?;
    if parts.next().is_some() {
        return None;
    }
    let year = if year < 100 { 2000 + year } else { year };
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Render a date back into the source cell format (without weekday).
pub fn format_stay_date(date: NaiveDate) -> String {
    date.format("%d/%m/%y").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_with_weekday_suffix() {
        let date = parse_stay_date("01/11/25 Sat").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2025, 11, 1).unwrap());
    }

    #[test]
    fn test_parse_without_suffix() {
        let date = parse_stay_date("29/02/24").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
    }

    #[test]
    fn test_reject_impossible_dates() {
        assert!(parse_stay_date("30/02/25").is_none());
        assert!(parse_stay_date("29/02/25 Sat").is_none());
        assert!(parse_stay_date("00/01/25").is_none());
        assert!(parse_stay_date("01/13/25").is_none());
    }

    #[test]
    fn test_reject_malformed_cells() {
        assert!(parse_stay_date("").is_none());
        assert!(parse_stay_date("Sat").is_none());
        assert!(parse_stay_date("01-11-25").is_none());
        assert!(parse_stay_date("01/11").is_none());
        assert!(parse_stay_date("01/11/25/99").is_none());
    }

    #[test]
    fn test_roundtrip_across_century() {
        for (y, m, d) in [(2000, 1, 1), (2024, 2, 29), (2025, 11, 1), (2099, 12, 31)] {
            let date = NaiveDate::from_ymd_opt(y, m, d).unwrap();
            let cell = format_stay_date(date);
            assert_eq!(parse_stay_date(&cell), Some(date));
        }
    }
}
