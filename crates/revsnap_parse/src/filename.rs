//! Business timestamp extraction from attachment filenames.

use chrono::{DateTime, Datelike, Utc};

const MIN_TOKEN_DIGITS: usize = 10;
const MILLIS_THRESHOLD: i64 = 1_000_000_000_000;
const MIN_PLAUSIBLE_YEAR: i32 = 2000;
const MAX_PLAUSIBLE_YEAR: i32 = 2100;

/// Extract a business timestamp from a numeric token embedded in a filename,
/// e.g. "forecast_1731283200.tsv".
///
/// Digit runs shorter than ten characters are ignored so property codes and
/// yyyymmdd fragments never shadow the epoch token. Values below 10^12 are
/// read as epoch seconds, larger ones as epoch milliseconds. Tokens outside
/// the 2000..=2100 year range are rejected.
pub fn business_time_from_filename(name: &str) -> Option<DateTime<Utc>> {
    for run in name.split(|c: char| !c.is_ascii_digit()) {
        if run.len() < MIN_TOKEN_DIGITS {
            continue;
        }
        let Ok(value) = run.parse::<i64>() else {
            continue;
        };
        let parsed = if value < MILLIS_THRESHOLD {
            DateTime::from_timestamp(value, 0)
        } else {
            DateTime::from_timestamp_millis(value)
        };
        if let Some(ts) = parsed {
            if (MIN_PLAUSIBLE_YEAR..=MAX_PLAUSIBLE_YEAR).contains(&ts.year()) {
                return Some(ts);
            }
        }
    }
    None
}
