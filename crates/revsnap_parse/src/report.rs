//! Line-level report parsing.

use revsnap_core::record::{
    COL_OUT_OF_ORDER, COL_RECORD_TYPE, COL_ROOM_NIGHTS, COL_ROOM_REVENUE, COL_STAY_DATE,
    RETAINED_COLUMNS,
};
use revsnap_core::{DerivedMetrics, RowDraft, RowKind};
use thiserror::Error;
use tracing::{debug, warn};

use crate::date::parse_stay_date;
use crate::numeric::parse_numeric;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("report is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),
}

/// Parse a full report file into row drafts, preserving file order.
///
/// Individual malformed lines are skipped; only undecodable bytes fail the
/// whole file.
pub fn parse_report(bytes: &[u8], available_rooms: i64) -> Result<Vec<RowDraft>, ParseError> {
    let text = std::str::from_utf8(bytes)?;
    Ok(parse_report_lines(text, available_rooms).collect())
}

/// Lazy single-pass variant over already-decoded text.
pub fn parse_report_lines(
    text: &str,
    available_rooms: i64,
) -> impl Iterator<Item = RowDraft> + '_ {
    text.lines()
        .enumerate()
        .filter_map(move |(line_no, line)| parse_line(line_no, line, available_rooms))
        .enumerate()
        .map(|(idx, mut draft)| {
            draft.row_index = idx as i64;
            draft
        })
}

fn parse_line(line_no: usize, line: &str, available_rooms: i64) -> Option<RowDraft> {
    if line.trim().is_empty() {
        return None;
    }

    let fields: Vec<&str> = line.split('\t').collect();
    // One placeholder column plus the retained layout.
    if fields.len() < RETAINED_COLUMNS + 1 {
        debug!(line_no, columns = fields.len(), "skipping short line");
        return None;
    }

    let raw_values: Vec<String> = fields[1..]
        .iter()
        .take(RETAINED_COLUMNS)
        .map(|f| f.to_string())
        .collect();

    let Some(kind) = RowKind::parse(raw_values[COL_RECORD_TYPE].trim()) else {
        debug!(
            line_no,
            record_type = %raw_values[COL_RECORD_TYPE],
            "skipping non-data line"
        );
        return None;
    };

    let Some(stay_date) = parse_stay_date(&raw_values[COL_STAY_DATE]) else {
        warn!(
            line_no,
            cell = %raw_values[COL_STAY_DATE],
            "skipping line with unparseable stay date"
        );
        return None;
    };

    let room_nights = parse_numeric(&raw_values[COL_ROOM_NIGHTS]);
    let room_revenue = parse_numeric(&raw_values[COL_ROOM_REVENUE]);
    let out_of_order = parse_numeric(&raw_values[COL_OUT_OF_ORDER]);
    let metrics = DerivedMetrics::derive(room_nights, room_revenue, available_rooms);

    Some(RowDraft {
        stay_date,
        kind,
        raw_values,
        room_nights,
        room_revenue,
        out_of_order,
        occupancy_pct: metrics.occupancy_pct,
        adr: metrics.adr,
        revpar: metrics.revpar,
        row_index: 0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn report_line(kind: &str, date: &str, rooms: &str, revenue: &str, ooo: &str) -> String {
        let mut retained = vec![String::new(); RETAINED_COLUMNS];
        retained[COL_RECORD_TYPE] = kind.to_string();
        retained[COL_STAY_DATE] = date.to_string();
        retained[COL_ROOM_NIGHTS] = rooms.to_string();
        retained[COL_ROOM_REVENUE] = revenue.to_string();
        retained[COL_OUT_OF_ORDER] = ooo.to_string();
        let mut cols = vec!["PROP01".to_string()];
        cols.extend(retained);
        cols.join("\t")
    }

    #[test]
    fn test_parses_history_line_with_derived_metrics() {
        let line = report_line("History", "01/11/25 Sat", "45", "12,500.00", "2");
        let rows = parse_report(line.as_bytes(), 120).unwrap();
        assert_eq!(rows.len(), 1);

        let row = &rows[0];
        assert_eq!(row.kind, RowKind::History);
        assert_eq!(row.stay_date, NaiveDate::from_ymd_opt(2025, 11, 1).unwrap());
        assert_eq!(row.room_nights, 45.0);
        assert_eq!(row.room_revenue, 12500.0);
        assert_eq!(row.out_of_order, 2.0);
        assert_eq!(row.occupancy_pct, 37.50);
        assert_eq!(row.adr, 277.78);
        assert_eq!(row.revpar, 104.17);
        assert_eq!(row.raw_values.len(), RETAINED_COLUMNS);
        assert_eq!(row.raw_values[COL_ROOM_REVENUE], "12,500.00");
    }

    #[test]
    fn test_placeholder_column_is_discarded() {
        let line = report_line("Forecast", "02/11/25 Sun", "30", "6000", "0");
        let rows = parse_report(line.as_bytes(), 100).unwrap();
        assert_eq!(rows[0].raw_values[COL_RECORD_TYPE], "Forecast");
        assert!(!rows[0].raw_values.contains(&"PROP01".to_string()));
    }

    #[test]
    fn test_malformed_lines_are_skipped_not_fatal() {
        let text = [
            "just\ta\theader".to_string(),
            report_line("History", "01/11/25 Sat", "45", "12500.00", "0"),
            report_line("History", "30/02/25 Mon", "10", "1000", "0"),
            report_line("Total", "02/11/25 Sun", "99", "9999", "0"),
            String::new(),
            report_line("Forecast", "02/11/25 Sun", "30", "6000", "0"),
        ]
        .join("\n");

        let rows = parse_report(text.as_bytes(), 120).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].kind, RowKind::History);
        assert_eq!(rows[1].kind, RowKind::Forecast);
    }

    #[test]
    fn test_row_index_counts_accepted_rows_only() {
        let text = [
            "short\theader".to_string(),
            report_line("History", "01/11/25 Sat", "45", "12500.00", "0"),
            report_line("History", "bogus", "10", "1000", "0"),
            report_line("Forecast", "03/11/25 Mon", "30", "6000", "0"),
        ]
        .join("\n");

        let rows = parse_report(text.as_bytes(), 120).unwrap();
        let indexes: Vec<i64> = rows.iter().map(|r| r.row_index).collect();
        assert_eq!(indexes, vec![0, 1]);
    }

    #[test]
    fn test_extra_trailing_columns_are_truncated() {
        let mut line = report_line("History", "01/11/25 Sat", "45", "12500.00", "0");
        line.push_str("\textra1\textra2");
        let rows = parse_report(line.as_bytes(), 120).unwrap();
        assert_eq!(rows[0].raw_values.len(), RETAINED_COLUMNS);
    }

    #[test]
    fn test_blank_numerics_default_to_zero() {
        let line = report_line("History", "01/11/25 Sat", "", "", "");
        let rows = parse_report(line.as_bytes(), 120).unwrap();
        assert_eq!(rows[0].room_nights, 0.0);
        assert_eq!(rows[0].room_revenue, 0.0);
        assert_eq!(rows[0].adr, 0.0);
    }

    #[test]
    fn test_empty_file_yields_no_rows() {
        let rows = parse_report(b"", 120).unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn test_non_utf8_fails_whole_file() {
        let bytes: Vec<u8> = vec![0xff, 0xfe, 0x00, 0x41];
        assert!(parse_report(&bytes, 120).is_err());
    }

    #[test]
    fn test_case_insensitive_record_type() {
        let line = report_line("HISTORY", "01/11/25 Sat", "45", "12500.00", "0");
        let rows = parse_report(line.as_bytes(), 120).unwrap();
        assert_eq!(rows[0].kind, RowKind::History);
    }
}
