//! Raw report-line layout.
//!
//! Report lines are tab-separated and mostly opaque. After the leading
//! placeholder column is dropped, up to [`RETAINED_COLUMNS`] values are kept
//! verbatim; only the positions below have known meaning in the vendor
//! export.

/// Columns retained per line once the leading placeholder is dropped.
pub const RETAINED_COLUMNS: usize = 30;

/// Record type column (History/Forecast).
pub const COL_RECORD_TYPE: usize = 0;
/// Stay date column, formatted "DD/MM/YY Www".
pub const COL_STAY_DATE: usize = 1;
/// Room nights sold.
pub const COL_ROOM_NIGHTS: usize = 2;
/// Room revenue.
pub const COL_ROOM_REVENUE: usize = 8;
/// Out of order rooms.
pub const COL_OUT_OF_ORDER: usize = 12;

/// Encode raws as the JSON array stored alongside each row.
pub fn raw_values_to_json(values: &[String]) -> Result<String, serde_json::Error> {
    serde_json::to_string(values)
}

/// Decode a stored JSON array back into raws.
pub fn raw_values_from_json(json: &str) -> Result<Vec<String>, serde_json::Error> {
    serde_json::from_str(json)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_values_roundtrip() {
        let values: Vec<String> = vec![
            "History".into(),
            "01/11/25 Sat".into(),
            "45".into(),
            "".into(),
            "1,250.00".into(),
            "näkymä".into(),
        ];
        let json = raw_values_to_json(&values).unwrap();
        let back = raw_values_from_json(&json).unwrap();
        assert_eq!(values, back);
    }

    #[test]
    fn test_raw_values_reject_malformed_json() {
        assert!(raw_values_from_json("{not an array").is_err());
    }
}
