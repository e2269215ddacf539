//! Tolerant numeric cell lexer.

/// Parse a numeric cell, tolerating thousands separators, percent signs and
/// surrounding whitespace. Blank or unparseable cells become zero.
pub fn parse_numeric(cell: &str) -> f64 {
    let cleaned: String = cell.chars().filter(|&c| c != ',' && c != '%').collect();
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return 0.0;
    }
    cleaned.parse::<f64>().unwrap_or(0.0)
}
