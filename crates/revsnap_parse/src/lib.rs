//! Parser for tab-separated history and forecast exports.
//!
//! The input format is line-oriented: one calendar day per line, a leading
//! placeholder column, then a fixed positional layout. Malformed lines are
//! skipped with a log entry; only a file that is not valid UTF-8 fails the
//! parse as a whole.

pub mod date;
pub mod filename;
pub mod numeric;
pub mod report;

pub use date::{format_stay_date, parse_stay_date};
pub use filename::business_time_from_filename;
pub use numeric::parse_numeric;
pub use report::{parse_report, parse_report_lines, ParseError};
