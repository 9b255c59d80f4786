//! Bulk transfer formats for application records.

pub mod csv;

pub use self::csv::{
    applications_to_csv, parse_csv, rows_to_applications, CsvError, CsvRow, CSV_HEADERS,
};
