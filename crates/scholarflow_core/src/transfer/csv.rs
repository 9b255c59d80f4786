//! CSV import/export for application records.
//!
//! # Responsibility
//! - Split CSV text into header-keyed rows.
//! - Convert rows into validated [`Application`] records.
//! - Render records back into the same column layout.
//!
//! # Invariants
//! - Column order is free on import; lookup is by header name.
//! - Export always writes [`CSV_HEADERS`] and quotes every field, so any
//!   exported file imports back to equivalent records (ids and timestamps
//!   are regenerated).
//! - Errors carry the 1-based line where the offending record starts.

use crate::model::application::{
    Application, ApplicationDetails, ApplicationKind, ApplicationValidationError, GrantedBy,
    Region, Stage, TimelineStatus,
};
use crate::timeline::{parse_iso_date, InvalidDateInput};
use chrono::NaiveDate;
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Column layout written by export and understood by import.
pub const CSV_HEADERS: [&str; 11] = [
    "type",
    "name",
    "organization",
    "country",
    "region",
    "link",
    "applicationOpen",
    "deadline",
    "stage",
    "timelineStatus",
    "notes",
];

const UTF8_BOM: char = '\u{feff}';

const REQUIRED_HEADERS: [&str; 4] = ["type", "name", "applicationOpen", "deadline"];

#[derive(Debug)]
pub enum CsvError {
    /// Input has no header row.
    MissingHeader,
    MissingColumn(&'static str),
    UnterminatedQuote {
        line: usize,
    },
    InvalidField {
        line: usize,
        field: &'static str,
        value: String,
    },
    InvalidDate {
        line: usize,
        field: &'static str,
        source: InvalidDateInput,
    },
    InvalidRecord {
        line: usize,
        source: ApplicationValidationError,
    },
}

impl Display for CsvError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingHeader => write!(f, "csv input has no header row"),
            Self::MissingColumn(column) => write!(f, "csv header is missing column `{column}`"),
            Self::UnterminatedQuote { line } => {
                write!(f, "line {line}: quoted field is never closed")
            }
            Self::InvalidField { line, field, value } => {
                write!(f, "line {line}: invalid {field} `{value}`")
            }
            Self::InvalidDate {
                line,
                field,
                source,
            } => write!(f, "line {line}: {field}: {source}"),
            Self::InvalidRecord { line, source } => write!(f, "line {line}: {source}"),
        }
    }
}

impl Error for CsvError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidDate { source, .. } => Some(source),
            Self::InvalidRecord { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// One data row, keyed by the import header names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CsvRow {
    /// Line where the record starts.
    pub line: usize,
    pub kind: String,
    pub name: String,
    pub organization: String,
    pub country: String,
    pub region: String,
    pub link: String,
    pub application_open: String,
    pub deadline: String,
    pub stage: String,
    pub timeline_status: String,
    pub notes: String,
}

/// Parses CSV text into rows.
///
/// A leading byte-order mark is ignored. Blank lines are skipped, missing
/// trailing fields read as empty and unknown columns are ignored.
pub fn parse_csv(text: &str) -> Result<Vec<CsvRow>, CsvError> {
    let text = text.strip_prefix(UTF8_BOM).unwrap_or(text);
    let mut records = split_records(text)?.into_iter();
    let (_, header) = records.next().ok_or(CsvError::MissingHeader)?;

    let columns: HashMap<&str, usize> = header
        .iter()
        .enumerate()
        .map(|(index, name)| (name.as_str(), index))
        .collect();
    if let Some(missing) = REQUIRED_HEADERS
        .into_iter()
        .find(|name| !columns.contains_key(name))
    {
        return Err(CsvError::MissingColumn(missing));
    }

    let rows = records
        .map(|(line, fields)| {
            let value = |name: &str| {
                columns
                    .get(name)
                    .and_then(|index| fields.get(*index))
                    .cloned()
                    .unwrap_or_default()
            };
            CsvRow {
                line,
                kind: value("type"),
                name: value("name"),
                organization: value("organization"),
                country: value("country"),
                region: value("region"),
                link: value("link"),
                application_open: value("applicationOpen"),
                deadline: value("deadline"),
                stage: value("stage"),
                timeline_status: value("timelineStatus"),
                notes: value("notes"),
            }
        })
        .collect();

    Ok(rows)
}

/// Converts parsed rows into new application records.
///
/// Defaults: empty region is Europe, empty timeline status is `EST`, empty
/// stage is `To Apply`.
pub fn rows_to_applications(rows: &[CsvRow]) -> Result<Vec<Application>, CsvError> {
    rows.iter().map(row_to_application).collect()
}

fn row_to_application(row: &CsvRow) -> Result<Application, CsvError> {
    let line = row.line;
    let invalid = |field: &'static str, value: &str| CsvError::InvalidField {
        line,
        field,
        value: value.to_string(),
    };
    let date = |field: &'static str, value: &str| -> Result<NaiveDate, CsvError> {
        parse_iso_date(value).map_err(|source| CsvError::InvalidDate {
            line,
            field,
            source,
        })
    };

    let kind = ApplicationKind::from_label(&row.kind).ok_or_else(|| invalid("type", &row.kind))?;
    let details = match kind {
        ApplicationKind::Scholarship => ApplicationDetails::Scholarship {
            scholarship_name: row.name.clone(),
            granted_by: GrantedBy::from_label(&row.organization)
                .ok_or_else(|| invalid("organization", &row.organization))?,
            link: row.link.clone(),
        },
        ApplicationKind::Admission => ApplicationDetails::Admission {
            program_name: row.name.clone(),
            school: row.organization.clone(),
            program_link: row.link.clone(),
            requirement_link: String::new(),
        },
    };

    let region = or_default(&row.region, Region::Europe, Region::from_label)
        .ok_or_else(|| invalid("region", &row.region))?;
    let stage = or_default(&row.stage, Stage::ToApply, Stage::from_label)
        .ok_or_else(|| invalid("stage", &row.stage))?;
    let timeline_status = or_default(
        &row.timeline_status,
        TimelineStatus::Estimated,
        TimelineStatus::from_label,
    )
    .ok_or_else(|| invalid("timelineStatus", &row.timeline_status))?;

    let mut application = Application::new(
        details,
        row.country.clone(),
        region,
        date("applicationOpen", &row.application_open)?,
        date("deadline", &row.deadline)?,
    );
    application.stage = stage;
    application.timeline_status = timeline_status;
    application.notes = row.notes.clone();

    application
        .validate()
        .map_err(|source| CsvError::InvalidRecord { line, source })?;
    Ok(application)
}

fn or_default<T>(value: &str, default: T, parse: impl Fn(&str) -> Option<T>) -> Option<T> {
    if value.trim().is_empty() {
        Some(default)
    } else {
        parse(value)
    }
}

/// Renders applications as CSV with a header row.
pub fn applications_to_csv(applications: &[Application]) -> String {
    let mut lines = Vec::with_capacity(applications.len() + 1);
    lines.push(CSV_HEADERS.join(","));

    for application in applications {
        let open = application.application_open.format("%Y-%m-%d").to_string();
        let deadline = application.deadline.format("%Y-%m-%d").to_string();
        let fields = [
            application.kind().label(),
            application.name(),
            application.organization(),
            application.country.as_str(),
            application.region.label(),
            application.primary_link(),
            open.as_str(),
            deadline.as_str(),
            application.stage.label(),
            application.timeline_status.label(),
            application.notes.as_str(),
        ];
        lines.push(
            fields
                .iter()
                .map(|field| quote_field(field))
                .collect::<Vec<_>>()
                .join(","),
        );
    }

    lines.join("\n")
}

fn quote_field(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

/// Splits text into `(start_line, fields)` records.
///
/// Quoted fields may contain commas, newlines and `""` escapes. Unquoted
/// fields are trimmed. Records whose only field is empty are dropped.
fn split_records(text: &str) -> Result<Vec<(usize, Vec<String>)>, CsvError> {
    let mut records = Vec::new();
    let mut fields: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut quoted = false;
    let mut in_quotes = false;
    let mut line = 1;
    let mut record_line = 1;
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    field.push('"');
                } else {
                    in_quotes = false;
                }
            }
            '"' if field.trim().is_empty() && !quoted => {
                field.clear();
                in_quotes = true;
                quoted = true;
            }
            ',' if !in_quotes => finish_field(&mut field, &mut quoted, &mut fields),
            '\r' if !in_quotes => {}
            '\n' if !in_quotes => {
                finish_field(&mut field, &mut quoted, &mut fields);
                push_record(&mut records, record_line, std::mem::take(&mut fields));
                line += 1;
                record_line = line;
            }
            '\n' => {
                field.push('\n');
                line += 1;
            }
            _ if quoted && !in_quotes => {
                // Text after a closing quote belongs to the same field.
                if !ch.is_whitespace() {
                    field.push(ch);
                }
            }
            _ => field.push(ch),
        }
    }

    if in_quotes {
        return Err(CsvError::UnterminatedQuote { line: record_line });
    }
    if !field.is_empty() || !fields.is_empty() || quoted {
        finish_field(&mut field, &mut quoted, &mut fields);
        push_record(&mut records, record_line, fields);
    }

    Ok(records)
}

fn finish_field(field: &mut String, quoted: &mut bool, fields: &mut Vec<String>) {
    let value = std::mem::take(field);
    fields.push(if *quoted {
        value
    } else {
        value.trim().to_string()
    });
    *quoted = false;
}

fn push_record(records: &mut Vec<(usize, Vec<String>)>, line: usize, fields: Vec<String>) {
    let blank = fields.len() == 1 && fields[0].is_empty();
    if !blank {
        records.push((line, fields));
    }
}

#[cfg(test)]
mod tests {
    use super::{split_records, CsvError};

    fn fields(text: &str) -> Vec<Vec<String>> {
        split_records(text)
            .unwrap()
            .into_iter()
            .map(|(_, fields)| fields)
            .collect()
    }

    #[test]
    fn split_trims_unquoted_and_keeps_quoted_text() {
        assert_eq!(
            fields("a , b,\" c, d \"\n"),
            vec![vec!["a".to_string(), "b".to_string(), " c, d ".to_string()]]
        );
    }

    #[test]
    fn split_handles_escaped_quotes_and_embedded_newlines() {
        let records = split_records("x,\"say \"\"hi\"\"\nthere\"\r\ny,z").unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].1[1], "say \"hi\"\nthere");
        assert_eq!(records[1].0, 3);
        assert_eq!(records[1].1, vec!["y".to_string(), "z".to_string()]);
    }

    #[test]
    fn split_skips_blank_lines_and_keeps_trailing_empty_fields() {
        let records = fields("a,b\n\n\nc,\n");
        assert_eq!(
            records,
            vec![
                vec!["a".to_string(), "b".to_string()],
                vec!["c".to_string(), String::new()],
            ]
        );
    }

    #[test]
    fn split_rejects_unterminated_quote() {
        let err = split_records("a,b\n\"open,c").unwrap_err();
        assert!(matches!(err, CsvError::UnterminatedQuote { line: 2 }));
    }
}
