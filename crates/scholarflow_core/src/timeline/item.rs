//! Timeline input items and ISO-8601 date parsing.
//!
//! # Responsibility
//! - Define the minimal item shape the layout engine reads.
//! - Parse upstream ISO-8601 date strings into calendar dates.
//!
//! # Invariants
//! - Time-of-day suffixes (`T...` or ` ...`) are ignored, never compared.
//! - The layout engine itself never parses; invalid input fails here.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

static ISO_DATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{4})-(\d{2})-(\d{2})(?:[T ].*)?$").expect("valid iso date regex")
});

/// Upstream date string that is not a parseable calendar date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidDateInput {
    pub value: String,
}

impl Display for InvalidDateInput {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid calendar date `{}`; expected YYYY-MM-DD", self.value)
    }
}

impl Error for InvalidDateInput {}

/// Parses `YYYY-MM-DD`, optionally followed by a time-of-day part.
///
/// # Errors
/// - Returns [`InvalidDateInput`] for malformed text or out-of-range
///   month/day values (e.g. `2023-02-29`).
pub fn parse_iso_date(value: &str) -> Result<NaiveDate, InvalidDateInput> {
    let invalid = || InvalidDateInput {
        value: value.to_string(),
    };

    let captures = ISO_DATE_RE.captures(value.trim()).ok_or_else(invalid)?;
    let year = captures[1].parse::<i32>().map_err(|_| invalid())?;
    let month = captures[2].parse::<u32>().map_err(|_| invalid())?;
    let day = captures[3].parse::<u32>().map_err(|_| invalid())?;

    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(invalid)
}

/// One date-ranged record as seen by the layout engine.
///
/// `due` is usually on or after `open`, but this is not required: reversed
/// ranges are laid out with the minimum bar width.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineItem<K> {
    pub id: K,
    pub open: NaiveDate,
    pub due: NaiveDate,
}

impl<K> TimelineItem<K> {
    pub fn new(id: K, open: NaiveDate, due: NaiveDate) -> Self {
        Self { id, open, due }
    }

    /// Builds an item from upstream ISO-8601 strings.
    pub fn from_iso(id: K, open: &str, due: &str) -> Result<Self, InvalidDateInput> {
        Ok(Self {
            id,
            open: parse_iso_date(open)?,
            due: parse_iso_date(due)?,
        })
    }
}
