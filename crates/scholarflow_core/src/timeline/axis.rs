//! Axis range resolution and zoom scale selection.
//!
//! # Responsibility
//! - Derive the visible calendar window from items and `today`.
//! - Map zoom levels to fixed pixel-per-day densities.
//!
//! # Invariants
//! - `start` is always a first-of-month and `end` a last-of-month.
//! - `start <= first_of_month(today)` and `end >= today + 365 days`.
//! - Non-empty input: `start <= every open` and `end >= every due`.

use super::calendar::{add_days, days_between, first_of_month, last_of_month};
use super::item::TimelineItem;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

const EMPTY_LOOKBACK_DAYS: i64 = 180;
const LOOKAHEAD_DAYS: i64 = 365;
const EDGE_PADDING_DAYS: i64 = 90;

/// Named pixel-per-day density of the time axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoomLevel {
    /// Month view.
    Coarse,
    /// Week view.
    Medium,
    /// Day view; one day is roughly one calendar cell wide.
    Fine,
}

impl ZoomLevel {
    pub const ALL: [ZoomLevel; 3] = [ZoomLevel::Coarse, ZoomLevel::Medium, ZoomLevel::Fine];

    pub fn pixels_per_day(self) -> i64 {
        match self {
            Self::Coarse => 4,
            Self::Medium => 8,
            Self::Fine => 48,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Coarse => "coarse",
            Self::Medium => "medium",
            Self::Fine => "fine",
        }
    }
}

impl Display for ZoomLevel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown zoom level name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownZoomLevel(pub String);

impl Display for UnknownZoomLevel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "unknown zoom level `{}`; expected coarse|medium|fine (or month|week|day)",
            self.0
        )
    }
}

impl Error for UnknownZoomLevel {}

impl FromStr for ZoomLevel {
    type Err = UnknownZoomLevel;

    /// Accepts both level names and their view aliases.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "coarse" | "month" => Ok(Self::Coarse),
            "medium" | "week" => Ok(Self::Medium),
            "fine" | "day" => Ok(Self::Fine),
            _ => Err(UnknownZoomLevel(value.to_string())),
        }
    }
}

/// Calendar window spanned by the time axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl TimeRange {
    /// Days from `start` to `end`.
    pub fn total_days(&self) -> i64 {
        days_between(self.start, self.end)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Resolves the axis window for `items` around `today`.
///
/// Empty input spans six months back and one year ahead. Otherwise the
/// window covers every open/due date, the current month and one year
/// ahead, padded by 90 days and widened to whole months.
pub fn resolve_range<K>(items: &[TimelineItem<K>], today: NaiveDate) -> TimeRange {
    let horizon = last_of_month(add_days(today, LOOKAHEAD_DAYS));

    if items.is_empty() {
        return TimeRange {
            start: first_of_month(add_days(today, -EMPTY_LOOKBACK_DAYS)),
            end: horizon,
        };
    }

    let current_month = first_of_month(today);
    let (earliest, latest) = items
        .iter()
        .flat_map(|item| [item.open, item.due])
        .fold((current_month, horizon), |(lo, hi), date| {
            (lo.min(date), hi.max(date))
        });

    TimeRange {
        start: first_of_month(add_days(earliest, -EDGE_PADDING_DAYS)),
        end: last_of_month(add_days(latest, EDGE_PADDING_DAYS)),
    }
}

#[cfg(test)]
mod tests {
    use super::{resolve_range, TimeRange, ZoomLevel};
    use crate::timeline::item::TimelineItem;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid test date")
    }

    #[test]
    fn empty_items_use_fixed_window() {
        let range = resolve_range::<u32>(&[], date(2024, 6, 15));
        // 2024-06-15 - 180d = 2023-12-18; + 365d = 2025-06-15.
        assert_eq!(
            range,
            TimeRange {
                start: date(2023, 12, 1),
                end: date(2025, 6, 30),
            }
        );
    }

    #[test]
    fn items_inside_default_window_still_pad_today_anchors() {
        let items = [TimelineItem::new(1, date(2024, 7, 1), date(2024, 7, 15))];
        let range = resolve_range(&items, date(2024, 6, 15));
        // earliest = 2024-06-01 -> -90d = 2024-03-03; latest = 2025-06-30 -> +90d.
        assert_eq!(range.start, date(2024, 3, 1));
        assert_eq!(range.end, date(2025, 9, 30));
    }

    #[test]
    fn far_items_extend_the_window() {
        let items = [
            TimelineItem::new("old", date(2020, 1, 10), date(2020, 2, 1)),
            TimelineItem::new("late", date(2026, 1, 1), date(2027, 5, 20)),
        ];
        let range = resolve_range(&items, date(2024, 6, 15));
        assert_eq!(range.start, date(2019, 10, 1));
        assert_eq!(range.end, date(2027, 8, 31));
    }

    #[test]
    fn reversed_item_dates_are_both_covered() {
        let items = [TimelineItem::new(0, date(2030, 3, 1), date(2018, 3, 1))];
        let range = resolve_range(&items, date(2024, 6, 15));
        assert!(range.contains(date(2030, 3, 1)));
        assert!(range.contains(date(2018, 3, 1)));
    }

    #[test]
    fn zoom_scale_is_positive_and_parses_aliases() {
        for zoom in ZoomLevel::ALL {
            assert!(zoom.pixels_per_day() > 0);
            assert_eq!(zoom.as_str().parse::<ZoomLevel>().unwrap(), zoom);
        }
        assert_eq!("Month".parse::<ZoomLevel>().unwrap(), ZoomLevel::Coarse);
        assert_eq!(" week ".parse::<ZoomLevel>().unwrap(), ZoomLevel::Medium);
        assert_eq!("day".parse::<ZoomLevel>().unwrap(), ZoomLevel::Fine);
        assert!("year".parse::<ZoomLevel>().is_err());
    }
}
