//! Axis grid lines and labels per zoom level.
//!
//! # Responsibility
//! - Generate month/week/day boundaries along the axis, lazily.
//! - Attach the labels a renderer needs for each boundary.
//!
//! # Invariants
//! - Marks are produced in date order; a month header shares the offset of
//!   the boundary that follows it.
//! - Coarse output has exactly one mark per month spanned by the range.
//! - Iteration never mutates the range; cloning an unstarted generator
//!   restarts from the first mark.

use super::axis::{TimeRange, ZoomLevel};
use super::calendar::{
    add_days, days_between, first_of_month, month_abbrev, next_month_start, week_start,
    weekday_initial,
};
use chrono::{Datelike, Days, NaiveDate};
use serde::Serialize;

/// Text attached to one axis mark.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AxisLabel {
    /// Coarse boundary; `year` is set when it differs from the previous mark.
    Month {
        name: &'static str,
        year: Option<i32>,
    },
    /// Section header opening a new month in week/day views.
    MonthHeader { name: &'static str },
    /// Medium boundary covering Monday..Sunday (day-of-month numbers).
    WeekSpan { first_day: u32, last_day: u32 },
    /// Fine boundary; `is_today` marks the highlighted cell.
    Day {
        weekday: char,
        day: u32,
        is_today: bool,
    },
}

/// One grid line and/or label positioned on the axis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AxisMark {
    pub date: NaiveDate,
    pub offset_px: i64,
    /// `false` for pure labels such as month headers.
    pub grid_line: bool,
    pub label: AxisLabel,
}

/// Lazy, finite generator of [`AxisMark`]s for one range and zoom.
#[derive(Debug, Clone)]
pub struct AxisDecorations {
    range: TimeRange,
    zoom: ZoomLevel,
    pixels_per_day: i64,
    today: NaiveDate,
    cursor: Option<NaiveDate>,
    last_year: Option<i32>,
    last_month: Option<(i32, u32)>,
    pending: Option<AxisMark>,
}

impl AxisDecorations {
    /// Creates a generator positioned before the first boundary.
    ///
    /// Week boundaries start at the Monday on or before `range.start`, so the
    /// first week mark may carry a negative offset.
    pub fn new(range: TimeRange, zoom: ZoomLevel, today: NaiveDate) -> Self {
        let first = match zoom {
            ZoomLevel::Coarse => first_of_month(range.start),
            ZoomLevel::Medium => week_start(range.start),
            ZoomLevel::Fine => range.start,
        };
        Self {
            range,
            zoom,
            pixels_per_day: zoom.pixels_per_day(),
            today,
            cursor: Some(first),
            last_year: None,
            last_month: None,
            pending: None,
        }
    }

    fn advance(&self, date: NaiveDate) -> Option<NaiveDate> {
        match self.zoom {
            ZoomLevel::Coarse => next_month_start(date),
            ZoomLevel::Medium => date.checked_add_days(Days::new(7)),
            ZoomLevel::Fine => date.succ_opt(),
        }
    }

    fn offset_px(&self, date: NaiveDate) -> i64 {
        days_between(self.range.start, date).saturating_mul(self.pixels_per_day)
    }

    /// Returns a month header first when `boundary` opens a new month,
    /// parking the boundary until the next call.
    fn with_month_header(&mut self, boundary: AxisMark) -> AxisMark {
        let key = (boundary.date.year(), boundary.date.month());
        if self.last_month == Some(key) {
            return boundary;
        }
        self.last_month = Some(key);
        let header = AxisMark {
            date: boundary.date,
            offset_px: boundary.offset_px,
            grid_line: false,
            label: AxisLabel::MonthHeader {
                name: month_abbrev(boundary.date),
            },
        };
        self.pending = Some(boundary);
        header
    }
}

impl Iterator for AxisDecorations {
    type Item = AxisMark;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(mark) = self.pending.take() {
            return Some(mark);
        }

        let date = self.cursor.filter(|date| *date <= self.range.end)?;
        self.cursor = self.advance(date);
        let offset_px = self.offset_px(date);

        let mark = match self.zoom {
            ZoomLevel::Coarse => {
                let year = date.year();
                let show_year = self.last_year != Some(year);
                self.last_year = Some(year);
                AxisMark {
                    date,
                    offset_px,
                    grid_line: true,
                    label: AxisLabel::Month {
                        name: month_abbrev(date),
                        year: show_year.then_some(year),
                    },
                }
            }
            ZoomLevel::Medium => {
                let boundary = AxisMark {
                    date,
                    offset_px,
                    grid_line: true,
                    label: AxisLabel::WeekSpan {
                        first_day: date.day(),
                        last_day: add_days(date, 6).day(),
                    },
                };
                self.with_month_header(boundary)
            }
            ZoomLevel::Fine => {
                let boundary = AxisMark {
                    date,
                    offset_px,
                    grid_line: true,
                    label: AxisLabel::Day {
                        weekday: weekday_initial(date),
                        day: date.day(),
                        is_today: date == self.today,
                    },
                };
                self.with_month_header(boundary)
            }
        };

        Some(mark)
    }
}

#[cfg(test)]
mod tests {
    use super::{AxisDecorations, AxisLabel};
    use crate::timeline::axis::{TimeRange, ZoomLevel};
    use crate::timeline::calendar::months_spanned;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid test date")
    }

    fn range(start: NaiveDate, end: NaiveDate) -> TimeRange {
        TimeRange { start, end }
    }

    #[test]
    fn coarse_marks_one_per_month_with_year_on_change() {
        let window = range(date(2023, 11, 1), date(2024, 2, 29));
        let marks: Vec<_> =
            AxisDecorations::new(window, ZoomLevel::Coarse, date(2024, 1, 5)).collect();

        assert_eq!(marks.len() as i64, months_spanned(window.start, window.end));
        let labels: Vec<_> = marks.iter().map(|mark| mark.label.clone()).collect();
        assert_eq!(
            labels,
            vec![
                AxisLabel::Month {
                    name: "Nov",
                    year: Some(2023),
                },
                AxisLabel::Month {
                    name: "Dec",
                    year: None,
                },
                AxisLabel::Month {
                    name: "Jan",
                    year: Some(2024),
                },
                AxisLabel::Month {
                    name: "Feb",
                    year: None,
                },
            ]
        );
        // Nov 30 + Dec 31 = 61 days before January.
        assert_eq!(marks[2].offset_px, 61 * 4);
        assert!(marks.iter().all(|mark| mark.grid_line));
    }

    #[test]
    fn medium_marks_start_on_monday_and_label_spans() {
        // 2024-03-01 is a Friday; its week starts on 2024-02-26.
        let window = range(date(2024, 3, 1), date(2024, 3, 31));
        let marks: Vec<_> =
            AxisDecorations::new(window, ZoomLevel::Medium, date(2024, 3, 10)).collect();

        assert_eq!(marks[0].label, AxisLabel::MonthHeader { name: "Feb" });
        assert!(!marks[0].grid_line);
        assert_eq!(marks[1].date, date(2024, 2, 26));
        assert_eq!(marks[1].offset_px, -4 * 8);
        assert_eq!(
            marks[1].label,
            AxisLabel::WeekSpan {
                first_day: 26,
                last_day: 3,
            }
        );
        assert_eq!(marks[2].label, AxisLabel::MonthHeader { name: "Mar" });
        assert_eq!(marks[3].date, date(2024, 3, 4));

        let weeks = marks.iter().filter(|mark| mark.grid_line).count();
        // Mondays: Feb 26, Mar 4, 11, 18, 25.
        assert_eq!(weeks, 5);
    }

    #[test]
    fn fine_marks_every_day_and_flags_today() {
        let window = range(date(2024, 1, 30), date(2024, 2, 2));
        let marks: Vec<_> =
            AxisDecorations::new(window, ZoomLevel::Fine, date(2024, 2, 1)).collect();

        let days: Vec<_> = marks.iter().filter(|mark| mark.grid_line).collect();
        assert_eq!(days.len(), 4);
        let headers: Vec<_> = marks
            .iter()
            .filter_map(|mark| match mark.label {
                AxisLabel::MonthHeader { name } => Some((name, mark.date)),
                _ => None,
            })
            .collect();
        assert_eq!(headers, vec![("Jan", date(2024, 1, 30)), ("Feb", date(2024, 2, 1))]);

        let today: Vec<_> = days
            .iter()
            .filter(|mark| matches!(mark.label, AxisLabel::Day { is_today: true, .. }))
            .collect();
        assert_eq!(today.len(), 1);
        assert_eq!(today[0].date, date(2024, 2, 1));
        assert_eq!(
            today[0].label,
            AxisLabel::Day {
                weekday: 'T',
                day: 1,
                is_today: true,
            }
        );
        assert_eq!(today[0].offset_px, 2 * 48);
    }

    #[test]
    fn cloned_generator_restarts_independently() {
        let window = range(date(2024, 1, 1), date(2024, 12, 31));
        let generator = AxisDecorations::new(window, ZoomLevel::Coarse, date(2024, 6, 1));
        let first: Vec<_> = generator.clone().collect();
        let second: Vec<_> = generator.collect();
        assert_eq!(first, second);
        assert_eq!(first.len(), 12);
    }
}
