//! Current-moment marker and scroll targets.
//!
//! # Invariants
//! - The marker is emitted only when `today` lies inside the axis width.
//! - Scroll targets are finite and never negative; an unavailable viewport
//!   (unknown, zero, negative or non-finite width) yields `0.0`.
//! - Only target offsets are returned; how a renderer moves there is not
//!   part of this contract.

use super::axis::TimeRange;
use super::calendar::days_between;
use super::geometry::ItemGeometry;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Position of the "today" indicator on the axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodayMarker {
    pub offset_px: i64,
    /// Day-of-month shown on the marker badge.
    pub day: u32,
}

/// Places the today marker, or `None` when `today` is off the axis.
pub fn today_marker(
    range: &TimeRange,
    pixels_per_day: i64,
    today: NaiveDate,
) -> Option<TodayMarker> {
    let offset_px = days_between(range.start, today).saturating_mul(pixels_per_day);
    let axis_width = range.total_days().saturating_mul(pixels_per_day);
    (0..=axis_width).contains(&offset_px).then(|| TodayMarker {
        offset_px,
        day: today.day(),
    })
}

/// Scroll offset that centers `today_offset_px` in the viewport.
pub fn initial_scroll_px(today_offset_px: i64, viewport_width: Option<f64>) -> f64 {
    center_in_viewport(today_offset_px as f64, viewport_width)
}

/// Scroll offset that centers `bar` in the viewport.
pub fn scroll_to_item<K>(bar: &ItemGeometry<K>, viewport_width: Option<f64>) -> f64 {
    center_in_viewport(bar.center_px(), viewport_width)
}

fn center_in_viewport(target_px: f64, viewport_width: Option<f64>) -> f64 {
    let Some(width) = viewport_width.filter(|width| width.is_finite() && *width > 0.0) else {
        return 0.0;
    };
    let scroll = target_px - width / 2.0;
    if scroll.is_finite() {
        scroll.max(0.0)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::{initial_scroll_px, scroll_to_item, today_marker, TodayMarker};
    use crate::timeline::axis::TimeRange;
    use crate::timeline::geometry::ItemGeometry;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid test date")
    }

    #[test]
    fn initial_scroll_centers_today() {
        assert_eq!(initial_scroll_px(5000, Some(1000.0)), 4500.0);
        assert_eq!(initial_scroll_px(300, Some(1000.0)), 0.0);
        assert_eq!(initial_scroll_px(5001, Some(999.0)), 4501.5);
    }

    #[test]
    fn unavailable_viewport_degrades_to_zero() {
        for viewport in [None, Some(0.0), Some(-10.0), Some(f64::NAN), Some(f64::INFINITY)] {
            assert_eq!(initial_scroll_px(5000, viewport), 0.0);
        }
    }

    #[test]
    fn scroll_to_item_centers_bar() {
        let bar = ItemGeometry {
            id: "x",
            row: 3,
            left_px: 2000,
            width_px: 400,
        };
        assert_eq!(scroll_to_item(&bar, Some(800.0)), 1800.0);
        assert_eq!(scroll_to_item(&bar, None), 0.0);
    }

    #[test]
    fn marker_only_inside_range() {
        let range = TimeRange {
            start: date(2024, 3, 1),
            end: date(2024, 3, 31),
        };
        assert_eq!(
            today_marker(&range, 8, date(2024, 3, 11)),
            Some(TodayMarker {
                offset_px: 80,
                day: 11
            })
        );
        assert_eq!(today_marker(&range, 8, date(2024, 3, 1)).unwrap().offset_px, 0);
        assert_eq!(today_marker(&range, 8, date(2024, 3, 31)).unwrap().offset_px, 240);
        assert!(today_marker(&range, 8, date(2024, 2, 29)).is_none());
        assert!(today_marker(&range, 8, date(2024, 4, 1)).is_none());
    }
}
