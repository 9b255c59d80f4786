//! Per-item bar geometry.
//!
//! # Invariants
//! - One row per item, in input order; no overlap packing.
//! - `width_px >= MIN_BAR_WIDTH_PX`, including zero-length and reversed
//!   (`due < open`) ranges.

use super::axis::TimeRange;
use super::calendar::days_between;
use super::item::TimelineItem;
use serde::{Deserialize, Serialize};

/// Narrowest bar the layout emits, so short or reversed ranges stay clickable.
pub const MIN_BAR_WIDTH_PX: i64 = 20;

/// Pixel placement of one item under one range and zoom.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemGeometry<K> {
    pub id: K,
    pub row: usize,
    pub left_px: i64,
    pub width_px: i64,
}

impl<K> ItemGeometry<K> {
    /// Horizontal center of the bar.
    pub fn center_px(&self) -> f64 {
        self.left_px as f64 + self.width_px as f64 / 2.0
    }
}

/// Lays out `items` against `range` at `pixels_per_day`.
pub fn item_geometry<K: Clone>(
    items: &[TimelineItem<K>],
    range: &TimeRange,
    pixels_per_day: i64,
) -> Vec<ItemGeometry<K>> {
    items
        .iter()
        .enumerate()
        .map(|(row, item)| {
            let start_offset = days_between(range.start, item.open);
            let duration = days_between(item.open, item.due);
            ItemGeometry {
                id: item.id.clone(),
                row,
                left_px: start_offset.saturating_mul(pixels_per_day),
                width_px: duration
                    .saturating_mul(pixels_per_day)
                    .max(MIN_BAR_WIDTH_PX),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{item_geometry, MIN_BAR_WIDTH_PX};
    use crate::timeline::axis::{TimeRange, ZoomLevel};
    use crate::timeline::item::TimelineItem;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid test date")
    }

    fn range() -> TimeRange {
        TimeRange {
            start: date(2024, 3, 1),
            end: date(2025, 9, 30),
        }
    }

    #[test]
    fn two_week_item_in_coarse_view() {
        let items = [TimelineItem::new("a", date(2024, 7, 1), date(2024, 7, 15))];
        let bars = item_geometry(&items, &range(), ZoomLevel::Coarse.pixels_per_day());
        assert_eq!(bars[0].row, 0);
        // March 1 -> July 1 is 122 days.
        assert_eq!(bars[0].left_px, 122 * 4);
        assert_eq!(bars[0].width_px, 56);
    }

    #[test]
    fn zero_and_negative_durations_hit_the_floor() {
        let items = [
            TimelineItem::new(1, date(2024, 5, 5), date(2024, 5, 5)),
            TimelineItem::new(2, date(2024, 5, 5), date(2024, 4, 1)),
            TimelineItem::new(3, date(2024, 5, 5), date(2024, 5, 7)),
        ];
        for zoom in ZoomLevel::ALL {
            let bars = item_geometry(&items, &range(), zoom.pixels_per_day());
            assert!(bars.iter().all(|bar| bar.width_px >= MIN_BAR_WIDTH_PX));
            assert_eq!(bars[0].width_px, MIN_BAR_WIDTH_PX);
            assert_eq!(bars[1].width_px, MIN_BAR_WIDTH_PX);
        }
        let fine = item_geometry(&items, &range(), ZoomLevel::Fine.pixels_per_day());
        assert_eq!(fine[2].width_px, 96);
    }

    #[test]
    fn rows_follow_input_order_and_left_is_monotonic_in_open_date() {
        let items = [
            TimelineItem::new('c', date(2024, 9, 1), date(2024, 9, 2)),
            TimelineItem::new('a', date(2024, 3, 1), date(2024, 12, 1)),
            TimelineItem::new('b', date(2024, 6, 1), date(2024, 6, 30)),
        ];
        let bars = item_geometry(&items, &range(), ZoomLevel::Medium.pixels_per_day());
        let rows: Vec<(char, usize)> = bars.iter().map(|bar| (bar.id, bar.row)).collect();
        assert_eq!(rows, vec![('c', 0), ('a', 1), ('b', 2)]);

        let mut by_open: Vec<_> = items.iter().zip(&bars).collect();
        by_open.sort_by_key(|(item, _)| item.open);
        assert!(by_open
            .windows(2)
            .all(|pair| pair[0].1.left_px <= pair[1].1.left_px));
        assert_eq!(bars[1].left_px, 0);
    }
}
