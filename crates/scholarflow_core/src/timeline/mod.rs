//! Timeline layout engine.
//!
//! # Responsibility
//! - Turn date-ranged items into axis range, bar geometry, axis decorations,
//!   a today marker and scroll targets.
//! - Stay independent of any rendering toolkit: outputs are plain values.
//!
//! # Invariants
//! - Every calculation is a pure function of `(items, today, zoom)`; `today`
//!   is always passed in, never read from the clock here.
//! - Inputs are never mutated and nothing is cached between passes.
//! - Dates are assumed valid; parsing failures surface upstream as
//!   [`InvalidDateInput`].

pub mod axis;
pub mod calendar;
pub mod decoration;
pub mod geometry;
pub mod item;
pub mod scroll;

pub use axis::{resolve_range, TimeRange, UnknownZoomLevel, ZoomLevel};
pub use decoration::{AxisDecorations, AxisLabel, AxisMark};
pub use geometry::{item_geometry, ItemGeometry, MIN_BAR_WIDTH_PX};
pub use item::{parse_iso_date, InvalidDateInput, TimelineItem};
pub use scroll::{initial_scroll_px, scroll_to_item, today_marker, TodayMarker};

use chrono::NaiveDate;
use log::debug;
use serde::Serialize;

/// Result of one layout pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimelineLayout<K> {
    pub today: NaiveDate,
    pub zoom: ZoomLevel,
    pub range: TimeRange,
    pub pixels_per_day: i64,
    /// Full axis width in pixels (`range.total_days() * pixels_per_day`).
    pub total_width_px: i64,
    /// One entry per input item, in input order.
    pub bars: Vec<ItemGeometry<K>>,
    pub today_marker: Option<TodayMarker>,
}

impl<K: Clone + PartialEq> TimelineLayout<K> {
    /// Runs range resolution, scale selection, geometry and marker placement.
    pub fn compute(items: &[TimelineItem<K>], today: NaiveDate, zoom: ZoomLevel) -> Self {
        let range = resolve_range(items, today);
        let pixels_per_day = zoom.pixels_per_day();
        let bars = item_geometry(items, &range, pixels_per_day);
        let today_marker = today_marker(&range, pixels_per_day, today);

        debug!(
            "event=timeline_layout module=timeline status=ok zoom={} items={} range_days={}",
            zoom,
            bars.len(),
            range.total_days()
        );

        Self {
            today,
            zoom,
            range,
            pixels_per_day,
            total_width_px: range.total_days().saturating_mul(pixels_per_day),
            bars,
            today_marker,
        }
    }

    /// Fresh decoration sequence for this pass.
    pub fn decorations(&self) -> AxisDecorations {
        AxisDecorations::new(self.range, self.zoom, self.today)
    }

    pub fn geometry_for(&self, id: &K) -> Option<&ItemGeometry<K>> {
        self.bars.iter().find(|bar| bar.id == *id)
    }

    /// Scroll offset that centers today; `0.0` when today is off the axis.
    pub fn initial_scroll_px(&self, viewport_width: Option<f64>) -> f64 {
        self.today_marker
            .map(|marker| initial_scroll_px(marker.offset_px, viewport_width))
            .unwrap_or(0.0)
    }

    /// Scroll offset that centers the bar of `id`, if it is laid out.
    pub fn scroll_to(&self, id: &K, viewport_width: Option<f64>) -> Option<f64> {
        self.geometry_for(id).map(|bar| scroll_to_item(bar, viewport_width))
    }
}

#[cfg(test)]
mod tests {
    use super::{AxisLabel, TimelineItem, TimelineLayout, ZoomLevel};
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid test date")
    }

    #[test]
    fn layout_pass_combines_all_calculators() {
        let today = date(2024, 6, 15);
        let items = vec![
            TimelineItem::new("b", date(2024, 9, 1), date(2024, 10, 1)),
            TimelineItem::new("a", date(2024, 7, 1), date(2024, 7, 15)),
        ];

        let layout = TimelineLayout::compute(&items, today, ZoomLevel::Coarse);
        assert_eq!(layout.pixels_per_day, 4);
        assert_eq!(layout.bars.len(), 2);
        assert_eq!(layout.bars[1].width_px, 56);
        assert_eq!(layout.total_width_px, layout.range.total_days() * 4);

        let marker = layout.today_marker.expect("today is inside the range");
        assert_eq!(marker.day, 15);
        assert_eq!(
            layout.initial_scroll_px(Some(1000.0)),
            (marker.offset_px as f64 - 500.0).max(0.0)
        );

        let bar = layout.geometry_for(&"a").unwrap();
        assert_eq!(
            layout.scroll_to(&"a", Some(200.0)),
            Some(bar.left_px as f64 + 28.0 - 100.0)
        );
        assert_eq!(layout.scroll_to(&"missing", Some(200.0)), None);
    }

    #[test]
    fn decorations_regenerate_per_call() {
        let layout = TimelineLayout::<u8>::compute(&[], date(2024, 6, 15), ZoomLevel::Fine);
        let first = layout.decorations().count();
        let second = layout.decorations().count();
        assert_eq!(first, second);

        let highlighted = layout
            .decorations()
            .filter(|mark| matches!(mark.label, AxisLabel::Day { is_today: true, .. }))
            .count();
        assert_eq!(highlighted, 1);
    }
}
