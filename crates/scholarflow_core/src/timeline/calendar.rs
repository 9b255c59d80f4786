//! Calendar-date arithmetic shared by the layout calculators.
//!
//! # Invariants
//! - All helpers are total: arithmetic that leaves chrono's representable
//!   range saturates at `NaiveDate::MIN`/`NaiveDate::MAX` instead of panicking.
//! - Weeks start on Monday.

use chrono::{Datelike, Days, Months, NaiveDate};

const MONTH_ABBREVIATIONS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];
const WEEKDAY_INITIALS: [char; 7] = ['M', 'T', 'W', 'T', 'F', 'S', 'S'];

/// Whole days from `from` to `to` (negative when `to` is earlier).
pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    to.signed_duration_since(from).num_days()
}

/// Shifts `date` by `days`, saturating at the representable bounds.
pub fn add_days(date: NaiveDate, days: i64) -> NaiveDate {
    if days >= 0 {
        date.checked_add_days(Days::new(days.unsigned_abs()))
            .unwrap_or(NaiveDate::MAX)
    } else {
        date.checked_sub_days(Days::new(days.unsigned_abs()))
            .unwrap_or(NaiveDate::MIN)
    }
}

pub fn first_of_month(date: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(date.year(), date.month(), 1).unwrap_or(date)
}

pub fn last_of_month(date: NaiveDate) -> NaiveDate {
    next_month_start(date)
        .and_then(|next| next.pred_opt())
        .unwrap_or(NaiveDate::MAX)
}

/// First day of the month after `date`'s month, if representable.
pub fn next_month_start(date: NaiveDate) -> Option<NaiveDate> {
    first_of_month(date).checked_add_months(Months::new(1))
}

/// Monday on or before `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    let back = i64::from(date.weekday().num_days_from_monday());
    add_days(date, -back)
}

pub fn month_abbrev(date: NaiveDate) -> &'static str {
    MONTH_ABBREVIATIONS[date.month0() as usize]
}

/// Single-letter weekday abbreviation (`M T W T F S S`).
pub fn weekday_initial(date: NaiveDate) -> char {
    WEEKDAY_INITIALS[date.weekday().num_days_from_monday() as usize]
}

/// Number of calendar months touched by `[start, end]`, inclusive.
pub fn months_spanned(start: NaiveDate, end: NaiveDate) -> i64 {
    if end < start {
        return 0;
    }
    let start_index = i64::from(start.year()) * 12 + i64::from(start.month0());
    let end_index = i64::from(end.year()) * 12 + i64::from(end.month0());
    end_index - start_index + 1
}

#[cfg(test)]
mod tests {
    use super::{
        add_days, days_between, first_of_month, last_of_month, month_abbrev, months_spanned,
        week_start, weekday_initial,
    };
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid test date")
    }

    #[test]
    fn month_bounds_handle_leap_february() {
        assert_eq!(first_of_month(date(2024, 2, 17)), date(2024, 2, 1));
        assert_eq!(last_of_month(date(2024, 2, 17)), date(2024, 2, 29));
        assert_eq!(last_of_month(date(2023, 2, 1)), date(2023, 2, 28));
        assert_eq!(last_of_month(date(2024, 12, 31)), date(2024, 12, 31));
    }

    #[test]
    fn add_days_saturates_instead_of_panicking() {
        assert_eq!(add_days(date(2024, 1, 31), 1), date(2024, 2, 1));
        assert_eq!(add_days(date(2024, 3, 1), -1), date(2024, 2, 29));
        assert_eq!(add_days(NaiveDate::MAX, 10), NaiveDate::MAX);
        assert_eq!(add_days(NaiveDate::MIN, -10), NaiveDate::MIN);
    }

    #[test]
    fn days_between_is_signed() {
        assert_eq!(days_between(date(2024, 7, 1), date(2024, 7, 15)), 14);
        assert_eq!(days_between(date(2024, 7, 15), date(2024, 7, 1)), -14);
    }

    #[test]
    fn week_start_is_monday() {
        // 2024-06-15 is a Saturday.
        assert_eq!(week_start(date(2024, 6, 15)), date(2024, 6, 10));
        assert_eq!(week_start(date(2024, 6, 10)), date(2024, 6, 10));
        assert_eq!(weekday_initial(date(2024, 6, 10)), 'M');
        assert_eq!(weekday_initial(date(2024, 6, 16)), 'S');
    }

    #[test]
    fn months_spanned_counts_inclusively() {
        assert_eq!(months_spanned(date(2024, 1, 1), date(2024, 1, 31)), 1);
        assert_eq!(months_spanned(date(2023, 11, 1), date(2024, 2, 29)), 4);
        assert_eq!(months_spanned(date(2024, 2, 1), date(2024, 1, 1)), 0);
        assert_eq!(month_abbrev(date(2024, 9, 3)), "Sep");
    }
}
