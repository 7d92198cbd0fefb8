//! Scales and ticks shared by every facet.
//!
//! Dates are mapped through their day number so the time axis is a plain
//! `f64` range, the same coordinate the SVG chart is built on.

use chrono::{Datelike, Days, NaiveDate};

/// Days added on each side of the data's date extent.
pub const DOMAIN_PAD_DAYS: u64 = 14;
/// Domains longer than this many 30-day months get bimonthly ticks.
const MONTHLY_TICK_THRESHOLD: f64 = 6.0;
/// Multiplier applied to a facet's largest value.
const VALUE_HEADROOM: f64 = 1.1;

pub fn day_number(date: NaiveDate) -> f64 {
    date.num_days_from_ce() as f64
}

/// Shared time axis: the padded extent of every date on the chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeDomain {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl TimeDomain {
    /// `[min - 14d, max + 14d]`, or `None` when there are no dates at all.
    pub fn from_dates(dates: impl IntoIterator<Item = NaiveDate>) -> Option<Self> {
        let mut extent: Option<(NaiveDate, NaiveDate)> = None;
        for d in dates {
            extent = Some(match extent {
                None => (d, d),
                Some((lo, hi)) => (lo.min(d), hi.max(d)),
            });
        }
        let (lo, hi) = extent?;
        let pad = Days::new(DOMAIN_PAD_DAYS);
        Some(Self {
            start: lo.checked_sub_days(pad).unwrap_or(lo),
            end: hi.checked_add_days(pad).unwrap_or(hi),
        })
    }

    pub fn span_days(&self) -> i64 {
        (self.end - self.start).num_days()
    }

    /// More than six 30-day months: bimonthly ticks with slanted labels.
    pub fn is_long(&self) -> bool {
        self.span_days() as f64 / 30.0 > MONTHLY_TICK_THRESHOLD
    }

    /// Tick dates inside the domain: the first of every other month (Jan,
    /// Mar, ...) for long domains, otherwise every fourth Sunday.
    pub fn ticks(&self) -> Vec<NaiveDate> {
        if self.is_long() {
            self.bimonthly_ticks()
        } else {
            self.four_weekly_ticks()
        }
    }

    fn bimonthly_ticks(&self) -> Vec<NaiveDate> {
        let mut out = Vec::new();
        let (mut year, mut month) = (self.start.year(), self.start.month());
        while let Some(first) = NaiveDate::from_ymd_opt(year, month, 1) {
            if first > self.end {
                break;
            }
            if first >= self.start && (month - 1) % 2 == 0 {
                out.push(first);
            }
            (year, month) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
        }
        out
    }

    fn four_weekly_ticks(&self) -> Vec<NaiveDate> {
        // Sunday-based weeks counted from the first Sunday of 1970.
        let Some(anchor) = NaiveDate::from_ymd_opt(1970, 1, 4) else {
            return Vec::new();
        };
        let offset = u64::from(self.start.weekday().num_days_from_sunday());
        let first_sunday = if offset == 0 {
            Some(self.start)
        } else {
            self.start.checked_add_days(Days::new(7 - offset))
        };

        let mut out = Vec::new();
        let mut cursor = first_sunday;
        while let Some(sunday) = cursor.filter(|d| *d <= self.end) {
            let week_count = (sunday - anchor).num_days() / 7 + 1;
            if week_count.rem_euclid(4) == 0 {
                out.push(sunday);
            }
            cursor = sunday.checked_add_days(Days::new(7));
        }
        out
    }
}

pub fn tick_label(date: NaiveDate) -> String {
    date.format("%b %d").to_string()
}

/// Maps a [`TimeDomain`] onto `[0, width]` pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeScale {
    start: f64,
    end: f64,
    width: f64,
}

impl TimeScale {
    pub fn new(domain: TimeDomain, width: f64) -> Self {
        Self {
            start: day_number(domain.start),
            end: day_number(domain.end),
            width,
        }
    }

    pub fn apply(&self, date: NaiveDate) -> f64 {
        (day_number(date) - self.start) / (self.end - self.start) * self.width
    }

    /// Pixel offset back to a (fractional) day number.
    pub fn invert(&self, px: f64) -> f64 {
        self.start + px / self.width * (self.end - self.start)
    }
}

/// A facet's value axis, `[0, max]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    max: f64,
}

impl LinearScale {
    pub fn new(max: f64) -> Self {
        Self { max }
    }

    pub fn max(&self) -> f64 {
        self.max
    }
}

/// Upper end of a facet's value axis: the largest value plus 10%, or `1.0`
/// when there is nothing positive to show. Always finite; headroom is dropped
/// when it would overflow.
pub fn value_max(values: impl IntoIterator<Item = f64>) -> f64 {
    let max = values.into_iter().filter(|v| v.is_finite()).fold(f64::NEG_INFINITY, f64::max);
    if !(max.is_finite() && max > 0.0) {
        return 1.0;
    }
    let padded = max * VALUE_HEADROOM;
    if padded.is_finite() { padded } else { max }
}

#[cfg(test)]
mod tests {
    use chrono::Weekday;

    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn domain_pads_two_weeks_each_side() {
        let domain = TimeDomain::from_dates([date(2024, 7, 6), date(2024, 12, 28), date(2024, 9, 1)]).unwrap();
        assert_eq!(domain.start, date(2024, 6, 22));
        assert_eq!(domain.end, date(2025, 1, 11));
        assert!(TimeDomain::from_dates(std::iter::empty()).is_none());
    }

    #[test]
    fn long_domains_tick_every_other_month() {
        let domain = TimeDomain { start: date(2024, 6, 22), end: date(2025, 1, 11) };
        assert_eq!(
            domain.ticks(),
            vec![date(2024, 7, 1), date(2024, 9, 1), date(2024, 11, 1), date(2025, 1, 1)]
        );
        assert_eq!(tick_label(date(2024, 9, 1)), "Sep 01");
    }

    #[test]
    fn short_domains_tick_every_fourth_sunday() {
        let domain = TimeDomain { start: date(2024, 11, 1), end: date(2025, 1, 31) };
        let ticks = domain.ticks();
        assert!(!ticks.is_empty());
        assert!(ticks.iter().all(|d| d.weekday() == Weekday::Sun));
        assert!(ticks.windows(2).all(|w| (w[1] - w[0]).num_days() == 28));
    }

    #[test]
    fn time_scale_inverts() {
        let domain = TimeDomain { start: date(2024, 1, 1), end: date(2024, 1, 11) };
        let scale = TimeScale::new(domain, 420.0);
        assert_eq!(scale.apply(date(2024, 1, 1)), 0.0);
        assert_eq!(scale.apply(date(2024, 1, 11)), 420.0);
        assert_eq!(scale.invert(210.0), day_number(date(2024, 1, 6)));
    }

    #[test]
    fn value_axis_has_headroom_and_fallback() {
        assert!((value_max([10.0, 100.0]) - 110.0).abs() < 1e-9);
        assert_eq!(value_max(std::iter::empty()), 1.0);
        assert_eq!(value_max([0.0]), 1.0);
    }

    #[test]
    fn value_axis_stays_finite_near_f64_max() {
        assert_eq!(value_max([1.7e308]), 1.7e308);
        assert!(value_max([f64::MAX, 1.0]).is_finite());
        assert!((value_max([1.0e308]) - 1.1e308).abs() < 1e295);
    }

    #[test]
    fn long_domains_are_flagged() {
        assert!(TimeDomain { start: date(2024, 6, 22), end: date(2025, 1, 11) }.is_long());
        assert!(!TimeDomain { start: date(2024, 11, 1), end: date(2025, 1, 31) }.is_long());
    }
}
