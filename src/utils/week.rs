// Weekly date-range bucketing (weeks run Monday through Sunday)

use chrono::{Datelike, Duration, NaiveDate};

/// Inclusive Monday..=Sunday range containing a date
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeekRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl WeekRange {
    pub fn containing(date: NaiveDate) -> Self {
        let start = date - Duration::days(date.weekday().num_days_from_monday() as i64);
        Self { start, end: start + Duration::days(6) }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let start = self.start;
        (0..7).map(move |offset| start + Duration::days(offset))
    }

    pub fn previous(&self) -> Self {
        Self::containing(self.start - Duration::days(1))
    }

    pub fn next(&self) -> Self {
        Self::containing(self.end + Duration::days(1))
    }
}

/// Items of one week grouped by day, plus those falling before the week
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeekBuckets<T> {
    pub range: WeekRange,
    /// Index 0 is Monday
    pub days: [Vec<T>; 7],
    pub overdue: Vec<T>,
}

/// Bucket items into the days of `range`. Items dated before the range go to
/// `overdue`; items after it or without a date are dropped.
pub fn bucket_by_day<T, F>(range: WeekRange, items: impl IntoIterator<Item = T>, date_of: F) -> WeekBuckets<T>
where
    F: Fn(&T) -> Option<NaiveDate>,
{
    let mut buckets = WeekBuckets {
        range,
        days: Default::default(),
        overdue: Vec::new(),
    };
    for item in items {
        match date_of(&item) {
            Some(date) if range.contains(date) => {
                let idx = (date - range.start).num_days() as usize;
                buckets.days[idx].push(item);
            }
            Some(date) if date < range.start => buckets.overdue.push(item),
            _ => {}
        }
    }
    buckets
}
