use std::fmt;

use chrono::{Datelike, Days, Months, NaiveDate};

/// Inclusive range of calendar dates bounding one fetch request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DateSpan {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateSpan {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }
}

impl fmt::Display for DateSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={}", self.start, self.end)
    }
}

/// Month-aligned, non-overlapping fetch windows.
///
/// Cloning the iterator before consuming it yields the same sequence again.
#[derive(Debug, Clone)]
pub struct MonthWindows {
    cursor: Option<NaiveDate>,
    remaining: u32,
}

/// Windows covering `months_back` months before the month of `today`, the
/// month itself and `months_ahead` months after it.
pub fn month_windows(today: NaiveDate, months_back: u32, months_ahead: u32) -> MonthWindows {
    let cursor = today
        .with_day(1)
        .and_then(|first| first.checked_sub_months(Months::new(months_back)));

    MonthWindows {
        cursor,
        remaining: months_back.saturating_add(months_ahead).saturating_add(1),
    }
}

impl Iterator for MonthWindows {
    type Item = DateSpan;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        let start = self.cursor?;
        let next = start.checked_add_months(Months::new(1));
        let end = next
            .and_then(|next| next.checked_sub_days(Days::new(1)))
            .unwrap_or(NaiveDate::MAX);

        self.cursor = next;
        self.remaining -= 1;

        Some(DateSpan::new(start, end))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let upper = if self.cursor.is_some() {
            self.remaining as usize
        } else {
            0
        };
        (0, Some(upper))
    }
}
