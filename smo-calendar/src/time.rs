use chrono::{
    DateTime, Duration, FixedOffset, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, Offset,
    TimeZone,
};
use chrono_tz::Tz;

use crate::{Error, Result};

const AWARE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M%z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M%z",
];

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// A date/time as written upstream, with or without a UTC offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParsedTime {
    Naive(NaiveDateTime),
    Aware(DateTime<FixedOffset>),
}

impl ParsedTime {
    /// Parses ISO 8601 style text. Plain dates are read as midnight.
    pub fn parse(field: &'static str, text: &str) -> Result<Self> {
        let text = text.trim();

        if let Ok(aware) = DateTime::parse_from_rfc3339(text) {
            return Ok(Self::Aware(aware));
        }

        for format in AWARE_FORMATS {
            if let Ok(aware) = DateTime::parse_from_str(text, format) {
                return Ok(Self::Aware(aware));
            }
        }

        for format in NAIVE_FORMATS {
            if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
                return Ok(Self::Naive(naive));
            }
        }

        NaiveDate::parse_from_str(text, "%Y-%m-%d")
            .map(|date| Self::Naive(date.and_time(NaiveTime::MIN)))
            .map_err(|_| Error::InvalidDateTime {
                field,
                value: text.to_string(),
            })
    }

    /// The calendar date as written, ignoring any offset.
    pub fn date(&self) -> NaiveDate {
        match self {
            Self::Naive(naive) => naive.date(),
            Self::Aware(aware) => aware.date_naive(),
        }
    }

    /// Attaches `tz` to naive values; aware values keep their own offset.
    pub fn localize(self, tz: &Tz) -> DateTime<FixedOffset> {
        match self {
            Self::Aware(aware) => aware,
            Self::Naive(naive) => localize_naive(naive, tz),
        }
    }
}

fn localize_naive(naive: NaiveDateTime, tz: &Tz) -> DateTime<FixedOffset> {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(local) => local.fixed_offset(),
        // Folds happen when leaving daylight saving time, so the later
        // reading is the standard-time one.
        LocalResult::Ambiguous(_, later) => later.fixed_offset(),
        LocalResult::None => {
            // Gaps are months apart, a day earlier is safely before this one.
            let offset = tz
                .offset_from_utc_datetime(&(naive - Duration::days(1)))
                .fix();
            let utc = naive - Duration::seconds(i64::from(offset.local_minus_utc()));
            DateTime::from_naive_utc_and_offset(utc, offset)
        }
    }
}
