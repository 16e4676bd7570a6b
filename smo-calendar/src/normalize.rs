use std::str::FromStr;

use chrono::{DateTime, Days, Duration, FixedOffset, NaiveDate, SecondsFormat};
use chrono_tz::Tz;
use tracing::debug;

use crate::{Error, ParsedTime, RawEvent, Result};

pub const DEFAULT_UNTITLED: &str = "Ohne Titel";
pub const DEFAULT_UID_SUFFIX: &str = "@smo";

/// The timezone naive upstream date/times are read in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimezonePolicy(Tz);

impl TimezonePolicy {
    pub fn new(tz: Tz) -> Self {
        Self(tz)
    }

    pub fn tz(&self) -> &Tz {
        &self.0
    }

    pub fn name(&self) -> &'static str {
        self.0.name()
    }
}

impl Default for TimezonePolicy {
    fn default() -> Self {
        Self(chrono_tz::Europe::Berlin)
    }
}

impl FromStr for TimezonePolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        s.parse::<Tz>()
            .map(Self)
            .map_err(|_| Error::UnknownTimezone(s.to_string()))
    }
}

#[derive(Debug, Clone)]
pub struct NormalizeOptions {
    pub timezone: TimezonePolicy,
    /// Title used when a record has no summary.
    pub untitled: String,
    /// Appended to the content hash to form the uid.
    pub uid_suffix: String,
}

impl NormalizeOptions {
    pub fn new(timezone: TimezonePolicy) -> Self {
        Self {
            timezone,
            untitled: DEFAULT_UNTITLED.to_string(),
            uid_suffix: DEFAULT_UID_SUFFIX.to_string(),
        }
    }
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self::new(TimezonePolicy::default())
    }
}

/// Start and exclusive end of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventSpan {
    AllDay {
        start: NaiveDate,
        end: NaiveDate,
    },
    Timed {
        start: DateTime<FixedOffset>,
        end: DateTime<FixedOffset>,
    },
}

impl EventSpan {
    pub fn is_all_day(&self) -> bool {
        matches!(self, Self::AllDay { .. })
    }

    fn iso_bounds(&self) -> (String, String) {
        match self {
            Self::AllDay { start, end } => (start.to_string(), end.to_string()),
            Self::Timed { start, end } => (
                start.to_rfc3339_opts(SecondsFormat::AutoSi, false),
                end.to_rfc3339_opts(SecondsFormat::AutoSi, false),
            ),
        }
    }

    fn is_inverted(&self) -> bool {
        match self {
            Self::AllDay { start, end } => end < start,
            Self::Timed { start, end } => end < start,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedEvent {
    pub uid: String,
    pub title: String,
    pub span: EventSpan,
    pub location: Option<String>,
    pub description: Option<String>,
}

impl NormalizedEvent {
    pub fn is_all_day(&self) -> bool {
        self.span.is_all_day()
    }
}

/// Turns a raw record into a calendar event.
///
/// Returns `Ok(None)` for records without a start, which cannot be placed on
/// a calendar. Text that does not parse as a date/time is an error.
pub fn normalize(raw: &RawEvent, options: &NormalizeOptions) -> Result<Option<NormalizedEvent>> {
    let Some(start_text) = raw.start() else {
        debug!(id = %raw.id_text(), "skipping record without start");
        return Ok(None);
    };

    let start = ParsedTime::parse("start", start_text)?;
    let end = raw
        .end()
        .map(|text| ParsedTime::parse("end", text))
        .transpose()?;

    let span = if raw.all_day {
        all_day_span(start, end)?
    } else {
        timed_span(start, end, options.timezone.tz())
    };

    if span.is_inverted() {
        let (start, end) = span.iso_bounds();
        return Err(Error::InvertedRange { start, end });
    }

    let title = raw
        .summary()
        .map_or_else(|| options.untitled.clone(), str::to_string);

    Ok(Some(NormalizedEvent {
        uid: fingerprint(&raw.id_text(), &span, &options.uid_suffix),
        title,
        span,
        location: raw.location().map(str::to_string),
        description: raw.description().map(str::to_string),
    }))
}

// Upstream all-day ends are already exclusive and are taken as given.
fn all_day_span(start: ParsedTime, end: Option<ParsedTime>) -> Result<EventSpan> {
    let start = start.date();
    let end = match end {
        Some(end) => end.date(),
        None => start
            .checked_add_days(Days::new(1))
            .ok_or_else(|| Error::InvalidDateTime {
                field: "start",
                value: start.to_string(),
            })?,
    };

    Ok(EventSpan::AllDay { start, end })
}

// A synthesized end of a policy-zone start is read in that zone again, so it
// carries the offset in force one hour later.
fn timed_span(start: ParsedTime, end: Option<ParsedTime>, tz: &Tz) -> EventSpan {
    let in_policy_zone = matches!(start, ParsedTime::Naive(_));
    let start = start.localize(tz);
    let end = match end {
        Some(end) => end.localize(tz),
        None if in_policy_zone => (start + Duration::hours(1))
            .with_timezone(tz)
            .fixed_offset(),
        None => start + Duration::hours(1),
    };

    EventSpan::Timed { start, end }
}

fn fingerprint(id: &str, span: &EventSpan, suffix: &str) -> String {
    let (start, end) = span.iso_bounds();
    let digest = md5::compute(format!("{id}|{start}|{end}").as_bytes());
    format!("{digest:x}{suffix}")
}
