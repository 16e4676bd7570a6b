mod calendar;
mod convert;
mod dedup;
mod error;
mod normalize;
mod raw;
mod time;
mod window;

#[cfg(feature = "ics")]
mod ics;

pub use calendar::{Calendar, CalendarMeta};
pub use convert::{convert, ConversionStats, EventSource};
pub use dedup::Deduplicator;
pub use error::{Error, Result};
pub use normalize::{normalize, EventSpan, NormalizeOptions, NormalizedEvent, TimezonePolicy};
pub use raw::{RawEvent, RawId};
pub use time::ParsedTime;
pub use window::{month_windows, DateSpan, MonthWindows};
