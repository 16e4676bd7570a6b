use std::io;

use thiserror::Error;

use crate::DateSpan;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid {field} date/time: {value:?}")]
    InvalidDateTime { field: &'static str, value: String },

    #[error("event ends before it starts: {start} > {end}")]
    InvertedRange { start: String, end: String },

    #[error("event with uid {0} is already part of the calendar")]
    DuplicateUid(String),

    #[error("unknown timezone: {0}")]
    UnknownTimezone(String),

    #[error("failed to fetch events for {span}: {source}")]
    Fetch {
        span: DateSpan,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("record {id:?} in {span}: {source}")]
    Record {
        span: DateSpan,
        id: String,
        #[source]
        source: Box<Error>,
    },

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl Error {
    pub fn fetch<E>(span: DateSpan, source: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Self::Fetch {
            span,
            source: source.into(),
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
