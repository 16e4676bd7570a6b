use std::collections::HashSet;

use chrono::{DateTime, Duration, Utc};

use crate::{Error, NormalizedEvent, Result, TimezonePolicy};

pub const DEFAULT_PROD_ID: &str = "-//Schulmanager Scraper//DE";

/// Document-level properties of the generated calendar.
#[derive(Debug, Clone)]
pub struct CalendarMeta {
    pub prod_id: String,
    pub name: String,
    pub timezone: TimezonePolicy,
    /// How often subscribers should poll for updates.
    pub refresh_interval: Duration,
    pub built_at: DateTime<Utc>,
}

impl CalendarMeta {
    pub fn new(name: impl Into<String>, timezone: TimezonePolicy, built_at: DateTime<Utc>) -> Self {
        Self {
            prod_id: DEFAULT_PROD_ID.to_string(),
            name: name.into(),
            timezone,
            refresh_interval: Duration::days(7),
            built_at,
        }
    }

    /// Human-readable build stamp in the calendar's timezone, followed by
    /// the refresh cadence.
    pub fn description(&self) -> String {
        let local = self.built_at.with_timezone(self.timezone.tz());
        format!(
            "Stand: {} ({})",
            local.format("%Y-%m-%d %H:%M %Z"),
            cadence(self.refresh_interval)
        )
    }
}

fn cadence(interval: Duration) -> String {
    let minutes = interval.num_minutes().max(1);
    match (minutes % (24 * 60), minutes % 60) {
        (0, _) => match minutes / (24 * 60) {
            1 => "täglich".to_string(),
            7 => "wöchentlich".to_string(),
            days => format!("alle {days} Tage"),
        },
        (_, 0) => match minutes / 60 {
            1 => "stündlich".to_string(),
            hours => format!("alle {hours} Stunden"),
        },
        _ => format!("alle {minutes} Minuten"),
    }
}

/// An ordered set of events keyed by uid.
#[derive(Debug, Clone)]
pub struct Calendar {
    pub(crate) meta: CalendarMeta,
    pub(crate) events: Vec<NormalizedEvent>,
    uids: HashSet<String>,
}

impl Calendar {
    pub fn new(meta: CalendarMeta) -> Self {
        Self {
            meta,
            events: Vec::new(),
            uids: HashSet::new(),
        }
    }

    /// Appends `event`, refusing a uid that is already present.
    pub fn add_event(&mut self, event: NormalizedEvent) -> Result<()> {
        if !self.uids.insert(event.uid.clone()) {
            return Err(Error::DuplicateUid(event.uid));
        }
        self.events.push(event);
        Ok(())
    }

    pub fn meta(&self) -> &CalendarMeta {
        &self.meta
    }

    pub fn events(&self) -> &[NormalizedEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
