use std::io;

use chrono::{DateTime, Duration, NaiveDate, TimeZone};
use ics::{
    components::{Parameter, Property},
    escape_text,
    properties::{Description, DtEnd, DtStart, Location, Summary},
    ICalendar,
};

use crate::{Calendar, EventSpan, NormalizedEvent};

fn format_date(date: NaiveDate) -> String {
    date.format("%Y%m%d").to_string()
}

fn format_utc<Tz: TimeZone>(instant: &DateTime<Tz>) -> String {
    instant.naive_utc().format("%Y%m%dT%H%M%SZ").to_string()
}

/// ISO 8601 duration as used by REFRESH-INTERVAL, e.g. `P7D` or `PT1H30M`.
fn format_duration(duration: Duration) -> String {
    let seconds = duration.num_seconds().max(0);
    let (days, rest) = (seconds / 86_400, seconds % 86_400);
    let (hours, minutes, seconds) = (rest / 3600, rest % 3600 / 60, rest % 60);

    let mut out = String::from("P");
    if days > 0 {
        out.push_str(&format!("{days}D"));
    }
    if rest > 0 {
        out.push('T');
        for (value, unit) in [(hours, 'H'), (minutes, 'M'), (seconds, 'S')] {
            if value > 0 {
                out.push_str(&format!("{value}{unit}"));
            }
        }
    }
    if out == "P" {
        out.push_str("T0S");
    }
    out
}

impl Calendar {
    #[must_use]
    pub fn to_ics(&self) -> ICalendar<'_> {
        let meta = &self.meta;
        let refresh = format_duration(meta.refresh_interval);

        let mut icalendar = ICalendar::new("2.0", meta.prod_id.as_str());
        icalendar.push(Property::new("CALSCALE", "GREGORIAN"));
        icalendar.push(Property::new("X-WR-CALNAME", escape_text(meta.name.as_str())));
        icalendar.push(Property::new("X-WR-CALDESC", escape_text(meta.description())));
        icalendar.push(Property::new("X-WR-TIMEZONE", meta.timezone.name()));
        icalendar.push(Property::new("X-PUBLISHED-TTL", refresh.clone()));

        let mut refresh_interval = Property::new("REFRESH-INTERVAL", refresh);
        refresh_interval.add(Parameter::new("VALUE", "DURATION"));
        icalendar.push(refresh_interval);

        let dtstamp = format_utc(&meta.built_at);
        for event in &self.events {
            icalendar.add_event(event.to_ics(dtstamp.clone()));
        }

        icalendar
    }

    /// The complete iCalendar document.
    #[must_use]
    pub fn serialize(&self) -> Vec<u8> {
        self.to_ics().to_string().into_bytes()
    }

    pub fn write_to<W: io::Write>(&self, writer: W) -> crate::Result<()> {
        self.to_ics().write(writer)?;
        Ok(())
    }
}

impl NormalizedEvent {
    #[must_use]
    pub fn to_ics(&self, dtstamp: String) -> ics::Event<'_> {
        let mut ics_event = ics::Event::new(self.uid.as_str(), dtstamp);

        ics_event.push(Summary::new(escape_text(self.title.as_str())));

        match self.span {
            EventSpan::AllDay { start, end } => {
                let mut dtstart = DtStart::new(format_date(start));
                dtstart.add(Parameter::new("VALUE", "DATE"));
                let mut dtend = DtEnd::new(format_date(end));
                dtend.add(Parameter::new("VALUE", "DATE"));
                ics_event.push(dtstart);
                ics_event.push(dtend);
            }
            EventSpan::Timed { start, end } => {
                ics_event.push(DtStart::new(format_utc(&start)));
                ics_event.push(DtEnd::new(format_utc(&end)));
            }
        }

        if let Some(location) = &self.location {
            ics_event.push(Location::new(escape_text(location.as_str())));
        }

        if let Some(description) = &self.description {
            ics_event.push(Description::new(escape_text(description.as_str())));
        }

        ics_event
    }
}

#[cfg(test)]
mod tests {
    use chrono::{FixedOffset, Utc};
    use icalendar::{CalendarComponent, CalendarDateTime, Component, DatePerhapsTime, EventLike};

    use super::*;
    use crate::{CalendarMeta, TimezonePolicy};

    fn meta() -> CalendarMeta {
        CalendarMeta::new(
            "Schulkalender",
            TimezonePolicy::new(chrono_tz::Europe::Berlin),
            Utc.with_ymd_and_hms(2024, 3, 1, 6, 5, 0).unwrap(),
        )
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn aware(text: &str) -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339(text).unwrap()
    }

    fn sample() -> Calendar {
        let mut calendar = Calendar::new(meta());
        calendar
            .add_event(NormalizedEvent {
                uid: "timed@smo".to_string(),
                title: "Elternabend".to_string(),
                span: EventSpan::Timed {
                    start: aware("2024-03-10T18:00:00+01:00"),
                    end: aware("2024-03-10T19:30:00+01:00"),
                },
                location: Some("Aula".to_string()),
                description: Some("Klassen 5, 6; alle".to_string()),
            })
            .unwrap();
        calendar
            .add_event(NormalizedEvent {
                uid: "allday@smo".to_string(),
                title: "Osterferien".to_string(),
                span: EventSpan::AllDay {
                    start: date(2024, 3, 25),
                    end: date(2024, 4, 6),
                },
                location: None,
                description: None,
            })
            .unwrap();
        calendar
    }

    #[test]
    fn formats_durations() {
        assert_eq!(format_duration(Duration::days(7)), "P7D");
        assert_eq!(format_duration(Duration::minutes(90)), "PT1H30M");
        assert_eq!(format_duration(Duration::seconds(86_401)), "P1DT1S");
        assert_eq!(format_duration(Duration::zero()), "PT0S");
    }

    #[test]
    fn empty_calendar_has_metadata_only() {
        let text = String::from_utf8(Calendar::new(meta()).serialize()).unwrap();

        assert!(text.starts_with("BEGIN:VCALENDAR\r\n"));
        assert!(text.ends_with("END:VCALENDAR\r\n"));
        assert!(text.contains("VERSION:2.0\r\n"));
        assert!(text.contains("PRODID:-//Schulmanager Scraper//DE\r\n"));
        assert!(text.contains("X-WR-CALNAME:Schulkalender\r\n"));
        assert!(text.contains("X-WR-CALDESC:Stand: 2024-03-01 07:05 CET (wöchentlich)\r\n"));
        assert!(text.contains("X-WR-TIMEZONE:Europe/Berlin\r\n"));
        assert!(text.contains("X-PUBLISHED-TTL:P7D\r\n"));
        assert!(text.contains("REFRESH-INTERVAL;VALUE=DURATION:P7D\r\n"));
        assert!(!text.contains("BEGIN:VEVENT"));

        let parsed: icalendar::Calendar = text.parse().unwrap();
        assert_eq!(parsed.iter().count(), 0);
    }

    #[test]
    fn writes_typed_bounds() {
        let text = String::from_utf8(sample().serialize()).unwrap();

        assert!(text.contains("DTSTART:20240310T170000Z\r\n"));
        assert!(text.contains("DTEND:20240310T183000Z\r\n"));
        assert!(text.contains("DTSTART;VALUE=DATE:20240325\r\n"));
        assert!(text.contains("DTEND;VALUE=DATE:20240406\r\n"));
        assert!(text.contains("DTSTAMP:20240301T060500Z\r\n"));
        assert!(text.contains("DESCRIPTION:Klassen 5\\, 6\\; alle\r\n"));
        assert_eq!(text.matches("BEGIN:VEVENT").count(), 2);
    }

    #[test]
    fn write_to_matches_serialize() {
        let calendar = sample();
        let mut buffer = Vec::new();
        calendar.write_to(&mut buffer).unwrap();
        assert_eq!(buffer, calendar.serialize());
    }

    #[test]
    fn round_trips_through_a_parser() {
        let text = String::from_utf8(sample().serialize()).unwrap();
        let parsed: icalendar::Calendar = text.parse().unwrap();

        let events: Vec<_> = parsed
            .iter()
            .filter_map(|component| match component {
                CalendarComponent::Event(event) => Some(event),
                _ => None,
            })
            .collect();
        assert_eq!(events.len(), 2);

        let timed = events[0];
        assert_eq!(timed.get_uid(), Some("timed@smo"));
        assert_eq!(timed.get_summary(), Some("Elternabend"));
        assert_eq!(timed.get_location(), Some("Aula"));
        match (timed.get_start(), timed.get_end()) {
            (
                Some(DatePerhapsTime::DateTime(CalendarDateTime::Utc(start))),
                Some(DatePerhapsTime::DateTime(CalendarDateTime::Utc(end))),
            ) => {
                assert_eq!(start, aware("2024-03-10T18:00:00+01:00"));
                assert_eq!(end, aware("2024-03-10T19:30:00+01:00"));
            }
            other => panic!("unexpected timed bounds: {other:?}"),
        }

        let all_day = events[1];
        assert_eq!(all_day.get_summary(), Some("Osterferien"));
        assert_eq!(
            all_day.get_start(),
            Some(DatePerhapsTime::Date(date(2024, 3, 25)))
        );
        assert_eq!(
            all_day.get_end(),
            Some(DatePerhapsTime::Date(date(2024, 4, 6)))
        );
    }
}
