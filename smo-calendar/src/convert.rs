use tracing::{debug, info, trace};

use crate::{
    normalize, Calendar, CalendarMeta, DateSpan, Deduplicator, Error, NormalizeOptions, RawEvent,
    Result,
};

/// Where raw records come from, one window at a time.
///
/// Implementations must fail on non-success responses instead of returning
/// partial data.
#[allow(async_fn_in_trait)]
pub trait EventSource {
    async fn fetch(&self, span: &DateSpan) -> Result<Vec<RawEvent>>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConversionStats {
    pub fetched: usize,
    pub skipped: usize,
    pub duplicates: usize,
    pub added: usize,
}

/// Fetches every window in order and assembles the surviving events.
///
/// Any fetch or normalization error aborts the run, so a calendar is only
/// returned when every window was processed.
pub async fn convert<S, I>(
    source: &S,
    windows: I,
    options: &NormalizeOptions,
    meta: CalendarMeta,
) -> Result<(Calendar, ConversionStats)>
where
    S: EventSource,
    I: IntoIterator<Item = DateSpan>,
{
    let mut calendar = Calendar::new(meta);
    let mut dedup = Deduplicator::new();
    let mut stats = ConversionStats::default();

    for span in windows {
        let records = source.fetch(&span).await?;
        debug!(%span, records = records.len(), "fetched window");
        stats.fetched += records.len();

        for raw in &records {
            let event = match normalize(raw, options) {
                Ok(Some(event)) => event,
                Ok(None) => {
                    stats.skipped += 1;
                    continue;
                }
                Err(err) => {
                    return Err(Error::Record {
                        span,
                        id: raw.id_text(),
                        source: Box::new(err),
                    })
                }
            };

            if !dedup.admit(&event.uid) {
                trace!(uid = %event.uid, %span, "dropping duplicate");
                stats.duplicates += 1;
                continue;
            }

            calendar.add_event(event)?;
            stats.added += 1;
        }
    }

    info!(
        fetched = stats.fetched,
        skipped = stats.skipped,
        duplicates = stats.duplicates,
        added = stats.added,
        "calendar assembled"
    );

    Ok((calendar, stats))
}
