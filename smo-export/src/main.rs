use std::{env, fs, io};

use anyhow::Context;
use chrono::Utc;
use smo_calendar::{convert, month_windows, CalendarMeta, NormalizeOptions};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod cli;
mod client;

use client::SchulmanagerClient;

fn setup_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = cli::parse(env::args().skip(1).collect());

    setup_logging();

    let client = SchulmanagerClient::new(
        &args.base_url,
        args.bundle_version.as_str(),
        args.institution,
        args.timeout,
    )
    .context("Failed to build HTTP client")?;

    let now = Utc::now();
    let today = now.with_timezone(args.timezone.tz()).date_naive();
    let windows = month_windows(today, args.months_back, args.months_ahead);

    info!(
        institution = args.institution,
        %today,
        months_back = args.months_back,
        months_ahead = args.months_ahead,
        "exporting calendar"
    );

    let options = NormalizeOptions::new(args.timezone);
    let meta = CalendarMeta::new(args.name.as_str(), args.timezone, now);
    let (calendar, _) = convert(&client, windows, &options, meta).await?;

    fs::write(&args.output, calendar.serialize())
        .with_context(|| format!("Failed to write {}", args.output.display()))?;

    info!(path = %args.output.display(), events = calendar.len(), "calendar written");

    Ok(())
}
