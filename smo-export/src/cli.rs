use std::env;
use std::path::PathBuf;
use std::process;
use std::str::FromStr;

use getopts::{Matches, Options};
use smo_calendar::TimezonePolicy;
use tokio::time::Duration;

pub struct Args {
    pub institution: u64,
    pub months_back: u32,
    pub months_ahead: u32,
    pub timezone: TimezonePolicy,
    pub output: PathBuf,
    pub name: String,
    pub base_url: String,
    pub bundle_version: String,
    pub timeout: Duration,
}

pub enum Command {
    Help(String),
    Run(Args),
}

fn opts() -> Options {
    let mut opts = Options::new();
    opts.optflag(
        "h",
        "help",
        concat!("Print the help output of ", env!("CARGO_PKG_NAME")),
    );
    opts.optopt(
        "i",
        "institution",
        "Institution whose public calendar is exported [Env: SMO_INSTITUTION] [Default: 590]",
        "ID",
    );
    opts.optopt(
        "b",
        "months-back",
        "Months before the current one to include [Env: SMO_MONTHS_BACK] [Default: 0]",
        "MONTHS",
    );
    opts.optopt(
        "f",
        "months-ahead",
        "Months after the current one to include [Env: SMO_MONTHS_AHEAD] [Default: 12]",
        "MONTHS",
    );
    opts.optopt(
        "z",
        "timezone",
        "Timezone for times without offset [Env: SMO_TIMEZONE] [Default: Europe/Berlin]",
        "IANA_NAME",
    );
    opts.optopt(
        "o",
        "output",
        "File the calendar is written to [Env: SMO_OUTPUT] [Default: schulmanager.ics]",
        "PATH",
    );
    opts.optopt(
        "n",
        "name",
        "Calendar name shown by clients [Env: SMO_CALENDAR_NAME] [Default: Schulkalender]",
        "NAME",
    );
    opts.optopt(
        "u",
        "base-url",
        "Base URL of the calendar API [Env: SMO_BASE_URL] [Default: https://login.schulmanager-online.de]",
        "URL",
    );
    opts.optopt(
        "",
        "bundle-version",
        "Web client bundle version sent with each request [Env: SMO_BUNDLE_VERSION] [Default: 5449e30183]",
        "VERSION",
    );
    opts.optopt(
        "t",
        "timeout",
        "Timeout for each request [Env: SMO_TIMEOUT] [Default: 20]",
        "SECONDS",
    );
    opts
}

fn lookup<F>(matches: &Matches, name: &str, var: &str, env: &F) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    matches.opt_str(name).or_else(|| env(var))
}

fn parsed<T, F>(matches: &Matches, name: &str, var: &str, env: &F, default: T) -> Result<T, String>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(matches, name, var, env) {
        Some(value) => value
            .parse()
            .map_err(|err| format!("Provided value for option '{name}' is invalid: {err}")),
        None => Ok(default),
    }
}

/// Reads options from `args`, falling back to variables resolved by `env`.
pub fn try_parse<F>(args: Vec<String>, env: F) -> Result<Command, String>
where
    F: Fn(&str) -> Option<String>,
{
    let opts = opts();
    let matches = opts.parse(args).map_err(|fail| fail.to_string())?;

    if matches.opt_present("help") {
        return Ok(Command::Help(
            opts.usage(&opts.short_usage(env!("CARGO_PKG_NAME"))),
        ));
    }

    let timezone = match lookup(&matches, "timezone", "SMO_TIMEZONE", &env) {
        Some(name) => name
            .parse()
            .map_err(|err| format!("Provided value for option 'timezone' is invalid: {err}"))?,
        None => TimezonePolicy::default(),
    };

    let base_url = lookup(&matches, "base-url", "SMO_BASE_URL", &env)
        .unwrap_or_else(|| "https://login.schulmanager-online.de".into())
        .trim_end_matches('/')
        .to_string();

    Ok(Command::Run(Args {
        institution: parsed(&matches, "institution", "SMO_INSTITUTION", &env, 590)?,
        months_back: parsed(&matches, "months-back", "SMO_MONTHS_BACK", &env, 0)?,
        months_ahead: parsed(&matches, "months-ahead", "SMO_MONTHS_AHEAD", &env, 12)?,
        timezone,
        output: lookup(&matches, "output", "SMO_OUTPUT", &env)
            .unwrap_or_else(|| "schulmanager.ics".into())
            .into(),
        name: lookup(&matches, "name", "SMO_CALENDAR_NAME", &env)
            .unwrap_or_else(|| "Schulkalender".into()),
        base_url,
        bundle_version: lookup(&matches, "bundle-version", "SMO_BUNDLE_VERSION", &env)
            .unwrap_or_else(|| "5449e30183".into()),
        timeout: Duration::from_secs(parsed(&matches, "timeout", "SMO_TIMEOUT", &env, 20)?),
    }))
}

pub fn parse(args: Vec<String>) -> Args {
    match try_parse(args, |var| env::var(var).ok()) {
        Ok(Command::Run(args)) => args,
        Ok(Command::Help(usage)) => {
            println!("{usage}");
            process::exit(0);
        }
        Err(err) => {
            eprintln!("{err}");
            process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn run(args: &[&str], vars: &[(&str, &str)]) -> Result<Command, String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        try_parse(
            args.iter().map(|arg| arg.to_string()).collect(),
            move |var| vars.get(var).cloned(),
        )
    }

    fn args(args: &[&str], vars: &[(&str, &str)]) -> Args {
        match run(args, vars) {
            Ok(Command::Run(args)) => args,
            Ok(Command::Help(_)) => panic!("unexpected help"),
            Err(err) => panic!("{err}"),
        }
    }

    #[test]
    fn defaults() {
        let args = args(&[], &[]);
        assert_eq!(args.institution, 590);
        assert_eq!(args.months_back, 0);
        assert_eq!(args.months_ahead, 12);
        assert_eq!(args.timezone.name(), "Europe/Berlin");
        assert_eq!(args.output, PathBuf::from("schulmanager.ics"));
        assert_eq!(args.name, "Schulkalender");
        assert_eq!(args.base_url, "https://login.schulmanager-online.de");
        assert_eq!(args.bundle_version, "5449e30183");
        assert_eq!(args.timeout, Duration::from_secs(20));
    }

    #[test]
    fn flags_override_environment() {
        let args = args(
            &[
                "-i",
                "42",
                "--months-back",
                "2",
                "-z",
                "America/New_York",
                "-u",
                "http://localhost:9000/",
            ],
            &[
                ("SMO_INSTITUTION", "7"),
                ("SMO_MONTHS_AHEAD", "3"),
                ("SMO_OUTPUT", "out.ics"),
            ],
        );
        assert_eq!(args.institution, 42);
        assert_eq!(args.months_back, 2);
        assert_eq!(args.months_ahead, 3);
        assert_eq!(args.timezone.name(), "America/New_York");
        assert_eq!(args.output, PathBuf::from("out.ics"));
        assert_eq!(args.base_url, "http://localhost:9000");
    }

    #[test]
    fn invalid_values_are_reported() {
        let Err(err) = run(&["--months-ahead", "many"], &[]) else {
            panic!("non-numeric month count accepted");
        };
        assert!(err.contains("months-ahead"), "{err}");

        let Err(err) = run(&[], &[("SMO_TIMEZONE", "Mars/Olympus")]) else {
            panic!("unknown timezone accepted");
        };
        assert!(err.contains("timezone"), "{err}");
    }

    #[test]
    fn help() {
        assert!(matches!(
            run(&["--help"], &[]),
            Ok(Command::Help(usage)) if usage.contains("--institution")
        ));
    }
}
