//! wxtrack entry point.
//!
//! Two subcommands, one per scheduled phase:
//!
//! ```text
//! wxtrack collect-forecast [--date YYYY-MM-DD] [--config PATH]
//! wxtrack compare          [--date YYYY-MM-DD] [--config PATH]
//! ```
//!
//! `--date` defaults to today (collect-forecast) or yesterday (compare) in
//! AEST. Ordering between the phases is the scheduler's job; `compare` fails
//! with a non-zero exit when the forecast document is missing.

mod dates;
mod phases;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use chrono::NaiveDate;

use wxtrack_core::Config;

#[derive(Debug)]
enum Command {
    CollectForecast(Option<NaiveDate>),
    Compare(Option<NaiveDate>),
}

#[derive(Debug)]
struct Args {
    command: Command,
    config_path: Option<PathBuf>,
}

fn parse_args(argv: &[String]) -> Result<Args, String> {
    let mut iter = argv.iter();
    let subcommand = iter.next().ok_or("missing command")?;

    let mut date = None;
    let mut config_path = None;
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--date" => {
                let value = iter.next().ok_or("--date requires a value")?;
                let parsed: NaiveDate = value
                    .parse()
                    .map_err(|_| format!("invalid date '{value}', expected YYYY-MM-DD"))?;
                date = Some(parsed);
            }
            "--config" => {
                let value = iter.next().ok_or("--config requires a value")?;
                config_path = Some(PathBuf::from(value));
            }
            other => return Err(format!("unknown argument '{other}'")),
        }
    }

    let command = match subcommand.as_str() {
        "collect-forecast" => Command::CollectForecast(date),
        "compare" => Command::Compare(date),
        other => return Err(format!("unknown command '{other}'")),
    };

    Ok(Args {
        command,
        config_path,
    })
}

fn print_usage() {
    eprintln!("Usage: wxtrack <collect-forecast|compare> [--date YYYY-MM-DD] [--config PATH]");
}

async fn run(args: Args) -> Result<()> {
    let config = Config::load_validated(args.config_path.as_deref())?;

    match args.command {
        Command::CollectForecast(date) => {
            let date = date.unwrap_or_else(dates::today_aest);
            phases::collect_forecast(&config, date).await
        }
        Command::Compare(date) => {
            let date = date.unwrap_or_else(dates::yesterday_aest);
            phases::compare(&config, date).await
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(e) = wxtrack_core::init() {
        eprintln!("Failed to initialize logging: {e}");
        return ExitCode::FAILURE;
    }

    let argv: Vec<String> = std::env::args().skip(1).collect();
    let args = match parse_args(&argv) {
        Ok(args) => args,
        Err(message) => {
            eprintln!("{message}");
            print_usage();
            return ExitCode::FAILURE;
        }
    };

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;

    fn args(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parses_collect_forecast_with_date() {
        let parsed = parse_args(&args(&["collect-forecast", "--date", "2024-01-15"])).unwrap();
        match parsed.command {
            Command::CollectForecast(Some(date)) => {
                assert_eq!(date.to_string(), "2024-01-15");
            }
            _ => panic!("wrong command"),
        }
        assert!(parsed.config_path.is_none());
    }

    #[test]
    fn parses_compare_without_date() {
        let parsed = parse_args(&args(&["compare"])).unwrap();
        assert!(matches!(parsed.command, Command::Compare(None)));
    }

    #[test]
    fn parses_config_path() {
        let parsed = parse_args(&args(&["compare", "--config", "/etc/wxtrack.toml"])).unwrap();
        assert_eq!(
            parsed.config_path,
            Some(PathBuf::from("/etc/wxtrack.toml"))
        );
    }

    #[test]
    fn rejects_bad_date() {
        let err = parse_args(&args(&["compare", "--date", "15-01-2024"])).unwrap_err();
        assert!(err.contains("invalid date"));
    }

    #[test]
    fn rejects_unknown_command_and_missing_command() {
        assert!(parse_args(&args(&["frobnicate"])).is_err());
        assert!(parse_args(&[]).is_err());
    }
}
