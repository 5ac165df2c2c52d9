//! Command-line interface definitions.
//!
//! Paths and the target page can be given as flags or environment variables;
//! they override the values from the config file.

use chrono::NaiveDateTime;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Command-line arguments for the MID news scraper.
///
/// # Examples
///
/// ```sh
/// # One pipeline run (what cron invokes)
/// mid_news --config config.yaml run
///
/// # Stored records for one day, as JSON
/// mid_news between --start 2024-03-01T00:00 --end 2024-03-01T23:59
///
/// # Crontab lines for the configured schedules
/// mid_news schedule >> /etc/cron.d/mid_news
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Path to config.yaml
    #[arg(short, long, env = "MID_NEWS_CONFIG", default_value = "config.yaml")]
    pub config: PathBuf,

    /// Directory holding day directories and the global index
    #[arg(short, long, env = "MID_NEWS_BASE_DIR")]
    pub base_dir: Option<PathBuf>,

    /// SQLite database file
    #[arg(short, long, env = "MID_NEWS_DATABASE")]
    pub database: Option<PathBuf>,

    /// Announcement list URL
    #[arg(long, env = "MID_NEWS_MAIN_PAGE")]
    pub main_page: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Scrape the announcement list once
    Run,

    /// Print stored records published between two instants as JSON
    Between {
        /// Start, e.g. 2024-03-01T00:00
        #[arg(long, value_parser = parse_instant)]
        start: NaiveDateTime,

        /// End (inclusive), e.g. 2024-03-01T23:59:59
        #[arg(long, value_parser = parse_instant)]
        end: NaiveDateTime,
    },

    /// Print a crontab line for each configured schedule
    Schedule,
}

/// ISO-8601 local date-time with or without seconds.
fn parse_instant(s: &str) -> Result<NaiveDateTime, String> {
    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .ok_or_else(|| format!("expected YYYY-MM-DDTHH:MM[:SS], got {s:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_run_defaults() {
        let cli = Cli::parse_from(["mid_news", "run"]);
        assert_eq!(cli.command, Command::Run);
        assert_eq!(cli.config, PathBuf::from("config.yaml"));
        assert!(cli.base_dir.is_none());
    }

    #[test]
    fn test_cli_short_flags() {
        let cli = Cli::parse_from([
            "mid_news", "-c", "/etc/mid.yaml", "-b", "/srv/news", "-d", "/srv/news.db", "run",
        ]);
        assert_eq!(cli.config, PathBuf::from("/etc/mid.yaml"));
        assert_eq!(cli.base_dir, Some(PathBuf::from("/srv/news")));
        assert_eq!(cli.database, Some(PathBuf::from("/srv/news.db")));
    }

    #[test]
    fn test_cli_between() {
        let cli = Cli::parse_from([
            "mid_news",
            "between",
            "--start",
            "2024-03-01T00:00",
            "--end",
            "2024-03-01T23:59:59",
        ]);
        match cli.command {
            Command::Between { start, end } => {
                assert_eq!(start.to_string(), "2024-03-01 00:00:00");
                assert_eq!(end.to_string(), "2024-03-01 23:59:59");
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_cli_rejects_bad_instant() {
        let res = Cli::try_parse_from(["mid_news", "between", "--start", "yesterday", "--end", "now"]);
        assert!(res.is_err());
    }
}
