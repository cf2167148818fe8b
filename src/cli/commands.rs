//! CLI commands

use crate::store::DEFAULT_PAGE_SIZE;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Accounting file scanned when `--file` is absent
pub const DEFAULT_WTMP: &str = "/var/log/wtmp";

/// wtmplast CLI
#[derive(Parser)]
#[command(name = "wtmplast")]
#[command(about = "Reconstructs user login sessions from wtmp-style accounting logs")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List a user's login sessions, newest first
    Last {
        /// User whose sessions to reconstruct
        user: String,
        /// Accounting file to scan
        #[arg(short, long, default_value = DEFAULT_WTMP)]
        file: PathBuf,
        /// Records held per buffered page
        #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
        page_size: usize,
        /// Print buffering efficiency statistics after the listing
        #[arg(short, long)]
        stats: bool,
        /// Emit JSON instead of columns
        #[arg(long)]
        json: bool,
    },
    /// Print every record in the file, newest first
    Dump {
        /// Accounting file to scan
        #[arg(short, long, default_value = DEFAULT_WTMP)]
        file: PathBuf,
        /// Records held per buffered page
        #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
        page_size: usize,
    },
    /// Translate epoch seconds to dates
    Date {
        /// Seconds since epoch; read from stdin when absent
        seconds: Vec<i64>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_last() {
        let cli = Cli::try_parse_from(["wtmplast", "last", "alice", "--stats"]).unwrap();
        match cli.command {
            Commands::Last {
                user,
                file,
                page_size,
                stats,
                json,
            } => {
                assert_eq!(user, "alice");
                assert_eq!(file, PathBuf::from(DEFAULT_WTMP));
                assert_eq!(page_size, DEFAULT_PAGE_SIZE);
                assert!(stats);
                assert!(!json);
            }
            _ => panic!("expected last subcommand"),
        }
    }

    #[test]
    fn test_parse_dump_with_file() {
        let cli =
            Cli::try_parse_from(["wtmplast", "dump", "--file", "/tmp/wtmp", "--page-size", "8"])
                .unwrap();
        match cli.command {
            Commands::Dump { file, page_size } => {
                assert_eq!(file, PathBuf::from("/tmp/wtmp"));
                assert_eq!(page_size, 8);
            }
            _ => panic!("expected dump subcommand"),
        }
    }

    #[test]
    fn test_parse_date_operands() {
        let cli = Cli::try_parse_from(["wtmplast", "date", "100", "200"]).unwrap();
        match cli.command {
            Commands::Date { seconds } => assert_eq!(seconds, vec![100, 200]),
            _ => panic!("expected date subcommand"),
        }
    }

    #[test]
    fn test_missing_user_rejected() {
        assert!(Cli::try_parse_from(["wtmplast", "last"]).is_err());
    }
}
