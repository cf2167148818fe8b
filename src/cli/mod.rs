//! Command-line interface: argument definitions and command handlers

pub mod commands;

pub use commands::{Cli, Commands, DEFAULT_WTMP};

use crate::core::record::LoginEventRecord;
use crate::error::Result;
use crate::report;
use crate::session;
use crate::store::RecordStore;
use std::io::{self, Read, Write};
use std::path::Path;

/// Dispatch a parsed command
pub fn run(cli: Cli) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match cli.command {
        Commands::Last {
            user,
            file,
            page_size,
            stats,
            json,
        } => run_last(&mut out, &user, &file, page_size, stats, json),
        Commands::Dump { file, page_size } => run_dump(&mut out, &file, page_size),
        Commands::Date { seconds } => run_date(&mut out, &seconds),
    }
}

/// Reconstruct and print one user's sessions
fn run_last(
    w: &mut dyn Write,
    user: &str,
    file: &Path,
    page_size: usize,
    stats: bool,
    json: bool,
) -> Result<()> {
    let mut store = RecordStore::open(file, page_size)?;
    let scan = session::reconstruct(&mut store, user)?;

    if json {
        report::write_scan_json(w, &scan)?;
        if stats {
            report::write_stats_json(w, &store.stats())?;
        }
    } else {
        report::write_scan(w, &scan)?;
        if stats {
            report::write_stats(w, &store.stats())?;
        }
    }

    store.close();
    Ok(())
}

/// Walk the file newest to oldest printing every record
fn run_dump(w: &mut dyn Write, file: &Path, page_size: usize) -> Result<()> {
    let mut store = RecordStore::open(file, page_size)?;
    let count = store.record_count()?;

    for index in (0..count).rev() {
        let record = store.get(index)?;
        write_record(w, record)?;
    }

    store.close();
    Ok(())
}

fn write_record(w: &mut dyn Write, record: &LoginEventRecord) -> io::Result<()> {
    write!(
        w,
        "{:<8} {:<12} {:<4} {:<8} {:>6} {}",
        record.user,
        record.line,
        record.id,
        record.kind,
        record.pid,
        report::format_time(record.time, report::DATE_FMT)
    )?;
    if !record.host.is_empty() {
        write!(w, " ({})", record.host)?;
    }
    writeln!(w)
}

/// Translate epoch seconds to dates, one per line
fn run_date(w: &mut dyn Write, seconds: &[i64]) -> Result<()> {
    if seconds.is_empty() {
        let mut input = String::new();
        io::stdin().read_to_string(&mut input)?;
        for token in input.split_whitespace() {
            let secs: i64 = token
                .parse()
                .map_err(|_| io::Error::new(io::ErrorKind::InvalidData, format!("bad int {}", token)))?;
            write_date(w, secs)?;
        }
    } else {
        for &secs in seconds {
            write_date(w, secs)?;
        }
    }
    Ok(())
}

fn write_date(w: &mut dyn Write, secs: i64) -> io::Result<()> {
    use crate::core::timestamp::Timestamp;
    writeln!(
        w,
        "{}\t{}",
        secs,
        report::format_time(Timestamp::from_secs(secs), report::FULL_DATE_FMT)
    )
}
