//! Rendering of reconstructed sessions for humans and machines
//!
//! All rendering writes through [`io::Write`] so command handlers and tests
//! alike can capture the output.

use crate::core::timestamp::Timestamp;
use crate::session::{Scan, Session, SessionEnd};
use crate::store::StoreStats;
use chrono::{Local, TimeZone};
use std::io::{self, Write};

/// Format for login and end times in the session listing
pub const DATE_FMT: &str = "%b %e %H:%M";

/// Format for full dates: the `wtmp begins` trailer and the date command
pub const FULL_DATE_FMT: &str = "%a %b %e %H:%M:%S %Y";

/// Format an epoch timestamp in local time
pub fn format_time(ts: Timestamp, fmt: &str) -> String {
    Local
        .timestamp_opt(ts.as_secs(), 0)
        .single()
        .map(|dt| dt.format(fmt).to_string())
        .unwrap_or_else(|| ts.as_secs().to_string())
}

/// Format a session length as `(HH:MM)`, seconds truncated
pub fn format_duration(secs: i64) -> String {
    let secs = secs.max(0);
    format!("({:02}:{:02})", secs / 3600, (secs % 3600) / 60)
}

/// Write one session as a `last`-style column line
pub fn write_session(w: &mut dyn Write, session: &Session) -> io::Result<()> {
    write!(
        w,
        "{:<8} {:<12} {} ",
        session.user,
        session.line,
        format_time(session.login_time, DATE_FMT)
    )?;

    match session.end {
        SessionEnd::LoggedOut(at) => write!(w, "- {}", format_time(at, "%H:%M"))?,
        SessionEnd::Crashed(_) => write!(w, "- crash")?,
        SessionEnd::Shutdown(_) => write!(w, "- down ")?,
        SessionEnd::StillOpen => write!(w, "  still logged in")?,
    }

    if let Some(secs) = session.duration_secs() {
        write!(w, "  {}", format_duration(secs))?;
    }

    if !session.host.is_empty() {
        write!(w, "  ({})", session.host)?;
    }

    writeln!(w)
}

/// Write the full listing: sessions newest first, then the earliest-login
/// trailer
pub fn write_scan(w: &mut dyn Write, scan: &Scan) -> io::Result<()> {
    for session in &scan.sessions {
        write_session(w, session)?;
    }

    if let Some(begins) = scan.earliest_login {
        writeln!(w)?;
        writeln!(w, "wtmp begins {}", format_time(begins, FULL_DATE_FMT))?;
    }

    Ok(())
}

/// Write the buffering-efficiency line
pub fn write_stats(w: &mut dyn Write, stats: &StoreStats) -> io::Result<()> {
    writeln!(
        w,
        "{} records read, {} page reloads ({:.3} reloads/record)",
        stats.records_read,
        stats.page_reloads,
        stats.reload_ratio()
    )
}

/// Write the scan as pretty-printed JSON
pub fn write_scan_json(w: &mut dyn Write, scan: &Scan) -> crate::error::Result<()> {
    serde_json::to_writer_pretty(&mut *w, scan)?;
    writeln!(w)?;
    Ok(())
}

/// Write the stats as one JSON object
pub fn write_stats_json(w: &mut dyn Write, stats: &StoreStats) -> crate::error::Result<()> {
    serde_json::to_writer(&mut *w, stats)?;
    writeln!(w)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(end: SessionEnd) -> Session {
        Session {
            user: "alice".into(),
            line: "pts/1".into(),
            host: "example.org".into(),
            login_time: Timestamp::from_secs(1_700_000_000),
            end,
        }
    }

    fn render(session: &Session) -> String {
        let mut out = Vec::new();
        write_session(&mut out, session).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_duration_format() {
        assert_eq!(format_duration(100), "(00:01)");
        assert_eq!(format_duration(3_660), "(01:01)");
        assert_eq!(format_duration(90_000), "(25:00)");
        assert_eq!(format_duration(0), "(00:00)");
        // Malformed logs clamp rather than render negative lengths
        assert_eq!(format_duration(-5), "(00:00)");
    }

    #[test]
    fn test_closed_session_line() {
        let end = Timestamp::from_secs(1_700_000_100);
        let line = render(&session(SessionEnd::LoggedOut(end)));
        assert!(line.starts_with("alice    pts/1"));
        assert!(line.contains("(00:01)"));
        assert!(line.contains("(example.org)"));
    }

    #[test]
    fn test_open_session_line() {
        let line = render(&session(SessionEnd::StillOpen));
        assert!(line.contains("still logged in"));
        assert!(!line.contains("(00:00)"));
    }

    #[test]
    fn test_crash_and_down_markers() {
        let at = Timestamp::from_secs(1_700_000_050);
        assert!(render(&session(SessionEnd::Crashed(at))).contains("- crash"));
        assert!(render(&session(SessionEnd::Shutdown(at))).contains("- down"));
    }

    #[test]
    fn test_begins_trailer() {
        let scan = Scan {
            sessions: vec![],
            earliest_login: Some(Timestamp::from_secs(86_400 * 180)),
        };
        let mut out = Vec::new();
        write_scan(&mut out, &scan).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("wtmp begins"));
        // Mid-1970 lands in 1970 in every timezone
        assert!(text.contains("1970"));
    }

    #[test]
    fn test_stats_line() {
        let stats = StoreStats {
            records_read: 8,
            page_reloads: 2,
        };
        let mut out = Vec::new();
        write_stats(&mut out, &stats).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text, "8 records read, 2 page reloads (0.250 reloads/record)\n");
    }

    #[test]
    fn test_json_shape() {
        let scan = Scan {
            sessions: vec![session(SessionEnd::StillOpen)],
            earliest_login: Some(Timestamp::from_secs(42)),
        };
        let mut out = Vec::new();
        write_scan_json(&mut out, &scan).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["sessions"][0]["user"], "alice");
        assert!(value["earliest_login"].is_object());
    }
}
