//! Backward-scan reconstruction of login sessions
//!
//! The accounting log is append-only, so walking it from the last record to
//! the first visits events newest to oldest. Each logout seen on the way
//! down is parked in a pending table keyed by terminal line; when the login
//! that opened that line shows up, the pair becomes a closed session. Boot
//! and runlevel records mark epochs: a boot stamps every pending logout with
//! crash-at-reboot, a runlevel change (clean shutdown) discards the table so
//! sessions never match across boot epochs.

use crate::core::record::{LoginEventRecord, RecordKind};
use crate::core::timestamp::Timestamp;
use crate::error::Result;
use crate::store::RecordStore;
use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, warn};

/// How a reconstructed session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SessionEnd {
    /// Explicit logout on the same line and pid
    LoggedOut(Timestamp),
    /// The system rebooted while the session was open
    Crashed(Timestamp),
    /// The system shut down cleanly while the session was open
    Shutdown(Timestamp),
    /// No closing event in the log
    StillOpen,
}

impl SessionEnd {
    /// End timestamp, if the session has one
    pub fn at(&self) -> Option<Timestamp> {
        match self {
            Self::LoggedOut(at) | Self::Crashed(at) | Self::Shutdown(at) => Some(*at),
            Self::StillOpen => None,
        }
    }
}

/// One reconstructed session for the target user
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    /// User that logged in
    pub user: String,
    /// Terminal line of the session
    pub line: String,
    /// Remote host, may be empty
    pub host: String,
    /// When the session began
    pub login_time: Timestamp,
    /// How and when it ended
    pub end: SessionEnd,
}

impl Session {
    /// Session length in whole seconds, or `None` while still open
    ///
    /// A log whose logout precedes its login yields a negative raw length;
    /// that is clamped to zero rather than reported.
    pub fn duration_secs(&self) -> Option<i64> {
        self.end
            .at()
            .map(|end| self.login_time.seconds_until(end).max(0))
    }
}

/// A logout waiting for its login, keyed by line in the pending table
#[derive(Debug, Clone)]
struct PendingLogout {
    pid: i32,
    time: Timestamp,
    session_id: i32,
    /// Set when a boot record stamped this entry
    crashed: bool,
}

/// Single-pass state machine over records fed newest to oldest
pub struct Reconstructor {
    target_user: String,
    pending: HashMap<String, PendingLogout>,
    earliest_login: Option<Timestamp>,
    last_reboot: Option<Timestamp>,
    last_shutdown: Option<Timestamp>,
}

impl Reconstructor {
    /// Start a scan for one user's sessions
    pub fn new(target_user: impl Into<String>) -> Self {
        Self {
            target_user: target_user.into(),
            pending: HashMap::new(),
            earliest_login: None,
            last_reboot: None,
            last_shutdown: None,
        }
    }

    /// User whose sessions are being reconstructed
    pub fn target_user(&self) -> &str {
        &self.target_user
    }

    /// Earliest login seen so far across all users
    pub fn earliest_login(&self) -> Option<Timestamp> {
        self.earliest_login
    }

    /// Feed one record; records must arrive in decreasing index order
    ///
    /// Returns the emitted session when the record is a login for the
    /// target user.
    pub fn observe(&mut self, record: &LoginEventRecord) -> Option<Session> {
        match record.kind {
            RecordKind::UserProcess => self.observe_login(record),
            RecordKind::DeadProcess => {
                self.observe_logout(record);
                None
            }
            RecordKind::BootTime => {
                self.observe_boot(record);
                None
            }
            RecordKind::RunLevel => {
                self.observe_runlevel(record);
                None
            }
            RecordKind::Other(_) => None,
        }
    }

    fn observe_login(&mut self, record: &LoginEventRecord) -> Option<Session> {
        if self.earliest_login.map_or(true, |t| record.time < t) {
            self.earliest_login = Some(record.time);
        }

        if record.user != self.target_user {
            // A foreign login consumes the logout that closed it: refresh the
            // line's entry in place so it cannot also close an older login.
            // Logins never insert; only logouts populate the table. Same-line
            // pid reuse can still mispair here.
            if let Some(entry) = self.pending.get_mut(&record.line) {
                entry.pid = record.pid;
                entry.time = record.time;
                entry.session_id = record.session_id;
            }
            return None;
        }

        // The line alone is ambiguous once a terminal is reused; pid is the
        // tiebreaker. An entry with the wrong pid stays put.
        let matched = match self.pending.get(&record.line) {
            Some(entry) if entry.pid == record.pid => self.pending.remove(&record.line),
            _ => None,
        };

        let end = match matched {
            Some(logout) => {
                debug!(
                    line = %record.line,
                    pid = record.pid,
                    session_id = logout.session_id,
                    crashed = logout.crashed,
                    "matched pending logout"
                );
                if logout.crashed {
                    SessionEnd::Crashed(logout.time)
                } else {
                    SessionEnd::LoggedOut(logout.time)
                }
            }
            None => match (self.last_shutdown, self.last_reboot) {
                // The shutdown marker, once set, is the most recent closing
                // event found so far and outranks the reboot marker.
                (Some(down), _) => SessionEnd::Shutdown(down),
                (None, Some(boot)) => SessionEnd::Crashed(boot),
                (None, None) => SessionEnd::StillOpen,
            },
        };

        if let Some(at) = end.at() {
            if at < record.time {
                warn!(
                    user = %record.user,
                    line = %record.line,
                    login = record.time.as_secs(),
                    end = at.as_secs(),
                    "session ends before it begins; duration clamped to zero"
                );
            }
        }

        Some(Session {
            user: record.user.clone(),
            line: record.line.clone(),
            host: record.host.clone(),
            login_time: record.time,
            end,
        })
    }

    fn observe_logout(&mut self, record: &LoginEventRecord) {
        // Each logout replaces the line's entry outright, so the entry always
        // holds the logout nearest (in time) to the logins still ahead in the
        // scan.
        self.pending.insert(
            record.line.clone(),
            PendingLogout {
                pid: record.pid,
                time: record.time,
                session_id: record.session_id,
                crashed: false,
            },
        );
    }

    fn observe_boot(&mut self, record: &LoginEventRecord) {
        self.last_reboot = Some(record.time);
        // A session still waiting for its login at a boot ended when the
        // machine went down, not at the logout's own recorded time.
        for entry in self.pending.values_mut() {
            entry.time = record.time;
            entry.crashed = true;
        }
    }

    fn observe_runlevel(&mut self, record: &LoginEventRecord) {
        self.last_shutdown = Some(record.time);
        // Logouts from before a clean shutdown belong to a different boot
        // epoch and must not match logins from an earlier one.
        self.pending.clear();
    }
}

/// Everything one full backward scan produces
#[derive(Debug, Clone, Serialize)]
pub struct Scan {
    /// Sessions for the target user, newest first
    pub sessions: Vec<Session>,
    /// Earliest login in the file across all users
    pub earliest_login: Option<Timestamp>,
}

/// Walk `store` from the last record down to the first and reconstruct
/// `user`'s sessions
pub fn reconstruct(store: &mut RecordStore, user: &str) -> Result<Scan> {
    let count = store.record_count()?;
    let mut reconstructor = Reconstructor::new(user);
    let mut sessions = Vec::new();

    for index in (0..count).rev() {
        let record = store.get(index)?;
        if let Some(session) = reconstructor.observe(record) {
            sessions.push(session);
        }
    }

    Ok(Scan {
        sessions,
        earliest_login: reconstructor.earliest_login(),
    })
}
