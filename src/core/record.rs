//! Login-event records: the fixed-size on-disk accounting format
//!
//! The wire layout is the GNU C library `utmp` record as written by 64-bit
//! Linux systems: 384 bytes, little-endian integer fields, NUL-padded text
//! fields. Field offsets match that layout byte for byte so existing wtmp
//! files read and write cleanly.

use crate::core::timestamp::Timestamp;
use crate::error::{Error, Result};
use bytes::{Buf, BufMut, Bytes, BytesMut};
use serde::{Deserialize, Serialize};
use std::fmt;

/// On-disk record size (bytes)
pub const RECORD_SIZE: usize = 384;

/// Width of the terminal line field
pub const LINE_SIZE: usize = 32;

/// Width of the user name field
pub const NAME_SIZE: usize = 32;

/// Width of the host field
pub const HOST_SIZE: usize = 256;

/// Width of the terminal id field
pub const ID_SIZE: usize = 4;

const ADDR_SIZE: usize = 16;
const RESERVED_SIZE: usize = 20;

/// Record type discriminant, from the `ut_type` field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordKind {
    /// Runlevel change, written when the system goes down cleanly
    RunLevel,
    /// System boot
    BootTime,
    /// A user logged in on some line
    UserProcess,
    /// A session on some line terminated
    DeadProcess,
    /// Any other record type, raw discriminant preserved
    Other(i16),
}

impl RecordKind {
    /// Map a raw `ut_type` value to a kind
    pub fn from_raw(raw: i16) -> Self {
        match raw {
            1 => Self::RunLevel,
            2 => Self::BootTime,
            7 => Self::UserProcess,
            8 => Self::DeadProcess,
            other => Self::Other(other),
        }
    }

    /// Raw `ut_type` value for this kind
    pub fn as_raw(&self) -> i16 {
        match self {
            Self::RunLevel => 1,
            Self::BootTime => 2,
            Self::UserProcess => 7,
            Self::DeadProcess => 8,
            Self::Other(raw) => *raw,
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RunLevel => write!(f, "run-lvl"),
            Self::BootTime => write!(f, "boot"),
            Self::UserProcess => write!(f, "user"),
            Self::DeadProcess => write!(f, "dead"),
            Self::Other(raw) => write!(f, "type-{}", raw),
        }
    }
}

/// One decoded login-event record
///
/// Text fields are NUL-trimmed and may be empty; logout records in
/// particular usually carry no user name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginEventRecord {
    /// Record type
    pub kind: RecordKind,
    /// Process that owns the session
    pub pid: i32,
    /// Terminal line, the join key between a login and its logout
    pub line: String,
    /// Terminal id (the suffix of the line, e.g. `ts/1`)
    pub id: String,
    /// User name, may be empty
    pub user: String,
    /// Remote host, may be empty
    pub host: String,
    /// Auxiliary session id
    pub session_id: i32,
    /// When the event happened
    pub time: Timestamp,
}

impl LoginEventRecord {
    /// Create a record with empty text fields
    pub fn new(kind: RecordKind, time: Timestamp) -> Self {
        Self {
            kind,
            pid: 0,
            line: String::new(),
            id: String::new(),
            user: String::new(),
            host: String::new(),
            session_id: 0,
            time,
        }
    }

    /// Set the user name
    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = user.into();
        self
    }

    /// Set the terminal line
    pub fn with_line(mut self, line: impl Into<String>) -> Self {
        self.line = line.into();
        self
    }

    /// Set the terminal id
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Set the remote host
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Set the owning process id
    pub fn with_pid(mut self, pid: i32) -> Self {
        self.pid = pid;
        self
    }

    /// Set the auxiliary session id
    pub fn with_session_id(mut self, session_id: i32) -> Self {
        self.session_id = session_id;
        self
    }

    /// Serialize the record to its 384-byte wire form
    pub fn serialize(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(RECORD_SIZE);

        // ut_type (2 bytes) + struct padding (2 bytes)
        buf.put_i16_le(self.kind.as_raw());
        buf.put_bytes(0, 2);

        // ut_pid (4 bytes)
        buf.put_i32_le(self.pid);

        // ut_line (32 bytes)
        put_text(&mut buf, &self.line, LINE_SIZE);

        // ut_id (4 bytes)
        put_text(&mut buf, &self.id, ID_SIZE);

        // ut_user (32 bytes)
        put_text(&mut buf, &self.user, NAME_SIZE);

        // ut_host (256 bytes)
        put_text(&mut buf, &self.host, HOST_SIZE);

        // ut_exit: e_termination, e_exit (4 bytes)
        buf.put_i16_le(0);
        buf.put_i16_le(0);

        // ut_session (4 bytes)
        buf.put_i32_le(self.session_id);

        // ut_tv: tv_sec, tv_usec (8 bytes)
        buf.put_i32_le(self.time.as_secs() as i32);
        buf.put_i32_le(0);

        // ut_addr_v6 (16 bytes)
        buf.put_bytes(0, ADDR_SIZE);

        // reserved (20 bytes)
        buf.put_bytes(0, RESERVED_SIZE);

        debug_assert_eq!(buf.len(), RECORD_SIZE);
        buf.freeze()
    }

    /// Deserialize a record from its 384-byte wire form
    pub fn deserialize(mut buf: &[u8]) -> Result<Self> {
        if buf.len() < RECORD_SIZE {
            return Err(Error::TruncatedRecord {
                len: buf.len(),
                record_size: RECORD_SIZE,
            });
        }

        // ut_type + padding
        let kind = RecordKind::from_raw(buf.get_i16_le());
        buf.advance(2);

        // ut_pid
        let pid = buf.get_i32_le();

        // ut_line
        let line = get_text(&mut buf, LINE_SIZE);

        // ut_id
        let id = get_text(&mut buf, ID_SIZE);

        // ut_user
        let user = get_text(&mut buf, NAME_SIZE);

        // ut_host
        let host = get_text(&mut buf, HOST_SIZE);

        // ut_exit
        buf.advance(4);

        // ut_session
        let session_id = buf.get_i32_le();

        // ut_tv
        let time = Timestamp::from_secs(buf.get_i32_le() as i64);
        buf.advance(4);

        // ut_addr_v6 and reserved bytes are not carried in the decoded value

        Ok(Self {
            kind,
            pid,
            line,
            id,
            user,
            host,
            session_id,
            time,
        })
    }
}

/// Write `s` into a fixed-width NUL-padded text field, truncating overlong input
fn put_text(buf: &mut BytesMut, s: &str, width: usize) {
    let bytes = s.as_bytes();
    let n = bytes.len().min(width);
    buf.put_slice(&bytes[..n]);
    buf.put_bytes(0, width - n);
}

/// Read a fixed-width NUL-padded text field, trimming at the first NUL
fn get_text(buf: &mut &[u8], width: usize) -> String {
    let field = &buf[..width];
    let end = field.iter().position(|&b| b == 0).unwrap_or(width);
    let text = String::from_utf8_lossy(&field[..end]).into_owned();
    buf.advance(width);
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> LoginEventRecord {
        LoginEventRecord::new(RecordKind::UserProcess, Timestamp::from_secs(1_700_000_000))
            .with_user("alice")
            .with_line("pts/3")
            .with_id("ts/3")
            .with_host("workstation.example.org")
            .with_pid(4242)
            .with_session_id(7)
    }

    #[test]
    fn test_record_size() {
        assert_eq!(sample().serialize().len(), RECORD_SIZE);
    }

    #[test]
    fn test_round_trip() {
        let record = sample();
        let wire = record.serialize();
        let decoded = LoginEventRecord::deserialize(&wire).unwrap();
        assert_eq!(decoded, record);
    }

    #[test]
    fn test_field_offsets() {
        let wire = sample().serialize();

        // ut_type at 0, USER_PROCESS = 7
        assert_eq!(&wire[0..2], &7i16.to_le_bytes());
        // ut_pid at 4
        assert_eq!(&wire[4..8], &4242i32.to_le_bytes());
        // ut_line at 8
        assert_eq!(&wire[8..13], b"pts/3");
        assert_eq!(wire[13], 0);
        // ut_id at 40
        assert_eq!(&wire[40..44], b"ts/3");
        // ut_user at 44
        assert_eq!(&wire[44..49], b"alice");
        // ut_host at 76
        assert_eq!(&wire[76..99], b"workstation.example.org");
        // ut_session at 336
        assert_eq!(&wire[336..340], &7i32.to_le_bytes());
        // tv_sec at 340
        assert_eq!(&wire[340..344], &1_700_000_000i32.to_le_bytes());
    }

    #[test]
    fn test_text_truncation() {
        let long_user = "x".repeat(NAME_SIZE + 10);
        let record = LoginEventRecord::new(RecordKind::UserProcess, Timestamp::from_secs(1))
            .with_user(long_user);
        let wire = record.serialize();
        assert_eq!(wire.len(), RECORD_SIZE);

        let decoded = LoginEventRecord::deserialize(&wire).unwrap();
        assert_eq!(decoded.user, "x".repeat(NAME_SIZE));
    }

    #[test]
    fn test_kind_round_trip() {
        for raw in [1i16, 2, 7, 8, 0, 5, 42] {
            assert_eq!(RecordKind::from_raw(raw).as_raw(), raw);
        }
        assert_eq!(RecordKind::from_raw(7), RecordKind::UserProcess);
        assert_eq!(RecordKind::from_raw(8), RecordKind::DeadProcess);
        assert_eq!(RecordKind::from_raw(2), RecordKind::BootTime);
        assert_eq!(RecordKind::from_raw(1), RecordKind::RunLevel);
        assert_eq!(RecordKind::from_raw(6), RecordKind::Other(6));
    }

    #[test]
    fn test_short_buffer() {
        let result = LoginEventRecord::deserialize(&[0u8; 10]);
        assert!(matches!(
            result,
            Err(Error::TruncatedRecord { len: 10, .. })
        ));
    }

    #[test]
    fn test_empty_fields_decode_empty() {
        let record = LoginEventRecord::new(RecordKind::DeadProcess, Timestamp::from_secs(99));
        let decoded = LoginEventRecord::deserialize(&record.serialize()).unwrap();
        assert!(decoded.user.is_empty());
        assert!(decoded.host.is_empty());
        assert_eq!(decoded.kind, RecordKind::DeadProcess);
    }
}
