//! wtmplast: login-session reconstruction over wtmp-style accounting logs
//!
//! Reads the append-only binary log of login events that Unix systems keep
//! (wtmp) from newest to oldest and reconstructs one user's sessions,
//! matching each logout to the login that opened it across reboot and
//! shutdown boundaries.
//!
//! # Core Concepts
//!
//! - **Records**: fixed-size login events (login, logout, boot, runlevel)
//! - **Record Store**: paged random-access reader with bounded memory
//! - **Reconstructor**: backward-scan state machine pairing logins with
//!   logouts
//! - **Sessions**: closed, crashed, shut down, or still open intervals
//!
//! # Example
//!
//! ```no_run
//! use wtmplast::prelude::*;
//!
//! # fn example() -> wtmplast::error::Result<()> {
//! let mut store = RecordStore::open("/var/log/wtmp", 64)?;
//! let scan = reconstruct(&mut store, "alice")?;
//!
//! for session in &scan.sessions {
//!     println!("{} logged in on {}", session.user, session.line);
//! }
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod core;
pub mod error;
pub mod report;
pub mod session;
pub mod store;

/// Prelude module for common imports
pub mod prelude {
    pub use crate::core::*;
    pub use crate::error::{Error, Result};
    pub use crate::session::{reconstruct, Reconstructor, Scan, Session, SessionEnd};
    pub use crate::store::{RecordStore, StoreStats, DEFAULT_PAGE_SIZE};
}
