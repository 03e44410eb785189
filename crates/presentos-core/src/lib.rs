//! Core session types for the Present OS client.
//!
//! This crate holds the session-scoped domain model shared by the other
//! crates:
//!
//! - [`Identity`] and [`SessionState`] - who is signed in, and the single
//!   process-wide token slot
//! - [`GrantState`] / [`CalendarStatus`] / [`ReturnMarker`] - the calendar
//!   capability-grant vocabulary
//! - [`tracing`](crate::tracing) - shared logging setup
//!
//! Nothing here is persistent; every value lives and dies with one
//! signed-in period.

pub mod grant;
pub mod identity;
pub mod tracing;

pub use grant::{CalendarStatus, GrantState, ReturnMarker};
pub use identity::{Identity, SessionState, SessionToken};
