//! Client for the Present OS scheduling backend.
//!
//! Every request bears the current identity token as a bearer credential.
//! The backend is consumed as two capabilities:
//!
//! - "tell me if this identity holds a calendar grant; give me a consent
//!   URL if not" ([`GrantCheck`])
//! - goal CRUD and scheduling-intent submission ([`Goal`], [`ActionRequest`])
//!
//! [`SchedulingBackend`] is the seam; [`BackendClient`] is the HTTP
//! implementation.

pub mod client;
pub mod error;
pub mod types;

pub use client::{BackendClient, SchedulingBackend};
pub use error::{ApiError, ApiErrorCode, ApiResult};
pub use types::{
    ActionPayload, ActionRequest, ErrorDetail, Goal, GrantCheck, NewGoal, Personality,
    ScheduledTask,
};
