//! Wire types for the scheduling backend.

use std::fmt;
use std::str::FromStr;

use presentos_core::GrantState;
use serde::{Deserialize, Serialize};

/// Result of the calendar grant check.
///
/// The discriminant is an explicit tagged variant so the "unexpected
/// payload" fallback is a checked case, not an implicit default.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum GrantCheck {
    /// The backend already holds a calendar grant for this identity.
    PermissionGranted,
    /// Consent is required; the user must visit `auth_url`.
    PermissionNeeded {
        /// Provider consent URL supplied by the backend.
        auth_url: String,
    },
    /// The backend answered with a status this client does not know.
    #[serde(other)]
    Unrecognized,
}

impl GrantCheck {
    /// Maps the check result onto the grant-state vocabulary.
    ///
    /// An unrecognized payload is treated as "permission still needed", the
    /// safe default that never triggers a redirect.
    pub fn state(&self) -> GrantState {
        match self {
            Self::PermissionGranted => GrantState::Granted,
            Self::PermissionNeeded { .. } | Self::Unrecognized => GrantState::Needed,
        }
    }
}

/// A goal as stored by the backend. Unknown fields are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Goal {
    /// Backend-assigned identifier.
    pub id: String,
    /// Goal name.
    pub name: String,
    /// Free-form description.
    #[serde(default)]
    pub description: Option<String>,
    /// Avatar/icon label.
    #[serde(default)]
    pub avatar: Option<String>,
}

/// Payload for creating a goal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewGoal {
    /// Goal name.
    pub name: String,
    /// Free-form description.
    pub description: Option<String>,
    /// Avatar/icon label.
    pub avatar: Option<String>,
}

impl NewGoal {
    /// Creates a goal payload with just a name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            avatar: None,
        }
    }

    /// Sets the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the avatar label.
    pub fn with_avatar(mut self, avatar: impl Into<String>) -> Self {
        self.avatar = Some(avatar.into());
        self
    }
}

/// The PAEI personality the scheduling assistant should adopt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Personality {
    /// Direct, action-oriented, urgent.
    #[default]
    #[serde(rename = "P")]
    Producer,
    /// Systematic, organized, precise.
    #[serde(rename = "A")]
    Administrator,
    /// Visionary, creative, inspiring.
    #[serde(rename = "E")]
    Entrepreneur,
    /// Collaborative, empathetic, supportive.
    #[serde(rename = "I")]
    Integrator,
}

impl Personality {
    /// Single-letter wire code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Producer => "P",
            Self::Administrator => "A",
            Self::Entrepreneur => "E",
            Self::Integrator => "I",
        }
    }
}

impl fmt::Display for Personality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for Personality {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "P" => Ok(Self::Producer),
            "A" => Ok(Self::Administrator),
            "E" => Ok(Self::Entrepreneur),
            "I" => Ok(Self::Integrator),
            other => Err(format!(
                "unknown personality '{}' (expected P, A, E, or I)",
                other
            )),
        }
    }
}

/// A scheduling intent submitted to the actions endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionRequest {
    /// Action discriminant; only `schedule_task` exists today.
    pub task_type: String,
    /// Task details.
    pub payload: ActionPayload,
}

/// Details of a scheduling intent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionPayload {
    /// What the user wants to schedule, in their own words.
    pub task_prompt: String,
    /// The goal this task serves.
    pub goal_id: String,
    /// Assistant personality.
    pub personality: Personality,
}

impl ActionRequest {
    /// Builds a `schedule_task` action.
    pub fn schedule_task(
        goal_id: impl Into<String>,
        task_prompt: impl Into<String>,
        personality: Personality,
    ) -> Self {
        Self {
            task_type: "schedule_task".to_string(),
            payload: ActionPayload {
                task_prompt: task_prompt.into(),
                goal_id: goal_id.into(),
                personality,
            },
        }
    }
}

/// Successful response from the actions endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ScheduledTask {
    /// Human-readable confirmation.
    #[serde(default)]
    pub message: String,
    /// Title of the created calendar event.
    #[serde(default)]
    pub event_title: Option<String>,
    /// Link to the created calendar event.
    pub event_link: String,
}

/// Error body returned by the backend on non-2xx responses.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorDetail {
    /// Explanation intended for the user.
    pub detail: String,
}
