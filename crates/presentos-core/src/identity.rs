//! Session identity and the process-wide token slot.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A signed-in user's profile as reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Name shown in the signed-in view.
    pub display_name: String,

    /// Avatar image URL, if the provider supplied one.
    pub avatar_url: Option<String>,
}

impl Identity {
    /// Creates an identity with the given display name and no avatar.
    pub fn new(display_name: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            avatar_url: None,
        }
    }

    /// Sets the avatar URL.
    pub fn with_avatar_url(mut self, url: impl Into<String>) -> Self {
        self.avatar_url = Some(url.into());
        self
    }
}

/// An opaque short-lived bearer token issued by the identity provider.
///
/// The token is never decoded client-side; it expires server-side and is
/// replaced by asking the provider for a current one. Callers must capture
/// a clone at call time rather than re-read shared state across an await.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionToken(String);

impl SessionToken {
    /// Wraps a raw token string.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Returns the raw token for use in an `Authorization` header.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Keep the raw value out of logs.
impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SessionToken(..)")
    }
}

/// The single process-wide "current session" slot.
///
/// Written once per sign-in, read by every subsequent backend call, and
/// cleared synchronously on sign-out. At most one identity is active at a
/// time.
#[derive(Debug, Default)]
pub struct SessionState {
    current: Option<(Identity, SessionToken)>,
}

impl SessionState {
    /// Creates an empty (signed-out) session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs the identity and token for a new sign-in, replacing any
    /// previous session.
    pub fn begin(&mut self, identity: Identity, token: SessionToken) {
        self.current = Some((identity, token));
    }

    /// Drops the identity and token. Called synchronously on sign-out so no
    /// stale token can be attached to a later call.
    pub fn clear(&mut self) {
        self.current = None;
    }

    /// Returns the current bearer token, if signed in.
    pub fn token(&self) -> Option<&SessionToken> {
        self.current.as_ref().map(|(_, token)| token)
    }

    /// Returns the current identity, if signed in.
    pub fn identity(&self) -> Option<&Identity> {
        self.current.as_ref().map(|(identity, _)| identity)
    }

    /// Returns true if a session is active.
    pub fn is_signed_in(&self) -> bool {
        self.current.is_some()
    }
}
