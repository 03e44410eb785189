//! Calendar capability-grant vocabulary.
//!
//! The backend tracks, per user, whether calendar write access has been
//! granted out of band. The client only ever learns one of two answers per
//! check, plus an implicit unknown before the first check completes.

use std::fmt;

/// Result of the calendar capability check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GrantState {
    /// No check has completed yet this sign-in.
    #[default]
    Unknown,
    /// The backend holds a calendar grant for this identity.
    Granted,
    /// The user must go through the consent flow.
    Needed,
}

impl fmt::Display for GrantState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Unknown => "unknown",
            Self::Granted => "granted",
            Self::Needed => "needed",
        };
        write!(f, "{}", s)
    }
}

/// States of the calendar connection indicator shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CalendarStatus {
    /// Nothing known yet.
    #[default]
    Unknown,
    /// Calendar access is connected.
    Connected,
    /// Consent flow is about to start.
    Pending,
    /// Access has not been granted.
    Needed,
    /// The last check or consent round-trip failed.
    Failed,
}

impl CalendarStatus {
    /// Short label for rendering.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Connected => "connected",
            Self::Pending => "pending",
            Self::Needed => "not connected",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for CalendarStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Marker carried back from the consent redirect round-trip.
///
/// The consent flow returns to the application with `success` or `error` in
/// the query string. The marker must be consumed exactly once: whoever reads
/// it strips it so a later pass cannot replay the branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnMarker {
    /// The grant was recorded server-side.
    Success,
    /// The consent flow failed or was denied.
    Error,
}

impl ReturnMarker {
    /// Parses a raw query string (no leading `?`) for a completion marker.
    ///
    /// A `success` key wins over `error` when both are present. Returns
    /// `None` when neither key appears.
    pub fn from_query(query: &str) -> Option<Self> {
        let mut saw_error = false;
        for param in query.split('&') {
            let key = param.splitn(2, '=').next().unwrap_or("");
            let key = urlencoding::decode(key).unwrap_or_default();
            match key.as_ref() {
                "success" => return Some(Self::Success),
                "error" => saw_error = true,
                _ => {}
            }
        }
        if saw_error { Some(Self::Error) } else { None }
    }

    /// Label used when persisting the marker.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
        }
    }

    /// Inverse of [`as_str`](Self::as_str).
    pub fn parse_label(label: &str) -> Option<Self> {
        match label {
            "success" => Some(Self::Success),
            "error" => Some(Self::Error),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_with_success_key() {
        assert_eq!(
            ReturnMarker::from_query("success=true"),
            Some(ReturnMarker::Success)
        );
        assert_eq!(
            ReturnMarker::from_query("success"),
            Some(ReturnMarker::Success)
        );
    }

    #[test]
    fn query_with_error_key() {
        assert_eq!(
            ReturnMarker::from_query("error=access_denied"),
            Some(ReturnMarker::Error)
        );
    }

    #[test]
    fn query_without_marker() {
        assert_eq!(ReturnMarker::from_query(""), None);
        assert_eq!(ReturnMarker::from_query("foo=bar&baz=1"), None);
    }

    #[test]
    fn success_wins_over_error() {
        assert_eq!(
            ReturnMarker::from_query("error=denied&success=true"),
            Some(ReturnMarker::Success)
        );
    }

    #[test]
    fn marker_label_round_trip() {
        for marker in [ReturnMarker::Success, ReturnMarker::Error] {
            assert_eq!(ReturnMarker::parse_label(marker.as_str()), Some(marker));
        }
        assert_eq!(ReturnMarker::parse_label("bogus"), None);
    }

    #[test]
    fn grant_state_default_is_unknown() {
        assert_eq!(GrantState::default(), GrantState::Unknown);
    }

    #[test]
    fn calendar_status_labels() {
        assert_eq!(CalendarStatus::Connected.to_string(), "connected");
        assert_eq!(CalendarStatus::Needed.to_string(), "not connected");
    }
}
