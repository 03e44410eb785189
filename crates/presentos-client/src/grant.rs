//! Calendar capability-grant resolution.
//!
//! Runs once per sign-in, after the token is in hand and before the goal
//! load. The flow has exactly three shapes:
//!
//! 1. A completion marker from a previous consent round-trip is pending:
//!    consume it, set the indicator, skip the network check entirely.
//! 2. The backend says the grant is already held: set the indicator.
//! 3. The backend says consent is needed: show "pending", wait a short
//!    grace period so the user sees what is about to happen, then send
//!    them to the consent URL and terminate the pass.
//!
//! Stripping the marker before anything else is what keeps the loop closed:
//! without it, the pass that returns from consent would check the grant,
//! get `permission_needed` for a still-propagating grant, and redirect
//! again forever.

use std::time::Duration;

use presentos_api::{GrantCheck, SchedulingBackend};
use presentos_core::{CalendarStatus, ReturnMarker, SessionToken};
use tracing::{debug, warn};

use crate::navigator::Navigator;
use crate::view::View;

/// Delay between showing the "pending" indicator and the redirect.
pub const REDIRECT_GRACE: Duration = Duration::from_secs(2);

/// How a resolution pass ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveOutcome {
    /// The pass continues; the indicator was set to the given status.
    Completed(CalendarStatus),
    /// The user was sent to the consent flow; nothing else may run.
    Redirected,
}

/// One-shot grant resolution over the backend, navigator, and view seams.
pub struct GrantResolver<'a, B, N, V> {
    backend: &'a B,
    navigator: &'a N,
    view: &'a mut V,
}

impl<'a, B, N, V> GrantResolver<'a, B, N, V>
where
    B: SchedulingBackend,
    N: Navigator,
    V: View,
{
    /// Creates a resolver over the given seams.
    pub fn new(backend: &'a B, navigator: &'a N, view: &'a mut V) -> Self {
        Self {
            backend,
            navigator,
            view,
        }
    }

    /// Resolves the calendar grant for the signed-in identity.
    ///
    /// Never returns an error: every failure is reported through the
    /// indicator and degrades to [`ResolveOutcome::Completed`] so the
    /// dependent data load still runs.
    pub async fn resolve(self, token: &SessionToken) -> ResolveOutcome {
        // A pending marker means the consent round-trip just finished;
        // consuming it strips it so a later pass cannot replay this branch.
        if let Some(marker) = self.navigator.completion_marker() {
            let status = match marker {
                ReturnMarker::Success => CalendarStatus::Connected,
                ReturnMarker::Error => {
                    warn!("consent flow returned an error");
                    CalendarStatus::Failed
                }
            };
            debug!("completion marker consumed: {}", marker.as_str());
            self.view.set_calendar_status(status);
            return ResolveOutcome::Completed(status);
        }

        let check = match self.backend.check_calendar_grant(token).await {
            Ok(check) => check,
            Err(e) => {
                warn!("calendar grant check failed: {}", e);
                self.view.set_calendar_status(CalendarStatus::Failed);
                return ResolveOutcome::Completed(CalendarStatus::Failed);
            }
        };

        match check {
            GrantCheck::PermissionGranted => {
                self.view.set_calendar_status(CalendarStatus::Connected);
                ResolveOutcome::Completed(CalendarStatus::Connected)
            }
            GrantCheck::PermissionNeeded { auth_url } => {
                self.view.set_calendar_status(CalendarStatus::Pending);
                tokio::time::sleep(REDIRECT_GRACE).await;

                match self.navigator.redirect(&auth_url).await {
                    Ok(()) => ResolveOutcome::Redirected,
                    Err(e) => {
                        warn!("consent redirect failed: {}", e);
                        self.view.set_calendar_status(CalendarStatus::Failed);
                        ResolveOutcome::Completed(CalendarStatus::Failed)
                    }
                }
            }
            GrantCheck::Unrecognized => {
                warn!("unrecognized grant-check response");
                self.view.set_calendar_status(CalendarStatus::Needed);
                ResolveOutcome::Completed(CalendarStatus::Needed)
            }
        }
    }
}
