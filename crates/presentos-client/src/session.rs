//! The session controller.
//!
//! Owns the single current-session slot and drives everything that happens
//! when the identity changes: view flips, token acquisition, the one-shot
//! grant resolution, and the dependent goal load. All identity transitions
//! funnel through [`SessionController::on_identity_changed`]; there is no
//! second dispatch point.

use presentos_api::SchedulingBackend;
use presentos_core::{Identity, SessionState, SessionToken};
use presentos_identity::{IdentityEvent, IdentityProvider};
use tracing::{debug, warn};

use crate::grant::{GrantResolver, ResolveOutcome};
use crate::navigator::Navigator;
use crate::view::View;

/// Controller binding the identity provider, backend, navigator, and view.
pub struct SessionController<P, B, N, V> {
    provider: P,
    backend: B,
    navigator: N,
    view: V,
    session: SessionState,
    grant_resolved: bool,
}

impl<P, B, N, V> SessionController<P, B, N, V>
where
    P: IdentityProvider,
    B: SchedulingBackend,
    N: Navigator,
    V: View,
{
    /// Creates a controller over the four seams.
    pub fn new(provider: P, backend: B, navigator: N, view: V) -> Self {
        Self {
            provider,
            backend,
            navigator,
            view,
            session: SessionState::new(),
            grant_resolved: false,
        }
    }

    /// Whether a session is currently installed.
    pub fn is_signed_in(&self) -> bool {
        self.session.is_signed_in()
    }

    /// The identity provider.
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Handles an identity transition.
    pub async fn on_identity_changed(&mut self, event: IdentityEvent) {
        match event {
            IdentityEvent::SignedIn(identity) => self.handle_signed_in(identity).await,
            IdentityEvent::SignedOut => self.handle_signed_out(),
        }
    }

    /// Starts the interactive sign-in flow.
    ///
    /// A provider failure (user closed the consent page, network down) is
    /// logged and swallowed; there is no retry and nothing to show.
    pub async fn request_sign_in(&mut self) {
        match self.provider.sign_in().await {
            Ok(identity) => {
                self.on_identity_changed(IdentityEvent::SignedIn(identity))
                    .await;
            }
            Err(e) => warn!("sign-in failed: {}", e),
        }
    }

    /// Asks for confirmation, then signs out.
    ///
    /// On decline nothing changes. A provider sign-out failure leaves the
    /// session untouched.
    pub async fn request_sign_out(&mut self) {
        if !self.view.confirm("Sign out?") {
            debug!("sign-out declined");
            return;
        }

        if let Err(e) = self.provider.sign_out().await {
            warn!("sign-out failed: {}", e);
            return;
        }

        self.on_identity_changed(IdentityEvent::SignedOut).await;
    }

    async fn handle_signed_in(&mut self, identity: Identity) {
        self.view.show_signed_in(&identity);

        // Token acquisition may refresh an expired access token. Failure is
        // recoverable: revert the view and leave the slot clear, never force
        // a sign-out.
        let token = match self.provider.current_token().await {
            Ok(token) => token,
            Err(e) => {
                warn!("token acquisition failed: {}", e);
                self.view.show_signed_out();
                return;
            }
        };

        self.session.begin(identity, token.clone());

        if !self.grant_resolved {
            self.grant_resolved = true;
            let outcome = GrantResolver::new(&self.backend, &self.navigator, &mut self.view)
                .resolve(&token)
                .await;
            if outcome == ResolveOutcome::Redirected {
                // The pass ended at the consent flow.
                return;
            }
        }

        // Same captured token as the grant check; the slot is never re-read
        // across the awaits above.
        self.load_goals(&token).await;
    }

    fn handle_signed_out(&mut self) {
        // Token slot first, so nothing started after this point can pick up
        // the stale session.
        self.session.clear();
        self.grant_resolved = false;
        self.view.show_signed_out();
        self.view.dismiss_confirm();
    }

    /// Loads and renders the goal list.
    ///
    /// Failures land in the goal area only; the calendar indicator is a
    /// separate channel and is never touched from here.
    async fn load_goals(&mut self, token: &SessionToken) {
        match self.backend.list_goals(token).await {
            Ok(goals) => self.view.show_goals(&goals),
            Err(e) => {
                warn!("goal load failed: {}", e);
                self.view.clear_goals();
                self.view.error_line(e.message());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fakes::{FakeBackend, FakeIdentity, FakeNavigator, RecordingView, ViewEvent};
    use presentos_api::{ApiError, Goal, GrantCheck};
    use presentos_core::{CalendarStatus, ReturnMarker};

    type TestController = SessionController<FakeIdentity, FakeBackend, FakeNavigator, RecordingView>;

    fn controller(
        provider: FakeIdentity,
        backend: FakeBackend,
        navigator: FakeNavigator,
    ) -> TestController {
        SessionController::new(provider, backend, navigator, RecordingView::new())
    }

    fn goal(id: &str, name: &str) -> Goal {
        Goal {
            id: id.to_string(),
            name: name.to_string(),
            description: None,
            avatar: None,
        }
    }

    #[tokio::test]
    async fn sign_in_resolves_grant_then_loads_goals() {
        let backend = FakeBackend::new();
        backend.push_grant(Ok(GrantCheck::PermissionGranted));
        backend.push_goals(Ok(vec![goal("g1", "Learn Rust")]));

        let mut c = controller(
            FakeIdentity::new("Ada", "tok-1"),
            backend,
            FakeNavigator::new(),
        );
        c.request_sign_in().await;

        assert_eq!(
            c.view.events,
            vec![
                ViewEvent::SignedIn("Ada".to_string()),
                ViewEvent::CalendarStatus(CalendarStatus::Connected),
                ViewEvent::Goals(vec!["g1".to_string()]),
            ]
        );
        assert_eq!(c.backend.grant_checks.get(), 1);
        assert_eq!(c.backend.goal_loads.get(), 1);
        assert!(c.is_signed_in());
    }

    #[tokio::test]
    async fn grant_check_and_goal_load_use_the_same_token() {
        let backend = FakeBackend::new();
        backend.push_grant(Ok(GrantCheck::PermissionGranted));
        backend.push_goals(Ok(vec![]));

        let mut c = controller(
            FakeIdentity::new("Ada", "tok-1"),
            backend,
            FakeNavigator::new(),
        );
        c.request_sign_in().await;

        assert_eq!(*c.backend.grant_tokens.borrow(), vec!["tok-1".to_string()]);
        assert_eq!(*c.backend.goals_tokens.borrow(), vec!["tok-1".to_string()]);
    }

    #[tokio::test]
    async fn token_failure_reverts_view_and_skips_everything() {
        let provider = FakeIdentity::new("Ada", "tok-1");
        provider.fail_token.set(true);

        let mut c = controller(provider, FakeBackend::new(), FakeNavigator::new());
        c.request_sign_in().await;

        assert_eq!(
            c.view.events,
            vec![
                ViewEvent::SignedIn("Ada".to_string()),
                ViewEvent::SignedOut,
            ]
        );
        assert_eq!(c.backend.grant_checks.get(), 0);
        assert_eq!(c.backend.goal_loads.get(), 0);
        assert!(!c.is_signed_in());
    }

    #[tokio::test]
    async fn sign_in_failure_is_silent() {
        let provider = FakeIdentity::new("Ada", "tok-1");
        provider.fail_sign_in.set(true);

        let mut c = controller(provider, FakeBackend::new(), FakeNavigator::new());
        c.request_sign_in().await;

        assert!(c.view.events.is_empty());
        assert!(!c.is_signed_in());
    }

    #[tokio::test(start_paused = true)]
    async fn redirected_pass_skips_the_goal_load() {
        let backend = FakeBackend::new();
        backend.push_grant(Ok(GrantCheck::PermissionNeeded {
            auth_url: "https://example.com/consent".to_string(),
        }));

        let mut c = controller(
            FakeIdentity::new("Ada", "tok-1"),
            backend,
            FakeNavigator::new(),
        );
        c.request_sign_in().await;

        assert_eq!(c.backend.goal_loads.get(), 0);
        assert_eq!(
            *c.navigator.redirects.borrow(),
            vec!["https://example.com/consent".to_string()]
        );
    }

    #[tokio::test]
    async fn success_marker_skips_check_and_still_loads_goals() {
        let backend = FakeBackend::new();
        backend.push_goals(Ok(vec![goal("g1", "Learn Rust")]));

        let mut c = controller(
            FakeIdentity::new("Ada", "tok-1"),
            backend,
            FakeNavigator::with_marker(ReturnMarker::Success),
        );
        c.request_sign_in().await;

        assert_eq!(c.backend.grant_checks.get(), 0);
        assert_eq!(c.backend.goal_loads.get(), 1);
        assert!(c.view.events.contains(&ViewEvent::CalendarStatus(
            CalendarStatus::Connected
        )));
    }

    #[tokio::test]
    async fn goal_load_failure_clears_goal_area_only() {
        let backend = FakeBackend::new();
        backend.push_grant(Ok(GrantCheck::PermissionGranted));
        backend.push_goals(Err(ApiError::server("backend error: 500")));

        let mut c = controller(
            FakeIdentity::new("Ada", "tok-1"),
            backend,
            FakeNavigator::new(),
        );
        c.request_sign_in().await;

        assert_eq!(
            c.view.events,
            vec![
                ViewEvent::SignedIn("Ada".to_string()),
                ViewEvent::CalendarStatus(CalendarStatus::Connected),
                ViewEvent::GoalsCleared,
                ViewEvent::Error("backend error: 500".to_string()),
            ]
        );
        // Still signed in; the calendar indicator was not downgraded.
        assert!(c.is_signed_in());
    }

    #[tokio::test]
    async fn sign_out_clears_slot_then_flips_view_and_dismisses_confirm() {
        let backend = FakeBackend::new();
        backend.push_grant(Ok(GrantCheck::PermissionGranted));
        backend.push_goals(Ok(vec![]));

        let mut c = controller(
            FakeIdentity::new("Ada", "tok-1"),
            backend,
            FakeNavigator::new(),
        );
        c.request_sign_in().await;
        c.view.events.clear();

        c.request_sign_out().await;

        assert!(!c.is_signed_in());
        assert_eq!(c.provider.sign_outs.get(), 1);
        assert_eq!(
            c.view.events,
            vec![
                ViewEvent::ConfirmAsked("Sign out?".to_string()),
                ViewEvent::SignedOut,
                ViewEvent::ConfirmDismissed,
            ]
        );
    }

    #[tokio::test]
    async fn declined_sign_out_changes_nothing() {
        let backend = FakeBackend::new();
        backend.push_grant(Ok(GrantCheck::PermissionGranted));
        backend.push_goals(Ok(vec![]));

        let mut c = controller(
            FakeIdentity::new("Ada", "tok-1"),
            backend,
            FakeNavigator::new(),
        );
        c.request_sign_in().await;
        c.view.events.clear();
        c.view.confirm_answer = false;

        c.request_sign_out().await;

        assert!(c.is_signed_in());
        assert_eq!(c.provider.sign_outs.get(), 0);
        assert_eq!(
            c.view.events,
            vec![ViewEvent::ConfirmAsked("Sign out?".to_string())]
        );
    }

    #[tokio::test]
    async fn provider_sign_out_failure_leaves_session_untouched() {
        let backend = FakeBackend::new();
        backend.push_grant(Ok(GrantCheck::PermissionGranted));
        backend.push_goals(Ok(vec![]));

        let provider = FakeIdentity::new("Ada", "tok-1");
        provider.fail_sign_out.set(true);

        let mut c = controller(provider, backend, FakeNavigator::new());
        c.request_sign_in().await;
        c.view.events.clear();

        c.request_sign_out().await;

        assert!(c.is_signed_in());
        assert_eq!(
            c.view.events,
            vec![ViewEvent::ConfirmAsked("Sign out?".to_string())]
        );
    }

    #[tokio::test]
    async fn resolver_runs_again_after_a_new_sign_in() {
        let backend = FakeBackend::new();
        backend.push_grant(Ok(GrantCheck::PermissionGranted));
        backend.push_goals(Ok(vec![]));
        backend.push_grant(Ok(GrantCheck::PermissionGranted));
        backend.push_goals(Ok(vec![]));

        let mut c = controller(
            FakeIdentity::new("Ada", "tok-1"),
            backend,
            FakeNavigator::new(),
        );
        c.request_sign_in().await;
        c.request_sign_out().await;
        c.request_sign_in().await;

        assert_eq!(c.backend.grant_checks.get(), 2);
        assert_eq!(c.backend.goal_loads.get(), 2);
    }

    #[tokio::test]
    async fn repeated_sign_in_event_does_not_rerun_the_resolver() {
        let backend = FakeBackend::new();
        backend.push_grant(Ok(GrantCheck::PermissionGranted));
        backend.push_goals(Ok(vec![]));
        backend.push_goals(Ok(vec![]));

        let mut c = controller(
            FakeIdentity::new("Ada", "tok-1"),
            backend,
            FakeNavigator::new(),
        );
        c.on_identity_changed(IdentityEvent::SignedIn(Identity::new("Ada")))
            .await;
        c.on_identity_changed(IdentityEvent::SignedIn(Identity::new("Ada")))
            .await;

        assert_eq!(c.backend.grant_checks.get(), 1);
        assert_eq!(c.backend.goal_loads.get(), 2);
    }
}
