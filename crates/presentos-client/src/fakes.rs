//! Scripted seam implementations for controller and resolver tests.
//!
//! Everything runs on a current-thread runtime, so interior mutability via
//! `Cell`/`RefCell` is enough.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;

use presentos_api::{
    ActionRequest, ApiError, ApiResult, Goal, GrantCheck, NewGoal, ScheduledTask,
    SchedulingBackend,
};
use presentos_core::{CalendarStatus, Identity, ReturnMarker, SessionToken};
use presentos_identity::{IdentityError, IdentityProvider, IdentityResult};

use crate::error::{ClientError, ClientResult};
use crate::navigator::Navigator;
use crate::view::View;

/// Scripted identity provider.
pub struct FakeIdentity {
    pub identity: Identity,
    pub token_value: RefCell<String>,
    pub fail_sign_in: Cell<bool>,
    pub fail_token: Cell<bool>,
    pub fail_sign_out: Cell<bool>,
    pub sign_ins: Cell<usize>,
    pub sign_outs: Cell<usize>,
    pub token_requests: Cell<usize>,
}

impl FakeIdentity {
    pub fn new(display_name: &str, token: &str) -> Self {
        Self {
            identity: Identity::new(display_name),
            token_value: RefCell::new(token.to_string()),
            fail_sign_in: Cell::new(false),
            fail_token: Cell::new(false),
            fail_sign_out: Cell::new(false),
            sign_ins: Cell::new(0),
            sign_outs: Cell::new(0),
            token_requests: Cell::new(0),
        }
    }
}

impl IdentityProvider for FakeIdentity {
    async fn sign_in(&self) -> IdentityResult<Identity> {
        self.sign_ins.set(self.sign_ins.get() + 1);
        if self.fail_sign_in.get() {
            return Err(IdentityError::authentication("scripted sign-in failure"));
        }
        Ok(self.identity.clone())
    }

    async fn sign_out(&self) -> IdentityResult<()> {
        self.sign_outs.set(self.sign_outs.get() + 1);
        if self.fail_sign_out.get() {
            return Err(IdentityError::internal("scripted sign-out failure"));
        }
        Ok(())
    }

    async fn current_token(&self) -> IdentityResult<SessionToken> {
        self.token_requests.set(self.token_requests.get() + 1);
        if self.fail_token.get() {
            return Err(IdentityError::authentication("scripted token failure"));
        }
        Ok(SessionToken::new(self.token_value.borrow().clone()))
    }

    async fn current_identity(&self) -> IdentityResult<Identity> {
        Ok(self.identity.clone())
    }

    fn is_signed_in(&self) -> bool {
        !self.fail_token.get()
    }
}

/// Scripted scheduling backend recording every call and its token.
pub struct FakeBackend {
    grant_responses: RefCell<VecDeque<ApiResult<GrantCheck>>>,
    goals_responses: RefCell<VecDeque<ApiResult<Vec<Goal>>>>,
    pub grant_checks: Cell<usize>,
    pub goal_loads: Cell<usize>,
    pub grant_tokens: RefCell<Vec<String>>,
    pub goals_tokens: RefCell<Vec<String>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self {
            grant_responses: RefCell::new(VecDeque::new()),
            goals_responses: RefCell::new(VecDeque::new()),
            grant_checks: Cell::new(0),
            goal_loads: Cell::new(0),
            grant_tokens: RefCell::new(Vec::new()),
            goals_tokens: RefCell::new(Vec::new()),
        }
    }

    pub fn push_grant(&self, response: ApiResult<GrantCheck>) {
        self.grant_responses.borrow_mut().push_back(response);
    }

    pub fn push_goals(&self, response: ApiResult<Vec<Goal>>) {
        self.goals_responses.borrow_mut().push_back(response);
    }
}

impl SchedulingBackend for FakeBackend {
    async fn check_calendar_grant(&self, token: &SessionToken) -> ApiResult<GrantCheck> {
        self.grant_checks.set(self.grant_checks.get() + 1);
        self.grant_tokens
            .borrow_mut()
            .push(token.as_str().to_string());
        self.grant_responses
            .borrow_mut()
            .pop_front()
            .expect("unscripted grant check")
    }

    async fn list_goals(&self, token: &SessionToken) -> ApiResult<Vec<Goal>> {
        self.goal_loads.set(self.goal_loads.get() + 1);
        self.goals_tokens
            .borrow_mut()
            .push(token.as_str().to_string());
        self.goals_responses
            .borrow_mut()
            .pop_front()
            .expect("unscripted goal load")
    }

    async fn create_goal(&self, _token: &SessionToken, _goal: &NewGoal) -> ApiResult<Goal> {
        Err(ApiError::network("not scripted"))
    }

    async fn schedule_task(
        &self,
        _token: &SessionToken,
        _request: &ActionRequest,
    ) -> ApiResult<ScheduledTask> {
        Err(ApiError::network("not scripted"))
    }
}

/// Scripted navigator.
pub struct FakeNavigator {
    pub marker: Cell<Option<ReturnMarker>>,
    pub redirects: RefCell<Vec<String>>,
    pub fail_redirect: Cell<bool>,
}

impl FakeNavigator {
    pub fn new() -> Self {
        Self {
            marker: Cell::new(None),
            redirects: RefCell::new(Vec::new()),
            fail_redirect: Cell::new(false),
        }
    }

    pub fn with_marker(marker: ReturnMarker) -> Self {
        let nav = Self::new();
        nav.marker.set(Some(marker));
        nav
    }
}

impl Navigator for FakeNavigator {
    fn completion_marker(&self) -> Option<ReturnMarker> {
        self.marker.take()
    }

    async fn redirect(&self, url: &str) -> ClientResult<()> {
        if self.fail_redirect.get() {
            return Err(ClientError::Navigation("browser unavailable".to_string()));
        }
        self.redirects.borrow_mut().push(url.to_string());
        Ok(())
    }
}

/// Everything the controller showed, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewEvent {
    SignedIn(String),
    SignedOut,
    CalendarStatus(CalendarStatus),
    Goals(Vec<String>),
    GoalsCleared,
    Status(String),
    Error(String),
    ConfirmAsked(String),
    ConfirmDismissed,
}

/// A [`View`] that records every effect.
pub struct RecordingView {
    pub events: Vec<ViewEvent>,
    pub confirm_answer: bool,
}

impl RecordingView {
    pub fn new() -> Self {
        Self {
            events: Vec::new(),
            confirm_answer: true,
        }
    }
}

impl View for RecordingView {
    fn show_signed_in(&mut self, identity: &Identity) {
        self.events
            .push(ViewEvent::SignedIn(identity.display_name.clone()));
    }

    fn show_signed_out(&mut self) {
        self.events.push(ViewEvent::SignedOut);
    }

    fn set_calendar_status(&mut self, status: CalendarStatus) {
        self.events.push(ViewEvent::CalendarStatus(status));
    }

    fn show_goals(&mut self, goals: &[Goal]) {
        self.events.push(ViewEvent::Goals(
            goals.iter().map(|g| g.id.clone()).collect(),
        ));
    }

    fn clear_goals(&mut self) {
        self.events.push(ViewEvent::GoalsCleared);
    }

    fn status_line(&mut self, message: &str) {
        self.events.push(ViewEvent::Status(message.to_string()));
    }

    fn error_line(&mut self, message: &str) {
        self.events.push(ViewEvent::Error(message.to_string()));
    }

    fn confirm(&mut self, prompt: &str) -> bool {
        self.events
            .push(ViewEvent::ConfirmAsked(prompt.to_string()));
        self.confirm_answer
    }

    fn dismiss_confirm(&mut self) {
        self.events.push(ViewEvent::ConfirmDismissed);
    }
}
