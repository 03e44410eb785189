//! HTTP client for the scheduling backend.

use std::future::Future;
use std::time::Duration;

use presentos_core::SessionToken;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::error::{ApiError, ApiResult};
use crate::types::{ActionRequest, ErrorDetail, Goal, GrantCheck, NewGoal, ScheduledTask};

/// The scheduling backend as consumed by the client controller.
///
/// All operations take the token explicitly; the caller decides which
/// session the request runs under.
pub trait SchedulingBackend {
    /// Asks whether the identity behind `token` holds a calendar grant.
    fn check_calendar_grant(
        &self,
        token: &SessionToken,
    ) -> impl Future<Output = ApiResult<GrantCheck>>;

    /// Lists the identity's goals.
    fn list_goals(&self, token: &SessionToken) -> impl Future<Output = ApiResult<Vec<Goal>>>;

    /// Creates a goal.
    fn create_goal(
        &self,
        token: &SessionToken,
        goal: &NewGoal,
    ) -> impl Future<Output = ApiResult<Goal>>;

    /// Submits a scheduling intent.
    fn schedule_task(
        &self,
        token: &SessionToken,
        request: &ActionRequest,
    ) -> impl Future<Output = ApiResult<ScheduledTask>>;
}

/// HTTP implementation of [`SchedulingBackend`].
pub struct BackendClient {
    base_url: String,
    http: reqwest::Client,
}

impl BackendClient {
    /// Creates a client for the backend at `base_url`.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("failed to create HTTP client");
        Self { base_url, http }
    }

    /// Returns the normalized base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// Serializes a JSON request body.
    fn encode<T: serde::Serialize>(body: &T) -> ApiResult<String> {
        serde_json::to_string(body)
            .map_err(|e| ApiError::invalid_response("failed to encode request").with_source(e))
    }

    /// Sends a request and decodes the JSON body, mapping HTTP failures
    /// onto the error taxonomy. The body is read as text first so parse
    /// failures are reported distinctly from transport failures.
    async fn read_json<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> ApiResult<T> {
        let response = request
            .send()
            .await
            .map_err(|e| ApiError::network("backend request failed").with_source(e))?;

        let status = response.status();
        if status.is_success() {
            let body = response
                .text()
                .await
                .map_err(|e| ApiError::network("failed to read response").with_source(e))?;
            return serde_json::from_str(&body)
                .map_err(|e| ApiError::invalid_response("failed to parse response").with_source(e));
        }

        // Non-2xx: prefer the backend's own explanation when the body
        // carries one.
        let retry_after = response
            .headers()
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.text().await.unwrap_or_default();
        let detail = serde_json::from_str::<ErrorDetail>(&body)
            .ok()
            .map(|d| d.detail);

        warn!(status = %status, "backend returned an error");

        Err(match (status.as_u16(), detail) {
            (401, _) => ApiError::authentication("session token rejected"),
            (403, _) => ApiError::authorization("not allowed"),
            (429, _) => {
                let hint = retry_after
                    .map(|s| format!(" (retry after {s}s)"))
                    .unwrap_or_default();
                ApiError::rate_limited(format!("rate limited{hint}"))
            }
            (404, Some(detail)) => ApiError::backend(detail),
            (404, None) => ApiError::not_found(format!("not found: {status}")),
            (_, Some(detail)) => ApiError::backend(detail),
            (code, None) if code >= 500 => ApiError::server(format!("backend error: {status}")),
            (_, None) => ApiError::bad_request(format!("request rejected: {status}")),
        })
    }
}

impl SchedulingBackend for BackendClient {
    async fn check_calendar_grant(&self, token: &SessionToken) -> ApiResult<GrantCheck> {
        debug!("checking calendar grant");
        self.read_json(
            self.http
                .get(self.url("auth/google/login"))
                .query(&[("permission", "true")])
                .bearer_auth(token.as_str()),
        )
        .await
    }

    async fn list_goals(&self, token: &SessionToken) -> ApiResult<Vec<Goal>> {
        debug!("listing goals");
        self.read_json(self.http.get(self.url("goals/")).bearer_auth(token.as_str()))
            .await
    }

    async fn create_goal(&self, token: &SessionToken, goal: &NewGoal) -> ApiResult<Goal> {
        debug!(name = %goal.name, "creating goal");
        let body = Self::encode(goal)?;
        self.read_json(
            self.http
                .post(self.url("goals/"))
                .bearer_auth(token.as_str())
                .header(reqwest::header::CONTENT_TYPE, "application/json")
                .body(body),
        )
        .await
    }

    async fn schedule_task(
        &self,
        token: &SessionToken,
        request: &ActionRequest,
    ) -> ApiResult<ScheduledTask> {
        debug!(goal_id = %request.payload.goal_id, "submitting scheduling intent");
        let body = Self::encode(request)?;
        self.read_json(
            self.http
                .post(self.url("actions/"))
                .bearer_auth(token.as_str())
                .header(reqwest::header::CONTENT_TYPE, "application/json")
                .body(body),
        )
        .await
    }
}
