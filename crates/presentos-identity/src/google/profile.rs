//! Userinfo fetch: access token to [`Identity`].

use presentos_core::Identity;
use serde::Deserialize;
use tracing::debug;

use crate::error::{IdentityError, IdentityResult};

const USERINFO_URL: &str = "https://openidconnect.googleapis.com/v1/userinfo";

/// Response from the OpenID Connect userinfo endpoint.
#[derive(Debug, Deserialize)]
struct UserInfo {
    name: Option<String>,
    given_name: Option<String>,
    picture: Option<String>,
    email: Option<String>,
}

impl UserInfo {
    fn into_identity(self) -> Identity {
        let display_name = self
            .name
            .or(self.given_name)
            .or(self.email)
            .unwrap_or_else(|| "Google user".to_string());

        Identity {
            display_name,
            avatar_url: self.picture,
        }
    }
}

/// Fetches the signed-in user's profile.
pub async fn fetch_identity(http: &reqwest::Client, access_token: &str) -> IdentityResult<Identity> {
    let response = http
        .get(USERINFO_URL)
        .bearer_auth(access_token)
        .send()
        .await
        .map_err(|e| IdentityError::network(format!("userinfo request failed: {}", e)))?;

    let status = response.status();

    if status == reqwest::StatusCode::UNAUTHORIZED {
        return Err(IdentityError::authentication(
            "access token expired or invalid",
        ));
    }

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(IdentityError::network(format!(
            "userinfo error ({}): {}",
            status, body
        )));
    }

    let body = response
        .text()
        .await
        .map_err(|e| IdentityError::network(format!("failed to read response: {}", e)))?;

    let info: UserInfo = serde_json::from_str(&body)
        .map_err(|e| IdentityError::invalid_response(format!("failed to parse userinfo: {}", e)))?;

    let identity = info.into_identity();
    debug!("fetched profile for {}", identity.display_name);
    Ok(identity)
}
