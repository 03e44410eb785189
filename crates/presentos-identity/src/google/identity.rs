//! The Google [`IdentityProvider`] implementation.

use presentos_core::{Identity, SessionToken};
use tracing::{debug, info, warn};

use crate::error::{IdentityError, IdentityResult};
use crate::provider::IdentityProvider;

use super::config::GoogleIdentityConfig;
use super::oauth::OAuthClient;
use super::profile;
use super::tokens::TokenStore;

/// Google identity provider.
///
/// Holds the token store and OAuth client; sign-in state survives process
/// restarts through the persisted tokens.
#[derive(Debug)]
pub struct GoogleIdentity {
    config: GoogleIdentityConfig,
    tokens: TokenStore,
    oauth: OAuthClient,
    http: reqwest::Client,
}

impl GoogleIdentity {
    /// Creates the provider, loading any persisted tokens.
    ///
    /// # Errors
    ///
    /// Returns a fatal configuration error when credentials are missing or
    /// malformed; no further core logic should run in that case.
    pub fn new(config: GoogleIdentityConfig) -> IdentityResult<Self> {
        config.validate().map_err(IdentityError::configuration)?;

        let tokens = TokenStore::new(&config.token_path);
        // A corrupt or unreadable token file means signed out, not a hard
        // failure, but leave a trace of why.
        if let Err(e) = tokens.load() {
            warn!("could not load persisted tokens: {}", e);
        }

        let oauth = OAuthClient::new(config.credentials.clone(), config.timeout);
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .expect("failed to create HTTP client");

        Ok(Self {
            config,
            tokens,
            oauth,
            http,
        })
    }

    /// Returns a valid access token, refreshing an expired one first.
    async fn valid_access_token(&self) -> IdentityResult<String> {
        let tokens = self.tokens.get().ok_or_else(|| {
            IdentityError::authentication("not signed in - run `presentos login`")
        })?;

        if !tokens.is_expired() {
            return Ok(tokens.access_token);
        }

        let refresh_token = tokens.refresh_token.as_ref().ok_or_else(|| {
            IdentityError::authentication("no refresh token - sign in again")
        })?;

        debug!("refreshing expired access token");
        let (access_token, expires_in) = self.oauth.refresh(refresh_token).await?;
        self.tokens.update_access_token(&access_token, expires_in)?;

        Ok(access_token)
    }
}

impl IdentityProvider for GoogleIdentity {
    async fn sign_in(&self) -> IdentityResult<Identity> {
        info!("starting Google sign-in");

        let tokens = self
            .oauth
            .authorize(&self.config.scopes, self.config.loopback_port_range)
            .await?;

        let access_token = tokens.access_token.clone();
        self.tokens.set(tokens)?;

        let identity = profile::fetch_identity(&self.http, &access_token).await?;
        info!("signed in as {}", identity.display_name);
        Ok(identity)
    }

    async fn sign_out(&self) -> IdentityResult<()> {
        self.tokens.clear()?;
        info!("signed out");
        Ok(())
    }

    async fn current_token(&self) -> IdentityResult<SessionToken> {
        let access_token = self.valid_access_token().await?;
        Ok(SessionToken::new(access_token))
    }

    async fn current_identity(&self) -> IdentityResult<Identity> {
        let access_token = self.valid_access_token().await?;
        profile::fetch_identity(&self.http, &access_token).await
    }

    fn is_signed_in(&self) -> bool {
        self.tokens.has_session()
    }
}
