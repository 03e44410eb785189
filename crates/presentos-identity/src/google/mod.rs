//! Google identity provider.
//!
//! Implements [`IdentityProvider`](crate::IdentityProvider) on top of
//! Google's OAuth 2.0 endpoints:
//!
//! 1. User provides their own OAuth client ID/secret (required by Google)
//! 2. Sign-in opens the browser to the consent page with a PKCE challenge
//!    and waits on a loopback server for the redirect
//! 3. The authorization code is exchanged for access and refresh tokens,
//!    which are persisted with restrictive permissions
//! 4. The profile (display name, avatar) comes from the userinfo endpoint
//! 5. Later sessions refresh the short-lived access token implicitly

mod config;
mod identity;
mod oauth;
mod profile;
mod tokens;

pub use config::{GoogleIdentityConfig, OAuthCredentials};
pub use identity::GoogleIdentity;
pub use oauth::{OAuthClient, Pkce};
pub use tokens::{TokenSet, TokenStore};
