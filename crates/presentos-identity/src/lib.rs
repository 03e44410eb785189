//! Identity-provider abstraction for the Present OS client.
//!
//! The rest of the application consumes the provider as a capability:
//! "give me a current identity token; notify me on sign-in/sign-out". This
//! crate defines that seam ([`IdentityProvider`], [`IdentityEvent`]) and the
//! Google implementation ([`google::GoogleIdentity`]):
//!
//! 1. Interactive sign-in runs the OAuth 2.0 PKCE flow with a loopback
//!    redirect (the browser consent page stands in for the provider popup)
//! 2. Tokens are persisted and the short-lived access token is refreshed
//!    implicitly whenever a current token is requested
//! 3. The user's profile (display name, avatar) is fetched from the
//!    userinfo endpoint after sign-in

pub mod error;
pub mod google;
pub mod provider;

pub use error::{IdentityError, IdentityErrorCode, IdentityResult};
pub use google::{GoogleIdentity, GoogleIdentityConfig, OAuthCredentials};
pub use provider::{IdentityEvent, IdentityProvider};
