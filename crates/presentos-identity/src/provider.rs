//! The identity-provider seam.

use presentos_core::{Identity, SessionToken};

use crate::error::IdentityResult;

/// Notification delivered when the sign-in state changes.
///
/// There is one dispatch point with one active subscriber: the session
/// controller. Sign-in and sign-out both flow through it, whether triggered
/// by the user or externally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityEvent {
    /// A user signed in.
    SignedIn(Identity),
    /// The current user signed out.
    SignedOut,
}

/// Capability consumed from the identity provider.
///
/// Implementations own token issuance and renewal; callers never inspect
/// tokens beyond attaching them to requests.
pub trait IdentityProvider {
    /// Runs the provider's interactive consent flow and returns the
    /// signed-in identity.
    fn sign_in(&self) -> impl Future<Output = IdentityResult<Identity>>;

    /// Signs the current user out, invalidating stored credentials.
    fn sign_out(&self) -> impl Future<Output = IdentityResult<()>>;

    /// Returns a currently valid bearer token, refreshing an expired one
    /// first. May suspend; must be awaited, never assumed instantaneous.
    fn current_token(&self) -> impl Future<Output = IdentityResult<SessionToken>>;

    /// Returns the profile of the signed-in user.
    fn current_identity(&self) -> impl Future<Output = IdentityResult<Identity>>;

    /// Returns true if a user is signed in (valid or refreshable tokens).
    fn is_signed_in(&self) -> bool;
}
