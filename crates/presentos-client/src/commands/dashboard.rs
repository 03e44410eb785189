//! The `dashboard` command: one full session pass.
//!
//! Replays the stored sign-in: refreshes the token, resolves the calendar
//! grant (possibly consuming a completion marker left by a previous pass),
//! and renders the goal list.

use presentos_identity::{IdentityEvent, IdentityProvider};
use tracing::warn;

use crate::config::ClientConfig;
use crate::error::ClientResult;

/// Runs one session pass for the stored identity.
pub async fn run(config: &ClientConfig) -> ClientResult<()> {
    let mut controller = super::controller_from(config)?;

    if !controller.provider().is_signed_in() {
        println!("Not signed in. Run: presentos login");
        return Ok(());
    }

    let identity = match controller.provider().current_identity().await {
        Ok(identity) => identity,
        Err(e) => {
            warn!("could not refresh session: {}", e);
            println!("Could not refresh your session. Run: presentos login");
            return Ok(());
        }
    };

    controller
        .on_identity_changed(IdentityEvent::SignedIn(identity))
        .await;
    Ok(())
}
