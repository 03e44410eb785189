//! The `status` command.
//!
//! Read-only: checks the grant without consuming any pending completion
//! marker and never starts the consent flow.

use presentos_api::SchedulingBackend;
use presentos_identity::IdentityProvider;
use tracing::warn;

use crate::config::ClientConfig;
use crate::error::ClientResult;

/// Prints session and calendar-grant status.
pub async fn run(config: &ClientConfig) -> ClientResult<()> {
    let provider = super::identity_from(config)?;

    if !provider.is_signed_in() {
        println!("Session:  signed out");
        return Ok(());
    }

    let identity = provider.current_identity().await?;
    println!("Session:  signed in as {}", identity.display_name);

    let backend = super::backend_from(config);
    let token = provider.current_token().await?;
    match backend.check_calendar_grant(&token).await {
        Ok(check) => println!("Calendar: {}", check.state()),
        Err(e) => {
            warn!("calendar grant check failed: {}", e);
            println!("Calendar: check failed ({})", e.message());
        }
    }

    println!("Backend:  {}", backend.base_url());
    Ok(())
}
