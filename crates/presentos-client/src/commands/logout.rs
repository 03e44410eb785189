//! The `logout` command.

use presentos_identity::IdentityProvider;

use crate::config::ClientConfig;
use crate::error::ClientResult;

/// Signs out after a confirmation prompt.
pub async fn run(config: &ClientConfig) -> ClientResult<()> {
    let mut controller = super::controller_from(config)?;

    if !controller.provider().is_signed_in() {
        println!("Not signed in.");
        return Ok(());
    }

    controller.request_sign_out().await;
    Ok(())
}
