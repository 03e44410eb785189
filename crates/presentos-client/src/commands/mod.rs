//! CLI command implementations.

pub mod dashboard;
pub mod goals;
pub mod login;
pub mod logout;
pub mod schedule;
pub mod status;

use presentos_api::BackendClient;
use presentos_identity::GoogleIdentity;

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::navigator::MarkerFile;
use crate::session::SessionController;
use crate::view::TtyView;

/// Builds the identity provider from configuration.
fn identity_from(config: &ClientConfig) -> ClientResult<GoogleIdentity> {
    let google = config.google.as_ref().ok_or_else(|| {
        ClientError::Config(format!(
            "Google credentials not found. Add a [google] section to {} \
             or run: presentos login --credentials-file <path>",
            ClientConfig::default_path().display()
        ))
    })?;
    let identity_config = google.to_identity_config().map_err(ClientError::Config)?;
    Ok(GoogleIdentity::new(identity_config)?)
}

/// Builds the backend client from configuration.
fn backend_from(config: &ClientConfig) -> BackendClient {
    BackendClient::new(&config.backend.base_url, config.backend.timeout_duration())
}

/// Builds the real navigator; the marker lives in the data directory.
fn navigator() -> MarkerFile {
    MarkerFile::new(ClientConfig::default_data_dir().join("calendar-return"))
}

/// Builds the full controller over the real seams.
fn controller_from(
    config: &ClientConfig,
) -> ClientResult<SessionController<GoogleIdentity, BackendClient, MarkerFile, TtyView>> {
    Ok(SessionController::new(
        identity_from(config)?,
        backend_from(config),
        navigator(),
        TtyView::new(),
    ))
}
