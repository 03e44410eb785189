//! The `login` command.

use std::path::PathBuf;

use presentos_identity::{GoogleIdentity, GoogleIdentityConfig, IdentityProvider, OAuthCredentials};
use tracing::info;

use crate::config::{ClientConfig, GoogleSettings};
use crate::error::{ClientError, ClientResult};
use crate::session::SessionController;
use crate::view::TtyView;

/// Runs the Google sign-in flow.
///
/// Resolves credentials from CLI flags, a `--credentials-file`, or
/// `config.toml`. Credentials provided via CLI or file are persisted to
/// `config.toml` so later runs can find them.
pub async fn run(
    client_id: Option<String>,
    client_secret: Option<String>,
    credentials_file: Option<PathBuf>,
    force: bool,
    config: &ClientConfig,
) -> ClientResult<()> {
    let (credentials, source) =
        resolve_credentials(client_id, client_secret, credentials_file, config)?;
    credentials
        .validate()
        .map_err(|e| ClientError::Config(format!("invalid Google credentials: {}", e)))?;

    let mut identity_config = GoogleIdentityConfig::new(credentials.clone());
    if let Some(path) = config.google.as_ref().and_then(|g| g.token_path.clone()) {
        identity_config = identity_config.with_token_path(path);
    }

    let provider = GoogleIdentity::new(identity_config)?;

    if provider.is_signed_in() && !force {
        save_credentials(&credentials, &source, config);
        println!("Already signed in.");
        println!("Use --force to sign in again.");
        return Ok(());
    }

    println!("Starting Google sign-in...");
    println!();
    println!("A browser window will open for you to authorize access.");
    println!("If the browser doesn't open, check the terminal for a URL to copy.");
    println!();

    let mut controller = SessionController::new(
        provider,
        super::backend_from(config),
        super::navigator(),
        TtyView::new(),
    );
    controller.request_sign_in().await;

    if !controller.is_signed_in() {
        return Err(ClientError::Config(
            "sign-in did not complete; run with --debug for details".to_string(),
        ));
    }

    save_credentials(&credentials, &source, config);
    info!("Google sign-in successful");
    Ok(())
}

/// Where the credentials were resolved from.
#[derive(Debug, PartialEq)]
enum CredentialSource {
    /// From CLI flags (--client-id/--client-secret or --credentials-file)
    Cli,
    /// From config.toml (already persisted)
    Config,
}

/// Resolves Google credentials from multiple sources.
///
/// Priority (highest to lowest):
/// 1. CLI `--client-id` + `--client-secret`
/// 2. CLI `--credentials-file` (Google Cloud Console JSON)
/// 3. `config.toml` `[google]` section (with secret resolution)
fn resolve_credentials(
    cli_client_id: Option<String>,
    cli_client_secret: Option<String>,
    cli_credentials_file: Option<PathBuf>,
    config: &ClientConfig,
) -> ClientResult<(OAuthCredentials, CredentialSource)> {
    if let (Some(id), Some(secret)) = (&cli_client_id, &cli_client_secret) {
        return Ok((OAuthCredentials::new(id, secret), CredentialSource::Cli));
    }

    if let Some(ref path) = cli_credentials_file {
        let credentials = OAuthCredentials::from_file(path).map_err(|e| {
            ClientError::Config(format!(
                "failed to load credentials from {}: {}",
                path.display(),
                e
            ))
        })?;
        return Ok((credentials, CredentialSource::Cli));
    }

    if let Some(ref google) = config.google
        && google.client_id.is_some()
        && google.client_secret.is_some()
    {
        let credentials = google.resolve_credentials().map_err(ClientError::Config)?;
        return Ok((credentials, CredentialSource::Config));
    }

    if cli_client_id.is_some() || cli_client_secret.is_some() {
        return Err(ClientError::Config(
            "both --client-id and --client-secret are required when providing credentials directly"
                .to_string(),
        ));
    }

    Err(ClientError::Config(format!(
        "Google credentials are required. Provide via:\n  \
         - client_id + client_secret in {}\n  \
         - --client-id and --client-secret flags\n  \
         - --credentials-file flag (path to Google Cloud Console JSON)\n  \
         - GOOGLE_CLIENT_ID and GOOGLE_CLIENT_SECRET env vars",
        ClientConfig::default_path().display()
    )))
}

/// Persists credentials to `config.toml` under `[google]`.
///
/// Only saves if the credentials came from a transient source (CLI flags or
/// `--credentials-file`). If they're already in config.toml, this is a no-op.
fn save_credentials(
    credentials: &OAuthCredentials,
    source: &CredentialSource,
    config: &ClientConfig,
) {
    if *source == CredentialSource::Config {
        return;
    }

    let mut updated = config.clone();
    let google = updated.google.get_or_insert_with(GoogleSettings::default);
    google.client_id = Some(credentials.client_id.clone());
    google.client_secret = Some(credentials.client_secret.clone());

    let content = match toml::to_string_pretty(&updated) {
        Ok(content) => content,
        Err(e) => {
            info!("could not serialize config for writing: {}", e);
            return;
        }
    };

    let config_path = ClientConfig::default_path();
    if let Some(parent) = config_path.parent()
        && let Err(e) = std::fs::create_dir_all(parent)
    {
        info!("could not create config directory {}: {}", parent.display(), e);
        return;
    }

    match std::fs::write(&config_path, content) {
        Ok(()) => {
            info!("credentials saved to {}", config_path.display());
            println!("Credentials saved to {}", config_path.display());
        }
        Err(e) => info!("could not save credentials to {}: {}", config_path.display(), e),
    }
}
