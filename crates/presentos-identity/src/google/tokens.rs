//! OAuth token persistence.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{IdentityError, IdentityResult};

/// Safety margin subtracted from the reported expiry so tokens are refreshed
/// slightly before they actually lapse.
const EXPIRY_BUFFER_SECS: i64 = 60;

/// A set of OAuth tokens for one signed-in account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenSet {
    /// The short-lived access token attached to API requests.
    pub access_token: String,

    /// The refresh token used to obtain new access tokens.
    pub refresh_token: Option<String>,

    /// When the access token expires (with the refresh buffer applied).
    pub expires_at: Option<DateTime<Utc>>,

    /// The scopes that were granted.
    pub scopes: Vec<String>,
}

impl TokenSet {
    /// Creates a token set from an OAuth token response.
    pub fn new(
        access_token: impl Into<String>,
        refresh_token: Option<String>,
        expires_in_secs: Option<i64>,
        scopes: Vec<String>,
    ) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token,
            expires_at: expires_in_secs.map(Self::expiry_from_now),
            scopes,
        }
    }

    fn expiry_from_now(secs: i64) -> DateTime<Utc> {
        Utc::now() + Duration::seconds(secs) - Duration::seconds(EXPIRY_BUFFER_SECS)
    }

    /// Returns true if the access token is expired or about to expire.
    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(expires_at) => Utc::now() >= expires_at,
            // No expiry reported: assume still valid.
            None => false,
        }
    }

    /// Replaces the access token after a refresh.
    pub fn update_access_token(
        &mut self,
        access_token: impl Into<String>,
        expires_in_secs: Option<i64>,
    ) {
        self.access_token = access_token.into();
        self.expires_at = expires_in_secs.map(Self::expiry_from_now);
    }
}

/// File-backed token storage.
///
/// Tokens are stored as JSON at a fixed path, written atomically and with
/// restrictive permissions on Unix.
#[derive(Debug)]
pub struct TokenStore {
    path: PathBuf,
    tokens: RwLock<Option<TokenSet>>,
}

impl TokenStore {
    /// Creates a store at the given path. Does not touch the filesystem.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            tokens: RwLock::new(None),
        }
    }

    /// Loads tokens from disk. Returns Ok(false) when no token file exists.
    pub fn load(&self) -> IdentityResult<bool> {
        if !self.path.exists() {
            debug!("no token file at {:?}", self.path);
            return Ok(false);
        }

        let content = fs::read_to_string(&self.path)
            .map_err(|e| IdentityError::configuration(format!("failed to read token file: {}", e)))?;

        let tokens: TokenSet = serde_json::from_str(&content).map_err(|e| {
            IdentityError::configuration(format!("failed to parse token file: {}", e))
        })?;

        debug!("loaded tokens from {:?}", self.path);
        *self.tokens.write().unwrap() = Some(tokens);
        Ok(true)
    }

    /// Persists the current tokens to disk.
    pub fn save(&self) -> IdentityResult<()> {
        let tokens = self.tokens.read().unwrap();
        let tokens = tokens
            .as_ref()
            .ok_or_else(|| IdentityError::internal("no tokens to save"))?;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                IdentityError::configuration(format!("failed to create token directory: {}", e))
            })?;
        }

        // Write to a temp file, then rename for atomicity.
        let temp_path = self.path.with_extension("json.tmp");
        let content = serde_json::to_string_pretty(tokens)
            .map_err(|e| IdentityError::internal(format!("failed to serialize tokens: {}", e)))?;

        fs::write(&temp_path, &content).map_err(|e| {
            IdentityError::configuration(format!("failed to write token file: {}", e))
        })?;

        fs::rename(&temp_path, &self.path).map_err(|e| {
            IdentityError::configuration(format!("failed to rename token file: {}", e))
        })?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = fs::Permissions::from_mode(0o600);
            let _ = fs::set_permissions(&self.path, perms);
        }

        debug!("saved tokens to {:?}", self.path);
        Ok(())
    }

    /// Returns a clone of the current tokens, if any.
    pub fn get(&self) -> Option<TokenSet> {
        self.tokens.read().unwrap().clone()
    }

    /// Installs new tokens and persists them.
    pub fn set(&self, tokens: TokenSet) -> IdentityResult<()> {
        *self.tokens.write().unwrap() = Some(tokens);
        self.save()
    }

    /// Updates the access token in place and persists.
    pub fn update_access_token(
        &self,
        access_token: impl Into<String>,
        expires_in_secs: Option<i64>,
    ) -> IdentityResult<()> {
        let mut tokens = self.tokens.write().unwrap();
        if let Some(ref mut t) = *tokens {
            t.update_access_token(access_token, expires_in_secs);
            drop(tokens);
            self.save()
        } else {
            Err(IdentityError::internal("no tokens to update"))
        }
    }

    /// Removes the stored tokens, in memory and on disk.
    pub fn clear(&self) -> IdentityResult<()> {
        *self.tokens.write().unwrap() = None;
        if self.path.exists() {
            fs::remove_file(&self.path).map_err(|e| {
                IdentityError::configuration(format!("failed to remove token file: {}", e))
            })?;
            info!("cleared tokens at {:?}", self.path);
        }
        Ok(())
    }

    /// Returns the storage path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns true if tokens exist and are either valid or refreshable.
    pub fn has_session(&self) -> bool {
        self.tokens
            .read()
            .unwrap()
            .as_ref()
            .is_some_and(|t| !t.is_expired() || t.refresh_token.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store() -> (tempfile::TempDir, TokenStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = TokenStore::new(dir.path().join("tokens.json"));
        (dir, store)
    }

    fn sample_tokens() -> TokenSet {
        TokenSet::new(
            "access-token",
            Some("refresh-token".to_string()),
            Some(3600),
            vec!["openid".to_string()],
        )
    }

    #[test]
    fn token_set_creation() {
        let tokens = sample_tokens();
        assert_eq!(tokens.access_token, "access-token");
        assert!(tokens.expires_at.is_some());
        assert!(!tokens.is_expired());
    }

    #[test]
    fn token_set_expired() {
        let mut tokens = TokenSet::new("access", None, Some(3600), vec![]);
        tokens.expires_at = Some(Utc::now() - Duration::hours(1));
        assert!(tokens.is_expired());
    }

    #[test]
    fn token_set_without_expiry_is_valid() {
        let tokens = TokenSet::new("access", None, None, vec![]);
        assert!(!tokens.is_expired());
    }

    #[test]
    fn update_access_token_resets_expiry() {
        let mut tokens = TokenSet::new("old", None, Some(3600), vec![]);
        tokens.expires_at = Some(Utc::now() - Duration::hours(1));
        tokens.update_access_token("new", Some(3600));
        assert_eq!(tokens.access_token, "new");
        assert!(!tokens.is_expired());
    }

    #[test]
    fn store_save_and_load() {
        let (_dir, store) = temp_store();
        store.set(sample_tokens()).unwrap();
        assert!(store.path().exists());

        let reloaded = TokenStore::new(store.path());
        assert!(reloaded.load().unwrap());
        assert_eq!(reloaded.get().unwrap().access_token, "access-token");
    }

    #[test]
    fn store_clear_removes_file() {
        let (_dir, store) = temp_store();
        store.set(sample_tokens()).unwrap();
        store.clear().unwrap();
        assert!(!store.path().exists());
        assert!(store.get().is_none());
        assert!(!store.has_session());
    }

    #[test]
    fn store_load_without_file() {
        let (_dir, store) = temp_store();
        assert!(!store.load().unwrap());
        assert!(store.get().is_none());
    }

    #[test]
    fn has_session_with_refresh_token() {
        let (_dir, store) = temp_store();
        let mut tokens = sample_tokens();
        tokens.expires_at = Some(Utc::now() - Duration::hours(1));
        store.set(tokens).unwrap();
        // Expired access token but refreshable.
        assert!(store.has_session());
    }

    #[test]
    fn update_without_tokens_errors() {
        let (_dir, store) = temp_store();
        assert!(store.update_access_token("new", Some(3600)).is_err());
    }
}
