use anyhow::{Context, Result};
use keyring::Entry;
use tracing::debug;

const SERVICE_NAME: &str = "pitchside";

/// Keychain account the provider token is stored under
const TOKEN_ACCOUNT: &str = "football-data-token";

/// Environment variable that takes precedence over the keychain
pub const TOKEN_ENV_VAR: &str = "FOOTBALL_DATA_TOKEN";

pub struct CredentialStore;

impl CredentialStore {
    /// Store the API token in the OS keychain
    pub fn store_token(token: &str) -> Result<()> {
        let entry = Entry::new(SERVICE_NAME, TOKEN_ACCOUNT)
            .context("Failed to create keyring entry")?;
        entry
            .set_password(token.trim())
            .context("Failed to store token in keychain")?;
        Ok(())
    }

    /// Retrieve the API token from the OS keychain
    pub fn get_token() -> Result<String> {
        let entry = Entry::new(SERVICE_NAME, TOKEN_ACCOUNT)
            .context("Failed to create keyring entry")?;
        entry
            .get_password()
            .context("Failed to retrieve token from keychain")
    }

    /// Delete the stored token
    pub fn delete_token() -> Result<()> {
        let entry = Entry::new(SERVICE_NAME, TOKEN_ACCOUNT)
            .context("Failed to create keyring entry")?;
        entry
            .delete_credential()
            .context("Failed to delete token from keychain")?;
        Ok(())
    }

    /// Token from the environment, else the keychain.
    pub fn resolve_token() -> Option<String> {
        Self::resolve_with(std::env::var(TOKEN_ENV_VAR).ok(), || Self::get_token().ok())
    }

    fn resolve_with(env: Option<String>, keychain: impl FnOnce() -> Option<String>) -> Option<String> {
        if let Some(token) = env.filter(|t| !t.trim().is_empty()) {
            debug!("Using API token from environment");
            return Some(token);
        }
        keychain().filter(|t| !t.trim().is_empty())
    }
}
