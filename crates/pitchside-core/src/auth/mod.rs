//! Credential storage for direct provider access.
//!
//! The API token lives in the OS keychain via `keyring`. It is only needed
//! when talking to the provider directly; the forwarding layer holds its
//! own token.

pub mod credentials;

pub use credentials::{CredentialStore, TOKEN_ENV_VAR};
