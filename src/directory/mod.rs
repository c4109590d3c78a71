//! External identity provider holding supervisor credentials.
//!
//! The application never issues or verifies tokens itself; it asks the
//! provider to introspect bearer tokens and to manage accounts.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub mod client;

pub use client::ZitadelClient;

#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("Account already exists at the identity provider")]
    AlreadyExists,
    #[error("Account not found at the identity provider")]
    NotFound,
    #[error("Identity provider unavailable: {0}")]
    Unavailable(String),
    #[error("Identity provider rejected the request ({status}): {body}")]
    Rejected { status: u16, body: String },
    #[error("Unexpected identity provider response: {0}")]
    InvalidResponse(String),
}

/// Result of introspecting a bearer token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenInfo {
    pub active: bool,
    #[serde(rename = "sub")]
    pub subject: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccount {
    pub email: String,
    pub name: String,
    pub phone: Option<String>,
    pub password: String,
}

impl NewAccount {
    /// Splits the display name into given and family name; single-word names repeat.
    pub fn name_parts(&self) -> (String, String) {
        let trimmed = self.name.trim();
        match trimmed.split_once(char::is_whitespace) {
            Some((given, family)) => (given.to_string(), family.trim().to_string()),
            None => (trimmed.to_string(), trimmed.to_string()),
        }
    }
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Returns the account subject when the token is active.
    async fn introspect(&self, token: &str) -> Result<Option<String>, IdentityError>;

    /// Creates a login account and returns its subject id.
    async fn create_account(&self, account: &NewAccount) -> Result<String, IdentityError>;

    async fn delete_account(&self, auth_id: &str) -> Result<(), IdentityError>;

    async fn set_account_active(&self, auth_id: &str, active: bool) -> Result<(), IdentityError>;
}
