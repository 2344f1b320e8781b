use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::session::AuthError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub display_name: String,
    pub email: String,
    #[serde(default)]
    pub photo_url: Option<String>,
}

/// What an identity provider hands back after a successful sign-in.
#[derive(Debug, Clone)]
pub struct AuthGrant {
    pub user: UserProfile,
    pub access_token: String,
    /// `None` when the provider does not report one; an hour is assumed.
    pub expires_at: Option<DateTime<Utc>>,
}

/// An OAuth identity provider.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn sign_in(&self, client_id: &str) -> Result<AuthGrant, AuthError>;

    /// Silently re-authenticate a previously signed-in account.
    async fn restore(&self, client_id: &str) -> Result<Option<AuthGrant>, AuthError>;

    async fn sign_out(&self);
}
