//! Signed-in user state, persisted in the shared key-value store.

pub mod error;
pub mod provider;

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::config::AuthConfig;
use crate::store::KeyValueStore;

pub use error::AuthError;
pub use provider::{AuthGrant, AuthProvider, UserProfile};

pub const USER_KEY: &str = "session.user";
pub const ACCESS_TOKEN_KEY: &str = "session.access_token";
pub const TOKEN_EXPIRY_KEY: &str = "session.token_expiry";

/// Tokens this close to expiry count as expired.
pub const EXPIRY_MARGIN_SECS: i64 = 300;
const DEFAULT_TOKEN_LIFETIME_SECS: i64 = 3600;

pub struct SessionManager {
    store: Arc<dyn KeyValueStore>,
    provider: Option<Arc<dyn AuthProvider>>,
    config: AuthConfig,
    clock: Arc<dyn Clock>,
    current_user: Option<UserProfile>,
}

impl SessionManager {
    /// Restores whatever session was stored last time.
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        provider: Option<Arc<dyn AuthProvider>>,
        config: AuthConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let mut manager = Self {
            store,
            provider,
            config,
            clock,
            current_user: None,
        };
        manager.load_stored_session();
        manager
    }

    pub fn is_logged_in(&self) -> bool {
        self.current_user.is_some() && self.has_valid_token()
    }

    pub fn current_user(&self) -> Option<&UserProfile> {
        self.current_user.as_ref()
    }

    pub fn token_expiry(&self) -> Option<DateTime<Utc>> {
        let raw = self.store.get_string(TOKEN_EXPIRY_KEY).ok().flatten()?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .ok()
    }

    pub fn access_token(&self) -> Option<String> {
        self.store.get_string(ACCESS_TOKEN_KEY).ok().flatten()
    }

    pub async fn sign_in(&mut self) -> Result<UserProfile, AuthError> {
        if !self.config.is_configured() {
            warn!("Sign-in attempted without a configured client id");
            return Err(AuthError::ConfigurationError);
        }
        let provider = self.provider.clone().ok_or(AuthError::ConfigurationError)?;

        let grant = provider.sign_in(&self.config.client_id).await?;
        info!("Signed in as {}", grant.user.display_name);
        self.store_session(&grant.user, &grant);
        self.current_user = Some(grant.user.clone());
        Ok(grant.user)
    }

    pub async fn sign_out(&mut self) {
        if let Some(provider) = &self.provider {
            provider.sign_out().await;
        }
        self.clear_session();
        info!("Signed out");
    }

    /// Returns whether a usable token is available afterwards. Clears the
    /// session when the provider can no longer vouch for the user.
    pub async fn refresh_token_if_needed(&mut self) -> bool {
        let Some(user) = self.current_user.clone() else {
            return false;
        };
        if self.has_valid_token() {
            return true;
        }

        match self.restore_grant().await {
            Some(grant) => {
                debug!("Refreshed access token for {}", user.display_name);
                self.store_session(&user, &grant);
                true
            }
            None => {
                self.clear_session();
                false
            }
        }
    }

    pub async fn restore_previous_sign_in(&mut self) -> bool {
        match self.restore_grant().await {
            Some(grant) => {
                info!("Restored sign-in for {}", grant.user.display_name);
                self.store_session(&grant.user, &grant);
                self.current_user = Some(grant.user);
                true
            }
            None => false,
        }
    }

    async fn restore_grant(&self) -> Option<AuthGrant> {
        let provider = self.provider.as_ref()?;
        match provider.restore(&self.config.client_id).await {
            Ok(grant) => grant,
            Err(e) => {
                debug!("Could not restore previous sign-in: {}", e);
                None
            }
        }
    }

    fn has_valid_token(&self) -> bool {
        self.token_expiry()
            .map(|expiry| expiry - self.clock.now() > Duration::seconds(EXPIRY_MARGIN_SECS))
            .unwrap_or(false)
    }

    fn load_stored_session(&mut self) {
        let data = match self.store.get(USER_KEY) {
            Ok(Some(data)) => data,
            Ok(None) => return,
            Err(e) => {
                warn!("Failed to read stored session: {}", e);
                return;
            }
        };

        match serde_json::from_slice::<UserProfile>(&data) {
            Ok(user) => {
                debug!("Restored session for {}", user.display_name);
                self.current_user = Some(user);
            }
            Err(e) => {
                warn!("Discarding unreadable stored session: {}", e);
                self.clear_session();
            }
        }
    }

    fn store_session(&self, user: &UserProfile, grant: &AuthGrant) {
        let expiry = grant.expires_at.unwrap_or_else(|| {
            self.clock.now() + Duration::seconds(DEFAULT_TOKEN_LIFETIME_SECS)
        });

        let result = serde_json::to_vec(user)
            .map_err(Into::into)
            .and_then(|data| self.store.set(USER_KEY, &data))
            .and_then(|_| self.store.set_string(ACCESS_TOKEN_KEY, &grant.access_token))
            .and_then(|_| self.store.set_string(TOKEN_EXPIRY_KEY, &expiry.to_rfc3339()));
        if let Err(e) = result {
            warn!("Failed to save session: {}", e);
        }
    }

    fn clear_session(&mut self) {
        for key in [USER_KEY, ACCESS_TOKEN_KEY, TOKEN_EXPIRY_KEY] {
            if let Err(e) = self.store.remove(key) {
                warn!("Failed to clear {}: {}", key, e);
            }
        }
        self.current_user = None;
    }
}
