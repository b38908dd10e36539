// Startpage identity provider
// Sign-in/sign-out and the observable "who is signed in" state that scopes
// every record read and write.

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use tokio::sync::watch;
use tracing::{info, warn};
use uuid::Uuid;

use super::credential_cache::CredentialCache;
use crate::types::errors::AuthError;
use crate::types::identity::Identity;
use crate::types::settings::AccountSettings;

/// Authentication collaborator.
///
/// `subscribe` hands out a receiver that always holds the current identity,
/// or `None` when signed out; every sign-in and sign-out is published there.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn sign_in(&self) -> Result<Identity, AuthError>;
    async fn sign_out(&self) -> Result<(), AuthError>;
    fn current(&self) -> Option<Identity>;
    fn subscribe(&self) -> watch::Receiver<Option<Identity>>;
}

/// Identity provider backed by the profile in the settings file.
///
/// Signing in caches an access token; while that token is cached the
/// provider starts out signed in.
pub struct LocalIdentityProvider {
    profile: Option<Identity>,
    access_token: Option<String>,
    cache: Mutex<CredentialCache>,
    state: watch::Sender<Option<Identity>>,
}

impl LocalIdentityProvider {
    pub fn new(account: &AccountSettings, cache: CredentialCache) -> Self {
        let initial = match (&account.profile, cache.is_present()) {
            (Some(profile), true) => Some(profile.clone()),
            _ => None,
        };
        let (state, _) = watch::channel(initial);
        Self {
            profile: account.profile.clone(),
            access_token: account.access_token.clone(),
            cache: Mutex::new(cache),
            state,
        }
    }

    fn cache(&self) -> MutexGuard<'_, CredentialCache> {
        self.cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl IdentityProvider for LocalIdentityProvider {
    async fn sign_in(&self) -> Result<Identity, AuthError> {
        let profile = self.profile.clone().ok_or_else(|| {
            AuthError::Rejected("no account profile configured".to_string())
        })?;
        if profile.uid.trim().is_empty() {
            return Err(AuthError::Rejected("account profile has an empty uid".to_string()));
        }

        let token = self
            .access_token
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        self.cache().store(&token)?;

        self.state.send_replace(Some(profile.clone()));
        info!(uid = %profile.uid, "[IdentityProvider] signed in");
        Ok(profile)
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        let cleared = self.cache().clear();
        // The session ends even if the cached token could not be removed.
        self.state.send_replace(None);
        if let Err(e) = &cleared {
            warn!(error = %e, "[IdentityProvider] signed out with a stale credential file");
        } else {
            info!("[IdentityProvider] signed out");
        }
        cleared
    }

    fn current(&self) -> Option<Identity> {
        self.state.borrow().clone()
    }

    fn subscribe(&self) -> watch::Receiver<Option<Identity>> {
        self.state.subscribe()
    }
}
