// src/session.rs

use std::sync::Arc;

use tokio::sync::watch;

use crate::{
    error::AppError,
    token_store::{TokenStore, mask_token},
};

/// Shared handle to the signed-in session.
///
/// Every screen receives a clone. Changes to the token are published on a
/// `watch` channel so that one subscriber can react to the session becoming
/// invalid, whichever request discovered it.
#[derive(Clone)]
pub struct Session {
    store: Arc<dyn TokenStore>,
    tx: Arc<watch::Sender<Option<String>>>,
}

impl Session {
    /// Reads the stored token. A failed read is treated as "signed out".
    pub async fn restore(store: Arc<dyn TokenStore>) -> Self {
        let token = match store.load().await {
            Ok(token) => token,
            Err(e) => {
                tracing::warn!("Failed to read stored token, continuing signed out: {}", e);
                None
            }
        };

        match &token {
            Some(t) => tracing::info!("Restored session {}", mask_token(t)),
            None => tracing::info!("No stored session"),
        }

        let (tx, _rx) = watch::channel(token);
        Self {
            store,
            tx: Arc::new(tx),
        }
    }

    pub fn token(&self) -> Option<String> {
        self.tx.borrow().clone()
    }

    pub fn is_signed_in(&self) -> bool {
        self.tx.borrow().is_some()
    }

    /// Persists a freshly issued token and publishes it.
    pub async fn sign_in(&self, token: &str) -> Result<(), AppError> {
        self.store.save(token).await?;
        tracing::info!("Signed in as {}", mask_token(token));
        self.tx.send_replace(Some(token.to_string()));
        Ok(())
    }

    /// Clears the stored token. The in-memory session is cleared even when
    /// the storage write fails.
    pub async fn sign_out(&self) -> Result<(), AppError> {
        self.tx.send_replace(None);
        let result = self.store.clear().await;
        if let Err(e) = &result {
            tracing::warn!("Failed to clear stored token: {}", e);
        }
        tracing::info!("Signed out");
        result
    }

    /// Ends the session after the backend rejected the token.
    pub async fn invalidate(&self) {
        if self.tx.borrow().is_none() {
            return;
        }
        tracing::warn!("Session rejected by backend, signing out");
        let _ = self.sign_out().await;
    }

    /// Subscribes to token changes. The current value counts as seen.
    pub fn subscribe(&self) -> watch::Receiver<Option<String>> {
        self.tx.subscribe()
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("signed_in", &self.is_signed_in())
            .finish()
    }
}
