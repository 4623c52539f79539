//! Persistence for the single session token.
//!
//! The file store keeps a JSON object keyed by [`TOKEN_KEY`] with restricted
//! permissions (0600). Tokens are never logged in full.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::config::TOKEN_KEY;
use crate::error::AppError;

/// Storage primitive for the session token.
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Returns the stored token, `None` if nothing is stored.
    async fn load(&self) -> Result<Option<String>, AppError>;

    async fn save(&self, token: &str) -> Result<(), AppError>;

    /// Removes the stored token. Clearing an empty store is not an error.
    async fn clear(&self) -> Result<(), AppError>;
}

/// A stored token with the time it was written.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredToken {
    pub value: String,
    pub saved_at: DateTime<Utc>,
}

/// Token store backed by a JSON file.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_entries(&self) -> Result<HashMap<String, StoredToken>, AppError> {
        let contents = match fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(HashMap::new()),
            Err(e) => {
                return Err(AppError::Storage(format!(
                    "Failed to read {}: {}",
                    self.path.display(),
                    e
                )));
            }
        };

        serde_json::from_str(&contents).map_err(|e| {
            AppError::Storage(format!("Failed to parse {}: {}", self.path.display(), e))
        })
    }

    async fn write_entries(&self, entries: &HashMap<String, StoredToken>) -> Result<(), AppError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await.map_err(|e| {
                    AppError::Storage(format!("Failed to create {}: {}", parent.display(), e))
                })?;
            }
        }

        let contents = serde_json::to_string_pretty(entries)?;

        let mut options = fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            options.mode(0o600);
        }

        let mut file = options.open(&self.path).await.map_err(|e| {
            AppError::Storage(format!("Failed to open {}: {}", self.path.display(), e))
        })?;
        file.write_all(contents.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}

#[async_trait]
impl TokenStore for FileTokenStore {
    async fn load(&self) -> Result<Option<String>, AppError> {
        let entries = self.read_entries().await?;
        Ok(entries
            .get(TOKEN_KEY)
            .map(|stored| stored.value.clone())
            .filter(|value| !value.is_empty()))
    }

    async fn save(&self, token: &str) -> Result<(), AppError> {
        let mut entries = self.read_entries().await.unwrap_or_default();
        entries.insert(
            TOKEN_KEY.to_string(),
            StoredToken {
                value: token.to_string(),
                saved_at: Utc::now(),
            },
        );
        self.write_entries(&entries).await
    }

    async fn clear(&self) -> Result<(), AppError> {
        // An unreadable file holds no usable token; overwrite it.
        let (mut entries, corrupt) = match self.read_entries().await {
            Ok(entries) => (entries, false),
            Err(_) => (HashMap::new(), true),
        };
        if entries.remove(TOKEN_KEY).is_none() && !corrupt {
            return Ok(());
        }
        self.write_entries(&entries).await
    }
}

/// In-process token store. Nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: Mutex<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Mutex::new(Some(token.into())),
        }
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn load(&self) -> Result<Option<String>, AppError> {
        let guard = self
            .token
            .lock()
            .map_err(|e| AppError::Storage(e.to_string()))?;
        Ok(guard.clone())
    }

    async fn save(&self, token: &str) -> Result<(), AppError> {
        let mut guard = self
            .token
            .lock()
            .map_err(|e| AppError::Storage(e.to_string()))?;
        *guard = Some(token.to_string());
        Ok(())
    }

    async fn clear(&self) -> Result<(), AppError> {
        let mut guard = self
            .token
            .lock()
            .map_err(|e| AppError::Storage(e.to_string()))?;
        *guard = None;
        Ok(())
    }
}

/// Returns a masked version of a token for logs (first 6 chars + ...).
pub fn mask_token(token: &str) -> String {
    match token.char_indices().nth(6) {
        Some((idx, _)) if token.len() > 12 => format!("{}...", &token[..idx]),
        _ => "***".to_string(),
    }
}
