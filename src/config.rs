// src/config.rs

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use directories::ProjectDirs;
use dotenvy::dotenv;
use url::Url;

use crate::error::AppError;

/// Storage key the session token lives under.
pub const TOKEN_KEY: &str = "token";

const DEFAULT_LOG_DIR: &str = "logs";
const SESSION_FILE: &str = "session.json";

#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the quiz service. Always ends with `/`.
    pub backend_url: Url,
    pub token_file: PathBuf,
    pub rust_log: String,
    pub log_dir: PathBuf,
    pub http_timeout: Option<Duration>,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let backend_url = lookup("BACKEND_URL")
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| AppError::Config("BACKEND_URL must be set".to_string()))?;
        let backend_url = parse_base_url(&backend_url)?;

        let token_file = lookup("PREPAI_TOKEN_FILE")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(default_token_file);

        let rust_log = lookup("RUST_LOG").unwrap_or_else(|| "info".to_string());

        let log_dir = lookup("PREPAI_LOG_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_DIR));

        let http_timeout = match lookup("PREPAI_HTTP_TIMEOUT_SECS") {
            Some(raw) => {
                let secs: u64 = raw.trim().parse().map_err(|_| {
                    AppError::Config(format!("PREPAI_HTTP_TIMEOUT_SECS is not a number: {}", raw))
                })?;
                Some(Duration::from_secs(secs))
            }
            None => None,
        };

        Ok(Self {
            backend_url,
            token_file,
            rust_log,
            log_dir,
            http_timeout,
        })
    }
}

/// Parses the backend URL so that endpoint names join beneath its path.
pub fn parse_base_url(raw: &str) -> Result<Url, AppError> {
    let mut url = Url::parse(raw.trim())?;
    if url.cannot_be_a_base() {
        return Err(AppError::Config(format!("BACKEND_URL cannot be a base: {}", raw)));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

fn default_token_file() -> PathBuf {
    ProjectDirs::from("", "", "prepai")
        .map(|dirs| dirs.data_dir().join(SESSION_FILE))
        .unwrap_or_else(|| PathBuf::from(".prepai").join(SESSION_FILE))
}
