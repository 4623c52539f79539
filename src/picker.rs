// src/picker.rs

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::error::AppError;

pub const PDF_MIME: &str = "application/pdf";

/// A document chosen by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickedDocument {
    pub name: String,
    pub path: PathBuf,
    pub mime: String,
}

/// External file picker.
///
/// `Ok(None)` means the user cancelled. Implementations only return
/// documents whose type is in `accept`.
#[async_trait]
pub trait DocumentPicker: Send + Sync {
    async fn pick(&self, accept: &[&str]) -> Result<Option<PickedDocument>, AppError>;
}

/// Picker for the terminal: the "selection" is a path typed by the user.
/// An empty path is a cancellation.
#[derive(Debug, Clone)]
pub struct PathPicker {
    path: Option<PathBuf>,
}

impl PathPicker {
    pub fn new(input: &str) -> Self {
        let trimmed = input.trim();
        Self {
            path: (!trimmed.is_empty()).then(|| PathBuf::from(trimmed)),
        }
    }
}

#[async_trait]
impl DocumentPicker for PathPicker {
    async fn pick(&self, accept: &[&str]) -> Result<Option<PickedDocument>, AppError> {
        let Some(path) = &self.path else {
            return Ok(None);
        };

        let mime = sniff_mime(path).await?;
        if !accept.contains(&mime.as_str()) {
            return Err(AppError::Picker(format!(
                "{} is {}, expected one of: {}",
                path.display(),
                mime,
                accept.join(", ")
            )));
        }

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        Ok(Some(PickedDocument {
            name,
            path: path.clone(),
            mime,
        }))
    }
}

/// Detects the file type from its leading bytes.
async fn sniff_mime(path: &Path) -> Result<String, AppError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| AppError::Picker(format!("Cannot open {}: {}", path.display(), e)))?;
    Ok(infer::get(&bytes)
        .map(|kind| kind.mime_type().to_string())
        .unwrap_or_else(|| "application/octet-stream".to_string()))
}
