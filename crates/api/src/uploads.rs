//! Storage for uploaded product images.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;
use tracing::instrument;
use uuid::Uuid;

use crate::config::UploadConfig;

/// Errors that can occur while storing an image.
#[derive(Debug, Error)]
pub enum ImageStoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Somewhere product images can be written to and served from.
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Store one image and return the URL it is served under.
    async fn save(&self, original_name: &str, bytes: &[u8]) -> Result<String, ImageStoreError>;

    /// Remove an image previously returned by [`save`](Self::save).
    ///
    /// Returns `false` if the URL is not one of ours or the file is gone.
    async fn delete(&self, url: &str) -> Result<bool, ImageStoreError>;
}

/// Writes images to a local directory under generated names.
#[derive(Debug, Clone)]
pub struct LocalImageStore {
    dir: PathBuf,
    public_url: String,
}

impl LocalImageStore {
    #[must_use]
    pub fn new(config: &UploadConfig) -> Self {
        Self {
            dir: config.dir.clone(),
            public_url: config.public_url.trim_end_matches('/').to_owned(),
        }
    }
}

/// Lowercased extension of the uploaded file name, if it looks like one.
fn extension(original_name: &str) -> Option<String> {
    let ext = Path::new(original_name).extension()?.to_str()?;
    let valid = !ext.is_empty() && ext.len() <= 5 && ext.chars().all(|c| c.is_ascii_alphanumeric());
    valid.then(|| ext.to_ascii_lowercase())
}

/// Whether `name` could have come from [`stored_name`].
fn is_stored_name(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('.')
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '.')
}

/// Generated file name; the upload's own name never reaches the filesystem.
fn stored_name(original_name: &str) -> String {
    let id = Uuid::new_v4();
    match extension(original_name) {
        Some(ext) => format!("{id}.{ext}"),
        None => id.to_string(),
    }
}

#[async_trait]
impl ImageStore for LocalImageStore {
    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    async fn save(&self, original_name: &str, bytes: &[u8]) -> Result<String, ImageStoreError> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let name = stored_name(original_name);
        tokio::fs::write(self.dir.join(&name), bytes).await?;

        Ok(format!("{}/{name}", self.public_url))
    }

    #[instrument(skip(self))]
    async fn delete(&self, url: &str) -> Result<bool, ImageStoreError> {
        let Some(name) = url
            .strip_prefix(self.public_url.as_str())
            .and_then(|rest| rest.strip_prefix('/'))
            .filter(|name| is_stored_name(name))
        else {
            return Ok(false);
        };

        match tokio::fs::remove_file(self.dir.join(name)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn extension_is_kept_when_sane() {
        assert_eq!(extension("Photo.JPG").as_deref(), Some("jpg"));
        assert_eq!(extension("../../etc/passwd"), None);
        assert_eq!(extension("image.tar.gz").as_deref(), Some("gz"));
        assert_eq!(extension("weird.ph p"), None);
    }

    #[tokio::test]
    async fn save_writes_file_and_returns_public_url() {
        let dir = std::env::temp_dir().join(format!("arvigo-uploads-{}", Uuid::new_v4()));
        let store = LocalImageStore::new(&UploadConfig {
            dir: dir.clone(),
            public_url: "/uploads/".to_owned(),
            max_body_bytes: 1024,
        });

        let url = store.save("front.png", b"png-bytes").await.unwrap();
        assert!(url.starts_with("/uploads/"));
        assert!(url.ends_with(".png"));

        let name = url.trim_start_matches("/uploads/");
        let written = tokio::fs::read(dir.join(name)).await.unwrap();
        assert_eq!(written, b"png-bytes");

        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }

    #[tokio::test]
    async fn delete_removes_only_files_it_stored() {
        let dir = std::env::temp_dir().join(format!("arvigo-uploads-{}", Uuid::new_v4()));
        let store = LocalImageStore::new(&UploadConfig {
            dir: dir.clone(),
            public_url: "/uploads".to_owned(),
            max_body_bytes: 1024,
        });

        let url = store.save("front.png", b"png-bytes").await.unwrap();
        assert!(store.delete(&url).await.unwrap());
        assert!(!store.delete(&url).await.unwrap());
        assert!(!store.delete("/uploads/../secrets.env").await.unwrap());
        assert!(!store.delete("https://cdn.example.com/x.png").await.unwrap());

        let mut entries = tokio::fs::read_dir(&dir).await.unwrap();
        assert!(entries.next_entry().await.unwrap().is_none());

        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }
}
