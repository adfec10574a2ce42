//! # Blob Storage
//!
//! The document upload path treats file storage as an opaque
//! `save(file) -> url` contract. [`LocalBlobStore`] is the filesystem
//! implementation; deployments can swap in anything that satisfies
//! [`BlobStore`].

use std::path::PathBuf;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::{LiftopsError, Result};

/// Opaque blob-store contract: persist the bytes, return a public URL.
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn save(&self, file_name: &str, bytes: &[u8]) -> Result<String>;
}

/// Stores uploads under a local directory with uuid-prefixed names, served
/// from a configured public base path.
pub struct LocalBlobStore {
    dir: PathBuf,
    public_base: String,
}

impl LocalBlobStore {
    pub fn new(dir: impl Into<PathBuf>, public_base: impl Into<String>) -> Self {
        LocalBlobStore {
            dir: dir.into(),
            public_base: public_base.into(),
        }
    }

    /// Strip path components and keep a conservative character set so a
    /// hostile file name cannot escape the uploads directory.
    fn sanitize(file_name: &str) -> String {
        let base = file_name
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(file_name);
        let cleaned: String = base
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        if cleaned.trim_matches(['.', '_']).is_empty() {
            "upload".to_string()
        } else {
            cleaned
        }
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn save(&self, file_name: &str, bytes: &[u8]) -> Result<String> {
        let stored_name = format!("{}-{}", Uuid::new_v4(), Self::sanitize(file_name));

        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| LiftopsError::Storage(format!("creating uploads dir: {e}")))?;
        tokio::fs::write(self.dir.join(&stored_name), bytes)
            .await
            .map_err(|e| LiftopsError::Storage(format!("writing {stored_name}: {e}")))?;

        Ok(format!(
            "{}/{stored_name}",
            self.public_base.trim_end_matches('/')
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_strips_paths_and_odd_characters() {
        assert_eq!(
            LocalBlobStore::sanitize("../../etc/passwd"),
            "passwd".to_string()
        );
        assert_eq!(
            LocalBlobStore::sanitize("shaft drawing (rev 2).pdf"),
            "shaft_drawing__rev_2_.pdf".to_string()
        );
        assert_eq!(LocalBlobStore::sanitize("..."), "upload".to_string());
    }

    #[tokio::test]
    async fn save_writes_the_file_and_returns_a_url() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalBlobStore::new(dir.path(), "/uploads/");
        let url = store.save("permit.pdf", b"%PDF-1.7").await.unwrap();

        assert!(url.starts_with("/uploads/"));
        assert!(url.ends_with("-permit.pdf"));

        let stored_name = url.rsplit('/').next().unwrap();
        let on_disk = tokio::fs::read(dir.path().join(stored_name)).await.unwrap();
        assert_eq!(on_disk, b"%PDF-1.7");
    }
}
