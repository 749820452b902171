//! Filesystem-backed artifact store for local development.
//!
//! Objects are written into a single directory and served statically by the
//! HTTP layer under `url_prefix`. The listing is an in-process ordered list
//! appended to on every save; the directory is never scanned, so objects
//! from a previous process are not listed.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use sketchy_core::generation::ArtifactDescriptor;
use sketchy_core::naming;
use tokio::sync::RwLock;

use crate::artifact::ArtifactStore;
use crate::error::{StorageError, StorageResult};

pub struct LocalArtifactStore {
    root: PathBuf,
    url_prefix: String,
    /// Insertion-ordered mirror of what has been saved by this process.
    entries: RwLock<Vec<ArtifactDescriptor>>,
}

impl LocalArtifactStore {
    /// Create the store, creating `root` if it does not exist.
    pub async fn open(root: impl Into<PathBuf>, url_prefix: &str) -> StorageResult<Self> {
        let root = root.into();
        tokio::fs::create_dir_all(&root).await?;
        tracing::info!(root = %root.display(), url_prefix, "Local artifact store ready");
        Ok(Self {
            root,
            url_prefix: url_prefix.trim_end_matches('/').to_string(),
            entries: RwLock::new(Vec::new()),
        })
    }

    /// Directory the objects are written into.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn url_for(&self, name: &str) -> String {
        format!("{}/{}", self.url_prefix, name)
    }
}

/// Reject names that are empty, hidden, or contain path separators.
fn checked_name(name: &str) -> StorageResult<&str> {
    let bad = name.is_empty()
        || name.starts_with('.')
        || name.contains('/')
        || name.contains('\\');
    if bad {
        return Err(StorageError::InvalidName(name.to_string()));
    }
    Ok(name)
}

/// Remove a file, treating "already gone" as success.
async fn remove_file_if_present(path: &Path) -> StorageResult<()> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::warn!(path = %path.display(), "Artifact file already missing on disk");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

#[async_trait]
impl ArtifactStore for LocalArtifactStore {
    fn backend_name(&self) -> &'static str {
        "local"
    }

    async fn save(&self, name: &str, bytes: Vec<u8>) -> StorageResult<ArtifactDescriptor> {
        let name = checked_name(name)?;
        let path = self.root.join(name);
        let size = bytes.len();
        tokio::fs::write(&path, bytes).await?;

        let descriptor = ArtifactDescriptor {
            name: name.to_string(),
            url: self.url_for(name),
            uploaded_at: chrono::Utc::now(),
        };
        self.entries.write().await.push(descriptor.clone());

        tracing::debug!(name, size, "Artifact written to disk");
        Ok(descriptor)
    }

    async fn list(&self) -> StorageResult<Vec<ArtifactDescriptor>> {
        Ok(self.entries.read().await.clone())
    }

    async fn delete(&self, identifier: &str) -> StorageResult<()> {
        let name = naming::name_from_url(identifier)
            .ok_or_else(|| StorageError::NotFound(identifier.to_string()))?;

        let removed = {
            let mut entries = self.entries.write().await;
            let position = entries
                .iter()
                .position(|e| e.name == name)
                .ok_or_else(|| StorageError::NotFound(identifier.to_string()))?;
            entries.remove(position)
        };

        remove_file_if_present(&self.root.join(&removed.name)).await?;
        tracing::debug!(name = %removed.name, "Artifact deleted");
        Ok(())
    }

    async fn clear(&self) -> StorageResult<usize> {
        let drained = std::mem::take(&mut *self.entries.write().await);
        for entry in &drained {
            remove_file_if_present(&self.root.join(&entry.name)).await?;
        }
        Ok(drained.len())
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    async fn store() -> (tempfile::TempDir, LocalArtifactStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalArtifactStore::open(dir.path().join("images"), "/api/images/")
            .await
            .unwrap();
        (dir, store)
    }

    #[tokio::test]
    async fn save_writes_file_and_returns_prefixed_url() {
        let (_dir, store) = store().await;
        let saved = store.save("abc.png", vec![1, 2, 3]).await.unwrap();
        assert_eq!(saved.url, "/api/images/abc.png");
        assert_eq!(saved.name, "abc.png");
        let on_disk = tokio::fs::read(store.root().join("abc.png")).await.unwrap();
        assert_eq!(on_disk, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn list_reflects_insertion_order() {
        let (_dir, store) = store().await;
        store.save("a.png", vec![0]).await.unwrap();
        store.save("a_thumb.jpg", vec![0]).await.unwrap();
        store.save("b.png", vec![0]).await.unwrap();
        let names: Vec<_> = store.list().await.unwrap().into_iter().map(|a| a.name).collect();
        assert_eq!(names, ["a.png", "a_thumb.jpg", "b.png"]);
    }

    #[tokio::test]
    async fn delete_by_url_removes_entry_and_file() {
        let (_dir, store) = store().await;
        let saved = store.save("a.png", vec![0]).await.unwrap();
        store.delete(&saved.url).await.unwrap();
        assert!(store.list().await.unwrap().is_empty());
        assert!(!store.root().join("a.png").exists());
    }

    #[tokio::test]
    async fn delete_unknown_is_not_found() {
        let (_dir, store) = store().await;
        assert_matches!(
            store.delete("/api/images/missing.png").await,
            Err(StorageError::NotFound(_))
        );
    }

    #[tokio::test]
    async fn delete_tolerates_file_removed_out_of_band() {
        let (_dir, store) = store().await;
        store.save("a.png", vec![0]).await.unwrap();
        std::fs::remove_file(store.root().join("a.png")).unwrap();
        store.delete("a.png").await.unwrap();
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn clear_empties_list_and_directory() {
        let (_dir, store) = store().await;
        store.save("a.png", vec![0]).await.unwrap();
        store.save("b.png", vec![0]).await.unwrap();
        assert_eq!(store.clear().await.unwrap(), 2);
        assert!(store.list().await.unwrap().is_empty());
        assert!(!store.root().join("a.png").exists());
        assert_eq!(store.clear().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn rejects_path_traversal_names() {
        let (_dir, store) = store().await;
        for bad in ["../evil.png", "a/b.png", ".hidden", ""] {
            assert_matches!(
                store.save(bad, vec![0]).await,
                Err(StorageError::InvalidName(_))
            );
        }
    }
}
