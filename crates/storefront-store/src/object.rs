//! Object storage for product photos.
//!
//! Objects are opaque blobs addressed by a generated id. Uploading returns the
//! id together with the public URL clients use to fetch the blob.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use storefront_core::new_id;
use tracing::{debug, instrument, warn};

use crate::error::StoreError;

/// A stored object reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredObject {
    pub id: String,
    pub url: String,
}

/// A blob waiting to be stored.
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: None,
            bytes: bytes.into(),
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// File extension taken from the file name, falling back to the content type.
    pub fn extension(&self) -> Option<String> {
        Path::new(&self.file_name)
            .extension()
            .and_then(|e| e.to_str())
            .filter(|e| !e.is_empty() && e.chars().all(|c| c.is_ascii_alphanumeric()))
            .map(str::to_ascii_lowercase)
            .or_else(|| {
                self.content_type
                    .as_deref()
                    .and_then(|ct| ct.strip_prefix("image/"))
                    .filter(|e| e.chars().all(|c| c.is_ascii_alphanumeric()))
                    .map(|e| if e == "jpeg" { "jpg".to_string() } else { e.to_string() })
            })
    }
}

/// Blob storage consumed by the product handlers.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn upload(&self, upload: Upload) -> Result<StoredObject, StoreError>;

    /// Deletes an object. Deleting an unknown id succeeds.
    async fn delete(&self, id: &str) -> Result<(), StoreError>;

    /// Uploads every blob, stopping at the first failure.
    async fn upload_many(&self, uploads: Vec<Upload>) -> Result<Vec<StoredObject>, StoreError> {
        let mut stored = Vec::with_capacity(uploads.len());
        for upload in uploads {
            stored.push(self.upload(upload).await?);
        }
        Ok(stored)
    }

    /// Deletes every id, attempting all of them and returning the first error.
    async fn delete_many(&self, ids: &[String]) -> Result<(), StoreError> {
        let mut first_error = None;
        for id in ids {
            if let Err(e) = self.delete(id).await {
                warn!(id = %id, error = %e, "Failed to delete object");
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    fn name(&self) -> &str;
}

/// Stores objects as files in a local directory.
#[derive(Debug, Clone)]
pub struct LocalObjectStore {
    dir: PathBuf,
    public_prefix: String,
}

impl LocalObjectStore {
    /// Creates the store. `public_prefix` is prepended to file names to build URLs.
    pub fn new(dir: impl Into<PathBuf>, public_prefix: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            public_prefix: public_prefix.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, id: &str) -> Result<PathBuf, StoreError> {
        if id.is_empty() || id.contains('/') || id.contains('\\') || id.contains("..") {
            return Err(StoreError::invalid_object(id, "invalid object id"));
        }
        Ok(self.dir.join(id))
    }
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    #[instrument(skip(self, upload), fields(file = %upload.file_name, size = upload.bytes.len()))]
    async fn upload(&self, upload: Upload) -> Result<StoredObject, StoreError> {
        let id = match upload.extension() {
            Some(ext) => format!("{}.{}", new_id(), ext),
            None => new_id(),
        };
        let path = self.path_for(&id)?;

        tokio::fs::create_dir_all(&self.dir).await?;
        tokio::fs::write(&path, &upload.bytes).await?;
        debug!(path = %path.display(), "Stored object");

        Ok(StoredObject {
            url: format!("{}/{}", self.public_prefix, id),
            id,
        })
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        let path = self.path_for(id)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn name(&self) -> &str {
        "local"
    }
}

/// Keeps objects in memory. Useful for tests.
#[derive(Debug, Default)]
pub struct MemoryObjectStore {
    objects: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.objects.read().contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.objects.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn upload(&self, upload: Upload) -> Result<StoredObject, StoreError> {
        let id = new_id();
        self.objects.write().insert(id.clone(), upload.bytes);
        Ok(StoredObject {
            url: format!("memory://{id}"),
            id,
        })
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        self.objects.write().remove(id);
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}
