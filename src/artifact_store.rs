/*!
 * Artifact storage.
 *
 * Artifacts are written once under a fresh UUID and read back by id plus
 * extension. Ids are collision-free by construction, so concurrent runs never
 * contend on the same key.
 */

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{debug, warn};
use parking_lot::RwLock;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use uuid::Uuid;

use crate::errors::StoreError;
use crate::file_utils::FileManager;
use crate::formatter::OutputKind;

/// Unique artifact identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ArtifactId(Uuid);

impl ArtifactId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ArtifactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ArtifactId {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim())
            .map(Self)
            .map_err(|_| StoreError::NotFound(s.to_string()))
    }
}

/// Metadata describing a persisted artifact
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactMeta {
    pub id: ArtifactId,
    pub output_kind: OutputKind,
    pub created_at: DateTime<Utc>,
    pub size_bytes: u64,
    /// SHA-256 of the content, lowercase hex
    pub sha256: String,
}

/// An immutable artifact ready to be written
#[derive(Debug, Clone)]
pub struct Artifact {
    pub meta: ArtifactMeta,
    pub bytes: Vec<u8>,
}

impl Artifact {
    /// Wrap freshly formatted bytes under a new id
    pub fn new(output_kind: OutputKind, bytes: Vec<u8>) -> Self {
        let sha256 = Sha256::digest(&bytes)
            .iter()
            .map(|b| format!("{:02x}", b))
            .collect();

        Self {
            meta: ArtifactMeta {
                id: ArtifactId::generate(),
                output_kind,
                created_at: Utc::now(),
                size_bytes: bytes.len() as u64,
                sha256,
            },
            bytes,
        }
    }

    /// Storage key: `<id>.<ext>`
    pub fn key(&self) -> String {
        storage_key(&self.meta.id, self.meta.output_kind.extension())
    }
}

/// Bytes read back from the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetrievedArtifact {
    pub bytes: Vec<u8>,
    pub content_type: &'static str,
}

/// Write-once-by-id, read-by-id byte store
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Persist `artifact`; fails if the key already exists
    async fn put(&self, artifact: &Artifact) -> Result<(), StoreError>;

    /// Read an artifact back by id and declared extension
    async fn get(&self, id: &str, extension: &str) -> Result<RetrievedArtifact, StoreError>;
}

fn storage_key(id: &ArtifactId, extension: &str) -> String {
    format!("{}.{}", id, extension.to_lowercase())
}

/// Parse the id and vet the extension before touching storage
fn resolve_key(id: &str, extension: &str) -> Result<String, StoreError> {
    let id = ArtifactId::from_str(id)?;
    let ext = extension.trim().trim_start_matches('.');
    if ext.is_empty() || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(StoreError::NotFound(format!("{}.{}", id, extension)));
    }
    Ok(storage_key(&id, ext))
}

/// Write `bytes` to a freshly created file, removing it again if the write
/// fails so a partial artifact is never readable under its id
async fn write_or_discard<W>(writer: &mut W, path: &Path, bytes: &[u8]) -> Result<(), StoreError>
where
    W: AsyncWrite + Unpin,
{
    let written = async {
        writer.write_all(bytes).await?;
        writer.flush().await
    }
    .await;

    if let Err(e) = written {
        discard(path).await;
        return Err(StoreError::Io(format!("Failed to write {}: {}", path.display(), e)));
    }
    Ok(())
}

async fn discard(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        warn!("Failed to remove partial artifact {}: {}", path.display(), e);
    }
}

/// Artifacts as files in one directory
#[derive(Debug, Clone)]
pub struct FsArtifactStore {
    root: PathBuf,
}

impl FsArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &PathBuf {
        &self.root
    }
}

#[async_trait]
impl ArtifactStore for FsArtifactStore {
    async fn put(&self, artifact: &Artifact) -> Result<(), StoreError> {
        tokio::fs::create_dir_all(&self.root).await?;
        let path = self.root.join(artifact.key());

        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
            .map_err(|e| match e.kind() {
                ErrorKind::AlreadyExists => StoreError::AlreadyExists(artifact.key()),
                _ => StoreError::Io(format!("Failed to create {}: {}", path.display(), e)),
            })?;

        write_or_discard(&mut file, &path, &artifact.bytes).await?;
        if let Err(e) = file.sync_all().await {
            drop(file);
            discard(&path).await;
            return Err(StoreError::Io(format!("Failed to sync {}: {}", path.display(), e)));
        }

        debug!("Stored artifact {} ({} bytes)", artifact.key(), artifact.meta.size_bytes);
        Ok(())
    }

    async fn get(&self, id: &str, extension: &str) -> Result<RetrievedArtifact, StoreError> {
        let key = resolve_key(id, extension)?;
        let path = self.root.join(&key);

        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(RetrievedArtifact {
                bytes,
                content_type: FileManager::content_type_for(extension.trim_start_matches('.')),
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(StoreError::NotFound(key)),
            Err(e) => Err(StoreError::Io(format!("Failed to read {}: {}", path.display(), e))),
        }
    }
}

/// In-process store for tests and ephemeral use
#[derive(Debug, Default)]
pub struct MemoryArtifactStore {
    blobs: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryArtifactStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.blobs.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.blobs.read().is_empty()
    }
}

#[async_trait]
impl ArtifactStore for MemoryArtifactStore {
    async fn put(&self, artifact: &Artifact) -> Result<(), StoreError> {
        let key = artifact.key();
        let mut blobs = self.blobs.write();
        if blobs.contains_key(&key) {
            return Err(StoreError::AlreadyExists(key));
        }
        blobs.insert(key, artifact.bytes.clone());
        Ok(())
    }

    async fn get(&self, id: &str, extension: &str) -> Result<RetrievedArtifact, StoreError> {
        let key = resolve_key(id, extension)?;
        let bytes = self
            .blobs
            .read()
            .get(&key)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(key.clone()))?;

        Ok(RetrievedArtifact {
            bytes,
            content_type: FileManager::content_type_for(extension.trim_start_matches('.')),
        })
    }
}
