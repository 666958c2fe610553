/*!
 * Tests for artifact persistence
 */

use anyhow::Result;
use std::collections::HashSet;
use std::sync::Arc;

use voicely::artifact_store::{Artifact, ArtifactStore, FsArtifactStore, MemoryArtifactStore};
use voicely::errors::StoreError;
use voicely::formatter::OutputKind;
use crate::common;

#[test]
fn test_artifactNew_shouldFillMetadata() {
    let artifact = Artifact::new(OutputKind::Srt, b"abc".to_vec());

    assert_eq!(artifact.meta.output_kind, OutputKind::Srt);
    assert_eq!(artifact.meta.size_bytes, 3);
    assert_eq!(
        artifact.meta.sha256,
        "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
    );
    assert_eq!(artifact.key(), format!("{}.srt", artifact.meta.id));
}

#[test]
fn test_artifactIds_shouldBeUnique() {
    let ids: HashSet<String> = (0..1000)
        .map(|_| Artifact::new(OutputKind::Txt, Vec::new()).meta.id.to_string())
        .collect();
    assert_eq!(ids.len(), 1000);
}

#[tokio::test]
async fn test_fsStore_putThenGet_shouldReturnBytesAndContentType() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let store = FsArtifactStore::new(temp_dir.path().join("artifacts"));
    let artifact = Artifact::new(OutputKind::Vtt, b"WEBVTT\n\n".to_vec());

    store.put(&artifact).await?;
    let retrieved = store.get(&artifact.meta.id.to_string(), "vtt").await?;

    assert_eq!(retrieved.bytes, b"WEBVTT\n\n");
    assert_eq!(retrieved.content_type, "text/vtt");
    assert!(temp_dir.path().join("artifacts").join(artifact.key()).exists());
    Ok(())
}

#[tokio::test]
async fn test_fsStore_putTwice_shouldRefuseOverwrite() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let store = FsArtifactStore::new(temp_dir.path());
    let artifact = Artifact::new(OutputKind::Txt, b"first".to_vec());

    store.put(&artifact).await?;
    let error = store.put(&artifact).await.unwrap_err();
    assert!(matches!(error, StoreError::AlreadyExists(_)));

    let retrieved = store.get(&artifact.meta.id.to_string(), "txt").await?;
    assert_eq!(retrieved.bytes, b"first");
    Ok(())
}

#[tokio::test]
async fn test_fsStore_getWithWrongExtension_shouldBeNotFound() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let store = FsArtifactStore::new(temp_dir.path());
    let artifact = Artifact::new(OutputKind::Txt, b"x".to_vec());
    store.put(&artifact).await?;

    let error = store.get(&artifact.meta.id.to_string(), "srt").await.unwrap_err();
    assert!(matches!(error, StoreError::NotFound(_)));
    Ok(())
}

#[tokio::test]
async fn test_fsStore_getWithInvalidId_shouldBeNotFound() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let store = FsArtifactStore::new(temp_dir.path());

    for id in ["../etc/passwd", "not-a-uuid", ""] {
        let error = store.get(id, "txt").await.unwrap_err();
        assert!(matches!(error, StoreError::NotFound(_)), "{}", id);
    }

    let artifact = Artifact::new(OutputKind::Txt, b"x".to_vec());
    let error = store.get(&artifact.meta.id.to_string(), "../txt").await.unwrap_err();
    assert!(matches!(error, StoreError::NotFound(_)));
    Ok(())
}

#[tokio::test]
async fn test_memoryStore_shouldBehaveLikeFsStore() -> Result<()> {
    let store = MemoryArtifactStore::new();
    assert!(store.is_empty());

    let artifact = Artifact::new(OutputKind::Pdf, b"report".to_vec());
    store.put(&artifact).await?;
    assert_eq!(store.len(), 1);

    let retrieved = store.get(&artifact.meta.id.to_string(), ".pdf").await?;
    assert_eq!(retrieved.bytes, b"report");
    assert_eq!(retrieved.content_type, "application/pdf");

    assert!(matches!(store.put(&artifact).await, Err(StoreError::AlreadyExists(_))));
    Ok(())
}

#[tokio::test]
async fn test_fsStore_concurrentWrites_shouldNotCollide() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let store: Arc<dyn ArtifactStore> = Arc::new(FsArtifactStore::new(temp_dir.path()));

    let handles: Vec<_> = (0..20)
        .map(|i| {
            let store = Arc::clone(&store);
            tokio::spawn(async move {
                let artifact = Artifact::new(OutputKind::Txt, format!("artifact {}", i).into_bytes());
                store.put(&artifact).await.map(|_| artifact)
            })
        })
        .collect();

    for handle in handles {
        let artifact = handle.await??;
        let retrieved = store.get(&artifact.meta.id.to_string(), "txt").await?;
        assert_eq!(retrieved.bytes, artifact.bytes);
    }
    assert_eq!(common::count_entries(temp_dir.path()), 20);
    Ok(())
}

#[test]
fn test_memoryStore_putTwice_shouldRefuseOverwrite() {
    let store = MemoryArtifactStore::new();
    let artifact = Artifact::new(OutputKind::Txt, b"first".to_vec());

    let second = tokio_test::block_on(async {
        store.put(&artifact).await?;
        store.put(&artifact).await
    });

    assert!(matches!(second, Err(StoreError::AlreadyExists(_))));
    assert_eq!(store.len(), 1);
}

#[test]
fn test_artifactMeta_shouldSerializeIdAsPlainString() -> Result<()> {
    let artifact = Artifact::new(OutputKind::Vtt, b"WEBVTT\n\n".to_vec());
    let json = serde_json::to_value(&artifact.meta)?;

    assert_eq!(json["id"], artifact.meta.id.to_string());
    assert_eq!(json["outputKind"], "vtt");
    assert_eq!(json["sizeBytes"], 8);
    Ok(())
}
