//! File-backed implementation of [`PoolStore`].
//!
//! Each pool is one document `<pool-id>.json` inside the store directory.
//! The first line holds the hex blake3 digest of the JSON body that
//! follows it; a mismatch on load fails with `Integrity`. Writes go to a
//! temporary file that is then renamed over the document.

use crate::traits::{check_sequence, PoolStore};
use crate::{StorageError, StorageResult};
use async_trait::async_trait;
use custody_types::{PoolId, PoolSnapshot};
use std::path::{Path, PathBuf};
use tracing::debug;

const EXTENSION: &str = "json";

/// Directory of digest-checked pool documents.
pub struct FilePoolStore {
    root: PathBuf,
}

impl FilePoolStore {
    /// Open (creating if needed) a store rooted at `root`.
    pub async fn open(root: impl Into<PathBuf>) -> StorageResult<Self> {
        let root = root.into();
        tokio::fs::create_dir_all(&root).await?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn document_path(&self, pool_id: &PoolId) -> StorageResult<PathBuf> {
        let valid = !pool_id.0.is_empty()
            && pool_id
                .0
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(StorageError::InvalidInput(format!(
                "pool id {:?} is not usable as a file name",
                pool_id.0
            )));
        }
        Ok(self.root.join(format!("{}.{}", pool_id.0, EXTENSION)))
    }

    async fn read_document(&self, path: &Path) -> StorageResult<Option<PoolSnapshot>> {
        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        decode_document(&bytes).map(Some)
    }
}

fn encode_document(snapshot: &PoolSnapshot) -> StorageResult<Vec<u8>> {
    let body = serde_json::to_vec_pretty(snapshot)?;
    let digest = blake3::hash(&body).to_hex();
    let mut document = Vec::with_capacity(digest.len() + 1 + body.len());
    document.extend_from_slice(digest.as_bytes());
    document.push(b'\n');
    document.extend_from_slice(&body);
    Ok(document)
}

fn decode_document(bytes: &[u8]) -> StorageResult<PoolSnapshot> {
    let split = bytes
        .iter()
        .position(|b| *b == b'\n')
        .ok_or_else(|| StorageError::Integrity("missing digest header".to_string()))?;
    let (header, body) = (&bytes[..split], &bytes[split + 1..]);

    let expected = std::str::from_utf8(header)
        .map_err(|_| StorageError::Integrity("digest header is not utf-8".to_string()))?;
    let actual = blake3::hash(body).to_hex();
    if actual.as_str() != expected.trim() {
        return Err(StorageError::Integrity(format!(
            "digest mismatch: header {}, body {}",
            expected.trim(),
            actual
        )));
    }
    Ok(serde_json::from_slice(body)?)
}

#[async_trait]
impl PoolStore for FilePoolStore {
    async fn save(&self, snapshot: &PoolSnapshot) -> StorageResult<()> {
        let path = self.document_path(&snapshot.pool_id)?;
        let stored = self.read_document(&path).await?;
        check_sequence(stored.map(|s| s.sequence), snapshot)?;

        let document = encode_document(snapshot)?;
        let tmp = path.with_extension(format!("{EXTENSION}.tmp"));
        tokio::fs::write(&tmp, &document).await?;
        tokio::fs::rename(&tmp, &path).await?;

        debug!(
            pool = %snapshot.pool_id,
            sequence = snapshot.sequence,
            bytes = document.len(),
            "Pool snapshot written"
        );
        Ok(())
    }

    async fn load(&self, pool_id: &PoolId) -> StorageResult<Option<PoolSnapshot>> {
        let path = self.document_path(pool_id)?;
        self.read_document(&path).await
    }

    async fn list_pools(&self) -> StorageResult<Vec<PoolId>> {
        let mut entries = tokio::fs::read_dir(&self.root).await?;
        let mut pools = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                pools.push(PoolId::new(stem));
            }
        }
        pools.sort();
        Ok(pools)
    }
}
