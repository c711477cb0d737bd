//! In-memory reference implementation of [`PoolStore`].
//!
//! Deterministic and test-friendly. State lives only as long as the store.

use crate::traits::{check_sequence, PoolStore};
use crate::{StorageError, StorageResult};
use async_trait::async_trait;
use custody_types::{PoolId, PoolSnapshot};
use std::collections::BTreeMap;
use std::sync::RwLock;

/// In-memory pool snapshot store.
#[derive(Default)]
pub struct InMemoryPoolStore {
    snapshots: RwLock<BTreeMap<PoolId, PoolSnapshot>>,
}

impl InMemoryPoolStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PoolStore for InMemoryPoolStore {
    async fn save(&self, snapshot: &PoolSnapshot) -> StorageResult<()> {
        let mut guard = self
            .snapshots
            .write()
            .map_err(|_| StorageError::Backend("snapshots lock poisoned".to_string()))?;

        check_sequence(guard.get(&snapshot.pool_id).map(|s| s.sequence), snapshot)?;
        guard.insert(snapshot.pool_id.clone(), snapshot.clone());
        Ok(())
    }

    async fn load(&self, pool_id: &PoolId) -> StorageResult<Option<PoolSnapshot>> {
        let guard = self
            .snapshots
            .read()
            .map_err(|_| StorageError::Backend("snapshots lock poisoned".to_string()))?;
        Ok(guard.get(pool_id).cloned())
    }

    async fn list_pools(&self) -> StorageResult<Vec<PoolId>> {
        let guard = self
            .snapshots
            .read()
            .map_err(|_| StorageError::Backend("snapshots lock poisoned".to_string()))?;
        Ok(guard.keys().cloned().collect())
    }
}
