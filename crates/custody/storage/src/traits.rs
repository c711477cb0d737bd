use crate::StorageResult;
use async_trait::async_trait;
use custody_types::{PoolId, PoolSnapshot};

/// Storage interface for pool snapshots.
#[async_trait]
pub trait PoolStore: Send + Sync {
    /// Persist a snapshot. Fails with `Conflict` unless its sequence is
    /// strictly greater than the stored one.
    async fn save(&self, snapshot: &PoolSnapshot) -> StorageResult<()>;

    /// Load the latest snapshot of a pool, if any.
    async fn load(&self, pool_id: &PoolId) -> StorageResult<Option<PoolSnapshot>>;

    /// All pools this store holds, sorted by id.
    async fn list_pools(&self) -> StorageResult<Vec<PoolId>>;
}

pub(crate) fn check_sequence(
    stored: Option<u64>,
    incoming: &PoolSnapshot,
) -> StorageResult<()> {
    match stored {
        Some(current) if incoming.sequence <= current => {
            Err(crate::StorageError::Conflict(format!(
                "pool {} snapshot sequence {} does not advance stored sequence {}",
                incoming.pool_id, incoming.sequence, current
            )))
        }
        _ => Ok(()),
    }
}
