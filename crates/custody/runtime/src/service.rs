//! Pool Service: serialized, persisted access to one pool
//!
//! Concurrent callers are serialized behind a single async mutex. Each
//! mutation runs against a working copy of the pool; the copy is saved to
//! the store and only then becomes the live pool. A failed operation or a
//! failed save leaves both the live pool and the store untouched.

use crate::config::{PoolSettings, StorageConfig};
use crate::error::{ServiceError, ServiceResult};
use crate::pool::CustodyPool;
use custody_storage::{FilePoolStore, InMemoryPoolStore, PoolStore};
use custody_types::{
    ActionId, ActionStep, Amount, CustodyResult, MemberId, PoolId, PoolSnapshot,
};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Single-writer front for a persisted pool
pub struct PoolService {
    pool_id: PoolId,
    pool: Mutex<CustodyPool>,
    store: Arc<dyn PoolStore>,
}

impl PoolService {
    /// Build the store described by `config`
    pub async fn open_store(config: &StorageConfig) -> ServiceResult<Arc<dyn PoolStore>> {
        let store: Arc<dyn PoolStore> = match config {
            StorageConfig::Memory => Arc::new(InMemoryPoolStore::new()),
            StorageConfig::File { path } => Arc::new(FilePoolStore::open(path.clone()).await?),
        };
        Ok(store)
    }

    /// Create a pool and persist its genesis snapshot
    pub async fn create(
        store: Arc<dyn PoolStore>,
        creator: MemberId,
        co_members: Vec<MemberId>,
        settings: PoolSettings,
    ) -> ServiceResult<Self> {
        let mut pool = CustodyPool::with_settings(creator, co_members, settings);
        let snapshot = pool.next_snapshot();
        store.save(&snapshot).await?;
        info!(pool = %snapshot.pool_id, "Genesis snapshot persisted");

        Ok(Self {
            pool_id: pool.pool_id().clone(),
            pool: Mutex::new(pool),
            store,
        })
    }

    /// Resume a pool from its latest stored snapshot
    pub async fn open(
        store: Arc<dyn PoolStore>,
        pool_id: &PoolId,
        settings: PoolSettings,
    ) -> ServiceResult<Self> {
        let snapshot = store
            .load(pool_id)
            .await?
            .ok_or_else(|| ServiceError::PoolNotFound(pool_id.clone()))?;
        debug!(summary = %snapshot.summary(), "Snapshot loaded");
        let pool = CustodyPool::restore(snapshot, settings)?;

        Ok(Self {
            pool_id: pool.pool_id().clone(),
            pool: Mutex::new(pool),
            store,
        })
    }

    pub fn pool_id(&self) -> &PoolId {
        &self.pool_id
    }

    pub async fn create_action(
        &self,
        caller: &MemberId,
        steps: Vec<ActionStep>,
    ) -> ServiceResult<ActionId> {
        self.apply(|pool| pool.create_action(caller, steps)).await
    }

    pub async fn create_action_encoded<S, P>(
        &self,
        caller: &MemberId,
        selectors: &[S],
        payloads: &[P],
    ) -> ServiceResult<ActionId>
    where
        S: AsRef<str>,
        P: AsRef<[u8]>,
    {
        self.apply(|pool| pool.create_action_encoded(caller, selectors, payloads))
            .await
    }

    pub async fn approve_action(
        &self,
        caller: &MemberId,
        id: ActionId,
        vote: bool,
    ) -> ServiceResult<()> {
        self.apply(|pool| pool.approve_action(caller, id, vote)).await
    }

    pub async fn execute_action(&self, caller: &MemberId, id: ActionId) -> ServiceResult<()> {
        self.apply(|pool| pool.execute_action(caller, id)).await
    }

    pub async fn deposit(&self, depositor: &MemberId, amount: Amount) -> ServiceResult<Amount> {
        self.apply(|pool| pool.deposit(depositor, amount)).await
    }

    pub async fn receive(&self, from: &MemberId, amount: Amount) -> ServiceResult<Amount> {
        self.apply(|pool| pool.receive(from, amount)).await
    }

    /// Run a query against the live pool
    pub async fn read<T>(&self, query: impl FnOnce(&CustodyPool) -> T) -> T {
        let guard = self.pool.lock().await;
        query(&*guard)
    }

    /// Snapshot of the live pool at its last persisted sequence
    pub async fn snapshot(&self) -> PoolSnapshot {
        self.read(CustodyPool::snapshot).await
    }

    async fn apply<T>(
        &self,
        op: impl FnOnce(&mut CustodyPool) -> CustodyResult<T>,
    ) -> ServiceResult<T> {
        let mut guard = self.pool.lock().await;
        let mut working = (*guard).clone();
        let output = op(&mut working)?;

        let snapshot = working.next_snapshot();
        self.store.save(&snapshot).await?;
        debug!(summary = %snapshot.summary(), "Snapshot persisted");

        *guard = working;
        Ok(output)
    }
}
