//! Persisted pools: every committed call survives a restart.

use custody_runtime::{PoolService, PoolSettings, StorageConfig};
use custody_storage::{FilePoolStore, PoolStore};
use custody_types::{ActionStep, Amount, CustodyError, MemberId};
use std::sync::Arc;

fn m(s: &str) -> MemberId {
    MemberId::new(s)
}

#[tokio::test]
async fn file_backed_pool_resumes_after_restart() {
    let dir = tempfile::tempdir().unwrap();
    let config = StorageConfig::File {
        path: dir.path().to_path_buf(),
    };

    let pool_id = {
        let store = PoolService::open_store(&config).await.unwrap();
        let service = PoolService::create(
            store,
            m("founder"),
            vec![m("partner")],
            PoolSettings::default(),
        )
        .await
        .unwrap();

        service.receive(&m("donor"), Amount::new(50)).await.unwrap();
        let id = service
            .create_action(&m("founder"), vec![ActionStep::transfer(m("vendor"), Amount::new(20))])
            .await
            .unwrap();
        service.approve_action(&m("partner"), id, true).await.unwrap();
        service.pool_id().clone()
    };

    let store = PoolService::open_store(&config).await.unwrap();
    let service = PoolService::open(store, &pool_id, PoolSettings::default())
        .await
        .unwrap();

    let pending = service.read(|p| p.pending_actions()).await;
    assert_eq!(pending.len(), 1);
    service.execute_action(&m("partner"), pending[0]).await.unwrap();

    let (balance, paid) = service
        .read(|p| (p.pool_balance(), p.paid_to(&m("vendor"))))
        .await;
    assert_eq!(balance, Amount::new(30));
    assert_eq!(paid, Amount::new(20));

    let err = service
        .execute_action(&m("partner"), pending[0])
        .await
        .unwrap_err();
    assert_eq!(
        err.as_custody(),
        Some(&CustodyError::AlreadyExecuted(pending[0]))
    );
}

#[tokio::test]
async fn concurrent_callers_are_serialized() {
    let store = PoolService::open_store(&StorageConfig::Memory).await.unwrap();
    let service = Arc::new(
        PoolService::create(store.clone(), m("founder"), vec![], PoolSettings::default())
            .await
            .unwrap(),
    );

    let mut handles = Vec::new();
    for i in 0..16u64 {
        let service = Arc::clone(&service);
        handles.push(tokio::spawn(async move {
            service
                .deposit(&MemberId::new(format!("depositor-{i}")), Amount::new(i + 1))
                .await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let snapshot = store.load(service.pool_id()).await.unwrap().unwrap();
    assert_eq!(snapshot.sequence, 17);
    assert_eq!(snapshot.escrow.total(), Ok(Amount::new((1..=16).sum())));
    assert_eq!(service.read(|p| p.escrow_total()).await, snapshot.escrow.total());
}

#[tokio::test]
async fn stores_list_their_pools() {
    let dir = tempfile::tempdir().unwrap();
    let store: Arc<dyn PoolStore> = Arc::new(FilePoolStore::open(dir.path()).await.unwrap());

    let first = PoolService::create(store.clone(), m("a"), vec![], PoolSettings::default())
        .await
        .unwrap();
    let second = PoolService::create(store.clone(), m("b"), vec![], PoolSettings::default())
        .await
        .unwrap();

    let listed = store.list_pools().await.unwrap();
    assert_eq!(listed.len(), 2);
    assert!(listed.contains(first.pool_id()));
    assert!(listed.contains(second.pool_id()));
}
