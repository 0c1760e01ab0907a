//! Behavioural suite run against every `ContractStore` implementation.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::sync::Arc;

use covenant_core::{ContractId, CreatorId, Error, MAX_QUOTA_VALUE, NewContract, ResourceQuota};
use covenant_store::{ContractStore, InMemoryContractStore, SqliteContractStore};
use tempfile::TempDir;

struct Harness {
    store: Arc<dyn ContractStore>,
    _dir: Option<TempDir>,
}

fn memory() -> Harness {
    Harness {
        store: Arc::new(InMemoryContractStore::new()),
        _dir: None,
    }
}

fn sqlite() -> Harness {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = SqliteContractStore::open(dir.path().join("covenant.db")).expect("open sqlite");
    Harness {
        store: Arc::new(store),
        _dir: Some(dir),
    }
}

fn quota(cpu: u64, memory: u64) -> ResourceQuota {
    ResourceQuota {
        cpu,
        memory,
        block: 3,
        block_ssd: 4,
        fs: 5,
        fs_ssd: 6,
    }
}

async fn create_then_get_returns_same_fields(store: &dyn ContractStore) {
    let creator = CreatorId::from_uuid(uuid::Uuid::new_v4());
    let id = store
        .create(
            NewContract::new("acme")
                .with_services(["lma"])
                .with_quota(quota(20, 40))
                .with_creator(Some(creator))
                .with_description(Some("first tenant".into())),
        )
        .await
        .unwrap();

    let contract = store.get_contract(&id).await.unwrap();
    assert_eq!(contract.id, id);
    assert_eq!(contract.contractor_name, "acme");
    assert_eq!(contract.available_services, vec!["lma"]);
    assert_eq!(contract.quota, quota(20, 40));
    assert_eq!(contract.creator, Some(creator));
    assert_eq!(contract.description.as_deref(), Some("first tenant"));
    assert_eq!(store.get_resource_quota(&id).await.unwrap(), quota(20, 40));
}

async fn ids_are_distinct(store: &dyn ContractStore) {
    let a = store.create(NewContract::new("a")).await.unwrap();
    let b = store.create(NewContract::new("b")).await.unwrap();
    assert_ne!(a, b);
}

async fn duplicate_name_is_rejected(store: &dyn ContractStore) {
    store.create(NewContract::new("acme")).await.unwrap();
    let err = store.create(NewContract::new("acme")).await.unwrap_err();
    assert!(matches!(err, Error::AlreadyExists { .. }), "got {err:?}");
    assert_eq!(store.list(0, 100).await.unwrap().len(), 1);
}

async fn delete_removes_contract_and_quota(store: &dyn ContractStore) {
    let id = store.create(NewContract::new("acme")).await.unwrap();
    store.delete(&id).await.unwrap();

    assert!(store.get_contract(&id).await.unwrap_err().is_not_found());
    assert!(store.get_resource_quota(&id).await.unwrap_err().is_not_found());
    assert!(store.delete(&id).await.unwrap_err().is_not_found());

    // The name is free again.
    store.create(NewContract::new("acme")).await.unwrap();
}

async fn missing_ids_are_not_found(store: &dyn ContractStore) {
    let id = ContractId::generate();
    assert!(store.get_contract(&id).await.unwrap_err().is_not_found());
    assert!(store.get_resource_quota(&id).await.unwrap_err().is_not_found());
    assert!(
        store
            .update_resource_quota(&id, quota(1, 1))
            .await
            .unwrap_err()
            .is_not_found()
    );
    assert!(
        store
            .update_available_services(&id, vec!["lma".into()])
            .await
            .unwrap_err()
            .is_not_found()
    );
    assert!(store.get_default_contract().await.unwrap_err().is_not_found());
}

async fn quota_update_merges_and_reports_change(store: &dyn ContractStore) {
    let id = store
        .create(NewContract::new("acme").with_quota(quota(20, 40)))
        .await
        .unwrap();

    let patch = ResourceQuota {
        cpu: 40,
        ..ResourceQuota::default()
    };
    let change = store.update_resource_quota(&id, patch).await.unwrap();
    assert_eq!(change.previous, quota(20, 40));
    assert_eq!(change.current, quota(40, 40));
    assert_eq!(store.get_resource_quota(&id).await.unwrap(), quota(40, 40));

    let change = store
        .update_resource_quota(&id, ResourceQuota::default())
        .await
        .unwrap();
    assert_eq!(change.previous, change.current);
}

async fn quota_update_leaves_contract_timestamp(store: &dyn ContractStore) {
    let id = store
        .create(NewContract::new("acme").with_quota(quota(20, 40)))
        .await
        .unwrap();
    let before = store.get_contract(&id).await.unwrap().updated_at;

    store
        .update_resource_quota(&id, quota(80, 0))
        .await
        .unwrap();
    assert_eq!(store.get_contract(&id).await.unwrap().updated_at, before);
}

async fn out_of_range_quota_is_rejected(store: &dyn ContractStore) {
    let huge = ResourceQuota {
        cpu: MAX_QUOTA_VALUE + 1,
        ..ResourceQuota::default()
    };
    let err = store
        .create(NewContract::new("acme").with_quota(huge))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)), "got {err:?}");
    assert!(store.list(0, 100).await.unwrap().is_empty());

    let id = store
        .create(NewContract::new("acme").with_quota(quota(20, 40)))
        .await
        .unwrap();
    let err = store
        .update_resource_quota(
            &id,
            ResourceQuota {
                memory: u64::MAX,
                ..ResourceQuota::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)), "got {err:?}");
    assert_eq!(store.get_resource_quota(&id).await.unwrap(), quota(20, 40));

    let edge = ResourceQuota {
        fs: MAX_QUOTA_VALUE,
        ..ResourceQuota::default()
    };
    let change = store.update_resource_quota(&id, edge).await.unwrap();
    assert_eq!(change.current.fs, MAX_QUOTA_VALUE);
}

async fn services_update_replaces_list(store: &dyn ContractStore) {
    let id = store
        .create(NewContract::new("acme").with_services(["lma"]))
        .await
        .unwrap();

    let change = store
        .update_available_services(&id, vec!["lma".into(), "servicemesh".into()])
        .await
        .unwrap();
    assert_eq!(change.previous, vec!["lma"]);
    assert_eq!(change.current, vec!["lma", "servicemesh"]);

    let change = store
        .update_available_services(&id, vec![String::new()])
        .await
        .unwrap();
    assert_eq!(change.previous, vec!["lma", "servicemesh"]);
    assert_eq!(change.current, vec![""]);

    let contract = store.get_contract(&id).await.unwrap();
    assert_eq!(contract.available_services, vec![""]);
    assert!(contract.updated_at >= contract.created_at);
}

async fn list_pages_in_insertion_order(store: &dyn ContractStore) {
    let mut ids = Vec::new();
    for i in 0..7 {
        let id = store
            .create(NewContract::new(format!("tenant-{i}")).with_quota(quota(i + 1, 1)))
            .await
            .unwrap();
        ids.push(id);
    }

    let all = store.list(0, 100).await.unwrap();
    assert_eq!(all.iter().map(|c| c.id).collect::<Vec<_>>(), ids);
    assert!(all.iter().all(|c| c.quota.cpu > 0));

    let page = store.list(2, 3).await.unwrap();
    assert_eq!(page.iter().map(|c| c.id).collect::<Vec<_>>(), ids[2..5]);

    assert!(store.list(10, 5).await.unwrap().is_empty());
    assert!(store.list(0, 0).await.unwrap().is_empty());
}

async fn default_contract_is_found_by_name(store: &dyn ContractStore) {
    store.create(NewContract::new("acme")).await.unwrap();
    let id = store
        .create(NewContract::new("default").with_services(["lma"]))
        .await
        .unwrap();

    let contract = store.get_default_contract().await.unwrap();
    assert_eq!(contract.id, id);
    assert!(contract.is_default());
}

macro_rules! store_suite {
    ($($check:ident),* $(,)?) => {
        mod in_memory {
            use super::*;
            $(
                #[tokio::test]
                async fn $check() {
                    let harness = memory();
                    super::$check(harness.store.as_ref()).await;
                }
            )*
        }

        mod sqlite_file {
            use super::*;
            $(
                #[tokio::test]
                async fn $check() {
                    let harness = sqlite();
                    super::$check(harness.store.as_ref()).await;
                }
            )*
        }
    };
}

store_suite!(
    create_then_get_returns_same_fields,
    ids_are_distinct,
    duplicate_name_is_rejected,
    delete_removes_contract_and_quota,
    missing_ids_are_not_found,
    quota_update_merges_and_reports_change,
    quota_update_leaves_contract_timestamp,
    out_of_range_quota_is_rejected,
    services_update_replaces_list,
    list_pages_in_insertion_order,
    default_contract_is_found_by_name,
);

#[tokio::test]
async fn sqlite_contracts_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("covenant.db");

    let id = {
        let store = SqliteContractStore::open(&path).unwrap();
        store
            .create(NewContract::new("acme").with_quota(quota(7, 8)))
            .await
            .unwrap()
    };

    let store = SqliteContractStore::open(&path).unwrap();
    let contract = store.get_contract(&id).await.unwrap();
    assert_eq!(contract.quota, quota(7, 8));
}
