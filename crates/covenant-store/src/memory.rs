//! In-memory store implementation for testing.
//!
//! This module provides [`InMemoryContractStore`], a simple in-memory
//! implementation of the [`ContractStore`] trait suitable for testing and
//! development.
//!
//! ## Limitations
//!
//! - **NOT suitable for production**: No durability
//! - **Single-process only**: State is not shared across process boundaries

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use chrono::Utc;

use covenant_core::{
    Change, Contract, ContractId, DEFAULT_CONTRACTOR_NAME, Error, NewContract, ResourceQuota,
    Result,
};

use crate::ContractStore;

#[derive(Debug, Default)]
struct State {
    contracts: HashMap<ContractId, Contract>,
    // Insertion order, mirroring SQLite rowid ordering.
    order: Vec<ContractId>,
}

/// In-memory contract store.
///
/// Enforces the same uniqueness rule on contractor names as the SQLite store.
///
/// ## Example
///
/// ```rust
/// use covenant_store::InMemoryContractStore;
///
/// let store = InMemoryContractStore::new();
/// assert_eq!(store.contract_count().unwrap(), 0);
/// ```
#[derive(Debug, Default)]
pub struct InMemoryContractStore {
    state: RwLock<State>,
}

/// Converts a lock poison error to a storage error.
fn poison_err<T>(_: PoisonError<T>) -> Error {
    Error::storage("lock poisoned")
}

impl InMemoryContractStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of contracts currently stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the lock is poisoned.
    pub fn contract_count(&self) -> Result<usize> {
        let count = self.state.read().map_err(poison_err)?.contracts.len();
        Ok(count)
    }
}

#[async_trait]
impl ContractStore for InMemoryContractStore {
    async fn create(&self, contract: NewContract) -> Result<ContractId> {
        contract.quota.validate()?;
        let mut state = self.state.write().map_err(poison_err)?;

        if state
            .contracts
            .values()
            .any(|c| c.contractor_name == contract.contractor_name)
        {
            return Err(Error::AlreadyExists {
                resource_type: "contract",
                name: contract.contractor_name,
            });
        }

        let id = ContractId::generate();
        let now = Utc::now();
        state.contracts.insert(
            id,
            Contract {
                id,
                contractor_name: contract.contractor_name,
                available_services: contract.available_services,
                quota: contract.quota,
                creator: contract.creator,
                description: contract.description,
                created_at: now,
                updated_at: now,
            },
        );
        state.order.push(id);
        drop(state);
        Ok(id)
    }

    async fn delete(&self, id: &ContractId) -> Result<()> {
        let mut state = self.state.write().map_err(poison_err)?;
        if state.contracts.remove(id).is_none() {
            return Err(Error::resource_not_found("contract", id));
        }
        state.order.retain(|existing| existing != id);
        Ok(())
    }

    async fn get_contract(&self, id: &ContractId) -> Result<Contract> {
        let state = self.state.read().map_err(poison_err)?;
        state
            .contracts
            .get(id)
            .cloned()
            .ok_or_else(|| Error::resource_not_found("contract", id))
    }

    async fn get_default_contract(&self) -> Result<Contract> {
        let state = self.state.read().map_err(poison_err)?;
        state
            .contracts
            .values()
            .find(|c| c.is_default())
            .cloned()
            .ok_or_else(|| Error::resource_not_found("contract", DEFAULT_CONTRACTOR_NAME))
    }

    async fn list(&self, offset: u32, limit: u32) -> Result<Vec<Contract>> {
        let state = self.state.read().map_err(poison_err)?;
        let page = state
            .order
            .iter()
            .skip(offset as usize)
            .take(limit as usize)
            .filter_map(|id| state.contracts.get(id).cloned())
            .collect();
        Ok(page)
    }

    async fn get_resource_quota(&self, id: &ContractId) -> Result<ResourceQuota> {
        let state = self.state.read().map_err(poison_err)?;
        state
            .contracts
            .get(id)
            .map(|c| c.quota)
            .ok_or_else(|| Error::resource_not_found("resource quota", id))
    }

    async fn update_resource_quota(
        &self,
        id: &ContractId,
        patch: ResourceQuota,
    ) -> Result<Change<ResourceQuota>> {
        let mut state = self.state.write().map_err(poison_err)?;
        let contract = state
            .contracts
            .get_mut(id)
            .ok_or_else(|| Error::resource_not_found("resource quota", id))?;

        let previous = contract.quota;
        let current = previous.merge(&patch);
        current.validate()?;
        // The quota carries no timestamp of its own here; like the SQLite
        // store, a quota change leaves the contract's `updated_at` alone.
        contract.quota = current;
        Ok(Change {
            previous,
            current: contract.quota,
        })
    }

    async fn update_available_services(
        &self,
        id: &ContractId,
        services: Vec<String>,
    ) -> Result<Change<Vec<String>>> {
        let mut state = self.state.write().map_err(poison_err)?;
        let contract = state
            .contracts
            .get_mut(id)
            .ok_or_else(|| Error::resource_not_found("contract", id))?;

        let previous = std::mem::replace(&mut contract.available_services, services);
        contract.updated_at = Utc::now();
        Ok(Change {
            previous,
            current: contract.available_services.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn delete_keeps_order_consistent() {
        let store = InMemoryContractStore::new();
        let a = store.create(NewContract::new("a")).await.unwrap();
        let b = store.create(NewContract::new("b")).await.unwrap();
        let c = store.create(NewContract::new("c")).await.unwrap();

        store.delete(&b).await.unwrap();

        let ids: Vec<_> = store
            .list(0, 10)
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(ids, vec![a, c]);
        assert_eq!(store.contract_count().unwrap(), 2);
    }
}
