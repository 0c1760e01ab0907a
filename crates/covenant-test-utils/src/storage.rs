//! Test store with operation tracing.
//!
//! Wraps [`InMemoryContractStore`] and records every call so tests can assert
//! that storage was (or was not) touched.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use covenant_core::{Change, Contract, ContractId, Error, NewContract, ResourceQuota, Result};
use covenant_store::{ContractStore, InMemoryContractStore};

/// Record of a store operation for test assertions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    /// `create`
    Create,
    /// `delete`
    Delete,
    /// `get_contract`
    GetContract,
    /// `get_default_contract`
    GetDefaultContract,
    /// `list`
    List,
    /// `get_resource_quota`
    GetResourceQuota,
    /// `update_resource_quota`
    UpdateResourceQuota,
    /// `update_available_services`
    UpdateAvailableServices,
}

/// In-memory contract store with operation tracing.
#[derive(Debug, Clone, Default)]
pub struct TracingContractStore {
    inner: Arc<InMemoryContractStore>,
    operations: Arc<Mutex<Vec<StoreOp>>>,
    failing: Arc<Mutex<HashSet<StoreOp>>>,
}

impl TracingContractStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all recorded operations.
    #[must_use]
    pub fn operations(&self) -> Vec<StoreOp> {
        self.operations.lock().expect("lock").clone()
    }

    /// Clears recorded operations.
    pub fn clear_operations(&self) {
        self.operations.lock().expect("lock").clear();
    }

    /// Makes every future call of `op` fail with a storage error.
    pub fn inject_failure(&self, op: StoreOp) {
        self.failing.lock().expect("lock").insert(op);
    }

    /// Returns the number of persisted contracts.
    #[must_use]
    pub fn contract_count(&self) -> usize {
        self.inner.contract_count().expect("lock")
    }

    fn record(&self, op: StoreOp) -> Result<()> {
        self.operations.lock().expect("lock").push(op);
        if self.failing.lock().expect("lock").contains(&op) {
            return Err(Error::storage(format!("injected failure: {op:?}")));
        }
        Ok(())
    }
}

#[async_trait]
impl ContractStore for TracingContractStore {
    async fn create(&self, contract: NewContract) -> Result<ContractId> {
        self.record(StoreOp::Create)?;
        self.inner.create(contract).await
    }

    async fn delete(&self, id: &ContractId) -> Result<()> {
        self.record(StoreOp::Delete)?;
        self.inner.delete(id).await
    }

    async fn get_contract(&self, id: &ContractId) -> Result<Contract> {
        self.record(StoreOp::GetContract)?;
        self.inner.get_contract(id).await
    }

    async fn get_default_contract(&self) -> Result<Contract> {
        self.record(StoreOp::GetDefaultContract)?;
        self.inner.get_default_contract().await
    }

    async fn list(&self, offset: u32, limit: u32) -> Result<Vec<Contract>> {
        self.record(StoreOp::List)?;
        self.inner.list(offset, limit).await
    }

    async fn get_resource_quota(&self, id: &ContractId) -> Result<ResourceQuota> {
        self.record(StoreOp::GetResourceQuota)?;
        self.inner.get_resource_quota(id).await
    }

    async fn update_resource_quota(
        &self,
        id: &ContractId,
        patch: ResourceQuota,
    ) -> Result<Change<ResourceQuota>> {
        self.record(StoreOp::UpdateResourceQuota)?;
        self.inner.update_resource_quota(id, patch).await
    }

    async fn update_available_services(
        &self,
        id: &ContractId,
        services: Vec<String>,
    ) -> Result<Change<Vec<String>>> {
        self.record(StoreOp::UpdateAvailableServices)?;
        self.inner.update_available_services(id, services).await
    }
}
