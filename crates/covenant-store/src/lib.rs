//! # covenant-store
//!
//! Pluggable persistence for contracts and their resource quotas.
//!
//! The [`ContractStore`] trait is the only way the rest of Covenant touches
//! storage. Every operation is atomic: a contract and its quota are created
//! and deleted together, and updates return the previous and current values
//! read inside the same transaction.
//!
//! ## Implementations
//!
//! - [`SqliteContractStore`]: durable, backed by bundled SQLite
//! - [`InMemoryContractStore`]: process-local, for tests and development

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rust_2018_idioms)]
#![warn(clippy::pedantic)]

pub mod memory;
pub mod sqlite;

use async_trait::async_trait;

use covenant_core::{Change, Contract, ContractId, NewContract, ResourceQuota, Result};

pub use memory::InMemoryContractStore;
pub use sqlite::SqliteContractStore;

/// Storage abstraction for contracts.
///
/// ## Errors
///
/// - `ResourceNotFound` when the addressed contract (or its quota) is absent
/// - `AlreadyExists` when `create` collides on the contractor name
/// - `Integrity` when persisted data breaks the contract/quota pairing
/// - `Storage` for engine failures
///
/// ## Thread Safety
///
/// Implementations are shared across request tasks behind an `Arc`.
#[async_trait]
pub trait ContractStore: Send + Sync {
    /// Inserts a contract and its quota, returning the assigned identifier.
    async fn create(&self, contract: NewContract) -> Result<ContractId>;

    /// Deletes a contract and its quota.
    ///
    /// Fails with `ResourceNotFound` if either row is missing; nothing is
    /// removed in that case.
    async fn delete(&self, id: &ContractId) -> Result<()>;

    /// Gets a contract joined with its quota.
    async fn get_contract(&self, id: &ContractId) -> Result<Contract>;

    /// Gets the contract whose contractor name is `"default"`.
    async fn get_default_contract(&self) -> Result<Contract>;

    /// Lists contracts in insertion order.
    async fn list(&self, offset: u32, limit: u32) -> Result<Vec<Contract>>;

    /// Gets the quota of a contract.
    async fn get_resource_quota(&self, id: &ContractId) -> Result<ResourceQuota>;

    /// Merges `patch` into the stored quota.
    async fn update_resource_quota(
        &self,
        id: &ContractId,
        patch: ResourceQuota,
    ) -> Result<Change<ResourceQuota>>;

    /// Replaces the enabled services of a contract.
    async fn update_available_services(
        &self,
        id: &ContractId,
        services: Vec<String>,
    ) -> Result<Change<Vec<String>>>;
}
