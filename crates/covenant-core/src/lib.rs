//! # covenant-core
//!
//! Shared primitives for the Covenant contract-management service.
//!
//! This crate provides the foundational types used across all Covenant components:
//!
//! - **Identifiers**: [`ContractId`] plus the opaque ids handed out by downstream systems
//! - **Contract Model**: [`Contract`], [`ResourceQuota`] and the quota merge rule
//! - **Error Types**: Shared error definitions and result types
//! - **Observability**: Logging initialization and span helpers
//!
//! ## Crate Boundary
//!
//! `covenant-core` has no knowledge of storage engines, RPC transports or the
//! creation saga. Those live in `covenant-store`, `covenant-api` and
//! `covenant-service` respectively.
//!
//! ## Example
//!
//! ```rust
//! use covenant_core::prelude::*;
//!
//! let previous = ResourceQuota { cpu: 20, memory: 40, ..ResourceQuota::default() };
//! let patch = ResourceQuota { cpu: 40, ..ResourceQuota::default() };
//!
//! let merged = previous.merge(&patch);
//! assert_eq!(merged.cpu, 40);
//! assert_eq!(merged.memory, 40);
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rust_2018_idioms)]
#![warn(clippy::pedantic)]

pub mod contract;
pub mod error;
pub mod id;
pub mod observability;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::contract::{Change, Contract, DEFAULT_CONTRACTOR_NAME, NewContract, ResourceQuota};
    pub use crate::error::{Error, Result};
    pub use crate::id::{ContractId, CreatorId, ProvisioningId, WorkflowRunId};
}

pub use contract::{
    Change, Contract, DEFAULT_CONTRACTOR_NAME, MAX_QUOTA_VALUE, NewContract, ResourceQuota,
};
pub use error::{Error, Result};
pub use id::{ContractId, CreatorId, ProvisioningId, WorkflowRunId};
pub use observability::{LogFormat, init_logging};
