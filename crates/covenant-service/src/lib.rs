//! # covenant-service
//!
//! Contract orchestration for Covenant.
//!
//! This crate sits between the RPC surface and storage:
//!
//! - [`ContractOrchestrator`]: creation saga plus reads and updates
//! - [`Provisioner`] / [`WorkflowSubmitter`]: seams for the two downstream
//!   services, implemented over gRPC and HTTP in `covenant-api`
//! - [`ServiceError`] / [`StatusCode`]: the outcome every operation reports
//!
//! Collaborators are injected at construction; nothing here is global.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rust_2018_idioms)]
#![warn(clippy::pedantic)]

pub mod orchestrator;
pub mod provisioning;
pub mod status;
pub mod workflow;

pub use orchestrator::{
    ContractOrchestrator, CreateContract, CreatedContract, DEFAULT_CALL_TIMEOUT, MAX_PAGE_SIZE,
    Page, ServiceResult,
};
pub use provisioning::{Provisioner, ProvisioningReply, ProvisioningRequest};
pub use status::{ServiceError, StatusCode};
pub use workflow::{WorkflowSettings, WorkflowSubmitter};
