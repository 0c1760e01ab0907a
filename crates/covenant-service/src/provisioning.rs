//! Provisioning collaborator seam.
//!
//! The CSP-info service records provider details for a new contract. A
//! transport failure is an `Err`; a reply the service chose to reject is an
//! `Ok` carrying a non-OK [`StatusCode`], forwarded to the caller verbatim.

use async_trait::async_trait;

use covenant_core::{ContractId, ProvisioningId, Result};

use crate::status::StatusCode;

/// Input for a provisioning call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisioningRequest {
    /// Newly created contract.
    pub contract_id: ContractId,
    /// Cloud service provider name.
    pub csp_name: String,
    /// Opaque provider credentials.
    pub auth: String,
}

/// Reply from the provisioning service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisioningReply {
    /// Downstream outcome.
    pub status: StatusCode,
    /// Downstream message, empty on success.
    pub message: String,
    /// Record identifier; meaningful only when `status` is OK.
    pub record_id: ProvisioningId,
}

impl ProvisioningReply {
    /// Creates a successful reply.
    #[must_use]
    pub fn ok(record_id: impl Into<String>) -> Self {
        Self {
            status: StatusCode::Ok,
            message: String::new(),
            record_id: ProvisioningId::new(record_id),
        }
    }

    /// Creates a rejected reply.
    #[must_use]
    pub fn rejected(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            record_id: ProvisioningId::new(""),
        }
    }
}

/// Creates provisioning records for new contracts.
#[async_trait]
pub trait Provisioner: Send + Sync {
    /// Registers provider information for a contract.
    ///
    /// # Errors
    ///
    /// Returns `Downstream` if the service could not be reached.
    async fn create_provisioning_record(
        &self,
        request: ProvisioningRequest,
    ) -> Result<ProvisioningReply>;
}
