//! Contract orchestration.
//!
//! [`ContractOrchestrator`] owns the creation saga and the pass-through
//! reads and updates. Creation runs these steps in order:
//!
//! 1. validate the request (nothing is persisted on failure)
//! 2. insert the contract and its quota
//! 3. create the provisioning record
//! 4. submit the repository workflow
//!
//! Only step 4 compensates: if the workflow cannot be submitted, or the caller
//! cancels while the submission is in flight, the contract inserted in step 2
//! is deleted again. A provisioning failure leaves the contract in place. Each downstream call is attempted once and bounded by
//! the configured call timeout.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::Instrument;

use covenant_core::observability::{contract_span, saga_span};
use covenant_core::{
    Change, Contract, ContractId, CreatorId, Error, NewContract, ProvisioningId, ResourceQuota,
};
use covenant_store::ContractStore;

use crate::provisioning::{Provisioner, ProvisioningRequest};
use crate::status::{ServiceError, StatusCode};
use crate::workflow::{WorkflowSettings, WorkflowSubmitter};

/// Largest page returned by [`ContractOrchestrator::get_contracts`].
pub const MAX_PAGE_SIZE: u32 = 100;

/// Default bound on each downstream call.
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(30);

/// Result type for orchestrator operations.
pub type ServiceResult<T> = std::result::Result<T, ServiceError>;

/// Input of the creation saga, as received from the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateContract {
    /// Unique contractor name.
    pub contractor_name: String,
    /// Enabled services.
    pub available_services: Vec<String>,
    /// Initial quota.
    pub quota: ResourceQuota,
    /// Cloud service provider name.
    pub csp_name: String,
    /// Opaque provider credentials.
    pub csp_auth: String,
    /// Creator identity; empty means unknown, otherwise must be a UUID.
    pub creator: String,
    /// Free-text description.
    pub description: Option<String>,
}

/// Identifiers produced by a successful creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedContract {
    /// The new contract.
    pub contract_id: ContractId,
    /// The provisioning record created for it.
    pub provisioning_id: ProvisioningId,
}

/// A window over the contract list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    offset: u32,
    limit: u32,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: MAX_PAGE_SIZE,
        }
    }
}

impl Page {
    /// Builds a page from optional caller values.
    ///
    /// A missing or zero limit means [`MAX_PAGE_SIZE`]; larger limits are clamped.
    #[must_use]
    pub fn new(offset: Option<u32>, limit: Option<u32>) -> Self {
        let limit = match limit {
            None | Some(0) => MAX_PAGE_SIZE,
            Some(n) => n.min(MAX_PAGE_SIZE),
        };
        Self {
            offset: offset.unwrap_or(0),
            limit,
        }
    }

    /// Rows to skip.
    #[must_use]
    pub const fn offset(&self) -> u32 {
        self.offset
    }

    /// Rows to return, at most [`MAX_PAGE_SIZE`].
    #[must_use]
    pub const fn limit(&self) -> u32 {
        self.limit
    }
}

/// Coordinates the store and the downstream collaborators.
///
/// ## Example
///
/// ```rust
/// use std::sync::Arc;
/// use covenant_service::ContractOrchestrator;
/// use covenant_store::InMemoryContractStore;
///
/// let orchestrator = ContractOrchestrator::new(Arc::new(InMemoryContractStore::new()));
/// assert!(!orchestrator.can_create());
/// ```
#[derive(Clone)]
pub struct ContractOrchestrator {
    store: Arc<dyn ContractStore>,
    provisioner: Option<Arc<dyn Provisioner>>,
    workflows: Option<Arc<dyn WorkflowSubmitter>>,
    workflow_settings: WorkflowSettings,
    call_timeout: Duration,
}

impl ContractOrchestrator {
    /// Creates an orchestrator over `store` with no downstream collaborators.
    ///
    /// Reads and updates work immediately; creation answers `UNIMPLEMENTED`
    /// until both collaborators are attached.
    #[must_use]
    pub fn new(store: Arc<dyn ContractStore>) -> Self {
        Self {
            store,
            provisioner: None,
            workflows: None,
            workflow_settings: WorkflowSettings::default(),
            call_timeout: DEFAULT_CALL_TIMEOUT,
        }
    }

    /// Attaches the provisioning collaborator.
    #[must_use]
    pub fn with_provisioner(mut self, provisioner: Arc<dyn Provisioner>) -> Self {
        self.provisioner = Some(provisioner);
        self
    }

    /// Attaches the workflow collaborator.
    #[must_use]
    pub fn with_workflow_submitter(mut self, workflows: Arc<dyn WorkflowSubmitter>) -> Self {
        self.workflows = Some(workflows);
        self
    }

    /// Sets the workflow template, namespace and revision.
    #[must_use]
    pub fn with_workflow_settings(mut self, settings: WorkflowSettings) -> Self {
        self.workflow_settings = settings;
        self
    }

    /// Sets the bound on each downstream call.
    #[must_use]
    pub const fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }

    /// Returns true if both downstream collaborators are attached.
    #[must_use]
    pub fn can_create(&self) -> bool {
        self.provisioner.is_some() && self.workflows.is_some()
    }

    /// Returns the underlying store.
    #[must_use]
    pub fn store(&self) -> &Arc<dyn ContractStore> {
        &self.store
    }

    /// Runs the creation saga.
    ///
    /// # Errors
    ///
    /// - `UNIMPLEMENTED` if a collaborator is missing
    /// - `INVALID_ARGUMENT` for an empty contractor name, a malformed creator,
    ///   or a quota value above [`MAX_QUOTA_VALUE`](covenant_core::MAX_QUOTA_VALUE)
    /// - `ALREADY_EXISTS` if the contractor name is taken
    /// - `NOT_FOUND` if the contract could not be created for another reason
    /// - the provisioning service's own status if it rejects the record
    /// - `INTERNAL` for downstream transport failures and workflow failures
    pub async fn create_contract(&self, request: CreateContract) -> ServiceResult<CreatedContract> {
        let span = saga_span(&request.contractor_name);
        self.run_create(request).instrument(span).await
    }

    async fn run_create(&self, request: CreateContract) -> ServiceResult<CreatedContract> {
        let (Some(provisioner), Some(workflows)) = (&self.provisioner, &self.workflows) else {
            return Err(ServiceError::unimplemented(
                "contract creation requires the provisioning and workflow services",
            ));
        };

        if request.contractor_name.trim().is_empty() {
            return Err(ServiceError::invalid_argument("contractor name is required"));
        }
        let creator = CreatorId::parse_optional(&request.creator).map_err(ServiceError::from)?;
        request.quota.validate()?;

        let new_contract = NewContract::new(request.contractor_name)
            .with_services(request.available_services)
            .with_quota(request.quota)
            .with_creator(creator)
            .with_description(request.description);

        let contract_id = self
            .store
            .create(new_contract)
            .await
            .map_err(|e| match e {
                Error::AlreadyExists { .. } => ServiceError::from(e),
                other => ServiceError::not_found(format!("could not create contract: {other}")),
            })?;
        tracing::Span::current().record("contract_id", tracing::field::display(contract_id));
        tracing::info!(%contract_id, "contract persisted");

        let reply = self
            .bounded(
                "provisioning",
                provisioner.create_provisioning_record(ProvisioningRequest {
                    contract_id,
                    csp_name: request.csp_name,
                    auth: request.csp_auth,
                }),
            )
            .await?;
        if !reply.status.is_ok() {
            tracing::warn!(%contract_id, status = %reply.status, message = %reply.message, "provisioning rejected");
            return Err(ServiceError::new(reply.status, reply.message));
        }
        let provisioning_id = reply.record_id;
        tracing::info!(%contract_id, %provisioning_id, "provisioning record created");

        let parameters = self.workflow_settings.parameters(&contract_id);
        let guard = RollbackOnDrop::arm(Arc::clone(&self.store), contract_id);
        let submitted = self
            .bounded(
                "workflow",
                workflows.submit_from_template(
                    &self.workflow_settings.template,
                    &self.workflow_settings.namespace,
                    &parameters,
                ),
            )
            .await;
        guard.disarm();
        match submitted {
            Ok(run) => {
                tracing::info!(%contract_id, workflow_run = %run, "workflow submitted");
                Ok(CreatedContract {
                    contract_id,
                    provisioning_id,
                })
            }
            Err(err) => {
                self.compensate(&contract_id).await;
                Err(ServiceError::internal(format!(
                    "failed to submit workflow: {}",
                    err.message
                )))
            }
        }
    }

    /// Awaits a downstream call under the call timeout.
    ///
    /// Transport errors and timeouts both surface as `INTERNAL`.
    async fn bounded<T, F>(&self, service: &'static str, call: F) -> ServiceResult<T>
    where
        F: Future<Output = covenant_core::Result<T>>,
    {
        match tokio::time::timeout(self.call_timeout, call).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => {
                tracing::error!(service, error = %e, "downstream call failed");
                Err(ServiceError::internal(e.to_string()))
            }
            Err(_) => {
                tracing::error!(service, timeout = ?self.call_timeout, "downstream call timed out");
                Err(ServiceError::internal(format!(
                    "{service} call timed out after {:?}",
                    self.call_timeout
                )))
            }
        }
    }

    /// Deletes a contract whose workflow could not be submitted.
    async fn compensate(&self, contract_id: &ContractId) {
        match self.store.delete(contract_id).await {
            Ok(()) => tracing::warn!(%contract_id, "contract rolled back after workflow failure"),
            Err(e) => tracing::error!(
                %contract_id,
                error = %e,
                "compensating delete failed; contract left without a workflow"
            ),
        }
    }

    /// Merges a quota patch into a contract's quota.
    ///
    /// # Errors
    ///
    /// `INVALID_ARGUMENT` for a malformed id, `NOT_FOUND` for an unknown one.
    pub async fn update_quota(
        &self,
        contract_id: &str,
        patch: ResourceQuota,
    ) -> ServiceResult<Change<ResourceQuota>> {
        let id = parse_id(contract_id)?;
        patch.validate()?;
        let change = self
            .store
            .update_resource_quota(&id, patch)
            .instrument(contract_span("update_quota", contract_id))
            .await?;
        tracing::info!(contract_id = %id, previous = ?change.previous, current = ?change.current, "quota updated");
        Ok(change)
    }

    /// Replaces a contract's enabled services.
    ///
    /// # Errors
    ///
    /// `INVALID_ARGUMENT` for a malformed id, `NOT_FOUND` for an unknown one.
    pub async fn update_services(
        &self,
        contract_id: &str,
        services: Vec<String>,
    ) -> ServiceResult<Change<Vec<String>>> {
        let id = parse_id(contract_id)?;
        let change = self
            .store
            .update_available_services(&id, services)
            .instrument(contract_span("update_services", contract_id))
            .await?;
        tracing::info!(contract_id = %id, current = ?change.current, "services updated");
        Ok(change)
    }

    /// Gets a contract with its quota.
    ///
    /// # Errors
    ///
    /// `INVALID_ARGUMENT` for a malformed id, `NOT_FOUND` for an unknown one.
    pub async fn get_contract(&self, contract_id: &str) -> ServiceResult<Contract> {
        let id = parse_id(contract_id)?;
        Ok(self
            .store
            .get_contract(&id)
            .instrument(contract_span("get_contract", contract_id))
            .await?)
    }

    /// Gets the default contract.
    ///
    /// # Errors
    ///
    /// `NOT_FOUND` if no default contract exists.
    pub async fn get_default_contract(&self) -> ServiceResult<Contract> {
        Ok(self.store.get_default_contract().await?)
    }

    /// Lists contracts in insertion order.
    ///
    /// # Errors
    ///
    /// `INTERNAL` if the store fails or a contract has lost its quota.
    pub async fn get_contracts(&self, page: Page) -> ServiceResult<Vec<Contract>> {
        Ok(self.store.list(page.offset(), page.limit()).await?)
    }

    /// Gets a contract's quota.
    ///
    /// # Errors
    ///
    /// `INVALID_ARGUMENT` for a malformed id, `NOT_FOUND` for an unknown one.
    pub async fn get_quota(&self, contract_id: &str) -> ServiceResult<ResourceQuota> {
        let id = parse_id(contract_id)?;
        Ok(self
            .store
            .get_resource_quota(&id)
            .instrument(contract_span("get_quota", contract_id))
            .await?)
    }

    /// Gets a contract's enabled services.
    ///
    /// # Errors
    ///
    /// `INVALID_ARGUMENT` for a malformed id, `NOT_FOUND` for an unknown one.
    pub async fn get_available_services(&self, contract_id: &str) -> ServiceResult<Vec<String>> {
        Ok(self.get_contract(contract_id).await?.available_services)
    }
}

/// Deletes a freshly created contract if the saga is dropped while its
/// workflow submission is in flight.
///
/// Dropping happens when the caller cancels or its deadline expires. The
/// in-flight submission is abandoned with the future, so the rollback runs as
/// a detached task on the current runtime.
struct RollbackOnDrop {
    store: Arc<dyn ContractStore>,
    contract_id: ContractId,
    armed: bool,
}

impl RollbackOnDrop {
    fn arm(store: Arc<dyn ContractStore>, contract_id: ContractId) -> Self {
        Self {
            store,
            contract_id,
            armed: true,
        }
    }

    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for RollbackOnDrop {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let contract_id = self.contract_id;
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::error!(%contract_id, "saga cancelled outside a runtime; contract left without a workflow");
            return;
        };
        let store = Arc::clone(&self.store);
        tracing::warn!(%contract_id, "saga cancelled during workflow submission; rolling back");
        runtime.spawn(async move {
            match store.delete(&contract_id).await {
                Ok(()) => tracing::warn!(%contract_id, "contract rolled back after cancellation"),
                Err(e) => tracing::error!(
                    %contract_id,
                    error = %e,
                    "compensating delete failed; contract left without a workflow"
                ),
            }
        });
    }
}

fn parse_id(raw: &str) -> ServiceResult<ContractId> {
    raw.parse::<ContractId>()
        .map_err(|e| ServiceError::new(StatusCode::InvalidArgument, e.to_string()))
}

impl std::fmt::Debug for ContractOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContractOrchestrator")
            .field("provisioner", &self.provisioner.is_some())
            .field("workflows", &self.workflows.is_some())
            .field("workflow_settings", &self.workflow_settings)
            .field("call_timeout", &self.call_timeout)
            .finish_non_exhaustive()
    }
}
