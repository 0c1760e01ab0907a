//! Pre-built test fixtures for common test scenarios.

use std::sync::Arc;
use std::time::Duration;

use covenant_core::ResourceQuota;
use covenant_service::{ContractOrchestrator, CreateContract};

use crate::fakes::{FakeProvisioner, FakeWorkflowSubmitter};
use crate::storage::TracingContractStore;

/// Orchestrator wired to a tracing store and scripted collaborators.
pub struct TestContext {
    /// Shared store.
    pub store: TracingContractStore,
    /// Provisioning fake.
    pub provisioner: FakeProvisioner,
    /// Workflow fake.
    pub workflows: FakeWorkflowSubmitter,
    /// Orchestrator under test.
    pub orchestrator: ContractOrchestrator,
}

impl TestContext {
    /// Creates a context where both collaborators succeed.
    #[must_use]
    pub fn new() -> Self {
        Self::with_fakes(
            FakeProvisioner::succeeding("csp-record-1"),
            FakeWorkflowSubmitter::succeeding("tks-create-contract-repo-abcde"),
        )
    }

    /// Creates a context with the given collaborators.
    #[must_use]
    pub fn with_fakes(provisioner: FakeProvisioner, workflows: FakeWorkflowSubmitter) -> Self {
        let store = TracingContractStore::new();
        let orchestrator = ContractOrchestrator::new(Arc::new(store.clone()))
            .with_provisioner(Arc::new(provisioner.clone()))
            .with_workflow_submitter(Arc::new(workflows.clone()))
            .with_call_timeout(Duration::from_millis(200));
        Self {
            store,
            provisioner,
            workflows,
            orchestrator,
        }
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Factory for creation requests.
pub struct ContractFixtures;

impl ContractFixtures {
    /// Quota used by [`Self::request`].
    #[must_use]
    pub const fn quota() -> ResourceQuota {
        ResourceQuota {
            cpu: 20,
            memory: 40,
            block: 100,
            block_ssd: 50,
            fs: 100,
            fs_ssd: 50,
        }
    }

    /// A valid request for `contractor_name`.
    #[must_use]
    pub fn request(contractor_name: &str) -> CreateContract {
        CreateContract {
            contractor_name: contractor_name.to_string(),
            available_services: vec!["lma".to_string()],
            quota: Self::quota(),
            csp_name: "aws".to_string(),
            csp_auth: "{\"access_key\":\"test\"}".to_string(),
            creator: uuid::Uuid::new_v4().to_string(),
            description: Some(format!("{contractor_name} tenant")),
        }
    }

    /// A valid request with a random contractor name.
    #[must_use]
    pub fn random_request() -> CreateContract {
        Self::request(&format!("contractor-{}", uuid::Uuid::new_v4().as_simple()))
    }
}
