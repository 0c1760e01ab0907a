//! Scripted downstream collaborators.
//!
//! Each fake answers every call with the behaviour it was built with and
//! records the arguments it received.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use covenant_core::{Error, Result, WorkflowRunId};
use covenant_service::{
    Provisioner, ProvisioningReply, ProvisioningRequest, StatusCode, WorkflowSubmitter,
};

/// How a fake responds.
#[derive(Debug, Clone)]
enum Behaviour<T> {
    Reply(T),
    TransportError(String),
    Hang,
}

async fn respond<T: Clone>(behaviour: &Behaviour<T>, service: &'static str) -> Result<T> {
    match behaviour {
        Behaviour::Reply(value) => Ok(value.clone()),
        Behaviour::TransportError(message) => Err(Error::downstream(service, message.clone())),
        Behaviour::Hang => {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Err(Error::downstream(service, "fake hung past its sleep"))
        }
    }
}

/// Fake CSP-info service.
#[derive(Debug, Clone)]
pub struct FakeProvisioner {
    behaviour: Behaviour<ProvisioningReply>,
    calls: Arc<Mutex<Vec<ProvisioningRequest>>>,
}

impl FakeProvisioner {
    fn with(behaviour: Behaviour<ProvisioningReply>) -> Self {
        Self {
            behaviour,
            calls: Arc::default(),
        }
    }

    /// Accepts every request, returning `record_id`.
    pub fn succeeding(record_id: impl Into<String>) -> Self {
        Self::with(Behaviour::Reply(ProvisioningReply::ok(record_id)))
    }

    /// Rejects every request with `status`.
    pub fn rejecting(status: StatusCode, message: impl Into<String>) -> Self {
        Self::with(Behaviour::Reply(ProvisioningReply::rejected(status, message)))
    }

    /// Fails every request at the transport level.
    pub fn unreachable(message: impl Into<String>) -> Self {
        Self::with(Behaviour::TransportError(message.into()))
    }

    /// Never answers.
    pub fn hanging() -> Self {
        Self::with(Behaviour::Hang)
    }

    /// Returns every request received so far.
    pub fn calls(&self) -> Vec<ProvisioningRequest> {
        self.calls.lock().expect("lock").clone()
    }
}

#[async_trait]
impl Provisioner for FakeProvisioner {
    async fn create_provisioning_record(
        &self,
        request: ProvisioningRequest,
    ) -> Result<ProvisioningReply> {
        self.calls.lock().expect("lock").push(request);
        respond(&self.behaviour, "provisioning").await
    }
}

/// A workflow submission seen by [`FakeWorkflowSubmitter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmittedWorkflow {
    /// Template name.
    pub template: String,
    /// Namespace.
    pub namespace: String,
    /// `key=value` parameters.
    pub parameters: Vec<String>,
}

/// Fake workflow-orchestration service.
#[derive(Debug, Clone)]
pub struct FakeWorkflowSubmitter {
    behaviour: Behaviour<WorkflowRunId>,
    calls: Arc<Mutex<Vec<SubmittedWorkflow>>>,
}

impl FakeWorkflowSubmitter {
    fn with(behaviour: Behaviour<WorkflowRunId>) -> Self {
        Self {
            behaviour,
            calls: Arc::default(),
        }
    }

    /// Accepts every submission, returning run `run`.
    pub fn succeeding(run: impl Into<String>) -> Self {
        Self::with(Behaviour::Reply(WorkflowRunId::new(run)))
    }

    /// Rejects every submission.
    pub fn failing(message: impl Into<String>) -> Self {
        Self::with(Behaviour::TransportError(message.into()))
    }

    /// Never answers.
    pub fn hanging() -> Self {
        Self::with(Behaviour::Hang)
    }

    /// Returns every submission received so far.
    pub fn calls(&self) -> Vec<SubmittedWorkflow> {
        self.calls.lock().expect("lock").clone()
    }
}

#[async_trait]
impl WorkflowSubmitter for FakeWorkflowSubmitter {
    async fn submit_from_template(
        &self,
        template: &str,
        namespace: &str,
        parameters: &[String],
    ) -> Result<WorkflowRunId> {
        self.calls.lock().expect("lock").push(SubmittedWorkflow {
            template: template.to_string(),
            namespace: namespace.to_string(),
            parameters: parameters.to_vec(),
        });
        respond(&self.behaviour, "workflow").await
    }
}
