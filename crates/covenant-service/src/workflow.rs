//! Workflow collaborator seam.

use async_trait::async_trait;

use covenant_core::{ContractId, Result, WorkflowRunId};

/// Template submitted for every new contract unless configured otherwise.
pub const DEFAULT_WORKFLOW_TEMPLATE: &str = "tks-create-contract-repo";
/// Namespace the template lives in.
pub const DEFAULT_WORKFLOW_NAMESPACE: &str = "argo";
/// Revision passed to the template.
pub const DEFAULT_REVISION: &str = "main";

/// Which workflow to start for a new contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowSettings {
    /// Workflow template name.
    pub template: String,
    /// Namespace of the template.
    pub namespace: String,
    /// Value of the `revision` parameter.
    pub revision: String,
}

impl Default for WorkflowSettings {
    fn default() -> Self {
        Self {
            template: DEFAULT_WORKFLOW_TEMPLATE.to_string(),
            namespace: DEFAULT_WORKFLOW_NAMESPACE.to_string(),
            revision: DEFAULT_REVISION.to_string(),
        }
    }
}

impl WorkflowSettings {
    /// Returns the `key=value` parameters for a contract's workflow.
    #[must_use]
    pub fn parameters(&self, contract_id: &ContractId) -> Vec<String> {
        vec![
            format!("contract_id={contract_id}"),
            format!("revision={}", self.revision),
        ]
    }
}

/// Submits workflows from templates.
#[async_trait]
pub trait WorkflowSubmitter: Send + Sync {
    /// Starts a run of `template` in `namespace` with `key=value` parameters.
    ///
    /// # Errors
    ///
    /// Returns `Downstream` if the submission was not accepted.
    async fn submit_from_template(
        &self,
        template: &str,
        namespace: &str,
        parameters: &[String],
    ) -> Result<WorkflowRunId>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parameters_name_contract_and_revision() {
        let id = ContractId::generate();
        let settings = WorkflowSettings {
            revision: "v2".into(),
            ..WorkflowSettings::default()
        };
        assert_eq!(
            settings.parameters(&id),
            vec![format!("contract_id={id}"), "revision=v2".to_string()]
        );
        assert_eq!(settings.template, "tks-create-contract-repo");
        assert_eq!(settings.namespace, "argo");
    }
}
