//! HTTP client for submitting Argo workflows from templates.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use covenant_core::{Error, Result, WorkflowRunId};
use covenant_service::WorkflowSubmitter;

const SERVICE: &str = "workflow";
const TEMPLATE_KIND: &str = "WorkflowTemplate";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SubmitRequest<'a> {
    namespace: &'a str,
    resource_kind: &'a str,
    resource_name: &'a str,
    submit_options: SubmitOptions<'a>,
}

#[derive(Debug, Serialize)]
struct SubmitOptions<'a> {
    parameters: &'a [String],
}

#[derive(Debug, Deserialize)]
struct SubmittedWorkflow {
    #[serde(default)]
    metadata: WorkflowMetadata,
}

#[derive(Debug, Default, Deserialize)]
struct WorkflowMetadata {
    #[serde(default)]
    name: String,
}

/// Workflow submitter backed by the Argo server REST API.
#[derive(Debug, Clone)]
pub struct ArgoClient {
    base_url: String,
    client: reqwest::Client,
}

impl ArgoClient {
    /// Creates a client targeting `base_url`, bounding each request by `timeout`.
    #[must_use]
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            base_url: base_url.into(),
            client,
        }
    }

    fn submit_url(&self, namespace: &str) -> String {
        format!(
            "{}/api/v1/workflows/{namespace}/submit",
            self.base_url.trim_end_matches('/')
        )
    }
}

#[async_trait]
impl WorkflowSubmitter for ArgoClient {
    async fn submit_from_template(
        &self,
        template: &str,
        namespace: &str,
        parameters: &[String],
    ) -> Result<WorkflowRunId> {
        let body = SubmitRequest {
            namespace,
            resource_kind: TEMPLATE_KIND,
            resource_name: template,
            submit_options: SubmitOptions { parameters },
        };
        let response = self
            .client
            .post(self.submit_url(namespace))
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::downstream(SERVICE, format!("submit request failed: {e}")))?;

        let status = response.status();
        if status.is_success() {
            let submitted = response
                .json::<SubmittedWorkflow>()
                .await
                .map_err(|e| Error::Serialization {
                    message: format!("invalid workflow submit response: {e}"),
                })?;
            if submitted.metadata.name.is_empty() {
                return Err(Error::downstream(
                    SERVICE,
                    "submit response carried no workflow name",
                ));
            }
            return Ok(WorkflowRunId::new(submitted.metadata.name));
        }

        let body = response.bytes().await.map_err(|e| {
            Error::downstream(SERVICE, format!("failed reading submit error body: {e}"))
        })?;
        let message = serde_json::from_slice::<serde_json::Value>(&body)
            .ok()
            .and_then(|value| {
                value
                    .get("message")
                    .and_then(|v| v.as_str())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| String::from_utf8_lossy(&body).to_string());

        Err(Error::downstream(
            SERVICE,
            format!("submit of {template} rejected ({status}): {message}"),
        ))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::Router;
    use axum::extract::Path;
    use axum::http::StatusCode;
    use axum::routing::post;
    use serde_json::{Value, json};

    use super::*;

    type Captured = Arc<Mutex<Vec<(String, Value)>>>;

    async fn spawn_server(status: StatusCode, reply: Value) -> (String, Captured) {
        let captured: Captured = Arc::default();
        let seen = Arc::clone(&captured);
        let app = Router::new().route(
            "/api/v1/workflows/{namespace}/submit",
            post(move |Path(namespace): Path<String>, axum::Json(body): axum::Json<Value>| {
                let reply = reply.clone();
                let seen = Arc::clone(&seen);
                async move {
                    seen.lock().expect("lock").push((namespace, body));
                    (status, axum::Json(reply))
                }
            }),
        );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        (format!("http://{addr}"), captured)
    }

    fn params() -> Vec<String> {
        vec!["contract_id=abc".to_string(), "revision=main".to_string()]
    }

    #[tokio::test]
    async fn submit_posts_template_and_returns_run_name() {
        let (base_url, captured) = spawn_server(
            StatusCode::OK,
            json!({ "metadata": { "name": "tks-create-contract-repo-x7k2p" } }),
        )
        .await;
        let client = ArgoClient::new(base_url, Duration::from_secs(5));

        let run = client
            .submit_from_template("tks-create-contract-repo", "argo", &params())
            .await
            .expect("submit");
        assert_eq!(run.as_str(), "tks-create-contract-repo-x7k2p");

        let captured = captured.lock().expect("lock").clone();
        assert_eq!(captured.len(), 1);
        let (namespace, body) = &captured[0];
        assert_eq!(namespace, "argo");
        assert_eq!(body["resourceKind"], "WorkflowTemplate");
        assert_eq!(body["resourceName"], "tks-create-contract-repo");
        assert_eq!(
            body["submitOptions"]["parameters"],
            json!(["contract_id=abc", "revision=main"])
        );
    }

    #[tokio::test]
    async fn rejection_surfaces_server_message() {
        let (base_url, _) = spawn_server(
            StatusCode::NOT_FOUND,
            json!({ "code": 5, "message": "workflowtemplate not found" }),
        )
        .await;
        let client = ArgoClient::new(base_url, Duration::from_secs(5));

        let err = client
            .submit_from_template("missing", "argo", &params())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Downstream { service: "workflow", .. }));
        assert!(err.to_string().contains("workflowtemplate not found"));
    }

    #[tokio::test]
    async fn nameless_reply_is_an_error() {
        let (base_url, _) = spawn_server(StatusCode::OK, json!({ "metadata": {} })).await;
        let client = ArgoClient::new(base_url, Duration::from_secs(5));

        let err = client
            .submit_from_template("tks-create-contract-repo", "argo", &params())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Downstream { .. }));
    }

    #[tokio::test]
    async fn unreachable_server_is_downstream_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
        let addr = listener.local_addr().expect("local addr");
        drop(listener);
        let client = ArgoClient::new(format!("http://{addr}"), Duration::from_secs(2));

        let err = client
            .submit_from_template("tks-create-contract-repo", "argo", &params())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Downstream { .. }));
    }
}
