//! End-to-end tests of the gRPC surface over a real transport.

use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tonic::transport::Channel;

use covenant_api::config::Config;
use covenant_api::server::Server;
use covenant_proto::v1::contract_service_client::ContractServiceClient;
use covenant_proto::v1::{
    Code, ContractQuota, CreateContractRequest, GetAvailableServicesRequest, GetContractRequest,
    GetContractsRequest, GetDefaultContractRequest, GetQuotaRequest, UpdateQuotaRequest,
    UpdateServicesRequest,
};
use covenant_service::ContractOrchestrator;
use covenant_store::InMemoryContractStore;
use covenant_test_utils::{FakeProvisioner, FakeWorkflowSubmitter, TestContext, init_test_logging};

struct Running {
    client: ContractServiceClient<Channel>,
    _shutdown: oneshot::Sender<()>,
}

async fn start(orchestrator: ContractOrchestrator) -> Running {
    init_test_logging();
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    let (tx, rx) = oneshot::channel::<()>();

    let server = Server::with_orchestrator(Config::default(), Arc::new(orchestrator));
    tokio::spawn(async move {
        let _ = server
            .serve_with_listener(listener, async move {
                let _ = rx.await;
            })
            .await;
    });

    let client = ContractServiceClient::connect(format!("http://{addr}"))
        .await
        .expect("connect");
    Running {
        client,
        _shutdown: tx,
    }
}

fn quota() -> ContractQuota {
    ContractQuota {
        cpu: 20,
        memory: 40,
        block: 100,
        block_ssd: 50,
        fs: 100,
        fs_ssd: 50,
    }
}

fn create_request(name: &str) -> CreateContractRequest {
    CreateContractRequest {
        contractor_name: name.to_string(),
        available_services: vec!["lma".to_string()],
        quota: Some(quota()),
        csp_name: "aws".to_string(),
        csp_auth: "{}".to_string(),
        creator: String::new(),
        description: String::new(),
    }
}

async fn create(client: &mut ContractServiceClient<Channel>, name: &str) -> String {
    let reply = client
        .create_contract(create_request(name))
        .await
        .expect("rpc")
        .into_inner();
    assert_eq!(reply.code, Code::OkUnspecified as i32, "{:?}", reply.error);
    reply.contract_id
}

#[tokio::test]
async fn create_then_get_round_trips() {
    let ctx = TestContext::new();
    let mut running = start(ctx.orchestrator).await;

    let reply = running
        .client
        .create_contract(create_request("acme"))
        .await
        .expect("rpc")
        .into_inner();
    assert_eq!(reply.code, Code::OkUnspecified as i32);
    assert!(reply.error.is_none());
    assert_eq!(reply.provisioning_id, "csp-record-1");

    let got = running
        .client
        .get_contract(GetContractRequest {
            contract_id: reply.contract_id.clone(),
        })
        .await
        .expect("rpc")
        .into_inner();
    assert_eq!(got.code, Code::OkUnspecified as i32);
    let contract = got.contract.expect("contract");
    assert_eq!(contract.contract_id, reply.contract_id);
    assert_eq!(contract.contractor_name, "acme");
    assert_eq!(contract.available_services, vec!["lma".to_string()]);
    assert_eq!(contract.quota, Some(quota()));
    assert!(contract.created_at.is_some());
    assert_eq!(contract.creator, "");
}

#[tokio::test]
async fn duplicate_name_reports_already_exists_in_band() {
    let ctx = TestContext::new();
    let mut running = start(ctx.orchestrator).await;

    create(&mut running.client, "acme").await;
    let reply = running
        .client
        .create_contract(create_request("acme"))
        .await
        .expect("transport stays OK")
        .into_inner();
    assert_eq!(reply.code, Code::AlreadyExists as i32);
    assert!(reply.contract_id.is_empty());
    assert!(!reply.error.expect("error").msg.is_empty());
}

#[tokio::test]
async fn provisioning_rejection_is_forwarded() {
    let ctx = TestContext::with_fakes(
        FakeProvisioner::rejecting(
            covenant_service::StatusCode::InvalidArgument,
            "unsupported csp",
        ),
        FakeWorkflowSubmitter::succeeding("run-1"),
    );
    let mut running = start(ctx.orchestrator).await;

    let reply = running
        .client
        .create_contract(create_request("acme"))
        .await
        .expect("rpc")
        .into_inner();
    assert_eq!(reply.code, Code::InvalidArgument as i32);
    assert_eq!(reply.error.expect("error").msg, "unsupported csp");
}

#[tokio::test]
async fn workflow_failure_reports_internal_and_rolls_back() {
    let ctx = TestContext::with_fakes(
        FakeProvisioner::succeeding("csp-record-1"),
        FakeWorkflowSubmitter::failing("template missing"),
    );
    let store = ctx.store.clone();
    let mut running = start(ctx.orchestrator).await;

    let reply = running
        .client
        .create_contract(create_request("acme"))
        .await
        .expect("rpc")
        .into_inner();
    assert_eq!(reply.code, Code::Internal as i32);
    assert!(reply.error.expect("error").msg.contains("template missing"));
    assert_eq!(store.contract_count(), 0);
}

#[tokio::test]
async fn unwired_server_answers_unimplemented() {
    let orchestrator = ContractOrchestrator::new(Arc::new(InMemoryContractStore::new()));
    let mut running = start(orchestrator).await;

    let reply = running
        .client
        .create_contract(create_request("acme"))
        .await
        .expect("rpc")
        .into_inner();
    assert_eq!(reply.code, Code::Unimplemented as i32);

    let listed = running
        .client
        .get_contracts(GetContractsRequest::default())
        .await
        .expect("rpc")
        .into_inner();
    assert_eq!(listed.code, Code::OkUnspecified as i32);
    assert!(listed.contracts.is_empty());
}

#[tokio::test]
async fn quota_patch_keeps_zero_fields() {
    let ctx = TestContext::new();
    let mut running = start(ctx.orchestrator).await;
    let id = create(&mut running.client, "acme").await;

    let reply = running
        .client
        .update_quota(UpdateQuotaRequest {
            contract_id: id.clone(),
            quota: Some(ContractQuota {
                cpu: 64,
                ..ContractQuota::default()
            }),
        })
        .await
        .expect("rpc")
        .into_inner();
    assert_eq!(reply.code, Code::OkUnspecified as i32);
    assert_eq!(reply.contract_id, id);
    assert_eq!(reply.prev_quota, Some(quota()));
    assert_eq!(
        reply.current_quota,
        Some(ContractQuota {
            cpu: 64,
            ..quota()
        })
    );

    let current = running
        .client
        .get_quota(GetQuotaRequest { contract_id: id })
        .await
        .expect("rpc")
        .into_inner();
    assert_eq!(current.quota.map(|q| q.cpu), Some(64));
}

#[tokio::test]
async fn services_are_replaced_wholesale() {
    let ctx = TestContext::new();
    let mut running = start(ctx.orchestrator).await;
    let id = create(&mut running.client, "acme").await;

    let reply = running
        .client
        .update_services(UpdateServicesRequest {
            contract_id: id.clone(),
            available_services: vec!["lma".to_string(), "servicemesh".to_string()],
        })
        .await
        .expect("rpc")
        .into_inner();
    assert_eq!(reply.prev_services, vec!["lma".to_string()]);
    assert_eq!(
        reply.current_services,
        vec!["lma".to_string(), "servicemesh".to_string()]
    );

    let reply = running
        .client
        .update_services(UpdateServicesRequest {
            contract_id: id.clone(),
            available_services: vec![String::new()],
        })
        .await
        .expect("rpc")
        .into_inner();
    assert_eq!(reply.current_services, vec![String::new()]);

    let services = running
        .client
        .get_available_services(GetAvailableServicesRequest { contract_id: id })
        .await
        .expect("rpc")
        .into_inner();
    assert_eq!(services.available_services, vec![String::new()]);
}

#[tokio::test]
async fn malformed_and_unknown_ids_are_distinguished() {
    let ctx = TestContext::new();
    let mut running = start(ctx.orchestrator).await;

    let malformed = running
        .client
        .get_contract(GetContractRequest {
            contract_id: "invalid_contract_id".to_string(),
        })
        .await
        .expect("rpc")
        .into_inner();
    assert_eq!(malformed.code, Code::InvalidArgument as i32);
    assert!(malformed.contract.is_none());

    let unknown = running
        .client
        .get_quota(GetQuotaRequest {
            contract_id: "6c8ad5f2-5d3b-4c58-9a55-0d7a4f3f1e20".to_string(),
        })
        .await
        .expect("rpc")
        .into_inner();
    assert_eq!(unknown.code, Code::NotFound as i32);
    assert!(unknown.quota.is_none());
}

#[tokio::test]
async fn default_contract_lookup() {
    let ctx = TestContext::new();
    let mut running = start(ctx.orchestrator).await;

    let missing = running
        .client
        .get_default_contract(GetDefaultContractRequest {})
        .await
        .expect("rpc")
        .into_inner();
    assert_eq!(missing.code, Code::NotFound as i32);

    create(&mut running.client, "default").await;
    let found = running
        .client
        .get_default_contract(GetDefaultContractRequest {})
        .await
        .expect("rpc")
        .into_inner();
    assert_eq!(found.code, Code::OkUnspecified as i32);
    assert_eq!(found.contract.expect("contract").contractor_name, "default");
}

#[tokio::test]
async fn listing_pages_in_creation_order() {
    let ctx = TestContext::new();
    let mut running = start(ctx.orchestrator).await;
    let mut ids = Vec::new();
    for i in 0..5 {
        ids.push(create(&mut running.client, &format!("tenant-{i}")).await);
    }

    let all = running
        .client
        .get_contracts(GetContractsRequest::default())
        .await
        .expect("rpc")
        .into_inner();
    let listed: Vec<_> = all.contracts.iter().map(|c| c.contract_id.clone()).collect();
    assert_eq!(listed, ids);
    assert!(all.contracts.iter().all(|c| c.quota == Some(quota())));

    let window = running
        .client
        .get_contracts(GetContractsRequest {
            offset: Some(1),
            limit: Some(2),
        })
        .await
        .expect("rpc")
        .into_inner();
    let listed: Vec<_> = window.contracts.iter().map(|c| c.contract_id.clone()).collect();
    assert_eq!(listed, ids[1..3].to_vec());
}
