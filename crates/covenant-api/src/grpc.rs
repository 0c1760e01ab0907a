//! gRPC surface of the contract service.
//!
//! Every RPC answers at the transport level with `OK`. The outcome travels in
//! the response's `code` field, with a message in `error` when it is not OK,
//! so clients branch on the body rather than on the gRPC status.

use std::sync::Arc;

use tonic::{Request, Response, Status};

use covenant_proto::v1::{
    self, Code, CreateContractRequest, CreateContractResponse, GetAvailableServicesRequest,
    GetAvailableServicesResponse, GetContractRequest, GetContractResponse, GetContractsRequest,
    GetContractsResponse, GetDefaultContractRequest, GetQuotaRequest, GetQuotaResponse,
    UpdateQuotaRequest, UpdateQuotaResponse, UpdateServicesRequest, UpdateServicesResponse,
};
use covenant_proto::v1::contract_service_server::{ContractService, ContractServiceServer};
use covenant_service::{ContractOrchestrator, CreateContract, Page, ServiceError};

use crate::convert::{contract_to_wire, error_to_wire, non_empty, quota_from_wire, quota_to_wire};

const OK: i32 = Code::OkUnspecified as i32;

/// `ContractService` implementation over a [`ContractOrchestrator`].
#[derive(Debug, Clone)]
pub struct ContractGrpcService {
    orchestrator: Arc<ContractOrchestrator>,
}

impl ContractGrpcService {
    /// Creates the service.
    #[must_use]
    pub const fn new(orchestrator: Arc<ContractOrchestrator>) -> Self {
        Self { orchestrator }
    }

    /// Wraps the service for registration with a tonic router.
    #[must_use]
    pub fn into_server(self) -> ContractServiceServer<Self> {
        ContractServiceServer::new(self)
    }
}

fn failed(rpc: &'static str, err: &ServiceError) -> (i32, Option<v1::Error>) {
    tracing::warn!(rpc, status = %err.status, message = %err.message, "request failed");
    error_to_wire(err)
}

#[tonic::async_trait]
impl ContractService for ContractGrpcService {
    async fn create_contract(
        &self,
        request: Request<CreateContractRequest>,
    ) -> Result<Response<CreateContractResponse>, Status> {
        let req = request.into_inner();
        let input = CreateContract {
            contractor_name: req.contractor_name,
            available_services: req.available_services,
            quota: quota_from_wire(req.quota),
            csp_name: req.csp_name,
            csp_auth: req.csp_auth,
            creator: req.creator,
            description: non_empty(req.description),
        };

        let reply = match self.orchestrator.create_contract(input).await {
            Ok(created) => CreateContractResponse {
                code: OK,
                error: None,
                contract_id: created.contract_id.to_string(),
                provisioning_id: created.provisioning_id.into_inner(),
            },
            Err(err) => {
                let (code, error) = failed("CreateContract", &err);
                CreateContractResponse {
                    code,
                    error,
                    ..CreateContractResponse::default()
                }
            }
        };
        Ok(Response::new(reply))
    }

    async fn update_quota(
        &self,
        request: Request<UpdateQuotaRequest>,
    ) -> Result<Response<UpdateQuotaResponse>, Status> {
        let req = request.into_inner();
        let patch = quota_from_wire(req.quota);

        let reply = match self.orchestrator.update_quota(&req.contract_id, patch).await {
            Ok(change) => UpdateQuotaResponse {
                code: OK,
                error: None,
                contract_id: req.contract_id,
                prev_quota: Some(quota_to_wire(change.previous)),
                current_quota: Some(quota_to_wire(change.current)),
            },
            Err(err) => {
                let (code, error) = failed("UpdateQuota", &err);
                UpdateQuotaResponse {
                    code,
                    error,
                    contract_id: req.contract_id,
                    ..UpdateQuotaResponse::default()
                }
            }
        };
        Ok(Response::new(reply))
    }

    async fn update_services(
        &self,
        request: Request<UpdateServicesRequest>,
    ) -> Result<Response<UpdateServicesResponse>, Status> {
        let req = request.into_inner();

        let reply = match self
            .orchestrator
            .update_services(&req.contract_id, req.available_services)
            .await
        {
            Ok(change) => UpdateServicesResponse {
                code: OK,
                error: None,
                contract_id: req.contract_id,
                prev_services: change.previous,
                current_services: change.current,
            },
            Err(err) => {
                let (code, error) = failed("UpdateServices", &err);
                UpdateServicesResponse {
                    code,
                    error,
                    contract_id: req.contract_id,
                    ..UpdateServicesResponse::default()
                }
            }
        };
        Ok(Response::new(reply))
    }

    async fn get_contract(
        &self,
        request: Request<GetContractRequest>,
    ) -> Result<Response<GetContractResponse>, Status> {
        let req = request.into_inner();
        let result = self.orchestrator.get_contract(&req.contract_id).await;
        Ok(Response::new(contract_reply("GetContract", result)))
    }

    async fn get_default_contract(
        &self,
        _request: Request<GetDefaultContractRequest>,
    ) -> Result<Response<GetContractResponse>, Status> {
        let result = self.orchestrator.get_default_contract().await;
        Ok(Response::new(contract_reply("GetDefaultContract", result)))
    }

    async fn get_contracts(
        &self,
        request: Request<GetContractsRequest>,
    ) -> Result<Response<GetContractsResponse>, Status> {
        let req = request.into_inner();
        let page = Page::new(req.offset, req.limit);

        let reply = match self.orchestrator.get_contracts(page).await {
            Ok(contracts) => GetContractsResponse {
                code: OK,
                error: None,
                contracts: contracts.into_iter().map(contract_to_wire).collect(),
            },
            Err(err) => {
                let (code, error) = failed("GetContracts", &err);
                GetContractsResponse {
                    code,
                    error,
                    contracts: Vec::new(),
                }
            }
        };
        Ok(Response::new(reply))
    }

    async fn get_quota(
        &self,
        request: Request<GetQuotaRequest>,
    ) -> Result<Response<GetQuotaResponse>, Status> {
        let req = request.into_inner();

        let reply = match self.orchestrator.get_quota(&req.contract_id).await {
            Ok(quota) => GetQuotaResponse {
                code: OK,
                error: None,
                quota: Some(quota_to_wire(quota)),
            },
            Err(err) => {
                let (code, error) = failed("GetQuota", &err);
                GetQuotaResponse {
                    code,
                    error,
                    quota: None,
                }
            }
        };
        Ok(Response::new(reply))
    }

    async fn get_available_services(
        &self,
        request: Request<GetAvailableServicesRequest>,
    ) -> Result<Response<GetAvailableServicesResponse>, Status> {
        let req = request.into_inner();

        let reply = match self
            .orchestrator
            .get_available_services(&req.contract_id)
            .await
        {
            Ok(available_services) => GetAvailableServicesResponse {
                code: OK,
                error: None,
                available_services,
            },
            Err(err) => {
                let (code, error) = failed("GetAvailableServices", &err);
                GetAvailableServicesResponse {
                    code,
                    error,
                    available_services: Vec::new(),
                }
            }
        };
        Ok(Response::new(reply))
    }
}

fn contract_reply(
    rpc: &'static str,
    result: Result<covenant_core::Contract, ServiceError>,
) -> GetContractResponse {
    match result {
        Ok(contract) => GetContractResponse {
            code: OK,
            error: None,
            contract: Some(contract_to_wire(contract)),
        },
        Err(err) => {
            let (code, error) = failed(rpc, &err);
            GetContractResponse {
                code,
                error,
                contract: None,
            }
        }
    }
}
