//! Build script generating the gRPC service stubs.
//!
//! Message types are written by hand in `src/lib.rs` to match
//! `proto/covenant/v1/*.proto`, so the build does not need `protoc`. Only the
//! client and server plumbing is generated here.

use tonic_build::manual::{Builder, Method, Service};

const CODEC: &str = "tonic::codec::ProstCodec";

fn method(name: &str, route: &str, input: &str, output: &str) -> Method {
    Method::builder()
        .name(name)
        .route_name(route)
        .input_type(format!("crate::v1::{input}"))
        .output_type(format!("crate::v1::{output}"))
        .codec_path(CODEC)
        .build()
}

fn main() {
    let contract_service = Service::builder()
        .name("ContractService")
        .package("covenant.v1")
        .method(method(
            "create_contract",
            "CreateContract",
            "CreateContractRequest",
            "CreateContractResponse",
        ))
        .method(method(
            "update_quota",
            "UpdateQuota",
            "UpdateQuotaRequest",
            "UpdateQuotaResponse",
        ))
        .method(method(
            "update_services",
            "UpdateServices",
            "UpdateServicesRequest",
            "UpdateServicesResponse",
        ))
        .method(method(
            "get_contract",
            "GetContract",
            "GetContractRequest",
            "GetContractResponse",
        ))
        .method(method(
            "get_default_contract",
            "GetDefaultContract",
            "GetDefaultContractRequest",
            "GetContractResponse",
        ))
        .method(method(
            "get_contracts",
            "GetContracts",
            "GetContractsRequest",
            "GetContractsResponse",
        ))
        .method(method(
            "get_quota",
            "GetQuota",
            "GetQuotaRequest",
            "GetQuotaResponse",
        ))
        .method(method(
            "get_available_services",
            "GetAvailableServices",
            "GetAvailableServicesRequest",
            "GetAvailableServicesResponse",
        ))
        .build();

    let csp_info_service = Service::builder()
        .name("CspInfoService")
        .package("covenant.v1")
        .method(method(
            "create_csp_info",
            "CreateCSPInfo",
            "CreateCspInfoRequest",
            "IdResponse",
        ))
        .build();

    Builder::new().compile(&[contract_service, csp_info_service]);

    println!("cargo:rerun-if-changed=build.rs");
}
