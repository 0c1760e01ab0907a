//! # covenant-proto
//!
//! Wire types and gRPC stubs for Covenant.
//!
//! ## Proto File Organization
//!
//! ```text
//! proto/covenant/v1/
//! ├── common.proto    - Code enum, Error, IdResponse
//! ├── contract.proto  - ContractService (served by covenant-api)
//! └── cspinfo.proto   - CspInfoService (consumed by covenant-api)
//! ```
//!
//! The message structs below mirror those files field for field and tag for
//! tag. Service clients and servers are generated by `build.rs`.
//!
//! ## Wire Format Guarantees
//!
//! - All messages follow Protobuf evolution rules
//! - Field numbers are never reused
//! - Every response carries an in-band [`v1::Code`]; transport errors are not
//!   used for domain outcomes
//!
//! ## Example
//!
//! ```rust
//! use covenant_proto::v1::{Code, GetContractResponse};
//!
//! let response = GetContractResponse::default();
//! assert_eq!(response.code(), Code::OkUnspecified);
//! ```

#![deny(missing_docs)]
#![deny(rust_2018_idioms)]
#![warn(clippy::pedantic)]
// Allow generated code patterns
#![allow(clippy::derive_partial_eq_without_eq)]
#![allow(clippy::default_trait_access)]

/// Version 1 of the Covenant protocol.
pub mod v1 {
    /// Outcome of an RPC. Numbering follows `google.rpc.Code`.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
    #[repr(i32)]
    pub enum Code {
        /// Success.
        OkUnspecified = 0,
        /// The operation was cancelled.
        Cancelled = 1,
        /// Unknown error.
        Unknown = 2,
        /// The caller supplied an invalid argument.
        InvalidArgument = 3,
        /// A deadline expired before the operation completed.
        DeadlineExceeded = 4,
        /// The requested entity was not found.
        NotFound = 5,
        /// The entity already exists.
        AlreadyExists = 6,
        /// The caller lacks permission.
        PermissionDenied = 7,
        /// A resource has been exhausted.
        ResourceExhausted = 8,
        /// The system is not in a state required for the operation.
        FailedPrecondition = 9,
        /// The operation was aborted.
        Aborted = 10,
        /// The operation was attempted past the valid range.
        OutOfRange = 11,
        /// The operation is not implemented or not enabled.
        Unimplemented = 12,
        /// Internal error.
        Internal = 13,
        /// The service is unavailable.
        Unavailable = 14,
        /// Unrecoverable data loss.
        DataLoss = 15,
        /// The request lacks valid credentials.
        Unauthenticated = 16,
    }

    impl Code {
        /// Returns the name used in the proto definition.
        #[must_use]
        pub const fn as_str_name(self) -> &'static str {
            match self {
                Self::OkUnspecified => "OK_UNSPECIFIED",
                Self::Cancelled => "CANCELLED",
                Self::Unknown => "UNKNOWN",
                Self::InvalidArgument => "INVALID_ARGUMENT",
                Self::DeadlineExceeded => "DEADLINE_EXCEEDED",
                Self::NotFound => "NOT_FOUND",
                Self::AlreadyExists => "ALREADY_EXISTS",
                Self::PermissionDenied => "PERMISSION_DENIED",
                Self::ResourceExhausted => "RESOURCE_EXHAUSTED",
                Self::FailedPrecondition => "FAILED_PRECONDITION",
                Self::Aborted => "ABORTED",
                Self::OutOfRange => "OUT_OF_RANGE",
                Self::Unimplemented => "UNIMPLEMENTED",
                Self::Internal => "INTERNAL",
                Self::Unavailable => "UNAVAILABLE",
                Self::DataLoss => "DATA_LOSS",
                Self::Unauthenticated => "UNAUTHENTICATED",
            }
        }
    }

    /// Human-readable failure detail.
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Error {
        /// Message text.
        #[prost(string, tag = "1")]
        pub msg: ::prost::alloc::string::String,
    }

    /// Generic response carrying a single identifier.
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct IdResponse {
        /// Outcome.
        #[prost(enumeration = "Code", tag = "1")]
        pub code: i32,
        /// Failure detail when `code` is not OK.
        #[prost(message, optional, tag = "2")]
        pub error: ::core::option::Option<Error>,
        /// Issued identifier.
        #[prost(string, tag = "3")]
        pub id: ::prost::alloc::string::String,
    }

    /// Resource quota. In updates, zero means "leave unchanged".
    #[derive(Clone, Copy, PartialEq, ::prost::Message)]
    pub struct ContractQuota {
        /// CPU capacity.
        #[prost(uint64, tag = "1")]
        pub cpu: u64,
        /// Memory capacity.
        #[prost(uint64, tag = "2")]
        pub memory: u64,
        /// Block storage capacity.
        #[prost(uint64, tag = "3")]
        pub block: u64,
        /// SSD block storage capacity.
        #[prost(uint64, tag = "4")]
        pub block_ssd: u64,
        /// File storage capacity.
        #[prost(uint64, tag = "5")]
        pub fs: u64,
        /// SSD file storage capacity.
        #[prost(uint64, tag = "6")]
        pub fs_ssd: u64,
    }

    /// A contract with its quota.
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Contract {
        /// Unique contractor name.
        #[prost(string, tag = "1")]
        pub contractor_name: ::prost::alloc::string::String,
        /// Contract identifier (UUID).
        #[prost(string, tag = "2")]
        pub contract_id: ::prost::alloc::string::String,
        /// Enabled services.
        #[prost(string, repeated, tag = "3")]
        pub available_services: ::prost::alloc::vec::Vec<::prost::alloc::string::String>,
        /// Capacity limits.
        #[prost(message, optional, tag = "4")]
        pub quota: ::core::option::Option<ContractQuota>,
        /// Last update time.
        #[prost(message, optional, tag = "5")]
        pub updated_at: ::core::option::Option<::prost_types::Timestamp>,
        /// Creation time.
        #[prost(message, optional, tag = "6")]
        pub created_at: ::core::option::Option<::prost_types::Timestamp>,
        /// Creator identity (UUID), empty when unknown.
        #[prost(string, tag = "7")]
        pub creator: ::prost::alloc::string::String,
        /// Free-text description.
        #[prost(string, tag = "8")]
        pub description: ::prost::alloc::string::String,
    }

    /// Request to create a contract and provision it downstream.
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct CreateContractRequest {
        /// Unique contractor name.
        #[prost(string, tag = "1")]
        pub contractor_name: ::prost::alloc::string::String,
        /// Enabled services.
        #[prost(string, repeated, tag = "2")]
        pub available_services: ::prost::alloc::vec::Vec<::prost::alloc::string::String>,
        /// Initial quota.
        #[prost(message, optional, tag = "3")]
        pub quota: ::core::option::Option<ContractQuota>,
        /// Cloud service provider name.
        #[prost(string, tag = "4")]
        pub csp_name: ::prost::alloc::string::String,
        /// Opaque provider credentials, forwarded as-is.
        #[prost(string, tag = "5")]
        pub csp_auth: ::prost::alloc::string::String,
        /// Creator identity (UUID), empty when unknown.
        #[prost(string, tag = "6")]
        pub creator: ::prost::alloc::string::String,
        /// Free-text description.
        #[prost(string, tag = "7")]
        pub description: ::prost::alloc::string::String,
    }

    /// Result of contract creation.
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct CreateContractResponse {
        /// Outcome.
        #[prost(enumeration = "Code", tag = "1")]
        pub code: i32,
        /// Failure detail when `code` is not OK.
        #[prost(message, optional, tag = "2")]
        pub error: ::core::option::Option<Error>,
        /// Identifier of the new contract.
        #[prost(string, tag = "3")]
        pub contract_id: ::prost::alloc::string::String,
        /// Identifier of the provisioning record.
        #[prost(string, tag = "4")]
        pub provisioning_id: ::prost::alloc::string::String,
    }

    /// Request to merge a quota patch.
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct UpdateQuotaRequest {
        /// Target contract.
        #[prost(string, tag = "1")]
        pub contract_id: ::prost::alloc::string::String,
        /// Patch; zero fields are left unchanged.
        #[prost(message, optional, tag = "2")]
        pub quota: ::core::option::Option<ContractQuota>,
    }

    /// Result of a quota update.
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct UpdateQuotaResponse {
        /// Outcome.
        #[prost(enumeration = "Code", tag = "1")]
        pub code: i32,
        /// Failure detail when `code` is not OK.
        #[prost(message, optional, tag = "2")]
        pub error: ::core::option::Option<Error>,
        /// Target contract.
        #[prost(string, tag = "3")]
        pub contract_id: ::prost::alloc::string::String,
        /// Quota before the update.
        #[prost(message, optional, tag = "4")]
        pub prev_quota: ::core::option::Option<ContractQuota>,
        /// Quota after the update.
        #[prost(message, optional, tag = "5")]
        pub current_quota: ::core::option::Option<ContractQuota>,
    }

    /// Request to replace the enabled services.
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct UpdateServicesRequest {
        /// Target contract.
        #[prost(string, tag = "1")]
        pub contract_id: ::prost::alloc::string::String,
        /// New service list.
        #[prost(string, repeated, tag = "2")]
        pub available_services: ::prost::alloc::vec::Vec<::prost::alloc::string::String>,
    }

    /// Result of a services update.
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct UpdateServicesResponse {
        /// Outcome.
        #[prost(enumeration = "Code", tag = "1")]
        pub code: i32,
        /// Failure detail when `code` is not OK.
        #[prost(message, optional, tag = "2")]
        pub error: ::core::option::Option<Error>,
        /// Target contract.
        #[prost(string, tag = "3")]
        pub contract_id: ::prost::alloc::string::String,
        /// Services before the update.
        #[prost(string, repeated, tag = "4")]
        pub prev_services: ::prost::alloc::vec::Vec<::prost::alloc::string::String>,
        /// Services after the update.
        #[prost(string, repeated, tag = "5")]
        pub current_services: ::prost::alloc::vec::Vec<::prost::alloc::string::String>,
    }

    /// Request for one contract.
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct GetContractRequest {
        /// Target contract.
        #[prost(string, tag = "1")]
        pub contract_id: ::prost::alloc::string::String,
    }

    /// Request for the default contract.
    #[derive(Clone, Copy, PartialEq, ::prost::Message)]
    pub struct GetDefaultContractRequest {}

    /// A single contract.
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct GetContractResponse {
        /// Outcome.
        #[prost(enumeration = "Code", tag = "1")]
        pub code: i32,
        /// Failure detail when `code` is not OK.
        #[prost(message, optional, tag = "2")]
        pub error: ::core::option::Option<Error>,
        /// The contract.
        #[prost(message, optional, tag = "3")]
        pub contract: ::core::option::Option<Contract>,
    }

    /// Request for a page of contracts.
    #[derive(Clone, Copy, PartialEq, ::prost::Message)]
    pub struct GetContractsRequest {
        /// Rows to skip, default 0.
        #[prost(uint32, optional, tag = "1")]
        pub offset: ::core::option::Option<u32>,
        /// Page size, default and maximum 100.
        #[prost(uint32, optional, tag = "2")]
        pub limit: ::core::option::Option<u32>,
    }

    /// A page of contracts.
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct GetContractsResponse {
        /// Outcome.
        #[prost(enumeration = "Code", tag = "1")]
        pub code: i32,
        /// Failure detail when `code` is not OK.
        #[prost(message, optional, tag = "2")]
        pub error: ::core::option::Option<Error>,
        /// Contracts in insertion order.
        #[prost(message, repeated, tag = "3")]
        pub contracts: ::prost::alloc::vec::Vec<Contract>,
    }

    /// Request for a contract's quota.
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct GetQuotaRequest {
        /// Target contract.
        #[prost(string, tag = "1")]
        pub contract_id: ::prost::alloc::string::String,
    }

    /// A contract's quota.
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct GetQuotaResponse {
        /// Outcome.
        #[prost(enumeration = "Code", tag = "1")]
        pub code: i32,
        /// Failure detail when `code` is not OK.
        #[prost(message, optional, tag = "2")]
        pub error: ::core::option::Option<Error>,
        /// The quota.
        #[prost(message, optional, tag = "3")]
        pub quota: ::core::option::Option<ContractQuota>,
    }

    /// Request for a contract's enabled services.
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct GetAvailableServicesRequest {
        /// Target contract.
        #[prost(string, tag = "1")]
        pub contract_id: ::prost::alloc::string::String,
    }

    /// A contract's enabled services.
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct GetAvailableServicesResponse {
        /// Outcome.
        #[prost(enumeration = "Code", tag = "1")]
        pub code: i32,
        /// Failure detail when `code` is not OK.
        #[prost(message, optional, tag = "2")]
        pub error: ::core::option::Option<Error>,
        /// Enabled services.
        #[prost(string, repeated, tag = "3")]
        pub available_services: ::prost::alloc::vec::Vec<::prost::alloc::string::String>,
    }

    /// Request to register provider information for a contract.
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct CreateCspInfoRequest {
        /// Owning contract.
        #[prost(string, tag = "1")]
        pub contract_id: ::prost::alloc::string::String,
        /// Cloud service provider name.
        #[prost(string, tag = "2")]
        pub csp_name: ::prost::alloc::string::String,
        /// Opaque provider credentials.
        #[prost(string, tag = "3")]
        pub auth: ::prost::alloc::string::String,
    }

    #[allow(missing_docs, rust_2018_idioms, clippy::all, clippy::pedantic)]
    mod services {
        include!(concat!(env!("OUT_DIR"), "/covenant.v1.ContractService.rs"));
        include!(concat!(env!("OUT_DIR"), "/covenant.v1.CspInfoService.rs"));
    }

    pub use services::{
        contract_service_client, contract_service_server, csp_info_service_client,
        csp_info_service_server,
    };
}
