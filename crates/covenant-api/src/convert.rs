//! Conversions between domain types and wire messages.

use chrono::{DateTime, Utc};

use covenant_core::{Contract, ResourceQuota};
use covenant_proto::v1;
use covenant_service::{ServiceError, StatusCode};

/// Converts a wire quota into a domain quota; an absent quota is all zeros.
#[must_use]
pub fn quota_from_wire(quota: Option<v1::ContractQuota>) -> ResourceQuota {
    quota.map_or_else(ResourceQuota::default, |q| ResourceQuota {
        cpu: q.cpu,
        memory: q.memory,
        block: q.block,
        block_ssd: q.block_ssd,
        fs: q.fs,
        fs_ssd: q.fs_ssd,
    })
}

/// Converts a domain quota into its wire form.
#[must_use]
pub const fn quota_to_wire(quota: ResourceQuota) -> v1::ContractQuota {
    v1::ContractQuota {
        cpu: quota.cpu,
        memory: quota.memory,
        block: quota.block,
        block_ssd: quota.block_ssd,
        fs: quota.fs,
        fs_ssd: quota.fs_ssd,
    }
}

/// Converts a timestamp into its wire form.
#[must_use]
pub fn timestamp_to_wire(at: DateTime<Utc>) -> prost_types::Timestamp {
    prost_types::Timestamp {
        seconds: at.timestamp(),
        nanos: i32::try_from(at.timestamp_subsec_nanos()).unwrap_or(i32::MAX),
    }
}

/// Converts a contract into its wire form.
#[must_use]
pub fn contract_to_wire(contract: Contract) -> v1::Contract {
    v1::Contract {
        contractor_name: contract.contractor_name,
        contract_id: contract.id.to_string(),
        available_services: contract.available_services,
        quota: Some(quota_to_wire(contract.quota)),
        updated_at: Some(timestamp_to_wire(contract.updated_at)),
        created_at: Some(timestamp_to_wire(contract.created_at)),
        creator: contract.creator.map(|c| c.to_string()).unwrap_or_default(),
        description: contract.description.unwrap_or_default(),
    }
}

/// Maps a service status onto the wire code enum.
#[must_use]
pub fn code_to_wire(status: StatusCode) -> v1::Code {
    v1::Code::try_from(status.as_i32()).unwrap_or(v1::Code::Unknown)
}

/// Splits a service error into the `(code, error)` pair every response carries.
#[must_use]
pub fn error_to_wire(err: &ServiceError) -> (i32, Option<v1::Error>) {
    (
        code_to_wire(err.status).into(),
        Some(v1::Error {
            msg: err.message.clone(),
        }),
    )
}

/// Treats an empty string as absent.
#[must_use]
pub fn non_empty(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}
