//! Clients for the two downstream services a contract creation calls.

pub mod argo;
pub mod cspinfo;

pub use argo::ArgoClient;
pub use cspinfo::CspInfoClient;
