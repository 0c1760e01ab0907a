//! # covenant-api
//!
//! Composition layer for the Covenant contract service.
//!
//! This crate wires the pieces together and owns everything that talks to
//! the network:
//!
//! - **gRPC surface**: [`grpc::ContractGrpcService`] answers
//!   `covenant.v1.ContractService` with in-band status codes
//! - **Downstream clients**: [`clients::CspInfoClient`] (gRPC) and
//!   [`clients::ArgoClient`] (REST)
//! - **Configuration**: [`config::Config`] from `COVENANT_*` variables
//! - **Lifecycle**: [`server::Server`], with optional default-contract seeding
//!   and graceful shutdown
//!
//! Business rules live in `covenant-service`; this crate holds no policy.
//!
//! ## Example
//!
//! ```rust,no_run
//! use covenant_api::config::Config;
//! use covenant_api::server::Server;
//!
//! # async fn run() -> covenant_core::Result<()> {
//! let server = Server::from_config(Config::from_env()?).await?;
//! server.serve().await?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rust_2018_idioms)]
#![warn(clippy::pedantic)]

pub mod clients;
pub mod config;
pub mod convert;
pub mod grpc;
pub mod seed;
pub mod server;
