//! Shared test utilities for Covenant integration tests.
//!
//! This crate provides:
//! - [`TracingContractStore`]: in-memory store with operation recording and
//!   failure injection
//! - [`FakeProvisioner`] / [`FakeWorkflowSubmitter`]: scripted downstream
//!   collaborators that record every call
//! - [`TestContext`]: an orchestrator wired to all of the above
//! - Factory functions for requests and custom assertion helpers
//!
//! # Example
//!
//! ```rust,ignore
//! use covenant_test_utils::{TestContext, ContractFixtures, assert_status};
//!
//! #[tokio::test]
//! async fn test_example() {
//!     let ctx = TestContext::new();
//!     let created = ctx.orchestrator.create_contract(ContractFixtures::request("acme")).await;
//!     // ... assert ...
//! }
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rust_2018_idioms)]
#![warn(clippy::pedantic)]
#![allow(clippy::must_use_candidate)]
// Test utilities use expect/unwrap for cleaner test code - panics are acceptable in tests
#![allow(clippy::expect_used)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::missing_panics_doc)]

pub mod assertions;
pub mod fakes;
pub mod fixtures;
pub mod storage;

pub use assertions::*;
pub use fakes::*;
pub use fixtures::*;
pub use storage::*;

/// Initialize test logging (call once per test module).
pub fn init_test_logging() {
    use tracing_subscriber::{EnvFilter, fmt};

    let _ = fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("covenant=debug".parse().expect("valid directive")),
        )
        .with_test_writer()
        .try_init();
}
