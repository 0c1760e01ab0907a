//! Custom assertion helpers for integration tests.

use std::fmt::Debug;

use covenant_service::{ServiceError, StatusCode};

use crate::storage::{StoreOp, TracingContractStore};

/// Asserts that `result` failed with `expected` and returns the error.
///
/// # Panics
///
/// Panics if the result is `Ok` or carries a different status.
pub fn assert_status<T: Debug>(result: Result<T, ServiceError>, expected: StatusCode) -> ServiceError {
    match result {
        Ok(value) => panic!("expected {expected}, got Ok({value:?})"),
        Err(err) => {
            assert_eq!(
                err.status, expected,
                "expected {expected}, got {}: {}",
                err.status, err.message
            );
            err
        }
    }
}

/// Asserts that the store saw no calls at all.
///
/// # Panics
///
/// Panics if any operation was recorded.
pub fn assert_store_untouched(store: &TracingContractStore) {
    let ops = store.operations();
    assert!(ops.is_empty(), "expected no store calls, got {ops:?}");
}

/// Asserts that the store saw `op` exactly `times` times.
///
/// # Panics
///
/// Panics if the count differs.
pub fn assert_op_count(store: &TracingContractStore, op: StoreOp, times: usize) {
    let ops = store.operations();
    let count = ops.iter().filter(|o| **o == op).count();
    assert_eq!(count, times, "expected {times} x {op:?}, got {ops:?}");
}
