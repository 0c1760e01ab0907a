//! Observability infrastructure for Covenant.
//!
//! Structured logging with consistent spans. Every contract-scoped operation
//! runs inside a [`contract_span`]; the creation saga runs inside a
//! [`saga_span`] so the provisioning and workflow steps share one context.

use std::sync::Once;
use tracing::Span;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

static INIT: Once = Once::new();

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// JSON structured logs (for production).
    Json,
    /// Pretty-printed logs (for development).
    #[default]
    Pretty,
}

/// Initializes the logging subsystem.
///
/// Call once at application startup. Safe to call multiple times;
/// subsequent calls are no-ops.
///
/// # Environment Variables
///
/// - `RUST_LOG`: Controls log levels (e.g., `info`, `covenant_service=debug`)
///
/// # Example
///
/// ```rust
/// use covenant_core::observability::{init_logging, LogFormat};
///
/// init_logging(LogFormat::Pretty);
/// ```
pub fn init_logging(format: LogFormat) {
    INIT.call_once(|| {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        // try_init: a test harness may already have installed a subscriber.
        let _ = match format {
            LogFormat::Json => tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json())
                .try_init(),
            LogFormat::Pretty => tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().pretty())
                .try_init(),
        };
    });
}

/// Creates a span for a single contract-scoped operation.
///
/// # Example
///
/// ```rust
/// use covenant_core::observability::contract_span;
///
/// let span = contract_span("update_quota", "1b4e28ba-2fa1-11d2-883f-0016d3cca427");
/// let _guard = span.enter();
/// ```
#[must_use]
pub fn contract_span(operation: &str, contract_id: &str) -> Span {
    tracing::info_span!("contract", op = operation, contract_id = contract_id)
}

/// Creates a span for the contract creation saga.
///
/// `contract_id` starts empty and is recorded once the store assigns it.
#[must_use]
pub fn saga_span(contractor_name: &str) -> Span {
    tracing::info_span!(
        "create_contract",
        contractor = contractor_name,
        contract_id = tracing::field::Empty,
    )
}
