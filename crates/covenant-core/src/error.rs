//! Error types and result aliases for Covenant.
//!
//! Errors are structured for programmatic handling: the service layer maps
//! each variant onto a wire status code, so variants describe *what* failed
//! rather than how it should be reported.

use std::fmt;

/// The result type used throughout Covenant.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in Covenant operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An invalid identifier was provided.
    #[error("invalid identifier: {message}")]
    InvalidId {
        /// Description of what made the ID invalid.
        message: String,
    },

    /// Invalid input was provided.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The requested resource was not found.
    #[error("not found: {resource_type} with id {id}")]
    ResourceNotFound {
        /// The type of resource that was not found.
        resource_type: &'static str,
        /// The identifier that was looked up.
        id: String,
    },

    /// A uniqueness constraint was violated.
    #[error("already exists: {resource_type} {name}")]
    AlreadyExists {
        /// The type of resource that collided.
        resource_type: &'static str,
        /// The conflicting natural key.
        name: String,
    },

    /// Persisted data violates an invariant (e.g. a contract without its quota).
    #[error("data integrity violation: {message}")]
    Integrity {
        /// Description of the violated invariant.
        message: String,
    },

    /// A storage operation failed.
    #[error("storage error: {message}")]
    Storage {
        /// Description of the storage failure.
        message: String,
        /// The underlying cause, if any.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A serialization or deserialization error occurred.
    #[error("serialization error: {message}")]
    Serialization {
        /// Description of the serialization failure.
        message: String,
    },

    /// A downstream collaborator could not be reached or misbehaved.
    #[error("{service} call failed: {message}")]
    Downstream {
        /// Name of the downstream service.
        service: &'static str,
        /// Description of the failure.
        message: String,
    },

    /// The operation is not wired in this deployment.
    #[error("unimplemented: {0}")]
    Unimplemented(String),

    /// An internal error occurred that should not happen in normal operation.
    #[error("internal error: {message}")]
    Internal {
        /// Description of the internal error.
        message: String,
    },
}

impl Error {
    /// Creates a new storage error with the given message.
    #[must_use]
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a new storage error with a source cause.
    #[must_use]
    pub fn storage_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Storage {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Creates a new resource not found error.
    #[must_use]
    pub fn resource_not_found(resource_type: &'static str, id: impl fmt::Display) -> Self {
        Self::ResourceNotFound {
            resource_type,
            id: id.to_string(),
        }
    }

    /// Creates a new downstream failure.
    #[must_use]
    pub fn downstream(service: &'static str, message: impl Into<String>) -> Self {
        Self::Downstream {
            service,
            message: message.into(),
        }
    }

    /// Returns true if this error reports a missing resource.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::ResourceNotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as StdError;

    #[test]
    fn storage_with_source_keeps_cause() {
        let io = std::io::Error::other("disk full");
        let err = Error::storage_with_source("insert contract", io);
        assert_eq!(err.to_string(), "storage error: insert contract");
        assert!(err.source().is_some());
    }

    #[test]
    fn not_found_message_names_resource() {
        let err = Error::resource_not_found("contract", "abc");
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "not found: contract with id abc");
    }

    #[test]
    fn downstream_message_names_service() {
        let err = Error::downstream("workflow", "connection refused");
        assert_eq!(err.to_string(), "workflow call failed: connection refused");
        assert!(!err.is_not_found());
    }
}
