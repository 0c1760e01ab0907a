//! Outcome codes and the service-level error type.
//!
//! Every orchestrator operation fails with a [`ServiceError`]: a status code
//! plus a human-readable message. Codes follow gRPC numbering so statuses
//! returned by downstream services can be forwarded unchanged.

use std::fmt;

use covenant_core::Error;

/// Outcome code of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum StatusCode {
    /// Success.
    Ok = 0,
    /// Cancelled by the caller.
    Cancelled = 1,
    /// Unknown error.
    Unknown = 2,
    /// Invalid argument.
    InvalidArgument = 3,
    /// Deadline exceeded.
    DeadlineExceeded = 4,
    /// Entity not found.
    NotFound = 5,
    /// Entity already exists.
    AlreadyExists = 6,
    /// Permission denied.
    PermissionDenied = 7,
    /// Resource exhausted.
    ResourceExhausted = 8,
    /// Failed precondition.
    FailedPrecondition = 9,
    /// Aborted.
    Aborted = 10,
    /// Out of range.
    OutOfRange = 11,
    /// Not implemented or not wired.
    Unimplemented = 12,
    /// Internal error.
    Internal = 13,
    /// Unavailable.
    Unavailable = 14,
    /// Data loss.
    DataLoss = 15,
    /// Unauthenticated.
    Unauthenticated = 16,
}

impl StatusCode {
    /// Returns the wire number of this code.
    #[must_use]
    pub const fn as_i32(self) -> i32 {
        self as i32
    }

    /// Maps a wire number back to a code. Unknown numbers become [`Self::Unknown`].
    #[must_use]
    pub const fn from_i32(value: i32) -> Self {
        match value {
            0 => Self::Ok,
            1 => Self::Cancelled,
            3 => Self::InvalidArgument,
            4 => Self::DeadlineExceeded,
            5 => Self::NotFound,
            6 => Self::AlreadyExists,
            7 => Self::PermissionDenied,
            8 => Self::ResourceExhausted,
            9 => Self::FailedPrecondition,
            10 => Self::Aborted,
            11 => Self::OutOfRange,
            12 => Self::Unimplemented,
            13 => Self::Internal,
            14 => Self::Unavailable,
            15 => Self::DataLoss,
            16 => Self::Unauthenticated,
            _ => Self::Unknown,
        }
    }

    /// Returns true for [`Self::Ok`].
    #[must_use]
    pub const fn is_ok(self) -> bool {
        matches!(self, Self::Ok)
    }

    const fn name(self) -> &'static str {
        match self {
            Self::Ok => "OK",
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

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A failed operation: status code plus message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{status}: {message}")]
pub struct ServiceError {
    /// Outcome code; never [`StatusCode::Ok`].
    pub status: StatusCode,
    /// Human-readable description.
    pub message: String,
}

impl ServiceError {
    /// Creates an error with the given status.
    #[must_use]
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// Creates an `INVALID_ARGUMENT` error.
    #[must_use]
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(StatusCode::InvalidArgument, message)
    }

    /// Creates a `NOT_FOUND` error.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NotFound, message)
    }

    /// Creates an `INTERNAL` error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::Internal, message)
    }

    /// Creates an `UNIMPLEMENTED` error.
    #[must_use]
    pub fn unimplemented(message: impl Into<String>) -> Self {
        Self::new(StatusCode::Unimplemented, message)
    }
}

impl From<Error> for ServiceError {
    fn from(err: Error) -> Self {
        let status = match &err {
            Error::InvalidId { .. } | Error::InvalidInput(_) => StatusCode::InvalidArgument,
            Error::ResourceNotFound { .. } => StatusCode::NotFound,
            Error::AlreadyExists { .. } => StatusCode::AlreadyExists,
            Error::Unimplemented(_) => StatusCode::Unimplemented,
            Error::Integrity { .. }
            | Error::Storage { .. }
            | Error::Serialization { .. }
            | Error::Downstream { .. }
            | Error::Internal { .. } => StatusCode::Internal,
        };
        Self::new(status, err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_errors_map_to_status() {
        let cases = [
            (
                Error::InvalidId {
                    message: "x".into(),
                },
                StatusCode::InvalidArgument,
            ),
            (Error::InvalidInput("x".into()), StatusCode::InvalidArgument),
            (
                Error::resource_not_found("contract", "x"),
                StatusCode::NotFound,
            ),
            (
                Error::AlreadyExists {
                    resource_type: "contract",
                    name: "x".into(),
                },
                StatusCode::AlreadyExists,
            ),
            (Error::storage("disk"), StatusCode::Internal),
            (
                Error::Integrity {
                    message: "x".into(),
                },
                StatusCode::Internal,
            ),
            (Error::downstream("workflow", "x"), StatusCode::Internal),
            (Error::Unimplemented("x".into()), StatusCode::Unimplemented),
        ];

        for (err, expected) in cases {
            assert_eq!(ServiceError::from(err).status, expected);
        }
    }

    #[test]
    fn wire_numbers_roundtrip() {
        for n in 0..=16 {
            assert_eq!(StatusCode::from_i32(n).as_i32(), n);
        }
        assert_eq!(StatusCode::from_i32(42), StatusCode::Unknown);
    }

    #[test]
    fn display_includes_status_name() {
        let err = ServiceError::not_found("contract abc");
        assert_eq!(err.to_string(), "NOT_FOUND: contract abc");
    }
}
