use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::tables::Tables;

/// Structured error block reported by the provider for a security or a field.
///
/// The three parts are copied verbatim from the response; nothing is normalized.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Broad error class, e.g. `BAD_SEC` or `BAD_FLD`.
    pub category: String,
    /// Finer classification, e.g. `INVALID_SECURITY`.
    pub subcategory: String,
    /// Human-readable message.
    pub message: String,
}

impl ErrorInfo {
    /// Build an error block from its three parts.
    pub fn new(
        category: impl Into<String>,
        subcategory: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            category: category.into(),
            subcategory: subcategory.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}: {}", self.category, self.subcategory, self.message)
    }
}

/// Unified error type for the blpd workspace.
///
/// Per-security and per-field failures reported by the provider are *not*
/// errors: they are routed into the exception table. Only local validation,
/// session lifecycle, and protocol failures surface here.
#[derive(Debug, Error, Serialize, Deserialize, Clone, PartialEq)]
#[non_exhaustive]
pub enum BlpError {
    /// The topic prefix is not one of the supported identifier namespaces.
    #[error("invalid security prefix: '{prefix}'")]
    InvalidPrefix {
        /// The rejected prefix as supplied by the caller.
        prefix: String,
    },

    /// A per-security prefix list does not line up with the securities.
    #[error("prefix list length {actual} does not match {expected} securities")]
    LengthMismatch {
        /// Number of securities.
        expected: usize,
        /// Number of prefixes supplied.
        actual: usize,
    },

    /// Overrides were not a mapping of field ids to scalar values.
    #[error("invalid overrides: {0}")]
    InvalidOverrides(String),

    /// A short-code option was not recognized for its group.
    #[error("invalid {group} option: '{code}'")]
    InvalidOption {
        /// Option group that failed, e.g. "periodicity selection".
        group: String,
        /// The unrecognized code.
        code: String,
    },

    /// A date bound could not be parsed or the range is inverted.
    #[error("invalid date: {0}")]
    InvalidDate(String),

    /// Invalid input argument.
    #[error("invalid argument: {0}")]
    InvalidArg(String),

    /// The gateway could not establish a session.
    #[error("{gateway} connection failed: {msg}")]
    ConnectionFailed {
        /// Gateway name that failed.
        gateway: String,
        /// Human-readable error message.
        msg: String,
    },

    /// The session started but the reference-data service could not be opened.
    #[error("service unavailable: {service}")]
    ServiceUnavailable {
        /// Service name, e.g. `//blp/refdata`.
        service: String,
    },

    /// A request was attempted without an active session and auto-open is disabled.
    #[error("session is not open")]
    NotConnected,

    /// A response message did not have the expected structure.
    ///
    /// Aggregation stops at the offending message; `partial` holds whatever
    /// had been collected before it.
    #[error("unexpected message shape: {detail}")]
    UnexpectedMessageShape {
        /// Diagnostic describing what was missing or malformed.
        detail: String,
        /// Tables assembled from the messages consumed before the failure.
        partial: Box<Tables>,
    },

    /// The provider rejected the request as a whole.
    #[error("request failed: {0}")]
    RequestFailed(ErrorInfo),

    /// The overall request exceeded the configured deadline.
    #[error("request timed out: {operation}")]
    RequestTimeout {
        /// Operation label, e.g. "ReferenceDataRequest".
        operation: String,
    },
}

impl BlpError {
    /// Helper: build an `InvalidOption` error for a group and the rejected code.
    pub fn invalid_option(group: impl Into<String>, code: impl Into<String>) -> Self {
        Self::InvalidOption {
            group: group.into(),
            code: code.into(),
        }
    }

    /// Helper: build a `ConnectionFailed` error with the gateway name and message.
    pub fn connection_failed(gateway: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::ConnectionFailed {
            gateway: gateway.into(),
            msg: msg.into(),
        }
    }

    /// Helper: build a `ServiceUnavailable` error.
    pub fn service_unavailable(service: impl Into<String>) -> Self {
        Self::ServiceUnavailable {
            service: service.into(),
        }
    }

    /// Helper: build a `RequestTimeout` error.
    #[must_use]
    pub fn request_timeout(operation: impl Into<String>) -> Self {
        Self::RequestTimeout {
            operation: operation.into(),
        }
    }

    /// Returns true for failures raised while validating user input, before
    /// anything was sent to the provider.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidPrefix { .. }
                | Self::LengthMismatch { .. }
                | Self::InvalidOverrides(_)
                | Self::InvalidOption { .. }
                | Self::InvalidDate(_)
                | Self::InvalidArg(_)
        )
    }

    /// Returns true for session lifecycle failures.
    #[must_use]
    pub const fn is_session(&self) -> bool {
        matches!(
            self,
            Self::ConnectionFailed { .. } | Self::ServiceUnavailable { .. } | Self::NotConnected
        )
    }

    /// Tables collected before a fatal protocol failure, if any.
    #[must_use]
    pub fn partial(&self) -> Option<&Tables> {
        match self {
            Self::UnexpectedMessageShape { partial, .. } => Some(partial),
            _ => None,
        }
    }
}
