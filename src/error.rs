//! Error types for the OTRS connector.
//!
//! This module defines `OtrsError`, the single error type returned by every
//! operation. Each variant maps to one failure category so callers can decide
//! whether to fix their input, retry the call, or report a remote condition.
//!
//! # Security
//!
//! Passwords and session identifiers must never appear in error messages.
//! Use `sanitize_message()` on any text that originates from the remote server
//! before storing it in an error.

use std::fmt;
use std::time::Duration;
use thiserror::Error;

use crate::templates::EnvelopeKind;

/// Coarse failure category of an [`OtrsError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The caller supplied an empty or malformed argument.
    InvalidArgument,
    /// A SOAP template could not be loaded, parsed, or serialized.
    TemplateLoad,
    /// Network or HTTP-level failure.
    Transport,
    /// The server response did not have the expected shape.
    RemoteProtocol,
    /// The server reported an error for the operation.
    RemoteOperation,
    /// The client configuration is invalid.
    Config,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::InvalidArgument => "invalid argument",
            ErrorKind::TemplateLoad => "template load",
            ErrorKind::Transport => "transport",
            ErrorKind::RemoteProtocol => "remote protocol",
            ErrorKind::RemoteOperation => "remote operation",
            ErrorKind::Config => "configuration",
        };
        f.write_str(name)
    }
}

/// Unified error type for all connector operations.
#[derive(Error, Debug)]
pub enum OtrsError {
    /// A required argument was empty or otherwise unusable.
    ///
    /// Always raised before any network I/O takes place.
    #[error("invalid argument `{field}`: {reason}")]
    InvalidArgument {
        /// Name of the offending argument.
        field: &'static str,
        /// Why the value was rejected.
        reason: String,
    },

    /// A bundled SOAP template is missing or is not well-formed XML.
    #[error("failed to load {kind} template: {reason}")]
    TemplateLoad {
        /// Which template failed.
        kind: EnvelopeKind,
        /// Details about the failure.
        reason: String,
    },

    /// HTTP request failed during transmission.
    #[error("HTTP request failed: {0}")]
    Http(#[source] reqwest::Error),

    /// HTTP client initialization failed.
    #[error("HTTP client error: {0}")]
    HttpClient(#[source] reqwest::Error),

    /// HTTP response returned a non-success status code.
    #[error("HTTP {status}: {body}")]
    HttpStatus {
        /// The HTTP status code returned.
        status: reqwest::StatusCode,
        /// The (sanitized, truncated) response body.
        body: String,
    },

    /// Request timed out.
    #[error("{action} timed out after {duration:?}")]
    Timeout {
        /// How long we waited before timing out.
        duration: Duration,
        /// The SOAP action that timed out.
        action: String,
    },

    /// The server response was not well-formed XML or lacked an expected leaf.
    #[error("remote protocol error: {0}")]
    RemoteProtocol(String),

    /// The server explicitly reported an error.
    #[error("remote error {code}: {message}")]
    RemoteOperation {
        /// `ErrorCode` text as sent by the server.
        code: String,
        /// `ErrorMessage` text as sent by the server.
        message: String,
    },

    /// Client configuration is invalid.
    #[error("configuration error: {0}")]
    Config(String),
}

impl OtrsError {
    /// Creates an invalid argument error for the named field.
    pub fn invalid_argument(field: &'static str, reason: impl Into<String>) -> Self {
        OtrsError::InvalidArgument {
            field,
            reason: reason.into(),
        }
    }

    /// Creates an invalid argument error for an empty required field.
    pub fn empty_argument(field: &'static str) -> Self {
        Self::invalid_argument(field, "must not be empty")
    }

    /// Creates a template load error.
    pub fn template_load(kind: EnvelopeKind, reason: impl Into<String>) -> Self {
        OtrsError::TemplateLoad {
            kind,
            reason: reason.into(),
        }
    }

    /// Creates a remote protocol error.
    pub fn remote_protocol(message: impl Into<String>) -> Self {
        OtrsError::RemoteProtocol(message.into())
    }

    /// Creates a remote operation error from the server's code and message.
    pub fn remote_operation(code: impl Into<String>, message: impl Into<String>) -> Self {
        OtrsError::RemoteOperation {
            code: code.into(),
            message: message.into(),
        }
    }

    /// Creates a configuration error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        OtrsError::Config(message.into())
    }

    /// Returns the failure category of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            OtrsError::InvalidArgument { .. } => ErrorKind::InvalidArgument,
            OtrsError::TemplateLoad { .. } => ErrorKind::TemplateLoad,
            OtrsError::Http(_)
            | OtrsError::HttpClient(_)
            | OtrsError::HttpStatus { .. }
            | OtrsError::Timeout { .. } => ErrorKind::Transport,
            OtrsError::RemoteProtocol(_) => ErrorKind::RemoteProtocol,
            OtrsError::RemoteOperation { .. } => ErrorKind::RemoteOperation,
            OtrsError::Config(_) => ErrorKind::Config,
        }
    }

    /// Returns true if this is a network or HTTP-level failure.
    #[must_use]
    pub fn is_transport(&self) -> bool {
        self.kind() == ErrorKind::Transport
    }

    /// Returns true if repeating the same call might succeed.
    ///
    /// The connector never retries on its own; this is a hint for callers.
    ///
    /// Retryable errors include:
    /// - Timeouts
    /// - Connection failures
    /// - HTTP 429 and 5xx responses
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            OtrsError::Timeout { .. } => true,
            OtrsError::Http(e) => e.is_timeout() || e.is_connect(),
            OtrsError::HttpStatus { status, .. } => {
                status.as_u16() == 429 || status.is_server_error()
            }
            _ => false,
        }
    }

    /// Replaces every occurrence of each secret in `message` with `[REDACTED]`.
    ///
    /// Empty secrets are ignored.
    #[must_use]
    pub fn sanitize_message(message: &str, secrets: &[&str]) -> String {
        secrets
            .iter()
            .filter(|secret| !secret.is_empty())
            .fold(message.to_string(), |acc, secret| {
                acc.replace(secret, "[REDACTED]")
            })
    }
}
