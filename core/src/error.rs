//! Error types for the Easypanel client.
//!
//! # Design
//! A call ends in exactly one of four domain outcomes (validation,
//! authentication, api, generic) or in a transport failure. Transport
//! failures keep their own type so callers can tell "the panel said no" apart
//! from "the panel was never reached". Nothing here is retried.

use std::collections::BTreeMap;
use std::time::Duration;

use thiserror::Error;

/// Field name mapped to the messages reported for it.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by every client, resource and facade operation.
#[derive(Debug, Error)]
pub enum Error {
    /// Input rejected, either before sending or by a 422 from the panel.
    #[error("{message}")]
    Validation { message: String, errors: FieldErrors },

    /// The panel returned 401.
    #[error("{message}")]
    Authentication { message: String, status: u16 },

    /// Any other non-2xx status, or an unsupported operation. `status` is
    /// `None` when the error was raised locally.
    #[error("{message}")]
    Api { message: String, status: Option<u16> },

    /// A failure that fits none of the other kinds.
    #[error("{0}")]
    Generic(String),

    /// The request never produced an HTTP response.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Discriminant of [`Error`], handy for assertions and metrics labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Validation,
    Authentication,
    Api,
    Generic,
    Transport,
}

impl Error {
    /// Validation error without field detail.
    pub fn validation(message: impl Into<String>) -> Self {
        Error::Validation {
            message: message.into(),
            errors: FieldErrors::new(),
        }
    }

    /// Validation error attributed to a single field.
    pub fn invalid_field(field: &str, message: impl Into<String>) -> Self {
        let message = message.into();
        let mut errors = FieldErrors::new();
        errors.insert(field.to_string(), vec![message.clone()]);
        Error::Validation { message, errors }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Validation { .. } => ErrorKind::Validation,
            Error::Authentication { .. } => ErrorKind::Authentication,
            Error::Api { .. } => ErrorKind::Api,
            Error::Generic(_) => ErrorKind::Generic,
            Error::Transport(_) => ErrorKind::Transport,
        }
    }

    /// Human-readable message. Never empty for errors built by this crate.
    pub fn message(&self) -> String {
        match self {
            Error::Validation { message, .. }
            | Error::Authentication { message, .. }
            | Error::Api { message, .. } => message.clone(),
            Error::Generic(message) => message.clone(),
            Error::Transport(err) => err.to_string(),
        }
    }

    /// HTTP status attached to the error, if the panel produced one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Authentication { status, .. } => Some(*status),
            Error::Api { status, .. } => *status,
            _ => None,
        }
    }

    /// Per-field messages; only validation errors carry them.
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            Error::Validation { errors, .. } => Some(errors),
            _ => None,
        }
    }
}

/// Network-level failures raised by a [`crate::http::Transport`].
#[derive(Debug, Error)]
pub enum TransportError {
    /// No response within the configured timeout.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// The host could not be resolved or refused the connection.
    #[error("connection failed: {0}")]
    Connect(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Anything else the HTTP stack reported (TLS, protocol, body read).
    #[error("transport failure: {0}")]
    Other(#[source] Box<dyn std::error::Error + Send + Sync>),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_field_records_field_entry() {
        let err = Error::invalid_field("projectName", "bad name");
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(err.message(), "bad name");
        let fields = err.field_errors().unwrap();
        assert_eq!(fields["projectName"], vec!["bad name".to_string()]);
    }

    #[test]
    fn status_is_exposed_for_remote_errors_only() {
        let auth = Error::Authentication {
            message: "nope".into(),
            status: 401,
        };
        let local = Error::Api {
            message: "Unsupported HTTP method: TRACE".into(),
            status: None,
        };
        assert_eq!(auth.status(), Some(401));
        assert_eq!(local.status(), None);
        assert_eq!(Error::validation("x").status(), None);
    }

    #[test]
    fn transport_errors_keep_their_own_kind() {
        let err: Error = TransportError::Timeout(Duration::from_secs(5)).into();
        assert_eq!(err.kind(), ErrorKind::Transport);
        assert_eq!(err.to_string(), "request timed out after 5s");
        assert!(err.field_errors().is_none());
    }

    #[test]
    fn display_is_the_plain_message() {
        let err = Error::Api {
            message: "API request failed".into(),
            status: Some(500),
        };
        assert_eq!(err.to_string(), "API request failed");
    }
}
