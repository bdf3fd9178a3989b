//! Domain-level error types.
//!
//! These errors are transport agnostic. Inbound adapters map them to HTTP
//! responses. Each error carries a stable [`ErrorCode`] and a field-keyed map
//! of user-facing messages, so clients can attach messages to the form field
//! that caused them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::TraceId;

/// Key used for messages that are not tied to a single field.
pub const GLOBAL_FIELD: &str = "global";

/// Stable machine-readable error code describing the failure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// The request is malformed or fails validation.
    InvalidRequest,
    /// Authentication failed or is missing.
    Unauthorized,
    /// Authenticated but not permitted to perform this action.
    Forbidden,
    /// The requested resource does not exist.
    NotFound,
    /// The operation was already carried out and cannot be repeated.
    AlreadyProcessed,
    /// The resource is in a terminal state (cancelled or consumed).
    Gone,
    /// A backing service is temporarily unavailable.
    ServiceUnavailable,
    /// An unexpected error occurred inside the domain.
    InternalError,
}

/// Field-keyed messages attached to an [`Error`].
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// Domain error payload.
///
/// ## Invariants
/// - `errors` holds at least one field with at least one message.
///
/// # Examples
/// ```
/// use backend::domain::{Error, ErrorCode};
///
/// let err = Error::gone("booking", "Cette réservation a été annulée");
/// assert_eq!(err.code(), ErrorCode::Gone);
/// assert_eq!(err.messages("booking"), ["Cette réservation a été annulée"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Error {
    code: ErrorCode,
    errors: FieldErrors,
    trace_id: Option<String>,
}

impl Error {
    /// Create an error with a single message on `field`.
    ///
    /// The trace identifier in scope (if any) is captured automatically.
    pub fn new(code: ErrorCode, field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = FieldErrors::new();
        errors.insert(field.into(), vec![message.into()]);
        Self {
            code,
            errors,
            trace_id: TraceId::current().map(|id| id.to_string()),
        }
    }

    /// Append another message, keeping the original code.
    ///
    /// # Examples
    /// ```
    /// use backend::domain::Error;
    ///
    /// let err = Error::invalid_request("latitude", "Format incorrect")
    ///     .with_error("longitude", "Format incorrect");
    /// assert_eq!(err.errors().len(), 2);
    /// ```
    #[must_use]
    pub fn with_error(mut self, field: impl Into<String>, message: impl Into<String>) -> Self {
        self.errors
            .entry(field.into())
            .or_default()
            .push(message.into());
        self
    }

    /// Attach an explicit trace identifier.
    #[must_use]
    pub fn with_trace_id(mut self, trace_id: impl Into<String>) -> Self {
        self.trace_id = Some(trace_id.into());
        self
    }

    /// Stable machine-readable error code.
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// Every message keyed by field.
    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    /// Messages attached to `field`, empty when none.
    pub fn messages(&self, field: &str) -> &[String] {
        self.errors.get(field).map_or(&[], Vec::as_slice)
    }

    /// Correlation identifier captured when the error was raised.
    pub fn trace_id(&self) -> Option<&str> {
        self.trace_id.as_deref()
    }

    /// Convenience constructor for [`ErrorCode::InvalidRequest`].
    pub fn invalid_request(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidRequest, field, message)
    }

    /// Convenience constructor for [`ErrorCode::Unauthorized`].
    pub fn unauthorized(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unauthorized, field, message)
    }

    /// Convenience constructor for [`ErrorCode::Forbidden`].
    pub fn forbidden(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Forbidden, field, message)
    }

    /// Convenience constructor for [`ErrorCode::NotFound`].
    pub fn not_found(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, field, message)
    }

    /// Convenience constructor for [`ErrorCode::AlreadyProcessed`].
    pub fn already_processed(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorCode::AlreadyProcessed, field, message)
    }

    /// Convenience constructor for [`ErrorCode::Gone`].
    pub fn gone(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Gone, field, message)
    }

    /// Convenience constructor for [`ErrorCode::ServiceUnavailable`].
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ServiceUnavailable, GLOBAL_FIELD, message)
    }

    /// Convenience constructor for [`ErrorCode::InternalError`].
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, GLOBAL_FIELD, message)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (field, messages) in &self.errors {
            for message in messages {
                if !first {
                    f.write_str("; ")?;
                }
                write!(f, "{field}: {message}")?;
                first = false;
            }
        }
        Ok(())
    }
}

impl std::error::Error for Error {}

/// Accumulates field errors before deciding whether to fail.
///
/// Validation routines that report every faulty field at once push into a
/// collector and convert it with [`ErrorCollector::into_result`].
#[derive(Debug, Default)]
pub struct ErrorCollector {
    errors: FieldErrors,
}

impl ErrorCollector {
    /// Start an empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a message on `field`.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors
            .entry(field.into())
            .or_default()
            .push(message.into());
    }

    /// Whether no message was recorded.
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Return `Ok(())` when empty, otherwise an error with `code`.
    pub fn into_result(self, code: ErrorCode) -> Result<(), Error> {
        let mut fields = self.errors.into_iter();
        let Some((field, messages)) = fields.next() else {
            return Ok(());
        };
        let mut messages = messages.into_iter();
        let first = messages.next().unwrap_or_default();
        let mut error = Error::new(code, field.clone(), first);
        for message in messages {
            error = error.with_error(field.clone(), message);
        }
        for (other, other_messages) in fields {
            for message in other_messages {
                error = error.with_error(other.clone(), message);
            }
        }
        Err(error)
    }
}
