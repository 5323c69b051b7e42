//! Error types for `perfil-core`.

use thiserror::Error;

use crate::field::Field;

// ─── Request failures ────────────────────────────────────────────────────────

/// Operator-facing detail about a failed request.
///
/// Produced by the [`ProfileClient`](crate::client::ProfileClient)
/// implementation; the form only ever logs it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
  /// The service answered with a non-success status.
  Response {
    status:  u16,
    headers: Vec<(String, String)>,
    body:    String,
  },
  /// The request never produced a response (connect, timeout, TLS, …).
  Request {
    method: String,
    url:    String,
    detail: String,
  },
  /// Anything else, e.g. a body that failed to deserialise.
  Message(String),
}

impl Diagnostic {
  /// Emit this diagnostic on the operator log under `action`.
  pub fn log(&self, action: &str, summary: &str) {
    match self {
      Diagnostic::Response {
        status,
        headers,
        body,
      } => tracing::error!(
        action,
        status,
        ?headers,
        body = body.as_str(),
        "{summary}"
      ),
      Diagnostic::Request {
        method,
        url,
        detail,
      } => tracing::error!(
        action,
        method = method.as_str(),
        url = url.as_str(),
        detail = detail.as_str(),
        "{summary}"
      ),
      Diagnostic::Message(message) => {
        tracing::error!(action, message = message.as_str(), "{summary}")
      }
    }
  }
}

/// A network or HTTP failure, already reduced to a one-line summary plus the
/// detail needed to debug it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{summary}")]
pub struct RequestFailed {
  pub summary:    String,
  pub diagnostic: Diagnostic,
}

impl RequestFailed {
  pub fn new(summary: impl Into<String>, diagnostic: Diagnostic) -> Self {
    Self {
      summary: summary.into(),
      diagnostic,
    }
  }
}

// ─── Form errors ─────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum Error {
  #[error("Not authenticated")]
  Unauthenticated,

  #[error(transparent)]
  RequestFailed(#[from] RequestFailed),

  #[error("{label} is required", label = .0.label())]
  MissingField(Field),

  #[error("{label} must be a date (YYYY-MM-DD), got {value:?}", label = .field.label())]
  InvalidDate { field: Field, value: String },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
