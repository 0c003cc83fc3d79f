//! Error types and axum `IntoResponse` implementation.
//!
//! Every failure is reported to the caller as `{"error": "..."}`; nothing is
//! retried and nothing is written to a durable log.

use axum::{
  Json,
  http::{HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
};
use filing_core::store::LedgerError;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// No session, or the session's user is no longer in the ledger.
  #[error("unauthorized")]
  Unauthorized,
  #[error("invalid username or password")]
  InvalidCredentials,
  #[error("forbidden: {0}")]
  Forbidden(String),
  #[error("not found: {0}")]
  NotFound(String),
  #[error("conflict: {0}")]
  Conflict(String),
  #[error("bad request: {0}")]
  BadRequest(String),
  #[error("content error: {0}")]
  Content(#[from] filing_content::Error),
  #[error("seed file error: {0}")]
  Seed(#[from] filing_seed::Error),
  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
  #[error("internal error: {0}")]
  Internal(String),
}

impl Error {
  /// Map a backend error, keeping unique-key collisions recoverable.
  pub fn store<E: LedgerError>(e: E) -> Self {
    if e.is_conflict() {
      Self::Conflict(e.to_string())
    } else {
      Self::Store(Box::new(e))
    }
  }
}

/// Unparseable role or document type in a request.
impl From<filing_core::Error> for Error {
  fn from(e: filing_core::Error) -> Self { Self::BadRequest(e.to_string()) }
}

impl IntoResponse for Error {
  fn into_response(self) -> Response {
    let status = match &self {
      Error::Unauthorized | Error::InvalidCredentials => StatusCode::UNAUTHORIZED,
      Error::Forbidden(_) => StatusCode::FORBIDDEN,
      Error::NotFound(_) => StatusCode::NOT_FOUND,
      Error::Conflict(_) => StatusCode::CONFLICT,
      Error::BadRequest(_) => StatusCode::BAD_REQUEST,
      Error::Content(filing_content::Error::NotFound(_)) => StatusCode::NOT_FOUND,
      Error::Content(filing_content::Error::InvalidComponent { .. }) => StatusCode::BAD_REQUEST,
      Error::Content(_) | Error::Seed(_) | Error::Store(_) | Error::Internal(_) => {
        StatusCode::INTERNAL_SERVER_ERROR
      }
    };

    if status.is_server_error() {
      tracing::error!(error = %self, "request failed");
    }

    let message = match &self {
      Error::NotFound(m) | Error::Conflict(m) | Error::BadRequest(m) | Error::Forbidden(m) => {
        m.clone()
      }
      other => other.to_string(),
    };

    let mut res = (status, Json(json!({ "error": message }))).into_response();
    if matches!(self, Error::Unauthorized) {
      res.headers_mut().insert(
        header::WWW_AUTHENTICATE,
        HeaderValue::from_static("Bearer realm=\"filing\""),
      );
    }
    res
  }
}
