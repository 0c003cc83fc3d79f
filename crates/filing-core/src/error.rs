//! Error types for `filing-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("unknown document type: {0:?}")]
  UnknownDocType(String),

  #[error("unknown subject role: {0:?}")]
  UnknownSubjectRole(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
