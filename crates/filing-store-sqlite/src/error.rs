//! Error type for `filing-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] filing_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// A subject with this code already exists. Carries the store's message.
  #[error("subject {code:?} already exists: {message}")]
  DuplicateSubject { code: String, message: String },

  #[error("username {username:?} already exists: {message}")]
  DuplicateUser { username: String, message: String },
}

impl filing_core::store::LedgerError for Error {
  fn is_conflict(&self) -> bool {
    matches!(self, Self::DuplicateSubject { .. } | Self::DuplicateUser { .. })
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
