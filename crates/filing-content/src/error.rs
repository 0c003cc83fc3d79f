//! Error type for `filing-content`.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("io error: {0}")]
  Io(#[from] std::io::Error),

  #[error("file not found: {0}")]
  NotFound(PathBuf),

  /// A filename component that would escape its directory or is empty.
  #[error("invalid {field}: {value:?}")]
  InvalidComponent { field: &'static str, value: String },

  #[error("directory walk failed: {0}")]
  Walk(#[from] walkdir::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
