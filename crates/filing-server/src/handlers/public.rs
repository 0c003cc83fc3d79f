//! Unauthenticated handlers under `/public`.
//!
//! The document listing is a filesystem scan and never touches the ledger.
//! Missing data is reported as `"available": false` with a message rather
//! than as an error.

use axum::{
  Json,
  extract::{Path, Query, State},
  response::Response,
};
use filing_content::public::{PublicEntry, find_public, list_public};
use filing_core::{search::filter, store::LedgerStore};
use filing_seed::SubjectRow;
use serde::Serialize;

use super::{SearchParams, attachment};
use crate::{AppState, error::Error};

async fn blocking<T, F>(f: F) -> Result<T, Error>
where
  F: FnOnce() -> T + Send + 'static,
  T: Send + 'static,
{
  tokio::task::spawn_blocking(f)
    .await
    .map_err(|e| Error::Internal(format!("blocking task failed: {e}")))
}

#[derive(Debug, Serialize)]
pub struct Listing<T> {
  pub available: bool,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub message:   Option<String>,
  pub rows:      Vec<T>,
}

impl<T> Listing<T> {
  fn available(rows: Vec<T>) -> Self { Self { available: true, message: None, rows } }

  fn unavailable(message: String) -> Self {
    Self { available: false, message: Some(message), rows: Vec::new() }
  }
}

/// `GET /public/documents[?q=<text>]`
pub async fn documents<S>(
  State(state): State<AppState<S>>,
  Query(params): Query<SearchParams>,
) -> Result<Json<Listing<PublicEntry>>, Error>
where
  S: LedgerStore + Clone + Send + Sync + 'static,
{
  let root = state.content.layout().public_dir();
  let listing = blocking(move || list_public(&root)).await??;
  Ok(Json(match listing {
    Some(entries) => Listing::available(filter(entries, params.q.as_deref())),
    None => Listing::unavailable("no public documents are available yet".into()),
  }))
}

/// `GET /public/files/{*path}`
///
/// Serves only files the listing shows.
pub async fn file<S>(
  State(state): State<AppState<S>>,
  Path(relative): Path<String>,
) -> Result<Response, Error>
where
  S: LedgerStore + Clone + Send + Sync + 'static,
{
  let root = state.content.layout().public_dir();
  let key = relative.clone();
  let entry = blocking(move || find_public(&root, &key))
    .await??
    .ok_or_else(|| Error::NotFound(format!("public document {relative} not found")))?;

  let bytes = state.content.read(&entry.path).await?;
  attachment(bytes, &entry.filename, None)
}

/// `GET /public/appointments[?q=<text>]`, the LIC/RP appointment table.
pub async fn appointments<S>(
  State(state): State<AppState<S>>,
  Query(params): Query<SearchParams>,
) -> Result<Json<Listing<SubjectRow>>, Error>
where
  S: LedgerStore + Clone + Send + Sync + 'static,
{
  let path = state.config.appointments_path();
  let read_path = path.clone();
  let result = blocking(move || filing_seed::read_subjects_file(read_path)).await?;

  Ok(Json(match result {
    Ok(rows) => Listing::available(filter(rows, params.q.as_deref())),
    Err(filing_seed::Error::Missing(_)) => {
      Listing::unavailable("the appointment table has not been published".into())
    }
    Err(e) => {
      tracing::warn!(path = %path.display(), error = %e, "cannot read appointment table");
      Listing::unavailable(format!("the appointment table could not be read: {e}"))
    }
  }))
}
