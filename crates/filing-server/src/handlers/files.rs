//! Handlers for `/api/files` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/api/files` | multipart: `subject_code`, `role`, `doc_type`, `semester`, `file` |
//! | `GET`  | `/api/files` | archive, scoped to the caller's role; optional `?q=` |
//! | `GET`  | `/api/files/{id}/download` | 404 unless the row is visible and on disk |

use std::path::Path as FsPath;

use axum::{
  Json,
  extract::{Multipart, Path, Query, State},
  http::StatusCode,
  response::Response,
};
use bytes::Bytes;
use filing_content::UploadMeta;
use filing_core::{
  access::{Scope, can_see, permissions, scope_for},
  file_item::{DocType, FileItem, NewFileItem, SubjectRole},
  search,
  store::LedgerStore,
};
use serde::Serialize;

use super::{SearchParams, attachment};
use crate::{AppState, auth::Authenticated, error::Error};

// ─── Upload ───────────────────────────────────────────────────────────────────

#[derive(Default)]
struct UploadForm {
  subject_code: Option<String>,
  role:         Option<String>,
  doc_type:     Option<String>,
  semester:     Option<String>,
  file:         Option<(String, Bytes)>,
}

impl UploadForm {
  async fn read(mut multipart: Multipart) -> Result<Self, Error> {
    let bad = |e: axum::extract::multipart::MultipartError| Error::BadRequest(e.body_text());
    let mut form = Self::default();
    while let Some(field) = multipart.next_field().await.map_err(bad)? {
      let Some(name) = field.name().map(str::to_owned) else {
        continue;
      };
      match name.as_str() {
        "file" => {
          let filename = field.file_name().unwrap_or_default().to_owned();
          let data = field.bytes().await.map_err(bad)?;
          form.file = Some((filename, data));
        }
        "subject_code" => form.subject_code = Some(field.text().await.map_err(bad)?),
        "role" => form.role = Some(field.text().await.map_err(bad)?),
        "doc_type" => form.doc_type = Some(field.text().await.map_err(bad)?),
        "semester" => form.semester = Some(field.text().await.map_err(bad)?),
        other => tracing::debug!(field = other, "ignoring unknown upload field"),
      }
    }
    Ok(form)
  }
}

fn required(value: Option<String>, field: &str) -> Result<String, Error> {
  value
    .map(|v| v.trim().to_owned())
    .filter(|v| !v.is_empty())
    .ok_or_else(|| Error::BadRequest(format!("missing field: {field}")))
}

/// `POST /api/files`
///
/// Writes the bytes through the content store, then appends a ledger row.
/// Every accepted upload gets a new row, even when identical bytes were
/// already on disk.
pub async fn upload<S>(
  State(state): State<AppState<S>>,
  auth: Authenticated,
  multipart: Multipart,
) -> Result<(StatusCode, Json<FileItem>), Error>
where
  S: LedgerStore + Clone + Send + Sync + 'static,
{
  if !permissions(&auth.user.role).upload {
    return Err(Error::Forbidden(format!("role {} cannot upload", auth.user.role)));
  }
  if state.store.count_subjects().await.map_err(Error::store)? == 0 {
    return Err(Error::BadRequest(
      "no subjects registered; ask an administrator to add one".into(),
    ));
  }

  let form = UploadForm::read(multipart).await?;
  let subject_code = required(form.subject_code, "subject_code")?;
  let role: SubjectRole = required(form.role, "role")?.parse()?;
  let doc_type: DocType = required(form.doc_type, "doc_type")?.parse()?;
  // Free text; a blank semester is stored as-is.
  let semester = form.semester.map(|v| v.trim().to_owned()).unwrap_or_default();
  let (filename, bytes) = form
    .file
    .filter(|(name, _)| !name.is_empty())
    .ok_or_else(|| Error::BadRequest("missing field: file".into()))?;

  if state.store.get_subject(&subject_code).await.map_err(Error::store)?.is_none() {
    return Err(Error::NotFound(format!("subject {subject_code} not found")));
  }

  let stored = state
    .content
    .store(&bytes, &UploadMeta {
      subject_code: &subject_code,
      role,
      doc_type,
      semester: &semester,
      original_filename: &filename,
    })
    .await?;

  let item = state
    .store
    .record_file(NewFileItem {
      subject_code,
      uploader_username: auth.user.username,
      role,
      doc_type,
      semester,
      path: stored.path.to_string_lossy().into_owned(),
      sha256: stored.sha256,
    })
    .await
    .map_err(Error::store)?;

  tracing::info!(
    id = item.id,
    subject = %item.subject_code,
    doc_type = %item.doc_type,
    uploader = %item.uploader_username,
    written = stored.written,
    "recorded upload"
  );
  Ok((StatusCode::CREATED, Json(item)))
}

// ─── Archive ──────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct ArchiveRow {
  #[serde(flatten)]
  pub item:    FileItem,
  /// `false` when the stored path no longer resolves to a file.
  pub on_disk: bool,
}

/// `GET /api/files[?q=<text>]`, newest first.
pub async fn archive<S>(
  State(state): State<AppState<S>>,
  auth: Authenticated,
  Query(params): Query<SearchParams>,
) -> Result<Json<Vec<ArchiveRow>>, Error>
where
  S: LedgerStore + Clone + Send + Sync + 'static,
{
  let user = &auth.user;
  let rows = match scope_for(&user.role) {
    Scope::Own => state.store.files_by_uploader(&user.username).await,
    Scope::All => state.store.list_files().await,
  }
  .map_err(Error::store)?;

  let rows = search::archive(&user.role, &user.username, rows, params.q.as_deref());

  let mut out = Vec::with_capacity(rows.len());
  for item in rows {
    let on_disk = state.content.exists(&item.path).await;
    out.push(ArchiveRow { item, on_disk });
  }
  Ok(Json(out))
}

// ─── Download ─────────────────────────────────────────────────────────────────

/// `GET /api/files/{id}/download`
///
/// Rows outside the caller's scope are reported exactly like unknown ids.
pub async fn download<S>(
  State(state): State<AppState<S>>,
  auth: Authenticated,
  Path(id): Path<i64>,
) -> Result<Response, Error>
where
  S: LedgerStore + Clone + Send + Sync + 'static,
{
  let not_found = || Error::NotFound(format!("file {id} not found"));
  let item = state
    .store
    .get_file(id)
    .await
    .map_err(Error::store)?
    .filter(|item| can_see(&auth.user.role, &auth.user.username, item))
    .ok_or_else(not_found)?;

  let bytes = match state.content.read(&item.path).await {
    Ok(bytes) => bytes,
    Err(filing_content::Error::NotFound(path)) => {
      tracing::warn!(id, path = %path.display(), "ledger row points at a missing file");
      return Err(not_found());
    }
    Err(e) => return Err(e.into()),
  };

  let filename = FsPath::new(&item.path)
    .file_name()
    .map(|n| n.to_string_lossy().into_owned())
    .unwrap_or_else(|| format!("file-{id}"));
  attachment(bytes, &filename, Some(&item.sha256))
}
