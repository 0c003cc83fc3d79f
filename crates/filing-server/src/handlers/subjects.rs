//! Handlers for `/api/subjects` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/api/subjects` | roster; optional `?q=` |
//! | `POST`   | `/api/subjects` | admin only; 409 on a duplicate code |
//! | `DELETE` | `/api/subjects/{code}` | admin only; file rows are kept |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
};
use filing_core::{
  access::permissions,
  search::filter,
  store::LedgerStore,
  subject::{NewSubject, Subject},
  user::User,
};

use super::SearchParams;
use crate::{AppState, auth::Authenticated, error::Error};

pub(crate) fn require_manage(user: &User) -> Result<(), Error> {
  if permissions(&user.role).manage {
    Ok(())
  } else {
    Err(Error::Forbidden(format!("role {} cannot manage the portal", user.role)))
  }
}

/// `GET /api/subjects[?q=<text>]`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  auth: Authenticated,
  Query(params): Query<SearchParams>,
) -> Result<Json<Vec<Subject>>, Error>
where
  S: LedgerStore + Clone + Send + Sync + 'static,
{
  if !permissions(&auth.user.role).view_subjects {
    return Err(Error::Forbidden(format!("role {} cannot view subjects", auth.user.role)));
  }
  let subjects = state.store.list_subjects().await.map_err(Error::store)?;
  Ok(Json(filter(subjects, params.q.as_deref())))
}

/// `POST /api/subjects`, body: a subject with at least `code` and `name`.
pub async fn create<S>(
  State(state): State<AppState<S>>,
  auth: Authenticated,
  Json(mut body): Json<NewSubject>,
) -> Result<(StatusCode, Json<Subject>), Error>
where
  S: LedgerStore + Clone + Send + Sync + 'static,
{
  require_manage(&auth.user)?;
  body.code = body.code.trim().to_owned();
  body.name = body.name.trim().to_owned();
  if body.code.is_empty() || body.name.is_empty() {
    return Err(Error::BadRequest("subject code and name are required".into()));
  }

  let subject = state.store.add_subject(body).await.map_err(Error::store)?;
  tracing::info!(code = %subject.code, by = %auth.user.username, "subject added");
  Ok((StatusCode::CREATED, Json(subject)))
}

/// `DELETE /api/subjects/{code}`
pub async fn remove<S>(
  State(state): State<AppState<S>>,
  auth: Authenticated,
  Path(code): Path<String>,
) -> Result<StatusCode, Error>
where
  S: LedgerStore + Clone + Send + Sync + 'static,
{
  require_manage(&auth.user)?;
  if !state.store.delete_subject(&code).await.map_err(Error::store)? {
    return Err(Error::NotFound(format!("subject {code} not found")));
  }

  tracing::info!(%code, by = %auth.user.username, "subject removed");
  Ok(StatusCode::NO_CONTENT)
}
