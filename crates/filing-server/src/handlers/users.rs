//! Handler for `GET /api/users`.

use axum::{
  Json,
  extract::{Query, State},
};
use filing_core::{search::filter, store::LedgerStore, user::User};

use super::{SearchParams, subjects::require_manage};
use crate::{AppState, auth::Authenticated, error::Error};

/// `GET /api/users[?q=<text>]`
///
/// Password hashes are never serialised.
pub async fn list<S>(
  State(state): State<AppState<S>>,
  auth: Authenticated,
  Query(params): Query<SearchParams>,
) -> Result<Json<Vec<User>>, Error>
where
  S: LedgerStore + Clone + Send + Sync + 'static,
{
  require_manage(&auth.user)?;
  let users = state.store.list_users().await.map_err(Error::store)?;
  Ok(Json(filter(users, params.q.as_deref())))
}
