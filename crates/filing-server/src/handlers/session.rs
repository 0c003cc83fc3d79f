//! Handlers for `/api/login`, `/api/logout` and `/api/me`.

use axum::{
  Json,
  extract::State,
  http::StatusCode,
};
use filing_core::{
  access::{Permissions, Tab, permissions, tabs},
  store::LedgerStore,
  user::{User, normalize_username},
};
use serde::{Deserialize, Serialize};

use crate::{
  AppState,
  auth::{Authenticated, verify_password},
  error::Error,
};

#[derive(Debug, Deserialize)]
pub struct LoginBody {
  pub username: String,
  pub password: String,
}

#[derive(Debug, Serialize)]
pub struct SessionView {
  pub user:        User,
  pub permissions: Permissions,
  pub tabs:        Vec<Tab>,
}

impl SessionView {
  fn for_user(user: User) -> Self {
    Self {
      permissions: permissions(&user.role),
      tabs: tabs(&user.role),
      user,
    }
  }
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
  pub token:   String,
  #[serde(flatten)]
  pub session: SessionView,
}

/// `POST /api/login`, body: `{"username":"…","password":"…"}`
///
/// A failed attempt creates no session.
pub async fn login<S>(
  State(state): State<AppState<S>>,
  Json(body): Json<LoginBody>,
) -> Result<Json<LoginResponse>, Error>
where
  S: LedgerStore + Clone + Send + Sync + 'static,
{
  let username = normalize_username(&body.username);
  let user = state
    .store
    .get_user(&username)
    .await
    .map_err(Error::store)?
    .filter(|u| verify_password(&body.password, &u.password_hash));

  let Some(user) = user else {
    tracing::warn!(%username, "failed login");
    return Err(Error::InvalidCredentials);
  };

  let token = state.sessions.create(&user.username).await;
  tracing::info!(username = %user.username, role = %user.role, "signed in");
  Ok(Json(LoginResponse { token, session: SessionView::for_user(user) }))
}

/// `POST /api/logout`
pub async fn logout<S>(
  State(state): State<AppState<S>>,
  auth: Authenticated,
) -> StatusCode
where
  S: LedgerStore + Clone + Send + Sync + 'static,
{
  state.sessions.revoke(&auth.token).await;
  tracing::info!(username = %auth.user.username, "signed out");
  StatusCode::NO_CONTENT
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
  #[serde(flatten)]
  pub session: SessionView,
  /// Number of ledger rows the user has uploaded.
  pub uploads: usize,
}

/// `GET /api/me`
pub async fn me<S>(
  State(state): State<AppState<S>>,
  auth: Authenticated,
) -> Result<Json<MeResponse>, Error>
where
  S: LedgerStore + Clone + Send + Sync + 'static,
{
  let uploads = state
    .store
    .files_by_uploader(&auth.user.username)
    .await
    .map_err(Error::store)?
    .len();
  Ok(Json(MeResponse { session: SessionView::for_user(auth.user), uploads }))
}
