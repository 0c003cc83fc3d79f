//! Password verification, bearer sessions and the `Authenticated` extractor.

use std::collections::HashMap;

use argon2::{
  Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
  password_hash::SaltString,
};
use axum::{
  extract::FromRequestParts,
  http::{HeaderMap, header, request::Parts},
};
use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD as B64;
use filing_core::{store::LedgerStore, user::User};
use rand_core::{OsRng, RngCore};
use tokio::sync::RwLock;

use crate::{AppState, error::Error};

/// Produce an argon2 PHC string for `password`.
pub fn hash_password(password: &str) -> Result<String, Error> {
  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map(|h| h.to_string())
    .map_err(|e| Error::Internal(format!("argon2 error: {e}")))
}

/// `true` when `password` matches `phc`. A malformed hash never matches.
pub fn verify_password(password: &str, phc: &str) -> bool {
  let Ok(parsed) = PasswordHash::new(phc) else {
    return false;
  };
  Argon2::default()
    .verify_password(password.as_bytes(), &parsed)
    .is_ok()
}

// ─── Sessions ────────────────────────────────────────────────────────────────

/// In-memory map from opaque token to username. Sessions do not survive a
/// restart. Each user holds at most one session, so the map is bounded by the
/// number of users.
#[derive(Default)]
pub struct SessionStore {
  sessions: RwLock<HashMap<String, String>>,
}

impl SessionStore {
  pub fn new() -> Self { Self::default() }

  /// Open a session for `username` and return its token. Any earlier
  /// session of the same user is dropped.
  pub async fn create(&self, username: &str) -> String {
    let mut raw = [0u8; 32];
    OsRng.fill_bytes(&mut raw);
    let token = B64.encode(raw);

    let mut sessions = self.sessions.write().await;
    sessions.retain(|_, owner| owner != username);
    sessions.insert(token.clone(), username.to_owned());
    token
  }

  pub async fn len(&self) -> usize { self.sessions.read().await.len() }

  pub async fn resolve(&self, token: &str) -> Option<String> {
    self.sessions.read().await.get(token).cloned()
  }

  /// Returns `true` if the token was live.
  pub async fn revoke(&self, token: &str) -> bool {
    self.sessions.write().await.remove(token).is_some()
  }
}

/// The token from an `Authorization: Bearer …` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
  headers
    .get(header::AUTHORIZATION)?
    .to_str()
    .ok()?
    .strip_prefix("Bearer ")
    .map(str::trim)
    .filter(|t| !t.is_empty())
}

// ─── Extractor ───────────────────────────────────────────────────────────────

/// The signed-in user, re-read from the ledger on every request.
pub struct Authenticated {
  pub user:  User,
  pub token: String,
}

impl<S> FromRequestParts<AppState<S>> for Authenticated
where
  S: LedgerStore + Clone + Send + Sync + 'static,
{
  type Rejection = Error;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    let token = bearer_token(&parts.headers).ok_or(Error::Unauthorized)?;
    let username = state
      .sessions
      .resolve(token)
      .await
      .ok_or(Error::Unauthorized)?;

    match state.store.get_user(&username).await.map_err(Error::store)? {
      Some(user) => Ok(Authenticated { user, token: token.to_owned() }),
      None => {
        tracing::warn!(%username, "session user no longer exists; dropping session");
        state.sessions.revoke(token).await;
        Err(Error::Unauthorized)
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use axum::http::HeaderValue;

  use super::*;

  #[test]
  fn hash_then_verify() {
    let phc = hash_password("Pw1!").unwrap();
    assert!(phc.starts_with("$argon2"));
    assert!(verify_password("Pw1!", &phc));
    assert!(!verify_password("pw1!", &phc));
  }

  #[test]
  fn malformed_hash_never_matches() {
    assert!(!verify_password("anything", "not-a-phc-string"));
    assert!(!verify_password("", ""));
  }

  #[tokio::test]
  async fn sessions_resolve_until_revoked() {
    let sessions = SessionStore::new();
    let a = sessions.create("alice").await;
    let b = sessions.create("bob").await;
    assert_eq!(sessions.resolve(&a).await.as_deref(), Some("alice"));

    assert!(sessions.revoke(&a).await);
    assert!(!sessions.revoke(&a).await);
    assert!(sessions.resolve(&a).await.is_none());
    assert!(sessions.resolve(&b).await.is_some());
  }

  #[tokio::test]
  async fn signing_in_again_replaces_the_old_session() {
    let sessions = SessionStore::new();
    let first = sessions.create("alice").await;
    sessions.create("bob").await;
    let second = sessions.create("alice").await;

    assert_ne!(first, second);
    assert!(sessions.resolve(&first).await.is_none());
    assert_eq!(sessions.resolve(&second).await.as_deref(), Some("alice"));
    assert_eq!(sessions.len().await, 2);
  }

  #[test]
  fn bearer_token_parsing() {
    let mut headers = HeaderMap::new();
    assert_eq!(bearer_token(&headers), None);

    headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic dXNlcjpwYXNz"));
    assert_eq!(bearer_token(&headers), None);

    headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer "));
    assert_eq!(bearer_token(&headers), None);

    headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc123"));
    assert_eq!(bearer_token(&headers), Some("abc123"));
  }
}
