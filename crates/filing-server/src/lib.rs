//! HTTP layer for the departmental filing portal.
//!
//! Exposes an axum [`Router`] with a bearer-authenticated JSON API for
//! uploads, the archive and administration, plus an unauthenticated public
//! surface. Backed by any [`LedgerStore`] and a [`ContentStore`].

pub mod auth;
pub mod error;
pub mod handlers;
pub mod seed;

pub use error::Error;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router,
  extract::DefaultBodyLimit,
  routing::{delete, get, post},
};
use filing_content::{ContentStore, DataLayout};
use filing_core::store::LedgerStore;
use serde::Deserialize;
use tower_http::trace::TraceLayer;

use auth::SessionStore;
use handlers::{files, public, session, subjects, users};

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `FILING_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:              String,
  #[serde(default = "default_port")]
  pub port:              u16,
  /// Root of `uploads/`, `public/` and `seed/`.
  #[serde(default = "default_data_dir")]
  pub data_dir:          PathBuf,
  /// Relative paths are resolved under `data_dir`.
  #[serde(default = "default_database_file")]
  pub database_file:     PathBuf,
  /// Defaults to `<data_dir>/seed`.
  #[serde(default)]
  pub seed_dir:          Option<PathBuf>,
  /// Defaults to `<data_dir>/subjects_master_with_periods_v2.csv`.
  #[serde(default)]
  pub appointments_file: Option<PathBuf>,
}

fn default_host() -> String { "127.0.0.1".to_owned() }
fn default_port() -> u16 { 8501 }
fn default_data_dir() -> PathBuf { PathBuf::from("data") }
fn default_database_file() -> PathBuf { PathBuf::from("filing.db") }

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:              default_host(),
      port:              default_port(),
      data_dir:          default_data_dir(),
      database_file:     default_database_file(),
      seed_dir:          None,
      appointments_file: None,
    }
  }
}

impl ServerConfig {
  pub fn layout(&self) -> DataLayout { DataLayout::new(&self.data_dir) }

  pub fn database_path(&self) -> PathBuf { self.data_dir.join(&self.database_file) }

  pub fn seed_dir(&self) -> PathBuf {
    self.seed_dir.clone().unwrap_or_else(|| self.layout().seed_dir())
  }

  pub fn appointments_path(&self) -> PathBuf {
    self
      .appointments_file
      .clone()
      .unwrap_or_else(|| self.data_dir.join(filing_seed::SUBJECTS_FILE))
  }
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
#[derive(Clone)]
pub struct AppState<S: LedgerStore> {
  pub store:    Arc<S>,
  pub content:  Arc<ContentStore>,
  pub sessions: Arc<SessionStore>,
  pub config:   Arc<ServerConfig>,
}

impl<S: LedgerStore> AppState<S> {
  pub fn new(store: S, config: ServerConfig) -> Self {
    Self {
      store:    Arc::new(store),
      content:  Arc::new(ContentStore::new(config.layout())),
      sessions: Arc::new(SessionStore::new()),
      config:   Arc::new(config),
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the portal's axum [`Router`].
pub fn router<S>(state: AppState<S>) -> Router
where
  S: LedgerStore + Clone + Send + Sync + 'static,
{
  Router::new()
    // Session
    .route("/api/login",               post(session::login::<S>))
    .route("/api/logout",              post(session::logout::<S>))
    .route("/api/me",                  get(session::me::<S>))
    // Files
    .route(
      "/api/files",
      get(files::archive::<S>)
        .post(files::upload::<S>)
        .layer(DefaultBodyLimit::disable()),
    )
    .route("/api/files/{id}/download", get(files::download::<S>))
    // Administration
    .route("/api/subjects",            get(subjects::list::<S>).post(subjects::create::<S>))
    .route("/api/subjects/{code}",     delete(subjects::remove::<S>))
    .route("/api/users",               get(users::list::<S>))
    // Public
    .route("/public/documents",        get(public::documents::<S>))
    .route("/public/files/{*path}",    get(public::file::<S>))
    .route("/public/appointments",     get(public::appointments::<S>))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}
