//! The `LedgerStore` trait: the metadata ledger abstraction.
//!
//! The trait is implemented by storage backends (e.g. `filing-store-sqlite`).
//! The HTTP layer depends on this abstraction, not on any concrete backend.

use std::future::Future;

use crate::{
  file_item::{FileItem, NewFileItem},
  subject::{NewSubject, Subject},
  user::{NewUser, User},
};

/// Backend error type; lets callers tell a unique-key collision apart from
/// other failures without knowing the backend.
pub trait LedgerError: std::error::Error + Send + Sync + 'static {
  /// `true` when a write collided with an existing unique key.
  fn is_conflict(&self) -> bool;
}

/// Abstraction over the relational store of users, subjects and file items.
///
/// Every write is a single-row operation. File items are append-only: there
/// is no update or delete for them. Nothing here enforces referential
/// integrity between file items and users or subjects.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait LedgerStore: Send + Sync {
  type Error: LedgerError;

  // ── Users ─────────────────────────────────────────────────────────────

  /// Persist a new user. Fails if the username is already taken.
  fn add_user(
    &self,
    input: NewUser,
  ) -> impl Future<Output = Result<User, Self::Error>> + Send + '_;

  /// Point lookup by (already normalised) username.
  fn get_user<'a>(
    &'a self,
    username: &'a str,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + 'a;

  /// All users ordered by username.
  fn list_users(
    &self,
  ) -> impl Future<Output = Result<Vec<User>, Self::Error>> + Send + '_;

  fn count_users(
    &self,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;

  // ── Subjects ──────────────────────────────────────────────────────────

  /// Persist a new subject. A duplicate code is reported as a distinct,
  /// recoverable error by every backend.
  fn add_subject(
    &self,
    input: NewSubject,
  ) -> impl Future<Output = Result<Subject, Self::Error>> + Send + '_;

  fn get_subject<'a>(
    &'a self,
    code: &'a str,
  ) -> impl Future<Output = Result<Option<Subject>, Self::Error>> + Send + 'a;

  /// All subjects ordered by code.
  fn list_subjects(
    &self,
  ) -> impl Future<Output = Result<Vec<Subject>, Self::Error>> + Send + '_;

  /// Delete a subject by code. Returns `false` if no such subject existed.
  /// File items referencing the code are left untouched.
  fn delete_subject<'a>(
    &'a self,
    code: &'a str,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  fn count_subjects(
    &self,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;

  // ── File items (append-only) ──────────────────────────────────────────

  /// Record a new file item. `id` and `uploaded_at` are set by the store.
  /// Identical inputs always produce a new row.
  fn record_file(
    &self,
    input: NewFileItem,
  ) -> impl Future<Output = Result<FileItem, Self::Error>> + Send + '_;

  fn get_file(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<FileItem>, Self::Error>> + Send + '_;

  /// Full scan, newest first.
  fn list_files(
    &self,
  ) -> impl Future<Output = Result<Vec<FileItem>, Self::Error>> + Send + '_;

  /// Exact match on `uploader_username`, newest first.
  fn files_by_uploader<'a>(
    &'a self,
    username: &'a str,
  ) -> impl Future<Output = Result<Vec<FileItem>, Self::Error>> + Send + 'a;

  /// Exact match on `subject_code`, newest first.
  fn files_by_subject<'a>(
    &'a self,
    code: &'a str,
  ) -> impl Future<Output = Result<Vec<FileItem>, Self::Error>> + Send + 'a;
}
