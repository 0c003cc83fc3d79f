//! [`SqliteStore`]: the SQLite implementation of [`LedgerStore`].

use std::path::Path;

use chrono::{SubsecRound as _, Utc};
use rusqlite::OptionalExtension as _;

use filing_core::{
  file_item::{FileItem, NewFileItem},
  store::LedgerStore,
  subject::{NewSubject, Subject},
  user::{NewUser, User},
};

use crate::{
  encode::{
    encode_dt, subject_from_row, RawFileItem, RawUser, FILE_COLUMNS,
    SUBJECT_COLUMNS, USER_COLUMNS,
  },
  schema::SCHEMA,
  Error, Result,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// The filing ledger backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

/// `true` when a statement failed on a UNIQUE (or other) constraint.
fn is_constraint_violation(e: &rusqlite::Error) -> bool {
  matches!(
    e,
    rusqlite::Error::SqliteFailure(f, _)
      if f.code == rusqlite::ErrorCode::ConstraintViolation
  )
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, mostly for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn count(&self, table: &'static str) -> Result<usize> {
    let n: i64 = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |r| r.get(0))?)
      })
      .await?;
    Ok(n as usize)
  }

  /// Select file items with an optional single-parameter `WHERE` clause,
  /// newest first.
  async fn query_files(
    &self,
    where_clause: &'static str,
    param:        Option<String>,
  ) -> Result<Vec<FileItem>> {
    let raws: Vec<RawFileItem> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {FILE_COLUMNS} FROM file_items {where_clause}
           ORDER BY uploaded_at DESC, id DESC"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(param.iter()), RawFileItem::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawFileItem::into_file_item).collect()
  }
}

// ─── LedgerStore impl ────────────────────────────────────────────────────────

impl LedgerStore for SqliteStore {
  type Error = Error;

  // ── Users ─────────────────────────────────────────────────────────────────

  async fn add_user(&self, input: NewUser) -> Result<User> {
    let role_str = input.role.to_string();
    let username = input.username.clone();
    let params = (
      input.category.clone(),
      role_str,
      input.name.clone(),
      input.username.clone(),
      input.password_hash.clone(),
      input.notes.clone(),
    );

    let outcome: std::result::Result<i64, String> = self
      .conn
      .call(move |conn| {
        let (category, role, name, username, hash, notes) = params;
        match conn.execute(
          "INSERT INTO users (category, role, name, username, password_hash, notes)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![category, role, name, username, hash, notes],
        ) {
          Ok(_) => Ok(Ok(conn.last_insert_rowid())),
          Err(e) if is_constraint_violation(&e) => Ok(Err(e.to_string())),
          Err(e) => Err(e.into()),
        }
      })
      .await?;

    let id = outcome.map_err(|message| Error::DuplicateUser { username, message })?;

    Ok(User {
      id,
      category:      input.category,
      role:          input.role,
      name:          input.name,
      username:      input.username,
      password_hash: input.password_hash,
      notes:         input.notes,
    })
  }

  async fn get_user<'a>(&'a self, username: &'a str) -> Result<Option<User>> {
    let username = username.to_owned();

    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE username = ?1"),
            rusqlite::params![username],
            RawUser::from_row,
          )
          .optional()?)
      })
      .await?;

    Ok(raw.map(RawUser::into_user))
  }

  async fn list_users(&self) -> Result<Vec<User>> {
    let raws: Vec<RawUser> = self
      .conn
      .call(|conn| {
        let mut stmt =
          conn.prepare(&format!("SELECT {USER_COLUMNS} FROM users ORDER BY username"))?;
        let rows = stmt
          .query_map([], RawUser::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    Ok(raws.into_iter().map(RawUser::into_user).collect())
  }

  async fn count_users(&self) -> Result<usize> { self.count("users").await }

  // ── Subjects ──────────────────────────────────────────────────────────────

  async fn add_subject(&self, input: NewSubject) -> Result<Subject> {
    let subject = Subject {
      code:      input.code,
      name:      input.name,
      lic:       input.lic,
      lic_start: input.lic_start,
      lic_end:   input.lic_end,
      rp:        input.rp,
      rp_start:  input.rp_start,
      rp_end:    input.rp_end,
    };
    let row = subject.clone();

    let outcome: std::result::Result<(), String> = self
      .conn
      .call(move |conn| {
        match conn.execute(
          "INSERT INTO subjects (code, name, lic, lic_start, lic_end, rp, rp_start, rp_end)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
          rusqlite::params![
            row.code,
            row.name,
            row.lic,
            row.lic_start,
            row.lic_end,
            row.rp,
            row.rp_start,
            row.rp_end,
          ],
        ) {
          Ok(_) => Ok(Ok(())),
          Err(e) if is_constraint_violation(&e) => Ok(Err(e.to_string())),
          Err(e) => Err(e.into()),
        }
      })
      .await?;

    outcome.map_err(|message| Error::DuplicateSubject {
      code: subject.code.clone(),
      message,
    })?;

    Ok(subject)
  }

  async fn get_subject<'a>(&'a self, code: &'a str) -> Result<Option<Subject>> {
    let code = code.to_owned();

    let subject = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {SUBJECT_COLUMNS} FROM subjects WHERE code = ?1"),
            rusqlite::params![code],
            subject_from_row,
          )
          .optional()?)
      })
      .await?;

    Ok(subject)
  }

  async fn list_subjects(&self) -> Result<Vec<Subject>> {
    let subjects = self
      .conn
      .call(|conn| {
        let mut stmt =
          conn.prepare(&format!("SELECT {SUBJECT_COLUMNS} FROM subjects ORDER BY code"))?;
        let rows = stmt
          .query_map([], subject_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    Ok(subjects)
  }

  async fn delete_subject<'a>(&'a self, code: &'a str) -> Result<bool> {
    let code = code.to_owned();

    let removed: usize = self
      .conn
      .call(move |conn| {
        Ok(conn.execute("DELETE FROM subjects WHERE code = ?1", rusqlite::params![code])?)
      })
      .await?;

    Ok(removed > 0)
  }

  async fn count_subjects(&self) -> Result<usize> { self.count("subjects").await }

  // ── File items (append-only) ──────────────────────────────────────────────

  async fn record_file(&self, input: NewFileItem) -> Result<FileItem> {
    // Truncated to the stored precision so the returned item equals a re-read.
    let uploaded_at = Utc::now().trunc_subsecs(6);
    let at_str      = encode_dt(uploaded_at);
    let role_str    = input.role.to_string();
    let type_str    = input.doc_type.to_string();
    let row         = input.clone();

    let id: i64 = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO file_items (
             subject_code, uploader_username, role, doc_type,
             semester, path, sha256, uploaded_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
          rusqlite::params![
            row.subject_code,
            row.uploader_username,
            role_str,
            type_str,
            row.semester,
            row.path,
            row.sha256,
            at_str,
          ],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    tracing::debug!(id, path = %input.path, "recorded file item");

    Ok(FileItem {
      id,
      subject_code: input.subject_code,
      uploader_username: input.uploader_username,
      role: input.role,
      doc_type: input.doc_type,
      semester: input.semester,
      path: input.path,
      sha256: input.sha256,
      uploaded_at,
    })
  }

  async fn get_file(&self, id: i64) -> Result<Option<FileItem>> {
    let raw: Option<RawFileItem> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {FILE_COLUMNS} FROM file_items WHERE id = ?1"),
            rusqlite::params![id],
            RawFileItem::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawFileItem::into_file_item).transpose()
  }

  async fn list_files(&self) -> Result<Vec<FileItem>> {
    self.query_files("", None).await
  }

  async fn files_by_uploader<'a>(&'a self, username: &'a str) -> Result<Vec<FileItem>> {
    self
      .query_files("WHERE uploader_username = ?1", Some(username.to_owned()))
      .await
  }

  async fn files_by_subject<'a>(&'a self, code: &'a str) -> Result<Vec<FileItem>> {
    self
      .query_files("WHERE subject_code = ?1", Some(code.to_owned()))
      .await
  }
}
