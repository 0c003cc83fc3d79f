//! First-run seeding of the user and subject tables from CSV exports.
//!
//! Each table is seeded independently and only while it is empty. A missing
//! seed file is logged and skipped; it never stops the server from starting.

use std::path::Path;

use filing_core::{
  store::{LedgerError as _, LedgerStore},
  user::NewUser,
};
use filing_seed::{SubjectRow, UserRow};

use crate::{auth::hash_password, error::Error};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
  /// The table already had rows; the file was not read.
  AlreadyPopulated,
  MissingFile,
  Seeded { inserted: usize, skipped: usize },
}

fn read_or_missing<T>(
  result: filing_seed::Result<Vec<T>>,
) -> Result<Option<Vec<T>>, Error> {
  match result {
    Ok(rows) => Ok(Some(rows)),
    Err(filing_seed::Error::Missing(path)) => {
      tracing::warn!(path = %path.display(), "seed file not found; skipping");
      Ok(None)
    }
    Err(e) => Err(e.into()),
  }
}

pub async fn seed_users_if_empty<S: LedgerStore>(
  store: &S,
  path:  &Path,
) -> Result<SeedOutcome, Error> {
  if store.count_users().await.map_err(Error::store)? > 0 {
    return Ok(SeedOutcome::AlreadyPopulated);
  }
  let Some(rows) = read_or_missing(filing_seed::read_users_file(path))? else {
    return Ok(SeedOutcome::MissingFile);
  };

  let (mut inserted, mut skipped) = (0, 0);
  for user in rows.into_iter().filter_map(UserRow::normalize) {
    let input = NewUser {
      category:      user.category,
      role:          user.role,
      name:          user.name,
      password_hash: hash_password(&user.password)?,
      notes:         user.notes,
      username:      user.username,
    };
    let username = input.username.clone();
    match store.add_user(input).await {
      Ok(_) => inserted += 1,
      Err(e) if e.is_conflict() => {
        tracing::warn!(%username, "duplicate user in seed file; skipped");
        skipped += 1;
      }
      Err(e) => return Err(Error::store(e)),
    }
  }

  tracing::info!(inserted, skipped, path = %path.display(), "seeded users");
  Ok(SeedOutcome::Seeded { inserted, skipped })
}

pub async fn seed_subjects_if_empty<S: LedgerStore>(
  store: &S,
  path:  &Path,
) -> Result<SeedOutcome, Error> {
  if store.count_subjects().await.map_err(Error::store)? > 0 {
    return Ok(SeedOutcome::AlreadyPopulated);
  }
  let Some(rows) = read_or_missing(filing_seed::read_subjects_file(path))? else {
    return Ok(SeedOutcome::MissingFile);
  };

  let (mut inserted, mut skipped) = (0, 0);
  for subject in rows.into_iter().filter_map(SubjectRow::into_new_subject) {
    let code = subject.code.clone();
    match store.add_subject(subject).await {
      Ok(_) => inserted += 1,
      Err(e) if e.is_conflict() => {
        tracing::warn!(%code, "duplicate subject in seed file; skipped");
        skipped += 1;
      }
      Err(e) => return Err(Error::store(e)),
    }
  }

  tracing::info!(inserted, skipped, path = %path.display(), "seeded subjects");
  Ok(SeedOutcome::Seeded { inserted, skipped })
}

/// Seed both tables from `dir`.
pub async fn run<S: LedgerStore>(store: &S, dir: &Path) -> Result<(), Error> {
  seed_users_if_empty(store, &dir.join(filing_seed::USERS_FILE)).await?;
  seed_subjects_if_empty(store, &dir.join(filing_seed::SUBJECTS_FILE)).await?;
  Ok(())
}

#[cfg(test)]
mod tests {
  use filing_core::user::Role;
  use filing_store_sqlite::SqliteStore;

  use super::*;
  use crate::auth::verify_password;

  async fn store() -> SqliteStore { SqliteStore::open_in_memory().await.unwrap() }

  fn write(dir: &Path, name: &str, body: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, body).unwrap();
    path
  }

  #[tokio::test]
  async fn users_are_seeded_with_hashed_passwords() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(
      dir.path(),
      filing_seed::USERS_FILE,
      "category,role,name,username,password,notes\n\
       lecturer,lecturer,Alice,Alice,Pw1!,\n\
       ,,Bob,bob,,\n\
       admin,ADMIN,Dup,alice,other,\n",
    );
    let s = store().await;

    let outcome = seed_users_if_empty(&s, &path).await.unwrap();
    assert_eq!(outcome, SeedOutcome::Seeded { inserted: 2, skipped: 1 });

    let alice = s.get_user("alice").await.unwrap().unwrap();
    assert_eq!(alice.role, Role::Lecturer);
    assert_ne!(alice.password_hash, "Pw1!");
    assert!(verify_password("Pw1!", &alice.password_hash));

    let bob = s.get_user("bob").await.unwrap().unwrap();
    assert!(verify_password(filing_seed::DEFAULT_PASSWORD, &bob.password_hash));
  }

  #[tokio::test]
  async fn populated_tables_are_left_alone() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(
      dir.path(),
      filing_seed::SUBJECTS_FILE,
      "subject_code,subject_name\nSTA101,Intro\n",
    );
    let s = store().await;
    assert_eq!(
      seed_subjects_if_empty(&s, &path).await.unwrap(),
      SeedOutcome::Seeded { inserted: 1, skipped: 0 }
    );

    write(dir.path(), filing_seed::SUBJECTS_FILE, "subject_code,subject_name\nSTA202,Reg\n");
    assert_eq!(seed_subjects_if_empty(&s, &path).await.unwrap(), SeedOutcome::AlreadyPopulated);
    assert_eq!(s.count_subjects().await.unwrap(), 1);
  }

  #[tokio::test]
  async fn missing_files_are_not_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let s = store().await;
    run(&s, dir.path()).await.unwrap();
    assert_eq!(
      seed_users_if_empty(&s, &dir.path().join("nope.csv")).await.unwrap(),
      SeedOutcome::MissingFile
    );
    assert_eq!(s.count_users().await.unwrap(), 0);
  }
}
