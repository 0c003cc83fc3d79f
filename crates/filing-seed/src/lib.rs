//! CSV codec for the portal's seed and master files.
//!
//! Two sheets are understood: the user-credentials list and the subject
//! master (which doubles as the public LIC/RP appointment table). Pure
//! synchronous; no HTTP or database dependencies.
//!
//! # Quick start
//!
//! ```no_run
//! let rows = filing_seed::read_users_file("seed/all_users_credentials.csv").unwrap();
//! for user in rows.into_iter().filter_map(filing_seed::UserRow::normalize) {
//!   println!("{} ({})", user.username, user.role);
//! }
//! ```

pub mod error;

use std::{fs::File, io::Read, path::Path};

use filing_core::{search::Searchable, subject::NewSubject, user::Role};
use serde::{Deserialize, Serialize};

pub use error::{Error, Result};

/// Password given to seeded users whose row has a blank password cell.
pub const DEFAULT_PASSWORD: &str = "ChangeMe!123";

/// Default file names, as the department distributes them.
pub const USERS_FILE: &str = "all_users_credentials.csv";
pub const SUBJECTS_FILE: &str = "subjects_master_with_periods_v2.csv";

// ─── Users ───────────────────────────────────────────────────────────────────

/// One row of the user-credentials sheet, exactly as read.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UserRow {
  pub category: String,
  pub role:     String,
  pub name:     String,
  pub username: String,
  pub password: String,
  pub notes:    String,
}

/// A user row after normalisation; the password is still plaintext.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedUser {
  pub category: String,
  pub role:     Role,
  pub name:     String,
  pub username: String,
  pub password: String,
  pub notes:    String,
}

impl UserRow {
  /// Upper-case category and role (blank means LECTURER), lower-case the
  /// username and substitute [`DEFAULT_PASSWORD`] for a blank password.
  /// Rows without a username are dropped.
  pub fn normalize(self) -> Option<SeedUser> {
    let username = self.username.trim().to_lowercase();
    if username.is_empty() {
      return None;
    }
    let upper_or_lecturer = |s: &str| {
      let s = s.trim().to_uppercase();
      if s.is_empty() { "LECTURER".to_owned() } else { s }
    };
    let password = match self.password.trim() {
      "" => DEFAULT_PASSWORD.to_owned(),
      p => p.to_owned(),
    };

    Some(SeedUser {
      category: upper_or_lecturer(&self.category),
      role: Role::parse(&upper_or_lecturer(&self.role)),
      name: self.name.trim().to_owned(),
      username,
      password,
      notes: self.notes.trim().to_owned(),
    })
  }
}

// ─── Subjects / appointment table ────────────────────────────────────────────

/// One row of the subject master sheet. Column names follow the sheet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubjectRow {
  pub subject_code: String,
  pub subject_name: String,
  #[serde(rename = "LIC")]
  pub lic:          String,
  #[serde(rename = "LIC_start")]
  pub lic_start:    String,
  #[serde(rename = "LIC_end")]
  pub lic_end:      String,
  #[serde(rename = "RP")]
  pub rp:           String,
  #[serde(rename = "RP_start")]
  pub rp_start:     String,
  #[serde(rename = "RP_end")]
  pub rp_end:       String,
}

impl SubjectRow {
  /// `None` for rows with an empty subject code.
  pub fn into_new_subject(self) -> Option<NewSubject> {
    if self.subject_code.is_empty() {
      return None;
    }
    Some(NewSubject {
      code:      self.subject_code,
      name:      self.subject_name,
      lic:       self.lic,
      lic_start: self.lic_start,
      lic_end:   self.lic_end,
      rp:        self.rp,
      rp_start:  self.rp_start,
      rp_end:    self.rp_end,
    })
  }
}

impl Searchable for SubjectRow {
  fn columns(&self) -> Vec<String> {
    vec![
      self.subject_code.clone(),
      self.subject_name.clone(),
      self.lic.clone(),
      self.lic_start.clone(),
      self.lic_end.clone(),
      self.rp.clone(),
      self.rp_start.clone(),
      self.rp_end.clone(),
    ]
  }
}

// ─── Readers ─────────────────────────────────────────────────────────────────

fn reader<R: Read>(input: R) -> csv::Reader<R> {
  csv::ReaderBuilder::new()
    .trim(csv::Trim::All)
    .flexible(true)
    .from_reader(input)
}

fn open(path: &Path) -> Result<File> {
  match File::open(path) {
    Ok(f) => Ok(f),
    Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
      Err(Error::Missing(path.to_path_buf()))
    }
    Err(e) => Err(e.into()),
  }
}

/// Parse the user-credentials sheet. Unknown columns are ignored; missing
/// ones read as empty.
pub fn read_users<R: Read>(input: R) -> Result<Vec<UserRow>> {
  Ok(reader(input).deserialize().collect::<Result<_, csv::Error>>()?)
}

/// Parse the subject master sheet.
pub fn read_subjects<R: Read>(input: R) -> Result<Vec<SubjectRow>> {
  Ok(reader(input).deserialize().collect::<Result<_, csv::Error>>()?)
}

pub fn read_users_file(path: impl AsRef<Path>) -> Result<Vec<UserRow>> {
  read_users(open(path.as_ref())?)
}

pub fn read_subjects_file(path: impl AsRef<Path>) -> Result<Vec<SubjectRow>> {
  read_subjects(open(path.as_ref())?)
}
