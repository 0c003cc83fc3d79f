//! FileItem: the ledger record describing one uploaded document.
//!
//! The bytes themselves live in the content store; a file item only carries
//! the path and digest. Items are append-only and never deleted, so `path`
//! may point at a file that no longer exists.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::Error;

// ─── Subject role ────────────────────────────────────────────────────────────

/// The uploader's role within the subject at upload time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SubjectRole {
  Lic,
  Rp,
  Staff,
}

impl SubjectRole {
  pub const ALL: [SubjectRole; 3] = [Self::Lic, Self::Rp, Self::Staff];

  pub fn as_str(self) -> &'static str {
    match self {
      Self::Lic => "LIC",
      Self::Rp => "RP",
      Self::Staff => "STAFF",
    }
  }
}

impl FromStr for SubjectRole {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Self::ALL
      .into_iter()
      .find(|r| r.as_str().eq_ignore_ascii_case(s.trim()))
      .ok_or_else(|| Error::UnknownSubjectRole(s.to_owned()))
  }
}

impl fmt::Display for SubjectRole {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

// ─── Document type ───────────────────────────────────────────────────────────

/// The fixed catalogue of document categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocType {
  Rubrics,
  CourseInfo,
  Cap,
  LessonPlan,
  Slt,
  JsuFinal,
  JsuTest,
  JsuProject,
  SuratLantikanLic,
  SuratLantikanRp,
}

impl DocType {
  pub const ALL: [DocType; 10] = [
    Self::Rubrics,
    Self::CourseInfo,
    Self::Cap,
    Self::LessonPlan,
    Self::Slt,
    Self::JsuFinal,
    Self::JsuTest,
    Self::JsuProject,
    Self::SuratLantikanLic,
    Self::SuratLantikanRp,
  ];

  /// Types stored under the public tree and listed without authentication.
  pub const PUBLIC: [DocType; 3] = [Self::Rubrics, Self::CourseInfo, Self::Cap];

  /// Directory / wire name. Must match the `snake_case` serde names above.
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Rubrics => "rubrics",
      Self::CourseInfo => "course_info",
      Self::Cap => "cap",
      Self::LessonPlan => "lesson_plan",
      Self::Slt => "slt",
      Self::JsuFinal => "jsu_final",
      Self::JsuTest => "jsu_test",
      Self::JsuProject => "jsu_project",
      Self::SuratLantikanLic => "surat_lantikan_lic",
      Self::SuratLantikanRp => "surat_lantikan_rp",
    }
  }

  pub fn is_public(self) -> bool { Self::PUBLIC.contains(&self) }
}

impl FromStr for DocType {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let wanted = s.trim().to_lowercase();
    Self::ALL
      .into_iter()
      .find(|t| t.as_str() == wanted)
      .ok_or_else(|| Error::UnknownDocType(s.to_owned()))
  }
}

impl fmt::Display for DocType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

// ─── FileItem ────────────────────────────────────────────────────────────────

/// A persisted upload record. Once written, no field is ever updated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileItem {
  pub id:                i64,
  /// Not enforced as a foreign key; survives subject deletion.
  pub subject_code:      String,
  pub uploader_username: String,
  pub role:              SubjectRole,
  pub doc_type:          DocType,
  pub semester:          String,
  pub path:              String,
  /// Lowercase hex SHA-256 of the uploaded bytes.
  pub sha256:            String,
  /// Server-assigned; never changes after creation.
  pub uploaded_at:       DateTime<Utc>,
}

/// Input to [`crate::store::LedgerStore::record_file`].
/// `id` and `uploaded_at` are always set by the store.
#[derive(Debug, Clone)]
pub struct NewFileItem {
  pub subject_code:      String,
  pub uploader_username: String,
  pub role:              SubjectRole,
  pub doc_type:          DocType,
  pub semester:          String,
  pub path:              String,
  pub sha256:            String,
}
