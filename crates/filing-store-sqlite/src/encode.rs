//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as fixed-width RFC 3339 strings (microseconds, `Z`)
//! so that `ORDER BY uploaded_at` sorts chronologically. Enums are stored as
//! their wire names.

use chrono::{DateTime, SecondsFormat, Utc};
use filing_core::{
  file_item::FileItem,
  subject::Subject,
  user::{Role, User},
};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Row types ───────────────────────────────────────────────────────────────

pub const USER_COLUMNS: &str =
  "id, category, role, name, username, password_hash, notes";

/// Raw values read directly from a `users` row.
pub struct RawUser {
  pub id:            i64,
  pub category:      String,
  pub role:          String,
  pub name:          String,
  pub username:      String,
  pub password_hash: String,
  pub notes:         String,
}

impl RawUser {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:            row.get(0)?,
      category:      row.get(1)?,
      role:          row.get(2)?,
      name:          row.get(3)?,
      username:      row.get(4)?,
      password_hash: row.get(5)?,
      notes:         row.get(6)?,
    })
  }

  pub fn into_user(self) -> User {
    User {
      id:            self.id,
      category:      self.category,
      role:          Role::parse(&self.role),
      name:          self.name,
      username:      self.username,
      password_hash: self.password_hash,
      notes:         self.notes,
    }
  }
}

pub const SUBJECT_COLUMNS: &str =
  "code, name, lic, lic_start, lic_end, rp, rp_start, rp_end";

pub fn subject_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Subject> {
  Ok(Subject {
    code:      row.get(0)?,
    name:      row.get(1)?,
    lic:       row.get(2)?,
    lic_start: row.get(3)?,
    lic_end:   row.get(4)?,
    rp:        row.get(5)?,
    rp_start:  row.get(6)?,
    rp_end:    row.get(7)?,
  })
}

pub const FILE_COLUMNS: &str = "id, subject_code, uploader_username, role, \
                                doc_type, semester, path, sha256, uploaded_at";

/// Raw strings read directly from a `file_items` row.
pub struct RawFileItem {
  pub id:                i64,
  pub subject_code:      String,
  pub uploader_username: String,
  pub role:              String,
  pub doc_type:          String,
  pub semester:          String,
  pub path:              String,
  pub sha256:            String,
  pub uploaded_at:       String,
}

impl RawFileItem {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:                row.get(0)?,
      subject_code:      row.get(1)?,
      uploader_username: row.get(2)?,
      role:              row.get(3)?,
      doc_type:          row.get(4)?,
      semester:          row.get(5)?,
      path:              row.get(6)?,
      sha256:            row.get(7)?,
      uploaded_at:       row.get(8)?,
    })
  }

  pub fn into_file_item(self) -> Result<FileItem> {
    Ok(FileItem {
      id:                self.id,
      subject_code:      self.subject_code,
      uploader_username: self.uploader_username,
      role:              self.role.parse()?,
      doc_type:          self.doc_type.parse()?,
      semester:          self.semester,
      path:              self.path,
      sha256:            self.sha256,
      uploaded_at:       decode_dt(&self.uploaded_at)?,
    })
  }
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;

  #[test]
  fn encoded_timestamps_sort_chronologically() {
    let whole = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
    let later = Utc.timestamp_opt(1_700_000_000, 120_000_000).unwrap();
    let a = encode_dt(whole);
    let b = encode_dt(later);
    assert_eq!(a.len(), b.len());
    assert!(a < b, "{a} vs {b}");
    assert_eq!(decode_dt(&b).unwrap(), later);
  }
}
