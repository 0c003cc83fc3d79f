//! Case-insensitive substring search over ledger rows.
//!
//! A row is kept when the query occurs in the string form of any of its
//! columns. There is no index; every search is a linear scan.

use crate::{
  access::visible_rows,
  file_item::FileItem,
  subject::Subject,
  user::{Role, User},
};

/// A row whose columns can be searched as text.
pub trait Searchable {
  /// The string form of every searchable column.
  fn columns(&self) -> Vec<String>;
}

/// Normalise a raw query: `None` when absent or blank.
pub fn normalize_query(query: Option<&str>) -> Option<String> {
  query
    .map(str::trim)
    .filter(|q| !q.is_empty())
    .map(str::to_lowercase)
}

pub fn matches<T: Searchable + ?Sized>(row: &T, needle_lower: &str) -> bool {
  row
    .columns()
    .iter()
    .any(|c| c.to_lowercase().contains(needle_lower))
}

/// Keep the rows matching `query`; a blank or absent query keeps everything.
pub fn filter<T: Searchable>(mut rows: Vec<T>, query: Option<&str>) -> Vec<T> {
  if let Some(needle) = normalize_query(query) {
    rows.retain(|r| matches(r, &needle));
  }
  rows
}

/// The archive view: role scope first, then the text filter.
pub fn archive(
  role: &Role,
  username: &str,
  rows: Vec<FileItem>,
  query: Option<&str>,
) -> Vec<FileItem> {
  filter(visible_rows(role, username, rows), query)
}

// ─── Searchable impls ────────────────────────────────────────────────────────

impl Searchable for FileItem {
  fn columns(&self) -> Vec<String> {
    vec![
      self.id.to_string(),
      self.subject_code.clone(),
      self.uploader_username.clone(),
      self.role.to_string(),
      self.doc_type.to_string(),
      self.semester.clone(),
      self.path.clone(),
      self.sha256.clone(),
      self.uploaded_at.to_rfc3339(),
    ]
  }
}

impl Searchable for Subject {
  fn columns(&self) -> Vec<String> {
    vec![
      self.code.clone(),
      self.name.clone(),
      self.lic.clone(),
      self.lic_start.clone(),
      self.lic_end.clone(),
      self.rp.clone(),
      self.rp_start.clone(),
      self.rp_end.clone(),
    ]
  }
}

impl Searchable for User {
  fn columns(&self) -> Vec<String> {
    vec![
      self.category.clone(),
      self.role.to_string(),
      self.name.clone(),
      self.username.clone(),
      self.notes.clone(),
    ]
  }
}

#[cfg(test)]
mod tests {
  use chrono::Utc;

  use super::*;
  use crate::file_item::{DocType, SubjectRole};

  fn item(id: i64, uploader: &str, subject: &str, semester: &str) -> FileItem {
    FileItem {
      id,
      subject_code: subject.into(),
      uploader_username: uploader.into(),
      role: SubjectRole::Rp,
      doc_type: DocType::LessonPlan,
      semester: semester.into(),
      path: format!("/data/uploads/{subject}_{id}.pdf"),
      sha256: "ab".repeat(32),
      uploaded_at: Utc::now(),
    }
  }

  #[test]
  fn blank_query_keeps_all() {
    let rows = vec![item(1, "a", "STA101", "Okt 2025"), item(2, "b", "STA202", "Mac 2024")];
    assert_eq!(filter(rows.clone(), None).len(), 2);
    assert_eq!(filter(rows, Some("   ")).len(), 2);
  }

  #[test]
  fn match_is_case_insensitive_over_any_column() {
    let rows = vec![item(1, "a", "STA101", "Okt 2025"), item(2, "b", "STA202", "Mac 2024")];
    let hit = filter(rows.clone(), Some("sta101"));
    assert_eq!(hit.len(), 1);
    assert_eq!(hit[0].id, 1);

    let by_semester = filter(rows.clone(), Some("MAC"));
    assert_eq!(by_semester[0].id, 2);

    let by_type = filter(rows, Some("lesson_PLAN"));
    assert_eq!(by_type.len(), 2);
  }

  #[test]
  fn archive_scopes_before_filtering() {
    // The query matches bob's uploader column; a lecturer named alice must
    // still see nothing of bob's.
    let rows = vec![item(1, "alice", "STA101", "Okt 2025"), item(2, "bob", "STA101", "Okt 2025")];
    let seen = archive(&Role::Lecturer, "alice", rows.clone(), Some("bob"));
    assert!(seen.is_empty());

    let seen = archive(&Role::Lecturer, "alice", rows.clone(), Some("sta101"));
    assert_eq!(seen.iter().map(|r| r.id).collect::<Vec<_>>(), vec![1]);

    let seen = archive(&Role::Auditor, "carol", rows, Some("bob"));
    assert_eq!(seen.iter().map(|r| r.id).collect::<Vec<_>>(), vec![2]);
  }

  #[test]
  fn subject_search_covers_lecturer_names() {
    let subject = Subject {
      code:      "STA101".into(),
      name:      "Intro Statistics".into(),
      lic:       "Dr. Aminah".into(),
      lic_start: "Mac 2024".into(),
      lic_end:   String::new(),
      rp:        "Encik Faiz".into(),
      rp_start:  String::new(),
      rp_end:    String::new(),
    };
    assert_eq!(filter(vec![subject.clone()], Some("faiz")).len(), 1);
    assert!(filter(vec![subject], Some("zzz")).is_empty());
  }
}
