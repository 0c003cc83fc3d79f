//! Role-based visibility and surface permissions.
//!
//! Roles outside the recognised set are least privileged everywhere: their
//! archive scope is self-only and they only see the upload and archive tabs.

use serde::Serialize;

use crate::{file_item::FileItem, user::Role};

// ─── Archive scope ───────────────────────────────────────────────────────────

/// Which file items a role may see in the archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
  /// Only items the caller uploaded.
  Own,
  /// Every item in the ledger.
  All,
}

pub fn scope_for(role: &Role) -> Scope {
  match role {
    Role::Admin | Role::Kpp | Role::Ajk | Role::Auditor => Scope::All,
    Role::Lecturer | Role::Other(_) => Scope::Own,
  }
}

/// Restrict `rows` to those `username` may see under `role`.
pub fn visible_rows(role: &Role, username: &str, mut rows: Vec<FileItem>) -> Vec<FileItem> {
  if scope_for(role) == Scope::Own {
    rows.retain(|r| r.uploader_username == username);
  }
  rows
}

/// Whether a single item is visible; same rule as [`visible_rows`].
pub fn can_see(role: &Role, username: &str, item: &FileItem) -> bool {
  match scope_for(role) {
    Scope::All => true,
    Scope::Own => item.uploader_username == username,
  }
}

// ─── Surfaces ────────────────────────────────────────────────────────────────

/// Top-level sections of the portal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tab {
  Upload,
  Archive,
  Subjects,
  Admin,
}

/// Sections shown to `role`. The admin tab is listed for every recognised
/// role; its contents are still gated by [`Permissions::manage`].
pub fn tabs(role: &Role) -> Vec<Tab> {
  if role.is_recognised() {
    vec![Tab::Upload, Tab::Archive, Tab::Subjects, Tab::Admin]
  } else {
    vec![Tab::Upload, Tab::Archive]
  }
}

/// What a signed-in user may do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Permissions {
  pub scope:         Scope,
  pub upload:        bool,
  pub view_archive:  bool,
  pub view_subjects: bool,
  /// List users, add and remove subjects.
  pub manage:        bool,
}

pub fn permissions(role: &Role) -> Permissions {
  Permissions {
    scope:         scope_for(role),
    upload:        !matches!(role, Role::Auditor),
    view_archive:  true,
    view_subjects: role.is_recognised(),
    manage:        matches!(role, Role::Admin | Role::Kpp | Role::Ajk),
  }
}

#[cfg(test)]
mod tests {
  use chrono::Utc;

  use super::*;
  use crate::file_item::{DocType, SubjectRole};

  fn item(id: i64, uploader: &str) -> FileItem {
    FileItem {
      id,
      subject_code: "STA101".into(),
      uploader_username: uploader.into(),
      role: SubjectRole::Lic,
      doc_type: DocType::Rubrics,
      semester: "Okt 2025".into(),
      path: format!("/data/uploads/{id}"),
      sha256: "00".repeat(32),
      uploaded_at: Utc::now(),
    }
  }

  fn rows() -> Vec<FileItem> { vec![item(1, "alice"), item(2, "bob"), item(3, "alice")] }

  #[test]
  fn lecturer_sees_only_own_rows() {
    let seen = visible_rows(&Role::Lecturer, "alice", rows());
    assert_eq!(seen.iter().map(|r| r.id).collect::<Vec<_>>(), vec![1, 3]);
  }

  #[test]
  fn auditor_sees_everything() {
    assert_eq!(visible_rows(&Role::Auditor, "carol", rows()).len(), 3);
  }

  #[test]
  fn unknown_role_is_self_only() {
    let role = Role::Other("VISITOR".into());
    assert_eq!(scope_for(&role), Scope::Own);
    assert!(visible_rows(&role, "carol", rows()).is_empty());
    assert_eq!(tabs(&role), vec![Tab::Upload, Tab::Archive]);
  }

  #[test]
  fn can_see_agrees_with_visible_rows() {
    for role in [Role::Lecturer, Role::Admin, Role::Other("X".into())] {
      let visible: Vec<i64> = visible_rows(&role, "bob", rows()).iter().map(|r| r.id).collect();
      for r in rows() {
        assert_eq!(can_see(&role, "bob", &r), visible.contains(&r.id));
      }
    }
  }

  #[test]
  fn auditor_is_read_only() {
    let p = permissions(&Role::Auditor);
    assert!(!p.upload);
    assert!(!p.manage);
    assert!(p.view_archive);
  }

  #[test]
  fn management_is_limited_to_admin_kpp_ajk() {
    for role in [Role::Admin, Role::Kpp, Role::Ajk] {
      assert!(permissions(&role).manage, "{role}");
    }
    for role in [Role::Lecturer, Role::Auditor, Role::Other("X".into())] {
      assert!(!permissions(&role).manage, "{role}");
    }
  }
}
