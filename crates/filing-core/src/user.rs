//! User: a staff identity allowed to sign in to the portal.
//!
//! Users are created by first-run seeding only. The portal never edits or
//! deletes them.

use std::fmt;

use serde::{Deserialize, Serialize};

// ─── Role ────────────────────────────────────────────────────────────────────

/// Departmental role; drives archive scope and which surfaces are permitted.
///
/// Stored and serialised as its upper-case name. Any string outside the known
/// set is kept verbatim (upper-cased) as [`Role::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
  Lecturer,
  Admin,
  Kpp,
  Auditor,
  Ajk,
  Other(String),
}

impl Role {
  pub fn as_str(&self) -> &str {
    match self {
      Self::Lecturer => "LECTURER",
      Self::Admin => "ADMIN",
      Self::Kpp => "KPP",
      Self::Auditor => "AUDITOR",
      Self::Ajk => "AJK",
      Self::Other(s) => s,
    }
  }

  /// `true` for the five roles the department defines.
  pub fn is_recognised(&self) -> bool { !matches!(self, Self::Other(_)) }

  /// Parse case-insensitively; surrounding whitespace is ignored.
  pub fn parse(s: &str) -> Self {
    let upper = s.trim().to_uppercase();
    match upper.as_str() {
      "LECTURER" => Self::Lecturer,
      "ADMIN" => Self::Admin,
      "KPP" => Self::Kpp,
      "AUDITOR" => Self::Auditor,
      "AJK" => Self::Ajk,
      _ => Self::Other(upper),
    }
  }
}

impl From<String> for Role {
  fn from(s: String) -> Self { Self::parse(&s) }
}

impl From<Role> for String {
  fn from(r: Role) -> Self { r.as_str().to_owned() }
}

impl fmt::Display for Role {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

// ─── User ────────────────────────────────────────────────────────────────────

/// A persisted user row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
  pub id:            i64,
  /// Free-text category, upper-cased (usually mirrors `role`).
  pub category:      String,
  pub role:          Role,
  pub name:          String,
  /// Unique, always lower-case.
  pub username:      String,
  /// argon2 PHC string. Never leaves the server.
  #[serde(skip_serializing)]
  pub password_hash: String,
  pub notes:         String,
}

/// Input to [`crate::store::LedgerStore::add_user`].
#[derive(Debug, Clone)]
pub struct NewUser {
  pub category:      String,
  pub role:          Role,
  pub name:          String,
  pub username:      String,
  pub password_hash: String,
  pub notes:         String,
}

/// Normalise a username the way the ledger stores it.
pub fn normalize_username(s: &str) -> String { s.trim().to_lowercase() }

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn role_parse_is_case_insensitive() {
    assert_eq!(Role::parse("lecturer"), Role::Lecturer);
    assert_eq!(Role::parse(" Auditor "), Role::Auditor);
    assert_eq!(Role::parse("kpp"), Role::Kpp);
  }

  #[test]
  fn unknown_role_is_kept_upper_cased() {
    let role = Role::parse("guest");
    assert_eq!(role, Role::Other("GUEST".into()));
    assert!(!role.is_recognised());
    assert_eq!(role.to_string(), "GUEST");
  }

  #[test]
  fn role_serialises_as_plain_string() {
    let json = serde_json::to_string(&Role::Ajk).unwrap();
    assert_eq!(json, "\"AJK\"");
    let back: Role = serde_json::from_str("\"admin\"").unwrap();
    assert_eq!(back, Role::Admin);
  }

  #[test]
  fn password_hash_is_not_serialised() {
    let user = User {
      id:            1,
      category:      "LECTURER".into(),
      role:          Role::Lecturer,
      name:          "Alice".into(),
      username:      "alice".into(),
      password_hash: "$argon2id$secret".into(),
      notes:         String::new(),
    };
    let json = serde_json::to_string(&user).unwrap();
    assert!(!json.contains("argon2"), "{json}");
  }
}
