//! Subject: a course catalog entry with its LIC and RP appointments.

use serde::{Deserialize, Serialize};

/// A persisted subject row. Appointment periods are free text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
  pub code:      String,
  pub name:      String,
  /// Lecturer(s)-in-charge, comma separated.
  pub lic:       String,
  pub lic_start: String,
  pub lic_end:   String,
  /// Responsible person(s), comma separated.
  pub rp:        String,
  pub rp_start:  String,
  pub rp_end:    String,
}

/// Input to [`crate::store::LedgerStore::add_subject`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewSubject {
  pub code:      String,
  pub name:      String,
  #[serde(default)]
  pub lic:       String,
  #[serde(default)]
  pub lic_start: String,
  #[serde(default)]
  pub lic_end:   String,
  #[serde(default)]
  pub rp:        String,
  #[serde(default)]
  pub rp_start:  String,
  #[serde(default)]
  pub rp_end:    String,
}

impl NewSubject {
  /// A subject with only code and name; appointment fields left blank.
  pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
    Self { code: code.into(), name: name.into(), ..Self::default() }
  }
}
