//! Public exposure: a filesystem scan of the public subtree.
//!
//! Files are classified by their top-level directory under the public root
//! and kept only when that directory names a public [`DocType`]. The ledger is
//! never consulted, so a file copied into the tree by hand is listed too.

use std::path::{Component, Path, PathBuf};

use filing_core::{file_item::DocType, search::Searchable};
use serde::Serialize;
use walkdir::WalkDir;

use crate::{Result, content::TEMP_PREFIX};

/// One publicly listed document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublicEntry {
  #[serde(rename = "type")]
  pub doc_type:      DocType,
  pub filename:      String,
  /// `/`-separated path relative to the public root; used as download key.
  pub relative_path: String,
  #[serde(skip)]
  pub path:          PathBuf,
}

impl Searchable for PublicEntry {
  // Only type and filename are searchable on the public page.
  fn columns(&self) -> Vec<String> {
    vec![self.doc_type.to_string(), self.filename.clone()]
  }
}

/// The allow-listed type of a file at `relative` (relative to the public
/// root), or `None` when its top-level directory is not public.
pub fn classify(relative: &Path) -> Option<DocType> {
  let mut parts = relative.components();
  let top = match parts.next()? {
    Component::Normal(s) => s.to_string_lossy().to_lowercase(),
    _ => return None,
  };
  // A file sitting directly in the public root has no type directory.
  parts.next()?;
  DocType::PUBLIC.into_iter().find(|t| t.as_str() == top)
}

/// Recursively list the allow-listed files under `root`, sorted by type then
/// filename. Returns `None` when the public root does not exist.
pub fn list_public(root: &Path) -> Result<Option<Vec<PublicEntry>>> {
  if !root.is_dir() {
    return Ok(None);
  }

  let mut entries = Vec::new();
  for entry in WalkDir::new(root).min_depth(1) {
    let entry = entry?;
    if !entry.file_type().is_file()
      || entry.file_name().to_string_lossy().starts_with(TEMP_PREFIX)
    {
      continue;
    }
    let Ok(relative) = entry.path().strip_prefix(root) else {
      continue;
    };
    let Some(doc_type) = classify(relative) else {
      tracing::trace!(path = %entry.path().display(), "skipping non-public file");
      continue;
    };
    let relative_path = relative
      .components()
      .map(|c| c.as_os_str().to_string_lossy())
      .collect::<Vec<_>>()
      .join("/");

    entries.push(PublicEntry {
      doc_type,
      filename: entry.file_name().to_string_lossy().into_owned(),
      relative_path,
      path: entry.path().to_path_buf(),
    });
  }

  entries.sort_by(|a, b| {
    (a.doc_type.as_str(), &a.filename).cmp(&(b.doc_type.as_str(), &b.filename))
  });
  Ok(Some(entries))
}

/// Resolve a download key against the current listing. Only files the
/// listing would show can be found.
pub fn find_public(root: &Path, relative_path: &str) -> Result<Option<PublicEntry>> {
  Ok(
    list_public(root)?
      .unwrap_or_default()
      .into_iter()
      .find(|e| e.relative_path == relative_path),
  )
}

#[cfg(test)]
mod tests {
  use filing_core::search::filter;

  use super::*;

  fn touch(root: &Path, rel: &str) {
    let path = root.join(rel);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, rel.as_bytes()).unwrap();
  }

  #[test]
  fn missing_root_is_not_available() {
    let dir = tempfile::tempdir().unwrap();
    assert!(list_public(&dir.path().join("public")).unwrap().is_none());
  }

  #[test]
  fn only_allow_listed_types_are_listed() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    touch(root, "rubrics/b.pdf");
    touch(root, "rubrics/a.pdf");
    touch(root, "cap/x.pdf");
    touch(root, "Course_Info/nested/deep.pdf");
    touch(root, "lesson_plan/secret.pdf");
    touch(root, "private/leak.pdf");
    touch(root, "rubrics.pdf");

    let listed = list_public(root).unwrap().unwrap();
    let keys: Vec<_> = listed.iter().map(|e| e.relative_path.as_str()).collect();
    assert_eq!(keys, ["cap/x.pdf", "Course_Info/nested/deep.pdf", "rubrics/a.pdf", "rubrics/b.pdf"]);
    assert!(listed.iter().all(|e| e.doc_type.is_public()));
    assert_eq!(listed[1].doc_type, DocType::CourseInfo);
    assert_eq!(listed[1].filename, "deep.pdf");
  }

  #[test]
  fn type_directory_must_match_exactly() {
    let dir = tempfile::tempdir().unwrap();
    touch(dir.path(), " cap/padded.pdf");
    touch(dir.path(), "cap /padded.pdf");
    touch(dir.path(), "CAP/upper.pdf");
    let listed = list_public(dir.path()).unwrap().unwrap();
    let keys: Vec<_> = listed.iter().map(|e| e.relative_path.as_str()).collect();
    assert_eq!(keys, ["CAP/upper.pdf"]);
    assert_eq!(classify(Path::new(" cap/padded.pdf")), None);
  }

  #[test]
  fn in_flight_uploads_are_not_listed() {
    let dir = tempfile::tempdir().unwrap();
    touch(dir.path(), "rubrics/.upload-a1b2c3");
    touch(dir.path(), "rubrics/done.pdf");
    let listed = list_public(dir.path()).unwrap().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].filename, "done.pdf");
  }

  #[test]
  fn out_of_band_files_are_exposed() {
    let dir = tempfile::tempdir().unwrap();
    touch(dir.path(), "cap/copied-by-hand.pdf");
    let listed = list_public(dir.path()).unwrap().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].path, dir.path().join("cap").join("copied-by-hand.pdf"));
  }

  #[test]
  fn find_only_resolves_listed_files() {
    let dir = tempfile::tempdir().unwrap();
    touch(dir.path(), "rubrics/a.pdf");
    touch(dir.path(), "slt/hidden.pdf");
    assert!(find_public(dir.path(), "rubrics/a.pdf").unwrap().is_some());
    assert!(find_public(dir.path(), "slt/hidden.pdf").unwrap().is_none());
    assert!(find_public(dir.path(), "../etc/passwd").unwrap().is_none());
  }

  #[test]
  fn search_matches_type_and_filename_only() {
    let dir = tempfile::tempdir().unwrap();
    touch(dir.path(), "rubrics/STA101_rubric.pdf");
    touch(dir.path(), "cap/nested/STA202_cap.pdf");
    let listed = list_public(dir.path()).unwrap().unwrap();

    assert_eq!(filter(listed.clone(), Some("sta101")).len(), 1);
    assert_eq!(filter(listed.clone(), Some("CAP")).len(), 1);
    // Intermediate directories are not searchable.
    assert!(filter(listed, Some("nested")).is_empty());
  }
}
