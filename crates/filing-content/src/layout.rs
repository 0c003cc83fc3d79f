//! Directory layout under the configured data directory.

use std::path::{Path, PathBuf};

use filing_core::file_item::DocType;

/// Names every directory the portal reads or writes.
///
/// ```text
/// <root>/uploads/               private documents
/// <root>/public/<doc_type>/     rubrics, course_info, cap
/// <root>/seed/                  first-run CSV files
/// ```
#[derive(Debug, Clone)]
pub struct DataLayout {
  root: PathBuf,
}

impl DataLayout {
  pub fn new(root: impl Into<PathBuf>) -> Self { Self { root: root.into() } }

  pub fn root(&self) -> &Path { &self.root }

  pub fn uploads_dir(&self) -> PathBuf { self.root.join("uploads") }

  pub fn public_dir(&self) -> PathBuf { self.root.join("public") }

  pub fn seed_dir(&self) -> PathBuf { self.root.join("seed") }

  /// Where a document of `doc_type` is stored.
  pub fn dir_for(&self, doc_type: DocType) -> PathBuf {
    if doc_type.is_public() {
      self.public_dir().join(doc_type.as_str())
    } else {
      self.uploads_dir()
    }
  }

  /// Create the uploads directory and every public type directory.
  pub async fn ensure(&self) -> std::io::Result<()> {
    tokio::fs::create_dir_all(self.uploads_dir()).await?;
    for t in DocType::PUBLIC {
      tokio::fs::create_dir_all(self.dir_for(t)).await?;
    }
    Ok(())
  }
}
