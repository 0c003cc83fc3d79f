//! [`ContentStore`]: deterministic placement of uploaded bytes.
//!
//! The stored filename is
//! `{subject_code}_{role}_{doc_type}_{semester}_{digest8}_{original_filename}`,
//! so the same tuple of metadata, content and name always maps to the same
//! path. An existing file at that path is never overwritten.

use std::path::{Path, PathBuf};

use bytes::Bytes;
use filing_core::file_item::{DocType, SubjectRole};
use sha2::{Digest, Sha256};
use tokio::io::{AsyncRead, AsyncWriteExt as _};

use crate::{DataLayout, Error, Result};

/// Prefix of in-flight upload files; never part of a stored filename.
pub const TEMP_PREFIX: &str = ".upload-";

/// Number of hex digest characters embedded in the filename.
const DIGEST_PREFIX_LEN: usize = 8;

/// Lowercase hex SHA-256 of `bytes`.
pub fn digest_hex(bytes: &[u8]) -> String { hex::encode(Sha256::digest(bytes)) }

/// Upload metadata that determines where the bytes land.
#[derive(Debug, Clone, Copy)]
pub struct UploadMeta<'a> {
  pub subject_code:      &'a str,
  pub role:              SubjectRole,
  pub doc_type:          DocType,
  pub semester:          &'a str,
  pub original_filename: &'a str,
}

/// Where an upload was placed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredContent {
  pub path:    PathBuf,
  pub sha256:  String,
  /// `false` when an identical file was already present and the write was
  /// skipped.
  pub written: bool,
}

fn check_component<'a>(field: &'static str, value: &'a str) -> Result<&'a str> {
  if value.contains(['/', '\\', '\0']) || value == "." || value == ".." {
    return Err(Error::InvalidComponent { field, value: value.to_owned() });
  }
  Ok(value)
}

/// Strip any directory part a client sent along with the filename.
fn base_name(original: &str) -> Result<&str> {
  let name = original.rsplit(['/', '\\']).next().unwrap_or_default();
  if name.is_empty() {
    return Err(Error::InvalidComponent {
      field: "original_filename",
      value: original.to_owned(),
    });
  }
  check_component("original_filename", name)
}

/// Compute the stored filename for `meta` and a full hex `digest`.
pub fn stored_filename(meta: &UploadMeta<'_>, digest: &str) -> Result<String> {
  let subject = check_component("subject_code", meta.subject_code)?;
  if subject.is_empty() {
    return Err(Error::InvalidComponent { field: "subject_code", value: String::new() });
  }
  let semester = check_component("semester", meta.semester)?;
  let name = base_name(meta.original_filename)?;
  let prefix = &digest[..DIGEST_PREFIX_LEN.min(digest.len())];

  Ok(format!(
    "{subject}_{role}_{doc_type}_{semester}_{prefix}_{name}",
    role = meta.role,
    doc_type = meta.doc_type,
  ))
}

/// Copy `src` into a temporary file in `dir`, then link it to `path` only
/// once complete. A partial write never appears at `path`; the temporary is
/// removed on any error. Returns `false` if `path` was taken in the meantime.
async fn place<R>(dir: &Path, path: &Path, mut src: R) -> Result<bool>
where
  R: AsyncRead + Unpin,
{
  let tmp = tempfile::Builder::new()
    .prefix(TEMP_PREFIX)
    .tempfile_in(dir)?;
  let mut file = tokio::fs::File::from_std(tmp.as_file().try_clone()?);
  tokio::io::copy(&mut src, &mut file).await?;
  file.flush().await?;
  drop(file);

  match tmp.persist_noclobber(path) {
    Ok(_) => Ok(true),
    Err(e) if e.error.kind() == std::io::ErrorKind::AlreadyExists => Ok(false),
    Err(e) => Err(e.error.into()),
  }
}

/// Writes and re-reads uploaded bytes under a [`DataLayout`].
#[derive(Debug, Clone)]
pub struct ContentStore {
  layout: DataLayout,
}

impl ContentStore {
  pub fn new(layout: DataLayout) -> Self { Self { layout } }

  pub fn layout(&self) -> &DataLayout { &self.layout }

  /// Digest `bytes`, compute the destination and write unless a file already
  /// exists there. Filesystem errors are returned as-is; nothing is retried.
  pub async fn store(&self, bytes: &[u8], meta: &UploadMeta<'_>) -> Result<StoredContent> {
    let sha256 = digest_hex(bytes);
    let filename = stored_filename(meta, &sha256)?;

    let dir = self.layout.dir_for(meta.doc_type);
    tokio::fs::create_dir_all(&dir).await?;
    let path = dir.join(filename);

    let written = if tokio::fs::try_exists(&path).await? {
      false
    } else {
      place(&dir, &path, bytes).await?
    };

    if written {
      tracing::info!(path = %path.display(), size = bytes.len(), "stored upload");
    } else {
      tracing::debug!(path = %path.display(), "identical upload already on disk");
    }

    Ok(StoredContent { path, sha256, written })
  }

  /// Re-read stored bytes. A missing file is [`Error::NotFound`].
  pub async fn read(&self, path: impl AsRef<Path>) -> Result<Bytes> {
    let path = path.as_ref();
    match tokio::fs::read(path).await {
      Ok(data) => Ok(Bytes::from(data)),
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
        Err(Error::NotFound(path.to_path_buf()))
      }
      Err(e) => Err(e.into()),
    }
  }

  pub async fn exists(&self, path: impl AsRef<Path>) -> bool {
    tokio::fs::try_exists(path).await.unwrap_or(false)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn meta<'a>(doc_type: DocType, name: &'a str) -> UploadMeta<'a> {
    UploadMeta {
      subject_code: "STA101",
      role: SubjectRole::Lic,
      doc_type,
      semester: "Okt 2025",
      original_filename: name,
    }
  }

  fn store_in(dir: &tempfile::TempDir) -> ContentStore {
    ContentStore::new(DataLayout::new(dir.path()))
  }

  fn files_in(dir: &Path) -> usize {
    std::fs::read_dir(dir).map(|d| d.count()).unwrap_or(0)
  }

  #[test]
  fn digest_matches_known_vector() {
    assert_eq!(
      digest_hex(b"abc"),
      "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
    );
  }

  #[test]
  fn filename_follows_convention() {
    let name = stored_filename(&meta(DocType::Rubrics, "rubric.pdf"), "ba7816bf8f01cfea").unwrap();
    assert_eq!(name, "STA101_LIC_rubrics_Okt 2025_ba7816bf_rubric.pdf");
  }

  #[test]
  fn filename_drops_client_directories() {
    let name = stored_filename(&meta(DocType::Slt, "C:\\Users\\me\\slt.xlsx"), "0123456789").unwrap();
    assert!(name.ends_with("_01234567_slt.xlsx"), "{name}");
    let name = stored_filename(&meta(DocType::Slt, "../../etc/passwd"), "0123456789").unwrap();
    assert!(name.ends_with("_passwd"), "{name}");
  }

  #[test]
  fn path_separators_in_metadata_are_rejected() {
    let mut m = meta(DocType::Cap, "cap.pdf");
    m.semester = "../escape";
    assert!(matches!(
      stored_filename(&m, "00000000"),
      Err(Error::InvalidComponent { field: "semester", .. })
    ));

    let mut m = meta(DocType::Cap, "cap.pdf");
    m.subject_code = "";
    assert!(stored_filename(&m, "00000000").is_err());

    assert!(stored_filename(&meta(DocType::Cap, "dir/"), "00000000").is_err());
  }

  #[tokio::test]
  async fn public_upload_lands_in_public_type_dir() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);
    let bytes = b"0123456789";

    let stored = store.store(bytes, &meta(DocType::Rubrics, "rubric.pdf")).await.unwrap();

    let expected = dir.path().join("public").join("rubrics").join(format!(
      "STA101_LIC_rubrics_Okt 2025_{}_rubric.pdf",
      &digest_hex(bytes)[..8]
    ));
    assert_eq!(stored.path, expected);
    assert!(stored.written);
    assert_eq!(std::fs::read(&expected).unwrap(), bytes);
  }

  #[tokio::test]
  async fn private_upload_lands_in_uploads() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);
    let stored = store.store(b"plan", &meta(DocType::LessonPlan, "plan.docx")).await.unwrap();
    assert_eq!(stored.path.parent().unwrap(), dir.path().join("uploads"));
  }

  #[tokio::test]
  async fn identical_upload_is_written_once() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);
    let m = meta(DocType::Cap, "cap.pdf");

    let first = store.store(b"same bytes", &m).await.unwrap();
    let second = store.store(b"same bytes", &m).await.unwrap();

    assert!(first.written);
    assert!(!second.written);
    assert_eq!(first.path, second.path);
    assert_eq!(files_in(&dir.path().join("public").join("cap")), 1);
  }

  #[tokio::test]
  async fn different_content_gets_a_different_path() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);
    let m = meta(DocType::Cap, "cap.pdf");

    let a = store.store(b"version one", &m).await.unwrap();
    let b = store.store(b"version two", &m).await.unwrap();
    assert_ne!(a.path, b.path);
    assert_eq!(files_in(&dir.path().join("public").join("cap")), 2);
  }

  #[tokio::test]
  async fn stored_digest_matches_bytes_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);
    let stored = store.store(b"\x00\x01binary", &meta(DocType::JsuTest, "jsu.bin")).await.unwrap();
    let on_disk = store.read(&stored.path).await.unwrap();
    assert_eq!(digest_hex(&on_disk), stored.sha256);
  }

  /// Yields an error on the first read, like a dropped client connection.
  struct Broken;

  impl AsyncRead for Broken {
    fn poll_read(
      self: std::pin::Pin<&mut Self>,
      _: &mut std::task::Context<'_>,
      _: &mut tokio::io::ReadBuf<'_>,
    ) -> std::task::Poll<std::io::Result<()>> {
      std::task::Poll::Ready(Err(std::io::Error::other("connection reset")))
    }
  }

  #[tokio::test]
  async fn interrupted_write_leaves_nothing_behind() {
    use tokio::io::AsyncReadExt as _;

    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("STA101_LIC_cap_Okt 2025_00000000_cap.pdf");

    let partial = (&b"first half"[..]).chain(Broken);
    assert!(place(dir.path(), &dest, partial).await.is_err());
    assert!(!dest.exists());
    assert_eq!(files_in(dir.path()), 0);
  }

  #[tokio::test]
  async fn store_after_failed_write_keeps_digest_invariant() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);
    let bytes = vec![7u8; 8192];
    let m = meta(DocType::Cap, "cap.pdf");

    // Same destination a full upload of `bytes` would use.
    let cap_dir = dir.path().join("public").join("cap");
    std::fs::create_dir_all(&cap_dir).unwrap();
    let dest = cap_dir.join(stored_filename(&m, &digest_hex(&bytes)).unwrap());
    let partial = tokio::io::AsyncReadExt::chain(&bytes[..4096], Broken);
    assert!(place(&cap_dir, &dest, partial).await.is_err());

    let stored = store.store(&bytes, &m).await.unwrap();
    assert!(stored.written);
    assert_eq!(stored.path, dest);
    assert_eq!(digest_hex(&std::fs::read(&dest).unwrap()), stored.sha256);
    assert_eq!(files_in(&cap_dir), 1);
  }

  #[tokio::test]
  async fn read_missing_file_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);
    let missing = dir.path().join("uploads").join("gone.pdf");
    assert!(matches!(store.read(&missing).await, Err(Error::NotFound(p)) if p == missing));
    assert!(!store.exists(&missing).await);
  }
}
