//! Filesystem side of the filing portal.
//!
//! [`ContentStore`] places uploaded bytes under a deterministic,
//! digest-bearing filename. [`public`] lists the allow-listed public subtree
//! straight from disk, independent of the ledger.

mod content;
mod layout;

pub mod error;
pub mod public;

pub use content::{ContentStore, StoredContent, UploadMeta, digest_hex, stored_filename};
pub use error::{Error, Result};
pub use layout::DataLayout;
