//! Route handlers, one module per resource.

pub mod files;
pub mod public;
pub mod session;
pub mod subjects;
pub mod users;

use axum::{
  body::Body,
  http::{HeaderValue, StatusCode, header},
  response::Response,
};
use bytes::Bytes;
use serde::Deserialize;

use crate::error::Error;

/// `?q=` on every searchable listing.
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
  pub q: Option<String>,
}

/// Keep a download name inside a quoted header parameter.
fn header_filename(name: &str) -> String {
  name
    .chars()
    .map(|c| match c {
      '"' | '\\' => '_',
      c if c.is_ascii_graphic() || c == ' ' => c,
      _ => '_',
    })
    .collect()
}

/// A byte response offered as a download named `filename`.
pub(crate) fn attachment(
  bytes:    Bytes,
  filename: &str,
  etag:     Option<&str>,
) -> Result<Response, Error> {
  let disposition = format!("attachment; filename=\"{}\"", header_filename(filename));
  let mut builder = Response::builder()
    .status(StatusCode::OK)
    .header(header::CONTENT_TYPE, "application/octet-stream")
    .header(header::CONTENT_LENGTH, bytes.len())
    .header(
      header::CONTENT_DISPOSITION,
      HeaderValue::from_str(&disposition).map_err(|e| Error::Internal(e.to_string()))?,
    );
  if let Some(tag) = etag {
    builder = builder.header(header::ETAG, format!("\"{tag}\""));
  }
  builder
    .body(Body::from(bytes))
    .map_err(|e| Error::Internal(e.to_string()))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn header_filename_replaces_unsafe_characters() {
    assert_eq!(header_filename("STA101 rubric.pdf"), "STA101 rubric.pdf");
    assert_eq!(header_filename("a\"b\\c\r\n.pdf"), "a_b_c__.pdf");
    assert_eq!(header_filename("rancangan_é.pdf"), "rancangan__.pdf");
  }
}
