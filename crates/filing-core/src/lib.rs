//! Core types and trait definitions for the departmental filing portal.
//!
//! No HTTP, filesystem or database dependencies. Every other crate in the
//! workspace depends on it.

pub mod access;
pub mod error;
pub mod file_item;
pub mod search;
pub mod store;
pub mod subject;
pub mod user;

pub use error::{Error, Result};
