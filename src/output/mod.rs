//! Output boundary for the presentation layer
//!
//! This module handles:
//! - Emitting the finalized catalog as a JSON document
//! - The sorting and filtering semantics consumers rely on

mod document;
mod sort;

pub use document::{shorten, write_catalog, CatalogEntry};
pub use sort::{filter_excluded, matches_category, matches_search, sort_records, SortKey};
