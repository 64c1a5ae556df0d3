//! # folio_core
//!
//! Core domain logic for Folio: identities, signed tokens, blog/portfolio
//! content, and the persistence store those are kept in.

pub mod auth;
pub mod migrate;
pub mod models;
pub mod slug;
pub mod store;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
