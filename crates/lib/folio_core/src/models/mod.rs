//! Domain models shared by the store and the HTTP layer.

pub mod auth;
pub mod content;
