//! Business logic behind the handlers.

pub mod auth;
pub mod posts;
pub mod uploads;
