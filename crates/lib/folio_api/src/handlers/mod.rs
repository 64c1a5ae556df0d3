//! Request handlers.

pub mod activities;
pub mod auth;
pub mod health;
pub mod posts;
pub mod projects;
pub mod skills;
pub mod uploads;
