//! CLI command implementations.

pub mod auth;
pub mod cache;
pub mod validate;
