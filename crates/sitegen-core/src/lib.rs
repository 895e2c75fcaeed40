//! Sitegen Core - Foundational types for the sitegen pipeline
//!
//! This crate provides the types the other sitegen crates depend on:
//! - Error types and Result alias
//! - UTC timestamp formatting for manifests

mod error;
mod time;

pub use error::{Result, SitegenError};
pub use time::now_iso8601;
