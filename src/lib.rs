//! template-pr - render pipeline templates into repositories and open PRs
//!
//! This library is the core of the `template-pr` service: it turns
//! spreadsheet rows or single form submissions into a canonical CSV batch,
//! runs the external rendering script against it, reconstructs per-record
//! results from the script's output and opens the pull requests through the
//! GitHub REST API (public or enterprise).

pub mod auth;
pub mod automation;
pub mod config;
pub mod error;
pub mod normalize;
pub mod platform;
pub mod server;
pub mod submit;
pub mod types;

pub use error::{Error, Result};
