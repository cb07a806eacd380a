//! CLI commands
//!
//! Command implementations for the `template-pr` binary.

mod auth;
mod progress;
mod run;
mod serve;
pub mod style;

pub use auth::{run_auth_setup, run_auth_test};
pub use run::run_batch;
pub use serve::run_serve;
