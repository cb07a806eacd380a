//! Authentication for GitHub and GitHub Enterprise
//!
//! Tokens come from the process environment, read once at startup.

mod github;

pub use github::{
    AuthScheme, CLASSIC_PAT_PREFIX, FINE_GRAINED_PAT_PREFIX, GitHubAuthConfig, get_github_auth,
    github_auth_from, test_github_auth,
};

/// Source of authentication token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthSource {
    /// Token from the named environment variable
    EnvVar(&'static str),
}

impl std::fmt::Display for AuthSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EnvVar(name) => write!(f, "{name}"),
        }
    }
}
