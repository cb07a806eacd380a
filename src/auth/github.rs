//! GitHub authentication

use crate::auth::AuthSource;
use crate::error::Result;
use crate::platform::GitHubService;
use std::env;

/// Prefix of fine-grained personal access tokens
pub const FINE_GRAINED_PAT_PREFIX: &str = "github_pat_";

/// Prefix of classic personal access tokens
pub const CLASSIC_PAT_PREFIX: &str = "ghp_";

/// Environment variables consulted, in priority order
const TOKEN_VARS: [&str; 2] = ["GITHUB_TOKEN", "GH_TOKEN"];

/// GitHub authentication configuration
#[derive(Clone)]
pub struct GitHubAuthConfig {
    /// Authentication token
    pub token: String,
    /// Where the token was obtained from
    pub source: AuthSource,
}

impl std::fmt::Debug for GitHubAuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubAuthConfig")
            .field("token", &"<redacted>")
            .field("source", &self.source)
            .finish()
    }
}

/// Get GitHub authentication from the environment
///
/// Priority:
/// 1. `GITHUB_TOKEN` environment variable
/// 2. `GH_TOKEN` environment variable
///
/// Returns `None` when neither is set; that is not fatal, PR creation
/// reports the missing token per record instead.
pub fn get_github_auth() -> Option<GitHubAuthConfig> {
    github_auth_from(|name| env::var(name).ok())
}

/// Same as [`get_github_auth`] with an injectable variable lookup
pub fn github_auth_from(lookup: impl Fn(&str) -> Option<String>) -> Option<GitHubAuthConfig> {
    TOKEN_VARS.iter().find_map(|&name| {
        lookup(name)
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .map(|token| GitHubAuthConfig {
                token,
                source: AuthSource::EnvVar(name),
            })
    })
}

/// Authorization header scheme for a token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthScheme {
    /// `Authorization: Bearer <token>` for personal access tokens
    Bearer,
    /// `Authorization: token <token>` for everything else
    Token,
}

impl AuthScheme {
    /// Pick the scheme from the token's prefix
    pub fn for_token(token: &str) -> Self {
        if token.starts_with(FINE_GRAINED_PAT_PREFIX) || token.starts_with(CLASSIC_PAT_PREFIX) {
            Self::Bearer
        } else {
            Self::Token
        }
    }

    /// Full `Authorization` header value
    pub fn header_value(self, token: &str) -> String {
        match self {
            Self::Bearer => format!("Bearer {token}"),
            Self::Token => format!("token {token}"),
        }
    }
}

/// Test GitHub authentication against a host
///
/// Returns the login of the token's owner.
pub async fn test_github_auth(service: &GitHubService, host: &str) -> Result<String> {
    service.current_user(host).await
}
