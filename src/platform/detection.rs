//! Repository URL parsing and API endpoint resolution

use crate::error::{Error, Result};

/// Public GitHub domain; any other host is treated as GitHub Enterprise
pub const PUBLIC_GITHUB_DOMAIN: &str = "github.com";

/// REST API base for public GitHub
pub const PUBLIC_API_BASE: &str = "https://api.github.com";

/// Where a repository lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoLocation {
    /// Host (with port, if the URL carried one)
    pub host: String,
    /// Repository owner (user or organization)
    pub owner: String,
    /// Repository name, without `.git`
    pub repo: String,
}

impl RepoLocation {
    /// Whether the repository is on public GitHub
    pub fn is_public(&self) -> bool {
        is_public_github(&self.host)
    }

    /// REST API base for this repository's host
    pub fn api_base(&self) -> String {
        resolve_api_base(&self.host)
    }
}

/// Parse `owner` and `repo` out of a repository URL
///
/// Takes the last two path segments after dropping a trailing slash and a
/// trailing `.git`. Accepts `https://host/OWNER/REPO[.git]` and the SSH form
/// `git@host:OWNER/REPO[.git]`.
pub fn parse_github_url(url: &str) -> Result<RepoLocation> {
    let trimmed = url.trim();
    let (host, path) = split_host_and_path(trimmed)
        .ok_or_else(|| Error::InvalidGitHubUrl(url.to_string()))?;

    let segments: Vec<&str> = path
        .trim_end_matches('/')
        .split('/')
        .filter(|s| !s.is_empty())
        .collect();

    let [.., owner, repo] = segments.as_slice() else {
        return Err(Error::InvalidGitHubUrl(url.to_string()));
    };

    let repo = repo.strip_suffix(".git").unwrap_or(repo);
    if repo.is_empty() {
        return Err(Error::InvalidGitHubUrl(url.to_string()));
    }

    Ok(RepoLocation {
        host,
        owner: (*owner).to_string(),
        repo: repo.to_string(),
    })
}

/// Whether a host belongs to public GitHub
pub fn is_public_github(host: &str) -> bool {
    host.to_ascii_lowercase().contains(PUBLIC_GITHUB_DOMAIN)
}

/// API base for a host: the public API, or `https://<host>/api/v3` for
/// enterprise installations
pub fn resolve_api_base(host: &str) -> String {
    if is_public_github(host) {
        PUBLIC_API_BASE.to_string()
    } else {
        format!("https://{host}/api/v3")
    }
}

fn split_host_and_path(url: &str) -> Option<(String, String)> {
    // SSH format
    if let Some(rest) = url.strip_prefix("git@") {
        let (host, path) = rest.split_once(':')?;
        return Some((host.to_string(), path.to_string()));
    }

    // HTTPS format
    let parsed = url::Url::parse(url).ok()?;
    let host = parsed.host_str()?;
    let host = match parsed.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    };
    Some((host, parsed.path().to_string()))
}
