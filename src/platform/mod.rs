//! GitHub pull-request service
//!
//! Resolves public vs enterprise endpoints from repository URLs and opens
//! pull requests through the REST API.

mod detection;
mod github;

pub use detection::{
    PUBLIC_API_BASE, PUBLIC_GITHUB_DOMAIN, RepoLocation, is_public_github, parse_github_url,
    resolve_api_base,
};
pub use github::{API_VERSION, GitHubService, GitHubSettings, USER_AGENT};

use crate::types::PrOutcome;
use async_trait::async_trait;

/// Everything needed to open one pull request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPullRequest {
    /// Repository clone URL (public or enterprise)
    pub repo_url: String,
    /// Branch the PR merges into
    pub base_branch: String,
    /// Branch carrying the changes
    pub head_branch: String,
    /// PR title
    pub title: String,
    /// PR body (markdown)
    pub body: String,
}

/// Pull-request creation seam
///
/// The batch pipeline only talks to this trait, so handlers and CLI can be
/// exercised without a network.
#[async_trait]
pub trait PullRequestService: Send + Sync {
    /// Open a PR; every failure is folded into [`PrOutcome::Failed`]
    async fn create_pull_request(&self, request: &NewPullRequest) -> PrOutcome;
}
