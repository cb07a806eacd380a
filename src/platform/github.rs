//! GitHub platform service implementation

use crate::auth::AuthScheme;
use crate::error::{Error, Result};
use crate::platform::detection::{parse_github_url, resolve_api_base};
use crate::platform::{NewPullRequest, PullRequestService};
use crate::types::{PrOutcome, PullRequest};
use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION, USER_AGENT as USER_AGENT_HEADER};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// REST API version pinned on every request
pub const API_VERSION: &str = "2022-11-28";

/// User agent identifying this tool
pub const USER_AGENT: &str = concat!("template-pr/", env!("CARGO_PKG_VERSION"));

/// Default request timeout in seconds
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Construction-time settings for [`GitHubService`]
#[derive(Clone)]
pub struct GitHubSettings {
    /// Token; `None` makes every PR call fail without touching the network
    pub token: Option<String>,
    /// Per-request timeout
    pub timeout: Duration,
    /// Accept invalid TLS certificates (self-signed enterprise hosts).
    /// Off unless explicitly enabled.
    pub accept_invalid_certs: bool,
    /// Use this API base instead of resolving one from the repository host
    pub api_base_override: Option<String>,
}

impl Default for GitHubSettings {
    fn default() -> Self {
        Self {
            token: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            accept_invalid_certs: false,
            api_base_override: None,
        }
    }
}

impl std::fmt::Debug for GitHubSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubSettings")
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("timeout", &self.timeout)
            .field("accept_invalid_certs", &self.accept_invalid_certs)
            .field("api_base_override", &self.api_base_override)
            .finish()
    }
}

#[derive(Serialize)]
struct CreatePrPayload<'a> {
    title: &'a str,
    body: &'a str,
    head: &'a str,
    base: &'a str,
}

#[derive(Deserialize)]
struct CreatedPr {
    html_url: String,
    number: u64,
}

#[derive(Deserialize)]
struct GitHubUser {
    login: String,
}

/// GitHub service using reqwest
pub struct GitHubService {
    client: Client,
    token: Option<String>,
    api_base_override: Option<String>,
}

impl GitHubService {
    /// Create a new GitHub service
    pub fn new(settings: GitHubSettings) -> Result<Self> {
        if settings.accept_invalid_certs {
            warn!("TLS certificate verification disabled for GitHub requests");
        }

        let client = Client::builder()
            .timeout(settings.timeout)
            .danger_accept_invalid_certs(settings.accept_invalid_certs)
            .build()?;

        Ok(Self {
            client,
            token: settings.token.filter(|t| !t.trim().is_empty()),
            api_base_override: settings
                .api_base_override
                .map(|b| b.trim_end_matches('/').to_string()),
        })
    }

    /// Whether a token is configured
    pub const fn has_token(&self) -> bool {
        self.token.is_some()
    }

    fn api_base(&self, host: &str) -> String {
        self.api_base_override
            .clone()
            .unwrap_or_else(|| resolve_api_base(host))
    }

    fn authorized(&self, request: RequestBuilder, token: &str) -> RequestBuilder {
        request
            .header(AUTHORIZATION, AuthScheme::for_token(token).header_value(token))
            .header(ACCEPT, "application/vnd.github+json")
            .header(USER_AGENT_HEADER, USER_AGENT)
            .header("X-GitHub-Api-Version", API_VERSION)
    }

    fn token(&self) -> Result<&str> {
        self.token.as_deref().ok_or(Error::TokenMissing)
    }

    /// Open a PR, returning an error for anything but HTTP 201
    pub async fn try_create_pull_request(&self, request: &NewPullRequest) -> Result<PullRequest> {
        let token = self.token()?;
        let location = parse_github_url(&request.repo_url)?;
        let url = format!(
            "{}/repos/{}/{}/pulls",
            self.api_base(&location.host),
            location.owner,
            location.repo
        );

        debug!(
            %url,
            head = %request.head_branch,
            base = %request.base_branch,
            "creating pull request"
        );

        let payload = CreatePrPayload {
            title: &request.title,
            body: &request.body,
            head: &request.head_branch,
            base: &request.base_branch,
        };

        let response = self
            .authorized(self.client.post(&url), token)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if status != StatusCode::CREATED {
            return Err(Error::GitHubApi(format!(
                "Failed to create PR: {} - {body}",
                status.as_u16()
            )));
        }

        let created: CreatedPr = serde_json::from_str(&body)
            .map_err(|e| Error::GitHubApi(format!("unexpected PR response ({e}): {body}")))?;

        Ok(PullRequest {
            number: created.number,
            html_url: created.html_url,
        })
    }

    /// Login of the token owner on the given host
    pub async fn current_user(&self, host: &str) -> Result<String> {
        let token = self.token()?;
        let url = format!("{}/user", self.api_base(host));

        let user: GitHubUser = self
            .authorized(self.client.get(&url), token)
            .send()
            .await?
            .error_for_status()
            .map_err(|e| Error::Auth(format!("Invalid token: {e}")))?
            .json()
            .await?;

        Ok(user.login)
    }
}

#[async_trait]
impl PullRequestService for GitHubService {
    async fn create_pull_request(&self, request: &NewPullRequest) -> PrOutcome {
        match self.try_create_pull_request(request).await {
            Ok(pr) => {
                debug!(number = pr.number, url = %pr.html_url, "pull request created");
                PrOutcome::Created(pr)
            }
            Err(e) => {
                warn!(repo = %request.repo_url, error = %e, "pull request creation failed");
                PrOutcome::Failed(e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_override_wins_over_host() {
        let service = GitHubService::new(GitHubSettings {
            api_base_override: Some("http://127.0.0.1:9999/".into()),
            ..GitHubSettings::default()
        })
        .unwrap();
        assert_eq!(service.api_base("github.com"), "http://127.0.0.1:9999");
    }

    #[test]
    fn test_enterprise_base_without_override() {
        let service = GitHubService::new(GitHubSettings::default()).unwrap();
        assert_eq!(service.api_base("ghe.corp"), "https://ghe.corp/api/v3");
        assert_eq!(service.api_base("github.com"), "https://api.github.com");
    }

    #[test]
    fn test_blank_token_is_no_token() {
        let service = GitHubService::new(GitHubSettings {
            token: Some("   ".into()),
            ..GitHubSettings::default()
        })
        .unwrap();
        assert!(!service.has_token());
    }

    #[test]
    fn test_settings_debug_redacts_token() {
        let settings = GitHubSettings {
            token: Some("ghp_secret".into()),
            ..GitHubSettings::default()
        };
        assert!(!format!("{settings:?}").contains("ghp_secret"));
    }

    #[tokio::test]
    async fn test_missing_token_short_circuits() {
        let service = GitHubService::new(GitHubSettings {
            // Unroutable: any network attempt would surface a transport error
            api_base_override: Some("http://192.0.2.1:1".into()),
            ..GitHubSettings::default()
        })
        .unwrap();
        let outcome = service
            .create_pull_request(&NewPullRequest {
                repo_url: "https://github.com/acme/widget".into(),
                base_branch: "main".into(),
                head_branch: "feature".into(),
                title: "t".into(),
                body: "b".into(),
            })
            .await;
        assert_eq!(
            outcome,
            PrOutcome::Failed("GitHub token not configured".into())
        );
    }
}
