//! Shared handler state

use crate::automation::AutomationInvoker;
use crate::config::AppConfig;
use crate::error::Result;
use crate::platform::{GitHubService, PullRequestService};
use crate::submit::SubmitContext;
use std::sync::Arc;

/// Shared state available to all handlers via `State<AppState>`
#[derive(Clone)]
pub struct AppState {
    /// Startup configuration
    pub config: Arc<AppConfig>,
    /// Opens pull requests
    pub platform: Arc<dyn PullRequestService>,
    /// Runs the rendering script
    pub invoker: Arc<AutomationInvoker>,
}

impl AppState {
    /// State with an explicit PR service
    pub fn new(config: AppConfig, platform: Arc<dyn PullRequestService>) -> Self {
        let invoker = Arc::new(config.invoker());
        Self {
            config: Arc::new(config),
            platform,
            invoker,
        }
    }

    /// State backed by the GitHub REST client
    pub fn from_config(config: AppConfig) -> Result<Self> {
        let github = GitHubService::new(config.github.clone())?;
        Ok(Self::new(config, Arc::new(github)))
    }

    pub(crate) fn submit_context(&self) -> SubmitContext<'_> {
        SubmitContext {
            invoker: &self.invoker,
            platform: self.platform.as_ref(),
            scratch_dir: &self.config.scratch_dir,
            head_branch_prefix: &self.config.head_branch_prefix,
        }
    }
}
