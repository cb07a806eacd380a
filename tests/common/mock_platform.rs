//! Mock pull-request service for testing

#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use template_pr::platform::{NewPullRequest, PullRequestService};
use template_pr::types::{PrOutcome, PullRequest};

/// Call record for `create_pull_request`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatePrCall {
    pub repo_url: String,
    pub head: String,
    pub base: String,
    pub title: String,
}

/// Call-recording mock with error injection
///
/// - Auto-incrementing PR numbers
/// - Call tracking for verification
/// - Error injection for failure path testing
pub struct MockPlatformService {
    next_pr_number: AtomicU64,
    create_pr_calls: Mutex<Vec<CreatePrCall>>,
    error_on_create_pr: Mutex<Option<String>>,
}

impl MockPlatformService {
    pub fn new() -> Self {
        Self {
            next_pr_number: AtomicU64::new(1),
            create_pr_calls: Mutex::new(Vec::new()),
            error_on_create_pr: Mutex::new(None),
        }
    }

    /// Make every `create_pull_request` fail with `msg`
    pub fn fail_create_pr(&self, msg: &str) {
        *self.error_on_create_pr.lock().unwrap() = Some(msg.to_string());
    }

    /// Get all `create_pull_request` calls
    pub fn get_create_pr_calls(&self) -> Vec<CreatePrCall> {
        self.create_pr_calls.lock().unwrap().clone()
    }

    /// Assert that a PR was requested with specific head and base
    pub fn assert_create_pr_called(&self, head: &str, base: &str) {
        let calls = self.get_create_pr_calls();
        assert!(
            calls.iter().any(|c| c.head == head && c.base == base),
            "Expected create_pull_request({head}, {base}) but got: {calls:?}"
        );
    }
}

#[async_trait]
impl PullRequestService for MockPlatformService {
    async fn create_pull_request(&self, request: &NewPullRequest) -> PrOutcome {
        self.create_pr_calls.lock().unwrap().push(CreatePrCall {
            repo_url: request.repo_url.clone(),
            head: request.head_branch.clone(),
            base: request.base_branch.clone(),
            title: request.title.clone(),
        });

        if let Some(msg) = self.error_on_create_pr.lock().unwrap().as_ref() {
            return PrOutcome::Failed(msg.clone());
        }

        let number = self.next_pr_number.fetch_add(1, Ordering::SeqCst);
        PrOutcome::Created(PullRequest {
            number,
            html_url: format!("https://github.com/acme/pulls/{number}"),
        })
    }
}
