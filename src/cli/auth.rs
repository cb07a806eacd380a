//! Auth command - test and explain token setup

use anstream::println;
use template_pr::auth::{get_github_auth, test_github_auth};
use template_pr::config::AppConfig;
use template_pr::error::{Error, Result};
use template_pr::platform::GitHubService;

/// Verify the configured token against `GET /user` on `host`
pub async fn run_auth_test(config: &AppConfig, host: &str) -> Result<()> {
    println!("Testing GitHub authentication against {host}...");
    let auth = get_github_auth().ok_or(Error::TokenMissing)?;

    let service = GitHubService::new(config.github.clone())?;
    let username = test_github_auth(&service, host).await?;

    println!("Authenticated as: {username}");
    println!("Token source: {}", auth.source);
    Ok(())
}

/// Print setup instructions
pub fn run_auth_setup() {
    println!("GitHub Authentication Setup");
    println!("===========================");
    println!();
    println!("Create a personal access token with the `repo` scope");
    println!("(fine-grained: Contents and Pull requests read/write).");
    println!();
    println!("Then set GITHUB_TOKEN or GH_TOKEN, in the environment or in .env");
    println!();
    println!("For GitHub Enterprise:");
    println!("  Repository URLs on hosts other than github.com are sent to");
    println!("  https://<host>/api/v3. Set GITHUB_API_URL to override the API base,");
    println!("  and GITHUB_INSECURE_TLS=true only for self-signed certificates.");
    println!();
    println!("Verify with: template-pr auth test --host <host>");
}
