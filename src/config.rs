//! Service configuration loaded from environment variables

use crate::auth::github_auth_from;
use crate::automation::{AutomationInvoker, DEFAULT_INTERPRETER, DEFAULT_TIMEOUT};
use crate::error::{Error, Result};
use crate::platform::GitHubSettings;
use crate::submit::DEFAULT_HEAD_BRANCH_PREFIX;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Script run when `AUTOMATION_SCRIPT` is not set
pub const DEFAULT_SCRIPT: &str = "Agentic-ikp.py";

/// Upload body limit when `MAX_UPLOAD_BYTES` is not set
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

/// Everything the service needs at startup
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Bind address
    pub host: String,
    /// Bind port
    pub port: u16,
    /// Allowed CORS origins; `*` allows any
    pub cors_origins: Vec<String>,
    /// GitHub client settings, token included
    pub github: GitHubSettings,
    /// Interpreter for the script; `None` executes it directly
    pub interpreter: Option<String>,
    /// Rendering script
    pub script: PathBuf,
    /// Ceiling on one script run
    pub automation_timeout: Duration,
    /// Parent directory of request-scoped files
    pub scratch_dir: PathBuf,
    /// Prefix of the branch the script pushes to
    pub head_branch_prefix: String,
    /// Upload body limit in bytes
    pub max_upload_bytes: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            cors_origins: vec!["*".to_string()],
            github: GitHubSettings::default(),
            interpreter: Some(DEFAULT_INTERPRETER.to_string()),
            script: PathBuf::from(DEFAULT_SCRIPT),
            automation_timeout: DEFAULT_TIMEOUT,
            scratch_dir: std::env::temp_dir(),
            head_branch_prefix: DEFAULT_HEAD_BRANCH_PREFIX.to_string(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl AppConfig {
    /// Load configuration from the process environment
    ///
    /// | Env Var                   | Default                       |
    /// |---------------------------|-------------------------------|
    /// | `HOST`                    | `0.0.0.0`                     |
    /// | `PORT`                    | `5000`                        |
    /// | `CORS_ORIGINS`            | `*`                           |
    /// | `GITHUB_TOKEN`/`GH_TOKEN` | unset                         |
    /// | `GITHUB_API_URL`          | unset                         |
    /// | `GITHUB_TIMEOUT_SECS`     | `30`                          |
    /// | `GITHUB_INSECURE_TLS`     | `false`                       |
    /// | `AUTOMATION_INTERPRETER`  | `python3`                     |
    /// | `AUTOMATION_SCRIPT`       | `Agentic-ikp.py`              |
    /// | `AUTOMATION_TIMEOUT_SECS` | `600`                         |
    /// | `SCRATCH_DIR`             | system temp dir               |
    /// | `HEAD_BRANCH_PREFIX`      | `automation/hdpv2-templates`  |
    /// | `MAX_UPLOAD_BYTES`        | `16777216`                    |
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string());

        let cors_origins = match var("CORS_ORIGINS") {
            Some(raw) => raw
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            None => defaults.cors_origins,
        };

        let github = GitHubSettings {
            token: github_auth_from(&lookup).map(|auth| auth.token),
            timeout: parse_var(&var, "GITHUB_TIMEOUT_SECS")?
                .map_or(defaults.github.timeout, Duration::from_secs),
            accept_invalid_certs: parse_bool(&var, "GITHUB_INSECURE_TLS")?.unwrap_or(false),
            api_base_override: var("GITHUB_API_URL").filter(|v| !v.is_empty()),
        };

        // An empty AUTOMATION_INTERPRETER means "exec the script directly".
        let interpreter = match var("AUTOMATION_INTERPRETER") {
            Some(v) if v.is_empty() => None,
            Some(v) => Some(v),
            None => defaults.interpreter,
        };

        Ok(Self {
            host: var("HOST")
                .filter(|v| !v.is_empty())
                .unwrap_or(defaults.host),
            port: parse_var(&var, "PORT")?.unwrap_or(defaults.port),
            cors_origins,
            github,
            interpreter,
            script: var("AUTOMATION_SCRIPT")
                .filter(|v| !v.is_empty())
                .map_or(defaults.script, PathBuf::from),
            automation_timeout: parse_var(&var, "AUTOMATION_TIMEOUT_SECS")?
                .map_or(defaults.automation_timeout, Duration::from_secs),
            scratch_dir: var("SCRATCH_DIR")
                .filter(|v| !v.is_empty())
                .map_or(defaults.scratch_dir, PathBuf::from),
            head_branch_prefix: var("HEAD_BRANCH_PREFIX")
                .filter(|v| !v.is_empty())
                .unwrap_or(defaults.head_branch_prefix),
            max_upload_bytes: parse_var(&var, "MAX_UPLOAD_BYTES")?
                .unwrap_or(defaults.max_upload_bytes),
        })
    }

    /// `host:port` to bind
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Invoker configured from this config
    pub fn invoker(&self) -> AutomationInvoker {
        AutomationInvoker::new(&self.script)
            .with_interpreter(self.interpreter.clone())
            .with_timeout(self.automation_timeout)
    }
}

fn parse_var<T>(var: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    var(key)
        .filter(|v| !v.is_empty())
        .map(|raw| {
            raw.parse()
                .map_err(|e| Error::Config(format!("{key}={raw:?}: {e}")))
        })
        .transpose()
}

fn parse_bool(var: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<bool>> {
    var(key)
        .filter(|v| !v.is_empty())
        .map(|raw| match raw.to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(Error::Config(format!("{key}={raw:?}: expected a boolean"))),
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<AppConfig> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        AppConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let cfg = config(&[]).unwrap();
        assert_eq!(cfg.bind_address(), "0.0.0.0:5000");
        assert_eq!(cfg.cors_origins, vec!["*"]);
        assert_eq!(cfg.interpreter.as_deref(), Some("python3"));
        assert_eq!(cfg.script, PathBuf::from("Agentic-ikp.py"));
        assert_eq!(cfg.automation_timeout, Duration::from_secs(600));
        assert_eq!(cfg.github.timeout, Duration::from_secs(30));
        assert!(!cfg.github.accept_invalid_certs);
        assert!(cfg.github.token.is_none());
        assert_eq!(cfg.max_upload_bytes, 16_777_216);
    }

    #[test]
    fn test_overrides() {
        let cfg = config(&[
            ("PORT", "8080"),
            ("CORS_ORIGINS", "https://a.example, https://b.example,"),
            ("GH_TOKEN", "ghp_x"),
            ("GITHUB_INSECURE_TLS", "true"),
            ("AUTOMATION_INTERPRETER", ""),
            ("AUTOMATION_TIMEOUT_SECS", "5"),
            ("HEAD_BRANCH_PREFIX", "bots"),
        ])
        .unwrap();
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.cors_origins, vec!["https://a.example", "https://b.example"]);
        assert_eq!(cfg.github.token.as_deref(), Some("ghp_x"));
        assert!(cfg.github.accept_invalid_certs);
        assert!(cfg.interpreter.is_none());
        assert_eq!(cfg.invoker().timeout(), Duration::from_secs(5));
        assert_eq!(cfg.head_branch_prefix, "bots");
    }

    #[test]
    fn test_invalid_values_are_errors() {
        let err = config(&[("PORT", "http")]).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(err.to_string().contains("PORT"));

        assert!(config(&[("GITHUB_INSECURE_TLS", "maybe")]).is_err());
        assert!(config(&[("MAX_UPLOAD_BYTES", "-1")]).is_err());
    }

    #[test]
    fn test_debug_hides_token() {
        let cfg = config(&[("GITHUB_TOKEN", "ghp_secret")]).unwrap();
        assert!(!format!("{cfg:?}").contains("ghp_secret"));
    }
}
