//! Error types for template-pr

use thiserror::Error;

/// Library error type
#[derive(Debug, Error)]
pub enum Error {
    /// Input could not be parsed (URLs, numbers, booleans)
    #[error("parse error: {0}")]
    Parse(String),

    /// Repository URL does not carry an owner and a repository name
    #[error("invalid GitHub URL: {0}")]
    InvalidGitHubUrl(String),

    /// One or more required record fields are missing or empty
    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<String>),

    /// Uploaded file has an extension outside the allow-list
    #[error("Invalid file type. Please upload CSV or Excel file")]
    UnsupportedFileType(String),

    /// The submission did not contain any record
    #[error("No records found in file")]
    EmptyBatch,

    /// Malformed CSV input or output failure
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Workbook (xlsx/xls) could not be read
    #[error("workbook error: {0}")]
    Workbook(String),

    /// The automation script could not produce a usable result
    #[error("{0}")]
    Automation(String),

    /// Configuration value is missing or invalid
    #[error("configuration error: {0}")]
    Config(String),

    /// No GitHub token was configured at startup
    #[error("GitHub token not configured")]
    TokenMissing,

    /// Authentication failure
    #[error("authentication error: {0}")]
    Auth(String),

    /// GitHub API answered with an unexpected response
    #[error("GitHub API error: {0}")]
    GitHubApi(String),

    /// HTTP transport failure
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Filesystem failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Anything that should not happen
    #[error("internal error: {0}")]
    Internal(String),
}

/// Result type alias using the library error
pub type Result<T> = std::result::Result<T, Error>;

impl From<calamine::Error> for Error {
    fn from(err: calamine::Error) -> Self {
        Self::Workbook(err.to_string())
    }
}
