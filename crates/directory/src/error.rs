use thiserror::Error;

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Directory returned no accounts")]
    NoAccount,
    #[error("Account descriptor has no '{0}' resource")]
    MissingResource(String),
    #[error("Unable to find '{0}' tender")]
    TenderNotFound(String),
}
