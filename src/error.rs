use reqwest::StatusCode;

pub type Result<T> = std::result::Result<T, HarnessError>;

#[derive(Debug, thiserror::Error)]
pub enum HarnessError {
    #[error("expected status {expected}, got {actual}: {body}")]
    UnexpectedStatus {
        expected: StatusCode,
        actual: StatusCode,
        body: String,
    },
    #[error("expected message {expected:?}, got {actual:?}")]
    UnexpectedMessage {
        expected: String,
        actual: Option<String>,
    },
    #[error("expected a non-empty story list")]
    EmptyList,
    #[error("no listed story carries the fixture title {0:?}")]
    FixtureNotFound(String),
    #[error("failed to decode response of {context}: {source}")]
    Decode {
        context: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("login returned {status}: {body}")]
    Login { status: StatusCode, body: String },
    #[error("no bearer token available")]
    MissingToken,
    #[error("invalid base url: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("configuration error: {0}")]
    Config(String),
}
