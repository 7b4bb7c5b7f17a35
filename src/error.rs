//! Error types for the MCP server.

use thiserror::Error;

/// Result type alias.
pub type Result<T> = std::result::Result<T, Error>;

/// MCP server errors.
#[derive(Error, Debug)]
pub enum Error {
    /// Tool not found.
    #[error("tool not found: {0}")]
    ToolNotFound(String),

    /// Invalid parameters.
    #[error("invalid parameters: {0}")]
    InvalidParams(String),

    /// HTTP fetch error.
    #[error("fetch error: {0}")]
    Fetch(#[from] reqwest::Error),

    /// Upstream server answered with a non-success status.
    #[error("failed to fetch page: {0}")]
    UpstreamStatus(u16),

    /// WebDriver command error.
    #[error("webdriver error: {0}")]
    Browser(#[from] fantoccini::error::CmdError),

    /// WebDriver session could not be established.
    #[error("webdriver session error: {0}")]
    BrowserSession(#[from] fantoccini::error::NewSessionError),

    /// Fetch exceeded its time budget.
    #[error("timed out fetching {0}")]
    Timeout(String),

    /// URL parse error.
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Get the JSON-RPC error code for this error.
    pub fn code(&self) -> i32 {
        match self {
            Error::ToolNotFound(_) => codes::METHOD_NOT_FOUND,
            Error::InvalidParams(_) | Error::Url(_) => codes::INVALID_PARAMS,
            Error::Serialization(_) => codes::PARSE_ERROR,
            Error::Fetch(_)
            | Error::UpstreamStatus(_)
            | Error::Browser(_)
            | Error::BrowserSession(_)
            | Error::Timeout(_) => -32000,
            Error::Io(_) => -32002,
            Error::Internal(_) => codes::INTERNAL_ERROR,
        }
    }
}

/// Standard JSON-RPC error codes.
pub mod codes {
    /// Parse error.
    pub const PARSE_ERROR: i32 = -32700;
    /// Invalid request.
    pub const INVALID_REQUEST: i32 = -32600;
    /// Method not found.
    pub const METHOD_NOT_FOUND: i32 = -32601;
    /// Invalid params.
    pub const INVALID_PARAMS: i32 = -32602;
    /// Internal error.
    pub const INTERNAL_ERROR: i32 = -32603;
}
