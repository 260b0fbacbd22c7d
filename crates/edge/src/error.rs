// ABOUTME: Error types for the edge extractor including ErrorCode enum and EdgeError struct.
// ABOUTME: Provides categorized errors with convenience constructors, boolean helpers and status mapping.

use std::fmt;

use axum::http::StatusCode;

/// Error codes representing the ways a request can fail before extraction runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    MissingUrl,
    InvalidUrl,
    Fetch,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::MissingUrl => "missing URL",
            ErrorCode::InvalidUrl => "invalid URL",
            ErrorCode::Fetch => "fetch error",
        };
        write!(f, "{}", s)
    }
}

impl ErrorCode {
    /// HTTP status reported to the caller for this error category.
    pub fn status(&self) -> StatusCode {
        match self {
            ErrorCode::MissingUrl => StatusCode::BAD_REQUEST,
            // A target that cannot be fetched is an upstream failure like any other.
            ErrorCode::InvalidUrl | ErrorCode::Fetch => StatusCode::BAD_GATEWAY,
        }
    }

    /// Plain-text body reported to the caller for this error category.
    pub fn public_message(&self) -> &'static str {
        match self {
            ErrorCode::MissingUrl => "Missing url parameter",
            ErrorCode::InvalidUrl | ErrorCode::Fetch => "Upstream fetch failed",
        }
    }
}

/// The main error type for edge operations.
#[derive(Debug, thiserror::Error)]
pub struct EdgeError {
    pub code: ErrorCode,
    pub url: String,
    pub op: String,
    #[source]
    pub source: Option<anyhow::Error>,
}

impl fmt::Display for EdgeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "edge: {} {}: {}", self.op, self.url, self.code)?;
        if let Some(ref src) = self.source {
            write!(f, ": {}", src)?;
        }
        Ok(())
    }
}

impl EdgeError {
    /// Create a MissingUrl error.
    pub fn missing_url(op: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::MissingUrl,
            url: String::new(),
            op: op.into(),
            source: None,
        }
    }

    /// Create an InvalidUrl error.
    pub fn invalid_url(
        url: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self {
            code: ErrorCode::InvalidUrl,
            url: url.into(),
            op: op.into(),
            source,
        }
    }

    /// Create a Fetch error.
    pub fn fetch(
        url: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self {
            code: ErrorCode::Fetch,
            url: url.into(),
            op: op.into(),
            source,
        }
    }

    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        self.code.status()
    }

    /// Returns true if this is a MissingUrl error.
    pub fn is_missing_url(&self) -> bool {
        self.code == ErrorCode::MissingUrl
    }

    /// Returns true if this is an InvalidUrl error.
    pub fn is_invalid_url(&self) -> bool {
        self.code == ErrorCode::InvalidUrl
    }

    /// Returns true if this is a Fetch error.
    pub fn is_fetch(&self) -> bool {
        self.code == ErrorCode::Fetch
    }
}
