//! Error types for the cvsearch core library.

/// Errors that can occur across the cvsearch workspace.
///
/// All error variants are marked with `#[non_exhaustive]` to allow
/// adding new error types without breaking changes.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// What configuration is problematic
        message: String,
    },

    /// Transport error (connection refused, DNS failure, timeout, etc.)
    #[error("Transport error: {message}")]
    Transport {
        /// Human-readable error message
        message: String,
        /// Source error if available
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The search endpoint answered with a non-success status
    #[error("Endpoint returned HTTP {status}: {message}")]
    Endpoint {
        /// HTTP status code
        status: u16,
        /// Response body, truncated for display
        message: String,
    },

    /// The endpoint answered 2xx but the body did not have the expected shape
    #[error("Unexpected response: {message}")]
    UnexpectedResponse {
        /// What was missing or malformed
        message: String,
    },

    /// A filter referenced a facet that is not configured
    #[error("Facet not configured: {field}")]
    FacetNotFound {
        /// Field name the filter referenced
        field: String,
    },

    /// A filter referenced a range bucket that is not configured
    #[error("Range bucket '{label}' not configured for facet '{field}'")]
    BucketNotFound {
        /// Facet field name
        field: String,
        /// Bucket label that was not found
        label: String,
    },

    /// I/O error (file operations, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Malformed import data (CSV rows, bulk payloads)
    #[error("Import error: {message}")]
    Import {
        /// What went wrong with the input data
        message: String,
    },
}

/// Convenience `Result` type alias for cvsearch operations.
///
/// This is the standard Result type used throughout the cvsearch codebase.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Returns whether this error is retryable.
    ///
    /// Retryable errors include transient failures like connection resets
    /// and server-side (5xx) endpoint errors.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Transport { .. } => true,
            Error::Endpoint { status, .. } => *status >= 500,
            Error::Io(_) => true,
            Error::Config { .. } => false,
            Error::UnexpectedResponse { .. } => false,
            Error::FacetNotFound { .. } => false,
            Error::BucketNotFound { .. } => false,
            Error::Serialization(_) => false,
            Error::Import { .. } => false,
        }
    }

    /// Creates a new configuration error.
    pub fn config<S: Into<String>>(message: S) -> Self {
        Error::Config {
            message: message.into(),
        }
    }

    /// Creates a new transport error with a message.
    pub fn transport<S: Into<String>>(message: S) -> Self {
        Error::Transport {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a new transport error with a message and source error.
    pub fn transport_with_source<S, E>(message: S, source: E) -> Self
    where
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Error::Transport {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Creates a new endpoint error from a status code and response body.
    ///
    /// The body is truncated to keep log lines readable.
    pub fn endpoint<S: Into<String>>(status: u16, body: S) -> Self {
        let mut message = body.into();
        if message.len() > 512 {
            let mut cut = 512;
            while !message.is_char_boundary(cut) {
                cut -= 1;
            }
            message.truncate(cut);
            message.push_str("...");
        }
        Error::Endpoint { status, message }
    }

    /// Creates a new unexpected-response error.
    pub fn unexpected_response<S: Into<String>>(message: S) -> Self {
        Error::UnexpectedResponse {
            message: message.into(),
        }
    }

    /// Creates a new import error.
    pub fn import<S: Into<String>>(message: S) -> Self {
        Error::Import {
            message: message.into(),
        }
    }
}
