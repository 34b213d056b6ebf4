//! App Link resolver
//!
//! This crate fetches the HTML document behind a URL on behalf of an App Link
//! parser. Every hop of a redirect chain is requested explicitly so that the
//! `Prefer-Html-Meta-Tags: al` header reaches whichever server finally answers.

pub mod config;
pub mod resolver;
pub mod transport;

use thiserror::Error;

/// Message carried by [`ResolveError::MissingData`]
pub const MISSING_DATA_MESSAGE: &str = "Invalid network response - missing data";

/// Main error type for a resolution
#[derive(Debug, Error)]
pub enum ResolveError {
    /// Failure reported by the transport, passed through as-is
    #[error(transparent)]
    Transport(#[from] transport::TransportError),

    /// The transport succeeded but returned no body
    #[error("{}", MISSING_DATA_MESSAGE)]
    MissingData,

    #[error("Too many redirects from {url} (limit {limit})")]
    TooManyRedirects { url: String, limit: u32 },

    #[error("Redirect from {url} has no usable Location header")]
    MissingLocation { url: String },
}

impl ResolveError {
    /// Returns true if the error originated in the transport
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Result type alias for resolutions
pub type Result<T> = std::result::Result<T, ResolveError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use resolver::{MissingLocationPolicy, RedirectLimit, Resolution, Resolver};
pub use transport::{ReqwestTransport, Request, ResponseMeta, Transport, TransportError};
