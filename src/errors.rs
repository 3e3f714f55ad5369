//! Error handling types for webroute.
//!
//! Loading a configuration fails with a [`ConfigError`], resolving a request
//! against a loaded tree fails with a [`RouteError`]. Both fold into
//! [`WebrouteError`] for callers that drive the whole pipeline.
//!
//! # Examples
//!
//! ```rust,ignore
//! use webroute::errors::{ConfigError, WebrouteError};
//!
//! match webroute::load_config("webserv.conf") {
//!     Ok(tree) => println!("{} servers", tree.servers().len()),
//!     Err(WebrouteError::Config(ConfigError::Validation(msg))) => {
//!         eprintln!("invalid value: {}", msg);
//!     }
//!     Err(other) => eprintln!("{}", other),
//! }
//! ```

use http::StatusCode;
use thiserror::Error;

/// Main error type for webroute operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum WebrouteError {
    /// Configuration could not be read, scanned or parsed
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Request could not be resolved against the configuration
    #[error("Routing error: {0}")]
    Route(#[from] RouteError),

    /// Loaded tree could not be rendered for display
    #[error("Failed to render configuration: {0}")]
    Render(String),
}

/// Configuration loading errors.
///
/// Any of these aborts the whole load; no partially built tree is returned.
///
/// # Examples
///
/// ```rust,ignore
/// use webroute::errors::ConfigError;
///
/// match error {
///     ConfigError::Syntax(msg) => println!("malformed config: {}", msg),
///     ConfigError::Validation(msg) => println!("bad value: {}", msg),
///     ConfigError::Io(msg) => println!("cannot read config: {}", msg),
/// }
/// ```
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigError {
    /// Malformed token stream, unknown directive or missing terminator
    #[error("Syntax error: {0}")]
    Syntax(String),

    /// Directive value outside of its allowed domain
    #[error("Validation error: {0}")]
    Validation(String),

    /// Configuration source could not be read
    #[error("Failed to read config: {0}")]
    Io(String),
}

/// Request resolution errors.
///
/// These abort a single resolution only; the tree stays usable.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum RouteError {
    /// No server listens on the requested port
    #[error("No server block found for port {0}")]
    NoMatchingServer(u16),

    /// No location path is a valid prefix of the URI
    #[error("No matching location for URI: {0}")]
    NoMatchingLocation(String),

    /// Directory requested without a usable index file and with autoindex off
    #[error("No index file and autoindex disabled for: {0}")]
    NoIndexNoAutoindex(String),

    /// Resolved path does not exist
    #[error("File not found: {0}")]
    FileNotFound(String),

    /// Resolved path exists but cannot be read
    #[error("Access denied: {0}")]
    AccessDenied(String),

    /// Location does not allow the request method
    #[error("Method {0} not allowed")]
    MethodNotAllowed(String),
}

impl RouteError {
    /// Returns the status code an HTTP layer should answer with.
    pub fn status(&self) -> StatusCode {
        match self {
            RouteError::NoMatchingServer(_)
            | RouteError::NoMatchingLocation(_)
            | RouteError::FileNotFound(_) => StatusCode::NOT_FOUND,
            RouteError::NoIndexNoAutoindex(_) | RouteError::AccessDenied(_) => {
                StatusCode::FORBIDDEN
            }
            RouteError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
        }
    }
}
