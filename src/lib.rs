//! # webroute
//!
//! **Virtual host configuration and request routing for static web servers**
//!
//! webroute reads an nginx-style configuration describing virtual hosts and
//! turns an incoming request (host, port, URI, method) into a concrete action:
//! serve a file, list a directory or redirect. It does no network I/O; an
//! HTTP layer feeds it requests and acts on the [`RoutingDecision`] it returns.
//!
//! ## Configuration
//!
//! ```text
//! server {
//!     listen 127.0.0.1:8080;
//!     server_name localhost;
//!     client_max_body_size 2097152;
//!     error_page 404 /errors/404.html;
//!
//!     location / {
//!         root /var/www/html;
//!         index index.html;
//!         methods GET POST;
//!     }
//!
//!     location /old {
//!         redirection = https://example.com/new;
//!     }
//! }
//! ```
//!
//! ## Basic Usage
//!
//! ```rust,ignore
//! use webroute::{load_config, Router};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let router = Router::new(load_config("webserv.conf")?);
//!
//!     let decision = router.resolve("localhost", 8080, "/", &http::Method::GET)?;
//!     if let Some(path) = decision.file_path() {
//!         println!("serve {}", path);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`parser::scanner`]: configuration text to tokens
//! - [`parser`]: tokens to a validated [`ConfigTree`]
//! - [`router`]: tree plus request to a [`RoutingDecision`]
//! - [`config`]: the tree types and their builders
//! - [`errors`]: error types for every stage

use std::{fs::read_to_string, path::Path};

use log::info;

pub mod config;
pub mod errors;
pub mod parser;
pub mod router;
#[cfg(test)]
mod tests;

pub use config::ConfigTree;
pub use errors::{ConfigError, RouteError, WebrouteError};
pub use router::{Router, RoutingDecision};

/// Reads, scans and parses the configuration file at `path`.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] when the file cannot be read and the first
/// syntax or validation error otherwise.
pub fn load_config(path: impl AsRef<Path>) -> Result<ConfigTree, WebrouteError> {
    let path = path.as_ref();
    let text = read_to_string(path)
        .map_err(|e| ConfigError::Io(format!("{}: {}", path.display(), e)))?;

    let tree = parser::parse_str(&text)?;
    info!(
        "Loaded {} server blocks from {}",
        tree.servers()
            .len(),
        path.display()
    );
    Ok(tree)
}
