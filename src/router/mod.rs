//! Request routing.
//!
//! # Data Flow
//! ```text
//! (host, port, uri, method)
//!     → matcher::match_server     (port, then exact server_name, else fallback)
//!     → matcher::match_location   (longest valid prefix)
//!     → redirection?              → Action::Redirect, nothing else checked
//!     → matcher::resolve_path     (root + uri without the location prefix)
//!     → probe::Filesystem         (directory → index / autoindex, file → readable)
//!     → method check              → RoutingDecision
//! ```
//!
//! Resolution never mutates the tree and keeps no state between requests, so
//! one [`Router`] can serve any number of threads at once.

use std::sync::Arc;

use log::debug;

use crate::{
    config::{ConfigTree, Location, Server},
    errors::RouteError,
};

pub mod matcher;
pub mod probe;

pub use matcher::{match_location, match_server, resolve_path};
pub use probe::{Filesystem, LocalFilesystem};

/// What the HTTP layer should do with a request.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Action<'a> {
    /// Answer with a redirect to the given URL.
    Redirect(&'a str),
    /// Stream the file at the given path.
    File(String),
    /// Generate a listing of the given directory.
    Autoindex(String),
}

/// The outcome of resolving one request.
///
/// Borrows the tree it was resolved against.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RoutingDecision<'a> {
    server: &'a Server,
    location: &'a Location,
    action: Action<'a>,
}

impl<'a> RoutingDecision<'a> {
    pub fn matched_server(&self) -> &'a Server {
        self.server
    }

    pub fn matched_location(&self) -> &'a Location {
        self.location
    }

    pub fn action(&self) -> &Action<'a> {
        &self.action
    }

    pub fn is_redirect(&self) -> bool {
        matches!(self.action, Action::Redirect(_))
    }

    pub fn redirect_url(&self) -> Option<&'a str> {
        match self.action {
            Action::Redirect(url) => Some(url),
            _ => None,
        }
    }

    /// Returns the file or directory path, unless this is a redirect.
    pub fn file_path(&self) -> Option<&str> {
        match &self.action {
            Action::File(path) | Action::Autoindex(path) => Some(path),
            Action::Redirect(_) => None,
        }
    }

    pub fn use_autoindex(&self) -> bool {
        matches!(self.action, Action::Autoindex(_))
    }
}

/// Resolves a request against `tree`, probing `fs` for the final path.
pub fn resolve<'a, F>(
    tree: &'a ConfigTree,
    fs: &F,
    host: &str,
    port: u16,
    uri: &str,
    method: &http::Method,
) -> Result<RoutingDecision<'a>, RouteError>
where
    F: Filesystem + ?Sized,
{
    let server = match_server(tree, host, port)?;
    let location = match_location(server, uri)?;

    if let Some(url) = location.redirection() {
        debug!("{} {} redirected to {}", method, uri, url);
        return Ok(RoutingDecision { server, location, action: Action::Redirect(url) });
    }

    let path = resolve_path(location, uri);
    let action = if fs.is_directory(&path) {
        directory_action(fs, location, path)?
    } else if !fs.exists(&path) {
        return Err(RouteError::FileNotFound(path));
    } else if !fs.is_readable(&path) {
        return Err(RouteError::AccessDenied(path));
    } else {
        Action::File(path)
    };

    if !location.allows(method) {
        return Err(RouteError::MethodNotAllowed(method.to_string()));
    }

    debug!("{} {} resolved to {:?}", method, uri, action);
    Ok(RoutingDecision { server, location, action })
}

fn directory_action<'a, F>(
    fs: &F,
    location: &Location,
    directory: String,
) -> Result<Action<'a>, RouteError>
where
    F: Filesystem + ?Sized,
{
    if let Some(index) = location.index() {
        let candidate = if directory.ends_with('/') {
            format!("{}{}", directory, index)
        } else {
            format!("{}/{}", directory, index)
        };
        if fs.exists(&candidate) && fs.is_readable(&candidate) {
            return Ok(Action::File(candidate));
        }
    }

    if location.autoindex() {
        return Ok(Action::Autoindex(directory));
    }

    Err(RouteError::NoIndexNoAutoindex(directory))
}

/// A loaded configuration together with the filesystem it resolves against.
///
/// # Examples
///
/// ```rust,ignore
/// use webroute::{load_config, router::Router};
///
/// let router = Router::new(load_config("webserv.conf")?);
/// let decision = router.resolve("localhost", 8080, "/docs/", &http::Method::GET)?;
/// if let Some(url) = decision.redirect_url() {
///     println!("redirect to {}", url);
/// }
/// ```
pub struct Router<F = LocalFilesystem> {
    tree: Arc<ConfigTree>,
    fs: F,
}

impl Router<LocalFilesystem> {
    /// Creates a router probing the local filesystem.
    pub fn new(tree: impl Into<Arc<ConfigTree>>) -> Router<LocalFilesystem> {
        Router { tree: tree.into(), fs: LocalFilesystem }
    }
}

impl<F: Filesystem> Router<F> {
    /// Creates a router probing `fs`.
    pub fn with_filesystem(tree: impl Into<Arc<ConfigTree>>, fs: F) -> Router<F> {
        Router { tree: tree.into(), fs }
    }

    pub fn tree(&self) -> &Arc<ConfigTree> {
        &self.tree
    }

    /// Resolves one request. See [`resolve`].
    pub fn resolve(
        &self,
        host: &str,
        port: u16,
        uri: &str,
        method: &http::Method,
    ) -> Result<RoutingDecision<'_>, RouteError> {
        resolve(&self.tree, &self.fs, host, port, uri, method)
    }
}
