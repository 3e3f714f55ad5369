//! Server and location matching.
//!
//! # Rules
//! - Servers are matched on port first; among port matches the first exact
//!   `server_name` hit wins, otherwise the first port match is the fallback.
//! - Locations use longest-prefix matching with a segment boundary check, so
//!   `/images` matches `/images/a.png` but never `/imageshack`.
//! - Matching is case-sensitive on both host and path.

use log::trace;

use crate::{
    config::{ConfigTree, Location, Server},
    errors::RouteError,
};

/// Picks the server answering `host` on `port`.
pub fn match_server<'a>(
    tree: &'a ConfigTree,
    host: &str,
    port: u16,
) -> Result<&'a Server, RouteError> {
    let mut fallback = None;

    for server in tree
        .servers()
        .iter()
        .filter(|server| server.listens_on(port))
    {
        if fallback.is_none() {
            fallback = Some(server);
        }
        if server.answers_to(host) {
            trace!("server_name match for {}:{}", host, port);
            return Ok(server);
        }
    }

    fallback.ok_or(RouteError::NoMatchingServer(port))
}

/// Picks the location with the longest path that is a valid prefix of `uri`.
pub fn match_location<'a>(server: &'a Server, uri: &str) -> Result<&'a Location, RouteError> {
    let mut matched: Option<&'a Location> = None;

    for location in server.locations() {
        let path = location.path();
        if !is_prefix_match(path, uri) {
            continue;
        }
        if matched.map_or(true, |best| path.len() > best.path().len()) {
            matched = Some(location);
        }
    }

    matched.ok_or_else(|| RouteError::NoMatchingLocation(uri.to_string()))
}

fn is_prefix_match(path: &str, uri: &str) -> bool {
    if !uri.starts_with(path) {
        return false;
    }
    path == "/" || uri.len() == path.len() || uri[path.len()..].starts_with('/')
}

/// Maps `uri` onto the filesystem below the location root.
///
/// `uri` must start with the location path, as it does for any location
/// returned by [`match_location`].
pub fn resolve_path(location: &Location, uri: &str) -> String {
    let root = location.root();
    let mut remainder = uri
        .strip_prefix(location.path())
        .unwrap_or(uri);

    if root.ends_with('/') && remainder.starts_with('/') {
        remainder = &remainder[1..];
    }

    format!("{}{}", root, remainder)
}
