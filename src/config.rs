//! Configuration tree types and builders.
//!
//! A [`ConfigTree`] is normally produced by [`crate::parser::parse`], but every
//! node can also be assembled with a fluent builder. Builders apply the same
//! value checks the parser applies, so a tree built either way satisfies the
//! same invariants.
//!
//! # Examples
//!
//! ```rust,ignore
//! use webroute::config::{ConfigTree, ListenAddress, Location, Method, Server};
//!
//! let docs = Location::builder()
//!     .path("/docs")
//!     .root("/var/www/docs")
//!     .index("index.html")
//!     .methods(vec![Method::Get, Method::Delete])
//!     .build()?;
//!
//! let server = Server::builder()
//!     .listen(ListenAddress::new("127.0.0.1", 8080)?)
//!     .server_name("localhost")
//!     .location(docs)
//!     .build()?;
//!
//! let tree = ConfigTree::builder()
//!     .server(server)
//!     .build()?;
//! ```

use std::{collections::BTreeMap, fmt, str::FromStr};

use serde::Serialize;

use crate::errors::{ConfigError, WebrouteError};

/// Default `client_max_body_size`, 1 MiB.
pub const DEFAULT_MAX_BODY_SIZE: u64 = 1024 * 1024;

/// Request methods a location can allow.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
    Delete,
}

impl Method {
    /// Returns the method name as written in the configuration.
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "GET" => Ok(Method::Get),
            "POST" => Ok(Method::Post),
            "DELETE" => Ok(Method::Delete),
            _ => Err(ConfigError::Validation(format!("Invalid method: {}", s))),
        }
    }
}

impl PartialEq<http::Method> for Method {
    fn eq(&self, other: &http::Method) -> bool {
        self.as_str() == other.as_str()
    }
}

/// A `host:port` pair a server listens on.
///
/// # Examples
///
/// ```rust,ignore
/// use webroute::config::ListenAddress;
///
/// let listen: ListenAddress = "127.0.0.1:8080".parse()?;
/// assert_eq!(listen.host(), "127.0.0.1");
/// assert_eq!(listen.port(), 8080);
/// ```
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct ListenAddress {
    host: String,
    port: u16,
}

impl ListenAddress {
    /// Creates a listen address from its parts.
    ///
    /// # Errors
    ///
    /// Returns an error if the host is empty or the port is 0.
    pub fn new(host: &str, port: u16) -> Result<ListenAddress, WebrouteError> {
        if host.is_empty() {
            return Err(ConfigError::Validation("Listen host cannot be empty".to_string()).into());
        }
        if port == 0 {
            return Err(
                ConfigError::Validation("Port must be between 1 and 65535: 0".to_string()).into()
            );
        }
        Ok(ListenAddress { host: host.to_string(), port })
    }

    /// Returns the host part.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Returns the port.
    pub fn port(&self) -> u16 {
        self.port
    }
}

impl FromStr for ListenAddress {
    type Err = ConfigError;

    /// Parses the value of a `listen` directive.
    ///
    /// The value must hold exactly one `:`, a non-empty host before it and a
    /// port in `1..=65535` after it.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let Some((host, port)) = value
            .split_once(':')
            .filter(|(_, port)| !port.contains(':'))
        else {
            return Err(ConfigError::Validation(format!(
                "Invalid listen format '{}', use HOST:PORT",
                value
            )));
        };

        if host.is_empty() {
            return Err(ConfigError::Validation("Listen host cannot be empty".to_string()));
        }

        let port = match port.parse::<u32>() {
            Ok(port) if (1..=65535).contains(&port) => port as u16,
            _ => {
                return Err(ConfigError::Validation(format!(
                    "Port must be between 1 and 65535: {}",
                    port
                )))
            }
        };

        Ok(ListenAddress { host: host.to_string(), port })
    }
}

impl fmt::Display for ListenAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Builder for creating `Location` instances.
///
/// `path` is always required, `root` unless the location redirects. A location
/// without explicit methods allows `GET`.
pub struct LocationBuilder {
    path: String,
    root: String,
    index: Option<String>,
    methods: Vec<Method>,
    autoindex: bool,
    upload_dir: Option<String>,
    redirection: Option<String>,
    cgi_extension: Option<String>,
}

impl LocationBuilder {
    /// Sets the URI prefix this location answers for.
    pub fn path(mut self, path: &str) -> Self {
        self.path = path.to_string();
        self
    }

    /// Sets the filesystem directory the prefix maps onto.
    pub fn root(mut self, root: &str) -> Self {
        self.root = root.to_string();
        self
    }

    /// Sets the file served when a directory is requested.
    pub fn index(mut self, index: &str) -> Self {
        self.index = Some(index.to_string());
        self
    }

    /// Replaces the allowed methods.
    pub fn methods(mut self, methods: Vec<Method>) -> Self {
        self.methods = methods;
        self
    }

    /// Adds one allowed method.
    pub fn method(mut self, method: Method) -> Self {
        self.methods
            .push(method);
        self
    }

    /// Enables or disables directory listings.
    pub fn autoindex(mut self, autoindex: bool) -> Self {
        self.autoindex = autoindex;
        self
    }

    /// Sets the directory uploads are stored in.
    pub fn upload_dir(mut self, upload_dir: &str) -> Self {
        self.upload_dir = Some(upload_dir.to_string());
        self
    }

    /// Sets the URL every request for this location is redirected to.
    pub fn redirection(mut self, url: &str) -> Self {
        self.redirection = Some(url.to_string());
        self
    }

    /// Sets the file extension handed to the CGI collaborator.
    pub fn cgi_extension(mut self, extension: &str) -> Self {
        self.cgi_extension = Some(extension.to_string());
        self
    }

    /// Creates the `Location`.
    ///
    /// # Errors
    ///
    /// Returns an error if any value fails the check its directive would fail
    /// in a configuration file.
    pub fn build(self) -> Result<Location, WebrouteError> {
        Ok(self.finish()?)
    }

    pub(crate) fn finish(self) -> Result<Location, ConfigError> {
        check_location_path(&self.path)?;
        if !self
            .root
            .is_empty()
        {
            check_root(&self.root)?;
        }
        if let Some(index) = &self.index {
            check_index(index)?;
        }
        check_methods(&self.methods)?;
        if let Some(upload_dir) = &self.upload_dir {
            check_upload_dir(upload_dir)?;
        }
        if let Some(url) = &self.redirection {
            check_redirection(url)?;
        }
        if let Some(extension) = &self.cgi_extension {
            check_cgi_extension(extension)?;
        }
        if self
            .root
            .is_empty()
            && self
                .redirection
                .is_none()
        {
            return Err(ConfigError::Validation(format!(
                "Location must define a root: {}",
                self.path
            )));
        }

        let methods = if self
            .methods
            .is_empty()
        {
            vec![Method::Get]
        } else {
            self.methods
        };

        Ok(Location {
            path: self.path,
            root: self.root,
            index: self.index,
            methods,
            autoindex: self.autoindex,
            upload_dir: self.upload_dir,
            redirection: self.redirection,
            cgi_extension: self.cgi_extension,
        })
    }
}

/// One `location` block of a server.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Location {
    path: String,
    root: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    index: Option<String>,
    methods: Vec<Method>,
    autoindex: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    upload_dir: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    redirection: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    cgi_extension: Option<String>,
}

impl Location {
    /// Creates a new `LocationBuilder` with default settings.
    ///
    /// Default values:
    /// - path: empty (must be set)
    /// - root: empty (must be set unless redirecting)
    /// - methods: `GET` when none are given
    /// - autoindex: false
    pub fn builder() -> LocationBuilder {
        LocationBuilder {
            path: String::new(),
            root: String::new(),
            index: None,
            methods: Vec::new(),
            autoindex: false,
            upload_dir: None,
            redirection: None,
            cgi_extension: None,
        }
    }

    /// Returns the URI prefix.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the filesystem root. Empty only for redirecting locations.
    pub fn root(&self) -> &str {
        &self.root
    }

    /// Returns the index file name.
    pub fn index(&self) -> Option<&str> {
        self.index
            .as_deref()
    }

    /// Returns the allowed methods, never empty.
    pub fn methods(&self) -> &[Method] {
        &self.methods
    }

    /// Returns whether `method` is one of the allowed methods.
    pub fn allows(&self, method: &http::Method) -> bool {
        self.methods
            .iter()
            .any(|allowed| allowed == method)
    }

    /// Returns whether directory listings are enabled.
    pub fn autoindex(&self) -> bool {
        self.autoindex
    }

    /// Returns the upload directory.
    pub fn upload_dir(&self) -> Option<&str> {
        self.upload_dir
            .as_deref()
    }

    /// Returns the redirect target, if this location redirects.
    pub fn redirection(&self) -> Option<&str> {
        self.redirection
            .as_deref()
            .filter(|url| !url.is_empty())
    }

    /// Returns the CGI file extension, including the leading dot.
    pub fn cgi_extension(&self) -> Option<&str> {
        self.cgi_extension
            .as_deref()
    }
}

/// Builder for creating `Server` instances.
pub struct ServerBuilder {
    listens: Vec<ListenAddress>,
    server_names: Vec<String>,
    max_body_size: u64,
    error_pages: BTreeMap<u16, String>,
    locations: Vec<Location>,
}

impl ServerBuilder {
    /// Adds an address the server listens on.
    pub fn listen(mut self, listen: ListenAddress) -> Self {
        self.listens
            .push(listen);
        self
    }

    /// Adds a name matched against the request host.
    pub fn server_name(mut self, name: &str) -> Self {
        self.server_names
            .push(name.to_string());
        self
    }

    /// Sets the largest request body accepted, in bytes.
    pub fn max_body_size(mut self, size: u64) -> Self {
        self.max_body_size = size;
        self
    }

    /// Maps a status code to an error page. A repeated code replaces the
    /// previous page.
    pub fn error_page(mut self, code: u16, path: &str) -> Self {
        self.error_pages
            .insert(code, path.to_string());
        self
    }

    /// Appends a location block.
    pub fn location(mut self, location: Location) -> Self {
        self.locations
            .push(location);
        self
    }

    /// Creates the `Server`.
    ///
    /// # Errors
    ///
    /// Returns an error if no listen address was added, a server name is
    /// empty or an error page entry is out of range.
    pub fn build(self) -> Result<Server, WebrouteError> {
        Ok(self.finish()?)
    }

    pub(crate) fn finish(self) -> Result<Server, ConfigError> {
        if self
            .listens
            .is_empty()
        {
            return Err(no_listen_error());
        }
        for name in &self.server_names {
            check_server_name(name)?;
        }
        for (code, path) in &self.error_pages {
            check_status_code(*code)?;
            check_error_page_path(path)?;
        }

        Ok(Server {
            listens: self.listens,
            server_names: self.server_names,
            max_body_size: self.max_body_size,
            error_pages: self.error_pages,
            locations: self.locations,
        })
    }
}

/// One `server` block: a virtual host.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Server {
    listens: Vec<ListenAddress>,
    server_names: Vec<String>,
    max_body_size: u64,
    error_pages: BTreeMap<u16, String>,
    locations: Vec<Location>,
}

impl Server {
    /// Creates a new `ServerBuilder` with no listens, no names, no
    /// locations and a 1 MiB body limit.
    pub fn builder() -> ServerBuilder {
        ServerBuilder {
            listens: Vec::new(),
            server_names: Vec::new(),
            max_body_size: DEFAULT_MAX_BODY_SIZE,
            error_pages: BTreeMap::new(),
            locations: Vec::new(),
        }
    }

    /// Returns the listen addresses in declaration order.
    ///
    /// # Examples
    ///
    /// ```rust,ignore
    /// use webroute::ConfigTree;
    ///
    /// let tree: ConfigTree = "server { listen 0.0.0.0:80; listen 0.0.0.0:8080; }".parse()?;
    ///
    /// for listen in tree.servers()[0].listens() {
    ///     println!("Listening on {}", listen);
    /// }
    /// ```
    pub fn listens(&self) -> &[ListenAddress] {
        &self.listens
    }

    /// Returns the server names.
    pub fn server_names(&self) -> &[String] {
        &self.server_names
    }

    /// Returns the body size limit in bytes.
    pub fn max_body_size(&self) -> u64 {
        self.max_body_size
    }

    /// Returns all error pages keyed by status code.
    pub fn error_pages(&self) -> &BTreeMap<u16, String> {
        &self.error_pages
    }

    /// Returns the page configured for `code`, if any.
    pub fn error_page(&self, code: u16) -> Option<&str> {
        self.error_pages
            .get(&code)
            .map(String::as_str)
    }

    /// Returns the locations in declaration order.
    pub fn locations(&self) -> &[Location] {
        &self.locations
    }

    /// Returns whether one of the listen entries uses `port`.
    pub fn listens_on(&self, port: u16) -> bool {
        self.listens
            .iter()
            .any(|listen| listen.port() == port)
    }

    /// Returns whether `host` is exactly one of the server names.
    pub fn answers_to(&self, host: &str) -> bool {
        self.server_names
            .iter()
            .any(|name| name == host)
    }
}

/// Builder for creating `ConfigTree` instances.
#[derive(Default)]
pub struct ConfigTreeBuilder {
    servers: Vec<Server>,
}

impl ConfigTreeBuilder {
    /// Appends a server block.
    pub fn server(mut self, server: Server) -> Self {
        self.servers
            .push(server);
        self
    }

    /// Creates the `ConfigTree`.
    ///
    /// # Errors
    ///
    /// Returns an error if no server was added.
    pub fn build(self) -> Result<ConfigTree, WebrouteError> {
        if self
            .servers
            .is_empty()
        {
            return Err(no_server_error().into());
        }
        Ok(ConfigTree { servers: self.servers })
    }
}

/// The validated result of loading one configuration source.
///
/// The tree is immutable. Share it through an `Arc` and replace it wholesale
/// to reload.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct ConfigTree {
    servers: Vec<Server>,
}

impl ConfigTree {
    /// Creates a new `ConfigTreeBuilder` with no servers.
    ///
    /// # Examples
    ///
    /// ```rust,ignore
    /// use webroute::config::{ConfigTree, ListenAddress, Location, Server};
    ///
    /// let tree = ConfigTree::builder()
    ///     .server(
    ///         Server::builder()
    ///             .listen(ListenAddress::new("127.0.0.1", 8080)?)
    ///             .location(Location::builder().path("/").root("/var/www/").build()?)
    ///             .build()?,
    ///     )
    ///     .build()?;
    /// ```
    pub fn builder() -> ConfigTreeBuilder {
        ConfigTreeBuilder::default()
    }

    pub(crate) fn from_servers(servers: Vec<Server>) -> Result<ConfigTree, ConfigError> {
        if servers.is_empty() {
            return Err(no_server_error());
        }
        Ok(ConfigTree { servers })
    }

    /// Returns the servers in declaration order.
    pub fn servers(&self) -> &[Server] {
        &self.servers
    }

    /// Renders the tree as YAML.
    pub fn to_yaml(&self) -> Result<String, WebrouteError> {
        serde_yaml_ng::to_string(self).map_err(|e| WebrouteError::Render(e.to_string()))
    }
}

impl FromStr for ConfigTree {
    type Err = ConfigError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        crate::parser::parse_str(text)
    }
}

pub(crate) fn no_server_error() -> ConfigError {
    ConfigError::Syntax("Configuration must contain at least one server block".to_string())
}

pub(crate) fn no_listen_error() -> ConfigError {
    ConfigError::Validation("Server block must contain at least one listen directive".to_string())
}

pub(crate) fn check_location_path(path: &str) -> Result<(), ConfigError> {
    if !path.starts_with('/') {
        return Err(ConfigError::Validation(format!("Location path must start with '/': {}", path)));
    }
    Ok(())
}

pub(crate) fn check_server_name(name: &str) -> Result<(), ConfigError> {
    if name.is_empty() {
        return Err(ConfigError::Validation("Server name cannot be empty".to_string()));
    }
    Ok(())
}

pub(crate) fn check_root(root: &str) -> Result<(), ConfigError> {
    if root.is_empty() {
        return Err(ConfigError::Validation("Root path cannot be empty".to_string()));
    }
    if !root.starts_with('/') {
        return Err(ConfigError::Validation(format!("Root path must start with '/': {}", root)));
    }
    Ok(())
}

pub(crate) fn check_index(index: &str) -> Result<(), ConfigError> {
    if index.is_empty() {
        return Err(ConfigError::Validation("Index cannot be empty".to_string()));
    }
    if index.contains('/') {
        return Err(ConfigError::Validation(format!(
            "Index cannot contain '/' character: {}",
            index
        )));
    }
    if !index.contains('.') {
        return Err(ConfigError::Validation(format!(
            "Index must have an extension (e.g. index.html): {}",
            index
        )));
    }
    Ok(())
}

pub(crate) fn parse_autoindex(value: &str) -> Result<bool, ConfigError> {
    match value {
        "on" => Ok(true),
        "off" => Ok(false),
        _ => Err(ConfigError::Validation(format!("autoindex must be 'on' or 'off': {}", value))),
    }
}

pub(crate) fn check_methods(methods: &[Method]) -> Result<(), ConfigError> {
    for (i, method) in methods
        .iter()
        .enumerate()
    {
        if methods[..i].contains(method) {
            return Err(ConfigError::Validation(format!("Duplicate method: {}", method)));
        }
    }
    Ok(())
}

pub(crate) fn check_upload_dir(upload_dir: &str) -> Result<(), ConfigError> {
    if upload_dir.is_empty() {
        return Err(ConfigError::Validation("upload_dir cannot be empty".to_string()));
    }
    if !upload_dir.starts_with('/') {
        return Err(ConfigError::Validation(format!(
            "upload_dir path must start with '/': {}",
            upload_dir
        )));
    }
    Ok(())
}

pub(crate) fn check_redirection(url: &str) -> Result<(), ConfigError> {
    if url.is_empty() {
        return Err(ConfigError::Validation("Redirection URL cannot be empty".to_string()));
    }
    Ok(())
}

pub(crate) fn check_cgi_extension(extension: &str) -> Result<(), ConfigError> {
    if extension.is_empty() {
        return Err(ConfigError::Validation("cgi_extension cannot be empty".to_string()));
    }
    if !extension.starts_with('.') {
        return Err(ConfigError::Validation(format!(
            "cgi_extension must start with '.': {}",
            extension
        )));
    }
    Ok(())
}

pub(crate) fn check_status_code(code: u16) -> Result<(), ConfigError> {
    if !(300..=599).contains(&code) {
        return Err(ConfigError::Validation(format!(
            "Invalid status code for error_page: {}",
            code
        )));
    }
    Ok(())
}

pub(crate) fn parse_status_code(value: &str) -> Result<u16, ConfigError> {
    let code = value
        .parse::<u16>()
        .map_err(|_| {
            ConfigError::Validation(format!("Invalid status code for error_page: {}", value))
        })?;
    check_status_code(code)?;
    Ok(code)
}

pub(crate) fn check_error_page_path(path: &str) -> Result<(), ConfigError> {
    if path.is_empty() {
        return Err(ConfigError::Validation("Error page path cannot be empty".to_string()));
    }
    if !path.starts_with('/') {
        return Err(ConfigError::Validation(format!(
            "Error page path must start with '/': {}",
            path
        )));
    }
    Ok(())
}

pub(crate) fn parse_max_body_size(value: &str) -> Result<u64, ConfigError> {
    let invalid = || {
        ConfigError::Validation(format!(
            "client_max_body_size must be a non-negative integer: {}",
            value
        ))
    };

    if value.is_empty()
        || !value
            .bytes()
            .all(|b| b.is_ascii_digit())
    {
        return Err(invalid());
    }
    value
        .parse::<u64>()
        .map_err(|_| invalid())
}
