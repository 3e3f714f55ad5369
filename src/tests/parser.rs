use std::error::Error;

use crate::{
    config::{ConfigTree, Method, DEFAULT_MAX_BODY_SIZE},
    errors::ConfigError,
    parser::{
        parse, parse_str,
        scanner::{tokenize, Token, TokenKind},
    },
};

const FULL_CONFIG: &str = r#"
server {
    listen 127.0.0.1:8080;
    listen 0.0.0.0:8081;
    server_name localhost;
    server_name www.localhost;
    client_max_body_size 2097152;
    error_page 404 /errors/404.html;
    error_page 500 /errors/500.html;

    location / {
        root /var/www/html;
        index index.html;
        methods GET POST;
    }

    location /uploads {
        root /var/www/uploads;
        autoindex on;
        methods GET POST DELETE;
        upload_dir /var/www/uploads/incoming;
        cgi_extension .py;
    }

    location /old {
        redirection = https://example.com/new;
    }
}

server {
    listen 127.0.0.1:9090;
}
"#;

fn parse_server_body(body: &str) -> Result<ConfigTree, ConfigError> {
    parse_str(&format!("server {{ listen 127.0.0.1:8080; {} }}", body))
}

fn parse_location_body(body: &str) -> Result<ConfigTree, ConfigError> {
    parse_server_body(&format!("location / {{ {} root /var/www; }}", body))
}

fn validation(message: &str) -> Option<ConfigError> {
    Some(ConfigError::Validation(message.to_string()))
}

fn syntax(message: &str) -> Option<ConfigError> {
    Some(ConfigError::Syntax(message.to_string()))
}

#[test]
fn test_parse_full_config() -> Result<(), Box<dyn Error>> {
    let tree = parse_str(FULL_CONFIG)?;
    assert_eq!(
        tree.servers()
            .len(),
        2
    );

    let server = &tree.servers()[0];
    assert_eq!(
        server
            .listens()
            .len(),
        2
    );
    assert_eq!(server.listens()[0].host(), "127.0.0.1");
    assert_eq!(server.listens()[0].port(), 8080);
    assert_eq!(server.listens()[1].port(), 8081);
    assert_eq!(server.server_names(), ["localhost".to_string(), "www.localhost".to_string()]);
    assert_eq!(server.max_body_size(), 2097152);
    assert_eq!(server.error_page(404), Some("/errors/404.html"));
    assert_eq!(server.error_page(500), Some("/errors/500.html"));
    assert_eq!(server.error_page(403), None);

    let locations = server.locations();
    assert_eq!(locations.len(), 3);

    assert_eq!(locations[0].path(), "/");
    assert_eq!(locations[0].root(), "/var/www/html");
    assert_eq!(locations[0].index(), Some("index.html"));
    assert_eq!(locations[0].methods(), [Method::Get, Method::Post]);
    assert!(!locations[0].autoindex());

    assert_eq!(locations[1].path(), "/uploads");
    assert!(locations[1].autoindex());
    assert_eq!(locations[1].methods(), [Method::Get, Method::Post, Method::Delete]);
    assert_eq!(locations[1].upload_dir(), Some("/var/www/uploads/incoming"));
    assert_eq!(locations[1].cgi_extension(), Some(".py"));
    assert_eq!(locations[1].redirection(), None);

    assert_eq!(locations[2].redirection(), Some("https://example.com/new"));
    assert_eq!(locations[2].methods(), [Method::Get]);

    let second = &tree.servers()[1];
    assert!(second
        .server_names()
        .is_empty());
    assert_eq!(second.max_body_size(), DEFAULT_MAX_BODY_SIZE);
    assert!(second
        .locations()
        .is_empty());

    Ok(())
}

#[test]
fn test_parse_is_deterministic() -> Result<(), Box<dyn Error>> {
    let first = parse(&tokenize(FULL_CONFIG))?;
    let second = parse(&tokenize(FULL_CONFIG))?;
    assert_eq!(first, second);

    let from_str: ConfigTree = FULL_CONFIG.parse()?;
    assert_eq!(first, from_str);

    Ok(())
}

#[test]
fn test_parse_without_end_token() -> Result<(), Box<dyn Error>> {
    let mut tokens = tokenize("server { listen 127.0.0.1:8080; }");
    assert_eq!(tokens.pop(), Some(Token::new(TokenKind::End, "")));

    let tree = parse(&tokens)?;
    assert_eq!(
        tree.servers()
            .len(),
        1
    );

    Ok(())
}

#[test]
fn test_empty_config() {
    assert_eq!(
        parse_str("").err(),
        syntax("Configuration must contain at least one server block")
    );
}

#[test]
fn test_listen() -> Result<(), Box<dyn Error>> {
    let tree = parse_str("server { listen 127.0.0.1:8080; }")?;
    let listen = &tree.servers()[0].listens()[0];
    assert_eq!(listen.host(), "127.0.0.1");
    assert_eq!(listen.port(), 8080);

    assert_eq!(
        parse_str("server { listen 127.0.0.1:70000; }").err(),
        validation("Port must be between 1 and 65535: 70000")
    );
    assert_eq!(
        parse_str("server { listen 127.0.0.1:0; }").err(),
        validation("Port must be between 1 and 65535: 0")
    );
    assert_eq!(
        parse_str("server { listen localhost:http; }").err(),
        validation("Port must be between 1 and 65535: http")
    );
    assert_eq!(
        parse_str("server { listen 8080; }").err(),
        validation("Invalid listen format '8080', use HOST:PORT")
    );
    assert_eq!(
        parse_str("server { listen ::1:8080; }").err(),
        validation("Invalid listen format '::1:8080', use HOST:PORT")
    );
    assert_eq!(parse_str("server { listen :8080; }").err(), validation("Listen host cannot be empty"));

    Ok(())
}

#[test]
fn test_server_without_listen() {
    assert_eq!(
        parse_str("server { server_name localhost; }").err(),
        validation("Server block must contain at least one listen directive")
    );
}

#[test]
fn test_client_max_body_size() -> Result<(), Box<dyn Error>> {
    let tree = parse_server_body("client_max_body_size 2097152;")?;
    assert_eq!(tree.servers()[0].max_body_size(), 2097152);

    let tree = parse_server_body("client_max_body_size 0;")?;
    assert_eq!(tree.servers()[0].max_body_size(), 0);

    assert_eq!(
        parse_server_body("client_max_body_size abc;").err(),
        validation("client_max_body_size must be a non-negative integer: abc")
    );
    assert_eq!(
        parse_server_body("client_max_body_size -1;").err(),
        validation("client_max_body_size must be a non-negative integer: -1")
    );
    assert_eq!(
        parse_server_body("client_max_body_size 1; client_max_body_size 2;").err(),
        validation("Duplicate client_max_body_size directive in server block")
    );

    Ok(())
}

#[test]
fn test_error_page() -> Result<(), Box<dyn Error>> {
    let tree = parse_server_body("error_page 404 /a.html; error_page 404 /b.html;")?;
    assert_eq!(tree.servers()[0].error_page(404), Some("/b.html"));
    assert_eq!(
        tree.servers()[0]
            .error_pages()
            .len(),
        1
    );

    assert_eq!(
        parse_server_body("error_page 200 /ok.html;").err(),
        validation("Invalid status code for error_page: 200")
    );
    assert_eq!(
        parse_server_body("error_page 600 /x.html;").err(),
        validation("Invalid status code for error_page: 600")
    );
    assert_eq!(
        parse_server_body("error_page abc /x.html;").err(),
        validation("Invalid status code for error_page: abc")
    );
    assert_eq!(
        parse_server_body("error_page 404 x.html;").err(),
        validation("Error page path must start with '/': x.html")
    );
    assert_eq!(
        parse_server_body("error_page 404;").err(),
        syntax("Expected path for error_page, found ';'")
    );

    Ok(())
}

#[test]
fn test_unknown_directives() {
    assert_eq!(parse_server_body("gzip on;").err(), syntax("Unknown server directive: gzip"));
    assert_eq!(parse_server_body("root /var/www;").err(), syntax("Unknown server directive: root"));
    assert_eq!(parse_location_body("foo bar;").err(), syntax("Unknown location directive: foo"));
    assert_eq!(
        parse_location_body("listen 127.0.0.1:9000;").err(),
        syntax("Unknown location directive: listen")
    );
    assert_eq!(
        parse_location_body("location /nested { }").err(),
        syntax("Unknown location directive: location")
    );
}

#[test]
fn test_structure_errors() {
    assert_eq!(
        parse_str("listen 127.0.0.1:8080;").err(),
        syntax("Expected 'server' keyword, found 'listen'")
    );
    assert_eq!(parse_str("server listen").err(), syntax("Expected '{' after server, found 'listen'"));
    assert_eq!(
        parse_str("server { listen 127.0.0.1:8080 }").err(),
        syntax("Expected ';' after listen, found '}'")
    );
    assert_eq!(
        parse_str("server { listen 127.0.0.1:8080;").err(),
        syntax("Expected '}' at end of server block")
    );
    assert_eq!(
        parse_str("server { listen 127.0.0.1:8080; location / { root /var/www; }").err(),
        syntax("Expected '}' at end of server block")
    );
    assert_eq!(
        parse_str("server { listen 127.0.0.1:8080; location / { root /var/www;").err(),
        syntax("Expected '}' at end of location block")
    );
    assert_eq!(
        parse_str("server { listen 127.0.0.1:8080; ; }").err(),
        syntax("Unexpected ';' inside server block")
    );
    assert_eq!(
        parse_server_body("server_name server;").err(),
        syntax("Expected value for server_name directive, found 'server'")
    );
}

#[test]
fn test_location_path() {
    assert_eq!(
        parse_server_body("location images { }").err(),
        validation("Location path must start with '/': images")
    );
    assert_eq!(
        parse_server_body("location { }").err(),
        syntax("Expected value for location path, found '{'")
    );
    assert_eq!(
        parse_server_body("location /a /b { }").err(),
        syntax("Expected '{' after location path, found '/b'")
    );
}

#[test]
fn test_duplicate_location_directives() {
    for (body, directive) in [
        ("root /a; root /b;", "root"),
        ("index a.html; index b.html;", "index"),
        ("autoindex on; autoindex off;", "autoindex"),
        ("methods GET; methods POST;", "methods"),
        ("upload_dir /a; upload_dir /b;", "upload_dir"),
        ("redirection = /a; redirection = /b;", "redirection"),
        ("cgi_extension .py; cgi_extension .php;", "cgi_extension"),
    ] {
        assert_eq!(
            parse_location_body(body).err(),
            validation(&format!("Duplicate {} directive in location block", directive))
        );
    }
}

#[test]
fn test_duplicate_directives_are_scoped_to_block() -> Result<(), Box<dyn Error>> {
    let tree = parse_server_body(
        "location / { autoindex on; root /srv; } location /other { autoindex off; root /srv; }",
    )?;
    let locations = tree.servers()[0].locations();
    assert!(locations[0].autoindex());
    assert!(!locations[1].autoindex());

    Ok(())
}

#[test]
fn test_root_and_upload_dir() {
    assert_eq!(
        parse_location_body("root var/www;").err(),
        validation("Root path must start with '/': var/www")
    );
    assert_eq!(
        parse_location_body("upload_dir uploads;").err(),
        validation("upload_dir path must start with '/': uploads")
    );
}

#[test]
fn test_location_requires_root() -> Result<(), Box<dyn Error>> {
    assert_eq!(
        parse_server_body("location /docs { methods GET; }").err(),
        validation("Location must define a root: /docs")
    );
    assert_eq!(
        parse_server_body("location / { }").err(),
        validation("Location must define a root: /")
    );

    let tree = parse_server_body("location /old { redirection = https://example.com; }")?;
    assert_eq!(tree.servers()[0].locations()[0].root(), "");

    Ok(())
}

#[test]
fn test_index() {
    assert_eq!(
        parse_location_body("index html/index.html;").err(),
        validation("Index cannot contain '/' character: html/index.html")
    );
    assert_eq!(
        parse_location_body("index index;").err(),
        validation("Index must have an extension (e.g. index.html): index")
    );
}

#[test]
fn test_autoindex() -> Result<(), Box<dyn Error>> {
    let tree = parse_location_body("autoindex on;")?;
    assert!(tree.servers()[0].locations()[0].autoindex());

    let tree = parse_location_body("autoindex off;")?;
    assert!(!tree.servers()[0].locations()[0].autoindex());

    assert_eq!(
        parse_location_body("autoindex yes;").err(),
        validation("autoindex must be 'on' or 'off': yes")
    );

    Ok(())
}

#[test]
fn test_methods() -> Result<(), Box<dyn Error>> {
    let tree = parse_location_body("methods DELETE GET;")?;
    assert_eq!(tree.servers()[0].locations()[0].methods(), [Method::Delete, Method::Get]);

    assert_eq!(parse_location_body("methods GET GET;").err(), validation("Duplicate method: GET"));
    assert_eq!(parse_location_body("methods GET PUT;").err(), validation("Invalid method: PUT"));
    assert_eq!(parse_location_body("methods get;").err(), validation("Invalid method: get"));
    assert_eq!(
        parse_location_body("methods ;").err(),
        validation("At least one method must be specified")
    );
    assert_eq!(
        parse_location_body("methods GET root /a;").err(),
        syntax("Expected ';' after methods, found 'root'")
    );

    Ok(())
}

#[test]
fn test_redirection() -> Result<(), Box<dyn Error>> {
    let tree = parse_location_body("redirection = https://example.com;")?;
    assert_eq!(tree.servers()[0].locations()[0].redirection(), Some("https://example.com"));

    assert_eq!(
        parse_location_body("redirection https://example.com;").err(),
        syntax("Expected '=' after redirection, found 'https://example.com'")
    );
    assert_eq!(
        parse_location_body("redirection = ;").err(),
        syntax("Expected URL after '=', found ';'")
    );

    Ok(())
}

#[test]
fn test_cgi_extension() {
    assert_eq!(
        parse_location_body("cgi_extension py;").err(),
        validation("cgi_extension must start with '.': py")
    );
}
