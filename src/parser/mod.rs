//! Recursive-descent parser for the directive language.
//!
//! ```text
//! config    := server+
//! server    := "server" "{" serverDir* "}"
//! serverDir := listen | server_name | location | error_page | client_max_body_size
//! location  := "location" VALUE "{" locDir* "}"
//! locDir    := root | index | autoindex | methods | upload_dir | redirection | cgi_extension
//! ```
//!
//! Parsing stops at the first violated rule. Structural problems are reported
//! as [`ConfigError::Syntax`], out-of-domain values as
//! [`ConfigError::Validation`]. No partial tree is ever returned.

use std::collections::HashSet;

use log::{debug, warn};

use crate::{
    config::{self, ConfigTree, ListenAddress, Server},
    errors::ConfigError,
};

pub mod location;
pub mod scanner;

use scanner::{tokenize, Token, TokenKind};

static END: Token = Token::end();

/// Parses a scanned token sequence into a configuration tree.
pub fn parse(tokens: &[Token]) -> Result<ConfigTree, ConfigError> {
    Parser::new(tokens).parse()
}

/// Scans and parses configuration text.
pub fn parse_str(text: &str) -> Result<ConfigTree, ConfigError> {
    parse(&tokenize(text))
}

/// Cursor over a token sequence.
///
/// Reading past the last token keeps yielding an end token, so a sequence
/// without a trailing end marker is handled the same as one with it.
pub(crate) struct Parser<'a> {
    tokens: &'a [Token],
    index: usize,
}

impl<'a> Parser<'a> {
    pub(crate) fn new(tokens: &'a [Token]) -> Parser<'a> {
        Parser { tokens, index: 0 }
    }

    pub(crate) fn peek(&self) -> &'a Token {
        let tokens: &'a [Token] = self.tokens;
        tokens
            .get(self.index)
            .unwrap_or(&END)
    }

    pub(crate) fn advance(&mut self) -> &'a Token {
        let token = self.peek();
        if self.index < self.tokens.len() {
            self.index += 1;
        }
        token
    }

    pub(crate) fn expect(&mut self, kind: TokenKind, context: &str) -> Result<(), ConfigError> {
        let token = self.advance();
        if !token.is(kind) {
            return Err(ConfigError::Syntax(format!(
                "Expected {} {}, found {}",
                kind, context, token
            )));
        }
        Ok(())
    }

    pub(crate) fn expect_value(&mut self, what: &str) -> Result<&'a str, ConfigError> {
        let token = self.advance();
        if !token.is(TokenKind::Value) {
            return Err(ConfigError::Syntax(format!("Expected {}, found {}", what, token)));
        }
        Ok(token.text())
    }

    pub(crate) fn expect_semicolon(&mut self, directive: &str) -> Result<(), ConfigError> {
        self.expect(TokenKind::Semicolon, &format!("after {}", directive))
    }

    fn parse(&mut self) -> Result<ConfigTree, ConfigError> {
        let mut servers = Vec::new();
        while !self
            .peek()
            .is(TokenKind::End)
        {
            servers.push(self.parse_server()?);
        }
        debug!("parsed {} server blocks", servers.len());
        ConfigTree::from_servers(servers)
    }

    fn parse_server(&mut self) -> Result<Server, ConfigError> {
        let token = self.advance();
        if !token.is(TokenKind::Keyword) || token.text() != "server" {
            return Err(ConfigError::Syntax(format!("Expected 'server' keyword, found {}", token)));
        }
        self.expect(TokenKind::BraceOpen, "after server")?;

        let mut server = Server::builder();
        let mut seen = DirectiveSet::new("server");

        loop {
            let token = self.advance();
            match token.kind() {
                TokenKind::BraceClose => break,
                TokenKind::End => {
                    return Err(ConfigError::Syntax(
                        "Expected '}' at end of server block".to_string(),
                    ))
                }
                TokenKind::Keyword => {
                    server = match token.text() {
                        "listen" => server.listen(self.parse_listen()?),
                        "server_name" => server.server_name(self.parse_server_name()?),
                        "location" => server.location(self.parse_location()?),
                        "error_page" => {
                            let (code, path) = self.parse_error_page()?;
                            if seen.repeats(code) {
                                warn!("error_page {} declared again, keeping {}", code, path);
                            }
                            server.error_page(code, path)
                        }
                        "client_max_body_size" => {
                            seen.mark("client_max_body_size")?;
                            server.max_body_size(self.parse_max_body_size()?)
                        }
                        other => {
                            return Err(ConfigError::Syntax(format!(
                                "Unknown server directive: {}",
                                other
                            )))
                        }
                    };
                }
                TokenKind::Value => {
                    return Err(ConfigError::Syntax(format!(
                        "Unknown server directive: {}",
                        token.text()
                    )))
                }
                _ => {
                    return Err(ConfigError::Syntax(format!(
                        "Unexpected {} inside server block",
                        token
                    )))
                }
            }
        }

        let server = server.finish()?;
        debug!(
            "server block: {} listens, {} names, {} locations",
            server
                .listens()
                .len(),
            server
                .server_names()
                .len(),
            server
                .locations()
                .len()
        );
        Ok(server)
    }

    fn parse_listen(&mut self) -> Result<ListenAddress, ConfigError> {
        let value = self.expect_value("value for listen directive")?;
        let listen = value.parse::<ListenAddress>()?;
        self.expect_semicolon("listen")?;
        Ok(listen)
    }

    fn parse_server_name(&mut self) -> Result<&'a str, ConfigError> {
        let name = self.expect_value("value for server_name directive")?;
        config::check_server_name(name)?;
        self.expect_semicolon("server_name")?;
        Ok(name)
    }

    fn parse_error_page(&mut self) -> Result<(u16, &'a str), ConfigError> {
        let code = self.expect_value("status code for error_page")?;
        let code = config::parse_status_code(code)?;
        let path = self.expect_value("path for error_page")?;
        config::check_error_page_path(path)?;
        self.expect_semicolon("error_page")?;
        Ok((code, path))
    }

    fn parse_max_body_size(&mut self) -> Result<u64, ConfigError> {
        let value = self.expect_value("value for client_max_body_size")?;
        let size = config::parse_max_body_size(value)?;
        self.expect_semicolon("client_max_body_size")?;
        Ok(size)
    }
}

/// Directives already seen in the block being parsed.
///
/// A fresh set is created on every block entry.
pub(crate) struct DirectiveSet {
    block: &'static str,
    seen: HashSet<&'static str>,
    status_codes: HashSet<u16>,
}

impl DirectiveSet {
    pub(crate) fn new(block: &'static str) -> DirectiveSet {
        DirectiveSet { block, seen: HashSet::new(), status_codes: HashSet::new() }
    }

    /// Records a single-valued directive, failing on its second occurrence.
    pub(crate) fn mark(&mut self, directive: &'static str) -> Result<(), ConfigError> {
        if !self
            .seen
            .insert(directive)
        {
            return Err(ConfigError::Validation(format!(
                "Duplicate {} directive in {} block",
                directive, self.block
            )));
        }
        Ok(())
    }

    /// Records an error page status code, returning whether it was seen before.
    pub(crate) fn repeats(&mut self, code: u16) -> bool {
        !self
            .status_codes
            .insert(code)
    }
}
