//! Rules for `location` blocks.

use log::trace;

use crate::{
    config::{self, Location, Method},
    errors::ConfigError,
};

use super::{
    scanner::{Token, TokenKind},
    DirectiveSet, Parser,
};

impl<'a> Parser<'a> {
    pub(crate) fn parse_location(&mut self) -> Result<Location, ConfigError> {
        let path = self.expect_value("value for location path")?;
        config::check_location_path(path)?;
        self.expect(TokenKind::BraceOpen, "after location path")?;

        let mut location = Location::builder().path(path);
        let mut seen = DirectiveSet::new("location");

        loop {
            let token = self.advance();
            match token.kind() {
                TokenKind::BraceClose => break,
                TokenKind::End => {
                    return Err(ConfigError::Syntax(
                        "Expected '}' at end of location block".to_string(),
                    ))
                }
                TokenKind::Keyword => {
                    let directive = location_directive(token)?;
                    seen.mark(directive)?;
                    location = match directive {
                        "root" => location.root(self.parse_root()?),
                        "index" => location.index(self.parse_index()?),
                        "autoindex" => location.autoindex(self.parse_autoindex()?),
                        "methods" => location.methods(self.parse_methods()?),
                        "upload_dir" => location.upload_dir(self.parse_upload_dir()?),
                        "redirection" => location.redirection(self.parse_redirection()?),
                        _ => location.cgi_extension(self.parse_cgi_extension()?),
                    };
                }
                TokenKind::Value => {
                    return Err(ConfigError::Syntax(format!(
                        "Unknown location directive: {}",
                        token.text()
                    )))
                }
                _ => {
                    return Err(ConfigError::Syntax(format!(
                        "Unexpected {} inside location block",
                        token
                    )))
                }
            }
        }

        trace!("location block {} parsed", path);
        location.finish()
    }

    fn parse_root(&mut self) -> Result<&'a str, ConfigError> {
        let root = self.expect_value("value for root directive")?;
        config::check_root(root)?;
        self.expect_semicolon("root")?;
        Ok(root)
    }

    fn parse_index(&mut self) -> Result<&'a str, ConfigError> {
        let index = self.expect_value("value for index directive")?;
        config::check_index(index)?;
        self.expect_semicolon("index")?;
        Ok(index)
    }

    fn parse_autoindex(&mut self) -> Result<bool, ConfigError> {
        let value = self.expect_value("value for autoindex directive")?;
        let autoindex = config::parse_autoindex(value)?;
        self.expect_semicolon("autoindex")?;
        Ok(autoindex)
    }

    fn parse_methods(&mut self) -> Result<Vec<Method>, ConfigError> {
        let mut methods: Vec<Method> = Vec::new();
        while self
            .peek()
            .is(TokenKind::Value)
        {
            let method = self
                .advance()
                .text()
                .parse::<Method>()?;
            if methods.contains(&method) {
                return Err(ConfigError::Validation(format!("Duplicate method: {}", method)));
            }
            methods.push(method);
        }
        if methods.is_empty() {
            return Err(ConfigError::Validation("At least one method must be specified".to_string()));
        }
        self.expect_semicolon("methods")?;
        Ok(methods)
    }

    fn parse_upload_dir(&mut self) -> Result<&'a str, ConfigError> {
        let upload_dir = self.expect_value("value for upload_dir")?;
        config::check_upload_dir(upload_dir)?;
        self.expect_semicolon("upload_dir")?;
        Ok(upload_dir)
    }

    fn parse_redirection(&mut self) -> Result<&'a str, ConfigError> {
        let equals = self.advance();
        if !equals.is(TokenKind::Value) || equals.text() != "=" {
            return Err(ConfigError::Syntax(format!(
                "Expected '=' after redirection, found {}",
                equals
            )));
        }
        let url = self.expect_value("URL after '='")?;
        config::check_redirection(url)?;
        self.expect_semicolon("redirection")?;
        Ok(url)
    }

    fn parse_cgi_extension(&mut self) -> Result<&'a str, ConfigError> {
        let extension = self.expect_value("value for cgi_extension")?;
        config::check_cgi_extension(extension)?;
        self.expect_semicolon("cgi_extension")?;
        Ok(extension)
    }
}

fn location_directive(token: &Token) -> Result<&'static str, ConfigError> {
    const DIRECTIVES: [&str; 7] =
        ["root", "index", "autoindex", "methods", "upload_dir", "redirection", "cgi_extension"];

    DIRECTIVES
        .iter()
        .find(|directive| **directive == token.text())
        .copied()
        .ok_or_else(|| {
            ConfigError::Syntax(format!("Unknown location directive: {}", token.text()))
        })
}
