//! Configuration text scanner.
//!
//! Whitespace and the structural characters `{`, `}` and `;` separate words.
//! Every word is classified as a [`TokenKind::Keyword`] when it names a known
//! directive and as a [`TokenKind::Value`] otherwise. There is no quoting,
//! escaping or comment syntax.

use std::fmt;

use log::trace;

/// Words recognised as directive keywords.
pub const KEYWORDS: [&str; 13] = [
    "server",
    "listen",
    "location",
    "root",
    "methods",
    "index",
    "server_name",
    "autoindex",
    "error_page",
    "upload_dir",
    "cgi_extension",
    "redirection",
    "client_max_body_size",
];

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TokenKind {
    Keyword,
    Value,
    BraceOpen,
    BraceClose,
    Semicolon,
    End,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenKind::Keyword => "keyword",
            TokenKind::Value => "value",
            TokenKind::BraceOpen => "'{'",
            TokenKind::BraceClose => "'}'",
            TokenKind::Semicolon => "';'",
            TokenKind::End => "end of file",
        };
        f.write_str(name)
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Token {
    kind: TokenKind,
    text: String,
}

impl Token {
    pub fn new(kind: TokenKind, text: &str) -> Token {
        Token { kind, text: text.to_string() }
    }

    pub(crate) const fn end() -> Token {
        Token { kind: TokenKind::End, text: String::new() }
    }

    pub fn kind(&self) -> TokenKind {
        self.kind
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::Keyword | TokenKind::Value => write!(f, "'{}'", self.text),
            kind => write!(f, "{}", kind),
        }
    }
}

/// Returns whether `word` is a directive keyword.
pub fn is_keyword(word: &str) -> bool {
    KEYWORDS.contains(&word)
}

/// Splits configuration text into tokens.
///
/// Never fails; the returned sequence always ends with a single
/// [`TokenKind::End`] token.
pub fn tokenize(text: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut word = String::new();

    for c in text.chars() {
        let structural = match c {
            '{' => Some(TokenKind::BraceOpen),
            '}' => Some(TokenKind::BraceClose),
            ';' => Some(TokenKind::Semicolon),
            _ => None,
        };

        if c.is_whitespace() || structural.is_some() {
            flush(&mut word, &mut tokens);
            if let Some(kind) = structural {
                tokens.push(Token { kind, text: c.to_string() });
            }
        } else {
            word.push(c);
        }
    }
    flush(&mut word, &mut tokens);

    tokens.push(Token::end());
    trace!("scanned {} tokens", tokens.len());
    tokens
}

fn flush(word: &mut String, tokens: &mut Vec<Token>) {
    if word.is_empty() {
        return;
    }
    let kind = if is_keyword(word) { TokenKind::Keyword } else { TokenKind::Value };
    tokens.push(Token { kind, text: std::mem::take(word) });
}
