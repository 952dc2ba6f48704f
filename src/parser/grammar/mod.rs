//! Recursive descent grammar.
//!
//! Free functions over a [`Parser`] holding the token buffer, one module per
//! declaration family. Lookahead is a single significant token; trivia is
//! skipped on demand, folding comments into the pending documentation block.

pub(super) mod enums;
pub(super) mod file;
pub(super) mod message;
pub(super) mod options;
pub(super) mod service;

use crate::core::Location;

use super::ParseError;
use super::lexer::{Token, TokenKind, tokenize};

pub(crate) struct Parser<'a> {
    tokens: Vec<Token<'a>>,
    pos: usize,
    file: Location,
    /// Comment text accumulated since the last declaration, pending
    /// attachment to the next one.
    pending_doc: String,
}

impl<'a> Parser<'a> {
    pub(crate) fn new(file: Location, text: &'a str) -> Self {
        Self {
            tokens: tokenize(text),
            pos: 0,
            file,
            pending_doc: String::new(),
        }
    }

    pub(super) fn file_location(&self) -> &Location {
        &self.file
    }

    /// Skip whitespace and comments, folding comment text into the pending
    /// documentation. A blank line detaches any accumulated comments from
    /// the declaration that follows.
    fn skip_trivia(&mut self) {
        while let Some(token) = self.tokens.get(self.pos) {
            match token.kind {
                TokenKind::Whitespace => {
                    if token.text.matches('\n').count() >= 2 {
                        self.pending_doc.clear();
                    }
                    self.pos += 1;
                }
                TokenKind::LineComment | TokenKind::BlockComment => {
                    let text = comment_text(token.text);
                    push_doc_line(&mut self.pending_doc, &text);
                    self.pos += 1;
                }
                _ => break,
            }
        }
    }

    /// Take the documentation accumulated for the declaration about to be
    /// parsed.
    pub(super) fn take_doc(&mut self) -> String {
        std::mem::take(&mut self.pending_doc)
    }

    /// The next significant token, without consuming it.
    pub(super) fn peek(&mut self) -> Option<Token<'a>> {
        self.skip_trivia();
        self.tokens.get(self.pos).copied()
    }

    pub(super) fn at_eof(&mut self) -> bool {
        self.peek().is_none()
    }

    pub(super) fn at(&mut self, kind: TokenKind) -> bool {
        self.peek().is_some_and(|t| t.kind == kind)
    }

    /// True when the next token is the given contextual keyword.
    pub(super) fn at_keyword(&mut self, keyword: &str) -> bool {
        self.peek()
            .is_some_and(|t| t.kind == TokenKind::Ident && t.text == keyword)
    }

    pub(super) fn bump(&mut self) -> Option<Token<'a>> {
        let token = self.peek()?;
        self.pos += 1;
        Some(token)
    }

    /// Consume the next token if it has the given kind.
    pub(super) fn eat(&mut self, kind: TokenKind) -> bool {
        if self.at(kind) {
            self.pos += 1;
            return true;
        }
        false
    }

    pub(super) fn expect(&mut self, kind: TokenKind) -> Result<Token<'a>, ParseError> {
        if self.at(kind) {
            let token = self.tokens[self.pos];
            self.pos += 1;
            return Ok(token);
        }
        Err(self.unexpected(kind.display_name()))
    }

    pub(super) fn expect_ident(&mut self) -> Result<Token<'a>, ParseError> {
        self.expect(TokenKind::Ident)
    }

    pub(super) fn expect_keyword(&mut self, keyword: &str) -> Result<(), ParseError> {
        if self.at_keyword(keyword) {
            self.pos += 1;
            return Ok(());
        }
        Err(self.unexpected(&format!("'{keyword}'")))
    }

    /// Current position, for bounded backtracking over a single token.
    pub(super) fn checkpoint(&self) -> usize {
        self.pos
    }

    pub(super) fn rewind(&mut self, checkpoint: usize) {
        self.pos = checkpoint;
    }

    /// Location of the next significant token, or of the file when at EOF.
    pub(super) fn location(&mut self) -> Location {
        match self.peek() {
            Some(token) => self.file.at(token.line, token.column),
            None => self.file.clone(),
        }
    }

    pub(super) fn error_at(&self, location: Location, message: impl Into<String>) -> ParseError {
        ParseError::new(location, message)
    }

    /// "expected X but was Y" at the current position.
    pub(super) fn unexpected(&mut self, expected: &str) -> ParseError {
        let location = self.location();
        let message = match self.peek() {
            Some(token) => {
                let got = match token.kind {
                    TokenKind::Ident => format!("'{}'", token.text),
                    kind => kind.display_name().to_string(),
                };
                format!("expected {expected} but was {got}")
            }
            None => format!("unexpected end of file, expected {expected}"),
        };
        self.error_at(location, message)
    }

    // =========================================================================
    // Shared productions
    // =========================================================================

    /// A type reference as written: `int32`, `Inner.Deep`, `.pkg.Message`.
    pub(super) fn parse_type_name(&mut self) -> Result<String, ParseError> {
        let mut name = String::new();
        if self.eat(TokenKind::Dot) {
            name.push('.');
        }
        name.push_str(self.expect_ident()?.text);
        while self.eat(TokenKind::Dot) {
            name.push('.');
            name.push_str(self.expect_ident()?.text);
        }
        Ok(name)
    }

    /// A dotted identifier without a leading dot, as in package names.
    pub(super) fn parse_qualified_ident(&mut self) -> Result<String, ParseError> {
        let mut name = self.expect_ident()?.text.to_string();
        while self.eat(TokenKind::Dot) {
            name.push('.');
            name.push_str(self.expect_ident()?.text);
        }
        Ok(name)
    }

    /// A signed integer literal in decimal, hex, or octal form.
    pub(super) fn parse_int_literal(&mut self) -> Result<i64, ParseError> {
        let negative = if self.eat(TokenKind::Minus) {
            true
        } else {
            let _ = self.eat(TokenKind::Plus);
            false
        };
        let token = self.expect(TokenKind::IntLit)?;
        let location = self.file.at(token.line, token.column);
        let magnitude = parse_radix(token.text)
            .ok_or_else(|| self.error_at(location, format!("invalid integer '{}'", token.text)))?;
        Ok(if negative { -magnitude } else { magnitude })
    }

    /// An i32-ranged integer, as field tags and enum constants require.
    pub(super) fn parse_int32(&mut self) -> Result<i32, ParseError> {
        let location = self.location();
        let value = self.parse_int_literal()?;
        i32::try_from(value)
            .map_err(|_| self.error_at(location, format!("integer {value} out of range")))
    }

    /// A string literal, with adjacent literals concatenated.
    pub(super) fn parse_string(&mut self) -> Result<String, ParseError> {
        let mut value = self.parse_single_string()?;
        while self.at(TokenKind::StrLit) {
            value.push_str(&self.parse_single_string()?);
        }
        Ok(value)
    }

    fn parse_single_string(&mut self) -> Result<String, ParseError> {
        let token = self.expect(TokenKind::StrLit)?;
        let location = self.file.at(token.line, token.column);
        unescape(&token.text[1..token.text.len() - 1])
            .map_err(|message| self.error_at(location, message))
    }

    /// Append a comment trailing the declaration that just ended, if one sits
    /// on the same line.
    pub(super) fn take_trailing_doc(&mut self, doc: &mut String) {
        let mut lookahead = self.pos;
        while let Some(token) = self.tokens.get(lookahead) {
            match token.kind {
                TokenKind::Whitespace if !token.text.contains('\n') => lookahead += 1,
                TokenKind::LineComment | TokenKind::BlockComment => {
                    push_doc_line(doc, &comment_text(token.text));
                    self.pos = lookahead + 1;
                    return;
                }
                _ => return,
            }
        }
    }
}

/// Strip comment markers and per-line decoration.
fn comment_text(raw: &str) -> String {
    if let Some(body) = raw.strip_prefix("//") {
        return body.trim().to_string();
    }
    let body = raw
        .strip_prefix("/*")
        .and_then(|s| s.strip_suffix("*/"))
        .unwrap_or(raw);
    body.lines()
        .map(|line| line.trim().trim_start_matches('*').trim())
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn push_doc_line(doc: &mut String, line: &str) {
    if line.is_empty() {
        return;
    }
    if !doc.is_empty() {
        doc.push('\n');
    }
    doc.push_str(line);
}

fn parse_radix(text: &str) -> Option<i64> {
    if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        i64::from_str_radix(hex, 16).ok()
    } else if text.len() > 1 && text.starts_with('0') {
        i64::from_str_radix(&text[1..], 8).ok()
    } else {
        text.parse().ok()
    }
}

/// Process escape sequences in a string literal body.
fn unescape(body: &str) -> Result<String, String> {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('a') => out.push('\x07'),
            Some('b') => out.push('\x08'),
            Some('f') => out.push('\x0c'),
            Some('v') => out.push('\x0b'),
            Some('\\') => out.push('\\'),
            Some('\'') => out.push('\''),
            Some('"') => out.push('"'),
            Some('?') => out.push('?'),
            Some('x') => {
                let hex: String = chars.clone().take_while(|c| c.is_ascii_hexdigit()).take(2).collect();
                if hex.is_empty() {
                    return Err("invalid hex escape".to_string());
                }
                for _ in 0..hex.len() {
                    chars.next();
                }
                let code = u32::from_str_radix(&hex, 16).map_err(|_| "invalid hex escape".to_string())?;
                out.push(char::from_u32(code).ok_or("invalid hex escape")?);
            }
            Some(digit @ '0'..='7') => {
                let mut octal = digit.to_string();
                while octal.len() < 3 {
                    match chars.clone().next() {
                        Some(c @ '0'..='7') => {
                            octal.push(c);
                            chars.next();
                        }
                        _ => break,
                    }
                }
                let code = u32::from_str_radix(&octal, 8).map_err(|_| "invalid octal escape".to_string())?;
                out.push(char::from_u32(code).ok_or("invalid octal escape")?);
            }
            Some(other) => return Err(format!("unsupported escape '\\{other}'")),
            None => return Err("dangling escape at end of string".to_string()),
        }
    }
    Ok(out)
}
