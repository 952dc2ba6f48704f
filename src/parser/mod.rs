//! # Proto parsing
//!
//! Hand-written recursive descent over a token buffer with one token of
//! lookahead, fed by a logos lexer. Consumes one `.proto` text and produces
//! a syntactically complete [`ast::FileNode`].
//!
//! Output contract: every declaration carries the [`crate::core::Location`]
//! at which it began, comments preceding a declaration attach to it as
//! documentation, and unknown options are retained uninterpreted.

pub mod ast;
pub mod lexer;

mod error;
mod grammar;

pub use error::ParseError;

use crate::core::Location;

/// Parse one `.proto` source text.
///
/// `location` identifies the file; positions inside it are derived from the
/// token stream.
pub fn parse_proto(location: &Location, text: &str) -> Result<ast::FileNode, ParseError> {
    let mut parser = grammar::Parser::new(location.clone(), text);
    grammar::file::parse_file(&mut parser)
}
