//! Logos-based lexer for the proto language.
//!
//! Trivia (whitespace and comments) is kept rather than skipped: comments
//! preceding a declaration become its documentation, so the parser needs to
//! see them.

use logos::Logos;

/// A token with its kind, text, and 1-indexed position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
    pub line: i32,
    pub column: i32,
}

/// Lexer wrapping the logos-generated tokenizer, tracking line/column.
pub struct Lexer<'a> {
    inner: logos::Lexer<'a, TokenKind>,
    line: i32,
    column: i32,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            inner: TokenKind::lexer(input),
            line: 1,
            column: 1,
        }
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let kind = match self.inner.next()? {
            Ok(kind) => kind,
            Err(()) => TokenKind::Error,
        };
        let text = self.inner.slice();
        let token = Token {
            kind,
            text,
            line: self.line,
            column: self.column,
        };

        // Advance the position past the consumed text.
        for ch in text.chars() {
            if ch == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }

        Some(token)
    }
}

/// Tokenize an entire string into a Vec.
pub fn tokenize(input: &str) -> Vec<Token<'_>> {
    Lexer::new(input).collect()
}

/// Token kinds.
///
/// Proto keywords are contextual (`message` is a legal field name), so the
/// lexer produces plain identifiers and the grammar matches on their text.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    // =========================================================================
    // TRIVIA
    // =========================================================================
    #[regex(r"[ \t\r\n]+")]
    Whitespace,

    #[regex(r"//[^\n]*")]
    LineComment,

    #[regex(r"/\*([^*]|\*[^/])*\*/")]
    BlockComment,

    // =========================================================================
    // LITERALS
    // =========================================================================
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*")]
    Ident,

    // Decimal, hex (0x), and octal (leading 0) integers.
    #[regex(r"0[xX][0-9a-fA-F]+|[0-9]+")]
    IntLit,

    #[regex(r"[0-9]+\.[0-9]*([eE][+-]?[0-9]+)?|\.[0-9]+([eE][+-]?[0-9]+)?|[0-9]+[eE][+-]?[0-9]+")]
    FloatLit,

    #[regex(r#""([^"\\\n]|\\.)*"|'([^'\\\n]|\\.)*'"#)]
    StrLit,

    // =========================================================================
    // PUNCTUATION
    // =========================================================================
    #[token(";")]
    Semicolon,

    #[token(":")]
    Colon,

    #[token(",")]
    Comma,

    #[token(".")]
    Dot,

    #[token("=")]
    Equals,

    #[token("{")]
    LBrace,

    #[token("}")]
    RBrace,

    #[token("(")]
    LParen,

    #[token(")")]
    RParen,

    #[token("[")]
    LBracket,

    #[token("]")]
    RBracket,

    #[token("<")]
    LAngle,

    #[token(">")]
    RAngle,

    #[token("-")]
    Minus,

    #[token("+")]
    Plus,

    #[token("/")]
    Slash,

    // Catch-all for characters no other pattern accepts; lowest priority so
    // it never shadows a real token.
    #[regex(r".", priority = 0)]
    Error,
}

impl TokenKind {
    /// True for whitespace and comments.
    pub fn is_trivia(self) -> bool {
        matches!(
            self,
            TokenKind::Whitespace | TokenKind::LineComment | TokenKind::BlockComment
        )
    }

    /// Human-readable name for error messages.
    pub fn display_name(self) -> &'static str {
        match self {
            TokenKind::Whitespace => "whitespace",
            TokenKind::LineComment | TokenKind::BlockComment => "comment",
            TokenKind::Ident => "identifier",
            TokenKind::IntLit => "integer",
            TokenKind::FloatLit => "number",
            TokenKind::StrLit => "string",
            TokenKind::Semicolon => "';'",
            TokenKind::Colon => "':'",
            TokenKind::Comma => "','",
            TokenKind::Dot => "'.'",
            TokenKind::Equals => "'='",
            TokenKind::LBrace => "'{'",
            TokenKind::RBrace => "'}'",
            TokenKind::LParen => "'('",
            TokenKind::RParen => "')'",
            TokenKind::LBracket => "'['",
            TokenKind::RBracket => "']'",
            TokenKind::LAngle => "'<'",
            TokenKind::RAngle => "'>'",
            TokenKind::Minus => "'-'",
            TokenKind::Plus => "'+'",
            TokenKind::Slash => "'/'",
            TokenKind::Error => "invalid token",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        tokenize(input)
            .into_iter()
            .filter(|t| !t.kind.is_trivia())
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn test_field_declaration() {
        assert_eq!(
            kinds("int32 page_number = 2;"),
            vec![
                TokenKind::Ident,
                TokenKind::Ident,
                TokenKind::Equals,
                TokenKind::IntLit,
                TokenKind::Semicolon,
            ]
        );
    }

    #[test]
    fn test_integer_forms() {
        assert_eq!(kinds("12 0x1F 017"), vec![TokenKind::IntLit; 3]);
    }

    #[test]
    fn test_float_forms() {
        assert_eq!(kinds("1.5 .5 2e8 3.0e-2"), vec![TokenKind::FloatLit; 4]);
    }

    #[test]
    fn test_string_quote_styles() {
        assert_eq!(kinds(r#""hello" 'world'"#), vec![TokenKind::StrLit; 2]);
    }

    #[test]
    fn test_positions_are_one_indexed() {
        let tokens = tokenize("a\n  b");
        assert_eq!((tokens[0].line, tokens[0].column), (1, 1));
        let b = tokens.last().unwrap();
        assert_eq!((b.line, b.column), (2, 3));
    }

    #[test]
    fn test_comments_kept() {
        let tokens = tokenize("// leading\nmessage");
        assert_eq!(tokens[0].kind, TokenKind::LineComment);
        assert_eq!(tokens[0].text, "// leading");
    }
}
