//! Enum grammar.

use crate::parser::ParseError;
use crate::parser::ast::{EnumConstantNode, EnumNode};
use crate::parser::lexer::TokenKind;

use super::{Parser, message, options};

pub(super) fn parse_enum(p: &mut Parser, doc: String) -> Result<EnumNode, ParseError> {
    let location = p.location();
    p.expect_keyword("enum")?;
    let name = p.expect_ident()?.text.to_string();
    let mut node = EnumNode {
        name,
        location,
        doc,
        constants: Vec::new(),
        reserved: Vec::new(),
        options: Vec::new(),
    };
    p.expect(TokenKind::LBrace)?;

    while !p.at(TokenKind::RBrace) {
        if p.at_eof() {
            return Err(p.unexpected("'}'"));
        }
        let member_doc = p.take_doc();
        let member_location = p.location();

        if p.eat(TokenKind::Semicolon) {
            continue;
        }
        if p.at_keyword("option") {
            node.options.push(options::parse_option_statement(p)?);
        } else if p.at_keyword("reserved") {
            node.reserved.push(message::parse_reserved(p, member_location)?);
        } else {
            let name = p.expect_ident()?.text.to_string();
            p.expect(TokenKind::Equals)?;
            let tag = p.parse_int32()?;
            let constant_options = if p.at(TokenKind::LBracket) {
                options::parse_bracket_options(p)?
            } else {
                Vec::new()
            };
            p.expect(TokenKind::Semicolon)?;
            let mut constant = EnumConstantNode {
                name,
                tag,
                options: constant_options,
                doc: member_doc,
                location: member_location,
            };
            p.take_trailing_doc(&mut constant.doc);
            node.constants.push(constant);
        }
    }
    p.expect(TokenKind::RBrace)?;

    Ok(node)
}
