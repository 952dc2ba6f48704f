//! Service grammar.

use crate::parser::ParseError;
use crate::parser::ast::{RpcNode, ServiceNode};
use crate::parser::lexer::TokenKind;

use super::{Parser, options};

pub(super) fn parse_service(p: &mut Parser, doc: String) -> Result<ServiceNode, ParseError> {
    let location = p.location();
    p.expect_keyword("service")?;
    let name = p.expect_ident()?.text.to_string();
    let mut service = ServiceNode {
        name,
        location,
        doc,
        rpcs: Vec::new(),
        options: Vec::new(),
    };
    p.expect(TokenKind::LBrace)?;

    while !p.at(TokenKind::RBrace) {
        if p.at_eof() {
            return Err(p.unexpected("'}'"));
        }
        let member_doc = p.take_doc();
        if p.eat(TokenKind::Semicolon) {
            continue;
        }
        if p.at_keyword("option") {
            service.options.push(options::parse_option_statement(p)?);
        } else if p.at_keyword("rpc") {
            service.rpcs.push(parse_rpc(p, member_doc)?);
        } else {
            return Err(p.unexpected("'rpc', 'option', or '}'"));
        }
    }
    p.expect(TokenKind::RBrace)?;

    Ok(service)
}

fn parse_rpc(p: &mut Parser, doc: String) -> Result<RpcNode, ParseError> {
    let location = p.location();
    p.expect_keyword("rpc")?;
    let name = p.expect_ident()?.text.to_string();

    p.expect(TokenKind::LParen)?;
    let request_streaming = eat_stream(p);
    let request_type = p.parse_type_name()?;
    p.expect(TokenKind::RParen)?;

    p.expect_keyword("returns")?;

    p.expect(TokenKind::LParen)?;
    let response_streaming = eat_stream(p);
    let response_type = p.parse_type_name()?;
    p.expect(TokenKind::RParen)?;

    let mut rpc = RpcNode {
        name,
        request_type,
        request_streaming,
        response_type,
        response_streaming,
        options: Vec::new(),
        doc,
        location,
    };

    if p.eat(TokenKind::LBrace) {
        while !p.at(TokenKind::RBrace) {
            if p.at_eof() {
                return Err(p.unexpected("'}'"));
            }
            if p.eat(TokenKind::Semicolon) {
                continue;
            }
            if p.at_keyword("option") {
                rpc.options.push(options::parse_option_statement(p)?);
            } else {
                return Err(p.unexpected("'option' or '}'"));
            }
        }
        p.expect(TokenKind::RBrace)?;
    } else {
        p.expect(TokenKind::Semicolon)?;
        p.take_trailing_doc(&mut rpc.doc);
    }

    Ok(rpc)
}

/// `stream` only acts as a keyword when it precedes the type name.
fn eat_stream(p: &mut Parser) -> bool {
    if p.at_keyword("stream") {
        // `stream` could itself be the request type: `rpc F (stream) ...`.
        let checkpoint = p.checkpoint();
        let _ = p.expect_keyword("stream");
        if p.at(TokenKind::RParen) {
            p.rewind(checkpoint);
            return false;
        }
        return true;
    }
    false
}
