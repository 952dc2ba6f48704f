//! File-level grammar: syntax declaration, package, imports, and the
//! dispatch over top-level declarations.

use crate::parser::ParseError;
use crate::parser::ast::{FileNode, ImportKind, ImportNode, Syntax};
use crate::parser::lexer::TokenKind;

use super::{Parser, enums, message, options, service};

pub(crate) fn parse_file(p: &mut Parser) -> Result<FileNode, ParseError> {
    let mut file = FileNode::empty(p.file_location().clone());

    // The syntax declaration, when present, precedes every other
    // declaration.
    if p.at_keyword("syntax") {
        file.syntax = parse_syntax(p)?;
    }

    while !p.at_eof() {
        let doc = p.take_doc();
        let location = p.location();

        if p.eat(TokenKind::Semicolon) {
            continue;
        }
        if p.at_keyword("syntax") {
            return Err(p.error_at(location, "syntax must be declared before any declaration"));
        }
        if p.at_keyword("package") {
            if file.package.is_some() {
                return Err(p.error_at(location, "too many package declarations"));
            }
            p.expect_keyword("package")?;
            file.package = Some(p.parse_qualified_ident()?);
            p.expect(TokenKind::Semicolon)?;
        } else if p.at_keyword("import") {
            file.imports.push(parse_import(p, location)?);
        } else if p.at_keyword("option") {
            file.options.push(options::parse_option_statement(p)?);
        } else if p.at_keyword("message") {
            file.types.push(message::parse_message(p, doc)?.into());
        } else if p.at_keyword("enum") {
            file.types.push(enums::parse_enum(p, doc)?.into());
        } else if p.at_keyword("service") {
            file.services.push(service::parse_service(p, doc)?);
        } else if p.at_keyword("extend") {
            file.extends.push(message::parse_extend(p, doc)?);
        } else {
            return Err(p.unexpected("a top-level declaration"));
        }
    }

    Ok(file)
}

fn parse_syntax(p: &mut Parser) -> Result<Syntax, ParseError> {
    p.expect_keyword("syntax")?;
    p.expect(TokenKind::Equals)?;
    let location = p.location();
    let version = p.parse_string()?;
    p.expect(TokenKind::Semicolon)?;
    match version.as_str() {
        "proto2" => Ok(Syntax::Proto2),
        "proto3" => Ok(Syntax::Proto3),
        other => Err(p.error_at(location, format!("unexpected syntax version '{other}'"))),
    }
}

fn parse_import(p: &mut Parser, location: crate::core::Location) -> Result<ImportNode, ParseError> {
    p.expect_keyword("import")?;
    let kind = if p.at_keyword("public") {
        p.expect_keyword("public")?;
        ImportKind::Public
    } else if p.at_keyword("weak") {
        p.expect_keyword("weak")?;
        ImportKind::Weak
    } else {
        ImportKind::Plain
    };
    let path = p.parse_string()?;
    p.expect(TokenKind::Semicolon)?;
    Ok(ImportNode {
        path,
        kind,
        location,
    })
}
