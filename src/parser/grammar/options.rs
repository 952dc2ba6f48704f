//! Option grammar: `option` statements, bracket options, custom option
//! names, and aggregate values.
//!
//! Values are retained as written; interpretation happens at link time, and
//! only for options the linker can resolve.

use crate::parser::ParseError;
use crate::parser::ast::{OptionName, OptionNamePart, OptionNode, OptionValue};
use crate::parser::lexer::TokenKind;

use super::Parser;

/// `option <name> = <value>;`
pub(super) fn parse_option_statement(p: &mut Parser) -> Result<OptionNode, ParseError> {
    let location = p.location();
    p.expect_keyword("option")?;
    let name = parse_option_name(p)?;
    p.expect(TokenKind::Equals)?;
    let value = parse_option_value(p)?;
    p.expect(TokenKind::Semicolon)?;
    Ok(OptionNode {
        name,
        value,
        location,
    })
}

/// `[<name> = <value>, ...]` after a field or enum constant.
pub(super) fn parse_bracket_options(p: &mut Parser) -> Result<Vec<OptionNode>, ParseError> {
    p.expect(TokenKind::LBracket)?;
    let mut parsed = Vec::new();
    loop {
        let location = p.location();
        let name = parse_option_name(p)?;
        p.expect(TokenKind::Equals)?;
        let value = parse_option_value(p)?;
        parsed.push(OptionNode {
            name,
            value,
            location,
        });
        if !p.eat(TokenKind::Comma) {
            break;
        }
    }
    p.expect(TokenKind::RBracket)?;
    Ok(parsed)
}

/// `packed`, `(my.custom)`, `(my.custom).field.sub`, ...
fn parse_option_name(p: &mut Parser) -> Result<OptionName, ParseError> {
    let mut parts = vec![parse_option_name_part(p)?];
    while p.eat(TokenKind::Dot) {
        parts.push(parse_option_name_part(p)?);
    }
    Ok(OptionName { parts })
}

fn parse_option_name_part(p: &mut Parser) -> Result<OptionNamePart, ParseError> {
    if p.eat(TokenKind::LParen) {
        let mut name = String::new();
        if p.eat(TokenKind::Dot) {
            name.push('.');
        }
        name.push_str(&p.parse_qualified_ident()?);
        p.expect(TokenKind::RParen)?;
        Ok(OptionNamePart::Extension(name))
    } else {
        Ok(OptionNamePart::Plain(p.expect_ident()?.text.to_string()))
    }
}

fn parse_option_value(p: &mut Parser) -> Result<OptionValue, ParseError> {
    if p.at(TokenKind::StrLit) {
        return Ok(OptionValue::Str(p.parse_string()?));
    }
    if p.at(TokenKind::LBrace) {
        return parse_aggregate(p);
    }
    if p.at(TokenKind::LBracket) {
        return parse_list(p);
    }
    if p.at(TokenKind::Ident) {
        let token = p.expect_ident()?;
        return Ok(OptionValue::Ident(token.text.to_string()));
    }
    parse_number(p)
}

fn parse_number(p: &mut Parser) -> Result<OptionValue, ParseError> {
    let checkpoint = p.checkpoint();
    let negative = if p.eat(TokenKind::Minus) {
        true
    } else {
        let _ = p.eat(TokenKind::Plus);
        false
    };
    if p.at(TokenKind::FloatLit) {
        let location = p.location();
        let token = p.expect(TokenKind::FloatLit)?;
        let value: f64 = token
            .text
            .parse()
            .map_err(|_| p.error_at(location, format!("invalid number '{}'", token.text)))?;
        return Ok(OptionValue::Float(if negative { -value } else { value }));
    }
    if p.at(TokenKind::IntLit) {
        p.rewind(checkpoint);
        return Ok(OptionValue::Int(p.parse_int_literal()?));
    }
    // `-inf` and friends arrive as a sign followed by an identifier.
    if negative && p.at(TokenKind::Ident) {
        let token = p.expect_ident()?;
        return Ok(OptionValue::Ident(format!("-{}", token.text)));
    }
    Err(p.unexpected("an option value"))
}

/// `{ key: value key2: value2 }` — separators between entries are optional,
/// and a nested aggregate may omit the colon.
fn parse_aggregate(p: &mut Parser) -> Result<OptionValue, ParseError> {
    p.expect(TokenKind::LBrace)?;
    let mut entries = Vec::new();
    while !p.at(TokenKind::RBrace) {
        if p.at_eof() {
            return Err(p.unexpected("'}'"));
        }
        let key = if p.eat(TokenKind::LBracket) {
            // Extension field key: `[my.custom.field]: value`
            let mut name = String::new();
            if p.eat(TokenKind::Dot) {
                name.push('.');
            }
            name.push_str(&p.parse_qualified_ident()?);
            p.expect(TokenKind::RBracket)?;
            name
        } else {
            p.expect_ident()?.text.to_string()
        };
        let value = if p.eat(TokenKind::Colon) {
            parse_option_value(p)?
        } else if p.at(TokenKind::LBrace) {
            parse_aggregate(p)?
        } else {
            return Err(p.unexpected("':' or '{'"));
        };
        entries.push((key, value));
        // Entry separators are optional.
        let _ = p.eat(TokenKind::Comma) || p.eat(TokenKind::Semicolon);
    }
    p.expect(TokenKind::RBrace)?;
    Ok(OptionValue::Aggregate(entries))
}

fn parse_list(p: &mut Parser) -> Result<OptionValue, ParseError> {
    p.expect(TokenKind::LBracket)?;
    let mut values = Vec::new();
    if !p.at(TokenKind::RBracket) {
        loop {
            values.push(parse_option_value(p)?);
            if !p.eat(TokenKind::Comma) {
                break;
            }
        }
    }
    p.expect(TokenKind::RBracket)?;
    Ok(OptionValue::List(values))
}
