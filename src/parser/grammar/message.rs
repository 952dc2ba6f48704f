//! Message grammar: message bodies, fields, oneofs, extends, reserved and
//! extensions declarations.

use crate::core::Location;
use crate::parser::ParseError;
use crate::parser::ast::{
    ExtendNode, FieldNode, FieldType, Label, MAX_TAG, MessageNode, OneOfNode, ReservedNode,
    TagRangeNode,
};
use crate::parser::lexer::TokenKind;

use super::{Parser, enums, options};

pub(super) fn parse_message(p: &mut Parser, doc: String) -> Result<MessageNode, ParseError> {
    let location = p.location();
    p.expect_keyword("message")?;
    let name = p.expect_ident()?.text.to_string();
    let mut message = MessageNode {
        name,
        location,
        doc,
        fields: Vec::new(),
        oneofs: Vec::new(),
        nested: Vec::new(),
        extends: Vec::new(),
        reserved: Vec::new(),
        extension_ranges: Vec::new(),
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
        if p.at_keyword("reserved") {
            message.reserved.push(parse_reserved(p, member_location)?);
        } else if p.at_keyword("extensions") {
            parse_extensions(p, &mut message.extension_ranges)?;
        } else if p.at_keyword("option") {
            message.options.push(options::parse_option_statement(p)?);
        } else if p.at_keyword("oneof") {
            message.oneofs.push(parse_oneof(p, member_doc, member_location)?);
        } else if p.at_keyword("message") {
            message.nested.push(parse_message(p, member_doc)?.into());
        } else if p.at_keyword("enum") {
            message.nested.push(enums::parse_enum(p, member_doc)?.into());
        } else if p.at_keyword("extend") {
            message.extends.push(parse_extend(p, member_doc)?);
        } else if p.at_keyword("group") {
            return Err(p.error_at(member_location, "groups are not supported"));
        } else {
            message.fields.push(parse_field(p, member_doc, member_location)?);
        }
    }
    p.expect(TokenKind::RBrace)?;

    Ok(message)
}

pub(super) fn parse_extend(p: &mut Parser, doc: String) -> Result<ExtendNode, ParseError> {
    let location = p.location();
    p.expect_keyword("extend")?;
    let name = p.parse_type_name()?;
    let mut fields = Vec::new();
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
        fields.push(parse_field(p, member_doc, member_location)?);
    }
    p.expect(TokenKind::RBrace)?;
    Ok(ExtendNode {
        name,
        location,
        doc,
        fields,
    })
}

/// A field, with or without a label. The caller has already ruled out every
/// other member kind.
pub(super) fn parse_field(
    p: &mut Parser,
    doc: String,
    location: Location,
) -> Result<FieldNode, ParseError> {
    let label = if p.at_keyword("optional") {
        p.expect_keyword("optional")?;
        Some(Label::Optional)
    } else if p.at_keyword("required") {
        p.expect_keyword("required")?;
        Some(Label::Required)
    } else if p.at_keyword("repeated") {
        p.expect_keyword("repeated")?;
        Some(Label::Repeated)
    } else {
        None
    };

    if p.at_keyword("group") {
        let loc = p.location();
        return Err(p.error_at(loc, "groups are not supported"));
    }

    let field_type = if p.at_keyword("map") {
        parse_map_type(p)?
    } else {
        FieldType::Named(p.parse_type_name()?)
    };

    let name = p.expect_ident()?.text.to_string();
    p.expect(TokenKind::Equals)?;
    let tag = p.parse_int32()?;
    let field_options = if p.at(TokenKind::LBracket) {
        options::parse_bracket_options(p)?
    } else {
        Vec::new()
    };
    p.expect(TokenKind::Semicolon)?;

    let mut field = FieldNode {
        label,
        field_type,
        name,
        tag,
        options: field_options,
        doc,
        location,
    };
    p.take_trailing_doc(&mut field.doc);
    Ok(field)
}

fn parse_map_type(p: &mut Parser) -> Result<FieldType, ParseError> {
    p.expect_keyword("map")?;
    p.expect(TokenKind::LAngle)?;
    let key = p.parse_type_name()?;
    p.expect(TokenKind::Comma)?;
    let value = p.parse_type_name()?;
    p.expect(TokenKind::RAngle)?;
    Ok(FieldType::Map { key, value })
}

fn parse_oneof(
    p: &mut Parser,
    doc: String,
    location: Location,
) -> Result<OneOfNode, ParseError> {
    p.expect_keyword("oneof")?;
    let name = p.expect_ident()?.text.to_string();
    let mut oneof = OneOfNode {
        name,
        fields: Vec::new(),
        options: Vec::new(),
        doc,
        location,
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
            oneof.options.push(options::parse_option_statement(p)?);
        } else if p.at_keyword("group") {
            return Err(p.error_at(member_location, "groups are not supported"));
        } else {
            // Oneof members carry no label; a label here is a grammar error.
            for label in ["optional", "required", "repeated"] {
                if p.at_keyword(label) {
                    return Err(p.error_at(
                        member_location,
                        format!("oneof members must not be '{label}'"),
                    ));
                }
            }
            oneof.fields.push(parse_field(p, member_doc, member_location)?);
        }
    }
    p.expect(TokenKind::RBrace)?;
    Ok(oneof)
}

/// `reserved 1, 4 to 6, 100 to max;` or `reserved "foo", "bar";`
pub(super) fn parse_reserved(
    p: &mut Parser,
    location: Location,
) -> Result<ReservedNode, ParseError> {
    p.expect_keyword("reserved")?;
    let mut node = ReservedNode {
        ranges: Vec::new(),
        names: Vec::new(),
        location,
    };
    loop {
        if p.at(TokenKind::StrLit) {
            node.names.push(p.parse_string()?);
        } else {
            node.ranges.push(parse_tag_range(p)?);
        }
        if !p.eat(TokenKind::Comma) {
            break;
        }
    }
    p.expect(TokenKind::Semicolon)?;
    Ok(node)
}

fn parse_extensions(p: &mut Parser, ranges: &mut Vec<TagRangeNode>) -> Result<(), ParseError> {
    p.expect_keyword("extensions")?;
    loop {
        ranges.push(parse_tag_range(p)?);
        if !p.eat(TokenKind::Comma) {
            break;
        }
    }
    p.expect(TokenKind::Semicolon)?;
    Ok(())
}

fn parse_tag_range(p: &mut Parser) -> Result<TagRangeNode, ParseError> {
    let start = p.parse_int32()?;
    if !p.at_keyword("to") {
        return Ok(TagRangeNode::single(start));
    }
    p.expect_keyword("to")?;
    let end = if p.at_keyword("max") {
        p.expect_keyword("max")?;
        MAX_TAG
    } else {
        p.parse_int32()?
    };
    Ok(TagRangeNode { start, end })
}
