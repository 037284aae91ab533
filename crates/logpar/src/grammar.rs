//! Parsers for the pattern language itself.
//!
//! With the default [`Syntax`]:
//!
//! ```text
//! pattern  := (expr | group)* EOF
//! expr     := (choice | field | literal)+
//! choice   := field '?' field
//! field    := '<' '?'? name ('/' arg)* '>'
//! name     := '~'? [A-Za-z0-9] [A-Za-z0-9_@#.]*
//! literal  := (unreserved | '\' reserved)+
//! group    := '(' '?' (expr | group)+ ')'
//! ```

use crate::ast::{Choice, Field, FieldName, Group, Literal, ParserInfo};
use crate::parsec::{
    Failure, Parser, Success, char_alnum, char_in, eof, many, many1, opt, peek, raw_literal,
    raw_literal1,
};
use crate::syntax::Syntax;

/// Parses a whole pattern into its node list.
///
/// Group nesting is checked before the recursive descent starts so that an
/// over-deep pattern is reported as such.
pub fn parse(pattern: &str, syntax: &Syntax) -> Result<Vec<ParserInfo>, Failure> {
    check_group_depth(pattern, syntax)?;
    p_logpar(syntax)
        .run(pattern)
        .map(|s| s.value)
        .map_err(|e| explain_failure(pattern, syntax, e))
}

/// A field followed by a stray optional marker is most likely a choice with an
/// optional side; report that instead of the bare EOF failure.
fn explain_failure(pattern: &str, syntax: &Syntax, failure: Failure) -> Failure {
    if peek(pattern, failure.index) != Some(syntax.optional) {
        return failure;
    }
    let Some(start) = pattern
        .get(..failure.index)
        .and_then(|head| head.rfind(syntax.field_begin))
    else {
        return failure;
    };
    match p_choice(syntax).parse(pattern, start) {
        Err(choice) if choice.message.starts_with("Expected field, found optional field") => choice,
        _ => failure,
    }
}

fn check_group_depth(pattern: &str, syntax: &Syntax) -> Result<(), Failure> {
    let mut depth = 0usize;
    let mut escaped = false;
    let mut in_field = false;
    for (index, c) in pattern.char_indices() {
        if escaped {
            escaped = false;
        } else if c == syntax.escape {
            escaped = true;
        } else if in_field {
            in_field = c != syntax.field_end;
        } else if c == syntax.field_begin {
            in_field = true;
        } else if c == syntax.group_begin {
            depth += 1;
            if depth > syntax.max_group_depth {
                return Err(Failure::new(
                    format!(
                        "Group nesting exceeds the maximum depth of {}",
                        syntax.max_group_depth
                    ),
                    index,
                ));
            }
        } else if c == syntax.group_end {
            depth = depth.saturating_sub(1);
        }
    }
    Ok(())
}

fn glyph(c: char) -> Parser<char> {
    char_in(&c.to_string())
}

pub fn p_literal(syntax: &Syntax) -> Parser<Literal> {
    raw_literal1(&syntax.literal_reserved(), syntax.escape).map(|value| Literal { value })
}

pub fn p_args(syntax: &Syntax) -> Parser<Vec<String>> {
    let arg = glyph(syntax.arg_separator)
        .ignore_then(raw_literal(&syntax.arg_reserved(), syntax.escape));
    many(arg)
}

pub fn p_field_name(syntax: &Syntax) -> Parser<FieldName> {
    let sigil = syntax.custom_field;
    let p_custom = Parser::new(move |text, index| match peek(text, index) {
        Some(c) if c == sigil => Ok(Success::new(true, index + c.len_utf8())),
        Some(_) => Ok(Success::new(false, index)),
        None => Err(Failure::new(
            format!("Optional '{sigil}', found EOF"),
            index,
        )),
    });

    let p_name = char_alnum("")
        .then(many(char_alnum(&syntax.field_name_chars())))
        .map(|(first, rest)| std::iter::once(first).chain(rest).collect::<String>());

    p_custom.and_then(move |custom| {
        if custom {
            opt(p_name.clone()).map(move |name| FieldName {
                value: format!("{sigil}{}", name.unwrap_or_default()),
                custom: true,
            })
        } else {
            p_name
                .clone()
                .map(|value| FieldName { value, custom: false })
        }
    })
}

pub fn p_field(syntax: &Syntax) -> Parser<Field> {
    let body = opt(glyph(syntax.optional))
        .then(p_field_name(syntax))
        .then(p_args(syntax))
        .map(|((optional, name), args)| Field {
            name,
            args,
            optional: optional.is_some(),
        });

    glyph(syntax.field_begin)
        .ignore_then(body)
        .then_ignore(glyph(syntax.field_end))
}

/// Two fields joined by the optional marker. Neither side may be optional.
pub fn p_choice(syntax: &Syntax) -> Parser<Choice> {
    let pair = p_field(syntax)
        .then_ignore(glyph(syntax.optional))
        .then(p_field(syntax));

    Parser::new(move |text, index| {
        let res = pair
            .parse(text, index)
            .map_err(|e| Failure::new(e.message, index))?;
        let (left, right) = res.value;
        for field in [&left, &right] {
            if field.optional {
                return Err(Failure::new(
                    format!(
                        "Expected field, found optional field '{}'",
                        field.name.value
                    ),
                    index,
                ));
            }
        }
        Ok(Success::new(Choice { left, right }, res.index))
    })
}

pub fn p_expr(syntax: &Syntax) -> Parser<Vec<ParserInfo>> {
    let choice = p_choice(syntax).map(ParserInfo::Choice);
    let field = p_field(syntax).map(ParserInfo::Field);
    let literal = p_literal(syntax).map(ParserInfo::Literal);
    many1(choice.or(field).or(literal))
}

pub fn p_group(syntax: &Syntax) -> Parser<Group> {
    group_at_depth(syntax.clone(), 1)
}

fn group_at_depth(syntax: Syntax, depth: usize) -> Parser<Group> {
    Parser::new(move |text, index| {
        let start = glyph(syntax.group_begin)
            .then(glyph(syntax.optional))
            .parse(text, index)?;
        if depth > syntax.max_group_depth {
            return Err(Failure::new(
                format!(
                    "Group nesting exceeds the maximum depth of {}",
                    syntax.max_group_depth
                ),
                index,
            ));
        }

        // Built per call: the nested parser is only constructed when a group
        // is actually entered.
        let nested = group_at_depth(syntax.clone(), depth + 1).map(|g| vec![ParserInfo::Group(g)]);
        let body = many1(p_expr(&syntax).or(nested)).parse(text, start.index)?;
        let end = glyph(syntax.group_end).parse(text, body.index)?;

        let children = body.value.into_iter().flatten().collect();
        Ok(Success::new(Group { children }, end.index))
    })
}

pub fn p_logpar(syntax: &Syntax) -> Parser<Vec<ParserInfo>> {
    let group = p_group(syntax).map(|g| vec![ParserInfo::Group(g)]);
    many(p_expr(syntax).or(group))
        .map(|nodes| nodes.into_iter().flatten().collect::<Vec<_>>())
        .then_ignore(eof())
}
