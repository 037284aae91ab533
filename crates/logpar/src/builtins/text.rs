use serde_json::{Value, json};

use super::{Delimiter, invalid_args, no_args, take_delimited};
use crate::error::LogparError;
use crate::parsec::{Failure, Parser, Success, char_alnum, many1, tag};
use crate::registry::ParserType;

/// Exact text given as the first argument. Produces no value.
pub fn build_literal(_: Option<&str>, args: &[String]) -> Result<Parser<Value>, LogparError> {
    match args {
        [literal] if !literal.is_empty() => Ok(tag(literal).replace(Value::Null)),
        _ => Err(invalid_args(
            ParserType::Literal,
            "expected exactly one non-empty argument",
        )),
    }
}

/// Any text up to the end token.
pub fn build_text(end_token: Option<&str>, args: &[String]) -> Result<Parser<Value>, LogparError> {
    no_args(ParserType::Text, args)?;
    if end_token.is_none() {
        return Err(invalid_args(
            ParserType::Text,
            "a text field must be followed by a literal or end the pattern",
        ));
    }
    Ok(take_delimited(ParserType::Text, Delimiter::from_end_token(end_token)).map(Value::String))
}

pub fn build_alphanumeric(
    _: Option<&str>,
    args: &[String],
) -> Result<Parser<Value>, LogparError> {
    no_args(ParserType::Alphanumeric, args)?;
    Ok(many1(char_alnum(""))
        .map(|chars| Value::String(chars.into_iter().collect())))
}

/// User agent string up to the end token, as `{"original": ...}`.
pub fn build_user_agent(
    end_token: Option<&str>,
    args: &[String],
) -> Result<Parser<Value>, LogparError> {
    no_args(ParserType::UserAgent, args)?;
    if end_token.is_none() {
        return Err(invalid_args(
            ParserType::UserAgent,
            "a user agent field must be followed by a literal or end the pattern",
        ));
    }
    Ok(
        take_delimited(ParserType::UserAgent, Delimiter::from_end_token(end_token))
            .map(|original| json!({ "original": original })),
    )
}

/// Quoted string. Arguments: quote character (default `"`), escape character
/// (default `\`).
pub fn build_quoted(_: Option<&str>, args: &[String]) -> Result<Parser<Value>, LogparError> {
    let single_char = |arg: &String, what: &str| {
        let mut chars = arg.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(c),
            _ => Err(invalid_args(
                ParserType::Quoted,
                format!("{what} must be a single character, got '{arg}'"),
            )),
        }
    };

    let (quote, escape) = match args {
        [] => ('"', '\\'),
        [q] => (single_char(q, "quote")?, '\\'),
        [q, e] => (single_char(q, "quote")?, single_char(e, "escape")?),
        _ => {
            return Err(invalid_args(
                ParserType::Quoted,
                format!("expected at most 2 arguments, got {}", args.len()),
            ));
        }
    };
    if quote == escape {
        return Err(invalid_args(
            ParserType::Quoted,
            "quote and escape characters must differ",
        ));
    }

    Ok(Parser::new(move |text, index| {
        let Some(rest) = text.get(index..) else {
            return Err(Failure::new("quoted: found EOF", index));
        };
        let mut chars = rest.char_indices();
        match chars.next() {
            Some((_, c)) if c == quote => {}
            _ => {
                return Err(Failure::new(
                    format!("quoted: expected opening '{quote}'"),
                    index,
                ));
            }
        }

        let mut value = String::new();
        while let Some((offset, c)) = chars.next() {
            if c == escape {
                match chars.next() {
                    Some((_, escaped)) => value.push(escaped),
                    None => break,
                }
            } else if c == quote {
                let end = index + offset + c.len_utf8();
                return Ok(Success::new(Value::String(value), end));
            } else {
                value.push(c);
            }
        }
        Err(Failure::new(
            format!("quoted: missing closing '{quote}'"),
            text.len(),
        ))
    }))
}
