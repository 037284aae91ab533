//! Built-in leaf parsers.
//!
//! Every builder has the [`ParserBuilder`](crate::registry::ParserBuilder)
//! shape: it receives the end token computed by the compiler and the field's
//! arguments, validates them once, and returns the parser used for every line.

mod date;
mod net;
mod number;
mod text;

use crate::error::LogparError;
use crate::parsec::{Failure, Parser, Success};
use crate::registry::{ParserRegistry, ParserType};

pub use date::build_date;
pub use net::{build_ip, build_uri};
pub use number::{build_bool, build_byte, build_double, build_float, build_long, build_scaled_float};
pub use text::{build_alphanumeric, build_literal, build_quoted, build_text, build_user_agent};

/// Registers every built-in builder.
pub fn register_all(registry: &mut ParserRegistry) -> Result<(), LogparError> {
    registry.register(ParserType::Literal, build_literal)?;
    registry.register(ParserType::Text, build_text)?;
    registry.register(ParserType::Alphanumeric, build_alphanumeric)?;
    registry.register(ParserType::Quoted, build_quoted)?;
    registry.register(ParserType::UserAgent, build_user_agent)?;
    registry.register(ParserType::Long, build_long)?;
    registry.register(ParserType::Byte, build_byte)?;
    registry.register(ParserType::Float, build_float)?;
    registry.register(ParserType::Double, build_double)?;
    registry.register(ParserType::ScaledFloat, build_scaled_float)?;
    registry.register(ParserType::Bool, build_bool)?;
    registry.register(ParserType::Ip, build_ip)?;
    registry.register(ParserType::Uri, build_uri)?;
    registry.register(ParserType::Date, build_date)?;
    Ok(())
}

/// How far a delimited value extends.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Delimiter {
    /// Up to the first occurrence of the token.
    Token(String),
    /// Up to the end of input.
    End,
    /// Up to the first whitespace character or the end of input.
    Whitespace,
}

impl Delimiter {
    fn from_end_token(end_token: Option<&str>) -> Self {
        match end_token {
            Some("") => Delimiter::End,
            Some(token) => Delimiter::Token(token.to_string()),
            None => Delimiter::Whitespace,
        }
    }

    /// Length of the value starting at the beginning of `rest`.
    fn span(&self, rest: &str) -> Option<usize> {
        match self {
            Delimiter::Token(token) => rest.find(token.as_str()),
            Delimiter::End => Some(rest.len()),
            Delimiter::Whitespace => Some(rest.find(char::is_whitespace).unwrap_or(rest.len())),
        }
    }
}

/// A non-empty run of text ending where `delimiter` says.
fn take_delimited(parser_type: ParserType, delimiter: Delimiter) -> Parser<String> {
    Parser::new(move |text, index| {
        let Some(rest) = text.get(index..) else {
            return Err(Failure::new(format!("{parser_type}: found EOF"), index));
        };
        match delimiter.span(rest) {
            Some(0) => Err(Failure::new(format!("{parser_type}: empty value"), index)),
            Some(len) => Ok(Success::new(rest[..len].to_string(), index + len)),
            None => Err(Failure::new(
                format!("{parser_type}: end token not found"),
                index,
            )),
        }
    })
}

fn invalid_args(parser: ParserType, reason: impl Into<String>) -> LogparError {
    LogparError::InvalidArguments {
        parser,
        reason: reason.into(),
    }
}

fn no_args(parser: ParserType, args: &[String]) -> Result<(), LogparError> {
    if args.is_empty() {
        Ok(())
    } else {
        Err(invalid_args(
            parser,
            format!("expected no arguments, got {}", args.len()),
        ))
    }
}
