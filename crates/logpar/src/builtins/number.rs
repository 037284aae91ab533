use serde_json::{Number, Value};

use super::no_args;
use crate::error::LogparError;
use crate::parsec::{Failure, Parser, Success};
use crate::registry::ParserType;

/// Length of an optional sign followed by ASCII digits at the start of `s`.
fn scan_integer(s: &str) -> usize {
    let bytes = s.as_bytes();
    let sign = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    let digits = bytes[sign..].iter().take_while(|b| b.is_ascii_digit()).count();
    if digits == 0 { 0 } else { sign + digits }
}

/// Length of a decimal number with optional fraction and exponent.
fn scan_decimal(s: &str) -> usize {
    let bytes = s.as_bytes();
    let mut i = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));

    let int_digits = bytes[i..].iter().take_while(|b| b.is_ascii_digit()).count();
    i += int_digits;

    // A dot belongs to the number only when fraction digits follow it.
    let mut frac_digits = 0;
    if bytes.get(i) == Some(&b'.') {
        frac_digits = bytes[i + 1..].iter().take_while(|b| b.is_ascii_digit()).count();
        if frac_digits > 0 {
            i += 1 + frac_digits;
        }
    }
    if int_digits == 0 && frac_digits == 0 {
        return 0;
    }

    if matches!(bytes.get(i), Some(b'e' | b'E')) {
        let exp = scan_integer(&s[i + 1..]);
        if exp > 0 {
            i += 1 + exp;
        }
    }
    i
}

fn integer_parser(parser_type: ParserType, min: i64, max: i64) -> Parser<Value> {
    Parser::new(move |text, index| {
        let rest = text.get(index..).unwrap_or_default();
        let len = scan_integer(rest);
        if len == 0 {
            return Err(Failure::new(
                format!("{parser_type}: expected an integer"),
                index,
            ));
        }
        match rest[..len].parse::<i64>() {
            Ok(n) if (min..=max).contains(&n) => Ok(Success::new(Value::from(n), index + len)),
            _ => Err(Failure::new(
                format!("{parser_type}: '{}' is out of range", &rest[..len]),
                index,
            )),
        }
    })
}

fn decimal_parser(parser_type: ParserType) -> Parser<Value> {
    Parser::new(move |text, index| {
        let rest = text.get(index..).unwrap_or_default();
        let len = scan_decimal(rest);
        if len == 0 {
            return Err(Failure::new(
                format!("{parser_type}: expected a number"),
                index,
            ));
        }
        let number = rest[..len]
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .ok_or_else(|| {
                Failure::new(
                    format!("{parser_type}: '{}' is not a finite number", &rest[..len]),
                    index,
                )
            })?;
        Ok(Success::new(Value::Number(number), index + len))
    })
}

pub fn build_long(_: Option<&str>, args: &[String]) -> Result<Parser<Value>, LogparError> {
    no_args(ParserType::Long, args)?;
    Ok(integer_parser(ParserType::Long, i64::MIN, i64::MAX))
}

pub fn build_byte(_: Option<&str>, args: &[String]) -> Result<Parser<Value>, LogparError> {
    no_args(ParserType::Byte, args)?;
    Ok(integer_parser(
        ParserType::Byte,
        i64::from(i8::MIN),
        i64::from(i8::MAX),
    ))
}

pub fn build_float(_: Option<&str>, args: &[String]) -> Result<Parser<Value>, LogparError> {
    no_args(ParserType::Float, args)?;
    Ok(decimal_parser(ParserType::Float))
}

pub fn build_double(_: Option<&str>, args: &[String]) -> Result<Parser<Value>, LogparError> {
    no_args(ParserType::Double, args)?;
    Ok(decimal_parser(ParserType::Double))
}

pub fn build_scaled_float(
    _: Option<&str>,
    args: &[String],
) -> Result<Parser<Value>, LogparError> {
    no_args(ParserType::ScaledFloat, args)?;
    Ok(decimal_parser(ParserType::ScaledFloat))
}

/// `true` or `false`, case-insensitive.
pub fn build_bool(_: Option<&str>, args: &[String]) -> Result<Parser<Value>, LogparError> {
    no_args(ParserType::Bool, args)?;
    Ok(Parser::new(|text, index| {
        let rest = text.get(index..).unwrap_or_default();
        for (word, value) in [("true", true), ("false", false)] {
            if rest
                .get(..word.len())
                .is_some_and(|head| head.eq_ignore_ascii_case(word))
            {
                return Ok(Success::new(Value::Bool(value), index + word.len()));
            }
        }
        Err(Failure::new("bool: expected 'true' or 'false'", index))
    }))
}
