use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde_json::Value;

use super::{Delimiter, invalid_args, take_delimited};
use crate::error::LogparError;
use crate::parsec::{Failure, Parser, Success};
use crate::registry::ParserType;

const ISO8601: [&str; 3] = [
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M:%S%.fZ",
    "%Y-%m-%dT%H:%M:%S%.f",
];
const RFC2822: [&str; 1] = ["%a, %d %b %Y %H:%M:%S %z"];

/// Specifiers that pin down the year on their own.
const YEAR_SPECIFIERS: [&str; 12] = [
    "%Y", "%y", "%G", "%g", "%C", "%F", "%D", "%x", "%v", "%c", "%+", "%s",
];

#[derive(Debug, Clone)]
enum DateFormat {
    Rfc3339,
    Strftime(Vec<String>),
}

impl DateFormat {
    fn from_args(args: &[String]) -> Result<Self, LogparError> {
        let format = match args {
            [] => return Ok(DateFormat::Rfc3339),
            [format] => format.as_str(),
            _ => {
                return Err(invalid_args(
                    ParserType::Date,
                    format!("expected at most 1 argument, got {}", args.len()),
                ));
            }
        };

        let patterns: Vec<String> = match format {
            "RFC3339" => return Ok(DateFormat::Rfc3339),
            "RFC2822" => RFC2822.iter().map(|s| s.to_string()).collect(),
            "ISO8601" => ISO8601.iter().map(|s| s.to_string()).collect(),
            custom => {
                if custom.is_empty()
                    || StrftimeItems::new(custom).any(|item| matches!(item, Item::Error))
                {
                    return Err(invalid_args(
                        ParserType::Date,
                        format!("invalid date format '{custom}'"),
                    ));
                }
                vec![custom.to_string()]
            }
        };
        Ok(DateFormat::Strftime(patterns))
    }
}

fn has_year(format: &str) -> bool {
    YEAR_SPECIFIERS.iter().any(|spec| format.contains(spec))
}

/// Parses a prefix of `input` with `format`, returning the instant and the
/// number of bytes consumed. Values without an offset are taken as UTC and
/// date-only values as midnight.
fn parse_prefix(input: &str, format: &str) -> Option<(DateTime<Utc>, usize)> {
    if let Ok((dt, rest)) = DateTime::parse_and_remainder(input, format) {
        return Some((dt.with_timezone(&Utc), input.len() - rest.len()));
    }
    if let Ok((dt, rest)) = NaiveDateTime::parse_and_remainder(input, format) {
        return Some((dt.and_utc(), input.len() - rest.len()));
    }
    let (date, rest) = NaiveDate::parse_and_remainder(input, format).ok()?;
    Some((date.and_hms_opt(0, 0, 0)?.and_utc(), input.len() - rest.len()))
}

/// Like [`parse_prefix`], assuming the current year when `format` has none.
fn parse_with_format(input: &str, format: &str) -> Option<(DateTime<Utc>, usize)> {
    if has_year(format) {
        return parse_prefix(input, format);
    }
    let prefix = format!("{} ", Utc::now().year());
    let (dt, consumed) = parse_prefix(&format!("{prefix}{input}"), &format!("%Y {format}"))?;
    consumed.checked_sub(prefix.len()).map(|len| (dt, len))
}

fn render(dt: DateTime<Utc>) -> Value {
    Value::String(dt.to_rfc3339_opts(SecondsFormat::Millis, true))
}

/// Timestamp normalised to RFC 3339 UTC with millisecond precision.
///
/// Argument 0 is `RFC3339` (default), `RFC2822`, `ISO8601` or a strftime
/// pattern. Patterns without a year assume the current one.
pub fn build_date(end_token: Option<&str>, args: &[String]) -> Result<Parser<Value>, LogparError> {
    match DateFormat::from_args(args)? {
        DateFormat::Rfc3339 => {
            let raw = take_delimited(ParserType::Date, Delimiter::from_end_token(end_token));
            Ok(Parser::new(move |text, index| {
                let s = raw.parse(text, index)?;
                let dt = DateTime::parse_from_rfc3339(&s.value)
                    .map_err(|e| Failure::new(format!("date: {e}"), index))?;
                Ok(Success::new(render(dt.with_timezone(&Utc)), s.index))
            }))
        }
        DateFormat::Strftime(patterns) => Ok(Parser::new(move |text, index| {
            let rest = text.get(index..).unwrap_or_default();
            patterns
                .iter()
                .find_map(|format| parse_with_format(rest, format))
                .filter(|(_, len)| *len > 0)
                .map(|(dt, len)| Success::new(render(dt), index + len))
                .ok_or_else(|| {
                    Failure::new(
                        format!("date: expected a date in format '{}'", patterns.join("' or '")),
                        index,
                    )
                })
        })),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn args(format: &str) -> Vec<String> {
        vec![format.to_string()]
    }

    #[test]
    fn rfc3339_is_the_default() {
        let p = build_date(Some(" "), &[]).unwrap();
        let s = p.run("2023-06-14T15:16:01+02:00 GET").unwrap();
        assert_eq!(s.value, json!("2023-06-14T13:16:01.000Z"));
        assert_eq!(s.index, 25);
        assert!(p.run("yesterday ").is_err());
    }

    #[test]
    fn rfc2822() {
        let p = build_date(None, &args("RFC2822")).unwrap();
        let s = p.run("Wed, 14 Jun 2023 15:16:01 +0000]").unwrap();
        assert_eq!(s.value, json!("2023-06-14T15:16:01.000Z"));
        assert_eq!(s.index, 31);
    }

    #[test]
    fn iso8601_with_and_without_zone() {
        let p = build_date(None, &args("ISO8601")).unwrap();
        assert_eq!(
            p.run("2023-06-14T15:16:01.250Z").unwrap().value,
            json!("2023-06-14T15:16:01.250Z")
        );
        assert_eq!(
            p.run("2023-06-14T15:16:01").unwrap().value,
            json!("2023-06-14T15:16:01.000Z")
        );
    }

    #[test]
    fn custom_format_consumes_only_the_date() {
        let p = build_date(None, &args("%d/%b/%Y:%H:%M:%S %z")).unwrap();
        let s = p.run("10/Oct/2000:13:55:36 -0700] \"GET\"").unwrap();
        assert_eq!(s.value, json!("2000-10-10T20:55:36.000Z"));
        assert_eq!(s.index, 26);
    }

    #[test]
    fn date_only_format_is_midnight() {
        let p = build_date(None, &args("%Y-%m-%d")).unwrap();
        assert_eq!(
            p.run("2021-02-03 rest").unwrap().value,
            json!("2021-02-03T00:00:00.000Z")
        );
    }

    #[test]
    fn yearless_format_assumes_current_year() {
        let p = build_date(None, &args("%b %d %H:%M:%S")).unwrap();
        let s = p.run("Jun 14 15:16:01 host").unwrap();
        let expected = format!("{}-06-14T15:16:01.000Z", Utc::now().year());
        assert_eq!(s.value, json!(expected));
        assert_eq!(s.index, 15);
    }

    #[test]
    fn composite_specifiers_carry_their_own_year() {
        let p = build_date(None, &args("%+")).unwrap();
        assert_eq!(
            p.run("2023-06-14T15:16:01+00:00").unwrap().value,
            json!("2023-06-14T15:16:01.000Z")
        );

        let p = build_date(None, &args("%x")).unwrap();
        assert_eq!(
            p.run("06/14/23").unwrap().value,
            json!("2023-06-14T00:00:00.000Z")
        );

        let p = build_date(None, &args("%v")).unwrap();
        assert_eq!(
            p.run("14-Jun-2023").unwrap().value,
            json!("2023-06-14T00:00:00.000Z")
        );

        let p = build_date(None, &args("%D %T")).unwrap();
        assert_eq!(
            p.run("06/14/23 15:16:01").unwrap().value,
            json!("2023-06-14T15:16:01.000Z")
        );
    }

    #[test]
    fn bad_format_is_rejected_at_build_time() {
        let err = build_date(None, &args("%Q")).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid arguments for parser 'date': invalid date format '%Q'"
        );
    }
}
