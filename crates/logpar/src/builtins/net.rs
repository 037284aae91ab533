use std::net::IpAddr;

use serde_json::{Map, Value};
use url::Url;

use super::{Delimiter, no_args, take_delimited};
use crate::error::LogparError;
use crate::parsec::{Failure, Parser, Success};
use crate::registry::ParserType;

fn is_ip_char(c: char) -> bool {
    c.is_ascii_hexdigit() || c == '.' || c == ':'
}

/// IPv4 or IPv6 address, emitted in canonical form.
pub fn build_ip(end_token: Option<&str>, args: &[String]) -> Result<Parser<Value>, LogparError> {
    no_args(ParserType::Ip, args)?;
    let end_token = end_token.unwrap_or_default().to_string();

    Ok(Parser::new(move |text, index| {
        let rest = text.get(index..).unwrap_or_default();
        let span = rest.find(|c| !is_ip_char(c)).unwrap_or(rest.len());
        if span == 0 {
            return Err(Failure::new("ip: expected an address", index));
        }
        let candidate = &rest[..span];

        // "10.0.0.1:8080" is tried whole, then cut at each occurrence of the
        // end token (longest first), then as its leading IPv4 part.
        let at_token: Vec<usize> = if end_token.is_empty() {
            Vec::new()
        } else {
            let mut v: Vec<usize> = candidate
                .match_indices(end_token.as_str())
                .map(|(i, _)| i)
                .collect();
            v.reverse();
            v
        };
        let ipv4_run = candidate
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(span);
        let ipv4_run = candidate[..ipv4_run].trim_end_matches('.').len();
        let parsed = std::iter::once(span)
            .chain(at_token)
            .chain(std::iter::once(ipv4_run))
            .filter(|&len| len > 0)
            .find_map(|len| candidate[..len].parse::<IpAddr>().ok().map(|ip| (ip, len)));

        match parsed {
            Some((ip, len)) => Ok(Success::new(Value::String(ip.to_string()), index + len)),
            None => Err(Failure::new(
                format!("ip: '{candidate}' is not a valid address"),
                index,
            )),
        }
    }))
}

/// Absolute URL, split into its components.
pub fn build_uri(end_token: Option<&str>, args: &[String]) -> Result<Parser<Value>, LogparError> {
    no_args(ParserType::Uri, args)?;
    let raw = take_delimited(ParserType::Uri, Delimiter::from_end_token(end_token));

    Ok(Parser::new(move |text, index| {
        let s = raw.parse(text, index)?;
        let url = Url::parse(&s.value)
            .map_err(|e| Failure::new(format!("uri: {e}"), index))?;
        Ok(Success::new(Value::Object(url_fields(&s.value, &url)), s.index))
    }))
}

fn url_fields(original: &str, url: &Url) -> Map<String, Value> {
    let mut fields = Map::new();
    fields.insert("original".into(), original.into());
    fields.insert("scheme".into(), url.scheme().into());
    if let Some(host) = url.host_str() {
        fields.insert("domain".into(), host.into());
    }
    if let Some(port) = url.port() {
        fields.insert("port".into(), port.into());
    }
    fields.insert("path".into(), url.path().into());
    if let Some(query) = url.query() {
        fields.insert("query".into(), query.into());
    }
    if let Some(fragment) = url.fragment() {
        fields.insert("fragment".into(), fragment.into());
    }
    if !url.username().is_empty() {
        fields.insert("username".into(), url.username().into());
    }
    if let Some(password) = url.password() {
        fields.insert("password".into(), password.into());
    }
    fields
}
