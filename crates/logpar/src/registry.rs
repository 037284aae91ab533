use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::builtins;
use crate::error::LogparError;
use crate::parsec::Parser;

/// Tags of the leaf parsers a field can be bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ParserType {
    Literal,
    Text,
    Long,
    Double,
    Float,
    ScaledFloat,
    Byte,
    Bool,
    Binary,
    Date,
    Ip,
    Uri,
    UserAgent,
    Fqdn,
    FilePath,
    Json,
    Xml,
    Csv,
    Dsv,
    Kv,
    Quoted,
    Between,
    Alphanumeric,
    Ignore,
}

impl ParserType {
    pub const ALL: [ParserType; 24] = [
        ParserType::Literal,
        ParserType::Text,
        ParserType::Long,
        ParserType::Double,
        ParserType::Float,
        ParserType::ScaledFloat,
        ParserType::Byte,
        ParserType::Bool,
        ParserType::Binary,
        ParserType::Date,
        ParserType::Ip,
        ParserType::Uri,
        ParserType::UserAgent,
        ParserType::Fqdn,
        ParserType::FilePath,
        ParserType::Json,
        ParserType::Xml,
        ParserType::Csv,
        ParserType::Dsv,
        ParserType::Kv,
        ParserType::Quoted,
        ParserType::Between,
        ParserType::Alphanumeric,
        ParserType::Ignore,
    ];

    /// Name used to annotate custom fields in a pattern.
    pub fn as_str(self) -> &'static str {
        match self {
            ParserType::Literal => "literal",
            ParserType::Text => "text",
            ParserType::Long => "long",
            ParserType::Double => "double",
            ParserType::Float => "float",
            ParserType::ScaledFloat => "scaled_float",
            ParserType::Byte => "byte",
            ParserType::Bool => "bool",
            ParserType::Binary => "binary",
            ParserType::Date => "date",
            ParserType::Ip => "ip",
            ParserType::Uri => "uri",
            ParserType::UserAgent => "useragent",
            ParserType::Fqdn => "fqdn",
            ParserType::FilePath => "file",
            ParserType::Json => "json",
            ParserType::Xml => "xml",
            ParserType::Csv => "csv",
            ParserType::Dsv => "dsv",
            ParserType::Kv => "kv",
            ParserType::Quoted => "quoted",
            ParserType::Between => "between",
            ParserType::Alphanumeric => "alphanumeric",
            ParserType::Ignore => "ignore",
        }
    }
}

impl fmt::Display for ParserType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ParserType {
    type Err = LogparError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ParserType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| LogparError::UnknownParserType(s.to_string()))
    }
}

/// Builds one leaf parser instance for one field occurrence.
///
/// The first argument is the end token: `None` when the next pattern node is
/// not a literal, `Some("")` when the field is last, and otherwise the text of
/// the literal that follows. The second is the field's remaining arguments.
pub type ParserBuilder =
    Arc<dyn Fn(Option<&str>, &[String]) -> Result<Parser<Value>, LogparError> + Send + Sync>;

/// Table of leaf-parser builders.
///
/// Registration happens once per type, before the registry is handed to
/// [`Logpar`](crate::Logpar); from then on it is only read.
#[derive(Clone, Default)]
pub struct ParserRegistry {
    builders: HashMap<ParserType, ParserBuilder>,
}

impl fmt::Debug for ParserRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut types: Vec<_> = self.builders.keys().collect();
        types.sort();
        f.debug_struct("ParserRegistry")
            .field("builders", &types)
            .finish()
    }
}

impl ParserRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every built-in leaf parser.
    pub fn with_builtins() -> Result<Self, LogparError> {
        let mut registry = Self::new();
        builtins::register_all(&mut registry)?;
        Ok(registry)
    }

    /// Registers `builder` for `parser_type`.
    ///
    /// # Errors
    ///
    /// [`LogparError::DuplicateBuilder`] if the type already has a builder.
    /// Existing registrations are never overwritten.
    pub fn register<F>(&mut self, parser_type: ParserType, builder: F) -> Result<(), LogparError>
    where
        F: Fn(Option<&str>, &[String]) -> Result<Parser<Value>, LogparError>
            + Send
            + Sync
            + 'static,
    {
        if self.builders.contains_key(&parser_type) {
            return Err(LogparError::DuplicateBuilder(parser_type));
        }
        log::debug!("Registered parser builder '{}'", parser_type);
        self.builders.insert(parser_type, Arc::new(builder));
        Ok(())
    }

    pub fn contains(&self, parser_type: ParserType) -> bool {
        self.builders.contains_key(&parser_type)
    }

    pub fn len(&self) -> usize {
        self.builders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.builders.is_empty()
    }

    /// Invokes the builder registered for `parser_type`.
    pub fn build(
        &self,
        parser_type: ParserType,
        end_token: Option<&str>,
        args: &[String],
    ) -> Result<Parser<Value>, LogparError> {
        let builder = self
            .builders
            .get(&parser_type)
            .ok_or(LogparError::UnregisteredParser(parser_type))?;
        builder(end_token, args)
    }
}
