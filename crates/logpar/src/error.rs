use thiserror::Error;

use crate::registry::ParserType;

/// Errors raised while configuring the compiler or compiling a pattern.
///
/// These are fatal for the compilation unit that produced them; no partially
/// built parser is ever returned alongside one.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LogparError {
    #[error("Schema must be an object")]
    SchemaNotObject,

    #[error("Schema must not be empty")]
    EmptySchema,

    #[error("Schema field '{field}' must be a string with the name of the type")]
    SchemaFieldNotString { field: String },

    #[error("Type '{type_name}' in schema field '{field}' is not supported")]
    UnsupportedSchemaType { field: String, type_name: String },

    #[error("Parser type '{0}' already registered")]
    DuplicateBuilder(ParserType),

    #[error("Parser type '{0}' not found")]
    UnknownParserType(String),

    #[error("Parser type '{0}' is not registered")]
    UnregisteredParser(ParserType),

    #[error("Field '{0}' not found in schema")]
    UnknownField(String),

    #[error("Invalid pattern '{pattern}': {message} at offset {offset}")]
    PatternSyntax {
        pattern: String,
        message: String,
        offset: usize,
    },

    #[error("Empty pattern")]
    EmptyPattern,

    #[error("Invalid arguments for parser '{parser}': {reason}")]
    InvalidArguments { parser: ParserType, reason: String },

    #[error("Invalid syntax configuration: {0}")]
    InvalidSyntax(String),
}

/// Errors from [`Document`](crate::document::Document) operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocumentError {
    #[error("Invalid json path: [{0}]")]
    InvalidPath(String),

    #[error("Field not found: [{0}]")]
    NotFound(String),

    #[error("Path [{0}] crosses a value that is not an object or array")]
    PathConflict(String),

    #[error("Cannot merge json values of different types at [{0}]")]
    MergeTypeMismatch(String),

    #[error("Invalid json type at [{0}], expected object or array")]
    NotMergeable(String),

    #[error("Value at [{0}] is not an array")]
    NotAnArray(String),
}
