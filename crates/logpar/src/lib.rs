//! # logpar
//!
//! Declarative log-pattern parsing: describe the shape of a log line once,
//! get back a parser that turns matching lines into structured JSON.
//!
//! ## Overview
//!
//! A pattern is literal text interleaved with named, typed fields:
//!
//! ```text
//! <source.ip> - <~user> [<event.created/%d\/%b\/%Y:%H:%M:%S %z>] "<~request>"(? <~size/long>)
//! ```
//!
//! - **Fields** (`<name>`) take their type from a [`Schema`]; custom fields
//!   (`<~name/type/args...>`) name the type inline. `<~>` parses a value and
//!   throws it away.
//! - **Optional fields** (`<?name>`) may be absent.
//! - **Choices** (`<a>?<b>`) try the left field first, then the right one.
//! - **Groups** (`(?...)`) are optional sub-sequences and may nest.
//! - The escape character (`\`) makes any reserved glyph literal.
//!
//! All glyphs are configurable through [`Syntax`].
//!
//! ## Architecture
//!
//! ```text
//!  pattern ──► grammar ──► Vec<ParserInfo> ──► Logpar::build ──► Parser<Document>
//!                                                 │     │
//!                                             Schema   ParserRegistry
//! ```
//!
//! - [`parsec`]: the parser-combinator core everything else is written in.
//! - [`grammar`]: parsers for the pattern language, producing [`ast`] nodes.
//! - [`compiler`]: binds each field to a leaf parser through the schema and
//!   the registry, then sequences the nodes.
//! - [`registry`] / [`builtins`]: leaf parsers by [`ParserType`].
//! - [`document`]: the JSON output model.
//!
//! Compilation errors are [`LogparError`]s. A line that does not match yields
//! a [`Failure`] with the offset reached; no partial document is returned.
//!
//! ## Examples
//!
//! ```
//! use logpar::{Logpar, ParserRegistry, Schema};
//! use serde_json::json;
//!
//! let schema = Schema::from_json(&json!({"dst.ip": "ip"}))?;
//! let logpar = Logpar::new(schema, ParserRegistry::with_builtins()?);
//! let parser = logpar.build("<~> <dst.ip>(? port <~port/long>)")?;
//!
//! let doc = parser.run("ignored 8.8.8.8 port 53").unwrap().value;
//! assert_eq!(doc.as_value(), &json!({"dst": {"ip": "8.8.8.8"}, "~port": 53}));
//!
//! let doc = parser.run("ignored 8.8.4.4").unwrap().value;
//! assert_eq!(doc.as_value(), &json!({"dst": {"ip": "8.8.4.4"}}));
//!
//! assert!(parser.run("ignored not-an-ip").is_err());
//! # Ok::<(), logpar::LogparError>(())
//! ```

/// Pattern AST.
pub mod ast;
pub mod builtins;
/// Pattern compiler.
pub mod compiler;
pub mod document;
/// Error types.
pub mod error;
pub mod grammar;
pub mod parsec;
/// Leaf-parser registry.
pub mod registry;
/// Field-type schema.
pub mod schema;
/// Delimiter glyph configuration.
pub mod syntax;


pub use ast::ParserInfo;
pub use compiler::Logpar;
pub use document::Document;
pub use error::{DocumentError, LogparError};
pub use parsec::{Failure, ParseResult, Parser, Success};
pub use registry::{ParserBuilder, ParserRegistry, ParserType};
pub use schema::{Schema, SchemaType};
pub use syntax::Syntax;
