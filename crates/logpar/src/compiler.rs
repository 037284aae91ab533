//! Compiles a pattern into a parser producing [`Document`]s.

use std::sync::Arc;

use serde_json::Value;

use crate::ast::{Choice, Field, Group, Literal, ParserInfo};
use crate::document::{Document, format_json_path};
use crate::error::LogparError;
use crate::grammar;
use crate::parsec::{Failure, Parser, Success, eof, opt};
use crate::registry::{ParserRegistry, ParserType};
use crate::schema::Schema;
use crate::syntax::Syntax;

/// Binds patterns to a schema and a set of leaf parsers.
///
/// A `Logpar` is immutable once built. Compiled parsers share its schema and
/// registry and may be run from any number of threads.
///
/// ```
/// use logpar::{Logpar, ParserRegistry, Schema};
/// use serde_json::json;
///
/// let schema = Schema::from_json(&json!({"src.ip": "ip", "user.name": "keyword"})).unwrap();
/// let logpar = Logpar::new(schema, ParserRegistry::with_builtins().unwrap());
/// let parser = logpar.build("<src.ip> - <user.name>").unwrap();
///
/// let doc = parser.run("10.0.0.1 - alice").unwrap().value;
/// assert_eq!(doc.as_value(), &json!({"src": {"ip": "10.0.0.1"}, "user": {"name": "alice"}}));
/// ```
#[derive(Debug, Clone)]
pub struct Logpar {
    schema: Arc<Schema>,
    registry: Arc<ParserRegistry>,
    syntax: Syntax,
}

impl Logpar {
    /// A compiler using the default pattern syntax.
    pub fn new(schema: Schema, registry: ParserRegistry) -> Self {
        Self {
            schema: Arc::new(schema),
            registry: Arc::new(registry),
            syntax: Syntax::default(),
        }
    }

    /// A compiler using custom delimiter glyphs.
    ///
    /// # Errors
    ///
    /// [`LogparError::InvalidSyntax`] if the glyphs overlap.
    pub fn with_syntax(
        schema: Schema,
        registry: ParserRegistry,
        syntax: Syntax,
    ) -> Result<Self, LogparError> {
        syntax.validate()?;
        Ok(Self {
            schema: Arc::new(schema),
            registry: Arc::new(registry),
            syntax,
        })
    }

    /// Loads the schema from its JSON form and uses the default syntax.
    pub fn from_schema_json(schema: &Value, registry: ParserRegistry) -> Result<Self, LogparError> {
        Ok(Self::new(Schema::from_json(schema)?, registry))
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn registry(&self) -> &ParserRegistry {
        &self.registry
    }

    pub fn syntax(&self) -> &Syntax {
        &self.syntax
    }

    /// Parses `pattern` into its node list without compiling it.
    pub fn parse_pattern(&self, pattern: &str) -> Result<Vec<ParserInfo>, LogparError> {
        let nodes = grammar::parse(pattern, &self.syntax).map_err(|failure| {
            LogparError::PatternSyntax {
                pattern: pattern.to_string(),
                message: failure.message,
                offset: failure.index,
            }
        })?;
        if nodes.is_empty() {
            return Err(LogparError::EmptyPattern);
        }
        Ok(nodes)
    }

    /// Compiles `pattern`. The resulting parser must consume its whole input.
    ///
    /// A line that matches but binds no field yields an empty object.
    pub fn build(&self, pattern: &str) -> Result<Parser<Document>, LogparError> {
        let nodes = self.parse_pattern(pattern)?;
        log::debug!("Compiling pattern '{}' ({} nodes)", pattern, nodes.len());

        let parser = self.build_parsers(&nodes, Some(""))?;
        Ok(parser
            .then_ignore(eof())
            .map(|doc| if doc.is_null() { Document::new() } else { doc }))
    }

    pub fn build_literal_parser(&self, literal: &Literal) -> Result<Parser<Document>, LogparError> {
        let parser = self.registry.build(
            ParserType::Literal,
            None,
            std::slice::from_ref(&literal.value),
        )?;
        Ok(parser.replace(Document::null()))
    }

    /// Compiles one field.
    ///
    /// Custom fields take their leaf type from the first argument (`text` when
    /// there is none); other fields take it from the schema. The leaf value is
    /// stored under the field's path, except for the discard field.
    pub fn build_field_parser(
        &self,
        field: &Field,
        end_token: Option<&str>,
    ) -> Result<Parser<Document>, LogparError> {
        let name = &field.name.value;
        let (parser_type, args) = if field.name.custom {
            match field.args.split_first() {
                Some((type_name, rest)) => (type_name.parse::<ParserType>()?, rest),
                None => (ParserType::Text, &field.args[..]),
            }
        } else {
            let schema_type = self
                .schema
                .get(name)
                .ok_or_else(|| LogparError::UnknownField(name.clone()))?;
            (schema_type.parser_type(), &field.args[..])
        };

        log::trace!(
            "Binding field '{}' to '{}' (end token {:?})",
            name,
            parser_type,
            end_token
        );
        let leaf = self.registry.build(parser_type, end_token, args)?;

        let parser = if *name == self.syntax.discard_field() {
            leaf.replace(Document::null())
        } else {
            let path = format_json_path(name);
            let name = name.clone();
            Parser::new(move |text, index| {
                let s = leaf.parse(text, index)?;
                let mut doc = Document::null();
                doc.set(&path, s.value)
                    .map_err(|e| Failure::new(format!("{name}: {e}"), index))?;
                Ok(Success::new(doc, s.index))
            })
        };

        if field.optional {
            Ok(opt(parser).map(|doc| doc.unwrap_or_else(Document::null)))
        } else {
            Ok(parser)
        }
    }

    /// Left field first; the right one is tried from the same offset.
    pub fn build_choice_parser(
        &self,
        choice: &Choice,
        end_token: Option<&str>,
    ) -> Result<Parser<Document>, LogparError> {
        let left = self.build_field_parser(&choice.left, end_token)?;
        let right = self.build_field_parser(&choice.right, end_token)?;
        Ok(left.or(right))
    }

    /// Compiles the group's children and makes the whole group optional.
    ///
    /// `end_token` applies to the group's last child.
    pub fn build_group_parser(
        &self,
        group: &Group,
        end_token: Option<&str>,
    ) -> Result<Parser<Document>, LogparError> {
        let inner = self.build_parsers(&group.children, end_token)?;
        Ok(opt(inner).map(|doc| doc.unwrap_or_else(Document::null)))
    }

    /// Sequences `nodes`, merging their documents in order.
    ///
    /// Each node gets as end token the text of the literal that follows it,
    /// `last` if it is the final node, and nothing otherwise.
    pub fn build_parsers(
        &self,
        nodes: &[ParserInfo],
        last: Option<&str>,
    ) -> Result<Parser<Document>, LogparError> {
        let parsers = nodes
            .iter()
            .enumerate()
            .map(|(i, node)| {
                let end_token = end_token(nodes, i, last);
                match node {
                    ParserInfo::Literal(literal) => self.build_literal_parser(literal),
                    ParserInfo::Field(field) => self.build_field_parser(field, end_token),
                    ParserInfo::Choice(choice) => self.build_choice_parser(choice, end_token),
                    ParserInfo::Group(group) => self.build_group_parser(group, end_token),
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        // A flat loop, so running does not recurse once per node.
        Ok(Parser::new(move |text, index| {
            let mut doc = Document::null();
            let mut cursor = index;
            for parser in &parsers {
                let success = parser.parse(text, cursor)?;
                doc = merge_documents(doc, success.value);
                cursor = success.index;
            }
            Ok(Success::new(doc, cursor))
        }))
    }
}

fn end_token<'a>(nodes: &'a [ParserInfo], i: usize, last: Option<&'a str>) -> Option<&'a str> {
    match nodes.get(i + 1) {
        Some(ParserInfo::Literal(literal)) => Some(literal.value.as_str()),
        Some(_) => None,
        None => last,
    }
}

/// Later documents win on conflicting leaves.
fn merge_documents(mut left: Document, right: Document) -> Document {
    match (left.is_object(), right.is_object()) {
        (true, true) => {
            left.deep_merge(right);
            left
        }
        (true, false) => left,
        (false, true) => right,
        (false, false) => Document::null(),
    }
}
