use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::LogparError;
use crate::registry::ParserType;

/// Field types of the external field dictionary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaType {
    Ip,
    Long,
    Object,
    GeoPoint,
    Keyword,
    Nested,
    ScaledFloat,
    Text,
    Boolean,
    Date,
    Float,
    Url,
    UserAgent,
}

impl SchemaType {
    pub const ALL: [SchemaType; 13] = [
        SchemaType::Ip,
        SchemaType::Long,
        SchemaType::Object,
        SchemaType::GeoPoint,
        SchemaType::Keyword,
        SchemaType::Nested,
        SchemaType::ScaledFloat,
        SchemaType::Text,
        SchemaType::Boolean,
        SchemaType::Date,
        SchemaType::Float,
        SchemaType::Url,
        SchemaType::UserAgent,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SchemaType::Ip => "ip",
            SchemaType::Long => "long",
            SchemaType::Object => "object",
            SchemaType::GeoPoint => "geo_point",
            SchemaType::Keyword => "keyword",
            SchemaType::Nested => "nested",
            SchemaType::ScaledFloat => "scaled_float",
            SchemaType::Text => "text",
            SchemaType::Boolean => "boolean",
            SchemaType::Date => "date",
            SchemaType::Float => "float",
            SchemaType::Url => "url",
            SchemaType::UserAgent => "user_agent",
        }
    }

    /// The leaf parser used for values of this type.
    pub fn parser_type(self) -> ParserType {
        match self {
            SchemaType::Ip => ParserType::Ip,
            SchemaType::Long => ParserType::Long,
            SchemaType::Object
            | SchemaType::GeoPoint
            | SchemaType::Keyword
            | SchemaType::Nested
            | SchemaType::Text => ParserType::Text,
            SchemaType::ScaledFloat => ParserType::ScaledFloat,
            SchemaType::Boolean => ParserType::Bool,
            SchemaType::Date => ParserType::Date,
            SchemaType::Float => ParserType::Float,
            SchemaType::Url => ParserType::Uri,
            SchemaType::UserAgent => ParserType::UserAgent,
        }
    }
}

impl fmt::Display for SchemaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SchemaType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SchemaType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or(())
    }
}

/// Canonical field name → schema type. Immutable once loaded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema {
    fields: HashMap<String, SchemaType>,
}

impl Schema {
    /// Loads a schema from a JSON object of `"field.name": "type"` pairs.
    ///
    /// # Errors
    ///
    /// Fails if the document is not a non-empty object, if a value is not a
    /// string, or if it names an unsupported type.
    pub fn from_json(doc: &Value) -> Result<Self, LogparError> {
        let obj = doc.as_object().ok_or(LogparError::SchemaNotObject)?;
        if obj.is_empty() {
            return Err(LogparError::EmptySchema);
        }

        let mut fields = HashMap::with_capacity(obj.len());
        for (field, value) in obj {
            let type_name = value
                .as_str()
                .ok_or_else(|| LogparError::SchemaFieldNotString {
                    field: field.clone(),
                })?;
            let schema_type = type_name.parse::<SchemaType>().map_err(|_| {
                LogparError::UnsupportedSchemaType {
                    field: field.clone(),
                    type_name: type_name.to_string(),
                }
            })?;
            fields.insert(field.clone(), schema_type);
        }

        log::debug!("Loaded schema with {} fields", fields.len());
        Ok(Self { fields })
    }

    pub fn get(&self, field: &str) -> Option<SchemaType> {
        self.fields.get(field).copied()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
