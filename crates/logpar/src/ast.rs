use serde::{Deserialize, Serialize};

/// Text matched verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Literal {
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldName {
    /// Canonical dotted name. Custom names keep their leading sigil.
    pub value: String,
    pub custom: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub name: FieldName,
    pub args: Vec<String>,
    pub optional: bool,
}

/// Two mandatory fields; the first one that parses wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    pub left: Field,
    pub right: Field,
}

/// Optional sub-sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub children: Vec<ParserInfo>,
}

/// One node of a parsed pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data")]
pub enum ParserInfo {
    Literal(Literal),
    Field(Field),
    Choice(Choice),
    Group(Group),
}

impl ParserInfo {
    pub fn as_literal(&self) -> Option<&Literal> {
        match self {
            ParserInfo::Literal(literal) => Some(literal),
            _ => None,
        }
    }
}

impl From<Literal> for ParserInfo {
    fn from(literal: Literal) -> Self {
        ParserInfo::Literal(literal)
    }
}

impl From<Field> for ParserInfo {
    fn from(field: Field) -> Self {
        ParserInfo::Field(field)
    }
}

impl From<Choice> for ParserInfo {
    fn from(choice: Choice) -> Self {
        ParserInfo::Choice(choice)
    }
}

impl From<Group> for ParserInfo {
    fn from(group: Group) -> Self {
        ParserInfo::Group(group)
    }
}
