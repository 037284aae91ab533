use serde::{Deserialize, Serialize};

use crate::error::LogparError;

/// Delimiter glyphs of the pattern language.
///
/// Every role must use a distinct character. A pattern author writes a
/// reserved glyph literally by prefixing it with [`Syntax::escape`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Syntax {
    pub field_begin: char,
    pub field_end: char,
    pub arg_separator: char,
    pub custom_field: char,
    pub escape: char,
    pub optional: char,
    pub group_begin: char,
    pub group_end: char,
    /// Separates the segments of a canonical field name.
    pub field_separator: char,
    /// Characters allowed in field names besides ASCII letters and digits.
    pub field_extended_chars: String,
    pub max_group_depth: usize,
}

impl Default for Syntax {
    fn default() -> Self {
        Self {
            field_begin: '<',
            field_end: '>',
            arg_separator: '/',
            custom_field: '~',
            escape: '\\',
            optional: '?',
            group_begin: '(',
            group_end: ')',
            field_separator: '.',
            field_extended_chars: "_@#".to_string(),
            max_group_depth: 32,
        }
    }
}

impl Syntax {
    /// Checks that no two roles share a glyph.
    pub fn validate(&self) -> Result<(), LogparError> {
        let roles = [
            ("field_begin", self.field_begin),
            ("field_end", self.field_end),
            ("arg_separator", self.arg_separator),
            ("custom_field", self.custom_field),
            ("escape", self.escape),
            ("optional", self.optional),
            ("group_begin", self.group_begin),
            ("group_end", self.group_end),
            ("field_separator", self.field_separator),
        ];

        for (i, (name, glyph)) in roles.iter().enumerate() {
            for (other, other_glyph) in &roles[i + 1..] {
                if glyph == other_glyph {
                    return Err(LogparError::InvalidSyntax(format!(
                        "'{glyph}' is used as both {name} and {other}"
                    )));
                }
            }
            if self.field_extended_chars.contains(*glyph) && *name != "field_separator" {
                return Err(LogparError::InvalidSyntax(format!(
                    "'{glyph}' is used as {name} and as a field name character"
                )));
            }
        }

        if self.max_group_depth == 0 {
            return Err(LogparError::InvalidSyntax(
                "max_group_depth must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Characters that end a literal.
    pub(crate) fn literal_reserved(&self) -> String {
        [
            self.field_begin,
            self.optional,
            self.group_begin,
            self.group_end,
        ]
        .iter()
        .collect()
    }

    /// Characters that end a field argument.
    pub(crate) fn arg_reserved(&self) -> String {
        [self.arg_separator, self.field_end].iter().collect()
    }

    /// Characters allowed after the first one in a field name.
    pub(crate) fn field_name_chars(&self) -> String {
        let mut chars = self.field_extended_chars.clone();
        chars.push(self.field_separator);
        chars
    }

    /// The name of the field whose value is parsed and thrown away.
    pub fn discard_field(&self) -> String {
        self.custom_field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_syntax_is_valid() {
        assert!(Syntax::default().validate().is_ok());
    }

    #[test]
    fn overlapping_glyphs_are_rejected() {
        let syntax = Syntax {
            optional: '<',
            ..Syntax::default()
        };
        let err = syntax.validate().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid syntax configuration: '<' is used as both field_begin and optional"
        );
    }

    #[test]
    fn partial_json_overrides_defaults() {
        let syntax: Syntax =
            serde_json::from_str(r#"{"field_begin": "{", "field_end": "}"}"#).unwrap();
        assert_eq!(syntax.field_begin, '{');
        assert_eq!(syntax.field_end, '}');
        assert_eq!(syntax.arg_separator, '/');
        assert!(syntax.validate().is_ok());
    }
}
