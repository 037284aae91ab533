//! JSON document addressed by JSON-pointer paths.
//!
//! Field names in patterns are dotted (`source.ip`); they are converted to
//! pointers (`/source/ip`) with [`format_json_path`] before being used here.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::DocumentError;

/// Converts a dotted field path into a JSON pointer.
///
/// `~` and `/` inside the name are escaped as `~0` and `~1`, every `.` becomes
/// a segment separator, and the path `.` alone addresses the root.
pub fn format_json_path(dot_path: &str) -> String {
    if dot_path == "." {
        return String::new();
    }

    let escaped = dot_path.replace('~', "~0").replace('/', "~1");
    let mut pointer = escaped.replace('.', "/");
    if !pointer.starts_with('/') {
        pointer.insert(0, '/');
    }
    pointer
}

fn parse_pointer(path: &str) -> Result<Vec<String>, DocumentError> {
    if path.is_empty() {
        return Ok(Vec::new());
    }
    let rest = path
        .strip_prefix('/')
        .ok_or_else(|| DocumentError::InvalidPath(path.to_string()))?;

    rest.split('/')
        .map(|segment| unescape_segment(segment).ok_or_else(|| DocumentError::InvalidPath(path.to_string())))
        .collect()
}

fn unescape_segment(segment: &str) -> Option<String> {
    let mut out = String::with_capacity(segment.len());
    let mut chars = segment.chars();
    while let Some(c) = chars.next() {
        if c == '~' {
            match chars.next() {
                Some('0') => out.push('~'),
                Some('1') => out.push('/'),
                _ => return None,
            }
        } else {
            out.push(c);
        }
    }
    Some(out)
}

/// A JSON value with path-based accessors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document {
    value: Value,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Value> for Document {
    fn from(value: Value) -> Self {
        Self { value }
    }
}

impl From<Document> for Value {
    fn from(doc: Document) -> Self {
        doc.value
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

impl Document {
    /// An empty object.
    pub fn new() -> Self {
        Self {
            value: Value::Object(Map::new()),
        }
    }

    /// A document holding no value at all.
    pub fn null() -> Self {
        Self { value: Value::Null }
    }

    pub fn as_value(&self) -> &Value {
        &self.value
    }

    pub fn into_value(self) -> Value {
        self.value
    }

    pub fn is_object(&self) -> bool {
        self.value.is_object()
    }

    pub fn is_null(&self) -> bool {
        self.value.is_null()
    }

    /// Number of members (object) or elements (array); zero otherwise.
    pub fn len(&self) -> usize {
        match &self.value {
            Value::Object(map) => map.len(),
            Value::Array(items) => items.len(),
            _ => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, path: &str) -> Option<&Value> {
        let tokens = parse_pointer(path).ok()?;
        let mut current = &self.value;
        for token in &tokens {
            current = match current {
                Value::Object(map) => map.get(token)?,
                Value::Array(items) => items.get(token.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        Some(current)
    }

    fn get_mut(&mut self, path: &str) -> Result<&mut Value, DocumentError> {
        let tokens = parse_pointer(path)?;
        let mut current = &mut self.value;
        for token in &tokens {
            current = match current {
                Value::Object(map) => map.get_mut(token),
                Value::Array(items) => token
                    .parse::<usize>()
                    .ok()
                    .and_then(|i| items.get_mut(i)),
                _ => None,
            }
            .ok_or_else(|| DocumentError::NotFound(path.to_string()))?;
        }
        Ok(current)
    }

    pub fn exists(&self, path: &str) -> bool {
        self.get(path).is_some()
    }

    pub fn get_string(&self, path: &str) -> Option<String> {
        self.get(path)?.as_str().map(str::to_string)
    }

    pub fn get_int(&self, path: &str) -> Option<i32> {
        self.get(path)?
            .as_i64()
            .and_then(|n| i32::try_from(n).ok())
    }

    pub fn get_int64(&self, path: &str) -> Option<i64> {
        self.get(path)?.as_i64()
    }

    pub fn get_float(&self, path: &str) -> Option<f32> {
        self.get_double(path).map(|n| n as f32)
    }

    pub fn get_double(&self, path: &str) -> Option<f64> {
        let value = self.get(path)?;
        if value.is_f64() { value.as_f64() } else { None }
    }

    pub fn get_bool(&self, path: &str) -> Option<bool> {
        self.get(path)?.as_bool()
    }

    pub fn get_array(&self, path: &str) -> Option<&Vec<Value>> {
        self.get(path)?.as_array()
    }

    pub fn get_object(&self, path: &str) -> Option<&Map<String, Value>> {
        self.get(path)?.as_object()
    }

    /// Sets `value` at `path`, creating intermediate objects as needed.
    ///
    /// A `-` segment on an array appends a new element.
    pub fn set(&mut self, path: &str, value: impl Into<Value>) -> Result<(), DocumentError> {
        let tokens = parse_pointer(path)?;
        let mut current = &mut self.value;
        for token in tokens {
            if current.is_null() {
                *current = Value::Object(Map::new());
            }
            current = match current {
                Value::Object(map) => map.entry(token).or_insert(Value::Null),
                Value::Array(items) => {
                    let index = if token == "-" {
                        items.len()
                    } else {
                        token
                            .parse::<usize>()
                            .map_err(|_| DocumentError::PathConflict(path.to_string()))?
                    };
                    if index == items.len() {
                        items.push(Value::Null);
                    }
                    items
                        .get_mut(index)
                        .ok_or_else(|| DocumentError::NotFound(path.to_string()))?
                }
                _ => return Err(DocumentError::PathConflict(path.to_string())),
            };
        }
        *current = value.into();
        Ok(())
    }

    pub fn set_string(&mut self, path: &str, value: &str) -> Result<(), DocumentError> {
        self.set(path, value)
    }

    pub fn set_int(&mut self, path: &str, value: i32) -> Result<(), DocumentError> {
        self.set(path, value)
    }

    pub fn set_int64(&mut self, path: &str, value: i64) -> Result<(), DocumentError> {
        self.set(path, value)
    }

    pub fn set_float(&mut self, path: &str, value: f32) -> Result<(), DocumentError> {
        self.set(path, f64::from(value))
    }

    pub fn set_double(&mut self, path: &str, value: f64) -> Result<(), DocumentError> {
        self.set(path, value)
    }

    pub fn set_bool(&mut self, path: &str, value: bool) -> Result<(), DocumentError> {
        self.set(path, value)
    }

    /// Appends to the array at `path`, creating it if absent.
    pub fn append(&mut self, path: &str, value: impl Into<Value>) -> Result<(), DocumentError> {
        let is_array = match self.get(path) {
            None | Some(Value::Null) => false,
            Some(Value::Array(_)) => true,
            Some(_) => return Err(DocumentError::NotAnArray(path.to_string())),
        };
        if !is_array {
            return self.set(path, Value::Array(vec![value.into()]));
        }
        if let Value::Array(items) = self.get_mut(path)? {
            items.push(value.into());
        }
        Ok(())
    }

    pub fn append_string(&mut self, path: &str, value: &str) -> Result<(), DocumentError> {
        self.append(path, value)
    }

    /// Removes the value at `path`. Returns whether anything was removed.
    pub fn erase(&mut self, path: &str) -> Result<bool, DocumentError> {
        let mut tokens = parse_pointer(path)?;
        let Some(last) = tokens.pop() else {
            let had_value = !self.value.is_null();
            self.value = Value::Null;
            return Ok(had_value);
        };

        let parent_path = if tokens.is_empty() {
            String::new()
        } else {
            format!("/{}", path[1..].rsplit_once('/').map_or("", |(head, _)| head))
        };
        let parent = match self.get_mut(&parent_path) {
            Ok(parent) => parent,
            Err(DocumentError::NotFound(_)) => return Ok(false),
            Err(err) => return Err(err),
        };
        Ok(match parent {
            Value::Object(map) => map.remove(&last).is_some(),
            Value::Array(items) => match last.parse::<usize>() {
                Ok(i) if i < items.len() => {
                    items.remove(i);
                    true
                }
                _ => false,
            },
            _ => false,
        })
    }

    /// Merges `source` into the value at `path`.
    ///
    /// Both sides must have the same shape. Objects are merged member-wise,
    /// with `source` overwriting existing members; arrays gain every element
    /// of `source` they do not already contain.
    pub fn merge(&mut self, source: &Document, path: &str) -> Result<(), DocumentError> {
        let destination = self.get_mut(path)?;
        match (destination, &source.value) {
            (Value::Object(dst), Value::Object(src)) => {
                for (key, value) in src {
                    dst.insert(key.clone(), value.clone());
                }
                Ok(())
            }
            (Value::Array(dst), Value::Array(src)) => {
                for value in src {
                    if !dst.contains(value) {
                        dst.push(value.clone());
                    }
                }
                Ok(())
            }
            (dst, src) if std::mem::discriminant(&*dst) == std::mem::discriminant(src) => {
                Err(DocumentError::NotMergeable(path.to_string()))
            }
            _ => Err(DocumentError::MergeTypeMismatch(path.to_string())),
        }
    }

    /// Recursively merges `other` into this document.
    ///
    /// Nested objects are combined; any other collision is resolved in favour
    /// of `other`.
    pub fn deep_merge(&mut self, other: Document) {
        deep_merge_values(&mut self.value, other.value);
    }
}

fn deep_merge_values(dst: &mut Value, src: Value) {
    match (dst, src) {
        (Value::Object(dst), Value::Object(src)) => {
            for (key, value) in src {
                match dst.get_mut(&key) {
                    Some(existing) if existing.is_object() && value.is_object() => {
                        deep_merge_values(existing, value);
                    }
                    _ => {
                        dst.insert(key, value);
                    }
                }
            }
        }
        (dst, src) => *dst = src,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn formats_dotted_paths() {
        assert_eq!(format_json_path("src.ip"), "/src/ip");
        assert_eq!(format_json_path("~name"), "/~0name");
        assert_eq!(format_json_path("a/b.c"), "/a~1b/c");
        assert_eq!(format_json_path("."), "");
        assert_eq!(format_json_path("~"), "/~0");
    }

    #[test]
    fn set_creates_intermediate_objects() {
        let mut doc = Document::null();
        doc.set("/src/ip", "10.0.0.1").unwrap();
        doc.set_int64("/src/port", 22).unwrap();
        assert_eq!(doc.as_value(), &json!({"src": {"ip": "10.0.0.1", "port": 22}}));
        assert_eq!(doc.get_string("/src/ip").as_deref(), Some("10.0.0.1"));
        assert_eq!(doc.get_int("/src/port"), Some(22));
        assert!(doc.exists("/src"));
        assert!(!doc.exists("/dst"));
    }

    #[test]
    fn root_path_replaces_whole_document() {
        let mut doc = Document::new();
        doc.set("", json!({"a": 1})).unwrap();
        assert_eq!(doc.as_value(), &json!({"a": 1}));
    }

    #[test]
    fn escaped_segments_round_trip() {
        let mut doc = Document::new();
        doc.set(&format_json_path("~custom"), true).unwrap();
        assert_eq!(doc.as_value(), &json!({"~custom": true}));
        assert_eq!(doc.get_bool("/~0custom"), Some(true));
    }

    #[test]
    fn invalid_pointers_are_rejected() {
        let mut doc = Document::new();
        assert_eq!(
            doc.set("no-slash", 1),
            Err(DocumentError::InvalidPath("no-slash".to_string()))
        );
        assert_eq!(
            doc.set("/bad~2escape", 1),
            Err(DocumentError::InvalidPath("/bad~2escape".to_string()))
        );
        assert_eq!(doc.get("no-slash"), None);
    }

    #[test]
    fn set_through_scalar_is_a_conflict() {
        let mut doc = Document::from(json!({"a": 1}));
        assert_eq!(
            doc.set("/a/b", 2),
            Err(DocumentError::PathConflict("/a/b".to_string()))
        );
    }

    #[test]
    fn typed_getters_check_types() {
        let doc = Document::from(json!({"f": 1.5, "i": 3, "s": "x", "big": 5_000_000_000i64}));
        assert_eq!(doc.get_double("/f"), Some(1.5));
        assert_eq!(doc.get_float("/f"), Some(1.5f32));
        assert_eq!(doc.get_double("/i"), None);
        assert_eq!(doc.get_int("/s"), None);
        assert_eq!(doc.get_int("/big"), None);
        assert_eq!(doc.get_int64("/big"), Some(5_000_000_000));
    }

    #[test]
    fn append_creates_and_extends_arrays() {
        let mut doc = Document::new();
        doc.append_string("/tags", "a").unwrap();
        doc.append("/tags", "b").unwrap();
        assert_eq!(doc.get_array("/tags").map(Vec::len), Some(2));

        doc.set("/scalar", 1).unwrap();
        assert_eq!(
            doc.append("/scalar", 2),
            Err(DocumentError::NotAnArray("/scalar".to_string()))
        );
    }

    #[test]
    fn erase_removes_members() {
        let mut doc = Document::from(json!({"a": {"b": 1, "c": 2}, "l": [1, 2]}));
        assert_eq!(doc.erase("/a/b"), Ok(true));
        assert_eq!(doc.erase("/a/b"), Ok(false));
        assert_eq!(doc.erase("/l/0"), Ok(true));
        assert_eq!(doc.erase("/missing/x"), Ok(false));
        assert_eq!(doc.as_value(), &json!({"a": {"c": 2}, "l": [2]}));
    }

    #[test]
    fn merge_objects_overwrites_members() {
        let mut doc = Document::from(json!({"a": {"x": 1, "y": 2}}));
        let src = Document::from(json!({"y": 3, "z": 4}));
        doc.merge(&src, "/a").unwrap();
        assert_eq!(doc.as_value(), &json!({"a": {"x": 1, "y": 3, "z": 4}}));
    }

    #[test]
    fn merge_arrays_appends_missing_values() {
        let mut doc = Document::from(json!({"l": [1, 2]}));
        doc.merge(&Document::from(json!([2, 3])), "/l").unwrap();
        assert_eq!(doc.as_value(), &json!({"l": [1, 2, 3]}));
    }

    #[test]
    fn merge_rejects_mismatched_shapes() {
        let mut doc = Document::from(json!({"l": [1], "s": "a"}));
        assert_eq!(
            doc.merge(&Document::from(json!({"k": 1})), "/l"),
            Err(DocumentError::MergeTypeMismatch("/l".to_string()))
        );
        assert_eq!(
            doc.merge(&Document::from(json!("b")), "/s"),
            Err(DocumentError::NotMergeable("/s".to_string()))
        );
        assert_eq!(
            doc.merge(&Document::from(json!({})), "/missing"),
            Err(DocumentError::NotFound("/missing".to_string()))
        );
    }

    #[test]
    fn deep_merge_combines_nested_objects() {
        let mut doc = Document::from(json!({"src": {"ip": "1.1.1.1"}, "n": 1}));
        doc.deep_merge(Document::from(json!({"src": {"port": 80}, "n": 2})));
        assert_eq!(
            doc.as_value(),
            &json!({"src": {"ip": "1.1.1.1", "port": 80}, "n": 2})
        );
    }
}
