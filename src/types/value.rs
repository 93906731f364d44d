//! The JSON-like value model the interpreter operates on.

use std::sync::Arc;

use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

use crate::ast::Node;

/// Object values preserve insertion order, so multi-select hashes come out
/// in source order and `keys`/`values` iterate deterministically.
pub type Map = IndexMap<String, Value>;

/// A JSON-like value. All numbers are IEEE-754 doubles.
///
/// `Expref` is internal: it carries an unevaluated expression into a
/// function call (`sort_by`, `map`, …) and never appears in search results.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Array(Vec<Value>),
    Object(Map),
    Expref(Arc<Node>),
}

impl Value {
    /// Truthiness: `null`, `false`, empty string, empty array and empty
    /// object are falsy; everything else is truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::String(s) => !s.is_empty(),
            Value::Array(a) => !a.is_empty(),
            Value::Object(o) => !o.is_empty(),
            Value::Number(_) | Value::Expref(_) => true,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
            Value::Expref(_) => "expref",
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Vec<Value>> {
        match self {
            Value::Array(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Map> {
        match self {
            Value::Object(o) => Some(o),
            _ => None,
        }
    }

    pub fn as_expref(&self) -> Option<&Arc<Node>> {
        match self {
            Value::Expref(node) => Some(node),
            _ => None,
        }
    }

    /// The value as an integer, provided it is a finite number equal to its
    /// integer truncation. Indexing, slicing, padding widths and find
    /// offsets all require this.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Number(n) if n.is_finite() && n.trunc() == *n => Some(*n as i64),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(items)
    }
}

impl From<Map> for Value {
    fn from(map: Map) -> Self {
        Value::Object(map)
    }
}

// Whole numbers inside f64's exactly-representable integer range render as
// integer literals; everything else keeps its float form.
fn as_exact_int(n: f64) -> Option<i64> {
    (n.is_finite() && n.fract() == 0.0 && n.abs() < 9_007_199_254_740_992.0).then_some(n as i64)
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::Array(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(entries) => Value::Object(
                entries
                    .into_iter()
                    .map(|(k, v)| (k, Value::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<Value> for serde_json::Value {
    fn from(v: Value) -> Self {
        match v {
            Value::Null | Value::Expref(_) => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(b),
            Value::Number(n) => match as_exact_int(n) {
                Some(i) => serde_json::Value::Number(serde_json::Number::from(i)),
                None => serde_json::Number::from_f64(n)
                    .map(serde_json::Value::Number)
                    .unwrap_or(serde_json::Value::Null),
            },
            Value::String(s) => serde_json::Value::String(s),
            Value::Array(items) => {
                serde_json::Value::Array(items.into_iter().map(serde_json::Value::from).collect())
            }
            Value::Object(entries) => serde_json::Value::Object(
                entries
                    .into_iter()
                    .map(|(k, v)| (k, serde_json::Value::from(v)))
                    .collect(),
            ),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null | Value::Expref(_) => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Number(n) => match as_exact_int(*n) {
                Some(i) => serializer.serialize_i64(i),
                None => serializer.serialize_f64(*n),
            },
            Value::String(s) => serializer.serialize_str(s),
            Value::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Object(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (key, value) in entries {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_truthiness() {
        assert!(!Value::Null.is_truthy());
        assert!(!Value::Bool(false).is_truthy());
        assert!(!Value::String(String::new()).is_truthy());
        assert!(!Value::Array(vec![]).is_truthy());
        assert!(!Value::Object(Map::new()).is_truthy());

        assert!(Value::Bool(true).is_truthy());
        assert!(Value::Number(0.0).is_truthy());
        assert!(Value::from("x").is_truthy());
        assert!(Value::Array(vec![Value::Null]).is_truthy());
    }

    #[test]
    fn test_object_equality_ignores_insertion_order() {
        let a = Value::from(json!({"x": 1, "y": [2, 3]}));
        let mut entries = Map::new();
        entries.insert("y".to_string(), Value::from(json!([2, 3])));
        entries.insert("x".to_string(), Value::Number(1.0));
        assert_eq!(a, Value::Object(entries));
    }

    #[test]
    fn test_number_equality_is_exact() {
        assert_eq!(Value::Number(1.0), Value::Number(1.0));
        assert_ne!(Value::Number(1.0), Value::Number(1.0 + f64::EPSILON));
    }

    #[test]
    fn test_as_integer_rejects_fractions_and_non_finite() {
        assert_eq!(Value::Number(3.0).as_integer(), Some(3));
        assert_eq!(Value::Number(-2.0).as_integer(), Some(-2));
        assert_eq!(Value::Number(2.5).as_integer(), None);
        assert_eq!(Value::Number(f64::INFINITY).as_integer(), None);
        assert_eq!(Value::from("3").as_integer(), None);
    }

    #[test]
    fn test_json_round_trip_preserves_structure() {
        let source = json!({"a": [1, "two", null, {"b": false}]});
        let value = Value::from(source.clone());
        assert_eq!(serde_json::Value::from(value), source);
    }

    #[test]
    fn test_whole_numbers_convert_back_to_integer_literals() {
        assert_eq!(serde_json::Value::from(Value::Number(1.0)), json!(1));
        assert_eq!(serde_json::Value::from(Value::Number(-3.0)), json!(-3));
        assert_eq!(serde_json::Value::from(Value::Number(1.5)), json!(1.5));
    }

    #[test]
    fn test_serialize_matches_serde_json() {
        let value = Value::from(json!({"a": [1.5, true], "b": null}));
        let text = serde_json::to_string(&value).unwrap();
        assert_eq!(text, r#"{"a":[1.5,true],"b":null}"#);

        let value = Value::from(json!({"n": 2.0}));
        assert_eq!(serde_json::to_string(&value).unwrap(), r#"{"n":2}"#);
    }
}
