//! Normalization of host data into the engine's [`Value`] model.
//!
//! The interpreter is written exclusively against [`Value`]; this module is
//! the seam that lets callers hand in arbitrary host data instead. Anything
//! implementing [`serde::Serialize`] can be searched:
//!
//! - reference and pointer wrappers (`&T`, `Box<T>`, and with serde's `rc`
//!   feature `Rc<T>`/`Arc<T>`) are followed through arbitrary nesting until
//!   a concrete value is reached;
//! - struct fields become object keys, with `#[serde(rename = "…")]`
//!   overriding the name and `#[serde(skip)]` dropping the field;
//! - maps with string-like keys become objects, sequences become arrays.
//!
//! Cyclic host data cannot be expressed through `Serialize` without interior
//! mutability and is outside this contract; normalization itself never loops.

use serde::Serialize;

use crate::error::JmesPathError;
use crate::types::Value;

/// Normalizes a host value into the engine's value model.
pub fn to_value<T: Serialize + ?Sized>(data: &T) -> Result<Value, JmesPathError> {
    let json = serde_json::to_value(data)
        .map_err(|e| JmesPathError::invalid_value("search", e.to_string()))?;
    Ok(Value::from(json))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;
    use std::rc::Rc;
    use std::sync::Arc;

    #[derive(Serialize)]
    struct Person {
        #[serde(rename = "first")]
        first_name: String,
        last_name: String,
        #[serde(skip)]
        internal_id: u64,
    }

    #[test]
    fn test_struct_fields_honor_rename_and_skip() {
        let person = Person {
            first_name: "a".to_string(),
            last_name: "b".to_string(),
            internal_id: 42,
        };
        let value = to_value(&person).unwrap();
        let object = value.as_object().unwrap();
        assert_eq!(object.get("first"), Some(&Value::from("a")));
        assert_eq!(object.get("last_name"), Some(&Value::from("b")));
        assert!(!object.contains_key("internal_id"));
        assert!(!object.contains_key("first_name"));
    }

    #[test]
    fn test_pointer_chains_are_followed() {
        let inner = 10.0_f64;
        let chained = Arc::new(Box::new(Rc::new(&inner)));
        assert_eq!(to_value(&chained).unwrap(), Value::Number(10.0));
    }

    #[test]
    fn test_option_none_becomes_null() {
        let missing: Option<String> = None;
        assert_eq!(to_value(&missing).unwrap(), Value::Null);
    }

    #[test]
    fn test_nested_collections() {
        let rows = vec![vec![1.0_f64], vec![], vec![2.0, 3.0]];
        let value = to_value(&rows).unwrap();
        assert_eq!(
            value,
            Value::Array(vec![
                Value::Array(vec![Value::Number(1.0)]),
                Value::Array(vec![]),
                Value::Array(vec![Value::Number(2.0), Value::Number(3.0)]),
            ])
        );
    }
}
