use crate::engine::TreeInterpreter;
use crate::error::JmesPathError;
use crate::types::{Map, Value};

fn expect_object<'v>(
    args: &'v [Value],
    index: usize,
    function: &str,
) -> Result<&'v Map, JmesPathError> {
    args[index].as_object().ok_or_else(|| {
        JmesPathError::invalid_type(
            function,
            format!("expected object but received {}", args[index].type_name()),
        )
    })
}

pub fn fn_keys(_: &mut TreeInterpreter<'_>, args: &[Value]) -> Result<Value, JmesPathError> {
    let entries = expect_object(args, 0, "keys")?;
    Ok(Value::Array(
        entries.keys().cloned().map(Value::String).collect(),
    ))
}

pub fn fn_values(_: &mut TreeInterpreter<'_>, args: &[Value]) -> Result<Value, JmesPathError> {
    let entries = expect_object(args, 0, "values")?;
    Ok(Value::Array(entries.values().cloned().collect()))
}

/// Merges objects left to right; keys from later arguments win.
pub fn fn_merge(_: &mut TreeInterpreter<'_>, args: &[Value]) -> Result<Value, JmesPathError> {
    let mut merged = Map::new();
    for argument in args {
        let entries = argument.as_object().ok_or_else(|| {
            JmesPathError::invalid_type(
                "merge",
                format!("expected object but received {}", argument.type_name()),
            )
        })?;
        for (key, value) in entries {
            merged.insert(key.clone(), value.clone());
        }
    }
    Ok(Value::Object(merged))
}

#[cfg(test)]
mod tests {
    use crate::search;
    use crate::types::Value;
    use serde_json::json;

    #[test]
    fn test_keys_and_values_iterate_in_step() {
        let data = json!({"b": 2, "a": 1});
        let keys = search("keys(@)", &data).unwrap();
        let values = search("values(@)", &data).unwrap();
        assert_eq!(keys, Value::from(json!(["b", "a"])));
        assert_eq!(values, Value::from(json!([2, 1])));
    }

    #[test]
    fn test_merge_later_keys_win() {
        let data = json!({});
        let result = search("merge(`{\"a\": 1, \"b\": 2}`, `{\"b\": 3}`)", &data).unwrap();
        assert_eq!(result, Value::from(json!({"a": 1, "b": 3})));
    }

    #[test]
    fn test_merge_requires_objects() {
        assert!(search("merge(`{}`, `1`)", &json!({})).is_err());
    }
}
