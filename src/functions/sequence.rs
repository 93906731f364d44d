use std::cmp::Ordering;

use super::{expect_array, expression_evaluator};
use crate::engine::TreeInterpreter;
use crate::error::JmesPathError;
use crate::types::Value;

pub fn fn_contains(_: &mut TreeInterpreter<'_>, args: &[Value]) -> Result<Value, JmesPathError> {
    let needle = &args[1];
    let found = match &args[0] {
        Value::String(haystack) => match needle.as_str() {
            Some(sub) => haystack.contains(sub),
            None => false,
        },
        Value::Array(items) => items.contains(needle),
        other => {
            return Err(JmesPathError::invalid_type(
                "contains",
                format!("expected array|string but received {}", other.type_name()),
            ));
        }
    };
    Ok(Value::Bool(found))
}

pub fn fn_length(_: &mut TreeInterpreter<'_>, args: &[Value]) -> Result<Value, JmesPathError> {
    let length = match &args[0] {
        Value::String(s) => s.chars().count(),
        Value::Array(items) => items.len(),
        Value::Object(entries) => entries.len(),
        other => {
            return Err(JmesPathError::invalid_type(
                "length",
                format!(
                    "expected string|array|object but received {}",
                    other.type_name()
                ),
            ));
        }
    };
    Ok(Value::Number(length as f64))
}

/// Applies the expression to every element. A non-match becomes `null` in
/// that position; real errors propagate.
pub fn fn_map(
    interpreter: &mut TreeInterpreter<'_>,
    args: &[Value],
) -> Result<Value, JmesPathError> {
    let items = expect_array(args, 1, "map")?.clone();
    let mut apply = expression_evaluator(interpreter, &args[0])?;
    let mut mapped = Vec::with_capacity(items.len());
    for item in &items {
        match apply(item) {
            Ok(value) => mapped.push(value),
            Err(JmesPathError::NotFound) => mapped.push(Value::Null),
            Err(error) => return Err(error),
        }
    }
    Ok(Value::Array(mapped))
}

pub fn fn_max(_: &mut TreeInterpreter<'_>, args: &[Value]) -> Result<Value, JmesPathError> {
    extremum("max", args, Ordering::Greater)
}

pub fn fn_min(_: &mut TreeInterpreter<'_>, args: &[Value]) -> Result<Value, JmesPathError> {
    extremum("min", args, Ordering::Less)
}

// The signature guarantees a uniform array of numbers or of strings.
fn extremum(name: &str, args: &[Value], keep: Ordering) -> Result<Value, JmesPathError> {
    let items = expect_array(args, 0, name)?;
    let mut best: Option<&Value> = None;
    for item in items {
        let better = match best {
            None => true,
            Some(current) => compare_same_type(item, current) == Some(keep),
        };
        if better {
            best = Some(item);
        }
    }
    Ok(best.cloned().unwrap_or(Value::Null))
}

fn compare_same_type(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => Some(x.total_cmp(y)),
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

pub fn fn_max_by(
    interpreter: &mut TreeInterpreter<'_>,
    args: &[Value],
) -> Result<Value, JmesPathError> {
    by_extremum("max_by", interpreter, args, Ordering::Greater)
}

pub fn fn_min_by(
    interpreter: &mut TreeInterpreter<'_>,
    args: &[Value],
) -> Result<Value, JmesPathError> {
    by_extremum("min_by", interpreter, args, Ordering::Less)
}

fn by_extremum(
    name: &str,
    interpreter: &mut TreeInterpreter<'_>,
    args: &[Value],
    keep: Ordering,
) -> Result<Value, JmesPathError> {
    let items = expect_array(args, 0, name)?.clone();
    let keyed = keyed_items(name, interpreter, &args[1], items)?;
    let mut best: Option<(SortKey, Value)> = None;
    for (key, item) in keyed {
        let better = match &best {
            None => true,
            Some((current, _)) => key.compare(current) == keep,
        };
        if better {
            best = Some((key, item));
        }
    }
    Ok(best.map(|(_, item)| item).unwrap_or(Value::Null))
}

pub fn fn_reverse(_: &mut TreeInterpreter<'_>, args: &[Value]) -> Result<Value, JmesPathError> {
    match &args[0] {
        Value::String(s) => Ok(Value::String(s.chars().rev().collect())),
        Value::Array(items) => Ok(Value::Array(items.iter().rev().cloned().collect())),
        other => Err(JmesPathError::invalid_type(
            "reverse",
            format!("expected array|string but received {}", other.type_name()),
        )),
    }
}

pub fn fn_sort(_: &mut TreeInterpreter<'_>, args: &[Value]) -> Result<Value, JmesPathError> {
    let mut items = expect_array(args, 0, "sort")?.clone();
    items.sort_by(|a, b| compare_same_type(a, b).unwrap_or(Ordering::Equal));
    Ok(Value::Array(items))
}

/// Stable sort by the expression's key, which must be uniformly numeric or
/// uniformly string across all elements.
pub fn fn_sort_by(
    interpreter: &mut TreeInterpreter<'_>,
    args: &[Value],
) -> Result<Value, JmesPathError> {
    let items = expect_array(args, 0, "sort_by")?.clone();
    let mut keyed = keyed_items("sort_by", interpreter, &args[1], items)?;
    keyed.sort_by(|(a, _), (b, _)| a.compare(b));
    Ok(Value::Array(keyed.into_iter().map(|(_, item)| item).collect()))
}

pub fn fn_to_array(_: &mut TreeInterpreter<'_>, args: &[Value]) -> Result<Value, JmesPathError> {
    match &args[0] {
        Value::Array(_) => Ok(args[0].clone()),
        other => Ok(Value::Array(vec![other.clone()])),
    }
}

enum SortKey {
    Number(f64),
    String(String),
}

impl SortKey {
    fn compare(&self, other: &SortKey) -> Ordering {
        match (self, other) {
            (SortKey::Number(a), SortKey::Number(b)) => a.total_cmp(b),
            (SortKey::String(a), SortKey::String(b)) => a.cmp(b),
            // keyed_items enforces uniformity, so mixed keys cannot occur.
            (SortKey::Number(_), SortKey::String(_)) => Ordering::Less,
            (SortKey::String(_), SortKey::Number(_)) => Ordering::Greater,
        }
    }
}

// Evaluates the key expression against every element, requiring every key
// to share the type of the first.
fn keyed_items(
    name: &str,
    interpreter: &mut TreeInterpreter<'_>,
    expref: &Value,
    items: Vec<Value>,
) -> Result<Vec<(SortKey, Value)>, JmesPathError> {
    let mut apply = expression_evaluator(interpreter, expref)?;
    let mut keyed = Vec::with_capacity(items.len());
    let mut expect_string_key: Option<bool> = None;
    for item in items {
        let key = match apply(&item)? {
            Value::Number(n) => {
                if expect_string_key == Some(true) {
                    return Err(key_type_error(name, "number"));
                }
                expect_string_key = Some(false);
                SortKey::Number(n)
            }
            Value::String(s) => {
                if expect_string_key == Some(false) {
                    return Err(key_type_error(name, "string"));
                }
                expect_string_key = Some(true);
                SortKey::String(s)
            }
            other => return Err(key_type_error(name, other.type_name())),
        };
        keyed.push((key, item));
    }
    Ok(keyed)
}

fn key_type_error(name: &str, received: &str) -> JmesPathError {
    JmesPathError::invalid_type(
        name,
        format!(
            "the expression must consistently return a number or string, received {}",
            received
        ),
    )
}

#[cfg(test)]
mod tests {
    use crate::search;
    use crate::types::Value;
    use serde_json::json;

    fn run(expression: &str, data: serde_json::Value) -> Value {
        search(expression, &data).unwrap()
    }

    #[test]
    fn test_contains_string_and_array() {
        assert_eq!(run("contains('foobar', 'oba')", json!({})), Value::Bool(true));
        assert_eq!(run("contains('foobar', `3`)", json!({})), Value::Bool(false));
        assert_eq!(
            run("contains(`[1, [2]]`, `[2]`)", json!({})),
            Value::Bool(true)
        );
        assert_eq!(
            run("contains(`[1, 2]`, `3`)", json!({})),
            Value::Bool(false)
        );
    }

    #[test]
    fn test_length_counts_code_points_elements_and_keys() {
        assert_eq!(run("length('héllo')", json!({})), Value::Number(5.0));
        assert_eq!(run("length(`[1, 2, 3]`)", json!({})), Value::Number(3.0));
        assert_eq!(run("length(@)", json!({"a": 1, "b": 2})), Value::Number(2.0));
    }

    #[test]
    fn test_map_keeps_non_matches_as_null() {
        let data = json!({"people": [{"c": "z"}, {}, {"c": null}]});
        assert_eq!(
            run("map(&c, people)", data),
            Value::from(json!(["z", null, null]))
        );
    }

    #[test]
    fn test_max_min_over_numbers_and_strings() {
        assert_eq!(run("max(`[2, 9, 4]`)", json!({})), Value::Number(9.0));
        assert_eq!(run("min(`[2, 9, 4]`)", json!({})), Value::Number(2.0));
        assert_eq!(run("max(`[\"a\", \"c\", \"b\"]`)", json!({})), Value::from("c"));
        assert_eq!(run("max(`[]`)", json!({})), Value::Null);
    }

    #[test]
    fn test_max_by_and_min_by() {
        let data = json!({"people": [{"age": 30}, {"age": 50}, {"age": 40}]});
        assert_eq!(
            run("max_by(people, &age)", data.clone()),
            Value::from(json!({"age": 50}))
        );
        assert_eq!(
            run("min_by(people, &age)", data),
            Value::from(json!({"age": 30}))
        );
    }

    #[test]
    fn test_max_by_rejects_mixed_key_types() {
        let data = json!({"people": [{"age": 30}, {"age": "x"}]});
        assert!(search("max_by(people, &age)", &data).is_err());
    }

    #[test]
    fn test_reverse_array_and_string() {
        assert_eq!(
            run("reverse(`[1, 2, 3]`)", json!({})),
            Value::from(json!([3, 2, 1]))
        );
        assert_eq!(run("reverse('abc')", json!({})), Value::from("cba"));
    }

    #[test]
    fn test_sort_is_stable_and_typed() {
        assert_eq!(
            run("sort(`[3, 1, 2]`)", json!({})),
            Value::from(json!([1, 2, 3]))
        );
        assert_eq!(
            run("sort(`[\"b\", \"a\"]`)", json!({})),
            Value::from(json!(["a", "b"]))
        );
        assert!(search("sort(`[1, \"a\"]`)", &json!({})).is_err());
    }

    #[test]
    fn test_sort_by_preserves_order_of_equal_keys() {
        let data = json!({"rows": [
            {"k": 1, "tag": "first"},
            {"k": 0, "tag": "x"},
            {"k": 1, "tag": "second"},
        ]});
        assert_eq!(
            run("sort_by(rows, &k)[*].tag", data),
            Value::from(json!(["x", "first", "second"]))
        );
    }

    #[test]
    fn test_to_array_wraps_scalars() {
        assert_eq!(
            run("to_array(`1`)", json!({})),
            Value::from(json!([1]))
        );
        assert_eq!(
            run("to_array(`[1]`)", json!({})),
            Value::from(json!([1]))
        );
    }
}
