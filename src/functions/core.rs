use crate::engine::TreeInterpreter;
use crate::error::JmesPathError;
use crate::types::Value;

pub fn fn_not_null(_: &mut TreeInterpreter<'_>, args: &[Value]) -> Result<Value, JmesPathError> {
    Ok(args
        .iter()
        .find(|value| !value.is_null())
        .cloned()
        .unwrap_or(Value::Null))
}

pub fn fn_to_number(_: &mut TreeInterpreter<'_>, args: &[Value]) -> Result<Value, JmesPathError> {
    match &args[0] {
        Value::Number(n) => Ok(Value::Number(*n)),
        Value::String(s) => Ok(s
            .parse::<f64>()
            .map(Value::Number)
            .unwrap_or(Value::Null)),
        _ => Ok(Value::Null),
    }
}

pub fn fn_to_string(_: &mut TreeInterpreter<'_>, args: &[Value]) -> Result<Value, JmesPathError> {
    match &args[0] {
        Value::String(s) => Ok(Value::String(s.clone())),
        other => {
            let rendered = serde_json::to_string(other)
                .map_err(|e| JmesPathError::invalid_value("to_string", e.to_string()))?;
            Ok(Value::String(rendered))
        }
    }
}

pub fn fn_type(_: &mut TreeInterpreter<'_>, args: &[Value]) -> Result<Value, JmesPathError> {
    Ok(Value::from(args[0].type_name()))
}

/// `let(scope, &expr)` pushes the scope object as a new frame, evaluates
/// the expression reference with the scope as current, and pops the frame.
/// Field lookup falls back to open frames, so bindings shadow innermost
/// first.
pub fn fn_let(
    interpreter: &mut TreeInterpreter<'_>,
    args: &[Value],
) -> Result<Value, JmesPathError> {
    let frame = args[0]
        .as_object()
        .ok_or_else(|| {
            JmesPathError::invalid_type(
                "let",
                format!("expected object but received {}", args[0].type_name()),
            )
        })?
        .clone();
    let node = args[1].as_expref().cloned().ok_or_else(|| {
        JmesPathError::invalid_type(
            "let",
            format!("expected expref but received {}", args[1].type_name()),
        )
    })?;
    let scope_value = Value::Object(frame.clone());
    interpreter.scopes_mut().push_scope(frame);
    let result = interpreter.evaluate(&node, &scope_value);
    interpreter.scopes_mut().pop_scope();
    result
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
    fn test_not_null_returns_first_non_null() {
        assert_eq!(
            run("not_null(a, b, c)", json!({"b": null, "c": 3})),
            Value::Number(3.0)
        );
        assert_eq!(run("not_null(a, b)", json!({})), Value::Null);
    }

    #[test]
    fn test_to_number_conversions() {
        assert_eq!(run("to_number('1.5')", json!({})), Value::Number(1.5));
        assert_eq!(run("to_number(`2`)", json!({})), Value::Number(2.0));
        assert_eq!(run("to_number('abc')", json!({})), Value::Null);
        assert_eq!(run("to_number(`true`)", json!({})), Value::Null);
        assert_eq!(run("to_number(`[1]`)", json!({})), Value::Null);
    }

    #[test]
    fn test_to_string_passes_strings_and_serializes_the_rest() {
        assert_eq!(run("to_string('abc')", json!({})), Value::from("abc"));
        assert_eq!(
            run("to_string(`{\"a\": 1}`)", json!({})),
            Value::from("{\"a\":1}")
        );
        assert_eq!(run("to_string(`1.5`)", json!({})), Value::from("1.5"));
        assert_eq!(run("to_string(`null`)", json!({})), Value::from("null"));
    }

    #[test]
    fn test_type_names() {
        assert_eq!(run("type(`1`)", json!({})), Value::from("number"));
        assert_eq!(run("type('x')", json!({})), Value::from("string"));
        assert_eq!(run("type(`[]`)", json!({})), Value::from("array"));
        assert_eq!(run("type(`{}`)", json!({})), Value::from("object"));
        assert_eq!(run("type(`null`)", json!({})), Value::from("null"));
        assert_eq!(run("type(`false`)", json!({})), Value::from("boolean"));
    }

    #[test]
    fn test_let_binds_and_shadows() {
        assert_eq!(
            run("let(`{\"x\": 1}`, &x)", json!({})),
            Value::Number(1.0)
        );
        assert_eq!(
            run(
                "let(`{\"x\": 1, \"y\": 2}`, &let(`{\"x\": 10}`, &[x, y]))",
                json!({})
            ),
            Value::from(json!([10, 2]))
        );
    }

    #[test]
    fn test_let_scope_does_not_leak() {
        assert_eq!(
            search("[let(`{\"x\": 1}`, &x), x]", &json!({})).unwrap(),
            Value::from(json!([1, null]))
        );
    }
}
