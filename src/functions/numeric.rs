use super::{expect_array, expect_number};
use crate::engine::TreeInterpreter;
use crate::error::JmesPathError;
use crate::types::Value;

pub fn fn_abs(_: &mut TreeInterpreter<'_>, args: &[Value]) -> Result<Value, JmesPathError> {
    let n = expect_number(args, 0, "abs")?;
    Ok(Value::Number(n.abs()))
}

pub fn fn_ceil(_: &mut TreeInterpreter<'_>, args: &[Value]) -> Result<Value, JmesPathError> {
    let n = expect_number(args, 0, "ceil")?;
    Ok(Value::Number(n.ceil()))
}

pub fn fn_floor(_: &mut TreeInterpreter<'_>, args: &[Value]) -> Result<Value, JmesPathError> {
    let n = expect_number(args, 0, "floor")?;
    Ok(Value::Number(n.floor()))
}

pub fn fn_sum(_: &mut TreeInterpreter<'_>, args: &[Value]) -> Result<Value, JmesPathError> {
    let items = expect_array(args, 0, "sum")?;
    let total: f64 = items.iter().filter_map(Value::as_number).sum();
    Ok(Value::Number(total))
}

pub fn fn_avg(_: &mut TreeInterpreter<'_>, args: &[Value]) -> Result<Value, JmesPathError> {
    let items = expect_array(args, 0, "avg")?;
    if items.is_empty() {
        return Ok(Value::Null);
    }
    let total: f64 = items.iter().filter_map(Value::as_number).sum();
    Ok(Value::Number(total / items.len() as f64))
}
