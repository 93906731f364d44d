use super::expect_string;
use crate::engine::TreeInterpreter;
use crate::error::JmesPathError;
use crate::types::Value;

pub fn fn_starts_with(_: &mut TreeInterpreter<'_>, args: &[Value]) -> Result<Value, JmesPathError> {
    let subject = expect_string(args, 0, "starts_with")?;
    let prefix = expect_string(args, 1, "starts_with")?;
    Ok(Value::Bool(subject.starts_with(prefix)))
}

pub fn fn_ends_with(_: &mut TreeInterpreter<'_>, args: &[Value]) -> Result<Value, JmesPathError> {
    let subject = expect_string(args, 0, "ends_with")?;
    let suffix = expect_string(args, 1, "ends_with")?;
    Ok(Value::Bool(subject.ends_with(suffix)))
}

pub fn fn_lower(_: &mut TreeInterpreter<'_>, args: &[Value]) -> Result<Value, JmesPathError> {
    let subject = expect_string(args, 0, "lower")?;
    Ok(Value::String(subject.to_lowercase()))
}

pub fn fn_upper(_: &mut TreeInterpreter<'_>, args: &[Value]) -> Result<Value, JmesPathError> {
    let subject = expect_string(args, 0, "upper")?;
    Ok(Value::String(subject.to_uppercase()))
}

pub fn fn_join(_: &mut TreeInterpreter<'_>, args: &[Value]) -> Result<Value, JmesPathError> {
    let separator = expect_string(args, 0, "join")?;
    let items = args[1].as_array().ok_or_else(|| {
        JmesPathError::invalid_type("join", "expected array[string]")
    })?;
    let parts: Vec<&str> = items.iter().filter_map(Value::as_str).collect();
    Ok(Value::String(parts.join(separator)))
}

pub fn fn_find_first(_: &mut TreeInterpreter<'_>, args: &[Value]) -> Result<Value, JmesPathError> {
    find_impl("find_first", args, false)
}

pub fn fn_find_last(_: &mut TreeInterpreter<'_>, args: &[Value]) -> Result<Value, JmesPathError> {
    find_impl("find_last", args, true)
}

// Offsets are Unicode code points into the full subject; the optional
// bounds restrict the searched window without changing the offset base.
fn find_impl(name: &str, args: &[Value], last: bool) -> Result<Value, JmesPathError> {
    let subject = expect_string(args, 0, name)?;
    let needle = expect_string(args, 1, name)?;
    if subject.is_empty() || needle.is_empty() {
        return Ok(Value::Null);
    }

    let chars: Vec<char> = subject.chars().collect();
    let length = chars.len() as i64;
    let start = if args.len() > 2 {
        let bound = args[2]
            .as_integer()
            .ok_or_else(|| JmesPathError::not_an_integer(name, "start"))?;
        bound.max(0)
    } else {
        0
    };
    let end = if args.len() > 3 {
        let bound = args[3]
            .as_integer()
            .ok_or_else(|| JmesPathError::not_an_integer(name, "end"))?;
        bound.min(length)
    } else {
        length
    };
    if start >= end {
        return Ok(Value::Null);
    }

    let window = &chars[start as usize..end as usize];
    let needle: Vec<char> = needle.chars().collect();
    if needle.len() > window.len() {
        return Ok(Value::Null);
    }
    let positions = 0..=window.len() - needle.len();
    let matches = |i: usize| window[i..i + needle.len()] == needle[..];
    let found = if last {
        positions.rev().find(|&i| matches(i))
    } else {
        positions.clone().find(|&i| matches(i))
    };
    Ok(found
        .map(|offset| Value::Number((start + offset as i64) as f64))
        .unwrap_or(Value::Null))
}

pub fn fn_pad_left(_: &mut TreeInterpreter<'_>, args: &[Value]) -> Result<Value, JmesPathError> {
    pad_impl("pad_left", args, true)
}

pub fn fn_pad_right(_: &mut TreeInterpreter<'_>, args: &[Value]) -> Result<Value, JmesPathError> {
    pad_impl("pad_right", args, false)
}

fn pad_impl(name: &str, args: &[Value], left: bool) -> Result<Value, JmesPathError> {
    let subject = expect_string(args, 0, name)?;
    let width = args[1]
        .as_integer()
        .filter(|w| *w >= 0)
        .ok_or_else(|| JmesPathError::not_a_positive_integer(name, "width"))?;
    let pad = if args.len() > 2 {
        let pad = expect_string(args, 2, name)?;
        if pad.chars().count() != 1 {
            return Err(JmesPathError::invalid_value(
                name,
                "the 'pad' argument must be a string of length 1",
            ));
        }
        pad
    } else {
        " "
    };

    let missing = (width as usize).saturating_sub(subject.chars().count());
    let padding = pad.repeat(missing);
    let result = if left {
        format!("{}{}", padding, subject)
    } else {
        format!("{}{}", subject, padding)
    };
    Ok(Value::String(result))
}

pub fn fn_replace(_: &mut TreeInterpreter<'_>, args: &[Value]) -> Result<Value, JmesPathError> {
    let subject = expect_string(args, 0, "replace")?;
    let old = expect_string(args, 1, "replace")?;
    let new = expect_string(args, 2, "replace")?;
    let replaced = if args.len() > 3 {
        let count = args[3]
            .as_integer()
            .filter(|c| *c >= 0)
            .ok_or_else(|| JmesPathError::not_a_positive_integer("replace", "count"))?;
        subject.replacen(old, new, count as usize)
    } else {
        subject.replace(old, new)
    };
    Ok(Value::String(replaced))
}

pub fn fn_trim(_: &mut TreeInterpreter<'_>, args: &[Value]) -> Result<Value, JmesPathError> {
    trim_impl("trim", args, true, true)
}

pub fn fn_trim_left(_: &mut TreeInterpreter<'_>, args: &[Value]) -> Result<Value, JmesPathError> {
    trim_impl("trim_left", args, true, false)
}

pub fn fn_trim_right(_: &mut TreeInterpreter<'_>, args: &[Value]) -> Result<Value, JmesPathError> {
    trim_impl("trim_right", args, false, true)
}

// An absent or empty cutset trims Unicode whitespace.
fn trim_impl(
    name: &str,
    args: &[Value],
    from_start: bool,
    from_end: bool,
) -> Result<Value, JmesPathError> {
    let subject = expect_string(args, 0, name)?;
    let cutset = if args.len() > 1 {
        expect_string(args, 1, name)?
    } else {
        ""
    };

    let trimmed = if cutset.is_empty() {
        match (from_start, from_end) {
            (true, true) => subject.trim(),
            (true, false) => subject.trim_start(),
            _ => subject.trim_end(),
        }
    } else {
        let in_cutset = |c: char| cutset.contains(c);
        match (from_start, from_end) {
            (true, true) => subject.trim_matches(in_cutset),
            (true, false) => subject.trim_start_matches(in_cutset),
            _ => subject.trim_end_matches(in_cutset),
        }
    };
    Ok(Value::String(trimmed.to_string()))
}
