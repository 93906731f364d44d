//! Built-in function library and user-function registration.
//!
//! Every function carries a declarative signature: an ordered list of
//! [`ArgSpec`]s naming the allowed types per position, with optional and
//! trailing-variadic markers. The dispatcher resolves arity and checks
//! types before a handler runs, so handlers can assume their inputs.

mod core;
mod numeric;
mod object;
mod sequence;
mod string;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::engine::TreeInterpreter;
use crate::error::JmesPathError;
use crate::types::Value;

/// The allowed-type vocabulary for function signatures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgType {
    Number,
    String,
    Array,
    Object,
    ArrayNumber,
    ArrayString,
    Expref,
    Any,
}

impl fmt::Display for ArgType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ArgType::Number => "number",
            ArgType::String => "string",
            ArgType::Array => "array",
            ArgType::Object => "object",
            ArgType::ArrayNumber => "array[number]",
            ArgType::ArrayString => "array[string]",
            ArgType::Expref => "expref",
            ArgType::Any => "any",
        };
        f.write_str(name)
    }
}

impl ArgType {
    fn parse(text: &str) -> Option<Self> {
        match text {
            "number" => Some(ArgType::Number),
            "string" => Some(ArgType::String),
            "array" => Some(ArgType::Array),
            "object" => Some(ArgType::Object),
            "array[number]" => Some(ArgType::ArrayNumber),
            "array[string]" => Some(ArgType::ArrayString),
            "expref" => Some(ArgType::Expref),
            "any" => Some(ArgType::Any),
            _ => None,
        }
    }

    fn matches(&self, value: &Value) -> bool {
        match self {
            ArgType::Number => matches!(value, Value::Number(_)),
            ArgType::String => matches!(value, Value::String(_)),
            ArgType::Array => matches!(value, Value::Array(_)),
            ArgType::Object => matches!(value, Value::Object(_)),
            ArgType::ArrayNumber => match value {
                Value::Array(items) => items.iter().all(|v| matches!(v, Value::Number(_))),
                _ => false,
            },
            ArgType::ArrayString => match value {
                Value::Array(items) => items.iter().all(|v| matches!(v, Value::String(_))),
                _ => false,
            },
            ArgType::Expref => matches!(value, Value::Expref(_)),
            ArgType::Any => true,
        }
    }
}

/// One argument position of a function signature.
#[derive(Debug, Clone)]
pub struct ArgSpec {
    pub types: Vec<ArgType>,
    pub variadic: bool,
    pub optional: bool,
}

impl ArgSpec {
    pub fn required(types: &[ArgType]) -> Self {
        Self {
            types: types.to_vec(),
            variadic: false,
            optional: false,
        }
    }

    pub fn optional(types: &[ArgType]) -> Self {
        Self {
            types: types.to_vec(),
            variadic: false,
            optional: true,
        }
    }

    pub fn variadic(types: &[ArgType]) -> Self {
        Self {
            types: types.to_vec(),
            variadic: true,
            optional: false,
        }
    }

    fn type_check(&self, value: &Value, function: &str) -> Result<(), JmesPathError> {
        if self.types.iter().any(|t| t.matches(value)) {
            return Ok(());
        }
        let expected: Vec<_> = self.types.iter().map(ArgType::to_string).collect();
        Err(JmesPathError::invalid_type(
            function,
            format!(
                "expected {} but received {}",
                expected.join("|"),
                value.type_name()
            ),
        ))
    }
}

pub type FunctionHandler =
    Arc<dyn Fn(&mut TreeInterpreter<'_>, &[Value]) -> Result<Value, JmesPathError> + Send + Sync>;

pub struct FunctionEntry {
    name: String,
    signature: Vec<ArgSpec>,
    handler: FunctionHandler,
}

fn pluralize(count: usize) -> &'static str {
    if count == 1 { "" } else { "s" }
}

impl FunctionEntry {
    pub fn new<F>(name: impl Into<String>, signature: Vec<ArgSpec>, handler: F) -> Self
    where
        F: Fn(&mut TreeInterpreter<'_>, &[Value]) -> Result<Value, JmesPathError>
            + Send
            + Sync
            + 'static,
    {
        Self {
            name: name.into(),
            signature,
            handler: Arc::new(handler),
        }
    }

    fn is_variadic(&self) -> bool {
        self.signature.iter().any(|spec| spec.variadic)
    }

    fn min_expected(&self) -> usize {
        self.signature.iter().filter(|spec| !spec.optional).count()
    }

    /// Arity and type resolution per the declared signature.
    fn resolve_args(&self, args: &[Value]) -> Result<(), JmesPathError> {
        if self.signature.is_empty() {
            return Ok(());
        }
        let variadic = self.is_variadic();
        let min_expected = self.min_expected();
        let max_expected = (!variadic).then_some(self.signature.len());

        if args.len() < min_expected {
            let expected = if variadic || max_expected != Some(min_expected) {
                format!("at least {} argument{}", min_expected, pluralize(min_expected))
            } else {
                format!("exactly {} argument{}", min_expected, pluralize(min_expected))
            };
            return Err(JmesPathError::InvalidArity {
                function: self.name.clone(),
                expected,
                received: args.len(),
            });
        }
        if let Some(max) = max_expected {
            if args.len() > max {
                let expected = if max == min_expected {
                    format!("exactly {} argument{}", max, pluralize(max))
                } else {
                    format!("at most {} argument{}", max, pluralize(max))
                };
                return Err(JmesPathError::InvalidArity {
                    function: self.name.clone(),
                    expected,
                    received: args.len(),
                });
            }
        }

        for (index, spec) in self.signature.iter().enumerate() {
            if index < args.len() {
                spec.type_check(&args[index], &self.name)?;
            }
        }
        if let Some(last) = self.signature.last() {
            if last.variadic {
                for value in args.iter().skip(self.signature.len()) {
                    last.type_check(value, &self.name)?;
                }
            }
        }
        Ok(())
    }
}

/// The function lookup table of a compiled query. Built-ins and
/// user-registered functions share it; a later registration under an
/// existing name replaces the earlier one.
pub struct FunctionRegistry {
    table: HashMap<String, FunctionEntry>,
}

impl FunctionRegistry {
    pub fn with_builtins() -> Self {
        let mut registry = Self {
            table: HashMap::new(),
        };
        for entry in builtin_entries() {
            registry.register(entry);
        }
        registry
    }

    pub fn register(&mut self, entry: FunctionEntry) {
        self.table.insert(entry.name.clone(), entry);
    }

    /// Registers a handler from a signature string of the form
    /// `type1|type2,type3` (`,` separates positions, `|` separates
    /// alternatives). With `variadic` set, the last position accepts any
    /// number of trailing arguments.
    pub fn register_with_signature<F>(
        &mut self,
        name: &str,
        signature: &str,
        variadic: bool,
        handler: F,
    ) -> Result<(), JmesPathError>
    where
        F: Fn(&mut TreeInterpreter<'_>, &[Value]) -> Result<Value, JmesPathError>
            + Send
            + Sync
            + 'static,
    {
        let mut specs = Vec::new();
        for position in signature.split(',') {
            let mut types = Vec::new();
            for alternative in position.split('|') {
                let parsed = ArgType::parse(alternative.trim()).ok_or_else(|| {
                    JmesPathError::invalid_value(
                        name,
                        format!("unknown argument type: {}", alternative),
                    )
                })?;
                types.push(parsed);
            }
            specs.push(ArgSpec::required(&types));
        }
        if variadic {
            match specs.last_mut() {
                Some(last) => last.variadic = true,
                None => {
                    return Err(JmesPathError::invalid_value(
                        name,
                        "variadic functions require at least one argument",
                    ));
                }
            }
        }
        self.register(FunctionEntry::new(name, specs, handler));
        Ok(())
    }

    pub fn call(
        &self,
        name: &str,
        args: Vec<Value>,
        interpreter: &mut TreeInterpreter<'_>,
    ) -> Result<Value, JmesPathError> {
        let entry = self
            .table
            .get(name)
            .ok_or_else(|| JmesPathError::unknown_function(name))?;
        entry.resolve_args(&args)?;
        let handler = Arc::clone(&entry.handler);
        handler.as_ref()(interpreter, &args)
    }
}

/// Builds a closure evaluating the expression captured by an expref value.
/// Handlers use this to apply `&expr` arguments to values.
pub fn expression_evaluator<'i, 'a>(
    interpreter: &'i mut TreeInterpreter<'a>,
    expref: &Value,
) -> Result<impl FnMut(&Value) -> Result<Value, JmesPathError> + 'i, JmesPathError> {
    let node = expref
        .as_expref()
        .cloned()
        .ok_or_else(|| JmesPathError::invalid_type("expression evaluator", "expected expref"))?;
    Ok(move |value: &Value| interpreter.evaluate(&node, value))
}

// Typed accessors for handler bodies. The dispatcher has already checked
// declared positions, so a mismatch here means an optional argument was
// supplied with the wrong shape.
pub(crate) fn expect_number(
    args: &[Value],
    index: usize,
    function: &str,
) -> Result<f64, JmesPathError> {
    args[index].as_number().ok_or_else(|| {
        JmesPathError::invalid_type(
            function,
            format!("expected number but received {}", args[index].type_name()),
        )
    })
}

pub(crate) fn expect_string<'v>(
    args: &'v [Value],
    index: usize,
    function: &str,
) -> Result<&'v str, JmesPathError> {
    args[index].as_str().ok_or_else(|| {
        JmesPathError::invalid_type(
            function,
            format!("expected string but received {}", args[index].type_name()),
        )
    })
}

pub(crate) fn expect_array<'v>(
    args: &'v [Value],
    index: usize,
    function: &str,
) -> Result<&'v Vec<Value>, JmesPathError> {
    args[index].as_array().ok_or_else(|| {
        JmesPathError::invalid_type(
            function,
            format!("expected array but received {}", args[index].type_name()),
        )
    })
}

fn builtin_entries() -> Vec<FunctionEntry> {
    use ArgType::*;
    vec![
        FunctionEntry::new("abs", vec![ArgSpec::required(&[Number])], numeric::fn_abs),
        FunctionEntry::new(
            "avg",
            vec![ArgSpec::required(&[ArrayNumber])],
            numeric::fn_avg,
        ),
        FunctionEntry::new("ceil", vec![ArgSpec::required(&[Number])], numeric::fn_ceil),
        FunctionEntry::new(
            "contains",
            vec![
                ArgSpec::required(&[Array, String]),
                ArgSpec::required(&[Any]),
            ],
            sequence::fn_contains,
        ),
        FunctionEntry::new(
            "ends_with",
            vec![ArgSpec::required(&[String]), ArgSpec::required(&[String])],
            string::fn_ends_with,
        ),
        FunctionEntry::new(
            "find_first",
            vec![
                ArgSpec::required(&[String]),
                ArgSpec::required(&[String]),
                ArgSpec::optional(&[Number]),
                ArgSpec::optional(&[Number]),
            ],
            string::fn_find_first,
        ),
        FunctionEntry::new(
            "find_last",
            vec![
                ArgSpec::required(&[String]),
                ArgSpec::required(&[String]),
                ArgSpec::optional(&[Number]),
                ArgSpec::optional(&[Number]),
            ],
            string::fn_find_last,
        ),
        FunctionEntry::new(
            "floor",
            vec![ArgSpec::required(&[Number])],
            numeric::fn_floor,
        ),
        FunctionEntry::new(
            "join",
            vec![
                ArgSpec::required(&[String]),
                ArgSpec::required(&[ArrayString]),
            ],
            string::fn_join,
        ),
        FunctionEntry::new("keys", vec![ArgSpec::required(&[Object])], object::fn_keys),
        FunctionEntry::new(
            "length",
            vec![ArgSpec::required(&[String, Array, Object])],
            sequence::fn_length,
        ),
        FunctionEntry::new(
            "let",
            vec![ArgSpec::required(&[Object]), ArgSpec::required(&[Expref])],
            core::fn_let,
        ),
        FunctionEntry::new(
            "lower",
            vec![ArgSpec::required(&[String])],
            string::fn_lower,
        ),
        FunctionEntry::new(
            "map",
            vec![ArgSpec::required(&[Expref]), ArgSpec::required(&[Array])],
            sequence::fn_map,
        ),
        FunctionEntry::new(
            "max",
            vec![ArgSpec::required(&[ArrayNumber, ArrayString])],
            sequence::fn_max,
        ),
        FunctionEntry::new(
            "max_by",
            vec![ArgSpec::required(&[Array]), ArgSpec::required(&[Expref])],
            sequence::fn_max_by,
        ),
        FunctionEntry::new(
            "merge",
            vec![ArgSpec::variadic(&[Object])],
            object::fn_merge,
        ),
        FunctionEntry::new(
            "min",
            vec![ArgSpec::required(&[ArrayNumber, ArrayString])],
            sequence::fn_min,
        ),
        FunctionEntry::new(
            "min_by",
            vec![ArgSpec::required(&[Array]), ArgSpec::required(&[Expref])],
            sequence::fn_min_by,
        ),
        FunctionEntry::new(
            "not_null",
            vec![ArgSpec::variadic(&[Any])],
            core::fn_not_null,
        ),
        FunctionEntry::new(
            "pad_left",
            vec![
                ArgSpec::required(&[String]),
                ArgSpec::required(&[Number]),
                ArgSpec::optional(&[String]),
            ],
            string::fn_pad_left,
        ),
        FunctionEntry::new(
            "pad_right",
            vec![
                ArgSpec::required(&[String]),
                ArgSpec::required(&[Number]),
                ArgSpec::optional(&[String]),
            ],
            string::fn_pad_right,
        ),
        FunctionEntry::new(
            "replace",
            vec![
                ArgSpec::required(&[String]),
                ArgSpec::required(&[String]),
                ArgSpec::required(&[String]),
                ArgSpec::optional(&[Number]),
            ],
            string::fn_replace,
        ),
        FunctionEntry::new(
            "reverse",
            vec![ArgSpec::required(&[Array, String])],
            sequence::fn_reverse,
        ),
        FunctionEntry::new(
            "sort",
            vec![ArgSpec::required(&[ArrayNumber, ArrayString])],
            sequence::fn_sort,
        ),
        FunctionEntry::new(
            "sort_by",
            vec![ArgSpec::required(&[Array]), ArgSpec::required(&[Expref])],
            sequence::fn_sort_by,
        ),
        FunctionEntry::new(
            "starts_with",
            vec![ArgSpec::required(&[String]), ArgSpec::required(&[String])],
            string::fn_starts_with,
        ),
        FunctionEntry::new(
            "sum",
            vec![ArgSpec::required(&[ArrayNumber])],
            numeric::fn_sum,
        ),
        FunctionEntry::new(
            "to_array",
            vec![ArgSpec::required(&[Any])],
            sequence::fn_to_array,
        ),
        FunctionEntry::new(
            "to_number",
            vec![ArgSpec::required(&[Any])],
            core::fn_to_number,
        ),
        FunctionEntry::new(
            "to_string",
            vec![ArgSpec::required(&[Any])],
            core::fn_to_string,
        ),
        FunctionEntry::new(
            "trim",
            vec![ArgSpec::required(&[String]), ArgSpec::optional(&[String])],
            string::fn_trim,
        ),
        FunctionEntry::new(
            "trim_left",
            vec![ArgSpec::required(&[String]), ArgSpec::optional(&[String])],
            string::fn_trim_left,
        ),
        FunctionEntry::new(
            "trim_right",
            vec![ArgSpec::required(&[String]), ArgSpec::optional(&[String])],
            string::fn_trim_right,
        ),
        FunctionEntry::new("type", vec![ArgSpec::required(&[Any])], core::fn_type),
        FunctionEntry::new(
            "upper",
            vec![ArgSpec::required(&[String])],
            string::fn_upper,
        ),
        FunctionEntry::new(
            "values",
            vec![ArgSpec::required(&[Object])],
            object::fn_values,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(specs: Vec<ArgSpec>) -> FunctionEntry {
        FunctionEntry::new("probe", specs, |_, _| Ok(Value::Null))
    }

    #[test]
    fn test_arity_exactly() {
        let e = entry(vec![ArgSpec::required(&[ArgType::Any])]);
        assert!(e.resolve_args(&[Value::Null]).is_ok());
        let err = e.resolve_args(&[]).unwrap_err();
        match err {
            JmesPathError::InvalidArity { expected, .. } => {
                assert_eq!(expected, "exactly 1 argument");
            }
            _ => panic!("expected InvalidArity"),
        }
        let err = e.resolve_args(&[Value::Null, Value::Null]).unwrap_err();
        match err {
            JmesPathError::InvalidArity { expected, .. } => {
                assert_eq!(expected, "exactly 1 argument");
            }
            _ => panic!("expected InvalidArity"),
        }
    }

    #[test]
    fn test_arity_at_least_for_variadic() {
        let e = entry(vec![ArgSpec::variadic(&[ArgType::Object])]);
        let err = e.resolve_args(&[]).unwrap_err();
        match err {
            JmesPathError::InvalidArity { expected, .. } => {
                assert_eq!(expected, "at least 1 argument");
            }
            _ => panic!("expected InvalidArity"),
        }
    }

    #[test]
    fn test_arity_at_most_with_optional() {
        let e = entry(vec![
            ArgSpec::required(&[ArgType::Any]),
            ArgSpec::optional(&[ArgType::Number]),
        ]);
        assert!(e.resolve_args(&[Value::Null]).is_ok());
        assert!(e.resolve_args(&[Value::Null, Value::Number(1.0)]).is_ok());
        let err = e
            .resolve_args(&[Value::Null, Value::Null, Value::Null])
            .unwrap_err();
        match err {
            JmesPathError::InvalidArity { expected, .. } => {
                assert_eq!(expected, "at most 2 arguments");
            }
            _ => panic!("expected InvalidArity"),
        }
    }

    #[test]
    fn test_variadic_tail_is_type_checked() {
        let e = entry(vec![ArgSpec::variadic(&[ArgType::Object])]);
        let err = e
            .resolve_args(&[Value::Object(Default::default()), Value::Number(1.0)])
            .unwrap_err();
        assert!(matches!(err, JmesPathError::InvalidType { .. }));
    }

    #[test]
    fn test_typed_array_checks() {
        assert!(ArgType::ArrayNumber.matches(&Value::Array(vec![Value::Number(1.0)])));
        assert!(ArgType::ArrayNumber.matches(&Value::Array(vec![])));
        assert!(!ArgType::ArrayNumber.matches(&Value::Array(vec![Value::from("x")])));
        assert!(!ArgType::ArrayString.matches(&Value::from("x")));
    }

    #[test]
    fn test_signature_string_parsing() {
        let mut registry = FunctionRegistry::with_builtins();
        registry
            .register_with_signature("probe", "string|array[string],string", false, |_, _| {
                Ok(Value::Null)
            })
            .unwrap();
        assert!(registry.table.contains_key("probe"));

        let err = registry
            .register_with_signature("bad", "strang", false, |_, _| Ok(Value::Null))
            .unwrap_err();
        assert!(matches!(err, JmesPathError::InvalidValue { .. }));
    }

    #[test]
    fn test_registration_last_write_wins() {
        let mut registry = FunctionRegistry::with_builtins();
        registry
            .register_with_signature("type", "any", false, |_, _| Ok(Value::from("override")))
            .unwrap();
        let entry = registry.table.get("type").unwrap();
        assert_eq!(entry.signature.len(), 1);
    }
}
