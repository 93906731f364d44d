//! Tree-walking evaluation of a parsed expression against a value.
//!
//! Entry point: [`TreeInterpreter::evaluate`]. An interpreter instance
//! carries per-evaluation state (the root value and the lexical scope
//! stack), so each search constructs a fresh one; the compiled AST and the
//! function registry are shared immutably.

use crate::ast::{Comparator, Node};
use crate::error::JmesPathError;
use crate::functions::FunctionRegistry;
use crate::scopes::Scopes;
use crate::types::{Map, Value};
use std::sync::Arc;

pub struct TreeInterpreter<'a> {
    root: Value,
    scopes: Scopes,
    functions: &'a FunctionRegistry,
}

impl<'a> TreeInterpreter<'a> {
    pub fn new(functions: &'a FunctionRegistry, root: Value) -> Self {
        Self {
            root,
            scopes: Scopes::new(),
            functions,
        }
    }

    /// The value the evaluation was entered with.
    pub fn root(&self) -> &Value {
        &self.root
    }

    pub(crate) fn scopes_mut(&mut self) -> &mut Scopes {
        &mut self.scopes
    }

    pub fn evaluate(&mut self, node: &Node, current: &Value) -> Result<Value, JmesPathError> {
        match node {
            Node::Identity | Node::Current => Ok(current.clone()),
            Node::Field(name) => self.evaluate_field(name, current),
            Node::Literal(value) => Ok(value.clone()),
            Node::Index(index) => evaluate_index(*index, current),
            Node::Slice { start, stop, step } => evaluate_slice(current, *start, *stop, *step),
            Node::Subexpression { left, right } | Node::IndexExpression { left, right } => {
                let value = self.evaluate(left, current)?;
                if value.is_null() {
                    return Ok(Value::Null);
                }
                self.evaluate(right, &value)
            }
            Node::Projection { left, right } => {
                let value = self.evaluate(left, current)?;
                let items = value.as_array().ok_or(JmesPathError::NotFound)?;
                self.project(right, items.iter())
            }
            Node::ValueProjection { left, right } => {
                let value = self.evaluate(left, current)?;
                let entries = value.as_object().ok_or(JmesPathError::NotFound)?;
                self.project(right, entries.values())
            }
            Node::FilterProjection {
                left,
                right,
                condition,
            } => {
                let value = self.evaluate(left, current)?;
                let items = value.as_array().ok_or(JmesPathError::NotFound)?;
                let mut matched = Vec::new();
                for item in items {
                    if self.filter_matches(condition, item)? {
                        matched.push(item);
                    }
                }
                self.project(right, matched.into_iter())
            }
            Node::Flatten(inner) => {
                let value = self.evaluate(inner, current)?;
                let items = value.as_array().ok_or(JmesPathError::NotFound)?;
                let mut flattened = Vec::new();
                for item in items {
                    match item {
                        Value::Array(nested) => flattened.extend(nested.iter().cloned()),
                        other => flattened.push(other.clone()),
                    }
                }
                Ok(Value::Array(flattened))
            }
            Node::MultiSelectList(expressions) => {
                if current.is_null() {
                    return Ok(Value::Null);
                }
                let mut collected = Vec::with_capacity(expressions.len());
                for expression in expressions {
                    collected.push(self.evaluate_or_null(expression, current)?);
                }
                Ok(Value::Array(collected))
            }
            Node::MultiSelectHash(pairs) => {
                if current.is_null() {
                    return Ok(Value::Null);
                }
                let mut collected = Map::with_capacity(pairs.len());
                for pair in pairs {
                    let value = self.evaluate_or_null(&pair.value, current)?;
                    collected.insert(pair.key.clone(), value);
                }
                Ok(Value::Object(collected))
            }
            Node::Or { left, right } => {
                let value = self.evaluate_or_null(left, current)?;
                if value.is_truthy() {
                    return Ok(value);
                }
                self.evaluate_or_null(right, current)
            }
            Node::And { left, right } => {
                let value = self.evaluate_or_null(left, current)?;
                if !value.is_truthy() {
                    return Ok(value);
                }
                self.evaluate_or_null(right, current)
            }
            Node::Not(inner) => {
                let value = self.evaluate_or_null(inner, current)?;
                Ok(Value::Bool(!value.is_truthy()))
            }
            Node::Comparison {
                comparator,
                left,
                right,
            } => {
                let lhs = self.evaluate_or_null(left, current)?;
                let rhs = self.evaluate_or_null(right, current)?;
                evaluate_comparison(*comparator, &lhs, &rhs)
            }
            // A pipe feeds the whole left result into the right side, which
            // also stops any open projection from fusing across it.
            Node::Pipe { left, right } => {
                let value = self.evaluate(left, current)?;
                self.evaluate(right, &value)
            }
            Node::Function { name, args } => {
                let mut evaluated = Vec::with_capacity(args.len());
                for arg in args {
                    evaluated.push(self.evaluate_or_null(arg, current)?);
                }
                let registry = self.functions;
                registry.call(name, evaluated, self)
            }
            Node::ExpRef(inner) => Ok(Value::Expref(Arc::new((**inner).clone()))),
        }
    }

    fn evaluate_field(&mut self, name: &str, current: &Value) -> Result<Value, JmesPathError> {
        if let Some(entries) = current.as_object() {
            if let Some(value) = entries.get(name) {
                return Ok(value.clone());
            }
        }
        // Fall back to let-bound identifiers, innermost frame first.
        if let Some(value) = self.scopes.get_value(name) {
            return Ok(value.clone());
        }
        Err(JmesPathError::NotFound)
    }

    /// Evaluates the projection right-hand side against each item, dropping
    /// non-matches and nulls while preserving input order.
    fn project<'v>(
        &mut self,
        right: &Node,
        items: impl Iterator<Item = &'v Value>,
    ) -> Result<Value, JmesPathError> {
        let mut collected = Vec::new();
        for item in items {
            match self.evaluate(right, item) {
                Ok(Value::Null) | Err(JmesPathError::NotFound) => {}
                Ok(value) => collected.push(value),
                Err(error) => return Err(error),
            }
        }
        Ok(Value::Array(collected))
    }

    fn filter_matches(&mut self, condition: &Node, item: &Value) -> Result<bool, JmesPathError> {
        match self.evaluate(condition, item) {
            Ok(value) => Ok(value.is_truthy()),
            Err(JmesPathError::NotFound) => Ok(false),
            Err(error) => Err(error),
        }
    }

    // Non-matches flow into the surrounding expression as null.
    fn evaluate_or_null(&mut self, node: &Node, current: &Value) -> Result<Value, JmesPathError> {
        match self.evaluate(node, current) {
            Err(JmesPathError::NotFound) => Ok(Value::Null),
            other => other,
        }
    }
}

fn evaluate_index(index: i64, current: &Value) -> Result<Value, JmesPathError> {
    let items = current.as_array().ok_or(JmesPathError::NotFound)?;
    let resolved = if index < 0 {
        index + items.len() as i64
    } else {
        index
    };
    if resolved < 0 {
        return Err(JmesPathError::NotFound);
    }
    items
        .get(resolved as usize)
        .cloned()
        .ok_or(JmesPathError::NotFound)
}

fn evaluate_slice(
    current: &Value,
    start: Option<i64>,
    stop: Option<i64>,
    step: Option<i64>,
) -> Result<Value, JmesPathError> {
    let items = current.as_array().ok_or(JmesPathError::NotFound)?;
    let step = step.unwrap_or(1);
    if step == 0 {
        return Err(JmesPathError::invalid_value("slice", "step cannot be zero"));
    }
    let length = items.len() as i64;
    let (lower, upper) = if step > 0 { (0, length) } else { (-1, length - 1) };
    let adjust = |bound: Option<i64>, default: i64| match bound {
        Some(b) => {
            let b = if b < 0 { b + length } else { b };
            b.clamp(lower, upper)
        }
        None => default,
    };
    let (start, stop) = if step > 0 {
        (adjust(start, 0), adjust(stop, length))
    } else {
        (adjust(start, length - 1), adjust(stop, -1))
    };

    let mut collected = Vec::new();
    let mut i = start;
    while (step > 0 && i < stop) || (step < 0 && i > stop) {
        collected.push(items[i as usize].clone());
        i += step;
    }
    Ok(Value::Array(collected))
}

fn evaluate_comparison(
    comparator: Comparator,
    left: &Value,
    right: &Value,
) -> Result<Value, JmesPathError> {
    match comparator {
        Comparator::Eq => Ok(Value::Bool(left == right)),
        Comparator::Ne => Ok(Value::Bool(left != right)),
        _ => {
            // Ordering is defined on numbers only; anything else is a
            // non-match, which filters treat as false.
            let (Some(l), Some(r)) = (left.as_number(), right.as_number()) else {
                return Err(JmesPathError::NotFound);
            };
            let result = match comparator {
                Comparator::Lt => l < r,
                Comparator::Lte => l <= r,
                Comparator::Gt => l > r,
                _ => l >= r,
            };
            Ok(Value::Bool(result))
        }
    }
}
