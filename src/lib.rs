//! JMESPath expression parser and evaluator.
//!
//! Compiles a JMESPath query expression into an immutable AST and evaluates
//! it against JSON-like data: projections, filters, slices, multi-selects,
//! pipes and a typed built-in function library, plus user-function
//! registration.
//!
//! # Key Types
//!
//! - [`CompiledQuery`]: a parsed expression ready for repeated searches
//! - [`Value`]: the JSON-like value model results are expressed in
//! - [`JmesPathError`]: typed compilation/evaluation failures
//!
//! # Example
//!
//! ```
//! use jmesquery::{compile, Value};
//! use serde_json::json;
//!
//! let query = compile("locations[?state == 'WA'].name | sort(@)")?;
//! let data = json!({"locations": [
//!     {"name": "Seattle", "state": "WA"},
//!     {"name": "Portland", "state": "OR"},
//!     {"name": "Bellevue", "state": "WA"},
//! ]});
//! let result = query.search(&data)?;
//! assert_eq!(result, Value::from(json!(["Bellevue", "Seattle"])));
//! # Ok::<(), jmesquery::JmesPathError>(())
//! ```
//!
//! Compiled queries are immutable and safe to share across threads; each
//! `search` call evaluates on a fresh interpreter. The function table lives
//! on the compiled query, so registering a user function never affects
//! other queries.

pub mod ast;
pub mod engine;
pub mod error;
pub mod functions;
pub mod lexer;
pub mod parser;
mod scopes;
pub mod types;

use serde::Serialize;

pub use ast::{Comparator, KeyValPair, Node};
pub use engine::TreeInterpreter;
pub use error::JmesPathError;
pub use functions::{ArgSpec, ArgType, FunctionEntry, FunctionRegistry, expression_evaluator};
pub use types::{Map, Value, to_value};

/// A compiled JMESPath query. Parsing happens once; the query can then be
/// matched against any number of data values, concurrently.
pub struct CompiledQuery {
    ast: Node,
    expression: String,
    functions: FunctionRegistry,
}

/// Parses an expression and returns, if successful, a query that can be
/// matched against data.
pub fn compile(expression: &str) -> Result<CompiledQuery, JmesPathError> {
    let ast = parser::parse(expression)?;
    Ok(CompiledQuery {
        ast,
        expression: expression.to_string(),
        functions: FunctionRegistry::with_builtins(),
    })
}

/// Parses and evaluates an expression against host data in one call.
pub fn search<T: Serialize + ?Sized>(
    expression: &str,
    data: &T,
) -> Result<Value, JmesPathError> {
    compile(expression)?.search(data)
}

impl CompiledQuery {
    pub fn expression(&self) -> &str {
        &self.expression
    }

    pub fn ast(&self) -> &Node {
        &self.ast
    }

    /// Evaluates the query against host data normalized through the
    /// [`types::to_value`] adapter.
    pub fn search<T: Serialize + ?Sized>(&self, data: &T) -> Result<Value, JmesPathError> {
        self.search_value(types::to_value(data)?)
    }

    /// Evaluates the query against an already-normalized value. A top-level
    /// non-match comes back as `Ok(Value::Null)`.
    pub fn search_value(&self, data: Value) -> Result<Value, JmesPathError> {
        let mut interpreter = TreeInterpreter::new(&self.functions, data.clone());
        match interpreter.evaluate(&self.ast, &data) {
            Err(JmesPathError::NotFound) => Ok(Value::Null),
            other => other,
        }
    }

    /// Registers a user function under `name` with a signature string of
    /// the form `type1|type2,type3` (see
    /// [`FunctionRegistry::register_with_signature`]). Registering over an
    /// existing name, built-in or not, replaces it.
    pub fn register_function<F>(
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
        self.functions
            .register_with_signature(name, signature, variadic, handler)
    }
}
