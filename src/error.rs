use thiserror::Error;

/// Errors surfaced by compilation and evaluation.
///
/// `NotFound` is special: it is a non-match signal rather than a failure.
/// Projections, or-expressions and filter conditions recover from it, and
/// the top-level search APIs rewrite it to a successful `null` result.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum JmesPathError {
    #[error("syntax error at offset {offset}: {message}")]
    Syntax {
        message: String,
        expression: String,
        offset: usize,
    },

    #[error("invalid type for '{function}': {message}")]
    InvalidType { function: String, message: String },

    #[error("invalid arity for '{function}': expected {expected} but received {received}")]
    InvalidArity {
        function: String,
        expected: String,
        received: usize,
    },

    #[error("invalid value for '{function}': the '{argument}' argument must be an integer")]
    NotAnInteger { function: String, argument: String },

    #[error(
        "invalid value for '{function}': the '{argument}' argument must be a non-negative integer"
    )]
    NotAPositiveInteger { function: String, argument: String },

    #[error("invalid value for '{function}': {message}")]
    InvalidValue { function: String, message: String },

    #[error("unknown function '{name}'")]
    UnknownFunction { name: String },

    #[error("no match")]
    NotFound,
}

impl JmesPathError {
    pub fn syntax(
        message: impl Into<String>,
        expression: impl Into<String>,
        offset: usize,
    ) -> Self {
        Self::Syntax {
            message: message.into(),
            expression: expression.into(),
            offset,
        }
    }

    pub fn invalid_type(function: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidType {
            function: function.into(),
            message: message.into(),
        }
    }

    pub fn invalid_value(function: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            function: function.into(),
            message: message.into(),
        }
    }

    pub fn not_an_integer(function: impl Into<String>, argument: impl Into<String>) -> Self {
        Self::NotAnInteger {
            function: function.into(),
            argument: argument.into(),
        }
    }

    pub fn not_a_positive_integer(
        function: impl Into<String>,
        argument: impl Into<String>,
    ) -> Self {
        Self::NotAPositiveInteger {
            function: function.into(),
            argument: argument.into(),
        }
    }

    pub fn unknown_function(name: impl Into<String>) -> Self {
        Self::UnknownFunction { name: name.into() }
    }

    /// Whether this error is the recoverable non-match signal.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_syntax_error_carries_offset_and_expression() {
        let err = JmesPathError::syntax("unexpected token", "foo..bar", 4);
        match &err {
            JmesPathError::Syntax {
                expression, offset, ..
            } => {
                assert_eq!(expression, "foo..bar");
                assert_eq!(*offset, 4);
            }
            _ => panic!("expected Syntax"),
        }
        assert!(err.to_string().contains("offset 4"));
    }

    #[test]
    fn test_arity_message_distinguishes_bounds() {
        let err = JmesPathError::InvalidArity {
            function: "abs".to_string(),
            expected: "exactly 1 argument".to_string(),
            received: 2,
        };
        assert!(err.to_string().contains("exactly 1 argument"));
        assert!(err.to_string().contains("'abs'"));
    }

    #[test]
    fn test_not_found_is_recoverable() {
        assert!(JmesPathError::NotFound.is_not_found());
        assert!(!JmesPathError::unknown_function("nope").is_not_found());
    }
}
