//! JMESPath expression AST types.
//!
//! Core types: [`Node`], [`Comparator`], [`KeyValPair`].
//!
//! Nodes are immutable after parsing and safe to share across concurrent
//! evaluations. [`Node::canonical`] renders a node back to expression text
//! that re-parses to a structurally equal tree.

use crate::types::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// The implicit left-hand side of projection forms (`[*]`, `[]`, `[?…]`
    /// written without an explicit base).
    Identity,
    /// `@`, the current node.
    Current,
    Field(String),
    Literal(Value),
    Index(i64),
    Slice {
        start: Option<i64>,
        stop: Option<i64>,
        step: Option<i64>,
    },
    Subexpression {
        left: Box<Node>,
        right: Box<Node>,
    },
    IndexExpression {
        left: Box<Node>,
        right: Box<Node>,
    },
    Projection {
        left: Box<Node>,
        right: Box<Node>,
    },
    ValueProjection {
        left: Box<Node>,
        right: Box<Node>,
    },
    FilterProjection {
        left: Box<Node>,
        right: Box<Node>,
        condition: Box<Node>,
    },
    Flatten(Box<Node>),
    MultiSelectList(Vec<Node>),
    MultiSelectHash(Vec<KeyValPair>),
    Or {
        left: Box<Node>,
        right: Box<Node>,
    },
    And {
        left: Box<Node>,
        right: Box<Node>,
    },
    Not(Box<Node>),
    Comparison {
        comparator: Comparator,
        left: Box<Node>,
        right: Box<Node>,
    },
    Pipe {
        left: Box<Node>,
        right: Box<Node>,
    },
    Function {
        name: String,
        args: Vec<Node>,
    },
    ExpRef(Box<Node>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparator {
    Eq,
    Ne,
    Lt,
    Lte,
    Gt,
    Gte,
}

impl Comparator {
    pub fn symbol(&self) -> &'static str {
        match self {
            Comparator::Eq => "==",
            Comparator::Ne => "!=",
            Comparator::Lt => "<",
            Comparator::Lte => "<=",
            Comparator::Gt => ">",
            Comparator::Gte => ">=",
        }
    }
}

/// One `key: expr` entry of a multi-select hash. Evaluation preserves the
/// source order of entries.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyValPair {
    pub key: String,
    pub value: Node,
}

impl Node {
    pub fn field(name: impl Into<String>) -> Self {
        Node::Field(name.into())
    }

    pub fn subexpression(left: Node, right: Node) -> Self {
        Node::Subexpression {
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn index_expression(left: Node, right: Node) -> Self {
        Node::IndexExpression {
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn projection(left: Node, right: Node) -> Self {
        Node::Projection {
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn value_projection(left: Node, right: Node) -> Self {
        Node::ValueProjection {
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn filter_projection(left: Node, right: Node, condition: Node) -> Self {
        Node::FilterProjection {
            left: Box::new(left),
            right: Box::new(right),
            condition: Box::new(condition),
        }
    }

    pub fn flatten(inner: Node) -> Self {
        Node::Flatten(Box::new(inner))
    }

    pub fn or(left: Node, right: Node) -> Self {
        Node::Or {
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn and(left: Node, right: Node) -> Self {
        Node::And {
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn not(inner: Node) -> Self {
        Node::Not(Box::new(inner))
    }

    pub fn comparison(comparator: Comparator, left: Node, right: Node) -> Self {
        Node::Comparison {
            comparator,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn pipe(left: Node, right: Node) -> Self {
        Node::Pipe {
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn function(name: impl Into<String>, args: Vec<Node>) -> Self {
        Node::Function {
            name: name.into(),
            args,
        }
    }

    pub fn expref(inner: Node) -> Self {
        Node::ExpRef(Box::new(inner))
    }
}

// Binding powers of the binary forms, used to decide where the canonical
// rendering must parenthesize to survive a re-parse.
fn binary_power(node: &Node) -> u8 {
    match node {
        Node::Pipe { .. } => 1,
        Node::Or { .. } => 2,
        Node::And { .. } => 3,
        Node::Comparison { .. } => 5,
        _ => u8::MAX,
    }
}

fn quote_key(name: &str) -> String {
    let mut chars = name.chars();
    let identifier = match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    };
    if identifier {
        name.to_string()
    } else {
        // serde_json string rendering is exactly the quoted-identifier form.
        serde_json::to_string(name).unwrap_or_default()
    }
}

impl Node {
    /// Renders the canonical expression form of this node. Re-parsing the
    /// result yields a tree structurally equal to `self`.
    pub fn canonical(&self) -> String {
        match self {
            Node::Identity => String::new(),
            Node::Current => "@".to_string(),
            Node::Field(name) => quote_key(name),
            Node::Literal(value) => {
                let json = serde_json::to_string(&serde_json::Value::from(value.clone()))
                    .unwrap_or_default();
                format!("`{}`", json.replace('`', "\\`"))
            }
            Node::Index(i) => format!("[{}]", i),
            Node::Slice { start, stop, step } => {
                let part = |p: &Option<i64>| p.map(|n| n.to_string()).unwrap_or_default();
                match step {
                    Some(_) => format!("[{}:{}:{}]", part(start), part(stop), part(step)),
                    None => format!("[{}:{}]", part(start), part(stop)),
                }
            }
            Node::Subexpression { left, right } => {
                format!("{}.{}", left.canonical(), right.canonical())
            }
            Node::IndexExpression { left, right } => {
                format!("{}{}", left.canonical(), right.canonical())
            }
            Node::Projection { left, right } => {
                let prefix = match left.as_ref() {
                    Node::Flatten(inner) => format!("{}[]", inner.canonical()),
                    Node::IndexExpression { .. } => left.canonical(),
                    other => format!("{}[*]", other.canonical()),
                };
                format!("{}{}", prefix, projection_rhs(right))
            }
            Node::ValueProjection { left, right } => {
                let prefix = match left.as_ref() {
                    Node::Identity => "*".to_string(),
                    other => format!("{}.*", other.canonical()),
                };
                format!("{}{}", prefix, projection_rhs(right))
            }
            Node::FilterProjection {
                left,
                right,
                condition,
            } => format!(
                "{}[?{}]{}",
                left.canonical(),
                condition.canonical(),
                projection_rhs(right)
            ),
            Node::Flatten(inner) => format!("{}[]", inner.canonical()),
            Node::MultiSelectList(items) => {
                let rendered: Vec<String> = items.iter().map(Node::canonical).collect();
                format!("[{}]", rendered.join(", "))
            }
            Node::MultiSelectHash(pairs) => {
                let rendered: Vec<String> = pairs
                    .iter()
                    .map(|pair| format!("{}: {}", quote_key(&pair.key), pair.value.canonical()))
                    .collect();
                format!("{{{}}}", rendered.join(", "))
            }
            Node::Or { left, right } => binary(left, "||", right, binary_power(self)),
            Node::And { left, right } => binary(left, "&&", right, binary_power(self)),
            Node::Pipe { left, right } => binary(left, "|", right, binary_power(self)),
            Node::Comparison {
                comparator,
                left,
                right,
            } => binary(left, comparator.symbol(), right, binary_power(self)),
            Node::Not(inner) => {
                if binary_power(inner) == u8::MAX {
                    format!("!{}", inner.canonical())
                } else {
                    format!("!({})", inner.canonical())
                }
            }
            Node::Function { name, args } => {
                let rendered: Vec<String> = args.iter().map(Node::canonical).collect();
                format!("{}({})", name, rendered.join(", "))
            }
            Node::ExpRef(inner) => format!("&{}", inner.canonical()),
        }
    }
}

// A projection right-hand side anchored on Identity renders as a bracket
// chain appended directly; anything else hangs off a dot. An Identity RHS
// renders as nothing at all.
fn projection_rhs(right: &Node) -> String {
    match right {
        Node::Identity => String::new(),
        Node::IndexExpression { .. } | Node::Projection { .. } | Node::FilterProjection { .. } => {
            right.canonical()
        }
        other => format!(".{}", other.canonical()),
    }
}

fn binary(left: &Node, op: &str, right: &Node, power: u8) -> String {
    let lhs = if binary_power(left) < power {
        format!("({})", left.canonical())
    } else {
        left.canonical()
    };
    let rhs = if binary_power(right) <= power {
        format!("({})", right.canonical())
    } else {
        right.canonical()
    };
    format!("{} {} {}", lhs, op, rhs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_helper_constructors_box_children() {
        let node = Node::subexpression(Node::field("foo"), Node::field("bar"));
        match node {
            Node::Subexpression { left, right } => {
                assert_eq!(*left, Node::Field("foo".to_string()));
                assert_eq!(*right, Node::Field("bar".to_string()));
            }
            _ => panic!("expected Subexpression"),
        }
    }

    #[test]
    fn test_canonical_quotes_non_identifier_keys() {
        assert_eq!(Node::field("foo").canonical(), "foo");
        assert_eq!(Node::field("foo bar").canonical(), "\"foo bar\"");
        assert_eq!(Node::field("0foo").canonical(), "\"0foo\"");
    }

    #[test]
    fn test_canonical_literal_escapes_backticks() {
        let node = Node::Literal(Value::from("a`b"));
        assert_eq!(node.canonical(), "`\"a\\`b\"`");
    }

    #[test]
    fn test_canonical_slice_forms() {
        let node = Node::Slice {
            start: Some(1),
            stop: None,
            step: Some(-1),
        };
        assert_eq!(node.canonical(), "[1::-1]");
        let node = Node::Slice {
            start: None,
            stop: Some(3),
            step: None,
        };
        assert_eq!(node.canonical(), "[:3]");
    }

    #[test]
    fn test_canonical_parenthesizes_right_nested_binaries() {
        let node = Node::or(
            Node::field("a"),
            Node::or(Node::field("b"), Node::field("c")),
        );
        assert_eq!(node.canonical(), "a || (b || c)");

        let node = Node::or(
            Node::or(Node::field("a"), Node::field("b")),
            Node::field("c"),
        );
        assert_eq!(node.canonical(), "a || b || c");
    }

    #[test]
    fn test_canonical_not_wraps_binary_operand() {
        let node = Node::not(Node::comparison(
            Comparator::Eq,
            Node::field("a"),
            Node::field("b"),
        ));
        assert_eq!(node.canonical(), "!(a == b)");
        assert_eq!(Node::not(Node::field("a")).canonical(), "!a");
    }
}
