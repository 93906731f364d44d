//! Pratt parser turning a token stream into a [`Node`] tree.

use crate::ast::{Comparator, KeyValPair, Node};
use crate::error::JmesPathError;
use crate::lexer::{Token, TokenKind, tokenize};
use crate::types::Value;

/// Per-token binding powers driving the Pratt loop.
fn binding_power(kind: TokenKind) -> u8 {
    match kind {
        TokenKind::Pipe => 1,
        TokenKind::Or => 2,
        TokenKind::And => 3,
        TokenKind::Eq
        | TokenKind::Ne
        | TokenKind::Lt
        | TokenKind::Lte
        | TokenKind::Gt
        | TokenKind::Gte => 5,
        TokenKind::Flatten => 9,
        TokenKind::Star => 20,
        TokenKind::Filter => 21,
        TokenKind::Dot => 40,
        TokenKind::Not => 45,
        TokenKind::Lbrace => 50,
        TokenKind::Lbracket => 55,
        TokenKind::Lparen => 60,
        _ => 0,
    }
}

/// Compiles an expression into its AST.
pub fn parse(expression: &str) -> Result<Node, JmesPathError> {
    let tokens = tokenize(expression)?;
    let mut parser = Parser {
        expression,
        tokens,
        index: 0,
    };
    let parsed = parser.parse_expression(0)?;
    if parser.current() != TokenKind::Eof {
        return Err(parser.syntax_error(format!(
            "unexpected token at the end of the expression: {:?}",
            parser.current()
        )));
    }
    Ok(parsed)
}

struct Parser<'a> {
    expression: &'a str,
    tokens: Vec<Token>,
    index: usize,
}

impl<'a> Parser<'a> {
    fn parse_expression(&mut self, power: u8) -> Result<Node, JmesPathError> {
        let left_token = self.lookahead_token(0).clone();
        self.advance();
        let mut left = self.nud(left_token)?;
        while power < binding_power(self.current()) {
            let kind = self.current();
            self.advance();
            left = self.led(kind, left)?;
        }
        Ok(left)
    }

    fn nud(&mut self, token: Token) -> Result<Node, JmesPathError> {
        match token.kind {
            TokenKind::JsonLiteral => {
                let decoded: serde_json::Value = serde_json::from_str(&token.text)
                    .map_err(|e| self.syntax_error_token(format!("invalid literal: {}", e), &token))?;
                Ok(Node::Literal(Value::from(decoded)))
            }
            TokenKind::RawString => Ok(Node::Literal(Value::String(token.text))),
            TokenKind::UnquotedIdentifier => Ok(Node::Field(token.text)),
            TokenKind::QuotedIdentifier => {
                if self.current() == TokenKind::Lparen {
                    return Err(self.syntax_error_token(
                        "quoted identifier cannot be used as a function name",
                        &token,
                    ));
                }
                Ok(Node::Field(token.text))
            }
            TokenKind::Star => {
                let right = if self.current() == TokenKind::Rbracket {
                    Node::Identity
                } else {
                    self.parse_projection_rhs(binding_power(TokenKind::Star))?
                };
                Ok(Node::value_projection(Node::Identity, right))
            }
            TokenKind::Filter => self.parse_filter(Node::Identity),
            TokenKind::Lbrace => self.parse_multi_select_hash(),
            TokenKind::Flatten => {
                let left = Node::flatten(Node::Identity);
                let right = self.parse_projection_rhs(binding_power(TokenKind::Flatten))?;
                Ok(Node::projection(left, right))
            }
            TokenKind::Lbracket => {
                if matches!(self.current(), TokenKind::Number | TokenKind::Colon) {
                    let right = self.parse_index_expression()?;
                    self.project_if_slice(Node::Identity, right)
                } else if self.current() == TokenKind::Star
                    && self.lookahead(1) == TokenKind::Rbracket
                {
                    self.advance();
                    self.advance();
                    let right = self.parse_projection_rhs(binding_power(TokenKind::Star))?;
                    Ok(Node::projection(Node::Identity, right))
                } else {
                    self.parse_multi_select_list()
                }
            }
            TokenKind::Current => Ok(Node::Current),
            TokenKind::Expref => {
                let inner = self.parse_expression(binding_power(TokenKind::Expref))?;
                Ok(Node::expref(inner))
            }
            TokenKind::Not => {
                let inner = self.parse_expression(binding_power(TokenKind::Not))?;
                Ok(Node::not(inner))
            }
            TokenKind::Lparen => {
                let inner = self.parse_expression(0)?;
                self.match_kind(TokenKind::Rparen)?;
                Ok(inner)
            }
            TokenKind::Eof => Err(self.syntax_error_token("incomplete expression", &token)),
            other => {
                Err(self.syntax_error_token(format!("invalid token: {:?}", other), &token))
            }
        }
    }

    fn led(&mut self, kind: TokenKind, node: Node) -> Result<Node, JmesPathError> {
        match kind {
            TokenKind::Dot => {
                if self.current() != TokenKind::Star {
                    let right = self.parse_dot_rhs(binding_power(TokenKind::Dot))?;
                    return Ok(Node::subexpression(node, right));
                }
                self.advance();
                let right = self.parse_projection_rhs(binding_power(TokenKind::Dot))?;
                Ok(Node::value_projection(node, right))
            }
            TokenKind::Pipe => {
                let right = self.parse_expression(binding_power(TokenKind::Pipe))?;
                Ok(Node::pipe(node, right))
            }
            TokenKind::Or => {
                let right = self.parse_expression(binding_power(TokenKind::Or))?;
                Ok(Node::or(node, right))
            }
            TokenKind::And => {
                let right = self.parse_expression(binding_power(TokenKind::And))?;
                Ok(Node::and(node, right))
            }
            TokenKind::Lparen => {
                let name = match node {
                    Node::Field(name) => name,
                    _ => return Err(self.syntax_error("invalid function name")),
                };
                let mut args = Vec::new();
                while self.current() != TokenKind::Rparen {
                    let arg = self.parse_expression(0)?;
                    if self.current() == TokenKind::Comma {
                        self.match_kind(TokenKind::Comma)?;
                    }
                    args.push(arg);
                }
                self.match_kind(TokenKind::Rparen)?;
                Ok(Node::function(name, args))
            }
            TokenKind::Filter => self.parse_filter(node),
            TokenKind::Flatten => {
                let left = Node::flatten(node);
                let right = self.parse_projection_rhs(binding_power(TokenKind::Flatten))?;
                Ok(Node::projection(left, right))
            }
            TokenKind::Eq
            | TokenKind::Ne
            | TokenKind::Lt
            | TokenKind::Lte
            | TokenKind::Gt
            | TokenKind::Gte => {
                let comparator = match kind {
                    TokenKind::Eq => Comparator::Eq,
                    TokenKind::Ne => Comparator::Ne,
                    TokenKind::Lt => Comparator::Lt,
                    TokenKind::Lte => Comparator::Lte,
                    TokenKind::Gt => Comparator::Gt,
                    _ => Comparator::Gte,
                };
                let right = self.parse_expression(binding_power(kind))?;
                Ok(Node::comparison(comparator, node, right))
            }
            TokenKind::Lbracket => {
                if matches!(self.current(), TokenKind::Number | TokenKind::Colon) {
                    let right = self.parse_index_expression()?;
                    return self.project_if_slice(node, right);
                }
                self.match_kind(TokenKind::Star)?;
                self.match_kind(TokenKind::Rbracket)?;
                let right = self.parse_projection_rhs(binding_power(TokenKind::Star))?;
                Ok(Node::projection(node, right))
            }
            other => Err(self.syntax_error(format!("unexpected token: {:?}", other))),
        }
    }

    fn parse_index_expression(&mut self) -> Result<Node, JmesPathError> {
        if self.lookahead(0) == TokenKind::Colon || self.lookahead(1) == TokenKind::Colon {
            return self.parse_slice_expression();
        }
        let token = self.lookahead_token(0).clone();
        let parsed: i64 = token
            .text
            .parse()
            .map_err(|_| self.syntax_error_token("invalid index", &token))?;
        self.advance();
        self.match_kind(TokenKind::Rbracket)?;
        Ok(Node::Index(parsed))
    }

    fn parse_slice_expression(&mut self) -> Result<Node, JmesPathError> {
        let mut parts: [Option<i64>; 3] = [None, None, None];
        let mut index = 0;
        while self.current() != TokenKind::Rbracket && index < 3 {
            if self.current() == TokenKind::Colon {
                index += 1;
                self.advance();
            } else if self.current() == TokenKind::Number {
                let token = self.lookahead_token(0).clone();
                let parsed: i64 = token
                    .text
                    .parse()
                    .map_err(|_| self.syntax_error_token("invalid slice bound", &token))?;
                parts[index] = Some(parsed);
                self.advance();
            } else {
                return Err(self.syntax_error(format!(
                    "expected colon or number in slice, received: {:?}",
                    self.current()
                )));
            }
        }
        self.match_kind(TokenKind::Rbracket)?;
        Ok(Node::Slice {
            start: parts[0],
            stop: parts[1],
            step: parts[2],
        })
    }

    // A bracketed index that parsed to a slice opens a projection; a plain
    // index does not.
    fn project_if_slice(&mut self, left: Node, right: Node) -> Result<Node, JmesPathError> {
        let is_slice = matches!(right, Node::Slice { .. });
        let index_expr = Node::index_expression(left, right);
        if is_slice {
            let rhs = self.parse_projection_rhs(binding_power(TokenKind::Star))?;
            Ok(Node::projection(index_expr, rhs))
        } else {
            Ok(index_expr)
        }
    }

    fn parse_filter(&mut self, node: Node) -> Result<Node, JmesPathError> {
        let condition = self.parse_expression(0)?;
        self.match_kind(TokenKind::Rbracket)?;
        let right = if self.current() == TokenKind::Flatten {
            Node::Identity
        } else {
            self.parse_projection_rhs(binding_power(TokenKind::Filter))?
        };
        Ok(Node::filter_projection(node, right, condition))
    }

    // The right-hand side of a dot is restricted: an identifier, `*`, a
    // multi-select list or a multi-select hash.
    fn parse_dot_rhs(&mut self, power: u8) -> Result<Node, JmesPathError> {
        match self.current() {
            TokenKind::QuotedIdentifier | TokenKind::UnquotedIdentifier | TokenKind::Star => {
                self.parse_expression(power)
            }
            TokenKind::Lbracket => {
                self.match_kind(TokenKind::Lbracket)?;
                self.parse_multi_select_list()
            }
            TokenKind::Lbrace => {
                self.match_kind(TokenKind::Lbrace)?;
                self.parse_multi_select_hash()
            }
            _ => Err(self.syntax_error("expected identifier, '*', '[' or '{' after '.'")),
        }
    }

    fn parse_projection_rhs(&mut self, power: u8) -> Result<Node, JmesPathError> {
        if binding_power(self.current()) < 10 {
            return Ok(Node::Identity);
        }
        match self.current() {
            TokenKind::Lbracket | TokenKind::Filter => self.parse_expression(power),
            TokenKind::Dot => {
                self.match_kind(TokenKind::Dot)?;
                self.parse_dot_rhs(power)
            }
            other => Err(self.syntax_error(format!(
                "invalid projection right-hand side: {:?}",
                other
            ))),
        }
    }

    fn parse_multi_select_list(&mut self) -> Result<Node, JmesPathError> {
        let mut expressions = Vec::new();
        loop {
            expressions.push(self.parse_expression(0)?);
            if self.current() == TokenKind::Rbracket {
                break;
            }
            self.match_kind(TokenKind::Comma)?;
        }
        self.match_kind(TokenKind::Rbracket)?;
        Ok(Node::MultiSelectList(expressions))
    }

    fn parse_multi_select_hash(&mut self) -> Result<Node, JmesPathError> {
        let mut pairs = Vec::new();
        loop {
            let key_token = self.lookahead_token(0).clone();
            if !matches!(
                key_token.kind,
                TokenKind::UnquotedIdentifier | TokenKind::QuotedIdentifier
            ) {
                return Err(self.syntax_error("expected identifier as multi-select hash key"));
            }
            self.advance();
            self.match_kind(TokenKind::Colon)?;
            let value = self.parse_expression(0)?;
            pairs.push(KeyValPair {
                key: key_token.text,
                value,
            });
            if self.current() == TokenKind::Comma {
                self.match_kind(TokenKind::Comma)?;
            } else {
                self.match_kind(TokenKind::Rbrace)?;
                break;
            }
        }
        Ok(Node::MultiSelectHash(pairs))
    }

    fn match_kind(&mut self, kind: TokenKind) -> Result<(), JmesPathError> {
        if self.current() == kind {
            self.advance();
            return Ok(());
        }
        Err(self.syntax_error(format!(
            "expected {:?}, received: {:?}",
            kind,
            self.current()
        )))
    }

    fn current(&self) -> TokenKind {
        self.lookahead(0)
    }

    fn lookahead(&self, n: usize) -> TokenKind {
        self.lookahead_token(n).kind
    }

    // Clamped to the trailing Eof token so lookahead never runs off the end.
    fn lookahead_token(&self, n: usize) -> &Token {
        let index = (self.index + n).min(self.tokens.len() - 1);
        &self.tokens[index]
    }

    fn advance(&mut self) {
        self.index += 1;
    }

    fn syntax_error(&self, message: impl Into<String>) -> JmesPathError {
        JmesPathError::syntax(message, self.expression, self.lookahead_token(0).position)
    }

    fn syntax_error_token(&self, message: impl Into<String>, token: &Token) -> JmesPathError {
        JmesPathError::syntax(message, self.expression, token.position)
    }
}
