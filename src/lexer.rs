//! Single-pass tokenizer for JMESPath expression text.

use crate::error::JmesPathError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Dot,
    Star,
    Comma,
    Colon,
    Lbrace,
    Rbrace,
    Lbracket,
    Rbracket,
    Lparen,
    Rparen,
    Current,
    Expref,
    Filter,
    Flatten,
    Or,
    Pipe,
    And,
    Not,
    Lt,
    Lte,
    Gt,
    Gte,
    Eq,
    Ne,
    Number,
    UnquotedIdentifier,
    QuotedIdentifier,
    RawString,
    JsonLiteral,
    Eof,
}

/// A lexed token. `text` is the decoded payload for quoted identifiers and
/// raw strings, the unescaped JSON text for literals, and the source text
/// otherwise. `position`/`length` are byte offsets into the expression.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub position: usize,
    pub length: usize,
}

impl Token {
    fn new(kind: TokenKind, text: impl Into<String>, position: usize, length: usize) -> Self {
        Self {
            kind,
            text: text.into(),
            position,
            length,
        }
    }
}

/// Tokenizes an expression, ending with an `Eof` token positioned at the
/// end of the input.
pub fn tokenize(expression: &str) -> Result<Vec<Token>, JmesPathError> {
    Lexer::new(expression).run()
}

struct Lexer<'a> {
    expression: &'a str,
    pos: usize,
    last_width: usize,
}

fn is_identifier_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_identifier_trailing(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

impl<'a> Lexer<'a> {
    fn new(expression: &'a str) -> Self {
        Self {
            expression,
            pos: 0,
            last_width: 0,
        }
    }

    fn next(&mut self) -> Option<char> {
        let c = self.expression[self.pos..].chars().next()?;
        self.last_width = c.len_utf8();
        self.pos += self.last_width;
        Some(c)
    }

    fn back(&mut self) {
        self.pos -= self.last_width;
        self.last_width = 0;
    }

    fn peek(&self) -> Option<char> {
        self.expression[self.pos..].chars().next()
    }

    fn syntax_error(&self, message: impl Into<String>, offset: usize) -> JmesPathError {
        JmesPathError::syntax(message, self.expression, offset)
    }

    fn unclosed(&self, delimiter: char) -> JmesPathError {
        self.syntax_error(
            format!("unclosed delimiter: {}", delimiter),
            self.expression.len(),
        )
    }

    fn run(mut self) -> Result<Vec<Token>, JmesPathError> {
        let mut tokens = Vec::new();
        while let Some(c) = self.next() {
            let start = self.pos - self.last_width;
            match c {
                '.' => tokens.push(Token::new(TokenKind::Dot, ".", start, 1)),
                '*' => tokens.push(Token::new(TokenKind::Star, "*", start, 1)),
                ',' => tokens.push(Token::new(TokenKind::Comma, ",", start, 1)),
                ':' => tokens.push(Token::new(TokenKind::Colon, ":", start, 1)),
                '{' => tokens.push(Token::new(TokenKind::Lbrace, "{", start, 1)),
                '}' => tokens.push(Token::new(TokenKind::Rbrace, "}", start, 1)),
                ']' => tokens.push(Token::new(TokenKind::Rbracket, "]", start, 1)),
                '(' => tokens.push(Token::new(TokenKind::Lparen, "(", start, 1)),
                ')' => tokens.push(Token::new(TokenKind::Rparen, ")", start, 1)),
                '@' => tokens.push(Token::new(TokenKind::Current, "@", start, 1)),
                '[' => tokens.push(self.consume_lbracket(start)),
                '|' => tokens.push(self.match_or_else('|', TokenKind::Or, TokenKind::Pipe, start)),
                '&' => {
                    tokens.push(self.match_or_else('&', TokenKind::And, TokenKind::Expref, start))
                }
                '<' => tokens.push(self.match_or_else('=', TokenKind::Lte, TokenKind::Lt, start)),
                '>' => tokens.push(self.match_or_else('=', TokenKind::Gte, TokenKind::Gt, start)),
                '!' => tokens.push(self.match_or_else('=', TokenKind::Ne, TokenKind::Not, start)),
                '=' => {
                    if self.peek() == Some('=') {
                        self.next();
                        tokens.push(Token::new(TokenKind::Eq, "==", start, 2));
                    } else {
                        return Err(self.syntax_error("unexpected '=', did you mean '=='?", start));
                    }
                }
                '"' => tokens.push(self.consume_quoted_identifier(start)?),
                '\'' => tokens.push(self.consume_raw_string(start)?),
                '`' => tokens.push(self.consume_json_literal(start)?),
                c if is_identifier_start(c) => tokens.push(self.consume_identifier(start)),
                c if c == '-' || c.is_ascii_digit() => tokens.push(self.consume_number(start)),
                ' ' | '\t' | '\n' | '\r' => {}
                other => {
                    return Err(
                        self.syntax_error(format!("unknown character {:?}", other), start)
                    );
                }
            }
        }
        tokens.push(Token::new(
            TokenKind::Eof,
            "",
            self.expression.len(),
            0,
        ));
        Ok(tokens)
    }

    /// Two-char token with a single-char fallback, e.g. `||` vs `|`.
    fn match_or_else(
        &mut self,
        second: char,
        matched: TokenKind,
        fallback: TokenKind,
        start: usize,
    ) -> Token {
        if self.peek() == Some(second) {
            self.next();
            Token::new(matched, &self.expression[start..self.pos], start, 2)
        } else {
            Token::new(fallback, &self.expression[start..start + 1], start, 1)
        }
    }

    // `[?` begins a filter, `[]` is the flatten operator, a bare `[` is an
    // ordinary left bracket.
    fn consume_lbracket(&mut self, start: usize) -> Token {
        match self.peek() {
            Some('?') => {
                self.next();
                Token::new(TokenKind::Filter, "[?", start, 2)
            }
            Some(']') => {
                self.next();
                Token::new(TokenKind::Flatten, "[]", start, 2)
            }
            _ => Token::new(TokenKind::Lbracket, "[", start, 1),
        }
    }

    fn consume_identifier(&mut self, start: usize) -> Token {
        while let Some(c) = self.next() {
            if !is_identifier_trailing(c) {
                self.back();
                break;
            }
        }
        let text = &self.expression[start..self.pos];
        Token::new(
            TokenKind::UnquotedIdentifier,
            text,
            start,
            self.pos - start,
        )
    }

    fn consume_number(&mut self, start: usize) -> Token {
        while let Some(c) = self.next() {
            if !c.is_ascii_digit() {
                self.back();
                break;
            }
        }
        let text = &self.expression[start..self.pos];
        Token::new(TokenKind::Number, text, start, self.pos - start)
    }

    /// Consumes up to (and including) the closing `end` delimiter, returning
    /// the raw contents. A backslash skips the following rune so escaped
    /// delimiters do not terminate the scan.
    fn consume_until(&mut self, end: char) -> Option<&'a str> {
        let start = self.pos;
        loop {
            match self.next()? {
                c if c == end => return Some(&self.expression[start..self.pos - 1]),
                '\\' => {
                    self.next()?;
                }
                _ => {}
            }
        }
    }

    fn consume_quoted_identifier(&mut self, start: usize) -> Result<Token, JmesPathError> {
        let raw = self.consume_until('"').ok_or_else(|| self.unclosed('"'))?;
        let decoded: String = serde_json::from_str(&format!("\"{}\"", raw))
            .map_err(|e| self.syntax_error(format!("invalid quoted identifier: {}", e), start))?;
        Ok(Token::new(
            TokenKind::QuotedIdentifier,
            decoded,
            start,
            self.pos - start,
        ))
    }

    // Raw strings recognize only `\'`; every other backslash is literal.
    fn consume_raw_string(&mut self, start: usize) -> Result<Token, JmesPathError> {
        let mut value = String::new();
        loop {
            match self.next() {
                None => return Err(self.unclosed('\'')),
                Some('\'') => break,
                Some('\\') => match self.next() {
                    Some('\'') => value.push('\''),
                    Some(other) => {
                        value.push('\\');
                        value.push(other);
                    }
                    None => return Err(self.unclosed('\'')),
                },
                Some(c) => value.push(c),
            }
        }
        Ok(Token::new(
            TokenKind::RawString,
            value,
            start,
            self.pos - start,
        ))
    }

    fn consume_json_literal(&mut self, start: usize) -> Result<Token, JmesPathError> {
        let raw = self.consume_until('`').ok_or_else(|| self.unclosed('`'))?;
        let text = raw.replace("\\`", "`");
        Ok(Token::new(
            TokenKind::JsonLiteral,
            text,
            start,
            self.pos - start,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(expression: &str) -> Vec<TokenKind> {
        tokenize(expression)
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn test_basic_tokens() {
        assert_eq!(
            kinds("foo.bar"),
            vec![
                TokenKind::UnquotedIdentifier,
                TokenKind::Dot,
                TokenKind::UnquotedIdentifier,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_bracket_disambiguation() {
        assert_eq!(
            kinds("[?[][0]"),
            vec![
                TokenKind::Filter,
                TokenKind::Flatten,
                TokenKind::Lbracket,
                TokenKind::Number,
                TokenKind::Rbracket,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_two_char_fallbacks() {
        assert_eq!(
            kinds("a || b | c && d & e"),
            vec![
                TokenKind::UnquotedIdentifier,
                TokenKind::Or,
                TokenKind::UnquotedIdentifier,
                TokenKind::Pipe,
                TokenKind::UnquotedIdentifier,
                TokenKind::And,
                TokenKind::UnquotedIdentifier,
                TokenKind::Expref,
                TokenKind::UnquotedIdentifier,
                TokenKind::Eof,
            ]
        );
        assert_eq!(
            kinds("a <= b < c != !d == e"),
            vec![
                TokenKind::UnquotedIdentifier,
                TokenKind::Lte,
                TokenKind::UnquotedIdentifier,
                TokenKind::Lt,
                TokenKind::UnquotedIdentifier,
                TokenKind::Ne,
                TokenKind::Not,
                TokenKind::UnquotedIdentifier,
                TokenKind::Eq,
                TokenKind::UnquotedIdentifier,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_lone_equals_is_an_error() {
        let err = tokenize("foo = bar").unwrap_err();
        assert!(matches!(err, JmesPathError::Syntax { offset: 4, .. }));
    }

    #[test]
    fn test_numbers_including_negative() {
        let tokens = tokenize("[-12]").unwrap();
        assert_eq!(tokens[1].kind, TokenKind::Number);
        assert_eq!(tokens[1].text, "-12");
        assert_eq!(tokens[1].position, 1);
        assert_eq!(tokens[1].length, 3);
    }

    #[test]
    fn test_quoted_identifier_decodes_escapes() {
        let tokens = tokenize(r#""foo\nbar""#).unwrap();
        assert_eq!(tokens[0].kind, TokenKind::QuotedIdentifier);
        assert_eq!(tokens[0].text, "foo\nbar");
        assert_eq!(tokens[0].position, 0);
    }

    #[test]
    fn test_quoted_identifier_decodes_surrogate_pairs() {
        let tokens = tokenize(r#""\ud83d\ude00""#).unwrap();
        assert_eq!(tokens[0].text, "\u{1F600}");
    }

    #[test]
    fn test_raw_string_only_unescapes_single_quote() {
        let tokens = tokenize(r"'a\'b\nc'").unwrap();
        assert_eq!(tokens[0].kind, TokenKind::RawString);
        assert_eq!(tokens[0].text, "a'b\\nc");
    }

    #[test]
    fn test_json_literal_unescapes_backtick() {
        let tokens = tokenize(r"`\`inner\``").unwrap();
        assert_eq!(tokens[0].kind, TokenKind::JsonLiteral);
        assert_eq!(tokens[0].text, "`inner`");
    }

    #[test]
    fn test_unclosed_delimiters_error_at_end_of_input() {
        for expression in ["\"abc", "'abc", "`abc"] {
            let err = tokenize(expression).unwrap_err();
            match err {
                JmesPathError::Syntax { offset, .. } => assert_eq!(offset, expression.len()),
                _ => panic!("expected Syntax"),
            }
        }
    }

    #[test]
    fn test_unknown_character_errors_at_offset() {
        let err = tokenize("foo # bar").unwrap_err();
        assert!(matches!(err, JmesPathError::Syntax { offset: 4, .. }));
    }

    #[test]
    fn test_whitespace_is_skipped() {
        assert_eq!(
            kinds(" \t\r\n@ "),
            vec![TokenKind::Current, TokenKind::Eof]
        );
    }

    #[test]
    fn test_eof_position_is_input_length() {
        let tokens = tokenize("foo").unwrap();
        let eof = tokens.last().unwrap();
        assert_eq!(eof.kind, TokenKind::Eof);
        assert_eq!(eof.position, 3);
    }
}
