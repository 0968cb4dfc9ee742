use super::ast::{ExpressionNode, PropertyAssignment};
use thiserror::Error;

// ── Errors ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Error)]
#[error("expression syntax error at offset {offset}: {message}")]
pub struct ExpressionError {
    pub message: String,
    pub offset: usize,
}

impl ExpressionError {
    fn new(message: impl Into<String>, offset: usize) -> Self {
        Self {
            message: message.into(),
            offset,
        }
    }
}

// ── Lexer ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Ident(String),
    Str(String),
    Num(f64),
    Bool(bool),
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Colon,
    Comma,
    Dot,
    Semi,
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == '$'
}

fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '$'
}

fn tokenize(input: &str) -> Result<Vec<(Token, usize)>, ExpressionError> {
    let mut tokens = Vec::new();
    let chars: Vec<char> = input.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if c.is_whitespace() {
            i += 1;
            continue;
        }

        let start = i;
        let token = match c {
            '(' => {
                i += 1;
                Token::LParen
            }
            ')' => {
                i += 1;
                Token::RParen
            }
            '{' => {
                i += 1;
                Token::LBrace
            }
            '}' => {
                i += 1;
                Token::RBrace
            }
            '[' => {
                i += 1;
                Token::LBracket
            }
            ']' => {
                i += 1;
                Token::RBracket
            }
            ':' => {
                i += 1;
                Token::Colon
            }
            ',' => {
                i += 1;
                Token::Comma
            }
            '.' => {
                i += 1;
                Token::Dot
            }
            ';' => {
                i += 1;
                Token::Semi
            }
            '"' | '\'' => {
                let quote = c;
                i += 1;
                let mut text = String::new();
                loop {
                    let Some(&c) = chars.get(i) else {
                        return Err(ExpressionError::new("unterminated string literal", start));
                    };
                    i += 1;
                    if c == quote {
                        break;
                    }
                    if c == '\\' {
                        let Some(&escaped) = chars.get(i) else {
                            return Err(ExpressionError::new("dangling escape", i));
                        };
                        i += 1;
                        text.push(match escaped {
                            'n' => '\n',
                            't' => '\t',
                            'r' => '\r',
                            other => other,
                        });
                    } else {
                        text.push(c);
                    }
                }
                Token::Str(text)
            }
            c if c.is_ascii_digit() || c == '-' => {
                i += 1;
                while chars
                    .get(i)
                    .is_some_and(|c| c.is_ascii_digit() || *c == '.' || *c == 'e' || *c == 'E' || *c == '+' || *c == '-')
                {
                    i += 1;
                }
                let text: String = chars[start..i].iter().collect();
                let value = text.parse::<f64>().map_err(|_| {
                    ExpressionError::new(format!("invalid number literal '{text}'"), start)
                })?;
                Token::Num(value)
            }
            c if is_ident_start(c) => {
                i += 1;
                while chars.get(i).is_some_and(|c| is_ident_continue(*c)) {
                    i += 1;
                }
                let text: String = chars[start..i].iter().collect();
                match text.as_str() {
                    "true" => Token::Bool(true),
                    "false" => Token::Bool(false),
                    _ => Token::Ident(text),
                }
            }
            other => {
                return Err(ExpressionError::new(
                    format!("unexpected character '{other}'"),
                    start,
                ));
            }
        };
        tokens.push((token, start));
    }

    Ok(tokens)
}

// ── Recursive-descent parser ─────────────────────────────────────────────────

/// Parser for the small expression language models embed in tool inputs:
/// call expressions, object/array literals, string/number/boolean literals,
/// identifiers, and chained member access.
///
/// The instance is stateless; obtain the shared one through
/// [`super::shared`].
#[derive(Debug, Default)]
pub struct ExpressionParser;

impl ExpressionParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse an input string into a `Program` node.
    pub fn parse(&self, input: &str) -> Result<ExpressionNode, ExpressionError> {
        let tokens = tokenize(input)?;
        if tokens.is_empty() {
            return Err(ExpressionError::new("empty expression", 0));
        }

        let mut cursor = Cursor { tokens, pos: 0 };
        let mut body = Vec::new();
        while !cursor.at_end() {
            let expression = cursor.expression()?;
            body.push(ExpressionNode::ExpressionStatement {
                expression: Box::new(expression),
            });
            // Statements may be separated by semicolons.
            while cursor.eat(&Token::Semi) {}
        }

        Ok(ExpressionNode::Program { body })
    }
}

struct Cursor {
    tokens: Vec<(Token, usize)>,
    pos: usize,
}

impl Cursor {
    fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(t, _)| t)
    }

    fn offset(&self) -> usize {
        self.tokens
            .get(self.pos)
            .or_else(|| self.tokens.last())
            .map_or(0, |(_, off)| *off)
    }

    fn next(&mut self) -> Result<Token, ExpressionError> {
        let Some((token, _)) = self.tokens.get(self.pos) else {
            return Err(ExpressionError::new("unexpected end of input", self.offset()));
        };
        let token = token.clone();
        self.pos += 1;
        Ok(token)
    }

    fn eat(&mut self, expected: &Token) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: &Token, what: &str) -> Result<(), ExpressionError> {
        if self.eat(expected) {
            Ok(())
        } else {
            Err(ExpressionError::new(
                format!("expected {what}"),
                self.offset(),
            ))
        }
    }

    fn expression(&mut self) -> Result<ExpressionNode, ExpressionError> {
        let mut node = self.primary()?;

        // Member access and calls chain onto any primary.
        loop {
            if self.eat(&Token::Dot) {
                let offset = self.offset();
                let Token::Ident(name) = self.next()? else {
                    return Err(ExpressionError::new(
                        "expected identifier after '.'",
                        offset,
                    ));
                };
                node = ExpressionNode::MemberExpression {
                    object: Box::new(node),
                    property: Box::new(ExpressionNode::Identifier(name)),
                };
            } else if self.eat(&Token::LParen) {
                let mut arguments = Vec::new();
                if !self.eat(&Token::RParen) {
                    loop {
                        arguments.push(self.expression()?);
                        if self.eat(&Token::Comma) {
                            continue;
                        }
                        self.expect(&Token::RParen, "')' after call arguments")?;
                        break;
                    }
                }
                node = ExpressionNode::CallExpression {
                    callee: Box::new(node),
                    arguments,
                };
            } else {
                break;
            }
        }

        Ok(node)
    }

    fn primary(&mut self) -> Result<ExpressionNode, ExpressionError> {
        let offset = self.offset();
        match self.next()? {
            Token::Str(s) => Ok(ExpressionNode::StringLiteral(s)),
            Token::Num(n) => Ok(ExpressionNode::NumericLiteral(n)),
            Token::Bool(b) => Ok(ExpressionNode::BooleanLiteral(b)),
            Token::Ident(name) => Ok(ExpressionNode::Identifier(name)),
            Token::LBrace => self.object(),
            Token::LBracket => self.array(),
            Token::LParen => {
                let inner = self.expression()?;
                self.expect(&Token::RParen, "')'")?;
                Ok(inner)
            }
            other => Err(ExpressionError::new(
                format!("unexpected token {other:?}"),
                offset,
            )),
        }
    }

    fn object(&mut self) -> Result<ExpressionNode, ExpressionError> {
        let mut properties = Vec::new();
        if !self.eat(&Token::RBrace) {
            loop {
                let offset = self.offset();
                let key = match self.next()? {
                    Token::Ident(name) => name,
                    Token::Str(s) => s,
                    other => {
                        return Err(ExpressionError::new(
                            format!("expected property key, found {other:?}"),
                            offset,
                        ));
                    }
                };
                self.expect(&Token::Colon, "':' after property key")?;
                let value = self.expression()?;
                properties.push(PropertyAssignment { key, value });

                if self.eat(&Token::Comma) {
                    // Tolerate a trailing comma.
                    if self.eat(&Token::RBrace) {
                        break;
                    }
                    continue;
                }
                self.expect(&Token::RBrace, "'}' after object literal")?;
                break;
            }
        }
        Ok(ExpressionNode::ObjectExpression { properties })
    }

    fn array(&mut self) -> Result<ExpressionNode, ExpressionError> {
        let mut elements = Vec::new();
        if !self.eat(&Token::RBracket) {
            loop {
                elements.push(self.expression()?);
                if self.eat(&Token::Comma) {
                    if self.eat(&Token::RBracket) {
                        break;
                    }
                    continue;
                }
                self.expect(&Token::RBracket, "']' after array literal")?;
                break;
            }
        }
        Ok(ExpressionNode::ArrayExpression { elements })
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
