//! Recursive-descent parser for arithmetic expressions.
//!
//! Grammar, lowest precedence first:
//!
//! ```text
//! expression := term (("+" | "-") term)*
//! term       := factor (("*" | "/") factor)*
//! factor     := "-" factor | primary
//! primary    := Number | "(" expression ")"
//! ```
//!
//! Binary operators are left-associative and folded iteratively. Only unary
//! minus and parenthesised groups recurse, and each of those counts one level
//! of nesting against the configured maximum depth.

use thiserror::Error;

use super::ast::{AstNode, OperatorKind};
use super::token::{SpannedToken, Token};

/// Nesting limit used by [`parse`].
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Highest nesting limit accepted; larger requests are clamped to it.
pub const MAX_DEPTH_CEILING: usize = 256;

/// Errors raised while building the expression tree.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ParseError {
    #[error("expected {expected} at position {position}, found {found}")]
    UnexpectedToken {
        found: Token,
        expected: &'static str,
        position: usize,
    },
    #[error("unmatched parenthesis at position {0}")]
    UnmatchedParenthesis(usize),
    #[error("empty expression")]
    EmptyExpression,
    #[error("unexpected input after the expression at position {0}")]
    TrailingTokens(usize),
    #[error("expression is nested deeper than {0} levels")]
    MaxDepthExceeded(usize),
}

/// Parse a token sequence with the default nesting limit.
pub fn parse(tokens: Vec<SpannedToken>) -> Result<AstNode, ParseError> {
    parse_with_max_depth(tokens, DEFAULT_MAX_DEPTH)
}

/// Parse a token sequence, failing with [`ParseError::MaxDepthExceeded`] once
/// unary minuses and parentheses nest deeper than `max_depth`.
///
/// `max_depth` is clamped to [`MAX_DEPTH_CEILING`], since each level costs
/// native stack.
pub fn parse_with_max_depth(
    tokens: Vec<SpannedToken>,
    max_depth: usize,
) -> Result<AstNode, ParseError> {
    Parser::new(tokens, max_depth.min(MAX_DEPTH_CEILING)).parse()
}

struct Parser {
    tokens: Vec<SpannedToken>,
    index: usize,
    end: SpannedToken,
    /// Positions of the currently open parentheses, innermost last.
    open_parens: Vec<usize>,
    max_depth: usize,
}

impl Parser {
    fn new(tokens: Vec<SpannedToken>, max_depth: usize) -> Self {
        // Tolerate sequences without the terminal marker.
        let end_position = match tokens.last() {
            Some(last) if last.token.is_end() => last.position,
            Some(last) => last.position + 1,
            None => 0,
        };
        Self {
            tokens,
            index: 0,
            end: SpannedToken::new(Token::End, end_position),
            open_parens: Vec::new(),
            max_depth,
        }
    }

    fn peek(&self) -> SpannedToken {
        self.tokens.get(self.index).copied().unwrap_or(self.end)
    }

    fn bump(&mut self) -> SpannedToken {
        let current = self.peek();
        if !current.token.is_end() {
            self.index += 1;
        }
        current
    }

    fn descend(&self, depth: usize) -> Result<usize, ParseError> {
        let depth = depth + 1;
        if depth > self.max_depth {
            return Err(ParseError::MaxDepthExceeded(self.max_depth));
        }
        Ok(depth)
    }

    fn parse(mut self) -> Result<AstNode, ParseError> {
        if self.peek().token.is_end() {
            return Err(ParseError::EmptyExpression);
        }

        let tree = self.expression(0)?;

        let next = self.peek();
        match next.token {
            Token::End => Ok(tree),
            Token::RParen => Err(ParseError::UnmatchedParenthesis(next.position)),
            _ => Err(ParseError::TrailingTokens(next.position)),
        }
    }

    fn expression(&mut self, depth: usize) -> Result<AstNode, ParseError> {
        let mut node = self.term(depth)?;
        loop {
            let op = match self.peek().token {
                Token::Plus => OperatorKind::Add,
                Token::Minus => OperatorKind::Sub,
                _ => break,
            };
            self.bump();
            let rhs = self.term(depth)?;
            node = AstNode::binary(op, node, rhs);
        }
        Ok(node)
    }

    fn term(&mut self, depth: usize) -> Result<AstNode, ParseError> {
        let mut node = self.factor(depth)?;
        loop {
            let op = match self.peek().token {
                Token::Star => OperatorKind::Mul,
                Token::Slash => OperatorKind::Div,
                _ => break,
            };
            self.bump();
            let rhs = self.factor(depth)?;
            node = AstNode::binary(op, node, rhs);
        }
        Ok(node)
    }

    fn factor(&mut self, depth: usize) -> Result<AstNode, ParseError> {
        if self.peek().token == Token::Minus {
            self.bump();
            let depth = self.descend(depth)?;
            return Ok(AstNode::negate(self.factor(depth)?));
        }
        self.primary(depth)
    }

    fn primary(&mut self, depth: usize) -> Result<AstNode, ParseError> {
        let next = self.bump();
        match next.token {
            Token::Number(value) => Ok(AstNode::literal(value)),
            Token::LParen => {
                let depth = self.descend(depth)?;
                self.open_parens.push(next.position);
                let inner = self.expression(depth)?;

                let close = self.peek();
                match close.token {
                    Token::RParen => {
                        self.bump();
                        self.open_parens.pop();
                        Ok(inner)
                    }
                    Token::End => Err(ParseError::UnmatchedParenthesis(next.position)),
                    found => Err(ParseError::UnexpectedToken {
                        found,
                        expected: "')'",
                        position: close.position,
                    }),
                }
            }
            // Running out of input inside a group means the group never closes.
            Token::End if !self.open_parens.is_empty() => {
                let innermost = self.open_parens.last().copied().unwrap_or_default();
                Err(ParseError::UnmatchedParenthesis(innermost))
            }
            found => Err(ParseError::UnexpectedToken {
                found,
                expected: "a number or '('",
                position: next.position,
            }),
        }
    }
}
