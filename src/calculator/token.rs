//! Tokens produced by the lexer.

use std::fmt;

/// A single lexical unit of an arithmetic expression.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Token {
    /// A non-negative numeric literal. Signs are handled by the parser.
    Number(f64),
    Plus,
    Minus,
    Star,
    Slash,
    LParen,
    RParen,
    /// Terminal marker, always the last token of a sequence.
    End,
}

impl Token {
    /// Whether this is the terminal `End` marker.
    pub fn is_end(&self) -> bool {
        matches!(self, Self::End)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(value) => write!(f, "number {}", value),
            Self::Plus => f.write_str("'+'"),
            Self::Minus => f.write_str("'-'"),
            Self::Star => f.write_str("'*'"),
            Self::Slash => f.write_str("'/'"),
            Self::LParen => f.write_str("'('"),
            Self::RParen => f.write_str("')'"),
            Self::End => f.write_str("end of input"),
        }
    }
}

/// A token together with the character offset where it starts.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpannedToken {
    pub token: Token,
    /// Zero-based character offset into the input.
    pub position: usize,
}

impl SpannedToken {
    pub fn new(token: Token, position: usize) -> Self {
        Self { token, position }
    }
}
