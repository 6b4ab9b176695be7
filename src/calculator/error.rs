//! The unified error returned by the calculator entry points.
//!
//! Lexer, parser and evaluator each have their own error enum; callers see a
//! single flattened [`EvaluationError`] and can map it to a user-facing
//! message through [`EvaluationError::category`].

use serde::Serialize;
use thiserror::Error;

use super::evaluator::EvalError;
use super::lexer::LexError;
use super::parser::ParseError;
use super::token::Token;

/// Every way evaluating a string can fail.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum EvaluationError {
    #[error("unexpected character '{ch}' at position {position}")]
    UnexpectedCharacter { ch: char, position: usize },
    #[error("malformed number at position {position}")]
    MalformedNumber { position: usize },
    #[error("empty expression")]
    EmptyExpression,
    #[error("expected {expected} at position {position}, found {found}")]
    UnexpectedToken {
        found: Token,
        expected: &'static str,
        position: usize,
    },
    #[error("unexpected input after the expression at position {position}")]
    TrailingTokens { position: usize },
    #[error("unmatched parenthesis at position {position}")]
    UnmatchedParenthesis { position: usize },
    #[error("division by zero")]
    DivisionByZero,
    #[error("result is not a finite number")]
    NumericOverflow,
    #[error("expression is nested deeper than {limit} levels")]
    MaxDepthExceeded { limit: usize },
    #[error("input is {len} characters long, the limit is {max}")]
    InputTooLong { len: usize, max: usize },
}

/// Coarse grouping of errors for presentation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// The text contains something that is not part of an expression.
    InvalidInput,
    /// Nothing to calculate.
    EmptyInput,
    /// The text is made of valid symbols but is not a valid calculation.
    InvalidCalculation,
}

impl ErrorCategory {
    /// Message shown to the user for this category.
    pub fn message(&self) -> &'static str {
        match self {
            Self::InvalidInput => "Invalid input",
            Self::EmptyInput => "Please enter a calculation",
            Self::InvalidCalculation => "Invalid calculation",
        }
    }
}

impl EvaluationError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::UnexpectedCharacter { .. }
            | Self::MalformedNumber { .. }
            | Self::InputTooLong { .. } => ErrorCategory::InvalidInput,
            Self::EmptyExpression => ErrorCategory::EmptyInput,
            Self::UnexpectedToken { .. }
            | Self::TrailingTokens { .. }
            | Self::UnmatchedParenthesis { .. }
            | Self::DivisionByZero
            | Self::NumericOverflow
            | Self::MaxDepthExceeded { .. } => ErrorCategory::InvalidCalculation,
        }
    }

    /// Shorthand for `self.category().message()`.
    pub fn user_message(&self) -> &'static str {
        self.category().message()
    }

    /// Character offset the error refers to, if any.
    pub fn position(&self) -> Option<usize> {
        match self {
            Self::UnexpectedCharacter { position, .. }
            | Self::MalformedNumber { position }
            | Self::UnexpectedToken { position, .. }
            | Self::TrailingTokens { position }
            | Self::UnmatchedParenthesis { position } => Some(*position),
            _ => None,
        }
    }
}

impl From<LexError> for EvaluationError {
    fn from(err: LexError) -> Self {
        match err {
            LexError::UnexpectedCharacter(ch, position) => {
                Self::UnexpectedCharacter { ch, position }
            }
            LexError::MalformedNumber(position) => Self::MalformedNumber { position },
        }
    }
}

impl From<ParseError> for EvaluationError {
    fn from(err: ParseError) -> Self {
        match err {
            ParseError::UnexpectedToken {
                found,
                expected,
                position,
            } => Self::UnexpectedToken {
                found,
                expected,
                position,
            },
            ParseError::UnmatchedParenthesis(position) => Self::UnmatchedParenthesis { position },
            ParseError::EmptyExpression => Self::EmptyExpression,
            ParseError::TrailingTokens(position) => Self::TrailingTokens { position },
            ParseError::MaxDepthExceeded(limit) => Self::MaxDepthExceeded { limit },
        }
    }
}

impl From<EvalError> for EvaluationError {
    fn from(err: EvalError) -> Self {
        match err {
            EvalError::DivisionByZero => Self::DivisionByZero,
            EvalError::NumericOverflow => Self::NumericOverflow,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flattens_stage_errors() {
        assert_eq!(
            EvaluationError::from(LexError::UnexpectedCharacter('a', 4)),
            EvaluationError::UnexpectedCharacter { ch: 'a', position: 4 }
        );
        assert_eq!(
            EvaluationError::from(ParseError::MaxDepthExceeded(64)),
            EvaluationError::MaxDepthExceeded { limit: 64 }
        );
        assert_eq!(
            EvaluationError::from(EvalError::DivisionByZero),
            EvaluationError::DivisionByZero
        );
    }

    #[test]
    fn test_user_messages() {
        assert_eq!(
            EvaluationError::MalformedNumber { position: 0 }.user_message(),
            "Invalid input"
        );
        assert_eq!(
            EvaluationError::EmptyExpression.user_message(),
            "Please enter a calculation"
        );
        assert_eq!(
            EvaluationError::UnmatchedParenthesis { position: 0 }.user_message(),
            "Invalid calculation"
        );
        assert_eq!(
            EvaluationError::NumericOverflow.category(),
            ErrorCategory::InvalidCalculation
        );
    }

    #[test]
    fn test_position() {
        assert_eq!(
            EvaluationError::TrailingTokens { position: 3 }.position(),
            Some(3)
        );
        assert_eq!(EvaluationError::DivisionByZero.position(), None);
    }

    #[test]
    fn test_display() {
        let err = EvaluationError::UnexpectedToken {
            found: Token::End,
            expected: "a number or '('",
            position: 3,
        };
        assert_eq!(
            err.to_string(),
            "expected a number or '(' at position 3, found end of input"
        );
    }
}
