//! Evaluation entry points and result formatting.
//!
//! Runs the lexer, parser and evaluator in sequence and formats results
//! for display.

use tracing::{debug, trace};

use super::ast::AstNode;
use super::error::EvaluationError;
use super::evaluator::evaluate;
use super::lexer::tokenize;
use super::parser::{DEFAULT_MAX_DEPTH, MAX_DEPTH_CEILING, parse_with_max_depth};
use crate::config::Config;

/// Longest input, in characters, accepted by default.
pub const DEFAULT_MAX_INPUT_LEN: usize = 4096;

/// Highest input length limit accepted; larger requests are clamped to it.
pub const MAX_INPUT_LEN_CEILING: usize = 16_384;

/// Result of evaluating a calculator expression.
#[derive(Clone, Debug, PartialEq)]
pub enum CalcResult {
    /// Successful calculation with a finite result.
    Success {
        /// The trimmed expression.
        expression: String,
        /// The numeric value.
        value: f64,
        /// Formatted for display (with thousand separators when enabled).
        display_result: String,
        /// Formatted as a plain number.
        raw_result: String,
    },
    /// The expression could not be evaluated.
    Error {
        /// The trimmed expression.
        expression: String,
        error: EvaluationError,
    },
}

impl CalcResult {
    /// Get the expression that was evaluated.
    pub fn expression(&self) -> &str {
        match self {
            Self::Success { expression, .. } => expression,
            Self::Error { expression, .. } => expression,
        }
    }

    /// Check if this is a successful result.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Get the display string (result or user-facing error message).
    pub fn display(&self) -> &str {
        match self {
            Self::Success { display_result, .. } => display_result,
            Self::Error { error, .. } => error.user_message(),
        }
    }

    /// Get the plain number (only for successful results).
    pub fn raw(&self) -> Option<&str> {
        match self {
            Self::Success { raw_result, .. } => Some(raw_result),
            Self::Error { .. } => None,
        }
    }
}

/// Evaluate an arithmetic expression with the default limits.
///
/// This is the calculator's main entry point: either a finite number or an
/// [`EvaluationError`] is returned, never both. The call keeps no state
/// between invocations and may be used from any number of threads.
pub fn evaluate_expression(input: &str) -> Result<f64, EvaluationError> {
    Calculator::default().evaluate(input)
}

/// An evaluator with configurable limits and output formatting.
#[derive(Clone, Debug)]
pub struct Calculator {
    max_depth: usize,
    max_input_len: usize,
    thousands_separator: bool,
}

impl Default for Calculator {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_input_len: DEFAULT_MAX_INPUT_LEN,
            thousands_separator: true,
        }
    }
}

impl Calculator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new()
            .with_max_depth(config.max_depth)
            .with_max_input_len(config.max_input_len)
            .with_thousands_separator(config.thousands_separator)
    }

    /// Maximum nesting of parentheses and unary minuses, clamped to
    /// `1..=MAX_DEPTH_CEILING`.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth.clamp(1, MAX_DEPTH_CEILING);
        self
    }

    /// Maximum input length in characters, clamped to
    /// `1..=MAX_INPUT_LEN_CEILING`.
    pub fn with_max_input_len(mut self, max_input_len: usize) -> Self {
        self.max_input_len = max_input_len.clamp(1, MAX_INPUT_LEN_CEILING);
        self
    }

    pub fn with_thousands_separator(mut self, enabled: bool) -> Self {
        self.thousands_separator = enabled;
        self
    }

    /// Tokenize and parse `input` without evaluating it.
    pub fn parse(&self, input: &str) -> Result<AstNode, EvaluationError> {
        let len = input.chars().count();
        if len > self.max_input_len {
            return Err(EvaluationError::InputTooLong {
                len,
                max: self.max_input_len,
            });
        }

        let tokens = tokenize(input)?;
        debug!(len, tokens = tokens.len(), "tokenized expression");

        let ast = parse_with_max_depth(tokens, self.max_depth)?;
        trace!(%ast, "parsed expression");
        Ok(ast)
    }

    /// Evaluate `input` to a finite number.
    pub fn evaluate(&self, input: &str) -> Result<f64, EvaluationError> {
        let outcome = self
            .parse(input)
            .and_then(|ast| evaluate(&ast).map_err(EvaluationError::from));

        match &outcome {
            Ok(value) => debug!(value, "evaluated expression"),
            Err(err) => debug!(error = %err, "expression rejected"),
        }
        outcome
    }

    /// Evaluate `input` and pair the outcome with formatted output.
    pub fn calculate(&self, input: &str) -> CalcResult {
        let expression = input.trim().to_string();

        match self.evaluate(&expression) {
            Ok(value) => {
                let raw_result = format_raw(value);
                let display_result = if self.thousands_separator {
                    group_thousands(&raw_result)
                } else {
                    raw_result.clone()
                };
                CalcResult::Success {
                    expression,
                    value,
                    display_result,
                    raw_result,
                }
            }
            Err(error) => CalcResult::Error { expression, error },
        }
    }
}

/// Format a number for display with thousand separators.
pub fn format_display(value: f64) -> String {
    group_thousands(&format_raw(value))
}

/// Format a number without separators.
///
/// Integral values below 1e15 in magnitude print without a fraction; other
/// values print with at most ten decimals and no trailing zeros.
pub fn format_raw(value: f64) -> String {
    let formatted = if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        let formatted = format!("{:.10}", value);
        formatted
            .trim_end_matches('0')
            .trim_end_matches('.')
            .to_string()
    };

    // Tiny negative values round to "-0".
    if formatted == "-0" {
        "0".to_string()
    } else {
        formatted
    }
}

/// Insert `,` between groups of three digits in the integer part.
fn group_thousands(raw: &str) -> String {
    let (sign, unsigned) = match raw.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", raw),
    };
    let split = unsigned.find('.').unwrap_or(unsigned.len());
    let (int_part, fraction) = unsigned.split_at(split);

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    format!("{}{}{}", sign, grouped, fraction)
}
