//! Calculator module for evaluating arithmetic expressions.
//!
//! Input flows through three pure stages:
//! - [`tokenize`] turns text into tokens
//! - [`parse`] builds an [`AstNode`] tree honouring precedence
//! - [`evaluate`] walks the tree to a finite number
//!
//! [`evaluate_expression`] runs the whole pipeline and reports failures as a
//! single [`EvaluationError`].

mod ast;
mod detection;
mod error;
mod evaluation;
mod evaluator;
mod lexer;
mod parser;
mod token;

pub use ast::{AstNode, OperatorKind};
pub use detection::looks_like_expression;
pub use error::{ErrorCategory, EvaluationError};
pub use evaluation::{
    CalcResult, Calculator, DEFAULT_MAX_INPUT_LEN, MAX_INPUT_LEN_CEILING, evaluate_expression, format_display,
    format_raw,
};
pub use evaluator::{EvalError, evaluate};
pub use lexer::{LexError, tokenize};
pub use parser::{
    DEFAULT_MAX_DEPTH, MAX_DEPTH_CEILING, ParseError, parse, parse_with_max_depth,
};
pub use token::{SpannedToken, Token};
