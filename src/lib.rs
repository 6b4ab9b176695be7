//! Safe arithmetic expression evaluation.
//!
//! Expressions are limited to numbers, `+ - * /`, unary minus and
//! parentheses over `f64`. Nothing in the input is ever executed.
//!
//! ```
//! use safecalc::{EvaluationError, evaluate_expression};
//!
//! assert_eq!(evaluate_expression("2 + 3 * 4"), Ok(14.0));
//! assert_eq!(evaluate_expression("5 / 0"), Err(EvaluationError::DivisionByZero));
//! ```

pub mod calculator;
pub mod config;

pub use calculator::{CalcResult, Calculator, ErrorCategory, EvaluationError, evaluate_expression};
pub use config::{Config, ConfigError};
