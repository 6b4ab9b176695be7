//! Expression detection.
//!
//! Decides cheaply whether input looks like an arithmetic expression worth
//! handing to the evaluator, without tokenizing or evaluating it.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Matches strings made only of characters the grammar knows.
    /// Digits are ASCII only, like the lexer's.
    static ref CALC_CHARS: Regex = Regex::new(r"^[0-9\s\.\+\-\*/()]+$").unwrap();

    /// Matches parentheses that contain something (not empty).
    static ref HAS_PARENS: Regex = Regex::new(r"\([^)]+\)").unwrap();
}

/// Check if input looks like a calculator expression.
///
/// Returns `true` if the trimmed input:
/// 1. Contains only digits, whitespace, `.`, operators and parentheses
/// 2. Is not just a plain (optionally negated) number
/// 3. Has at least one binary operator or non-empty parentheses
///
/// A `true` answer does not mean evaluation will succeed.
pub fn looks_like_expression(input: &str) -> bool {
    let trimmed = input.trim();

    // Too short or empty
    if trimmed.len() < 2 {
        return false;
    }

    // Must contain only characters the lexer accepts
    if !CALC_CHARS.is_match(trimmed) {
        return false;
    }

    // A lone number is not a calculation
    if is_plain_number(trimmed) {
        return false;
    }

    // Must have a binary operator or a non-empty group
    has_operator(trimmed) || HAS_PARENS.is_match(trimmed)
}

/// Check if the input is just a number, with an optional leading minus.
fn is_plain_number(input: &str) -> bool {
    let cleaned: String = input.chars().filter(|c| !c.is_whitespace()).collect();

    // Allow one leading minus for negative numbers
    let to_check = cleaned.strip_prefix('-').unwrap_or(&cleaned);

    !to_check.is_empty() && to_check.chars().all(|c| c.is_ascii_digit() || c == '.')
}

/// Check if input contains a binary operator.
fn has_operator(input: &str) -> bool {
    // Check for +, *, /
    if input.contains(['+', '*', '/']) {
        return true;
    }

    // A minus is binary when it follows an operand.
    let chars: Vec<char> = input.chars().collect();
    chars.iter().enumerate().any(|(i, &c)| {
        c == '-'
            && chars[..i]
                .iter()
                .rev()
                .find(|ch| !ch.is_whitespace())
                .is_some_and(|&prev| prev.is_ascii_digit() || prev == ')')
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_numbers_rejected() {
        assert!(!looks_like_expression("123"));
        assert!(!looks_like_expression("42.5"));
        assert!(!looks_like_expression("-123"));
        assert!(!looks_like_expression("  42  "));
    }

    #[test]
    fn test_expressions_accepted() {
        assert!(looks_like_expression("2+2"));
        assert!(looks_like_expression("2 + 2"));
        assert!(looks_like_expression("10 * 5"));
        assert!(looks_like_expression("100 / 4"));
        assert!(looks_like_expression("(2 + 3) * 4"));
        assert!(looks_like_expression("10 - 5"));
        assert!(looks_like_expression("(-5)"));
    }

    #[test]
    fn test_unary_minus_alone_is_not_an_operator() {
        assert!(!looks_like_expression("--5"));
        assert!(looks_like_expression("2 - -3"));
    }

    #[test]
    fn test_invalid_input_rejected() {
        assert!(!looks_like_expression(""));
        assert!(!looks_like_expression("a"));
        assert!(!looks_like_expression("hello world"));
        assert!(!looks_like_expression("2 ^ 8"));
        assert!(!looks_like_expression("sqrt(4)"));
        assert!(!looks_like_expression("()"));
    }

    #[test]
    fn test_non_ascii_digits_rejected() {
        assert!(!looks_like_expression("٣+٣"));
        assert!(!looks_like_expression("１ + ２"));
        assert!(looks_like_expression("3+3"));
    }
}
