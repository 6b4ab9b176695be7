//! Tree-walking evaluation of parsed expressions.

use thiserror::Error;

use super::ast::{AstNode, OperatorKind};

/// Runtime faults detected while computing a result.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum EvalError {
    #[error("division by zero")]
    DivisionByZero,
    #[error("result is not a finite number")]
    NumericOverflow,
}

/// Pending work for the post-order walk.
enum Step<'a> {
    Visit(&'a AstNode),
    Negate,
    Apply(OperatorKind),
}

/// Evaluate a tree to a finite number.
///
/// The walk is post-order over an explicit work stack, so arbitrarily deep
/// trees do not grow the native call stack. Every intermediate value must be
/// finite; the divisor is checked for zero before dividing.
pub fn evaluate(ast: &AstNode) -> Result<f64, EvalError> {
    let mut steps = vec![Step::Visit(ast)];
    let mut values: Vec<f64> = Vec::new();

    while let Some(step) = steps.pop() {
        match step {
            Step::Visit(AstNode::Literal(value)) => values.push(finite(*value)?),
            Step::Visit(AstNode::UnaryNegate(operand)) => {
                steps.push(Step::Negate);
                steps.push(Step::Visit(operand));
            }
            Step::Visit(AstNode::BinaryOp { op, left, right }) => {
                steps.push(Step::Apply(*op));
                steps.push(Step::Visit(right));
                steps.push(Step::Visit(left));
            }
            Step::Negate => {
                let Some(value) = values.pop() else {
                    unreachable!("negation without an operand");
                };
                values.push(-value);
            }
            Step::Apply(op) => {
                let (Some(rhs), Some(lhs)) = (values.pop(), values.pop()) else {
                    unreachable!("binary operator without two operands");
                };
                values.push(apply(op, lhs, rhs)?);
            }
        }
    }

    match values.pop() {
        Some(value) => Ok(value),
        None => unreachable!("evaluation produced no value"),
    }
}

fn apply(op: OperatorKind, lhs: f64, rhs: f64) -> Result<f64, EvalError> {
    let result = match op {
        OperatorKind::Add => lhs + rhs,
        OperatorKind::Sub => lhs - rhs,
        OperatorKind::Mul => lhs * rhs,
        OperatorKind::Div => {
            // Also matches -0.0.
            if rhs == 0.0 {
                return Err(EvalError::DivisionByZero);
            }
            lhs / rhs
        }
    };
    finite(result)
}

fn finite(value: f64) -> Result<f64, EvalError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(EvalError::NumericOverflow)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit(value: f64) -> AstNode {
        AstNode::literal(value)
    }

    #[test]
    fn test_literal_and_negation() {
        assert_eq!(evaluate(&lit(4.5)), Ok(4.5));
        assert_eq!(evaluate(&AstNode::negate(lit(4.5))), Ok(-4.5));
        assert_eq!(evaluate(&AstNode::negate(AstNode::negate(lit(2.0)))), Ok(2.0));
    }

    #[test]
    fn test_binary_operators() {
        let add = AstNode::binary(OperatorKind::Add, lit(2.0), lit(3.0));
        let sub = AstNode::binary(OperatorKind::Sub, lit(2.0), lit(3.0));
        let mul = AstNode::binary(OperatorKind::Mul, lit(2.0), lit(3.0));
        let div = AstNode::binary(OperatorKind::Div, lit(3.0), lit(2.0));
        assert_eq!(evaluate(&add), Ok(5.0));
        assert_eq!(evaluate(&sub), Ok(-1.0));
        assert_eq!(evaluate(&mul), Ok(6.0));
        assert_eq!(evaluate(&div), Ok(1.5));
    }

    #[test]
    fn test_operand_order_is_preserved() {
        // (8 - 3) - 2
        let tree = AstNode::binary(
            OperatorKind::Sub,
            AstNode::binary(OperatorKind::Sub, lit(8.0), lit(3.0)),
            lit(2.0),
        );
        assert_eq!(evaluate(&tree), Ok(3.0));

        // 8 - (3 - 2)
        let tree = AstNode::binary(
            OperatorKind::Sub,
            lit(8.0),
            AstNode::binary(OperatorKind::Sub, lit(3.0), lit(2.0)),
        );
        assert_eq!(evaluate(&tree), Ok(7.0));
    }

    #[test]
    fn test_division_by_zero() {
        let tree = AstNode::binary(OperatorKind::Div, lit(5.0), lit(0.0));
        assert_eq!(evaluate(&tree), Err(EvalError::DivisionByZero));

        let negative_zero = AstNode::binary(
            OperatorKind::Div,
            lit(5.0),
            AstNode::negate(lit(0.0)),
        );
        assert_eq!(evaluate(&negative_zero), Err(EvalError::DivisionByZero));

        let zero_by_zero = AstNode::binary(OperatorKind::Div, lit(0.0), lit(0.0));
        assert_eq!(evaluate(&zero_by_zero), Err(EvalError::DivisionByZero));
    }

    #[test]
    fn test_overflow() {
        let tree = AstNode::binary(OperatorKind::Mul, lit(f64::MAX), lit(2.0));
        assert_eq!(evaluate(&tree), Err(EvalError::NumericOverflow));

        let tree = AstNode::binary(
            OperatorKind::Sub,
            AstNode::negate(lit(f64::MAX)),
            lit(f64::MAX),
        );
        assert_eq!(evaluate(&tree), Err(EvalError::NumericOverflow));
    }

    #[test]
    fn test_non_finite_literal() {
        assert_eq!(evaluate(&lit(f64::INFINITY)), Err(EvalError::NumericOverflow));
        assert_eq!(evaluate(&lit(f64::NAN)), Err(EvalError::NumericOverflow));
    }

    #[test]
    fn test_deep_tree_does_not_recurse() {
        let mut tree = lit(1.0);
        for _ in 0..100_000 {
            tree = AstNode::negate(tree);
        }
        assert_eq!(evaluate(&tree), Ok(1.0));
    }

    #[test]
    fn test_long_chain() {
        let mut tree = lit(0.0);
        for _ in 0..1_000_000 {
            tree = AstNode::binary(OperatorKind::Add, tree, lit(1.0));
        }
        assert_eq!(evaluate(&tree), Ok(1_000_000.0));
    }

    #[test]
    fn test_deterministic() {
        let tree = AstNode::binary(OperatorKind::Div, lit(1.0), lit(3.0));
        let first = evaluate(&tree).unwrap();
        for _ in 0..10 {
            assert_eq!(evaluate(&tree).unwrap().to_bits(), first.to_bits());
        }
    }
}
