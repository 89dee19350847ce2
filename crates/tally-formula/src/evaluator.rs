//! Formula evaluator
//!
//! Takes buffer text plus its tags all the way to a number:
//!
//! 1. blank text has no value
//! 2. tags are substituted by their values
//! 3. parentheses must balance
//! 4. one trailing operator is dropped
//! 5. blank remainder has no value
//! 6. only arithmetic characters may remain
//! 7. the remainder is parsed and evaluated

use crate::ast::{BinaryOperator, Expr, UnaryOperator};
use crate::error::{FormulaError, FormulaResult};
use crate::parser::{parse_expression_with_depth, DEFAULT_MAX_DEPTH};
use crate::prepare::{check_parentheses, strip_trailing_operator, substitute_tags, validate_characters};
use tally_core::Tag;

/// Options for formula evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvaluationOptions {
    /// Drop a single dangling operator before parsing (default: true)
    pub strip_trailing_operator: bool,
    /// Maximum parenthesis/unary nesting accepted by the parser (default: 64)
    pub max_depth: usize,
}

impl Default for EvaluationOptions {
    fn default() -> Self {
        Self {
            strip_trailing_operator: true,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Evaluate buffer text with the given tags
///
/// Returns `Ok(None)` when there is nothing to evaluate.
///
/// # Example
/// ```rust
/// use tally_formula::{evaluate, FormulaError};
///
/// let no_tags: [tally_core::Tag; 0] = [];
/// assert_eq!(evaluate("3 + 4 * 2", &no_tags), Ok(Some(11.0)));
/// assert_eq!(evaluate("3 +", &no_tags), Ok(Some(3.0)));
/// assert_eq!(evaluate("3 / 0", &no_tags), Err(FormulaError::DivisionByZero));
/// ```
pub fn evaluate<'a, I>(text: &str, tags: I) -> FormulaResult<Option<f64>>
where
    I: IntoIterator<Item = &'a Tag>,
{
    evaluate_with_options(text, tags, &EvaluationOptions::default())
}

/// Evaluate buffer text with the given tags and options
pub fn evaluate_with_options<'a, I>(
    text: &str,
    tags: I,
    options: &EvaluationOptions,
) -> FormulaResult<Option<f64>>
where
    I: IntoIterator<Item = &'a Tag>,
{
    if text.trim().is_empty() {
        return Ok(None);
    }

    let substituted = substitute_tags(text, tags);
    check_parentheses(&substituted)?;

    let arithmetic = if options.strip_trailing_operator {
        strip_trailing_operator(&substituted)
    } else {
        &substituted
    };
    if arithmetic.trim().is_empty() {
        return Ok(None);
    }

    validate_characters(arithmetic)?;
    let expr = parse_expression_with_depth(arithmetic, options.max_depth)?;
    let value = evaluate_expr(&expr)?;

    tracing::debug!(formula = %arithmetic, parsed = %expr, value, "evaluated formula");
    Ok(Some(value))
}

/// Evaluate a parsed expression
pub fn evaluate_expr(expr: &Expr) -> FormulaResult<f64> {
    match expr {
        Expr::Number(n) => finite(*n),
        Expr::BinaryOp { op, left, right } => {
            let l = evaluate_expr(left)?;
            let r = evaluate_expr(right)?;
            evaluate_binary_op(*op, l, r)
        }
        Expr::Chain { first, rest } => {
            let mut acc = evaluate_expr(first)?;
            for (op, operand) in rest {
                let r = evaluate_expr(operand)?;
                acc = evaluate_binary_op(*op, acc, r)?;
            }
            Ok(acc)
        }
        Expr::UnaryOp { op, operand } => evaluate_unary_op(*op, operand),
    }
}

fn finite(value: f64) -> FormulaResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(FormulaError::NonFiniteResult)
    }
}

/// Apply a binary operator to two evaluated operands
fn evaluate_binary_op(op: BinaryOperator, l: f64, r: f64) -> FormulaResult<f64> {
    let value = match op {
        BinaryOperator::Add => l + r,
        BinaryOperator::Subtract => l - r,
        BinaryOperator::Multiply => l * r,
        BinaryOperator::Divide => {
            if r == 0.0 {
                return Err(FormulaError::DivisionByZero);
            }
            l / r
        }
        BinaryOperator::Power => l.powf(r),
    };
    finite(value)
}

/// Evaluate a unary operation
fn evaluate_unary_op(op: UnaryOperator, operand: &Expr) -> FormulaResult<f64> {
    let n = evaluate_expr(operand)?;
    match op {
        UnaryOperator::Negate => finite(-n),
        UnaryOperator::Plus => finite(n),
    }
}
