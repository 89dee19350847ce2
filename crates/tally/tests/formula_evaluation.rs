//! Tests for evaluating buffers that mix typed text and tags

use pretty_assertions::assert_eq;
use tally::prelude::*;
use tally::{evaluate, parse_expression, Expr};

/// Build a buffer by appending text runs and tags left to right
fn build(parts: &[(&str, Option<f64>)]) -> FormulaBuffer {
    let mut buffer = FormulaBuffer::new();
    let mut next_id = 1;
    for (text, value) in parts {
        let at = buffer.len();
        match value {
            Some(value) => {
                buffer
                    .insert_tag(Suggestion::new(TagId(next_id), *text, *value), at)
                    .unwrap();
                next_id += 1;
            }
            None => buffer.insert_text(at, text).unwrap(),
        }
    }
    buffer
}

fn text(s: &str) -> FormulaBuffer {
    build(&[(s, None)])
}

/// Test plain arithmetic without tags
#[test]
fn test_evaluate_simple_formulas() {
    assert_eq!(text("3 + 4 * 2").evaluate(), Ok(Some(11.0)));
    assert_eq!(text("(3 + 4) * 2").evaluate(), Ok(Some(14.0)));
    assert_eq!(text("10 / 4").evaluate(), Ok(Some(2.5)));
    assert_eq!(text("2^3^2").evaluate(), Ok(Some(512.0)));
    assert_eq!(text("-2^2").evaluate(), Ok(Some(-4.0)));
    assert_eq!(text("--3").evaluate(), Ok(Some(3.0)));
}

/// Test a formula that is a single tag
#[test]
fn test_evaluate_single_tag() {
    let buffer = build(&[("A", Some(5.0))]);
    assert_eq!(buffer.evaluate(), Ok(Some(5.0)));
}

/// Test tags substituted among operators
#[test]
fn test_evaluate_with_tags() {
    let buffer = build(&[
        ("(", None),
        ("Revenue", Some(1000.0)),
        (" - ", None),
        ("Expenses", Some(500.0)),
        (") * ", None),
        ("TaxRate", Some(0.5)),
    ]);
    assert_eq!(buffer.text(), "(Revenue - Expenses) * TaxRate");
    assert_eq!(buffer.evaluate(), Ok(Some(250.0)));
}

/// Test that tag values do not depend on how the buffer was edited
#[test]
fn test_evaluate_after_edits() {
    let mut buffer = build(&[("Revenue", Some(1000.0)), ("/", None)]);
    buffer
        .insert_tag(Suggestion::new(TagId(9), "Employees", 50.0), 8)
        .unwrap();
    buffer.insert_text(0, "2*").unwrap();
    assert_eq!(buffer.text(), "2*Revenue/Employees");
    assert_eq!(buffer.evaluate(), Ok(Some(40.0)));

    buffer.delete_range(0, 2).unwrap();
    assert_eq!(buffer.evaluate(), Ok(Some(20.0)));
}

/// Test that a dangling operator is ignored while typing
#[test]
fn test_trailing_operator() {
    assert_eq!(text("3 +").evaluate(), Ok(Some(3.0)));
    assert_eq!(build(&[("Profit", Some(500.0)), ("*", None)]).evaluate(), Ok(Some(500.0)));

    let strict = EvaluationOptions {
        strip_trailing_operator: false,
        ..Default::default()
    };
    assert!(matches!(
        text("3 +").evaluate_with_options(&strict),
        Err(FormulaError::MalformedExpression(_))
    ));
}

/// Test formulas that have nothing to evaluate
#[test]
fn test_no_value() {
    assert_eq!(FormulaBuffer::new().evaluate(), Ok(None));
    assert_eq!(text("   ").evaluate(), Ok(None));
    assert!(text("   ").outcome().is_no_value());
}

/// Test the errors a user can run into while typing
#[test]
fn test_evaluation_errors() {
    assert_eq!(
        text("(3 + 4").evaluate(),
        Err(FormulaError::UnbalancedParentheses)
    );
    assert_eq!(text("3 / 0").evaluate(), Err(FormulaError::DivisionByZero));
    assert_eq!(
        text("3 + x").evaluate(),
        Err(FormulaError::InvalidCharacters('x'))
    );
    assert_eq!(text("0^-1").evaluate(), Err(FormulaError::NonFiniteResult));
    assert!(matches!(
        text("3 4").evaluate(),
        Err(FormulaError::MalformedExpression(_))
    ));
}

/// Test that a tag whose value is zero still divides by zero
#[test]
fn test_division_by_zero_tag() {
    let buffer = build(&[("1/", None), ("Headcount", Some(0.0))]);
    assert_eq!(buffer.evaluate(), Err(FormulaError::DivisionByZero));
}

/// Test the display form of outcomes
#[test]
fn test_outcome_messages() {
    assert_eq!(text("3 + 4 * 2").outcome().to_string(), "Result: 11");
    assert_eq!(
        text("3 / 0").outcome().to_string(),
        "Error: Division by zero"
    );
    assert_eq!(
        text("3 + x").outcome().to_string(),
        "Error: Formula contains invalid characters: 'x'"
    );
}

/// Test the free functions against the buffer's own evaluation
#[test]
fn test_free_functions() {
    let buffer = build(&[("Revenue", Some(1000.0)), ("*2", None)]);
    assert_eq!(evaluate(buffer.text(), buffer.tags()), buffer.evaluate());

    let ast = parse_expression("1+2").unwrap();
    assert!(matches!(ast, Expr::Chain { .. }));
}

/// Test that formula width does not count as nesting
#[test]
fn test_long_formulas() {
    let mut buffer = build(&[("Revenue", Some(1000.0))]);
    let at = buffer.len();
    buffer.insert_text(at, &"+1".repeat(100_000)).unwrap();
    assert_eq!(buffer.evaluate(), Ok(Some(101_000.0)));

    let at = buffer.len();
    buffer.insert_text(at, &"^2".repeat(1_000)).unwrap();
    assert!(matches!(
        buffer.evaluate(),
        Err(FormulaError::MalformedExpression(_))
    ));
}
