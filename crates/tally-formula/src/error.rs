//! Formula error types

use thiserror::Error;

/// Result type for formula operations
pub type FormulaResult<T> = std::result::Result<T, FormulaError>;

/// Errors that can occur during formula evaluation
///
/// These are ordinary outcomes while a formula is being typed; the
/// `Display` text is meant to be shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormulaError {
    /// A `)` without a matching `(`, or an unclosed `(`
    #[error("Unbalanced parentheses")]
    UnbalancedParentheses,

    /// Something other than digits, operators, '.', parentheses or spaces
    /// survived tag substitution
    #[error("Formula contains invalid characters: '{0}'")]
    InvalidCharacters(char),

    /// Divisor evaluated to zero
    #[error("Division by zero")]
    DivisionByZero,

    /// Any other syntax error
    #[error("Malformed expression: {0}")]
    MalformedExpression(String),

    /// Result is infinite or not a number
    #[error("Result is not a finite number")]
    NonFiniteResult,
}

impl FormulaError {
    pub(crate) fn malformed(msg: impl Into<String>) -> Self {
        FormulaError::MalformedExpression(msg.into())
    }
}
