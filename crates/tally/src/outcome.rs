//! Displayable evaluation outcomes

use crate::{FormulaError, FormulaResult};
use std::fmt;

/// What a front end shows under the formula after each edit
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Nothing to evaluate yet
    NoValue,
    /// A finite result
    Value(f64),
    /// The formula cannot be evaluated as typed
    Error(FormulaError),
}

impl Outcome {
    /// The numeric result, if any
    pub fn value(&self) -> Option<f64> {
        match self {
            Outcome::Value(v) => Some(*v),
            _ => None,
        }
    }

    /// The evaluation error, if any
    pub fn error(&self) -> Option<&FormulaError> {
        match self {
            Outcome::Error(e) => Some(e),
            _ => None,
        }
    }

    pub fn is_no_value(&self) -> bool {
        matches!(self, Outcome::NoValue)
    }
}

impl From<FormulaResult<Option<f64>>> for Outcome {
    fn from(result: FormulaResult<Option<f64>>) -> Self {
        match result {
            Ok(Some(v)) => Outcome::Value(v),
            Ok(None) => Outcome::NoValue,
            Err(e) => Outcome::Error(e),
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::NoValue => f.write_str("No value"),
            Outcome::Value(v) => write!(f, "Result: {v}"),
            Outcome::Error(e) => write!(f, "Error: {e}"),
        }
    }
}
