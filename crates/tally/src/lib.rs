//! # tally
//!
//! Single-line formulas that mix typed arithmetic with named variable tags.
//!
//! Tally keeps a formula like `(Revenue - Expenses) * 2` as text plus a set
//! of tags anchored in that text, keeps the tags aligned as the formula is
//! edited, and evaluates it with a purpose-built arithmetic parser.
//!
//! ## Features
//!
//! - Position-consistent tag model ([`FormulaBuffer`])
//! - Safe arithmetic evaluation (no general-purpose interpreter)
//! - Keystroke-level editing policy ([`Session`])
//! - Pluggable suggestion sources with a built-in [`Catalog`]
//!
//! ## Example
//!
//! ```rust
//! use tally::prelude::*;
//!
//! let mut session = Session::new(Catalog::builtin());
//!
//! for c in "rev".chars() {
//!     session.handle_key(Key::Char(c)).unwrap();
//! }
//! let revenue = session.suggestions()[0].clone();
//! session.select(revenue).unwrap();
//!
//! session.handle_key(Key::Operator('*')).unwrap();
//! session.handle_key(Key::Digit('2')).unwrap();
//!
//! assert_eq!(session.buffer().text(), "Revenue*2");
//! assert_eq!(session.evaluate(), Outcome::Value(2000.0));
//! ```

pub mod outcome;
pub mod prelude;
pub mod session;
pub mod suggest;

pub use outcome::Outcome;
pub use session::{Key, Session, SessionOptions};
pub use suggest::{Catalog, SuggestionSource};

// Re-export core types
pub use tally_core::{
    is_operator, Error, FormulaBuffer, InvariantViolation, Result, Segment, Segments, Suggestion,
    Tag, TagId, OPERATORS,
};

// Re-export formula types
pub use tally_formula::{
    evaluate, evaluate_with_options, parse_expression, EvaluationOptions, Expr, FormulaError,
    FormulaResult,
};

/// Extension trait for FormulaBuffer to evaluate its own contents
pub trait BufferEvaluationExt {
    /// Evaluate the buffer's text and tags
    fn evaluate(&self) -> FormulaResult<Option<f64>>;

    /// Evaluate with explicit options
    fn evaluate_with_options(&self, options: &EvaluationOptions) -> FormulaResult<Option<f64>>;

    /// Evaluate and wrap the result for display
    fn outcome(&self) -> Outcome {
        self.evaluate().into()
    }
}

impl BufferEvaluationExt for FormulaBuffer {
    fn evaluate(&self) -> FormulaResult<Option<f64>> {
        tally_formula::evaluate(self.text(), self.tags())
    }

    fn evaluate_with_options(&self, options: &EvaluationOptions) -> FormulaResult<Option<f64>> {
        tally_formula::evaluate_with_options(self.text(), self.tags(), options)
    }
}
