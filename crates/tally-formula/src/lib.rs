//! # tally-formula
//!
//! Arithmetic evaluator for tally formulas.
//!
//! This crate provides:
//! - Tag substitution (buffer text + tags → plain arithmetic)
//! - Input checks (parentheses, trailing operators, character whitelist)
//! - Formula parsing (text → AST) with a recursive-descent parser
//! - Formula evaluation (AST → number)
//!
//! No general-purpose interpreter is involved at any point: the only
//! accepted input is numbers, `+ - * / ^`, parentheses and spaces.
//!
//! ## Example
//!
//! ```rust
//! use tally_core::Tag;
//! use tally_formula::evaluate;
//!
//! let tags = [Tag::new(1, "Revenue", 1000.0, 0)];
//! assert_eq!(evaluate("Revenue * 2", &tags).unwrap(), Some(2000.0));
//! assert_eq!(evaluate("   ", &tags).unwrap(), None);
//! ```

pub mod ast;
pub mod error;
pub mod evaluator;
pub mod parser;
pub mod prepare;

pub use ast::{BinaryOperator, Expr, UnaryOperator};
pub use error::{FormulaError, FormulaResult};
pub use evaluator::{evaluate, evaluate_expr, evaluate_with_options, EvaluationOptions};
pub use parser::{parse_expression, parse_expression_with_depth};
pub use prepare::{check_parentheses, strip_trailing_operator, substitute_tags, validate_characters};
