//! Prelude module - common imports for tally users
//!
//! ```rust
//! use tally::prelude::*;
//! ```

pub use crate::{
    // Extension traits
    BufferEvaluationExt,
    // Suggestions
    Catalog,
    // Error types
    Error,
    EvaluationOptions,
    FormulaError,
    // Main types
    FormulaBuffer,
    // Editing
    Key,
    Outcome,
    Result,
    Segment,
    Session,
    SessionOptions,
    Suggestion,
    SuggestionSource,
    Tag,
    TagId,
};
