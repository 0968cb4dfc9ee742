//! Parser for structured literal expressions embedded in tool-input text.
//!
//! Models sometimes hand a tool an input that is itself a small expression
//! (`search({query: "x", limit: 3})`) rather than a flat string. This module
//! turns that text into an AST of literal values and call descriptions.

mod ast;
mod grammar;

pub use ast::{ExpressionNode, PropertyAssignment};
pub use grammar::{ExpressionError, ExpressionParser};

use std::sync::OnceLock;

static SHARED: OnceLock<ExpressionParser> = OnceLock::new();

/// Process-wide parser instance.
///
/// Built lazily, at most once. Construction is infallible here, so the guard
/// exists only to give the instance clear init-once semantics; teardown is a
/// no-op since the parser is pure.
pub fn shared() -> &'static ExpressionParser {
    SHARED.get_or_init(ExpressionParser::new)
}
