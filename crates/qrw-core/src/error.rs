//! # Rewrite Errors
//!
//! Failing to derive a predicate is never an error: rules report "nothing to do" by
//! returning `Ok(None)` or an unchanged plan. The variants here are real faults, either
//! a violated precondition of the rewrite phase or bad configuration.

use crate::expr::ColumnRef;

/// Errors that can occur while rewriting a plan.
#[derive(Debug, thiserror::Error)]
pub enum RewriteError {
    /// A column reference has no qualifying relation path. Name resolution and
    /// sub-query-to-join rewriting must run before qualifier-based rules.
    #[error("Unresolved column reference: {column}")]
    UnresolvedColumn { column: ColumnRef },
    /// The rewrite configuration could not be parsed.
    #[error("Invalid rewrite config: {0}")]
    InvalidConfig(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, RewriteError>;
