//! # Built-in Rewrite Rules
//!
//! This crate provides the default set of rewrite rules for the [`Rewriter`].
//!
//! - **`ExtractSingleTableExpressionFromDisjunction`**: Derives redundant
//!   single-relation predicates from disjunctive filter conjuncts so that a later
//!   pushdown can move them below joins. Fires once per filter.
//!
//! [`Rewriter`]: qrw_core::rewriter::Rewriter

pub mod extract_single_table_expression;

use qrw_core::rule::RuleRegistry;

/// Create a default rule registry with all built-in rules.
///
/// Callers can append their own rules to the returned registry via `add_rule()`.
pub fn default_rule_registry() -> RuleRegistry {
    let mut registry = RuleRegistry::new();

    registry.add_rule(Box::new(
        extract_single_table_expression::ExtractSingleTableExpressionFromDisjunction,
    ));

    registry
}
