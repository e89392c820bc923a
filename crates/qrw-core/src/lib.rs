//! # qrw-core: Rule-Based Query Rewriter Core
//!
//! This crate holds the data structures and the driver shared by all rewrite rules.
//!
//! ## Module Overview
//!
//! - **`expr`**: Scalar/boolean expression tree and the AND/OR connective algebra.
//! - **`qualifier`**: Relation qualifiers of column references and single-relation checks.
//! - **`plan`**: Logical plan operators, including the conjunct-set `Filter`.
//! - **`pattern`**: Declarative pattern matching for rule applicability checks.
//! - **`rule`**: The `Rule` trait and `RuleRegistry`.
//! - **`rewriter`**: The fixpoint rewrite driver and its configuration.
//! - **`error`**: The `RewriteError` type.

pub mod error;
pub mod expr;
pub mod pattern;
pub mod plan;
pub mod qualifier;
pub mod rewriter;
pub mod rule;
