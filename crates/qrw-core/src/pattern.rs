//! # Declarative Pattern Matching for Rewrite Rules
//!
//! Each rewrite rule declares a `Pattern` describing the plan shapes it can rewrite.
//! The rewriter checks the pattern before calling `apply()`, so rules only see nodes
//! they are written for.
//!
//! ## Pattern Language
//!
//! - `Pattern::Operator(kind, children)`: matches a node of the given kind whose
//!   children match the child patterns.
//! - `Pattern::Guarded(pattern, guard)`: matches when `pattern` matches and the
//!   node passes `guard`. Guards carry per-node state checks, such as "this filter has
//!   not been processed by disjunction extraction yet".
//! - `Pattern::Any`: matches any subtree.
//! - `Pattern::Leaf`: matches only nodes without children.

use crate::plan::{LogicalPlan, PlanKind};
use std::fmt;

/// Pattern for matching plan nodes.
#[derive(Debug, Clone)]
pub enum Pattern {
    /// Match a node kind with child patterns.
    Operator(PlanKind, Vec<Pattern>),
    /// Match the inner pattern and a node-level check.
    Guarded(Box<Pattern>, Guard),
    /// Match any subtree.
    Any,
    /// Match a leaf node (no children).
    Leaf,
}

/// A named check on a single plan node.
#[derive(Clone, Copy)]
pub struct Guard {
    name: &'static str,
    check: fn(&LogicalPlan) -> bool,
    expected: bool,
}

impl Guard {
    /// Passes when `check` returns true.
    pub fn when(name: &'static str, check: fn(&LogicalPlan) -> bool) -> Self {
        Self {
            name,
            check,
            expected: true,
        }
    }

    /// Passes when `check` returns false.
    pub fn when_not(name: &'static str, check: fn(&LogicalPlan) -> bool) -> Self {
        Self {
            name,
            check,
            expected: false,
        }
    }

    pub fn test(&self, plan: &LogicalPlan) -> bool {
        (self.check)(plan) == self.expected
    }
}

impl fmt::Debug for Guard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.expected {
            write!(f, "when({})", self.name)
        } else {
            write!(f, "when_not({})", self.name)
        }
    }
}

impl Pattern {
    /// Match a filter with one child.
    pub fn filter() -> Self {
        Pattern::Operator(PlanKind::Filter, vec![Pattern::Any])
    }

    /// Match a join with two any-children.
    pub fn join() -> Self {
        Pattern::Operator(PlanKind::Join, vec![Pattern::Any, Pattern::Any])
    }

    /// Match a scan.
    pub fn scan() -> Self {
        Pattern::Operator(PlanKind::Scan, vec![])
    }

    /// Match a filter on top of a join.
    pub fn filter_join() -> Self {
        Pattern::Operator(PlanKind::Filter, vec![Pattern::join()])
    }

    /// Restrict this pattern to nodes passing `guard`.
    pub fn guarded(self, guard: Guard) -> Self {
        Pattern::Guarded(Box::new(self), guard)
    }
}

/// Check if a plan node matches a pattern.
pub fn matches(plan: &LogicalPlan, pattern: &Pattern) -> bool {
    match pattern {
        Pattern::Any => true,
        Pattern::Leaf => plan.children().is_empty(),
        Pattern::Guarded(inner, guard) => matches(plan, inner) && guard.test(plan),
        Pattern::Operator(kind, child_patterns) => {
            if plan.kind() != *kind {
                return false;
            }
            let children = plan.children();
            if children.len() != child_patterns.len() {
                return false;
            }
            children
                .iter()
                .zip(child_patterns.iter())
                .all(|(child, child_pattern)| matches(child, child_pattern))
        }
    }
}
