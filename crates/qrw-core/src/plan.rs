//! # Logical Plan
//!
//! Logical operators describe *what* to compute. The rewriter owns a tree of them and
//! replaces nodes with new values as rules fire; nodes are never mutated in place, so
//! an unchanged subtree can be shared or memoized by callers.
//!
//! ## Filter Conjuncts
//!
//! A [`Filter`] keeps its predicate as an ordered set of top-level conjuncts rather
//! than one expression. Rules that add implied predicates extend that set, and
//! duplicate conjuncts collapse. Insertion order is preserved so that rewrites are
//! deterministic.
//!
//! The `single_table_extracted` flag records that the disjunction extraction rule has
//! already run on this node. It belongs to the node value and travels with it.

use crate::expr::{ColumnRef, Expr};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Reference to a table in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TableRef {
    pub schema: String,
    pub name: String,
}

impl fmt::Display for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.schema, self.name)
    }
}

/// SQL join types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JoinType {
    Inner,
    Left,
    Right,
    Full,
}

/// A filter node: a set of AND-ed conjuncts over a single input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filter {
    pub conjuncts: IndexSet<Expr>,
    /// Set once disjunction extraction has processed this node.
    pub single_table_extracted: bool,
    pub input: Box<LogicalPlan>,
}

impl Filter {
    /// Build a filter from a predicate, splitting it into its top-level conjuncts.
    pub fn new(predicate: Expr, input: LogicalPlan) -> Self {
        Self {
            conjuncts: predicate.conjuncts().into_iter().cloned().collect(),
            single_table_extracted: false,
            input: Box::new(input),
        }
    }

    pub fn from_conjuncts(conjuncts: impl IntoIterator<Item = Expr>, input: LogicalPlan) -> Self {
        Self {
            conjuncts: conjuncts.into_iter().collect(),
            single_table_extracted: false,
            input: Box::new(input),
        }
    }

    /// A copy of this filter with `extra` appended to its conjuncts and the
    /// extraction flag set. The input subtree is carried over unchanged.
    pub fn with_extracted(&self, extra: impl IntoIterator<Item = Expr>) -> Self {
        let mut conjuncts = self.conjuncts.clone();
        conjuncts.extend(extra);
        Self {
            conjuncts,
            single_table_extracted: true,
            input: self.input.clone(),
        }
    }

    /// The full filter predicate, or `None` for an empty conjunct set.
    pub fn predicate(&self) -> Option<Expr> {
        Expr::and(self.conjuncts.iter().cloned().collect())
    }
}

/// Logical operators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogicalPlan {
    /// Table scan under an alias. Columns produced by the scan are qualified by
    /// the alias. Always a leaf.
    Scan {
        table: TableRef,
        alias: String,
        columns: Vec<ColumnRef>,
    },
    /// Filter: discards input rows for which any conjunct is not true.
    Filter(Filter),
    /// Project: computes output expressions from its input's columns.
    Project {
        exprs: Vec<Expr>,
        aliases: Vec<String>,
        input: Box<LogicalPlan>,
    },
    /// Join: combines two inputs using the given join type and optional condition.
    Join {
        join_type: JoinType,
        condition: Option<Expr>,
        left: Box<LogicalPlan>,
        right: Box<LogicalPlan>,
    },
}

/// Kind discriminant for pattern matching (without data).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlanKind {
    Scan,
    Filter,
    Project,
    Join,
}

impl LogicalPlan {
    /// Scan of `schema.name` aliased as `alias`, producing `columns`.
    pub fn scan(schema: &str, name: &str, alias: &str, columns: &[&str]) -> Self {
        LogicalPlan::Scan {
            table: TableRef {
                schema: schema.into(),
                name: name.into(),
            },
            alias: alias.into(),
            columns: columns.iter().map(|c| ColumnRef::new(alias, *c)).collect(),
        }
    }

    pub fn filter(predicate: Expr, input: LogicalPlan) -> Self {
        LogicalPlan::Filter(Filter::new(predicate, input))
    }

    pub fn join(
        join_type: JoinType,
        condition: Option<Expr>,
        left: LogicalPlan,
        right: LogicalPlan,
    ) -> Self {
        LogicalPlan::Join {
            join_type,
            condition,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn inner_join(condition: Option<Expr>, left: LogicalPlan, right: LogicalPlan) -> Self {
        Self::join(JoinType::Inner, condition, left, right)
    }

    pub fn project(exprs: Vec<Expr>, aliases: Vec<String>, input: LogicalPlan) -> Self {
        LogicalPlan::Project {
            exprs,
            aliases,
            input: Box::new(input),
        }
    }

    pub fn kind(&self) -> PlanKind {
        match self {
            LogicalPlan::Scan { .. } => PlanKind::Scan,
            LogicalPlan::Filter(_) => PlanKind::Filter,
            LogicalPlan::Project { .. } => PlanKind::Project,
            LogicalPlan::Join { .. } => PlanKind::Join,
        }
    }

    pub fn children(&self) -> Vec<&LogicalPlan> {
        match self {
            LogicalPlan::Scan { .. } => vec![],
            LogicalPlan::Filter(f) => vec![f.input.as_ref()],
            LogicalPlan::Project { input, .. } => vec![input.as_ref()],
            LogicalPlan::Join { left, right, .. } => vec![left.as_ref(), right.as_ref()],
        }
    }

    /// Consume this node and rebuild it with `f` applied to each child, left to right.
    pub fn map_children<E>(
        self,
        mut f: impl FnMut(LogicalPlan) -> Result<LogicalPlan, E>,
    ) -> Result<Self, E> {
        Ok(match self {
            scan @ LogicalPlan::Scan { .. } => scan,
            LogicalPlan::Filter(filter) => LogicalPlan::Filter(Filter {
                input: Box::new(f(*filter.input)?),
                ..filter
            }),
            LogicalPlan::Project {
                exprs,
                aliases,
                input,
            } => LogicalPlan::Project {
                exprs,
                aliases,
                input: Box::new(f(*input)?),
            },
            LogicalPlan::Join {
                join_type,
                condition,
                left,
                right,
            } => {
                let left = Box::new(f(*left)?);
                let right = Box::new(f(*right)?);
                LogicalPlan::Join {
                    join_type,
                    condition,
                    left,
                    right,
                }
            }
        })
    }

    /// This node and all of its descendants, pre-order.
    pub fn walk(&self) -> Vec<&LogicalPlan> {
        let mut out = vec![self];
        for child in self.children() {
            out.extend(child.walk());
        }
        out
    }
}
