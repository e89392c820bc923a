//! # Scalar Expressions
//!
//! This module defines the boolean/scalar expression tree that rewrite rules inspect
//! and rebuild. Expressions are immutable values: every rewrite produces a new tree
//! and never mutates an existing one.
//!
//! ## Node Kinds
//!
//! Rewrites in this workspace care about three kinds of node:
//!
//! - **`And` / `Or`**: n-ary connectives. Stored as flat lists so that predicate
//!   decomposition does not have to walk nested binary trees.
//! - **`Column`**: a reference to a column of some relation, carrying the resolved
//!   qualifier path of the relation it belongs to.
//!
//! Every other variant (literals, comparisons, arithmetic, function calls) is treated
//! as an opaque leaf by the connective algebra below.
//!
//! ## Connective Algebra
//!
//! - [`Expr::conjuncts`] / [`Expr::disjuncts`] flatten nested AND / OR chains into
//!   their leaves, left to right.
//! - [`Expr::and`] / [`Expr::or`] rebuild a connective from a list of operands.
//!
//! For any expression `e`, `Expr::and(e.conjuncts())` is equivalent to `e`, and the
//! same holds for `or` / `disjuncts`.

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Reference to a column of a named relation.
///
/// `qualifier` is the path of the relation the column belongs to, outermost first
/// (e.g. `["n1"]` for an aliased scan, `["tpch", "nation"]` for a schema-qualified
/// table). It is filled in by name resolution; an empty path means the reference has
/// not been resolved yet.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColumnRef {
    pub qualifier: Vec<String>,
    pub name: String,
}

impl ColumnRef {
    pub fn new(qualifier: &str, name: impl Into<String>) -> Self {
        Self {
            qualifier: qualifier.split('.').map(str::to_string).collect(),
            name: name.into(),
        }
    }

    /// A column reference that has not been bound to any relation.
    pub fn unresolved(name: impl Into<String>) -> Self {
        Self {
            qualifier: Vec::new(),
            name: name.into(),
        }
    }
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for q in &self.qualifier {
            write!(f, "{}.", q)?;
        }
        write!(f, "{}", self.name)
    }
}

/// Scalar value for expressions.
///
/// Uses `OrderedFloat` for `f64` so that floating-point values can take part in
/// Eq/Hash comparisons (needed for set semantics on filter conjuncts).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ScalarValue {
    /// SQL NULL value.
    Null,
    /// Boolean true/false.
    Bool(bool),
    /// 64-bit signed integer.
    Int64(i64),
    /// 64-bit floating point, wrapped in OrderedFloat for Eq/Hash support.
    Float64(OrderedFloat<f64>),
    /// UTF-8 string.
    Utf8(String),
    /// Date as days since Unix epoch (1970-01-01).
    Date(i32),
}

impl PartialEq for ScalarValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int64(a), Self::Int64(b)) => a == b,
            (Self::Float64(a), Self::Float64(b)) => a == b,
            (Self::Utf8(a), Self::Utf8(b)) => a == b,
            (Self::Date(a), Self::Date(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for ScalarValue {}

impl Hash for ScalarValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Self::Null => {}
            Self::Bool(v) => v.hash(state),
            Self::Int64(v) => v.hash(state),
            Self::Float64(v) => v.hash(state),
            Self::Utf8(v) => v.hash(state),
            Self::Date(v) => v.hash(state),
        }
    }
}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "NULL"),
            Self::Bool(v) => write!(f, "{}", v),
            Self::Int64(v) => write!(f, "{}", v),
            Self::Float64(v) => write!(f, "{}", v),
            Self::Utf8(v) => write!(f, "'{}'", v),
            Self::Date(v) => write!(f, "DATE({})", v),
        }
    }
}

impl From<i64> for ScalarValue {
    fn from(v: i64) -> Self {
        Self::Int64(v)
    }
}

impl From<f64> for ScalarValue {
    fn from(v: f64) -> Self {
        Self::Float64(OrderedFloat(v))
    }
}

impl From<bool> for ScalarValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<&str> for ScalarValue {
    fn from(v: &str) -> Self {
        Self::Utf8(v.to_string())
    }
}

/// Scalar expressions used in filter predicates and join conditions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Expr {
    /// Reference to a column of a qualified relation.
    Column(ColumnRef),
    /// Constant literal value.
    Literal(ScalarValue),
    /// Binary operation (e.g., `a + b`, `x = y`, `price > 100`).
    BinaryOp {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// Unary operation (e.g., `NOT flag`, `-value`, `IS NULL`).
    UnaryOp { op: UnaryOp, operand: Box<Expr> },
    /// Named function call (e.g., `UPPER(name)`, `EXTRACT_YEAR(l_shipdate)`).
    Function { name: String, args: Vec<Expr> },
    /// Conjunction (AND) of multiple predicates.
    And(Vec<Expr>),
    /// Disjunction (OR) of multiple predicates.
    Or(Vec<Expr>),
}

impl Expr {
    /// Column reference `qualifier.name`, where `qualifier` may be dotted.
    pub fn col(qualifier: &str, name: &str) -> Self {
        Expr::Column(ColumnRef::new(qualifier, name))
    }

    pub fn lit(value: impl Into<ScalarValue>) -> Self {
        Expr::Literal(value.into())
    }

    pub fn binary(op: BinaryOp, left: Expr, right: Expr) -> Self {
        Expr::BinaryOp {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn eq(left: Expr, right: Expr) -> Self {
        Self::binary(BinaryOp::Eq, left, right)
    }

    pub fn gt(left: Expr, right: Expr) -> Self {
        Self::binary(BinaryOp::Gt, left, right)
    }

    /// Return all column references in this expression.
    pub fn columns(&self) -> Vec<&ColumnRef> {
        let mut cols = Vec::new();
        self.collect_columns(&mut cols);
        cols
    }

    fn collect_columns<'a>(&'a self, out: &mut Vec<&'a ColumnRef>) {
        match self {
            Expr::Column(c) => out.push(c),
            Expr::Literal(_) => {}
            Expr::BinaryOp { left, right, .. } => {
                left.collect_columns(out);
                right.collect_columns(out);
            }
            Expr::UnaryOp { operand, .. } => operand.collect_columns(out),
            Expr::Function { args, .. } => {
                for a in args {
                    a.collect_columns(out);
                }
            }
            Expr::And(exprs) | Expr::Or(exprs) => {
                for e in exprs {
                    e.collect_columns(out);
                }
            }
        }
    }

    /// Flatten AND-chains: (A AND (B AND C)) → [A, B, C].
    ///
    /// Any non-AND expression is its own single conjunct.
    pub fn conjuncts(&self) -> Vec<&Expr> {
        match self {
            Expr::And(exprs) => exprs.iter().flat_map(|e| e.conjuncts()).collect(),
            other => vec![other],
        }
    }

    /// Flatten OR-chains: (A OR (B OR C)) → [A, B, C].
    pub fn disjuncts(&self) -> Vec<&Expr> {
        match self {
            Expr::Or(exprs) => exprs.iter().flat_map(|e| e.disjuncts()).collect(),
            other => vec![other],
        }
    }

    /// Conjunction of `exprs` in input order.
    ///
    /// Returns the sole operand unchanged for a one-element list and `None` for an
    /// empty one. Operands that are themselves ANDs are spliced in.
    pub fn and(exprs: Vec<Expr>) -> Option<Expr> {
        Self::connective(exprs, Expr::And, |e| match e {
            Expr::And(children) => Ok(children),
            other => Err(other),
        })
    }

    /// Disjunction of `exprs` in input order. See [`Expr::and`].
    pub fn or(exprs: Vec<Expr>) -> Option<Expr> {
        Self::connective(exprs, Expr::Or, |e| match e {
            Expr::Or(children) => Ok(children),
            other => Err(other),
        })
    }

    fn connective(
        exprs: Vec<Expr>,
        build: fn(Vec<Expr>) -> Expr,
        split: fn(Expr) -> Result<Vec<Expr>, Expr>,
    ) -> Option<Expr> {
        if exprs.len() <= 1 {
            return exprs.into_iter().next();
        }
        let mut flat = Vec::with_capacity(exprs.len());
        for e in exprs {
            match split(e) {
                Ok(children) => flat.extend(children),
                Err(leaf) => flat.push(leaf),
            }
        }
        Some(build(flat))
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Column(c) => write!(f, "{}", c),
            Expr::Literal(v) => write!(f, "{}", v),
            Expr::BinaryOp { op, left, right } => write!(f, "{} {} {}", left, op, right),
            Expr::UnaryOp { op, operand } => match op {
                UnaryOp::Not => write!(f, "NOT {}", operand),
                UnaryOp::Neg => write!(f, "-{}", operand),
                UnaryOp::IsNull => write!(f, "{} IS NULL", operand),
                UnaryOp::IsNotNull => write!(f, "{} IS NOT NULL", operand),
            },
            Expr::Function { name, args } => {
                write!(f, "{}(", name)?;
                write_separated(f, args, ", ")?;
                write!(f, ")")
            }
            Expr::And(exprs) => {
                write!(f, "(")?;
                write_separated(f, exprs, " AND ")?;
                write!(f, ")")
            }
            Expr::Or(exprs) => {
                write!(f, "(")?;
                write_separated(f, exprs, " OR ")?;
                write!(f, ")")
            }
        }
    }
}

fn write_separated(f: &mut fmt::Formatter<'_>, exprs: &[Expr], sep: &str) -> fmt::Result {
    for (i, e) in exprs.iter().enumerate() {
        if i > 0 {
            write!(f, "{}", sep)?;
        }
        write!(f, "{}", e)?;
    }
    Ok(())
}

/// Binary operators for comparison and arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOp {
    /// Equality comparison (`=`).
    Eq,
    /// Inequality comparison (`<>` or `!=`).
    NotEq,
    /// Less than (`<`).
    Lt,
    /// Less than or equal (`<=`).
    LtEq,
    /// Greater than (`>`).
    Gt,
    /// Greater than or equal (`>=`).
    GtEq,
    /// Addition (`+`).
    Add,
    /// Subtraction (`-`).
    Sub,
    /// Multiplication (`*`).
    Mul,
    /// Division (`/`).
    Div,
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BinaryOp::Eq => "=",
            BinaryOp::NotEq => "<>",
            BinaryOp::Lt => "<",
            BinaryOp::LtEq => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::GtEq => ">=",
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
        };
        f.write_str(s)
    }
}

/// Unary operators for boolean logic and null checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnaryOp {
    /// Boolean negation (`NOT`).
    Not,
    /// Arithmetic negation (unary minus).
    Neg,
    /// Null check (`IS NULL`).
    IsNull,
    /// Non-null check (`IS NOT NULL`).
    IsNotNull,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn p(name: &str) -> Expr {
        Expr::eq(Expr::col("t", name), Expr::lit(1))
    }

    #[test]
    fn test_conjuncts_flatten_nested_and() {
        let e = Expr::And(vec![p("a"), Expr::And(vec![p("b"), p("c")])]);
        assert_eq!(e.conjuncts(), vec![&p("a"), &p("b"), &p("c")]);
    }

    #[test]
    fn test_conjuncts_of_leaf_and_or() {
        let or = Expr::Or(vec![p("a"), p("b")]);
        assert_eq!(or.conjuncts(), vec![&or]);
        assert_eq!(p("a").conjuncts(), vec![&p("a")]);
    }

    #[test]
    fn test_disjuncts_flatten_nested_or() {
        let e = Expr::Or(vec![Expr::Or(vec![p("a"), p("b")]), p("c")]);
        assert_eq!(e.disjuncts(), vec![&p("a"), &p("b"), &p("c")]);

        // An AND is a single disjunct.
        let and = Expr::And(vec![p("a"), p("b")]);
        assert_eq!(and.disjuncts(), vec![&and]);
    }

    #[test]
    fn test_and_or_construction() {
        assert_eq!(Expr::and(vec![]), None);
        assert_eq!(Expr::or(vec![]), None);
        assert_eq!(Expr::and(vec![p("a")]), Some(p("a")));
        assert_eq!(Expr::or(vec![p("a")]), Some(p("a")));
        assert_eq!(
            Expr::and(vec![p("a"), p("b")]),
            Some(Expr::And(vec![p("a"), p("b")]))
        );
        assert_eq!(
            Expr::or(vec![p("a"), Expr::Or(vec![p("b"), p("c")])]),
            Some(Expr::Or(vec![p("a"), p("b"), p("c")]))
        );
    }

    #[test]
    fn test_round_trip() {
        let e = Expr::And(vec![Expr::And(vec![p("a"), p("b")]), p("c")]);
        let rebuilt = Expr::and(e.conjuncts().into_iter().cloned().collect());
        assert_eq!(rebuilt, Some(Expr::And(vec![p("a"), p("b"), p("c")])));

        let o = Expr::Or(vec![p("x"), p("y")]);
        let rebuilt = Expr::or(o.disjuncts().into_iter().cloned().collect());
        assert_eq!(rebuilt, Some(o));
    }

    #[test]
    fn test_unary_display_and_columns() {
        let not = Expr::UnaryOp {
            op: UnaryOp::Not,
            operand: Box::new(p("a")),
        };
        assert_eq!(not.to_string(), "NOT t.a = 1");
        assert_eq!(not.columns(), vec![&ColumnRef::new("t", "a")]);

        let null_check = |op| Expr::UnaryOp {
            op,
            operand: Box::new(Expr::col("t", "b")),
        };
        assert_eq!(null_check(UnaryOp::IsNull).to_string(), "t.b IS NULL");
        assert_eq!(null_check(UnaryOp::IsNotNull).to_string(), "t.b IS NOT NULL");
        assert_eq!(null_check(UnaryOp::Neg).to_string(), "-t.b");
    }

    #[test]
    fn test_columns_reach_through_functions() {
        let e = Expr::Function {
            name: "upper".into(),
            args: vec![Expr::col("n1", "name"), Expr::lit("x")],
        };
        assert_eq!(e.columns(), vec![&ColumnRef::new("n1", "name")]);
    }

    #[test]
    fn test_display() {
        let e = Expr::Or(vec![
            Expr::eq(Expr::col("n1", "name"), Expr::lit("FRANCE")),
            Expr::eq(Expr::col("n1", "name"), Expr::lit("GERMANY")),
        ]);
        assert_eq!(e.to_string(), "(n1.name = 'FRANCE' OR n1.name = 'GERMANY')");
    }
}
