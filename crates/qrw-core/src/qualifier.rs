//! # Relation Qualifiers
//!
//! Every resolved column reference belongs to exactly one relation, identified by its
//! qualifier path (`n1`, `tpch.nation`, ...). Rules that partition predicates by owning
//! relation group columns by a flattened [`Qualifier`] key.
//!
//! The key is each path segment followed by a `.`, so `["n1"]` becomes `"n1."` and
//! `["tpch", "nation"]` becomes `"tpch.nation."`. Keys are only compared for equality.

use crate::error::{Result, RewriteError};
use crate::expr::{ColumnRef, Expr};
use indexmap::IndexSet;
use std::fmt;

/// Grouping key for the relation a column reference belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Qualifier(String);

impl Qualifier {
    /// Key of the relation that owns `column`.
    ///
    /// Fails with [`RewriteError::UnresolvedColumn`] if the column carries no
    /// qualifier path.
    pub fn of(column: &ColumnRef) -> Result<Self> {
        if column.qualifier.is_empty() {
            return Err(RewriteError::UnresolvedColumn {
                column: column.clone(),
            });
        }
        let mut key = String::new();
        for q in &column.qualifier {
            key.push_str(q);
            key.push('.');
        }
        Ok(Qualifier(key))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Qualifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Qualifiers of every column reachable from `expr`, in first-seen order.
pub fn qualifiers_of(expr: &Expr) -> Result<IndexSet<Qualifier>> {
    expr.columns().into_iter().map(Qualifier::of).collect()
}

/// Whether every column reachable from `expr` belongs to `qualifier`.
///
/// Expressions without column references (e.g. `1 = 1`) trivially qualify. Every
/// column is resolved before comparing, so an unresolved column fails regardless
/// of where it appears.
pub fn is_single_qualifier(expr: &Expr, qualifier: &Qualifier) -> Result<bool> {
    Ok(qualifiers_of(expr)?.iter().all(|q| q == qualifier))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::BinaryOp;

    fn q(s: &str) -> Qualifier {
        Qualifier::of(&ColumnRef::new(s, "x")).unwrap()
    }

    #[test]
    fn test_qualifier_key() {
        assert_eq!(q("n1").as_str(), "n1.");
        assert_eq!(q("tpch.nation").as_str(), "tpch.nation.");
    }

    #[test]
    fn test_qualifiers_of_deduplicates_in_order() {
        let e = Expr::And(vec![
            Expr::eq(Expr::col("n2", "a"), Expr::lit(1)),
            Expr::eq(Expr::col("n1", "b"), Expr::col("n2", "c")),
        ]);
        let qs: Vec<_> = qualifiers_of(&e).unwrap().into_iter().collect();
        assert_eq!(qs, vec![q("n2"), q("n1")]);
    }

    #[test]
    fn test_qualifiers_of_literal_is_empty() {
        let e = Expr::eq(Expr::lit(1), Expr::lit(1));
        assert!(qualifiers_of(&e).unwrap().is_empty());
    }

    #[test]
    fn test_is_single_qualifier() {
        let single = Expr::gt(
            Expr::binary(BinaryOp::Add, Expr::col("n1", "a"), Expr::col("n1", "b")),
            Expr::lit(3),
        );
        let mixed = Expr::gt(
            Expr::binary(BinaryOp::Add, Expr::col("n1", "a"), Expr::col("n2", "b")),
            Expr::lit(3),
        );
        assert!(is_single_qualifier(&single, &q("n1")).unwrap());
        assert!(!is_single_qualifier(&single, &q("n2")).unwrap());
        assert!(!is_single_qualifier(&mixed, &q("n1")).unwrap());
        // Vacuously true without columns.
        assert!(is_single_qualifier(&Expr::lit(true), &q("n1")).unwrap());
    }

    #[test]
    fn test_unresolved_column_is_an_error() {
        let e = Expr::eq(Expr::Column(ColumnRef::unresolved("a")), Expr::lit(1));
        assert!(matches!(
            qualifiers_of(&e),
            Err(RewriteError::UnresolvedColumn { .. })
        ));
        assert!(matches!(
            is_single_qualifier(&e, &q("n1")),
            Err(RewriteError::UnresolvedColumn { .. })
        ));
    }

    #[test]
    fn test_unresolved_column_fails_in_any_position() {
        let x = || Expr::Column(ColumnRef::unresolved("x"));
        let resolved_first = Expr::gt(
            Expr::binary(BinaryOp::Add, Expr::col("n2", "b"), x()),
            Expr::lit(2),
        );
        let unresolved_first = Expr::gt(
            Expr::binary(BinaryOp::Add, x(), Expr::col("n2", "b")),
            Expr::lit(2),
        );
        for e in [&resolved_first, &unresolved_first] {
            assert!(matches!(
                is_single_qualifier(e, &q("n1")),
                Err(RewriteError::UnresolvedColumn { .. })
            ));
        }
    }
}
