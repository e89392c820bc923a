//! # Single-Table Predicates from Disjunctions
//!
//! A disjunctive filter over a join usually cannot be pushed below the join, because
//! each branch mixes columns of several relations. This rule derives an extra,
//! logically implied predicate per relation that *can* be pushed down.
//!
//! ```text
//! Before: (n1.n_name = 'FRANCE' AND n2.n_name = 'GERMANY')
//!      OR (n1.n_name = 'GERMANY' AND n2.n_name = 'FRANCE')
//!
//! After:  (n1.n_name = 'FRANCE' AND n2.n_name = 'GERMANY')
//!      OR (n1.n_name = 'GERMANY' AND n2.n_name = 'FRANCE')
//!     AND (n1.n_name = 'FRANCE' OR n1.n_name = 'GERMANY')
//!     AND (n2.n_name = 'GERMANY' OR n2.n_name = 'FRANCE')
//! ```
//!
//! The two new conjuncts are redundant, but each touches a single relation and can
//! later be pushed into the scan of `n1` / `n2` (TPC-H Q7 is the classic case).
//!
//! ## Algorithm
//!
//! For every conjunct of the filter that is a disjunction:
//!
//! 1. Collect the relation qualifiers used by the *first* disjunct only.
//! 2. For each such qualifier, keep from every disjunct the AND of its conjuncts that
//!    reference only that qualifier. If some disjunct has none, give up on the
//!    qualifier.
//! 3. Otherwise OR the per-disjunct pieces into one new conjunct.
//!
//! A qualifier missing from the first disjunct is never tried, even when every
//! disjunct would yield a piece for it.
//!
//! ## Scope
//!
//! - The rule only adds predicates. Pushing them down, and dropping the ones that end
//!   up above an outer join where they are useless, is left to other rules.
//! - It runs once per filter: the replacement filter has `single_table_extracted`
//!   set, and the pattern refuses filters with the flag set. Running again would only
//!   add duplicates of what is already there.
//! - Column references must already be bound to relations, so this rule has to run
//!   after sub-queries have been turned into joins.

use indexmap::IndexSet;
use qrw_core::error::Result;
use qrw_core::expr::Expr;
use qrw_core::pattern::{Guard, Pattern};
use qrw_core::plan::{Filter, LogicalPlan};
use qrw_core::qualifier::{is_single_qualifier, qualifiers_of, Qualifier};
use qrw_core::rule::Rule;
use tracing::debug;

/// Derive single-relation predicates from disjunctive filter conjuncts.
pub struct ExtractSingleTableExpressionFromDisjunction;

fn is_single_table_extracted(plan: &LogicalPlan) -> bool {
    matches!(plan, LogicalPlan::Filter(f) if f.single_table_extracted)
}

impl Rule for ExtractSingleTableExpressionFromDisjunction {
    fn name(&self) -> &str {
        "ExtractSingleTableExpressionFromDisjunction"
    }

    fn pattern(&self) -> Pattern {
        // Match: Filter(Any), not yet processed
        Pattern::filter().guarded(Guard::when_not(
            "single_table_extracted",
            is_single_table_extracted,
        ))
    }

    fn apply(&self, plan: &LogicalPlan) -> Result<Option<LogicalPlan>> {
        let LogicalPlan::Filter(filter) = plan else {
            return Ok(None);
        };
        Ok(Some(LogicalPlan::Filter(extract_redundant_predicates(filter)?)))
    }
}

/// Extend `filter` with the single-relation predicates implied by its disjunctive
/// conjuncts. The returned filter always has `single_table_extracted` set, even when
/// nothing was derived.
pub fn extract_redundant_predicates(filter: &Filter) -> Result<Filter> {
    // Every column must be bound to a relation, including in conjuncts that are not
    // disjunctions.
    for conjunct in &filter.conjuncts {
        qualifiers_of(conjunct)?;
    }

    let mut redundants = Vec::new();

    for conjunct in &filter.conjuncts {
        let disjuncts = conjunct.disjuncts();
        if disjuncts.len() <= 1 {
            continue;
        }

        // Only the first disjunct seeds candidate qualifiers.
        let candidates: IndexSet<Qualifier> = qualifiers_of(disjuncts[0])?;
        for qualifier in &candidates {
            if let Some(redundant) = extract_for_all(&disjuncts, qualifier)? {
                redundants.push(redundant);
            }
        }
    }

    if !redundants.is_empty() {
        debug!(
            "Derived {} single-table predicate(s): {}",
            redundants.len(),
            redundants
                .iter()
                .map(|e| e.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        );
    }

    Ok(filter.with_extracted(redundants))
}

/// OR of the `qualifier` pieces of every disjunct, or `None` if any disjunct has no
/// such piece.
fn extract_for_all(disjuncts: &[&Expr], qualifier: &Qualifier) -> Result<Option<Expr>> {
    let mut pieces = Vec::with_capacity(disjuncts.len());
    for disjunct in disjuncts {
        match extract_single_table_expression(disjunct, qualifier)? {
            Some(piece) => pieces.push(piece),
            None => return Ok(None),
        }
    }
    Ok(Expr::or(pieces))
}

/// The AND of the conjuncts of `expr` whose columns all belong to `qualifier`.
///
/// `(n1.n_name = 'FRANCE' AND n2.n_name = 'GERMANY')` with qualifier `n1.` yields
/// `n1.n_name = 'FRANCE'`. Conjuncts that mix relations are dropped whole.
pub fn extract_single_table_expression(expr: &Expr, qualifier: &Qualifier) -> Result<Option<Expr>> {
    let mut output = Vec::new();
    for conjunct in expr.conjuncts() {
        if is_single_qualifier(conjunct, qualifier)? {
            output.push(conjunct.clone());
        }
    }
    Ok(Expr::and(output))
}
