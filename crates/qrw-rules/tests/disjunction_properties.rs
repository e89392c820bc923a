//! Property tests for single-table predicate extraction over generated filters.
//!
//! Filters are built from equality leaves over three aliases plus the occasional
//! comparison that mixes two aliases, arranged as plain conjuncts or as
//! disjunctions of conjunctions.

use proptest::prelude::*;
use qrw_core::expr::{BinaryOp, Expr};
use qrw_core::plan::{Filter, LogicalPlan};
use qrw_core::qualifier::qualifiers_of;
use qrw_rules::extract_single_table_expression::extract_redundant_predicates;
use std::collections::HashSet;

const ALIASES: [&str; 3] = ["n1", "n2", "n3"];

fn leaf() -> impl Strategy<Value = Expr> {
    prop_oneof![
        4 => (0..3usize, 0..2usize, 0..4i64).prop_map(|(a, c, v)| {
            Expr::eq(Expr::col(ALIASES[a], &format!("c{}", c)), Expr::lit(v))
        }),
        1 => (0..3usize, 0..3usize, 0..4i64).prop_map(|(a, b, v)| {
            Expr::gt(
                Expr::binary(BinaryOp::Add, Expr::col(ALIASES[a], "c0"), Expr::col(ALIASES[b], "c1")),
                Expr::lit(v),
            )
        }),
    ]
}

fn branch() -> impl Strategy<Value = Expr> {
    prop::collection::vec(leaf(), 1..4).prop_map(|leaves| {
        if leaves.len() == 1 {
            leaves.into_iter().next().unwrap()
        } else {
            Expr::And(leaves)
        }
    })
}

fn conjunct() -> impl Strategy<Value = Expr> {
    prop_oneof![
        1 => leaf(),
        3 => prop::collection::vec(branch(), 2..5).prop_map(Expr::Or),
    ]
}

fn filter() -> impl Strategy<Value = Filter> {
    prop::collection::vec(conjunct(), 1..4).prop_map(|conjuncts| {
        let input = ALIASES
            .iter()
            .map(|a| LogicalPlan::scan("tpch", "nation", a, &["c0", "c1"]))
            .reduce(|l, r| LogicalPlan::inner_join(None, l, r))
            .unwrap();
        Filter::from_conjuncts(conjuncts, input)
    })
}

fn leaves<'a>(expr: &'a Expr, out: &mut HashSet<&'a Expr>) {
    match expr {
        Expr::And(children) | Expr::Or(children) => {
            for c in children {
                leaves(c, out);
            }
        }
        other => {
            out.insert(other);
        }
    }
}

proptest! {
    #[test]
    fn output_is_input_followed_by_redundants(input in filter()) {
        let output = extract_redundant_predicates(&input).unwrap();

        prop_assert!(output.single_table_extracted);
        prop_assert_eq!(&output.input, &input.input);
        prop_assert!(output.conjuncts.len() >= input.conjuncts.len());
        prop_assert!(output
            .conjuncts
            .iter()
            .take(input.conjuncts.len())
            .eq(input.conjuncts.iter()));
    }

    #[test]
    fn redundants_reuse_existing_leaves_of_one_relation(input in filter()) {
        let output = extract_redundant_predicates(&input).unwrap();

        let mut known = HashSet::new();
        for c in &input.conjuncts {
            leaves(c, &mut known);
        }

        for added in output.conjuncts.iter().skip(input.conjuncts.len()) {
            prop_assert!(matches!(added, Expr::Or(_)), "not a disjunction: {}", added);
            prop_assert_eq!(qualifiers_of(added).unwrap().len(), 1, "{}", added);

            let mut used = HashSet::new();
            leaves(added, &mut used);
            prop_assert!(used.is_subset(&known), "fabricated leaf in {}", added);
        }
    }

    #[test]
    fn reapplying_to_output_adds_nothing(input in filter()) {
        let once = extract_redundant_predicates(&input).unwrap();
        let reset = Filter {
            single_table_extracted: false,
            ..once.clone()
        };
        let twice = extract_redundant_predicates(&reset).unwrap();
        prop_assert_eq!(twice.conjuncts, once.conjuncts);
    }
}
