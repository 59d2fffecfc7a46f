//! Solver properties checked against a brute-force subset oracle.

use chrono::Duration;
use proptest::prelude::*;
use serde_json::{Map, Value};

use veritas_core::Address;
use veritas_identity::VerifiableCredential;
use veritas_integration_tests::ts;
use veritas_predicate::{Combinator, PredicateNode, PredicateTree, Solver};

const FIELDS: usize = 5;

fn leaf() -> impl Strategy<Value = PredicateNode> {
    prop_oneof![
        (0..FIELDS).prop_map(|f| PredicateNode::not_empty(format!("/f{}", f))),
        (0..FIELDS, 0..2u8).prop_map(|(f, v)| PredicateNode::equals(format!("/f{}", f), v.to_string())),
        (0..FIELDS).prop_map(|f| PredicateNode::empty(format!("/f{}", f))),
    ]
}

fn tree() -> impl Strategy<Value = PredicateTree> {
    leaf().prop_recursive(4, 16, 2, |inner| {
        (inner.clone(), inner, any::<bool>())
            .prop_map(|(l, r, and)| if and { l.and(r) } else { l.or(r) })
    })
}

/// Each field is absent, "0" or "1"; `validFrom` lands on one of three days.
fn credential() -> impl Strategy<Value = VerifiableCredential> {
    (prop::collection::vec(0..3u8, FIELDS), 0..3i64).prop_map(|(fields, day)| {
        let mut claims = Map::new();
        for (f, v) in fields.into_iter().enumerate() {
            if v > 0 {
                claims.insert(format!("f{}", f), Value::from((v - 1).to_string()));
            }
        }
        VerifiableCredential::new(
            Address::new("did:veritas:issuer").unwrap(),
            Address::new("did:veritas:holder").unwrap(),
            vec!["TestCredential".into()],
            Value::Object(claims),
        )
        .with_valid_from(ts(2024, 1, 1) + Duration::days(day))
    })
}

fn holds(node: &PredicateNode, set: &[&VerifiableCredential]) -> bool {
    match node {
        PredicateNode::Leaf(p) => set.iter().any(|c| p.matches(c)),
        PredicateNode::Branch {
            combinator: Combinator::And,
            left,
            right,
        } => holds(left, set) && holds(right, set),
        PredicateNode::Branch {
            combinator: Combinator::Or,
            left,
            right,
        } => holds(left, set) || holds(right, set),
    }
}

fn subset(creds: &[VerifiableCredential], bits: u32) -> Vec<&VerifiableCredential> {
    creds
        .iter()
        .enumerate()
        .filter(|(i, _)| bits & (1 << i) != 0)
        .map(|(_, c)| c)
        .collect()
}

fn positions(creds: &[VerifiableCredential], selected: &[&VerifiableCredential]) -> Vec<usize> {
    selected
        .iter()
        .filter_map(|s| creds.iter().position(|c| std::ptr::eq(c, *s)))
        .collect()
}

/// Best satisfying subset by (size, sorted validFrom, sorted position).
fn oracle(tree: &PredicateTree, creds: &[VerifiableCredential]) -> Option<Vec<usize>> {
    let mut best: Option<(usize, Vec<chrono::DateTime<chrono::Utc>>, Vec<usize>)> = None;
    for bits in 0..(1u32 << creds.len()) {
        let set = subset(creds, bits);
        if !holds(tree, &set) {
            continue;
        }
        let idx: Vec<usize> = (0..creds.len()).filter(|i| bits & (1 << i) != 0).collect();
        let mut vf: Vec<_> = idx.iter().map(|&i| creds[i].valid_from).collect();
        vf.sort();
        let key = (idx.len(), vf, idx);
        if best.as_ref().map_or(true, |b| key < *b) {
            best = Some(key);
        }
    }
    best.map(|(_, _, idx)| idx)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn prop_optimal_match_agrees_with_oracle(
        tree in tree(),
        creds in prop::collection::vec(credential(), 0..7),
    ) {
        let solver = Solver::default();
        let result = solver.find_optimal_match(&tree, &creds).unwrap();
        let expected = oracle(&tree, &creds);

        prop_assert_eq!(result.found, expected.is_some());
        match expected {
            Some(idx) => prop_assert_eq!(positions(&creds, &result.selected), idx),
            None => prop_assert!(result.selected.is_empty()),
        }
    }

    #[test]
    fn prop_selection_is_sound_and_tight(
        tree in tree(),
        creds in prop::collection::vec(credential(), 0..7),
    ) {
        let result = Solver::default().find_optimal_match(&tree, &creds).unwrap();
        prop_assume!(result.found);

        prop_assert!(holds(&tree, &result.selected));
        for skip in 0..result.selected.len() {
            let fewer: Vec<&VerifiableCredential> = result
                .selected
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != skip)
                .map(|(_, c)| *c)
                .collect();
            prop_assert!(!holds(&tree, &fewer));
        }
        let leaves = tree.leaves();
        for credential in &result.selected {
            prop_assert!(leaves.iter().any(|p| p.matches(credential)));
        }
    }

    #[test]
    fn prop_deterministic(
        tree in tree(),
        creds in prop::collection::vec(credential(), 0..7),
    ) {
        let solver = Solver::default();
        let first = solver.find_optimal_match(&tree, &creds).unwrap();
        let second = solver.find_optimal_match(&tree, &creds).unwrap();
        prop_assert_eq!(
            positions(&creds, &first.selected),
            positions(&creds, &second.selected)
        );
        prop_assert_eq!(
            solver.find_missing_predicates(&tree, &creds).unwrap(),
            solver.find_missing_predicates(&tree, &creds).unwrap()
        );
    }

    #[test]
    fn prop_missing_report_empty_iff_found(
        tree in tree(),
        creds in prop::collection::vec(credential(), 0..7),
    ) {
        let solver = Solver::default();
        let found = solver.find_optimal_match(&tree, &creds).unwrap().found;
        let report = solver.find_missing_predicates(&tree, &creds).unwrap();
        prop_assert_eq!(report.is_empty(), found);
        for requirement in &report {
            prop_assert!(!requirement.solution.options.is_empty());
            for option in &requirement.solution.options {
                prop_assert!(!option.is_empty());
                // no option names a predicate some held credential already meets
                for predicate in &option.predicates {
                    prop_assert!(!creds.iter().any(|c| predicate.matches(c)));
                }
            }
        }
    }
}
