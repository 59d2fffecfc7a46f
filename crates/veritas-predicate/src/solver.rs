//! Optimal-disclosure search over a predicate tree.
//!
//! Each candidate credential is reduced to a bitmask of the tree leaves it
//! matches (depth-first leaf order). A set of credentials satisfies the tree
//! when the union of their masks does, so one credential may cover several
//! leaves. The search runs by increasing set size and stops at the first size
//! with a satisfying set, which makes the result minimum-cardinality and
//! therefore free of unnecessary credentials.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::collections::{HashMap, HashSet};

use veritas_core::Timestamp;
use veritas_identity::VerifiableCredential;

use crate::error::PredicateError;
use crate::predicate::Predicator;
use crate::report::{PredicateOption, Report};
use crate::tree::{Combinator, PredicateNode, PredicateTree};

/// Leaves beyond this count cannot be tracked in a mask.
pub const MAX_TRACKED_LEAVES: usize = 128;

type LeafMask = u128;

/// Structural and search caps applied to every request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverLimits {
    pub max_depth: usize,
    pub max_leaves: usize,
    /// Candidate subsets the optimal match visits before giving up.
    pub max_combinations: usize,
    /// Alternative options the missing-predicates walk may hold or combine
    /// at any node before giving up.
    pub max_options: usize,
}

impl Default for SolverLimits {
    fn default() -> Self {
        Self {
            max_depth: 16,
            max_leaves: 64,
            max_combinations: 1_000_000,
            max_options: 4096,
        }
    }
}

/// Outcome of [`Solver::find_optimal_match`].
#[derive(Debug, Clone, PartialEq)]
pub struct OptimalMatch<'c> {
    /// Credentials to disclose, in input order. Empty when nothing was found.
    pub selected: Vec<&'c VerifiableCredential>,
    pub found: bool,
}

impl<'c> OptimalMatch<'c> {
    fn not_found() -> Self {
        Self {
            selected: Vec::new(),
            found: false,
        }
    }
}

/// Leaf-indexed copy of a tree.
enum Shape {
    Leaf(usize),
    Branch(Combinator, Box<Shape>, Box<Shape>),
}

impl Shape {
    fn build(tree: &PredicateNode) -> Self {
        let mut next = 0;
        Self::index(tree, &mut next)
    }

    fn index(node: &PredicateNode, next: &mut usize) -> Self {
        match node {
            PredicateNode::Leaf(_) => {
                let shape = Self::Leaf(*next);
                *next += 1;
                shape
            }
            PredicateNode::Branch {
                combinator,
                left,
                right,
            } => {
                let left = Self::index(left, next);
                let right = Self::index(right, next);
                Self::Branch(*combinator, Box::new(left), Box::new(right))
            }
        }
    }

    fn satisfied(&self, covered: LeafMask) -> bool {
        match self {
            Self::Leaf(i) => covered & bit(*i) != 0,
            Self::Branch(Combinator::And, l, r) => l.satisfied(covered) && r.satisfied(covered),
            Self::Branch(Combinator::Or, l, r) => l.satisfied(covered) || r.satisfied(covered),
        }
    }

    /// Operands of the top-level AND chain, left to right.
    fn conjuncts(&self) -> Vec<&Shape> {
        let mut out = Vec::new();
        let mut stack = vec![self];
        while let Some(shape) = stack.pop() {
            match shape {
                Self::Branch(Combinator::And, l, r) => {
                    stack.push(r);
                    stack.push(l);
                }
                other => out.push(other),
            }
        }
        out
    }
}

fn bit(i: usize) -> LeafMask {
    1 << i
}

#[derive(Debug, Clone, Copy)]
struct Candidate {
    index: usize,
    valid_from: Timestamp,
    mask: LeafMask,
}

/// Stateless matcher of predicate trees against credential sets.
#[derive(Debug, Clone, Default)]
pub struct Solver {
    limits: SolverLimits,
}

impl Solver {
    pub fn new(limits: SolverLimits) -> Self {
        Self { limits }
    }

    pub fn limits(&self) -> &SolverLimits {
        &self.limits
    }

    /// Reject a tree the solver will not process.
    pub fn check(&self, tree: &PredicateTree) -> Result<(), PredicateError> {
        tree.validate(
            self.limits.max_depth,
            self.limits.max_leaves.min(MAX_TRACKED_LEAVES),
        )
    }

    /// Whether some subset of `credentials` satisfies `tree`.
    pub fn is_satisfied<C>(&self, tree: &PredicateTree, credentials: &[C]) -> Result<bool, PredicateError>
    where
        C: Borrow<VerifiableCredential>,
    {
        self.check(tree)?;
        let leaves = tree.leaves();
        let covered = credentials
            .iter()
            .fold(0, |acc, c| acc | leaf_mask(&leaves, view(c)));
        Ok(Shape::build(tree).satisfied(covered))
    }

    /// Smallest set of credentials that jointly satisfies `tree`.
    ///
    /// Among sets of equal size the one whose sorted `validFrom` values are
    /// lexicographically earliest wins, then the one with the smallest sorted
    /// input positions.
    pub fn find_optimal_match<'c, C>(
        &self,
        tree: &PredicateTree,
        credentials: &'c [C],
    ) -> Result<OptimalMatch<'c>, PredicateError>
    where
        C: Borrow<VerifiableCredential>,
    {
        self.check(tree)?;
        let shape = Shape::build(tree);
        let leaves = tree.leaves();

        let masks: Vec<LeafMask> = credentials
            .iter()
            .map(|c| leaf_mask(&leaves, view(c)))
            .collect();
        let covered = masks.iter().fold(0, |acc, m| acc | m);
        if !shape.satisfied(covered) {
            tracing::debug!(
                leaves = leaves.len(),
                credentials = credentials.len(),
                "no credential set satisfies the request"
            );
            return Ok(OptimalMatch::not_found());
        }

        let candidates = distinct_candidates(credentials, &masks);
        let Some(mut chosen) = self.search(&shape, &candidates)? else {
            return Ok(OptimalMatch::not_found());
        };
        chosen.sort_unstable();

        tracing::debug!(
            leaves = leaves.len(),
            candidates = candidates.len(),
            selected = chosen.len(),
            "optimal credential set found"
        );

        Ok(OptimalMatch {
            selected: chosen.into_iter().map(|i| view(&credentials[i])).collect(),
            found: true,
        })
    }

    fn search(
        &self,
        shape: &Shape,
        candidates: &[Candidate],
    ) -> Result<Option<Vec<usize>>, PredicateError> {
        let n = candidates.len();
        let mut visited = 0usize;

        for k in 1..=n {
            let mut picks: Vec<usize> = (0..k).collect();
            let mut best: Option<(Vec<Timestamp>, Vec<usize>)> = None;
            loop {
                visited += 1;
                if visited > self.limits.max_combinations {
                    tracing::warn!(
                        limit = self.limits.max_combinations,
                        set_size = k,
                        "credential search budget exhausted"
                    );
                    return Err(PredicateError::SearchSpaceExceeded {
                        limit: self.limits.max_combinations,
                    });
                }

                let covered = picks.iter().fold(0, |acc, &p| acc | candidates[p].mask);
                if shape.satisfied(covered) {
                    let key = rank(candidates, &picks);
                    if best.as_ref().map_or(true, |b| key < *b) {
                        best = Some(key);
                    }
                }
                if !next_combination(&mut picks, n) {
                    break;
                }
            }
            if let Some((_, indices)) = best {
                return Ok(Some(indices));
            }
        }
        Ok(None)
    }

    /// Requirements the holder cannot meet with `credentials`.
    ///
    /// The root's top-level AND chain is split into conjuncts. Unmet leaf
    /// conjuncts are merged into one requirement with a single option, and
    /// each unmet compound conjunct becomes its own requirement listing its
    /// minimal alternative sets of unmet leaves.
    pub fn find_missing_predicates<C>(
        &self,
        tree: &PredicateTree,
        credentials: &[C],
    ) -> Result<Report, PredicateError>
    where
        C: Borrow<VerifiableCredential>,
    {
        self.check(tree)?;
        let shape = Shape::build(tree);
        let leaves = tree.leaves();
        let met = credentials
            .iter()
            .fold(0, |acc, c| acc | leaf_mask(&leaves, view(c)));

        let mut report = Report::default();
        if shape.satisfied(met) {
            return Ok(report);
        }

        let mut leaf_group: Option<(usize, LeafMask)> = None;
        for conjunct in shape.conjuncts() {
            match conjunct {
                Shape::Leaf(i) if met & bit(*i) == 0 => match leaf_group.as_mut() {
                    Some((_, group)) => *group |= bit(*i),
                    None => {
                        leaf_group = Some((report.len(), bit(*i)));
                        report.push(Vec::new());
                    }
                },
                Shape::Leaf(_) => {}
                compound if !compound.satisfied(met) => {
                    let options = self.unmet_options(compound, met)?;
                    report.push(
                        options
                            .into_iter()
                            .map(|m| PredicateOption::new(predicates_of(&leaves, m)))
                            .collect(),
                    );
                }
                _ => {}
            }
        }
        if let Some((slot, group)) = leaf_group {
            report.requirements[slot].solution.options =
                vec![PredicateOption::new(predicates_of(&leaves, group))];
        }

        tracing::debug!(
            requirements = report.len(),
            credentials = credentials.len(),
            "missing predicates computed"
        );
        Ok(report)
    }

    /// Inclusion-minimal sets of unmet leaves that would satisfy `shape`.
    /// `[0]` means already satisfied.
    ///
    /// Both the options kept at a node and the pairings tried at an AND are
    /// bounded by `max_options`, so each `minimize` call sees a bounded input.
    fn unmet_options(&self, shape: &Shape, met: LeafMask) -> Result<Vec<LeafMask>, PredicateError> {
        let options = match shape {
            Shape::Leaf(i) if met & bit(*i) != 0 => vec![0],
            Shape::Leaf(i) => vec![bit(*i)],
            Shape::Branch(Combinator::Or, l, r) => {
                let left = self.unmet_options(l, met)?;
                let right = self.unmet_options(r, met)?;
                if left.contains(&0) || right.contains(&0) {
                    return Ok(vec![0]);
                }
                minimize(left.into_iter().chain(right))
            }
            Shape::Branch(Combinator::And, l, r) => {
                let left = self.unmet_options(l, met)?;
                let right = self.unmet_options(r, met)?;
                let pairings = left.len().saturating_mul(right.len());
                if pairings > self.limits.max_options {
                    return Err(self.options_exceeded(pairings));
                }
                minimize(
                    left.iter()
                        .flat_map(|a| right.iter().map(move |b| a | b)),
                )
            }
        };
        if options.len() > self.limits.max_options {
            return Err(self.options_exceeded(options.len()));
        }
        Ok(options)
    }

    fn options_exceeded(&self, options: usize) -> PredicateError {
        tracing::warn!(
            options,
            limit = self.limits.max_options,
            "missing-predicates option budget exhausted"
        );
        PredicateError::SearchSpaceExceeded {
            limit: self.limits.max_options,
        }
    }
}

fn view<C: Borrow<VerifiableCredential>>(credential: &C) -> &VerifiableCredential {
    credential.borrow()
}

fn leaf_mask(leaves: &[&Predicator], credential: &VerifiableCredential) -> LeafMask {
    leaves
        .iter()
        .enumerate()
        .filter(|(_, p)| p.matches(credential))
        .fold(0, |acc, (i, _)| acc | bit(i))
}

/// One candidate per distinct non-zero mask, keeping the earliest
/// `(validFrom, position)`. Sorted by that key.
fn distinct_candidates<C>(credentials: &[C], masks: &[LeafMask]) -> Vec<Candidate>
where
    C: Borrow<VerifiableCredential>,
{
    let mut by_mask: HashMap<LeafMask, Candidate> = HashMap::new();
    for (index, (credential, &mask)) in credentials.iter().zip(masks).enumerate() {
        if mask == 0 {
            continue;
        }
        let candidate = Candidate {
            index,
            valid_from: view(credential).valid_from,
            mask,
        };
        by_mask
            .entry(mask)
            .and_modify(|kept| {
                if (candidate.valid_from, candidate.index) < (kept.valid_from, kept.index) {
                    *kept = candidate;
                }
            })
            .or_insert(candidate);
    }
    let mut out: Vec<Candidate> = by_mask.into_values().collect();
    out.sort_by_key(|c| (c.valid_from, c.index));
    out
}

fn rank(candidates: &[Candidate], picks: &[usize]) -> (Vec<Timestamp>, Vec<usize>) {
    let mut valid_from: Vec<Timestamp> = picks.iter().map(|&p| candidates[p].valid_from).collect();
    let mut indices: Vec<usize> = picks.iter().map(|&p| candidates[p].index).collect();
    valid_from.sort_unstable();
    indices.sort_unstable();
    (valid_from, indices)
}

/// Advance `picks` to the next k-combination of `0..n` in lexicographic order.
fn next_combination(picks: &mut [usize], n: usize) -> bool {
    let k = picks.len();
    for i in (0..k).rev() {
        if picks[i] < n - k + i {
            picks[i] += 1;
            for j in i + 1..k {
                picks[j] = picks[j - 1] + 1;
            }
            return true;
        }
    }
    false
}

/// Drop duplicates and strict supersets, keeping first-appearance order.
///
/// Sets are visited smallest first, so each one is only compared against the
/// strictly smaller sets already kept.
fn minimize(sets: impl IntoIterator<Item = LeafMask>) -> Vec<LeafMask> {
    let mut seen = HashSet::new();
    let unique: Vec<LeafMask> = sets.into_iter().filter(|s| seen.insert(*s)).collect();

    let mut by_size: Vec<usize> = (0..unique.len()).collect();
    by_size.sort_by_key(|&i| unique[i].count_ones());

    let mut kept: Vec<LeafMask> = Vec::new();
    let mut keep = vec![false; unique.len()];
    for i in by_size {
        let set = unique[i];
        if kept.iter().all(|&smaller| smaller & !set != 0) {
            kept.push(set);
            keep[i] = true;
        }
    }
    unique
        .into_iter()
        .zip(keep)
        .filter_map(|(set, minimal)| minimal.then_some(set))
        .collect()
}

fn predicates_of(leaves: &[&Predicator], mask: LeafMask) -> Vec<Predicator> {
    leaves
        .iter()
        .enumerate()
        .filter(|(i, _)| mask & bit(*i) != 0)
        .map(|(_, p)| (*p).clone())
        .collect()
}
