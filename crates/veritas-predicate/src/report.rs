use serde::{Deserialize, Serialize};
use std::fmt;

use crate::predicate::Predicator;

/// A set of predicates that, matched together, closes one unmet requirement.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredicateOption {
    pub predicates: Vec<Predicator>,
}

impl PredicateOption {
    pub fn new(predicates: Vec<Predicator>) -> Self {
        Self { predicates }
    }

    pub fn len(&self) -> usize {
        self.predicates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }
}

/// Alternative options; satisfying any one of them is enough.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Solution {
    pub options: Vec<PredicateOption>,
}

impl Solution {
    pub fn new(options: Vec<PredicateOption>) -> Self {
        Self { options }
    }

    /// The option with the fewest predicates, first one on ties.
    pub fn cheapest(&self) -> Option<&PredicateOption> {
        self.options.iter().min_by_key(|o| o.len())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requirement {
    pub solution: Solution,
}

/// Unsatisfied parts of a request, in tree order. Empty when the request can be met.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub requirements: Vec<Requirement>,
}

impl Report {
    pub fn is_empty(&self) -> bool {
        self.requirements.is_empty()
    }

    pub fn len(&self) -> usize {
        self.requirements.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Requirement> {
        self.requirements.iter()
    }

    pub(crate) fn push(&mut self, options: Vec<PredicateOption>) {
        self.requirements.push(Requirement {
            solution: Solution::new(options),
        });
    }
}

impl<'a> IntoIterator for &'a Report {
    type Item = &'a Requirement;
    type IntoIter = std::slice::Iter<'a, Requirement>;

    fn into_iter(self) -> Self::IntoIter {
        self.requirements.iter()
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return writeln!(f, "all requirements met");
        }
        for (i, requirement) in self.requirements.iter().enumerate() {
            writeln!(f, "requirement {}:", i + 1)?;
            for (j, option) in requirement.solution.options.iter().enumerate() {
                let predicates: Vec<String> =
                    option.predicates.iter().map(ToString::to_string).collect();
                writeln!(f, "  option {}: {}", j + 1, predicates.join(" AND "))?;
            }
        }
        Ok(())
    }
}
