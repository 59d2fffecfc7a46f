use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::PredicateError;
use crate::predicate::{Operator, Predicator};

/// Boolean combinator of a branch node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Combinator {
    And,
    Or,
}

impl fmt::Display for Combinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::And => f.write_str("AND"),
            Self::Or => f.write_str("OR"),
        }
    }
}

/// A node of a disclosure policy: a leaf predicate or an AND/OR of two subtrees.
///
/// Nodes are values. Combining two nodes yields a new node and never
/// touches the inputs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "node", rename_all = "lowercase")]
pub enum PredicateNode {
    Leaf(Predicator),
    Branch {
        combinator: Combinator,
        left: Box<PredicateNode>,
        right: Box<PredicateNode>,
    },
}

/// A full request is rooted at a single node.
pub type PredicateTree = PredicateNode;

fn leaf(operator: Operator, field: impl Into<String>, values: Vec<String>) -> PredicateNode {
    PredicateNode::Leaf(Predicator::unchecked(operator, field.into(), values))
}

fn collect<I, S>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    values.into_iter().map(Into::into).collect()
}

impl PredicateNode {
    pub fn equals(field: impl Into<String>, value: impl Into<String>) -> Self {
        leaf(Operator::Equals, field, vec![value.into()])
    }

    pub fn not_equals(field: impl Into<String>, value: impl Into<String>) -> Self {
        leaf(Operator::NotEquals, field, vec![value.into()])
    }

    pub fn greater_than(field: impl Into<String>, value: impl Into<String>) -> Self {
        leaf(Operator::GreaterThan, field, vec![value.into()])
    }

    pub fn greater_than_or_equals(field: impl Into<String>, value: impl Into<String>) -> Self {
        leaf(Operator::GreaterThanOrEquals, field, vec![value.into()])
    }

    pub fn less_than(field: impl Into<String>, value: impl Into<String>) -> Self {
        leaf(Operator::LessThan, field, vec![value.into()])
    }

    pub fn less_than_or_equals(field: impl Into<String>, value: impl Into<String>) -> Self {
        leaf(Operator::LessThanOrEquals, field, vec![value.into()])
    }

    pub fn contains(field: impl Into<String>, value: impl Into<String>) -> Self {
        leaf(Operator::Contains, field, vec![value.into()])
    }

    pub fn not_contains(field: impl Into<String>, value: impl Into<String>) -> Self {
        leaf(Operator::NotContains, field, vec![value.into()])
    }

    /// An empty `values` list is caught by [`PredicateNode::validate`].
    pub fn one_of<I, S>(field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        leaf(Operator::OneOf, field, collect(values))
    }

    pub fn not_one_of<I, S>(field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        leaf(Operator::NotOneOf, field, collect(values))
    }

    pub fn empty(field: impl Into<String>) -> Self {
        leaf(Operator::Empty, field, Vec::new())
    }

    pub fn not_empty(field: impl Into<String>) -> Self {
        leaf(Operator::NotEmpty, field, Vec::new())
    }

    /// Combine two nodes with a combinator.
    pub fn branch(combinator: Combinator, left: PredicateNode, right: PredicateNode) -> Self {
        Self::Branch {
            combinator,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn and(self, other: PredicateNode) -> Self {
        Self::branch(Combinator::And, self, other)
    }

    pub fn or(self, other: PredicateNode) -> Self {
        Self::branch(Combinator::Or, self, other)
    }

    /// Left-folded AND of `nodes`. `None` when `nodes` is empty.
    pub fn all(nodes: impl IntoIterator<Item = PredicateNode>) -> Option<Self> {
        nodes.into_iter().reduce(Self::and)
    }

    /// Left-folded OR of `nodes`. `None` when `nodes` is empty.
    pub fn any(nodes: impl IntoIterator<Item = PredicateNode>) -> Option<Self> {
        nodes.into_iter().reduce(Self::or)
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Self::Leaf(_))
    }

    /// Leaves in depth-first, left-to-right order.
    pub fn leaves(&self) -> Vec<&Predicator> {
        let mut out = Vec::new();
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            match node {
                Self::Leaf(p) => out.push(p),
                Self::Branch { left, right, .. } => {
                    stack.push(right);
                    stack.push(left);
                }
            }
        }
        out
    }

    pub fn leaf_count(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            match node {
                Self::Leaf(_) => count += 1,
                Self::Branch { left, right, .. } => {
                    stack.push(right);
                    stack.push(left);
                }
            }
        }
        count
    }

    /// Number of nodes on the longest root-to-leaf path. A lone leaf has depth 1.
    pub fn depth(&self) -> usize {
        let mut max = 0;
        let mut stack = vec![(self, 1usize)];
        while let Some((node, level)) = stack.pop() {
            max = max.max(level);
            if let Self::Branch { left, right, .. } = node {
                stack.push((right, level + 1));
                stack.push((left, level + 1));
            }
        }
        max
    }

    /// Reject trees past the structural caps or with operand-less leaves.
    pub fn validate(&self, max_depth: usize, max_leaves: usize) -> Result<(), PredicateError> {
        let depth = self.depth();
        if depth > max_depth {
            return Err(PredicateError::DepthExceeded {
                depth,
                limit: max_depth,
            });
        }
        let leaves = self.leaves();
        if leaves.len() > max_leaves {
            return Err(PredicateError::LeafCountExceeded {
                leaves: leaves.len(),
                limit: max_leaves,
            });
        }
        leaves.iter().try_for_each(|p| p.check_operands())
    }
}

impl From<Predicator> for PredicateNode {
    fn from(predicator: Predicator) -> Self {
        Self::Leaf(predicator)
    }
}

impl fmt::Display for PredicateNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Leaf(p) => write!(f, "{}", p),
            Self::Branch {
                combinator,
                left,
                right,
            } => write!(f, "({} {} {})", left, combinator, right),
        }
    }
}
