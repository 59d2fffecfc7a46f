use crate::predicate::Operator;

/// Structural errors: the tree (or the search it implies) is malformed or too large.
///
/// Failing to find a match is never an error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PredicateError {
    #[error("unknown operator: {0}")]
    UnknownOperator(String),

    #[error("operator {operator} on field {field} requires at least one value")]
    MissingOperand { operator: Operator, field: String },

    #[error("predicate tree depth {depth} exceeds limit {limit}")]
    DepthExceeded { depth: usize, limit: usize },

    #[error("predicate tree has {leaves} leaves, limit is {limit}")]
    LeafCountExceeded { leaves: usize, limit: usize },

    #[error("search exceeded its budget of {limit}")]
    SearchSpaceExceeded { limit: usize },
}
