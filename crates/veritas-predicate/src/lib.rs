//! Veritas Predicate Engine
//!
//! Disclosure policies as boolean predicate trees over credential claims:
//! - `Predicator` leaves (field selector + operator + operand values)
//! - `PredicateNode` AND/OR composition
//! - a matcher resolving JSON-pointer fields against one credential
//! - a `Solver` selecting the minimal credential subset that satisfies a
//!   tree, or reporting which predicates are still missing

pub mod error;
pub mod matcher;
pub mod pointer;
pub mod predicate;
pub mod report;
pub mod solver;
pub mod tree;

pub use error::PredicateError;
pub use predicate::{Operator, Predicator};
pub use report::{PredicateOption, Report, Requirement, Solution};
pub use solver::{OptimalMatch, Solver, SolverLimits};
pub use tree::{Combinator, PredicateNode, PredicateTree};
