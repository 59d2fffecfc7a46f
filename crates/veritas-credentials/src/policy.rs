use serde::{Deserialize, Serialize};
use std::borrow::Borrow;

use veritas_identity::{credential_types, VerifiableCredential};
use veritas_predicate::{Operator, PredicateError, PredicateNode, PredicateTree, Solver};

/// Minimum credential set a holder must present to count as documented.
///
/// The policy is a predicate tree, so it is configured as data rather than
/// hardcoded per holder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentPolicy {
    tree: PredicateTree,
}

impl DocumentPolicy {
    pub fn new(tree: PredicateTree) -> Self {
        Self { tree }
    }

    /// Satisfied by any one credential of the listed types.
    pub fn any_of_types<I, S>(types: I) -> Result<Self, PredicateError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        PredicateNode::any(
            types
                .into_iter()
                .map(|t| PredicateNode::contains("type", t)),
        )
        .map(Self::new)
        .ok_or(PredicateError::MissingOperand {
            operator: Operator::Contains,
            field: "type".to_string(),
        })
    }

    /// A government identity document: passport, identity card or driving licence.
    pub fn identity_document() -> Self {
        let passport = PredicateNode::contains("type", credential_types::PASSPORT);
        let card = PredicateNode::contains("type", credential_types::IDENTITY_CARD);
        let license = PredicateNode::contains("type", credential_types::DRIVING_LICENSE);
        Self::new(passport.or(card).or(license))
    }

    pub fn tree(&self) -> &PredicateTree {
        &self.tree
    }

    /// Whether `credentials` jointly meet the policy.
    pub fn is_met_by<C>(&self, credentials: &[C], solver: &Solver) -> Result<bool, PredicateError>
    where
        C: Borrow<VerifiableCredential>,
    {
        solver.is_satisfied(&self.tree, credentials)
    }
}

impl Default for DocumentPolicy {
    fn default() -> Self {
        Self::identity_document()
    }
}
