use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use veritas_core::{Address, Clock};
use veritas_crypto::KeyPair;
use veritas_identity::{TrustedIssuerRegistry, VerifiableCredential, VerifiablePresentation};
use veritas_predicate::{PredicateTree, Report, Solver};

use crate::error::CredentialError;
use crate::graph::CredentialGraph;
use crate::verifier::Verifier;

/// A relying party's request for credentials matching a predicate tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresentationRequest {
    pub id: String,
    pub tree: PredicateTree,
}

impl PresentationRequest {
    pub fn new(tree: PredicateTree) -> Self {
        Self {
            id: format!("urn:uuid:{}", Uuid::now_v7()),
            tree,
        }
    }
}

/// Outcome of answering a [`PresentationRequest`].
#[derive(Debug, Clone, PartialEq)]
pub enum PresentationResponse {
    /// Signed presentation carrying the minimal matching credential set.
    Disclose(VerifiablePresentation),
    /// What the holder would still need to obtain.
    Missing(Report),
}

/// The trust inputs a wallet validates its own credentials against.
pub struct TrustContext<'a> {
    pub registry: &'a TrustedIssuerRegistry,
    pub verifier: &'a dyn Verifier,
    pub clock: &'a dyn Clock,
    pub solver: &'a Solver,
}

/// Credential wallet for a holder. Stores credentials and answers presentation requests.
pub struct CredentialWallet {
    keypair: KeyPair,
    owner: Address,
    /// Credential ID → VerifiableCredential.
    credentials: DashMap<String, VerifiableCredential>,
}

impl CredentialWallet {
    pub fn new(keypair: KeyPair) -> Self {
        let owner = keypair.address();
        Self {
            keypair,
            owner,
            credentials: DashMap::new(),
        }
    }

    pub fn owner(&self) -> &Address {
        &self.owner
    }

    /// Store a credential about the wallet owner.
    pub fn store(&self, credential: VerifiableCredential) -> Result<(), CredentialError> {
        if credential.subject != self.owner {
            return Err(CredentialError::SubjectMismatch {
                subject: credential.subject,
                holder: self.owner.clone(),
            });
        }
        let id = credential.id.clone();
        self.credentials.insert(id.clone(), credential);
        tracing::debug!(credential_id = %id, "credential stored in wallet");
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<VerifiableCredential> {
        self.credentials.get(id).map(|e| e.clone())
    }

    /// Stored credential IDs, sorted.
    pub fn list(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.credentials.iter().map(|e| e.key().clone()).collect();
        ids.sort();
        ids
    }

    pub fn list_by_type(&self, credential_type: &str) -> Vec<VerifiableCredential> {
        self.ordered()
            .into_iter()
            .filter(|vc| vc.has_type(credential_type))
            .collect()
    }

    pub fn count(&self) -> usize {
        self.credentials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.credentials.is_empty()
    }

    pub fn remove(&self, id: &str) -> Option<VerifiableCredential> {
        self.credentials.remove(id).map(|(_, vc)| vc)
    }

    /// All credentials ordered by `(validFrom, id)`.
    fn ordered(&self) -> Vec<VerifiableCredential> {
        let mut all: Vec<VerifiableCredential> =
            self.credentials.iter().map(|e| e.value().clone()).collect();
        all.sort_by(|a, b| (a.valid_from, &a.id).cmp(&(b.valid_from, &b.id)));
        all
    }

    /// Sign a presentation of `credentials` as the wallet owner.
    pub fn present(
        &self,
        credentials: Vec<VerifiableCredential>,
    ) -> Result<VerifiablePresentation, CredentialError> {
        Ok(VerifiablePresentation::new(self.owner.clone(), credentials).sign(&self.keypair)?)
    }

    /// Answer `request` with the smallest set of currently valid credentials
    /// that satisfies it, or with the predicates still missing.
    pub fn respond(
        &self,
        request: &PresentationRequest,
        trust: &TrustContext<'_>,
    ) -> Result<PresentationResponse, CredentialError> {
        trust.solver.check(&request.tree)?;

        let own = [self.present(self.ordered())?];
        let graph = CredentialGraph::build(trust.registry, &own, trust.verifier, trust.clock)?;
        let candidates = graph.valid_credentials_for(&self.owner);

        let found = trust.solver.find_optimal_match(&request.tree, &candidates)?;
        if found.found {
            let disclosed: Vec<VerifiableCredential> =
                found.selected.into_iter().cloned().collect();
            tracing::info!(
                request_id = %request.id,
                holder = %self.owner,
                disclosed = disclosed.len(),
                "presentation request satisfied"
            );
            return Ok(PresentationResponse::Disclose(self.present(disclosed)?));
        }

        let report = trust
            .solver
            .find_missing_predicates(&request.tree, &candidates)?;
        tracing::info!(
            request_id = %request.id,
            holder = %self.owner,
            requirements = report.len(),
            "presentation request cannot be satisfied"
        );
        Ok(PresentationResponse::Missing(report))
    }
}
