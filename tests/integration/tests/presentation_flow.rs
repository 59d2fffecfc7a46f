//! End-to-end: issuers grant, holders store and answer requests, relying
//! parties validate what they receive.

use serde_json::json;

use veritas_core::FixedClock;
use veritas_credentials::{
    CredentialGraph, CredentialWallet, DocumentPolicy, Ed25519Verifier, PresentationRequest,
    PresentationResponse, TrustContext,
};
use veritas_crypto::{hash, KeyPair};
use veritas_identity::credential_types::{BIOMETRIC_EVIDENCE, LIVENESS, PASSPORT};
use veritas_identity::{Evidence, TrustedIssuerRegistry, VerifiableCredential};
use veritas_integration_tests::{contact_claims, contact_request, issue, registered_issuer, ts};
use veritas_predicate::{PredicateNode, Solver};

#[test]
fn test_contact_request_disclosed_and_accepted() {
    let registry = TrustedIssuerRegistry::new();
    let carrier = registered_issuer(&registry, &["ContactCredential"], ts(2024, 1, 1));
    let government = registered_issuer(&registry, &[PASSPORT], ts(2024, 1, 1));
    let verifier = Ed25519Verifier::new();
    let clock = FixedClock::new(ts(2024, 6, 1));
    let solver = Solver::default();

    let wallet = CredentialWallet::new(KeyPair::generate());
    let phone = issue(
        &carrier,
        wallet.owner(),
        "ContactCredential",
        contact_claims("+1 555-12345", "Verizon"),
        ts(2024, 2, 1),
    );
    wallet.store(phone.clone()).unwrap();
    wallet
        .store(issue(
            &government,
            wallet.owner(),
            PASSPORT,
            json!({"nationality": "US"}),
            ts(2024, 2, 1),
        ))
        .unwrap();

    let trust = TrustContext {
        registry: &registry,
        verifier: &verifier,
        clock: &clock,
        solver: &solver,
    };
    let request = PresentationRequest::new(contact_request());
    let presentation = match wallet.respond(&request, &trust).unwrap() {
        PresentationResponse::Disclose(vp) => vp,
        PresentationResponse::Missing(report) => panic!("unexpected report:\n{}", report),
    };
    // only the phone credential leaves the wallet
    assert_eq!(presentation.credentials, vec![phone]);

    let received = vec![presentation];
    let graph = CredentialGraph::build(&registry, &received, &verifier, &clock).unwrap();
    let valid = graph.valid_credentials_for(wallet.owner());
    assert_eq!(valid.len(), 1);
    let check = solver.find_optimal_match(&request.tree, &valid).unwrap();
    assert!(check.found);
}

#[test]
fn test_wallet_reports_missing_predicates() {
    let registry = TrustedIssuerRegistry::new();
    let carrier = registered_issuer(&registry, &["ContactCredential"], ts(2024, 1, 1));
    let verifier = Ed25519Verifier::new();
    let clock = FixedClock::new(ts(2024, 6, 1));
    let solver = Solver::default();

    let wallet = CredentialWallet::new(KeyPair::generate());
    wallet
        .store(issue(
            &carrier,
            wallet.owner(),
            "ContactCredential",
            contact_claims("+44 20 7946 0000", "Vodafone"),
            ts(2024, 2, 1),
        ))
        .unwrap();

    let trust = TrustContext {
        registry: &registry,
        verifier: &verifier,
        clock: &clock,
        solver: &solver,
    };
    let request = PresentationRequest::new(contact_request());
    let report = match wallet.respond(&request, &trust).unwrap() {
        PresentationResponse::Missing(report) => report,
        PresentationResponse::Disclose(_) => panic!("request should not be satisfiable"),
    };
    assert_eq!(report.len(), 1);
    let fields: Vec<&str> = report.requirements[0].solution.options[0]
        .predicates
        .iter()
        .map(|p| p.field())
        .collect();
    assert_eq!(
        fields,
        vec![
            "/credentialSubject/contact/phoneNumber",
            "/credentialSubject/contact/provider"
        ]
    );
}

#[test]
fn test_credential_outliving_issuer_authority_is_ignored() {
    let registry = TrustedIssuerRegistry::new();
    let government = registered_issuer(&registry, &[PASSPORT], ts(2024, 1, 1));
    registry
        .revoke_authority(&government.address(), PASSPORT, ts(2024, 3, 1))
        .unwrap();
    let verifier = Ed25519Verifier::new();
    let clock = FixedClock::new(ts(2024, 6, 1));
    let holder = KeyPair::generate();

    let before = issue(&government, &holder.address(), PASSPORT, json!({}), ts(2024, 2, 1));
    let after = issue(&government, &holder.address(), PASSPORT, json!({}), ts(2024, 4, 1));
    let presentations = vec![veritas_identity::VerifiablePresentation::new(
        holder.address(),
        vec![before.clone(), after],
    )
    .sign(&holder)
    .unwrap()];

    let graph = CredentialGraph::build(&registry, &presentations, &verifier, &clock).unwrap();
    // issued while authorized: still valid after revocation
    assert_eq!(graph.valid_credentials_for(&holder.address()), vec![&before]);
    assert!(graph
        .valid_document_for(
            &holder.address(),
            &DocumentPolicy::identity_document(),
            &Solver::default()
        )
        .unwrap());
}

#[test]
fn test_liveness_authentication_round() {
    let registry = TrustedIssuerRegistry::new();
    let biometrics = registered_issuer(&registry, &[LIVENESS], ts(2024, 1, 1));
    let verifier = Ed25519Verifier::new();
    let clock = FixedClock::new(ts(2024, 6, 1));
    let holder = KeyPair::generate();
    let challenge = hash(b"login-nonce-7");

    let liveness = VerifiableCredential::new(
        biometrics.address(),
        holder.address(),
        vec![LIVENESS.into()],
        json!({}),
    )
    .with_valid_from(ts(2024, 5, 31))
    .with_evidence(Evidence::from_digest(BIOMETRIC_EVIDENCE, &challenge))
    .issue(&biometrics)
    .unwrap();

    let presentations = vec![veritas_identity::VerifiablePresentation::new(
        holder.address(),
        vec![liveness],
    )
    .sign(&holder)
    .unwrap()];
    let graph = CredentialGraph::build(&registry, &presentations, &verifier, &clock).unwrap();
    assert!(graph
        .valid_authentication_for(&holder.address(), Some(&challenge))
        .unwrap());
    assert!(!graph
        .valid_authentication_for(&holder.address(), Some(&hash(b"replayed")))
        .unwrap());
}

#[test]
fn test_foreign_presentation_signature_fails_build() {
    let registry = TrustedIssuerRegistry::new();
    let verifier = Ed25519Verifier::new();
    let clock = FixedClock::new(ts(2024, 6, 1));
    let holder = KeyPair::generate();
    let mut presentation =
        veritas_identity::VerifiablePresentation::new(holder.address(), Vec::new())
            .sign(&holder)
            .unwrap();
    presentation.holder = KeyPair::generate().address();

    let presentations = vec![presentation];
    assert!(CredentialGraph::build(&registry, &presentations, &verifier, &clock).is_err());
}

#[test]
fn test_or_request_prefers_older_credential() {
    let registry = TrustedIssuerRegistry::new();
    let government = registered_issuer(
        &registry,
        &[PASSPORT, "DrivingLicenseCredential"],
        ts(2020, 1, 1),
    );
    let verifier = Ed25519Verifier::new();
    let clock = FixedClock::new(ts(2024, 6, 1));
    let solver = Solver::default();

    let wallet = CredentialWallet::new(KeyPair::generate());
    let license = issue(
        &government,
        wallet.owner(),
        "DrivingLicenseCredential",
        json!({}),
        ts(2021, 1, 1),
    );
    wallet
        .store(issue(&government, wallet.owner(), PASSPORT, json!({}), ts(2023, 1, 1)))
        .unwrap();
    wallet.store(license.clone()).unwrap();

    let request = PresentationRequest::new(
        PredicateNode::contains("type", PASSPORT)
            .or(PredicateNode::contains("type", "DrivingLicenseCredential")),
    );
    let trust = TrustContext {
        registry: &registry,
        verifier: &verifier,
        clock: &clock,
        solver: &solver,
    };
    match wallet.respond(&request, &trust).unwrap() {
        PresentationResponse::Disclose(vp) => assert_eq!(vp.credentials, vec![license]),
        PresentationResponse::Missing(report) => panic!("unexpected report:\n{}", report),
    }
}
