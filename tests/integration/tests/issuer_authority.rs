//! Temporal authority semantics of the trusted issuer registry.

use chrono::Duration;
use std::sync::Arc;
use std::thread;

use veritas_core::{Address, FixedClock};
use veritas_credentials::{CredentialError, CredentialGraph, Ed25519Verifier};
use veritas_crypto::KeyPair;
use veritas_identity::{IdentityError, TrustedIssuerRegistry, VerifiablePresentation};
use veritas_integration_tests::{issue, ts};

const PASSPORT: &str = "PassportCredential";

fn issuer(name: &str) -> Address {
    Address::new(format!("did:veritas:{}", name)).unwrap()
}

#[test]
fn test_interval_end_is_exclusive() {
    let registry = TrustedIssuerRegistry::new();
    let i = issuer("gov");
    let (t0, t1) = (ts(2024, 1, 1), ts(2024, 7, 1));
    registry.add_issuer(i.clone());
    assert!(registry.grant_authority(&i, PASSPORT, t0, Some(t1)));

    assert!(!registry.authority_at(&i, PASSPORT, t1));
    assert!(registry.authority_at(&i, PASSPORT, t1 - Duration::nanoseconds(1)));
    assert!(registry.authority_at(&i, PASSPORT, t0));
    assert!(!registry.authority_at(&i, PASSPORT, t0 - Duration::nanoseconds(1)));
}

#[test]
fn test_revocation_only_affects_later_instants() {
    let registry = TrustedIssuerRegistry::new();
    let i = issuer("gov");
    registry.add_issuer(i.clone());
    registry.grant_authority(&i, PASSPORT, ts(2024, 1, 1), None);

    let probes: Vec<_> = (1..=12).map(|m| ts(2024, m, 15)).collect();
    let before: Vec<bool> = probes
        .iter()
        .map(|&t| registry.authority_at(&i, PASSPORT, t))
        .collect();

    let r = ts(2024, 6, 1);
    registry.revoke_authority(&i, PASSPORT, r).unwrap();
    for (t, was) in probes.iter().zip(before) {
        let now = registry.authority_at(&i, PASSPORT, *t);
        if *t >= r {
            assert!(!now, "still authorized at {}", t);
        } else {
            assert_eq!(now, was, "changed at {}", t);
        }
    }
}

#[test]
fn test_revoke_without_open_grant() {
    let registry = TrustedIssuerRegistry::new();
    let i = issuer("gov");
    registry.add_issuer(i.clone());
    registry.grant_authority(&i, PASSPORT, ts(2024, 1, 1), Some(ts(2024, 2, 1)));

    let err = registry
        .revoke_authority(&i, PASSPORT, ts(2024, 3, 1))
        .unwrap_err();
    assert!(matches!(err, IdentityError::RevokeWithoutGrant { .. }));
    assert!(registry
        .revoke_authority(&issuer("unknown"), PASSPORT, ts(2024, 3, 1))
        .is_err());
}

#[test]
fn test_overlapping_grants_union_coverage() {
    let registry = TrustedIssuerRegistry::new();
    let i = issuer("gov");
    registry.add_issuer(i.clone());
    registry.grant_authority(&i, PASSPORT, ts(2024, 1, 1), Some(ts(2024, 5, 1)));
    registry.grant_authority(&i, PASSPORT, ts(2024, 3, 1), Some(ts(2024, 9, 1)));

    assert!(registry.authority_at(&i, PASSPORT, ts(2024, 2, 1)));
    assert!(registry.authority_at(&i, PASSPORT, ts(2024, 7, 1)));
    assert!(!registry.authority_at(&i, PASSPORT, ts(2024, 10, 1)));
    assert_eq!(registry.intervals(&i, PASSPORT).len(), 2);
}

#[test]
fn test_grant_requires_registered_issuer() {
    let registry = TrustedIssuerRegistry::new();
    let i = issuer("gov");
    assert!(!registry.grant_authority(&i, PASSPORT, ts(2024, 1, 1), None));
    assert!(!registry.authority_at(&i, PASSPORT, ts(2024, 2, 1)));
    assert!(registry.add_issuer(i.clone()));
    assert!(registry.grant_authority(&i, PASSPORT, ts(2024, 1, 1), None));
    assert_eq!(registry.authority_for(&i, ts(2024, 2, 1)), vec![PASSPORT]);
}

#[test]
fn test_seeded_profiles() {
    let production = TrustedIssuerRegistry::production();
    let sandbox = TrustedIssuerRegistry::sandbox();
    assert!(production.self_issuable_at("ProfileNameCredential", ts(2023, 6, 1)));
    assert!(!production.self_issuable_at("ProfileNameCredential", ts(2023, 5, 31)));
    assert!(!production.self_issuable_at("TestCredential", ts(2024, 1, 1)));
    assert!(sandbox.self_issuable_at("TestCredential", ts(2023, 1, 1)));
    assert_eq!(production.issuer_count(), 0);
}

#[test]
fn test_unauthorized_issuer_surfaces_from_graph() {
    let registry = TrustedIssuerRegistry::new();
    let government = KeyPair::generate();
    registry.add_issuer(government.address());
    registry.grant_authority(
        &government.address(),
        PASSPORT,
        ts(2024, 1, 1),
        Some(ts(2024, 2, 1)),
    );
    let holder = KeyPair::generate();
    let late = issue(
        &government,
        &holder.address(),
        PASSPORT,
        serde_json::json!({}),
        ts(2024, 2, 1),
    );
    let presentations = vec![VerifiablePresentation::new(holder.address(), vec![late.clone()])
        .sign(&holder)
        .unwrap()];
    let verifier = Ed25519Verifier::new();
    let clock = FixedClock::new(ts(2024, 6, 1));
    let graph = CredentialGraph::build(&registry, &presentations, &verifier, &clock).unwrap();

    match graph.validate(&late) {
        Err(CredentialError::UnauthorizedIssuer {
            issuer,
            credential_type,
            at,
        }) => {
            assert_eq!(issuer, government.address());
            assert_eq!(credential_type, PASSPORT);
            assert_eq!(at, ts(2024, 2, 1));
        }
        other => panic!("unexpected: {:?}", other),
    }
}

#[test]
fn test_concurrent_readers_and_writers() {
    let registry = Arc::new(TrustedIssuerRegistry::new());
    let issuers: Vec<Address> = (0..8).map(|n| issuer(&format!("i{}", n))).collect();
    for i in &issuers {
        registry.add_issuer(i.clone());
    }

    let mut handles = Vec::new();
    for (n, i) in issuers.iter().cloned().enumerate() {
        let registry = Arc::clone(&registry);
        handles.push(thread::spawn(move || {
            for day in 1..=28 {
                registry.grant_authority(&i, PASSPORT, ts(2024, 1, day), None);
                registry
                    .revoke_authority(&i, PASSPORT, ts(2024, 2, day))
                    .unwrap();
            }
            n
        }));
    }
    for _ in 0..4 {
        let registry = Arc::clone(&registry);
        let issuers = issuers.clone();
        handles.push(thread::spawn(move || {
            for i in &issuers {
                // granted intervals always start in January
                assert!(!registry.authority_at(i, PASSPORT, ts(2023, 12, 31)));
                let _ = registry.authority_for(i, ts(2024, 1, 15));
            }
            0
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }

    for i in &issuers {
        let intervals = registry.intervals(i, PASSPORT);
        assert_eq!(intervals.len(), 28);
        assert!(intervals.iter().all(|interval| !interval.is_open()));
        assert!(registry.authority_at(i, PASSPORT, ts(2024, 1, 28)));
        assert!(!registry.authority_at(i, PASSPORT, ts(2024, 2, 28)));
    }
}
