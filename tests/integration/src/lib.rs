//! Shared fixtures for the cross-crate scenario tests.

use chrono::{TimeZone, Utc};
use serde_json::Value;

use veritas_core::{Address, Timestamp};
use veritas_crypto::KeyPair;
use veritas_identity::{TrustedIssuerRegistry, VerifiableCredential};
use veritas_predicate::{PredicateNode, PredicateTree};

/// Midnight UTC on the given day.
pub fn ts(year: i32, month: u32, day: u32) -> Timestamp {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0)
        .single()
        .unwrap_or_default()
}

/// An issuer keypair registered in `registry` with open grants for `types` from `since`.
pub fn registered_issuer(
    registry: &TrustedIssuerRegistry,
    types: &[&str],
    since: Timestamp,
) -> KeyPair {
    let keypair = KeyPair::generate();
    registry.add_issuer(keypair.address());
    for credential_type in types {
        registry.grant_authority(&keypair.address(), credential_type, since, None);
    }
    tracing::debug!(issuer = %keypair.address(), "fixture issuer registered");
    keypair
}

/// A credential signed by `issuer`.
pub fn issue(
    issuer: &KeyPair,
    subject: &Address,
    credential_type: &str,
    claims: Value,
    valid_from: Timestamp,
) -> VerifiableCredential {
    VerifiableCredential::new(
        issuer.address(),
        subject.clone(),
        vec![credential_type.to_string()],
        claims,
    )
    .with_valid_from(valid_from)
    .issue(issuer)
    .unwrap_or_else(|e| panic!("fixture issuance failed: {}", e))
}

/// Claims of a phone-contact credential.
pub fn contact_claims(phone: &str, provider: &str) -> Value {
    serde_json::json!({
        "contact": {"phoneNumber": phone, "provider": provider}
    })
}

/// A US phone number from one of the accepted carriers.
pub fn contact_request() -> PredicateTree {
    PredicateNode::contains("type", "ContactCredential")
        .and(PredicateNode::not_empty("subjectClaims"))
        .and(PredicateNode::contains(
            "/credentialSubject/contact/phoneNumber",
            "+1 ",
        ))
        .and(PredicateNode::one_of(
            "/credentialSubject/contact/provider",
            ["Verizon", "AT&T", "Mint"],
        ))
}
