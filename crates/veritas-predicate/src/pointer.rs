//! Field resolution against a credential.
//!
//! Selectors are RFC 6901 JSON pointers with a handful of reserved roots:
//!
//! | selector                   | resolves to                      |
//! |----------------------------|----------------------------------|
//! | `type`, `/type`            | the credential types array       |
//! | `subjectClaims`, `""`      | the whole claims object          |
//! | `/credentialSubject/...`   | pointer into the claims object   |
//! | `/id`, `/issuer`, `/subject`, `/validFrom`, `/validUntil` | credential metadata |
//! | any other `/...`           | pointer into the claims object   |
//! | bare `name`                | top-level claim `name`           |

use serde_json::Value;
use std::borrow::Cow;

use veritas_identity::VerifiableCredential;

const SUBJECT_ROOT: &str = "/credentialSubject";

/// Resolve `field` against `credential`. `None` when the path does not exist.
pub fn resolve<'a>(credential: &'a VerifiableCredential, field: &str) -> Option<Cow<'a, Value>> {
    match field {
        "type" | "/type" => Some(Cow::Owned(Value::from(credential.credential_type.clone()))),
        "subjectClaims" | "" => Some(Cow::Borrowed(&credential.claims)),
        "/id" => Some(Cow::Owned(Value::from(credential.id.clone()))),
        "/issuer" => Some(Cow::Owned(Value::from(credential.issuer.to_string()))),
        "/subject" => Some(Cow::Owned(Value::from(credential.subject.to_string()))),
        "/validFrom" => Some(Cow::Owned(Value::from(credential.valid_from.to_rfc3339()))),
        "/validUntil" => credential
            .valid_until
            .map(|until| Cow::Owned(Value::from(until.to_rfc3339()))),
        _ => resolve_claim(&credential.claims, field).map(Cow::Borrowed),
    }
}

fn resolve_claim<'a>(claims: &'a Value, field: &str) -> Option<&'a Value> {
    if let Some(rest) = field.strip_prefix(SUBJECT_ROOT) {
        if rest.is_empty() {
            return Some(claims);
        }
        if rest.starts_with('/') {
            return claims.pointer(rest);
        }
    }
    if field.starts_with('/') {
        claims.pointer(field)
    } else {
        claims.get(field)
    }
}
