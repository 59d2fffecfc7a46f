//! Evaluation of one leaf predicate against one credential.
//!
//! Matching never fails: a path that does not resolve, or a value of the
//! wrong shape, simply does not match. Only `empty` holds for a missing field.
//!
//! Ordering operators compare numerically when both the claim and the operand
//! parse as finite numbers, and by bytes otherwise.

use serde_json::Value;
use std::borrow::Cow;
use std::cmp::Ordering;

use veritas_identity::VerifiableCredential;

use crate::pointer;
use crate::predicate::{Operator, Predicator};

/// Whether `predicator` holds for `credential`.
pub fn evaluate(predicator: &Predicator, credential: &VerifiableCredential) -> bool {
    let resolved = pointer::resolve(credential, predicator.field());
    let target = resolved.as_deref();
    let values = predicator.values();

    match predicator.operator() {
        Operator::Empty => is_empty(target),
        Operator::NotEmpty => !is_empty(target),
        Operator::Equals => with_first(values, |v| scalar_text(target).is_some_and(|t| t == v)),
        Operator::NotEquals => with_first(values, |v| scalar_text(target).is_some_and(|t| t != v)),
        Operator::OneOf => scalar_text(target).is_some_and(|t| values.iter().any(|v| *v == t)),
        Operator::NotOneOf => {
            !values.is_empty() && scalar_text(target).is_some_and(|t| values.iter().all(|v| *v != t))
        }
        Operator::GreaterThan => ordered(target, values, Ordering::is_gt),
        Operator::GreaterThanOrEquals => ordered(target, values, Ordering::is_ge),
        Operator::LessThan => ordered(target, values, Ordering::is_lt),
        Operator::LessThanOrEquals => ordered(target, values, Ordering::is_le),
        Operator::Contains => with_first(values, |v| target.is_some_and(|t| contains(t, v))),
        Operator::NotContains => {
            with_first(values, |v| is_present(target) && target.is_some_and(|t| !contains(t, v)))
        }
    }
}

fn with_first(values: &[String], f: impl FnOnce(&str) -> bool) -> bool {
    values.first().is_some_and(|v| f(v))
}

fn is_present(value: Option<&Value>) -> bool {
    !matches!(value, None | Some(Value::Null))
}

fn is_empty(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(Value::Array(a)) => a.is_empty(),
        Some(Value::Object(o)) => o.is_empty(),
        Some(Value::Number(_)) | Some(Value::Bool(_)) => false,
    }
}

/// Textual form of a scalar claim. Arrays, objects and null have none.
fn scalar_text(value: Option<&Value>) -> Option<Cow<'_, str>> {
    match value? {
        Value::String(s) => Some(Cow::Borrowed(s.as_str())),
        Value::Number(n) => Some(Cow::Owned(n.to_string())),
        Value::Bool(true) => Some(Cow::Borrowed("true")),
        Value::Bool(false) => Some(Cow::Borrowed("false")),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

fn ordered(target: Option<&Value>, values: &[String], accept: fn(Ordering) -> bool) -> bool {
    let (Some(target), Some(operand)) = (scalar_text(target), values.first()) else {
        return false;
    };
    compare(&target, operand).is_some_and(accept)
}

/// Claim-vs-operand ordering.
fn compare(target: &str, operand: &str) -> Option<Ordering> {
    match (parse_number(target), parse_number(operand)) {
        (Some(a), Some(b)) => a.partial_cmp(&b),
        _ => Some(target.as_bytes().cmp(operand.as_bytes())),
    }
}

fn parse_number(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

fn contains(target: &Value, operand: &str) -> bool {
    match target {
        Value::String(s) => s.contains(operand),
        Value::Array(items) => items
            .iter()
            .any(|item| scalar_text(Some(item)).is_some_and(|t| t == operand)),
        Value::Object(map) => map.contains_key(operand),
        Value::Null | Value::Number(_) | Value::Bool(_) => false,
    }
}
