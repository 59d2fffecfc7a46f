use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use veritas_identity::VerifiableCredential;

use crate::error::PredicateError;
use crate::matcher;

/// Comparison applied by a leaf predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Operator {
    Equals,
    NotEquals,
    GreaterThan,
    GreaterThanOrEquals,
    LessThan,
    LessThanOrEquals,
    Contains,
    NotContains,
    OneOf,
    NotOneOf,
    Empty,
    NotEmpty,
}

impl Operator {
    pub const ALL: [Operator; 12] = [
        Self::Equals,
        Self::NotEquals,
        Self::GreaterThan,
        Self::GreaterThanOrEquals,
        Self::LessThan,
        Self::LessThanOrEquals,
        Self::Contains,
        Self::NotContains,
        Self::OneOf,
        Self::NotOneOf,
        Self::Empty,
        Self::NotEmpty,
    ];

    /// Wire name of the operator.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Equals => "equals",
            Self::NotEquals => "notEquals",
            Self::GreaterThan => "greaterThan",
            Self::GreaterThanOrEquals => "greaterThanOrEquals",
            Self::LessThan => "lessThan",
            Self::LessThanOrEquals => "lessThanOrEquals",
            Self::Contains => "contains",
            Self::NotContains => "notContains",
            Self::OneOf => "oneOf",
            Self::NotOneOf => "notOneOf",
            Self::Empty => "empty",
            Self::NotEmpty => "notEmpty",
        }
    }

    /// Whether the operator reads operand values.
    pub fn takes_operands(&self) -> bool {
        !matches!(self, Self::Empty | Self::NotEmpty)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operator {
    type Err = PredicateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|op| op.as_str() == s)
            .ok_or_else(|| PredicateError::UnknownOperator(s.to_string()))
    }
}

/// A single field/operator/values constraint over one credential.
///
/// Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Predicator {
    operator: Operator,
    field: String,
    #[serde(default)]
    values: Vec<String>,
}

impl Predicator {
    /// Build a predicate, rejecting operand-taking operators without values.
    pub fn new(
        operator: Operator,
        field: impl Into<String>,
        values: Vec<String>,
    ) -> Result<Self, PredicateError> {
        let predicator = Self::unchecked(operator, field.into(), values);
        predicator.check_operands()?;
        Ok(predicator)
    }

    /// Build a predicate from its wire form.
    pub fn from_parts(
        operator: &str,
        field: impl Into<String>,
        values: Vec<String>,
    ) -> Result<Self, PredicateError> {
        Self::new(operator.parse()?, field, values)
    }

    pub(crate) fn unchecked(operator: Operator, field: String, values: Vec<String>) -> Self {
        Self {
            operator,
            field,
            values,
        }
    }

    pub(crate) fn check_operands(&self) -> Result<(), PredicateError> {
        if self.operator.takes_operands() && self.values.is_empty() {
            return Err(PredicateError::MissingOperand {
                operator: self.operator,
                field: self.field.clone(),
            });
        }
        Ok(())
    }

    pub fn operator(&self) -> Operator {
        self.operator
    }

    /// Field selector: a JSON pointer or one of the pseudo-fields `type`, `subjectClaims`.
    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    /// Whether this predicate holds for `credential`.
    pub fn matches(&self, credential: &VerifiableCredential) -> bool {
        matcher::evaluate(self, credential)
    }
}

impl fmt::Display for Predicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.field, self.operator)?;
        if !self.values.is_empty() {
            write!(f, " [{}]", self.values.join(", "))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_wire_names_roundtrip() {
        for op in Operator::ALL {
            assert_eq!(op.as_str().parse::<Operator>().unwrap(), op);
            let json = serde_json::to_string(&op).unwrap();
            assert_eq!(json, format!("\"{}\"", op.as_str()));
        }
    }

    #[test]
    fn test_unknown_operator() {
        assert_eq!(
            "startsWith".parse::<Operator>(),
            Err(PredicateError::UnknownOperator("startsWith".into()))
        );
        assert!(Predicator::from_parts("EQUALS", "/a", vec!["x".into()]).is_err());
    }

    #[test]
    fn test_missing_operand() {
        let err = Predicator::new(Operator::OneOf, "/provider", Vec::new()).unwrap_err();
        assert!(matches!(err, PredicateError::MissingOperand { .. }));
    }

    #[test]
    fn test_empty_needs_no_operand() {
        let p = Predicator::new(Operator::NotEmpty, "subjectClaims", Vec::new()).unwrap();
        assert_eq!(p.operator(), Operator::NotEmpty);
        assert!(p.values().is_empty());
    }

    #[test]
    fn test_display() {
        let p = Predicator::from_parts(
            "oneOf",
            "/credentialSubject/provider",
            vec!["Verizon".into(), "Mint".into()],
        )
        .unwrap();
        assert_eq!(
            p.to_string(),
            "/credentialSubject/provider oneOf [Verizon, Mint]"
        );
    }

    #[test]
    fn test_serde_shape() {
        let p = Predicator::new(Operator::GreaterThanOrEquals, "/age", vec!["18".into()]).unwrap();
        let value = serde_json::to_value(&p).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"operator": "greaterThanOrEquals", "field": "/age", "values": ["18"]})
        );
    }
}
