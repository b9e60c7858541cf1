//! Validator binding.
//!
//! A [`Validator`] is a predicate consulted by form codecs after a field value
//! has been parsed. A failing check is reported as data: a [`Violation`] that
//! carries a human-readable description of the constraint and the offending
//! value.
//!
//! # Example
//!
//! ```rust
//! use schemaform::{Validator, Value};
//!
//! let min = Validator::min(5.0);
//! assert!(min.validate(&Value::Integer(10)).is_ok());
//!
//! let violation = min.validate(&Value::Integer(0)).unwrap_err();
//! assert_eq!(violation.constraint, "minimum 5");
//! ```

use std::fmt;
use std::sync::Arc;

use regex::Regex;
use tracing::trace;

use crate::value::Value;

/// A constraint checked against a parsed value.
#[derive(Clone)]
pub enum Validator {
    /// Numeric lower bound (inclusive)
    Min(f64),

    /// Numeric upper bound (inclusive)
    Max(f64),

    /// Minimum length in characters (text) or items (lists)
    MinLength(usize),

    /// Maximum length in characters (text) or items (lists)
    MaxLength(usize),

    /// Text must match the regular expression
    Pattern(Regex),

    /// Text must be one of the listed values
    OneOf(Vec<String>),

    /// User supplied predicate with its constraint description
    Custom {
        constraint: String,
        check: Arc<dyn Fn(&Value) -> bool + Send + Sync>,
    },
}

impl Validator {
    /// Numeric lower bound.
    pub fn min(min: f64) -> Self {
        Validator::Min(min)
    }

    /// Numeric upper bound.
    pub fn max(max: f64) -> Self {
        Validator::Max(max)
    }

    /// Minimum length.
    pub fn min_length(min: usize) -> Self {
        Validator::MinLength(min)
    }

    /// Maximum length.
    pub fn max_length(max: usize) -> Self {
        Validator::MaxLength(max)
    }

    /// Regular expression match.
    ///
    /// Fails when the pattern does not compile.
    pub fn pattern(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Validator::Pattern(Regex::new(pattern)?))
    }

    /// Membership in a fixed set of strings.
    pub fn one_of(values: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Validator::OneOf(values.into_iter().map(Into::into).collect())
    }

    /// User supplied predicate.
    pub fn custom(
        constraint: impl Into<String>,
        check: impl Fn(&Value) -> bool + Send + Sync + 'static,
    ) -> Self {
        Validator::Custom {
            constraint: constraint.into(),
            check: Arc::new(check),
        }
    }

    /// Human-readable description of the constraint.
    pub fn constraint(&self) -> String {
        match self {
            Validator::Min(min) => format!("minimum {}", min),
            Validator::Max(max) => format!("maximum {}", max),
            Validator::MinLength(min) => format!("minimum length {}", min),
            Validator::MaxLength(max) => format!("maximum length {}", max),
            Validator::Pattern(regex) => format!("matches /{}/", regex.as_str()),
            Validator::OneOf(values) => format!("one of [{}]", values.join(", ")),
            Validator::Custom { constraint, .. } => constraint.clone(),
        }
    }

    /// Check a value against this constraint.
    ///
    /// Values of a kind the constraint does not apply to (e.g. text checked
    /// against a numeric bound) fail the check.
    pub fn validate(&self, value: &Value) -> Result<(), Violation> {
        let passed = match self {
            Validator::Min(min) => value.as_f64().is_some_and(|v| v >= *min),
            Validator::Max(max) => value.as_f64().is_some_and(|v| v <= *max),
            Validator::MinLength(min) => value.len().is_some_and(|len| len >= *min),
            Validator::MaxLength(max) => value.len().is_some_and(|len| len <= *max),
            Validator::Pattern(regex) => match value {
                Value::String(s) => regex.is_match(s),
                _ => false,
            },
            Validator::OneOf(values) => match value {
                Value::String(s) => values.iter().any(|v| v == s),
                _ => false,
            },
            Validator::Custom { check, .. } => check(value),
        };

        if passed {
            Ok(())
        } else {
            let constraint = self.constraint();
            trace!(constraint = %constraint, value = %value, "Validator rejected value");
            Err(Violation {
                constraint,
                value: value.to_string(),
            })
        }
    }
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Validator({})", self.constraint())
    }
}

/// Check every validator in order, stopping at the first violation.
pub fn validate_all(validators: &[Validator], value: &Value) -> Result<(), Violation> {
    validators.iter().try_for_each(|v| v.validate(value))
}

/// A failed validator check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Description of the violated constraint (e.g., "minimum 5")
    pub constraint: String,

    /// The rejected value, rendered as text
    pub value: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "value {} violates {}", self.value, self.constraint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_min_and_max() {
        let min = Validator::min(5.0);
        assert!(min.validate(&Value::Integer(5)).is_ok());
        assert!(min.validate(&Value::Number(5.5)).is_ok());

        let violation = min.validate(&Value::Integer(0)).unwrap_err();
        assert_eq!(violation.constraint, "minimum 5");
        assert_eq!(violation.value, "0");

        let max = Validator::max(2.5);
        assert!(max.validate(&Value::Number(2.5)).is_ok());
        assert_eq!(
            max.validate(&Value::Integer(3)).unwrap_err().constraint,
            "maximum 2.5"
        );
    }

    #[test]
    fn test_numeric_bound_rejects_text() {
        assert!(Validator::min(1.0)
            .validate(&Value::String("10".to_string()))
            .is_err());
    }

    #[test]
    fn test_length_bounds() {
        let min = Validator::min_length(2);
        assert!(min.validate(&Value::String("ab".to_string())).is_ok());
        assert!(min.validate(&Value::String("a".to_string())).is_err());

        let max = Validator::max_length(1);
        assert!(max.validate(&Value::List(vec![Value::Absent])).is_ok());
        assert_eq!(
            max.validate(&Value::String("ab".to_string()))
                .unwrap_err()
                .constraint,
            "maximum length 1"
        );
    }

    #[test]
    fn test_pattern() {
        let pattern = Validator::pattern("^[a-z]+$").unwrap();
        assert!(pattern.validate(&Value::String("abc".to_string())).is_ok());
        let violation = pattern
            .validate(&Value::String("ABC".to_string()))
            .unwrap_err();
        assert_eq!(violation.constraint, "matches /^[a-z]+$/");

        assert!(Validator::pattern("(").is_err());
    }

    #[test]
    fn test_one_of() {
        let one_of = Validator::one_of(["red", "green"]);
        assert!(one_of.validate(&Value::String("red".to_string())).is_ok());
        assert_eq!(
            one_of
                .validate(&Value::String("blue".to_string()))
                .unwrap_err()
                .constraint,
            "one of [red, green]"
        );
    }

    #[test]
    fn test_custom() {
        let even = Validator::custom("even", |v| matches!(v, Value::Integer(i) if i % 2 == 0));
        assert!(even.validate(&Value::Integer(4)).is_ok());
        assert_eq!(even.validate(&Value::Integer(3)).unwrap_err().constraint, "even");
    }

    #[test]
    fn test_validate_all_stops_at_first_violation() {
        let validators = vec![Validator::min(0.0), Validator::max(10.0), Validator::min(20.0)];
        let violation = validate_all(&validators, &Value::Integer(11)).unwrap_err();
        assert_eq!(violation.constraint, "maximum 10");
        assert!(validate_all(&[], &Value::Absent).is_ok());
    }

    #[test]
    fn test_violation_display() {
        let violation = Validator::min(5.0).validate(&Value::Integer(1)).unwrap_err();
        assert_eq!(violation.to_string(), "value 1 violates minimum 5");
    }
}
