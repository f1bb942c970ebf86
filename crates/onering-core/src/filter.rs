//! Property filters used by the store's bulk lookups and by ORQL `WHERE` clauses

use crate::property::Properties;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A property predicate
///
/// A key missing on the entity never matches. Comparison is exact equality on
/// the stored scalar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PropertyFilter {
    /// Every pair must match
    Conjunction(Properties),
    /// At least one of the sub-maps must match entirely
    Disjunction(Vec<Properties>),
}

impl PropertyFilter {
    /// Check a property map against this filter
    pub fn matches(&self, properties: &Properties) -> bool {
        match self {
            PropertyFilter::Conjunction(required) => all_match(required, properties),
            PropertyFilter::Disjunction(alternatives) => alternatives
                .iter()
                .any(|required| all_match(required, properties)),
        }
    }
}

fn all_match(required: &Properties, properties: &Properties) -> bool {
    required
        .iter()
        .all(|(key, value)| properties.get(key) == Some(value))
}

/// Apply an optional filter; `None` accepts everything
pub fn accepts(filter: Option<&PropertyFilter>, properties: &Properties) -> bool {
    filter.is_none_or(|f| f.matches(properties))
}

impl fmt::Display for PropertyFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyFilter::Conjunction(required) => write!(f, "all of {}", required),
            PropertyFilter::Disjunction(alternatives) => {
                write!(f, "any of [")?;
                for (i, required) in alternatives.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", required)?;
                }
                write!(f, "]")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::property::PropertyValue;

    fn aragorn() -> Properties {
        [
            ("race", PropertyValue::from("Human")),
            ("region", PropertyValue::from("Gondor")),
            ("age", PropertyValue::from(87i64)),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_conjunction_requires_every_key() {
        let filter = PropertyFilter::Conjunction(
            [("race", "Human"), ("region", "Gondor")].into_iter().collect(),
        );
        assert!(filter.matches(&aragorn()));

        let filter = PropertyFilter::Conjunction(
            [("race", "Human"), ("region", "Rohan")].into_iter().collect(),
        );
        assert!(!filter.matches(&aragorn()));
    }

    #[test]
    fn test_missing_key_fails() {
        let filter = PropertyFilter::Conjunction(Properties::with("ring", true));
        assert!(!filter.matches(&aragorn()));
    }

    #[test]
    fn test_disjunction_needs_one_branch() {
        let filter = PropertyFilter::Disjunction(vec![
            Properties::with("age", 1i64),
            Properties::with("region", "Gondor"),
        ]);
        assert!(filter.matches(&aragorn()));

        let filter = PropertyFilter::Disjunction(vec![Properties::with("age", "87")]);
        assert!(!filter.matches(&aragorn()));
    }

    #[test]
    fn test_empty_conjunction_accepts_all() {
        let filter = PropertyFilter::Conjunction(Properties::new());
        assert!(filter.matches(&Properties::new()));
        assert!(accepts(None, &aragorn()));
    }

    #[test]
    fn test_filter_display() {
        let filter = PropertyFilter::Disjunction(vec![
            Properties::with("a", 1i64),
            Properties::with("b", 2i64),
        ]);
        assert_eq!(filter.to_string(), "any of [{a: 1}, {b: 2}]");
    }
}
