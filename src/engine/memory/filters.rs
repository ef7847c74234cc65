//! Filter evaluation for the memory engine
//!
//! No type coercion: comparisons between different storage types never match.
//! - equality holds when both sides are absent, or both present and equal
//! - ordering comparisons require both sides present
//! - `like` requires both sides to be strings

use regex::Regex;
use std::cmp::Ordering;

use crate::engine::errors::EngineResult;
use crate::engine::spec::{Attributes, ComparisonOperator, Filter, Operand};
use crate::schema::StorableValue;

/// A filter with its constant `like` patterns compiled.
#[derive(Debug)]
pub enum CompiledFilter {
    Comparison {
        left: Operand,
        op: ComparisonOperator,
        right: Operand,
        pattern: Option<Regex>,
    },
    And(Vec<CompiledFilter>),
    Or(Vec<CompiledFilter>),
    Not(Box<CompiledFilter>),
}

impl CompiledFilter {
    /// Compiles a filter, failing on invalid constant patterns
    pub fn compile(filter: &Filter) -> EngineResult<Self> {
        Ok(match filter {
            Filter::Comparison { left, op, right } => {
                let pattern = match (op, right) {
                    (ComparisonOperator::Like, Operand::Constant(StorableValue::String(p))) => {
                        Some(like_regex(p)?)
                    }
                    _ => None,
                };
                CompiledFilter::Comparison {
                    left: left.clone(),
                    op: *op,
                    right: right.clone(),
                    pattern,
                }
            }
            Filter::And(filters) => CompiledFilter::And(
                filters.iter().map(Self::compile).collect::<EngineResult<_>>()?,
            ),
            Filter::Or(filters) => CompiledFilter::Or(
                filters.iter().map(Self::compile).collect::<EngineResult<_>>()?,
            ),
            Filter::Not(filter) => CompiledFilter::Not(Box::new(Self::compile(filter)?)),
        })
    }

    /// Checks if a record matches
    pub fn matches(&self, attributes: &Attributes) -> bool {
        match self {
            CompiledFilter::Comparison {
                left,
                op,
                right,
                pattern,
            } => {
                let left = resolve(left, attributes);
                let right = resolve(right, attributes);
                match op {
                    ComparisonOperator::EqualTo => equal(left, right),
                    ComparisonOperator::NotEqualTo => !equal(left, right),
                    ComparisonOperator::LessThan => ordered(left, right, |o| o == Ordering::Less),
                    ComparisonOperator::LessThanOrEqualTo => {
                        ordered(left, right, |o| o != Ordering::Greater)
                    }
                    ComparisonOperator::GreaterThan => {
                        ordered(left, right, |o| o == Ordering::Greater)
                    }
                    ComparisonOperator::GreaterThanOrEqualTo => {
                        ordered(left, right, |o| o != Ordering::Less)
                    }
                    ComparisonOperator::Like => like(left, right, pattern.as_ref()),
                }
            }
            CompiledFilter::And(filters) => filters.iter().all(|f| f.matches(attributes)),
            CompiledFilter::Or(filters) => filters.iter().any(|f| f.matches(attributes)),
            CompiledFilter::Not(filter) => !filter.matches(attributes),
        }
    }
}

fn resolve<'a>(operand: &'a Operand, attributes: &'a Attributes) -> Option<&'a StorableValue> {
    match operand {
        Operand::Constant(value) => Some(value),
        Operand::Attribute(name) => attributes.get(name).and_then(|v| v.as_value()),
    }
}

fn equal(left: Option<&StorableValue>, right: Option<&StorableValue>) -> bool {
    match (left, right) {
        (None, None) => true,
        (Some(a), Some(b)) => a.compare(b) == Some(Ordering::Equal),
        _ => false,
    }
}

fn ordered(
    left: Option<&StorableValue>,
    right: Option<&StorableValue>,
    accept: impl Fn(Ordering) -> bool,
) -> bool {
    match (left, right) {
        (Some(a), Some(b)) => a.compare(b).map(accept).unwrap_or(false),
        _ => false,
    }
}

fn like(left: Option<&StorableValue>, right: Option<&StorableValue>, compiled: Option<&Regex>) -> bool {
    let value = match left.and_then(StorableValue::as_str) {
        Some(value) => value,
        None => return false,
    };
    if let Some(regex) = compiled {
        return regex.is_match(value);
    }
    match right.and_then(StorableValue::as_str).map(like_regex) {
        Some(Ok(regex)) => regex.is_match(value),
        _ => false,
    }
}

/// Translates a `like` pattern into an anchored regex.
pub fn like_regex(pattern: &str) -> EngineResult<Regex> {
    let mut expression = String::with_capacity(pattern.len() + 8);
    expression.push_str("(?s)^");
    for c in pattern.chars() {
        match c {
            '?' => expression.push('.'),
            '*' => expression.push_str(".*"),
            c => expression.push_str(&regex::escape(c.encode_utf8(&mut [0; 4]))),
        }
    }
    expression.push('$');
    Ok(Regex::new(&expression)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::spec::AttributeValue;

    fn record(name: &str, age: Option<i64>) -> Attributes {
        let mut attributes = Attributes::new();
        attributes.insert(
            "name".into(),
            AttributeValue::Value(StorableValue::String(name.into())),
        );
        if let Some(age) = age {
            attributes.insert("age".into(), AttributeValue::Value(StorableValue::Int(age)));
        }
        attributes
    }

    fn compare(attribute: &str, op: ComparisonOperator, value: StorableValue) -> Filter {
        Filter::Comparison {
            left: Operand::Attribute(attribute.into()),
            op,
            right: Operand::Constant(value),
        }
    }

    fn matches(filter: &Filter, attributes: &Attributes) -> bool {
        CompiledFilter::compile(filter).unwrap().matches(attributes)
    }

    #[test]
    fn test_ordering_comparisons() {
        let doc = record("Alice", Some(30));
        assert!(matches(&compare("age", ComparisonOperator::GreaterThan, StorableValue::Int(18)), &doc));
        assert!(!matches(&compare("age", ComparisonOperator::LessThan, StorableValue::Int(30)), &doc));
        assert!(matches(&compare("age", ComparisonOperator::LessThanOrEqualTo, StorableValue::Int(30)), &doc));
        assert!(matches(&compare("age", ComparisonOperator::GreaterThanOrEqualTo, StorableValue::Int(30)), &doc));
    }

    #[test]
    fn test_no_type_coercion() {
        let doc = record("Alice", Some(30));
        assert!(!matches(&compare("age", ComparisonOperator::EqualTo, StorableValue::Double(30.0)), &doc));
        assert!(!matches(&compare("age", ComparisonOperator::GreaterThan, StorableValue::String("1".into())), &doc));
    }

    #[test]
    fn test_absent_values() {
        let doc = record("Bob", None);
        assert!(!matches(&compare("age", ComparisonOperator::GreaterThan, StorableValue::Int(0)), &doc));
        assert!(!matches(&compare("age", ComparisonOperator::EqualTo, StorableValue::Int(0)), &doc));
        assert!(matches(&compare("age", ComparisonOperator::NotEqualTo, StorableValue::Int(0)), &doc));

        let both_absent = Filter::Comparison {
            left: Operand::Attribute("age".into()),
            op: ComparisonOperator::EqualTo,
            right: Operand::Attribute("height".into()),
        };
        assert!(matches(&both_absent, &doc));
    }

    #[test]
    fn test_attribute_to_attribute() {
        let mut doc = record("Alice", Some(30));
        doc.insert("limit".into(), AttributeValue::Value(StorableValue::Int(40)));
        let filter = Filter::Comparison {
            left: Operand::Attribute("age".into()),
            op: ComparisonOperator::LessThan,
            right: Operand::Attribute("limit".into()),
        };
        assert!(matches(&filter, &doc));
    }

    #[test]
    fn test_like_wildcards() {
        let doc = record("Alice", None);
        let like = |p: &str| compare("name", ComparisonOperator::Like, StorableValue::String(p.into()));
        assert!(matches(&like("A*"), &doc));
        assert!(matches(&like("Al?ce"), &doc));
        assert!(matches(&like("*"), &doc));
        assert!(!matches(&like("Al?"), &doc));
        assert!(!matches(&like("alice"), &doc));
    }

    #[test]
    fn test_like_escapes_regex_syntax() {
        let doc = record("a.c", None);
        let like = |p: &str| compare("name", ComparisonOperator::Like, StorableValue::String(p.into()));
        assert!(matches(&like("a.c"), &doc));
        assert!(!matches(&like("a.c"), &record("abc", None)));
        assert!(matches(&like("a(*"), &record("a(b", None)));
    }

    #[test]
    fn test_boolean_combinations() {
        let doc = record("Alice", Some(30));
        let adult = compare("age", ComparisonOperator::GreaterThanOrEqualTo, StorableValue::Int(18));
        let bob = compare("name", ComparisonOperator::EqualTo, StorableValue::String("Bob".into()));

        assert!(!matches(&Filter::And(vec![adult.clone(), bob.clone()]), &doc));
        assert!(matches(&Filter::Or(vec![adult.clone(), bob.clone()]), &doc));
        assert!(matches(&Filter::Not(Box::new(bob)), &doc));
        assert!(matches(&Filter::Not(Box::new(Filter::Not(Box::new(adult)))), &doc));
    }
}
