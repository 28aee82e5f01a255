//! Comparator keyword table for the derived-query grammar.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// Comparison kind of one predicate clause. Each kind has a fixed parameter
/// arity; collection kinds take one collection-valued parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompareKind {
    Equals,
    NotEquals,
    LessThan,
    LessThanEqual,
    GreaterThan,
    GreaterThanEqual,
    Between,
    In,
    NotIn,
    IsNull,
    IsNotNull,
    Like,
    NotLike,
    StartingWith,
    EndingWith,
    Containing,
    True,
    False,
}

impl CompareKind {
    /// Number of bound parameters the clause consumes.
    pub fn param_arity(&self) -> usize {
        match self {
            CompareKind::IsNull
            | CompareKind::IsNotNull
            | CompareKind::True
            | CompareKind::False => 0,
            CompareKind::Between => 2,
            _ => 1,
        }
    }

    /// Kinds whose single parameter is a collection, rendered as a
    /// variable-length placeholder list.
    pub fn takes_collection(&self) -> bool {
        matches!(self, CompareKind::In | CompareKind::NotIn)
    }

    /// Kinds rendered with LIKE / NOT LIKE.
    pub fn is_like(&self) -> bool {
        matches!(
            self,
            CompareKind::Like
                | CompareKind::NotLike
                | CompareKind::StartingWith
                | CompareKind::EndingWith
                | CompareKind::Containing
        )
    }

    /// Kinds whose parameter value gets wildcard-wrapped (and escaped) before
    /// binding. Plain LIKE passes the value through untouched.
    pub fn wraps_wildcards(&self) -> bool {
        matches!(
            self,
            CompareKind::StartingWith | CompareKind::EndingWith | CompareKind::Containing
        )
    }
}

/// Keyword suffixes mapped to comparison kinds, longest first so suffix
/// matching is greedy. Synonyms share a kind.
pub(crate) static KEYWORDS: Lazy<Vec<(&'static str, CompareKind)>> = Lazy::new(|| {
    let mut table = vec![
        ("GreaterThanEqual", CompareKind::GreaterThanEqual),
        ("LessThanEqual", CompareKind::LessThanEqual),
        ("GreaterThan", CompareKind::GreaterThan),
        ("LessThan", CompareKind::LessThan),
        ("After", CompareKind::GreaterThan),
        ("Before", CompareKind::LessThan),
        ("Between", CompareKind::Between),
        ("IsNotNull", CompareKind::IsNotNull),
        ("NotNull", CompareKind::IsNotNull),
        ("IsNull", CompareKind::IsNull),
        ("Null", CompareKind::IsNull),
        ("NotIn", CompareKind::NotIn),
        ("In", CompareKind::In),
        ("NotLike", CompareKind::NotLike),
        ("Like", CompareKind::Like),
        ("StartingWith", CompareKind::StartingWith),
        ("StartsWith", CompareKind::StartingWith),
        ("EndingWith", CompareKind::EndingWith),
        ("EndsWith", CompareKind::EndingWith),
        ("Containing", CompareKind::Containing),
        ("Contains", CompareKind::Containing),
        ("IsTrue", CompareKind::True),
        ("True", CompareKind::True),
        ("IsFalse", CompareKind::False),
        ("False", CompareKind::False),
        ("NotEquals", CompareKind::NotEquals),
        ("Not", CompareKind::NotEquals),
        ("Equals", CompareKind::Equals),
        ("Is", CompareKind::Equals),
    ];
    table.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
    table
});
