//! Parsed predicate tree and the derived-query artifact.

use serde::{Deserialize, Serialize};

use super::keywords::CompareKind;
use crate::error::{DeriveError, DeriveResult};
use crate::metadata::SqlType;

/// A property reference resolved against the metadata model.
///
/// `associations` holds the join steps from the root entity; `property` and
/// `column` describe the leaf on the final joined table. A to-one association
/// used directly as a leaf resolves to its foreign-key column on the holder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyPath {
    /// Original grammar token, kept for diagnostics.
    pub raw: String,
    pub associations: Vec<String>,
    pub property: String,
    pub column: String,
    pub sql_type: SqlType,
}

impl PropertyPath {
    /// Dotted logical form, used as the parameter name base.
    pub fn logical(&self) -> String {
        if self.associations.is_empty() {
            self.property.clone()
        } else {
            let mut out = self.associations.join(".");
            out.push('.');
            out.push_str(&self.property);
            out
        }
    }
}

/// One comparison clause.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    pub path: PropertyPath,
    pub compare: CompareKind,
    /// Wrap both sides of the comparison in the dialect's lowercase function.
    pub ignore_case: bool,
}

/// Conditions joined by AND.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AndGroup {
    pub conditions: Vec<Condition>,
}

/// Ordered OR-groups of AND-conditions. An empty tree selects everything.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct PredicateTree {
    pub groups: Vec<AndGroup>,
}

impl PredicateTree {
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn conditions(&self) -> impl Iterator<Item = &Condition> {
        self.groups.iter().flat_map(|g| g.conditions.iter())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    pub fn keyword(&self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }
}

/// One statically-known ORDER BY entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderClause {
    pub path: PropertyPath,
    pub direction: Direction,
}

/// Leading verb of the grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Subject {
    Find,
    Count,
    Exists,
    Delete,
}

/// Result shape the caller declared for a SELECT-producing query. Subjects
/// with a fixed shape (count, exists, delete) ignore the hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReturnHint {
    Single,
    #[default]
    Collection,
    Paged,
    Sliced,
}

/// Final shape of the derived statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReturnShape {
    Single,
    Collection,
    Paged,
    Sliced,
    Exists,
    Count,
    Delete,
}

/// A fully parsed and resolved derived query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedQuery {
    /// Original method name.
    pub source: String,
    pub entity: String,
    pub subject: Subject,
    pub distinct: bool,
    /// Row cap from a First/Top prefix.
    pub limit: Option<u64>,
    pub tree: PredicateTree,
    pub order: Vec<OrderClause>,
    pub shape: ReturnShape,
}

impl DerivedQuery {
    /// Total bound-parameter count across all clauses. Collection kinds
    /// count as one parameter.
    pub fn expected_parameter_count(&self) -> usize {
        self.tree
            .conditions()
            .map(|c| c.compare.param_arity())
            .sum()
    }

    /// Check a caller-supplied argument count against the grammar's arity.
    pub fn verify_arity(&self, got: usize) -> DeriveResult<()> {
        let expected = self.expected_parameter_count();
        if expected != got {
            return Err(DeriveError::ArityMismatch {
                query: self.source.clone(),
                expected,
                got,
            });
        }
        Ok(())
    }
}
