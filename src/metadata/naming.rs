//! Naming strategies for deriving physical identifiers from logical names.

use convert_case::{Case, Casing};

/// Maps logical (property/entity) names to physical (column/table) identifiers.
///
/// A trait seam so callers can plug their own convention; the annotated name
/// always wins before a strategy is consulted.
pub trait NamingStrategy: Send + Sync {
    /// Physical column identifier for a property name.
    fn column_name(&self, property: &str) -> String;

    /// Physical table identifier for an entity name.
    fn table_name(&self, entity: &str) -> String {
        self.column_name(entity)
    }
}

/// camelCase / PascalCase to snake_case, the default convention.
pub struct SnakeCase;

impl NamingStrategy for SnakeCase {
    fn column_name(&self, property: &str) -> String {
        property.to_case(Case::Snake)
    }
}

/// Uses the logical name verbatim.
pub struct AsIs;

impl NamingStrategy for AsIs {
    fn column_name(&self, property: &str) -> String {
        property.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snake_case() {
        assert_eq!(SnakeCase.column_name("firstName"), "first_name");
        assert_eq!(SnakeCase.column_name("age"), "age");
        assert_eq!(SnakeCase.table_name("UserAccount"), "user_account");
    }

    #[test]
    fn test_as_is() {
        assert_eq!(AsIs.column_name("firstName"), "firstName");
    }
}
