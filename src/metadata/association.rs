//! Resolved association shapes: join columns and join tables.

use serde::{Deserialize, Serialize};

/// Relationship kind of an association property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssociationKind {
    OneToOne,
    OneToMany,
    ManyToOne,
    ManyToMany,
    /// A collection of scalars stored in a dedicated collection table.
    ElementCollection,
}

impl AssociationKind {
    pub fn is_collection(&self) -> bool {
        matches!(
            self,
            AssociationKind::OneToMany
                | AssociationKind::ManyToMany
                | AssociationKind::ElementCollection
        )
    }

    pub fn is_to_one(&self) -> bool {
        matches!(self, AssociationKind::OneToOne | AssociationKind::ManyToOne)
    }
}

/// A (local column, referenced column) pair describing one leg of a foreign
/// key. `referenced_property` is bound best-effort by case-insensitive column
/// search on the referenced entity and may stay unset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinColumn {
    pub column: String,
    pub referenced: String,
    pub referenced_property: Option<String>,
}

impl JoinColumn {
    pub fn new(column: impl Into<String>, referenced: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            referenced: referenced.into(),
            referenced_property: None,
        }
    }

    /// The same pair seen from the other side of the relation.
    pub fn swapped(&self) -> JoinColumn {
        JoinColumn {
            column: self.referenced.clone(),
            referenced: self.column.clone(),
            referenced_property: None,
        }
    }
}

/// Link-table description for many-valued relations. `owning` pairs reference
/// the owner's id columns, `inverse` pairs the target's.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinTable {
    pub table: String,
    pub owning: Vec<JoinColumn>,
    pub inverse: Vec<JoinColumn>,
}

/// A property referencing another entity. Holds the target's arena key, never
/// a direct reference, so bidirectional and self-referencing graphs stay
/// representable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Association {
    pub name: String,
    pub kind: AssociationKind,
    /// Arena key of the target entity. Empty for element collections.
    pub target: String,
    /// Back-reference to the owning property; present on the non-owning side.
    pub mapped_by: Option<String>,
    /// Set during resolution when an inverse declaration was found.
    pub bidirectional: bool,
    /// Resolved by the association resolver; role-swapped on mapped-by sides.
    pub join_columns: Vec<JoinColumn>,
    /// Present only for many-valued, non-mapped-by relations without an
    /// explicit inverse many-to-one.
    pub join_table: Option<JoinTable>,
}

impl Association {
    /// Exactly one side owns the foreign key or join table; the side without a
    /// mapped-by back-reference is the owner.
    pub fn is_owning(&self) -> bool {
        self.mapped_by.is_none()
    }
}
