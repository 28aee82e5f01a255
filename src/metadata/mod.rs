//! Persistence metadata model.
//!
//! Raw declarative definitions ([`EntityDef`], [`FieldDef`], [`RelationDef`])
//! come in from whatever scanned the domain types; a two-phase
//! [`MetadataModel::build`](model::MetadataModel::build) turns them into the
//! resolved [`Entity`]/[`Property`]/[`Association`] graph. Phase 1 ingests
//! fields and derives column names; phase 2 runs the association resolver over
//! an explicit dependency order. The built model is immutable.

pub mod association;
pub mod entity;
pub mod model;
pub mod naming;
pub mod resolver;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use serde::{Deserialize, Serialize};

pub use association::{Association, AssociationKind, JoinColumn, JoinTable};
pub use entity::{Entity, Property, SqlType, TableIdent};
pub use model::{DEFAULT_SEQUENCE, MetadataModel};
pub use naming::{AsIs, NamingStrategy, SnakeCase};

/// Declared id-generation for a field. AUTO resolves to the dialect's native
/// strategy at lookup time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GenerationDef {
    Auto,
    Identity,
    Sequence { generator: Option<String> },
}

/// Raw declarative entity definition, as produced by the metadata scanner.
#[derive(Debug, Clone, Default)]
pub struct EntityDef {
    pub name: String,
    pub table: Option<String>,
    pub schema: Option<String>,
    /// Name of the field used as a logic-delete flag, when the entity
    /// soft-deletes instead of issuing DELETE statements.
    pub logic_delete_field: Option<String>,
    pub fields: Vec<FieldDef>,
}

impl EntityDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    pub fn schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    pub fn logic_delete(mut self, field: impl Into<String>) -> Self {
        self.logic_delete_field = Some(field.into());
        self
    }

    pub fn field(mut self, field: FieldDef) -> Self {
        self.fields.push(field);
        self
    }
}

/// Raw declarative field definition.
#[derive(Debug, Clone)]
pub struct FieldDef {
    pub name: String,
    /// Annotated column name; wins over the naming strategy.
    pub column: Option<String>,
    pub sql_type: SqlType,
    pub id: bool,
    pub generation: Option<GenerationDef>,
    pub version: bool,
    pub transient: bool,
    pub nullable: bool,
    pub updatable: bool,
    pub converter: Option<String>,
    pub relation: Option<RelationDef>,
}

impl FieldDef {
    pub fn new(name: impl Into<String>, sql_type: SqlType) -> Self {
        Self {
            name: name.into(),
            column: None,
            sql_type,
            id: false,
            generation: None,
            version: false,
            transient: false,
            nullable: true,
            updatable: true,
            converter: None,
            relation: None,
        }
    }

    pub fn column(mut self, column: impl Into<String>) -> Self {
        self.column = Some(column.into());
        self
    }

    pub fn id(mut self) -> Self {
        self.id = true;
        self.nullable = false;
        self
    }

    pub fn generated(mut self, generation: GenerationDef) -> Self {
        self.generation = Some(generation);
        self
    }

    pub fn version(mut self) -> Self {
        self.version = true;
        self
    }

    pub fn transient(mut self) -> Self {
        self.transient = true;
        self
    }

    pub fn not_updatable(mut self) -> Self {
        self.updatable = false;
        self
    }

    pub fn converter(mut self, converter: impl Into<String>) -> Self {
        self.converter = Some(converter.into());
        self
    }

    pub fn relation(mut self, relation: RelationDef) -> Self {
        self.relation = Some(relation);
        self
    }
}

/// Raw declarative relationship on a field.
#[derive(Debug, Clone)]
pub struct RelationDef {
    pub kind: AssociationKind,
    pub target: String,
    pub mapped_by: Option<String>,
    pub join_columns: Vec<JoinColumnDef>,
    pub join_table: Option<JoinTableDef>,
}

impl RelationDef {
    pub fn new(kind: AssociationKind, target: impl Into<String>) -> Self {
        Self {
            kind,
            target: target.into(),
            mapped_by: None,
            join_columns: Vec::new(),
            join_table: None,
        }
    }

    pub fn mapped_by(mut self, property: impl Into<String>) -> Self {
        self.mapped_by = Some(property.into());
        self
    }

    pub fn join_column(mut self, def: JoinColumnDef) -> Self {
        self.join_columns.push(def);
        self
    }

    pub fn join_table(mut self, def: JoinTableDef) -> Self {
        self.join_table = Some(def);
        self
    }
}

/// Partial join-column declaration; blank parts fall back to the convention
/// default per column.
#[derive(Debug, Clone, Default)]
pub struct JoinColumnDef {
    pub name: Option<String>,
    pub referenced: Option<String>,
}

impl JoinColumnDef {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            referenced: None,
        }
    }

    pub fn referencing(mut self, referenced: impl Into<String>) -> Self {
        self.referenced = Some(referenced.into());
        self
    }
}

/// Partial join-table declaration.
#[derive(Debug, Clone, Default)]
pub struct JoinTableDef {
    pub name: Option<String>,
    pub join_columns: Vec<JoinColumnDef>,
    pub inverse_join_columns: Vec<JoinColumnDef>,
}

/// A named id generator mapping to a database sequence.
#[derive(Debug, Clone)]
pub struct GeneratorDef {
    pub name: String,
    pub sequence: String,
}

/// Model-wide configuration, passed explicitly to the build.
#[derive(Clone)]
pub struct ModelConfig {
    pub naming: Arc<dyn NamingStrategy>,
    /// Uniform prefix applied to derived table names and synthesized join
    /// tables. Annotated table names are used verbatim.
    pub table_prefix: Option<String>,
    /// Quote every identifier, not just the ones that need it.
    pub force_quote: bool,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            naming: Arc::new(SnakeCase),
            table_prefix: None,
            force_quote: false,
        }
    }
}

impl std::fmt::Debug for ModelConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelConfig")
            .field("table_prefix", &self.table_prefix)
            .field("force_quote", &self.force_quote)
            .finish_non_exhaustive()
    }
}
