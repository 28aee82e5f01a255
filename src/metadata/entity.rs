//! Resolved entity and property metadata.

use serde::{Deserialize, Serialize};

use super::GenerationDef;
use super::association::Association;
use crate::dialect::{SqlDialect, needs_quoting};

/// SQL type codes carried on properties and rendered into placeholder hints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SqlType {
    Char,
    Varchar,
    Clob,
    SmallInt,
    Integer,
    BigInt,
    Decimal,
    Double,
    Float,
    Boolean,
    Date,
    Time,
    Timestamp,
    Blob,
    Other,
}

impl SqlType {
    /// The type-code name rendered into `#{name,jdbcType=...}` hints.
    pub fn type_name(&self) -> &'static str {
        match self {
            SqlType::Char => "CHAR",
            SqlType::Varchar => "VARCHAR",
            SqlType::Clob => "CLOB",
            SqlType::SmallInt => "SMALLINT",
            SqlType::Integer => "INTEGER",
            SqlType::BigInt => "BIGINT",
            SqlType::Decimal => "DECIMAL",
            SqlType::Double => "DOUBLE",
            SqlType::Float => "FLOAT",
            SqlType::Boolean => "BOOLEAN",
            SqlType::Date => "DATE",
            SqlType::Time => "TIME",
            SqlType::Timestamp => "TIMESTAMP",
            SqlType::Blob => "BLOB",
            SqlType::Other => "OTHER",
        }
    }
}

/// A physical table identifier, optionally schema-qualified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableIdent {
    pub schema: Option<String>,
    pub name: String,
}

impl TableIdent {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            schema: None,
            name: name.into(),
        }
    }

    /// The schema-qualified, dialect-quoted identifier.
    pub fn qualified(&self, dialect: &dyn SqlDialect, force_quote: bool) -> String {
        let quote = |part: &str| {
            if force_quote || needs_quoting(part) {
                dialect.quote(part)
            } else {
                part.to_string()
            }
        };
        match &self.schema {
            Some(schema) => format!("{}.{}", quote(schema), quote(&self.name)),
            None => quote(&self.name),
        }
    }
}

impl std::fmt::Display for TableIdent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.schema {
            Some(schema) => write!(f, "{}.{}", schema, self.name),
            None => f.write_str(&self.name),
        }
    }
}

/// One mapped scalar field. The column identifier was derived exactly once
/// during model build: annotated name first, naming strategy otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Property {
    pub name: String,
    pub column: String,
    pub sql_type: SqlType,
    pub id: bool,
    pub version: bool,
    pub nullable: bool,
    pub updatable: bool,
    /// Custom value converter reference, rendered as a `typeHandler` hint.
    pub converter: Option<String>,
    pub generation: Option<GenerationDef>,
}

/// One mapped domain type: physical table, scalar properties, associations.
///
/// Built once by [`MetadataModel::build`](super::model::MetadataModel::build)
/// and immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub name: String,
    pub table: TableIdent,
    pub properties: Vec<Property>,
    pub associations: Vec<Association>,
    /// Indices into `properties` for the identifier property/properties.
    pub id_properties: Vec<usize>,
    /// Index of the logic-delete flag column, when declared.
    pub logic_delete: Option<usize>,
}

impl Entity {
    pub fn is_composite_id(&self) -> bool {
        self.id_properties.len() > 1
    }

    /// An entity with no associations; its statements never need joins.
    pub fn is_basic(&self) -> bool {
        self.associations.is_empty()
    }

    /// The single identifier property, when there is exactly one.
    pub fn id_property(&self) -> Option<&Property> {
        match self.id_properties.as_slice() {
            [idx] => self.properties.get(*idx),
            _ => None,
        }
    }

    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.name == name)
    }

    pub fn association(&self, name: &str) -> Option<&Association> {
        self.associations.iter().find(|a| a.name == name)
    }

    /// Case-insensitive search by physical column name, used for the
    /// best-effort `referenced_property` binding on join columns.
    pub fn property_by_column(&self, column: &str) -> Option<&Property> {
        self.properties
            .iter()
            .find(|p| p.column.eq_ignore_ascii_case(column))
    }

    pub fn version_property(&self) -> Option<&Property> {
        self.properties.iter().find(|p| p.version)
    }

    pub fn logic_delete_property(&self) -> Option<&Property> {
        self.logic_delete.and_then(|idx| self.properties.get(idx))
    }
}
