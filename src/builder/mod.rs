//! SQL statement builder: metadata plus predicate trees into
//! [`MappedStatement`] templates.
//!
//! The builder renders everything through the [`Fragment`](crate::script) IR
//! and keeps dialect differences behind [`SqlDialect`]: quoting, pagination
//! rewrites, boolean literals and key generation all come from there.

pub mod conditions;
pub mod like;
pub mod sort;

mod delete;
mod insert;
mod select;
mod update;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::derive::{CompareKind, DerivedQuery, Subject};
use crate::dialect::{SqlDialect, needs_quoting};
use crate::error::{DeriveResult, MappingResult};
use crate::metadata::MetadataModel;
use crate::script::{Fragment, render};

/// Statement verb of a [`MappedStatement`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatementKind {
    Select,
    Insert,
    Update,
    Delete,
}

/// Key-generation descriptor attached to an insert statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyGeneration {
    /// Property receiving the generated value.
    pub property: String,
    pub column: String,
    /// Sequence selects run before the insert; identity reads after.
    pub before: bool,
    pub sql: String,
}

/// A parameter whose bound value needs wildcard preparation at bind time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LikeBinding {
    pub parameter: String,
    pub compare: CompareKind,
    pub escape: char,
}

/// The terminal artifact: one registered, executable statement template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappedStatement {
    /// Namespace-qualified statement id.
    pub id: String,
    pub kind: StatementKind,
    /// Template IR; `sql` is its rendered form.
    pub script: Vec<Fragment>,
    pub sql: String,
    pub result_type: Option<String>,
    pub parameter_type: Option<String>,
    pub key_generation: Option<KeyGeneration>,
    /// Parameters needing wildcard wrapping before execution.
    pub like_bindings: Vec<LikeBinding>,
}

impl MappedStatement {
    pub(crate) fn new(id: String, kind: StatementKind, script: Vec<Fragment>) -> Self {
        let sql = render(&script);
        Self {
            id,
            kind,
            script,
            sql,
            result_type: None,
            parameter_type: None,
            key_generation: None,
            like_bindings: Vec::new(),
        }
    }
}

/// Builder-level configuration.
#[derive(Debug, Clone, Copy)]
pub struct BuilderConfig {
    /// Escape character for wildcard characters in LIKE literals.
    pub escape_char: char,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self { escape_char: '\\' }
    }
}

/// Renders CRUD and derived statements against one metadata model.
pub struct StatementBuilder {
    model: Arc<MetadataModel>,
    config: BuilderConfig,
}

impl StatementBuilder {
    pub fn new(model: Arc<MetadataModel>) -> Self {
        Self::with_config(model, BuilderConfig::default())
    }

    pub fn with_config(model: Arc<MetadataModel>, config: BuilderConfig) -> Self {
        Self { model, config }
    }

    pub fn model(&self) -> &MetadataModel {
        &self.model
    }

    pub(crate) fn config(&self) -> &BuilderConfig {
        &self.config
    }

    pub(crate) fn dialect(&self) -> &'static dyn SqlDialect {
        self.model.dialect().strategy()
    }

    /// Full-row INSERT with the entity's key-generation strategy applied.
    pub fn insert(&self, entity: &str) -> MappingResult<MappedStatement> {
        insert::build(self, entity)
    }

    /// UPDATE by id. `partial` wraps each assignment in a null check so only
    /// populated properties are written.
    pub fn update_by_id(&self, entity: &str, partial: bool) -> MappingResult<MappedStatement> {
        update::build(self, entity, partial)
    }

    /// DELETE by id, or the logic-delete UPDATE when the entity declares a
    /// delete flag.
    pub fn delete_by_id(&self, entity: &str) -> MappingResult<MappedStatement> {
        delete::build_by_id(self, entity)
    }

    /// SELECT one row by id. `joined` additionally projects and left-joins
    /// every to-one association.
    pub fn select_by_id(&self, entity: &str, joined: bool) -> MappingResult<MappedStatement> {
        select::build_by_id(self, entity, joined)
    }

    /// Render a parsed derived query into its statement.
    pub fn derived(&self, query: &DerivedQuery) -> DeriveResult<MappedStatement> {
        match query.subject {
            Subject::Delete => delete::build_derived(self, query),
            _ => select::build_derived(self, query),
        }
    }

    /// Total-row count backing a paged derived query: the same predicates and
    /// joins as the windowed select, without the window.
    pub fn count_statement(&self, query: &DerivedQuery) -> DeriveResult<MappedStatement> {
        select::build_count(self, query)
    }

    /// Root table alias: the naming-strategy form of the entity name, quoted
    /// when it collides with a reserved word.
    pub(crate) fn root_alias(&self, entity_name: &str) -> String {
        let alias = self.model.config().naming.column_name(entity_name);
        self.column_ident(&alias)
    }

    /// Quote a column identifier when the dialect requires it (reserved word,
    /// odd characters) or when quoting is forced model-wide.
    pub(crate) fn column_ident(&self, name: &str) -> String {
        if self.model.config().force_quote || needs_quoting(name) {
            self.dialect().quote(name)
        } else {
            name.to_string()
        }
    }

    pub(crate) fn table_sql(&self, entity: &crate::metadata::Entity) -> String {
        entity
            .table
            .qualified(self.dialect(), self.model.config().force_quote)
    }
}

/// Join alias for an association path: the path segments joined by `_`.
pub(crate) fn path_alias(path: &[String]) -> String {
    path.join("_")
}

/// A foreign-key column written through an owning to-one association.
pub(crate) struct FkColumn {
    pub column: String,
    /// Nested parameter path, e.g. `plan.id`.
    pub param: String,
    pub sql_type: crate::metadata::SqlType,
}

/// Foreign-key columns living on this entity's table: one per join column of
/// every owning to-one association without a join table.
pub(crate) fn fk_columns(
    model: &MetadataModel,
    entity: &crate::metadata::Entity,
) -> MappingResult<Vec<FkColumn>> {
    let mut out = Vec::new();
    for assoc in &entity.associations {
        if !assoc.kind.is_to_one() || !assoc.is_owning() || assoc.join_table.is_some() {
            continue;
        }
        let target = model.entity(&assoc.target)?;
        for jc in &assoc.join_columns {
            let leaf = jc
                .referenced_property
                .as_deref()
                .and_then(|name| target.property(name));
            let (name, sql_type) = match leaf {
                Some(p) => (p.name.clone(), p.sql_type),
                None => ("id".to_string(), crate::metadata::SqlType::Other),
            };
            out.push(FkColumn {
                column: jc.column.clone(),
                param: format!("{}.{name}", assoc.name),
                sql_type,
            });
        }
    }
    Ok(out)
}
