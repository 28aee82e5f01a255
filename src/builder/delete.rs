//! DELETE assembly, including logic-delete rewrites.

use super::conditions;
use super::select::append_where;
use super::{MappedStatement, StatementBuilder, StatementKind};
use crate::derive::DerivedQuery;
use crate::error::{DeriveResult, MappingError, MappingResult};
use crate::metadata::Entity;
use crate::script::Fragment;

/// Delete one row by id. Entities with a logic-delete flag get an UPDATE
/// setting the flag instead of a physical delete.
pub(crate) fn build_by_id(
    builder: &StatementBuilder,
    entity_name: &str,
) -> MappingResult<MappedStatement> {
    let entity = builder.model().entity(entity_name)?;
    if entity.id_properties.is_empty() {
        return Err(MappingError::MissingId(entity.name.clone()));
    }

    let mut script = vec![Fragment::Sql(delete_head(builder, entity))];
    script.push(Fragment::sql(" WHERE "));
    for (i, idx) in entity.id_properties.iter().enumerate() {
        let id = entity
            .properties
            .get(*idx)
            .ok_or_else(|| MappingError::MissingId(entity.name.clone()))?;
        if i > 0 {
            script.push(Fragment::sql(" AND "));
        }
        script.push(Fragment::Sql(format!(
            "{} = ",
            builder.column_ident(&id.column)
        )));
        script.push(Fragment::typed_param(&id.name, id.sql_type));
    }

    let kind = statement_kind(entity);
    let mut statement =
        MappedStatement::new(format!("{}.deleteById", entity.name), kind, script);
    statement.parameter_type = Some(entity.name.clone());
    Ok(statement)
}

/// Derived delete. Operates alias-free on the root table; association paths
/// are not joined here.
pub(crate) fn build_derived(
    builder: &StatementBuilder,
    query: &DerivedQuery,
) -> DeriveResult<MappedStatement> {
    let entity = builder.model().entity(&query.entity)?;
    let where_clause = conditions::render_tree(builder, &query.tree, None);

    let mut script = vec![Fragment::Sql(delete_head(builder, entity))];
    append_where(&mut script, &where_clause);

    let mut statement = MappedStatement::new(
        format!("{}.{}", entity.name, query.source),
        statement_kind(entity),
        script,
    );
    statement.like_bindings = where_clause.like_bindings;
    Ok(statement)
}

/// `DELETE FROM t`, or `UPDATE t SET flag = true` for logic deletes.
fn delete_head(builder: &StatementBuilder, entity: &Entity) -> String {
    let table = builder.table_sql(entity);
    match entity.logic_delete_property() {
        Some(flag) => format!(
            "UPDATE {table} SET {} = {}",
            builder.column_ident(&flag.column),
            builder.dialect().bool_literal(true)
        ),
        None => format!("DELETE FROM {table}"),
    }
}

fn statement_kind(entity: &Entity) -> StatementKind {
    if entity.logic_delete_property().is_some() {
        StatementKind::Update
    } else {
        StatementKind::Delete
    }
}
