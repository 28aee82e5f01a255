//! SELECT statement assembly.

use std::collections::HashMap;

use tracing::debug;

use super::conditions::{self, WhereClause};
use super::sort::{runtime_order_by, static_order_by};
use super::{MappedStatement, StatementBuilder, StatementKind, path_alias};
use crate::derive::{DerivedQuery, ReturnShape};
use crate::dialect::RowSelection;
use crate::error::{DeriveResult, MappingError, MappingResult};
use crate::metadata::Entity;
use crate::script::{Fragment, render};

/// Select one row by identifier. A joined select additionally left-joins and
/// projects every to-one association one level deep.
pub(crate) fn build_by_id(
    builder: &StatementBuilder,
    entity_name: &str,
    joined: bool,
) -> MappingResult<MappedStatement> {
    let model = builder.model();
    let entity = model.entity(entity_name)?;
    let root = builder.root_alias(&entity.name);

    let (columns, paths) = if joined {
        joined_projection(builder, entity, &root)?
    } else {
        (projection(builder, entity, &root), Vec::new())
    };
    let joins = render_joins(builder, entity, &root, &paths)?;

    let mut sql = format!(
        "SELECT {columns} FROM {} {root}{joins} WHERE ",
        builder.table_sql(entity)
    );
    let mut script = Vec::new();
    for (i, idx) in entity.id_properties.iter().enumerate() {
        let id = entity
            .properties
            .get(*idx)
            .ok_or_else(|| MappingError::MissingId(entity.name.clone()))?;
        if i > 0 {
            sql.push_str(" AND ");
        }
        sql.push_str(&format!("{root}.{} = ", builder.column_ident(&id.column)));
        script.push(Fragment::Sql(std::mem::take(&mut sql)));
        script.push(Fragment::typed_param(&id.name, id.sql_type));
    }
    if entity.id_properties.is_empty() {
        return Err(MappingError::MissingId(entity.name.clone()));
    }

    let mut statement = MappedStatement::new(
        format!("{}.selectById", entity.name),
        StatementKind::Select,
        script,
    );
    statement.result_type = Some(entity.name.clone());
    Ok(statement)
}

/// Render a derived query with a select-producing shape.
pub(crate) fn build_derived(
    builder: &StatementBuilder,
    query: &DerivedQuery,
) -> DeriveResult<MappedStatement> {
    let model = builder.model();
    let entity = model.entity(&query.entity)?;
    let root = builder.root_alias(&entity.name);
    let where_clause = conditions::render_tree(builder, &query.tree, Some(&root));
    let paths = join_paths(query);
    let joins = render_joins(builder, entity, &root, &paths)?;
    let table = builder.table_sql(entity);

    let head = match query.shape {
        ReturnShape::Count => count_head(builder, entity, &root, &table, query.distinct),
        ReturnShape::Exists => format!("SELECT 1 FROM {table} {root}"),
        _ => {
            let distinct = if query.distinct { "DISTINCT " } else { "" };
            format!(
                "SELECT {distinct}{} FROM {table} {root}",
                projection(builder, entity, &root)
            )
        }
    };

    let mut script = vec![Fragment::Sql(format!("{head}{joins}"))];
    append_where(&mut script, &where_clause);
    if !query.order.is_empty() {
        script.extend(static_order_by(builder, &query.order, &root));
    } else if matches!(query.shape, ReturnShape::Paged | ReturnShape::Sliced) {
        script.extend(runtime_order_by(builder, entity, &root));
    }

    let script = match row_selection(query) {
        Some(rows) => {
            let rendered = render(&script);
            vec![Fragment::Sql(builder.dialect().paginate(&rendered, &rows))]
        }
        None => script,
    };

    let mut statement = MappedStatement::new(
        format!("{}.{}", entity.name, query.source),
        StatementKind::Select,
        script,
    );
    statement.result_type = Some(match query.shape {
        ReturnShape::Count => "long".to_string(),
        ReturnShape::Exists => "boolean".to_string(),
        _ => entity.name.clone(),
    });
    statement.like_bindings = where_clause.like_bindings;
    debug!(id = %statement.id, "built derived select");
    Ok(statement)
}

/// Companion total-row count for a windowed select: same predicate tree and
/// joins, no ordering and no pagination.
pub(crate) fn build_count(
    builder: &StatementBuilder,
    query: &DerivedQuery,
) -> DeriveResult<MappedStatement> {
    let model = builder.model();
    let entity = model.entity(&query.entity)?;
    let root = builder.root_alias(&entity.name);
    let where_clause = conditions::render_tree(builder, &query.tree, Some(&root));
    let joins = render_joins(builder, entity, &root, &join_paths(query))?;
    let table = builder.table_sql(entity);

    let mut script = vec![Fragment::Sql(format!(
        "{}{joins}",
        count_head(builder, entity, &root, &table, query.distinct)
    ))];
    append_where(&mut script, &where_clause);

    let mut statement = MappedStatement::new(
        format!("{}.{}_count", entity.name, query.source),
        StatementKind::Select,
        script,
    );
    statement.result_type = Some("long".to_string());
    statement.like_bindings = where_clause.like_bindings;
    debug!(id = %statement.id, "built companion count");
    Ok(statement)
}

fn count_head(
    builder: &StatementBuilder,
    entity: &Entity,
    root: &str,
    table: &str,
    distinct: bool,
) -> String {
    match entity.id_property() {
        Some(id) if distinct => format!(
            "SELECT COUNT(DISTINCT {root}.{}) FROM {table} {root}",
            builder.column_ident(&id.column)
        ),
        _ => format!("SELECT COUNT(*) FROM {table} {root}"),
    }
}

pub(crate) fn append_where(script: &mut Vec<Fragment>, clause: &WhereClause) {
    if !clause.is_empty() {
        script.push(Fragment::sql(" WHERE "));
        script.extend(clause.fragments.iter().cloned());
    }
}

fn row_selection(query: &DerivedQuery) -> Option<RowSelection> {
    if let Some(n) = query.limit {
        return Some(RowSelection::capped(n));
    }
    match query.shape {
        ReturnShape::Paged | ReturnShape::Sliced => Some(RowSelection::paged("offset", "maxRows")),
        ReturnShape::Exists => Some(RowSelection::capped(1)),
        _ => None,
    }
}

/// `alias.column AS propertyName` for every scalar property.
pub(crate) fn projection(builder: &StatementBuilder, entity: &Entity, alias: &str) -> String {
    entity
        .properties
        .iter()
        .map(|p| {
            format!(
                "{alias}.{} AS {}",
                builder.column_ident(&p.column),
                p.name
            )
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Root projection plus every to-one association's target columns, labelled
/// `<association>_<property>`.
fn joined_projection(
    builder: &StatementBuilder,
    entity: &Entity,
    root: &str,
) -> MappingResult<(String, Vec<Vec<String>>)> {
    let model = builder.model();
    let mut columns = projection(builder, entity, root);
    let mut paths = Vec::new();
    for assoc in &entity.associations {
        if !assoc.kind.is_to_one() {
            continue;
        }
        let target = model.entity(&assoc.target)?;
        for p in &target.properties {
            columns.push_str(&format!(
                ", {}.{} AS {}_{}",
                assoc.name,
                builder.column_ident(&p.column),
                assoc.name,
                p.name
            ));
        }
        paths.push(vec![assoc.name.clone()]);
    }
    Ok((columns, paths))
}

/// The unique association-path prefixes a query touches, shortest first so a
/// parent join always precedes its children.
fn join_paths(query: &DerivedQuery) -> Vec<Vec<String>> {
    let mut paths: Vec<Vec<String>> = Vec::new();
    for condition in query.tree.conditions() {
        add_prefixes(&mut paths, &condition.path.associations);
    }
    for order in &query.order {
        add_prefixes(&mut paths, &order.path.associations);
    }
    paths
}

fn add_prefixes(paths: &mut Vec<Vec<String>>, associations: &[String]) {
    for len in 1..=associations.len() {
        let prefix = associations[..len].to_vec();
        if !paths.contains(&prefix) {
            paths.push(prefix);
        }
    }
}

/// LEFT OUTER JOIN chain for the given association paths. Join-table
/// associations join the link table under `<alias>_jt` and the target under
/// `<alias>`.
pub(crate) fn render_joins(
    builder: &StatementBuilder,
    root_entity: &Entity,
    root_alias: &str,
    paths: &[Vec<String>],
) -> MappingResult<String> {
    let model = builder.model();
    let mut out = String::new();
    let mut owners: HashMap<String, String> = HashMap::new();
    owners.insert(root_alias.to_string(), root_entity.name.clone());

    for path in paths {
        let Some(step) = path.last() else { continue };
        let alias = path_alias(path);
        let parent_alias = if path.len() == 1 {
            root_alias.to_string()
        } else {
            path_alias(&path[..path.len() - 1])
        };
        let parent_name =
            owners
                .get(&parent_alias)
                .cloned()
                .ok_or_else(|| MappingError::UnknownProperty {
                    entity: root_entity.name.clone(),
                    property: alias.clone(),
                })?;
        let parent = model.entity(&parent_name)?;
        let assoc = parent
            .association(step)
            .ok_or_else(|| MappingError::UnknownProperty {
                entity: parent.name.clone(),
                property: step.clone(),
            })?;
        let target = model.entity(&assoc.target)?;
        let target_table = builder.table_sql(target);

        if let Some(jt) = &assoc.join_table {
            let jt_alias = format!("{alias}_jt");
            out.push_str(&format!(
                " LEFT OUTER JOIN {} {jt_alias} ON ",
                builder.column_ident(&jt.table)
            ));
            for (i, jc) in jt.owning.iter().enumerate() {
                if i > 0 {
                    out.push_str(" AND ");
                }
                out.push_str(&format!(
                    "{jt_alias}.{} = {parent_alias}.{}",
                    builder.column_ident(&jc.column),
                    builder.column_ident(&jc.referenced)
                ));
            }
            out.push_str(&format!(" LEFT OUTER JOIN {target_table} {alias} ON "));
            for (i, jc) in jt.inverse.iter().enumerate() {
                if i > 0 {
                    out.push_str(" AND ");
                }
                out.push_str(&format!(
                    "{alias}.{} = {jt_alias}.{}",
                    builder.column_ident(&jc.referenced),
                    builder.column_ident(&jc.column)
                ));
            }
        } else {
            out.push_str(&format!(" LEFT OUTER JOIN {target_table} {alias} ON "));
            for (i, jc) in assoc.join_columns.iter().enumerate() {
                if i > 0 {
                    out.push_str(" AND ");
                }
                out.push_str(&format!(
                    "{alias}.{} = {parent_alias}.{}",
                    builder.column_ident(&jc.referenced),
                    builder.column_ident(&jc.column)
                ));
            }
        }
        owners.insert(alias, target.name.clone());
    }
    Ok(out)
}
