//! ORDER BY rendering: static grammar order and execution-time sort.

use super::{StatementBuilder, path_alias};
use crate::derive::OrderClause;
use crate::metadata::Entity;
use crate::script::Fragment;

/// Statically-known ORDER BY from the grammar's OrderBy segments.
pub(crate) fn static_order_by(
    builder: &StatementBuilder,
    order: &[OrderClause],
    root_alias: &str,
) -> Vec<Fragment> {
    if order.is_empty() {
        return Vec::new();
    }
    let mut sql = String::from(" ORDER BY ");
    for (i, clause) in order.iter().enumerate() {
        if i > 0 {
            sql.push_str(", ");
        }
        let alias = if clause.path.associations.is_empty() {
            root_alias.to_string()
        } else {
            path_alias(&clause.path.associations)
        };
        sql.push_str(&format!(
            "{alias}.{} {}",
            builder.column_ident(&clause.path.column),
            clause.direction.keyword()
        ));
    }
    vec![Fragment::Sql(sql)]
}

/// Execution-time sort over a `sort` parameter.
///
/// Order entries carry a logical property name; a bound lookup table maps it
/// to the physical aliased column so callers never inject column names
/// directly. Case-insensitive entries wrap in the dialect's lowercase
/// function.
pub(crate) fn runtime_order_by(
    builder: &StatementBuilder,
    entity: &Entity,
    root_alias: &str,
) -> Vec<Fragment> {
    let lower = builder.dialect().lowercase_function();
    let mut map = String::from("{");
    for (i, property) in entity.properties.iter().enumerate() {
        if i > 0 {
            map.push_str(", ");
        }
        map.push_str(&format!(
            "'{}':'{root_alias}.{}'",
            property.name,
            builder.column_ident(&property.column)
        ));
    }
    map.push('}');

    let body = vec![
        Fragment::Bind {
            name: "__columns".to_string(),
            value: map,
        },
        Fragment::sql(" ORDER BY "),
        Fragment::Foreach {
            collection: "sort".to_string(),
            item: "order".to_string(),
            open: String::new(),
            separator: ", ".to_string(),
            close: String::new(),
            body: vec![
                Fragment::Choose {
                    whens: vec![(
                        "order.ignoreCase".to_string(),
                        vec![Fragment::sql(format!(
                            "{lower}(${{__columns[order.property]}})"
                        ))],
                    )],
                    otherwise: Some(vec![Fragment::sql("${__columns[order.property]}")]),
                },
                Fragment::sql(" ${order.direction}"),
            ],
        },
    ];
    vec![Fragment::If {
        test: "sort != null and !sort.isEmpty()".to_string(),
        body,
    }]
}
