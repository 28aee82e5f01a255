//! WHERE-clause rendering for predicate trees.
//!
//! OR-groups become parenthesized AND-chains (the parentheses are dropped
//! when there is only one group). Collection comparisons render through a
//! `<choose>` so an empty or missing collection degrades to a constant truth
//! value instead of malformed SQL: `1=0` for IN, `1=1` for NOT IN. That
//! vacuous-truth behavior is a compatibility contract, not an accident.

use super::{LikeBinding, StatementBuilder, path_alias};
use crate::derive::{CompareKind, Condition, PredicateTree};
use crate::script::Fragment;

/// A rendered predicate plus everything the statement needs to carry along.
pub(crate) struct WhereClause {
    pub fragments: Vec<Fragment>,
    pub like_bindings: Vec<LikeBinding>,
    /// Number of positional parameters allocated (`p0`..).
    pub params: usize,
}

impl WhereClause {
    pub(crate) fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }
}

/// Render a predicate tree. `root_alias` is `None` for alias-free statements
/// (deletes); association steps then fall back to the bare leaf column.
pub(crate) fn render_tree(
    builder: &StatementBuilder,
    tree: &PredicateTree,
    root_alias: Option<&str>,
) -> WhereClause {
    let mut clause = WhereClause {
        fragments: Vec::new(),
        like_bindings: Vec::new(),
        params: 0,
    };
    let parenthesize = tree.groups.len() > 1;
    for (gi, group) in tree.groups.iter().enumerate() {
        if gi > 0 {
            clause.fragments.push(Fragment::sql(" OR "));
        }
        if parenthesize {
            clause.fragments.push(Fragment::sql("("));
        }
        for (ci, condition) in group.conditions.iter().enumerate() {
            if ci > 0 {
                clause.fragments.push(Fragment::sql(" AND "));
            }
            render_condition(builder, condition, root_alias, &mut clause);
        }
        if parenthesize {
            clause.fragments.push(Fragment::sql(")"));
        }
    }
    clause
}

fn render_condition(
    builder: &StatementBuilder,
    condition: &Condition,
    root_alias: Option<&str>,
    clause: &mut WhereClause,
) {
    let dialect = builder.dialect();
    let lower = dialect.lowercase_function();
    let column = builder.column_ident(&condition.path.column);
    let column_expr = match root_alias {
        Some(root) if condition.path.associations.is_empty() => format!("{root}.{column}"),
        Some(_) => format!("{}.{column}", path_alias(&condition.path.associations)),
        None => column,
    };
    let wrapped = |expr: &str| {
        if condition.ignore_case {
            format!("{lower}({expr})")
        } else {
            expr.to_string()
        }
    };
    let param = |clause: &mut WhereClause, name: &str| {
        if condition.ignore_case {
            clause.fragments.push(Fragment::sql(format!("{lower}(")));
            clause
                .fragments
                .push(Fragment::typed_param(name, condition.path.sql_type));
            clause.fragments.push(Fragment::sql(")"));
        } else {
            clause
                .fragments
                .push(Fragment::typed_param(name, condition.path.sql_type));
        }
    };

    match condition.compare {
        CompareKind::Equals
        | CompareKind::NotEquals
        | CompareKind::LessThan
        | CompareKind::LessThanEqual
        | CompareKind::GreaterThan
        | CompareKind::GreaterThanEqual => {
            let op = match condition.compare {
                CompareKind::Equals => "=",
                CompareKind::NotEquals => "<>",
                CompareKind::LessThan => "<",
                CompareKind::LessThanEqual => "<=",
                CompareKind::GreaterThan => ">",
                _ => ">=",
            };
            let name = next_param(clause);
            clause
                .fragments
                .push(Fragment::sql(format!("{} {op} ", wrapped(&column_expr))));
            param(clause, &name);
        }
        CompareKind::Between => {
            let low = next_param(clause);
            let high = next_param(clause);
            clause
                .fragments
                .push(Fragment::sql(format!("{column_expr} BETWEEN ")));
            clause
                .fragments
                .push(Fragment::typed_param(&low, condition.path.sql_type));
            clause.fragments.push(Fragment::sql(" AND "));
            clause
                .fragments
                .push(Fragment::typed_param(&high, condition.path.sql_type));
        }
        CompareKind::IsNull => {
            clause
                .fragments
                .push(Fragment::sql(format!("{column_expr} IS NULL")));
        }
        CompareKind::IsNotNull => {
            clause
                .fragments
                .push(Fragment::sql(format!("{column_expr} IS NOT NULL")));
        }
        CompareKind::True | CompareKind::False => {
            let literal = dialect.bool_literal(condition.compare == CompareKind::True);
            clause
                .fragments
                .push(Fragment::sql(format!("{column_expr} = {literal}")));
        }
        CompareKind::Like
        | CompareKind::NotLike
        | CompareKind::StartingWith
        | CompareKind::EndingWith
        | CompareKind::Containing => {
            let op = if condition.compare == CompareKind::NotLike {
                "NOT LIKE"
            } else {
                "LIKE"
            };
            let name = next_param(clause);
            clause
                .fragments
                .push(Fragment::sql(format!("{} {op} ", wrapped(&column_expr))));
            param(clause, &name);
            if condition.compare.wraps_wildcards() {
                let escape = builder.config().escape_char;
                clause
                    .fragments
                    .push(Fragment::sql(format!(" ESCAPE '{escape}'")));
                clause.like_bindings.push(LikeBinding {
                    parameter: name,
                    compare: condition.compare,
                    escape,
                });
            }
        }
        CompareKind::In | CompareKind::NotIn => {
            let name = next_param(clause);
            let item = format!("{name}_item");
            let op = if condition.compare == CompareKind::NotIn {
                "NOT IN "
            } else {
                "IN "
            };
            let mut body = vec![Fragment::sql(format!("{} {op}", wrapped(&column_expr)))];
            let item_body = if condition.ignore_case {
                vec![
                    Fragment::sql(format!("{lower}(")),
                    Fragment::typed_param(&item, condition.path.sql_type),
                    Fragment::sql(")"),
                ]
            } else {
                vec![Fragment::typed_param(&item, condition.path.sql_type)]
            };
            body.push(Fragment::Foreach {
                collection: name.clone(),
                item,
                open: "(".to_string(),
                separator: ",".to_string(),
                close: ")".to_string(),
                body: item_body,
            });
            let fallback = if condition.compare == CompareKind::NotIn {
                "1=1"
            } else {
                "1=0"
            };
            clause.fragments.push(Fragment::Choose {
                whens: vec![(format!("{name} != null and {name}.size() > 0"), body)],
                otherwise: Some(vec![Fragment::sql(fallback)]),
            });
        }
    }
}

fn next_param(clause: &mut WhereClause) -> String {
    let name = format!("p{}", clause.params);
    clause.params += 1;
    name
}
