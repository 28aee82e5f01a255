//! Property-path resolution for grammar tokens.
//!
//! A clause token like `TeamName` is matched against the entity graph with a
//! greedy longest-prefix scan: the whole token is tried as a property first,
//! then progressively shorter camel-case prefixes are tried as association
//! steps whose remainder resolves on the target entity. An explicit `_`
//! separator forces a step boundary. Comparator suffixes are stripped
//! longest-first, but a suffix match only wins if its stem actually resolves,
//! so `checkedIn` is a property, not an IN clause on `checked`.

use super::keywords::{CompareKind, KEYWORDS};
use super::tree::{Condition, PropertyPath};
use crate::error::{DeriveError, DeriveResult};
use crate::metadata::{Entity, MetadataModel, SqlType};

/// Resolve one predicate clause token (comparator suffix included) into a
/// condition.
pub(crate) fn resolve_clause(
    model: &MetadataModel,
    entity: &Entity,
    token: &str,
    ignore_case: bool,
) -> DeriveResult<Condition> {
    for (keyword, kind) in KEYWORDS.iter() {
        if let Some(stem) = token.strip_suffix(keyword) {
            if stem.is_empty() {
                continue;
            }
            if let Some(path) = resolve_path(model, entity, stem) {
                return Ok(Condition {
                    path,
                    compare: *kind,
                    ignore_case,
                });
            }
        }
    }
    // No comparator suffix, or the stem did not resolve; the whole token as
    // an equality check is the last candidate.
    match resolve_path(model, entity, token) {
        Some(path) => Ok(Condition {
            path,
            compare: CompareKind::Equals,
            ignore_case,
        }),
        None => Err(DeriveError::UnknownProperty {
            entity: entity.name.clone(),
            token: token.to_string(),
        }),
    }
}

/// Resolve an order-by token (no comparator suffix).
pub(crate) fn resolve_order_path(
    model: &MetadataModel,
    entity: &Entity,
    token: &str,
) -> DeriveResult<PropertyPath> {
    resolve_path(model, entity, token).ok_or_else(|| DeriveError::UnknownProperty {
        entity: entity.name.clone(),
        token: token.to_string(),
    })
}

fn resolve_path(model: &MetadataModel, entity: &Entity, token: &str) -> Option<PropertyPath> {
    let mut path = walk(model, entity, token, Vec::new())?;
    path.raw = token.to_string();
    Some(path)
}

fn walk(
    model: &MetadataModel,
    entity: &Entity,
    token: &str,
    steps: Vec<String>,
) -> Option<PropertyPath> {
    if let Some((head, rest)) = token.split_once('_') {
        let name = decapitalize(head);
        let assoc = entity.association(&name)?;
        let target = model.entity(&assoc.target).ok()?;
        let mut steps = steps;
        steps.push(name);
        return walk(model, target, rest, steps);
    }

    for split in prefix_lengths(token) {
        let (head, rest) = token.split_at(split);
        let name = decapitalize(head);
        if rest.is_empty() {
            if let Some(p) = entity.property(&name) {
                return Some(PropertyPath {
                    raw: String::new(),
                    associations: steps,
                    property: name,
                    column: p.column.clone(),
                    sql_type: p.sql_type,
                });
            }
            if let Some(a) = entity.association(&name) {
                // A to-one association as a leaf compares its foreign-key
                // column on the holding table.
                if a.kind.is_to_one() {
                    if let Some(jc) = a.join_columns.first() {
                        let sql_type = model
                            .entity(&a.target)
                            .ok()
                            .and_then(|t| {
                                jc.referenced_property
                                    .as_deref()
                                    .and_then(|rp| t.property(rp))
                            })
                            .map(|p| p.sql_type)
                            .unwrap_or(SqlType::Other);
                        return Some(PropertyPath {
                            raw: String::new(),
                            associations: steps,
                            property: name,
                            column: jc.column.clone(),
                            sql_type,
                        });
                    }
                }
            }
        } else if let Some(a) = entity.association(&name) {
            if let Ok(target) = model.entity(&a.target) {
                let mut next = steps.clone();
                next.push(name);
                if let Some(found) = walk(model, target, rest, next) {
                    return Some(found);
                }
            }
        }
    }
    None
}

/// Prefix split lengths, longest first: the full token, then each camel-case
/// boundary walking backwards.
fn prefix_lengths(token: &str) -> Vec<usize> {
    let mut lengths = vec![token.len()];
    for (i, c) in token.char_indices().rev() {
        if i > 0 && c.is_ascii_uppercase() {
            lengths.push(i);
        }
    }
    lengths
}

fn decapitalize(token: &str) -> String {
    let mut chars = token.chars();
    match chars.next() {
        Some(c) => c.to_ascii_lowercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}
