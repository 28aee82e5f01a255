//! Derived-query grammar: method names like `findByAgeGreaterThanAndNameIn`
//! parsed into a [`PredicateTree`] plus a return shape.
//!
//! The grammar is `<verb>[<subject words>]By<predicate>[OrderBy<order>]`.
//! Verbs are find/read/get/query/stream (select), count, exists and
//! delete/remove. The subject region may carry `Distinct` and a `First`/`Top`
//! row cap. The predicate is `Or`-separated groups of `And`-separated
//! clauses; a separator only counts at a camel-case boundary, so property
//! names like `organization` never split. Each clause ends in an optional
//! comparator keyword and an optional `IgnoreCase`.

pub mod keywords;
mod resolve;
pub mod tree;


pub use keywords::CompareKind;
pub use tree::{
    AndGroup, Condition, DerivedQuery, Direction, OrderClause, PredicateTree, PropertyPath,
    ReturnHint, ReturnShape, Subject,
};

use nom::IResult;
use nom::branch::alt;
use nom::bytes::complete::tag;
use nom::combinator::value;
use tracing::trace;

use crate::error::{DeriveError, DeriveResult};
use crate::metadata::{Entity, MetadataModel};
use resolve::{resolve_clause, resolve_order_path};

/// Parse a derived-query method name against an entity of the model.
///
/// `hint` supplies the caller-declared result shape for select subjects;
/// count/exists/delete subjects have a fixed shape and ignore it.
pub fn parse(
    model: &MetadataModel,
    entity_name: &str,
    method: &str,
    hint: ReturnHint,
) -> DeriveResult<DerivedQuery> {
    let entity = model.entity(entity_name)?;
    let (rest, subject) =
        verb(method).map_err(|_| DeriveError::UnknownSubject(method.to_string()))?;

    let (subject_region, predicate_region) = match find_keyword(rest, "By") {
        Some(pos) => (&rest[..pos], Some(&rest[pos + 2..])),
        None => (rest, None),
    };
    let distinct = subject_region.contains("Distinct");
    let limit = limiter(subject_region);

    let mut tree = PredicateTree::default();
    let mut order = Vec::new();
    if let Some(predicate) = predicate_region {
        if predicate.is_empty() {
            return Err(DeriveError::EmptyPredicate(method.to_string()));
        }
        let (predicate, order_region) = match find_keyword(predicate, "OrderBy") {
            Some(pos) => (&predicate[..pos], Some(&predicate[pos + 7..])),
            None => (predicate, None),
        };
        let (predicate, all_ignore_case) =
            strip_suffix_any(predicate, &["AllIgnoreCase", "AllIgnoringCase"]);

        if predicate.is_empty() && order_region.is_none() {
            return Err(DeriveError::EmptyPredicate(method.to_string()));
        }
        if !predicate.is_empty() {
            for group in split_camel(predicate, "Or") {
                let mut conditions = Vec::new();
                for clause in split_camel(group, "And") {
                    let (clause, ignore_case) =
                        strip_suffix_any(clause, &["IgnoreCase", "IgnoringCase"]);
                    conditions.push(resolve_clause(
                        model,
                        entity,
                        clause,
                        ignore_case || all_ignore_case,
                    )?);
                }
                tree.groups.push(AndGroup { conditions });
            }
        }
        if let Some(region) = order_region {
            order = parse_order(model, entity, region)?;
        }
    }

    let shape = match subject {
        Subject::Count => ReturnShape::Count,
        Subject::Exists => ReturnShape::Exists,
        Subject::Delete => ReturnShape::Delete,
        Subject::Find => match limit {
            Some(1) => ReturnShape::Single,
            _ => match hint {
                ReturnHint::Single => ReturnShape::Single,
                ReturnHint::Collection => ReturnShape::Collection,
                ReturnHint::Paged => ReturnShape::Paged,
                ReturnHint::Sliced => ReturnShape::Sliced,
            },
        },
    };

    trace!(method, entity = entity_name, groups = tree.groups.len(), "parsed derived query");
    Ok(DerivedQuery {
        source: method.to_string(),
        entity: entity.name.clone(),
        subject,
        distinct,
        limit,
        tree,
        order,
        shape,
    })
}

fn verb(input: &str) -> IResult<&str, Subject> {
    alt((
        value(
            Subject::Find,
            alt((
                tag("find"),
                tag("read"),
                tag("get"),
                tag("query"),
                tag("stream"),
            )),
        ),
        value(Subject::Count, tag("count")),
        value(Subject::Exists, tag("exists")),
        value(Subject::Delete, alt((tag("delete"), tag("remove")))),
    ))(input)
}

/// Row cap from a `First`/`Top` prefix; a bare keyword caps at one row.
fn limiter(region: &str) -> Option<u64> {
    for keyword in ["First", "Top"] {
        if let Some(pos) = region.find(keyword) {
            let digits: String = region[pos + keyword.len()..]
                .chars()
                .take_while(|c| c.is_ascii_digit())
                .collect();
            if digits.is_empty() {
                return Some(1);
            }
            return Some(digits.parse().unwrap_or(1));
        }
    }
    None
}

/// First occurrence of `keyword` that sits at a camel-case boundary (followed
/// by an uppercase letter or the end of the input).
fn find_keyword(haystack: &str, keyword: &str) -> Option<usize> {
    let mut pos = 0;
    while pos + keyword.len() <= haystack.len() {
        if haystack[pos..].starts_with(keyword) {
            let end = pos + keyword.len();
            if end == haystack.len() || haystack.as_bytes()[end].is_ascii_uppercase() {
                return Some(pos);
            }
        }
        pos += 1;
    }
    None
}

/// Split on a separator keyword, honoring camel-case boundaries only. The
/// separator never matches at the very start and must be followed by an
/// uppercase letter.
fn split_camel<'a>(input: &'a str, separator: &str) -> Vec<&'a str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut i = 1;
    while i + separator.len() < input.len() {
        if input[i..].starts_with(separator)
            && input.as_bytes()[i + separator.len()].is_ascii_uppercase()
        {
            parts.push(&input[start..i]);
            start = i + separator.len();
            i = start + 1;
        } else {
            i += 1;
        }
    }
    parts.push(&input[start..]);
    parts
}

/// `<Prop>[Asc|Desc]` segments, direction defaulting to ascending.
fn parse_order(
    model: &MetadataModel,
    entity: &Entity,
    input: &str,
) -> DeriveResult<Vec<OrderClause>> {
    let mut out = Vec::new();
    let mut start = 0;
    let mut i = 1;
    while i < input.len() {
        let mut advanced = false;
        for (keyword, direction) in [("Desc", Direction::Desc), ("Asc", Direction::Asc)] {
            let end = i + keyword.len();
            if end <= input.len()
                && i > start
                && input[i..].starts_with(keyword)
                && (end == input.len() || input.as_bytes()[end].is_ascii_uppercase())
            {
                let path = resolve_order_path(model, entity, &input[start..i])?;
                out.push(OrderClause { path, direction });
                start = end;
                i = end + 1;
                advanced = true;
                break;
            }
        }
        if !advanced {
            i += 1;
        }
    }
    if start < input.len() {
        let path = resolve_order_path(model, entity, &input[start..])?;
        out.push(OrderClause {
            path,
            direction: Direction::Asc,
        });
    }
    Ok(out)
}

fn strip_suffix_any<'a>(token: &'a str, suffixes: &[&str]) -> (&'a str, bool) {
    for suffix in suffixes {
        if let Some(stripped) = token.strip_suffix(suffix) {
            if !stripped.is_empty() {
                return (stripped, true);
            }
        }
    }
    (token, false)
}
