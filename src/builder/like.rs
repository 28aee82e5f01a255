//! Wildcard preparation for string-match parameters.

use crate::derive::CompareKind;

/// Prepare a LIKE parameter value: escape the wildcard characters already in
/// the literal, then wrap per the comparison kind. Plain LIKE / NOT LIKE
/// values pass through untouched, the caller supplies their own wildcards.
pub fn prepare(compare: CompareKind, value: &str, escape: char) -> String {
    match compare {
        CompareKind::StartingWith => format!("{}%", escape_wildcards(value, escape)),
        CompareKind::EndingWith => format!("%{}", escape_wildcards(value, escape)),
        CompareKind::Containing => format!("%{}%", escape_wildcards(value, escape)),
        _ => value.to_string(),
    }
}

/// Escape `%`, `_` and the escape character itself.
fn escape_wildcards(value: &str, escape: char) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if c == '%' || c == '_' || c == escape {
            out.push(escape);
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_starting_with_escapes_then_wraps() {
        assert_eq!(
            prepare(CompareKind::StartingWith, "A%_B", '\\'),
            "A\\%\\_B%"
        );
    }

    #[test]
    fn test_containing_wraps_both_sides() {
        assert_eq!(prepare(CompareKind::Containing, "abc", '\\'), "%abc%");
        assert_eq!(prepare(CompareKind::EndingWith, "abc", '\\'), "%abc");
    }

    #[test]
    fn test_escape_character_itself_is_escaped() {
        assert_eq!(
            prepare(CompareKind::StartingWith, "a\\b", '\\'),
            "a\\\\b%"
        );
    }

    #[test]
    fn test_plain_like_passes_through() {
        assert_eq!(prepare(CompareKind::Like, "%raw%", '\\'), "%raw%");
        assert_eq!(prepare(CompareKind::Equals, "x", '\\'), "x");
    }
}
