use super::{GenerationStrategy, RowBound, RowSelection, SqlDialect};

/// Microsoft SQL Server dialect.
pub struct SqlServerDialect;

impl SqlDialect for SqlServerDialect {
    fn name(&self) -> &'static str {
        "sqlserver"
    }

    fn quote(&self, name: &str) -> String {
        format!("[{}]", name.replace(']', "]]"))
    }

    fn lowercase_function(&self) -> &'static str {
        "LOWER"
    }

    fn native_generation(&self) -> Option<GenerationStrategy> {
        Some(GenerationStrategy::Identity)
    }

    fn supports_identity(&self) -> bool {
        true
    }

    fn supports_sequences(&self) -> bool {
        // Sequences exist since 2012, but identity is the native path here.
        true
    }

    fn identity_select(&self) -> &'static str {
        "SELECT SCOPE_IDENTITY()"
    }

    fn sequence_select(&self, sequence: &str) -> String {
        format!("SELECT NEXT VALUE FOR {sequence}")
    }

    fn bool_literal(&self, val: bool) -> &'static str {
        if val { "1" } else { "0" }
    }

    fn paginate(&self, sql: &str, rows: &RowSelection) -> String {
        // A fixed cap with no offset rewrites to TOP; the general case wraps
        // the statement in a ROW_NUMBER() subquery.
        match (&rows.offset, &rows.max_rows) {
            // DISTINCT must precede TOP in T-SQL.
            (None, Some(RowBound::Literal(n))) if sql.starts_with("SELECT DISTINCT ") => {
                format!(
                    "SELECT DISTINCT TOP {n} {}",
                    &sql["SELECT DISTINCT ".len()..]
                )
            }
            (None, Some(RowBound::Literal(n))) if sql.starts_with("SELECT ") => {
                format!("SELECT TOP {n} {}", &sql["SELECT ".len()..])
            }
            (None, None) => sql.to_string(),
            (offset, max_rows) => {
                let mut out = format!(
                    "SELECT * FROM (SELECT ROW_NUMBER() OVER (ORDER BY (SELECT NULL)) AS __row_num, __inner.* FROM ({sql}) __inner) __paged WHERE"
                );
                let lower = offset.clone().unwrap_or(RowBound::Literal(0));
                out.push_str(&format!(" __row_num > {lower}"));
                if let Some(max) = max_rows {
                    out.push_str(&format!(" AND __row_num <= {lower} + {max}"));
                }
                out
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_top_rewrite_for_fixed_cap() {
        assert_eq!(
            SqlServerDialect.paginate("SELECT name FROM users", &RowSelection::capped(5)),
            "SELECT TOP 5 name FROM users"
        );
    }

    #[test]
    fn test_distinct_keeps_its_place_before_top() {
        assert_eq!(
            SqlServerDialect.paginate("SELECT DISTINCT name FROM users", &RowSelection::capped(5)),
            "SELECT DISTINCT TOP 5 name FROM users"
        );
    }

    #[test]
    fn test_row_number_wrap_for_paging() {
        let sql = SqlServerDialect.paginate(
            "SELECT name FROM users",
            &RowSelection::paged("offset", "maxRows"),
        );
        assert!(sql.contains("ROW_NUMBER() OVER"));
        assert!(sql.contains("__row_num > #{offset}"));
        assert!(sql.contains("__row_num <= #{offset} + #{maxRows}"));
    }
}
