use super::{GenerationStrategy, RowSelection, SqlDialect};

/// PostgreSQL dialect.
pub struct PostgresDialect;

impl SqlDialect for PostgresDialect {
    fn name(&self) -> &'static str {
        "postgresql"
    }

    fn quote(&self, name: &str) -> String {
        format!("\"{}\"", name.replace('"', "\"\""))
    }

    fn native_generation(&self) -> Option<GenerationStrategy> {
        // SERIAL / GENERATED AS IDENTITY columns; lastval() reads them back.
        Some(GenerationStrategy::Identity)
    }

    fn supports_identity(&self) -> bool {
        true
    }

    fn supports_sequences(&self) -> bool {
        true
    }

    fn identity_select(&self) -> &'static str {
        "SELECT lastval()"
    }

    fn sequence_select(&self, sequence: &str) -> String {
        format!("SELECT nextval('{sequence}')")
    }

    fn paginate(&self, sql: &str, rows: &RowSelection) -> String {
        let mut out = sql.to_string();
        if let Some(max) = &rows.max_rows {
            out.push_str(&format!(" LIMIT {max}"));
        }
        if let Some(offset) = &rows.offset {
            out.push_str(&format!(" OFFSET {offset}"));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::RowBound;

    #[test]
    fn test_limit_offset_suffix() {
        let rows = RowSelection {
            offset: Some(RowBound::Literal(20)),
            max_rows: Some(RowBound::Literal(10)),
        };
        assert_eq!(
            PostgresDialect.paginate("SELECT * FROM users", &rows),
            "SELECT * FROM users LIMIT 10 OFFSET 20"
        );
    }

    #[test]
    fn test_placeholder_bounds() {
        let rows = RowSelection::paged("offset", "maxRows");
        assert_eq!(
            PostgresDialect.paginate("SELECT * FROM users", &rows),
            "SELECT * FROM users LIMIT #{maxRows} OFFSET #{offset}"
        );
    }
}
