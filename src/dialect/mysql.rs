use super::{GenerationStrategy, RowSelection, SqlDialect};

/// MySQL / MariaDB dialect.
pub struct MySqlDialect;

impl SqlDialect for MySqlDialect {
    fn name(&self) -> &'static str {
        "mysql"
    }

    fn quote(&self, name: &str) -> String {
        format!("`{}`", name.replace('`', "``"))
    }

    fn native_generation(&self) -> Option<GenerationStrategy> {
        Some(GenerationStrategy::Identity)
    }

    fn supports_identity(&self) -> bool {
        true
    }

    fn supports_sequences(&self) -> bool {
        false
    }

    fn identity_select(&self) -> &'static str {
        "SELECT LAST_INSERT_ID()"
    }

    fn sequence_select(&self, _sequence: &str) -> String {
        // Guarded by supports_sequences(); never reached through the builder.
        String::new()
    }

    fn bool_literal(&self, val: bool) -> &'static str {
        if val { "1" } else { "0" }
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

    #[test]
    fn test_quote_backticks() {
        assert_eq!(MySqlDialect.quote("order"), "`order`");
        assert_eq!(MySqlDialect.quote("we`ird"), "`we``ird`");
    }

    #[test]
    fn test_capped_limit() {
        assert_eq!(
            MySqlDialect.paginate("SELECT * FROM t", &RowSelection::capped(3)),
            "SELECT * FROM t LIMIT 3"
        );
    }
}
