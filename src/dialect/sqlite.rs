use super::{GenerationStrategy, RowSelection, SqlDialect};

/// SQLite dialect.
pub struct SqliteDialect;

impl SqlDialect for SqliteDialect {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn quote(&self, name: &str) -> String {
        format!("\"{}\"", name.replace('"', "\"\""))
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
        "SELECT last_insert_rowid()"
    }

    fn sequence_select(&self, _sequence: &str) -> String {
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
