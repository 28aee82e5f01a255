use super::{GenerationStrategy, RowSelection, SqlDialect};

/// Oracle dialect.
pub struct OracleDialect;

impl SqlDialect for OracleDialect {
    fn name(&self) -> &'static str {
        "oracle"
    }

    fn quote(&self, name: &str) -> String {
        format!("\"{}\"", name.replace('"', "\"\""))
    }

    fn lowercase_function(&self) -> &'static str {
        "LOWER"
    }

    fn native_generation(&self) -> Option<GenerationStrategy> {
        Some(GenerationStrategy::Sequence)
    }

    fn supports_identity(&self) -> bool {
        false
    }

    fn supports_sequences(&self) -> bool {
        true
    }

    fn identity_select(&self) -> &'static str {
        // Guarded by supports_identity(); never reached through the builder.
        ""
    }

    fn sequence_select(&self, sequence: &str) -> String {
        format!("SELECT {sequence}.NEXTVAL FROM DUAL")
    }

    fn bool_literal(&self, val: bool) -> &'static str {
        if val { "1" } else { "0" }
    }

    fn paginate(&self, sql: &str, rows: &RowSelection) -> String {
        // Classic ROWNUM double-wrap; the inner query bounds the upper limit so
        // the optimizer can stop early, the outer strips the offset.
        match (&rows.offset, &rows.max_rows) {
            (None, None) => sql.to_string(),
            (None, Some(max)) => {
                format!("SELECT * FROM ({sql}) WHERE ROWNUM <= {max}")
            }
            (Some(offset), max_rows) => {
                let upper = match max_rows {
                    Some(max) => format!(" WHERE ROWNUM <= {offset} + {max}"),
                    None => String::new(),
                };
                format!(
                    "SELECT * FROM (SELECT __inner.*, ROWNUM AS __rn FROM ({sql}) __inner{upper}) WHERE __rn > {offset}"
                )
            }
        }
    }
}
