//! Per-database SQL capability strategies.
//!
//! A [`Dialect`] names a supported database; its [`SqlDialect`] strategy object
//! encapsulates everything that differs between them: identifier quoting,
//! pagination rewriting, the lowercase function, boolean literals, and the
//! native id generation strategy.

pub mod mysql;
pub mod oracle;
pub mod postgres;
pub mod sqlite;
pub mod sqlserver;

use serde::{Deserialize, Serialize};

use mysql::MySqlDialect;
use oracle::OracleDialect;
use postgres::PostgresDialect;
use sqlite::SqliteDialect;
use sqlserver::SqlServerDialect;

/// How identifier values are produced for an id property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GenerationStrategy {
    /// Caller assigns the id; nothing generated.
    None,
    /// Database identity/auto-increment column, read back after insert.
    Identity,
    /// Sequence value selected before insert.
    Sequence,
}

impl std::fmt::Display for GenerationStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GenerationStrategy::None => write!(f, "NONE"),
            GenerationStrategy::Identity => write!(f, "IDENTITY"),
            GenerationStrategy::Sequence => write!(f, "SEQUENCE"),
        }
    }
}

/// One bound of a row selection: either fixed at build time (Top/First N) or a
/// placeholder bound at execution time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RowBound {
    Literal(u64),
    /// Rendered as a `#{name}` parameter placeholder.
    Placeholder(String),
}

impl std::fmt::Display for RowBound {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RowBound::Literal(n) => write!(f, "{n}"),
            RowBound::Placeholder(name) => write!(f, "#{{{name}}}"),
        }
    }
}

/// Row-limiting input to a dialect's pagination rewrite.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowSelection {
    pub offset: Option<RowBound>,
    pub max_rows: Option<RowBound>,
}

impl RowSelection {
    /// A fixed row cap with no offset (limiting prefixes like `findFirst3By`).
    pub fn capped(max_rows: u64) -> Self {
        Self {
            offset: None,
            max_rows: Some(RowBound::Literal(max_rows)),
        }
    }

    /// Execution-time paging bound to the given placeholder names.
    pub fn paged(offset_param: &str, max_rows_param: &str) -> Self {
        Self {
            offset: Some(RowBound::Placeholder(offset_param.to_string())),
            max_rows: Some(RowBound::Placeholder(max_rows_param.to_string())),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.offset.is_none() && self.max_rows.is_none()
    }
}

/// Stateless per-database strategy object.
pub trait SqlDialect: Send + Sync {
    fn name(&self) -> &'static str;

    /// Quote an identifier, doubling embedded quote characters.
    fn quote(&self, name: &str) -> String;

    /// Function wrapped around both sides of case-insensitive comparisons.
    fn lowercase_function(&self) -> &'static str {
        "lower"
    }

    /// What an AUTO generation declaration resolves to, if anything.
    fn native_generation(&self) -> Option<GenerationStrategy>;

    fn supports_identity(&self) -> bool;

    fn supports_sequences(&self) -> bool;

    /// Post-insert query reading the last generated identity value.
    fn identity_select(&self) -> &'static str;

    /// Pre-insert query reading the next value of `sequence`.
    fn sequence_select(&self, sequence: &str) -> String;

    fn bool_literal(&self, val: bool) -> &'static str {
        if val { "true" } else { "false" }
    }

    /// Rewrite `sql` so the database returns only the requested row window.
    ///
    /// Pure and deterministic: the same `(sql, rows)` always yields the same
    /// string. Different dialects legitimately differ for the same input.
    fn paginate(&self, sql: &str, rows: &RowSelection) -> String;
}

/// Supported SQL dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Dialect {
    Postgres,
    MySql,
    Sqlite,
    SqlServer,
    Oracle,
}

impl Default for Dialect {
    fn default() -> Self {
        Self::Postgres
    }
}

impl Dialect {
    /// The strategy object for this dialect. All strategies are stateless.
    pub fn strategy(&self) -> &'static dyn SqlDialect {
        match self {
            Dialect::Postgres => &PostgresDialect,
            Dialect::MySql => &MySqlDialect,
            Dialect::Sqlite => &SqliteDialect,
            Dialect::SqlServer => &SqlServerDialect,
            Dialect::Oracle => &OracleDialect,
        }
    }

    /// Look a dialect up by the database-product identifier string reported by
    /// the connection layer (e.g. a JDBC-style product name).
    pub fn from_product(product: &str) -> Option<Dialect> {
        let p = product.to_lowercase();
        if p.contains("postgres") {
            Some(Dialect::Postgres)
        } else if p.contains("mariadb") || p.contains("mysql") {
            Some(Dialect::MySql)
        } else if p.contains("sqlite") {
            Some(Dialect::Sqlite)
        } else if p.contains("microsoft sql server") || p.contains("sqlserver") {
            Some(Dialect::SqlServer)
        } else if p.contains("oracle") {
            Some(Dialect::Oracle)
        } else {
            None
        }
    }
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.strategy().name())
    }
}

/// SQL reserved words that must be quoted when used as identifiers.
pub const RESERVED_WORDS: &[&str] = &[
    "order", "group", "user", "table", "select", "from", "where", "join", "left", "right",
    "inner", "outer", "on", "and", "or", "not", "null", "true", "false", "limit", "offset",
    "as", "in", "is", "like", "between", "having", "union", "all", "distinct", "case", "when",
    "then", "else", "end", "create", "alter", "drop", "insert", "update", "delete", "index",
    "key", "primary", "foreign", "references", "default", "constraint", "check",
];

/// Whether an identifier needs quoting regardless of the forced-quoting flag.
pub fn needs_quoting(name: &str) -> bool {
    let lower = name.to_lowercase();
    RESERVED_WORDS.contains(&lower.as_str())
        || name.chars().any(|c| !c.is_alphanumeric() && c != '_')
        || name.chars().next().is_some_and(|c| c.is_numeric())
}
