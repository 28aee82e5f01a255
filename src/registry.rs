//! Statement registry: namespace-qualified, compute-once statement storage.
//!
//! Registration is idempotent and safe under concurrent first access: the
//! entry lock guarantees one build per id, every caller observes the same
//! [`MappedStatement`] instance, and a registered statement is never
//! overwritten.

use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing::debug;

use crate::builder::MappedStatement;

/// Qualify a statement name with its namespace.
pub fn statement_id(namespace: &str, name: &str) -> String {
    format!("{namespace}.{name}")
}

#[derive(Default)]
pub struct StatementRegistry {
    statements: DashMap<String, Arc<MappedStatement>>,
}

impl StatementRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the statement registered under `id`, building and registering
    /// it first if absent. `build` runs at most once per id; a failed build
    /// registers nothing, so a later call retries.
    pub fn ensure_registered<E>(
        &self,
        id: &str,
        build: impl FnOnce() -> Result<MappedStatement, E>,
    ) -> Result<Arc<MappedStatement>, E> {
        match self.statements.entry(id.to_string()) {
            Entry::Occupied(entry) => Ok(entry.get().clone()),
            Entry::Vacant(entry) => {
                let statement = Arc::new(build()?);
                entry.insert(statement.clone());
                debug!(id, "registered statement");
                Ok(statement)
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<Arc<MappedStatement>> {
        self.statements.get(id).map(|s| s.clone())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.statements.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }
}
