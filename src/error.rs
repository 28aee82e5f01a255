//! Error types for sqlmapper.
//!
//! Everything here is raised eagerly, at metadata or statement construction
//! time. A misconfigured mapping fails before any SQL template exists; the
//! execution boundary downstream never sees these.

use thiserror::Error;

/// A permanent defect in the declared metadata. Never retried.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MappingError {
    /// The type carries no mapping declaration.
    #[error("No mapping declared for entity '{0}'")]
    UnknownEntity(String),

    #[error("Entity '{entity}' has no property '{property}'")]
    UnknownProperty { entity: String, property: String },

    /// Composite keys are never auto-generated.
    #[error("Entity '{0}' combines a composite id with a generation strategy")]
    CompositeKeyGeneration(String),

    /// AUTO could not be resolved to a native strategy.
    #[error("Dialect '{dialect}' has no native id generation strategy for entity '{entity}'")]
    UnresolvedAutoStrategy { entity: String, dialect: String },

    /// The resolved dialect cannot honor the requested strategy.
    #[error("Dialect '{dialect}' does not support {strategy} id generation")]
    UnsupportedGeneration { dialect: String, strategy: String },

    #[error("Duplicate id generator name '{0}'")]
    DuplicateGenerator(String),

    /// Default join column naming needs an identifier property to reference.
    #[error("Entity '{0}' has no identifier property")]
    MissingId(String),

    #[error(transparent)]
    Association(#[from] AssociationError),
}

/// Join-column/join-table inference could not produce a consistent shape.
///
/// A subtype of [`MappingError`]; carried as its own enum so the resolver can
/// name the exact structural failure.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AssociationError {
    #[error("Association '{entity}.{property}' targets unknown entity '{target}'")]
    UnknownTarget {
        entity: String,
        property: String,
        target: String,
    },

    #[error("Association '{entity}.{property}' is mapped by '{mapped_by}', which does not exist on '{target}'")]
    MissingMappedBy {
        entity: String,
        property: String,
        target: String,
        mapped_by: String,
    },

    /// The owning side of a mapped-by association resolved to no join columns.
    #[error("Owning side '{target}.{mapped_by}' of '{entity}.{property}' has no resolvable join columns")]
    InconsistentMappedBy {
        entity: String,
        property: String,
        target: String,
        mapped_by: String,
    },

    /// Two mapped-by declarations pointing at each other.
    #[error("Association cycle while resolving '{entity}.{property}'")]
    Cycle { entity: String, property: String },
}

/// A malformed or unresolvable derived-query token. Fatal for the statement
/// being derived, harmless to every other statement.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DeriveError {
    #[error("Unknown query subject in '{0}' (expected find/read/get/query/stream/count/exists/delete/remove)")]
    UnknownSubject(String),

    #[error("Derived query '{0}' has no predicate after 'By'")]
    EmptyPredicate(String),

    #[error("Cannot resolve '{token}' to a property of entity '{entity}'")]
    UnknownProperty { entity: String, token: String },

    #[error("Derived query '{query}' expects {expected} parameter(s), got {got}")]
    ArityMismatch {
        query: String,
        expected: usize,
        got: usize,
    },

    /// Mapping errors surfaced while walking association paths.
    #[error(transparent)]
    Mapping(#[from] MappingError),
}

/// Result alias for metadata operations.
pub type MappingResult<T> = Result<T, MappingError>;

/// Result alias for query derivation.
pub type DeriveResult<T> = Result<T, DeriveError>;
