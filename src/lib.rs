pub mod builder;
pub mod derive;
pub mod dialect;
pub mod error;
pub mod metadata;
pub mod registry;
pub mod script;

pub use derive::parse;

pub mod prelude {
    pub use crate::builder::{MappedStatement, StatementBuilder, StatementKind};
    pub use crate::derive::{DerivedQuery, PredicateTree, ReturnHint, ReturnShape, parse};
    pub use crate::dialect::{Dialect, GenerationStrategy, RowSelection, SqlDialect};
    pub use crate::error::{DeriveError, MappingError};
    pub use crate::metadata::{
        EntityDef, FieldDef, GeneratorDef, MetadataModel, ModelConfig, RelationDef,
    };
    pub use crate::registry::StatementRegistry;
}
